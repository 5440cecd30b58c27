use std::path::Path;

use anyhow::{Context, Result};
use reposcope_github::{config, Config};

/// Show the current effective configuration.
pub fn show_config(config: &Config, explicit: Option<&Path>) -> Result<()> {
    let config_path = explicit.map_or_else(config::config_file_path, Path::to_path_buf);
    let shown = config.redacted();

    println!("Current Configuration");
    println!("=====================\n");

    println!("Config file: {}", config_path.display());
    let exists = config_path.exists();
    println!(
        "File exists: {}\n",
        if exists { "yes" } else { "no (using defaults)" }
    );

    println!("Settings:");
    println!(
        "  github_token: {}",
        shown.github_token.as_deref().unwrap_or("<not set>")
    );
    println!("  github_api_url: {}", shown.github_api_url);
    println!("  max_parallel_tasks: {}", shown.max_parallel_tasks());
    println!("  listen_port: {}", shown.listen_port);
    println!("  log_level: {}", shown.log_level);
    println!("  log_json: {}", shown.log_json);

    println!("\nPriority: CLI args > ENV vars (REPOSCOPE_*) > Config file > Defaults");

    Ok(())
}

/// Show the config file path.
pub fn show_path(explicit: Option<&Path>) -> Result<()> {
    let config_path = explicit.map_or_else(config::config_file_path, Path::to_path_buf);
    println!("{}", config_path.display());
    Ok(())
}

/// Show example configuration.
pub fn show_example() -> Result<()> {
    print!("{}", config::example_config());
    Ok(())
}

/// Initialize config file with defaults.
pub fn init_config(explicit: Option<&Path>) -> Result<()> {
    let (created, config_path) = match explicit {
        Some(path) => (config::ensure_config_file_at(path), path.to_path_buf()),
        None => (config::ensure_config_file(), config::user_config_file_path()),
    };
    let created =
        created.with_context(|| format!("Failed to initialize {}", config_path.display()))?;

    if created {
        println!("✓ Created config file: {}", config_path.display());
        println!("\nEdit this file to configure reposcope.");
    } else {
        println!("Config file already exists: {}", config_path.display());
    }

    Ok(())
}
