use anyhow::Result;
use clap::Parser;
use reposcope_core::model::SearchQuery;
use reposcope_github::Config;
use std::path::PathBuf;

mod commands;
mod logging;
mod server;

#[derive(Debug, Parser)]
#[command(name = "reposcope", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the config file (default: ./config/config.toml, then
    /// ~/.config/reposcope/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// GitHub token (overrides REPOSCOPE_GITHUB_TOKEN and the config file)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Log level: error, warn, info, debug or trace
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as one JSON object per line
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Serve the latest-repositories endpoint over HTTP
    ///
    /// Reads the current GitHub rate limit once at startup and seeds the
    /// local call budget from it; startup fails if the limit cannot be read.
    /// Every request to `GET /repos?owner=&license=&language=` is paid for
    /// from that budget before any GitHub call is made.
    ///
    /// Responses:
    /// - 200 with the enriched repository list
    /// - 429 with `{code: "RATE_LIMIT_REACHED", message}` when the budget or
    ///   GitHub refuses
    /// - 500 with `{code, message}` for anything else
    ///
    /// Stops gracefully on SIGINT or SIGTERM.
    Serve {
        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,

        /// Maximum number of language lookups in flight per request
        #[arg(long)]
        max_parallel_tasks: Option<usize>,
    },
    /// Fetch the latest repositories once and print them as JSON
    Fetch {
        #[arg(long)]
        owner: Option<String>,
        #[arg(long)]
        license: Option<String>,
        #[arg(long)]
        language: Option<String>,

        /// Maximum number of language lookups in flight
        #[arg(long)]
        max_parallel_tasks: Option<usize>,
    },
    /// Show the GitHub rate-limit status
    Status,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigAction {
    /// Show the effective configuration (token masked)
    Show,
    /// Print the config file path
    Path,
    /// Print an example config file
    Example,
    /// Write the example config file if none exists
    Init,
}

impl Cli {
    /// Load the config and apply the global flags on top.
    fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_from(self.config.as_deref())?;
        if let Some(token) = &self.token {
            config.github_token = Some(token.clone());
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if self.log_json {
            config.log_json = true;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Config { action } = &cli.command {
        let explicit = cli.config.as_deref();
        return match action {
            ConfigAction::Show => commands::config::show_config(&cli.load_config()?, explicit),
            ConfigAction::Path => commands::config::show_path(explicit),
            ConfigAction::Example => commands::config::show_example(),
            ConfigAction::Init => commands::config::init_config(explicit),
        };
    }

    let mut config = cli.load_config()?;
    logging::init(&config.log_level, config.log_json)?;

    match cli.command {
        Commands::Serve {
            port,
            max_parallel_tasks,
        } => {
            if let Some(port) = port {
                config.listen_port = port;
            }
            if let Some(tasks) = max_parallel_tasks {
                config.max_parallel_tasks = tasks;
            }
            commands::run_serve(&config).await?;
        }
        Commands::Fetch {
            owner,
            license,
            language,
            max_parallel_tasks,
        } => {
            if let Some(tasks) = max_parallel_tasks {
                config.max_parallel_tasks = tasks;
            }
            let query = SearchQuery {
                owner,
                license,
                language,
            };
            commands::run_fetch(&config, query).await?;
        }
        Commands::Status => {
            commands::show_status(&config).await?;
        }
        Commands::Config { .. } => {}
    }

    Ok(())
}
