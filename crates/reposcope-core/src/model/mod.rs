pub mod ids;
pub mod languages;
pub mod query;
pub mod repository;

pub use ids::RepositoryId;
pub use languages::{LanguageHistogram, LanguageResult};
pub use query::SearchQuery;
pub use repository::RepositoryRecord;
