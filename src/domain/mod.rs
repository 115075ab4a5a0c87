pub mod errors;
pub mod ids;
pub mod images;
pub mod impressions;
pub mod prompts;
pub mod repositories;
pub mod selection;
pub mod stats;
pub mod votes;

// Re-exports
pub use errors::RepositoryError;
