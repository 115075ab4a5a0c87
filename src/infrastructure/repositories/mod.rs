pub mod images;
pub mod prompts;
pub mod stats;
pub mod votes;
