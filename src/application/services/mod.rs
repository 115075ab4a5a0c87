mod selection;
mod votes;

pub use selection::SelectionService;
pub use votes::{VoteService, VoteSubmission};
