//! Domain module - deletion targets, progress accounting and errors
//!
//! Nothing in here performs I/O.

pub mod deletion;
pub mod errors;
pub mod listing_source;
pub mod progress;
pub mod remote_client;

// Re-export commonly used items
pub use deletion::{
    CommentTarget, DeletionCategory, DeletionTarget, RawReference, ReactionTarget, WorkItem,
};
pub use errors::{ApiError, DeleteError, PurgeError, PurgeResult};
pub use listing_source::ListingSource;
pub use progress::{ProgressCounters, ProgressSnapshot, Tally};
pub use remote_client::RemoteDeleteClient;
