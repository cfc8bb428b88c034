//! Application layer - parsing, pacing and dispatch of deletions
//!
//! Coordinates domain types for a single purge run. I/O is reached only
//! through the `ListingSource` and `RemoteDeleteClient` ports.

pub mod batch_config;
pub mod deletion_run;
pub mod dispatch_engine;
pub mod outcome;
pub mod progress_sink;
pub mod target_parser;

// Re-export commonly used items
pub use batch_config::{BatchConfiguration, Pacing};
pub use deletion_run::{DeletionRun, RunPlan, RunReport, SkippedCategory};
pub use dispatch_engine::{DispatchEngine, DispatchReport};
pub use outcome::{AttemptOutcome, api_error_message, render_progress_line};
pub use progress_sink::{MemorySink, ProgressSink, WriterSink};
pub use target_parser::{ParsedListing, parse_comment_targets, parse_listing, parse_reaction_targets};
