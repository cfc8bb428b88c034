//! vk-purge - bulk deletion of VK comments and likes
//!
//! Reads the HTML pages of a VK data export, turns every listed comment or
//! like into a delete call and dispatches those calls in paced, bounded
//! batches while reporting per-category progress.

// Module declarations
pub mod domain;
pub mod application;
pub mod infrastructure;

#[cfg(test)]
pub mod test_utils;
