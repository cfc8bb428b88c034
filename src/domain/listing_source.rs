//! Port to the exported listing pages

use std::path::Path;

use super::deletion::RawReference;
use super::errors::PurgeResult;

/// Reads one export directory and yields its references in page order.
pub trait ListingSource: Send + Sync {
    fn extract(&self, directory: &Path) -> PurgeResult<Vec<RawReference>>;
}
