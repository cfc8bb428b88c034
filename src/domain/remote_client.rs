//! Port to the remote API that performs the actual deletions

use async_trait::async_trait;

use super::errors::DeleteError;

/// Remote delete operations.
///
/// Implementations must tolerate being called concurrently up to the
/// configured task cap.
#[async_trait]
pub trait RemoteDeleteClient: Send + Sync {
    /// Delete comment `item_id` left on the wall of `owner_id`
    async fn delete_comment(&self, owner_id: &str, item_id: &str) -> Result<(), DeleteError>;

    /// Remove a like from object `kind` `owner_id`_`item_id`
    async fn delete_reaction(
        &self,
        kind: &str,
        owner_id: &str,
        item_id: &str,
    ) -> Result<(), DeleteError>;
}
