//! One-way mirror of local audio + ledger state to the dataset repository.

use crate::defaults;
use crate::error::Result;
use crate::hub::api::DatasetHub;
use crate::ledger::MetadataLedger;
use crate::store::SampleStore;

/// Publish the current local state to the remote repository.
///
/// Three steps, in order: ensure the repository exists (idempotent), mirror
/// the entire audio tree, upload the ledger as `metadata.csv`. The uploads
/// are independent network operations with no atomicity across them; a
/// failure in between leaves the remote partially updated. The full tree is
/// re-uploaded on every call, not incrementally.
pub async fn publish(
    hub: &dyn DatasetHub,
    store: &SampleStore,
    ledger: &MetadataLedger,
) -> Result<()> {
    hub.ensure_repo().await?;
    hub.upload_folder(&store.audio_dir()).await?;
    hub.upload_file(ledger.path(), defaults::REMOTE_METADATA_PATH)
        .await?;
    Ok(())
}
