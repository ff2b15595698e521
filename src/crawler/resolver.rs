//! Hi-res resolution
//!
//! Probes size-marker candidates in preference order and keeps the first
//! variant the origin actually serves.

use crate::crawler::Transport;
use crate::state::{Asset, HiResState};
use crate::storage::{ContentStore, StorageError};
use crate::url::{substitute_size_marker, url_filename};
use crate::{FetchError, HarvestError};
use url::Url;

/// Result of one resolution attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// The asset was already resolved; nothing was probed
    AlreadyResolved,

    /// The best candidate is the variant already stored
    AlreadyBest(Url),

    /// A better variant was downloaded and stored
    Downloaded(Url),

    /// No candidate was available; the asset stays unresolved
    Exhausted,
}

/// Resolves the best available variant of an asset
///
/// # Probe order
///
/// For each suffix, in order:
/// 1. Substitute it for the size marker of the known media URL
/// 2. If the resulting file name equals the known media file name, the known
///    variant is already the best one: resolve without downloading
/// 3. Otherwise fetch it; on success store it in the asset's bucket and
///    resolve, on failure try the next suffix
///
/// Exhausting the list is not an error. The asset stays unresolved and the
/// next hi-res pass probes again.
///
/// # Errors
///
/// Only local failures are returned: a missing content hash, a staged file
/// that could not be written, or a failure to move a downloaded file into the
/// store. The asset is left unresolved so the next pass probes it again.
pub async fn resolve_hi_res<T: Transport>(
    asset: &mut Asset,
    suffixes: &[String],
    transport: &T,
    content: &ContentStore,
) -> Result<ResolveOutcome, HarvestError> {
    if asset.hi_res_state() == HiResState::Resolved {
        return Ok(ResolveOutcome::AlreadyResolved);
    }

    let hash = asset
        .content_hash
        .clone()
        .ok_or_else(|| StorageError::MissingHash(asset.media_url.to_string()))?;

    for suffix in suffixes {
        let candidate = match substitute_size_marker(&asset.media_url, suffix) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Attempted hi res URL skipped: {}", e);
                continue;
            }
        };
        let filename = url_filename(&candidate);

        if filename == asset.media_filename {
            tracing::debug!("{} is already the best variant", asset.media_url);
            asset.mark_resolved(candidate.clone(), filename);
            return Ok(ResolveOutcome::AlreadyBest(candidate));
        }

        let staged = content.staging_path(&filename);
        match transport.fetch_to_file(&candidate, &staged).await {
            Ok(()) => {
                content.commit_staged(&filename, &hash)?;
                tracing::info!("Resolved {} to {}", asset.media_url, candidate);
                asset.mark_resolved(candidate.clone(), filename);
                return Ok(ResolveOutcome::Downloaded(candidate));
            }
            Err(e @ FetchError::Io { .. }) => {
                content.discard_staged(&filename);
                return Err(e.into());
            }
            Err(e) => {
                tracing::debug!("No {} variant: {}", suffix, e);
                content.discard_staged(&filename);
            }
        }
    }

    tracing::debug!("No hi res variant found for {}", asset.media_url);
    Ok(ResolveOutcome::Exhausted)
}
