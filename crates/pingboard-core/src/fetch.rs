use crate::error::Result;
use crate::store::{ProfileAction, ProfileStore};
use crate::types::{FetchResult, ProfileRecord};
use async_trait::async_trait;
use log::{debug, warn};
use std::sync::Arc;

/// Source of directory profiles, one request per identifier.
#[async_trait]
pub trait ProfileFetcher: Send + Sync {
    /// `Ok(None)` means the directory has no record for `identifier`.
    async fn fetch(&self, identifier: &str) -> Result<Option<ProfileRecord>>;
}

#[async_trait]
impl<T: ProfileFetcher + ?Sized> ProfileFetcher for Arc<T> {
    async fn fetch(&self, identifier: &str) -> Result<Option<ProfileRecord>> {
        (**self).fetch(identifier).await
    }
}

/// Fetch a profile and record the outcome in `store`.
///
/// Found and confirmed-absent results overwrite any previous entry for
/// `identifier`. Any other failure is returned untouched and the store is
/// left as it was, so a later call can retry. Concurrent calls for the same
/// identifier are not collapsed; whichever resolves last wins.
pub async fn fetch_and_store<F>(
    fetcher: &F,
    store: &ProfileStore,
    identifier: &str,
) -> Result<FetchResult>
where
    F: ProfileFetcher + ?Sized,
{
    let profile = match fetcher.fetch(identifier).await {
        Ok(profile) => profile,
        Err(e) => {
            warn!("Profile fetch for '{}' failed: {}", identifier, e);
            return Err(e);
        }
    };

    debug!(
        "Profile fetch for '{}' completed (found={})",
        identifier,
        profile.is_some()
    );

    let result = FetchResult { profile };
    store.dispatch(ProfileAction::Received {
        identifier: identifier.to_string(),
        result: result.clone(),
    });
    Ok(result)
}
