use crate::model::{LookupInfo, MatchResult, CATALOG_PROVIDER};
use async_trait::async_trait;

/// The host's generic "already known id" lookup, tried before any search.
#[async_trait]
pub trait StandardLookup: Send + Sync {
    async fn try_standard_lookup(&self, info: &LookupInfo) -> MatchResult;
}

/// Trusts a catalog id already present in the item's provider map.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProviderIdLookup;

#[async_trait]
impl StandardLookup for ProviderIdLookup {
    async fn try_standard_lookup(&self, info: &LookupInfo) -> MatchResult {
        match info.provider_id(CATALOG_PROVIDER).map(str::parse::<i64>) {
            Some(Ok(id)) if id > 0 => MatchResult::matched(id),
            _ => MatchResult::NO_MATCH,
        }
    }
}
