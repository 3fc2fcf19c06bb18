//! The individual disambiguation heuristics run by the resolver.
//!
//! Each one returns a [`MatchResult`]; the network-backed ones can also be
//! interrupted by cancellation. A failed record fetch only removes that
//! candidate from consideration.

use crate::cancel::CancelToken;
use crate::catalog::CatalogClient;
use crate::error::Cancelled;
use crate::model::{Candidate, FullRecord, LookupInfo, MatchResult};
use crate::similarity::titles_match;
use log::{debug, error};

/// Number of leading candidates the name matcher is allowed to fetch.
pub const NAME_MATCH_LIMIT: usize = 4;

pub fn single_survivor(candidates: &[Candidate]) -> MatchResult {
    match candidates {
        [only] => MatchResult::matched(only.id),
        _ => MatchResult::NO_MATCH,
    }
}

/// Fetches a record, logging and swallowing catalog errors.
async fn fetch_record(
    catalog: &dyn CatalogClient,
    candidate: &Candidate,
    cancel: &CancelToken,
) -> Result<Option<FullRecord>, Cancelled> {
    match cancel.guard(catalog.get_full_record(candidate.id)).await? {
        Ok(record) => Ok(Some(record)),
        Err(e) => {
            error!(
                "fetching record {} ({:?}) failed, skipping: {e}",
                candidate.id, candidate.name
            );
            Ok(None)
        }
    }
}

/// Accepts the first candidate whose record carries the target's
/// secondary-catalog id.
pub async fn cross_reference(
    catalog: &dyn CatalogClient,
    info: &LookupInfo,
    candidates: &[Candidate],
    cancel: &CancelToken,
) -> Result<MatchResult, Cancelled> {
    let Some(wanted) = info.secondary_id() else {
        debug!("cross-reference: no secondary id on {:?}", info.name);
        return Ok(MatchResult::NO_MATCH);
    };
    for candidate in candidates {
        let Some(record) = fetch_record(catalog, candidate, cancel).await? else {
            continue;
        };
        let found = record.secondary_id.as_deref().map(str::trim);
        if found == Some(wanted) {
            debug!("cross-reference: {} carries {wanted}", candidate.id);
            return Ok(MatchResult::matched(candidate.id));
        }
        debug!("cross-reference: {} carries {:?}, want {wanted}", candidate.id, found);
    }
    Ok(MatchResult::NO_MATCH)
}

/// Compares the target name with the localized names of the first
/// [`NAME_MATCH_LIMIT`] candidates.
pub async fn name_match(
    catalog: &dyn CatalogClient,
    info: &LookupInfo,
    candidates: &[Candidate],
    cancel: &CancelToken,
) -> Result<MatchResult, Cancelled> {
    let target = info.name.trim();
    for candidate in candidates.iter().take(NAME_MATCH_LIMIT) {
        let Some(record) = fetch_record(catalog, candidate, cancel).await? else {
            continue;
        };
        if let Some(name) = record
            .localized_names
            .iter()
            .find(|name| titles_match(target, name))
        {
            debug!("name match: {target:?} ~ {name:?} ({})", candidate.id);
            return Ok(MatchResult::matched(candidate.id));
        }
    }
    Ok(MatchResult::NO_MATCH)
}
