//! The resolution cascade.
//!
//! A resolution first trusts the host's standard lookup, then searches the
//! catalog by name and walks [`CASCADE`] until one stage produces a match.
//! Stages are ordered by confidence: year-corroborated evidence first, the
//! fuzzy name comparison last.

use crate::cancel::CancelToken;
use crate::catalog::CatalogClient;
use crate::error::{Cancelled, ResolveError};
use crate::filter::filter_by_year;
use crate::heuristics::{cross_reference, name_match, single_survivor};
use crate::model::{Candidate, LookupInfo, MatchResult};
use crate::standard::StandardLookup;
use log::{debug, info};
use std::fmt;
use std::sync::Arc;

const FIRST_PAGE: u32 = 1;
const STANDARD_LOOKUP: &str = "standard-lookup";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    YearFilteredSingleSurvivor,
    YearFilteredCrossReference,
    UnfilteredCrossReference,
    NameMatch,
}

/// Stages run after a successful search, in order, until one matches.
pub const CASCADE: [Stage; 4] = [
    Stage::YearFilteredSingleSurvivor,
    Stage::YearFilteredCrossReference,
    Stage::UnfilteredCrossReference,
    Stage::NameMatch,
];

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::YearFilteredSingleSurvivor => "year-single-survivor",
            Stage::YearFilteredCrossReference => "year-cross-reference",
            Stage::UnfilteredCrossReference => "cross-reference",
            Stage::NameMatch => "name-match",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A resolution result together with what decided it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub result: MatchResult,
    pub decided_by: Option<&'static str>,
}

impl Outcome {
    fn no_match() -> Self {
        Outcome {
            result: MatchResult::NO_MATCH,
            decided_by: None,
        }
    }
}

/// Candidate sets shared by the cascade stages of one resolution.
struct SearchContext<'a> {
    info: &'a LookupInfo,
    all: &'a [Candidate],
    by_year: Vec<Candidate>,
}

/// Holds only shared, read-only collaborators; one instance can serve many
/// concurrent resolutions.
#[derive(Clone)]
pub struct Resolver {
    catalog: Arc<dyn CatalogClient>,
    standard: Arc<dyn StandardLookup>,
}

impl Resolver {
    pub fn new(catalog: Arc<dyn CatalogClient>, standard: Arc<dyn StandardLookup>) -> Self {
        Self { catalog, standard }
    }

    pub async fn resolve(
        &self,
        info: &LookupInfo,
        cancel: &CancelToken,
    ) -> Result<MatchResult, ResolveError> {
        Ok(self.resolve_outcome(info, cancel).await?.result)
    }

    pub async fn resolve_outcome(
        &self,
        info: &LookupInfo,
        cancel: &CancelToken,
    ) -> Result<Outcome, ResolveError> {
        let standard = cancel
            .guard(self.standard.try_standard_lookup(info))
            .await?;
        if standard.succeeded {
            info!("{:?}: {} via {STANDARD_LOOKUP}", info.name, standard.resolved_id);
            return Ok(Outcome {
                result: standard,
                decided_by: Some(STANDARD_LOOKUP),
            });
        }

        let name = info.name.trim();
        if name.is_empty() {
            debug!("empty name, nothing to search for");
            return Ok(Outcome::no_match());
        }

        let page = cancel
            .guard(self.catalog.search_by_keyword(name, FIRST_PAGE))
            .await??;
        debug!(
            "{name:?}: {} candidates on page {FIRST_PAGE} of {} total",
            page.candidates.len(),
            page.total_count
        );
        if page.candidates.is_empty() {
            info!("{name:?}: no candidates");
            return Ok(Outcome::no_match());
        }

        let ctx = SearchContext {
            info,
            all: &page.candidates,
            by_year: filter_by_year(info.year, &page.candidates),
        };
        debug!(
            "{name:?}: {} of {} candidates match year {:?}",
            ctx.by_year.len(),
            ctx.all.len(),
            info.year
        );

        for stage in CASCADE {
            let result = self.run_stage(stage, &ctx, cancel).await?;
            debug!("{name:?}: {stage} -> {result:?}");
            if result.succeeded {
                info!("{name:?}: {} via {stage}", result.resolved_id);
                return Ok(Outcome {
                    result,
                    decided_by: Some(stage.name()),
                });
            }
        }

        info!("{name:?}: no confident match among {} candidates", ctx.all.len());
        Ok(Outcome::no_match())
    }

    async fn run_stage(
        &self,
        stage: Stage,
        ctx: &SearchContext<'_>,
        cancel: &CancelToken,
    ) -> Result<MatchResult, Cancelled> {
        let catalog = self.catalog.as_ref();
        match stage {
            Stage::YearFilteredSingleSurvivor => Ok(single_survivor(&ctx.by_year)),
            Stage::YearFilteredCrossReference => {
                cross_reference(catalog, ctx.info, &ctx.by_year, cancel).await
            }
            Stage::UnfilteredCrossReference => {
                cross_reference(catalog, ctx.info, ctx.all, cancel).await
            }
            Stage::NameMatch => name_match(catalog, ctx.info, ctx.all, cancel).await,
        }
    }
}
