//! Resolve a canonical film catalog id from a name, an optional year and an
//! optional cross-reference id, using a cascade of heuristics over keyword
//! search results.

pub mod batch;
pub mod cancel;
pub mod catalog;
pub mod error;
pub mod filter;
pub mod heuristics;
pub mod model;
pub mod pipeline;
pub mod similarity;
pub mod standard;

#[cfg(test)]
pub(crate) mod testing;

pub use cancel::{cancel_pair, CancelHandle, CancelToken};
pub use catalog::{CatalogClient, ClientConfig, HttpCatalog};
pub use error::{CatalogError, Cancelled, ResolveError};
pub use model::{Candidate, FullRecord, LookupInfo, MatchResult, SearchPage};
pub use pipeline::{Outcome, Resolver, Stage};
pub use standard::{ProviderIdLookup, StandardLookup};
