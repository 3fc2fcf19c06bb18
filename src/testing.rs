use crate::catalog::CatalogClient;
use crate::error::CatalogError;
use crate::model::{Candidate, FullRecord, SearchPage};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// In-memory catalog. Ids without a record fail with `NotFound`.
#[derive(Default)]
pub(crate) struct FakeCatalog {
    pub candidates: Vec<Candidate>,
    pub fail_search: bool,
    pub records: HashMap<i64, FullRecord>,
    pub fetched: Mutex<Vec<i64>>,
    pub searches: AtomicUsize,
}

impl FakeCatalog {
    pub fn with_candidates(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates,
            ..Self::default()
        }
    }

    pub fn record(mut self, id: i64, names: &[&str], secondary: Option<&str>) -> Self {
        self.records.insert(
            id,
            FullRecord {
                id,
                localized_names: names.iter().map(|n| n.to_string()).collect(),
                secondary_id: secondary.map(str::to_string),
            },
        );
        self
    }

    pub fn fetched(&self) -> Vec<i64> {
        self.fetched.lock().unwrap().clone()
    }

    pub fn search_count(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogClient for FakeCatalog {
    async fn search_by_keyword(&self, _name: &str, _page: u32) -> Result<SearchPage, CatalogError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        if self.fail_search {
            return Err(CatalogError::Status {
                url: "fake://search".to_string(),
                status: 503,
            });
        }
        Ok(SearchPage {
            total_count: self.candidates.len() as u32,
            candidates: self.candidates.clone(),
        })
    }

    async fn get_full_record(&self, id: i64) -> Result<FullRecord, CatalogError> {
        self.fetched.lock().unwrap().push(id);
        self.records
            .get(&id)
            .cloned()
            .ok_or(CatalogError::NotFound(id))
    }
}
