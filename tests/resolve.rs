use async_trait::async_trait;
use filmmatch::model::SECONDARY_PROVIDER;
use filmmatch::{
    cancel_pair, CancelToken, Candidate, CatalogClient, CatalogError, FullRecord, LookupInfo,
    MatchResult, ProviderIdLookup, ResolveError, Resolver, SearchPage, StandardLookup,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct ScriptedCatalog {
    candidates: Vec<Candidate>,
    search_status: Option<u16>,
    records: HashMap<i64, FullRecord>,
    slow_fetch: bool,
    searches: AtomicUsize,
    fetched: Mutex<Vec<i64>>,
}

impl ScriptedCatalog {
    fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates,
            ..Self::default()
        }
    }

    fn with_record(mut self, id: i64, names: &[&str], imdb: Option<&str>) -> Self {
        self.records.insert(
            id,
            FullRecord {
                id,
                localized_names: names.iter().map(|s| s.to_string()).collect(),
                secondary_id: imdb.map(str::to_string),
            },
        );
        self
    }
}

#[async_trait]
impl CatalogClient for ScriptedCatalog {
    async fn search_by_keyword(&self, _name: &str, page: u32) -> Result<SearchPage, CatalogError> {
        assert_eq!(page, 1);
        self.searches.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.search_status {
            return Err(CatalogError::Status {
                url: "scripted://search".into(),
                status,
            });
        }
        Ok(SearchPage {
            total_count: self.candidates.len() as u32,
            candidates: self.candidates.clone(),
        })
    }

    async fn get_full_record(&self, id: i64) -> Result<FullRecord, CatalogError> {
        self.fetched.lock().unwrap().push(id);
        if self.slow_fetch {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        self.records.get(&id).cloned().ok_or(CatalogError::NotFound(id))
    }
}

struct NeverKnown;

#[async_trait]
impl StandardLookup for NeverKnown {
    async fn try_standard_lookup(&self, _info: &LookupInfo) -> MatchResult {
        MatchResult::NO_MATCH
    }
}

fn resolver(catalog: &Arc<ScriptedCatalog>) -> Resolver {
    Resolver::new(catalog.clone(), Arc::new(NeverKnown))
}

#[tokio::test]
async fn empty_name_never_searches() {
    let catalog = Arc::new(ScriptedCatalog::new(vec![Candidate::new(1, "x", "2010")]));
    for name in ["", "   \t"] {
        let result = resolver(&catalog)
            .resolve(&LookupInfo::new(name).with_year(2010), &CancelToken::never())
            .await
            .unwrap();
        assert_eq!(result, MatchResult::NO_MATCH);
    }
    assert_eq!(catalog.searches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn zero_candidates_stops_the_cascade() {
    let catalog = Arc::new(ScriptedCatalog::new(vec![]));
    let info = LookupInfo::new("Inception")
        .with_year(2010)
        .with_provider_id(SECONDARY_PROVIDER, "tt1375666");
    let result = resolver(&catalog)
        .resolve(&info, &CancelToken::never())
        .await
        .unwrap();
    assert!(!result.succeeded);
    assert_eq!(catalog.searches.load(Ordering::SeqCst), 1);
    assert!(catalog.fetched.lock().unwrap().is_empty());
}

#[tokio::test]
async fn search_failure_propagates() {
    let catalog = Arc::new(ScriptedCatalog {
        search_status: Some(502),
        ..ScriptedCatalog::default()
    });
    let err = resolver(&catalog)
        .resolve(&LookupInfo::new("Inception"), &CancelToken::never())
        .await
        .unwrap_err();
    match err {
        ResolveError::Search(CatalogError::Status { status, .. }) => assert_eq!(status, 502),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn single_raw_result_needs_year_corroboration() {
    let catalog = Arc::new(ScriptedCatalog::new(vec![Candidate::new(9, "Heat", "1995")]));
    let result = resolver(&catalog)
        .resolve(&LookupInfo::new("Heat"), &CancelToken::never())
        .await
        .unwrap();
    assert_eq!(result, MatchResult::NO_MATCH);

    let result = resolver(&catalog)
        .resolve(&LookupInfo::new("Heat").with_year(1995), &CancelToken::never())
        .await
        .unwrap();
    assert_eq!(result, MatchResult::matched(9));
}

#[tokio::test]
async fn cross_reference_survives_a_failed_fetch() {
    let catalog = Arc::new(
        ScriptedCatalog::new(vec![
            Candidate::new(1, "Inception", "2010"),
            Candidate::new(2, "Inception", "2010"),
        ])
        .with_record(2, &["盗梦空间"], Some("tt1375666")),
    );
    let info = LookupInfo::new("Inception")
        .with_year(2010)
        .with_provider_id(SECONDARY_PROVIDER, "tt1375666");
    let result = resolver(&catalog)
        .resolve(&info, &CancelToken::never())
        .await
        .unwrap();
    assert_eq!(result, MatchResult::matched(2));
}

#[tokio::test]
async fn name_match_is_the_last_resort() {
    let catalog = Arc::new(
        ScriptedCatalog::new(vec![
            Candidate::new(1, "Interstellar", "2014"),
            Candidate::new(2, "The Prestige", "2006"),
        ])
        .with_record(1, &["星际穿越", "Interstellar"], None)
        .with_record(2, &["致命魔术", "The Prestige"], None),
    );
    let result = resolver(&catalog)
        .resolve(&LookupInfo::new("The Prestige"), &CancelToken::never())
        .await
        .unwrap();
    assert_eq!(result, MatchResult::matched(2));
    assert_eq!(*catalog.fetched.lock().unwrap(), vec![1, 2]);
}

#[tokio::test]
async fn fifth_candidate_is_never_examined() {
    let mut catalog = ScriptedCatalog::new(
        (1..=10)
            .map(|id| Candidate::new(id, "Inception", "2010"))
            .collect(),
    );
    catalog = catalog.with_record(5, &["Inception"], None);
    let catalog = Arc::new(catalog);
    let result = resolver(&catalog)
        .resolve(&LookupInfo::new("Inception"), &CancelToken::never())
        .await
        .unwrap();
    assert_eq!(result, MatchResult::NO_MATCH);
    assert_eq!(*catalog.fetched.lock().unwrap(), vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn cancellation_during_fetch_is_not_a_miss() {
    let catalog = Arc::new(ScriptedCatalog {
        slow_fetch: true,
        ..ScriptedCatalog::new(vec![
            Candidate::new(1, "Inception", "2010"),
            Candidate::new(2, "Inception", "2010"),
        ])
    });
    let info = LookupInfo::new("Inception")
        .with_year(2010)
        .with_provider_id(SECONDARY_PROVIDER, "tt1375666");
    let (handle, token) = cancel_pair();
    let resolver = resolver(&catalog);
    let pending = tokio::spawn(async move { resolver.resolve(&info, &token).await });
    tokio::time::sleep(Duration::from_millis(20)).await;
    handle.cancel();
    let err = pending.await.unwrap().unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(*catalog.fetched.lock().unwrap(), vec![1]);
}

#[tokio::test]
async fn known_catalog_id_skips_search() {
    let catalog = Arc::new(ScriptedCatalog::new(vec![Candidate::new(1, "x", "2010")]));
    let resolver = Resolver::new(catalog.clone(), Arc::new(ProviderIdLookup));
    let info = LookupInfo::new("Inception").with_provider_id("catalog", "3541415");
    let result = resolver.resolve(&info, &CancelToken::never()).await.unwrap();
    assert_eq!(result.resolved_id(), Some(3541415));
    assert_eq!(catalog.searches.load(Ordering::SeqCst), 0);
}
