//! Catalog access: the client trait the resolver depends on, and an HTTP/JSON
//! implementation of it.

use crate::error::CatalogError;
use crate::model::{Candidate, FullRecord, SearchPage};
use async_trait::async_trait;
use log::debug;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// One page of keyword search results.
    async fn search_by_keyword(&self, name: &str, page: u32) -> Result<SearchPage, CatalogError>;

    /// Full record for a single catalog id.
    async fn get_full_record(&self, id: i64) -> Result<FullRecord, CatalogError>;
}

pub const DEFAULT_API_BASE: &str = "http://localhost:8080/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: concat!("filmmatch/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    total: u32,
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: i64,
    #[serde(default)]
    title: String,
    year: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MovieResponse {
    id: i64,
    #[serde(default)]
    title: String,
    original_title: Option<String>,
    aka: Option<Vec<String>>,
    imdb: Option<String>,
}

impl From<SearchResponse> for SearchPage {
    fn from(resp: SearchResponse) -> Self {
        SearchPage {
            total_count: resp.total,
            candidates: resp
                .items
                .into_iter()
                .map(|item| Candidate {
                    id: item.id,
                    name: item.title,
                    year: item.year.unwrap_or_default(),
                })
                .collect(),
        }
    }
}

impl From<MovieResponse> for FullRecord {
    fn from(resp: MovieResponse) -> Self {
        let mut names: Vec<String> = Vec::new();
        let all = std::iter::once(resp.title)
            .chain(resp.original_title)
            .chain(resp.aka.unwrap_or_default());
        for name in all {
            let name = name.trim();
            if !name.is_empty() && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        FullRecord {
            id: resp.id,
            localized_names: names,
            secondary_id: resp
                .imdb
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        }
    }
}

fn decode<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, CatalogError> {
    let de = &mut serde_json::Deserializer::from_str(body);
    serde_path_to_error::deserialize(de).map_err(|source| CatalogError::Decode {
        url: url.to_string(),
        source,
    })
}

/// Catalog client speaking the JSON search/movie API.
pub struct HttpCatalog {
    client: reqwest::Client,
    base: String,
}

impl HttpCatalog {
    pub fn new(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    async fn get_text(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<(StatusCode, String), CatalogError> {
        let transport = |source| CatalogError::Transport {
            url: url.to_string(),
            source,
        };
        let mut req = self.client.get(url);
        if !query.is_empty() {
            req = req.query(query);
        }
        let resp = req.send().await.map_err(transport)?;
        let status = resp.status();
        let body = resp.text().await.map_err(transport)?;
        Ok((status, body))
    }
}

#[async_trait]
impl CatalogClient for HttpCatalog {
    async fn search_by_keyword(&self, name: &str, page: u32) -> Result<SearchPage, CatalogError> {
        let url = format!("{}/search", self.base);
        let (status, body) = self
            .get_text(&url, &[("q", name.to_string()), ("page", page.to_string())])
            .await?;
        if !status.is_success() {
            return Err(CatalogError::Status {
                url,
                status: status.as_u16(),
            });
        }
        let resp: SearchResponse = decode(&url, &body)?;
        debug!("search {name:?} page {page}: {} hits", resp.total);
        Ok(resp.into())
    }

    async fn get_full_record(&self, id: i64) -> Result<FullRecord, CatalogError> {
        let url = format!("{}/movie/{id}", self.base);
        let (status, body) = self.get_text(&url, &[]).await?;
        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(id));
        }
        if !status.is_success() {
            return Err(CatalogError::Status {
                url,
                status: status.as_u16(),
            });
        }
        let resp: MovieResponse = decode(&url, &body)?;
        Ok(resp.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_body_maps_to_candidates() {
        let body = r#"{"total": 2, "items": [
            {"id": 3541415, "title": "盗梦空间", "year": "2010"},
            {"id": 4160540, "title": "Inception: The Cobol Job", "year": null}
        ]}"#;
        let page: SearchPage = decode::<SearchResponse>("u", body).unwrap().into();
        assert_eq!(page.total_count, 2);
        assert_eq!(
            page.candidates,
            vec![
                Candidate::new(3541415, "盗梦空间", "2010"),
                Candidate::new(4160540, "Inception: The Cobol Job", ""),
            ]
        );
    }

    #[test]
    fn empty_search_body_is_an_empty_page() {
        let page: SearchPage = decode::<SearchResponse>("u", "{}").unwrap().into();
        assert_eq!(page, SearchPage::default());
    }

    #[test]
    fn movie_body_collects_distinct_names() {
        let body = r#"{"id": 3541415, "title": "盗梦空间", "original_title": "Inception",
            "aka": ["潜行凶间", "Inception", " ", "全面启动"], "imdb": "tt1375666"}"#;
        let record: FullRecord = decode::<MovieResponse>("u", body).unwrap().into();
        assert_eq!(record.id, 3541415);
        assert_eq!(
            record.localized_names,
            vec!["盗梦空间", "Inception", "潜行凶间", "全面启动"]
        );
        assert_eq!(record.secondary_id.as_deref(), Some("tt1375666"));
    }

    #[test]
    fn blank_imdb_is_absent() {
        let body = r#"{"id": 1, "title": "Heat", "imdb": ""}"#;
        let record: FullRecord = decode::<MovieResponse>("u", body).unwrap().into();
        assert_eq!(record.secondary_id, None);
    }

    #[test]
    fn decode_error_reports_the_path() {
        let body = r#"{"total": 1, "items": [{"id": "not-a-number", "title": "x"}]}"#;
        let err = decode::<SearchResponse>("http://x/search", body).unwrap_err();
        match &err {
            CatalogError::Decode { url, source } => {
                assert_eq!(url, "http://x/search");
                assert_eq!(source.path().to_string(), "items[0].id");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn base_url_loses_trailing_slash() {
        let config = ClientConfig {
            api_base: "http://catalog.local/api/".to_string(),
            ..ClientConfig::default()
        };
        let catalog = HttpCatalog::new(&config).unwrap();
        assert_eq!(catalog.base, "http://catalog.local/api");
    }
}
