use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tempreg_repo::Instance;
use tempreg_types::DatasetRef;

use crate::error::RegistryResult;

pub const DEFAULT_LIMIT: usize = 25;

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

impl SearchParams {
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub reference: DatasetRef,
    pub title: String,
    pub description: String,
}

#[async_trait]
pub trait Searchable: Send + Sync {
    async fn search(&self, params: &SearchParams) -> RegistryResult<Vec<SearchResult>>;
}

/// Scans the head version of every local dataset. An empty query matches
/// everything.
#[derive(Clone, Debug)]
pub struct RepoSearch {
    instance: Instance,
}

impl RepoSearch {
    pub fn new(instance: Instance) -> Self {
        Self { instance }
    }
}

#[async_trait]
impl Searchable for RepoSearch {
    async fn search(&self, params: &SearchParams) -> RegistryResult<Vec<SearchResult>> {
        let repo = self.instance.repo();
        let needle = params.q.to_lowercase();
        let mut results = Vec::new();
        for reference in repo.list()? {
            let ds = repo.get(&reference)?;
            let meta = ds.meta.unwrap_or_default();
            let matches = needle.is_empty()
                || [&ds.name, &meta.title, &meta.description]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle));
            if matches {
                results.push(SearchResult {
                    reference,
                    title: meta.title,
                    description: meta.description,
                });
            }
        }
        Ok(results
            .into_iter()
            .skip(params.offset)
            .take(params.limit)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use tempreg_crypto::CryptoSource;
    use tempreg_repo::{Dataset, Meta, SaveParams};

    fn instance() -> Instance {
        let inst = Instance::in_memory(&CryptoSource).unwrap();
        for (name, title) in [("synths", "Synthesizers"), ("drums", "Drum machines"), ("keys", "Keyboards")] {
            inst.repo()
                .save(SaveParams {
                    reference: format!("me/{name}"),
                    dataset: Dataset {
                        meta: Some(Meta::new(title, "instruments")),
                        ..Default::default()
                    },
                    body: Bytes::from_static(b"a\n1\n"),
                })
                .unwrap();
        }
        inst
    }

    #[tokio::test]
    async fn matches_title_case_insensitively() {
        let results = RepoSearch::new(instance())
            .search(&SearchParams::new("SYNTH"))
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].reference.name, "synths");
    }

    #[tokio::test]
    async fn empty_query_pages_through_everything() {
        let search = RepoSearch::new(instance());
        let all = search.search(&SearchParams::new("")).await.unwrap();
        assert_eq!(all.len(), 3);

        let page = search
            .search(&SearchParams {
                q: "instruments".into(),
                limit: 1,
                offset: 1,
            })
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0], all[1]);
    }

    #[test]
    fn params_defaults() {
        let p: SearchParams = serde_json::from_str("{}").unwrap();
        assert_eq!(p, SearchParams::new(""));
    }
}
