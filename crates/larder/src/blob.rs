//! BlobStore: the collection document as one named object behind an
//! HTTP blob store.
//!
//! The store is assumed to be eventually consistent: a read shortly
//! after a write may return stale bytes, and a read can fail transiently
//! while the store propagates. Loads therefore retry a bounded number of
//! times with a fixed backoff, and after exhausting retries the read
//! path degrades to an empty collection so the UI keeps working. That
//! choice trades consistency for availability on reads only: a degraded
//! load carries [`Revision::Absent`], which can never satisfy the
//! conditional save against an existing object, so the mutation path
//! cannot erase data off a degraded read. Save errors always propagate.

use std::time::Duration;

use async_trait::async_trait;
use ladleproto::Recipe;
use reqwest::header::{CONTENT_TYPE, ETAG, IF_MATCH, IF_NONE_MATCH};
use reqwest::StatusCode;

use crate::store::{encode_document, CollectionStore, Revision, Versioned};
use crate::LarderError;

/// Collection document stored as a single remote object.
#[derive(Debug, Clone)]
pub struct BlobStore {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
    load_retries: u32,
    backoff: Duration,
}

enum LoadAttempt {
    Done(Versioned),
    Fatal(LarderError),
    Transient(String),
}

impl BlobStore {
    pub fn new(
        url: impl Into<String>,
        token: Option<String>,
        load_retries: u32,
        retry_backoff_ms: u64,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            token,
            load_retries,
            backoff: Duration::from_millis(retry_backoff_ms),
        }
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn attempt_load(&self) -> LoadAttempt {
        let response = match self.authorize(self.client.get(&self.url)).send().await {
            Ok(response) => response,
            Err(e) => return LoadAttempt::Transient(e.to_string()),
        };

        // The object not existing yet is a normal case, not an error
        if response.status() == StatusCode::NOT_FOUND {
            return LoadAttempt::Done(Versioned::empty());
        }
        if !response.status().is_success() {
            return LoadAttempt::Transient(format!("GET {} -> {}", self.url, response.status()));
        }

        let etag = response
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => return LoadAttempt::Transient(e.to_string()),
        };

        if bytes.is_empty() {
            return LoadAttempt::Done(Versioned {
                recipes: Vec::new(),
                revision: etag.map(Revision::Present).unwrap_or(Revision::Absent),
            });
        }

        // Corrupt content is fatal: retrying will not fix a bad document,
        // and treating it as empty would invite the next save to erase it
        match serde_json::from_slice(&bytes) {
            Ok(recipes) => LoadAttempt::Done(Versioned {
                recipes,
                revision: etag
                    .map(Revision::Present)
                    .unwrap_or_else(|| Revision::of_bytes(&bytes)),
            }),
            Err(e) => LoadAttempt::Fatal(LarderError::Corrupt(format!("{}: {e}", self.url))),
        }
    }

    /// One unconditional read of the current revision, used when the
    /// store returned no ETag and the conditional save has to compare
    /// digests itself.
    async fn current_revision(&self) -> Result<Revision, LarderError> {
        let response = self
            .authorize(self.client.get(&self.url))
            .send()
            .await
            .map_err(|e| LarderError::Transport(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Revision::Absent);
        }
        if !response.status().is_success() {
            return Err(LarderError::Transport(format!(
                "GET {} -> {}",
                self.url,
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| LarderError::Transport(e.to_string()))?;
        Ok(Revision::of_bytes(&bytes))
    }
}

#[async_trait]
impl CollectionStore for BlobStore {
    async fn load(&self) -> Result<Versioned, LarderError> {
        let attempts = self.load_retries.max(1);
        for attempt in 1..=attempts {
            match self.attempt_load().await {
                LoadAttempt::Done(versioned) => return Ok(versioned),
                LoadAttempt::Fatal(e) => return Err(e),
                LoadAttempt::Transient(reason) => {
                    tracing::warn!(attempt, attempts, %reason, "blob load failed");
                    if attempt < attempts {
                        tokio::time::sleep(self.backoff).await;
                    }
                }
            }
        }

        // Availability over consistency, on the read path only
        tracing::error!(url = %self.url, "blob load exhausted retries, serving empty collection");
        Ok(Versioned::empty())
    }

    async fn save(&self, recipes: &[Recipe], expected: &Revision) -> Result<Revision, LarderError> {
        let bytes = encode_document(recipes);

        let mut req = self
            .authorize(self.client.put(&self.url))
            .header(CONTENT_TYPE, "application/json")
            .body(bytes.clone());

        match expected {
            Revision::Absent => {
                req = req.header(IF_NONE_MATCH, "*");
            }
            Revision::Present(tag) if !expected.is_digest() => {
                req = req.header(IF_MATCH, tag.clone());
            }
            Revision::Present(_) => {
                // No ETag support observed on load: fall back to one
                // unconditional re-read and a digest comparison. Narrower
                // than If-Match but the best this store offers.
                if self.current_revision().await? != *expected {
                    return Err(LarderError::Conflict);
                }
            }
        }

        let response = req
            .send()
            .await
            .map_err(|e| LarderError::Transport(e.to_string()))?;

        if response.status() == StatusCode::PRECONDITION_FAILED {
            return Err(LarderError::Conflict);
        }
        if !response.status().is_success() {
            return Err(LarderError::Transport(format!(
                "PUT {} -> {}",
                self.url,
                response.status()
            )));
        }

        let revision = response
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(|v| Revision::Present(v.to_string()))
            .unwrap_or_else(|| Revision::of_bytes(&bytes));

        tracing::debug!(url = %self.url, records = recipes.len(), "collection saved to blob");
        Ok(revision)
    }
}
