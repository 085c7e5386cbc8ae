//! HTTP transport to the ladle server.
//!
//! [`RecipeTransport`] is the seam between the session controller and
//! the network: the real implementation wraps reqwest, tests substitute
//! an in-memory fake.

use async_trait::async_trait;
use ladleproto::{Recipe, RecipeDraft, RecipeId, RecipePatch};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("recipe not found on the server")]
    NotFound,

    #[error("server rejected the request ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("could not reach the server: {0}")]
    Network(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        TransportError::Network(e.to_string())
    }
}

/// The server operations the session controller needs.
#[async_trait]
pub trait RecipeTransport: Send + Sync {
    async fn list(&self) -> Result<Vec<Recipe>, TransportError>;
    async fn create(&self, draft: RecipeDraft) -> Result<Recipe, TransportError>;
    async fn update(&self, id: RecipeId, patch: &RecipePatch) -> Result<Recipe, TransportError>;
    async fn delete(&self, id: RecipeId) -> Result<(), TransportError>;
    async fn import(&self, drafts: Vec<RecipeDraft>) -> Result<Vec<Recipe>, TransportError>;
    async fn login(&self, username: &str, password: &str) -> Result<(), TransportError>;
}

/// reqwest-backed transport against a running server.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Pull the server's `{"error": ...}` message out of a failure body.
async fn error_for(response: reqwest::Response) -> TransportError {
    let status = response.status().as_u16();
    if status == 404 {
        return TransportError::NotFound;
    }
    let message = match response.json::<serde_json::Value>().await {
        Ok(body) => body["error"].as_str().unwrap_or("unknown error").to_string(),
        Err(_) => "unknown error".to_string(),
    };
    TransportError::Status { status, message }
}

#[async_trait]
impl RecipeTransport for HttpTransport {
    async fn list(&self) -> Result<Vec<Recipe>, TransportError> {
        let response = self.client.get(self.url("/api/recipes")).send().await?;
        if !response.status().is_success() {
            return Err(error_for(response).await);
        }
        Ok(response.json().await?)
    }

    async fn create(&self, draft: RecipeDraft) -> Result<Recipe, TransportError> {
        let response = self
            .client
            .post(self.url("/api/recipes"))
            .json(&draft)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(error_for(response).await);
        }
        Ok(response.json().await?)
    }

    async fn update(&self, id: RecipeId, patch: &RecipePatch) -> Result<Recipe, TransportError> {
        let response = self
            .client
            .put(self.url(&format!("/api/recipes/{id}")))
            .json(patch)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(error_for(response).await);
        }
        Ok(response.json().await?)
    }

    async fn delete(&self, id: RecipeId) -> Result<(), TransportError> {
        let response = self
            .client
            .delete(self.url(&format!("/api/recipes/{id}")))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(error_for(response).await);
        }
        Ok(())
    }

    async fn import(&self, drafts: Vec<RecipeDraft>) -> Result<Vec<Recipe>, TransportError> {
        let response = self
            .client
            .post(self.url("/api/recipes/import"))
            .json(&drafts)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(error_for(response).await);
        }
        Ok(response.json().await?)
    }

    async fn login(&self, username: &str, password: &str) -> Result<(), TransportError> {
        let response = self
            .client
            .post(self.url("/api/login"))
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(error_for(response).await);
        }
        Ok(())
    }
}
