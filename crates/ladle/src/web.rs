//! Web endpoints for ladle.
//!
//! JSON bodies, integer path ids. Storage detail is logged server-side
//! and never leaked into responses; the body of a failure is a generic
//! `{"error": ...}` object.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;

use ladleconf::AccessConfig;
use ladleproto::{Recipe, RecipeDraft, RecipeId, RecipePatch};
use larder::{Coordinator, LarderError, LoginLog, UpdateError};

use crate::ops::{self, OpError};

/// Shared state for web handlers.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Coordinator,
    /// Present only for deployments configured with an access gate.
    pub gate: Option<Arc<LoginGate>>,
}

/// Credential pair plus the last-login document it feeds.
pub struct LoginGate {
    pub access: AccessConfig,
    pub log: LoginLog,
}

pub fn router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(serve_root))
        .route("/health", get(health))
        .route("/api/recipes", get(list_recipes).post(create_recipe))
        .route("/api/recipes/import", post(import_recipes))
        .route("/api/recipes/{id}", put(update_recipe).delete(delete_recipe));

    if state.gate.is_some() {
        router = router.route("/api/login", post(login));
    }

    router.with_state(state)
}

/// Errors a handler can produce, mapped onto the response taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("recipe not found")]
    NotFound,

    #[error("{0}")]
    BadRequest(String),

    #[error("invalid credentials")]
    Unauthorized,

    #[error("collection changed since it was read, retry the request")]
    Conflict,

    #[error("storage failure")]
    Storage(#[source] LarderError),
}

impl From<LarderError> for ApiError {
    fn from(e: LarderError) -> Self {
        match e {
            LarderError::Conflict => ApiError::Conflict,
            other => ApiError::Storage(other),
        }
    }
}

impl From<UpdateError<OpError>> for ApiError {
    fn from(e: UpdateError<OpError>) -> Self {
        match e {
            UpdateError::Domain(OpError::NotFound(_)) => ApiError::NotFound,
            UpdateError::Storage(storage) => storage.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Conflict => StatusCode::CONFLICT,
            ApiError::Storage(source) => {
                tracing::error!(error = %source, "storage failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// Serve root discovery endpoint
async fn serve_root() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "ladle",
        "version": env!("CARGO_PKG_VERSION"),
        "links": {
            "recipes": "/api/recipes",
            "import": "/api/recipes/import",
            "health": "/health",
        }
    }))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    platform: Option<String>,
    category: Option<String>,
}

async fn list_recipes(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Recipe>>, ApiError> {
    let recipes = state.coordinator.read().await?;
    Ok(Json(ops::filter(
        &recipes,
        query.platform.as_deref(),
        query.category.as_deref(),
    )))
}

fn require_title(title: &str) -> Result<(), ApiError> {
    if title.trim().is_empty() {
        return Err(ApiError::BadRequest("title must not be empty".to_string()));
    }
    Ok(())
}

async fn create_recipe(
    State(state): State<AppState>,
    Json(draft): Json<RecipeDraft>,
) -> Result<(StatusCode, Json<Recipe>), ApiError> {
    require_title(&draft.title)?;

    let created = state
        .coordinator
        .perform_update(move |mut recipes| -> Result<_, OpError> {
            let created = ops::create(&mut recipes, draft);
            Ok((recipes, created))
        })
        .await?;

    tracing::info!(id = %created.id, title = %created.title, "recipe created");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn import_recipes(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<Vec<Recipe>>), ApiError> {
    let items = body
        .as_array()
        .ok_or_else(|| ApiError::BadRequest("import body must be an array".to_string()))?
        .clone();

    let mut batch = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let draft: RecipeDraft = serde_json::from_value(item)
            .map_err(|e| ApiError::BadRequest(format!("invalid recipe at index {index}: {e}")))?;
        require_title(&draft.title)?;
        batch.push(draft);
    }

    let appended = state
        .coordinator
        .perform_update(move |mut recipes| -> Result<_, OpError> {
            let appended = ops::import(&mut recipes, batch);
            Ok((recipes, appended))
        })
        .await?;

    tracing::info!(records = appended.len(), "recipes imported");
    Ok((StatusCode::CREATED, Json(appended)))
}

async fn update_recipe(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<RecipePatch>,
) -> Result<Json<Recipe>, ApiError> {
    if let Some(title) = &patch.title {
        require_title(title)?;
    }

    let merged = state
        .coordinator
        .perform_update(move |mut recipes| {
            let merged = ops::update(&mut recipes, RecipeId(id), &patch)?;
            Ok((recipes, merged))
        })
        .await?;

    tracing::info!(id = %merged.id, "recipe updated");
    Ok(Json(merged))
}

async fn delete_recipe(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state
        .coordinator
        .perform_update(move |mut recipes| -> Result<_, OpError> {
            ops::delete(&mut recipes, RecipeId(id));
            Ok((recipes, ()))
        })
        .await?;

    tracing::info!(id, "recipe deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<StatusCode, ApiError> {
    // Route is only mounted when the gate exists
    let Some(gate) = &state.gate else {
        return Err(ApiError::Unauthorized);
    };

    if request.username != gate.access.username || request.password != gate.access.password {
        tracing::warn!(username = %request.username, "rejected login");
        return Err(ApiError::Unauthorized);
    }

    // The timestamp log is informational; a write failure must not
    // block the login itself
    if let Err(e) = gate.log.record(&request.username) {
        tracing::warn!(error = %e, "failed to record login timestamp");
    }

    Ok(StatusCode::NO_CONTENT)
}
