//! Design API endpoints
//!
//! | Method | Path                 | Purpose                              |
//! |--------|----------------------|--------------------------------------|
//! | POST   | /api/design          | Generate tokens from a prompt        |
//! | POST   | /api/design/remix    | Revise the current tokens            |
//! | GET    | /api/design/current  | Current tokens                       |
//! | GET    | /api/theme           | Restore from `?theme=<compact>` (*)  |
//! | GET    | /api/theme/share     | Shareable link for current tokens    |
//! | GET    | /api/theme/export    | Download current tokens as JSON      |
//! | POST   | /api/theme/import    | Upload a theme file                  |
//! | GET    | /api/theme/css       | `:root` stylesheet                   |
//! | GET    | /api/theme/root      | Applied document root                |
//! | GET    | /api/schema          | JSON Schema of a token set           |
//! | GET    | /api/health          | Liveness                             |
//!
//! (*) Not safe in the HTTP sense: a decodable `theme` replaces the current
//! design for every client of this process, so a shared link applies as soon
//! as it is opened. Caches and prefetchers must not be pointed at it.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use dd_types::{token_set_schema, DesignRequest, ErrorBody, ShareResponse, TokensResponse};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use url::Url;

use crate::applicator::{spawn_applicator, DocumentRoot};
use crate::error::DesignError;
use crate::generation::{validate_prompt, DesignGenerator};
use crate::sharing;
use crate::store::DesignStore;
use crate::validator::TokenNormalizer;

type ApiError = (StatusCode, Json<ErrorBody>);

#[derive(Clone)]
pub struct AppState {
    store: DesignStore,
    /// `None` when no provider credential is configured
    generator: Option<Arc<DesignGenerator>>,
    normalizer: TokenNormalizer,
    public_url: Url,
    document: watch::Receiver<Arc<DocumentRoot>>,
}

impl AppState {
    /// Build the state and start the style applicator for `store`.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn new(
        store: DesignStore,
        generator: Option<Arc<DesignGenerator>>,
        normalizer: TokenNormalizer,
        public_url: Url,
    ) -> Self {
        let (document, _applicator) = spawn_applicator(&store);
        Self {
            store,
            generator,
            normalizer,
            public_url,
            document,
        }
    }

    pub fn store(&self) -> &DesignStore {
        &self.store
    }
}

// ============================================================================
// ERROR MAPPING
// ============================================================================

fn status_for(error: &DesignError) -> StatusCode {
    match error {
        DesignError::InvalidPrompt | DesignError::DecodeFailure(_) => StatusCode::BAD_REQUEST,
        DesignError::GenerationInProgress | DesignError::Superseded => StatusCode::CONFLICT,
        DesignError::ServiceUnavailable(_)
        | DesignError::MalformedResponse(_)
        | DesignError::IncompleteTokens { .. }
        | DesignError::InvalidColor { .. }
        | DesignError::InvalidEnum { .. }
        | DesignError::InvalidFontFamily { .. }
        | DesignError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn api_error(error: DesignError) -> ApiError {
    let status = status_for(&error);
    if status.is_server_error() {
        tracing::error!(error = %error, "Design request failed");
    } else {
        tracing::warn!(error = %error, "Design request rejected");
    }
    (
        status,
        Json(ErrorBody {
            error: error.user_message(),
        }),
    )
}

fn internal_error(message: impl std::fmt::Display) -> ApiError {
    tracing::error!("{}", message);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
}

fn prompt_from(body: Result<Json<DesignRequest>, JsonRejection>) -> Result<String, ApiError> {
    let request = body.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Unreadable design request body");
        api_error(DesignError::InvalidPrompt)
    })?;
    validate_prompt(request.0.prompt.as_deref())
        .map(str::to_string)
        .map_err(api_error)
}

fn generator_of(state: &AppState) -> Result<Arc<DesignGenerator>, ApiError> {
    state.generator.clone().ok_or_else(|| {
        api_error(DesignError::ServiceUnavailable(
            "no language model credential is set".into(),
        ))
    })
}

// ============================================================================
// GENERATION
// ============================================================================

/// POST /api/design
async fn generate_design(
    State(state): State<AppState>,
    body: Result<Json<DesignRequest>, JsonRejection>,
) -> Result<Json<TokensResponse>, ApiError> {
    let prompt = prompt_from(body)?;
    let generator = generator_of(&state)?;
    let ticket = state.store.begin_update().map_err(api_error)?;

    let normalized = generator.generate(&prompt).await.map_err(api_error)?;
    let tokens = ticket
        .complete(normalized.tokens)
        .ok_or_else(|| api_error(DesignError::Superseded))?;

    Ok(Json(TokensResponse {
        tokens: (*tokens).clone(),
    }))
}

/// POST /api/design/remix
async fn remix_design(
    State(state): State<AppState>,
    body: Result<Json<DesignRequest>, JsonRejection>,
) -> Result<Json<TokensResponse>, ApiError> {
    let prompt = prompt_from(body)?;
    let generator = generator_of(&state)?;
    let ticket = state.store.begin_update().map_err(api_error)?;

    let parent = state.store.current();
    let normalized = generator
        .remix(&prompt, &parent)
        .await
        .map_err(api_error)?;
    let tokens = ticket
        .complete(normalized.tokens)
        .ok_or_else(|| api_error(DesignError::Superseded))?;

    Ok(Json(TokensResponse {
        tokens: (*tokens).clone(),
    }))
}

/// GET /api/design/current
async fn current_design(State(state): State<AppState>) -> Json<TokensResponse> {
    Json(TokensResponse {
        tokens: (*state.store.current()).clone(),
    })
}

// ============================================================================
// SHARING
// ============================================================================

#[derive(Debug, Deserialize)]
struct ThemeQuery {
    theme: Option<String>,
}

/// GET /api/theme?theme=<compact>
///
/// Replaces the current design with a decodable link payload and discards
/// any generation in flight. Undecodable links leave the current design
/// untouched.
async fn load_theme(
    State(state): State<AppState>,
    Query(query): Query<ThemeQuery>,
) -> Json<TokensResponse> {
    if let Some(encoded) = query.theme.as_deref() {
        if let Some(tokens) = sharing::from_compact_text(&state.normalizer, encoded) {
            state.store.replace(tokens);
        }
    }
    Json(TokensResponse {
        tokens: (*state.store.current()).clone(),
    })
}

/// GET /api/theme/share
async fn share_theme(State(state): State<AppState>) -> Result<Json<ShareResponse>, ApiError> {
    let tokens = state.store.current();
    let encoded = sharing::to_compact_text(&tokens).map_err(internal_error)?;
    let url = sharing::shareable_url(&state.public_url, &tokens).map_err(internal_error)?;
    Ok(Json(ShareResponse {
        url: url.to_string(),
        encoded,
    }))
}

/// GET /api/theme/export
async fn export_theme(State(state): State<AppState>) -> Result<Response, ApiError> {
    let tokens = state.store.current();
    let body = sharing::export_json(&tokens).map_err(internal_error)?;
    let disposition = format!("attachment; filename=\"{}\"", tokens.export_file_name());

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// POST /api/theme/import
async fn import_theme(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<TokensResponse>, ApiError> {
    let tokens = sharing::import_file(&state.normalizer, &body).map_err(api_error)?;
    let tokens = state.store.replace(tokens);
    Ok(Json(TokensResponse {
        tokens: (*tokens).clone(),
    }))
}

// ============================================================================
// APPLIED STYLE
// ============================================================================

/// GET /api/theme/css
async fn theme_css(State(state): State<AppState>) -> Response {
    let css = state.document.borrow().to_css();
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], css).into_response()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RootResponse {
    html_open_tag: String,
    document: DocumentRoot,
}

/// GET /api/theme/root
async fn theme_root(State(state): State<AppState>) -> Json<RootResponse> {
    let document = state.document.borrow().clone();
    Json(RootResponse {
        html_open_tag: document.html_open_tag(),
        document: (*document).clone(),
    })
}

// ============================================================================
// META
// ============================================================================

/// GET /api/schema
async fn schema() -> Json<serde_json::Value> {
    Json(token_set_schema())
}

/// GET /api/health
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub fn create_design_router(state: AppState) -> Router {
    Router::new()
        .route("/api/design", post(generate_design))
        .route("/api/design/remix", post(remix_design))
        .route("/api/design/current", get(current_design))
        .route("/api/theme", get(load_theme))
        .route("/api/theme/share", get(share_theme))
        .route("/api/theme/export", get(export_theme))
        .route("/api/theme/import", post(import_theme))
        .route("/api/theme/css", get(theme_css))
        .route("/api/theme/root", get(theme_root))
        .route("/api/schema", get(schema))
        .route("/api/health", get(health))
        .with_state(state)
}
