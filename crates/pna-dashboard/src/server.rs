//! HTTP surface
//!
//! Routes under `/propaganda_analysis/`:
//! - `GET _dash-layout`: initial markup tree
//! - `GET _dash-dependencies`: callback descriptors in evaluation order
//! - `POST _dash-update-component`: run one round for a session
//!
//! An initial-load request opens a session; change rounds must name a live
//! one.
//!
//! plus `GET /health` and the static asset directory.

use crate::app::Dashboard;
use crate::session::{SessionId, SessionModel, SessionStore};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use pna_reactive::{
    Dispatch, ParsePropertyRefError, PropertyRef, SchedulerError, SpecDescriptor, Value,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Prefix of the dashboard routes
pub const ROUTES_PREFIX: &str = "/propaganda_analysis";

/// Mount point of the static asset directory
pub const STATIC_PREFIX: &str = "/pna/pna/static";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Page, graph and scheduler
    pub dashboard: Arc<Dashboard>,
    /// Per-session models
    pub sessions: SessionStore,
}

impl AppState {
    /// State with a default session store
    #[must_use]
    pub fn new(dashboard: Arc<Dashboard>) -> Self {
        Self::with_sessions(dashboard, SessionStore::new())
    }

    /// State with a configured session store
    #[must_use]
    pub fn with_sessions(dashboard: Arc<Dashboard>, sessions: SessionStore) -> Self {
        Self {
            dashboard,
            sessions,
        }
    }
}

/// Router options that depend on the run mode
#[derive(Debug, Clone, Default)]
pub struct RouterOptions {
    /// Directory served under [`STATIC_PREFIX`]
    pub static_dir: Option<PathBuf>,
    /// Allow any origin, method and header
    pub permissive_cors: bool,
}

/// Request-level failures
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed property reference in the request
    #[error("bad request: {0}")]
    BadRequest(#[from] ParsePropertyRefError),

    /// Change round without a live session
    #[error("unknown or expired session")]
    UnknownSession,

    /// The request names an undeclared component or property
    #[error("{0}")]
    Model(#[from] SchedulerError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Message
    pub error: String,
    /// Machine-readable code
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::UnknownSession => (StatusCode::NOT_FOUND, "UNKNOWN_SESSION"),
            ApiError::Model(SchedulerError::Model(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "UNKNOWN_PROPERTY")
            }
            ApiError::Model(SchedulerError::State(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// One property value on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyValue {
    /// Component id
    pub id: String,
    /// Property name
    pub property: String,
    /// Value
    pub value: Value,
}

impl PropertyValue {
    fn target(&self) -> PropertyRef {
        PropertyRef::new(self.id.as_str(), self.property.as_str())
    }
}

/// Body of `_dash-update-component`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRequest {
    /// Session; omitted on the initial-load request of a page
    #[serde(default)]
    pub session: Option<SessionId>,
    /// Run the initial-load round instead of a change round
    #[serde(default)]
    pub initial: bool,
    /// Changed properties as `component.property`
    #[serde(default)]
    pub changed: Vec<String>,
    /// Current browser values, applied before the round
    #[serde(default)]
    pub snapshot: Vec<PropertyValue>,
}

/// Handler failure reported to the browser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecFailure {
    /// Failing callback
    pub spec: String,
    /// Cause chain
    pub message: String,
}

/// Round outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundStatus {
    /// Every handler succeeded
    Committed,
    /// At least one handler failed; successful outputs are still included
    Failed,
}

/// Response of `_dash-update-component`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateResponse {
    /// Session to send with the next request
    pub session: SessionId,
    /// Round outcome
    pub status: RoundStatus,
    /// Property writes, in write order
    pub outputs: Vec<PropertyValue>,
    /// Handler failures
    pub errors: Vec<SpecFailure>,
}

/// Create the main router
pub fn create_router(state: AppState, options: &RouterOptions) -> Router {
    let dash_routes = Router::new()
        .route("/_dash-layout", get(layout))
        .route("/_dash-dependencies", get(dependencies))
        .route("/_dash-update-component", post(update_component));

    let mut router = Router::new()
        .route("/health", get(health))
        .nest(ROUTES_PREFIX, dash_routes);
    if let Some(dir) = &options.static_dir {
        router = router.nest_service(STATIC_PREFIX, ServeDir::new(dir));
    }

    let router = router.layer(TraceLayer::new_for_http());
    let router = if options.permissive_cors {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    };
    router.with_state(state)
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `healthy`
    pub status: String,
    /// Registered callbacks
    pub callbacks: usize,
    /// Live sessions
    pub sessions: u64,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        callbacks: state.dashboard.graph().len(),
        sessions: state.sessions.len().await,
    })
}

async fn layout(State(state): State<AppState>) -> Json<Value> {
    Json(state.dashboard.page().to_value())
}

async fn dependencies(State(state): State<AppState>) -> Json<Vec<SpecDescriptor>> {
    Json(state.dashboard.graph().descriptors())
}

async fn update_component(
    State(state): State<AppState>,
    Json(request): Json<UpdateRequest>,
) -> ApiResult<Json<UpdateResponse>> {
    let dispatch = if request.initial {
        Dispatch::InitialLoad
    } else {
        let changed = request
            .changed
            .iter()
            .map(|c| c.parse::<PropertyRef>())
            .collect::<Result<Vec<_>, _>>()?;
        Dispatch::Changed(changed)
    };

    let (session, model) = open_session(&state, &request).await?;
    let mut model = model.lock().await;

    let snapshot: Vec<(PropertyRef, Value)> = request
        .snapshot
        .iter()
        .map(|p| (p.target(), p.value.clone()))
        .collect();
    model
        .apply_snapshot(snapshot.iter().map(|(r, v)| (r, v)))
        .map_err(SchedulerError::from)?;

    let report = state
        .dashboard
        .scheduler()
        .run_round(&mut model, dispatch)
        .await?;

    let status = if report.is_committed() {
        RoundStatus::Committed
    } else {
        RoundStatus::Failed
    };
    let errors = report
        .errors
        .iter()
        .map(|e| SpecFailure {
            spec: e.spec_id.to_string(),
            message: format!("{:#}", e.cause),
        })
        .collect();
    let outputs = report
        .updates
        .into_iter()
        .map(|(target, value)| PropertyValue {
            id: target.component,
            property: target.property,
            value,
        })
        .collect();

    Ok(Json(UpdateResponse {
        session,
        status,
        outputs,
        errors,
    }))
}

/// Session for a request
///
/// Initial load reuses a live session or starts a new one; it never adopts an
/// id the server did not hand out. A change round needs a live session.
async fn open_session(
    state: &AppState,
    request: &UpdateRequest,
) -> ApiResult<(SessionId, SessionModel)> {
    if let Some(id) = request.session {
        if let Some(model) = state.sessions.get(&id).await {
            return Ok((id, model));
        }
    }
    if !request.initial {
        tracing::debug!(session = ?request.session, "change round without a live session");
        return Err(ApiError::UnknownSession);
    }
    Ok(state.sessions.create(state.dashboard.new_model()).await)
}
