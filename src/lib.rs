use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Post Store, Visibility Policy and Post Workflow.
pub mod repository;
pub mod memory;
pub mod policy;
pub mod workflow;

// Form decoding/cleaning, models and error types shared by the layers above.
pub mod forms;
pub mod models;
pub mod error;

// HTTP surface.
pub mod auth;
pub mod handlers;
pub mod config;
pub mod routes;
use routes::{authoring, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::{BlogError, RepoError};
pub use memory::MemoryRepository;
pub use repository::{PostgresRepository, Repository, RepositoryState};
pub use workflow::PostWorkflow;

/// ApiDoc
///
/// OpenAPI document for every route, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::post_list, handlers::post_detail, handlers::post_new_form,
        handlers::post_new, handlers::post_edit_form, handlers::post_edit,
    ),
    components(
        schemas(
            models::Post, models::PostList, models::User,
            forms::PostForm, forms::FormErrors,
        )
    ),
    tags(
        (name = "blog", description = "Blog posts: list, read, write, edit")
    )
)]
struct ApiDoc;

/// AppState
///
/// The shared, cloneable container for everything a request needs.
#[derive(Clone)]
pub struct AppState {
    /// Post Store.
    pub repo: RepositoryState,
    /// The loaded, immutable configuration.
    pub config: AppConfig,
}

impl AppState {
    pub fn new(repo: RepositoryState, config: AppConfig) -> Self {
        Self { repo, config }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

impl FromRef<AppState> for PostWorkflow {
    fn from_ref(app_state: &AppState) -> PostWorkflow {
        PostWorkflow::new(app_state.repo.clone())
    }
}

/// create_router
///
/// Assembles the routes, the docs UI and the observability layers, and registers the state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(authoring::authoring_routes())
        .with_state(state);

    // Request id is set first so the trace span can record it, then echoed back.
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the per-request span, tagged with the `x-request-id` so every log line of a
/// request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
