use axum::{Router, extract::FromRef, http::HeaderName};
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

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod moderation;
pub mod policy;
pub mod repository;
pub mod threads;

// Module for routing segregation (Public, Admin).
pub mod routes;
use routes::{admin, public};

// --- Public Re-exports ---

pub use auth::{JwtService, TokenState};
pub use config::AppConfig;
pub use policy::PolicyState;
pub use repository::{InMemoryRepository, PostgresRepository, RepositoryState};

/// ApiDoc
///
/// OpenAPI document for the service, served at `/api-docs/openapi.json` and
/// browsable through `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(handlers::moderate_new_specific_comment),
    components(
        schemas(
            models::ModerationSnapshot, models::UserProfile, models::UserRecord,
            models::CommentRecord, models::ThreadRecord, models::ErrorEnvelope,
        )
    ),
    tags(
        (name = "comment-moderation", description = "Comment moderation panel API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, immutable container of services shared by every request: persistence,
/// token checking, the access policy and the loaded configuration.
#[derive(Clone)]
pub struct AppState {
    /// Repository Layer: users and comments.
    pub repo: RepositoryState,
    /// Token collaborator used to validate and decode bearer tokens.
    pub tokens: TokenState,
    /// Authorization predicate for the moderation panel.
    pub policy: PolicyState,
    /// Configuration: The loaded, immutable environment configuration.
    pub config: AppConfig,
}

impl AppState {
    /// Wires the default collaborators around a repository: `JwtService` for tokens
    /// and the policy selected by `config`.
    pub fn new(repo: RepositoryState, config: AppConfig) -> Self {
        Self {
            repo,
            tokens: std::sync::Arc::new(JwtService),
            policy: policy::from_config(&config),
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

// Lets extractors such as `BearerToken` read the configuration without the whole state.
impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the routing structure, applies the observability and CORS layers and
/// registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        // Moderation panel, nested under '/adm'. Token and role checks happen in the handlers.
        .nest("/adm", admin::admin_routes())
        .with_state(state);

    // 3. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Generates a unique UUID for every incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Wraps the request/response lifecycle in a tracing span.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Echoes x-request-id back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the per-request span with the HTTP method, URI and `x-request-id`, so every
/// log line of one request can be correlated.
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
