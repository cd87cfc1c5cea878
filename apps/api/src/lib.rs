//! # Tab Split API
//!
//! HTTP front end for the bill-splitting store and the receipt scanner.
//!
//! ## Module Organization
//! ```text
//! tabsplit_api/
//! ├── lib.rs       ◄─── You are here (router assembly)
//! ├── main.rs      ◄─── Startup, tracing, graceful shutdown
//! ├── config.rs    ◄─── ApiConfig from the environment
//! ├── error.rs     ◄─── ApiError → JSON error responses
//! ├── state.rs     ◄─── AppState shared by handlers
//! └── routes/      ◄─── One module per resource
//! ```
//!
//! ## Layers
//! ```text
//! request ──► TraceLayer ──► CorsLayer ──► Router ──► handler
//!                                                        │
//!                              Json<T> / ApiError ◄──────┘
//! ```

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use routes::{assignment, health, item, participant, receipt, session};
pub use state::AppState;

/// Origins always allowed in addition to `FRONTEND_URL`.
const DEV_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://127.0.0.1:3000"];

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;
    let cors = cors_layer(&state.config.frontend_url);

    let sessions = Router::new()
        .route("/", post(session::create_session))
        .route("/join", post(session::join_session))
        .route("/code/{code}", get(session::get_session_by_code))
        .route(
            "/{id}",
            get(session::get_session)
                .put(session::update_session)
                .delete(session::delete_session),
        )
        .route("/{id}/complete", post(session::complete_session))
        .route("/{id}/balances", get(session::get_balances))
        .route(
            "/{id}/participants",
            get(participant::list_participants).post(participant::add_participant),
        )
        .route("/participants/{pid}", put(participant::update_participant))
        .route("/participants/{pid}/mark-paid", post(participant::mark_paid))
        .route("/{id}/items", get(item::list_items).post(item::add_item))
        .route("/items/assign", post(assignment::assign_item))
        .route("/items/{iid}", put(item::update_item).delete(item::delete_item))
        .route("/assignments", post(assignment::add_assignment))
        .route(
            "/assignments/{aid}",
            put(assignment::update_assignment).delete(assignment::delete_assignment),
        );

    let receipts = Router::new()
        .route(
            "/upload",
            post(receipt::upload_receipt).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/{rid}/scan", post(receipt::scan_receipt))
        .route("/{rid}", get(receipt::get_receipt));

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .nest("/api/sessions", sessions)
        .nest("/api/receipts", receipts)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(frontend_url: &str) -> CorsLayer {
    let origins: Vec<HeaderValue> = std::iter::once(frontend_url)
        .chain(DEV_ORIGINS)
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
