use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::documents as handlers;
use crate::auth::demo_auth;
use crate::auth::provider::IdentityProvider;
use crate::db::repository::DocumentRepository;
use crate::documents::LifecycleOptions;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub document_repo: Arc<dyn DocumentRepository>,
    pub identity_provider: Arc<dyn IdentityProvider>,
    pub lifecycle: LifecycleOptions,
    /// Whether the demo login routes are mounted.
    pub demo_mode: bool,
}

/// Build the HTTP router for the document API.
pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/api/v1/documents", post(handlers::create_handler))
        .route("/api/v1/documents/sidebar", get(handlers::sidebar_handler))
        .route("/api/v1/documents/trash", get(handlers::trash_handler))
        .route("/api/v1/documents/search", get(handlers::search_handler))
        .route(
            "/api/v1/documents/{id}",
            get(handlers::get_handler)
                .patch(handlers::update_handler)
                .delete(handlers::remove_handler),
        )
        .route("/api/v1/documents/{id}/archive", post(handlers::archive_handler))
        .route("/api/v1/documents/{id}/restore", post(handlers::restore_handler))
        .route("/api/v1/documents/{id}/icon", delete(handlers::remove_icon_handler))
        .route(
            "/api/v1/documents/{id}/cover-image",
            delete(handlers::remove_cover_image_handler),
        );

    if state.demo_mode {
        app = app
            .route("/api/auth/login", post(demo_auth::login_handler))
            .route("/api/auth/logout", post(demo_auth::logout_handler));
    }

    app.route("/api/auth/me", get(demo_auth::me_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
