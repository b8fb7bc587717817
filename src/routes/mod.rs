// Routes module - organizes all HTTP endpoints
// Each sub-module handles a specific domain

pub mod session;

pub use session::*;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

use crate::app_state::SharedState;
use crate::handlers::*;

/// Build the full API router. Shared between the server binary and the
/// integration tests, which mount it on an ephemeral port.
pub fn api_router(state: SharedState) -> Router {
    Router::new()
        // ===== LISTING ENDPOINTS =====
        .route("/listings", get(list_listings).post(create_listing))
        .route("/listings/:id", get(get_listing))
        // ===== OFFER ENDPOINTS =====
        .route("/offers", post(create_offer))
        .route("/offers/:id", get(get_offer))
        .route("/offers/:id/accept", post(accept_offer))
        .route("/offers/:id/reject", post(reject_offer))
        .route("/offers/:id/counter", post(counter_offer))
        .route("/offers/buyer/:buyer_id", get(list_buyer_offers))
        .route("/offers/seller/:seller_id", get(list_seller_offers))
        // ===== FAVORITES ENDPOINTS =====
        .route("/favorites/:user_id", get(get_favorites))
        .route("/favorites/:user_id/toggle", post(toggle_favorite))
        .route("/favorites/:user_id/sync", post(sync_favorites))
        // ===== SESSION ENDPOINTS =====
        .route("/session/connect", post(connect_session))
        // ===== NOTIFICATION ENDPOINTS =====
        .route("/notifications/:user_id", get(get_notifications))
        .route("/notifications/:user_id/read", post(mark_notifications_read))
        // ===== ACTIVITY & HEALTH =====
        .route("/activity", get(get_activity))
        .route("/", get(health_check))
        .route("/health", get(health_check))
        // Apply CORS and state
        .layer(
            ServiceBuilder::new().layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}
