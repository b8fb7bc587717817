// Session routes for EstateBook
// The guest-to-authenticated transition happens here: connecting with a
// user ID carries the device-local guest favorites up to the server in a
// single union merge, after which the server set is canonical.

use std::collections::HashSet;

use axum::{extract::State, response::Json};
use tracing::info;

use crate::app_state::SharedState;
use crate::models::{ConnectSessionRequest, ConnectSessionResponse};

/// POST /session/connect
/// Guests get their local favorites echoed back untouched. Authenticated
/// connects merge any carried guest set into the server set (union, so a
/// replayed connect is harmless) and return the merged view; the client
/// clears its local storage once this response lands.
pub async fn connect_session(
    State(state): State<SharedState>,
    Json(payload): Json<ConnectSessionRequest>,
) -> Json<ConnectSessionResponse> {
    let local_favorites = payload.local_favorites.unwrap_or_default();

    let Some(user_id) = payload.user_id else {
        let mut favorites = local_favorites;
        favorites.sort();
        return Json(ConnectSessionResponse {
            success: true,
            session: "guest",
            user_id: None,
            favorites,
            merged_from_guest: 0,
        });
    };

    let mut app_state = state.lock().unwrap();

    let guest_set: HashSet<String> = local_favorites.into_iter().collect();
    let server_before = app_state.favorites.for_user(&user_id);
    let carried = guest_set.difference(&server_before).count();

    let merged = if guest_set.is_empty() {
        server_before
    } else {
        app_state.favorites.merge(&user_id, &guest_set)
    };

    info!(user_id = %user_id, carried, total = merged.len(), "session connected");
    app_state.log_activity(
        "SESSION_CONNECT",
        &format!("{} connected, {} guest favorites merged", user_id, carried),
    );

    let mut favorites: Vec<String> = merged.into_iter().collect();
    favorites.sort();

    Json(ConnectSessionResponse {
        success: true,
        session: "authenticated",
        user_id: Some(user_id),
        favorites,
        merged_from_guest: carried,
    })
}
