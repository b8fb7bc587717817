// ============================================================================
// Favorites Module - Saved Properties
// ============================================================================
//
// Membership-only sets of saved listings, one per user:
//   - server side: ServerFavorites, the canonical store for authenticated
//     users, exposed over the REST surface
//   - client side: reconciler, which owns the guest/auth split and the
//     one-time union merge at login
//
// ============================================================================

pub mod reconciler;

pub use reconciler::{
    FavoritesReconciler, LocalFavoritesStore, RemoteFavorites, Session,
};

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Canonical per-user favorite sets, keyed by user ID
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ServerFavorites {
    sets: HashMap<String, HashSet<String>>,
}

impl ServerFavorites {
    pub fn new() -> Self {
        Self::default()
    }

    /// The user's favorite set; empty if the user has never saved anything.
    pub fn for_user(&self, user_id: &str) -> HashSet<String> {
        self.sets.get(user_id).cloned().unwrap_or_default()
    }

    /// Flip membership of `property_id` and return the new membership state.
    pub fn toggle(&mut self, user_id: &str, property_id: &str) -> bool {
        let set = self.sets.entry(user_id.to_string()).or_default();
        if set.remove(property_id) {
            false
        } else {
            set.insert(property_id.to_string());
            true
        }
    }

    /// Union a guest-local set into the user's server set and return the
    /// merged result. Membership is set-based, so replaying the same merge
    /// is a no-op.
    pub fn merge(&mut self, user_id: &str, local: &HashSet<String>) -> HashSet<String> {
        let set = self.sets.entry(user_id.to_string()).or_default();
        for property_id in local {
            set.insert(property_id.clone());
        }
        set.clone()
    }

    pub fn is_favorited(&self, user_id: &str, property_id: &str) -> bool {
        self.sets
            .get(user_id)
            .map(|set| set.contains(property_id))
            .unwrap_or(false)
    }
}

// ============================================================================
// ERRORS
// ============================================================================

/// Favorites-related errors
#[derive(Debug, Clone, Serialize)]
pub enum FavoritesError {
    /// Local persistent storage could not be written
    Storage(String),
    /// The server-side store could not be reached; retryable
    RemoteUnavailable(String),
}

impl FavoritesError {
    pub fn code(&self) -> &'static str {
        match self {
            FavoritesError::Storage(_) => "storage_error",
            FavoritesError::RemoteUnavailable(_) => "remote_unavailable",
        }
    }
}

impl std::fmt::Display for FavoritesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FavoritesError::Storage(msg) => write!(f, "Storage error: {}", msg),
            FavoritesError::RemoteUnavailable(msg) => write!(f, "Remote unavailable: {}", msg),
        }
    }
}

impl std::error::Error for FavoritesError {}

// ============================================================================
// TESTS
// ============================================================================
