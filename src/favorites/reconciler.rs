// ============================================================================
// Favorites Reconciler - Guest/Auth Session Merge
// ============================================================================
//
// One consistent "is this saved" view across anonymous and authenticated
// sessions. A guest's favorites live in a single local JSON file; an
// authenticated user's favorites live server-side. At the guest-to-auth
// transition the two sets are merged (union, write-through to the server)
// exactly once, after which local storage is cleared and the server is the
// sole source of truth.
//
// The store split is explicit: LocalFavoritesStore for the device file,
// a RemoteFavorites seam for the server, selected by Session state.
//
// ============================================================================

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::warn;

use super::{FavoritesError, ServerFavorites};
use crate::optimistic::with_optimistic_update;

// ============================================================================
// SESSION
// ============================================================================

/// Whether the device session is tied to a server-side user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Guest,
    Authenticated(String),
}

impl Session {
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Session::Guest => None,
            Session::Authenticated(user_id) => Some(user_id),
        }
    }
}

// ============================================================================
// LOCAL STORE
// ============================================================================

/// Guest favorites: a JSON array of property IDs under a single local path
#[derive(Debug, Clone)]
pub struct LocalFavoritesStore {
    path: PathBuf,
}

impl LocalFavoritesStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Read the stored set. Absent or unparsable storage reads as empty
    /// rather than failing the session.
    pub fn load(&self) -> HashSet<String> {
        let Ok(raw) = fs::read_to_string(&self.path) else {
            return HashSet::new();
        };
        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(ids) => ids.into_iter().collect(),
            Err(err) => {
                warn!(path = %self.path.display(), %err, "unreadable favorites file, treating as empty");
                HashSet::new()
            }
        }
    }

    /// Write the full set synchronously.
    pub fn save(&self, favorites: &HashSet<String>) -> Result<(), FavoritesError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| FavoritesError::Storage(format!("create {}: {}", parent.display(), e)))?;
        }
        let mut ids: Vec<&String> = favorites.iter().collect();
        ids.sort();
        let json = serde_json::to_string(&ids)
            .map_err(|e| FavoritesError::Storage(format!("serialize favorites: {}", e)))?;
        fs::write(&self.path, json)
            .map_err(|e| FavoritesError::Storage(format!("write {}: {}", self.path.display(), e)))
    }

    /// Drop the stored set entirely. Missing storage already counts as clear.
    pub fn clear(&self) -> Result<(), FavoritesError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(FavoritesError::Storage(format!(
                "remove {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

// ============================================================================
// REMOTE SEAM
// ============================================================================

/// Server-side favorites operations as seen from a device session
pub trait RemoteFavorites {
    fn fetch(&self, user_id: &str) -> Result<HashSet<String>, FavoritesError>;
    fn toggle(&self, user_id: &str, property_id: &str) -> Result<bool, FavoritesError>;
    fn merge(&self, user_id: &str, local: &HashSet<String>)
        -> Result<HashSet<String>, FavoritesError>;
}

/// In-process remote: the embedded server store behind a shared handle
impl RemoteFavorites for Arc<Mutex<ServerFavorites>> {
    fn fetch(&self, user_id: &str) -> Result<HashSet<String>, FavoritesError> {
        Ok(self.lock().unwrap().for_user(user_id))
    }

    fn toggle(&self, user_id: &str, property_id: &str) -> Result<bool, FavoritesError> {
        Ok(self.lock().unwrap().toggle(user_id, property_id))
    }

    fn merge(
        &self,
        user_id: &str,
        local: &HashSet<String>,
    ) -> Result<HashSet<String>, FavoritesError> {
        Ok(self.lock().unwrap().merge(user_id, local))
    }
}

// ============================================================================
// RECONCILER
// ============================================================================

/// Session-scoped favorites view over the local/remote store split
#[derive(Debug)]
pub struct FavoritesReconciler<R: RemoteFavorites> {
    session: Session,
    local: LocalFavoritesStore,
    remote: R,
    favorites: HashSet<String>,
}

impl<R: RemoteFavorites> FavoritesReconciler<R> {
    /// Store selection happens here: Session decides which store is
    /// canonical for the lifetime of this reconciler.
    pub fn new(session: Session, local: LocalFavoritesStore, remote: R) -> Self {
        Self {
            session,
            local,
            remote,
            favorites: HashSet::new(),
        }
    }

    /// Load the session's favorite set.
    ///
    /// Guests read local storage. Authenticated sessions fetch the server
    /// set and, if a non-empty guest set is still present locally, merge it
    /// through to the server exactly once and clear local storage. Never
    /// fails: an unreachable server degrades to the local content.
    pub fn load_favorites(&mut self) -> HashSet<String> {
        match self.session.clone() {
            Session::Guest => {
                self.favorites = self.local.load();
            }
            Session::Authenticated(user_id) => match self.remote.fetch(&user_id) {
                Ok(server_set) => {
                    let guest_set = self.local.load();
                    if guest_set.is_empty() {
                        self.favorites = server_set;
                    } else {
                        self.favorites = self.sync_guest_set(&user_id, server_set, &guest_set);
                    }
                }
                Err(err) => {
                    warn!(user_id, %err, "favorites fetch failed, serving local set");
                    self.favorites = self.local.load();
                }
            },
        }
        self.favorites.clone()
    }

    /// Union the guest set into the server set. Local storage is cleared
    /// only after the server acknowledged the merge; on failure the guest
    /// set stays put so the next login retries (union keeps the retry
    /// harmless) and the session still sees every favorite.
    fn sync_guest_set(
        &mut self,
        user_id: &str,
        server_set: HashSet<String>,
        guest_set: &HashSet<String>,
    ) -> HashSet<String> {
        match self.remote.merge(user_id, guest_set) {
            Ok(merged) => {
                if let Err(err) = self.local.clear() {
                    warn!(user_id, %err, "guest favorites not cleared after merge");
                }
                merged
            }
            Err(err) => {
                warn!(user_id, %err, "favorites merge failed, keeping guest set for retry");
                server_set.union(guest_set).cloned().collect()
            }
        }
    }

    /// Flip membership of `property_id`, optimistically.
    ///
    /// The in-memory set updates before any I/O so callers render the flip
    /// with zero latency. Authenticated sessions then write through to the
    /// server and undo the flip if that write fails; guest sessions write
    /// local storage synchronously.
    pub fn toggle_favorite(&mut self, property_id: &str) -> Result<bool, FavoritesError> {
        let session = self.session.clone();
        let remote = &self.remote;
        let local = &self.local;

        with_optimistic_update(
            &mut self.favorites,
            |set| flip(set, property_id),
            |set| flip(set, property_id),
            |set| match &session {
                Session::Authenticated(user_id) => remote.toggle(user_id, property_id),
                Session::Guest => {
                    local.save(set)?;
                    Ok(set.contains(property_id))
                }
            },
        )
    }

    pub fn is_favorited(&self, property_id: &str) -> bool {
        self.favorites.contains(property_id)
    }

    pub fn favorites(&self) -> &HashSet<String> {
        &self.favorites
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}

fn flip(set: &mut HashSet<String>, property_id: &str) {
    if !set.remove(property_id) {
        set.insert(property_id.to_string());
    }
}

// ============================================================================
// TESTS
// ============================================================================
