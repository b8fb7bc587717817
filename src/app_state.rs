// Application state management

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::favorites::ServerFavorites;
use crate::listings::{Listing, ListingBook};
use crate::negotiation::NegotiationEngine;
use crate::notify::Notifier;

pub type SharedState = Arc<Mutex<AppState>>;

/// Activity feed entries kept in memory
const MAX_ACTIVITY_ENTRIES: usize = 1_000;

/// Process configuration, read once at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: PathBuf,
    pub seed_demo_data: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("ESTATEBOOK_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8080);
        let data_dir = std::env::var("ESTATEBOOK_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));
        let seed_demo_data = std::env::var("ESTATEBOOK_SEED_DEMO_DATA")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Self {
            port,
            data_dir,
            seed_demo_data,
        }
    }
}

pub struct AppState {
    pub listings: ListingBook,
    pub negotiation: NegotiationEngine,
    pub favorites: ServerFavorites,
    pub notifier: Notifier,
    pub activity: Vec<String>,
    data_dir: PathBuf,
}

/// On-disk snapshot layout
#[derive(Serialize, Deserialize)]
struct PersistedState {
    listings: ListingBook,
    negotiation: NegotiationEngine,
    favorites: ServerFavorites,
    #[serde(default)]
    notifier: Notifier,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let mut state = Self {
            listings: ListingBook::new(),
            negotiation: NegotiationEngine::new(),
            favorites: ServerFavorites::new(),
            notifier: Notifier::new(),
            activity: Vec::new(),
            data_dir: config.data_dir.clone(),
        };

        match state.load_from_disk() {
            Ok(()) => {
                info!(
                    listings = state.listings.listings.len(),
                    offers = state.negotiation.offers.len(),
                    "loaded persisted state from disk"
                );
            }
            Err(_) => {
                info!("no persisted state found, starting fresh");
                if config.seed_demo_data {
                    state.seed_demo_data();
                }
            }
        }

        state
    }

    fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join("state.json")
    }

    pub fn save_to_disk(&self) -> Result<(), String> {
        use std::fs;

        let snapshot = PersistedState {
            listings: self.listings.clone(),
            negotiation: self.negotiation.clone(),
            favorites: self.favorites.clone(),
            notifier: self.notifier.clone(),
        };

        let json = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| format!("Failed to serialize state: {}", e))?;

        fs::create_dir_all(&self.data_dir)
            .map_err(|e| format!("Failed to create data dir: {}", e))?;
        fs::write(self.snapshot_path(), json)
            .map_err(|e| format!("Failed to write state file: {}", e))?;

        info!(path = %self.snapshot_path().display(), "state saved to disk");
        Ok(())
    }

    fn load_from_disk(&mut self) -> Result<(), String> {
        use std::fs;

        let json = fs::read_to_string(self.snapshot_path())
            .map_err(|_| "No state file found".to_string())?;

        let snapshot: PersistedState = serde_json::from_str(&json)
            .map_err(|e| format!("Failed to deserialize state: {}", e))?;

        self.listings = snapshot.listings;
        self.negotiation = snapshot.negotiation;
        self.favorites = snapshot.favorites;
        self.notifier = snapshot.notifier;
        self.negotiation.rebuild_indexes();

        Ok(())
    }

    /// Append a human-readable entry to the marketplace activity feed.
    pub fn log_activity(&mut self, action: &str, details: &str) {
        let timestamp = chrono::Local::now().format("%H:%M:%S");
        let entry = format!("[{}] {} | {}", timestamp, action, details);
        info!(action, details, "marketplace activity");
        self.activity.push(entry);
        if self.activity.len() > MAX_ACTIVITY_ENTRIES {
            self.activity.remove(0);
        }
    }

    fn seed_demo_data(&mut self) {
        let seeds = [
            ("2BR apartment, city center", "Walk-up, third floor", "seller_meera", 18_500_000_i64),
            ("3BR villa, sea view", "Renovated in 2024", "seller_arjun", 42_000_000),
            ("Studio near tech park", "Ideal rental investment", "seller_meera", 7_900_000),
        ];

        for (title, description, seller, price) in seeds {
            match Listing::new(
                title.to_string(),
                description.to_string(),
                seller.to_string(),
                price,
            ) {
                Ok(listing) => {
                    self.listings.add(listing);
                }
                Err(err) => warn!(%err, title, "skipping bad demo listing"),
            }
        }

        info!(
            listings = self.listings.listings.len(),
            "seeded demo listings"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_config() -> Config {
        Config {
            port: 0,
            data_dir: std::env::temp_dir()
                .join(format!("estatebook_state_{}", Uuid::new_v4().simple())),
            seed_demo_data: false,
        }
    }

    #[test]
    fn test_fresh_state_is_empty() {
        let state = AppState::new(&temp_config());
        assert!(state.listings.listings.is_empty());
        assert!(state.negotiation.offers.is_empty());
    }

    #[test]
    fn test_snapshot_round_trip() {
        let config = temp_config();

        let mut state = AppState::new(&config);
        let listing = state
            .listings
            .add(Listing::new("t".into(), "d".into(), "seller_1".into(), 1_000_000).unwrap());
        let offer = state
            .negotiation
            .create_offer(
                listing.id.clone(),
                "buyer_1".to_string(),
                "seller_1".to_string(),
                900_000,
                None,
            )
            .unwrap();
        state.favorites.toggle("buyer_1", &listing.id);
        state.save_to_disk().unwrap();

        let restored = AppState::new(&config);
        assert_eq!(restored.listings.listings.len(), 1);
        assert_eq!(restored.negotiation.offers.len(), 1);
        assert!(restored.negotiation.get(&offer.id).is_ok());
        assert!(restored.favorites.is_favorited("buyer_1", &listing.id));
        assert_eq!(
            restored.negotiation.offers_for_buyer("buyer_1", None).len(),
            1,
            "indexes must be rebuilt after load"
        );

        let _ = std::fs::remove_dir_all(&config.data_dir);
    }

    #[test]
    fn test_activity_feed_is_bounded() {
        let mut state = AppState::new(&temp_config());
        for i in 0..(MAX_ACTIVITY_ENTRIES + 10) {
            state.log_activity("TEST", &format!("entry {}", i));
        }
        assert_eq!(state.activity.len(), MAX_ACTIVITY_ENTRIES);
    }
}
