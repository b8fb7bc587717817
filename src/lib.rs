/// EstateBook Marketplace Core
/// Exports all modules for use as a library crate

pub mod app_state;
pub mod favorites;
pub mod handlers;
pub mod listings;
pub mod models;
pub mod negotiation;
pub mod notify;
pub mod optimistic;
pub mod routes;

// Re-export from negotiation (offer lifecycle)
pub use negotiation::{
    transition, NegotiationAction, NegotiationEngine, NegotiationStats, Offer, OfferError,
    OfferStatus, PartyRole, MAX_MESSAGE_LEN, MAX_OFFER_AMOUNT, MIN_OFFER_AMOUNT,
};

// Re-export from favorites (saved-property reconciliation)
pub use favorites::{
    FavoritesError, FavoritesReconciler, LocalFavoritesStore, RemoteFavorites, ServerFavorites,
    Session,
};

pub use app_state::{AppState, Config, SharedState};
pub use listings::{Listing, ListingBook, ListingStatus};
pub use notify::{Notification, NotificationKind, Notifier, MAX_OUTBOX_PER_USER};
pub use optimistic::with_optimistic_update;
pub use routes::api_router;
