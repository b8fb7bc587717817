// Wire DTOs for the EstateBook API.
//
// Every request is parsed into a typed struct at the network edge and every
// response is serialized from one, so the core never handles ambiguous
// shapes.

use serde::{Deserialize, Serialize};

use crate::listings::Listing;
use crate::negotiation::{Offer, OfferStatus};
use crate::notify::Notification;

// ===== OFFER REQUESTS =====

#[derive(Debug, Deserialize)]
pub struct CreateOfferRequest {
    pub property_id: String,
    pub buyer_id: String,
    /// Proposed price in minor currency units
    pub amount: i64,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body for accept/reject actions
#[derive(Debug, Deserialize)]
pub struct OfferActionRequest {
    pub acting_party_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CounterOfferRequest {
    pub acting_party_id: String,
    pub counter_amount: i64,
    #[serde(default)]
    pub counter_message: Option<String>,
}

/// Query string for offer listing endpoints (`?status=pending`)
#[derive(Debug, Default, Deserialize)]
pub struct OfferFilter {
    #[serde(default)]
    pub status: Option<OfferStatus>,
}

// ===== OFFER RESPONSES =====

#[derive(Debug, Serialize)]
pub struct OfferEnvelope {
    pub success: bool,
    pub offer: Offer,
}

impl OfferEnvelope {
    pub fn new(offer: Offer) -> Self {
        Self {
            success: true,
            offer,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OfferListResponse {
    pub success: bool,
    pub count: usize,
    pub offers: Vec<Offer>,
}

impl OfferListResponse {
    pub fn new(offers: Vec<Offer>) -> Self {
        Self {
            success: true,
            count: offers.len(),
            offers,
        }
    }
}

// ===== LISTING REQUESTS/RESPONSES =====

#[derive(Debug, Deserialize)]
pub struct CreateListingRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub seller_id: String,
    /// Asking price in minor currency units
    pub asking_price: i64,
}

#[derive(Debug, Serialize)]
pub struct ListingEnvelope {
    pub success: bool,
    pub listing: Listing,
}

#[derive(Debug, Serialize)]
pub struct ListingListResponse {
    pub success: bool,
    pub count: usize,
    pub listings: Vec<Listing>,
}

// ===== FAVORITES =====

#[derive(Debug, Deserialize)]
pub struct ToggleFavoriteRequest {
    pub property_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SyncFavoritesRequest {
    /// Guest-local favorites carried up at login
    pub property_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct FavoritesResponse {
    pub success: bool,
    pub user_id: String,
    pub count: usize,
    pub property_ids: Vec<String>,
}

impl FavoritesResponse {
    pub fn new(user_id: String, mut property_ids: Vec<String>) -> Self {
        property_ids.sort();
        Self {
            success: true,
            user_id,
            count: property_ids.len(),
            property_ids,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ToggleFavoriteResponse {
    pub success: bool,
    pub property_id: String,
    /// Membership state after the toggle
    pub favorited: bool,
}

// ===== SESSION =====

#[derive(Debug, Deserialize)]
pub struct ConnectSessionRequest {
    /// Absent for a guest session
    #[serde(default)]
    pub user_id: Option<String>,
    /// Device-local guest favorites, merged server-side at login
    #[serde(default)]
    pub local_favorites: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct ConnectSessionResponse {
    pub success: bool,
    pub session: &'static str,
    pub user_id: Option<String>,
    pub favorites: Vec<String>,
    /// How many guest favorites the login merge carried up
    pub merged_from_guest: usize,
}

// ===== NOTIFICATIONS =====

#[derive(Debug, Serialize)]
pub struct NotificationsResponse {
    pub success: bool,
    pub user_id: String,
    pub unread: usize,
    pub notifications: Vec<Notification>,
}

// ===== ERRORS =====

/// Uniform error body for every failed request
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub code: String,
    pub error: String,
}

impl ErrorBody {
    pub fn new(code: &str, error: impl Into<String>) -> Self {
        Self {
            success: false,
            code: code.to_string(),
            error: error.into(),
        }
    }
}
