// Listings registry for the EstateBook marketplace.
//
// The negotiation engine treats listings as a collaborator: offer creation
// resolves the seller from the listing record and requires the listing to
// still be open for offers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::negotiation::OfferError;

/// Listing availability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    /// Open for offers
    Active,
    /// An offer was accepted; sale in progress
    UnderOffer,
    /// Sale completed
    Sold,
}

impl ListingStatus {
    pub fn accepts_offers(&self) -> bool {
        matches!(self, ListingStatus::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Active => "active",
            ListingStatus::UnderOffer => "under_offer",
            ListingStatus::Sold => "sold",
        }
    }
}

/// A property listed for sale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub title: String,
    pub description: String,
    pub seller_id: String,
    /// Asking price in minor currency units
    pub asking_price: i64,
    pub status: ListingStatus,
    pub created_at: u64,
}

impl Listing {
    pub fn new(
        title: String,
        description: String,
        seller_id: String,
        asking_price: i64,
    ) -> Result<Self, OfferError> {
        if asking_price <= 0 {
            return Err(OfferError::InvalidAmount(format!(
                "asking price must be positive, got {}",
                asking_price
            )));
        }

        Ok(Self {
            id: format!("lst_{}", Uuid::new_v4().simple()),
            title,
            description,
            seller_id,
            asking_price,
            status: ListingStatus::Active,
            created_at: now_secs(),
        })
    }
}

/// All listings keyed by listing ID
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ListingBook {
    pub listings: HashMap<String, Listing>,
}

impl ListingBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, listing: Listing) -> Listing {
        self.listings.insert(listing.id.clone(), listing.clone());
        listing
    }

    pub fn get(&self, listing_id: &str) -> Result<&Listing, OfferError> {
        self.listings
            .get(listing_id)
            .ok_or_else(|| OfferError::NotFound(format!("listing {} not found", listing_id)))
    }

    /// Listings still open for offers, newest first.
    pub fn active(&self) -> Vec<Listing> {
        let mut active: Vec<Listing> = self
            .listings
            .values()
            .filter(|l| l.status.accepts_offers())
            .cloned()
            .collect();
        active.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        active
    }

    /// Flag a listing once an offer on it is accepted.
    pub fn mark_under_offer(&mut self, listing_id: &str) {
        if let Some(listing) = self.listings.get_mut(listing_id) {
            if listing.status == ListingStatus::Active {
                listing.status = ListingStatus::UnderOffer;
            }
        }
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}
