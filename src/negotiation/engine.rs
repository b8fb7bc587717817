// ============================================================================
// Negotiation Engine - EstateBook Marketplace
// ============================================================================
//
// Owns every offer and enforces the transition table as atomic operations.
// All mutations run on `&mut self`, and callers hold the application state
// lock across them, so the status guard and the write are one step: of two
// racing accept/reject calls exactly one wins and the loser observes
// InvalidStateTransition.
//
// ============================================================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::offers::{Offer, OfferError, OfferStatus};

/// Manages the full offer book and its per-party indexes
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct NegotiationEngine {
    /// All offers keyed by offer ID
    pub offers: HashMap<String, Offer>,

    /// Offer IDs per buyer, in placement order
    #[serde(default)]
    buyer_index: HashMap<String, Vec<String>>,

    /// Offer IDs per seller, in placement order
    #[serde(default)]
    seller_index: HashMap<String, Vec<String>>,
}

impl NegotiationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new negotiation. Rejects self-bidding and a second active
    /// offer for the same (listing, buyer) pair.
    pub fn create_offer(
        &mut self,
        property_id: String,
        buyer_id: String,
        seller_id: String,
        amount: i64,
        message: Option<String>,
    ) -> Result<Offer, OfferError> {
        if buyer_id == seller_id {
            return Err(OfferError::Unauthorized(
                "cannot place an offer on your own listing".to_string(),
            ));
        }

        if self.active_offer_exists(&property_id, &buyer_id) {
            return Err(OfferError::ActiveOfferExists(format!(
                "buyer {} already has an active offer on {}",
                buyer_id, property_id
            )));
        }

        let offer = Offer::new(property_id, buyer_id, seller_id, amount, message)?;

        self.buyer_index
            .entry(offer.buyer_id.clone())
            .or_default()
            .push(offer.id.clone());
        self.seller_index
            .entry(offer.seller_id.clone())
            .or_default()
            .push(offer.id.clone());
        self.offers.insert(offer.id.clone(), offer.clone());

        Ok(offer)
    }

    /// Accept an offer on behalf of `acting_party`.
    pub fn accept(&mut self, offer_id: &str, acting_party: &str) -> Result<Offer, OfferError> {
        let offer = self.get_mut(offer_id)?;
        let role = offer.role_of(acting_party)?;
        offer.accept(role)?;
        Ok(offer.clone())
    }

    /// Reject an offer on behalf of `acting_party`.
    pub fn reject(&mut self, offer_id: &str, acting_party: &str) -> Result<Offer, OfferError> {
        let offer = self.get_mut(offer_id)?;
        let role = offer.role_of(acting_party)?;
        offer.reject(role)?;
        Ok(offer.clone())
    }

    /// Record a seller counter-proposal against a pending offer.
    pub fn counter(
        &mut self,
        offer_id: &str,
        acting_party: &str,
        counter_amount: i64,
        counter_message: Option<String>,
    ) -> Result<Offer, OfferError> {
        let offer = self.get_mut(offer_id)?;
        let role = offer.role_of(acting_party)?;
        offer.counter(role, counter_amount, counter_message)?;
        Ok(offer.clone())
    }

    pub fn get(&self, offer_id: &str) -> Result<&Offer, OfferError> {
        self.offers
            .get(offer_id)
            .ok_or_else(|| OfferError::NotFound(format!("offer {} not found", offer_id)))
    }

    fn get_mut(&mut self, offer_id: &str) -> Result<&mut Offer, OfferError> {
        self.offers
            .get_mut(offer_id)
            .ok_or_else(|| OfferError::NotFound(format!("offer {} not found", offer_id)))
    }

    /// Whether a non-terminal offer already links this buyer to this listing.
    pub fn active_offer_exists(&self, property_id: &str, buyer_id: &str) -> bool {
        self.buyer_index
            .get(buyer_id)
            .map(|ids| {
                ids.iter().any(|id| {
                    self.offers
                        .get(id)
                        .map(|o| o.property_id == property_id && o.status.is_active())
                        .unwrap_or(false)
                })
            })
            .unwrap_or(false)
    }

    /// Offers placed by a buyer, newest first, optionally filtered by status.
    pub fn offers_for_buyer(&self, buyer_id: &str, status: Option<OfferStatus>) -> Vec<Offer> {
        self.collect_index(&self.buyer_index, buyer_id, status)
    }

    /// Offers received by a seller, newest first, optionally filtered by status.
    pub fn offers_for_seller(&self, seller_id: &str, status: Option<OfferStatus>) -> Vec<Offer> {
        self.collect_index(&self.seller_index, seller_id, status)
    }

    fn collect_index(
        &self,
        index: &HashMap<String, Vec<String>>,
        party_id: &str,
        status: Option<OfferStatus>,
    ) -> Vec<Offer> {
        index
            .get(party_id)
            .map(|ids| {
                ids.iter()
                    .rev()
                    .filter_map(|id| self.offers.get(id))
                    .filter(|o| status.map(|s| o.status == s).unwrap_or(true))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Aggregate counts across the offer book.
    pub fn stats(&self) -> NegotiationStats {
        let mut stats = NegotiationStats::default();
        for offer in self.offers.values() {
            stats.total_offers += 1;
            match offer.status {
                OfferStatus::Pending => stats.pending += 1,
                OfferStatus::Accepted => stats.accepted += 1,
                OfferStatus::Rejected => stats.rejected += 1,
                OfferStatus::Countered => stats.countered += 1,
            }
        }
        stats
    }

    /// Rebuild the per-party indexes from the offer map. Used after loading
    /// a snapshot written by an older build that predates the indexes.
    pub fn rebuild_indexes(&mut self) {
        self.buyer_index.clear();
        self.seller_index.clear();

        let mut ordered: Vec<&Offer> = self.offers.values().collect();
        ordered.sort_by_key(|o| o.created_at);

        for offer in ordered {
            self.buyer_index
                .entry(offer.buyer_id.clone())
                .or_default()
                .push(offer.id.clone());
            self.seller_index
                .entry(offer.seller_id.clone())
                .or_default()
                .push(offer.id.clone());
        }
    }
}

/// Offer book counters for health/monitoring endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NegotiationStats {
    pub total_offers: u64,
    pub pending: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub countered: u64,
}

// ============================================================================
// TESTS
// ============================================================================
