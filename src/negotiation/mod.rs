// ============================================================================
// Negotiation Module - Offer Lifecycle & State Machine
// ============================================================================
//
// The marketplace's negotiation core:
//   - offers: offer entity, status machine, transition table, validation
//   - engine: offer book with per-party indexes and atomic transitions
//
// ============================================================================

pub mod engine;
pub mod offers;

pub use engine::{NegotiationEngine, NegotiationStats};
pub use offers::{
    transition, NegotiationAction, Offer, OfferError, OfferStatus, PartyRole, MAX_MESSAGE_LEN,
    MAX_OFFER_AMOUNT, MIN_OFFER_AMOUNT,
};
