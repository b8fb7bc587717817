// ============================================================================
// Offer Types - EstateBook Marketplace
// ============================================================================
//
// Negotiation entity for the marketplace. A buyer opens an offer on a
// listing; the seller accepts, rejects, or counters; a countered offer is
// resolved by the buyer. Accepted and rejected are terminal.
//
// Amount Convention:
//   - All amounts are in the smallest currency unit (integer, no decimals)
//   - The original offer amount is immutable; negotiation moves by setting
//     counter_amount, never by rewriting amount
//
// ============================================================================

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Minimum offer amount in minor currency units
pub const MIN_OFFER_AMOUNT: i64 = 1;

/// Maximum offer amount in minor currency units (1 trillion)
pub const MAX_OFFER_AMOUNT: i64 = 1_000_000_000_000;

/// Maximum length of a buyer/seller note attached to an offer
pub const MAX_MESSAGE_LEN: usize = 2_000;

// ============================================================================
// ENUMS
// ============================================================================

/// Offer status - the negotiation state machine's states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferStatus {
    /// Placed by the buyer, awaiting the seller
    Pending,
    /// Terminal - both parties agreed on a price
    Accepted,
    /// Terminal - negotiation declined
    Rejected,
    /// Seller proposed an alternate price, awaiting the buyer
    Countered,
}

impl OfferStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, OfferStatus::Pending | OfferStatus::Countered)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OfferStatus::Accepted | OfferStatus::Rejected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OfferStatus::Pending => "pending",
            OfferStatus::Accepted => "accepted",
            OfferStatus::Rejected => "rejected",
            OfferStatus::Countered => "countered",
        }
    }
}

/// Actions a party can take against an existing offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NegotiationAction {
    Accept,
    Reject,
    Counter,
}

impl NegotiationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            NegotiationAction::Accept => "accept",
            NegotiationAction::Reject => "reject",
            NegotiationAction::Counter => "counter",
        }
    }
}

/// Which side of the negotiation the acting party is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartyRole {
    Buyer,
    Seller,
}

impl PartyRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartyRole::Buyer => "buyer",
            PartyRole::Seller => "seller",
        }
    }
}

// ============================================================================
// TRANSITION TABLE
// ============================================================================

/// Decide the next status for `(current, action, role)`.
///
/// This is the single source of truth for transition legality. A pending
/// offer is resolved by the seller; a countered offer is resolved by the
/// buyer. Terminal offers admit no action, and a countered offer cannot be
/// countered again.
pub fn transition(
    current: OfferStatus,
    action: NegotiationAction,
    role: PartyRole,
) -> Result<OfferStatus, OfferError> {
    use NegotiationAction::*;
    use OfferStatus::*;
    use PartyRole::*;

    match (current, action, role) {
        (Pending, Accept, Seller) => Ok(Accepted),
        (Pending, Reject, Seller) => Ok(Rejected),
        (Pending, Counter, Seller) => Ok(Countered),
        (Countered, Accept, Buyer) => Ok(Accepted),
        (Countered, Reject, Buyer) => Ok(Rejected),

        (Countered, Counter, _) => Err(OfferError::InvalidStateTransition(
            "a countered offer cannot be countered again".to_string(),
        )),
        (Pending, _, Buyer) => Err(OfferError::Unauthorized(format!(
            "only the seller can {} a pending offer",
            action.as_str()
        ))),
        (Countered, _, Seller) => Err(OfferError::Unauthorized(format!(
            "only the buyer can {} a countered offer",
            action.as_str()
        ))),
        (status, action, _) => Err(OfferError::InvalidStateTransition(format!(
            "cannot {} an offer in terminal status '{}'",
            action.as_str(),
            status.as_str()
        ))),
    }
}

// ============================================================================
// OFFER
// ============================================================================

/// A price negotiation between a buyer and a seller over one listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    /// Unique offer identifier
    pub id: String,

    /// Listing under negotiation
    pub property_id: String,

    /// Party that opened the offer
    pub buyer_id: String,

    /// Owner of the listing
    pub seller_id: String,

    /// Proposed price in minor currency units, immutable after creation
    pub amount: i64,

    /// Optional buyer note attached at creation
    pub message: Option<String>,

    /// Current negotiation state
    pub status: OfferStatus,

    /// Seller's alternate price, set only while status is `countered`
    pub counter_amount: Option<i64>,

    /// Seller note attached to the counter proposal
    pub counter_message: Option<String>,

    /// Unix timestamp when the offer was placed
    pub created_at: u64,

    /// Unix timestamp of the last status change
    pub updated_at: u64,
}

impl Offer {
    /// Create a new pending offer after validating the amount and message.
    pub fn new(
        property_id: String,
        buyer_id: String,
        seller_id: String,
        amount: i64,
        message: Option<String>,
    ) -> Result<Self, OfferError> {
        validate_amount(amount)?;
        validate_message(message.as_deref())?;

        let now = now_secs();
        Ok(Self {
            id: format!("off_{}", Uuid::new_v4().simple()),
            property_id,
            buyer_id,
            seller_id,
            amount,
            message,
            status: OfferStatus::Pending,
            counter_amount: None,
            counter_message: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Role of `party_id` in this negotiation, if it is one of the two sides.
    pub fn role_of(&self, party_id: &str) -> Result<PartyRole, OfferError> {
        if party_id == self.buyer_id {
            Ok(PartyRole::Buyer)
        } else if party_id == self.seller_id {
            Ok(PartyRole::Seller)
        } else {
            Err(OfferError::Unauthorized(format!(
                "{} is not a party to offer {}",
                party_id, self.id
            )))
        }
    }

    /// Apply an accept from `role`. Status guard and write are one step, so
    /// a losing racer observes the terminal state, never overwrites it.
    pub fn accept(&mut self, role: PartyRole) -> Result<(), OfferError> {
        self.status = transition(self.status, NegotiationAction::Accept, role)?;
        self.updated_at = now_secs();
        Ok(())
    }

    /// Apply a reject from `role`.
    pub fn reject(&mut self, role: PartyRole) -> Result<(), OfferError> {
        self.status = transition(self.status, NegotiationAction::Reject, role)?;
        self.updated_at = now_secs();
        Ok(())
    }

    /// Apply a seller counter-proposal. The counter must be positive and
    /// different from the standing offer amount.
    pub fn counter(
        &mut self,
        role: PartyRole,
        counter_amount: i64,
        counter_message: Option<String>,
    ) -> Result<(), OfferError> {
        validate_amount(counter_amount)?;
        validate_message(counter_message.as_deref())?;
        if counter_amount == self.amount {
            return Err(OfferError::InvalidAmount(format!(
                "counter of {} equals the standing offer; accept it instead",
                counter_amount
            )));
        }

        self.status = transition(self.status, NegotiationAction::Counter, role)?;
        self.counter_amount = Some(counter_amount);
        self.counter_message = counter_message;
        self.updated_at = now_secs();
        Ok(())
    }

    /// The price the negotiation would settle at if accepted right now.
    pub fn effective_amount(&self) -> i64 {
        self.counter_amount.unwrap_or(self.amount)
    }
}

fn validate_amount(amount: i64) -> Result<(), OfferError> {
    if amount < MIN_OFFER_AMOUNT {
        return Err(OfferError::InvalidAmount(format!(
            "amount must be positive, got {}",
            amount
        )));
    }
    if amount > MAX_OFFER_AMOUNT {
        return Err(OfferError::InvalidAmount(format!(
            "amount must be at most {}, got {}",
            MAX_OFFER_AMOUNT, amount
        )));
    }
    Ok(())
}

fn validate_message(message: Option<&str>) -> Result<(), OfferError> {
    if let Some(msg) = message {
        if msg.len() > MAX_MESSAGE_LEN {
            return Err(OfferError::InvalidMessage(format!(
                "message must be at most {} bytes, got {}",
                MAX_MESSAGE_LEN,
                msg.len()
            )));
        }
    }
    Ok(())
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

// ============================================================================
// ERRORS
// ============================================================================

/// Negotiation-related errors
#[derive(Debug, Clone, Serialize)]
pub enum OfferError {
    InvalidAmount(String),
    InvalidMessage(String),
    InvalidStateTransition(String),
    NotFound(String),
    Unauthorized(String),
    ActiveOfferExists(String),
    ListingUnavailable(String),
}

impl OfferError {
    /// Stable machine-readable code used in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            OfferError::InvalidAmount(_) => "invalid_amount",
            OfferError::InvalidMessage(_) => "invalid_message",
            OfferError::InvalidStateTransition(_) => "invalid_state_transition",
            OfferError::NotFound(_) => "not_found",
            OfferError::Unauthorized(_) => "unauthorized",
            OfferError::ActiveOfferExists(_) => "active_offer_exists",
            OfferError::ListingUnavailable(_) => "listing_unavailable",
        }
    }
}

impl std::fmt::Display for OfferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OfferError::InvalidAmount(msg) => write!(f, "Invalid amount: {}", msg),
            OfferError::InvalidMessage(msg) => write!(f, "Invalid message: {}", msg),
            OfferError::InvalidStateTransition(msg) => {
                write!(f, "Invalid state transition: {}", msg)
            }
            OfferError::NotFound(msg) => write!(f, "Not found: {}", msg),
            OfferError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            OfferError::ActiveOfferExists(msg) => write!(f, "Active offer exists: {}", msg),
            OfferError::ListingUnavailable(msg) => write!(f, "Listing unavailable: {}", msg),
        }
    }
}

impl std::error::Error for OfferError {}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_offer() -> Offer {
        Offer::new(
            "lst_villa42".to_string(),
            "buyer_1".to_string(),
            "seller_1".to_string(),
            500_000,
            Some("willing to close this month".to_string()),
        )
        .unwrap()
    }

    #[test]
    fn test_create_offer_starts_pending() {
        let offer = sample_offer();
        assert_eq!(offer.status, OfferStatus::Pending);
        assert!(offer.status.is_active());
        assert_eq!(offer.amount, 500_000);
        assert!(offer.counter_amount.is_none());
        assert!(offer.id.starts_with("off_"));
    }

    #[test]
    fn test_create_offer_rejects_nonpositive_amount() {
        for bad in [0, -1, -500_000] {
            let result = Offer::new(
                "lst_1".to_string(),
                "b".to_string(),
                "s".to_string(),
                bad,
                None,
            );
            assert!(matches!(result, Err(OfferError::InvalidAmount(_))));
        }
    }

    #[test]
    fn test_seller_resolves_pending_offer() {
        let mut offer = sample_offer();
        offer.accept(PartyRole::Seller).unwrap();
        assert_eq!(offer.status, OfferStatus::Accepted);
        assert!(offer.status.is_terminal());

        let mut offer = sample_offer();
        offer.reject(PartyRole::Seller).unwrap();
        assert_eq!(offer.status, OfferStatus::Rejected);
    }

    #[test]
    fn test_buyer_cannot_resolve_own_pending_offer() {
        let mut offer = sample_offer();
        let result = offer.accept(PartyRole::Buyer);
        assert!(matches!(result, Err(OfferError::Unauthorized(_))));
        assert_eq!(offer.status, OfferStatus::Pending);
    }

    #[test]
    fn test_counter_sets_fields_and_status() {
        let mut offer = sample_offer();
        offer
            .counter(PartyRole::Seller, 550_000, Some("final price".to_string()))
            .unwrap();
        assert_eq!(offer.status, OfferStatus::Countered);
        assert_eq!(offer.counter_amount, Some(550_000));
        assert_eq!(offer.counter_message.as_deref(), Some("final price"));
        // original amount untouched
        assert_eq!(offer.amount, 500_000);
        assert_eq!(offer.effective_amount(), 550_000);
    }

    #[test]
    fn test_counter_rejects_nonpositive_amount() {
        let mut offer = sample_offer();
        for bad in [0, -10] {
            let result = offer.counter(PartyRole::Seller, bad, None);
            assert!(matches!(result, Err(OfferError::InvalidAmount(_))));
            assert_eq!(offer.status, OfferStatus::Pending);
            assert!(offer.counter_amount.is_none());
        }
    }

    #[test]
    fn test_counter_equal_to_offer_is_invalid() {
        let mut offer = sample_offer();
        let result = offer.counter(PartyRole::Seller, 500_000, None);
        assert!(matches!(result, Err(OfferError::InvalidAmount(_))));
        assert_eq!(offer.status, OfferStatus::Pending);
    }

    #[test]
    fn test_buyer_resolves_countered_offer() {
        let mut offer = sample_offer();
        offer.counter(PartyRole::Seller, 550_000, None).unwrap();
        offer.accept(PartyRole::Buyer).unwrap();
        assert_eq!(offer.status, OfferStatus::Accepted);
    }

    #[test]
    fn test_seller_cannot_resolve_countered_offer() {
        let mut offer = sample_offer();
        offer.counter(PartyRole::Seller, 550_000, None).unwrap();
        let result = offer.accept(PartyRole::Seller);
        assert!(matches!(result, Err(OfferError::Unauthorized(_))));
        assert_eq!(offer.status, OfferStatus::Countered);
    }

    #[test]
    fn test_no_recounter() {
        let mut offer = sample_offer();
        offer.counter(PartyRole::Seller, 550_000, None).unwrap();
        for role in [PartyRole::Seller, PartyRole::Buyer] {
            let result = offer.counter(role, 560_000, None);
            assert!(matches!(result, Err(OfferError::InvalidStateTransition(_))));
        }
        assert_eq!(offer.counter_amount, Some(550_000));
    }

    #[test]
    fn test_terminal_offers_are_immutable() {
        for terminal in [OfferStatus::Accepted, OfferStatus::Rejected] {
            let mut offer = sample_offer();
            offer.status = terminal;
            let before = offer.clone();

            for role in [PartyRole::Buyer, PartyRole::Seller] {
                assert!(matches!(
                    offer.accept(role),
                    Err(OfferError::InvalidStateTransition(_))
                ));
                assert!(matches!(
                    offer.reject(role),
                    Err(OfferError::InvalidStateTransition(_))
                ));
                assert!(matches!(
                    offer.counter(role, 1, None),
                    Err(OfferError::InvalidStateTransition(_))
                ));
            }

            assert_eq!(offer.status, before.status);
            assert_eq!(offer.counter_amount, before.counter_amount);
            assert_eq!(offer.amount, before.amount);
        }
    }

    #[test]
    fn test_role_of() {
        let offer = sample_offer();
        assert_eq!(offer.role_of("buyer_1").unwrap(), PartyRole::Buyer);
        assert_eq!(offer.role_of("seller_1").unwrap(), PartyRole::Seller);
        assert!(matches!(
            offer.role_of("stranger"),
            Err(OfferError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_status_serialization_is_lowercase() {
        let json = serde_json::to_string(&OfferStatus::Countered).unwrap();
        assert_eq!(json, "\"countered\"");
        let back: OfferStatus = serde_json::from_str("\"pending\"").unwrap();
        assert_eq!(back, OfferStatus::Pending);
    }
}
