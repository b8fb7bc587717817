// HTTP request handlers for the EstateBook API

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};

use crate::app_state::SharedState;
use crate::listings::Listing;
use crate::models::*;
use crate::negotiation::OfferError;
use crate::notify::NotificationKind;

/// Classify a negotiation error into an HTTP status and a uniform body.
/// This is the single recovery boundary: nothing below it touches HTTP.
fn offer_error(err: OfferError) -> (StatusCode, Json<ErrorBody>) {
    let status = match &err {
        OfferError::InvalidAmount(_) | OfferError::InvalidMessage(_) => StatusCode::BAD_REQUEST,
        OfferError::InvalidStateTransition(_)
        | OfferError::ActiveOfferExists(_)
        | OfferError::ListingUnavailable(_) => StatusCode::CONFLICT,
        OfferError::NotFound(_) => StatusCode::NOT_FOUND,
        OfferError::Unauthorized(_) => StatusCode::FORBIDDEN,
    };
    (status, Json(ErrorBody::new(err.code(), err.to_string())))
}

// ===== OFFER ENDPOINTS =====

pub async fn create_offer(
    State(state): State<SharedState>,
    Json(payload): Json<CreateOfferRequest>,
) -> Result<(StatusCode, Json<OfferEnvelope>), (StatusCode, Json<ErrorBody>)> {
    let mut app_state = state.lock().unwrap();

    // listing collaborator owns existence/availability
    let (seller_id, listing_title) = {
        let listing = app_state
            .listings
            .get(&payload.property_id)
            .map_err(offer_error)?;
        if !listing.status.accepts_offers() {
            return Err(offer_error(OfferError::ListingUnavailable(format!(
                "listing {} is {}",
                listing.id,
                listing.status.as_str()
            ))));
        }
        (listing.seller_id.clone(), listing.title.clone())
    };

    let offer = app_state
        .negotiation
        .create_offer(
            payload.property_id,
            payload.buyer_id,
            seller_id.clone(),
            payload.amount,
            payload.message,
        )
        .map_err(offer_error)?;

    app_state.notifier.push(
        &seller_id,
        NotificationKind::OfferReceived,
        format!("New offer of {} on \"{}\"", offer.amount, listing_title),
        Some(offer.id.clone()),
    );
    app_state.log_activity(
        "OFFER_PLACED",
        &format!(
            "{} offered {} on {}",
            offer.buyer_id, offer.amount, offer.property_id
        ),
    );

    Ok((StatusCode::CREATED, Json(OfferEnvelope::new(offer))))
}

pub async fn get_offer(
    State(state): State<SharedState>,
    Path(offer_id): Path<String>,
) -> Result<Json<OfferEnvelope>, (StatusCode, Json<ErrorBody>)> {
    let app_state = state.lock().unwrap();
    let offer = app_state
        .negotiation
        .get(&offer_id)
        .map_err(offer_error)?
        .clone();
    Ok(Json(OfferEnvelope::new(offer)))
}

pub async fn list_buyer_offers(
    State(state): State<SharedState>,
    Path(buyer_id): Path<String>,
    Query(filter): Query<OfferFilter>,
) -> Json<OfferListResponse> {
    let app_state = state.lock().unwrap();
    let offers = app_state
        .negotiation
        .offers_for_buyer(&buyer_id, filter.status);
    Json(OfferListResponse::new(offers))
}

pub async fn list_seller_offers(
    State(state): State<SharedState>,
    Path(seller_id): Path<String>,
    Query(filter): Query<OfferFilter>,
) -> Json<OfferListResponse> {
    let app_state = state.lock().unwrap();
    let offers = app_state
        .negotiation
        .offers_for_seller(&seller_id, filter.status);
    Json(OfferListResponse::new(offers))
}

pub async fn accept_offer(
    State(state): State<SharedState>,
    Path(offer_id): Path<String>,
    Json(payload): Json<OfferActionRequest>,
) -> Result<Json<OfferEnvelope>, (StatusCode, Json<ErrorBody>)> {
    let mut app_state = state.lock().unwrap();

    let offer = app_state
        .negotiation
        .accept(&offer_id, &payload.acting_party_id)
        .map_err(offer_error)?;

    app_state.listings.mark_under_offer(&offer.property_id);

    let counterpart = counterpart_of(&payload.acting_party_id, &offer.buyer_id, &offer.seller_id);
    app_state.notifier.push(
        &counterpart,
        NotificationKind::OfferAccepted,
        format!(
            "Offer on {} accepted at {}",
            offer.property_id,
            offer.effective_amount()
        ),
        Some(offer.id.clone()),
    );
    app_state.log_activity(
        "OFFER_ACCEPTED",
        &format!(
            "{} accepted offer {} at {}",
            payload.acting_party_id,
            offer.id,
            offer.effective_amount()
        ),
    );

    Ok(Json(OfferEnvelope::new(offer)))
}

pub async fn reject_offer(
    State(state): State<SharedState>,
    Path(offer_id): Path<String>,
    Json(payload): Json<OfferActionRequest>,
) -> Result<Json<OfferEnvelope>, (StatusCode, Json<ErrorBody>)> {
    let mut app_state = state.lock().unwrap();

    let offer = app_state
        .negotiation
        .reject(&offer_id, &payload.acting_party_id)
        .map_err(offer_error)?;

    let counterpart = counterpart_of(&payload.acting_party_id, &offer.buyer_id, &offer.seller_id);
    app_state.notifier.push(
        &counterpart,
        NotificationKind::OfferRejected,
        format!("Offer on {} was declined", offer.property_id),
        Some(offer.id.clone()),
    );
    app_state.log_activity(
        "OFFER_REJECTED",
        &format!("{} rejected offer {}", payload.acting_party_id, offer.id),
    );

    Ok(Json(OfferEnvelope::new(offer)))
}

pub async fn counter_offer(
    State(state): State<SharedState>,
    Path(offer_id): Path<String>,
    Json(payload): Json<CounterOfferRequest>,
) -> Result<Json<OfferEnvelope>, (StatusCode, Json<ErrorBody>)> {
    let mut app_state = state.lock().unwrap();

    let offer = app_state
        .negotiation
        .counter(
            &offer_id,
            &payload.acting_party_id,
            payload.counter_amount,
            payload.counter_message,
        )
        .map_err(offer_error)?;

    app_state.notifier.push(
        &offer.buyer_id,
        NotificationKind::OfferCountered,
        format!(
            "Seller countered at {} on {}",
            payload.counter_amount, offer.property_id
        ),
        Some(offer.id.clone()),
    );
    app_state.log_activity(
        "OFFER_COUNTERED",
        &format!(
            "{} countered offer {} at {}",
            payload.acting_party_id, offer.id, payload.counter_amount
        ),
    );

    Ok(Json(OfferEnvelope::new(offer)))
}

fn counterpart_of(acting_party: &str, buyer_id: &str, seller_id: &str) -> String {
    if acting_party == buyer_id {
        seller_id.to_string()
    } else {
        buyer_id.to_string()
    }
}

// ===== LISTING ENDPOINTS =====

pub async fn create_listing(
    State(state): State<SharedState>,
    Json(payload): Json<CreateListingRequest>,
) -> Result<(StatusCode, Json<ListingEnvelope>), (StatusCode, Json<ErrorBody>)> {
    let mut app_state = state.lock().unwrap();

    let listing = Listing::new(
        payload.title,
        payload.description,
        payload.seller_id,
        payload.asking_price,
    )
    .map_err(offer_error)?;

    let listing = app_state.listings.add(listing);
    app_state.log_activity(
        "LISTING_CREATED",
        &format!("{} listed \"{}\"", listing.seller_id, listing.title),
    );

    Ok((
        StatusCode::CREATED,
        Json(ListingEnvelope {
            success: true,
            listing,
        }),
    ))
}

pub async fn get_listing(
    State(state): State<SharedState>,
    Path(listing_id): Path<String>,
) -> Result<Json<ListingEnvelope>, (StatusCode, Json<ErrorBody>)> {
    let app_state = state.lock().unwrap();
    let listing = app_state
        .listings
        .get(&listing_id)
        .map_err(offer_error)?
        .clone();
    Ok(Json(ListingEnvelope {
        success: true,
        listing,
    }))
}

pub async fn list_listings(State(state): State<SharedState>) -> Json<ListingListResponse> {
    let app_state = state.lock().unwrap();
    let listings = app_state.listings.active();
    Json(ListingListResponse {
        success: true,
        count: listings.len(),
        listings,
    })
}

// ===== FAVORITES ENDPOINTS =====

pub async fn get_favorites(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
) -> Json<FavoritesResponse> {
    let app_state = state.lock().unwrap();
    let favorites = app_state.favorites.for_user(&user_id);
    Json(FavoritesResponse::new(
        user_id,
        favorites.into_iter().collect(),
    ))
}

pub async fn toggle_favorite(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
    Json(payload): Json<ToggleFavoriteRequest>,
) -> Json<ToggleFavoriteResponse> {
    let mut app_state = state.lock().unwrap();
    let favorited = app_state.favorites.toggle(&user_id, &payload.property_id);
    Json(ToggleFavoriteResponse {
        success: true,
        property_id: payload.property_id,
        favorited,
    })
}

pub async fn sync_favorites(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
    Json(payload): Json<SyncFavoritesRequest>,
) -> Json<FavoritesResponse> {
    let mut app_state = state.lock().unwrap();
    let local = payload.property_ids.into_iter().collect();
    let merged = app_state.favorites.merge(&user_id, &local);
    app_state.log_activity(
        "FAVORITES_SYNCED",
        &format!("{} merged {} guest favorites", user_id, local.len()),
    );
    Json(FavoritesResponse::new(user_id, merged.into_iter().collect()))
}

// ===== NOTIFICATION ENDPOINTS =====

pub async fn get_notifications(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
) -> Json<NotificationsResponse> {
    let app_state = state.lock().unwrap();
    Json(NotificationsResponse {
        success: true,
        unread: app_state.notifier.unread_count(&user_id),
        notifications: app_state.notifier.for_user(&user_id),
        user_id,
    })
}

pub async fn mark_notifications_read(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
) -> Json<Value> {
    let mut app_state = state.lock().unwrap();
    let marked = app_state.notifier.mark_all_read(&user_id);
    Json(json!({ "success": true, "marked_read": marked }))
}

// ===== ACTIVITY & HEALTH =====

pub async fn get_activity(State(state): State<SharedState>) -> Json<Value> {
    let app_state = state.lock().unwrap();
    Json(json!({ "activity": app_state.activity }))
}

pub async fn health_check(State(state): State<SharedState>) -> Json<Value> {
    let app_state = state.lock().unwrap();
    Json(json!({
        "status": "online",
        "service": "estatebook-marketplace",
        "listings": app_state.listings.listings.len(),
        "offers": app_state.negotiation.stats(),
    }))
}
