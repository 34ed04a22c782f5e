use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::api::middleware::auth;
use crate::api::parse_object_id;
use crate::error::Result;
use crate::models::card::{CardPatch, CreateCardData};
use crate::services::card_service;
use crate::state::AppState;

/// GET /card - the authenticated caller's saved cards. 404 when none exist.
async fn my_cards(State(state): State<AppState>, headers: HeaderMap) -> Result<impl IntoResponse> {
    let caller = auth::authenticate(&headers, &state.config)?;
    let cards = card_service::cards_for_user(&state.db, &caller.user_id).await?;

    Ok(Json(cards))
}

/// GET /card/transactions - the authenticated caller's payment history.
async fn my_transactions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    let caller = auth::authenticate(&headers, &state.config)?;
    let transactions = card_service::transactions_for_user(&state.db, &caller.user_id).await?;

    Ok(Json(transactions))
}

/// GET /card/all - every stored card, for the admin surface.
async fn all_cards(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let cards = card_service::all_cards(&state.db).await?;
    Ok(Json(cards))
}

/// GET /card/:id
async fn card_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_object_id(&id)?;
    let card = card_service::get_card(&state.db, id).await?;

    Ok(Json(card))
}

/// POST /card/save - saves a card under the authenticated caller's identity.
async fn save_card(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(data): Json<CreateCardData>,
) -> Result<impl IntoResponse> {
    let caller = auth::authenticate(&headers, &state.config)?;
    let card = card_service::save_card(&state.db, &caller.user_id, data).await?;

    Ok((StatusCode::CREATED, Json(card)))
}

/// PUT /card/:id - typed partial update.
async fn update_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<CardPatch>,
) -> Result<impl IntoResponse> {
    let id = parse_object_id(&id)?;
    let card = card_service::update_card(&state.db, id, &patch).await?;

    Ok(Json(card))
}

/// DELETE /card/:id
async fn delete_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_object_id(&id)?;
    card_service::delete_card(&state.db, id).await?;

    Ok(Json(json!({ "message": "Card deleted successfully" })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/card", get(my_cards))
        .route("/card/transactions", get(my_transactions))
        .route("/card/all", get(all_cards))
        .route("/card/save", post(save_card))
        .route(
            "/card/:id",
            get(card_by_id).put(update_card).delete(delete_card),
        )
}
