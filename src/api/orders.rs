use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::parse_object_id;
use crate::error::Result;
use crate::models::order::CreateOrderData;
use crate::services::order_service;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct UpdateAddressBody {
    #[serde(rename = "newAddress")]
    new_address: String,
}

/// POST /order/createOrder - checkout.
async fn create_order(
    State(state): State<AppState>,
    Json(data): Json<CreateOrderData>,
) -> Result<impl IntoResponse> {
    let order = order_service::create_order(&state.db, data).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /order/all - every order, owner fields resolved.
async fn all_orders(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let orders = order_service::all_orders(&state.db).await?;
    Ok(Json(orders))
}

/// GET /order/getOrders/:userId - a user's orders. 404 when none exist.
async fn orders_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse> {
    let orders = order_service::orders_for_user(&state.db, &user_id).await?;
    Ok(Json(orders))
}

/// GET /order/:id
async fn order_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_object_id(&id)?;
    let order = order_service::get_order(&state.db, id).await?;

    Ok(Json(order))
}

/// PUT /order/:id - address is the only mutable field.
async fn update_address(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateAddressBody>,
) -> Result<impl IntoResponse> {
    let id = parse_object_id(&id)?;
    let order = order_service::update_address(&state.db, id, &body.new_address).await?;

    Ok(Json(order))
}

/// DELETE /order/:id - cancellation.
async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_object_id(&id)?;
    order_service::cancel_order(&state.db, id).await?;

    Ok(Json(json!({ "message": "Order deleted successfully" })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/order/createOrder", post(create_order))
        .route("/order/all", get(all_orders))
        .route("/order/getOrders/:user_id", get(orders_by_user))
        .route(
            "/order/:id",
            get(order_by_id).put(update_address).delete(delete_order),
        )
}
