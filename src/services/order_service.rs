use mongodb::{bson::oid::ObjectId, Database};

use crate::error::Result;
use crate::models::order::{CreateOrderData, ResolvedOrder};
use crate::models::Order;

/// Forwards the checkout payload straight to the store. `price` is the
/// client-computed total and is stored as given, with no server-side check
/// against a recomputed cart total.
#[tracing::instrument(skip(db, data), fields(user_id = %data.user_id))]
pub async fn create_order(db: &Database, data: CreateOrderData) -> Result<Order> {
    let order = Order::create(db, data).await?;
    tracing::info!(order_id = ?order.id, "Order created");

    Ok(order)
}

pub async fn orders_for_user(db: &Database, user_id: &str) -> Result<Vec<ResolvedOrder>> {
    Order::find_by_user(db, user_id).await
}

pub async fn all_orders(db: &Database) -> Result<Vec<ResolvedOrder>> {
    Order::find_all(db).await
}

pub async fn get_order(db: &Database, id: ObjectId) -> Result<ResolvedOrder> {
    Order::find_by_id(db, id).await
}

/// Address is the one field an order exposes for mutation. Ownership checks
/// belong to the auth gate, not this layer.
#[tracing::instrument(skip(db, new_address))]
pub async fn update_address(db: &Database, id: ObjectId, new_address: &str) -> Result<Order> {
    let order = Order::update_address(db, id, new_address).await?;
    tracing::info!(order_id = %id, "Order address updated");

    Ok(order)
}

/// Cancellation is deletion; there is no cancelled state to transition into.
#[tracing::instrument(skip(db))]
pub async fn cancel_order(db: &Database, id: ObjectId) -> Result<()> {
    Order::delete(db, id).await?;
    tracing::info!(order_id = %id, "Order cancelled");

    Ok(())
}
