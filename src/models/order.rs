use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, DateTime},
    options::ReturnDocument,
    Collection, Database,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::UserSummary;

/// A placed purchase. Card fields are a snapshot taken at checkout, not a
/// reference to the saved card, so the two records live independent lives.
/// Only `address` is mutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub address: String,
    pub email: String,
    pub card_no: String,
    pub mm: String,
    pub yy: String,
    pub name: String,
    pub price: f64,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

/// Checkout payload as received from the client. `price` is the client's
/// computed total and is stored as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderData {
    pub user_id: String,
    pub address: String,
    pub email: String,
    pub card_no: String,
    pub mm: String,
    pub yy: String,
    pub name: String,
    pub price: f64,
}

/// An order with its owner's name/email resolved at read time.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedOrder {
    #[serde(flatten)]
    pub order: Order,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

impl Order {
    pub fn collection(db: &Database) -> Collection<Order> {
        db.collection("orders")
    }

    pub async fn create(db: &Database, data: CreateOrderData) -> Result<Order> {
        let now = DateTime::now();
        let mut order = Order {
            id: None,
            user_id: data.user_id,
            address: data.address,
            email: data.email,
            card_no: data.card_no,
            mm: data.mm,
            yy: data.yy,
            name: data.name,
            price: data.price,
            created_at: now,
            updated_at: now,
        };

        let result = Self::collection(db).insert_one(&order).await?;
        order.id = result.inserted_id.as_object_id();

        Ok(order)
    }

    pub async fn find_by_id(db: &Database, id: ObjectId) -> Result<ResolvedOrder> {
        let order = Self::collection(db)
            .find_one(doc! { "_id": id })
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

        let user = UserSummary::resolve(db, &order.user_id).await?;
        Ok(ResolvedOrder { order, user })
    }

    /// All orders placed by a user, owner fields resolved. Empty is NotFound,
    /// mirroring the card store's by-user read.
    pub async fn find_by_user(db: &Database, user_id: &str) -> Result<Vec<ResolvedOrder>> {
        let orders: Vec<Order> = Self::collection(db)
            .find(doc! { "userId": user_id })
            .sort(doc! { "_id": 1 })
            .await?
            .try_collect()
            .await?;

        if orders.is_empty() {
            return Err(AppError::NotFound(
                "No orders found for this user".to_string(),
            ));
        }

        let user = UserSummary::resolve(db, user_id).await?;
        Ok(orders
            .into_iter()
            .map(|order| ResolvedOrder {
                order,
                user: user.clone(),
            })
            .collect())
    }

    /// Every order, owner fields resolved with one batched user lookup.
    pub async fn find_all(db: &Database) -> Result<Vec<ResolvedOrder>> {
        let orders: Vec<Order> = Self::collection(db)
            .find(doc! {})
            .sort(doc! { "_id": 1 })
            .await?
            .try_collect()
            .await?;

        let mut user_ids: Vec<String> = orders.iter().map(|o| o.user_id.clone()).collect();
        user_ids.sort();
        user_ids.dedup();
        let users = UserSummary::resolve_many(db, &user_ids).await?;

        Ok(orders
            .into_iter()
            .map(|order| {
                let user = users.get(&order.user_id).cloned();
                ResolvedOrder { order, user }
            })
            .collect())
    }

    /// Replaces the delivery address and bumps `updatedAt`; every other field
    /// is left untouched.
    pub async fn update_address(db: &Database, id: ObjectId, new_address: &str) -> Result<Order> {
        Self::collection(db)
            .find_one_and_update(
                doc! { "_id": id },
                doc! { "$set": { "address": new_address, "updatedAt": DateTime::now() } },
            )
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
    }

    /// Cancellation is unconditional removal; no soft delete, no audit trail.
    pub async fn delete(db: &Database, id: ObjectId) -> Result<()> {
        let result = Self::collection(db).delete_one(doc! { "_id": id }).await?;
        if result.deleted_count == 0 {
            return Err(AppError::NotFound("Order not found".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_order() -> Order {
        let now = DateTime::now();
        Order {
            id: None,
            user_id: "u1".to_string(),
            address: "A".to_string(),
            email: "jane@x.com".to_string(),
            card_no: "1234567890123456".to_string(),
            mm: "05".to_string(),
            yy: "2030".to_string(),
            name: "Jane Doe".to_string(),
            price: 1999.0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn order_serializes_with_wire_names() {
        let value = serde_json::to_value(sample_order()).unwrap();
        assert!(value.get("userId").is_some());
        assert!(value.get("cardNo").is_some());
        assert!(value.get("createdAt").is_some());
        assert_eq!(value.get("price").and_then(|p| p.as_f64()), Some(1999.0));
    }

    #[test]
    fn checkout_payload_deserializes_from_client_shape() {
        let data: CreateOrderData = serde_json::from_str(
            r#"{
                "userId": "u1",
                "address": "A",
                "email": "jane@x.com",
                "cardNo": "1234567890123456",
                "mm": "05",
                "yy": "2030",
                "name": "Jane Doe",
                "price": 1999
            }"#,
        )
        .unwrap();
        assert_eq!(data.user_id, "u1");
        assert_eq!(data.price, 1999.0);
    }

    #[test]
    fn resolved_order_flattens_user() {
        let resolved = ResolvedOrder {
            order: sample_order(),
            user: Some(UserSummary {
                id: "u1".to_string(),
                name: "Jane Doe".to_string(),
                email: "jane@x.com".to_string(),
            }),
        };
        let value = serde_json::to_value(&resolved).unwrap();
        // order fields stay top-level, resolved user nests under "user"
        assert!(value.get("cardNo").is_some());
        assert_eq!(
            value.pointer("/user/name").and_then(|n| n.as_str()),
            Some("Jane Doe")
        );
    }
}
