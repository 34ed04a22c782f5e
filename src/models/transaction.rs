use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, DateTime},
    Collection, Database,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A recorded payment movement for a user. Read-only through the API; unlike
/// the by-user card and order reads, an empty history is a plain empty list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(rename = "userid")]
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<ObjectId>,
    pub amount: f64,
    pub created_at: DateTime,
}

impl Transaction {
    pub fn collection(db: &Database) -> Collection<Transaction> {
        db.collection("transactions")
    }

    pub async fn find_by_user(db: &Database, user_id: &str) -> Result<Vec<Transaction>> {
        let transactions = Self::collection(db)
            .find(doc! { "userid": user_id })
            .sort(doc! { "_id": 1 })
            .await?
            .try_collect()
            .await?;

        Ok(transactions)
    }
}
