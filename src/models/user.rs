use futures::TryStreamExt;
use mongodb::{bson::doc, Collection, Database};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::Result;

/// The slice of a user record the stores are allowed to see. Users are owned
/// by the account subsystem; orders and cards only hold an opaque reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
}

impl UserSummary {
    pub fn collection(db: &Database) -> Collection<UserSummary> {
        db.collection("users")
    }

    /// Resolves the referenced user's name/email, the read-time join used by
    /// order responses. A dangling reference resolves to None; the referencing
    /// record is still returned.
    pub async fn resolve(db: &Database, user_id: &str) -> Result<Option<UserSummary>> {
        let user = Self::collection(db)
            .find_one(doc! { "_id": user_id })
            .projection(doc! { "name": 1, "email": 1 })
            .await?;

        Ok(user)
    }

    /// Batch form of resolve() for whole-collection reads.
    pub async fn resolve_many(
        db: &Database,
        user_ids: &[String],
    ) -> Result<HashMap<String, UserSummary>> {
        let users: Vec<UserSummary> = Self::collection(db)
            .find(doc! { "_id": { "$in": user_ids.to_vec() } })
            .projection(doc! { "name": 1, "email": 1 })
            .await?
            .try_collect()
            .await?;

        Ok(users.into_iter().map(|user| (user.id.clone(), user)).collect())
    }
}
