use chrono::{Datelike, Utc};
use futures::TryStreamExt;
use mongodb::{
    bson::{self, doc, oid::ObjectId},
    options::ReturnDocument,
    Collection, Database,
};
use serde::{Deserialize, Serialize};

use crate::error::{is_duplicate_key, AppError, Result};

/// A saved payment instrument. Orders copy the fields they need at checkout
/// time, so a card can be edited or deleted without touching order history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub name: String,
    pub card_number: String,
    pub exp_year: String,
    pub exp_month: String,
    pub cvv: String,
    pub address: String,
    #[serde(rename = "userid")]
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_type: Option<String>,
}

/// Incoming card payload. Fields are optional so that missing ones surface as
/// a validation error listing every gap, not a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardData {
    pub email: Option<String>,
    pub name: Option<String>,
    pub card_number: Option<String>,
    pub exp_year: Option<String>,
    pub exp_month: Option<String>,
    pub cvv: Option<String>,
    pub address: Option<String>,
    #[serde(rename = "userid")]
    pub user_id: Option<String>,
    pub card_type: Option<String>,
}

/// Typed patch for card updates. Unknown fields are rejected outright rather
/// than silently merged into the document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CardPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp_month: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cvv: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_type: Option<String>,
}

fn required(value: Option<&str>, name: &'static str, missing: &mut Vec<&'static str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => {
            missing.push(name);
            String::new()
        }
    }
}

impl CreateCardData {
    /// Validates the payload and produces the document to persist. Shared by
    /// the service layer and the store so a direct store call gets the same
    /// checks the service applies.
    pub fn validate(&self) -> Result<Card> {
        let mut missing = Vec::new();

        let email = required(self.email.as_deref(), "email", &mut missing);
        let name = required(self.name.as_deref(), "name", &mut missing);
        let card_number = required(self.card_number.as_deref(), "cardNumber", &mut missing);
        let exp_year = required(self.exp_year.as_deref(), "expYear", &mut missing);
        let exp_month = required(self.exp_month.as_deref(), "expMonth", &mut missing);
        let cvv = required(self.cvv.as_deref(), "cvv", &mut missing);
        let address = required(self.address.as_deref(), "address", &mut missing);
        let user_id = required(self.user_id.as_deref(), "userid", &mut missing);

        if !missing.is_empty() {
            return Err(AppError::Validation(format!(
                "Required fields are missing: {}",
                missing.join(", ")
            )));
        }

        if card_number.len() < 16 {
            return Err(AppError::Validation(
                "Card number should be 16 digits".to_string(),
            ));
        }

        let year: i32 = exp_year
            .parse()
            .map_err(|_| AppError::Validation("Card expiry year must be numeric".to_string()))?;
        if year < Utc::now().year() {
            return Err(AppError::Validation("Card is expired".to_string()));
        }

        Ok(Card {
            id: None,
            email,
            name,
            card_number,
            exp_year,
            exp_month,
            cvv,
            address,
            user_id,
            card_type: self.card_type.as_deref().map(str::trim).map(str::to_string),
        })
    }
}

impl Card {
    pub fn collection(db: &Database) -> Collection<Card> {
        db.collection("cards")
    }

    /// Validates and persists a new card. The unique index on `cardNumber`
    /// turns a colliding insert into a Duplicate error.
    pub async fn create(db: &Database, data: &CreateCardData) -> Result<Card> {
        let mut card = data.validate()?;

        match Self::collection(db).insert_one(&card).await {
            Ok(result) => {
                card.id = result.inserted_id.as_object_id();
                Ok(card)
            }
            Err(e) if is_duplicate_key(&e) => Err(AppError::Duplicate(format!(
                "A card with number {} already exists",
                card.card_number
            ))),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn find_by_id(db: &Database, id: ObjectId) -> Result<Card> {
        Self::collection(db)
            .find_one(doc! { "_id": id })
            .await?
            .ok_or_else(|| AppError::NotFound("Card not found".to_string()))
    }

    /// All cards saved by a user, in insertion order. An empty result is a
    /// NotFound, not an empty list; callers handle it explicitly.
    pub async fn find_by_user(db: &Database, user_id: &str) -> Result<Vec<Card>> {
        let cards: Vec<Card> = Self::collection(db)
            .find(doc! { "userid": user_id })
            .sort(doc! { "_id": 1 })
            .await?
            .try_collect()
            .await?;

        if cards.is_empty() {
            return Err(AppError::NotFound(
                "No cards found for this user".to_string(),
            ));
        }

        Ok(cards)
    }

    /// Every stored card, unpaginated. Administrative read.
    pub async fn find_all(db: &Database) -> Result<Vec<Card>> {
        let cards = Self::collection(db)
            .find(doc! {})
            .sort(doc! { "_id": 1 })
            .await?
            .try_collect()
            .await?;

        Ok(cards)
    }

    /// Merges the patch into the stored record and returns the updated card.
    /// Changing the card number into one that already exists fails the same
    /// way a colliding create does.
    pub async fn update(db: &Database, id: ObjectId, patch: &CardPatch) -> Result<Card> {
        let set = bson::to_document(patch).map_err(anyhow::Error::from)?;
        if set.is_empty() {
            return Self::find_by_id(db, id).await;
        }

        match Self::collection(db)
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await
        {
            Ok(Some(card)) => Ok(card),
            Ok(None) => Err(AppError::NotFound("Card not found".to_string())),
            Err(e) if is_duplicate_key(&e) => Err(AppError::Duplicate(format!(
                "A card with number {} already exists",
                patch.card_number.as_deref().unwrap_or_default()
            ))),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete(db: &Database, id: ObjectId) -> Result<()> {
        let result = Self::collection(db).delete_one(doc! { "_id": id }).await?;
        if result.deleted_count == 0 {
            return Err(AppError::NotFound("Card not found".to_string()));
        }

        Ok(())
    }
}
