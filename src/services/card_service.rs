use mongodb::{bson::oid::ObjectId, Database};

use crate::error::Result;
use crate::models::card::{CardPatch, CreateCardData};
use crate::models::{Card, Transaction};

/// Saves a card for the authenticated caller. The identity injected by the
/// auth gate overrides whatever the body claims. Validation runs here and
/// again inside the store, so a direct store call from another call site is
/// held to the same rules.
#[tracing::instrument(skip(db, data), fields(user_id = %user_id))]
pub async fn save_card(db: &Database, user_id: &str, mut data: CreateCardData) -> Result<Card> {
    data.user_id = Some(user_id.to_string());
    data.validate()?;

    let card = Card::create(db, &data).await?;
    tracing::info!(card_id = ?card.id, "Card saved");

    Ok(card)
}

/// The authenticated caller's saved cards. Empty is NotFound, which the route
/// surfaces as 404 rather than an empty array.
pub async fn cards_for_user(db: &Database, user_id: &str) -> Result<Vec<Card>> {
    Card::find_by_user(db, user_id).await
}

/// Administrative read of every stored card.
pub async fn all_cards(db: &Database) -> Result<Vec<Card>> {
    Card::find_all(db).await
}

pub async fn get_card(db: &Database, id: ObjectId) -> Result<Card> {
    Card::find_by_id(db, id).await
}

#[tracing::instrument(skip(db, patch))]
pub async fn update_card(db: &Database, id: ObjectId, patch: &CardPatch) -> Result<Card> {
    let card = Card::update(db, id, patch).await?;
    tracing::info!(card_id = %id, "Card updated");

    Ok(card)
}

#[tracing::instrument(skip(db))]
pub async fn delete_card(db: &Database, id: ObjectId) -> Result<()> {
    Card::delete(db, id).await?;
    tracing::info!(card_id = %id, "Card deleted");

    Ok(())
}

/// Payment history for the authenticated caller. An empty history is a plain
/// empty list.
pub async fn transactions_for_user(db: &Database, user_id: &str) -> Result<Vec<Transaction>> {
    Transaction::find_by_user(db, user_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    async fn test_db() -> Database {
        let client = mongodb::Client::with_uri_str("mongodb://127.0.0.1:27017")
            .await
            .unwrap();
        let db = client.database(&format!("storefront_test_{}", ObjectId::new().to_hex()));
        crate::db::ensure_indexes(&db).await.unwrap();
        db
    }

    fn payload(card_number: &str) -> CreateCardData {
        CreateCardData {
            email: Some("jane@x.com".to_string()),
            name: Some("Jane Doe".to_string()),
            card_number: Some(card_number.to_string()),
            exp_year: Some("2030".to_string()),
            exp_month: Some("05".to_string()),
            cvv: Some("123".to_string()),
            address: Some("221B".to_string()),
            user_id: None,
            card_type: None,
        }
    }

    #[tokio::test]
    #[ignore] // Requires a running MongoDB
    async fn saved_card_round_trips() {
        let db = test_db().await;

        let saved = save_card(&db, "u1", payload("1234567890123456"))
            .await
            .unwrap();
        let id = saved.id.unwrap();

        let fetched = get_card(&db, id).await.unwrap();
        assert_eq!(fetched.card_number, saved.card_number);
        assert_eq!(fetched.user_id, "u1");

        let listed = cards_for_user(&db, "u1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, Some(id));

        db.drop().await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires a running MongoDB
    async fn duplicate_card_number_is_rejected() {
        let db = test_db().await;

        save_card(&db, "u1", payload("1234567890123456"))
            .await
            .unwrap();
        let second = save_card(&db, "u2", payload("1234567890123456")).await;
        assert!(matches!(second, Err(AppError::Duplicate(_))));

        // the original record is untouched
        let listed = cards_for_user(&db, "u1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].user_id, "u1");

        db.drop().await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires a running MongoDB
    async fn user_without_cards_is_not_found() {
        let db = test_db().await;

        let result = cards_for_user(&db, "nobody").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        db.drop().await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires a running MongoDB
    async fn update_merges_patch_and_delete_removes() {
        let db = test_db().await;

        let saved = save_card(&db, "u1", payload("1234567890123456"))
            .await
            .unwrap();
        let id = saved.id.unwrap();

        let patch = CardPatch {
            name: Some("J. Doe".to_string()),
            ..CardPatch::default()
        };
        let updated = update_card(&db, id, &patch).await.unwrap();
        assert_eq!(updated.name, "J. Doe");
        assert_eq!(updated.card_number, saved.card_number);

        delete_card(&db, id).await.unwrap();
        let gone = delete_card(&db, id).await;
        assert!(matches!(gone, Err(AppError::NotFound(_))));

        db.drop().await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires a running MongoDB
    async fn empty_transaction_history_is_an_empty_list() {
        let db = test_db().await;

        let history = transactions_for_user(&db, "u1").await.unwrap();
        assert!(history.is_empty());

        db.drop().await.unwrap();
    }
}
