use mongodb::{
    bson::doc,
    options::{ClientOptions, IndexOptions},
    Client, Database, IndexModel,
};
use std::time::Duration;

use crate::models::Card;

pub async fn connect(database_url: &str, database_name: &str) -> Result<Database, mongodb::error::Error> {
    let mut options = ClientOptions::parse(database_url).await?;
    options.app_name = Some("storefront".to_string());
    options.server_selection_timeout = Some(Duration::from_secs(3));

    let client = Client::with_options(options)?;
    Ok(client.database(database_name))
}

/// Creates the indexes the stores rely on. Card numbers are globally unique,
/// so colliding saves fail at the index rather than in application code.
pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let card_number_index = IndexModel::builder()
        .keys(doc! { "cardNumber": 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build();
    Card::collection(db).create_index(card_number_index).await?;

    Ok(())
}
