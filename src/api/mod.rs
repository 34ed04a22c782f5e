// API module - HTTP endpoints

pub mod cards;
pub mod middleware;
pub mod orders;

use mongodb::bson::oid::ObjectId;

use crate::error::AppError;

/// Parses a path id segment. A malformed id is the caller's mistake, not a
/// missing record.
pub(crate) fn parse_object_id(id: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id).map_err(|_| AppError::Validation(format!("Invalid id: {}", id)))
}
