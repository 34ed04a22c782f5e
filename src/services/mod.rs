// Services module - business rules over the stores

pub mod card_service;
pub mod order_service;
