// Models module - document schemas and store operations

pub mod card;
pub mod order;
pub mod transaction;
pub mod user;

pub use card::Card;
pub use order::Order;
pub use transaction::Transaction;
pub use user::UserSummary;
