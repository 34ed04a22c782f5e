use mongodb::Database;

use crate::config::Config;

/// Shared application state handed to every route handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Config,
}
