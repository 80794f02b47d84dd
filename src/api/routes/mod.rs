pub mod cart;
pub mod catalog;
pub mod sessions;

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::api::{ApiError, AppState};
use crate::storefront::Session;

pub(crate) async fn session_handle(state: &AppState, id: &str) -> Result<Arc<Mutex<Session>>, ApiError> {
    state.sessions.get(id).await.ok_or(ApiError::SessionNotFound)
}
