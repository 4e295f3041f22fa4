pub mod auth;
pub mod conversations;
pub mod error;
pub mod messages;
pub mod middleware;
pub mod routes;
pub mod users;

use std::sync::Arc;

use parley_db::Database;
use parley_db::models::UserRow;
use parley_types::models::PublicUser;
use tracing::error;

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
}

/// Run blocking store or hashing work off the async runtime.
pub(crate) async fn run_blocking<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&AppStateInner) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&*state))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.to_string())
        })?
}

/// A request field counts as present only if it holds non-blank text.
pub(crate) fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.trim().is_empty())
}

pub(crate) fn public_user(row: UserRow) -> PublicUser {
    PublicUser {
        id: row.id,
        email: row.email,
        full_name: row.full_name,
    }
}

#[cfg(test)]
pub(crate) fn test_state() -> AppState {
    Arc::new(AppStateInner {
        db: Database::open_in_memory().unwrap(),
        jwt_secret: "test-secret".into(),
    })
}
