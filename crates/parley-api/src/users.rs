use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use parley_db::Database;
use parley_types::api::UserEntry;

use crate::error::ApiResult;
use crate::{AppState, public_user, run_blocking};

pub async fn list_users(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let users = run_blocking(&state, move |s| list_except(&s.db, &user_id)).await?;
    Ok(Json(users))
}

/// Everyone but `user_id`: the people the requester can start a conversation with.
pub fn list_except(db: &Database, user_id: &str) -> ApiResult<Vec<UserEntry>> {
    let users = db
        .list_users_except(user_id)?
        .into_iter()
        .map(|row| UserEntry { user: public_user(row) })
        .collect();
    Ok(users)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requester_is_excluded() {
        let db = Database::open_in_memory().unwrap();
        let ada = db.create_user("Ada", "ada@example.com", "h").unwrap().unwrap();
        let bob = db.create_user("Bob", "bob@example.com", "h").unwrap().unwrap();

        let users = list_except(&db, &ada).unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].user.id, bob);
        assert_eq!(users[0].user.email, "bob@example.com");
    }
}
