use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    response::IntoResponse,
};
use tracing::{info, warn};

use parley_db::Database;
use parley_types::api::{ConversationSummary, CreateConversationRequest};

use crate::error::{ApiError, ApiResult};
use crate::{AppState, present, public_user, run_blocking};

pub async fn create_conversation(
    State(state): State<AppState>,
    payload: Result<Json<CreateConversationRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(req) = payload?;
    run_blocking(&state, move |s| create(&s.db, &req)).await?;
    Ok("Conversation created successfully")
}

pub async fn list_conversations(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let summaries = run_blocking(&state, move |s| list_for_user(&s.db, &user_id)).await?;
    Ok(Json(summaries))
}

/// Insert a conversation with members `[sender, receiver]`. Neither id is
/// checked against the user store, and an existing conversation between the
/// same pair does not prevent a new one. Nor does `sender == receiver`;
/// listing treats such a row as a data error.
pub fn create(db: &Database, req: &CreateConversationRequest) -> ApiResult<String> {
    let (Some(sender_id), Some(receiver_id)) = (present(&req.sender_id), present(&req.receiver_id))
    else {
        return Err(ApiError::Validation("Please provide both senderId and receiverId"));
    };
    let id = db.create_conversation(sender_id, receiver_id)?;
    info!("Created conversation {} between {} and {}", id, sender_id, receiver_id);
    Ok(id)
}

/// Every conversation `user_id` belongs to, each paired with the other
/// member's profile. Entries whose counterpart cannot be resolved, or whose
/// members are both `user_id`, are skipped.
pub fn list_for_user(db: &Database, user_id: &str) -> ApiResult<Vec<ConversationSummary>> {
    let conversations = db.get_conversations_for_user(user_id)?;

    let mut summaries = Vec::with_capacity(conversations.len());
    for conversation in conversations {
        let Some(other_id) = conversation.counterpart(user_id) else {
            warn!("Conversation {} has {} as both members; skipping", conversation.id, user_id);
            continue;
        };
        let Some(other) = db.get_user_by_id(other_id)? else {
            warn!("Conversation {} references missing user {}; skipping", conversation.id, other_id);
            continue;
        };
        summaries.push(ConversationSummary {
            user: public_user(other),
            conversation_id: conversation.id,
        });
    }

    Ok(summaries)
}
