use anyhow::anyhow;
use axum::{
    Json,
    extract::{Path, Query, State, rejection::{JsonRejection, QueryRejection}},
    response::IntoResponse,
};
use tracing::{debug, info};

use parley_db::Database;
use parley_types::api::{MessageView, ParticipantsQuery, SendMessageRequest};

use crate::error::{ApiError, ApiResult};
use crate::{AppState, present, public_user, run_blocking};

/// Path segment that asks for the conversation between the query's
/// `senderId` and `receiverId` instead of naming one by id.
pub const LOOKUP_BY_PARTICIPANTS: &str = "new";

pub async fn send_message(
    State(state): State<AppState>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(req) = payload?;
    run_blocking(&state, move |s| send(&s.db, &req)).await?;
    Ok("Message sent successfully")
}

pub async fn get_messages(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    query: Result<Query<ParticipantsQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(query) = query?;
    let messages = run_blocking(&state, move |s| list(&s.db, &conversation_id, &query)).await?;
    Ok(Json(messages))
}

/// Store a message. The conversation id is taken on trust.
pub fn send(db: &Database, req: &SendMessageRequest) -> ApiResult<String> {
    let (Some(conversation_id), Some(sender_id), Some(message)) = (
        present(&req.conversation_id),
        present(&req.sender_id),
        present(&req.message),
    ) else {
        return Err(ApiError::Validation("Please provide all required fields"));
    };

    let id = db.insert_message(conversation_id, sender_id, message)?;
    info!("Stored message {} in conversation {}", id, conversation_id);
    Ok(id)
}

/// Messages of a conversation in insertion order, each with its sender.
///
/// For [`LOOKUP_BY_PARTICIPANTS`] the conversation is found by its member
/// pair; if there is none the result is empty and nothing is created.
pub fn list(db: &Database, conversation_id: &str, query: &ParticipantsQuery) -> ApiResult<Vec<MessageView>> {
    if conversation_id != LOOKUP_BY_PARTICIPANTS {
        return messages_for(db, conversation_id);
    }

    let (Some(sender_id), Some(receiver_id)) = (present(&query.sender_id), present(&query.receiver_id))
    else {
        debug!("Participant lookup without both ids");
        return Ok(vec![]);
    };

    match db.find_conversation_between(sender_id, receiver_id)? {
        Some(conversation) => messages_for(db, &conversation.id),
        None => Ok(vec![]),
    }
}

/// A sender that no longer resolves fails the whole listing.
fn messages_for(db: &Database, conversation_id: &str) -> ApiResult<Vec<MessageView>> {
    db.get_messages(conversation_id)?
        .into_iter()
        .map(|row| -> ApiResult<MessageView> {
            let sender = db.get_user_by_id(&row.sender_id)?.ok_or_else(|| {
                anyhow!("sender {} of message {} not found", row.sender_id, row.id)
            })?;
            Ok(MessageView {
                user: public_user(sender),
                message: row.message,
            })
        })
        .collect()
}
