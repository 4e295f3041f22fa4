use serde::{Deserialize, Serialize};

use crate::models::PublicUser;

// -- Session claims --

/// Claims carried by a session token. Shared by the issuer (login) and the
/// `require_auth` middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub email: String,
    /// Unique per issuance, so two logins in the same second differ.
    pub jti: String,
    pub iat: usize,
    pub exp: usize,
}

// -- Auth --

// Request fields are optional at the serde level so that a missing field is
// reported as a validation error rather than a deserialization rejection.
// Unknown fields are ignored.

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: PublicUser,
    pub token: String,
}

// -- Conversations --

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConversationRequest {
    pub sender_id: Option<String>,
    pub receiver_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    /// The other member of the conversation.
    pub user: PublicUser,
    pub conversation_id: String,
}

// -- Messages --

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub conversation_id: Option<String>,
    pub sender_id: Option<String>,
    pub message: Option<String>,
    /// Accepted for client compatibility; the conversation already names both members.
    pub receiver_id: Option<String>,
}

/// Query string for `GET /api/message/new`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantsQuery {
    pub sender_id: Option<String>,
    pub receiver_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageView {
    /// The sender.
    pub user: PublicUser,
    pub message: String,
}

// -- Users --

#[derive(Debug, Serialize, Deserialize)]
pub struct UserEntry {
    pub user: PublicUser,
}
