use serde::{Deserialize, Serialize};

/// The public projection of a user. Never carries the password hash or the
/// stored session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub email: String,
    pub full_name: String,
}
