/// Database row types — these map directly to SQLite rows.
/// Distinct from parley-types API models to keep the DB layer independent.

pub struct UserRow {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub token: Option<String>,
    pub created_at: String,
}

pub struct ConversationRow {
    pub id: String,
    /// Members in creation order: sender, then receiver.
    pub members: [String; 2],
    pub created_at: String,
}

impl ConversationRow {
    /// The first member that is not `user_id`. `None` when both members are
    /// `user_id`.
    pub fn counterpart(&self, user_id: &str) -> Option<&str> {
        self.members.iter().map(String::as_str).find(|m| *m != user_id)
    }
}

pub struct MessageRow {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub message: String,
    pub created_at: String,
}
