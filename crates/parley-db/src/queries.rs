use crate::models::{ConversationRow, MessageRow, UserRow};
use crate::Database;
use anyhow::Result;
use rusqlite::{Connection, Row, ffi};
use uuid::Uuid;

const USER_COLUMNS: &str = "id, full_name, email, password, token, created_at";
const CONVERSATION_COLUMNS: &str = "id, sender_id, receiver_id, created_at";

impl Database {
    // -- Users --

    /// Insert a new user and return its id. Returns `None` if the email is
    /// already registered.
    pub fn create_user(
        &self,
        full_name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Option<String>> {
        let id = Uuid::new_v4().to_string();
        self.with_conn(|conn| {
            let res = conn.execute(
                "INSERT INTO users (id, full_name, email, password) VALUES (?1, ?2, ?3, ?4)",
                (&id, full_name, email, password_hash),
            );
            match res {
                Ok(_) => Ok(Some(id)),
                // Only the email index is UNIQUE on users.
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
                {
                    Ok(None)
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    /// Overwrite the user's stored session token. Returns false if no such user.
    pub fn set_user_token(&self, id: &str, token: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute("UPDATE users SET token = ?1 WHERE id = ?2", (token, id))?;
            Ok(n > 0)
        })
    }

    /// Every user except `id`, in registration order.
    pub fn list_users_except(&self, id: &str) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE id != ?1 ORDER BY rowid"
            ))?;
            let rows = stmt
                .query_map([id], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Conversations --

    pub fn create_conversation(&self, sender_id: &str, receiver_id: &str) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO conversations (id, sender_id, receiver_id) VALUES (?1, ?2, ?3)",
                (&id, sender_id, receiver_id),
            )?;
            Ok(())
        })?;
        Ok(id)
    }

    /// Conversations that have `user_id` as either member, oldest first.
    pub fn get_conversations_for_user(&self, user_id: &str) -> Result<Vec<ConversationRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CONVERSATION_COLUMNS} FROM conversations
                 WHERE sender_id = ?1 OR receiver_id = ?1
                 ORDER BY rowid"
            ))?;
            let rows = stmt
                .query_map([user_id], conversation_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// The oldest conversation whose members are exactly `a` and `b`, in either order.
    pub fn find_conversation_between(&self, a: &str, b: &str) -> Result<Option<ConversationRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CONVERSATION_COLUMNS} FROM conversations
                 WHERE (sender_id = ?1 AND receiver_id = ?2)
                    OR (sender_id = ?2 AND receiver_id = ?1)
                 ORDER BY rowid
                 LIMIT 1"
            ))?;
            let row = stmt.query_row([a, b], conversation_from_row).optional()?;
            Ok(row)
        })
    }

    // -- Messages --

    pub fn insert_message(
        &self,
        conversation_id: &str,
        sender_id: &str,
        message: &str,
    ) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (id, conversation_id, sender_id, message) VALUES (?1, ?2, ?3, ?4)",
                (&id, conversation_id, sender_id, message),
            )?;
            Ok(())
        })?;
        Ok(id)
    }

    /// All messages of a conversation in insertion order.
    pub fn get_messages(&self, conversation_id: &str) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, conversation_id, sender_id, message, created_at
                 FROM messages
                 WHERE conversation_id = ?1
                 ORDER BY rowid",
            )?;
            let rows = stmt
                .query_map([conversation_id], |row| {
                    Ok(MessageRow {
                        id: row.get(0)?,
                        conversation_id: row.get(1)?,
                        sender_id: row.get(2)?,
                        message: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1"))?;
    let row = stmt.query_row([value], user_from_row).optional()?;
    Ok(row)
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        full_name: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        token: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn conversation_from_row(row: &Row<'_>) -> rusqlite::Result<ConversationRow> {
    Ok(ConversationRow {
        id: row.get(0)?,
        members: [row.get(1)?, row.get(2)?],
        created_at: row.get(3)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
