//! Session, message, and user-context database operations.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use super::{Database, DbError, DbResult};
use crate::models::{ChatMessage, Role, Session, UserContext};

/// Raw row before role parsing and JSON decoding.
struct MessageRow {
    role: String,
    content: String,
    timestamp: DateTime<Utc>,
}

impl TryFrom<MessageRow> for ChatMessage {
    type Error = DbError;

    fn try_from(row: MessageRow) -> DbResult<ChatMessage> {
        let role = Role::parse(&row.role)
            .ok_or_else(|| DbError::Constraint(format!("unknown role: {}", row.role)))?;
        Ok(ChatMessage {
            role,
            content: row.content,
            timestamp: row.timestamp,
        })
    }
}

struct ContextRow {
    session_id: i64,
    symptoms: String,
    symptom_durations: String,
    treatments_tried: String,
    medical_history: String,
    cultural_preferences: String,
    language: Option<String>,
}

impl TryFrom<ContextRow> for UserContext {
    type Error = DbError;

    fn try_from(row: ContextRow) -> DbResult<UserContext> {
        Ok(UserContext {
            session_id: row.session_id,
            symptoms: serde_json::from_str(&row.symptoms)?,
            symptom_durations: serde_json::from_str(&row.symptom_durations)?,
            treatments_tried: serde_json::from_str(&row.treatments_tried)?,
            medical_history: serde_json::from_str(&row.medical_history)?,
            cultural_preferences: serde_json::from_str(&row.cultural_preferences)?,
            language: row.language,
        })
    }
}

impl Database {
    /// Create a new chat session, returning its id.
    pub fn create_session(&self) -> DbResult<i64> {
        self.conn
            .execute("INSERT INTO sessions DEFAULT VALUES", [])?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Get a session by id.
    pub fn get_session(&self, session_id: i64) -> DbResult<Option<Session>> {
        let result = self
            .conn
            .query_row(
                "SELECT id, created_at, updated_at FROM sessions WHERE id = ?",
                [session_id],
                |row| {
                    Ok(Session {
                        id: row.get(0)?,
                        created_at: row.get(1)?,
                        updated_at: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(result)
    }

    /// Append a message to a session.
    pub fn insert_message(&self, session_id: i64, message: &ChatMessage) -> DbResult<i64> {
        self.conn.execute(
            "INSERT INTO messages (session_id, role, content, timestamp) VALUES (?1, ?2, ?3, ?4)",
            params![
                session_id,
                message.role.as_str(),
                message.content,
                message.timestamp
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.conn.execute(
            "UPDATE sessions SET updated_at = datetime('now') WHERE id = ?",
            [session_id],
        )?;
        Ok(id)
    }

    /// All messages of a session in chronological order.
    pub fn list_messages(&self, session_id: i64) -> DbResult<Vec<ChatMessage>> {
        let mut stmt = self.conn.prepare(
            "SELECT role, content, timestamp FROM messages
             WHERE session_id = ? ORDER BY timestamp, id",
        )?;

        let rows = stmt.query_map([session_id], |row| {
            Ok(MessageRow {
                role: row.get(0)?,
                content: row.get(1)?,
                timestamp: row.get(2)?,
            })
        })?;

        rows.map(|r| r.map_err(DbError::from).and_then(ChatMessage::try_from))
            .collect()
    }

    /// Number of messages stored for a session.
    pub fn count_messages(&self, session_id: i64) -> DbResult<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM messages WHERE session_id = ?",
            [session_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Get the stored context for a session, if any.
    pub fn get_user_context(&self, session_id: i64) -> DbResult<Option<UserContext>> {
        let result = self
            .conn
            .query_row(
                "SELECT session_id, symptoms, symptom_durations, treatments_tried,
                        medical_history, cultural_preferences, language
                 FROM user_contexts WHERE session_id = ?",
                [session_id],
                |row| {
                    Ok(ContextRow {
                        session_id: row.get(0)?,
                        symptoms: row.get(1)?,
                        symptom_durations: row.get(2)?,
                        treatments_tried: row.get(3)?,
                        medical_history: row.get(4)?,
                        cultural_preferences: row.get(5)?,
                        language: row.get(6)?,
                    })
                },
            )
            .optional()?;

        result.map(|row| row.try_into()).transpose()
    }

    /// Store a context, replacing any existing row for the session.
    pub fn save_user_context(&self, context: &UserContext) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO user_contexts (
                session_id, symptoms, symptom_durations, treatments_tried,
                medical_history, cultural_preferences, language, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, datetime('now'))
            ON CONFLICT(session_id) DO UPDATE SET
                symptoms = excluded.symptoms,
                symptom_durations = excluded.symptom_durations,
                treatments_tried = excluded.treatments_tried,
                medical_history = excluded.medical_history,
                cultural_preferences = excluded.cultural_preferences,
                language = excluded.language,
                updated_at = datetime('now')
            "#,
            params![
                context.session_id,
                serde_json::to_string(&context.symptoms)?,
                serde_json::to_string(&context.symptom_durations)?,
                serde_json::to_string(&context.treatments_tried)?,
                serde_json::to_string(&context.medical_history)?,
                serde_json::to_string(&context.cultural_preferences)?,
                context.language,
            ],
        )?;
        Ok(())
    }

    /// Merge an update into the stored context and return the merged result.
    pub fn merge_user_context(&self, update: &UserContext) -> DbResult<UserContext> {
        let mut context = self
            .get_user_context(update.session_id)?
            .unwrap_or_else(|| UserContext::new(update.session_id));
        context.merge(update);
        self.save_user_context(&context)?;
        Ok(context)
    }
}
