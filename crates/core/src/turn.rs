//! Turn and Session domain types.
//!
//! These are the core value objects that flow through the entire system:
//! User describes symptoms → Orchestrator builds a request → Gateway generates
//! a reply → both turns land in the Session log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Filename convention for exported transcripts.
pub const TRANSCRIPT_FILE_NAME: &str = "health_consultation_history.txt";

/// MIME type for exported transcripts.
pub const TRANSCRIPT_MIME: &str = "text/plain";

/// Unique identifier for a session (one user visit).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role of a turn in a consultation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person describing their complaint
    User,
    /// The triage assistant
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single turn in a consultation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Unique turn ID
    pub id: String,

    /// Who produced this turn
    pub role: Role,

    /// The text content
    pub content: String,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Create a new user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a new assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// An append-only, ordered log of turns for one user visit.
///
/// Insertion order is conversation order and is replayed verbatim to the
/// backend. Turns are never reordered or mutated after append, so the log is
/// only reachable through [`Session::append`] and the read-only accessors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique session ID
    pub id: SessionId,

    /// Ordered turns — append-only
    turns: Vec<Turn>,

    /// When this session was created
    pub created_at: DateTime<Utc>,

    /// When the last turn was appended
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a new empty session.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            turns: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a turn to the log. Never fails.
    pub fn append(&mut self, turn: Turn) {
        self.updated_at = Utc::now();
        self.turns.push(turn);
    }

    /// The turns in insertion order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Render the session as a flat transcript: one `ROLE: content` block per
    /// turn, separated by blank lines, in session order.
    ///
    /// Returns `None` for an empty session — there is nothing to export, and
    /// that is a no-op rather than an error.
    pub fn export_transcript(&self) -> Option<String> {
        if self.turns.is_empty() {
            return None;
        }

        let blocks: Vec<String> = self
            .turns
            .iter()
            .map(|t| format!("{}: {}", t.role.as_str().to_uppercase(), t.content))
            .collect();

        Some(blocks.join("\n\n"))
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_turn() {
        let turn = Turn::user("I have a headache");
        assert_eq!(turn.role, Role::User);
        assert_eq!(turn.content, "I have a headache");
    }

    #[test]
    fn session_tracks_updates() {
        let mut session = Session::new();
        let created = session.created_at;

        session.append(Turn::user("First complaint"));
        assert_eq!(session.len(), 1);
        assert!(session.updated_at >= created);
    }

    #[test]
    fn turn_serialization_roundtrip() {
        let turn = Turn::assistant("Rest and drink water");
        let json = serde_json::to_string(&turn).unwrap();
        let deserialized: Turn = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.content, "Rest and drink water");
        assert_eq!(deserialized.role, Role::Assistant);
    }

    #[test]
    fn empty_session_has_no_transcript() {
        let session = Session::new();
        assert!(session.export_transcript().is_none());
    }

    #[test]
    fn transcript_preserves_order_and_labels() {
        let mut session = Session::new();
        session.append(Turn::user("my chest hurts"));
        session.append(Turn::assistant("EMERGENCY: go to the nearest hospital"));
        session.append(Turn::user("which one?"));

        let transcript = session.export_transcript().unwrap();
        let blocks: Vec<&str> = transcript.split("\n\n").collect();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0], "USER: my chest hurts");
        assert_eq!(blocks[1], "ASSISTANT: EMERGENCY: go to the nearest hospital");
        assert_eq!(blocks[2], "USER: which one?");
    }

    #[test]
    fn transcript_block_count_matches_turn_count() {
        let mut session = Session::new();
        for i in 0..7 {
            session.append(Turn::user(format!("turn {i}")));
        }
        let transcript = session.export_transcript().unwrap();
        assert_eq!(transcript.split("\n\n").count(), 7);
    }
}
