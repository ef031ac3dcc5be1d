//! Append-only chat transcripts

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Who produced an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
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

/// Whether an assistant entry is an answer or a failure notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Message,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptEntry {
    pub role: Role,
    pub kind: EntryKind,
    pub text: String,
    pub at: DateTime<Utc>,
}

/// Ordered list of entries; existing entries are never edited or removed
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.push(Role::User, EntryKind::Message, text.into());
    }

    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.push(Role::Assistant, EntryKind::Message, text.into());
    }

    /// Record a failed answer as an assistant-side notice
    pub fn push_error(&mut self, text: impl Into<String>) {
        self.push(Role::Assistant, EntryKind::Error, text.into());
    }

    fn push(&mut self, role: Role, kind: EntryKind, text: String) {
        self.entries.push(TranscriptEntry {
            role,
            kind,
            text,
            at: Utc::now(),
        });
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_keep_append_order() {
        let mut transcript = Transcript::new();
        transcript.push_user("q1");
        transcript.push_assistant("a1");
        transcript.push_user("q2");
        transcript.push_error("timed out");

        let roles: Vec<Role> = transcript.entries().iter().map(|e| e.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User, Role::Assistant]);
        assert_eq!(transcript.last().unwrap().kind, EntryKind::Error);
        assert_eq!(transcript.entries()[1].text, "a1");
        assert!(transcript.entries()[0].at <= transcript.entries()[3].at);
    }

    #[test]
    fn test_serializes_as_list() {
        let mut transcript = Transcript::new();
        transcript.push_user("hello");
        let json = serde_json::to_value(&transcript).unwrap();
        assert_eq!(json[0]["role"], "user");
        assert_eq!(json[0]["kind"], "message");
    }
}
