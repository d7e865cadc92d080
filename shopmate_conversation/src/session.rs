//! Per-session conversation log.
//!
//! A session owns the ordered list of turns exchanged so far. Sessions never
//! share state; each chat gets its own `ConversationState`.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use shopmate_core::{Role, Turn};

/// Ordered, append-only log of turns for one session.
#[derive(Debug, Clone)]
pub struct ConversationState {
    id: Uuid,
    turns: Vec<Turn>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ConversationState {
    /// Create a new empty conversation.
    #[must_use]
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            turns: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
        self.updated_at = Utc::now();
    }

    /// All turns in insertion order.
    #[must_use]
    pub fn history(&self) -> &[Turn] {
        &self.turns
    }

    /// Get the last N turns.
    #[must_use]
    pub fn last_n(&self, n: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }

    #[must_use]
    pub fn count(&self, role: Role) -> usize {
        self.turns.iter().filter(|t| t.role() == role).count()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Drop every turn ("new chat"). The session id is kept.
    pub fn clear(&mut self) {
        self.turns.clear();
        self.updated_at = Utc::now();
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_turns_in_order() {
        let mut state = ConversationState::new();
        assert!(state.is_empty());

        state.append(Turn::user("Need a laptop for video editing"));
        state.append(Turn::assistant("What is your budget?"));
        state.append(Turn::user("About $1500"));

        assert_eq!(state.len(), 3);
        assert_eq!(state.count(Role::User), 2);
        assert_eq!(state.count(Role::Assistant), 1);

        let texts: Vec<&str> = state.history().iter().map(Turn::text).collect();
        assert_eq!(
            texts,
            [
                "Need a laptop for video editing",
                "What is your budget?",
                "About $1500"
            ]
        );
        let timestamps: Vec<_> = state.history().iter().map(Turn::timestamp).collect();
        assert!(timestamps.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn last_n_is_a_suffix() {
        let mut state = ConversationState::new();
        for i in 0..6 {
            state.append(Turn::user(format!("question {i}")));
            state.append(Turn::assistant(format!("answer {i}")));
        }

        let tail = state.last_n(3);
        assert_eq!(tail.len(), 3);
        assert_eq!(tail[0].text(), "answer 4");
        assert_eq!(tail[2].text(), "answer 5");
        assert_eq!(state.last_n(100).len(), 12);
        assert!(state.last_n(0).is_empty());
    }

    #[test]
    fn clear_keeps_session_identity() {
        let mut state = ConversationState::new();
        let id = state.id();
        state.append(Turn::user("Compare laptops"));
        state.clear();

        assert!(state.is_empty());
        assert_eq!(state.id(), id);
        assert!(state.updated_at() >= state.created_at());
    }

    #[test]
    fn sessions_are_independent() {
        let mut a = ConversationState::new();
        let b = ConversationState::new();
        a.append(Turn::user("only in a"));

        assert_ne!(a.id(), b.id());
        assert!(b.is_empty());
    }
}
