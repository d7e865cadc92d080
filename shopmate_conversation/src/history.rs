//! Prompt assembly over a bounded history window.
//!
//! The window keeps the most recent turns and evicts the oldest first, both
//! by turn count and by an approximate character budget.

use shopmate_core::util::SHOPPING_SYSTEM_PROMPT;
use shopmate_core::{ChatMessage, PromptContext, Role, Turn};

/// Configuration for the history window.
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// Maximum number of prior turns in a prompt
    pub max_turns: usize,
    /// Maximum characters across those turns (approximate token limit)
    pub max_chars: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_turns: 10,
            max_chars: 8000,
        }
    }
}

impl HistoryConfig {
    /// Create a config with specific turn limit.
    #[must_use]
    pub const fn with_max_turns(mut self, max: usize) -> Self {
        self.max_turns = max;
        self
    }

    /// Create a config with specific character limit.
    #[must_use]
    pub const fn with_max_chars(mut self, max: usize) -> Self {
        self.max_chars = max;
        self
    }
}

/// A sliding window over conversation history.
#[derive(Debug, Clone, Default)]
pub struct HistoryWindow {
    config: HistoryConfig,
}

impl HistoryWindow {
    #[must_use]
    pub const fn with_config(config: HistoryConfig) -> Self {
        Self { config }
    }

    /// Select the most recent turns that fit the window.
    ///
    /// The result is always a suffix of `turns`, so nothing older than the
    /// window boundary can be included. It never starts with an assistant
    /// turn whose question was evicted.
    #[must_use]
    pub fn select<'a>(&self, turns: &'a [Turn]) -> &'a [Turn] {
        let mut start = turns.len().saturating_sub(self.config.max_turns);
        let mut total_chars: usize = turns[start..].iter().map(char_len).sum();

        // Truncate from the front (oldest turns)
        while start < turns.len() && total_chars > self.config.max_chars {
            total_chars -= char_len(&turns[start]);
            start += 1;
        }

        if turns.get(start).is_some_and(|t| t.role() == Role::Assistant) {
            start += 1;
        }

        &turns[start..]
    }

    #[must_use]
    pub const fn config(&self) -> &HistoryConfig {
        &self.config
    }
}

fn char_len(turn: &Turn) -> usize {
    turn.text().chars().count()
}

/// Builds the prompt for one turn. Pure: same inputs, same output.
#[derive(Debug, Clone)]
pub struct PromptComposer {
    system_prompt: String,
    window: HistoryWindow,
}

impl PromptComposer {
    #[must_use]
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            system_prompt: SHOPPING_SYSTEM_PROMPT.to_string(),
            window: HistoryWindow::with_config(config),
        }
    }

    /// Set the persona preamble.
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: String) -> Self {
        self.system_prompt = prompt;
        self
    }

    /// Compose the prompt from prior turns, the new query and an optional
    /// search snippet.
    #[must_use]
    pub fn compose(
        &self,
        history: &[Turn],
        query: &str,
        search_snippet: Option<&str>,
    ) -> PromptContext {
        PromptContext {
            system: self.system_prompt.clone(),
            history: self
                .window
                .select(history)
                .iter()
                .map(ChatMessage::from)
                .collect(),
            search_context: search_snippet
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            query: query.to_string(),
        }
    }

    #[must_use]
    pub const fn window(&self) -> &HistoryWindow {
        &self.window
    }
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}
