//! The payload sent to the generation backend for one turn.

use serde::{Deserialize, Serialize};

use crate::ChatMessage;
use crate::util::SEARCH_CONTEXT_HEADER;

/// Assembled prompt for a single turn.
///
/// Built fresh every turn and never edited afterwards. Backends that accept
/// structured chat input can send `system`, `history` and [`user_block`]
/// separately; others send [`render`].
///
/// [`user_block`]: PromptContext::user_block
/// [`render`]: PromptContext::render
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptContext {
    pub system: String,
    pub history: Vec<ChatMessage>,
    pub search_context: Option<String>,
    pub query: String,
}

impl PromptContext {
    #[must_use]
    pub const fn has_search_context(&self) -> bool {
        self.search_context.is_some()
    }

    /// The final user message: optional search block, then the query.
    #[must_use]
    pub fn user_block(&self) -> String {
        let mut out = String::new();
        if let Some(snippet) = &self.search_context {
            out.push_str(SEARCH_CONTEXT_HEADER);
            out.push('\n');
            out.push_str(snippet);
            out.push_str("\n\n");
        }
        out.push_str("User asked: \"");
        out.push_str(&self.query);
        out.push('"');
        out
    }

    /// Flatten everything into one text payload.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.system.len() + self.query.len() + 256);
        out.push_str(&self.system);
        out.push_str("\n\n");

        if !self.history.is_empty() {
            out.push_str("Conversation so far:\n");
            for msg in &self.history {
                out.push_str(msg.role.label());
                out.push_str(": ");
                out.push_str(&msg.content);
                out.push('\n');
            }
            out.push('\n');
        }

        out.push_str(&self.user_block());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;

    fn context(search: Option<&str>) -> PromptContext {
        PromptContext {
            system: "You are a shopping expert.".to_string(),
            history: vec![
                ChatMessage {
                    role: Role::User,
                    content: "I need a laptop".to_string(),
                },
                ChatMessage {
                    role: Role::Assistant,
                    content: "What is your budget?".to_string(),
                },
            ],
            search_context: search.map(str::to_string),
            query: "Around $800".to_string(),
        }
    }

    #[test]
    fn render_orders_sections() {
        let text = context(Some("[1] Best laptops under $800")).render();

        let system = text.find("shopping expert").unwrap_or(usize::MAX);
        let history = text.find("User: I need a laptop").unwrap_or(usize::MAX);
        let search = text.find(SEARCH_CONTEXT_HEADER).unwrap_or(usize::MAX);
        let query = text.find("User asked: \"Around $800\"").unwrap_or(usize::MAX);

        assert!(system < history);
        assert!(history < search);
        assert!(search < query);
        assert!(text.ends_with("User asked: \"Around $800\""));
    }

    #[test]
    fn render_without_search_has_no_block() {
        let text = context(None).render();
        assert!(!text.contains(SEARCH_CONTEXT_HEADER));
        assert!(text.contains("Assistant: What is your budget?"));
    }

    #[test]
    fn user_block_without_history_or_search() {
        let ctx = PromptContext {
            system: String::new(),
            history: Vec::new(),
            search_context: None,
            query: "gift ideas".to_string(),
        };
        assert_eq!(ctx.user_block(), "User asked: \"gift ideas\"");
        assert!(!ctx.render().contains("Conversation so far"));
    }
}
