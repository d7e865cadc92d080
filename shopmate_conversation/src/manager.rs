//! Turn orchestration for the shopping assistant.
//!
//! The `AssistantOrchestrator` is the single entry point per user message:
//! validate, record, augment, compose, generate, record, reply.

use std::io::Write;
use std::sync::Arc;

use shopmate_core::util::GREETING_REPLY;
use shopmate_core::{GenError, GenerationParams, LLMProvider, SearchProvider, Turn, Usage};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::augment::SearchAugmenter;
use crate::history::PromptComposer;
use crate::session::ConversationState;

const GREETINGS: [&str; 9] = [
    "hi",
    "hii",
    "hello",
    "hey",
    "hiya",
    "howdy",
    "good morning",
    "good afternoon",
    "good evening",
];

/// Configuration for turn orchestration.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Sampling parameters for every generation call
    pub params: GenerationParams,
    /// Answer bare greetings without calling any backend
    pub greeting_shortcut: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            params: GenerationParams::default(),
            greeting_shortcut: true,
        }
    }
}

/// Errors that reach the caller of [`AssistantOrchestrator::respond`].
///
/// Backend failures are not here: search failures are swallowed and
/// generation failures become the assistant's reply.
#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("Invalid input: {0}")]
    InvalidInput(&'static str),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result of processing a conversation turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Text recorded as the assistant turn
    pub reply: String,
    /// 1-based turn number within the session
    pub turn_number: usize,
    /// Whether search context went into the prompt
    pub augmented: bool,
    /// Token usage reported by the backend
    pub usage: Option<Usage>,
    /// Generation failure rendered into `reply`, if any
    pub error: Option<GenError>,
}

/// Top-level control loop for one session.
pub struct AssistantOrchestrator<P = Arc<dyn LLMProvider>, S = Arc<dyn SearchProvider>>
where
    P: Send + Sync,
    S: Send + Sync,
{
    provider: P,
    augmenter: SearchAugmenter<S>,
    composer: PromptComposer,
    state: ConversationState,
    config: OrchestratorConfig,
}

impl<P, S> AssistantOrchestrator<P, S>
where
    P: LLMProvider + Send + Sync,
    S: SearchProvider + Send + Sync,
{
    pub fn new(
        provider: P,
        augmenter: SearchAugmenter<S>,
        composer: PromptComposer,
        config: OrchestratorConfig,
    ) -> Self {
        let state = ConversationState::new();
        info!("Creating assistant for session: {}", state.id());

        Self {
            provider,
            augmenter,
            composer,
            state,
            config,
        }
    }

    /// Answer one user message and return the reply text.
    ///
    /// Only empty input is an error; every accepted message produces
    /// exactly one user turn followed by one assistant turn.
    pub async fn respond(&mut self, user_message: &str) -> Result<String, ConversationError> {
        self.process_turn(user_message)
            .await
            .map(|outcome| outcome.reply)
    }

    /// Like [`respond`](Self::respond) with per-turn details.
    pub async fn process_turn(
        &mut self,
        user_message: &str,
    ) -> Result<TurnOutcome, ConversationError> {
        let query = user_message.trim();
        if query.is_empty() {
            return Err(ConversationError::InvalidInput("message must not be empty"));
        }

        let turn_number = self.state.count(shopmate_core::Role::User) + 1;
        info!(
            "Processing turn {turn_number} for session: {}",
            self.state.id()
        );

        self.state.append(Turn::user(query));

        if self.config.greeting_shortcut && is_greeting(query) {
            debug!("Greeting detected, replying without backends");
            return Ok(self.finish_turn(TurnOutcome {
                reply: GREETING_REPLY.to_string(),
                turn_number,
                augmented: false,
                usage: None,
                error: None,
            }));
        }

        let snippet = self.augmenter.augment(query).await;

        // The current query goes last in the prompt, not in the history
        let history = self.state.history();
        let prior = &history[..history.len().saturating_sub(1)];
        let prompt = self.composer.compose(prior, query, snippet.as_deref());

        debug!(
            "Prompt: {} history turns, search_context={}",
            prompt.history.len(),
            prompt.has_search_context()
        );

        let outcome = match self.provider.generate(&prompt, &self.config.params).await {
            Ok(response) => TurnOutcome {
                reply: response.content,
                turn_number,
                augmented: prompt.has_search_context(),
                usage: response.usage,
                error: None,
            },
            Err(e) => {
                warn!("Generation failed on turn {turn_number}: {e}");
                TurnOutcome {
                    reply: e.user_message(),
                    turn_number,
                    augmented: prompt.has_search_context(),
                    usage: None,
                    error: Some(e),
                }
            }
        };

        Ok(self.finish_turn(outcome))
    }

    fn finish_turn(&mut self, outcome: TurnOutcome) -> TurnOutcome {
        self.state.append(Turn::assistant(outcome.reply.clone()));
        debug!("Turn {} completed", outcome.turn_number);
        outcome
    }

    /// Start a new chat in the same session.
    pub fn clear(&mut self) {
        info!("Clearing conversation for session: {}", self.state.id());
        self.state.clear();
    }

    #[must_use]
    pub fn history(&self) -> &[Turn] {
        self.state.history()
    }

    #[must_use]
    pub const fn state(&self) -> &ConversationState {
        &self.state
    }

    #[must_use]
    pub fn model(&self) -> &str {
        self.provider.model()
    }

    /// Run an interactive conversation loop.
    ///
    /// This reads from stdin and writes to stdout, maintaining
    /// conversation context across turns.
    pub async fn run_interactive(&mut self) -> Result<(), ConversationError> {
        println!("=== 🛍️  AI Shopping Assistant ({}) ===", self.model());
        println!("Ask me anything about products, comparisons, or shopping advice!");
        println!("Type '/clear' to start over, 'exit' or 'quit' to leave.\n");

        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let mut input = String::new();
            if std::io::stdin().read_line(&mut input)? == 0 {
                break;
            }
            let input = input.trim();

            if matches!(input, "exit" | "quit" | "q") {
                println!(
                    "\nSession ended. Total turns: {}",
                    self.state.count(shopmate_core::Role::User)
                );
                break;
            }

            if input.is_empty() {
                continue;
            }

            if matches!(input, "/clear" | "/new") {
                self.clear();
                println!("Chat history cleared.\n");
                continue;
            }

            match self.process_turn(input).await {
                Ok(outcome) => {
                    println!("\n{}\n", outcome.reply);

                    if let Some(usage) = outcome.usage {
                        debug!(
                            "Tokens: {} prompt + {} completion = {} total",
                            usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
                        );
                    }
                }
                Err(e) => {
                    eprintln!("Error: {e}");
                }
            }
        }

        Ok(())
    }
}

/// Whole-message greeting check ("Hello there!" yes, "which one?" no).
fn is_greeting(message: &str) -> bool {
    let normalized = message
        .trim()
        .trim_end_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace())
        .to_lowercase();
    let normalized = normalized
        .strip_suffix(" there")
        .unwrap_or(&normalized)
        .trim_end_matches([',', ' ']);

    GREETINGS.contains(&normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = OrchestratorConfig::default();
        assert!(config.greeting_shortcut);
        assert_eq!(config.params, GenerationParams::default());
    }

    #[test]
    fn greeting_detection() {
        for greeting in ["hi", "Hello!", "hey there", "Good morning.", "HII", "hello, there!"] {
            assert!(is_greeting(greeting), "{greeting}");
        }
        for other in [
            "this one or which?",
            "hello, can you compare laptops?",
            "high-end blender",
            "What's a good gift idea?",
        ] {
            assert!(!is_greeting(other), "{other}");
        }
    }
}
