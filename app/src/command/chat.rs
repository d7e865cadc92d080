//! Multi-turn shopping conversation.
//!
//! Runs either a single question (`-m`) or an interactive session. Each
//! invocation is one independent session.

use shopmate_config::Config;
use tracing::info;

use super::{AssistantOverrides, build_assistant};

/// Input parameters for the Chat command strategy.
#[derive(Debug, Clone)]
pub struct ChatInput {
    /// Optional single message to send (non-interactive mode)
    pub message: Option<String>,
    /// Optional model override
    pub model: Option<String>,
    /// Number of prior turns to keep in context
    pub history_window: Option<usize>,
    /// Disable search augmentation
    pub no_search: bool,
}

/// Strategy for executing the Chat command.
#[derive(Debug, Clone, Copy)]
pub struct ChatStrategy;

impl super::CommandStrategy for ChatStrategy {
    type Input = ChatInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;

        let mut assistant = build_assistant(
            &config,
            AssistantOverrides {
                model: input.model,
                history_window: input.history_window,
                no_search: input.no_search,
            },
        )
        .await?;

        if let Some(msg) = input.message {
            let outcome = assistant.process_turn(&msg).await?;
            println!("{}", outcome.reply);
            info!(
                "Turn {} completed (search context: {})",
                outcome.turn_number, outcome.augmented
            );
        } else {
            assistant.run_interactive().await?;
            info!(
                "Conversation ended: {} total turns",
                assistant.state().len()
            );
        }

        Ok(())
    }
}
