//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy with its own input type, dispatched
//! statically from `main`.

use std::time::Duration;

use shopmate_config::Config;
use shopmate_core::LLMProvider;
use shopmate_conversation::{
    AssistantOrchestrator, AugmentConfig, HistoryConfig, IntentDetector, OrchestratorConfig,
    PromptComposer, SearchAugmenter,
};
use shopmate_providers::{GeminiProvider, RetryPolicy, SerperProvider};
use tracing::{info, warn};

mod chat;
mod info;
mod init;
mod version;

pub use chat::{ChatInput, ChatStrategy};
pub use info::InfoStrategy;
pub use init::InitStrategy;
pub use version::VersionStrategy;

/// Core trait defining the contract for all command strategies.
///
/// # Example
/// ```ignore
/// struct MyStrategy;
///
/// impl CommandStrategy for MyStrategy {
///     type Input = MyInput;
///
///     async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
///         // Command logic here
///         Ok(())
///     }
/// }
/// ```
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

/// Build the Gemini client described by `config`.
fn build_generation_provider(config: &Config) -> anyhow::Result<GeminiProvider> {
    let generation = &config.generation;
    let retry = RetryPolicy {
        max_retries: generation.retry.max_retries,
        backoff: Duration::from_millis(generation.retry.backoff_ms),
    };

    Ok(GeminiProvider::new(
        generation.api_key.clone(),
        Duration::from_secs(generation.timeout_secs),
    )?
    .with_base_url(generation.base_url.clone())
    .with_model(generation.model.clone())
    .with_retry_policy(retry))
}

/// Per-invocation overrides from the command line.
#[derive(Debug, Clone, Default)]
pub struct AssistantOverrides {
    pub model: Option<String>,
    pub history_window: Option<usize>,
    pub no_search: bool,
}

/// Search augmentation runs only when enabled, not switched off on the
/// command line, and backed by a search key.
fn augment_config(config: &Config, no_search: bool, search_ready: bool) -> AugmentConfig {
    AugmentConfig {
        enabled: config.augmentation.enabled && !no_search && search_ready,
        top_k: config.augmentation.top_k,
        max_chars: config.augmentation.max_chars,
        ..AugmentConfig::default()
    }
}

fn history_window(config: &Config, requested: Option<usize>) -> anyhow::Result<usize> {
    match requested {
        Some(0) => anyhow::bail!("--history-window must be at least 1"),
        Some(window) => Ok(window),
        None => Ok(config.conversation.history_window),
    }
}

/// Wire providers, augmenter and composer into one session.
async fn build_assistant(
    config: &Config,
    overrides: AssistantOverrides,
) -> anyhow::Result<AssistantOrchestrator<GeminiProvider, SerperProvider>> {
    let mut provider = build_generation_provider(config)?;

    if let Some(model) = overrides.model {
        provider = provider.with_model(model);
    } else if config.generation.probe_models {
        match provider
            .probe_models(&config.generation.candidate_models)
            .await
        {
            Some(model) => provider = provider.with_model(model),
            None => warn!(
                "No candidate model answered, keeping {}",
                config.generation.model
            ),
        }
    }

    let search = SerperProvider::new(
        config.search.api_key.clone(),
        Duration::from_secs(config.search.timeout_secs),
    )?
    .with_base_url(config.search.base_url.clone())
    .with_num_results(config.search.num_results);

    let augment_config = augment_config(config, overrides.no_search, search.has_api_key());
    let augmenter = SearchAugmenter::new(search, augment_config).with_detector(
        IntentDetector::new().with_extra_keywords(&config.augmentation.extra_keywords),
    );

    let history_window = history_window(config, overrides.history_window)?;
    let mut composer = PromptComposer::new(
        HistoryConfig::default()
            .with_max_turns(history_window)
            .with_max_chars(config.conversation.max_history_chars),
    );
    if let Some(prompt) = &config.conversation.system_prompt {
        composer = composer.with_system_prompt(prompt.clone());
    }

    info!(
        "Assistant ready: model={}, history_window={}, search={}",
        provider.model(),
        history_window,
        augmenter.config().enabled
    );

    Ok(AssistantOrchestrator::new(
        provider,
        augmenter,
        composer,
        OrchestratorConfig {
            params: config.generation.params(),
            greeting_shortcut: config.conversation.greeting_shortcut,
        },
    ))
}
