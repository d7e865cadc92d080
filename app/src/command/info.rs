use shopmate_config::{Config, GENERATION_KEY_VARS, SEARCH_KEY_VARS};
use tracing::info;

use super::build_generation_provider;

/// Strategy for displaying configuration and backend status.
///
/// This strategy outputs:
/// - API keys (masked) and where they are read from
/// - Generation backend status, probing the candidate models
/// - Search, augmentation and conversation tunables
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;

        println!("=== shopmate Configuration ===\n");

        println!("API Keys:");
        println!(
            "  Generation ({}): {}",
            GENERATION_KEY_VARS.join(" | "),
            mask_secret(&config.generation.api_key)
        );
        println!(
            "  Search ({}): {}",
            SEARCH_KEY_VARS.join(" | "),
            mask_secret(&config.search.api_key)
        );
        println!();

        println!("Generation:");
        println!("  Endpoint: {}", config.generation.base_url);
        println!("  Model: {}", config.generation.model);
        println!("  Temperature: {}", config.generation.temperature);
        println!("  Max Output Tokens: {}", config.generation.max_output_tokens);
        println!(
            "  Top P / Top K: {} / {}",
            config.generation.top_p, config.generation.top_k
        );
        println!("  Timeout: {}s", config.generation.timeout_secs);
        println!(
            "  Retry: {} x {}ms",
            config.generation.retry.max_retries, config.generation.retry.backoff_ms
        );

        let provider = build_generation_provider(&config)?;
        if provider.has_api_key() {
            info!("Probing generation models");
            let mut candidates = vec![config.generation.model.clone()];
            candidates.extend(
                config
                    .generation
                    .candidate_models
                    .iter()
                    .filter(|m| **m != config.generation.model)
                    .cloned(),
            );
            match provider.probe_models(&candidates).await {
                Some(model) => println!("  Status: ✅ Active (model: {model})"),
                None => println!("  Status: ❌ Unavailable (no candidate model answered)"),
            }
        } else {
            println!("  Status: ❌ Unavailable (running in fallback mode)");
        }
        println!();

        println!("Search:");
        println!("  Endpoint: {}", config.search.base_url);
        println!("  Results Requested: {}", config.search.num_results);
        println!("  Timeout: {}s", config.search.timeout_secs);
        println!();

        println!("Augmentation:");
        println!("  Enabled: {}", config.augmentation.enabled);
        println!("  Top K: {}", config.augmentation.top_k);
        println!("  Max Chars: {}", config.augmentation.max_chars);
        if !config.augmentation.extra_keywords.is_empty() {
            println!(
                "  Extra Keywords: {}",
                config.augmentation.extra_keywords.join(", ")
            );
        }
        println!();

        println!("Conversation:");
        println!("  History Window: {}", config.conversation.history_window);
        println!(
            "  Max History Chars: {}",
            config.conversation.max_history_chars
        );
        println!(
            "  Greeting Shortcut: {}",
            config.conversation.greeting_shortcut
        );
        if let Some(ref prompt) = config.conversation.system_prompt {
            println!("  System Prompt: {}", truncate(prompt, 60));
        }

        Ok(())
    }
}

fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.is_empty() {
        "(not set)".to_string()
    } else if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "***".to_string()
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{head}...")
    }
}
