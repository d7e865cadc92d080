use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

use shopmate_core::GenerationParams;

/// Environment variables holding the generation credential, in lookup order.
pub const GENERATION_KEY_VARS: [&str; 2] = ["GENERATION_API_KEY", "GEMINI_API_KEY"];
/// Environment variables holding the search credential, in lookup order.
pub const SEARCH_KEY_VARS: [&str; 2] = ["SEARCH_API_KEY", "SERPER_KEY"];

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub augmentation: AugmentationConfig,
    #[serde(default)]
    pub conversation: ConversationSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GenerationConfig {
    /// Taken from the file or the environment (environment wins); never written back
    #[serde(default, skip_serializing)]
    pub api_key: String,
    #[serde(default = "GenerationConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "GenerationConfig::default_model")]
    pub model: String,
    #[serde(default = "GenerationConfig::default_candidate_models")]
    pub candidate_models: Vec<String>,
    #[serde(default)]
    pub probe_models: bool,
    #[serde(default = "GenerationConfig::default_temperature")]
    pub temperature: f32,
    #[serde(default = "GenerationConfig::default_max_output_tokens")]
    pub max_output_tokens: u32,
    #[serde(default = "GenerationConfig::default_top_p")]
    pub top_p: f32,
    #[serde(default = "GenerationConfig::default_top_k")]
    pub top_k: u32,
    #[serde(default = "GenerationConfig::default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: Self::default_base_url(),
            model: Self::default_model(),
            candidate_models: Self::default_candidate_models(),
            probe_models: false,
            temperature: Self::default_temperature(),
            max_output_tokens: Self::default_max_output_tokens(),
            top_p: Self::default_top_p(),
            top_k: Self::default_top_k(),
            timeout_secs: Self::default_timeout_secs(),
            retry: RetryConfig::default(),
        }
    }
}

impl GenerationConfig {
    fn default_base_url() -> String {
        "https://generativelanguage.googleapis.com/v1beta".to_string()
    }

    fn default_model() -> String {
        "gemini-2.5-flash".to_string()
    }

    fn default_candidate_models() -> Vec<String> {
        [
            "gemini-2.5-flash",
            "gemini-2.5-pro",
            "gemini-flash-latest",
            "gemini-pro-latest",
        ]
        .into_iter()
        .map(str::to_string)
        .collect()
    }

    const fn default_temperature() -> f32 {
        0.7
    }

    const fn default_max_output_tokens() -> u32 {
        2048
    }

    const fn default_top_p() -> f32 {
        0.9
    }

    const fn default_top_k() -> u32 {
        40
    }

    const fn default_timeout_secs() -> u64 {
        30
    }

    #[must_use]
    pub const fn params(&self) -> GenerationParams {
        GenerationParams {
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
            top_p: self.top_p,
            top_k: self.top_k,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    #[serde(default = "RetryConfig::default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "RetryConfig::default_backoff_ms")]
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: Self::default_max_retries(),
            backoff_ms: Self::default_backoff_ms(),
        }
    }
}

impl RetryConfig {
    const fn default_max_retries() -> u32 {
        1
    }

    const fn default_backoff_ms() -> u64 {
        2000
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SearchConfig {
    /// Taken from the file or the environment (environment wins); never written back
    #[serde(default, skip_serializing)]
    pub api_key: String,
    #[serde(default = "SearchConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "SearchConfig::default_num_results")]
    pub num_results: usize,
    #[serde(default = "SearchConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: Self::default_base_url(),
            num_results: Self::default_num_results(),
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

impl SearchConfig {
    fn default_base_url() -> String {
        "https://google.serper.dev".to_string()
    }

    const fn default_num_results() -> usize {
        10
    }

    const fn default_timeout_secs() -> u64 {
        10
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AugmentationConfig {
    #[serde(default = "AugmentationConfig::default_enabled")]
    pub enabled: bool,
    /// Number of search hits folded into the prompt
    #[serde(default = "AugmentationConfig::default_top_k")]
    pub top_k: usize,
    /// Character cap for the whole search block
    #[serde(default = "AugmentationConfig::default_max_chars")]
    pub max_chars: usize,
    /// Additional words that trigger a search
    #[serde(default)]
    pub extra_keywords: Vec<String>,
}

impl Default for AugmentationConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            top_k: Self::default_top_k(),
            max_chars: Self::default_max_chars(),
            extra_keywords: Vec::new(),
        }
    }
}

impl AugmentationConfig {
    const fn default_enabled() -> bool {
        true
    }

    const fn default_top_k() -> usize {
        3
    }

    const fn default_max_chars() -> usize {
        1000
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ConversationSettings {
    /// Number of prior turns included in each prompt
    #[serde(default = "ConversationSettings::default_history_window")]
    pub history_window: usize,
    #[serde(default = "ConversationSettings::default_max_history_chars")]
    pub max_history_chars: usize,
    #[serde(default = "ConversationSettings::default_greeting_shortcut")]
    pub greeting_shortcut: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            history_window: Self::default_history_window(),
            max_history_chars: Self::default_max_history_chars(),
            greeting_shortcut: Self::default_greeting_shortcut(),
            system_prompt: None,
        }
    }
}

impl ConversationSettings {
    const fn default_history_window() -> usize {
        10
    }

    const fn default_max_history_chars() -> usize {
        8000
    }

    const fn default_greeting_shortcut() -> bool {
        true
    }
}

impl Config {
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("shopmate"))
    }

    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load `~/shopmate/config.json` if present, then apply credentials
    /// from the environment.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            info!("Loading config from {}", config_path.display());
            Self::from_json(&std::fs::read_to_string(&config_path)?)?
        } else {
            info!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            Self::default()
        };

        config.apply_env_with(|key| std::env::var(key).ok());
        config.warn_missing_credentials();
        Ok(config)
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Fill credentials from a variable lookup. The first non-empty
    /// variable in each list wins.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let first_set = |vars: &[&str]| {
            vars.iter()
                .filter_map(|&var| lookup(var))
                .find(|value| !value.trim().is_empty())
        };

        if let Some(key) = first_set(&GENERATION_KEY_VARS) {
            self.generation.api_key = key;
        }
        if let Some(key) = first_set(&SEARCH_KEY_VARS) {
            self.search.api_key = key;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.conversation.history_window == 0 {
            anyhow::bail!("conversation.history_window must be at least 1");
        }
        if self.augmentation.enabled && self.augmentation.top_k == 0 {
            anyhow::bail!("augmentation.top_k must be at least 1 when augmentation is enabled");
        }
        if self.generation.timeout_secs == 0 || self.search.timeout_secs == 0 {
            anyhow::bail!("timeouts must be at least 1 second");
        }
        Ok(())
    }

    fn warn_missing_credentials(&self) {
        if self.generation.api_key.is_empty() {
            warn!("GENERATION_API_KEY not set, the assistant will run in fallback mode");
        }
        if self.search.api_key.is_empty() {
            warn!("SEARCH_API_KEY not set, answers will not use live search results");
        }
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join("config.json");

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        let template = serde_json::to_string_pretty(&Self::default())?;
        std::fs::write(&config_path, template)?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Export GENERATION_API_KEY (Gemini) and SEARCH_API_KEY (Serper)");
        println!("   2. Adjust model and tunables in the config file if needed");
        println!("   3. Run 'shopmate chat' to start a conversation");
        println!();
        println!("🔧 Configuration options:");
        println!("   - generation.model: Gemini model to use");
        println!("   - conversation.history_window: prior turns sent with each question");
        println!("   - augmentation.enabled: use live search results for shopping queries");
        println!();
        Ok(())
    }
}
