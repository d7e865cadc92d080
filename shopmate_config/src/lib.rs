mod schema;

pub use schema::{
    AugmentationConfig, Config, ConversationSettings, GENERATION_KEY_VARS, GenerationConfig,
    RetryConfig, SEARCH_KEY_VARS, SearchConfig,
};
