#![warn(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Query orchestration for the shopping assistant.
//!
//! # Key Features
//! - Per-session conversation log with explicit reset
//! - Heuristic live-search augmentation that never fails a turn
//! - Deterministic prompt composition over a bounded history window
//! - One assistant turn for every user turn, even when generation fails

mod augment;
mod history;
mod intent;
mod manager;
mod session;

pub use augment::{AugmentConfig, SearchAugmenter, normalize_results};
pub use history::{HistoryConfig, HistoryWindow, PromptComposer};
pub use intent::{IntentDetector, ShoppingIntent};
pub use manager::{AssistantOrchestrator, ConversationError, OrchestratorConfig, TurnOutcome};
pub use session::ConversationState;
