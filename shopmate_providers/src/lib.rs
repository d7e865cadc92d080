#![deny(
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

//! HTTP clients for the generation and search backends.

pub mod gemini;
pub mod retry;
pub mod serper;

pub use gemini::GeminiProvider;
pub use retry::{RetryPolicy, retry_with_backoff};
pub use serper::SerperProvider;
