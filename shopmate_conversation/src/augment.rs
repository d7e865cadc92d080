//! Live search augmentation.
//!
//! Turns a shopping query into a short block of search-derived text for the
//! prompt. Every search failure degrades to "no augmentation".

use std::sync::Arc;

use shopmate_core::{SearchProvider, SearchResult};
use tracing::{debug, info, warn};

use crate::intent::IntentDetector;

/// Tunables for search augmentation.
#[derive(Debug, Clone)]
pub struct AugmentConfig {
    pub enabled: bool,
    /// Number of hits folded into the snippet
    pub top_k: usize,
    /// Character cap for the whole snippet
    pub max_chars: usize,
    /// Sentences kept from each hit's snippet
    pub max_sentences: usize,
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            top_k: 3,
            max_chars: 1000,
            max_sentences: 2,
        }
    }
}

pub struct SearchAugmenter<S = Arc<dyn SearchProvider>>
where
    S: Send + Sync,
{
    search: S,
    detector: IntentDetector,
    config: AugmentConfig,
}

impl<S> SearchAugmenter<S>
where
    S: SearchProvider + Send + Sync,
{
    pub fn new(search: S, config: AugmentConfig) -> Self {
        Self {
            search,
            detector: IntentDetector::new(),
            config,
        }
    }

    #[must_use]
    pub fn with_detector(mut self, detector: IntentDetector) -> Self {
        self.detector = detector;
        self
    }

    #[must_use]
    pub fn needs_search(&self, query: &str) -> bool {
        self.config.enabled && self.detector.detect(query).is_some()
    }

    /// Search for `query` when it shows shopping intent and return a
    /// normalized snippet. `None` when skipped, failed or empty.
    pub async fn augment(&self, query: &str) -> Option<String> {
        if !self.config.enabled {
            debug!("Search augmentation disabled");
            return None;
        }

        let Some(intent) = self.detector.detect(query) else {
            debug!("No shopping intent detected, skipping search");
            return None;
        };
        info!("Search triggered by {} intent", intent.as_str());

        let results = match self.search.search(query).await {
            Ok(results) => results,
            Err(e) if e.is_timeout() => {
                warn!("Search timed out, answering without search context");
                return None;
            }
            Err(e) => {
                warn!("Search failed: {e}, answering without search context");
                return None;
            }
        };

        let snippet = normalize_results(
            &results,
            self.config.top_k,
            self.config.max_chars,
            self.config.max_sentences,
        );

        match &snippet {
            Some(text) => info!(
                "Built search context with {} chars from {} results",
                text.chars().count(),
                results.len().min(self.config.top_k)
            ),
            None => debug!("Search returned no usable results"),
        }

        snippet
    }

    #[must_use]
    pub const fn config(&self) -> &AugmentConfig {
        &self.config
    }
}

/// Fold the top hits into one text block of at most `max_chars` chars.
///
/// Each hit contributes one line: its title and the first `max_sentences`
/// sentences of its snippet. Hits that do not fit are dropped; a first hit
/// that alone exceeds the cap is cut.
#[must_use]
pub fn normalize_results(
    results: &[SearchResult],
    top_k: usize,
    max_chars: usize,
    max_sentences: usize,
) -> Option<String> {
    let mut out = String::new();
    let mut used = 0_usize;

    for result in results.iter().take(top_k) {
        let entry = format_entry(result, max_sentences);
        if entry.is_empty() {
            continue;
        }

        let separator = usize::from(!out.is_empty());
        let len = entry.chars().count();

        if used + separator + len > max_chars {
            if out.is_empty() {
                out = truncate_chars(&entry, max_chars);
            }
            break;
        }

        if separator == 1 {
            out.push('\n');
        }
        out.push_str(&entry);
        used += separator + len;
    }

    (!out.is_empty()).then_some(out)
}

fn format_entry(result: &SearchResult, max_sentences: usize) -> String {
    let title = result.title.trim();
    let snippet = result.snippet.split_whitespace().collect::<Vec<_>>().join(" ");
    let snippet = first_sentences(&snippet, max_sentences);

    match (title.is_empty(), snippet.is_empty()) {
        (true, true) => String::new(),
        (false, true) => format!("- {title}"),
        (true, false) => format!("- {snippet}"),
        (false, false) => format!("- {title}: {snippet}"),
    }
}

/// Leading `max_sentences` sentences of `text`.
fn first_sentences(text: &str, max_sentences: usize) -> &str {
    if max_sentences == 0 {
        return "";
    }

    let text = text.trim();
    let mut count = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let at_boundary = chars.peek().is_none_or(|(_, next)| next.is_whitespace());
        if at_boundary {
            count += 1;
            if count >= max_sentences {
                return &text[..i + c.len_utf8()];
            }
        }
    }

    text
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use shopmate_core::SearchError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn hit(title: &str, snippet: &str) -> SearchResult {
        SearchResult {
            title: title.to_string(),
            snippet: snippet.to_string(),
            url: format!("https://example.com/{}", title.len()),
        }
    }

    struct StubSearch {
        outcome: Result<Vec<SearchResult>, SearchError>,
        calls: AtomicUsize,
    }

    impl StubSearch {
        fn new(outcome: Result<Vec<SearchResult>, SearchError>) -> Self {
            Self {
                outcome,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SearchProvider for StubSearch {
        async fn search(&self, _query: &str) -> Result<Vec<SearchResult>, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    #[test]
    fn keeps_top_k_in_order() {
        let results = vec![
            hit("One", "First hit."),
            hit("Two", "Second hit."),
            hit("Three", "Third hit."),
            hit("Four", "Fourth hit."),
        ];
        let text = normalize_results(&results, 3, 1000, 2).unwrap_or_default();
        assert_eq!(
            text,
            "- One: First hit.\n- Two: Second hit.\n- Three: Third hit."
        );
    }

    #[test]
    fn limits_sentences_per_snippet() {
        let results = vec![hit(
            "Galaxy S24",
            "Great camera. Bright 6.2 inch screen!  Battery is average. Costs $799.",
        )];
        let text = normalize_results(&results, 3, 1000, 2).unwrap_or_default();
        assert_eq!(text, "- Galaxy S24: Great camera. Bright 6.2 inch screen!");
    }

    #[test]
    fn respects_char_cap() {
        let long = "word ".repeat(100);
        let results: Vec<SearchResult> = (0..5).map(|i| hit(&format!("Hit {i}"), &long)).collect();
        for cap in [0, 1, 50, 300, 1000] {
            let text = normalize_results(&results, 5, cap, 2);
            let len = text.as_deref().map_or(0, |t| t.chars().count());
            assert!(len <= cap, "cap {cap} exceeded: {len}");
        }
        assert!(normalize_results(&results, 5, 0, 2).is_none());
        let cut = normalize_results(&results, 5, 50, 2).unwrap_or_default();
        assert!(cut.ends_with('…'));
    }

    #[test]
    fn empty_results_yield_none() {
        assert!(normalize_results(&[], 3, 1000, 2).is_none());
        assert!(normalize_results(&[hit("", "  ")], 3, 1000, 2).is_none());
    }

    #[test]
    fn sentence_split_ignores_decimals() {
        assert_eq!(first_sentences("Runs at 3.5 GHz. Fast.", 1), "Runs at 3.5 GHz.");
        assert_eq!(first_sentences("No terminator", 2), "No terminator");
        assert_eq!(first_sentences("Anything.", 0), "");
    }

    #[test]
    fn multibyte_truncation_is_safe() {
        let text = truncate_chars("ééééé", 3);
        assert_eq!(text, "éé…");
    }

    #[tokio::test]
    async fn augment_skips_general_advice() {
        let augmenter = SearchAugmenter::new(
            StubSearch::new(Ok(vec![hit("x", "y")])),
            AugmentConfig::default(),
        );
        assert!(augmenter.augment("What's a good gift idea?").await.is_none());
        assert_eq!(augmenter.search.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn augment_swallows_errors() {
        for err in [
            SearchError::Timeout,
            SearchError::RateLimited,
            SearchError::MissingApiKey,
            SearchError::Http {
                status: 500,
                body: "boom".to_string(),
            },
        ] {
            let augmenter = SearchAugmenter::new(StubSearch::new(Err(err)), AugmentConfig::default());
            assert!(augmenter.augment("best budget laptop").await.is_none());
            assert_eq!(augmenter.search.calls.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn augment_builds_snippet() {
        let augmenter = SearchAugmenter::new(
            StubSearch::new(Ok(vec![hit("Deal", "TV on sale today.")])),
            AugmentConfig::default(),
        );
        assert!(augmenter.needs_search("cheapest 55 inch tv"));
        assert_eq!(
            augmenter.augment("cheapest 55 inch tv").await.as_deref(),
            Some("- Deal: TV on sale today.")
        );
    }

    #[tokio::test]
    async fn disabled_augmenter_never_searches() {
        let augmenter = SearchAugmenter::new(
            StubSearch::new(Ok(vec![hit("x", "y")])),
            AugmentConfig {
                enabled: false,
                ..AugmentConfig::default()
            },
        );
        assert!(!augmenter.needs_search("Compare iPhone 15 vs Galaxy S24"));
        assert!(augmenter.augment("Compare iPhone 15 vs Galaxy S24").await.is_none());
        assert_eq!(augmenter.search.calls.load(Ordering::SeqCst), 0);
    }
}
