//! Shopping intent detection.
//!
//! Decides whether a query benefits from live search data. Detection is a
//! keyword/pattern heuristic; the pattern set is a tunable.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

/// Why a query was judged to need live data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShoppingIntent {
    /// "compare", "vs", "better than"
    Comparison,
    /// price terms and currency amounts
    Price,
    /// stock, where to buy, shipping
    Availability,
    /// "latest", "newest", model years
    Recency,
    /// "best", "top 5", reviews, specs
    Recommendation,
    /// Tokens shaped like product names: `S24`, `RTX4090`, `iPhone`
    ProductName,
    /// Matched a configured extra keyword
    Custom,
}

impl ShoppingIntent {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Comparison => "comparison",
            Self::Price => "price",
            Self::Availability => "availability",
            Self::Recency => "recency",
            Self::Recommendation => "recommendation",
            Self::ProductName => "product_name",
            Self::Custom => "custom",
        }
    }
}

static DEFAULT_PATTERNS: Lazy<Vec<(Regex, ShoppingIntent)>> = Lazy::new(|| {
    [
        (
            r"(?i)\b(?:compare[ds]?|comparing|comparison|versus|vs)\b|\bbetter than\b|\bdifferences? between\b",
            ShoppingIntent::Comparison,
        ),
        (
            r"(?i)\b(?:prices?|pricing|priced|costs?|cheap(?:er|est)?|affordable|budget|deals?|discounts?|coupons?|on sale|worth it|(?:under|below) \d+)\b|[$€£¥₹]\s?\d",
            ShoppingIntent::Price,
        ),
        (
            r"(?i)\b(?:in stock|out of stock|available|availability|where (?:to|can i) (?:buy|get|find)|buy|shipping|delivery)\b",
            ShoppingIntent::Availability,
        ),
        (
            r"(?i)\b(?:latest|newest|new release|just released|upcoming|this year|20[2-3]\d)\b",
            ShoppingIntent::Recency,
        ),
        (
            r"(?i)\b(?:best|top \d+|top-rated|recommend(?:ed|ation|ations)?|reviews?|ratings?|specs|specifications)\b",
            ShoppingIntent::Recommendation,
        ),
        (
            r"\b[A-Za-z]+\d+[A-Za-z\d]*\b|\b[a-z]+[A-Z][A-Za-z]*\b",
            ShoppingIntent::ProductName,
        ),
    ]
    .iter()
    .filter_map(|(pattern, intent)| Some((Regex::new(pattern).ok()?, *intent)))
    .collect()
});

/// Pattern-based classifier for search-worthy queries.
#[derive(Debug, Clone, Default)]
pub struct IntentDetector {
    extra: Vec<Regex>,
}

impl IntentDetector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add words that also trigger a search. Matched case-insensitively on
    /// word boundaries.
    #[must_use]
    pub fn with_extra_keywords<I, K>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        for keyword in keywords {
            let keyword = keyword.as_ref().trim();
            if keyword.is_empty() {
                continue;
            }
            match Regex::new(&format!(r"(?i)\b{}\b", regex::escape(keyword))) {
                Ok(re) => self.extra.push(re),
                Err(e) => warn!("Ignoring search keyword {keyword:?}: {e}"),
            }
        }
        self
    }

    /// First matching intent, or `None` for general-advice queries.
    #[must_use]
    pub fn detect(&self, query: &str) -> Option<ShoppingIntent> {
        DEFAULT_PATTERNS
            .iter()
            .find(|(re, _)| re.is_match(query))
            .map(|(_, intent)| *intent)
            .or_else(|| {
                self.extra
                    .iter()
                    .any(|re| re.is_match(query))
                    .then_some(ShoppingIntent::Custom)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_default_patterns_compile() {
        assert_eq!(DEFAULT_PATTERNS.len(), 6);
    }

    #[test]
    fn detects_comparison() {
        let detector = IntentDetector::new();
        assert_eq!(
            detector.detect("Compare iPhone 15 vs Galaxy S24"),
            Some(ShoppingIntent::Comparison)
        );
        assert_eq!(
            detector.detect("is the kindle better than a kobo"),
            Some(ShoppingIntent::Comparison)
        );
    }

    #[test]
    fn detects_price_and_availability() {
        let detector = IntentDetector::new();
        assert_eq!(
            detector.detect("good headphones under 100"),
            Some(ShoppingIntent::Price)
        );
        assert_eq!(
            detector.detect("running shoes for $80"),
            Some(ShoppingIntent::Price)
        );
        assert_eq!(
            detector.detect("where can i buy a standing desk"),
            Some(ShoppingIntent::Availability)
        );
    }

    #[test]
    fn detects_recency_and_recommendation() {
        let detector = IntentDetector::new();
        assert_eq!(
            detector.detect("what is the latest kindle"),
            Some(ShoppingIntent::Recency)
        );
        assert_eq!(
            detector.detect("best mechanical keyboard"),
            Some(ShoppingIntent::Recommendation)
        );
    }

    #[test]
    fn detects_product_like_tokens() {
        let detector = IntentDetector::new();
        assert_eq!(
            detector.detect("thoughts on the RTX4090?"),
            Some(ShoppingIntent::ProductName)
        );
        assert_eq!(
            detector.detect("is an iPad good for notes"),
            Some(ShoppingIntent::ProductName)
        );
    }

    #[test]
    fn general_advice_skips_search() {
        let detector = IntentDetector::new();
        assert_eq!(detector.detect("What's a good gift idea?"), None);
        assert_eq!(detector.detect("How do I care for leather shoes?"), None);
        assert_eq!(detector.detect("Thanks, that helps a lot"), None);
    }

    #[test]
    fn extra_keywords_trigger_custom_intent() {
        let detector = IntentDetector::new().with_extra_keywords(["warranty", "  ", "c++"]);
        assert_eq!(
            detector.detect("Does it come with a Warranty?"),
            Some(ShoppingIntent::Custom)
        );
        assert_eq!(detector.detect("warranties explained"), None);
    }
}
