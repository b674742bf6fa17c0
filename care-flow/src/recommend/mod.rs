//! Keyword-triggered recommendation engines.
//!
//! Both engines test the document corpus (see [`ParsedDocument::corpus`])
//! against an ordered table of [`KeywordRule`]s. Matching is plain
//! case-insensitive substring containment; every rule is evaluated on its own.

pub mod fitness;
pub mod medicine;

use std::collections::HashSet;

use crate::document::ParsedDocument;

pub use fitness::{FitnessEngine, FitnessRecommendation};
pub use medicine::{MedicineEngine, MedicineRecommendation};

/// A recommendation identified by its display name.
pub trait Named {
    fn name(&self) -> &str;
}

/// A pure function from the session's document to an ordered list of items.
pub trait RecommendationEngine: Send + Sync {
    type Item: Named + Clone;

    fn id(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// `None` means no document has been uploaded for the session; engines
    /// return an empty list in that case.
    fn recommend(&self, document: Option<&ParsedDocument>) -> Vec<Self::Item>;
}

/// Emits `item` when the corpus contains any of `keywords`.
pub struct KeywordRule<T> {
    pub keywords: &'static [&'static str],
    pub item: fn() -> T,
}

impl<T> KeywordRule<T> {
    pub fn matches(&self, corpus: &str) -> bool {
        self.keywords.iter().any(|keyword| corpus.contains(keyword))
    }
}

/// Every item whose rule matches, in table order.
pub fn evaluate_rules<T>(rules: &[KeywordRule<T>], corpus: &str) -> Vec<T> {
    rules
        .iter()
        .filter(|rule| rule.matches(corpus))
        .map(|rule| (rule.item)())
        .collect()
}

/// Drops later items that repeat an earlier name. Order is preserved.
pub fn dedup_by_name<T: Named>(items: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.name().to_string()))
        .collect()
}
