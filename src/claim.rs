//! Claim records and the per-claim classifier.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::locale::LocaleTable;
use crate::round2;
use crate::segment::RawClaim;

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// Claim category, declared in classifier priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Product,
    Method,
    Use,
    Composition,
    Other,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Method => "method",
            Self::Use => "use",
            Self::Composition => "composition",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Claim {
    pub number: u32,
    pub text: String,
    pub category: Category,
    pub word_count: usize,
    pub complexity_score: f64,
    /// Existing claims this claim references, never its own number
    pub dependency_refs: BTreeSet<u32>,
    pub is_dependent: bool,
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

const COMMA_WEIGHT: f64 = 0.1;
const SEMICOLON_WEIGHT: f64 = 0.2;
const BRACKET_WEIGHT: f64 = 0.15;

static SENTENCE_DELIM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]").unwrap());

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Syntactic density: words per sentence segment plus weighted punctuation.
///
/// Segments are counted the way a plain split on `.`, `!` and `?` counts them,
/// so a trailing terminator contributes an empty final segment.
pub fn complexity_score(text: &str) -> f64 {
    let words = word_count(text) as f64;
    let sentences = SENTENCE_DELIM_RE.split(text).count().max(1) as f64;
    let commas = text.matches(',').count() as f64;
    let semicolons = text.matches(';').count() as f64;
    let brackets = (text.matches('(').count() + text.matches('[').count()) as f64;

    round2(
        words / sentences
            + commas * COMMA_WEIGHT
            + semicolons * SEMICOLON_WEIGHT
            + brackets * BRACKET_WEIGHT,
    )
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// First category whose keyword list hits the lower-cased text.
pub fn classify(text: &str, locale: &LocaleTable) -> Category {
    let lower = text.to_lowercase();
    locale
        .categories
        .iter()
        .find(|(_, words)| words.iter().any(|w| lower.contains(w.as_str())))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Other)
}

pub fn is_dependent(text: &str, locale: &LocaleTable) -> bool {
    let lower = text.to_lowercase();
    locale
        .dependency_phrases
        .iter()
        .any(|phrase| lower.contains(phrase.as_str()))
}

/// Builds the claim record; references are filled in by the graph builder.
pub fn build_claim(raw: RawClaim, locale: &LocaleTable) -> Claim {
    Claim {
        number: raw.number,
        category: classify(&raw.text, locale),
        word_count: word_count(&raw.text),
        complexity_score: complexity_score(&raw.text),
        dependency_refs: BTreeSet::new(),
        is_dependent: is_dependent(&raw.text, locale),
        text: raw.text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LocaleSpec;

    fn en() -> LocaleTable {
        LocaleTable::compile(&LocaleSpec::english()).unwrap()
    }

    fn zh() -> LocaleTable {
        LocaleTable::compile(&LocaleSpec::chinese()).unwrap()
    }

    #[test]
    fn classifies_by_priority() {
        let en = en();
        assert_eq!(classify("A compound comprising X.", &en), Category::Product);
        assert_eq!(classify("A method for making a compound", &en), Category::Product);
        assert_eq!(classify("A process for drying", &en), Category::Method);
        assert_eq!(classify("Treatment of fever", &en), Category::Use);
        assert_eq!(classify("A formulation of salts", &en), Category::Composition);
        assert_eq!(classify("An apparatus with a lid", &en), Category::Other);
    }

    #[test]
    fn classifies_chinese() {
        let zh = zh();
        assert_eq!(classify("一种化合物，包含X", &zh), Category::Product);
        assert_eq!(classify("一种制备方法", &zh), Category::Method);
        assert_eq!(classify("一种药物组合物", &zh), Category::Composition);
    }

    #[test]
    fn complexity_follows_formula() {
        // 4 words, "." splits into 2 segments
        assert_eq!(complexity_score("A compound comprising X."), 2.0);
        // 6 words / 1 segment + 2 commas + 1 semicolon + 1 bracket
        assert_eq!(complexity_score("a, b, c; d (e) f"), 6.55);
        assert_eq!(complexity_score(""), 0.0);
    }

    #[test]
    fn dependency_phrase_marks_dependent() {
        let en = en();
        assert!(is_dependent("The compound According to Claim 1", &en));
        assert!(!is_dependent("A compound comprising X", &en));
        assert!(is_dependent("根据权利要求1所述的化合物", &zh()));
    }
}
