//! claimscope: structural and dependency analysis of patent claim sets.
//!
//! Raw claim text goes in, an [`AnalysisReport`] comes out: segmented and
//! classified claims, the reference graph with dependency depths and cycles,
//! corpus statistics, technical features, an innovation score, coverage
//! metrics, rule-based issues and drafting suggestions.
//!
//! Language handling is table driven. English and Chinese rows are built in;
//! more can be added through [`EngineConfig`] without touching code.
//!
//! ```
//! let report = claimscope::analyze(
//!     "Claim 1: A compound comprising X. Claim 2: The compound according to claim 1, wherein X is Y.",
//!     "auto",
//! )
//! .unwrap();
//! assert_eq!(report.claims.len(), 2);
//! assert_eq!(report.graph.cycles.len(), 0);
//! ```
//!
//! Callers with their own configuration build an [`Engine`] once and reuse it:
//!
//! ```
//! use claimscope::{Engine, EngineConfig};
//!
//! let mut config = EngineConfig::default();
//! config.thresholds.length_word_limit = 5;
//! let engine = Engine::new(config).unwrap();
//! let report = engine
//!     .analyze("Claim 1: A compound comprising six plain words.", "en")
//!     .unwrap();
//! assert_eq!(report.issues.len(), 1);
//! ```

use std::collections::HashSet;
use std::hash::Hash;

use once_cell::sync::Lazy;

pub mod claim;
pub mod config;
pub mod coverage;
pub mod engine;
pub mod error;
pub mod features;
pub mod graph;
pub mod locale;
pub mod report;
pub mod segment;
pub mod structure;
pub mod suggest;

pub use claim::{Category, Claim};
pub use config::{DetectionConfig, EngineConfig, LocaleSpec, Thresholds};
pub use coverage::{Coverage, Issue, IssueKind, Severity};
pub use engine::Engine;
pub use error::{ConfigError, EngineError, RecognizerError, Result};
pub use features::{
    EntityRecognizer, Innovation, KeywordHit, LexiconRecognizer, ParameterKind, ProcessParameter,
    TechnicalFeatures,
};
pub use graph::{DependencyGraph, Level};
pub use report::{AnalysisReport, Rating, Summary};
pub use structure::{Distribution, StructureStats};

/// Backs the free [`analyze`]; it never sees a custom config or recognizer.
static DEFAULT_ENGINE: Lazy<Result<Engine>> = Lazy::new(|| Engine::new(EngineConfig::default()));

/// Analyzes `text` with the built-in locale tables and default thresholds.
///
/// A convenience for one-off calls. Library code with its own configuration
/// should build an [`Engine`] with [`Engine::new`] and call [`Engine::analyze`].
pub fn analyze(text: &str, language: &str) -> Result<AnalysisReport> {
    DEFAULT_ENGINE
        .as_ref()
        .map_err(Clone::clone)?
        .analyze(text, language)
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Drops repeats, keeping the first occurrence of each item in input order.
pub(crate) fn dedup_first_seen<T, I>(items: I) -> Vec<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for item in items {
        if seen.insert(item.clone()) {
            unique.push(item);
        }
    }
    unique
}
