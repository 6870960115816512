//! Compiled locale tables and language resolution.
//!
//! A [`LocaleSpec`] row is compiled once into a [`LocaleTable`] when the engine is
//! built; tables are read-only afterwards and shared by every analysis.

use regex::Regex;

use crate::claim::Category;
use crate::config::{DetectionConfig, LocaleSpec};
use crate::error::{EngineError, Result};

/// Language hint asking the engine to detect the locale itself
pub const AUTO: &str = "auto";

/// A keyword with a case-insensitive matcher, so hits keep the text's own casing
#[derive(Debug, Clone)]
pub struct Keyword {
    pub word: String,
    pattern: Regex,
}

impl Keyword {
    fn compile(locale: &str, word: &str) -> Result<Self> {
        let word = word.to_lowercase();
        let source = format!("(?i){}", regex::escape(&word));
        let pattern =
            Regex::new(&source).map_err(|e| EngineError::invalid_pattern(locale, &source, &e))?;
        Ok(Self { word, pattern })
    }

    /// Byte range of the first occurrence in `text`, if any.
    pub fn find(&self, text: &str) -> Option<(usize, usize)> {
        self.pattern.find(text).map(|m| (m.start(), m.end()))
    }
}

#[derive(Debug, Clone)]
pub struct LocaleTable {
    pub code: String,
    pub markers: Vec<Regex>,
    pub claim_keywords: Vec<String>,
    pub dependency_phrases: Vec<String>,
    /// Category keyword lists in priority order
    pub categories: Vec<(Category, Vec<String>)>,
    pub innovation_keywords: Vec<Keyword>,
    pub advantage_keywords: Vec<Keyword>,
}

fn lowered(words: &[String]) -> Vec<String> {
    words
        .iter()
        .map(|w| w.to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

impl LocaleTable {
    pub fn compile(spec: &LocaleSpec) -> Result<Self> {
        let code = spec.code.trim().to_lowercase();
        if code.is_empty() {
            return Err(EngineError::invalid_locale(&spec.code, "empty locale code"));
        }
        if code == AUTO {
            return Err(EngineError::invalid_locale(&spec.code, "'auto' is reserved"));
        }

        let mut markers = Vec::with_capacity(spec.claim_markers.len());
        for source in &spec.claim_markers {
            let re = Regex::new(source).map_err(|e| EngineError::invalid_pattern(&code, source, &e))?;
            for group in ["marker", "num"] {
                if !re.capture_names().flatten().any(|name| name == group) {
                    return Err(EngineError::missing_group(&code, source, group));
                }
            }
            markers.push(re);
        }

        let categories = vec![
            (Category::Product, lowered(&spec.categories.product)),
            (Category::Method, lowered(&spec.categories.method)),
            (Category::Use, lowered(&spec.categories.use_)),
            (Category::Composition, lowered(&spec.categories.composition)),
        ];

        let innovation_keywords = spec
            .innovation_keywords
            .iter()
            .map(|w| Keyword::compile(&code, w))
            .collect::<Result<Vec<_>>>()?;
        let advantage_keywords = spec
            .advantage_keywords
            .iter()
            .map(|w| Keyword::compile(&code, w))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            claim_keywords: lowered(&spec.claim_keywords),
            dependency_phrases: lowered(&spec.dependency_phrases),
            code,
            markers,
            categories,
            innovation_keywords,
            advantage_keywords,
        })
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LocaleRegistry {
    tables: Vec<LocaleTable>,
    detection: DetectionConfig,
}

impl LocaleRegistry {
    pub fn new(specs: &[LocaleSpec], detection: DetectionConfig) -> Result<Self> {
        let tables = specs
            .iter()
            .map(LocaleTable::compile)
            .collect::<Result<Vec<_>>>()?;
        let registry = Self { tables, detection };
        for code in [&registry.detection.base_locale, &registry.detection.cjk_locale] {
            if registry.get(code).is_none() {
                return Err(EngineError::locale_not_configured(code.as_str()));
            }
        }
        Ok(registry)
    }

    pub fn get(&self, code: &str) -> Option<&LocaleTable> {
        let code = code.trim().to_lowercase();
        self.tables.iter().find(|t| t.code == code)
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.code.as_str())
    }

    /// Picks the table for a language hint. `"auto"` and unknown codes fall back
    /// to detection.
    pub fn resolve(&self, text: &str, requested: &str) -> Result<&LocaleTable> {
        let requested = requested.trim().to_lowercase();
        if requested != AUTO {
            if let Some(table) = self.get(&requested) {
                return Ok(table);
            }
            tracing::debug!(requested = %requested, "unknown locale code, detecting instead");
        }
        let detected = detect_language(text, &self.detection);
        self.get(detected)
            .ok_or_else(|| EngineError::locale_not_configured(detected))
    }
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

fn is_cjk_ideograph(c: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&c)
}

/// Script-ratio heuristic. Never fails; empty text gets the base locale.
pub fn detect_language<'a>(text: &str, detection: &'a DetectionConfig) -> &'a str {
    let total = text.chars().count();
    let cjk = text.chars().filter(|c| is_cjk_ideograph(*c)).count();
    if cjk as f64 / total.max(1) as f64 > detection.cjk_ratio {
        &detection.cjk_locale
    } else {
        &detection.base_locale
    }
}
