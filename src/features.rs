//! Technical-feature harvesting and innovation keyword scoring.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::claim::Claim;
use crate::config::Thresholds;
use crate::error::{EngineError, RecognizerError};
use crate::locale::{Keyword, LocaleTable};
use crate::{dedup_first_seen, round2};

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    Temperature,
    Time,
    Percentage,
    Pressure,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ProcessParameter {
    pub kind: ParameterKind,
    pub value: String,
    pub unit: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TechnicalFeatures {
    pub chemical_entities: Vec<String>,
    pub functional_groups: Vec<String>,
    pub parameters: Vec<ProcessParameter>,
}

impl TechnicalFeatures {
    pub fn count(&self) -> usize {
        self.chemical_entities.len() + self.functional_groups.len() + self.parameters.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordHit {
    pub claim: u32,
    pub keyword: String,
    pub context: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Innovation {
    pub novel_features: Vec<KeywordHit>,
    pub technical_advantages: Vec<KeywordHit>,
    pub score: f64,
}

// ---------------------------------------------------------------------------
// Optional entity recognition
// ---------------------------------------------------------------------------

/// A deeper entity pass supplied by the caller. Its mentions are added to the
/// chemical entities; an error only drops its contribution.
pub trait EntityRecognizer: Send + Sync {
    fn recognize(&self, text: &str, locale: &str) -> Result<Vec<String>, RecognizerError>;
}

/// Recognizes a fixed list of product and substance names.
#[derive(Debug, Clone)]
pub struct LexiconRecognizer {
    pattern: Option<Regex>,
    locales: Vec<String>,
}

impl LexiconRecognizer {
    pub fn new<I, S>(terms: I) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let alternatives: Vec<String> = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_string())
            .filter(|t| !t.is_empty())
            .map(|t| regex::escape(&t))
            .collect();
        let pattern = if alternatives.is_empty() {
            None
        } else {
            let source = format!(r"(?i)\b(?:{})\b", alternatives.join("|"));
            Some(
                Regex::new(&source)
                    .map_err(|e| EngineError::invalid_pattern("lexicon", &source, &e))?,
            )
        };
        Ok(Self {
            pattern,
            locales: Vec::new(),
        })
    }

    /// Restricts the lexicon to one locale; other locales report it unavailable.
    pub fn only_for(mut self, locale: impl Into<String>) -> Self {
        self.locales.push(locale.into().to_lowercase());
        self
    }
}

impl EntityRecognizer for LexiconRecognizer {
    fn recognize(&self, text: &str, locale: &str) -> Result<Vec<String>, RecognizerError> {
        if !self.locales.is_empty() && !self.locales.iter().any(|l| l == locale) {
            return Err(RecognizerError::unavailable(locale));
        }
        Ok(self
            .pattern
            .iter()
            .flat_map(|re| re.find_iter(text).map(|m| m.as_str().to_string()))
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Compiled patterns
// ---------------------------------------------------------------------------

static FORMULA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:[A-Z][a-z]?\d*)+\b").unwrap());

static COMPOUND_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b\w*(?:化合物|compound|molecule)\w*\b").unwrap());

static GROUP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b\w*(?:基团|基團|group|radical)\w*\b").unwrap());

static PARAMETER_PATTERNS: Lazy<Vec<(ParameterKind, Regex)>> = Lazy::new(|| {
    vec![
        (
            ParameterKind::Temperature,
            Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(℃|°C|度)").unwrap(),
        ),
        (
            ParameterKind::Time,
            Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*((?:hours?|hrs?|h|minutes?|min)\b|小时|小時|分钟|分鐘)")
                .unwrap(),
        ),
        (
            ParameterKind::Percentage,
            Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(%|percent\b|百分比)").unwrap(),
        ),
        (
            ParameterKind::Pressure,
            Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*((?:MPa|kPa|Pa|bar)\b|压力|壓力)").unwrap(),
        ),
    ]
});

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Prefix of `text` holding at most `max_chars` characters.
fn cap_scan(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn looks_like_formula(token: &str) -> bool {
    token.len() > 1 && token.chars().any(|c| c.is_ascii_digit())
}

pub fn extract_features(
    claims: &[Claim],
    locale: &str,
    recognizer: Option<&dyn EntityRecognizer>,
    thresholds: &Thresholds,
) -> TechnicalFeatures {
    let joined = claims
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let text = cap_scan(&joined, thresholds.max_scan_chars);

    let mut entities: Vec<String> = FORMULA_RE
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|t| looks_like_formula(t))
        .map(str::to_string)
        .collect();
    entities.extend(COMPOUND_RE.find_iter(text).map(|m| m.as_str().to_string()));

    if let Some(recognizer) = recognizer {
        match recognizer.recognize(text, locale) {
            Ok(found) => entities.extend(found),
            Err(err) => {
                tracing::warn!(error = %err, locale, "entity recognizer failed, continuing without it")
            }
        }
    }

    let groups: Vec<String> = GROUP_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect();

    let mut parameters = Vec::new();
    for (kind, pattern) in PARAMETER_PATTERNS.iter() {
        for caps in pattern.captures_iter(text) {
            parameters.push(ProcessParameter {
                kind: *kind,
                value: caps[1].to_string(),
                unit: caps[2].to_string(),
            });
        }
    }

    let features = TechnicalFeatures {
        chemical_entities: dedup_first_seen(
            entities.into_iter().filter(|e| !e.trim().is_empty()),
        ),
        functional_groups: dedup_first_seen(groups),
        parameters: dedup_first_seen(parameters),
    };
    tracing::debug!(
        entities = features.chemical_entities.len(),
        groups = features.functional_groups.len(),
        parameters = features.parameters.len(),
        "extracted technical features"
    );
    features
}

/// Text within `window` characters either side of `start..end`, trimmed.
fn context_window(text: &str, start: usize, end: usize, window: usize) -> String {
    let ctx_start = text[..start]
        .char_indices()
        .rev()
        .take(window)
        .last()
        .map_or(start, |(i, _)| i);
    let ctx_end = text[end..]
        .char_indices()
        .nth(window)
        .map_or(text.len(), |(i, _)| end + i);
    text[ctx_start..ctx_end].trim().to_string()
}

fn keyword_hits(claim: &Claim, keywords: &[Keyword], window: usize) -> Vec<KeywordHit> {
    keywords
        .iter()
        .filter_map(|keyword| {
            keyword.find(&claim.text).map(|(start, end)| KeywordHit {
                claim: claim.number,
                keyword: keyword.word.clone(),
                context: context_window(&claim.text, start, end, window),
            })
        })
        .collect()
}

/// Each keyword counts at most once per claim.
pub fn identify_innovations(
    claims: &[Claim],
    locale: &LocaleTable,
    thresholds: &Thresholds,
) -> Innovation {
    let window = thresholds.context_window_chars;
    let mut novel_features = Vec::new();
    let mut technical_advantages = Vec::new();

    for claim in claims {
        novel_features.extend(keyword_hits(claim, &locale.innovation_keywords, window));
        technical_advantages.extend(keyword_hits(claim, &locale.advantage_keywords, window));
    }

    let raw = novel_features.len() as f64
        + thresholds.advantage_weight * technical_advantages.len() as f64;
    Innovation {
        score: round2(raw / claims.len().max(1) as f64),
        novel_features,
        technical_advantages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim::Category;
    use crate::config::LocaleSpec;
    use std::collections::BTreeSet;

    fn claim(number: u32, text: &str) -> Claim {
        Claim {
            number,
            text: text.to_string(),
            category: Category::Other,
            word_count: 0,
            complexity_score: 0.0,
            dependency_refs: BTreeSet::new(),
            is_dependent: false,
        }
    }

    struct Failing;

    impl EntityRecognizer for Failing {
        fn recognize(&self, _text: &str, _locale: &str) -> Result<Vec<String>, RecognizerError> {
            Err(RecognizerError::failed("model crashed"))
        }
    }

    #[test]
    fn harvests_formulas_compounds_and_groups() {
        let claims = vec![
            claim(1, "A compound of formula C6H12O6 dissolved in H2O."),
            claim(2, "The compound of claim 1 bearing a methyl group."),
        ];
        let features = extract_features(&claims, "en", None, &Thresholds::default());
        assert_eq!(features.chemical_entities, vec!["C6H12O6", "H2O", "compound"]);
        assert_eq!(features.functional_groups, vec!["group"]);
    }

    #[test]
    fn harvests_process_parameters() {
        let claims = vec![claim(
            1,
            "A method heating at 80 °C for 2 hours at 1.5 MPa to reach 95% purity, then 80 °C again.",
        )];
        let features = extract_features(&claims, "en", None, &Thresholds::default());
        let kinds: Vec<(ParameterKind, &str, &str)> = features
            .parameters
            .iter()
            .map(|p| (p.kind, p.value.as_str(), p.unit.as_str()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (ParameterKind::Temperature, "80", "°C"),
                (ParameterKind::Time, "2", "hours"),
                (ParameterKind::Percentage, "95", "%"),
                (ParameterKind::Pressure, "1.5", "MPa"),
            ]
        );
    }

    #[test]
    fn recognizer_failure_degrades_to_nothing() {
        let claims = vec![claim(1, "A compound comprising aspirin.")];
        let plain = extract_features(&claims, "en", None, &Thresholds::default());
        let failing = extract_features(&claims, "en", Some(&Failing), &Thresholds::default());
        assert_eq!(plain, failing);
    }

    #[test]
    fn lexicon_recognizer_adds_entities_for_its_locale() {
        let claims = vec![claim(1, "A tablet comprising Aspirin and caffeine.")];
        let lexicon = LexiconRecognizer::new(["aspirin", "caffeine"]).unwrap().only_for("en");
        let features = extract_features(&claims, "en", Some(&lexicon), &Thresholds::default());
        assert_eq!(features.chemical_entities, vec!["Aspirin", "caffeine"]);

        assert_eq!(
            lexicon.recognize("anything", "zh"),
            Err(RecognizerError::unavailable("zh"))
        );
    }

    #[test]
    fn scan_is_capped() {
        let claims = vec![claim(1, "H2O then C6H12O6")];
        let thresholds = Thresholds {
            max_scan_chars: 4,
            ..Thresholds::default()
        };
        let features = extract_features(&claims, "en", None, &thresholds);
        assert_eq!(features.chemical_entities, vec!["H2O"]);
        assert_eq!(cap_scan("权利要求", 2), "权利");
    }

    #[test]
    fn innovation_score_weights_advantages() {
        let en = LocaleTable::compile(&LocaleSpec::english()).unwrap();
        let claims = vec![
            claim(1, "A novel compound with improved stability."),
            claim(2, "The compound of claim 1 having a cooling effect."),
        ];
        let innovation = identify_innovations(&claims, &en, &Thresholds::default());
        let novel: Vec<&str> = innovation.novel_features.iter().map(|h| h.keyword.as_str()).collect();
        assert_eq!(novel, vec!["novel", "improved"]);
        assert_eq!(innovation.technical_advantages.len(), 1);
        assert_eq!(innovation.technical_advantages[0].claim, 2);
        // (2 + 0.5) / 2
        assert_eq!(innovation.score, 1.25);
    }

    #[test]
    fn context_window_counts_characters() {
        let text = "0123456789KEY0123456789";
        assert_eq!(context_window(text, 10, 13, 3), "789KEY012");
        assert_eq!(context_window("化合物新颖结构", 9, 15, 1), "物新颖结");
        assert_eq!(context_window("KEY", 0, 3, 50), "KEY");
    }

    #[test]
    fn empty_claims_score_zero() {
        let en = LocaleTable::compile(&LocaleSpec::english()).unwrap();
        let innovation = identify_innovations(&[], &en, &Thresholds::default());
        assert_eq!(innovation.score, 0.0);
        assert!(innovation.novel_features.is_empty());
    }
}
