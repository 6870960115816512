//! The analysis pipeline.

use std::fmt;

use crate::claim::{build_claim, Claim};
use crate::config::{EngineConfig, Thresholds};
use crate::coverage::{detect_issues, Coverage};
use crate::error::Result;
use crate::features::{extract_features, identify_innovations, EntityRecognizer};
use crate::graph::DependencyGraph;
use crate::locale::LocaleRegistry;
use crate::report::{AnalysisReport, ReportParts};
use crate::segment::segment;
use crate::structure::StructureStats;
use crate::suggest;

/// Compiled locale tables plus thresholds. Immutable once built, so one engine
/// can serve any number of concurrent analyses.
pub struct Engine {
    registry: LocaleRegistry,
    thresholds: Thresholds,
    recognizer: Option<Box<dyn EntityRecognizer>>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("locales", &self.locales())
            .field("thresholds", &self.thresholds)
            .field("recognizer", &self.recognizer.is_some())
            .finish()
    }
}

impl Engine {
    /// Compiles every locale row. Fails on the first bad pattern or on a
    /// detection locale without a table.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let specs = config.locale_specs();
        let registry = LocaleRegistry::new(&specs, config.detection)?;
        tracing::debug!(locales = specs.len(), "engine ready");
        Ok(Self {
            registry,
            thresholds: config.thresholds,
            recognizer: None,
        })
    }

    pub fn with_recognizer(mut self, recognizer: Box<dyn EntityRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    pub fn locales(&self) -> Vec<&str> {
        self.registry.codes().collect()
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Runs the full pipeline on `text`. `language` is a locale code or `"auto"`.
    ///
    /// Finding no claims is not an error; the report is then empty but complete.
    pub fn analyze(&self, text: &str, language: &str) -> Result<AnalysisReport> {
        let locale = self.registry.resolve(text, language)?;
        let span = tracing::info_span!("analyze", locale = %locale.code, chars = text.len());
        let _guard = span.enter();

        let thresholds = &self.thresholds;
        let mut claims: Vec<Claim> = segment(text, locale, thresholds)
            .into_iter()
            .map(|raw| build_claim(raw, locale))
            .collect();
        let graph = DependencyGraph::build(&mut claims, thresholds.max_reported_cycles);

        let structure = StructureStats::from_claims(&claims);
        let features = extract_features(
            &claims,
            &locale.code,
            self.recognizer.as_deref(),
            thresholds,
        );
        let innovation = identify_innovations(&claims, locale, thresholds);
        let coverage = Coverage::assess(&claims, &structure, thresholds);
        let issues = detect_issues(&claims, &structure, &graph.cycles, thresholds);
        let suggestions = suggest::generate(&issues, claims.len(), &structure, thresholds);

        tracing::debug!(
            claims = claims.len(),
            cycles = graph.cycles.len(),
            issues = issues.len(),
            "analysis complete"
        );

        Ok(AnalysisReport::assemble(
            ReportParts {
                language: locale.code.clone(),
                claims,
                graph,
                structure,
                features,
                innovation,
                coverage,
                issues,
                suggestions,
            },
            thresholds,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn engine_is_shareable() {
        assert_send_sync::<Engine>();
    }

    #[test]
    fn default_engine_has_builtin_locales() {
        let engine = Engine::new(EngineConfig::default()).unwrap();
        assert_eq!(engine.locales(), vec!["en", "zh"]);
    }

    #[test]
    fn bad_detection_locale_is_a_construction_fault() {
        let mut config = EngineConfig::default();
        config.detection.cjk_locale = "ja".to_string();
        assert!(Engine::new(config).is_err());
    }

    #[test]
    fn explicit_language_overrides_detection() {
        let engine = Engine::new(EngineConfig::default()).unwrap();
        let report = engine
            .analyze("Claim 1: A compound comprising benzene.", "zh")
            .unwrap();
        assert_eq!(report.language, "zh");
        // the zh table has no English markers; paragraph fallback needs 50 chars
        assert!(report.claims.is_empty());
    }
}
