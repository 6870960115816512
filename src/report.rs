//! The top-level analysis result and its summary block.

use serde::Serialize;

use crate::claim::{Category, Claim};
use crate::config::Thresholds;
use crate::coverage::{Coverage, Issue};
use crate::features::{Innovation, TechnicalFeatures};
use crate::graph::DependencyGraph;
use crate::structure::StructureStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_claims: usize,
    pub independent_claims: usize,
    pub dominant_category: Option<Category>,
    pub innovation_level: Rating,
    pub complexity_level: Rating,
    pub key_feature_count: usize,
}

impl Summary {
    fn new(
        claims: &[Claim],
        structure: &StructureStats,
        features: &TechnicalFeatures,
        innovation: &Innovation,
        thresholds: &Thresholds,
    ) -> Self {
        let innovation_level = if innovation.score > thresholds.innovation_high {
            Rating::High
        } else if innovation.score > thresholds.innovation_medium {
            Rating::Medium
        } else {
            Rating::Low
        };

        let complexity_level = if claims.is_empty() {
            Rating::Low
        } else if claims
            .iter()
            .any(|c| c.complexity_score > thresholds.complexity_level_high)
        {
            Rating::High
        } else {
            Rating::Medium
        };

        Self {
            total_claims: claims.len(),
            independent_claims: structure.independent_claims.len(),
            dominant_category: structure.dominant_category(),
            innovation_level,
            complexity_level,
            key_feature_count: features.count(),
        }
    }
}

/// Everything one analysis produced. Built once, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// Locale the analysis actually ran under
    pub language: String,
    pub claims: Vec<Claim>,
    pub graph: DependencyGraph,
    pub structure: StructureStats,
    pub features: TechnicalFeatures,
    pub innovation: Innovation,
    pub coverage: Coverage,
    pub issues: Vec<Issue>,
    pub suggestions: Vec<String>,
    pub summary: Summary,
}

pub(crate) struct ReportParts {
    pub language: String,
    pub claims: Vec<Claim>,
    pub graph: DependencyGraph,
    pub structure: StructureStats,
    pub features: TechnicalFeatures,
    pub innovation: Innovation,
    pub coverage: Coverage,
    pub issues: Vec<Issue>,
    pub suggestions: Vec<String>,
}

impl AnalysisReport {
    pub(crate) fn assemble(parts: ReportParts, thresholds: &Thresholds) -> Self {
        let summary = Summary::new(
            &parts.claims,
            &parts.structure,
            &parts.features,
            &parts.innovation,
            thresholds,
        );
        Self {
            language: parts.language,
            claims: parts.claims,
            graph: parts.graph,
            structure: parts.structure,
            features: parts.features,
            innovation: parts.innovation,
            coverage: parts.coverage,
            issues: parts.issues,
            suggestions: parts.suggestions,
            summary,
        }
    }

    pub fn claim(&self, number: u32) -> Option<&Claim> {
        self.claims.iter().find(|c| c.number == number)
    }
}
