//! Coverage metrics and rule-based issue detection.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::claim::{Category, Claim};
use crate::config::Thresholds;
use crate::round2;
use crate::structure::StructureStats;

// ---------------------------------------------------------------------------
// Coverage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Coverage {
    /// Share of the claim categories in use, in [0, 1]
    pub breadth: f64,
    /// Highest complexity relative to the depth basis, in [0, 1]
    pub depth: f64,
    pub protection_areas: BTreeMap<Category, usize>,
}

impl Coverage {
    pub fn assess(claims: &[Claim], stats: &StructureStats, thresholds: &Thresholds) -> Self {
        let breadth = if thresholds.breadth_categories > 0.0 {
            (stats.categories_used() as f64 / thresholds.breadth_categories).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let max_complexity = claims
            .iter()
            .map(|c| c.complexity_score)
            .fold(None, |acc: Option<f64>, x| Some(acc.map_or(x, |m| m.max(x))));
        let depth = match max_complexity {
            Some(max) if thresholds.depth_complexity_basis > 0.0 => {
                (max / thresholds.depth_complexity_basis).min(1.0)
            }
            _ => 0.0,
        };

        Self {
            breadth: round2(breadth),
            depth: round2(depth),
            protection_areas: stats.category_counts.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Issues
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    Length,
    Complexity,
    MissingIndependent,
    ExcessIndependent,
    CircularDependency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub severity: Severity,
    pub claims: Vec<u32>,
    pub description: String,
}

impl Issue {
    fn new(kind: IssueKind, severity: Severity, claims: Vec<u32>, description: String) -> Self {
        Self {
            kind,
            severity,
            claims,
            description,
        }
    }
}

fn join_numbers(numbers: &[u32]) -> String {
    numbers
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Runs every rule. Order: length, complexity, independence, then one
/// circular-dependency issue per cycle.
pub fn detect_issues(
    claims: &[Claim],
    stats: &StructureStats,
    cycles: &[Vec<u32>],
    thresholds: &Thresholds,
) -> Vec<Issue> {
    let mut issues = Vec::new();

    for claim in claims {
        if claim.word_count > thresholds.length_word_limit {
            issues.push(Issue::new(
                IssueKind::Length,
                Severity::Medium,
                vec![claim.number],
                format!(
                    "claim {} has {} words, over the limit of {}",
                    claim.number, claim.word_count, thresholds.length_word_limit
                ),
            ));
        }
    }

    for claim in claims {
        if claim.complexity_score > thresholds.complexity_limit {
            issues.push(Issue::new(
                IssueKind::Complexity,
                Severity::Medium,
                vec![claim.number],
                format!(
                    "claim {} has complexity {:.2}, over the limit of {}",
                    claim.number, claim.complexity_score, thresholds.complexity_limit
                ),
            ));
        }
    }

    let independent = &stats.independent_claims;
    if independent.is_empty() {
        issues.push(Issue::new(
            IssueKind::MissingIndependent,
            Severity::High,
            Vec::new(),
            "no independent claim found".to_string(),
        ));
    } else if independent.len() > thresholds.independent_claim_cap {
        issues.push(Issue::new(
            IssueKind::ExcessIndependent,
            Severity::Low,
            independent.clone(),
            format!(
                "{} independent claims ({}), more than {}",
                independent.len(),
                join_numbers(independent),
                thresholds.independent_claim_cap
            ),
        ));
    }

    for cycle in cycles {
        issues.push(Issue::new(
            IssueKind::CircularDependency,
            Severity::High,
            cycle.clone(),
            format!("claims {} depend on each other in a cycle", join_numbers(cycle)),
        ));
    }

    tracing::debug!(issues = issues.len(), "detected issues");
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn claim(number: u32, category: Category, words: usize, complexity: f64, dependent: bool) -> Claim {
        Claim {
            number,
            text: String::new(),
            category,
            word_count: words,
            complexity_score: complexity,
            dependency_refs: BTreeSet::new(),
            is_dependent: dependent,
        }
    }

    fn kinds(issues: &[Issue]) -> Vec<IssueKind> {
        issues.iter().map(|i| i.kind).collect()
    }

    #[test]
    fn coverage_of_two_categories() {
        let claims = vec![
            claim(1, Category::Product, 10, 25.0, false),
            claim(2, Category::Method, 10, 3.0, true),
        ];
        let stats = StructureStats::from_claims(&claims);
        let coverage = Coverage::assess(&claims, &stats, &Thresholds::default());
        assert_eq!(coverage.breadth, 0.5);
        assert_eq!(coverage.depth, 1.0);
        assert_eq!(coverage.protection_areas.get(&Category::Product), Some(&1));
    }

    #[test]
    fn coverage_of_nothing_is_zero() {
        let stats = StructureStats::from_claims(&[]);
        let coverage = Coverage::assess(&[], &stats, &Thresholds::default());
        assert_eq!((coverage.breadth, coverage.depth), (0.0, 0.0));
        assert!(coverage.protection_areas.is_empty());
    }

    #[test]
    fn issues_come_in_rule_order() {
        let claims = vec![
            claim(1, Category::Product, 250, 20.0, false),
            claim(2, Category::Product, 10, 1.0, true),
            claim(3, Category::Product, 201, 1.0, true),
        ];
        let stats = StructureStats::from_claims(&claims);
        let issues = detect_issues(&claims, &stats, &[vec![2, 3]], &Thresholds::default());
        assert_eq!(
            kinds(&issues),
            vec![
                IssueKind::Length,
                IssueKind::Length,
                IssueKind::Complexity,
                IssueKind::CircularDependency
            ]
        );
        assert_eq!(issues[1].claims, vec![3]);
        assert_eq!(issues[3].claims, vec![2, 3]);
        assert_eq!(issues[3].severity, Severity::High);
    }

    #[test]
    fn boundaries_are_exclusive() {
        let claims = vec![claim(1, Category::Product, 200, 15.0, false)];
        let stats = StructureStats::from_claims(&claims);
        assert!(detect_issues(&claims, &stats, &[], &Thresholds::default()).is_empty());
    }

    #[test]
    fn independence_rules() {
        let dependent_only = vec![claim(1, Category::Other, 5, 1.0, true)];
        let stats = StructureStats::from_claims(&dependent_only);
        let issues = detect_issues(&dependent_only, &stats, &[], &Thresholds::default());
        assert_eq!(kinds(&issues), vec![IssueKind::MissingIndependent]);
        assert!(issues[0].claims.is_empty());

        let many: Vec<Claim> = (1..=4).map(|n| claim(n, Category::Other, 5, 1.0, false)).collect();
        let stats = StructureStats::from_claims(&many);
        let issues = detect_issues(&many, &stats, &[], &Thresholds::default());
        assert_eq!(kinds(&issues), vec![IssueKind::ExcessIndependent]);
        assert_eq!(issues[0].claims, vec![1, 2, 3, 4]);
        assert_eq!(issues[0].severity, Severity::Low);
    }

    #[test]
    fn issue_kind_serializes_kebab_case() {
        let json = serde_json::to_string(&IssueKind::MissingIndependent).unwrap();
        assert_eq!(json, "\"missing-independent\"");
    }
}
