//! Turns issues and corpus shape into drafting suggestions.

use crate::config::Thresholds;
use crate::coverage::{Issue, IssueKind};
use crate::dedup_first_seen;
use crate::structure::StructureStats;

fn claims_phrase(numbers: &[u32]) -> String {
    match numbers {
        [single] => format!("claim {single}"),
        _ => {
            let joined = numbers
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            format!("claims {joined}")
        }
    }
}

fn for_issue(issue: &Issue) -> String {
    match issue.kind {
        IssueKind::Length => format!(
            "Consider splitting {} into several shorter claims",
            claims_phrase(&issue.claims)
        ),
        IssueKind::Complexity => format!(
            "Simplify the wording of {}",
            claims_phrase(&issue.claims)
        ),
        IssueKind::MissingIndependent => {
            "Add at least one independent claim to anchor the core protection".to_string()
        }
        IssueKind::ExcessIndependent => format!(
            "Consider consolidating independent {} or converting some into dependent claims",
            claims_phrase(&issue.claims)
        ),
        IssueKind::CircularDependency => format!(
            "Break the circular reference between {}",
            claims_phrase(&issue.claims)
        ),
    }
}

/// One suggestion per issue in issue order, then the corpus-level ones,
/// deduplicated keeping the first occurrence.
pub fn generate(
    issues: &[Issue],
    claim_count: usize,
    stats: &StructureStats,
    thresholds: &Thresholds,
) -> Vec<String> {
    let mut suggestions: Vec<String> = issues.iter().map(for_issue).collect();

    if claim_count < thresholds.small_claim_set {
        suggestions.push("Consider adding more dependent claims to broaden protection".to_string());
    }
    if let (1, Some(only)) = (stats.categories_used(), stats.dominant_category()) {
        suggestions.push(format!(
            "Every claim is a {} claim; consider adding claims of other types to cover the invention fully",
            only.as_str()
        ));
    }

    dedup_first_seen(suggestions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::Severity;

    fn issue(kind: IssueKind, claims: Vec<u32>) -> Issue {
        Issue {
            kind,
            severity: Severity::Medium,
            claims,
            description: String::new(),
        }
    }

    #[test]
    fn issue_suggestions_name_their_claims() {
        let issues = vec![
            issue(IssueKind::Length, vec![4]),
            issue(IssueKind::CircularDependency, vec![2, 3]),
        ];
        let out = generate(&issues, 10, &StructureStats::default(), &Thresholds::default());
        assert_eq!(
            out,
            vec![
                "Consider splitting claim 4 into several shorter claims",
                "Break the circular reference between claims 2, 3",
            ]
        );
    }

    #[test]
    fn generic_suggestions_follow_issue_ones() {
        let mut stats = StructureStats::default();
        stats.category_counts.insert(crate::claim::Category::Product, 2);
        let issues = vec![issue(IssueKind::MissingIndependent, vec![])];
        let out = generate(&issues, 2, &stats, &Thresholds::default());
        assert_eq!(out.len(), 3);
        assert!(out[0].starts_with("Add at least one independent claim"));
        assert!(out[1].contains("more dependent claims"));
        assert!(out[2].contains("other types"));
    }

    #[test]
    fn duplicates_collapse_to_first() {
        let issues = vec![
            issue(IssueKind::MissingIndependent, vec![]),
            issue(IssueKind::MissingIndependent, vec![]),
        ];
        let out = generate(&issues, 10, &StructureStats::default(), &Thresholds::default());
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn no_claims_still_gets_the_small_set_hint() {
        let out = generate(&[], 0, &StructureStats::default(), &Thresholds::default());
        assert_eq!(out.len(), 1);
        assert!(out[0].contains("more dependent claims"));
    }
}
