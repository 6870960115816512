//! Corpus-level statistics over classified claims.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::claim::{Category, Claim};
use crate::round2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Distribution {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Upper-middle element for even counts
    pub median: f64,
}

impl Distribution {
    /// `None` for an empty sample.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let mean = sorted.iter().sum::<f64>() / sorted.len() as f64;
        Some(Self {
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            mean: round2(mean),
            median: sorted[sorted.len() / 2],
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StructureStats {
    pub independent_claims: Vec<u32>,
    pub dependent_claims: Vec<u32>,
    pub category_counts: BTreeMap<Category, usize>,
    pub word_counts: Option<Distribution>,
    pub complexity: Option<Distribution>,
}

impl StructureStats {
    pub fn from_claims(claims: &[Claim]) -> Self {
        let (dependent, independent): (Vec<&Claim>, Vec<&Claim>) =
            claims.iter().partition(|c| c.is_dependent);

        let word_counts: Vec<f64> = claims.iter().map(|c| c.word_count as f64).collect();
        let complexity: Vec<f64> = claims.iter().map(|c| c.complexity_score).collect();

        Self {
            independent_claims: independent.iter().map(|c| c.number).collect(),
            dependent_claims: dependent.iter().map(|c| c.number).collect(),
            category_counts: category_counts(claims),
            word_counts: Distribution::from_values(&word_counts),
            complexity: Distribution::from_values(&complexity),
        }
    }

    /// Number of distinct categories in use.
    pub fn categories_used(&self) -> usize {
        self.category_counts.len()
    }

    /// Most frequent category; ties go to the earlier category in priority order.
    pub fn dominant_category(&self) -> Option<Category> {
        let mut best: Option<(Category, usize)> = None;
        for (&category, &count) in &self.category_counts {
            if best.map_or(true, |(_, top)| count > top) {
                best = Some((category, count));
            }
        }
        best.map(|(category, _)| category)
    }
}

pub fn category_counts(claims: &[Claim]) -> BTreeMap<Category, usize> {
    let mut counts = BTreeMap::new();
    for claim in claims {
        *counts.entry(claim.category).or_insert(0) += 1;
    }
    counts
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

    #[test]
    fn empty_input_has_empty_statistics() {
        let stats = StructureStats::from_claims(&[]);
        assert!(stats.independent_claims.is_empty());
        assert!(stats.category_counts.is_empty());
        assert_eq!(stats.word_counts, None);
        assert_eq!(stats.complexity, None);
        assert_eq!(stats.dominant_category(), None);
    }

    #[test]
    fn partitions_and_summarizes() {
        let claims = vec![
            claim(1, Category::Product, 10, 2.5, false),
            claim(2, Category::Product, 30, 4.0, true),
            claim(3, Category::Method, 20, 1.0, false),
            claim(4, Category::Method, 40, 3.0, true),
        ];
        let stats = StructureStats::from_claims(&claims);
        assert_eq!(stats.independent_claims, vec![1, 3]);
        assert_eq!(stats.dependent_claims, vec![2, 4]);
        assert_eq!(stats.categories_used(), 2);
        // tie between product and method goes to product
        assert_eq!(stats.dominant_category(), Some(Category::Product));

        let words = stats.word_counts.unwrap();
        assert_eq!((words.min, words.max, words.mean, words.median), (10.0, 40.0, 25.0, 30.0));
        let complexity = stats.complexity.unwrap();
        assert_eq!(complexity.mean, 2.63);
        assert_eq!(complexity.median, 3.0);
    }
}
