//! Engine configuration: numeric heuristics, language detection settings and
//! the locale rows that drive segmentation, classification and keyword scans.
//!
//! Everything has a built-in default. A TOML file may override thresholds and
//! add locale rows; a row whose `code` matches a built-in replaces it wholesale.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub thresholds: Thresholds,
    pub detection: DetectionConfig,
    /// Extra locale rows, or replacements for built-in rows with the same code
    pub locales: Vec<LocaleSpec>,
}

impl EngineConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Built-in locale rows merged with the configured ones, built-ins first.
    pub fn locale_specs(&self) -> Vec<LocaleSpec> {
        let mut specs = vec![LocaleSpec::english(), LocaleSpec::chinese()];
        for custom in &self.locales {
            match specs.iter_mut().find(|s| s.code == custom.code) {
                Some(existing) => *existing = custom.clone(),
                None => specs.push(custom.clone()),
            }
        }
        specs
    }
}

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Segmented bodies with this many characters or fewer are noise
    pub min_claim_chars: usize,
    /// Fallback paragraphs must be longer than this
    pub paragraph_min_chars: usize,
    pub length_word_limit: usize,
    pub complexity_limit: f64,
    pub independent_claim_cap: usize,
    pub breadth_categories: f64,
    pub depth_complexity_basis: f64,
    pub advantage_weight: f64,
    pub innovation_high: f64,
    pub innovation_medium: f64,
    pub complexity_level_high: f64,
    pub context_window_chars: usize,
    pub max_scan_chars: usize,
    pub small_claim_set: usize,
    /// Cycles reported beyond the first one of each cyclic group stop at this total
    pub max_reported_cycles: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_claim_chars: 10,
            paragraph_min_chars: 50,
            length_word_limit: 200,
            complexity_limit: 15.0,
            independent_claim_cap: 3,
            breadth_categories: 4.0,
            depth_complexity_basis: 20.0,
            advantage_weight: 0.5,
            innovation_high: 0.5,
            innovation_medium: 0.2,
            complexity_level_high: 10.0,
            context_window_chars: 50,
            max_scan_chars: 1_000_000,
            small_claim_set: 5,
            max_reported_cycles: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Locale used when the text is not predominantly CJK
    pub base_locale: String,
    pub cjk_locale: String,
    /// CJK characters over total characters must exceed this to pick `cjk_locale`
    pub cjk_ratio: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            base_locale: "en".to_string(),
            cjk_locale: "zh".to_string(),
            cjk_ratio: 0.1,
        }
    }
}

// ---------------------------------------------------------------------------
// Locale rows
// ---------------------------------------------------------------------------

/// One locale row, uncompiled. Marker patterns must define the named groups
/// `marker` (the marker text) and `num` (the claim number).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocaleSpec {
    pub code: String,
    #[serde(default)]
    pub claim_markers: Vec<String>,
    /// A fallback paragraph needs one of these to count as a claim
    #[serde(default)]
    pub claim_keywords: Vec<String>,
    #[serde(default)]
    pub dependency_phrases: Vec<String>,
    #[serde(default)]
    pub categories: CategoryKeywords,
    #[serde(default)]
    pub innovation_keywords: Vec<String>,
    #[serde(default)]
    pub advantage_keywords: Vec<String>,
}

/// Category keyword lists, tested product, method, use, composition in that order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryKeywords {
    pub product: Vec<String>,
    pub method: Vec<String>,
    #[serde(rename = "use")]
    pub use_: Vec<String>,
    pub composition: Vec<String>,
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl LocaleSpec {
    pub fn english() -> Self {
        Self {
            code: "en".to_string(),
            claim_markers: owned(&[
                r"(?i)(?:^|[.;]|\n[ \t]*\n)\s*(?P<marker>claim\s*(?P<num>\d+)\s*[.:])",
                r"(?m)^[ \t]*(?P<marker>(?P<num>\d+)[ \t]*\.)\s",
            ]),
            claim_keywords: owned(&["comprising", "including", "wherein", "characterized"]),
            dependency_phrases: owned(&["according to claim", "as claimed in", "of claim"]),
            categories: CategoryKeywords {
                product: owned(&["compound", "molecule", "substance"]),
                method: owned(&["method", "process", "step"]),
                use_: owned(&["use", "application", "treatment"]),
                composition: owned(&["composition", "formulation"]),
            },
            innovation_keywords: owned(&[
                "novel",
                "innovative",
                "improved",
                "enhanced",
                "new",
                "significantly",
                "substantially",
                "better",
                "superior",
            ]),
            advantage_keywords: owned(&[
                "advantage",
                "benefit",
                "improvement",
                "enhancement",
                "effect",
            ]),
        }
    }

    /// Chinese row, covering simplified and traditional forms.
    pub fn chinese() -> Self {
        Self {
            code: "zh".to_string(),
            claim_markers: owned(&[
                r"(?:^|[.;。；]|\n[ \t]*\n)\s*(?P<marker>(?:权利要求|權利要求)\s*(?P<num>\d+)\s*[：:.、])",
                r"(?:^|[.;。；]|\n[ \t]*\n)\s*(?P<marker>(?:请求项|請求項)\s*(?P<num>\d+)\s*[：:.、])",
                r"(?m)^[ \t]*(?P<marker>(?P<num>\d+)[ \t]*(?:、|\.\s))",
            ]),
            claim_keywords: owned(&["包含", "包括", "含有", "特征在于", "特徵在於", "其中"]),
            dependency_phrases: owned(&[
                "根据权利要求",
                "如权利要求",
                "依照权利要求",
                "根據權利要求",
                "如權利要求",
                "依照權利要求",
            ]),
            categories: CategoryKeywords {
                product: owned(&["化合物", "分子", "物质", "物質"]),
                method: owned(&["方法", "工艺", "工藝", "步骤", "步驟"]),
                use_: owned(&["用途", "应用", "應用", "治疗", "治療"]),
                composition: owned(&["组合物", "组成物", "組成物", "制剂", "製劑", "配方"]),
            },
            innovation_keywords: owned(&[
                "新颖", "新穎", "创新", "創新", "改进", "改進", "优化", "優化", "突破", "首次",
                "显著", "顯著", "明显", "明顯", "更好", "提高", "增强", "增強", "减少", "減少",
            ]),
            advantage_keywords: owned(&[
                "优点", "優點", "优势", "優勢", "有益效果", "技术效果", "技術效果", "改善", "提升",
            ]),
        }
    }
}
