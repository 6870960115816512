//! Claim segmentation: numbered markers first, blank-line paragraphs as fallback.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::Thresholds;
use crate::locale::LocaleTable;

static PARAGRAPH_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

/// A numbered slice of input text, before classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawClaim {
    pub number: u32,
    pub text: String,
}

/// Splits `text` into claims sorted by number. Never fails; finding nothing is
/// a valid outcome.
pub fn segment(text: &str, locale: &LocaleTable, thresholds: &Thresholds) -> Vec<RawClaim> {
    for (idx, marker) in locale.markers.iter().enumerate() {
        let claims = split_on_markers(text, marker, thresholds.min_claim_chars);
        if !claims.is_empty() {
            tracing::debug!(pattern = idx, claims = claims.len(), "segmented numbered claims");
            let shadowed = shadowed_markers(text, &locale.markers, idx);
            if !shadowed.is_empty() {
                tracing::debug!(
                    chosen = idx,
                    ?shadowed,
                    "later marker patterns also match; their claims stay inside the chosen bodies"
                );
            }
            return claims;
        }
    }

    let claims = split_paragraphs(text, locale, thresholds.paragraph_min_chars);
    tracing::debug!(claims = claims.len(), "no numbered claims, used paragraph fallback");
    claims
}

/// Each claim runs from the end of its marker to the start of the next marker.
/// A number seen twice keeps the later body.
fn split_on_markers(text: &str, marker_re: &Regex, min_chars: usize) -> Vec<RawClaim> {
    let mut markers: Vec<(&str, usize, usize)> = Vec::new();
    for caps in marker_re.captures_iter(text) {
        let (Some(marker), Some(num)) = (caps.name("marker"), caps.name("num")) else {
            continue;
        };
        markers.push((num.as_str(), marker.start(), marker.end()));
    }

    let mut by_number: BTreeMap<u32, String> = BTreeMap::new();
    for (i, &(num, _, body_start)) in markers.iter().enumerate() {
        let body_end = markers.get(i + 1).map(|m| m.1).unwrap_or(text.len());
        let body = text[body_start..body_end].trim();

        let number = match num.parse::<u32>() {
            Ok(n) if n > 0 => n,
            _ => continue,
        };
        if body.chars().count() <= min_chars {
            continue;
        }
        by_number.insert(number, body.to_string());
    }

    by_number
        .into_iter()
        .map(|(number, text)| RawClaim { number, text })
        .collect()
}

/// Indices of the patterns after `chosen` that also find markers in `text`.
fn shadowed_markers(text: &str, markers: &[Regex], chosen: usize) -> Vec<usize> {
    markers
        .iter()
        .enumerate()
        .skip(chosen + 1)
        .filter(|(_, re)| re.is_match(text))
        .map(|(idx, _)| idx)
        .collect()
}

fn looks_like_claim(paragraph: &str, locale: &LocaleTable) -> bool {
    let lower = paragraph.to_lowercase();
    locale
        .claim_keywords
        .iter()
        .any(|keyword| lower.contains(keyword.as_str()))
}

/// Paragraph number is its 1-based position among all paragraphs.
fn split_paragraphs(text: &str, locale: &LocaleTable, min_chars: usize) -> Vec<RawClaim> {
    PARAGRAPH_SPLIT_RE
        .split(text)
        .enumerate()
        .filter_map(|(i, para)| {
            let para = para.trim();
            if para.chars().count() > min_chars && looks_like_claim(para, locale) {
                Some(RawClaim {
                    number: i as u32 + 1,
                    text: para.to_string(),
                })
            } else {
                None
            }
        })
        .collect()
}
