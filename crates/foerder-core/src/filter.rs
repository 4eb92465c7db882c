/// Hard eligibility rules applied before relevance ranking.
///
/// Three independent predicates, AND-combined. Each one is inactive when the
/// answer it depends on is unknown:
/// - category: `funding_category` must equal the answered category
/// - region: `funding_area` must be the answered state or "Bund"
/// - zero contribution: with an own contribution of exactly 0, grant
///   programmes ("Zuschuss") are dropped
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::LazyLock;

use tracing::debug;

use crate::answers::norm_bundesland;
use crate::error::CoreError;
use crate::model::{AnswerSet, ProgrammeRecord, BUND, BUNDESLAENDER, NOT_FOUND};
use crate::text::normalize_text;

/// Normalized spelling -> canonical state name.
static STATE_SYNONYMS: LazyLock<HashMap<String, &'static str>> = LazyLock::new(|| {
    let mut synonyms: HashMap<String, &'static str> = BUNDESLAENDER
        .iter()
        .map(|bl| (normalize_text(bl), *bl))
        .collect();
    synonyms.insert("nrw".to_string(), "Nordrhein-Westfalen");
    synonyms
});

/// How a record's `funding_area` is compared against the applicant's state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RegionMode {
    /// The whole field is one state name (or "Bund").
    #[default]
    Single,
    /// The field may list several areas separated by `,` or `;`.
    Multi,
}

impl FromStr for RegionMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(RegionMode::Single),
            "multi" => Ok(RegionMode::Multi),
            other => Err(CoreError::Config(format!(
                "unknown region mode '{other}' (expected 'single' or 'multi')"
            ))),
        }
    }
}

/// Canonical state name for an answered Bundesland, if it can be recognized.
pub fn normalize_bundesland(value: &str) -> Option<&'static str> {
    let value = value.trim();
    if value.is_empty() || value == NOT_FOUND {
        return None;
    }
    let key = normalize_text(value);
    STATE_SYNONYMS
        .get(&key)
        .copied()
        .or_else(|| norm_bundesland(value))
}

/// Parse a EUR amount such as "0", "10000", "10.000" or "1.234,56".
///
/// Returns -1.0 for unknown or unparseable input so that "unknown" never
/// compares equal to zero.
pub fn parse_number_eur(value: &str) -> f64 {
    let value = value.trim();
    if value.is_empty() || value == NOT_FOUND {
        return -1.0;
    }
    let cleaned: String = value
        .chars()
        .filter(|c| !matches!(c, '.' | ' '))
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    cleaned.parse::<f64>().unwrap_or(-1.0)
}

/// Keep the programmes that pass every active predicate, in corpus order.
pub fn apply_filters<'a>(
    programmes: &'a [ProgrammeRecord],
    answers: &AnswerSet,
    mode: RegionMode,
) -> Vec<&'a ProgrammeRecord> {
    let kategorie = answers.kategorie();
    let state = normalize_bundesland(&answers.bundesland);
    let eigenanteil = parse_number_eur(&answers.eigenanteil_eur);
    let exclude_grants = eigenanteil == 0.0;

    let kept: Vec<&ProgrammeRecord> = programmes
        .iter()
        .filter(|p| match kategorie {
            Some(k) => p.funding_category.trim() == k.as_str(),
            None => true,
        })
        .filter(|p| match state {
            Some(bl) => area_matches(&p.funding_area, bl, mode),
            None => true,
        })
        .filter(|p| !(exclude_grants && p.offers_zuschuss()))
        .collect();

    debug!(
        before = programmes.len(),
        after = kept.len(),
        kategorie = kategorie.map(|k| k.as_str()).unwrap_or(NOT_FOUND),
        state = state.unwrap_or(NOT_FOUND),
        exclude_grants,
        "eligibility filter applied"
    );
    kept
}

fn area_matches(funding_area: &str, state: &str, mode: RegionMode) -> bool {
    match mode {
        RegionMode::Single => {
            let area = funding_area.trim();
            area == state || area == BUND
        }
        RegionMode::Multi => funding_area
            .split([',', ';'])
            .map(str::trim)
            .any(|area| area == state || area == BUND),
    }
}
