use std::path::{Path, PathBuf};

use crate::error::CoreError;
use crate::filter::RegionMode;

pub const DEFAULT_TOP_K: usize = 3;

/// Matching configuration loaded explicitly from environment variables.
///
/// The corpus path has no default; the caller must provide it.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchConfig {
    /// Filesystem path to the normalized programme corpus (JSON).
    pub json_path: PathBuf,
    /// Maximum number of ranked programmes returned.
    pub top_k: usize,
    /// When set, return every programme scoring at least this much instead of the top K.
    pub min_score: Option<f64>,
    /// How `funding_area` values are compared against the applicant's state.
    pub region_mode: RegionMode,
}

impl MatchConfig {
    pub fn new(json_path: impl Into<PathBuf>) -> Self {
        Self {
            json_path: json_path.into(),
            top_k: DEFAULT_TOP_K,
            min_score: None,
            region_mode: RegionMode::default(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `FOERDER_CORPUS_PATH`: path to the programme corpus JSON file
    ///
    /// Optional:
    /// - `FOERDER_TOP_K` (default: 3)
    /// - `FOERDER_MIN_SCORE`: switch to threshold mode with this BM25 cutoff
    /// - `FOERDER_REGION_MODE`: `single` (default) or `multi`
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CoreError> {
        let json_path = lookup("FOERDER_CORPUS_PATH").ok_or_else(|| {
            CoreError::Config("FOERDER_CORPUS_PATH environment variable is required".to_string())
        })?;
        if !Path::new(&json_path).exists() {
            return Err(CoreError::Config(format!("corpus file not found: {json_path}")));
        }

        let top_k = match lookup("FOERDER_TOP_K") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(k) if k >= 1 => k,
                _ => {
                    return Err(CoreError::Config(format!(
                        "FOERDER_TOP_K must be a positive integer, got '{raw}'"
                    )))
                }
            },
            None => DEFAULT_TOP_K,
        };

        let min_score = lookup("FOERDER_MIN_SCORE")
            .map(|raw| {
                raw.trim().parse::<f64>().map_err(|_| {
                    CoreError::Config(format!("FOERDER_MIN_SCORE must be a number, got '{raw}'"))
                })
            })
            .transpose()?;

        let region_mode = lookup("FOERDER_REGION_MODE")
            .map(|raw| raw.parse::<RegionMode>())
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            json_path: PathBuf::from(json_path),
            top_k,
            min_score,
            region_mode,
        })
    }
}
