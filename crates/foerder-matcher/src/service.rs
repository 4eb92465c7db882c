/// Matching service shared by the MCP tools.
///
/// Holds the corpus cache behind an async `RwLock`: matches take a read lock
/// just long enough to clone the current snapshot, refreshes take the write
/// lock to swap it. Scoring is CPU-bound and runs on a blocking thread.
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::api::ProgrammeMatch;
use crate::error::AppError;
use foerder_core::config::MatchConfig;
use foerder_core::corpus::{Corpus, CorpusCache};
use foerder_core::matcher::Matcher;
use foerder_core::model::{AnswerSet, RankedResult};

const MAX_SUMMARY_LEN: usize = 300;

/// Result of a corpus refresh.
pub struct RefreshResult {
    /// Whether the corpus file content changed since the last load.
    pub changed: bool,
    pub programme_count: usize,
    pub fingerprint: String,
}

pub struct MatchService {
    matcher: Matcher,
    cache: RwLock<CorpusCache>,
}

impl MatchService {
    pub fn new(config: MatchConfig) -> Self {
        let cache = CorpusCache::new(config.json_path.clone());
        Self {
            matcher: Matcher::new(config),
            cache: RwLock::new(cache),
        }
    }

    /// Current corpus snapshot, loading the file on first use.
    pub async fn corpus(&self) -> Result<Arc<Corpus>, AppError> {
        if let Some(corpus) = self.cache.read().await.snapshot() {
            return Ok(corpus);
        }
        let mut cache = self.cache.write().await;
        Ok(cache.load()?)
    }

    /// Rank programmes for the answers and project description.
    pub async fn search(
        &self,
        answers: AnswerSet,
        project_text: String,
        top_k: Option<usize>,
    ) -> Result<Vec<ProgrammeMatch>, AppError> {
        let corpus = self.corpus().await?;
        let matcher = self.matcher.clone();
        let ranked = tokio::task::spawn_blocking(move || {
            matcher.run(&answers, &project_text, &corpus, top_k)
        })
        .await
        .map_err(|e| AppError::Task(format!("spawn_blocking join error: {e}")))?;

        info!(results = ranked.len(), "programmes matched");
        Ok(ranked.into_iter().map(to_programme_match).collect())
    }

    /// Re-read the corpus file and swap the snapshot if it changed.
    pub async fn refresh(&self) -> Result<RefreshResult, AppError> {
        let mut cache = self.cache.write().await;
        let changed = cache.refresh()?;
        let corpus = cache.load()?;
        Ok(RefreshResult {
            changed,
            programme_count: corpus.len(),
            fingerprint: corpus.fingerprint.clone(),
        })
    }
}

fn to_programme_match(result: RankedResult) -> ProgrammeMatch {
    let RankedResult { programme, score } = result;
    let foerderart = programme
        .funding_types()
        .into_iter()
        .map(|fa| fa.as_str().to_string())
        .collect();
    let summary = if programme.description.chars().count() > MAX_SUMMARY_LEN {
        format!(
            "{}...",
            programme.description.chars().take(MAX_SUMMARY_LEN).collect::<String>()
        )
    } else {
        programme.description.clone()
    };

    ProgrammeMatch {
        title: programme.title,
        funding_category: programme.funding_category,
        funding_area: programme.funding_area,
        foerderart,
        hoehe_der_foerderung: programme.hoehe_der_foerderung,
        summary,
        score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORPUS: &str = r#"{
        "Investition": [
            {"title": "Heizungstausch", "description": "Neue Heizung und Dämmung", "funding_area": "Bund", "förderart": ["Darlehen", "not found"]},
            {"title": "Hallenbau Sachsen", "description": "Neubau von Hallen", "funding_area": "Sachsen", "förderart": ["Zuschuss"]}
        ]
    }"#;

    fn service(dir: &tempfile::TempDir) -> (MatchService, std::path::PathBuf) {
        let path = dir.path().join("corpus.json");
        std::fs::write(&path, CORPUS).unwrap();
        (MatchService::new(MatchConfig::new(&path)), path)
    }

    #[tokio::test]
    async fn search_returns_display_fields() {
        let dir = tempfile::TempDir::new().unwrap();
        let (service, _) = service(&dir);
        let answers = AnswerSet {
            kategorie: "Investition".to_string(),
            bundesland: "Bayern".to_string(),
            ..AnswerSet::default()
        };
        let matches = service
            .search(answers, "Wir brauchen eine neue Heizung".to_string(), None)
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].title, "Heizungstausch");
        assert_eq!(matches[0].funding_category, "Investition");
        assert_eq!(matches[0].foerderart, vec!["Darlehen"]);
    }

    #[tokio::test]
    async fn refresh_reports_changes() {
        let dir = tempfile::TempDir::new().unwrap();
        let (service, path) = service(&dir);
        assert_eq!(service.corpus().await.unwrap().len(), 2);

        let unchanged = service.refresh().await.unwrap();
        assert!(!unchanged.changed);

        std::fs::write(&path, r#"[{"title": "Nur eins"}]"#).unwrap();
        let changed = service.refresh().await.unwrap();
        assert!(changed.changed);
        assert_eq!(changed.programme_count, 1);
        assert_eq!(changed.fingerprint.len(), 64);
    }

    #[test]
    fn long_descriptions_are_summarized() {
        let programme = foerder_core::model::ProgrammeRecord {
            title: "T".to_string(),
            description: "ä".repeat(MAX_SUMMARY_LEN + 10),
            alldetails: String::new(),
            funding_category: String::new(),
            funding_area: String::new(),
            foerderart: Vec::new(),
            hoehe_der_foerderung: String::new(),
        };
        let m = to_programme_match(RankedResult {
            programme,
            score: 1.0,
        });
        assert_eq!(m.summary.chars().count(), MAX_SUMMARY_LEN + 3);
        assert!(m.summary.ends_with("..."));
    }
}
