/// Filter-then-rank matching of funding programmes.
///
/// Pipeline: eligibility filter, document text per surviving programme,
/// tokenization of documents and query, BM25 scoring, stable descending sort,
/// then truncation to the top K (or a score threshold).
use std::path::Path;

use tracing::debug;

use crate::answers::is_unknown;
use crate::bm25::{self, Bm25Params};
use crate::config::MatchConfig;
use crate::corpus::{load_corpus, Corpus, CorpusCache};
use crate::error::CoreError;
use crate::filter::{apply_filters, RegionMode};
use crate::model::{AnswerSet, ProgrammeRecord, RankedResult};
use crate::rank::ScoreOrder;
use crate::text::tokenize;

/// Queries with fewer tokens than this are replaced by the fallback query.
pub const MIN_QUERY_TOKENS: usize = 3;

/// Last-resort query token when neither text nor answers provide one.
pub const FALLBACK_QUERY_TOKEN: &str = "foerderung";

/// BM25 scores grow with relevance.
pub const SCORE_ORDER: ScoreOrder = ScoreOrder::HigherIsBetter;

/// Query tokens for the project description.
///
/// Sparse descriptions fall back to the answered industry and category, and
/// finally to [`FALLBACK_QUERY_TOKEN`].
pub fn build_query(answers: &AnswerSet, project_text: &str) -> Vec<String> {
    let tokens = tokenize(project_text);
    if tokens.len() >= MIN_QUERY_TOKENS {
        return tokens;
    }

    let mut bits: Vec<&str> = Vec::new();
    if !is_unknown(&answers.branche) {
        bits.push(&answers.branche);
    }
    if let Some(kategorie) = answers.kategorie() {
        bits.push(kategorie.as_str());
    }
    let fallback = tokenize(&bits.join(" "));
    debug!(
        text_tokens = tokens.len(),
        fallback_tokens = fallback.len(),
        "project text too sparse, using fallback query"
    );
    if fallback.is_empty() {
        vec![FALLBACK_QUERY_TOKEN.to_string()]
    } else {
        fallback
    }
}

/// Searchable text of a programme. Empty fields are skipped.
pub fn build_doc_text(programme: &ProgrammeRecord) -> String {
    let foerderart = programme.foerderart.join(" ");
    [
        programme.title.as_str(),
        programme.description.as_str(),
        programme.alldetails.as_str(),
        programme.funding_category.as_str(),
        programme.funding_area.as_str(),
        foerderart.as_str(),
        programme.hoehe_der_foerderung.as_str(),
    ]
    .into_iter()
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(" \n")
}

/// Every eligible programme with its score, most relevant first.
///
/// Equal scores keep corpus order.
pub fn rank_programmes(
    answers: &AnswerSet,
    project_text: &str,
    corpus: &Corpus,
    region_mode: RegionMode,
) -> Vec<RankedResult> {
    let eligible = apply_filters(&corpus.programmes, answers, region_mode);
    if eligible.is_empty() {
        debug!(corpus = corpus.len(), "no eligible programmes");
        return Vec::new();
    }

    let query = build_query(answers, project_text);
    let docs: Vec<Vec<String>> = eligible
        .iter()
        .map(|p| tokenize(&build_doc_text(p)))
        .collect();
    let scores = bm25::score(&query, &docs, Bm25Params::default());

    let mut ranked: Vec<RankedResult> = eligible
        .into_iter()
        .zip(scores)
        .map(|(programme, score)| RankedResult {
            programme: programme.clone(),
            score,
        })
        .collect();
    ranked.sort_by(|a, b| SCORE_ORDER.compare(a.score, b.score));
    ranked
}

/// Top `top_k` programmes for the answers and project description.
pub fn match_programmes(
    answers: &AnswerSet,
    project_text: &str,
    corpus: &Corpus,
    top_k: usize,
) -> Vec<RankedResult> {
    let mut ranked = rank_programmes(answers, project_text, corpus, RegionMode::default());
    ranked.truncate(top_k);
    ranked
}

/// Every programme whose score reaches `min_score`, most relevant first.
pub fn match_above_threshold(
    answers: &AnswerSet,
    project_text: &str,
    corpus: &Corpus,
    min_score: f64,
) -> Vec<RankedResult> {
    rank_programmes(answers, project_text, corpus, RegionMode::default())
        .into_iter()
        .filter(|r| SCORE_ORDER.passes(r.score, min_score))
        .collect()
}

/// Load the corpus at `path` and return the top `top_k` programmes.
pub fn match_from_path(
    answers: &AnswerSet,
    project_text: &str,
    path: &Path,
    top_k: usize,
) -> Result<Vec<RankedResult>, CoreError> {
    let corpus = load_corpus(path)?;
    Ok(match_programmes(answers, project_text, &corpus, top_k))
}

/// Matching with configured result size, threshold and region mode.
#[derive(Debug, Clone)]
pub struct Matcher {
    config: MatchConfig,
}

impl Matcher {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Rank against a loaded corpus.
    ///
    /// Without a configured `min_score` this returns the top `top_k`
    /// (configured size when `None`). With one, every programme reaching the
    /// threshold is returned; only an explicit `top_k` caps that list.
    pub fn run(
        &self,
        answers: &AnswerSet,
        project_text: &str,
        corpus: &Corpus,
        top_k: Option<usize>,
    ) -> Vec<RankedResult> {
        let ranked = rank_programmes(answers, project_text, corpus, self.config.region_mode);
        match self.config.min_score {
            Some(min_score) => ranked
                .into_iter()
                .filter(|r| SCORE_ORDER.passes(r.score, min_score))
                .take(top_k.unwrap_or(usize::MAX))
                .collect(),
            None => ranked
                .into_iter()
                .take(top_k.unwrap_or(self.config.top_k))
                .collect(),
        }
    }

    /// Rank against the cached corpus, loading it on first use.
    pub fn run_cached(
        &self,
        cache: &mut CorpusCache,
        answers: &AnswerSet,
        project_text: &str,
        top_k: Option<usize>,
    ) -> Result<Vec<RankedResult>, CoreError> {
        let corpus = cache.load()?;
        Ok(self.run(answers, project_text, &corpus, top_k))
    }
}
