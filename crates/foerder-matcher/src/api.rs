use foerder_core::model::AnswerSet;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct MatchProgrammesParams {
    /// The six answers collected so far. Unknown fields may be omitted.
    pub answers: AnswerSet,
    /// Free-text description of the applicant's project.
    #[serde(default)]
    pub project_text: String,
    /// Maximum number of programmes to return (default from config, max: 20).
    pub top_k: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AnswerStatusParams {
    pub answers: AnswerSet,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct MergeAnswersParams {
    /// Current answer set.
    pub current: AnswerSet,
    /// Newly extracted values; "not found" entries leave current values untouched.
    pub updates: AnswerSet,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProgrammeMatch {
    pub title: String,
    pub funding_category: String,
    pub funding_area: String,
    pub foerderart: Vec<String>,
    pub hoehe_der_foerderung: String,
    pub summary: String,
    /// BM25 relevance, higher is better. Only comparable within one response.
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MatchProgrammesResponse {
    pub matches: Vec<ProgrammeMatch>,
    /// Set when nothing matched, ready to show to the applicant.
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnswerStatusResponse {
    pub complete: bool,
    /// Key of the next question to ask, e.g. "bundesland".
    pub next_field: Option<String>,
    pub next_question: Option<String>,
    /// Markdown lines, one per answer.
    pub status: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RefreshCorpusResponse {
    pub changed: bool,
    pub programme_count: usize,
    /// SHA-256 of the corpus file.
    pub fingerprint: String,
}
