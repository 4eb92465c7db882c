/// Error types for the matching core.
///
/// Only corpus loading and configuration can fail. Degenerate inputs (empty
/// project text, nothing eligible, all-stopword queries) are valid states and
/// never surface as errors.
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("failed to read corpus {path}: {source}")]
    CorpusRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corpus {path} is not valid JSON: {source}")]
    CorpusParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("corpus {path} has an unsupported shape: {message}")]
    CorpusShape { path: PathBuf, message: String },

    #[error("config error: {0}")]
    Config(String),
}
