/// Programme corpus loading and the caller-owned corpus cache.
///
/// The corpus file is either a flat JSON list of programme records or an
/// object mapping a bucket name to a list of records. Bucketed input is
/// flattened in file order; records without a category take the bucket name.
///
/// A loaded [`Corpus`] is immutable and shared behind `Arc`, so concurrent
/// matches can read the same snapshot without locking.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::error::CoreError;
use crate::model::ProgrammeRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct Corpus {
    pub programmes: Vec<ProgrammeRecord>,
    /// SHA-256 of the raw file content, hex encoded.
    pub fingerprint: String,
}

impl Corpus {
    pub fn from_programmes(programmes: Vec<ProgrammeRecord>) -> Self {
        Self {
            programmes,
            fingerprint: String::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.programmes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programmes.is_empty()
    }
}

/// Read and parse a corpus file. A missing or malformed file is an error.
pub fn load_corpus(path: &Path) -> Result<Corpus, CoreError> {
    let bytes = std::fs::read(path).map_err(|source| CoreError::CorpusRead {
        path: path.to_path_buf(),
        source,
    })?;
    let fingerprint = fingerprint(&bytes);
    let value: Value = serde_json::from_slice(&bytes).map_err(|source| CoreError::CorpusParse {
        path: path.to_path_buf(),
        source,
    })?;
    let programmes = parse_programmes(path, value)?;

    info!(
        path = %path.display(),
        programmes = programmes.len(),
        fingerprint = %fingerprint,
        "corpus loaded"
    );
    Ok(Corpus {
        programmes,
        fingerprint,
    })
}

fn parse_programmes(path: &Path, value: Value) -> Result<Vec<ProgrammeRecord>, CoreError> {
    let parse_err = |source: serde_json::Error| CoreError::CorpusParse {
        path: path.to_path_buf(),
        source,
    };

    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(parse_err))
            .collect(),
        Value::Object(buckets) => {
            let mut programmes = Vec::new();
            for (bucket, items) in buckets {
                let Value::Array(items) = items else {
                    return Err(CoreError::CorpusShape {
                        path: path.to_path_buf(),
                        message: format!("bucket '{bucket}' is not a list"),
                    });
                };
                for item in items {
                    let mut record: ProgrammeRecord =
                        serde_json::from_value(item).map_err(parse_err)?;
                    if !record.has_category() {
                        record.funding_category = bucket.clone();
                    }
                    programmes.push(record);
                }
            }
            Ok(programmes)
        }
        other => Err(CoreError::CorpusShape {
            path: path.to_path_buf(),
            message: format!("expected a list or an object of lists, found {}", kind(&other)),
        }),
    }
}

fn fingerprint(bytes: &[u8]) -> String {
    let hash = Sha256::digest(bytes);
    format!("{:x}", hash)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

/// Explicitly managed corpus snapshot for one corpus file.
pub struct CorpusCache {
    path: PathBuf,
    snapshot: Option<Arc<Corpus>>,
}

impl CorpusCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            snapshot: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return the cached snapshot, reading the file on first use.
    pub fn load(&mut self) -> Result<Arc<Corpus>, CoreError> {
        if let Some(corpus) = &self.snapshot {
            return Ok(Arc::clone(corpus));
        }
        let corpus = Arc::new(load_corpus(&self.path)?);
        self.snapshot = Some(Arc::clone(&corpus));
        Ok(corpus)
    }

    /// Re-read the file. Returns `true` when its content changed.
    ///
    /// On error the previous snapshot stays in place.
    pub fn refresh(&mut self) -> Result<bool, CoreError> {
        let corpus = load_corpus(&self.path)?;
        let changed = self
            .snapshot
            .as_ref()
            .map_or(true, |old| old.fingerprint != corpus.fingerprint);
        if changed {
            info!(path = %self.path.display(), programmes = corpus.len(), "corpus snapshot replaced");
            self.snapshot = Some(Arc::new(corpus));
        }
        Ok(changed)
    }

    pub fn snapshot(&self) -> Option<Arc<Corpus>> {
        self.snapshot.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_corpus(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_flat_list() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_corpus(
            &dir,
            "flat.json",
            r#"[
                {"title": "A", "funding_category": "Investition", "funding_area": "Bund", "förderart": ["Darlehen"]},
                {"title": "B", "funding_category": "Innovation", "funding_area": "Bayern", "förderart": ["Zuschuss"]}
            ]"#,
        );
        let corpus = load_corpus(&path).unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.programmes[0].title, "A");
        assert_eq!(corpus.fingerprint.len(), 64);
    }

    #[test]
    fn flattens_buckets_in_file_order() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_corpus(
            &dir,
            "buckets.json",
            r#"{
                "Investition": [{"title": "I1"}, {"title": "I2", "funding_category": "Finanzierung"}],
                "Innovation": [{"title": "N1", "funding_category": "not found"}]
            }"#,
        );
        let corpus = load_corpus(&path).unwrap();
        let got: Vec<(&str, &str)> = corpus
            .programmes
            .iter()
            .map(|p| (p.title.as_str(), p.funding_category.as_str()))
            .collect();
        assert_eq!(
            got,
            vec![("I1", "Investition"), ("I2", "Finanzierung"), ("N1", "Innovation")]
        );
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = load_corpus(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, CoreError::CorpusRead { .. }));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_corpus(&dir, "bad.json", "[{\"title\": ");
        assert!(matches!(load_corpus(&path).unwrap_err(), CoreError::CorpusParse { .. }));
    }

    #[test]
    fn unsupported_shapes_are_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_corpus(&dir, "scalar.json", "42");
        assert!(matches!(load_corpus(&path).unwrap_err(), CoreError::CorpusShape { .. }));
        let path = write_corpus(&dir, "bucket.json", r#"{"Innovation": {"title": "x"}}"#);
        assert!(matches!(load_corpus(&path).unwrap_err(), CoreError::CorpusShape { .. }));
    }

    #[test]
    fn cache_loads_once_and_refresh_detects_changes() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_corpus(&dir, "c.json", r#"[{"title": "A"}]"#);
        let mut cache = CorpusCache::new(&path);
        assert!(cache.snapshot().is_none());

        let first = cache.load().unwrap();
        let second = cache.load().unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        assert!(!cache.refresh().unwrap());

        write_corpus(&dir, "c.json", r#"[{"title": "A"}, {"title": "B"}]"#);
        assert_eq!(cache.load().unwrap().len(), 1, "load serves the cached snapshot");
        assert!(cache.refresh().unwrap());
        assert_eq!(cache.snapshot().unwrap().len(), 2);
        assert_eq!(first.len(), 1, "old snapshot is untouched");
    }

    #[test]
    fn failed_refresh_keeps_previous_snapshot() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_corpus(&dir, "c.json", r#"[{"title": "A"}]"#);
        let mut cache = CorpusCache::new(&path);
        cache.load().unwrap();
        write_corpus(&dir, "c.json", "not json");
        assert!(cache.refresh().is_err());
        assert_eq!(cache.snapshot().unwrap().len(), 1);
    }
}
