/// BM25 Okapi scoring over pre-tokenized documents.
///
/// Statistics (document frequency, average length) are derived from the
/// document list passed in, so scores are only comparable within one call.
use std::collections::{HashMap, HashSet};

/// Term frequency saturation and length normalization parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    pub k1: f64,
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75 }
    }
}

/// Score every document against the query. One score per document, same order.
///
/// The query is iterated as given, so a token repeated in the query
/// contributes once per occurrence. An empty query scores all zeros.
pub fn score(query: &[String], docs: &[Vec<String>], params: Bm25Params) -> Vec<f64> {
    if query.is_empty() {
        return vec![0.0; docs.len()];
    }

    let n = docs.len() as f64;
    let doc_lens: Vec<f64> = docs.iter().map(|d| d.len() as f64).collect();
    let avgdl = if docs.is_empty() {
        0.0
    } else {
        doc_lens.iter().sum::<f64>() / n
    };
    let avgdl = if avgdl == 0.0 { 1.0 } else { avgdl };

    let idf = inverse_document_frequencies(query, docs);
    let Bm25Params { k1, b } = params;

    docs.iter()
        .zip(&doc_lens)
        .map(|(doc, &dl)| {
            let mut tf: HashMap<&str, f64> = HashMap::new();
            for token in doc {
                *tf.entry(token.as_str()).or_insert(0.0) += 1.0;
            }
            let norm = k1 * (1.0 - b + b * dl / avgdl);

            query
                .iter()
                .filter_map(|qt| {
                    let f = *tf.get(qt.as_str())?;
                    let idf = idf.get(qt.as_str()).copied().unwrap_or(0.0);
                    Some(idf * (f * (k1 + 1.0)) / (f + norm))
                })
                .sum::<f64>()
        })
        .collect()
}

/// IDF: ln((N - df + 0.5) / (df + 0.5) + 1), non-negative for every df.
fn inverse_document_frequencies<'q>(
    query: &'q [String],
    docs: &[Vec<String>],
) -> HashMap<&'q str, f64> {
    let n = docs.len() as f64;
    let distinct: HashSet<&str> = query.iter().map(String::as_str).collect();

    let mut df: HashMap<&str, f64> = distinct.iter().map(|t| (*t, 0.0)).collect();
    for doc in docs {
        let unique: HashSet<&str> = doc.iter().map(String::as_str).collect();
        for term in &distinct {
            if unique.contains(*term) {
                if let Some(count) = df.get_mut(*term) {
                    *count += 1.0;
                }
            }
        }
    }

    df.into_iter()
        .map(|(term, df)| (term, ((n - df + 0.5) / (df + 0.5) + 1.0).ln()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    fn corpus() -> Vec<Vec<String>> {
        vec![
            toks("sanierung daemmung heizung halle"),
            toks("gruendung kredit liquiditaet"),
            toks("software entwicklung prototyp innovation"),
            toks("heizung austausch"),
        ]
    }

    #[test]
    fn empty_query_scores_zero() {
        let scores = score(&[], &corpus(), Bm25Params::default());
        assert_eq!(scores, vec![0.0; 4]);
    }

    #[test]
    fn empty_corpus_yields_no_scores() {
        let scores = score(&toks("heizung"), &[], Bm25Params::default());
        assert!(scores.is_empty());
    }

    #[test]
    fn matching_documents_score_positive() {
        let scores = score(&toks("heizung daemmung"), &corpus(), Bm25Params::default());
        assert!(scores[0] > 0.0);
        assert!(scores[3] > 0.0);
        assert_eq!(scores[1], 0.0);
        assert_eq!(scores[2], 0.0);
        assert!(scores[0] > scores[3], "doc 0 matches both terms");
    }

    #[test]
    fn idf_stays_positive_for_ubiquitous_terms() {
        let docs = vec![toks("foerderung a"), toks("foerderung b"), toks("foerderung c")];
        let scores = score(&toks("foerderung"), &docs, Bm25Params::default());
        assert!(scores.iter().all(|s| *s > 0.0));
    }

    #[test]
    fn extra_occurrence_never_lowers_score() {
        let base = toks("heizung halle dach fenster");
        let boosted = toks("heizung heizung halle dach fenster");
        let others = vec![toks("kredit"), toks("software")];

        let mut with_base = vec![base];
        with_base.extend(others.clone());
        let mut with_boost = vec![boosted];
        with_boost.extend(others);

        let q = toks("heizung");
        let s_base = score(&q, &with_base, Bm25Params::default())[0];
        let s_boost = score(&q, &with_boost, Bm25Params::default())[0];
        assert!(s_boost >= s_base);
    }

    #[test]
    fn repeated_query_tokens_count_per_occurrence() {
        let once = score(&toks("heizung"), &corpus(), Bm25Params::default());
        let twice = score(&toks("heizung heizung"), &corpus(), Bm25Params::default());
        assert!((twice[0] - 2.0 * once[0]).abs() < 1e-12);
    }

    #[test]
    fn all_empty_documents_do_not_divide_by_zero() {
        let docs = vec![Vec::new(), Vec::new()];
        let scores = score(&toks("heizung"), &docs, Bm25Params::default());
        assert_eq!(scores, vec![0.0, 0.0]);
    }
}
