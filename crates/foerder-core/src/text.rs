/// German text normalization and tokenization.
///
/// Lowercases, folds umlauts and sharp s to ASCII digraphs, replaces every
/// character that is neither a word character nor whitespace with a space, and
/// drops stop words and purely numeric tokens. Corpus documents and queries
/// must go through the same function so that their tokens line up.
use std::collections::HashSet;
use std::sync::LazyLock;

/// Common German function words, stored in folded form (`für` -> `fuer`).
static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "und", "oder", "der", "die", "das", "ein", "eine", "einer", "einem", "einen", "den",
        "dem", "zu", "mit", "fuer", "im", "in", "am", "an", "auf", "aus", "als", "bei", "vom",
        "von", "des", "ist", "sind", "werden", "wird", "auch", "sowie", "bis", "dass", "nach",
        "vor", "durch", "ohne", "unter", "ueber", "so", "wenn", "diese", "dieser", "dieses",
        "denn", "etc", "sie", "er", "es", "wir", "ihr", "ihnen", "ihre", "ihren", "ihrer",
        "euch", "man", "kann", "koennen", "nicht", "nur", "noch", "schon",
    ]
    .into_iter()
    .collect()
});

/// Canonical text form: folded, lowercased, punctuation replaced by single spaces.
pub fn normalize_text(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for c in text.chars().flat_map(char::to_lowercase) {
        match c {
            'ä' => folded.push_str("ae"),
            'ö' => folded.push_str("oe"),
            'ü' => folded.push_str("ue"),
            'ß' => folded.push_str("ss"),
            c if is_word_char(c) => folded.push(c),
            _ => folded.push(' '),
        }
    }
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Tokenize text into the normalized, stop-word-free token sequence.
///
/// Never fails: empty or punctuation-only input yields an empty vector.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize_text(text)
        .split(' ')
        .filter(|t| !t.is_empty())
        .filter(|t| !STOP_WORDS.contains(*t))
        .filter(|t| !t.chars().all(char::is_numeric))
        .map(str::to_string)
        .collect()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
