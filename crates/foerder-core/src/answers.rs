/// Answer-set bookkeeping for the intake chat.
///
/// Tracks which of the six questions are still open, merges newly extracted
/// values into the running answer set, and validates raw field values.
use std::sync::LazyLock;

use chrono::Datelike;
use regex::Regex;

use crate::model::{AnswerSet, Kategorie, BUNDESLAENDER, NOT_FOUND};

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(19\d{2}|20\d{2})\s*$").expect("valid regex"));

const BUNDESLAND_ALIASES: [(&str, &str); 11] = [
    ("nrw", "Nordrhein-Westfalen"),
    ("saxony", "Sachsen"),
    ("lower saxony", "Niedersachsen"),
    ("bw", "Baden-Württemberg"),
    ("bawü", "Baden-Württemberg"),
    ("ba-wü", "Baden-Württemberg"),
    ("mv", "Mecklenburg-Vorpommern"),
    ("rheinland pfalz", "Rheinland-Pfalz"),
    ("rp", "Rheinland-Pfalz"),
    ("sa", "Sachsen-Anhalt"),
    ("bavaria", "Bayern"),
];

/// The six answer keys, in the order the chat asks for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnswerField {
    Kategorie,
    Branche,
    Bundesland,
    Gruendungsjahr,
    ProjektkostenEur,
    EigenanteilEur,
}

impl AnswerField {
    pub const ALL: [AnswerField; 6] = [
        AnswerField::Kategorie,
        AnswerField::Branche,
        AnswerField::Bundesland,
        AnswerField::Gruendungsjahr,
        AnswerField::ProjektkostenEur,
        AnswerField::EigenanteilEur,
    ];

    pub fn key(self) -> &'static str {
        match self {
            AnswerField::Kategorie => "kategorie",
            AnswerField::Branche => "branche",
            AnswerField::Bundesland => "bundesland",
            AnswerField::Gruendungsjahr => "gruendungsjahr",
            AnswerField::ProjektkostenEur => "projektkosten_eur",
            AnswerField::EigenanteilEur => "eigenanteil_eur",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    /// Question shown to the applicant.
    pub fn label(self) -> &'static str {
        match self {
            AnswerField::Kategorie => "Thema / Kategorie (Innovation, Investition, Finanzierung)",
            AnswerField::Branche => "In welcher Branche sind Sie aktiv?",
            AnswerField::Bundesland => "In welchem Bundesland ist das Unternehmen ansässig?",
            AnswerField::Gruendungsjahr => "In welchem Jahr wurde das Unternehmen gegründet?",
            AnswerField::ProjektkostenEur => "Wie hoch sind die Projektkosten in Euro?",
            AnswerField::EigenanteilEur => "Wie viel Eigenanteil können Sie aufbringen?",
        }
    }

    pub fn get(self, answers: &AnswerSet) -> &str {
        match self {
            AnswerField::Kategorie => &answers.kategorie,
            AnswerField::Branche => &answers.branche,
            AnswerField::Bundesland => &answers.bundesland,
            AnswerField::Gruendungsjahr => &answers.gruendungsjahr,
            AnswerField::ProjektkostenEur => &answers.projektkosten_eur,
            AnswerField::EigenanteilEur => &answers.eigenanteil_eur,
        }
    }

    pub fn set(self, answers: &mut AnswerSet, value: String) {
        let slot = match self {
            AnswerField::Kategorie => &mut answers.kategorie,
            AnswerField::Branche => &mut answers.branche,
            AnswerField::Bundesland => &mut answers.bundesland,
            AnswerField::Gruendungsjahr => &mut answers.gruendungsjahr,
            AnswerField::ProjektkostenEur => &mut answers.projektkosten_eur,
            AnswerField::EigenanteilEur => &mut answers.eigenanteil_eur,
        };
        *slot = value;
    }
}

/// The founding year is only asked for innovation projects.
pub fn is_applicable(field: AnswerField, answers: &AnswerSet) -> bool {
    match field {
        AnswerField::Gruendungsjahr => answers.kategorie() == Some(Kategorie::Innovation),
        _ => true,
    }
}

pub fn is_missing(field: AnswerField, answers: &AnswerSet) -> bool {
    is_unknown(field.get(answers))
}

/// First applicable field that still has no value.
pub fn next_missing(answers: &AnswerSet) -> Option<AnswerField> {
    AnswerField::ALL
        .into_iter()
        .find(|&f| is_applicable(f, answers) && is_missing(f, answers))
}

pub fn is_complete(answers: &AnswerSet) -> bool {
    next_missing(answers).is_none()
}

/// Overwrite fields of `current` with every known value from `updates`.
pub fn merge_answers(current: &AnswerSet, updates: &AnswerSet) -> AnswerSet {
    let mut merged = current.clone();
    for field in AnswerField::ALL {
        let value = field.get(updates);
        if !is_unknown(value) {
            field.set(&mut merged, value.to_string());
        }
    }
    merged
}

/// Markdown status list, one line per field.
pub fn status_lines(answers: &AnswerSet) -> Vec<String> {
    AnswerField::ALL
        .into_iter()
        .map(|field| {
            let value = field.get(answers);
            let shown = if !is_applicable(field, answers) && is_unknown(value) {
                "– (nur bei Innovation erforderlich)"
            } else {
                value
            };
            format!("- **{}**: {}", field.label(), shown)
        })
        .collect()
}

/// Four-digit year between 1900 and the current year.
pub fn norm_year(value: &str) -> Option<String> {
    let caps = YEAR_RE.captures(value)?;
    let year: i32 = caps[1].parse().ok()?;
    let this_year = chrono::Local::now().year();
    (1900..=this_year).contains(&year).then(|| year.to_string())
}

/// Strip currency markers and separators, keeping a plain digit string.
pub fn norm_number_plain(value: &str) -> Option<String> {
    let cleaned: String = value
        .trim()
        .to_lowercase()
        .replace('€', "")
        .replace("euro", "")
        .replace("eur", "")
        .chars()
        .filter(|c| !matches!(c, ' ' | '.' | ','))
        .collect();
    (!cleaned.is_empty() && cleaned.chars().all(|c| c.is_ascii_digit())).then_some(cleaned)
}

/// Exact state name (case-insensitive) or a known abbreviation/English name.
pub fn norm_bundesland(value: &str) -> Option<&'static str> {
    let v = value.trim().to_lowercase();
    BUNDESLAENDER
        .iter()
        .find(|bl| bl.to_lowercase() == v)
        .copied()
        .or_else(|| {
            BUNDESLAND_ALIASES
                .iter()
                .find(|(alias, _)| *alias == v)
                .map(|(_, bl)| *bl)
        })
}

pub fn is_valid_kategorie(value: &str) -> bool {
    Kategorie::parse(value.trim()).is_some()
}

pub(crate) fn is_unknown(value: &str) -> bool {
    let v = value.trim();
    v.is_empty() || v == NOT_FOUND
}
