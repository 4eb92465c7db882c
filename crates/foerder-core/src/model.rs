use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

/// Literal used for every answer or record field whose value is unknown.
pub const NOT_FOUND: &str = "not found";

/// Funding area value for nationwide programmes.
pub const BUND: &str = "Bund";

pub const BUNDESLAENDER: [&str; 16] = [
    "Baden-Württemberg",
    "Bayern",
    "Berlin",
    "Brandenburg",
    "Bremen",
    "Hamburg",
    "Hessen",
    "Mecklenburg-Vorpommern",
    "Niedersachsen",
    "Nordrhein-Westfalen",
    "Rheinland-Pfalz",
    "Saarland",
    "Sachsen",
    "Sachsen-Anhalt",
    "Schleswig-Holstein",
    "Thüringen",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kategorie {
    Innovation,
    Investition,
    Finanzierung,
}

impl Kategorie {
    pub const ALL: [Kategorie; 3] = [
        Kategorie::Innovation,
        Kategorie::Investition,
        Kategorie::Finanzierung,
    ];

    /// Exact, case-sensitive label match.
    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == label)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Kategorie::Innovation => "Innovation",
            Kategorie::Investition => "Investition",
            Kategorie::Finanzierung => "Finanzierung",
        }
    }
}

impl fmt::Display for Kategorie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of funding instrument tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Foerderart {
    Zuschuss,
    Darlehen,
    BuergschaftenGarantien,
    NotFound,
}

impl Foerderart {
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim() {
            "Zuschuss" => Some(Foerderart::Zuschuss),
            "Darlehen" => Some(Foerderart::Darlehen),
            "Bürgschaften/Garantien" => Some(Foerderart::BuergschaftenGarantien),
            NOT_FOUND => Some(Foerderart::NotFound),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Foerderart::Zuschuss => "Zuschuss",
            Foerderart::Darlehen => "Darlehen",
            Foerderart::BuergschaftenGarantien => "Bürgschaften/Garantien",
            Foerderart::NotFound => NOT_FOUND,
        }
    }
}

/// The six facts collected from the applicant.
///
/// Unknown fields always hold [`NOT_FOUND`]. Missing keys, `null` and empty
/// strings deserialize to the sentinel; JSON numbers are kept as digit strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AnswerSet {
    /// Innovation, Investition, Finanzierung or "not found".
    #[serde(default = "not_found", deserialize_with = "answer_value")]
    pub kategorie: String,
    /// Industry label or "not found".
    #[serde(default = "not_found", deserialize_with = "answer_value")]
    pub branche: String,
    /// German federal state or "not found".
    #[serde(default = "not_found", deserialize_with = "answer_value")]
    pub bundesland: String,
    /// Four-digit founding year or "not found".
    #[serde(default = "not_found", deserialize_with = "answer_value")]
    pub gruendungsjahr: String,
    /// Project cost in EUR (digits) or "not found".
    #[serde(default = "not_found", deserialize_with = "answer_value")]
    pub projektkosten_eur: String,
    /// Own contribution in EUR (digits) or "not found".
    #[serde(default = "not_found", deserialize_with = "answer_value")]
    pub eigenanteil_eur: String,
}

impl Default for AnswerSet {
    fn default() -> Self {
        Self {
            kategorie: not_found(),
            branche: not_found(),
            bundesland: not_found(),
            gruendungsjahr: not_found(),
            projektkosten_eur: not_found(),
            eigenanteil_eur: not_found(),
        }
    }
}

impl AnswerSet {
    pub fn kategorie(&self) -> Option<Kategorie> {
        Kategorie::parse(&self.kategorie)
    }
}

/// One normalized funding programme as produced by the corpus builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgrammeRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub alldetails: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub funding_category: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub funding_area: String,
    #[serde(rename = "förderart", default, deserialize_with = "lenient_tags")]
    pub foerderart: Vec<String>,
    #[serde(rename = "höhe_der_förderung", default, deserialize_with = "lenient_text")]
    pub hoehe_der_foerderung: String,
}

impl ProgrammeRecord {
    /// Known funding types, skipping the "not found" placeholder and stray tags.
    pub fn funding_types(&self) -> Vec<Foerderart> {
        self.foerderart
            .iter()
            .filter_map(|tag| Foerderart::parse(tag))
            .filter(|fa| *fa != Foerderart::NotFound)
            .collect()
    }

    /// Case-insensitive substring test against the grant tag.
    pub fn offers_zuschuss(&self) -> bool {
        self.foerderart
            .iter()
            .any(|tag| tag.to_lowercase().contains("zuschuss"))
    }

    pub fn has_category(&self) -> bool {
        let cat = self.funding_category.trim();
        !cat.is_empty() && cat != NOT_FOUND
    }
}

/// A programme with its BM25 relevance score (higher is more relevant).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    pub programme: ProgrammeRecord,
    pub score: f64,
}

fn not_found() -> String {
    NOT_FOUND.to_string()
}

fn answer_value<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => not_found(),
    })
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

fn lenient_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        Some(other) => {
            warn!(value = %other, "förderart is not a list, treating as empty");
            Vec::new()
        }
    })
}
