/// Seam for turning free chat text into answer values.
///
/// Extraction itself (rule-based, model-backed or remote) lives behind
/// [`FieldExtractor`]. This module only drives an extractor over the six
/// fields and validates what comes back, so that every value stored in an
/// [`AnswerSet`] is either well-formed or the "not found" sentinel.
use crate::answers::{is_valid_kategorie, norm_bundesland, norm_number_plain, norm_year, AnswerField};
use crate::model::{AnswerSet, NOT_FOUND};

/// Result of extracting one field from one piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub answered: bool,
    pub value: String,
}

impl Extraction {
    pub fn found(value: impl Into<String>) -> Self {
        Self {
            answered: true,
            value: value.into(),
        }
    }

    pub fn not_found() -> Self {
        Self {
            answered: false,
            value: NOT_FOUND.to_string(),
        }
    }
}

pub trait FieldExtractor {
    /// Extract `field` from `text`. `context` is the question the text answers,
    /// if the chat asked one.
    fn extract(&self, text: &str, field: AnswerField, context: Option<&str>) -> Extraction;
}

/// Extract and validate a single field.
pub fn extract_answer<E: FieldExtractor + ?Sized>(
    extractor: &E,
    text: &str,
    field: AnswerField,
    context: Option<&str>,
) -> Extraction {
    let raw = extractor.extract(text, field, context);
    if !raw.answered {
        return Extraction::not_found();
    }
    match validate(field, &raw.value) {
        Some(value) => Extraction::found(value),
        None => Extraction::not_found(),
    }
}

/// Run the extractor for every field without question context.
pub fn check_all<E: FieldExtractor + ?Sized>(extractor: &E, text: &str) -> AnswerSet {
    let mut answers = AnswerSet::default();
    for field in AnswerField::ALL {
        let extraction = extract_answer(extractor, text, field, None);
        field.set(&mut answers, extraction.value);
    }
    answers
}

fn validate(field: AnswerField, value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value == NOT_FOUND {
        return None;
    }
    match field {
        AnswerField::Kategorie => is_valid_kategorie(value).then(|| value.to_string()),
        AnswerField::Branche => Some(value.to_string()),
        AnswerField::Bundesland => norm_bundesland(value).map(str::to_string),
        AnswerField::Gruendungsjahr => norm_year(value),
        AnswerField::ProjektkostenEur | AnswerField::EigenanteilEur => norm_number_plain(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Canned(HashMap<AnswerField, &'static str>);

    impl FieldExtractor for Canned {
        fn extract(&self, _text: &str, field: AnswerField, _context: Option<&str>) -> Extraction {
            match self.0.get(&field) {
                Some(v) => Extraction::found(*v),
                None => Extraction::not_found(),
            }
        }
    }

    #[test]
    fn check_all_validates_values() {
        let extractor = Canned(HashMap::from([
            (AnswerField::Kategorie, "Investition"),
            (AnswerField::Branche, "Metallbau"),
            (AnswerField::Bundesland, "NRW"),
            (AnswerField::Gruendungsjahr, "im Jahr 2010"),
            (AnswerField::ProjektkostenEur, "250.000 €"),
        ]));
        let answers = check_all(&extractor, "egal");
        assert_eq!(answers.kategorie, "Investition");
        assert_eq!(answers.branche, "Metallbau");
        assert_eq!(answers.bundesland, "Nordrhein-Westfalen");
        assert_eq!(answers.gruendungsjahr, NOT_FOUND);
        assert_eq!(answers.projektkosten_eur, "250000");
        assert_eq!(answers.eigenanteil_eur, NOT_FOUND);
    }

    #[test]
    fn invalid_category_becomes_not_found() {
        let extractor = Canned(HashMap::from([(AnswerField::Kategorie, "Forschung")]));
        let got = extract_answer(&extractor, "x", AnswerField::Kategorie, Some("Kategorie?"));
        assert_eq!(got, Extraction::not_found());
    }

    #[test]
    fn works_through_trait_objects() {
        let extractor: Box<dyn FieldExtractor> =
            Box::new(Canned(HashMap::from([(AnswerField::EigenanteilEur, "0")])));
        let got = extract_answer(extractor.as_ref(), "x", AnswerField::EigenanteilEur, None);
        assert_eq!(got, Extraction::found("0"));
    }
}
