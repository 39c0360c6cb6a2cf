//! Entity extraction over patient free text.
//!
//! Applies the pattern library to one message and returns a category -> spans
//! map. Extraction is a pure function: no state is shared across calls and
//! identical input always produces an identical map.

use std::collections::BTreeMap;

use tracing::debug;

use crate::patterns::{EntityCategory, PatternLibrary};

/// Category -> ordered, deduplicated, lower-cased matched spans.
///
/// Categories with no matches are absent entirely; a present key always maps
/// to a non-empty sequence. Keys iterate in category evaluation order.
pub type EntityMap = BTreeMap<EntityCategory, Vec<String>>;

/// Rule-based medical entity extractor.
pub struct EntityExtractor {
    library: PatternLibrary,
}

impl EntityExtractor {
    /// Create an extractor over a compiled pattern library.
    pub fn new(library: PatternLibrary) -> Self {
        Self { library }
    }

    /// Extract entities from one message.
    ///
    /// SEVERITY and DURATION groups are skipped unless a SYMPTOM matched in
    /// the same call: they qualify symptoms and never stand alone. Empty or
    /// non-matching text yields an empty map, never an error.
    pub fn extract(&self, text: &str) -> EntityMap {
        let mut entities = EntityMap::new();
        if text.trim().is_empty() {
            return entities;
        }

        let lowered = text.to_lowercase();
        let mut symptom_found = false;

        for group in self.library.groups() {
            if group.category.is_symptom_attribute() && !symptom_found {
                continue;
            }

            let mut spans: Vec<String> = Vec::new();
            for pattern in &group.patterns {
                for mat in pattern.find_iter(&lowered) {
                    let span = mat.as_str();
                    if !spans.iter().any(|s| s == span) {
                        spans.push(span.to_string());
                    }
                }
            }

            if !spans.is_empty() {
                if group.category == EntityCategory::Symptom {
                    symptom_found = true;
                }
                entities.insert(group.category, spans);
            }
        }

        debug!(
            categories = entities.len(),
            "extracted medical entities"
        );
        entities
    }
}

/// Merge `from` into `into`: set union per category, preserving first-seen
/// order. Used by the conversation aggregator; per-message maps are copied,
/// never mutated in place.
pub fn merge_entities(into: &mut EntityMap, from: &EntityMap) {
    for (category, spans) in from {
        let merged = into.entry(*category).or_default();
        for span in spans {
            if !merged.iter().any(|s| s == span) {
                merged.push(span.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn extractor() -> EntityExtractor {
        EntityExtractor::new(PatternLibrary::standard().unwrap())
    }

    #[test]
    fn test_extract_medications_and_dosage() {
        let ex = extractor();
        let entities = ex.extract("I took 200mg ibuprofen and some tylenol");

        let meds = &entities[&EntityCategory::Medication];
        assert!(meds.contains(&"ibuprofen".to_string()));
        assert!(meds.contains(&"tylenol".to_string()));
        assert!(meds.contains(&"200mg".to_string()));
    }

    #[test]
    fn test_severity_requires_symptom() {
        let ex = extractor();

        // "worse" alone matches a severity word, but with no symptom present
        // the attribute categories stay out of the map.
        let entities = ex.extract("things got worse overall");
        assert!(!entities.contains_key(&EntityCategory::Severity));
        assert!(!entities.contains_key(&EntityCategory::Duration));

        let entities = ex.extract("my cough got worse");
        assert!(entities.contains_key(&EntityCategory::Symptom));
        assert!(entities.contains_key(&EntityCategory::Severity));
    }

    #[test]
    fn test_duration_attached_to_symptom() {
        let ex = extractor();
        let entities = ex.extract("I have had a fever for 3 days");

        assert!(entities[&EntityCategory::Symptom].contains(&"fever".to_string()));
        assert!(entities[&EntityCategory::Duration]
            .contains(&"for 3 days".to_string()));
    }

    #[test]
    fn test_conditions_and_vitals() {
        let ex = extractor();
        let entities =
            ex.extract("I have diabetes and my blood pressure was 140/90 today");

        assert!(entities[&EntityCategory::Condition]
            .contains(&"diabetes".to_string()));
        assert!(entities[&EntityCategory::Vitals]
            .iter()
            .any(|v| v.contains("140/90")));
    }

    #[test]
    fn test_no_duplicates_first_seen_order() {
        let ex = extractor();
        let entities = ex.extract("headache again, this headache and nausea");

        let symptoms = &entities[&EntityCategory::Symptom];
        assert_eq!(
            symptoms.iter().filter(|s| *s == "headache").count(),
            1
        );
        let head_idx = symptoms.iter().position(|s| s == "headache").unwrap();
        let nausea_idx = symptoms.iter().position(|s| s == "nausea").unwrap();
        assert!(head_idx < nausea_idx);
    }

    #[test]
    fn test_empty_and_unmatched_text() {
        let ex = extractor();
        assert!(ex.extract("").is_empty());
        assert!(ex.extract("   \n\t ").is_empty());
        assert!(ex.extract("hello there, nice weather").is_empty());
    }

    #[test]
    fn test_merge_entities_union() {
        let ex = extractor();
        let first = ex.extract("severe headache for 3 days");
        let second = ex.extract("headache and nausea");

        let mut merged = EntityMap::new();
        merge_entities(&mut merged, &first);
        merge_entities(&mut merged, &second);

        let symptoms = &merged[&EntityCategory::Symptom];
        assert_eq!(
            symptoms.iter().filter(|s| *s == "headache").count(),
            1
        );
        assert!(symptoms.contains(&"nausea".to_string()));
    }

    proptest! {
        #[test]
        fn prop_no_empty_category_values(text in ".{0,300}") {
            let ex = extractor();
            let entities = ex.extract(&text);
            for spans in entities.values() {
                prop_assert!(!spans.is_empty());
            }
        }

        #[test]
        fn prop_attributes_imply_symptom(text in "[a-z0-9 .,/]{0,300}") {
            let ex = extractor();
            let entities = ex.extract(&text);
            if entities.contains_key(&EntityCategory::Severity)
                || entities.contains_key(&EntityCategory::Duration)
            {
                prop_assert!(entities.contains_key(&EntityCategory::Symptom));
            }
        }

        #[test]
        fn prop_extract_idempotent(text in ".{0,300}") {
            let ex = extractor();
            prop_assert_eq!(ex.extract(&text), ex.extract(&text));
        }
    }
}
