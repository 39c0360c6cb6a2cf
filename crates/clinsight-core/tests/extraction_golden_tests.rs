//! Golden tests for medical entity extraction.
//!
//! These tests verify category assignment against known messages.

use clinsight_core::extract::EntityExtractor;
use clinsight_core::patterns::{EntityCategory, PatternLibrary};

/// Expected spans for one category in one message.
struct GoldenCase {
    id: &'static str,
    input: &'static str,
    expected: Vec<(EntityCategory, Vec<&'static str>)>,
    absent: Vec<EntityCategory>,
}

fn get_golden_cases() -> Vec<GoldenCase> {
    vec![
        GoldenCase {
            id: "symptom-with-severity-duration-and-dose",
            input: "Patient reports severe headache for 3 days, took 200mg ibuprofen",
            expected: vec![
                (EntityCategory::Medication, vec!["ibuprofen", "200mg"]),
                (EntityCategory::Symptom, vec!["headache"]),
                (EntityCategory::Severity, vec!["severe headache"]),
                (EntityCategory::Duration, vec!["for 3 days"]),
            ],
            absent: vec![EntityCategory::Condition, EntityCategory::Vitals],
        },
        GoldenCase {
            id: "severity-without-symptom-is-dropped",
            input: "it has been severe since last week",
            expected: vec![],
            absent: vec![EntityCategory::Severity, EntityCategory::Duration],
        },
        GoldenCase {
            id: "condition-and-medication",
            input: "I was diagnosed with diabetes and take metformin daily",
            expected: vec![
                (EntityCategory::Medication, vec!["metformin"]),
                (EntityCategory::Condition, vec!["diabetes"]),
            ],
            absent: vec![EntityCategory::Symptom],
        },
        GoldenCase {
            id: "vitals-blood-pressure",
            input: "my bp was 140/90 this morning",
            expected: vec![(EntityCategory::Vitals, vec!["bp was 140/90"])],
            absent: vec![EntityCategory::Symptom],
        },
        GoldenCase {
            id: "temperature-reading",
            input: "I have a fever, temperature 38.5 degrees",
            expected: vec![(EntityCategory::Symptom, vec!["fever"])],
            absent: vec![],
        },
        GoldenCase {
            id: "duration-phrasing-variants",
            input: "the cough started 2 weeks ago and the nausea since yesterday",
            expected: vec![
                (EntityCategory::Symptom, vec!["cough", "nausea"]),
                (EntityCategory::Duration, vec!["2 weeks ago", "since yesterday"]),
            ],
            absent: vec![],
        },
        GoldenCase {
            id: "case-insensitive-and-deduplicated",
            input: "Headache again. The HEADACHE will not stop.",
            expected: vec![(EntityCategory::Symptom, vec!["headache"])],
            absent: vec![],
        },
        GoldenCase {
            id: "no-medical-content",
            input: "thanks, talk to you tomorrow",
            expected: vec![],
            absent: vec![
                EntityCategory::Medication,
                EntityCategory::Symptom,
                EntityCategory::Condition,
            ],
        },
    ]
}

#[test]
fn test_extraction_golden_cases() {
    let extractor = EntityExtractor::new(PatternLibrary::standard().unwrap());

    for case in get_golden_cases() {
        let entities = extractor.extract(case.input);

        for (category, spans) in &case.expected {
            let found = entities
                .get(category)
                .unwrap_or_else(|| panic!("[{}] missing category {:?}", case.id, category));
            for span in spans {
                assert!(
                    found.iter().any(|s| s == span),
                    "[{}] expected {:?} in {:?} for {:?}",
                    case.id,
                    span,
                    found,
                    category
                );
            }
        }

        for category in &case.absent {
            assert!(
                !entities.contains_key(category),
                "[{}] unexpected category {:?}: {:?}",
                case.id,
                category,
                entities.get(category)
            );
        }
    }
}

#[test]
fn test_extraction_is_deterministic() {
    let extractor = EntityExtractor::new(PatternLibrary::standard().unwrap());
    let input = "severe chest pain for two hours, took aspirin, history of hypertension";

    let first = extractor.extract(input);
    let second = extractor.extract(input);
    assert_eq!(first, second);
}

#[test]
fn test_numeric_dose_not_mistaken_for_vitals() {
    let extractor = EntityExtractor::new(PatternLibrary::standard().unwrap());
    let entities = extractor.extract("took 200mg ibuprofen over 3 days");

    assert!(!entities.contains_key(&EntityCategory::Vitals));
}
