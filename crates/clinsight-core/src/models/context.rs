//! Per-session medical context volunteered by the patient.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Medical context accumulated over a session.
///
/// Updates merge rather than replace: map fields merge key-wise, list fields
/// append unique entries, `language` is replaced when set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserContext {
    pub session_id: i64,
    #[serde(default)]
    pub symptoms: BTreeMap<String, String>,
    #[serde(default)]
    pub symptom_durations: BTreeMap<String, String>,
    #[serde(default)]
    pub treatments_tried: Vec<String>,
    #[serde(default)]
    pub medical_history: Vec<String>,
    #[serde(default)]
    pub cultural_preferences: BTreeMap<String, String>,
    pub language: Option<String>,
}

impl UserContext {
    pub fn new(session_id: i64) -> Self {
        Self {
            session_id,
            ..Default::default()
        }
    }

    /// Merge an update into this context.
    pub fn merge(&mut self, update: &UserContext) {
        for (k, v) in &update.symptoms {
            self.symptoms.insert(k.clone(), v.clone());
        }
        for (k, v) in &update.symptom_durations {
            self.symptom_durations.insert(k.clone(), v.clone());
        }
        for treatment in &update.treatments_tried {
            if !self.treatments_tried.contains(treatment) {
                self.treatments_tried.push(treatment.clone());
            }
        }
        for item in &update.medical_history {
            if !self.medical_history.contains(item) {
                self.medical_history.push(item.clone());
            }
        }
        for (k, v) in &update.cultural_preferences {
            self.cultural_preferences.insert(k.clone(), v.clone());
        }
        if update.language.is_some() {
            self.language = update.language.clone();
        }
    }

    /// Whether any field carries information.
    pub fn is_empty(&self) -> bool {
        self.symptoms.is_empty()
            && self.symptom_durations.is_empty()
            && self.treatments_tried.is_empty()
            && self.medical_history.is_empty()
            && self.cultural_preferences.is_empty()
            && self.language.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_maps_and_lists() {
        let mut ctx = UserContext::new(1);
        ctx.symptoms.insert("headache".into(), "throbbing".into());
        ctx.treatments_tried.push("rest".into());

        let mut update = UserContext::new(1);
        update.symptoms.insert("fever".into(), "38.5".into());
        update.treatments_tried.push("rest".into());
        update.treatments_tried.push("paracetamol".into());
        update.language = Some("pidgin".into());

        ctx.merge(&update);

        assert_eq!(ctx.symptoms.len(), 2);
        assert_eq!(ctx.treatments_tried, vec!["rest", "paracetamol"]);
        assert_eq!(ctx.language.as_deref(), Some("pidgin"));
    }

    #[test]
    fn test_merge_keeps_language_when_absent() {
        let mut ctx = UserContext::new(1);
        ctx.language = Some("yoruba".into());

        ctx.merge(&UserContext::new(1));
        assert_eq!(ctx.language.as_deref(), Some("yoruba"));
    }

    #[test]
    fn test_is_empty() {
        let mut ctx = UserContext::new(3);
        assert!(ctx.is_empty());
        ctx.medical_history.push("asthma".into());
        assert!(!ctx.is_empty());
    }
}
