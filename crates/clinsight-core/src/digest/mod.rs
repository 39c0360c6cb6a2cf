//! Conversation-level aggregation.
//!
//! Folds per-message extraction and emotion classification into one digest
//! for a whole conversation. Only patient (user-role) messages contribute;
//! system prompts and assistant replies are skipped.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::emotion::{EmotionClassifier, EmotionLabel};
use crate::extract::{merge_entities, EntityExtractor, EntityMap};
use crate::models::{ChatMessage, Role};

/// Aggregated view of one conversation.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationDigest {
    /// Union of entities across all user messages, first-seen order.
    pub entities: EntityMap,
    /// How many user messages landed on each detected label. Gated
    /// (`unknown`) results are not tallied.
    pub emotion_counts: BTreeMap<EmotionLabel, usize>,
    /// Most frequent label; ties go to the label declared first in the
    /// vocabulary. `Unknown` when nothing was detected.
    pub dominant_emotion: EmotionLabel,
    /// Share of detected labels, percent rounded to one decimal.
    pub emotion_breakdown: BTreeMap<EmotionLabel, f64>,
}

impl ConversationDigest {
    fn empty() -> Self {
        Self {
            entities: EntityMap::new(),
            emotion_counts: BTreeMap::new(),
            dominant_emotion: EmotionLabel::Unknown,
            emotion_breakdown: BTreeMap::new(),
        }
    }
}

/// Runs extraction and emotion classification over whole conversations.
pub struct ConversationAnalyzer<'a> {
    extractor: &'a EntityExtractor,
    classifier: &'a EmotionClassifier,
}

impl<'a> ConversationAnalyzer<'a> {
    pub fn new(extractor: &'a EntityExtractor, classifier: &'a EmotionClassifier) -> Self {
        Self {
            extractor,
            classifier,
        }
    }

    /// Digest a conversation transcript.
    pub fn summarize(&self, messages: &[ChatMessage]) -> ConversationDigest {
        let mut digest = ConversationDigest::empty();
        let mut detected = 0usize;

        for message in messages {
            if message.role != Role::User {
                continue;
            }

            let entities = self.extractor.extract(&message.content);
            merge_entities(&mut digest.entities, &entities);

            let score = self.classifier.classify(&message.content);
            if score.label != EmotionLabel::Unknown {
                *digest.emotion_counts.entry(score.label).or_insert(0) += 1;
                detected += 1;
            }
        }

        if detected == 0 {
            return digest;
        }

        // Strictly-greater scan over the count map; BTreeMap iterates in
        // vocabulary declaration order, so the first-declared label wins ties.
        let mut dominant = EmotionLabel::Unknown;
        let mut best = 0usize;
        for (&label, &count) in &digest.emotion_counts {
            if count > best {
                dominant = label;
                best = count;
            }
        }
        digest.dominant_emotion = dominant;

        for (&label, &count) in &digest.emotion_counts {
            let pct = (count as f64 / detected as f64 * 1000.0).round() / 10.0;
            digest.emotion_breakdown.insert(label, pct);
        }

        debug!(
            detected,
            dominant = digest.dominant_emotion.as_str(),
            "summarized conversation"
        );
        digest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::{EmotionModel, LabelScore, ModelResult};
    use crate::patterns::{EntityCategory, PatternLibrary};

    /// Maps exact message text to a fixed label.
    struct ScriptedModel(Vec<(&'static str, &'static str)>);

    impl EmotionModel for ScriptedModel {
        fn score(&self, text: &str) -> ModelResult<Vec<LabelScore>> {
            for (needle, label) in &self.0 {
                if text.contains(needle) {
                    return Ok(vec![LabelScore {
                        label: (*label).to_string(),
                        score: 0.9,
                    }]);
                }
            }
            Ok(vec![LabelScore {
                label: "joy".to_string(),
                score: 0.9,
            }])
        }
    }

    fn analyzer_parts(
        script: Vec<(&'static str, &'static str)>,
    ) -> (EntityExtractor, EmotionClassifier) {
        (
            EntityExtractor::new(PatternLibrary::standard().unwrap()),
            EmotionClassifier::new(Box::new(ScriptedModel(script))),
        )
    }

    fn user(content: &str) -> ChatMessage {
        ChatMessage::new(Role::User, content)
    }

    #[test]
    fn test_empty_conversation() {
        let (extractor, classifier) = analyzer_parts(vec![]);
        let analyzer = ConversationAnalyzer::new(&extractor, &classifier);

        let digest = analyzer.summarize(&[]);
        assert!(digest.entities.is_empty());
        assert!(digest.emotion_counts.is_empty());
        assert_eq!(digest.dominant_emotion, EmotionLabel::Unknown);
        assert!(digest.emotion_breakdown.is_empty());
    }

    #[test]
    fn test_only_user_messages_counted() {
        let (extractor, classifier) = analyzer_parts(vec![]);
        let analyzer = ConversationAnalyzer::new(&extractor, &classifier);

        let messages = vec![
            ChatMessage::new(Role::System, "you are a medical assistant"),
            user("I feel happy about the treatment"),
            ChatMessage::new(Role::Assistant, "glad the fever broke"),
        ];
        let digest = analyzer.summarize(&messages);

        assert_eq!(digest.emotion_counts.len(), 1);
        assert_eq!(digest.emotion_counts[&EmotionLabel::Joy], 1);
        // Assistant mention of fever must not leak into entities.
        assert!(!digest.entities.contains_key(&EntityCategory::Symptom));
    }

    #[test]
    fn test_entities_union_across_messages() {
        let (extractor, classifier) = analyzer_parts(vec![]);
        let analyzer = ConversationAnalyzer::new(&extractor, &classifier);

        let messages = vec![
            user("I have a headache and took ibuprofen"),
            user("the headache is back, also some nausea"),
        ];
        let digest = analyzer.summarize(&messages);

        let symptoms = &digest.entities[&EntityCategory::Symptom];
        assert_eq!(
            symptoms.iter().filter(|s| s.as_str() == "headache").count(),
            1
        );
        assert!(symptoms.contains(&"nausea".to_string()));
        assert!(digest.entities[&EntityCategory::Medication].contains(&"ibuprofen".to_string()));
    }

    #[test]
    fn test_breakdown_rounds_to_one_decimal() {
        let script = vec![("terrible", "sadness")];
        let (extractor, classifier) = analyzer_parts(script);
        let analyzer = ConversationAnalyzer::new(&extractor, &classifier);

        let messages = vec![
            user("feeling good today"),
            user("still feeling good"),
            user("now this is terrible"),
        ];
        let digest = analyzer.summarize(&messages);

        assert_eq!(digest.dominant_emotion, EmotionLabel::Joy);
        assert_eq!(digest.emotion_breakdown[&EmotionLabel::Joy], 66.7);
        assert_eq!(digest.emotion_breakdown[&EmotionLabel::Sadness], 33.3);
    }

    #[test]
    fn test_tie_goes_to_first_declared() {
        let script = vec![("terrible", "sadness")];
        let (extractor, classifier) = analyzer_parts(script);
        let analyzer = ConversationAnalyzer::new(&extractor, &classifier);

        let messages = vec![user("feeling good today"), user("now this is terrible")];
        let digest = analyzer.summarize(&messages);

        // Sadness and Joy both count 1; Sadness is declared first.
        assert_eq!(digest.dominant_emotion, EmotionLabel::Sadness);
    }

    #[test]
    fn test_gated_messages_are_not_tallied() {
        let (extractor, classifier) = analyzer_parts(vec![]);
        let analyzer = ConversationAnalyzer::new(&extractor, &classifier);

        // Too short for the classifier, so nothing is detected.
        let digest = analyzer.summarize(&[user("ok")]);
        assert!(digest.emotion_counts.is_empty());
        assert_eq!(digest.dominant_emotion, EmotionLabel::Unknown);
        assert!(digest.emotion_breakdown.is_empty());
    }

    #[test]
    fn test_gated_messages_excluded_from_breakdown() {
        let (extractor, classifier) = analyzer_parts(vec![]);
        let analyzer = ConversationAnalyzer::new(&extractor, &classifier);

        // One gated message, one detected: percentages are over detected only.
        let digest = analyzer.summarize(&[user("ok"), user("feeling good today")]);
        assert_eq!(digest.emotion_counts[&EmotionLabel::Joy], 1);
        assert_eq!(digest.emotion_breakdown[&EmotionLabel::Joy], 100.0);
    }
}
