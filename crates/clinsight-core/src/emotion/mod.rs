//! Emotion classification gating policy.
//!
//! The scoring backend is a capability (see the `clinsight-emotion` crate);
//! this module owns the label vocabulary and the gating rules: minimum text
//! length, minimum confidence, and degrade-to-unknown on backend failure.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Minimum trimmed input length before the backend is invoked.
pub const MIN_TEXT_LENGTH: usize = 5;
/// Minimum confidence for a label to be reported.
pub const MIN_CONFIDENCE: f64 = 0.5;

/// Emotion backend errors.
#[derive(Error, Debug)]
pub enum EmotionError {
    #[error("classifier backend error: {0}")]
    Backend(String),

    #[error("classifier returned no scores")]
    Empty,
}

pub type ModelResult<T> = Result<T, EmotionError>;

/// The fixed emotion vocabulary, plus `Unknown` for gated results.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    Sadness,
    Joy,
    Love,
    Anger,
    Fear,
    Surprise,
    Unknown,
}

impl EmotionLabel {
    /// The classifiable vocabulary, in declaration order (`Unknown` excluded).
    pub const VOCABULARY: [EmotionLabel; 6] = [
        EmotionLabel::Sadness,
        EmotionLabel::Joy,
        EmotionLabel::Love,
        EmotionLabel::Anger,
        EmotionLabel::Fear,
        EmotionLabel::Surprise,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionLabel::Sadness => "sadness",
            EmotionLabel::Joy => "joy",
            EmotionLabel::Love => "love",
            EmotionLabel::Anger => "anger",
            EmotionLabel::Fear => "fear",
            EmotionLabel::Surprise => "surprise",
            EmotionLabel::Unknown => "unknown",
        }
    }

    /// Parse a backend label. Out-of-vocabulary labels map to `None`.
    pub fn parse(s: &str) -> Option<EmotionLabel> {
        match s.to_lowercase().as_str() {
            "sadness" => Some(EmotionLabel::Sadness),
            "joy" => Some(EmotionLabel::Joy),
            "love" => Some(EmotionLabel::Love),
            "anger" => Some(EmotionLabel::Anger),
            "fear" => Some(EmotionLabel::Fear),
            "surprise" => Some(EmotionLabel::Surprise),
            _ => None,
        }
    }
}

/// A classified emotion with its confidence in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionScore {
    pub label: EmotionLabel,
    pub confidence: f64,
}

impl EmotionScore {
    /// The gated result: label suppressed, confidence kept for diagnostics.
    pub fn unknown(confidence: f64) -> Self {
        Self {
            label: EmotionLabel::Unknown,
            confidence,
        }
    }
}

/// One raw (label, score) pair from a scoring backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

/// A single-label text scoring capability.
///
/// Implementations live outside the core (hosted classifier binding, lexicon
/// scorer). Failures are reported, never panicked; the classifier degrades
/// them to `unknown`.
pub trait EmotionModel: Send + Sync {
    /// Score the text against the emotion vocabulary.
    fn score(&self, text: &str) -> ModelResult<Vec<LabelScore>>;

    /// Whether the backend is initialized and usable.
    fn ready(&self) -> bool {
        true
    }
}

/// Emotion classifier applying the gating policy over an injected backend.
pub struct EmotionClassifier {
    model: Box<dyn EmotionModel>,
}

impl EmotionClassifier {
    /// Create a classifier over a scoring backend.
    pub fn new(model: Box<dyn EmotionModel>) -> Self {
        Self { model }
    }

    /// Whether the underlying backend is ready.
    pub fn ready(&self) -> bool {
        self.model.ready()
    }

    /// Classify one message.
    ///
    /// Contract: trimmed input shorter than [`MIN_TEXT_LENGTH`] returns
    /// `unknown`/0.0 without invoking the backend; backend failure returns
    /// `unknown`/0.0; a top score below [`MIN_CONFIDENCE`] returns `unknown`
    /// with the true sub-threshold score preserved.
    pub fn classify(&self, text: &str) -> EmotionScore {
        if text.trim().chars().count() < MIN_TEXT_LENGTH {
            return EmotionScore::unknown(0.0);
        }

        let scores = match self.model.score(text) {
            Ok(scores) => scores,
            Err(e) => {
                warn!(error = %e, "emotion backend failed, degrading to unknown");
                return EmotionScore::unknown(0.0);
            }
        };

        let top = match top_score(&scores) {
            Some(top) => top,
            None => return EmotionScore::unknown(0.0),
        };

        let label = match EmotionLabel::parse(&top.label) {
            Some(label) => label,
            None => {
                warn!(label = %top.label, "out-of-vocabulary emotion label");
                return EmotionScore::unknown(top.score);
            }
        };

        if top.score < MIN_CONFIDENCE {
            return EmotionScore::unknown(top.score);
        }

        EmotionScore {
            label,
            confidence: top.score,
        }
    }
}

/// Highest-scored entry; the first one wins ties for determinism.
fn top_score(scores: &[LabelScore]) -> Option<&LabelScore> {
    let mut best: Option<&LabelScore> = None;
    for score in scores {
        match best {
            Some(b) if score.score <= b.score => {}
            _ => best = Some(score),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Backend returning a fixed score list.
    struct StaticModel(Vec<LabelScore>);

    impl EmotionModel for StaticModel {
        fn score(&self, _text: &str) -> ModelResult<Vec<LabelScore>> {
            Ok(self.0.clone())
        }
    }

    /// Backend that always fails.
    struct BrokenModel;

    impl EmotionModel for BrokenModel {
        fn score(&self, _text: &str) -> ModelResult<Vec<LabelScore>> {
            Err(EmotionError::Backend("connection refused".into()))
        }

        fn ready(&self) -> bool {
            false
        }
    }

    fn classifier(scores: Vec<LabelScore>) -> EmotionClassifier {
        EmotionClassifier::new(Box::new(StaticModel(scores)))
    }

    #[test]
    fn test_short_text_skips_backend() {
        let clf = EmotionClassifier::new(Box::new(BrokenModel));
        // Would fail if the backend were invoked.
        let result = clf.classify("hi  ");
        assert_eq!(result, EmotionScore::unknown(0.0));
    }

    #[test]
    fn test_confident_label_passes() {
        let clf = classifier(vec![
            LabelScore { label: "joy".into(), score: 0.92 },
            LabelScore { label: "sadness".into(), score: 0.05 },
        ]);
        let result = clf.classify("I am feeling so much better today");
        assert_eq!(result.label, EmotionLabel::Joy);
        assert_eq!(result.confidence, 0.92);
    }

    #[test]
    fn test_low_confidence_preserves_score() {
        let clf = classifier(vec![LabelScore { label: "fear".into(), score: 0.31 }]);
        let result = clf.classify("not sure how I feel about all this");
        assert_eq!(result.label, EmotionLabel::Unknown);
        assert_eq!(result.confidence, 0.31);
    }

    #[test]
    fn test_backend_failure_degrades() {
        let clf = EmotionClassifier::new(Box::new(BrokenModel));
        assert!(!clf.ready());
        let result = clf.classify("a long enough message to invoke the backend");
        assert_eq!(result, EmotionScore::unknown(0.0));
    }

    #[test]
    fn test_out_of_vocabulary_label() {
        let clf = classifier(vec![LabelScore { label: "disgust".into(), score: 0.88 }]);
        let result = clf.classify("that is really quite something");
        assert_eq!(result.label, EmotionLabel::Unknown);
        assert_eq!(result.confidence, 0.88);
    }

    #[test]
    fn test_empty_scores() {
        let clf = classifier(vec![]);
        let result = clf.classify("a perfectly ordinary message");
        assert_eq!(result, EmotionScore::unknown(0.0));
    }

    #[test]
    fn test_label_roundtrip() {
        for label in EmotionLabel::VOCABULARY {
            assert_eq!(EmotionLabel::parse(label.as_str()), Some(label));
        }
        assert_eq!(EmotionLabel::parse("ANGER"), Some(EmotionLabel::Anger));
        assert_eq!(EmotionLabel::parse("boredom"), None);
    }
}
