//! Keyword lexicon scorer.
//!
//! Offline fallback backend: counts emotion keyword hits per label and
//! reports hit shares as scores. Crude next to a transformer, but it keeps
//! the pipeline running when no classifier service is reachable.

use clinsight_core::{EmotionLabel, EmotionModel, LabelScore, ModelResult};
use tracing::debug;

fn keywords(label: EmotionLabel) -> &'static [&'static str] {
    match label {
        EmotionLabel::Sadness => &[
            "sad", "unhappy", "depressed", "miserable", "crying", "hopeless", "grief", "awful",
        ],
        EmotionLabel::Joy => &[
            "happy", "glad", "great", "relieved", "better", "wonderful", "thankful", "good",
        ],
        EmotionLabel::Love => &["love", "grateful", "caring", "appreciate", "kind"],
        EmotionLabel::Anger => &[
            "angry", "furious", "annoyed", "frustrated", "mad", "irritated",
        ],
        EmotionLabel::Fear => &[
            "afraid", "scared", "worried", "anxious", "terrified", "nervous", "panic",
        ],
        EmotionLabel::Surprise => &["surprised", "shocked", "unexpected", "sudden", "amazed"],
        EmotionLabel::Unknown => &[],
    }
}

/// Emotion scorer backed by a fixed keyword lexicon.
#[derive(Debug, Default)]
pub struct LexiconModel;

impl LexiconModel {
    pub fn new() -> Self {
        Self
    }
}

impl EmotionModel for LexiconModel {
    fn score(&self, text: &str) -> ModelResult<Vec<LabelScore>> {
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = lowered
            .split(|c: char| !c.is_alphabetic())
            .filter(|t| !t.is_empty())
            .collect();

        let mut hits: Vec<(EmotionLabel, usize)> = Vec::new();
        let mut total = 0usize;
        for label in EmotionLabel::VOCABULARY {
            let count = tokens
                .iter()
                .filter(|token| keywords(label).contains(*token))
                .count();
            if count > 0 {
                hits.push((label, count));
                total += count;
            }
        }

        // Hit share per label, strongest first. No hits means no scores;
        // the classifier turns that into `unknown`.
        hits.sort_by(|a, b| b.1.cmp(&a.1));
        let scores: Vec<LabelScore> = hits
            .into_iter()
            .map(|(label, count)| LabelScore {
                label: label.as_str().to_string(),
                score: count as f64 / total as f64,
            })
            .collect();

        debug!(labels = scores.len(), "lexicon scoring complete");
        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_single_emotion_full_confidence() {
        let scores = LexiconModel::new().score("I am so happy and relieved").unwrap();
        assert_eq!(scores[0].label, "joy");
        assert_eq!(scores[0].score, 1.0);
    }

    #[test]
    fn test_mixed_emotions_share_scores() {
        let scores = LexiconModel::new()
            .score("happy about the results but worried about the cost")
            .unwrap();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].score, 0.5);
        assert_eq!(scores[1].score, 0.5);
    }

    #[test]
    fn test_dominant_emotion_first() {
        let scores = LexiconModel::new()
            .score("scared and anxious, though a little glad")
            .unwrap();
        assert_eq!(scores[0].label, "fear");
        assert!(scores[0].score > scores[1].score);
    }

    #[test]
    fn test_no_hits_empty() {
        let scores = LexiconModel::new().score("the pharmacy opens at nine").unwrap();
        assert!(scores.is_empty());
    }

    #[test]
    fn test_whole_token_matching() {
        // "madam" must not trigger "mad".
        let scores = LexiconModel::new().score("thank you madam").unwrap();
        assert!(scores.is_empty());
    }

    proptest! {
        #[test]
        fn prop_scores_are_normalized(text in ".{0,200}") {
            let scores = LexiconModel::new().score(&text).unwrap();
            if !scores.is_empty() {
                let total: f64 = scores.iter().map(|s| s.score).sum();
                prop_assert!((total - 1.0).abs() < 1e-9);
            }
            for entry in &scores {
                prop_assert!(EmotionLabel::parse(&entry.label).is_some());
                prop_assert!(entry.score > 0.0 && entry.score <= 1.0);
            }
        }
    }
}
