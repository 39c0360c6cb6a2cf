//! Keyword-based issue mining over feedback comments.

use serde::{Deserialize, Serialize};

/// Issue categories mined from comments, in reporting precedence order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    CulturalRelevance,
    MedicalAccuracy,
    Clarity,
    Completeness,
    Relevance,
    TechnicalIssue,
    Language,
}

impl IssueCategory {
    pub const ALL: [IssueCategory; 7] = [
        IssueCategory::CulturalRelevance,
        IssueCategory::MedicalAccuracy,
        IssueCategory::Clarity,
        IssueCategory::Completeness,
        IssueCategory::Relevance,
        IssueCategory::TechnicalIssue,
        IssueCategory::Language,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCategory::CulturalRelevance => "cultural_relevance",
            IssueCategory::MedicalAccuracy => "medical_accuracy",
            IssueCategory::Clarity => "clarity",
            IssueCategory::Completeness => "completeness",
            IssueCategory::Relevance => "relevance",
            IssueCategory::TechnicalIssue => "technical_issue",
            IssueCategory::Language => "language",
        }
    }

    /// Trigger keywords, matched as lower-cased substrings.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            IssueCategory::CulturalRelevance => {
                &["cultural", "tradition", "local", "belief", "inappropriate"]
            }
            IssueCategory::MedicalAccuracy => {
                &["wrong", "incorrect", "accurate", "inaccurate", "misleading"]
            }
            IssueCategory::Clarity => &["unclear", "confusing", "vague", "complex", "difficult"],
            IssueCategory::Completeness => {
                &["incomplete", "missing", "lacking", "partial", "more information"]
            }
            IssueCategory::Relevance => &["irrelevant", "not relevant", "unrelated", "off-topic"],
            IssueCategory::TechnicalIssue => {
                &["error", "bug", "crash", "failed", "technical", "not working"]
            }
            IssueCategory::Language => {
                &["language", "translation", "pidgin", "dialect", "accent"]
            }
        }
    }
}

/// Count issue mentions across comments.
///
/// A comment increments a category at most once no matter how many of its
/// keywords appear. Blank comments are skipped. The result is sorted by count
/// descending; equal counts keep category precedence order. Zero-count
/// categories are omitted.
pub fn count_issues<I, S>(comments: I) -> Vec<(IssueCategory, usize)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counts = [0usize; IssueCategory::ALL.len()];

    for comment in comments {
        let lowered = comment.as_ref().to_lowercase();
        if lowered.trim().is_empty() {
            continue;
        }
        for (i, category) in IssueCategory::ALL.iter().enumerate() {
            if category.keywords().iter().any(|kw| lowered.contains(kw)) {
                counts[i] += 1;
            }
        }
    }

    let mut result: Vec<(IssueCategory, usize)> = IssueCategory::ALL
        .iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|(category, count)| (*category, count))
        .collect();
    result.sort_by(|a, b| b.1.cmp(&a.1));
    result
}
