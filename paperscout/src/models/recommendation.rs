use serde::{Deserialize, Serialize};

use super::PaperMetadata;

/// Confidence bucket for a recommendation, derived from the mean relevance
/// score of the scoring search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLabel {
    High,
    Medium,
    Low,
    ExtremelyLow,
}

impl std::fmt::Display for ConfidenceLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "High"),
            Self::Medium => write!(f, "Medium"),
            Self::Low => write!(f, "Low"),
            Self::ExtremelyLow => write!(f, "Extremely Low"),
        }
    }
}

/// A bucketed confidence score.
///
/// The label is a deterministic function of the mean score, with fixed
/// half-open thresholds at 0.65, 0.6 and 0.5.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Confidence {
    pub label: ConfidenceLabel,
    pub score: f64,
}

impl Confidence {
    pub fn from_score(score: f64) -> Self {
        let label = if score > 0.65 {
            ConfidenceLabel::High
        } else if score > 0.6 {
            ConfidenceLabel::Medium
        } else if score > 0.5 {
            ConfidenceLabel::Low
        } else {
            ConfidenceLabel::ExtremelyLow
        };

        Self { label, score }
    }

    /// Renders as `"{label}: {score}"` with the score rounded to three
    /// decimal places and trailing zeros trimmed, e.g. `"High: 0.68"`.
    pub fn render(&self) -> String {
        format!("{}: {}", self.label, round3(self.score))
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// The per-query result handed to the UI: catalog metadata for the winning
/// paper plus its confidence and generated summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub author: String,
    pub url: String,
    pub pmid: String,
    pub confidence: Confidence,
    pub summary: String,
}

impl Recommendation {
    pub fn new(paper: &PaperMetadata, confidence: Confidence, summary: String) -> Self {
        Self {
            title: paper.title.clone(),
            author: paper.author.clone(),
            url: paper.url.clone(),
            pmid: paper.pmid.clone(),
            confidence,
            summary,
        }
    }
}
