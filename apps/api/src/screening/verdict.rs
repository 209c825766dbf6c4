//! The structured compatibility verdict returned by the model.
//!
//! Validation runs inside deserialization (`serde(try_from)`), so a reply that
//! is syntactically JSON but semantically unusable fails exactly like malformed
//! JSON and the LLM client treats it as a failed attempt.

use serde::{Deserialize, Serialize};

/// A validated compatibility verdict. Never partially valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawVerdict")]
pub struct AnalysisResult {
    /// 0 – 100
    pub compatibility_score: f64,
    pub strengths: String,
    pub areas_for_improvement: String,
}

/// The reply exactly as the model wrote it, before range and presence checks.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVerdict {
    compatibility_score: f64,
    strengths: String,
    areas_for_improvement: String,
}

impl TryFrom<RawVerdict> for AnalysisResult {
    type Error = String;

    fn try_from(raw: RawVerdict) -> Result<Self, Self::Error> {
        let score = raw.compatibility_score;
        if !score.is_finite() || !(0.0..=100.0).contains(&score) {
            return Err(format!("compatibilityScore {score} is outside 0-100"));
        }
        if raw.strengths.trim().is_empty() {
            return Err("strengths is empty".to_string());
        }
        if raw.areas_for_improvement.trim().is_empty() {
            return Err("areasForImprovement is empty".to_string());
        }
        Ok(AnalysisResult {
            compatibility_score: score,
            strengths: raw.strengths,
            areas_for_improvement: raw.areas_for_improvement,
        })
    }
}

/// Display band for a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Excellent,
    Good,
    NeedsImprovement,
}

impl ScoreBand {
    pub fn from_score(score: f64) -> Self {
        if score > 75.0 {
            ScoreBand::Excellent
        } else if score > 50.0 {
            ScoreBand::Good
        } else {
            ScoreBand::NeedsImprovement
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent Match!",
            ScoreBand::Good => "Good Match",
            ScoreBand::NeedsImprovement => "Needs Improvement",
        }
    }
}
