//! Score aggregation.
//!
//! Pure reduction from fired findings to the final assessment. Detectors
//! stay side-effect-free; everything score-related happens here, once.

use crate::core::heuristics::labels;
use crate::models::types::{Decision, Finding, RiskAssessment};

/// Starting score. Zero risk is never assumed: every address carries some
/// residual uncertainty.
pub const BASE_SCORE: i32 = 10;

/// Scores at or above this block the send.
pub const DECISION_THRESHOLD: i32 = 60;

/// A blocklisted address is raised to at least this score, so unrelated
/// low-severity findings can never dilute it below the block threshold.
pub const BLOCKLIST_FLOOR: i32 = 95;

pub fn aggregate(findings: Vec<Finding>) -> RiskAssessment {
    let mut raw = BASE_SCORE + findings.iter().map(|f| f.weight).sum::<i32>();

    if findings.iter().any(|f| f.label == labels::BLOCKLIST) {
        raw = raw.max(BLOCKLIST_FLOOR);
    }

    let score = raw.clamp(0, 100) as u8;
    let decision = if i32::from(score) >= DECISION_THRESHOLD {
        Decision::Block
    } else {
        Decision::Allow
    };

    RiskAssessment {
        score,
        decision,
        findings,
    }
}
