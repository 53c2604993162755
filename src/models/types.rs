//! Core domain types shared across the evaluation pipeline.

use serde::{Deserialize, Serialize};

/// Canonical address form: lowercase hex with `0x` prefix. Every membership
/// test in the engine happens after both sides pass through here.
pub fn normalize_address(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

/// `^0x[0-9a-fA-F]{40}$`
pub fn is_valid_address(raw: &str) -> bool {
    raw.len() == 42 && raw.starts_with("0x") && hex::decode(&raw[2..]).is_ok()
}

/// One normalized transfer record.
///
/// `value_native == None` means the amount could not be parsed: the record is
/// excluded from value heuristics but still counts for count heuristics.
/// `timestamp_ms == 0` means unknown recency, never actual epoch zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transfer {
    pub hash: String,
    pub from: String,
    pub to: String,
    pub value_native: Option<f64>,
    pub timestamp_ms: i64,
}

/// Severity of a fired finding, for display ranking only. The score impact
/// comes from the weight, not the severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Allow,
    Block,
}

/// One fired detector. The weight is the score delta it contributes; it is
/// fixed per detector and not user-configurable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    pub label: String,
    pub detail: String,
    pub weight: i32,
}

impl Finding {
    pub fn new(severity: Severity, label: &str, detail: impl Into<String>, weight: i32) -> Self {
        Self {
            severity,
            label: label.to_string(),
            detail: detail.into(),
            weight,
        }
    }
}

/// Result of one evaluation. Built fresh per request and never persisted:
/// on-chain state can change between checks, so prior assessments are not
/// reusable.
#[derive(Debug, Clone, Serialize)]
pub struct RiskAssessment {
    pub score: u8,
    pub decision: Decision,
    pub findings: Vec<Finding>,
}
