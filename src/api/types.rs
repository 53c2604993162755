//! API request/response types.
//!
//! Canonical response shape: `{ score, decision, findings: [{ severity,
//! label, detail }] }`. Weights stay internal — clients get the score, not
//! the arithmetic. Error bodies are `{ error: <machine_code>, message }`.

use serde::{Deserialize, Serialize};

use crate::models::errors::{AppError, ErrorCode};
use crate::models::types::{Decision, Finding, RiskAssessment, Severity};

#[derive(Debug, Deserialize)]
pub struct CheckParams {
    pub address: Option<String>,
    pub chain: Option<String>,
    pub ens: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub score: u8,
    pub decision: Decision,
    pub findings: Vec<FindingView>,
}

#[derive(Debug, Serialize)]
pub struct FindingView {
    pub severity: Severity,
    pub label: String,
    pub detail: String,
}

impl From<RiskAssessment> for CheckResponse {
    fn from(assessment: RiskAssessment) -> Self {
        Self {
            score: assessment.score,
            decision: assessment.decision,
            findings: assessment
                .findings
                .into_iter()
                .map(FindingView::from)
                .collect(),
        }
    }
}

impl From<Finding> for FindingView {
    fn from(finding: Finding) -> Self {
        Self {
            severity: finding.severity,
            label: finding.label,
            detail: finding.detail,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl From<&AppError> for ErrorBody {
    fn from(err: &AppError) -> Self {
        // Upstream failure details stay in the logs; clients get the code.
        let message = match err.code {
            ErrorCode::RpcTransport
            | ErrorCode::RpcProtocol
            | ErrorCode::RpcTimeout
            | ErrorCode::RpcInvalidResponse => "upstream lookup failed".to_string(),
            _ => err.message.clone(),
        };
        Self {
            error: err.code.as_str(),
            message,
        }
    }
}
