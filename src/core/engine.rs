//! Risk engine.
//!
//! Ties the pipeline together: fetch signals, run the detector table, reduce
//! to an assessment. The async entrypoint owns the only wall-clock read and
//! the only I/O; [`evaluate`] underneath it is pure and deterministic for a
//! given `now_ms`, so the whole scoring path is testable without a network.

use chrono::Utc;

use crate::core::aggregate::aggregate;
use crate::core::heuristics::run_detectors;
use crate::core::signals::{fetch_signals, Signals};
use crate::models::config::RiskPolicy;
use crate::models::errors::AppResult;
use crate::models::types::{normalize_address, RiskAssessment};
use crate::providers::rpc::RpcProvider;

pub struct RiskEngine {
    provider: RpcProvider,
    policy: RiskPolicy,
}

impl RiskEngine {
    pub fn new(provider: RpcProvider, policy: RiskPolicy) -> Self {
        Self { provider, policy }
    }

    /// Full assessment for one address. Nothing is cached between calls:
    /// on-chain state can change between checks, so every call re-fetches.
    pub async fn assess(&self, address: &str, ens: Option<&str>) -> AppResult<RiskAssessment> {
        let address = normalize_address(address);
        let signals = fetch_signals(&self.provider, &address).await?;
        Ok(evaluate(
            &address,
            ens,
            &signals,
            &self.policy,
            Utc::now().timestamp_millis(),
        ))
    }
}

/// Pure evaluation over already-fetched signals.
pub fn evaluate(
    address: &str,
    ens: Option<&str>,
    signals: &Signals,
    policy: &RiskPolicy,
    now_ms: i64,
) -> RiskAssessment {
    aggregate(run_detectors(address, ens, signals, policy, now_ms))
}
