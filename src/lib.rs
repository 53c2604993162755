//! SendShield library
//!
//! Screens a blockchain address at transaction time: fetches on-chain signals
//! (bytecode, nonce, recent transfer history), runs a fixed table of
//! independent heuristic detectors over them, and reduces the findings to a
//! 0-100 risk score with an allow/block decision — used to warn a wallet user
//! before funds are sent to a potentially malicious address.

pub mod api;
pub mod core;
pub mod models;
pub mod providers;
pub mod utils;

pub use crate::core::aggregate::{aggregate, BASE_SCORE, BLOCKLIST_FLOOR, DECISION_THRESHOLD};
pub use crate::core::engine::{evaluate, RiskEngine};
pub use crate::core::signals::{fetch_signals, Signals};
pub use crate::models::config::{RiskPolicy, ShieldConfig};
pub use crate::models::errors::{AppError, AppResult, ErrorCode};
pub use crate::models::types::{Decision, Finding, RiskAssessment, Severity, Transfer};
pub use crate::providers::rpc::RpcProvider;
pub use crate::providers::transfers::{TransferApi, TransferDirection};
