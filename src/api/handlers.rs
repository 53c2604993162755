//! API request handlers.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;
use tracing::{error, info};

use super::types::{CheckParams, CheckResponse, ErrorBody, HealthResponse};
use crate::core::engine::RiskEngine;
use crate::models::config::ShieldConfig;
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::{is_valid_address, normalize_address};
use crate::providers::rpc::RpcProvider;
use crate::utils::constants::{is_supported_chain, DEFAULT_CHAIN};

/// Shared application state. No cross-request mutable state: every check is
/// fully independent.
pub struct AppState {
    engine: Option<RiskEngine>,
}

impl AppState {
    pub fn new(config: &ShieldConfig) -> AppResult<Self> {
        let engine = match &config.rpc_url {
            Some(url) => {
                let provider = RpcProvider::new(url.clone())?;
                info!("RPC provider ready ({})", provider.masked_url());
                Some(RiskEngine::new(provider, config.policy.clone()))
            }
            None => None,
        };
        Ok(Self { engine })
    }
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn reject(err: AppError) -> ApiError {
    (
        StatusCode::from_u16(err.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(ErrorBody::from(&err)),
    )
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

pub async fn check(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CheckParams>,
) -> Result<Json<CheckResponse>, ApiError> {
    // All validation happens before any upstream call is issued.
    let raw_address = params.address.as_deref().unwrap_or("");
    let address = normalize_address(raw_address);
    if !is_valid_address(&address) {
        return Err(reject(AppError::invalid_address(raw_address)));
    }

    let chain = params.chain.as_deref().unwrap_or(DEFAULT_CHAIN);
    if !is_supported_chain(chain) {
        return Err(reject(AppError::unsupported_chain(chain)));
    }

    let engine = state
        .engine
        .as_ref()
        .ok_or_else(|| reject(AppError::missing_rpc_url()))?;

    match engine.assess(&address, params.ens.as_deref()).await {
        Ok(assessment) => {
            info!(
                "assessed {} on {}: score {} ({} findings)",
                address,
                chain,
                assessment.score,
                assessment.findings.len()
            );
            Ok(Json(CheckResponse::from(assessment)))
        }
        Err(e) => {
            error!("assessment failed for {}: {}", address, e);
            Err(reject(e))
        }
    }
}

pub async fn not_found() -> ApiError {
    reject(AppError::new(ErrorCode::NotFound, "unrecognized path"))
}
