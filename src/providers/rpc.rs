//! JSON-RPC gateway.
//!
//! Thin typed wrapper over a remote JSON-RPC-over-HTTPS endpoint: turns
//! method + params into a decoded result or a typed failure. Transport
//! failures (HTTP status, connection, timeout) and protocol failures
//! (well-formed error envelopes) are kept apart so callers can decide which
//! to tolerate.
//!
//! Required lookups go through [`RpcProvider::call`], which applies a bounded
//! exponential backoff with jitter on transient failures. Best-effort lookups
//! use [`RpcProvider::call_once`] and leave degradation policy to the caller.

use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING, USER_AGENT};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::{DEFAULT_RPC_TIMEOUT_SECS, USER_AGENT as USER_AGENT_CONST};

/// Retry attempts for required lookups. This sits in a pre-send UI path, so
/// the whole budget must stay well under the request deadline.
pub const MAX_RETRIES: u32 = 3;

/// Base retry delay in milliseconds
pub const BASE_RETRY_MS: u64 = 250;

/// Maximum retry delay in milliseconds
pub const MAX_RETRY_MS: u64 = 2_000;

/// Jitter applied to each retry delay (± percent)
pub const RETRY_JITTER_PERCENT: u64 = 20;

/// RPC provider with a per-call timeout and bounded retry.
#[derive(Clone)]
pub struct RpcProvider {
    url: String,
    client: reqwest::Client,
}

impl RpcProvider {
    pub fn new(url: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            url: url.into(),
            client: Self::build_client()?,
        })
    }

    fn build_client() -> AppResult<reqwest::Client> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_CONST));
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

        reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(DEFAULT_RPC_TIMEOUT_SECS))
            .gzip(true)
            .build()
            .map_err(|e| AppError::internal(format!("failed to build HTTP client: {}", e)))
    }

    /// Execute a JSON-RPC call with bounded retry on transient failures.
    /// Protocol-level errors are deterministic and returned immediately.
    pub async fn call<T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> AppResult<T> {
        let payload = Self::payload(method, params);
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = retry_delay_ms(attempt);
                debug!(
                    "retry {}/{} for {} after {}ms",
                    attempt + 1,
                    MAX_RETRIES,
                    method,
                    delay
                );
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            match self.execute_call::<T>(&payload).await {
                Ok(result) => return Ok(result),
                Err(e) if e.code.is_retryable() => {
                    warn!("{} failed (attempt {}/{}): {}", method, attempt + 1, MAX_RETRIES, e);
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error
            .unwrap_or_else(|| AppError::rpc_transport(format!("{} failed with no attempts", method))))
    }

    /// Single-attempt variant for best-effort lookups, where the caller
    /// substitutes a degraded result instead of waiting out retries.
    pub async fn call_once<T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> AppResult<T> {
        self.execute_call(&Self::payload(method, params)).await
    }

    fn payload(method: &str, params: serde_json::Value) -> serde_json::Value {
        // Fixed request id: assessments must be reproducible for identical
        // upstream responses, so nothing request-scoped may be random.
        serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        })
    }

    async fn execute_call<T: for<'de> Deserialize<'de>>(
        &self,
        payload: &serde_json::Value,
    ) -> AppResult<T> {
        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::rpc_timeout()
                } else {
                    AppError::rpc_transport(format!("request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::rpc_transport(format!("HTTP {}", status)));
        }

        let envelope: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| AppError::rpc_invalid_response(format!("failed to parse response: {}", e)))?;

        if let Some(error) = envelope.error {
            return Err(AppError::rpc_protocol(error.code, error.message));
        }

        envelope
            .result
            .ok_or_else(|| AppError::rpc_invalid_response("no result in response"))
    }

    /// Bytecode at `address`; `"0x"` for externally-owned accounts.
    pub async fn get_code(&self, address: &str) -> AppResult<String> {
        self.call("eth_getCode", serde_json::json!([address, "latest"]))
            .await
    }

    /// Transaction count (nonce) for `address`.
    pub async fn get_transaction_count(&self, address: &str) -> AppResult<u64> {
        let raw: String = self
            .call(
                "eth_getTransactionCount",
                serde_json::json!([address, "latest"]),
            )
            .await?;
        parse_quantity(&raw)
            .ok_or_else(|| AppError::rpc_invalid_response(format!("bad quantity: {:?}", raw)))
    }

    /// Endpoint URL with any credential path segment hidden, for logging.
    pub fn masked_url(&self) -> String {
        match self.url.split_once("/v2/") {
            Some((base, _)) => format!("{}/v2/***", base),
            None => self.url.clone(),
        }
    }
}

/// Exponential backoff with ±20% jitter, capped.
fn retry_delay_ms(attempt: u32) -> u64 {
    let base = BASE_RETRY_MS.saturating_mul(2_u64.pow(attempt - 1));
    let capped = base.min(MAX_RETRY_MS);
    let jitter_range = (capped * RETRY_JITTER_PERCENT) / 100;
    let jitter: i64 =
        rand::thread_rng().gen_range(-(jitter_range as i64)..=(jitter_range as i64));
    (capped as i64 + jitter).max(50) as u64
}

/// Hex quantity (`"0x1a"`) → u64.
pub(crate) fn parse_quantity(raw: &str) -> Option<u64> {
    let body = raw.strip_prefix("0x")?;
    if body.is_empty() {
        return None;
    }
    u64::from_str_radix(body, 16).ok()
}

/// JSON-RPC response envelope
#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    #[allow(dead_code)]
    jsonrpc: Option<String>,
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

/// JSON-RPC error envelope body
#[derive(Debug, Clone, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}
