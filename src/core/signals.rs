//! Signal fetching.
//!
//! Four independent on-chain lookups for one address, issued concurrently:
//! bytecode, transaction count, outbound transfer history, inbound transfer
//! history. Bytecode and nonce are required — they anchor the account-type
//! and account-age heuristics, so their failure aborts the evaluation.
//! History is best-effort: a failed side degrades to an empty list with a
//! warning, and the check completes on the remaining signal.

use tracing::warn;

use crate::core::normalize::normalize;
use crate::models::errors::AppResult;
use crate::models::types::Transfer;
use crate::providers::rpc::RpcProvider;
use crate::providers::transfers::{RawTransfer, TransferApi, TransferDirection};

/// Everything the detectors consume for one address.
#[derive(Debug, Clone, Default)]
pub struct Signals {
    /// Lowercased bytecode, `"0x"` for externally-owned accounts. `None`
    /// models an absent account-type signal for partial-signal callers; the
    /// HTTP path always populates it or aborts.
    pub bytecode: Option<String>,
    pub nonce: u64,
    pub outbound: Vec<Transfer>,
    pub inbound: Vec<Transfer>,
}

impl Signals {
    pub fn is_contract(&self) -> bool {
        self.bytecode
            .as_deref()
            .map(|code| !code.is_empty() && code != "0x")
            .unwrap_or(false)
    }

    pub fn total_transfers(&self) -> usize {
        self.outbound.len() + self.inbound.len()
    }
}

pub async fn fetch_signals(provider: &RpcProvider, address: &str) -> AppResult<Signals> {
    let transfers = TransferApi::new(provider.clone());

    let (bytecode, nonce, outbound, inbound) = tokio::join!(
        provider.get_code(address),
        provider.get_transaction_count(address),
        transfers.recent_transfers(address, TransferDirection::Outbound),
        transfers.recent_transfers(address, TransferDirection::Inbound),
    );

    // Required lookups: first failure aborts the whole evaluation.
    let bytecode = bytecode?;
    let nonce = nonce?;

    Ok(Signals {
        bytecode: Some(bytecode.to_ascii_lowercase()),
        nonce,
        outbound: degrade(outbound, address, "outbound"),
        inbound: degrade(inbound, address, "inbound"),
    })
}

/// Best-effort history: substitute an empty list on failure, loudly.
fn degrade(
    result: AppResult<Vec<RawTransfer>>,
    address: &str,
    side: &str,
) -> Vec<Transfer> {
    match result {
        Ok(raw) => raw.iter().map(normalize).collect(),
        Err(e) => {
            warn!(
                "{} transfer lookup failed for {}, continuing with reduced signal: {}",
                side, address, e
            );
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_contract() {
        let eoa = Signals {
            bytecode: Some("0x".to_string()),
            ..Default::default()
        };
        assert!(!eoa.is_contract());

        let contract = Signals {
            bytecode: Some("0x6080604052".to_string()),
            ..Default::default()
        };
        assert!(contract.is_contract());

        let unknown = Signals::default();
        assert!(!unknown.is_contract());
    }

    #[test]
    fn test_degrade_substitutes_empty() {
        let failed = degrade(
            Err(crate::models::errors::AppError::rpc_timeout()),
            "0xabc",
            "outbound",
        );
        assert!(failed.is_empty());
    }
}
