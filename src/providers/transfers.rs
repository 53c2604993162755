//! Asset transfer history client.
//!
//! Wraps the provider-specific `alchemy_getAssetTransfers` method: one page of
//! the most recent external-value transfers touching an address, newest first,
//! with block timestamps included. Both directions (sender, recipient) are
//! separate calls parameterized by `fromAddress`/`toAddress`.

use serde::Deserialize;

use crate::models::errors::AppResult;
use crate::providers::rpc::RpcProvider;
use crate::utils::constants::TRANSFER_PAGE_SIZE;

/// Which side of the transfer the queried address is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferDirection {
    Outbound,
    Inbound,
}

impl TransferDirection {
    fn address_param(&self) -> &'static str {
        match self {
            Self::Outbound => "fromAddress",
            Self::Inbound => "toAddress",
        }
    }
}

/// Transfer entry as the provider returns it. Value and timestamp stay
/// optional here; normalization decides their sentinel forms.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransfer {
    pub hash: String,
    pub from: String,
    pub to: Option<String>,
    pub value: Option<f64>,
    #[serde(default)]
    pub metadata: Option<TransferMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferMetadata {
    /// ISO-8601 block timestamp, when the provider supplies one
    pub block_timestamp: Option<String>,
}

/// Response from `alchemy_getAssetTransfers`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetTransfersResponse {
    #[serde(default)]
    pub transfers: Vec<RawTransfer>,
    #[allow(dead_code)]
    pub page_key: Option<String>,
}

/// Transfer history API over an existing RPC provider.
pub struct TransferApi {
    provider: RpcProvider,
}

impl TransferApi {
    pub fn new(provider: RpcProvider) -> Self {
        Self { provider }
    }

    /// Up to [`TRANSFER_PAGE_SIZE`] most recent external transfers where
    /// `address` is on the given side, descending by recency.
    ///
    /// History is best-effort for the evaluation, so this uses the
    /// single-attempt call path: a transient failure is surfaced to the
    /// caller for degradation instead of being retried here.
    pub async fn recent_transfers(
        &self,
        address: &str,
        direction: TransferDirection,
    ) -> AppResult<Vec<RawTransfer>> {
        let mut filter = serde_json::json!({
            "fromBlock": "0x0",
            "toBlock": "latest",
            "category": ["external"],
            "withMetadata": true,
            "excludeZeroValue": false,
            "maxCount": format!("{:#x}", TRANSFER_PAGE_SIZE),
            "order": "desc",
        });
        filter[direction.address_param()] = serde_json::Value::String(address.to_string());

        let response: AssetTransfersResponse = self
            .provider
            .call_once("alchemy_getAssetTransfers", serde_json::json!([filter]))
            .await?;
        Ok(response.transfers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_deserialization() {
        let json = r#"{
            "transfers": [
                {
                    "blockNum": "0x14c2f31",
                    "hash": "0xabc123",
                    "from": "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2",
                    "to": "0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D",
                    "value": 0.05,
                    "asset": "ETH",
                    "category": "external",
                    "metadata": { "blockTimestamp": "2024-11-02T10:15:00.000Z" }
                },
                {
                    "blockNum": "0x14c2f32",
                    "hash": "0xdef456",
                    "from": "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2",
                    "to": null,
                    "value": null,
                    "category": "external"
                }
            ],
            "pageKey": null
        }"#;

        let response: AssetTransfersResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.transfers.len(), 2);
        assert_eq!(response.transfers[0].value, Some(0.05));
        assert_eq!(
            response.transfers[0]
                .metadata
                .as_ref()
                .unwrap()
                .block_timestamp
                .as_deref(),
            Some("2024-11-02T10:15:00.000Z")
        );
        assert!(response.transfers[1].to.is_none());
        assert!(response.transfers[1].value.is_none());
        assert!(response.transfers[1].metadata.is_none());
    }

    #[test]
    fn test_direction_params() {
        assert_eq!(TransferDirection::Outbound.address_param(), "fromAddress");
        assert_eq!(TransferDirection::Inbound.address_param(), "toAddress");
    }

    #[test]
    fn test_page_size_encoding() {
        assert_eq!(format!("{:#x}", TRANSFER_PAGE_SIZE), "0x64");
    }
}
