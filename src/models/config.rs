//! Environment-based configuration, read once at startup.
//!
//! List and map entries are normalized to lowercase on load so every
//! membership test in the engine compares canonical forms. Malformed entries
//! are dropped with a warning rather than failing startup; the only fatal
//! request-time condition is a missing RPC endpoint URL.

use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::models::types::{is_valid_address, normalize_address};
use crate::utils::constants::{DEFAULT_DUST_THRESHOLD, DEFAULT_HOST, DEFAULT_PORT};

/// Inputs the heuristic detectors consume.
#[derive(Debug, Clone)]
pub struct RiskPolicy {
    /// Hard-blocked addresses; a hit floors the score near maximum
    pub blocklist: HashSet<String>,
    /// Addresses of observational interest; a counterparty hit is a soft signal
    pub watchlist: HashSet<String>,
    /// Lowercase address or ENS name mapped to a negative-reputation label
    pub negative_links: HashMap<String, String>,
    /// Values strictly below this (and above zero) count as dust, native units
    pub dust_threshold: f64,
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self {
            blocklist: HashSet::new(),
            watchlist: HashSet::new(),
            negative_links: HashMap::new(),
            dust_threshold: DEFAULT_DUST_THRESHOLD,
        }
    }
}

/// Full service configuration.
#[derive(Debug, Clone)]
pub struct ShieldConfig {
    /// JSON-RPC endpoint. Absence is surfaced per /check request as a 500,
    /// not a startup crash, so the health probe stays green.
    pub rpc_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub policy: RiskPolicy,
}

impl ShieldConfig {
    pub fn from_env() -> Self {
        let rpc_url = std::env::var("SHIELD_RPC_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());
        if rpc_url.is_none() {
            warn!("SHIELD_RPC_URL is not set; /check will answer 500 until configured");
        }

        let host = std::env::var("SHIELD_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = std::env::var("PORT")
            .or_else(|_| std::env::var("SHIELD_PORT"))
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let policy = RiskPolicy {
            blocklist: parse_address_list(&env_or_empty("SHIELD_BLOCKLIST")),
            watchlist: parse_address_list(&env_or_empty("SHIELD_WATCHLIST")),
            negative_links: parse_negative_links(&env_or_empty("SHIELD_NEGATIVE_LINKS")),
            dust_threshold: parse_dust_threshold(
                std::env::var("SHIELD_DUST_THRESHOLD").ok().as_deref(),
            ),
        };

        Self {
            rpc_url,
            host,
            port,
            policy,
        }
    }
}

fn env_or_empty(name: &str) -> String {
    std::env::var(name).unwrap_or_default()
}

/// Comma-separated addresses → lowercase set. Entries that fail address
/// validation are dropped so one typo cannot poison membership tests.
pub(crate) fn parse_address_list(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| {
            let addr = normalize_address(s);
            if is_valid_address(&addr) {
                Some(addr)
            } else {
                warn!("dropping malformed address list entry: {:?}", s);
                None
            }
        })
        .collect()
}

/// JSON map of address/ENS name → negative-reputation label, keys lowercased.
pub(crate) fn parse_negative_links(raw: &str) -> HashMap<String, String> {
    if raw.trim().is_empty() {
        return HashMap::new();
    }
    match serde_json::from_str::<HashMap<String, String>>(raw) {
        Ok(map) => map
            .into_iter()
            .map(|(k, v)| (k.trim().to_ascii_lowercase(), v))
            .collect(),
        Err(e) => {
            warn!("SHIELD_NEGATIVE_LINKS is not a valid JSON map: {}", e);
            HashMap::new()
        }
    }
}

pub(crate) fn parse_dust_threshold(raw: Option<&str>) -> f64 {
    match raw {
        None => DEFAULT_DUST_THRESHOLD,
        Some(s) => match s.trim().parse::<f64>() {
            Ok(v) if v.is_finite() && v > 0.0 => v,
            _ => {
                warn!(
                    "invalid SHIELD_DUST_THRESHOLD {:?}, using default {}",
                    s, DEFAULT_DUST_THRESHOLD
                );
                DEFAULT_DUST_THRESHOLD
            }
        },
    }
}
