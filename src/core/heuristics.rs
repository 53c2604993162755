//! Heuristic detectors.
//!
//! A fixed, ordered table of pure functions. Each consumes the fetched
//! signals plus the configured policy and emits zero or one [`Finding`].
//! Detectors are independent — none reads another's output — so only the
//! table order (the display order of findings) is part of the observable
//! contract. All weights and thresholds live in the tables below; tuning
//! never touches control flow.

use std::collections::{HashMap, HashSet};

use crate::core::signals::Signals;
use crate::models::config::RiskPolicy;
use crate::models::types::{Finding, Severity};

/// Score delta per detector, in display order.
pub mod weights {
    pub const BLOCKLIST: i32 = 90;
    pub const NEGATIVE_ENS: i32 = 25;
    pub const CONTRACT_RECIPIENT: i32 = 10;
    pub const MINIMAL_PROXY: i32 = 6;
    pub const TINY_BYTECODE: i32 = 6;
    pub const NO_HISTORY: i32 = 22;
    pub const NEW_ADDRESS: i32 = 28;
    pub const NEWISH_ADDRESS: i32 = 18;
    pub const RECENT_ADDRESS: i32 = 8;
    pub const LOW_ACTIVITY: i32 = 10;
    pub const INBOUND_ONLY: i32 = 6;
    pub const FAN_OUT: i32 = 18;
    pub const INBOUND_BURST: i32 = 10;
    pub const DUST_MEDIAN: i32 = 12;
    pub const DORMANT: i32 = -5;
    pub const HIGH_FREQUENCY_OUTBOUND: i32 = 25;
    pub const FREQUENT_OUTBOUND: i32 = 12;
    pub const DUST_COUNT: i32 = 12;
    pub const POSSIBLE_DUSTING: i32 = 6;
    pub const REPEATED_AMOUNTS: i32 = 12;
    pub const FAST_FORWARD: i32 = 25;
    pub const WATCHLIST: i32 = 6;
    /// Informational only: absent type signal is not escalated
    pub const UNKNOWN_TYPE: i32 = 0;
}

/// Display labels, one per detector.
pub mod labels {
    pub const BLOCKLIST: &str = "Blocklisted address";
    pub const NEGATIVE_ENS: &str = "Negative ENS reputation";
    pub const CONTRACT_RECIPIENT: &str = "Contract recipient";
    pub const MINIMAL_PROXY: &str = "Minimal proxy contract";
    pub const TINY_BYTECODE: &str = "Tiny contract bytecode";
    pub const NO_HISTORY: &str = "No transfer history";
    pub const NEW_ADDRESS: &str = "New address";
    pub const NEWISH_ADDRESS: &str = "Newish address";
    pub const RECENT_ADDRESS: &str = "Recent address";
    pub const LOW_ACTIVITY: &str = "Low activity";
    pub const INBOUND_ONLY: &str = "Inbound-only history";
    pub const FAN_OUT: &str = "Outbound fan-out";
    pub const INBOUND_BURST: &str = "Inbound burst without outbound";
    pub const DUST_MEDIAN: &str = "Dust-sized median inbound";
    pub const DORMANT: &str = "Dormant address";
    pub const HIGH_FREQUENCY_OUTBOUND: &str = "High-frequency outbound";
    pub const FREQUENT_OUTBOUND: &str = "Frequent outbound";
    pub const DUST_COUNT: &str = "Dust transfer pattern";
    pub const POSSIBLE_DUSTING: &str = "Possible dusting";
    pub const REPEATED_AMOUNTS: &str = "Repeated outbound amounts";
    pub const FAST_FORWARD: &str = "Fresh funds forwarded quickly";
    pub const WATCHLIST: &str = "Watchlist counterparty";
    pub const UNKNOWN_TYPE: &str = "Unverified account type";
}

// Thresholds

/// EIP-1167 delegate-call prefix (hex, no 0x)
const EIP1167_PREFIX: &str = "363d3d373d3d3d363d73";
/// Contracts with less runtime code than this many hex chars are suspicious
const TINY_BYTECODE_MAX_HEX: usize = 100;
const DAY_MS: i64 = 86_400_000;
const NEW_MAX_MS: i64 = DAY_MS;
const NEWISH_MAX_MS: i64 = 7 * DAY_MS;
const RECENT_MAX_MS: i64 = 30 * DAY_MS;
const DORMANT_AFTER_MS: i64 = 180 * DAY_MS;
const LOW_ACTIVITY_MAX: usize = 5;
const FAN_OUT_MIN_RECIPIENTS: usize = 10;
const BURST_MIN_INBOUND: usize = 5;
const MEDIAN_MIN_SAMPLES: usize = 3;
const HIGH_FREQUENCY_MIN_24H: usize = 10;
const FREQUENT_MIN_24H: usize = 5;
const DUST_COUNT_MIN: usize = 6;
const POSSIBLE_DUST_MIN: usize = 3;
const REPEATED_AMOUNT_MIN: usize = 8;
/// Outbound this soon after the latest inbound reads as pass-through
const FAST_FORWARD_WINDOW_MS: i64 = 3_600_000;
/// Values are rounded at 1e-6 before grouping identical amounts
const AMOUNT_GROUP_SCALE: f64 = 1e6;

type Detector = fn(&DetectorInput) -> Option<Finding>;

/// Evaluation order; also the display order of findings.
const DETECTORS: &[Detector] = &[
    blocklist_hit,
    negative_ens_link,
    contract_recipient,
    minimal_proxy,
    tiny_bytecode,
    no_history,
    account_age_tier,
    low_activity,
    inbound_only,
    fan_out,
    inbound_burst,
    dust_median,
    dormant,
    high_frequency_outbound,
    frequent_outbound,
    dust_count,
    possible_dusting,
    repeated_amounts,
    fast_forward,
    watchlist_touch,
    unverified_type,
];

/// Run the full table over one address's signals.
pub fn run_detectors(
    address: &str,
    ens: Option<&str>,
    signals: &Signals,
    policy: &RiskPolicy,
    now_ms: i64,
) -> Vec<Finding> {
    let input = DetectorInput::new(address, ens, signals, policy, now_ms);
    DETECTORS
        .iter()
        .filter_map(|detector| detector(&input))
        .collect()
}

struct DetectorInput<'a> {
    address: &'a str,
    ens: Option<&'a str>,
    signals: &'a Signals,
    policy: &'a RiskPolicy,
    now_ms: i64,
    view: HistoryView,
}

impl<'a> DetectorInput<'a> {
    fn new(
        address: &'a str,
        ens: Option<&'a str>,
        signals: &'a Signals,
        policy: &'a RiskPolicy,
        now_ms: i64,
    ) -> Self {
        Self {
            address,
            ens,
            signals,
            policy,
            now_ms,
            view: HistoryView::build(signals, policy, now_ms),
        }
    }
}

/// Aggregates over the transfer history, computed once per evaluation.
/// Transfers with an unknown timestamp are excluded from every recency
/// figure; transfers with an unknown value are excluded from every value
/// figure. Both still count toward totals.
struct HistoryView {
    total: usize,
    out_count: usize,
    in_count: usize,
    earliest_ms: Option<i64>,
    latest_ms: Option<i64>,
    distinct_recipients: usize,
    distinct_senders: usize,
    inbound_values: Vec<f64>,
    tiny_inbound: usize,
    out_last_24h: usize,
    largest_amount_group: usize,
    /// Smallest gap between the latest inbound and any later outbound
    fast_forward_gap_ms: Option<i64>,
    watchlist_counterparty: Option<String>,
}

impl HistoryView {
    fn build(signals: &Signals, policy: &RiskPolicy, now_ms: i64) -> Self {
        let mut earliest: Option<i64> = None;
        let mut latest: Option<i64> = None;
        let mut latest_in: Option<i64> = None;
        let mut recipients: HashSet<&str> = HashSet::new();
        let mut senders: HashSet<&str> = HashSet::new();
        let mut amount_groups: HashMap<i64, usize> = HashMap::new();
        let mut inbound_values = Vec::new();
        let mut tiny_inbound = 0usize;
        let mut out_last_24h = 0usize;
        let mut watchlist_counterparty: Option<String> = None;

        fn stamp(ts: i64, earliest: &mut Option<i64>, latest: &mut Option<i64>) {
            *earliest = Some(earliest.map_or(ts, |e| e.min(ts)));
            *latest = Some(latest.map_or(ts, |l| l.max(ts)));
        }

        for t in &signals.outbound {
            if t.timestamp_ms > 0 {
                stamp(t.timestamp_ms, &mut earliest, &mut latest);
                if now_ms - t.timestamp_ms <= DAY_MS {
                    out_last_24h += 1;
                }
            }
            if !t.to.is_empty() {
                recipients.insert(t.to.as_str());
                if watchlist_counterparty.is_none() && policy.watchlist.contains(&t.to) {
                    watchlist_counterparty = Some(t.to.clone());
                }
            }
            if let Some(v) = t.value_native {
                *amount_groups
                    .entry((v * AMOUNT_GROUP_SCALE).round() as i64)
                    .or_insert(0) += 1;
            }
        }

        for t in &signals.inbound {
            if t.timestamp_ms > 0 {
                stamp(t.timestamp_ms, &mut earliest, &mut latest);
                latest_in = Some(latest_in.map_or(t.timestamp_ms, |l| l.max(t.timestamp_ms)));
            }
            if !t.from.is_empty() {
                senders.insert(t.from.as_str());
                if watchlist_counterparty.is_none() && policy.watchlist.contains(&t.from) {
                    watchlist_counterparty = Some(t.from.clone());
                }
            }
            if let Some(v) = t.value_native {
                inbound_values.push(v);
                if v > 0.0 && v < policy.dust_threshold {
                    tiny_inbound += 1;
                }
            }
        }

        let fast_forward_gap_ms = latest_in.and_then(|lin| {
            signals
                .outbound
                .iter()
                .filter(|t| t.timestamp_ms > 0 && t.timestamp_ms >= lin)
                .map(|t| t.timestamp_ms - lin)
                .min()
        });

        Self {
            total: signals.total_transfers(),
            out_count: signals.outbound.len(),
            in_count: signals.inbound.len(),
            earliest_ms: earliest,
            latest_ms: latest,
            distinct_recipients: recipients.len(),
            distinct_senders: senders.len(),
            largest_amount_group: amount_groups.values().copied().max().unwrap_or(0),
            inbound_values,
            tiny_inbound,
            out_last_24h,
            fast_forward_gap_ms,
            watchlist_counterparty,
        }
    }
}

// Detectors, in table order

fn blocklist_hit(input: &DetectorInput) -> Option<Finding> {
    if !input.policy.blocklist.contains(input.address) {
        return None;
    }
    Some(Finding::new(
        Severity::High,
        labels::BLOCKLIST,
        "address is on the configured blocklist",
        weights::BLOCKLIST,
    ))
}

fn negative_ens_link(input: &DetectorInput) -> Option<Finding> {
    let links = &input.policy.negative_links;
    let label = links.get(input.address).or_else(|| {
        input
            .ens
            .map(|name| name.trim().to_ascii_lowercase())
            .and_then(|name| links.get(&name))
    })?;
    Some(Finding::new(
        Severity::High,
        labels::NEGATIVE_ENS,
        format!("linked to negative reputation entry: {}", label),
        weights::NEGATIVE_ENS,
    ))
}

fn contract_recipient(input: &DetectorInput) -> Option<Finding> {
    if !input.signals.is_contract() {
        return None;
    }
    Some(Finding::new(
        Severity::Medium,
        labels::CONTRACT_RECIPIENT,
        "recipient is a contract, not an externally-owned account",
        weights::CONTRACT_RECIPIENT,
    ))
}

fn minimal_proxy(input: &DetectorInput) -> Option<Finding> {
    let code = input.signals.bytecode.as_deref()?;
    if !code.contains(EIP1167_PREFIX) {
        return None;
    }
    Some(Finding::new(
        Severity::Medium,
        labels::MINIMAL_PROXY,
        "bytecode matches the EIP-1167 minimal-proxy delegate pattern",
        weights::MINIMAL_PROXY,
    ))
}

fn tiny_bytecode(input: &DetectorInput) -> Option<Finding> {
    if !input.signals.is_contract() {
        return None;
    }
    let code = input.signals.bytecode.as_deref()?;
    let hex_len = code.trim_start_matches("0x").len();
    if hex_len >= TINY_BYTECODE_MAX_HEX {
        return None;
    }
    Some(Finding::new(
        Severity::Medium,
        labels::TINY_BYTECODE,
        format!("contract bytecode is only {} hex chars", hex_len),
        weights::TINY_BYTECODE,
    ))
}

fn no_history(input: &DetectorInput) -> Option<Finding> {
    if input.view.total > 0 {
        return None;
    }
    Some(Finding::new(
        Severity::Medium,
        labels::NO_HISTORY,
        format!(
            "no transfers observed in the recent window (nonce {})",
            input.signals.nonce
        ),
        weights::NO_HISTORY,
    ))
}

/// Mutually exclusive age tiers; only the most specific matching one fires.
/// Unknown timestamps are skipped entirely, so an address whose history has
/// no usable timestamps gets no tier at all.
fn account_age_tier(input: &DetectorInput) -> Option<Finding> {
    if input.view.total == 0 {
        return None;
    }
    let earliest = input.view.earliest_ms?;
    let age_ms = input.now_ms - earliest;
    let age_days = age_ms as f64 / DAY_MS as f64;

    if age_ms < NEW_MAX_MS {
        Some(Finding::new(
            Severity::High,
            labels::NEW_ADDRESS,
            "first observed transfer is under 24 hours old",
            weights::NEW_ADDRESS,
        ))
    } else if age_ms < NEWISH_MAX_MS {
        Some(Finding::new(
            Severity::Medium,
            labels::NEWISH_ADDRESS,
            format!("first observed transfer is {:.1} days old", age_days),
            weights::NEWISH_ADDRESS,
        ))
    } else if age_ms < RECENT_MAX_MS {
        Some(Finding::new(
            Severity::Low,
            labels::RECENT_ADDRESS,
            format!("first observed transfer is {:.1} days old", age_days),
            weights::RECENT_ADDRESS,
        ))
    } else {
        None
    }
}

fn low_activity(input: &DetectorInput) -> Option<Finding> {
    let total = input.view.total;
    if total == 0 || total >= LOW_ACTIVITY_MAX {
        return None;
    }
    Some(Finding::new(
        Severity::Medium,
        labels::LOW_ACTIVITY,
        format!("only {} transfers in the recent window", total),
        weights::LOW_ACTIVITY,
    ))
}

fn inbound_only(input: &DetectorInput) -> Option<Finding> {
    if input.view.out_count != 0 || input.view.total == 0 {
        return None;
    }
    Some(Finding::new(
        Severity::Low,
        labels::INBOUND_ONLY,
        format!(
            "{} inbound transfers, none outbound",
            input.view.in_count
        ),
        weights::INBOUND_ONLY,
    ))
}

fn fan_out(input: &DetectorInput) -> Option<Finding> {
    if input.view.distinct_recipients < FAN_OUT_MIN_RECIPIENTS {
        return None;
    }
    Some(Finding::new(
        Severity::High,
        labels::FAN_OUT,
        format!(
            "outbound transfers to {} distinct recipients",
            input.view.distinct_recipients
        ),
        weights::FAN_OUT,
    ))
}

fn inbound_burst(input: &DetectorInput) -> Option<Finding> {
    if input.view.out_count != 0
        || input.view.in_count < BURST_MIN_INBOUND
        || input.view.distinct_senders < BURST_MIN_INBOUND
    {
        return None;
    }
    Some(Finding::new(
        Severity::Medium,
        labels::INBOUND_BURST,
        format!(
            "{} inbound transfers from {} distinct senders, nothing out",
            input.view.in_count, input.view.distinct_senders
        ),
        weights::INBOUND_BURST,
    ))
}

fn dust_median(input: &DetectorInput) -> Option<Finding> {
    let values = &input.view.inbound_values;
    if values.len() < MEDIAN_MIN_SAMPLES {
        return None;
    }
    let median = median(values)?;
    if median <= 0.0 || median >= input.policy.dust_threshold {
        return None;
    }
    Some(Finding::new(
        Severity::Medium,
        labels::DUST_MEDIAN,
        format!("median inbound value {} is below the dust threshold", median),
        weights::DUST_MEDIAN,
    ))
}

fn dormant(input: &DetectorInput) -> Option<Finding> {
    let latest = input.view.latest_ms?;
    if input.now_ms - latest <= DORMANT_AFTER_MS {
        return None;
    }
    Some(Finding::new(
        Severity::Low,
        labels::DORMANT,
        format!("no activity for over {} days", DORMANT_AFTER_MS / DAY_MS),
        weights::DORMANT,
    ))
}

fn high_frequency_outbound(input: &DetectorInput) -> Option<Finding> {
    if input.view.out_last_24h < HIGH_FREQUENCY_MIN_24H {
        return None;
    }
    Some(Finding::new(
        Severity::High,
        labels::HIGH_FREQUENCY_OUTBOUND,
        format!(
            "{} outbound transfers in the trailing 24 hours",
            input.view.out_last_24h
        ),
        weights::HIGH_FREQUENCY_OUTBOUND,
    ))
}

fn frequent_outbound(input: &DetectorInput) -> Option<Finding> {
    if !(FREQUENT_MIN_24H..HIGH_FREQUENCY_MIN_24H).contains(&input.view.out_last_24h) {
        return None;
    }
    Some(Finding::new(
        Severity::Medium,
        labels::FREQUENT_OUTBOUND,
        format!(
            "{} outbound transfers in the trailing 24 hours",
            input.view.out_last_24h
        ),
        weights::FREQUENT_OUTBOUND,
    ))
}

fn dust_count(input: &DetectorInput) -> Option<Finding> {
    if input.view.tiny_inbound < DUST_COUNT_MIN {
        return None;
    }
    Some(Finding::new(
        Severity::Medium,
        labels::DUST_COUNT,
        format!("{} dust-sized inbound transfers", input.view.tiny_inbound),
        weights::DUST_COUNT,
    ))
}

fn possible_dusting(input: &DetectorInput) -> Option<Finding> {
    if !(POSSIBLE_DUST_MIN..DUST_COUNT_MIN).contains(&input.view.tiny_inbound) {
        return None;
    }
    Some(Finding::new(
        Severity::Low,
        labels::POSSIBLE_DUSTING,
        format!("{} dust-sized inbound transfers", input.view.tiny_inbound),
        weights::POSSIBLE_DUSTING,
    ))
}

fn repeated_amounts(input: &DetectorInput) -> Option<Finding> {
    if input.view.largest_amount_group < REPEATED_AMOUNT_MIN {
        return None;
    }
    Some(Finding::new(
        Severity::Medium,
        labels::REPEATED_AMOUNTS,
        format!(
            "{} outbound transfers share an identical amount",
            input.view.largest_amount_group
        ),
        weights::REPEATED_AMOUNTS,
    ))
}

fn fast_forward(input: &DetectorInput) -> Option<Finding> {
    let gap_ms = input.view.fast_forward_gap_ms?;
    if gap_ms > FAST_FORWARD_WINDOW_MS {
        return None;
    }
    Some(Finding::new(
        Severity::High,
        labels::FAST_FORWARD,
        format!(
            "outbound transfer {} minutes after the latest inbound",
            gap_ms / 60_000
        ),
        weights::FAST_FORWARD,
    ))
}

fn watchlist_touch(input: &DetectorInput) -> Option<Finding> {
    let counterparty = input.view.watchlist_counterparty.as_ref()?;
    Some(Finding::new(
        Severity::Low,
        labels::WATCHLIST,
        format!("counterparty {} is on the watchlist", counterparty),
        weights::WATCHLIST,
    ))
}

fn unverified_type(input: &DetectorInput) -> Option<Finding> {
    if input.signals.bytecode.is_some() {
        return None;
    }
    Some(Finding::new(
        Severity::Low,
        labels::UNKNOWN_TYPE,
        "bytecode lookup unavailable, account type unknown",
        weights::UNKNOWN_TYPE,
    ))
}

/// Standard even/odd median.
fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    Some(if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::types::Transfer;

    const NOW_MS: i64 = 1_700_000_000_000;
    const ADDR: &str = "0x00000000000000000000000000000000000000aa";

    fn tx(from: &str, to: &str, value: Option<f64>, timestamp_ms: i64) -> Transfer {
        Transfer {
            hash: "0xh".to_string(),
            from: from.to_string(),
            to: to.to_string(),
            value_native: value,
            timestamp_ms,
        }
    }

    fn eoa(outbound: Vec<Transfer>, inbound: Vec<Transfer>) -> Signals {
        Signals {
            bytecode: Some("0x".to_string()),
            nonce: 0,
            outbound,
            inbound,
        }
    }

    fn sender(i: usize) -> String {
        format!("0x{:040x}", 0x1000 + i)
    }

    fn findings(signals: &Signals, policy: &RiskPolicy) -> Vec<Finding> {
        run_detectors(ADDR, None, signals, policy, NOW_MS)
    }

    fn labels_of(findings: &[Finding]) -> Vec<&str> {
        findings.iter().map(|f| f.label.as_str()).collect()
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[3.0]), Some(3.0));
        assert_eq!(median(&[3.0, 1.0]), Some(2.0));
        assert_eq!(median(&[5.0, 1.0, 3.0]), Some(3.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    #[test]
    fn test_blocklist_hit() {
        let mut policy = RiskPolicy::default();
        policy.blocklist.insert(ADDR.to_string());
        let result = findings(&eoa(vec![], vec![]), &policy);
        assert_eq!(result[0].label, labels::BLOCKLIST);
        assert_eq!(result[0].weight, weights::BLOCKLIST);
    }

    #[test]
    fn test_negative_ens_by_address_and_name() {
        let mut policy = RiskPolicy::default();
        policy
            .negative_links
            .insert(ADDR.to_string(), "drainer".to_string());
        let by_addr = findings(&eoa(vec![], vec![]), &policy);
        assert!(labels_of(&by_addr).contains(&labels::NEGATIVE_ENS));

        let mut policy = RiskPolicy::default();
        policy
            .negative_links
            .insert("scam.eth".to_string(), "phishing".to_string());
        let signals = eoa(vec![], vec![]);
        let by_name = run_detectors(ADDR, Some("Scam.ETH"), &signals, &policy, NOW_MS);
        assert!(labels_of(&by_name).contains(&labels::NEGATIVE_ENS));
        let miss = run_detectors(ADDR, Some("fine.eth"), &signals, &policy, NOW_MS);
        assert!(!labels_of(&miss).contains(&labels::NEGATIVE_ENS));
    }

    #[test]
    fn test_contract_detectors() {
        let proxy_code = format!("0x363d3d373d3d3d363d73{}5af43d82803e903d91602b57fd5bf3", "bebebebebebebebebebebebebebebebebebebebe");
        let signals = Signals {
            bytecode: Some(proxy_code),
            nonce: 1,
            outbound: vec![],
            inbound: vec![],
        };
        let result = findings(&signals, &RiskPolicy::default());
        let got = labels_of(&result);
        assert!(got.contains(&labels::CONTRACT_RECIPIENT));
        assert!(got.contains(&labels::MINIMAL_PROXY));
        // 45-byte proxy runtime code is also tiny
        assert!(got.contains(&labels::TINY_BYTECODE));
    }

    #[test]
    fn test_eoa_fires_no_contract_detectors() {
        let result = findings(&eoa(vec![], vec![]), &RiskPolicy::default());
        let got = labels_of(&result);
        assert!(!got.contains(&labels::CONTRACT_RECIPIENT));
        assert!(!got.contains(&labels::MINIMAL_PROXY));
        assert!(!got.contains(&labels::TINY_BYTECODE));
        assert!(got.contains(&labels::NO_HISTORY));
    }

    #[test]
    fn test_age_tiers_are_exclusive() {
        let tiers = [
            labels::NEW_ADDRESS,
            labels::NEWISH_ADDRESS,
            labels::RECENT_ADDRESS,
        ];
        for (age_ms, expected) in [
            (DAY_MS / 2, Some(labels::NEW_ADDRESS)),
            (3 * DAY_MS, Some(labels::NEWISH_ADDRESS)),
            (15 * DAY_MS, Some(labels::RECENT_ADDRESS)),
            (45 * DAY_MS, None),
        ] {
            let signals = eoa(
                vec![tx(ADDR, &sender(1), Some(1.0), NOW_MS - age_ms)],
                vec![],
            );
            let result = findings(&signals, &RiskPolicy::default());
            let fired: Vec<&str> = labels_of(&result)
                .into_iter()
                .filter(|l| tiers.contains(l))
                .collect();
            match expected {
                Some(tier) => assert_eq!(fired, vec![tier], "age {}ms", age_ms),
                None => assert!(fired.is_empty(), "age {}ms", age_ms),
            }
        }
    }

    #[test]
    fn test_unknown_timestamps_get_no_tier() {
        let signals = eoa(vec![tx(ADDR, &sender(1), Some(1.0), 0)], vec![]);
        let result = findings(&signals, &RiskPolicy::default());
        let got = labels_of(&result);
        assert!(!got.contains(&labels::NEW_ADDRESS));
        assert!(!got.contains(&labels::NEWISH_ADDRESS));
        assert!(!got.contains(&labels::RECENT_ADDRESS));
        assert!(!got.contains(&labels::NO_HISTORY));
    }

    #[test]
    fn test_no_history_suppresses_activity_detectors() {
        let result = findings(&eoa(vec![], vec![]), &RiskPolicy::default());
        let got = labels_of(&result);
        assert!(got.contains(&labels::NO_HISTORY));
        assert!(!got.contains(&labels::LOW_ACTIVITY));
        assert!(!got.contains(&labels::INBOUND_ONLY));
    }

    #[test]
    fn test_fan_out() {
        let outbound: Vec<Transfer> = (0..10)
            .map(|i| tx(ADDR, &sender(i), Some(0.1), NOW_MS - 40 * DAY_MS))
            .collect();
        let result = findings(&eoa(outbound, vec![]), &RiskPolicy::default());
        assert!(labels_of(&result).contains(&labels::FAN_OUT));

        let few: Vec<Transfer> = (0..9)
            .map(|i| tx(ADDR, &sender(i), Some(0.1), NOW_MS - 40 * DAY_MS))
            .collect();
        let result = findings(&eoa(few, vec![]), &RiskPolicy::default());
        assert!(!labels_of(&result).contains(&labels::FAN_OUT));
    }

    #[test]
    fn test_inbound_burst_requires_distinct_senders_and_no_outbound() {
        let inbound: Vec<Transfer> = (0..5)
            .map(|i| tx(&sender(i), ADDR, Some(0.1), NOW_MS - 40 * DAY_MS))
            .collect();
        let result = findings(&eoa(vec![], inbound.clone()), &RiskPolicy::default());
        assert!(labels_of(&result).contains(&labels::INBOUND_BURST));

        // Same sender five times: no burst
        let same: Vec<Transfer> = (0..5)
            .map(|_| tx(&sender(1), ADDR, Some(0.1), NOW_MS - 40 * DAY_MS))
            .collect();
        let result = findings(&eoa(vec![], same), &RiskPolicy::default());
        assert!(!labels_of(&result).contains(&labels::INBOUND_BURST));

        // Any outbound disarms it
        let out = vec![tx(ADDR, &sender(9), Some(0.1), NOW_MS - 40 * DAY_MS)];
        let result = findings(&eoa(out, inbound), &RiskPolicy::default());
        assert!(!labels_of(&result).contains(&labels::INBOUND_BURST));
    }

    #[test]
    fn test_dust_median_threshold_is_strict() {
        let policy = RiskPolicy::default();
        let dust = policy.dust_threshold / 2.0;
        let inbound: Vec<Transfer> = (0..3)
            .map(|i| tx(&sender(i), ADDR, Some(dust), NOW_MS - 40 * DAY_MS))
            .collect();
        let result = findings(&eoa(vec![], inbound), &policy);
        assert!(labels_of(&result).contains(&labels::DUST_MEDIAN));

        // Median exactly at the threshold does not fire
        let at: Vec<Transfer> = (0..3)
            .map(|i| tx(&sender(i), ADDR, Some(policy.dust_threshold), NOW_MS - 40 * DAY_MS))
            .collect();
        let result = findings(&eoa(vec![], at), &policy);
        assert!(!labels_of(&result).contains(&labels::DUST_MEDIAN));

        // Zero-value transfers never count as dust
        let zeros: Vec<Transfer> = (0..3)
            .map(|i| tx(&sender(i), ADDR, Some(0.0), NOW_MS - 40 * DAY_MS))
            .collect();
        let result = findings(&eoa(vec![], zeros), &policy);
        assert!(!labels_of(&result).contains(&labels::DUST_MEDIAN));
        assert!(!labels_of(&result).contains(&labels::POSSIBLE_DUSTING));
    }

    #[test]
    fn test_dust_count_tiers_are_exclusive() {
        let policy = RiskPolicy::default();
        let dust = policy.dust_threshold / 2.0;
        for (count, expected) in [
            (2usize, None),
            (4, Some(labels::POSSIBLE_DUSTING)),
            (6, Some(labels::DUST_COUNT)),
        ] {
            let inbound: Vec<Transfer> = (0..count)
                .map(|i| tx(&sender(i), ADDR, Some(dust), NOW_MS - 40 * DAY_MS))
                .collect();
            let result = findings(&eoa(vec![], inbound), &policy);
            let got = labels_of(&result);
            match expected {
                Some(label) => {
                    assert!(got.contains(&label), "count {}", count);
                    let other = if label == labels::DUST_COUNT {
                        labels::POSSIBLE_DUSTING
                    } else {
                        labels::DUST_COUNT
                    };
                    assert!(!got.contains(&other), "count {}", count);
                }
                None => {
                    assert!(!got.contains(&labels::POSSIBLE_DUSTING), "count {}", count);
                    assert!(!got.contains(&labels::DUST_COUNT), "count {}", count);
                }
            }
        }
    }

    #[test]
    fn test_dormant_fires_only_past_cutoff() {
        let old = eoa(
            vec![tx(ADDR, &sender(1), Some(1.0), NOW_MS - 181 * DAY_MS)],
            vec![],
        );
        let result = findings(&old, &RiskPolicy::default());
        let dormant = result
            .iter()
            .find(|f| f.label == labels::DORMANT)
            .expect("dormant should fire");
        assert_eq!(dormant.weight, -5);

        let active = eoa(
            vec![tx(ADDR, &sender(1), Some(1.0), NOW_MS - 90 * DAY_MS)],
            vec![],
        );
        let result = findings(&active, &RiskPolicy::default());
        assert!(!labels_of(&result).contains(&labels::DORMANT));
    }

    #[test]
    fn test_outbound_frequency_tiers() {
        for (count, expected) in [
            (4usize, None),
            (5, Some(labels::FREQUENT_OUTBOUND)),
            (9, Some(labels::FREQUENT_OUTBOUND)),
            (10, Some(labels::HIGH_FREQUENCY_OUTBOUND)),
        ] {
            let outbound: Vec<Transfer> = (0..count)
                .map(|i| tx(ADDR, &sender(i % 3), Some(0.5), NOW_MS - 3_600_000))
                .collect();
            let result = findings(&eoa(outbound, vec![]), &RiskPolicy::default());
            let got = labels_of(&result);
            match expected {
                Some(label) => assert!(got.contains(&label), "count {}", count),
                None => {
                    assert!(!got.contains(&labels::FREQUENT_OUTBOUND), "count {}", count);
                    assert!(
                        !got.contains(&labels::HIGH_FREQUENCY_OUTBOUND),
                        "count {}",
                        count
                    );
                }
            }
        }
    }

    #[test]
    fn test_repeated_amounts() {
        let outbound: Vec<Transfer> = (0..8)
            .map(|i| tx(ADDR, &sender(i), Some(0.25), NOW_MS - 40 * DAY_MS))
            .collect();
        let result = findings(&eoa(outbound, vec![]), &RiskPolicy::default());
        assert!(labels_of(&result).contains(&labels::REPEATED_AMOUNTS));

        // Distinct amounts never group
        let varied: Vec<Transfer> = (0..8)
            .map(|i| tx(ADDR, &sender(i), Some(0.25 + i as f64), NOW_MS - 40 * DAY_MS))
            .collect();
        let result = findings(&eoa(varied, vec![]), &RiskPolicy::default());
        assert!(!labels_of(&result).contains(&labels::REPEATED_AMOUNTS));
    }

    #[test]
    fn test_fast_forward_window() {
        let deposit = NOW_MS - 2 * 3_600_000;
        let quick = eoa(
            vec![tx(ADDR, &sender(2), Some(1.0), deposit + 30 * 60_000)],
            vec![tx(&sender(1), ADDR, Some(1.0), deposit)],
        );
        let result = findings(&quick, &RiskPolicy::default());
        assert!(labels_of(&result).contains(&labels::FAST_FORWARD));

        let slow = eoa(
            vec![tx(ADDR, &sender(2), Some(1.0), deposit + 2 * 3_600_000)],
            vec![tx(&sender(1), ADDR, Some(1.0), deposit)],
        );
        let result = findings(&slow, &RiskPolicy::default());
        assert!(!labels_of(&result).contains(&labels::FAST_FORWARD));
    }

    #[test]
    fn test_watchlist_touch_both_sides() {
        let mut policy = RiskPolicy::default();
        let watched = sender(7);
        policy.watchlist.insert(watched.clone());

        let outgoing = eoa(
            vec![tx(ADDR, &watched, Some(1.0), NOW_MS - 40 * DAY_MS)],
            vec![],
        );
        assert!(labels_of(&findings(&outgoing, &policy)).contains(&labels::WATCHLIST));

        let incoming = eoa(
            vec![],
            vec![tx(&watched, ADDR, Some(1.0), NOW_MS - 40 * DAY_MS)],
        );
        assert!(labels_of(&findings(&incoming, &policy)).contains(&labels::WATCHLIST));
    }

    #[test]
    fn test_unverified_type_is_informational() {
        let signals = Signals {
            bytecode: None,
            nonce: 0,
            outbound: vec![],
            inbound: vec![],
        };
        let result = findings(&signals, &RiskPolicy::default());
        let finding = result
            .iter()
            .find(|f| f.label == labels::UNKNOWN_TYPE)
            .expect("unknown type should fire");
        assert_eq!(finding.weight, 0);
        assert_eq!(finding.severity, Severity::Low);
    }

    #[test]
    fn test_findings_come_back_in_table_order() {
        let mut policy = RiskPolicy::default();
        policy.blocklist.insert(ADDR.to_string());
        let signals = eoa(vec![], vec![]);
        let result = findings(&signals, &policy);
        let got = labels_of(&result);
        let blocklist_pos = got.iter().position(|l| *l == labels::BLOCKLIST).unwrap();
        let history_pos = got.iter().position(|l| *l == labels::NO_HISTORY).unwrap();
        assert!(blocklist_pos < history_pos);
    }
}
