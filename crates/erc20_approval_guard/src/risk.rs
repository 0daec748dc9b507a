use crate::provider::ApprovalRecord;
use crate::registry::ProtocolRegistry;
use erc20_approval_guard_common::utils::{u256_from_dec_string, u256_to_decimal};
use rust_decimal::Decimal;
use serde::Serialize;
use web3::types::U256;

/// Severity of a standing approval. Variant order is the sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

/// Allowances above this are treated as effectively unlimited even when
/// below max uint256. The boundary is a heuristic, not a protocol
/// constant, so it stays overridable via config.
pub const DEFAULT_UNLIMITED_THRESHOLD: &str = "1000000000000000000000000000";

#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedApproval {
    #[serde(flatten)]
    pub approval: ApprovalRecord,
    pub risk_level: RiskLevel,
    pub risk_reason: String,
}

impl ClassifiedApproval {
    /// Approved amount in whole tokens. None when the raw value does not
    /// parse or is too large to render, which is the usual case for
    /// unlimited approvals.
    pub fn display_amount(&self) -> Option<Decimal> {
        let raw = u256_from_dec_string(&self.approval.value).ok()?;
        u256_to_decimal(raw, self.approval.token.decimals).ok()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RiskStats {
    pub total: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

/// Deterministic approval risk classifier. Pure with respect to its
/// inputs; holds only the injected registry and the unlimited threshold.
#[derive(Debug, Clone)]
pub struct RiskEngine {
    registry: ProtocolRegistry,
    unlimited_threshold: U256,
}

impl RiskEngine {
    pub fn new(registry: ProtocolRegistry) -> Self {
        Self::with_threshold(
            registry,
            U256::from_dec_str(DEFAULT_UNLIMITED_THRESHOLD).unwrap(),
        )
    }

    pub fn with_threshold(registry: ProtocolRegistry, unlimited_threshold: U256) -> Self {
        RiskEngine {
            registry,
            unlimited_threshold,
        }
    }

    pub fn registry(&self) -> &ProtocolRegistry {
        &self.registry
    }

    /// Max uint256 or anything strictly above the threshold counts as
    /// unlimited. A malformed amount string fails closed: it is never
    /// treated as unlimited.
    pub fn is_unlimited(&self, value: &str) -> bool {
        match u256_from_dec_string(value) {
            Ok(value) => value == U256::max_value() || value > self.unlimited_threshold,
            Err(_) => false,
        }
    }

    fn spender_display(&self, approval: &ApprovalRecord) -> String {
        self.registry
            .lookup(&approval.spender.address)
            .map(|name| name.to_string())
            .or_else(|| approval.spender.address_label.clone())
            .unwrap_or_else(|| "Unknown Contract".to_string())
    }

    /// Classifies one approval. Rules are checked in strict priority
    /// order and the first matching rule wins: spam dominates all other
    /// signals, unboundedness of spend dominates counterparty
    /// reputation, counterparty reputation dominates amount-boundedness.
    pub fn classify(&self, approval: &ApprovalRecord) -> (RiskLevel, String) {
        let unlimited = self.is_unlimited(&approval.value);
        let known = self.registry.contains(&approval.spender.address);
        let has_label = approval.spender.address_label.is_some();

        if approval.token.possible_spam {
            return (
                RiskLevel::High,
                "Approval for a potential spam/scam token".to_string(),
            );
        }

        if unlimited && !known && !has_label {
            return (
                RiskLevel::High,
                "Unlimited approval to an unknown, unlabeled contract".to_string(),
            );
        }

        if unlimited && !known {
            // label must be present here
            let label = approval.spender.address_label.as_deref().unwrap_or_default();
            return (RiskLevel::Medium, format!("Unlimited approval to {label}"));
        }

        if unlimited {
            return (
                RiskLevel::Low,
                format!("Unlimited approval to {}", self.spender_display(approval)),
            );
        }

        if !known && !has_label && !approval.token.verified_contract {
            return (
                RiskLevel::Medium,
                "Limited approval to an unverified, unknown contract".to_string(),
            );
        }

        (
            RiskLevel::Low,
            format!("Limited approval to {}", self.spender_display(approval)),
        )
    }

    /// Classifies every record independently, preserving input order.
    pub fn analyze(&self, approvals: Vec<ApprovalRecord>) -> Vec<ClassifiedApproval> {
        approvals
            .into_iter()
            .map(|approval| {
                let (risk_level, risk_reason) = self.classify(&approval);
                ClassifiedApproval {
                    approval,
                    risk_level,
                    risk_reason,
                }
            })
            .collect()
    }
}

/// Stable sort, high before medium before low. Equal-risk items keep
/// their relative input order so repeated renders do not jitter.
pub fn sorted_by_risk(mut approvals: Vec<ClassifiedApproval>) -> Vec<ClassifiedApproval> {
    approvals.sort_by_key(|classified| classified.risk_level);
    approvals
}

pub fn risk_stats(approvals: &[ClassifiedApproval]) -> RiskStats {
    let mut stats = RiskStats {
        total: approvals.len(),
        ..Default::default()
    };
    for classified in approvals {
        match classified.risk_level {
            RiskLevel::High => stats.high += 1,
            RiskLevel::Medium => stats.medium += 1,
            RiskLevel::Low => stats.low += 1,
        }
    }
    stats
}
