use chrono::{DateTime, Utc};
use serde::Serialize;
use web3::types::Address;

/// One entry of the operator event trail. Trail order always matches
/// batch input order, with the batch summary last.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RevocationEventContent {
    Revoked {
        owner: Address,
        token: Address,
        spender: Address,
    },
    RevokeFailed {
        owner: Address,
        token: Address,
        spender: Address,
    },
    BatchRevoked {
        owner: Address,
        count: u64,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevocationEvent {
    pub create_date: DateTime<Utc>,
    pub content: RevocationEventContent,
}

impl RevocationEvent {
    pub fn now(content: RevocationEventContent) -> Self {
        RevocationEvent {
            create_date: Utc::now(),
            content,
        }
    }
}

/// Per-item result of one revocation attempt inside a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevocationOutcome {
    pub token: Address,
    pub spender: Address,
    pub succeeded: bool,
}

/// Intermediate snapshot published after every item of an orchestrated
/// revocation run. Discarded when the run completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunProgress {
    pub done: u64,
    pub failed: u64,
    pub total: u64,
}
