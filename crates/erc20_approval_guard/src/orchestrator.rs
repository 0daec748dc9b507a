use crate::operator::{BatchAllowanceOperator, TokenLedger};
use crate::risk::{ClassifiedApproval, RiskLevel};
use erc20_approval_guard_common::events::RunProgress;
use serde::Serialize;
use std::str::FromStr;
use tokio::sync::mpsc::Sender;
use web3::types::Address;

/// Final tally of one orchestrated revocation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub done: u64,
    pub failed: u64,
    pub total: u64,
}

impl RunResult {
    /// True when at least one allowance was actually zeroed. An all-fail
    /// run means no on-chain state changed.
    pub fn changed(&self) -> bool {
        self.done > 0
    }
}

/// Scope selection is the caller's decision; the run loop itself
/// processes exactly what it is handed.
pub fn high_risk_subset(approvals: Vec<ClassifiedApproval>) -> Vec<ClassifiedApproval> {
    approvals
        .into_iter()
        .filter(|classified| classified.risk_level == RiskLevel::High)
        .collect()
}

/// Issues one separate single-item revoke per candidate, strictly
/// sequentially - each write is an independently authorized transaction,
/// so nothing is pipelined. After every attempt a progress snapshot goes
/// out on the optional channel. A failed item never stops the loop;
/// every candidate is processed before the final tally is returned.
pub async fn run_revocations<L: TokenLedger>(
    operator: &BatchAllowanceOperator<L>,
    candidates: &[ClassifiedApproval],
    progress_tx: Option<Sender<RunProgress>>,
) -> RunResult {
    let total = candidates.len() as u64;
    let mut done = 0_u64;
    let mut failed = 0_u64;

    for candidate in candidates {
        let succeeded = match revoke_candidate(operator, candidate).await {
            Ok(succeeded) => succeeded,
            Err(err) => {
                log::error!(
                    "Revoke failed for {} spender {}: {}",
                    candidate.approval.token.symbol,
                    candidate.approval.spender.address,
                    err
                );
                false
            }
        };
        if succeeded {
            done += 1;
        } else {
            failed += 1;
        }
        log::info!("Revocation progress: {}/{} ({} failed)", done + failed, total, failed);
        if let Some(progress_tx) = &progress_tx {
            progress_tx
                .send(RunProgress {
                    done,
                    failed,
                    total,
                })
                .await
                .ok();
        }
    }

    RunResult {
        done,
        failed,
        total,
    }
}

async fn revoke_candidate<L: TokenLedger>(
    operator: &BatchAllowanceOperator<L>,
    candidate: &ClassifiedApproval,
) -> Result<bool, crate::error::GuardError> {
    let token = Address::from_str(&candidate.approval.token.address)
        .map_err(crate::err_from!())?;
    let spender = Address::from_str(&candidate.approval.spender.address)
        .map_err(crate::err_from!())?;
    let receipt = operator.revoke(token, spender).await?;
    Ok(receipt.succeeded() == 1)
}
