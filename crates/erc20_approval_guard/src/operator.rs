use crate::err_create;
use crate::error::{BatchPreconditionError, GuardError, LedgerError};
use async_trait::async_trait;
use erc20_approval_guard_common::events::{
    RevocationEvent, RevocationEventContent, RevocationOutcome,
};
use web3::types::{Address, U256};

/// Hard bound on (token, spender) pairs per revoke batch
pub const MAX_BATCH_SIZE: usize = 50;

/// Delegated access to the allowance ledgers of external token
/// contracts. The operator never caches or locally mutates allowance
/// values; every check is a fresh read, every revoke a fresh write.
#[async_trait]
pub trait TokenLedger: Send + Sync {
    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, LedgerError>;

    async fn approve(
        &self,
        owner: Address,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<(), LedgerError>;
}

/// Result of one batch revoke call: ordered per-item outcomes plus the
/// timestamped event trail, with the batch summary event last. Per-item
/// failures are part of the return value, never call-level errors.
#[derive(Debug, Clone)]
pub struct BatchRevokeReceipt {
    pub outcomes: Vec<RevocationOutcome>,
    pub events: Vec<RevocationEvent>,
    /// Entries attempted, not entries that succeeded
    pub attempted: u64,
}

impl BatchRevokeReceipt {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Trail entries without their timestamps, in emission order
    pub fn event_contents(&self) -> Vec<RevocationEventContent> {
        self.events
            .iter()
            .map(|event| event.content.clone())
            .collect()
    }
}

/// Batch operations over allowance triples scoped to one owner. Holds no
/// mutable state of its own; the only invariant across calls is the
/// constant batch bound.
pub struct BatchAllowanceOperator<L: TokenLedger> {
    ledger: L,
    owner: Address,
}

impl<L: TokenLedger> BatchAllowanceOperator<L> {
    pub fn new(ledger: L, owner: Address) -> Self {
        BatchAllowanceOperator { ledger, owner }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    fn check_shape(tokens: &[Address], spenders: &[Address]) -> Result<(), GuardError> {
        if tokens.len() != spenders.len() {
            return Err(err_create!(BatchPreconditionError::ArrayLengthMismatch {
                tokens: tokens.len(),
                spenders: spenders.len(),
            }));
        }
        if tokens.is_empty() {
            return Err(err_create!(BatchPreconditionError::EmptyArrays));
        }
        Ok(())
    }

    /// Reads the allowance of every (owner, token, spender) triple.
    /// Results are in strict input order, one per pair. A query that
    /// fails (no contract code, revert, malformed target) yields 0 for
    /// that index; the batch itself never fails past the shape checks.
    pub async fn batch_check_allowances(
        &self,
        owner: Address,
        tokens: &[Address],
        spenders: &[Address],
    ) -> Result<Vec<U256>, GuardError> {
        Self::check_shape(tokens, spenders)?;

        let mut allowances = Vec::with_capacity(tokens.len());
        for (token, spender) in tokens.iter().zip(spenders.iter()) {
            let allowance = match self.ledger.allowance(*token, owner, *spender).await {
                Ok(allowance) => allowance,
                Err(err) => {
                    log::debug!(
                        "Allowance check failed for token {:#x} spender {:#x}: {}, reporting 0",
                        token,
                        spender,
                        err
                    );
                    U256::zero()
                }
            };
            allowances.push(allowance);
        }
        Ok(allowances)
    }

    async fn revoke_item(
        &self,
        token: Address,
        spender: Address,
        outcomes: &mut Vec<RevocationOutcome>,
        events: &mut Vec<RevocationEvent>,
    ) {
        if token == Address::zero() || spender == Address::zero() {
            log::warn!(
                "Skipping zero address entry, token {:#x} spender {:#x}",
                token,
                spender
            );
            outcomes.push(RevocationOutcome {
                token,
                spender,
                succeeded: false,
            });
            events.push(RevocationEvent::now(RevocationEventContent::RevokeFailed {
                owner: self.owner,
                token,
                spender,
            }));
            return;
        }

        match self
            .ledger
            .approve(self.owner, token, spender, U256::zero())
            .await
        {
            Ok(()) => {
                log::info!(
                    "Revoked allowance of token {:#x} for spender {:#x}",
                    token,
                    spender
                );
                outcomes.push(RevocationOutcome {
                    token,
                    spender,
                    succeeded: true,
                });
                events.push(RevocationEvent::now(RevocationEventContent::Revoked {
                    owner: self.owner,
                    token,
                    spender,
                }));
            }
            Err(err) => {
                log::error!(
                    "Revoke failed for token {:#x} spender {:#x}: {}",
                    token,
                    spender,
                    err
                );
                outcomes.push(RevocationOutcome {
                    token,
                    spender,
                    succeeded: false,
                });
                events.push(RevocationEvent::now(RevocationEventContent::RevokeFailed {
                    owner: self.owner,
                    token,
                    spender,
                }));
            }
        }
    }

    /// Zeroes the allowance of every pair in input order. Preconditions
    /// (shape, size) reject the whole call before anything is attempted;
    /// after that one bad token never aborts the batch - zero addresses
    /// are skipped and failed approve calls recorded, both as
    /// RevokeFailed entries in the trail.
    pub async fn batch_revoke(
        &self,
        tokens: &[Address],
        spenders: &[Address],
    ) -> Result<BatchRevokeReceipt, GuardError> {
        Self::check_shape(tokens, spenders)?;
        if tokens.len() > MAX_BATCH_SIZE {
            return Err(err_create!(BatchPreconditionError::BatchTooLarge {
                len: tokens.len(),
                max: MAX_BATCH_SIZE,
            }));
        }

        let mut outcomes = Vec::with_capacity(tokens.len());
        let mut events = Vec::with_capacity(tokens.len() + 1);
        for (token, spender) in tokens.iter().zip(spenders.iter()) {
            self.revoke_item(*token, *spender, &mut outcomes, &mut events)
                .await;
        }
        events.push(RevocationEvent::now(RevocationEventContent::BatchRevoked {
            owner: self.owner,
            count: tokens.len() as u64,
        }));

        Ok(BatchRevokeReceipt {
            outcomes,
            events,
            attempted: tokens.len() as u64,
        })
    }

    /// Single-pair case. Zero addresses are rejected outright here -
    /// there is no batch to preserve - and nothing is emitted.
    pub async fn revoke(
        &self,
        token: Address,
        spender: Address,
    ) -> Result<BatchRevokeReceipt, GuardError> {
        if token == Address::zero() || spender == Address::zero() {
            return Err(err_create!(BatchPreconditionError::ZeroAddress));
        }

        let mut outcomes = Vec::with_capacity(1);
        let mut events = Vec::with_capacity(2);
        self.revoke_item(token, spender, &mut outcomes, &mut events)
            .await;
        events.push(RevocationEvent::now(RevocationEventContent::BatchRevoked {
            owner: self.owner,
            count: 1,
        }));

        Ok(BatchRevokeReceipt {
            outcomes,
            events,
            attempted: 1,
        })
    }
}
