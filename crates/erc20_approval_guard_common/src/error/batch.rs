use thiserror::Error;
use web3::types::Address;

/// Batch precondition violations reject the whole call before any item
/// is attempted. These mirror the named errors of the deployed
/// batch-revoke contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchPreconditionError {
    #[error("array length mismatch: {tokens} tokens vs {spenders} spenders")]
    ArrayLengthMismatch { tokens: usize, spenders: usize },
    #[error("empty arrays")]
    EmptyArrays,
    #[error("batch too large: {len} items, maximum is {max}")]
    BatchTooLarge { len: usize, max: usize },
    #[error("zero address")]
    ZeroAddress,
}

/// Failure of one delegated call into a token contract. Always recovered
/// locally inside a batch, never bubbles up as a call-level error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("no contract code at {0:#x}")]
    NoCode(Address),
    #[error("call reverted: {0}")]
    Reverted(String),
    #[error("rpc failure: {0}")]
    Rpc(String),
    #[error("transaction confirmation timed out")]
    Timeout,
}
