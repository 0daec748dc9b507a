pub mod fixtures;
mod mock_ledger;

pub use mock_ledger::MockTokenLedger;
