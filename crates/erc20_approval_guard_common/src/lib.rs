pub mod error;
pub mod events;
pub mod utils;

pub use error::{BatchPreconditionError, CustomError, ErrorBag, GuardError, LedgerError};
pub use events::{RevocationEvent, RevocationEventContent, RevocationOutcome, RunProgress};
