mod bag;
mod batch;
mod custom;
mod wrapped;

pub use bag::ErrorBag;
pub use batch::{BatchPreconditionError, LedgerError};
pub use custom::CustomError;
pub use wrapped::GuardError;

/// Export macros for creating errors
mod macros;
