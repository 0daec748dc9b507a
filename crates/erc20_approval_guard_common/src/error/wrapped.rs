use super::{BatchPreconditionError, ErrorBag};
use std::error::Error;

/// Error type built over ErrorBag, containing source code location and
/// optional message. Note that only creating via macro is possible to
/// catch line and file.
#[derive(Debug)]
pub struct GuardError {
    pub inner: ErrorBag,
    pub msg: Option<String>,
    pub file: &'static str,
    pub line: u32,
    pub column: u32,
}

impl GuardError {
    pub fn as_batch_precondition(&self) -> Option<&BatchPreconditionError> {
        self.inner.as_batch_precondition()
    }
}

impl Error for GuardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.inner)
    }
}

impl std::fmt::Display for GuardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let file_loc = self.file.replace('\\', "/");
        if let Some(msg) = &self.msg {
            write!(
                f,
                "{}, {}, {}:{}:{}",
                msg, self.inner, file_loc, self.line, self.column
            )
        } else {
            write!(
                f,
                "{}, {}:{}:{}",
                self.inner, file_loc, self.line, self.column
            )
        }
    }
}
