pub use erc20_approval_guard_common::error::*;
