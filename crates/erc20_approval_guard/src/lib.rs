pub mod config;
pub mod contracts;
pub mod error;
pub mod eth;
pub mod operator;
pub mod orchestrator;
pub mod provider;
pub mod registry;
pub mod risk;

pub use erc20_approval_guard_common::{
    err_create, err_custom_create, err_from, err_from_msg, events,
};
