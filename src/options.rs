use structopt::StructOpt;
use web3::types::Address;

#[derive(StructOpt)]
#[structopt(about = "Approval scan options")]
pub struct ScanOptions {
    #[structopt(short = "c", long = "chain-name", default_value = "bsc")]
    pub chain_name: String,

    #[structopt(short = "a", long = "address", help = "Owner address to scan")]
    pub address: String,

    #[structopt(long = "high-only", help = "Print only high risk approvals")]
    pub high_only: bool,
}

#[derive(StructOpt)]
#[structopt(about = "Batch allowance check options")]
pub struct CheckOptions {
    #[structopt(short = "c", long = "chain-name", default_value = "bsc")]
    pub chain_name: String,

    #[structopt(long = "owner", help = "Owner of the allowances")]
    pub owner: Address,

    #[structopt(long = "token", help = "Token address, repeat once per pair")]
    pub tokens: Vec<Address>,

    #[structopt(long = "spender", help = "Spender address, repeat once per pair")]
    pub spenders: Vec<Address>,

    #[structopt(
        long = "on-chain",
        help = "Query through the deployed batch-revoke contract instead of per-token calls"
    )]
    pub on_chain: bool,
}

#[derive(StructOpt)]
#[structopt(about = "Single revoke options")]
pub struct RevokeOptions {
    #[structopt(short = "c", long = "chain-name", default_value = "bsc")]
    pub chain_name: String,

    #[structopt(long = "token", help = "Token to revoke the allowance on")]
    pub token: Address,

    #[structopt(long = "spender", help = "Spender losing the allowance")]
    pub spender: Address,
}

#[derive(StructOpt)]
#[structopt(about = "Batch revoke options")]
pub struct BatchRevokeOptions {
    #[structopt(short = "c", long = "chain-name", default_value = "bsc")]
    pub chain_name: String,

    #[structopt(long = "token", help = "Token address, repeat once per pair")]
    pub tokens: Vec<Address>,

    #[structopt(long = "spender", help = "Spender address, repeat once per pair")]
    pub spenders: Vec<Address>,

    #[structopt(
        long = "on-chain",
        help = "Submit one batchRevoke transaction to the deployed contract instead of sequential approve calls"
    )]
    pub on_chain: bool,
}

#[derive(StructOpt)]
#[structopt(about = "Scan and revoke high risk approvals")]
pub struct RevokeHighRiskOptions {
    #[structopt(short = "c", long = "chain-name", default_value = "bsc")]
    pub chain_name: String,
}

#[derive(StructOpt)]
#[structopt(about = "Risk scanner and batch revoker for ERC20 spending approvals")]
pub enum GuardCommands {
    /// Fetch approvals for an owner, classify and print them by risk
    Scan {
        #[structopt(flatten)]
        scan_options: ScanOptions,
    },
    /// Read many allowances in one go
    Check {
        #[structopt(flatten)]
        check_options: CheckOptions,
    },
    /// Revoke a single allowance
    Revoke {
        #[structopt(flatten)]
        revoke_options: RevokeOptions,
    },
    /// Revoke a bounded batch of allowances
    BatchRevoke {
        #[structopt(flatten)]
        batch_revoke_options: BatchRevokeOptions,
    },
    /// Scan the signer's approvals and revoke every high risk one
    RevokeHighRisk {
        #[structopt(flatten)]
        revoke_high_risk_options: RevokeHighRiskOptions,
    },
}

#[derive(StructOpt)]
pub struct GuardOptions {
    #[structopt(subcommand)]
    pub commands: GuardCommands,
}
