mod options;

use crate::options::{GuardCommands, GuardOptions};
use erc20_approval_guard::config::{self, Chain, Config};
use erc20_approval_guard::err_custom_create;
use erc20_approval_guard::error::GuardError;
use erc20_approval_guard::eth::{
    batch_check_allowances_on_chain, batch_revoke_on_chain, get_eth_addr_from_secret,
    Web3TokenLedger,
};
use erc20_approval_guard::operator::BatchAllowanceOperator;
use erc20_approval_guard::orchestrator::{high_risk_subset, run_revocations};
use erc20_approval_guard::provider::fetch_approvals;
use erc20_approval_guard::risk::{risk_stats, sorted_by_risk};
use secp256k1::SecretKey;
use serde_json::json;
use std::env;
use std::str::FromStr;
use structopt::StructOpt;
use web3::transports::Http;
use web3::types::{Address, U256};
use web3::Web3;

fn get_web3(chain: &Chain) -> Result<Web3<Http>, GuardError> {
    let endpoint = chain.rpc_endpoints.first().ok_or(err_custom_create!(
        "No rpc endpoint configured for chain {}",
        chain.chain_name
    ))?;
    let transport = Http::new(endpoint)
        .map_err(|e| err_custom_create!("Failed to create transport for {}: {}", endpoint, e))?;
    Ok(Web3::new(transport))
}

fn load_secret_key() -> Result<SecretKey, GuardError> {
    let key = env::var("ETH_PRIVATE_KEY")
        .map_err(|_| err_custom_create!("Specify ETH_PRIVATE_KEY env variable"))?;
    //do not disclose the private key in error message
    SecretKey::from_str(&key).map_err(|_| err_custom_create!("Failed to parse private key"))
}

fn load_provider_api_key() -> Result<String, GuardError> {
    env::var("PROVIDER_API_KEY")
        .map_err(|_| err_custom_create!("Specify PROVIDER_API_KEY env variable"))
}

fn gwei_to_wei(gwei: f64) -> U256 {
    U256::from((gwei * 1.0e9) as u128)
}

fn signing_ledger(chain: &Chain) -> Result<(Web3TokenLedger, Address), GuardError> {
    let secret_key = load_secret_key()?;
    let owner = get_eth_addr_from_secret(&secret_key);
    let ledger = Web3TokenLedger::with_signer(
        get_web3(chain)?,
        secret_key,
        chain.chain_id,
        chain.max_fee_per_gas.map(gwei_to_wei),
        chain.priority_fee.map(gwei_to_wei),
    );
    Ok((ledger, owner))
}

fn batch_revoke_contract(chain: &Chain) -> Result<Address, GuardError> {
    chain.batch_revoke_contract.ok_or(err_custom_create!(
        "No batch-revoke-contract configured for chain {}",
        chain.chain_name
    ))
}

fn print_json(value: &serde_json::Value) -> Result<(), GuardError> {
    println!(
        "{}",
        serde_json::to_string_pretty(value)
            .map_err(|err| err_custom_create!("Something went wrong when serializing to json {err}"))?
    );
    Ok(())
}

async fn scan_approvals(
    config: &Config,
    address: &str,
    high_only: bool,
) -> Result<(), GuardError> {
    let api_key = load_provider_api_key()?;
    let records = fetch_approvals(
        &config.provider.base_url,
        &api_key,
        address,
        &config.provider.chain,
    )
    .await?;
    let engine = config.build_risk_engine()?;
    let classified = sorted_by_risk(engine.analyze(records));
    let stats = risk_stats(&classified);
    let approvals = if high_only {
        high_risk_subset(classified)
    } else {
        classified
    };
    let mut rows = Vec::with_capacity(approvals.len());
    for classified in &approvals {
        let mut row = serde_json::to_value(classified)
            .map_err(|err| err_custom_create!("Something went wrong when serializing to json {err}"))?;
        if let (Some(amount), serde_json::Value::Object(fields)) =
            (classified.display_amount(), &mut row)
        {
            fields.insert("displayAmount".to_string(), json!(amount.to_string()));
        }
        rows.push(row);
    }
    print_json(&json!({
        "stats": stats,
        "approvals": rows,
    }))
}

async fn main_internal() -> Result<(), GuardError> {
    dotenv::dotenv().ok();
    env::set_var(
        "RUST_LOG",
        env::var("RUST_LOG").unwrap_or("info,web3=warn".to_string()),
    );

    env_logger::init();
    let cli: GuardOptions = GuardOptions::from_args();

    let config = config::Config::load("config-guard.toml").await?;

    match cli.commands {
        GuardCommands::Scan { scan_options } => {
            scan_approvals(&config, &scan_options.address, scan_options.high_only).await?;
        }
        GuardCommands::Check { check_options } => {
            let chain = config.get_chain(&check_options.chain_name)?;
            let allowances = if check_options.on_chain {
                batch_check_allowances_on_chain(
                    &get_web3(chain)?,
                    batch_revoke_contract(chain)?,
                    check_options.owner,
                    check_options.tokens.clone(),
                    check_options.spenders.clone(),
                )
                .await?
            } else {
                let ledger = Web3TokenLedger::read_only(get_web3(chain)?, chain.chain_id);
                let operator = BatchAllowanceOperator::new(ledger, check_options.owner);
                operator
                    .batch_check_allowances(
                        check_options.owner,
                        &check_options.tokens,
                        &check_options.spenders,
                    )
                    .await?
            };
            let rows: Vec<serde_json::Value> = check_options
                .tokens
                .iter()
                .zip(check_options.spenders.iter())
                .zip(allowances.iter())
                .map(|((token, spender), allowance)| {
                    json!({
                        "token": format!("{token:#x}"),
                        "spender": format!("{spender:#x}"),
                        "allowance": allowance.to_string(),
                    })
                })
                .collect();
            print_json(&json!({ "allowances": rows }))?;
        }
        GuardCommands::Revoke { revoke_options } => {
            let chain = config.get_chain(&revoke_options.chain_name)?;
            let (ledger, owner) = signing_ledger(chain)?;
            let operator = BatchAllowanceOperator::new(ledger, owner);
            let receipt = operator
                .revoke(revoke_options.token, revoke_options.spender)
                .await?;
            print_json(&json!({
                "attempted": receipt.attempted,
                "succeeded": receipt.succeeded(),
                "failed": receipt.failed(),
                "events": receipt.events,
            }))?;
        }
        GuardCommands::BatchRevoke {
            batch_revoke_options,
        } => {
            let chain = config.get_chain(&batch_revoke_options.chain_name)?;
            if batch_revoke_options.on_chain {
                let secret_key = load_secret_key()?;
                let tx_hash = batch_revoke_on_chain(
                    &get_web3(chain)?,
                    batch_revoke_contract(chain)?,
                    &secret_key,
                    chain.chain_id,
                    batch_revoke_options.tokens,
                    batch_revoke_options.spenders,
                )
                .await?;
                print_json(&json!({ "txHash": format!("{tx_hash:#x}") }))?;
            } else {
                let (ledger, owner) = signing_ledger(chain)?;
                let operator = BatchAllowanceOperator::new(ledger, owner);
                let receipt = operator
                    .batch_revoke(&batch_revoke_options.tokens, &batch_revoke_options.spenders)
                    .await?;
                print_json(&json!({
                    "attempted": receipt.attempted,
                    "succeeded": receipt.succeeded(),
                    "failed": receipt.failed(),
                    "events": receipt.events,
                    "outcomes": receipt.outcomes,
                }))?;
            }
        }
        GuardCommands::RevokeHighRisk {
            revoke_high_risk_options,
        } => {
            let chain = config.get_chain(&revoke_high_risk_options.chain_name)?;
            let (ledger, owner) = signing_ledger(chain)?;

            let api_key = load_provider_api_key()?;
            let records = fetch_approvals(
                &config.provider.base_url,
                &api_key,
                &format!("{owner:#x}"),
                &config.provider.chain,
            )
            .await?;
            let engine = config.build_risk_engine()?;
            let candidates = high_risk_subset(engine.analyze(records));
            log::info!(
                "Found {} high risk approvals for {:#x}",
                candidates.len(),
                owner
            );

            let operator = BatchAllowanceOperator::new(ledger, owner);
            let (progress_tx, mut progress_rx) =
                tokio::sync::mpsc::channel::<erc20_approval_guard::events::RunProgress>(16);
            let progress_task = tokio::spawn(async move {
                while let Some(progress) = progress_rx.recv().await {
                    log::info!(
                        "Revoking high risk approvals: {}/{} done, {} failed",
                        progress.done,
                        progress.total,
                        progress.failed
                    );
                }
            });
            let result = run_revocations(&operator, &candidates, Some(progress_tx)).await;
            progress_task.await.ok();

            print_json(&json!({ "result": result }))?;
            if !result.changed() && result.total > 0 {
                return Err(err_custom_create!(
                    "All {} revocations failed, no allowance was changed",
                    result.total
                ));
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), GuardError> {
    main_internal().await.map_err(|err| {
        eprintln!("Error: {err}");
        err
    })
}
