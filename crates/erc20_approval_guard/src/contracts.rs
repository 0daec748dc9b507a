use crate::err_custom_create;
use crate::error::GuardError;
use lazy_static::lazy_static;
use std::str::FromStr;
use web3::contract::tokens::Tokenize;
use web3::contract::Contract;
use web3::ethabi;
use web3::transports::Http;
use web3::types::{Address, U256};
use web3::{Transport, Web3};

lazy_static! {
    pub static ref DUMMY_RPC_PROVIDER: Web3<Http> = {
        let transport = web3::transports::Http::new("http://noconn").unwrap();
        Web3::new(transport)
    };
    pub static ref ERC20_CONTRACT_TEMPLATE: Contract<Http> =
        prepare_contract_template(include_bytes!("../contracts/ierc20.json")).unwrap();
    pub static ref BATCH_REVOKE_CONTRACT_TEMPLATE: Contract<Http> =
        prepare_contract_template(include_bytes!("../contracts/batch_revoke.json")).unwrap();
}

pub fn prepare_contract_template(json_abi: &[u8]) -> Result<Contract<Http>, GuardError> {
    let contract = Contract::from_json(
        DUMMY_RPC_PROVIDER.eth(),
        Address::from_str("0x0000000000000000000000000000000000000000").unwrap(),
        json_abi,
    )
    .map_err(|err| err_custom_create!("Failed to create contract {err}"))?;

    Ok(contract)
}

pub fn contract_encode<P, T>(
    contract: &Contract<T>,
    func: &str,
    params: P,
) -> Result<Vec<u8>, ethabi::Error>
where
    P: Tokenize,
    T: Transport,
{
    contract
        .abi()
        .function(func)
        .and_then(|function| function.encode_input(&params.into_tokens()))
}

pub fn encode_erc20_allowance(owner: Address, spender: Address) -> Result<Vec<u8>, ethabi::Error> {
    contract_encode(&ERC20_CONTRACT_TEMPLATE, "allowance", (owner, spender))
}

pub fn encode_erc20_approve(spender: Address, amount: U256) -> Result<Vec<u8>, ethabi::Error> {
    contract_encode(&ERC20_CONTRACT_TEMPLATE, "approve", (spender, amount))
}

/// Revocation is approve-to-zero on the standard interface
pub fn encode_erc20_revoke(spender: Address) -> Result<Vec<u8>, ethabi::Error> {
    encode_erc20_approve(spender, U256::zero())
}

pub fn encode_batch_check_allowances(
    owner: Address,
    tokens: Vec<Address>,
    spenders: Vec<Address>,
) -> Result<Vec<u8>, ethabi::Error> {
    contract_encode(
        &BATCH_REVOKE_CONTRACT_TEMPLATE,
        "batchCheckAllowances",
        (owner, tokens, spenders),
    )
}

pub fn encode_batch_revoke(
    tokens: Vec<Address>,
    spenders: Vec<Address>,
) -> Result<Vec<u8>, ethabi::Error> {
    contract_encode(
        &BATCH_REVOKE_CONTRACT_TEMPLATE,
        "batchRevoke",
        (tokens, spenders),
    )
}

pub fn encode_revoke(token: Address, spender: Address) -> Result<Vec<u8>, ethabi::Error> {
    contract_encode(&BATCH_REVOKE_CONTRACT_TEMPLATE, "revoke", (token, spender))
}

pub fn encode_max_batch_size() -> Result<Vec<u8>, ethabi::Error> {
    contract_encode(&BATCH_REVOKE_CONTRACT_TEMPLATE, "MAX_BATCH_SIZE", ())
}

/// Decodes the uint256[] returned by batchCheckAllowances
pub fn decode_allowance_array(bytes: &[u8]) -> Result<Vec<U256>, GuardError> {
    let decoded = ethabi::decode(
        &[ethabi::ParamType::Array(Box::new(ethabi::ParamType::Uint(
            256,
        )))],
        bytes,
    )
    .map_err(|err| {
        err_custom_create!(
            "Failed to decode allowance array, check if proper contract and contract method is called: {}",
            err
        )
    })?;

    //this unwrap chain is safe because we know the types from the decode call
    Ok(decoded[0]
        .clone()
        .into_array()
        .unwrap()
        .into_iter()
        .map(|token| token.into_uint().unwrap())
        .collect())
}
