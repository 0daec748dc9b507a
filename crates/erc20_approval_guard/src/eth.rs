use crate::contracts::{
    decode_allowance_array, encode_batch_check_allowances, encode_batch_revoke,
    encode_erc20_allowance, encode_erc20_approve, encode_max_batch_size,
};
use crate::error::{BatchPreconditionError, GuardError, LedgerError};
use crate::operator::{TokenLedger, MAX_BATCH_SIZE};
use crate::{err_create, err_custom_create, err_from};
use async_trait::async_trait;
use secp256k1::{PublicKey, SecretKey};
use sha3::Digest;
use sha3::Keccak256;
use web3::transports::Http;
use web3::types::{Address, Bytes, CallRequest, TransactionParameters, H256, U256};
use web3::Web3;

pub fn get_eth_addr_from_secret(secret_key: &SecretKey) -> Address {
    Address::from_slice(
        &Keccak256::digest(
            &PublicKey::from_secret_key(&secp256k1::Secp256k1::new(), secret_key)
                .serialize_uncompressed()[1..65],
        )
        .as_slice()[12..],
    )
}

/// Token ledger backed by a web3 provider. Reads go through eth_call,
/// revocations are signed approve-to-zero transactions sent from the
/// key held here.
pub struct Web3TokenLedger {
    web3: Web3<Http>,
    secret_key: Option<SecretKey>,
    chain_id: u64,
    max_fee_per_gas: Option<U256>,
    priority_fee: Option<U256>,
}

impl Web3TokenLedger {
    /// Ledger that can only answer allowance queries
    pub fn read_only(web3: Web3<Http>, chain_id: u64) -> Self {
        Web3TokenLedger {
            web3,
            secret_key: None,
            chain_id,
            max_fee_per_gas: None,
            priority_fee: None,
        }
    }

    pub fn with_signer(
        web3: Web3<Http>,
        secret_key: SecretKey,
        chain_id: u64,
        max_fee_per_gas: Option<U256>,
        priority_fee: Option<U256>,
    ) -> Self {
        Web3TokenLedger {
            web3,
            secret_key: Some(secret_key),
            chain_id,
            max_fee_per_gas,
            priority_fee,
        }
    }

    pub fn signer_address(&self) -> Option<Address> {
        self.secret_key.as_ref().map(get_eth_addr_from_secret)
    }
}

#[async_trait]
impl TokenLedger for Web3TokenLedger {
    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, LedgerError> {
        let data = encode_erc20_allowance(owner, spender)
            .map_err(|err| LedgerError::Rpc(err.to_string()))?;
        let call_request = CallRequest {
            from: Some(owner),
            to: Some(token),
            data: Some(Bytes(data)),
            ..Default::default()
        };
        let res = self
            .web3
            .eth()
            .call(call_request, None)
            .await
            .map_err(|err| LedgerError::Rpc(err.to_string()))?;
        // an address without code answers with an empty body
        if res.0.len() != 32 {
            return Err(LedgerError::NoCode(token));
        }
        let allowance = U256::from_big_endian(&res.0);
        log::debug!(
            "Check allowance: owner: {:?}, token: {:?}, spender: {:?}, allowance: {:?}",
            owner,
            token,
            spender,
            allowance
        );
        Ok(allowance)
    }

    async fn approve(
        &self,
        owner: Address,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        let Some(secret_key) = self.secret_key.as_ref() else {
            return Err(LedgerError::Reverted(
                "no signing key configured".to_string(),
            ));
        };
        if owner != get_eth_addr_from_secret(secret_key) {
            return Err(LedgerError::Reverted(format!(
                "owner {owner:#x} does not match signing key"
            )));
        }
        let data = encode_erc20_approve(spender, amount)
            .map_err(|err| LedgerError::Rpc(err.to_string()))?;
        let tx_object = TransactionParameters {
            to: Some(token),
            data: Bytes(data),
            gas: U256::from(100_000),
            chain_id: Some(self.chain_id),
            max_fee_per_gas: self.max_fee_per_gas,
            max_priority_fee_per_gas: self.priority_fee,
            ..Default::default()
        };
        let signed = self
            .web3
            .accounts()
            .sign_transaction(tx_object, secret_key)
            .await
            .map_err(|err| LedgerError::Rpc(err.to_string()))?;
        let tx_hash = self
            .web3
            .eth()
            .send_raw_transaction(signed.raw_transaction)
            .await
            .map_err(|err| LedgerError::Rpc(err.to_string()))?;
        log::info!(
            "Approve tx sent, token: {:#x}, spender: {:#x}, amount: {}, hash: {:#x}",
            token,
            spender,
            amount,
            tx_hash
        );
        Ok(())
    }
}

fn check_batch_shape(tokens: &[Address], spenders: &[Address]) -> Result<(), GuardError> {
    if tokens.len() != spenders.len() {
        return Err(err_create!(BatchPreconditionError::ArrayLengthMismatch {
            tokens: tokens.len(),
            spenders: spenders.len(),
        }));
    }
    if tokens.is_empty() {
        return Err(err_create!(BatchPreconditionError::EmptyArrays));
    }
    Ok(())
}

/// Reads many allowances in one eth_call through the deployed
/// batch-revoke contract. Shape checks run locally so the caller gets a
/// named error before anything goes on the wire.
pub async fn batch_check_allowances_on_chain(
    web3: &Web3<Http>,
    contract_address: Address,
    owner: Address,
    tokens: Vec<Address>,
    spenders: Vec<Address>,
) -> Result<Vec<U256>, GuardError> {
    check_batch_shape(&tokens, &spenders)?;
    let call_request = CallRequest {
        to: Some(contract_address),
        data: Some(Bytes(
            encode_batch_check_allowances(owner, tokens, spenders).map_err(err_from!())?,
        )),
        ..Default::default()
    };
    let res = web3
        .eth()
        .call(call_request, None)
        .await
        .map_err(err_from!())?;
    decode_allowance_array(&res.0)
}

/// Submits one batchRevoke transaction to the deployed contract. Size
/// and shape preconditions are validated locally before the transaction
/// is signed, mirroring the contract's own named errors.
pub async fn batch_revoke_on_chain(
    web3: &Web3<Http>,
    contract_address: Address,
    secret_key: &SecretKey,
    chain_id: u64,
    tokens: Vec<Address>,
    spenders: Vec<Address>,
) -> Result<H256, GuardError> {
    check_batch_shape(&tokens, &spenders)?;
    if tokens.len() > MAX_BATCH_SIZE {
        return Err(err_create!(BatchPreconditionError::BatchTooLarge {
            len: tokens.len(),
            max: MAX_BATCH_SIZE,
        }));
    }

    let count = tokens.len();
    let tx_object = TransactionParameters {
        to: Some(contract_address),
        data: Bytes(encode_batch_revoke(tokens, spenders).map_err(err_from!())?),
        // every item is one external approve call, leave generous room
        gas: U256::from(60_000_u64 * count as u64 + 50_000),
        chain_id: Some(chain_id),
        ..Default::default()
    };
    let signed = web3
        .accounts()
        .sign_transaction(tx_object, secret_key)
        .await
        .map_err(err_from!())?;
    let tx_hash = web3
        .eth()
        .send_raw_transaction(signed.raw_transaction)
        .await
        .map_err(err_from!())?;
    log::info!("batchRevoke tx sent, {} items, hash: {:#x}", count, tx_hash);
    Ok(tx_hash)
}

pub async fn max_batch_size_on_chain(
    web3: &Web3<Http>,
    contract_address: Address,
) -> Result<U256, GuardError> {
    let call_request = CallRequest {
        to: Some(contract_address),
        data: Some(Bytes(encode_max_batch_size().map_err(err_from!())?)),
        ..Default::default()
    };
    let res = web3
        .eth()
        .call(call_request, None)
        .await
        .map_err(err_from!())?;
    if res.0.len() != 32 {
        return Err(err_custom_create!(
            "Invalid response from MAX_BATCH_SIZE check {:?}",
            res
        ));
    }
    Ok(U256::from_big_endian(&res.0))
}
