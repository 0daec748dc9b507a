use async_trait::async_trait;
use erc20_approval_guard::operator::TokenLedger;
use erc20_approval_guard_common::error::LedgerError;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use web3::types::{Address, U256};

#[derive(Default)]
struct MockState {
    /// (token, owner, spender) -> allowance
    allowances: HashMap<(Address, Address, Address), U256>,
    no_code: HashSet<Address>,
    reverting: HashSet<Address>,
    approve_rejecting: HashSet<Address>,
}

/// In-memory stand-in for the allowance ledgers of external token
/// contracts, with scriptable per-token failure modes: addresses without
/// contract code, tokens whose calls revert, and tokens that reject
/// approve specifically.
#[derive(Default)]
pub struct MockTokenLedger {
    state: Mutex<MockState>,
}

impl MockTokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_allowance(&self, token: Address, owner: Address, spender: Address, value: U256) {
        self.state
            .lock()
            .unwrap()
            .allowances
            .insert((token, owner, spender), value);
    }

    pub fn allowance_of(&self, token: Address, owner: Address, spender: Address) -> U256 {
        self.state
            .lock()
            .unwrap()
            .allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or_default()
    }

    /// Marks an address as having no contract code at all
    pub fn mark_no_code(&self, token: Address) {
        self.state.lock().unwrap().no_code.insert(token);
    }

    /// Marks a token whose calls always revert
    pub fn mark_reverting(&self, token: Address) {
        self.state.lock().unwrap().reverting.insert(token);
    }

    /// Marks a token that answers allowance queries but rejects approve
    pub fn mark_approve_rejecting(&self, token: Address) {
        self.state.lock().unwrap().approve_rejecting.insert(token);
    }

    fn check_callable(state: &MockState, token: Address) -> Result<(), LedgerError> {
        if state.no_code.contains(&token) {
            return Err(LedgerError::NoCode(token));
        }
        if state.reverting.contains(&token) {
            return Err(LedgerError::Reverted("mock token reverted".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl TokenLedger for MockTokenLedger {
    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, LedgerError> {
        let state = self.state.lock().unwrap();
        Self::check_callable(&state, token)?;
        Ok(state
            .allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or_default())
    }

    async fn approve(
        &self,
        owner: Address,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        let mut state = self.state.lock().unwrap();
        Self::check_callable(&state, token)?;
        if state.approve_rejecting.contains(&token) {
            return Err(LedgerError::Reverted(
                "mock token rejected approve".to_string(),
            ));
        }
        state.allowances.insert((token, owner, spender), amount);
        Ok(())
    }
}
