use crate::error::GuardError;
use crate::registry::ProtocolRegistry;
use crate::risk::{RiskEngine, DEFAULT_UNLIMITED_THRESHOLD};
use crate::{err_custom_create, err_from};
use serde::Deserialize;
use std::collections::btree_map::BTreeMap as Map;
use std::path::Path;
use tokio::fs;
use web3::types::{Address, U256};

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub chain: Map<String, Chain>,
    #[serde(default)]
    pub classifier: ClassifierSettings,
    #[serde(default)]
    pub registry: RegistrySettings,
    pub provider: ProviderSettings,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Chain {
    pub chain_name: String,
    pub chain_id: u64,
    pub rpc_endpoints: Vec<String>,
    pub currency_symbol: String,
    ///gwei
    pub priority_fee: Option<f64>,
    ///gwei
    pub max_fee_per_gas: Option<f64>,
    ///address of the deployed batch-revoke contract, when a deployment
    ///prefers the on-chain batch path
    pub batch_revoke_contract: Option<Address>,
    #[serde(default = "default_confirmation_blocks")]
    pub confirmation_blocks: u64,
    pub block_explorer_url: Option<String>,
}

fn default_confirmation_blocks() -> u64 {
    1
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ClassifierSettings {
    ///decimal string of base units above which an allowance counts as
    ///effectively unlimited
    #[serde(default = "default_unlimited_threshold")]
    pub unlimited_threshold: String,
}

fn default_unlimited_threshold() -> String {
    DEFAULT_UNLIMITED_THRESHOLD.to_string()
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        ClassifierSettings {
            unlimited_threshold: default_unlimited_threshold(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "kebab-case")]
pub struct RegistrySettings {
    ///extra address -> protocol name entries merged over the builtin table
    #[serde(default)]
    pub known_protocols: Map<String, String>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ProviderSettings {
    pub base_url: String,
    ///chain slug the provider expects, i.e. "bsc"
    pub chain: String,
}

impl Config {
    pub fn load_from_str(str: &str) -> Result<Self, GuardError> {
        match toml::from_str(str) {
            Ok(config) => Ok(config),
            Err(e) => Err(err_custom_create!("Failed to parse toml {}: {}", str, e)),
        }
    }

    pub async fn load<P: AsRef<Path> + std::fmt::Display>(path: P) -> Result<Self, GuardError> {
        let contents = fs::read_to_string(&path).await.map_err(err_from!())?;
        match toml::from_str(&contents) {
            Ok(config) => Ok(config),
            Err(e) => Err(err_custom_create!("Failed to parse toml {}: {}", path, e)),
        }
    }

    pub fn get_chain(&self, chain_name: &str) -> Result<&Chain, GuardError> {
        self.chain
            .get(chain_name)
            .ok_or(err_custom_create!(
                "Chain {} not found in config file",
                chain_name
            ))
    }

    pub fn build_registry(&self) -> ProtocolRegistry {
        ProtocolRegistry::with_overrides(
            self.registry
                .known_protocols
                .iter()
                .map(|(addr, name)| (addr.as_str(), name.as_str())),
        )
    }

    pub fn build_risk_engine(&self) -> Result<RiskEngine, GuardError> {
        let threshold = U256::from_dec_str(&self.classifier.unlimited_threshold)
            .map_err(err_from!())?;
        Ok(RiskEngine::with_threshold(self.build_registry(), threshold))
    }
}
