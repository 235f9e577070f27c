//! Tooling configuration.
//!
//! Read once at startup from an optional `minter.toml` and then from the
//! environment, using the same variable names as the `.env` files the
//! deployment scripts have always used (`PRIVATE_KEY`, `CONTRACT_NAME`, ...).
//! Every field is optional at load time; the `require_*` accessors fail with
//! [`Error::Config`] and are called before the first remote call.

use alloy::primitives::utils::parse_ether;
use alloy::primitives::{Address, U256};
use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;
use url::Url;

use crate::{Error, Operator};

/// Target network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Test,
    Main,
    Local,
}

impl Network {
    /// Public JSON-RPC relay for the network.
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Network::Test => "https://testnet.hashio.io/api",
            Network::Main => "https://mainnet.hashio.io/api",
            Network::Local => "http://localhost:7546",
        }
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "TEST" => Ok(Network::Test),
            "MAIN" => Ok(Network::Main),
            "LOCAL" => Ok(Network::Local),
            other => Err(Error::Config(format!(
                "ENVIRONMENT must be MAIN, TEST or LOCAL, got `{other}`"
            ))),
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Network::Test => "TESTNET",
            Network::Main => "MAINNET",
            Network::Local => "LOCAL",
        };
        f.write_str(s)
    }
}

/// Configuration for the loaders and the live test suite.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub environment: Option<String>,

    #[serde(default)]
    pub rpc_url: Option<String>,

    #[serde(default)]
    pub private_key: Option<String>,

    #[serde(default)]
    pub contract_name: Option<String>,

    #[serde(default)]
    pub contract_id: Option<String>,

    #[serde(default = "defaults::artifacts_dir")]
    pub artifacts_dir: String,

    /// Ether-denominated amount attached to `initialiseNFTMint`.
    #[serde(default = "defaults::mint_payment")]
    pub mint_payment: String,

    #[serde(default)]
    pub lazy_contract: Option<String>,

    #[serde(default)]
    pub lazy_token: Option<String>,

    #[serde(default = "defaults::lazy_burn_perc")]
    pub lazy_burn_perc: u64,

    #[serde(default = "defaults::deploy_gas")]
    pub deploy_gas: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: None,
            rpc_url: None,
            private_key: None,
            contract_name: None,
            contract_id: None,
            artifacts_dir: defaults::artifacts_dir(),
            mint_payment: defaults::mint_payment(),
            lazy_contract: None,
            lazy_token: None,
            lazy_burn_perc: defaults::lazy_burn_perc(),
            deploy_gas: defaults::deploy_gas(),
        }
    }
}

impl Config {
    /// Load from `minter.toml` (optional) overlaid with environment variables.
    pub fn load() -> Result<Self, Error> {
        config::Config::builder()
            .add_source(config::File::with_name("minter").required(false))
            .add_source(config::Environment::default().try_parsing(true))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| Error::Config(e.to_string()))
    }

    pub fn require_network(&self) -> Result<Network, Error> {
        required(&self.environment, "ENVIRONMENT")?.parse()
    }

    pub fn require_operator(&self) -> Result<Operator, Error> {
        Operator::from_private_key(required(&self.private_key, "PRIVATE_KEY")?)
    }

    pub fn require_contract_name(&self) -> Result<&str, Error> {
        required(&self.contract_name, "CONTRACT_NAME")
    }

    pub fn require_contract_address(&self) -> Result<Address, Error> {
        parse_address(required(&self.contract_id, "CONTRACT_ID")?, "CONTRACT_ID")
    }

    pub fn require_lazy_contract(&self) -> Result<Address, Error> {
        parse_address(required(&self.lazy_contract, "LAZY_CONTRACT")?, "LAZY_CONTRACT")
    }

    pub fn require_lazy_token(&self) -> Result<Address, Error> {
        parse_address(required(&self.lazy_token, "LAZY_TOKEN")?, "LAZY_TOKEN")
    }

    /// Explicit `RPC_URL`, or the network's public relay.
    pub fn require_rpc_url(&self) -> Result<Url, Error> {
        let raw = match self.rpc_url.as_deref().filter(|u| !u.is_empty()) {
            Some(url) => url.to_string(),
            None => self.require_network()?.default_rpc_url().to_string(),
        };
        Url::parse(&raw).map_err(|e| Error::Config(format!("invalid RPC_URL `{raw}`: {e}")))
    }

    /// `<ARTIFACTS_DIR>/<CONTRACT_NAME>.sol/<CONTRACT_NAME>.json`
    pub fn require_artifact_path(&self) -> Result<PathBuf, Error> {
        let name = self.require_contract_name()?;
        Ok(minter_abi::Artifact::path_for(
            std::path::Path::new(&self.artifacts_dir),
            name,
        ))
    }

    pub fn mint_payment_wei(&self) -> Result<U256, Error> {
        parse_ether(self.mint_payment.trim()).map_err(|e| {
            Error::Config(format!("invalid MINT_PAYMENT `{}`: {e}", self.mint_payment))
        })
    }
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, Error> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::Config(format!("{name} must be set (environment or minter.toml)")))
}

fn parse_address(raw: &str, name: &str) -> Result<Address, Error> {
    raw.parse::<Address>()
        .map_err(|e| Error::Config(format!("invalid {name} `{raw}`: {e}")))
}

mod defaults {
    pub fn artifacts_dir() -> String {
        "./artifacts/contracts".into()
    }

    pub fn mint_payment() -> String {
        "50".into()
    }

    pub fn lazy_burn_perc() -> u64 {
        25
    }

    pub fn deploy_gas() -> u64 {
        1_200_000
    }
}
