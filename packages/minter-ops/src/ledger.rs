//! The ledger client seam: everything the tooling needs from the remote
//! ledger, behind one trait so the adapter can run against a live node or an
//! in-memory stand-in.

use alloy::primitives::{Address, B256, U256};
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;

use crate::Error;

/// Operator identity: the key that signs calls.
#[derive(Clone)]
pub struct Operator {
    signer: PrivateKeySigner,
}

impl Operator {
    /// Hex private key, with or without `0x`.
    pub fn from_private_key(key: &str) -> Result<Self, Error> {
        let signer = key
            .trim()
            .parse::<PrivateKeySigner>()
            .map_err(|e| Error::Config(format!("invalid PRIVATE_KEY: {e}")))?;
        Ok(Self { signer })
    }

    /// Fresh throwaway identity, e.g. a second caller in tests.
    pub fn random() -> Self {
        Self {
            signer: PrivateKeySigner::random(),
        }
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }
}

impl std::fmt::Debug for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Operator({})", self.address())
    }
}

/// Read-only call. `max_cost` caps `gas × gas price`; `None` means uncapped.
#[derive(Debug, Clone)]
pub struct Query {
    pub from: Address,
    pub target: Address,
    pub payload: Vec<u8>,
    pub gas: u64,
    pub max_cost: Option<U256>,
}

/// State-changing call. `max_fee` caps `gas × gas price`; `None` means uncapped.
#[derive(Debug, Clone)]
pub struct Execution {
    pub target: Address,
    pub payload: Vec<u8>,
    pub gas: u64,
    pub max_fee: Option<U256>,
    pub value: U256,
}

/// Final record of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub status: String,
    pub tx_hash: Option<B256>,
    /// Raw bytes returned by the called function.
    pub output: Vec<u8>,
    /// `output` was replayed against pre-submission state rather than read
    /// from the mined transaction.
    pub simulated: bool,
    /// Set for deployments.
    pub contract_address: Option<Address>,
    pub gas_used: u64,
}

impl Receipt {
    pub const SUCCESS: &'static str = "SUCCESS";

    pub fn is_success(&self) -> bool {
        self.status == Self::SUCCESS
    }
}

/// Remote ledger operations. Implementations own one authenticated client;
/// every successful `execute`, `deploy` or `transfer` changes remote state
/// exactly once and is not safe to blindly retry.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Sign subsequent calls with `operator`.
    fn set_operator(&mut self, operator: &Operator) -> Result<(), Error>;

    /// Returns the raw bytes of the call's return data.
    async fn query(&self, query: &Query) -> Result<Vec<u8>, Error>;

    /// Waits for the receipt. Rejections and reverts are [`Error::Remote`].
    async fn execute(&self, execution: &Execution) -> Result<Receipt, Error>;

    /// `code` is the creation bytecode with constructor arguments appended.
    async fn deploy(&self, code: Vec<u8>, gas: u64) -> Result<Receipt, Error>;

    /// Runtime code deployed at `account` (empty for plain accounts).
    async fn code_at(&self, account: Address) -> Result<Vec<u8>, Error>;

    async fn balance(&self, account: Address) -> Result<U256, Error>;

    /// Native value transfer from the operator.
    async fn transfer(&self, to: Address, amount: U256) -> Result<Receipt, Error>;
}
