//! Shared helpers and `ScriptedLedger`, an in-memory stand-in for a node
//! hosting one minter contract.
//!
//! The scripted contract decodes every payload against the fixture ABI,
//! answers getters from its own state and enforces owner-only access on
//! every state-changing function, so the adapter's encode/submit/decode path
//! runs for real without a network.

use alloy::dyn_abi::{DynSolType, DynSolValue};
use alloy::primitives::{keccak256, Address, B256, I256, U256};
use async_trait::async_trait;
use minter_abi::{decode_call, encode_outputs, Artifact, Schema};
use minter_ops::minter::MinterContract;
use minter_ops::{Error, Execution, Ledger, Network, Operator, Query, Receipt, Session};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Calls below this gas limit fail with `INSUFFICIENT_GAS`.
pub const MIN_GAS: u64 = 21_000;
/// Fixed price used for fee-cap checks (1 gwei).
pub const GAS_PRICE: u64 = 1_000_000_000;
pub const LAZY_BURN_PERC: u64 = 25;
pub const DEPLOY_GAS: u64 = 1_200_000;

pub fn minter_address() -> Address {
    Address::repeat_byte(0xc0)
}

pub fn created_token_address() -> Address {
    Address::repeat_byte(0x70)
}

pub fn lsct_address() -> Address {
    Address::repeat_byte(0x15)
}

pub fn lazy_token_address() -> Address {
    Address::repeat_byte(0x1a)
}

/// Whole units of the native currency, in wei.
pub fn ether(amount: u64) -> U256 {
    U256::from(amount) * U256::from(10u64).pow(U256::from(18u64))
}

pub fn fixture_path() -> PathBuf {
    Artifact::path_for(
        &Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures"),
        "MinterContract",
    )
}

pub fn load_fixture() -> anyhow::Result<Artifact> {
    Ok(Artifact::load(&fixture_path())?)
}

/// Session against a fresh scripted ledger, signed by `owner`.
pub fn scripted_session(owner: &Operator) -> anyhow::Result<Session<ScriptedLedger>> {
    let artifact = load_fixture()?;
    let ledger = ScriptedLedger::new(&artifact, owner);
    Ok(Session::new(ledger, owner.clone(), Network::Local))
}

/// Deploy the fixture minter the way `load-bytecode` does, paying 50 per mint.
pub async fn deploy_minter(session: &Session<ScriptedLedger>) -> anyhow::Result<MinterContract> {
    let artifact = load_fixture()?;
    let (minter, receipt) = MinterContract::deploy(
        session,
        &artifact,
        lsct_address(),
        lazy_token_address(),
        LAZY_BURN_PERC,
        DEPLOY_GAS,
        ether(50),
    )
    .await?;
    assert!(receipt.is_success(), "deployment failed: {}", receipt.status);
    Ok(minter)
}

/// One applied execution as the scripted contract saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub from: Address,
    pub function: String,
    pub args: Vec<DynSolValue>,
    pub gas: u64,
    pub value: U256,
}

#[derive(Default)]
struct MinterState {
    address: Option<Address>,
    runtime_code: Vec<u8>,
    owner: Address,
    getters: HashMap<String, DynSolValue>,
    whitelist: HashSet<Address>,
    cid: String,
    metadata: Vec<String>,
    token: Option<Address>,
    balances: HashMap<Address, U256>,
    executions: Vec<RecordedCall>,
    attempts: usize,
    failures: HashMap<usize, String>,
    nonce: u64,
    simulate_outputs: bool,
}

pub struct ScriptedLedger {
    schema: Arc<Schema>,
    creation_code: Vec<u8>,
    operator: Address,
    state: Mutex<MinterState>,
}

impl ScriptedLedger {
    pub fn new(artifact: &Artifact, operator: &Operator) -> Self {
        Self {
            schema: Arc::new(artifact.schema.clone()),
            creation_code: artifact.bytecode.clone(),
            operator: operator.address(),
            state: Mutex::new(MinterState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, MinterState> {
        self.state.lock().expect("scripted ledger state poisoned")
    }

    pub fn fund(&self, account: Address, amount: U256) {
        *self.state().balances.entry(account).or_default() += amount;
    }

    /// Fail the `index`-th execution attempt (0-based, deployments excluded)
    /// with `status`, leaving contract state untouched.
    pub fn fail_execution(&self, index: usize, status: &str) {
        self.state().failures.insert(index, status.to_string());
    }

    /// Report receipt outputs as dry-run results, like a node without call tracing.
    pub fn simulate_outputs(&self, simulated: bool) {
        self.state().simulate_outputs = simulated;
    }

    pub fn executions(&self) -> Vec<RecordedCall> {
        self.state().executions.clone()
    }

    pub fn executions_of(&self, function: &str) -> Vec<RecordedCall> {
        self.state()
            .executions
            .iter()
            .filter(|c| c.function == function)
            .cloned()
            .collect()
    }

    pub fn metadata(&self) -> Vec<String> {
        self.state().metadata.clone()
    }

    pub fn cid(&self) -> String {
        self.state().cid.clone()
    }

    pub fn is_whitelisted(&self, account: Address) -> bool {
        self.state().whitelist.contains(&account)
    }

    fn check_budget(gas: u64, cap: Option<U256>) -> Result<(), Error> {
        if gas < MIN_GAS {
            return Err(Error::remote("INSUFFICIENT_GAS", format!("gas {gas} below {MIN_GAS}")));
        }
        if let Some(cap) = cap {
            let cost = U256::from(gas) * U256::from(GAS_PRICE);
            if cost > cap {
                return Err(Error::remote(
                    "INSUFFICIENT_TX_FEE",
                    format!("costs {cost}, cap is {cap}"),
                ));
            }
        }
        Ok(())
    }
}

fn revert(reason: &str) -> Error {
    Error::remote("CONTRACT_REVERT_EXECUTED", reason)
}

fn bad_argument(function: &str) -> Error {
    Error::remote("REJECTED", format!("unexpected argument to `{function}`"))
}

fn next_receipt(state: &mut MinterState, output: Vec<u8>, contract: Option<Address>) -> Receipt {
    state.nonce += 1;
    Receipt {
        status: Receipt::SUCCESS.to_string(),
        tx_hash: Some(keccak256(state.nonce.to_be_bytes())),
        output,
        simulated: state.simulate_outputs,
        contract_address: contract,
        gas_used: MIN_GAS,
    }
}

fn debit(state: &mut MinterState, from: Address, amount: U256) -> Result<(), Error> {
    let balance = state.balances.entry(from).or_default();
    if *balance < amount {
        return Err(Error::remote(
            "INSUFFICIENT_PAYER_BALANCE",
            format!("{from} holds {balance}, needs {amount}"),
        ));
    }
    *balance -= amount;
    Ok(())
}

/// Default for a getter nobody has set.
fn zero_value(ty: &DynSolType) -> DynSolValue {
    match ty {
        DynSolType::Bool => DynSolValue::Bool(false),
        DynSolType::Int(bits) => DynSolValue::Int(I256::ZERO, *bits),
        DynSolType::Uint(bits) => DynSolValue::Uint(U256::ZERO, *bits),
        DynSolType::FixedBytes(size) => DynSolValue::FixedBytes(B256::ZERO, *size),
        DynSolType::Address => DynSolValue::Address(Address::ZERO),
        DynSolType::Bytes => DynSolValue::Bytes(Vec::new()),
        DynSolType::String => DynSolValue::String(String::new()),
        DynSolType::Array(_) => DynSolValue::Array(Vec::new()),
        DynSolType::FixedArray(inner, len) => DynSolValue::FixedArray(vec![zero_value(inner); *len]),
        DynSolType::Tuple(fields) => DynSolValue::Tuple(fields.iter().map(zero_value).collect()),
        // Function pointers are not part of the fixture ABI.
        _ => DynSolValue::Uint(U256::ZERO, 256),
    }
}

impl MinterState {
    fn store(&mut self, getter: &str, value: &DynSolValue) -> Vec<DynSolValue> {
        self.getters.insert(getter.to_string(), value.clone());
        Vec::new()
    }

    fn toggle(&mut self, getter: &str, value: &DynSolValue, default: bool) -> Vec<DynSolValue> {
        let old = self
            .getters
            .get(getter)
            .and_then(|v| v.as_bool())
            .unwrap_or(default);
        self.getters.insert(getter.to_string(), value.clone());
        vec![DynSolValue::Bool(value.as_bool() != Some(old))]
    }

    fn apply(
        &mut self,
        function: &str,
        args: &[DynSolValue],
        value: U256,
    ) -> Result<Vec<DynSolValue>, Error> {
        let arg = |i: usize| args.get(i).ok_or_else(|| bad_argument(function));
        match function {
            "resetToken" => {
                self.metadata.clear();
                self.token = None;
                Ok(Vec::new())
            }
            "addMetadata" => {
                if self.token.is_some() {
                    return Err(revert("token already initialised"));
                }
                let batch = arg(0)?.as_array().ok_or_else(|| bad_argument(function))?;
                for item in batch {
                    let item = item.as_str().ok_or_else(|| bad_argument(function))?;
                    self.metadata.push(item.to_string());
                }
                Ok(vec![DynSolValue::Uint(U256::from(self.metadata.len()), 256)])
            }
            "initialiseNFTMint" => {
                if self.token.is_some() {
                    return Err(revert("token already initialised"));
                }
                if self.metadata.is_empty() {
                    return Err(revert("no metadata loaded"));
                }
                if value.is_zero() {
                    return Err(revert("mint payment required"));
                }
                let token = created_token_address();
                self.token = Some(token);
                Ok(vec![
                    DynSolValue::Address(token),
                    DynSolValue::Uint(U256::from(self.metadata.len()), 256),
                ])
            }
            "updatePauseStatus" => Ok(self.toggle("getMintPaused", arg(0)?, true)),
            "updateContractPaysLazy" => Ok(self.toggle("getPayLazyFromSC", arg(0)?, false)),
            "updateCost" => {
                self.store("getBasePriceHbar", arg(0)?);
                Ok(self.store("getBasePriceLazy", arg(1)?))
            }
            "updateLazyBurnPercentage" => Ok(self.store("getLazyBurnPercentage", arg(0)?)),
            "updateMaxMint" => Ok(self.store("getMaxMint", arg(0)?)),
            "updateCooldown" => Ok(self.store("getCooldownPeriod", arg(0)?)),
            "updateMintStartDate" => Ok(self.store("getMintStartTime", arg(0)?)),
            "updateLSCT" => Ok(self.store("getLSCT", arg(0)?)),
            "updateLazyToken" => Ok(self.store("getLazyToken", arg(0)?)),
            "addToWhitelist" | "removeFromWhitelist" => {
                let account = arg(0)?.as_address().ok_or_else(|| bad_argument(function))?;
                if function == "addToWhitelist" {
                    self.whitelist.insert(account);
                } else {
                    self.whitelist.remove(&account);
                }
                Ok(Vec::new())
            }
            "updateCID" => {
                self.cid = arg(0)?.as_str().ok_or_else(|| bad_argument(function))?.to_string();
                Ok(Vec::new())
            }
            "updateMetadataArray" => {
                let items = arg(0)?.as_array().ok_or_else(|| bad_argument(function))?;
                self.metadata = items
                    .iter()
                    .map(|v| v.as_str().map(str::to_string).ok_or_else(|| bad_argument(function)))
                    .collect::<Result<_, _>>()?;
                Ok(Vec::new())
            }
            "transferHbar" => {
                let receiver = arg(0)?.as_address().ok_or_else(|| bad_argument(function))?;
                let (amount, _) = arg(1)?.as_uint().ok_or_else(|| bad_argument(function))?;
                let contract = self.address.unwrap_or_default();
                if self.balances.get(&contract).copied().unwrap_or_default() < amount {
                    return Err(revert("contract balance too low"));
                }
                debit(self, contract, amount)?;
                *self.balances.entry(receiver).or_default() += amount;
                Ok(Vec::new())
            }
            "transferHTS" => Ok(Vec::new()),
            other => Err(Error::remote("REJECTED", format!("`{other}` is not scripted"))),
        }
    }
}

#[async_trait]
impl Ledger for ScriptedLedger {
    fn set_operator(&mut self, operator: &Operator) -> Result<(), Error> {
        self.operator = operator.address();
        Ok(())
    }

    async fn query(&self, query: &Query) -> Result<Vec<u8>, Error> {
        Self::check_budget(query.gas, query.max_cost)?;
        let state = self.state();
        if state.address != Some(query.target) {
            return Err(Error::remote("INVALID_CONTRACT_ID", format!("{}", query.target)));
        }
        let call = decode_call(&self.schema, &query.payload)?;
        let descriptor = self.schema.function(&call.function)?;
        let outputs: Vec<DynSolValue> = match call.function.as_str() {
            "getMetadataArray" => {
                if query.from != state.owner {
                    return Err(revert("Ownable: caller is not the owner"));
                }
                vec![DynSolValue::Array(
                    state.metadata.iter().cloned().map(DynSolValue::String).collect(),
                )]
            }
            name => descriptor
                .outputs()
                .iter()
                .map(|o| {
                    state
                        .getters
                        .get(name)
                        .cloned()
                        .unwrap_or_else(|| zero_value(&o.ty))
                })
                .collect(),
        };
        Ok(encode_outputs(descriptor, &outputs)?)
    }

    async fn execute(&self, execution: &Execution) -> Result<Receipt, Error> {
        let mut state = self.state();
        let attempt = state.attempts;
        state.attempts += 1;
        Self::check_budget(execution.gas, execution.max_fee)?;
        if let Some(status) = state.failures.remove(&attempt) {
            return Err(Error::remote(status, format!("scripted failure at attempt {attempt}")));
        }
        let Some(contract) = state.address.filter(|a| *a == execution.target) else {
            return Err(Error::remote("INVALID_CONTRACT_ID", format!("{}", execution.target)));
        };
        let call = decode_call(&self.schema, &execution.payload)?;
        let descriptor = self.schema.function(&call.function)?;
        if self.operator != state.owner {
            return Err(revert("Ownable: caller is not the owner"));
        }
        if !execution.value.is_zero() && !descriptor.is_payable() {
            return Err(revert("function is not payable"));
        }
        let available = state.balances.get(&self.operator).copied().unwrap_or_default();
        if available < execution.value {
            return Err(Error::remote(
                "INSUFFICIENT_PAYER_BALANCE",
                format!("{} holds {available}", self.operator),
            ));
        }

        let outputs = state.apply(&call.function, &call.args, execution.value)?;
        let output = encode_outputs(descriptor, &outputs)?;
        debit(&mut state, self.operator, execution.value)?;
        *state.balances.entry(contract).or_default() += execution.value;

        state.executions.push(RecordedCall {
            from: self.operator,
            function: call.function,
            args: call.args,
            gas: execution.gas,
            value: execution.value,
        });
        Ok(next_receipt(&mut state, output, None))
    }

    async fn deploy(&self, code: Vec<u8>, gas: u64) -> Result<Receipt, Error> {
        Self::check_budget(gas, None)?;
        let Some(encoded_args) = code.strip_prefix(self.creation_code.as_slice()) else {
            return Err(Error::remote("REJECTED", "unknown creation code"));
        };
        let descriptor = self
            .schema
            .constructor()
            .ok_or_else(|| Error::remote("REJECTED", "fixture has no constructor"))?;
        let layout = DynSolType::Tuple(descriptor.inputs().iter().map(|p| p.ty.clone()).collect());
        let decoded = layout
            .abi_decode_params(encoded_args)
            .map_err(|e| revert(&format!("constructor arguments: {e}")))?;
        let DynSolValue::Tuple(args) = decoded else {
            return Err(revert("constructor arguments are not a tuple"));
        };
        let [lsct, lazy, burn] = args.as_slice() else {
            return Err(revert("constructor takes three arguments"));
        };

        let mut state = self.state();
        let address = minter_address();
        state.address = Some(address);
        state.owner = self.operator;
        state.runtime_code = self.creation_code.clone();
        state.store("getLSCT", lsct);
        state.store("getLazyToken", lazy);
        state.store("getLazyBurnPercentage", burn);
        state.store("getMintPaused", &DynSolValue::Bool(true));
        Ok(next_receipt(&mut state, Vec::new(), Some(address)))
    }

    async fn code_at(&self, account: Address) -> Result<Vec<u8>, Error> {
        let state = self.state();
        if state.address == Some(account) {
            Ok(state.runtime_code.clone())
        } else {
            Ok(Vec::new())
        }
    }

    async fn balance(&self, account: Address) -> Result<U256, Error> {
        Ok(self.state().balances.get(&account).copied().unwrap_or_default())
    }

    async fn transfer(&self, to: Address, amount: U256) -> Result<Receipt, Error> {
        let mut state = self.state();
        debit(&mut state, self.operator, amount)?;
        *state.balances.entry(to).or_default() += amount;
        Ok(next_receipt(&mut state, Vec::new(), None))
    }
}
