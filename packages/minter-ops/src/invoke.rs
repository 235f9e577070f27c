//! Remote invoker: encode → submit → decode for one deployed contract.

use alloy::primitives::{Address, B256, U256};
use minter_abi::{decode_result, encode_call, encode_constructor, CallResult, DynSolValue, Schema};
use std::sync::Arc;
use tracing::{debug, info};

use crate::{Error, Execution, Ledger, Query, Receipt, Session};

/// Budget for a read-only query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryBudget {
    pub gas: u64,
    pub max_cost: Option<U256>,
}

impl QueryBudget {
    pub const fn gas(gas: u64) -> Self {
        Self {
            gas,
            max_cost: None,
        }
    }
}

impl Default for QueryBudget {
    fn default() -> Self {
        Self::gas(100_000)
    }
}

/// Budget for a state-changing execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecBudget {
    pub gas: u64,
    pub max_fee: Option<U256>,
}

impl ExecBudget {
    pub const fn gas(gas: u64) -> Self {
        Self { gas, max_fee: None }
    }
}

/// Result of one submitted execution. Never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub status: String,
    pub tx_hash: Option<B256>,
    pub result: CallResult,
    /// `result` was decoded from a dry run, not from the mined transaction.
    pub simulated: bool,
}

/// A deployed contract and the interface description used to talk to it.
#[derive(Debug, Clone)]
pub struct ContractHandle {
    schema: Arc<Schema>,
    address: Address,
}

impl ContractHandle {
    pub fn new(schema: Arc<Schema>, address: Address) -> Self {
        Self { schema, address }
    }

    /// Deploy `bytecode` with ABI-encoded constructor `args`.
    pub async fn deploy<L: Ledger>(
        session: &Session<L>,
        schema: Arc<Schema>,
        bytecode: &[u8],
        args: &[DynSolValue],
        gas: u64,
    ) -> Result<(Self, Receipt), Error> {
        let mut code = bytecode.to_vec();
        code.extend(encode_constructor(&schema, args)?);
        info!(bytes = code.len(), gas, "Deploying contract");
        let receipt = session.ledger().deploy(code, gas).await?;
        let address = receipt
            .contract_address
            .ok_or_else(|| Error::remote(receipt.status.clone(), "no contract address in receipt"))?;
        info!(%address, status = %receipt.status, "Contract created");
        Ok((Self::new(schema, address), receipt))
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Read-only call; no state change.
    pub async fn query<L: Ledger>(
        &self,
        session: &Session<L>,
        function: &str,
        args: &[DynSolValue],
        budget: QueryBudget,
    ) -> Result<CallResult, Error> {
        let payload = encode_call(&self.schema, function, args)?;
        debug!(function, contract = %self.address, gas = budget.gas, "Query");
        let query = Query {
            from: session.operator().address(),
            target: self.address,
            payload,
            gas: budget.gas,
            max_cost: budget.max_cost,
        };
        let bytes = session.ledger().query(&query).await?;
        Ok(decode_result(&self.schema, function, &bytes)?)
    }

    /// State-changing call, optionally transferring `value`. Waits for the
    /// receipt; the returned bytes are decoded against the function's outputs.
    pub async fn execute<L: Ledger>(
        &self,
        session: &Session<L>,
        function: &str,
        args: &[DynSolValue],
        budget: ExecBudget,
        value: U256,
    ) -> Result<Outcome, Error> {
        let payload = encode_call(&self.schema, function, args)?;
        debug!(function, contract = %self.address, gas = budget.gas, %value, "Execute");
        let execution = Execution {
            target: self.address,
            payload,
            gas: budget.gas,
            max_fee: budget.max_fee,
            value,
        };
        let receipt = session.ledger().execute(&execution).await?;
        if !receipt.is_success() {
            return Err(Error::remote(receipt.status, format!("`{function}` was not applied")));
        }
        let result = decode_result(&self.schema, function, &receipt.output)?;
        debug!(function, status = %receipt.status, simulated = receipt.simulated, "Execute complete");
        Ok(Outcome {
            status: receipt.status,
            tx_hash: receipt.tx_hash,
            result,
            simulated: receipt.simulated,
        })
    }
}
