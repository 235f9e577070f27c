//! JSON-RPC ledger client built on an `alloy` HTTP provider with a local
//! private-key wallet.
//!
//! The provider's fillers take care of nonce, chain id and gas pricing; no
//! retry policy is layered on top.
//!
//! Receipts carry no return data, so an execution's output is read back from
//! a `callTracer` trace of the mined transaction. Nodes without the debug
//! namespace fall back to the pre-submission dry run, flagged as simulated.

use alloy::network::{EthereumWallet, ReceiptResponse, TransactionBuilder};
use alloy::primitives::{Address, B256, U256};
use alloy::providers::ext::DebugApi;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::trace::geth::{
    GethDebugBuiltInTracerType, GethDebugTracerType, GethDebugTracingOptions, GethTrace,
};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use alloy::transports::TransportError;
use async_trait::async_trait;
use tracing::{debug, info, warn};
use url::Url;

use crate::{Config, Error, Execution, Ledger, Operator, Query, Receipt, Session};

/// Ledger client for an EVM JSON-RPC endpoint.
pub struct EvmLedger {
    url: Url,
    operator: Address,
    provider: DynProvider,
}

impl EvmLedger {
    pub fn connect(url: Url, operator: &Operator) -> Self {
        info!(rpc = %url, operator = %operator.address(), "Ledger client initialized");
        Self {
            provider: build_provider(&url, operator),
            operator: operator.address(),
            url,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Reject locally when `gas × current gas price` exceeds the cap.
    async fn check_fee_cap(&self, gas: u64, cap: Option<U256>) -> Result<(), Error> {
        let Some(cap) = cap else {
            return Ok(());
        };
        let price = self.provider.get_gas_price().await.map_err(remote_or_rpc)?;
        let cost = U256::from(gas) * U256::from(price);
        if cost > cap {
            return Err(Error::remote(
                "INSUFFICIENT_TX_FEE",
                format!("gas {gas} at {price} wei costs {cost}, cap is {cap}"),
            ));
        }
        Ok(())
    }

    async fn submit(&self, tx: TransactionRequest) -> Result<TransactionReceipt, Error> {
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(remote_or_rpc)?;
        let hash = *pending.tx_hash();
        debug!(%hash, "Transaction submitted, waiting for receipt");
        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| Error::Rpc(format!("receipt for {hash} unavailable: {e}")))?;
        if !receipt.status() {
            return Err(Error::remote("REVERTED", format!("transaction {hash}")));
        }
        Ok(receipt)
    }

    /// Return data of the mined transaction's top-level call.
    async fn mined_output(&self, hash: B256) -> Result<Vec<u8>, Error> {
        let options = GethDebugTracingOptions::default().with_tracer(
            GethDebugTracerType::BuiltInTracer(GethDebugBuiltInTracerType::CallTracer),
        );
        let trace = self
            .provider
            .debug_trace_transaction(hash, options)
            .await
            .map_err(remote_or_rpc)?;
        traced_output(trace)
            .ok_or_else(|| Error::Rpc(format!("trace for {hash} is not a call frame")))
    }
}

fn traced_output(trace: GethTrace) -> Option<Vec<u8>> {
    match trace {
        GethTrace::CallTracer(frame) => Some(frame.output.map(|o| o.to_vec()).unwrap_or_default()),
        _ => None,
    }
}

fn build_provider(url: &Url, operator: &Operator) -> DynProvider {
    let wallet = EthereumWallet::from(operator.signer().clone());
    ProviderBuilder::new()
        .wallet(wallet)
        .connect_http(url.clone())
        .erased()
}

/// JSON-RPC error responses come from the remote side; anything else is transport.
fn remote_or_rpc(e: TransportError) -> Error {
    match e.as_error_resp() {
        Some(payload) => Error::remote(remote_status(&payload.message), payload.message.to_string()),
        None => Error::Rpc(e.to_string()),
    }
}

fn remote_status(message: &str) -> &'static str {
    let message = message.to_lowercase();
    if message.contains("revert") {
        "CONTRACT_REVERT_EXECUTED"
    } else if message.contains("insufficient funds") {
        "INSUFFICIENT_PAYER_BALANCE"
    } else if message.contains("gas") {
        "INSUFFICIENT_GAS"
    } else {
        "REJECTED"
    }
}

fn success(receipt: &TransactionReceipt, output: Vec<u8>, simulated: bool) -> Receipt {
    Receipt {
        status: Receipt::SUCCESS.to_string(),
        tx_hash: Some(receipt.transaction_hash),
        output,
        simulated,
        contract_address: receipt.contract_address,
        gas_used: receipt.gas_used,
    }
}

#[async_trait]
impl Ledger for EvmLedger {
    fn set_operator(&mut self, operator: &Operator) -> Result<(), Error> {
        self.provider = build_provider(&self.url, operator);
        self.operator = operator.address();
        Ok(())
    }

    async fn query(&self, query: &Query) -> Result<Vec<u8>, Error> {
        self.check_fee_cap(query.gas, query.max_cost).await?;
        let tx = TransactionRequest::default()
            .with_from(query.from)
            .with_to(query.target)
            .with_input(query.payload.clone())
            .with_gas_limit(query.gas);
        let output = self.provider.call(tx).await.map_err(remote_or_rpc)?;
        Ok(output.to_vec())
    }

    async fn execute(&self, execution: &Execution) -> Result<Receipt, Error> {
        self.check_fee_cap(execution.gas, execution.max_fee).await?;
        let tx = TransactionRequest::default()
            .with_from(self.operator)
            .with_to(execution.target)
            .with_input(execution.payload.clone())
            .with_gas_limit(execution.gas)
            .with_value(execution.value);
        // Surfaces revert reasons before anything is signed.
        let dry_run = self.provider.call(tx.clone()).await.map_err(remote_or_rpc)?;
        let receipt = self.submit(tx).await?;
        let hash = receipt.transaction_hash;
        match self.mined_output(hash).await {
            Ok(output) => Ok(success(&receipt, output, false)),
            Err(e) => {
                warn!(%hash, error = %e, "Call trace unavailable, using dry-run output");
                Ok(success(&receipt, dry_run.to_vec(), true))
            }
        }
    }

    async fn deploy(&self, code: Vec<u8>, gas: u64) -> Result<Receipt, Error> {
        let tx = TransactionRequest::default()
            .with_from(self.operator)
            .with_deploy_code(code)
            .with_gas_limit(gas);
        let receipt = self.submit(tx).await?;
        if receipt.contract_address.is_none() {
            return Err(Error::remote("INVALID_CONTRACT_ID", "deployment receipt has no address"));
        }
        Ok(success(&receipt, Vec::new(), false))
    }

    async fn code_at(&self, account: Address) -> Result<Vec<u8>, Error> {
        let code = self
            .provider
            .get_code_at(account)
            .await
            .map_err(remote_or_rpc)?;
        Ok(code.to_vec())
    }

    async fn balance(&self, account: Address) -> Result<U256, Error> {
        self.provider
            .get_balance(account)
            .await
            .map_err(remote_or_rpc)
    }

    async fn transfer(&self, to: Address, amount: U256) -> Result<Receipt, Error> {
        let tx = TransactionRequest::default()
            .with_from(self.operator)
            .with_to(to)
            .with_value(amount);
        let receipt = self.submit(tx).await?;
        Ok(success(&receipt, Vec::new(), false))
    }
}

impl Session<EvmLedger> {
    /// Validate the network and operator settings, then bind a client to them.
    pub fn connect(config: &Config) -> Result<Self, Error> {
        let network = config.require_network()?;
        let operator = config.require_operator()?;
        let url = config.require_rpc_url()?;
        info!(%network, operator = %operator.address(), "Using environment");
        let ledger = EvmLedger::connect(url, &operator);
        Ok(Session::new(ledger, operator, network))
    }
}
