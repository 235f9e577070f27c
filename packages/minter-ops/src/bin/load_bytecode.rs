//! Deploy the minter bytecode, or print the code already at an address.
//!
//! ```text
//! load-bytecode            # deploy <ARTIFACTS_DIR>/<CONTRACT_NAME>.sol/<CONTRACT_NAME>.json
//! load-bytecode 0xabc...   # print the code deployed at 0xabc...
//! ```

use alloy::primitives::hex;
use alloy::primitives::Address;
use anyhow::Context;
use minter_abi::Artifact;
use minter_ops::cli::{confirm, init_tracing};
use minter_ops::minter::MinterContract;
use minter_ops::{Config, Session};
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "load-bytecode failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    let session = Session::connect(&config)?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let [address] = args.as_slice() {
        let address: Address = address
            .parse()
            .with_context(|| format!("invalid address `{address}`"))?;
        let code = session.code_at(address).await?;
        info!(%address, bytes = code.len(), "Fetched contract code");
        println!("{}", hex::encode_prefixed(&code));
        return Ok(());
    }

    let name = config.require_contract_name()?;
    let path = config.require_artifact_path()?;
    let lazy_contract = config.require_lazy_contract()?;
    let lazy_token = config.require_lazy_token()?;
    let mint_payment = config.mint_payment_wei()?;

    info!(
        contract = name,
        network = %session.network(),
        operator = %session.operator().address(),
        "Deploying"
    );
    if !confirm(&format!("Deploy {name} to {}?", session.network()))? {
        info!("User aborted");
        return Ok(());
    }

    let artifact = Artifact::load(&path)?;
    info!(path = %path.display(), bytes = artifact.bytecode.len(), "Loaded bytecode");

    let (minter, receipt) = MinterContract::deploy(
        &session,
        &artifact,
        lazy_contract,
        lazy_token,
        config.lazy_burn_perc,
        config.deploy_gas,
        mint_payment,
    )
    .await?;

    println!("Contract created: {}", minter.address());
    println!("Status: {}", receipt.status);
    if let Some(hash) = receipt.tx_hash {
        println!("Transaction: {hash}");
    }
    Ok(())
}
