//! Reset the minter's token, upload numbered metadata and initialise the mint.

use anyhow::Context;
use minter_abi::Artifact;
use minter_ops::cli::{confirm, init_tracing};
use minter_ops::minter::{numbered_metadata, MintInit, MinterContract, RoyaltyFee};
use minter_ops::{Config, ContractHandle, Session};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};

const METADATA_PER_ROUND: u32 = 444;
const METADATA_ROUNDS: u32 = 23;
const CID: &str = "ipfs://bafybeibiedkt2qoulkexsl2nyz5vykgyjapc5td2fni322q6bzeogbp5ge/";

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "load-metadata failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    let session = Session::connect(&config)?;
    let address = config.require_contract_address()?;
    let path = config.require_artifact_path()?;
    let artifact = Artifact::load(&path)
        .with_context(|| format!("loading interface from {}", path.display()))?;

    let minter = MinterContract::new(
        ContractHandle::new(Arc::new(artifact.schema), address),
        config.mint_payment_wei()?,
    );

    info!(
        contract = %address,
        network = %session.network(),
        operator = %session.operator().address(),
        "Loading metadata"
    );
    if !confirm("Reset the token and upload metadata?")? {
        info!("User aborted");
        return Ok(());
    }

    let reset = minter.reset_token(&session).await?;
    info!(status = %reset.status, "Token reset");

    let metadata = numbered_metadata(METADATA_PER_ROUND, METADATA_ROUNDS);
    let report = minter.upload_metadata(&session, &metadata).await?;
    info!(
        batches = report.batches,
        items = report.items,
        total_loaded = ?report.total_loaded,
        "Metadata uploaded"
    );

    let init = MintInit {
        name: "MC-test".into(),
        symbol: "MCt".into(),
        memo: "MC testing memo".into(),
        cid: CID.into(),
        royalties: vec![RoyaltyFee {
            numerator: 200,
            denominator: 10_000,
            fallback_fee: 5,
            account: session.operator().address(),
        }],
    };
    let minted = minter.initialise_nft_mint(&session, &init).await?;

    println!("Token created: {}", minted.token_address);
    println!("Max supply: {}", minted.max_supply);
    println!("Status: {}", minted.status);
    if minted.simulated {
        warn!("Token details come from a dry run; check the token on a mirror node");
    }
    Ok(())
}
