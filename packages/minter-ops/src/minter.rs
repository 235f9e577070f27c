//! Typed wrappers for the minter contract's flows: deployment, token reset,
//! metadata upload, mint initialisation, owner setters and withdrawals.
//!
//! Minting rules live in the contract; these helpers only name its
//! functions and shape their arguments.

use alloy::primitives::{Address, I256, U256};
use minter_abi::{values, AbiError, Artifact, DynSolValue};
use std::sync::Arc;
use tracing::info;

use crate::bulk::{upload_in_batches, BatchPlan, BulkReport};
use crate::{ContractHandle, Error, ExecBudget, Ledger, Outcome, QueryBudget, Receipt, Session};

pub const RESET_GAS: u64 = 500_000;
pub const INIT_GAS: u64 = 1_000_000;
pub const SETTER_GAS: u64 = 200_000;
pub const GETTER_GAS: u64 = 100_000;
pub const WITHDRAW_GAS: u64 = 400_000;
pub const TOKEN_TRANSFER_GAS: u64 = 600_000;

/// Royalty entry passed to `initialiseNFTMint`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoyaltyFee {
    pub numerator: u32,
    pub denominator: u32,
    /// Charged when the sale carries no fungible value; 0 for none.
    pub fallback_fee: u32,
    pub account: Address,
}

impl RoyaltyFee {
    fn to_value(self) -> DynSolValue {
        values::tuple(vec![
            values::uint(self.numerator.into(), 32),
            values::uint(self.denominator.into(), 32),
            values::uint(self.fallback_fee.into(), 32),
            values::address(self.account),
        ])
    }
}

/// Token parameters for `initialiseNFTMint`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintInit {
    pub name: String,
    pub symbol: String,
    pub memo: String,
    pub cid: String,
    pub royalties: Vec<RoyaltyFee>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintInitialised {
    pub status: String,
    pub token_address: Address,
    pub max_supply: U256,
    /// Token details come from a dry run; confirm them on a mirror before use.
    pub simulated: bool,
}

/// Snapshot of the contract's public settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintSettings {
    pub paused: bool,
    pub pay_lazy_from_contract: bool,
    pub base_price_native: U256,
    pub base_price_lazy: U256,
    pub wl_discount: U256,
    pub last_mint: U256,
    pub mint_start: U256,
    pub max_mint: U256,
    pub cooldown_period: U256,
    pub lazy_burn_percentage: U256,
}

/// `001_metadata.json` … `<per_round>_metadata.json`, repeated `rounds` times.
pub fn numbered_metadata(per_round: u32, rounds: u32) -> Vec<String> {
    (0..rounds)
        .flat_map(|_| (1..=per_round).map(|m| format!("{m:03}_metadata.json")))
        .collect()
}

/// The minter contract at a known address.
#[derive(Debug, Clone)]
pub struct MinterContract {
    handle: ContractHandle,
    mint_payment: U256,
}

impl MinterContract {
    pub fn new(handle: ContractHandle, mint_payment: U256) -> Self {
        Self {
            handle,
            mint_payment,
        }
    }

    /// Deploy from `artifact`; the constructor links the lazy contract and
    /// token and sets the burn percentage.
    pub async fn deploy<L: Ledger>(
        session: &Session<L>,
        artifact: &Artifact,
        lazy_contract: Address,
        lazy_token: Address,
        lazy_burn_perc: u64,
        gas: u64,
        mint_payment: U256,
    ) -> Result<(Self, Receipt), Error> {
        let args = [
            values::address(lazy_contract),
            values::address(lazy_token),
            values::uint256(U256::from(lazy_burn_perc)),
        ];
        let schema = Arc::new(artifact.schema.clone());
        let (handle, receipt) =
            ContractHandle::deploy(session, schema, &artifact.bytecode, &args, gas).await?;
        Ok((Self::new(handle, mint_payment), receipt))
    }

    pub fn handle(&self) -> &ContractHandle {
        &self.handle
    }

    pub fn address(&self) -> Address {
        self.handle.address()
    }

    pub async fn reset_token<L: Ledger>(&self, session: &Session<L>) -> Result<Outcome, Error> {
        self.handle
            .execute(session, "resetToken", &[], ExecBudget::gas(RESET_GAS), U256::ZERO)
            .await
    }

    pub async fn upload_metadata<L: Ledger>(
        &self,
        session: &Session<L>,
        metadata: &[String],
    ) -> Result<BulkReport, Error> {
        upload_in_batches(session, &self.handle, metadata, &BatchPlan::metadata()).await
    }

    /// Creates the token; pays the configured mint payment.
    pub async fn initialise_nft_mint<L: Ledger>(
        &self,
        session: &Session<L>,
        init: &MintInit,
    ) -> Result<MintInitialised, Error> {
        let royalties = init.royalties.iter().map(|r| r.to_value()).collect();
        let args = [
            values::string(init.name.as_str()),
            values::string(init.symbol.as_str()),
            values::string(init.memo.as_str()),
            values::string(init.cid.as_str()),
            values::array(royalties),
        ];
        let outcome = self
            .handle
            .execute(
                session,
                "initialiseNFTMint",
                &args,
                ExecBudget::gas(INIT_GAS),
                self.mint_payment,
            )
            .await?;
        let initialised = MintInitialised {
            token_address: outcome.result.address("createdTokenAddress")?,
            max_supply: outcome.result.uint("maxSupply")?,
            status: outcome.status,
            simulated: outcome.simulated,
        };
        info!(
            token = %initialised.token_address,
            max_supply = %initialised.max_supply,
            "Token created"
        );
        Ok(initialised)
    }

    /// Single output `field` of a no-argument getter.
    pub async fn get_setting<L: Ledger>(
        &self,
        session: &Session<L>,
        function: &str,
        field: &str,
    ) -> Result<DynSolValue, Error> {
        let result = self
            .handle
            .query(session, function, &[], QueryBudget::gas(GETTER_GAS))
            .await?;
        Ok(result.value(field)?.clone())
    }

    /// Several outputs of one no-argument getter, in the order asked for.
    pub async fn get_settings<L: Ledger>(
        &self,
        session: &Session<L>,
        function: &str,
        fields: &[&str],
    ) -> Result<Vec<DynSolValue>, Error> {
        let result = self
            .handle
            .query(session, function, &[], QueryBudget::gas(GETTER_GAS))
            .await?;
        fields
            .iter()
            .map(|f| result.value(f).cloned().map_err(Error::from))
            .collect()
    }

    async fn get_uint<L: Ledger>(
        &self,
        session: &Session<L>,
        function: &str,
        field: &str,
    ) -> Result<U256, Error> {
        let result = self
            .handle
            .query(session, function, &[], QueryBudget::gas(GETTER_GAS))
            .await?;
        Ok(result.uint(field)?)
    }

    async fn get_bool<L: Ledger>(
        &self,
        session: &Session<L>,
        function: &str,
        field: &str,
    ) -> Result<bool, Error> {
        let result = self
            .handle
            .query(session, function, &[], QueryBudget::gas(GETTER_GAS))
            .await?;
        Ok(result.bool(field)?)
    }

    /// `(lsct, lazy token)` addresses linked at construction.
    pub async fn linked_contracts<L: Ledger>(
        &self,
        session: &Session<L>,
    ) -> Result<(Address, Address), Error> {
        let lsct = self
            .handle
            .query(session, "getLSCT", &[], QueryBudget::gas(GETTER_GAS))
            .await?
            .address("lsct")?;
        let lazy = self
            .handle
            .query(session, "getLazyToken", &[], QueryBudget::gas(GETTER_GAS))
            .await?
            .address("lazy")?;
        Ok((lsct, lazy))
    }

    pub async fn settings<L: Ledger>(&self, session: &Session<L>) -> Result<MintSettings, Error> {
        Ok(MintSettings {
            paused: self.get_bool(session, "getMintPaused", "paused").await?,
            pay_lazy_from_contract: self.get_bool(session, "getPayLazyFromSC", "payFromSC").await?,
            base_price_native: self.get_uint(session, "getBasePriceHbar", "priceHbar").await?,
            base_price_lazy: self.get_uint(session, "getBasePriceLazy", "priceLazy").await?,
            wl_discount: self.get_uint(session, "getWLDiscount", "wlDiscount").await?,
            last_mint: self.get_uint(session, "getLastMint", "lastMintTime").await?,
            mint_start: self.get_uint(session, "getMintStartTime", "mintStartTime").await?,
            max_mint: self.get_uint(session, "getMaxMint", "maxMint").await?,
            cooldown_period: self
                .get_uint(session, "getCooldownPeriod", "cooldownPeriod")
                .await?,
            lazy_burn_percentage: self
                .get_uint(session, "getLazyBurnPercentage", "lazyBurn")
                .await?,
        })
    }

    async fn set<L: Ledger>(
        &self,
        session: &Session<L>,
        function: &str,
        args: &[DynSolValue],
    ) -> Result<String, Error> {
        let outcome = self
            .handle
            .execute(session, function, args, ExecBudget::gas(SETTER_GAS), U256::ZERO)
            .await?;
        Ok(outcome.status)
    }

    pub async fn set_bool<L: Ledger>(
        &self,
        session: &Session<L>,
        function: &str,
        value: bool,
    ) -> Result<String, Error> {
        self.set(session, function, &[values::boolean(value)]).await
    }

    pub async fn set_address<L: Ledger>(
        &self,
        session: &Session<L>,
        function: &str,
        value: Address,
    ) -> Result<String, Error> {
        self.set(session, function, &[values::address(value)]).await
    }

    pub async fn set_string<L: Ledger>(
        &self,
        session: &Session<L>,
        function: &str,
        value: &str,
    ) -> Result<String, Error> {
        self.set(session, function, &[values::string(value)]).await
    }

    pub async fn set_string_array<L: Ledger>(
        &self,
        session: &Session<L>,
        function: &str,
        items: &[String],
    ) -> Result<String, Error> {
        self.set(session, function, &[values::string_array(items.iter().cloned())])
            .await
    }

    /// Each value is passed as a `uint256`.
    pub async fn set_uints<L: Ledger>(
        &self,
        session: &Session<L>,
        function: &str,
        items: &[U256],
    ) -> Result<String, Error> {
        let args: Vec<DynSolValue> = items.iter().map(|v| values::uint256(*v)).collect();
        self.set(session, function, &args).await
    }

    /// Pull native value held by the contract to `receiver`. Owner only.
    pub async fn withdraw_native<L: Ledger>(
        &self,
        session: &Session<L>,
        receiver: Address,
        amount: U256,
    ) -> Result<String, Error> {
        let args = [values::address(receiver), values::uint256(amount)];
        let outcome = self
            .handle
            .execute(session, "transferHbar", &args, ExecBudget::gas(WITHDRAW_GAS), U256::ZERO)
            .await?;
        Ok(outcome.status)
    }

    /// Move `amount` of a fungible `token` held by the contract. Owner only.
    /// The contract takes an `int64`; larger amounts are rejected locally.
    pub async fn withdraw_token<L: Ledger>(
        &self,
        session: &Session<L>,
        token: Address,
        receiver: Address,
        amount: u64,
    ) -> Result<String, Error> {
        if i64::try_from(amount).is_err() {
            return Err(AbiError::Encode(format!("token amount {amount} does not fit int64")).into());
        }
        let args = [
            values::address(token),
            values::address(receiver),
            DynSolValue::Int(I256::from_raw(U256::from(amount)), 64),
        ];
        let outcome = self
            .handle
            .execute(
                session,
                "transferHTS",
                &args,
                ExecBudget::gas(TOKEN_TRANSFER_GAS),
                U256::ZERO,
            )
            .await?;
        Ok(outcome.status)
    }
}
