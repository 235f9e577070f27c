//! Chunked bulk submission for inputs too large for one transaction.

use alloy::primitives::U256;
use minter_abi::values;
use tracing::info;

use crate::{ContractHandle, Error, ExecBudget, Ledger, Session};

/// Entries per `addMetadata` call.
pub const UPLOAD_BATCH_SIZE: usize = 60;
/// Gas per `addMetadata` call.
pub const UPLOAD_GAS: u64 = 1_500_000;

/// Split `items` into contiguous slices of `batch_size`, in order; only the
/// last may be shorter. No items → no slices.
pub fn partition<T>(items: &[T], batch_size: usize) -> Result<Vec<&[T]>, Error> {
    if batch_size == 0 {
        return Err(Error::Config("batch size must be at least 1".into()));
    }
    Ok(items.chunks(batch_size).collect())
}

/// How to push a string list: which function takes each batch as its only
/// `string[]` argument and which output reports the remote running total.
#[derive(Debug, Clone, Copy)]
pub struct BatchPlan<'a> {
    pub function: &'a str,
    pub total_field: &'a str,
    pub batch_size: usize,
    pub budget: ExecBudget,
}

impl BatchPlan<'static> {
    pub const fn metadata() -> Self {
        Self {
            function: "addMetadata",
            total_field: "totalLoaded",
            batch_size: UPLOAD_BATCH_SIZE,
            budget: ExecBudget::gas(UPLOAD_GAS),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkReport {
    pub batches: usize,
    pub items: usize,
    /// Last running total reported by the contract; `None` if nothing was sent.
    pub total_loaded: Option<U256>,
}

/// One execution per batch, sequentially. The first failure aborts the
/// sequence; batches already applied stay applied.
pub async fn upload_in_batches<L: Ledger>(
    session: &Session<L>,
    contract: &ContractHandle,
    items: &[String],
    plan: &BatchPlan<'_>,
) -> Result<BulkReport, Error> {
    let batches = partition(items, plan.batch_size)?;
    let mut report = BulkReport::default();
    for (index, batch) in batches.iter().enumerate() {
        let args = [values::string_array(batch.iter().cloned())];
        let outcome = contract
            .execute(session, plan.function, &args, plan.budget, U256::ZERO)
            .await?;
        let total = outcome.result.uint(plan.total_field)?;
        report.batches += 1;
        report.items += batch.len();
        report.total_loaded = Some(total);
        info!(
            batch = index + 1,
            of = batches.len(),
            total_loaded = %total,
            "Uploaded batch"
        );
    }
    Ok(report)
}
