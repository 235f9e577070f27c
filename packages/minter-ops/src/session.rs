//! Explicit session: one ledger client, one operator identity, one network.
//! Passed to every operation instead of living in a global.

use alloy::primitives::{Address, U256};
use tracing::info;

use crate::{Error, Ledger, Network, Operator, Receipt};

/// Authenticated ledger session. Swapping the operator needs `&mut`, so a
/// session is never shared between concurrent callers.
pub struct Session<L> {
    ledger: L,
    operator: Operator,
    network: Network,
}

impl<L: Ledger> Session<L> {
    /// `ledger` must already be bound to `operator`.
    pub fn new(ledger: L, operator: Operator, network: Network) -> Self {
        Self {
            ledger,
            operator,
            network,
        }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// Sign every later call as `operator`, e.g. to act as a second account.
    pub fn set_operator(&mut self, operator: Operator) -> Result<(), Error> {
        self.ledger.set_operator(&operator)?;
        info!(operator = %operator.address(), "Switched operator");
        self.operator = operator;
        Ok(())
    }

    pub async fn balance(&self, account: Address) -> Result<U256, Error> {
        self.ledger.balance(account).await
    }

    /// Send native value from the current operator.
    pub async fn transfer(&self, to: Address, amount: U256) -> Result<Receipt, Error> {
        let receipt = self.ledger.transfer(to, amount).await?;
        info!(%to, %amount, status = %receipt.status, "Transfer complete");
        Ok(receipt)
    }

    pub async fn code_at(&self, account: Address) -> Result<Vec<u8>, Error> {
        self.ledger.code_at(account).await
    }
}
