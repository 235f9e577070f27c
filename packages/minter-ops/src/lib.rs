//! # Minter Ops
//!
//! Drives the NFT minter contract over JSON-RPC: bytecode deployment,
//! batched metadata upload and mint initialisation.
//!
//! Every remote call follows the same path: [`minter_abi::encode_call`],
//! then [`ContractHandle::query`] or [`ContractHandle::execute`] through a
//! [`Session`], then [`minter_abi::decode_result`].
//!
//! ## Binaries
//! - `load-bytecode` - deploy the artifact bytecode, or print the code at an address
//! - `load-metadata` - reset the token, upload metadata, initialise the mint

pub mod bulk;
pub mod cli;
pub mod config;
mod error;
pub mod evm;
pub mod invoke;
pub mod ledger;
pub mod minter;
pub mod session;

pub use config::{Config, Network};
pub use error::Error;
pub use evm::EvmLedger;
pub use invoke::{ContractHandle, ExecBudget, Outcome, QueryBudget};
pub use ledger::{Execution, Ledger, Operator, Query, Receipt};
pub use session::Session;
