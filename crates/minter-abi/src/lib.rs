//! Interface description loading and call encoding for the minter tooling.
//! Pure logic: no network access, the only I/O is reading an artifact file.
//!
//! A call goes through [`encode_call`], is submitted by whatever ledger
//! client the caller uses, and the returned bytes go through
//! [`decode_result`].

mod artifact;
mod codec;
mod error;
mod schema;
pub mod values;

pub use alloy::dyn_abi::{DynSolType, DynSolValue};
pub use alloy::primitives::{Address, U256};
pub use artifact::Artifact;
pub use codec::{
    check_arguments, decode_call, decode_outputs, decode_result, encode_call, encode_constructor,
    encode_outputs, CallResult, DecodedCall,
};
pub use error::AbiError;
pub use schema::{Descriptor, EntryKind, Param, Schema};
