//! Constructors for the tagged argument values most call sites need.

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{Address, U256};

pub fn uint256(value: U256) -> DynSolValue {
    DynSolValue::Uint(value, 256)
}

/// An unsigned integer of the given bit width, e.g. `uint32`.
pub fn uint(value: u64, bits: usize) -> DynSolValue {
    DynSolValue::Uint(U256::from(value), bits)
}

pub fn string(value: impl Into<String>) -> DynSolValue {
    DynSolValue::String(value.into())
}

pub fn string_array<I>(items: I) -> DynSolValue
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    DynSolValue::Array(items.into_iter().map(|s| DynSolValue::String(s.into())).collect())
}

pub fn address(value: Address) -> DynSolValue {
    DynSolValue::Address(value)
}

pub fn boolean(value: bool) -> DynSolValue {
    DynSolValue::Bool(value)
}

/// A struct argument; fields in declaration order.
pub fn tuple(fields: Vec<DynSolValue>) -> DynSolValue {
    DynSolValue::Tuple(fields)
}

pub fn array(items: Vec<DynSolValue>) -> DynSolValue {
    DynSolValue::Array(items)
}
