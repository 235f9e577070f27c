//! Call encoder and result decoder. Both go through the same schema lookup;
//! arguments are checked against the declared types before any bytes are
//! produced.

use alloy::dyn_abi::{DynSolType, DynSolValue};
use alloy::primitives::{Address, U256};

use crate::{AbiError, Descriptor, EntryKind, Param, Schema};

/// Encode a function call: 4-byte selector followed by the ABI-encoded
/// arguments.
pub fn encode_call(
    schema: &Schema,
    function: &str,
    args: &[DynSolValue],
) -> Result<Vec<u8>, AbiError> {
    let descriptor = schema.function(function)?;
    check_arguments(descriptor, args)?;
    let mut payload = descriptor.selector().to_vec();
    payload.extend(DynSolValue::Tuple(args.to_vec()).abi_encode_params());
    Ok(payload)
}

/// Encode constructor arguments, to be appended to the deployment bytecode.
/// A schema without a constructor accepts only an empty argument list.
pub fn encode_constructor(schema: &Schema, args: &[DynSolValue]) -> Result<Vec<u8>, AbiError> {
    match schema.constructor() {
        Some(descriptor) => {
            check_arguments(descriptor, args)?;
            Ok(DynSolValue::Tuple(args.to_vec()).abi_encode_params())
        }
        None if args.is_empty() => Ok(Vec::new()),
        None => Err(AbiError::SchemaLookup {
            name: String::new(),
            kind: EntryKind::Constructor,
        }),
    }
}

/// Validate argument count and each argument's type against the declared
/// inputs.
pub fn check_arguments(descriptor: &Descriptor, args: &[DynSolValue]) -> Result<(), AbiError> {
    check_values(descriptor, descriptor.inputs(), args, "argument")
}

fn check_values(
    descriptor: &Descriptor,
    declared: &[Param],
    values: &[DynSolValue],
    what: &str,
) -> Result<(), AbiError> {
    if values.len() != declared.len() {
        return Err(AbiError::Encode(format!(
            "`{}` expects {} {what}s, got {}",
            descriptor.name(),
            declared.len(),
            values.len()
        )));
    }
    for (index, (param, value)) in declared.iter().zip(values).enumerate() {
        if !param.ty.matches(value) {
            let found = value
                .as_type()
                .map(|t| t.sol_type_name().into_owned())
                .unwrap_or_else(|| "unknown".to_string());
            return Err(AbiError::Encode(format!(
                "{what} {index} (`{}`) of `{}`: expected {}, got {found}",
                param.name,
                descriptor.name(),
                param.ty.sol_type_name()
            )));
        }
    }
    Ok(())
}

/// Decode the bytes returned by `function` into its named outputs.
pub fn decode_result(schema: &Schema, function: &str, data: &[u8]) -> Result<CallResult, AbiError> {
    let descriptor = schema.function(function)?;
    decode_outputs(descriptor, data)
}

pub fn decode_outputs(descriptor: &Descriptor, data: &[u8]) -> Result<CallResult, AbiError> {
    let layout = descriptor.output_types();
    let values = decode_params(&layout, data).map_err(|msg| {
        AbiError::Decode(format!("result of `{}`: {msg}", descriptor.name()))
    })?;
    let fields = values
        .into_iter()
        .enumerate()
        .map(|(i, v)| (descriptor.output_key(i), v))
        .collect();
    Ok(CallResult { fields })
}

/// Encode return values for `descriptor`; the inverse of [`decode_outputs`].
pub fn encode_outputs(descriptor: &Descriptor, values: &[DynSolValue]) -> Result<Vec<u8>, AbiError> {
    check_values(descriptor, descriptor.outputs(), values, "output")?;
    Ok(DynSolValue::Tuple(values.to_vec()).abi_encode_params())
}

/// A call payload decoded back into its function and arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedCall {
    pub function: String,
    pub args: Vec<DynSolValue>,
}

/// Decode a call payload by its selector.
pub fn decode_call(schema: &Schema, payload: &[u8]) -> Result<DecodedCall, AbiError> {
    if payload.len() < 4 {
        return Err(AbiError::Decode(format!(
            "call payload is {} bytes, shorter than a selector",
            payload.len()
        )));
    }
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&payload[..4]);
    let descriptor = schema
        .by_selector(selector)
        .ok_or_else(|| AbiError::SchemaLookup {
            name: format!("0x{}", hex::encode(selector)),
            kind: EntryKind::Function,
        })?;
    let args = decode_params(&descriptor.input_types(), &payload[4..]).map_err(|msg| {
        AbiError::Decode(format!("arguments of `{}`: {msg}", descriptor.name()))
    })?;
    Ok(DecodedCall {
        function: descriptor.name().to_string(),
        args,
    })
}

fn decode_params(layout: &DynSolType, data: &[u8]) -> Result<Vec<DynSolValue>, String> {
    let decoded = match static_words(layout)? {
        Some(words) => {
            let size = words.checked_mul(32).ok_or_else(|| too_large(layout))?;
            if data.len() != size {
                return Err(format!("expected {size} bytes, got {}", data.len()));
            }
            layout.abi_decode_params(data).map_err(|e| e.to_string())?
        }
        None => {
            let decoded = layout.abi_decode_params(data).map_err(|e| e.to_string())?;
            // The decoder ignores trailing bytes; the canonical encoding of
            // what it read has to span the whole input.
            let consumed = decoded.abi_encode_params().len();
            if consumed != data.len() {
                return Err(format!(
                    "decoded {consumed} bytes, got {} bytes",
                    data.len()
                ));
            }
            decoded
        }
    };
    match decoded {
        DynSolValue::Tuple(values) => Ok(values),
        other => Ok(vec![other]),
    }
}

/// Head size in 32-byte words, or `None` if the type is dynamic.
fn static_words(ty: &DynSolType) -> Result<Option<usize>, String> {
    let words = match ty {
        DynSolType::Bool
        | DynSolType::Int(_)
        | DynSolType::Uint(_)
        | DynSolType::FixedBytes(_)
        | DynSolType::Address
        | DynSolType::Function => 1,
        DynSolType::FixedArray(inner, len) => {
            let Some(inner) = static_words(inner)? else {
                return Ok(None);
            };
            inner.checked_mul(*len).ok_or_else(|| too_large(ty))?
        }
        DynSolType::Tuple(fields) => {
            let mut total: usize = 0;
            for field in fields {
                let Some(words) = static_words(field)? else {
                    return Ok(None);
                };
                total = total.checked_add(words).ok_or_else(|| too_large(ty))?;
            }
            total
        }
        _ => return Ok(None),
    };
    Ok(Some(words))
}

fn too_large(ty: &DynSolType) -> String {
    format!("`{}` is too large to decode", ty.sol_type_name())
}

/// Decoded outputs in declaration order, keyed by output name (or position
/// when unnamed). Keys are unique: the schema rejects repeated names.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CallResult {
    fields: Vec<(String, DynSolValue)>,
}

impl CallResult {
    pub fn get(&self, name: &str) -> Option<&DynSolValue> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn value(&self, name: &str) -> Result<&DynSolValue, AbiError> {
        self.get(name)
            .ok_or_else(|| AbiError::Decode(format!("no output named `{name}`")))
    }

    pub fn uint(&self, name: &str) -> Result<U256, AbiError> {
        self.value(name)?
            .as_uint()
            .map(|(v, _)| v)
            .ok_or_else(|| mismatch(name, "uint"))
    }

    /// Convenience for counters and timestamps that fit in 64 bits.
    pub fn u64(&self, name: &str) -> Result<u64, AbiError> {
        let value = self.uint(name)?;
        u64::try_from(value)
            .map_err(|_| AbiError::Decode(format!("output `{name}` = {value} overflows u64")))
    }

    pub fn address(&self, name: &str) -> Result<Address, AbiError> {
        self.value(name)?
            .as_address()
            .ok_or_else(|| mismatch(name, "address"))
    }

    pub fn bool(&self, name: &str) -> Result<bool, AbiError> {
        self.value(name)?.as_bool().ok_or_else(|| mismatch(name, "bool"))
    }

    pub fn string(&self, name: &str) -> Result<&str, AbiError> {
        self.value(name)?.as_str().ok_or_else(|| mismatch(name, "string"))
    }

    pub fn strings(&self, name: &str) -> Result<Vec<String>, AbiError> {
        let items = self
            .value(name)?
            .as_array()
            .ok_or_else(|| mismatch(name, "string[]"))?;
        items
            .iter()
            .map(|v| v.as_str().map(str::to_string).ok_or_else(|| mismatch(name, "string[]")))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DynSolValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn mismatch(name: &str, expected: &str) -> AbiError {
    AbiError::Decode(format!("output `{name}` is not a {expected}"))
}
