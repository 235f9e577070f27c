//! Interface description: ABI entries resolved to concrete types and indexed
//! by (name, kind) and by function selector.

use alloy::dyn_abi::DynSolType;
use alloy::primitives::keccak256;
use serde::Deserialize;
use std::collections::HashMap;

use crate::AbiError;

/// Kind of an ABI entry. A missing `type` field means `function`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    #[default]
    Function,
    Constructor,
    Event,
    Error,
    Fallback,
    Receive,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Function => "function",
            Self::Constructor => "constructor",
            Self::Event => "event",
            Self::Error => "error",
            Self::Fallback => "fallback",
            Self::Receive => "receive",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawParam {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    components: Vec<RawParam>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawEntry {
    #[serde(rename = "type", default)]
    kind: EntryKind,
    #[serde(default)]
    name: String,
    #[serde(default)]
    inputs: Vec<RawParam>,
    #[serde(default)]
    outputs: Vec<RawParam>,
    #[serde(default)]
    state_mutability: Option<String>,
}

/// A declared input or output with its resolved type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: DynSolType,
}

/// One ABI entry.
#[derive(Debug, Clone)]
pub struct Descriptor {
    name: String,
    kind: EntryKind,
    inputs: Vec<Param>,
    outputs: Vec<Param>,
    state_mutability: Option<String>,
    selector: [u8; 4],
}

impl Descriptor {
    fn from_raw(raw: RawEntry) -> Result<Self, AbiError> {
        let inputs = resolve_params(&raw.inputs)?;
        let outputs = resolve_params(&raw.outputs)?;

        // Unnamed outputs take their index as key, which may clash with a name.
        let mut seen = std::collections::HashSet::new();
        for index in 0..outputs.len() {
            let key = output_key_of(&outputs, index);
            if !seen.insert(key.clone()) {
                return Err(AbiError::Duplicate(format!(
                    "output `{key}` repeated in `{}`",
                    raw.name
                )));
            }
        }

        let signature = signature_of(&raw.name, &inputs);
        let hash = keccak256(signature.as_bytes());
        let mut selector = [0u8; 4];
        selector.copy_from_slice(&hash.0[..4]);

        Ok(Self {
            name: raw.name,
            kind: raw.kind,
            inputs,
            outputs,
            state_mutability: raw.state_mutability,
            selector,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn inputs(&self) -> &[Param] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Param] {
        &self.outputs
    }

    /// Canonical signature, e.g. `addMetadata(string[])`.
    pub fn signature(&self) -> String {
        signature_of(&self.name, &self.inputs)
    }

    /// First four bytes of the keccak-256 of the signature.
    pub fn selector(&self) -> [u8; 4] {
        self.selector
    }

    /// `view` and `pure` functions never change state.
    pub fn is_read_only(&self) -> bool {
        matches!(self.state_mutability.as_deref(), Some("view") | Some("pure"))
    }

    pub fn is_payable(&self) -> bool {
        self.state_mutability.as_deref() == Some("payable")
    }

    /// Key under which output `index` appears in a decoded result: its
    /// declared name, or its position when unnamed.
    pub fn output_key(&self, index: usize) -> String {
        output_key_of(&self.outputs, index)
    }

    pub(crate) fn input_types(&self) -> DynSolType {
        DynSolType::Tuple(self.inputs.iter().map(|p| p.ty.clone()).collect())
    }

    pub(crate) fn output_types(&self) -> DynSolType {
        DynSolType::Tuple(self.outputs.iter().map(|p| p.ty.clone()).collect())
    }
}

/// Interface description built once from an ABI array and never mutated.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    entries: Vec<Descriptor>,
    by_name: HashMap<(String, EntryKind), usize>,
    by_selector: HashMap<[u8; 4], usize>,
}

impl Schema {
    /// Parse the `abi` array of a compiler artifact.
    pub fn from_abi_json(abi: &str) -> Result<Self, AbiError> {
        let raw: Vec<RawEntry> = serde_json::from_str(abi)
            .map_err(|e| AbiError::Artifact(format!("invalid ABI JSON: {e}")))?;
        Self::from_raw(raw)
    }

    pub(crate) fn from_raw(raw: Vec<RawEntry>) -> Result<Self, AbiError> {
        let mut schema = Self::default();
        for entry in raw {
            let descriptor = Descriptor::from_raw(entry)?;
            let position = schema.entries.len();
            let key = (descriptor.name.clone(), descriptor.kind);
            if schema.by_name.insert(key, position).is_some() {
                return Err(AbiError::Duplicate(format!(
                    "{} `{}` declared more than once",
                    descriptor.kind, descriptor.name
                )));
            }
            if descriptor.kind == EntryKind::Function {
                if let Some(prev) = schema.by_selector.insert(descriptor.selector, position) {
                    return Err(AbiError::Duplicate(format!(
                        "selector 0x{} shared by `{}` and `{}`",
                        hex::encode(descriptor.selector),
                        schema.entries[prev].name,
                        descriptor.name
                    )));
                }
            }
            schema.entries.push(descriptor);
        }
        Ok(schema)
    }

    /// Look up an entry by name and kind.
    pub fn lookup(&self, name: &str, kind: EntryKind) -> Result<&Descriptor, AbiError> {
        self.by_name
            .get(&(name.to_string(), kind))
            .map(|&i| &self.entries[i])
            .ok_or_else(|| AbiError::SchemaLookup {
                name: name.to_string(),
                kind,
            })
    }

    pub fn function(&self, name: &str) -> Result<&Descriptor, AbiError> {
        self.lookup(name, EntryKind::Function)
    }

    /// Constructors are unnamed.
    pub fn constructor(&self) -> Option<&Descriptor> {
        self.lookup("", EntryKind::Constructor).ok()
    }

    pub fn by_selector(&self, selector: [u8; 4]) -> Option<&Descriptor> {
        self.by_selector.get(&selector).map(|&i| &self.entries[i])
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Descriptor> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn signature_of(name: &str, inputs: &[Param]) -> String {
    let types: Vec<String> = inputs
        .iter()
        .map(|p| p.ty.sol_type_name().into_owned())
        .collect();
    format!("{name}({})", types.join(","))
}

fn output_key_of(outputs: &[Param], index: usize) -> String {
    match outputs.get(index) {
        Some(param) if !param.name.is_empty() => param.name.clone(),
        _ => index.to_string(),
    }
}

fn resolve_params(raw: &[RawParam]) -> Result<Vec<Param>, AbiError> {
    raw.iter()
        .map(|p| {
            Ok(Param {
                name: p.name.clone(),
                ty: resolve_type(p)?,
            })
        })
        .collect()
}

fn resolve_type(param: &RawParam) -> Result<DynSolType, AbiError> {
    let Some(suffix) = param.ty.strip_prefix("tuple") else {
        return DynSolType::parse(&param.ty)
            .map_err(|e| AbiError::UnknownType(format!("{}: {e}", param.ty)));
    };
    let fields = param
        .components
        .iter()
        .map(resolve_type)
        .collect::<Result<Vec<_>, _>>()?;
    wrap_arrays(DynSolType::Tuple(fields), suffix, &param.ty)
}

/// Apply `[]` / `[N]` suffixes left to right, so `tuple[2][]` is a dynamic
/// array of pairs.
fn wrap_arrays(mut ty: DynSolType, mut suffix: &str, declared: &str) -> Result<DynSolType, AbiError> {
    let malformed = || AbiError::UnknownType(declared.to_string());
    while !suffix.is_empty() {
        let rest = suffix.strip_prefix('[').ok_or_else(malformed)?;
        let close = rest.find(']').ok_or_else(malformed)?;
        let size = &rest[..close];
        ty = if size.is_empty() {
            DynSolType::Array(Box::new(ty))
        } else {
            let len = size.parse::<usize>().map_err(|_| malformed())?;
            DynSolType::FixedArray(Box::new(ty), len)
        };
        suffix = &rest[close + 1..];
    }
    Ok(ty)
}
