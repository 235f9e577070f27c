use crate::EntryKind;

/// Errors raised while loading an interface description or encoding and
/// decoding calls against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiError {
    /// Artifact file missing, unreadable or malformed.
    Artifact(String),
    /// Two entries share a (name, kind) pair or a selector, or a function
    /// repeats an output name.
    Duplicate(String),
    /// A declared parameter type does not resolve to an ABI type.
    UnknownType(String),
    /// No entry with this name and kind.
    SchemaLookup { name: String, kind: EntryKind },
    /// Argument count or types do not match the declared inputs.
    Encode(String),
    /// Bytes do not fit the declared layout.
    Decode(String),
}

impl std::fmt::Display for AbiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Artifact(msg) => write!(f, "artifact error: {msg}"),
            Self::Duplicate(msg) => write!(f, "duplicate entry: {msg}"),
            Self::UnknownType(ty) => write!(f, "unknown ABI type: {ty}"),
            Self::SchemaLookup { name, kind } => write!(f, "no {kind} named `{name}` in schema"),
            Self::Encode(msg) => write!(f, "encode error: {msg}"),
            Self::Decode(msg) => write!(f, "decode error: {msg}"),
        }
    }
}

impl std::error::Error for AbiError {}
