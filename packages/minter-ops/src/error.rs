//! Error types for the minter tooling.

use minter_abi::AbiError;
use std::fmt;

/// Minter tooling error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Required configuration missing or invalid. Raised before any remote call.
    Config(String),
    /// Schema lookup, argument validation or result decoding failed.
    Abi(AbiError),
    /// The remote endpoint rejected or reverted the call.
    Remote { status: String, detail: String },
    /// Transport failure talking to the RPC endpoint.
    Rpc(String),
}

impl Error {
    pub fn remote(status: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Remote {
            status: status.into(),
            detail: detail.into(),
        }
    }

    /// Status string reported by the remote side, if it rejected the call.
    pub fn status(&self) -> Option<&str> {
        match self {
            Self::Remote { status, .. } => Some(status),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "config error: {msg}"),
            Error::Abi(e) => write!(f, "{e}"),
            Error::Remote { status, detail } if detail.is_empty() => {
                write!(f, "remote execution failed: {status}")
            }
            Error::Remote { status, detail } => {
                write!(f, "remote execution failed: {status} ({detail})")
            }
            Error::Rpc(msg) => write!(f, "rpc error: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Abi(e) => Some(e),
            _ => None,
        }
    }
}

impl From<AbiError> for Error {
    fn from(e: AbiError) -> Self {
        Error::Abi(e)
    }
}
