//! Compiler artifact: `{ "abi": [...], "bytecode": "0x..." }`.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::schema::RawEntry;
use crate::{AbiError, Schema};

#[derive(Deserialize)]
struct RawArtifact {
    abi: Vec<RawEntry>,
    #[serde(default)]
    bytecode: String,
}

/// Interface description plus deployable bytecode, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub schema: Schema,
    pub bytecode: Vec<u8>,
}

impl Artifact {
    /// Hardhat layout: `<dir>/<Name>.sol/<Name>.json`.
    pub fn path_for(artifacts_dir: &Path, contract_name: &str) -> PathBuf {
        artifacts_dir
            .join(format!("{contract_name}.sol"))
            .join(format!("{contract_name}.json"))
    }

    pub fn load(path: &Path) -> Result<Self, AbiError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| AbiError::Artifact(format!("failed to read {}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, AbiError> {
        let raw: RawArtifact = serde_json::from_str(json)
            .map_err(|e| AbiError::Artifact(format!("invalid artifact JSON: {e}")))?;
        let hex_code = raw.bytecode.trim();
        let hex_code = hex_code.strip_prefix("0x").unwrap_or(hex_code);
        let bytecode = hex::decode(hex_code)
            .map_err(|e| AbiError::Artifact(format!("invalid bytecode hex: {e}")))?;
        Ok(Self {
            schema: Schema::from_raw(raw.abi)?,
            bytecode,
        })
    }
}
