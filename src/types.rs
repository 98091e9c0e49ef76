//! Chain-side inputs as the node returns them over JSON-RPC.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::codec::{Hash, Key};

/// One entry of `execution_results` in an `info_get_deploy` response.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockExecutionResult {
    pub block_hash: Hash,
    pub result: ExecutionResult,
}

/// Outcome of executing a deploy.
#[derive(Debug, Clone, Deserialize)]
pub enum ExecutionResult {
    Success(ExecutionOutcome),
    Failure(ExecutionFailure),
}

impl ExecutionResult {
    pub fn success(&self) -> Option<&ExecutionOutcome> {
        match self {
            Self::Success(outcome) => Some(outcome),
            Self::Failure(_) => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionOutcome {
    pub effect: ExecutionEffect,
    #[serde(default)]
    pub transfers: Vec<String>,
    pub cost: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionFailure {
    pub effect: ExecutionEffect,
    #[serde(default)]
    pub transfers: Vec<String>,
    pub cost: String,
    pub error_message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExecutionEffect {
    #[serde(default)]
    pub operations: Vec<Value>,
    pub transforms: Vec<TransformEntry>,
}

/// A single global-state mutation, in execution order.
#[derive(Debug, Clone, Deserialize)]
pub struct TransformEntry {
    pub key: Key,
    pub transform: Transform,
}

/// Only value writes matter for event extraction; every other transform
/// kind is kept by name.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "Value")]
pub enum Transform {
    WriteCLValue(RawCLValue),
    Other(String),
}

impl Transform {
    pub fn as_write_cl_value(&self) -> Option<&RawCLValue> {
        match self {
            Self::WriteCLValue(value) => Some(value),
            Self::Other(_) => None,
        }
    }
}

impl TryFrom<Value> for Transform {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(kind) => Ok(Self::Other(kind)),
            Value::Object(mut map) if map.len() == 1 => match map.remove("WriteCLValue") {
                Some(write) => serde_json::from_value(write).map(Self::WriteCLValue),
                None => Ok(Self::Other(map.keys().next().cloned().unwrap_or_default())),
            },
            other => Err(serde::de::Error::custom(format!(
                "unexpected transform shape: {other}"
            ))),
        }
    }
}

/// A CL value in the node's JSON form. `cl_type` is kept as raw JSON:
/// dictionary entries and event schemas are both stored as `Any`, so the
/// descriptor carries nothing the decoder can use.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawCLValue {
    pub cl_type: Value,
    #[serde(deserialize_with = "hex_bytes")]
    pub bytes: Vec<u8>,
    #[serde(default)]
    pub parsed: Option<Value>,
}

impl RawCLValue {
    pub fn any(bytes: Vec<u8>) -> Self {
        Self {
            cl_type: Value::String("Any".into()),
            bytes,
            parsed: None,
        }
    }
}

/// Value stored under a global-state key.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "Value")]
pub enum StoredValue {
    Contract(Contract),
    CLValue(RawCLValue),
    Other(String),
}

impl StoredValue {
    pub fn kind(&self) -> &str {
        match self {
            Self::Contract(_) => "Contract",
            Self::CLValue(_) => "CLValue",
            Self::Other(kind) => kind,
        }
    }
}

impl TryFrom<Value> for StoredValue {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(mut map) = value else {
            return Err(serde::de::Error::custom("stored value must be an object"));
        };
        if let Some(contract) = map.remove("Contract") {
            return serde_json::from_value(contract).map(Self::Contract);
        }
        if let Some(cl_value) = map.remove("CLValue") {
            return serde_json::from_value(cl_value).map(Self::CLValue);
        }
        Ok(Self::Other(map.keys().next().cloned().unwrap_or_default()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Contract {
    pub contract_package_hash: Hash,
    #[serde(default)]
    pub named_keys: Vec<NamedKey>,
}

impl Contract {
    pub fn named_keys_map(&self) -> HashMap<&str, &Key> {
        self.named_keys
            .iter()
            .map(|nk| (nk.name.as_str(), &nk.key))
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedKey {
    pub name: String,
    pub key: Key,
}

fn hex_bytes<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    hex::decode(raw).map_err(serde::de::Error::custom)
}
