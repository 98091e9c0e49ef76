use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

pub const HASH_LENGTH: usize = 32;

/// 32-byte blake2b digest used for contract, package and state root hashes.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash(pub [u8; HASH_LENGTH]);

impl Hash {
    /// Parses bare hex, tolerating the formatted prefixes the node puts on hashes.
    pub fn from_hex(value: &str) -> Result<Self, Error> {
        const PREFIXES: [&str; 5] = [
            "hash-",
            "contract-package-wasm",
            "contract-package-",
            "contract-wasm-",
            "contract-",
        ];
        let raw = PREFIXES
            .iter()
            .find_map(|p| value.strip_prefix(p))
            .unwrap_or(value);
        let bytes = hex::decode(raw)?;
        bytes
            .try_into()
            .map(Self)
            .map_err(|bytes: Vec<u8>| Error::InvalidKey {
                reason: format!("expected {HASH_LENGTH} bytes, got {}", bytes.len()),
            })
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_LENGTH] {
        &self.0
    }

    /// Global-state key of the contract this hash names, e.g. `hash-ea0c…`.
    pub fn to_contract_key(&self) -> casper_types::Key {
        casper_types::Key::Hash(self.0)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.to_hex())
    }
}

impl FromStr for Hash {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
