use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use casper_types::bytesrepr::{self, FromBytes, ToBytes};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ces::event::{EventData, parse_event_data_from_schema};
use crate::codec::{CLType, Hash, cl_type_from_bytes};
use crate::error::Error;

/// One declared event field. Fields are decoded in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaField {
    pub name: String,
    pub ty: CLType,
}

#[derive(Serialize, Deserialize)]
struct SchemaFieldRepr {
    name: String,
    bytes: String,
}

impl Serialize for SchemaField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let ty = self.ty.to_bytes().map_err(serde::ser::Error::custom)?;
        SchemaFieldRepr {
            name: self.name.clone(),
            bytes: STANDARD.encode(ty),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SchemaField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = SchemaFieldRepr::deserialize(deserializer)?;
        let raw = STANDARD
            .decode(&repr.bytes)
            .map_err(serde::de::Error::custom)?;
        let ty = cl_type_from_bytes(&raw).map_err(serde::de::Error::custom)?;
        Ok(Self {
            name: repr.name,
            ty,
        })
    }
}

impl ToBytes for SchemaField {
    fn to_bytes(&self) -> Result<Vec<u8>, bytesrepr::Error> {
        let mut out = self.name.to_bytes()?;
        out.extend(self.ty.to_bytes()?);
        Ok(out)
    }

    fn serialized_length(&self) -> usize {
        self.name.serialized_length() + self.ty.serialized_length()
    }
}

impl FromBytes for SchemaField {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (name, rest) = String::from_bytes(bytes)?;
        let (ty, rest) = CLType::from_bytes(rest)?;
        Ok((Self { name, ty }, rest))
    }
}

/// A contract's event catalogue: event name to ordered field list.
///
/// On chain this is a `Map(String, List(Tuple2(String, CLType)))` whose
/// inner `CLType` is itself serialized, so every field type is read from
/// its own self-describing encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schemas(BTreeMap<String, Vec<SchemaField>>);

impl Schemas {
    pub fn from_bytes(raw: &[u8]) -> Result<Self, Error> {
        let (schemas, rest) = BTreeMap::<String, Vec<SchemaField>>::from_bytes(raw).map_err(
            |err| Error::SchemaFormat {
                reason: err.to_string(),
            },
        )?;
        if !rest.is_empty() {
            tracing::debug!(trailing = rest.len(), "ignoring bytes after event schema");
        }
        Ok(Self(schemas))
    }

    pub fn from_hex(raw: &str) -> Result<Self, Error> {
        Self::from_bytes(&hex::decode(raw)?)
    }

    /// Canonical on-chain encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        Ok(self.0.to_bytes()?)
    }

    pub fn from_json(raw: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn get(&self, event_name: &str) -> Option<&[SchemaField]> {
        self.0.get(event_name).map(Vec::as_slice)
    }

    pub fn insert(&mut self, event_name: impl Into<String>, fields: Vec<SchemaField>) {
        self.0.insert(event_name.into(), fields);
    }

    pub fn event_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decodes a bare event payload (no envelope, no name) into JSON values.
    pub fn parse_event_payload(
        &self,
        event_name: &str,
        payload: &[u8],
    ) -> Result<EventPayload, Error> {
        let fields = self
            .get(event_name)
            .ok_or_else(|| Error::EventNameNotInSchema {
                name: event_name.to_string(),
            })?;
        let data = parse_event_data_from_schema(event_name, fields, payload)?;
        Ok(EventPayload::from(&data))
    }

    pub fn parse_event_raw_data_payload(
        &self,
        event_name: &str,
        raw_hex: &str,
    ) -> Result<EventPayload, Error> {
        self.parse_event_payload(event_name, &hex::decode(raw_hex)?)
    }
}

impl FromIterator<(String, Vec<SchemaField>)> for Schemas {
    fn from_iter<T: IntoIterator<Item = (String, Vec<SchemaField>)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Event fields rendered as JSON, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EventPayload(serde_json::Map<String, serde_json::Value>);

impl EventPayload {
    pub fn string_param(&self, key: &str) -> Result<&str, Error> {
        let raw = self.0.get(key).ok_or_else(|| Error::Payload {
            reason: format!("failed to get '{key}' param from ces event payload"),
        })?;
        raw.as_str().ok_or_else(|| Error::Payload {
            reason: format!("'{key}' param is not a string: {raw}"),
        })
    }

    /// Reads a hash-valued param; key-typed fields render with a prefix
    /// such as `hash-`, which is tolerated.
    pub fn hash_param(&self, key: &str) -> Result<Hash, Error> {
        Hash::from_hex(self.string_param(key)?)
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    pub fn into_map(self) -> serde_json::Map<String, serde_json::Value> {
        self.0
    }
}

impl From<&EventData> for EventPayload {
    fn from(data: &EventData) -> Self {
        Self(
            data.iter()
                .map(|(name, value)| (name.to_string(), value.to_json()))
                .collect(),
        )
    }
}
