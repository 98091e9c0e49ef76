use casper_types::bytesrepr::FromBytes;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::ces::EVENT_PREFIX;
use crate::ces::dictionary::DictionaryEnvelope;
use crate::ces::schema::{SchemaField, Schemas};
use crate::codec::{CLValue, Hash};
use crate::error::Error;

/// Decoded event fields in schema declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventData(Vec<(String, CLValue)>);

impl EventData {
    pub fn get(&self, field: &str) -> Option<&CLValue> {
        self.0
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CLValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for EventData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, &value.to_json())?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub name: String,
    pub contract_hash: Hash,
    pub contract_package_hash: Hash,
    pub data: EventData,
    /// Index of the originating transform in the execution effect.
    pub transform_id: usize,
    /// Index of this outcome among all outcomes of the same execution result.
    pub event_id: usize,
}

/// Outcome for one transform that wrote to a watched events dictionary.
#[derive(Debug)]
pub struct ParseResult {
    pub transform_id: usize,
    pub outcome: Result<Event, Error>,
}

impl ParseResult {
    pub fn event(&self) -> Option<&Event> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&Error> {
        self.outcome.as_ref().err()
    }

    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Parses a standalone hex envelope against a schema table, without any
/// contract identity. A payload whose name lacks the `event_` prefix is
/// reported as [`Error::NoEventPrefix`].
pub fn parse_event_name_and_data(
    raw_hex: &str,
    schemas: &Schemas,
) -> Result<(String, EventData), Error> {
    let envelope = DictionaryEnvelope::from_hex(raw_hex)?;
    let (name, fields_bytes) = read_event_name(&envelope.payload, EVENT_PREFIX)?;
    let fields = schemas
        .get(&name)
        .ok_or_else(|| Error::EventNameNotInSchema { name: name.clone() })?;
    let data = parse_event_data_from_schema(&name, fields, fields_bytes)?;
    Ok((name, data))
}

/// Reads the length-prefixed event name and strips `prefix` from it,
/// returning the field bytes that follow.
pub(crate) fn read_event_name<'a>(
    payload: &'a [u8],
    prefix: &str,
) -> Result<(String, &'a [u8]), Error> {
    let (raw, rest) = String::from_bytes(payload)?;
    match raw.strip_prefix(prefix) {
        Some(name) => Ok((name.to_string(), rest)),
        None => Err(Error::NoEventPrefix { name: raw }),
    }
}

/// Reads one value per schema field, strictly in declaration order.
pub fn parse_event_data_from_schema(
    event: &str,
    fields: &[SchemaField],
    payload: &[u8],
) -> Result<EventData, Error> {
    let mut data = Vec::with_capacity(fields.len());
    let mut rest = payload;
    for (position, field) in fields.iter().enumerate() {
        let (value, tail) = CLValue::read(rest, &field.ty).map_err(|source| Error::FieldDecode {
            event: event.to_string(),
            field: field.name.clone(),
            position,
            source,
        })?;
        data.push((field.name.clone(), value));
        rest = tail;
    }
    if !rest.is_empty() {
        tracing::debug!(
            event,
            trailing = rest.len(),
            "event payload has bytes after the last schema field"
        );
    }
    Ok(EventData(data))
}
