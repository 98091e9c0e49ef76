use casper_types::AsymmetricType;
use serde_json::{Map, Value};

use crate::codec::CLValue;

impl CLValue {
    /// Renders the value as plain JSON.
    ///
    /// Integers that fit a JSON number stay numeric; `U128`/`U256`/`U512`
    /// become decimal strings. Keys, URefs and public keys use their
    /// formatted text form, byte arrays are hex. A `None` option and an
    /// `Err` result both render as `null`.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Bool(v) => Value::Bool(*v),
            Self::I32(v) => Value::from(*v),
            Self::I64(v) => Value::from(*v),
            Self::U8(v) => Value::from(*v),
            Self::U32(v) => Value::from(*v),
            Self::U64(v) => Value::from(*v),
            Self::U128(v) => Value::String(v.to_string()),
            Self::U256(v) => Value::String(v.to_string()),
            Self::U512(v) => Value::String(v.to_string()),
            Self::Unit => Value::Null,
            Self::String(v) => Value::String(v.clone()),
            Self::Key(v) => Value::String(v.to_formatted_string()),
            Self::URef(v) => Value::String(v.to_formatted_string()),
            Self::PublicKey(v) => Value::String(v.to_hex()),
            Self::Option(inner) => inner.as_ref().map_or(Value::Null, |v| v.to_json()),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::ByteArray(bytes) => Value::String(hex::encode(bytes)),
            Self::Result(Ok(inner)) => inner.to_json(),
            Self::Result(Err(_)) => Value::Null,
            Self::Map(entries) => {
                let mut map = Map::with_capacity(entries.len());
                for (k, v) in entries {
                    map.insert(json_map_key(k), v.to_json());
                }
                Value::Object(map)
            }
            Self::Tuple1(inner) => inner.to_json(),
            Self::Tuple2(inner) => Value::Array(vec![inner.0.to_json(), inner.1.to_json()]),
            Self::Tuple3(inner) => Value::Array(vec![
                inner.0.to_json(),
                inner.1.to_json(),
                inner.2.to_json(),
            ]),
        }
    }
}

fn json_map_key(key: &CLValue) -> String {
    match key.to_json() {
        Value::String(s) => s,
        other => other.to_string(),
    }
}
