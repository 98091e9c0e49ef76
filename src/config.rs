use serde::Deserialize;

use crate::ces::{EVENT_PREFIX, EVENTS_NAMED_KEY, EVENTS_SCHEMA_NAMED_KEY};

/// Named keys and prefix a CES contract uses. The defaults are the
/// standard's constants; override only for contracts deployed with a
/// non-standard toolkit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub events_named_key: String,
    pub events_schema_named_key: String,
    pub event_prefix: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            events_named_key: EVENTS_NAMED_KEY.to_string(),
            events_schema_named_key: EVENTS_SCHEMA_NAMED_KEY.to_string(),
            event_prefix: EVENT_PREFIX.to_string(),
        }
    }
}
