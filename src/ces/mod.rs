//! Casper Event Standard: events written by contracts into an `__events`
//! dictionary and described by an `__events_schema` value.

pub mod dictionary;
pub mod event;
pub mod metadata;
pub mod parser;
pub mod schema;

pub const EVENTS_NAMED_KEY: &str = "__events";
pub const EVENTS_SCHEMA_NAMED_KEY: &str = "__events_schema";
pub const EVENT_PREFIX: &str = "event_";
