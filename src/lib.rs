#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::dbg_macro,
        clippy::print_stdout,
        clippy::print_stderr,
        clippy::panic,
    )
)]

pub mod ces;
pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod types;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use ces::dictionary::DictionaryEnvelope;
pub use ces::event::{
    Event, EventData, ParseResult, parse_event_data_from_schema, parse_event_name_and_data,
};
pub use ces::metadata::{
    ContractMetadata, MetadataTable, load_contract_event_schemas,
    load_contract_metadata_without_schema, load_contracts_metadata,
};
pub use ces::parser::{
    EventMetadata, EventParser, extract_events, parse_event_metadata_from_transform,
};
pub use ces::schema::{EventPayload, SchemaField, Schemas};
pub use client::StateClient;
pub use codec::{CLType, CLValue, DecodeError, Hash, Key, URef};
pub use config::ParserConfig;
pub use error::{Error, ResolveStage};
pub use types::{BlockExecutionResult, ExecutionResult, StoredValue};
