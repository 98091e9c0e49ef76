use crate::codec::{DecodeError, Hash, bytesrepr};

/// Stage of contract metadata resolution that failed.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum ResolveStage {
    ContractLookup,
    NamedKeyLookup,
    SchemaFetch,
    SchemaDecode,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("malformed dictionary envelope: {reason}")]
    MalformedEnvelope { reason: String },

    #[error("invalid event schema format: {reason}")]
    SchemaFormat { reason: String },

    #[error("invalid key: {reason}")]
    InvalidKey { reason: String },

    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("invalid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("state client error: {reason}")]
    Client { reason: String },

    #[error("contract {contract_hash}: stored value is not a contract")]
    NotAContract { contract_hash: Hash },

    #[error("contract {contract_hash}: missing required named key {name}")]
    MissingRequiredNamedKey { contract_hash: Hash, name: String },

    #[error("contract {contract_hash}: {stage} failed: {source}")]
    Resolve {
        contract_hash: Hash,
        stage: ResolveStage,
        #[source]
        source: Box<Error>,
    },

    #[error("expected a stored CLValue, found {found}")]
    ExpectedCLValue { found: String },

    #[error("execution result has no success branch")]
    NoSuccessfulExecution,

    #[error("transform is not a WriteCLValue")]
    NotAWrite,

    #[error("transform key {key} is not a dictionary key")]
    NotADictionaryKey { key: String },

    #[error("no event prefix in event name {name:?}")]
    NoEventPrefix { name: String },

    #[error("event {name} not found in schema")]
    EventNameNotInSchema { name: String },

    #[error("event {event}: field {field} (#{position}) failed to decode: {source}")]
    FieldDecode {
        event: String,
        field: String,
        position: usize,
        #[source]
        source: DecodeError,
    },

    #[error("event payload error: {reason}")]
    Payload { reason: String },
}

impl From<bytesrepr::Error> for Error {
    fn from(err: bytesrepr::Error) -> Self {
        Self::Decode(DecodeError::Bytesrepr(err))
    }
}

impl Error {
    pub(crate) fn at_stage(self, contract_hash: Hash, stage: ResolveStage) -> Self {
        Self::Resolve {
            contract_hash,
            stage,
            source: Box::new(self),
        }
    }
}
