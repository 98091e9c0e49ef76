use std::collections::HashMap;

use serde::Serialize;

use crate::ces::schema::Schemas;
use crate::client::StateClient;
use crate::codec::{Hash, URef};
use crate::config::ParserConfig;
use crate::error::{Error, ResolveStage};
use crate::types::{Contract, StoredValue};

/// Everything needed to attribute and decode a write to one contract's
/// events dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractMetadata {
    pub schemas: Schemas,
    pub contract_hash: Hash,
    pub contract_package_hash: Hash,
    pub events_schema_uref: URef,
    pub events_uref: URef,
}

/// Resolved contracts keyed by the address of their events dictionary.
///
/// Dictionary writes carry only the seed address, so lookups ignore the
/// access bits of the URef they are given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataTable(HashMap<[u8; 32], ContractMetadata>);

impl MetadataTable {
    pub fn get(&self, events_uref: &URef) -> Option<&ContractMetadata> {
        self.0.get(&events_uref.addr())
    }

    pub fn insert(&mut self, metadata: ContractMetadata) -> Option<ContractMetadata> {
        self.0.insert(metadata.events_uref.addr(), metadata)
    }

    pub fn contracts(&self) -> impl Iterator<Item = &ContractMetadata> {
        self.0.values()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<ContractMetadata> for MetadataTable {
    fn from_iter<T: IntoIterator<Item = ContractMetadata>>(iter: T) -> Self {
        let mut table = Self::default();
        for metadata in iter {
            table.insert(metadata);
        }
        table
    }
}

/// Resolves every contract against one state root. Any failure aborts the
/// whole batch; a partial table is never returned.
pub fn load_contracts_metadata<C: StateClient>(
    client: &C,
    contract_hashes: &[Hash],
    config: &ParserConfig,
) -> Result<MetadataTable, Error> {
    let state_root = client.get_state_root_hash_latest()?;
    let mut table = MetadataTable::default();

    for &contract_hash in contract_hashes {
        let contract_key = contract_hash.to_contract_key().to_formatted_string();
        let stored = client
            .query_global_state(Some(&state_root), &contract_key, &[])
            .map_err(|err| err.at_stage(contract_hash, ResolveStage::ContractLookup))?;
        let StoredValue::Contract(contract) = stored else {
            return Err(Error::NotAContract { contract_hash });
        };

        let mut metadata = load_contract_metadata_without_schema(contract_hash, &contract, config)?;
        metadata.schemas = load_contract_event_schemas(
            client,
            &state_root,
            contract_hash,
            &metadata.events_schema_uref,
        )?;

        tracing::debug!(
            %contract_hash,
            events_uref = %metadata.events_uref.to_formatted_string(),
            events = metadata.schemas.len(),
            "resolved contract event metadata"
        );
        table.insert(metadata);
    }

    tracing::info!(contracts = table.len(), "contract metadata table loaded");
    Ok(table)
}

/// Reads the events and events-schema URefs from a contract's named keys.
/// The returned metadata has an empty schema table.
pub fn load_contract_metadata_without_schema(
    contract_hash: Hash,
    contract: &Contract,
    config: &ParserConfig,
) -> Result<ContractMetadata, Error> {
    let named_keys = contract.named_keys_map();
    let uref_for = |name: &str| -> Result<URef, Error> {
        let key = named_keys
            .get(name)
            .ok_or_else(|| Error::MissingRequiredNamedKey {
                contract_hash,
                name: name.to_string(),
            })?;
        key.as_uref().copied().ok_or_else(|| {
            Error::InvalidKey {
                reason: format!(
                    "named key {name} must be a uref, found {}",
                    key.to_formatted_string()
                ),
            }
            .at_stage(contract_hash, ResolveStage::NamedKeyLookup)
        })
    };

    Ok(ContractMetadata {
        schemas: Schemas::default(),
        contract_hash,
        contract_package_hash: contract.contract_package_hash,
        events_schema_uref: uref_for(&config.events_schema_named_key)?,
        events_uref: uref_for(&config.events_named_key)?,
    })
}

/// Fetches and decodes the schema stored under `events_schema_uref`.
/// Failures are tagged with `contract_hash` and the fetch or decode stage.
pub fn load_contract_event_schemas<C: StateClient>(
    client: &C,
    state_root: &Hash,
    contract_hash: Hash,
    events_schema_uref: &URef,
) -> Result<Schemas, Error> {
    let raw = fetch_schema_bytes(client, state_root, events_schema_uref)
        .map_err(|err| err.at_stage(contract_hash, ResolveStage::SchemaFetch))?;
    Schemas::from_bytes(&raw).map_err(|err| err.at_stage(contract_hash, ResolveStage::SchemaDecode))
}

fn fetch_schema_bytes<C: StateClient>(
    client: &C,
    state_root: &Hash,
    events_schema_uref: &URef,
) -> Result<Vec<u8>, Error> {
    // The stored value is typed `Any`; its bytes are the schema encoding.
    let key = events_schema_uref.to_formatted_string();
    match client.query_global_state(Some(state_root), &key, &[])? {
        StoredValue::CLValue(value) => Ok(value.bytes),
        other => Err(Error::ExpectedCLValue {
            found: other.kind().to_string(),
        }),
    }
}
