use std::sync::Arc;

use crate::ces::dictionary::DictionaryEnvelope;
use crate::ces::event::{Event, ParseResult, parse_event_data_from_schema, read_event_name};
use crate::ces::metadata::{ContractMetadata, MetadataTable, load_contracts_metadata};
use crate::client::StateClient;
use crate::codec::{Hash, Key, URef};
use crate::config::ParserConfig;
use crate::error::Error;
use crate::types::{ExecutionResult, StoredValue, TransformEntry};

/// Extracts CES events from execution results for a fixed set of contracts.
///
/// Contract metadata is resolved eagerly on construction and held as an
/// immutable snapshot; [`EventParser::refresh`] builds a new one and swaps
/// it in whole.
pub struct EventParser<C> {
    client: C,
    config: ParserConfig,
    contract_hashes: Vec<Hash>,
    contracts_metadata: Arc<MetadataTable>,
}

impl<C: StateClient> EventParser<C> {
    pub fn new(client: C, contract_hashes: &[Hash]) -> Result<Self, Error> {
        Self::with_config(client, contract_hashes, ParserConfig::default())
    }

    pub fn with_config(
        client: C,
        contract_hashes: &[Hash],
        config: ParserConfig,
    ) -> Result<Self, Error> {
        let table = load_contracts_metadata(&client, contract_hashes, &config)?;
        Ok(Self {
            client,
            config,
            contract_hashes: contract_hashes.to_vec(),
            contracts_metadata: Arc::new(table),
        })
    }

    /// Builds a parser over an already resolved table, e.g. one restored
    /// from persisted schemas.
    pub fn from_metadata(client: C, config: ParserConfig, table: Arc<MetadataTable>) -> Self {
        let contract_hashes = table.contracts().map(|c| c.contract_hash).collect();
        Self {
            client,
            config,
            contract_hashes,
            contracts_metadata: table,
        }
    }

    pub fn contracts_metadata(&self) -> &Arc<MetadataTable> {
        &self.contracts_metadata
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Re-resolves every contract against the latest state root. On failure
    /// the current table is kept.
    pub fn refresh(&mut self) -> Result<(), Error> {
        let table = load_contracts_metadata(&self.client, &self.contract_hashes, &self.config)?;
        self.contracts_metadata = Arc::new(table);
        Ok(())
    }

    /// Raw schema bytes of a contract, read through its schema named key.
    pub fn fetch_contract_schemas_bytes(&self, contract_hash: &Hash) -> Result<Vec<u8>, Error> {
        let stored = self.client.query_global_state(
            None,
            &contract_hash.to_contract_key().to_formatted_string(),
            std::slice::from_ref(&self.config.events_schema_named_key),
        )?;
        match stored {
            StoredValue::CLValue(value) => Ok(value.bytes),
            other => Err(Error::ExpectedCLValue {
                found: other.kind().to_string(),
            }),
        }
    }

    pub fn parse_execution_results(
        &self,
        execution_result: &ExecutionResult,
    ) -> Result<Vec<ParseResult>, Error> {
        extract_events(
            execution_result,
            &self.contracts_metadata,
            &self.config.event_prefix,
        )
    }
}

/// Event name and undecoded field bytes carried by one dictionary write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventMetadata {
    pub name: String,
    pub events_uref: URef,
    pub item_key: String,
    pub payload: Vec<u8>,
}

/// Interprets one transform as an event write, stopping before the schema.
pub fn parse_event_metadata_from_transform(
    entry: &TransformEntry,
    event_prefix: &str,
) -> Result<EventMetadata, Error> {
    let write = entry
        .transform
        .as_write_cl_value()
        .ok_or(Error::NotAWrite)?;
    if !matches!(entry.key, Key::Dictionary(_)) {
        return Err(Error::NotADictionaryKey {
            key: entry.key.to_formatted_string(),
        });
    }

    let envelope = DictionaryEnvelope::from_bytes(&write.bytes)?;
    let (name, fields_bytes) = read_event_name(&envelope.payload, event_prefix)?;
    let payload = fields_bytes.to_vec();

    Ok(EventMetadata {
        name,
        events_uref: envelope.storage_location,
        item_key: envelope.item_key,
        payload,
    })
}

/// Scans the transforms of a successful execution and yields one outcome
/// per write into a watched events dictionary, in transform order.
///
/// Writes that are not events (non-dictionary keys, undecodable envelopes,
/// names without `event_prefix`) or that target an unknown dictionary are
/// skipped. Unknown event names and field decode failures become error
/// outcomes without affecting the rest.
pub fn extract_events(
    execution_result: &ExecutionResult,
    table: &MetadataTable,
    event_prefix: &str,
) -> Result<Vec<ParseResult>, Error> {
    let outcome = execution_result
        .success()
        .ok_or(Error::NoSuccessfulExecution)?;

    let mut results = Vec::new();
    for (transform_id, entry) in outcome.effect.transforms.iter().enumerate() {
        if entry.transform.as_write_cl_value().is_none() {
            continue;
        }
        let metadata = match parse_event_metadata_from_transform(entry, event_prefix) {
            Ok(metadata) => metadata,
            Err(err) => {
                tracing::debug!(
                    transform_id,
                    key = %entry.key.to_formatted_string(),
                    error = %err,
                    "not an event write"
                );
                continue;
            }
        };
        let Some(contract) = table.get(&metadata.events_uref) else {
            tracing::debug!(
                transform_id,
                events_uref = %metadata.events_uref.to_formatted_string(),
                "event write to unwatched dictionary"
            );
            continue;
        };

        let outcome = decode_event(contract, &metadata, transform_id, results.len());
        if let Err(err) = &outcome {
            tracing::warn!(
                transform_id,
                contract_hash = %contract.contract_hash,
                event = %metadata.name,
                error = %err,
                "failed to decode event"
            );
        }
        results.push(ParseResult {
            transform_id,
            outcome,
        });
    }
    Ok(results)
}

fn decode_event(
    contract: &ContractMetadata,
    metadata: &EventMetadata,
    transform_id: usize,
    event_id: usize,
) -> Result<Event, Error> {
    let fields = contract
        .schemas
        .get(&metadata.name)
        .ok_or_else(|| Error::EventNameNotInSchema {
            name: metadata.name.clone(),
        })?;
    let data = parse_event_data_from_schema(&metadata.name, fields, &metadata.payload)?;
    Ok(Event {
        name: metadata.name.clone(),
        contract_hash: contract.contract_hash,
        contract_package_hash: contract.contract_package_hash,
        data,
        transform_id,
        event_id,
    })
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use casper_types::bytesrepr::ToBytes;
    use serde_json::json;

    use super::*;
    use crate::ces::schema::{SchemaField, Schemas};
    use crate::codec::{AccessRights, CLType, DecodeError};

    const VOTING_SCHEMA_HEX: &str = include_str!("../../tests/fixtures/voting_schema.hex");
    const EVENTS_ADDR: [u8; 32] = [0xd2; 32];

    fn table() -> MetadataTable {
        [ContractMetadata {
            schemas: Schemas::from_hex(VOTING_SCHEMA_HEX.trim()).unwrap(),
            contract_hash: Hash([0xaa; 32]),
            contract_package_hash: Hash([0xbb; 32]),
            events_schema_uref: URef::new([0xd3; 32], AccessRights::READ_ADD_WRITE),
            events_uref: URef::new(EVENTS_ADDR, AccessRights::READ_ADD_WRITE),
        }]
        .into_iter()
        .collect()
    }

    fn owner_changed_payload(name: &str) -> Vec<u8> {
        let mut payload = name.to_string().to_bytes().unwrap();
        payload.push(1);
        payload.extend_from_slice(&[0x42; 32]);
        payload
    }

    fn dictionary_write(addr: [u8; 32], payload: Vec<u8>) -> serde_json::Value {
        let envelope = DictionaryEnvelope {
            payload,
            storage_location: URef::new(addr, AccessRights::READ_ADD_WRITE),
            item_key: "0".into(),
        };
        json!({
            "key": format!("dictionary-{}", hex::encode([0x77_u8; 32])),
            "transform": {"WriteCLValue": {
                "cl_type": "Any",
                "bytes": hex::encode(envelope.to_bytes().unwrap()),
                "parsed": null
            }}
        })
    }

    fn success(transforms: Vec<serde_json::Value>) -> ExecutionResult {
        serde_json::from_value(json!({
            "Success": {
                "effect": {"operations": [], "transforms": transforms},
                "transfers": [],
                "cost": "100"
            }
        }))
        .unwrap()
    }

    #[test]
    fn failed_execution_is_rejected_wholesale() {
        let result: ExecutionResult = serde_json::from_value(json!({
            "Failure": {
                "effect": {"operations": [], "transforms": [
                    dictionary_write(EVENTS_ADDR, owner_changed_payload("event_OwnerChanged"))
                ]},
                "transfers": [],
                "cost": "100",
                "error_message": "User error: 7"
            }
        }))
        .unwrap();
        assert!(matches!(
            extract_events(&result, &table(), "event_"),
            Err(Error::NoSuccessfulExecution)
        ));
    }

    #[test]
    fn one_schema_mismatch_among_many_is_isolated() {
        let mut transforms: Vec<_> = (0..5)
            .map(|_| dictionary_write(EVENTS_ADDR, owner_changed_payload("event_OwnerChanged")))
            .collect();
        transforms[2] = dictionary_write(EVENTS_ADDR, owner_changed_payload("event_Renamed"));

        let results = extract_events(&success(transforms), &table(), "event_").unwrap();
        assert_eq!(results.len(), 5);
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 4);
        assert!(matches!(
            results[2].error(),
            Some(Error::EventNameNotInSchema { name }) if name == "Renamed"
        ));
    }

    #[test]
    fn outcomes_follow_transform_order() {
        let transforms = vec![
            json!({"key": format!("hash-{}", hex::encode([1_u8; 32])), "transform": "Identity"}),
            dictionary_write(EVENTS_ADDR, owner_changed_payload("event_OwnerChanged")),
            dictionary_write([0x01; 32], owner_changed_payload("event_OwnerChanged")),
            dictionary_write(EVENTS_ADDR, owner_changed_payload("event_AddedToWhitelist")),
        ];
        let results = extract_events(&success(transforms), &table(), "event_").unwrap();

        let ids: Vec<_> = results.iter().map(|r| r.transform_id).collect();
        assert_eq!(ids, [1, 3]);
        let names: Vec<_> = results
            .iter()
            .map(|r| r.event().unwrap().name.as_str())
            .collect();
        assert_eq!(names, ["OwnerChanged", "AddedToWhitelist"]);
        assert_eq!(results[1].event().unwrap().event_id, 1);
        assert_eq!(results[1].event().unwrap().contract_hash, Hash([0xaa; 32]));
    }

    #[test]
    fn unprefixed_and_non_dictionary_writes_are_skipped() {
        let mut uref_write =
            dictionary_write(EVENTS_ADDR, owner_changed_payload("event_OwnerChanged"));
        uref_write["key"] = json!(format!("uref-{}-007", hex::encode([0x10_u8; 32])));
        let transforms = vec![
            dictionary_write(EVENTS_ADDR, owner_changed_payload("OwnerChanged")),
            uref_write,
        ];
        let results = extract_events(&success(transforms), &table(), "event_").unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn truncated_fields_become_error_outcomes() {
        let mut payload = owner_changed_payload("event_OwnerChanged");
        payload.truncate(payload.len() - 4);
        let results = extract_events(
            &success(vec![dictionary_write(EVENTS_ADDR, payload)]),
            &table(),
            "event_",
        )
        .unwrap();
        assert_eq!(results.len(), 1);
        assert!(matches!(
            results[0].error(),
            Some(Error::FieldDecode { field, .. }) if field == "new_owner"
        ));
    }

    #[test]
    fn oversized_zero_width_list_is_an_isolated_error() {
        let mut table = table();
        let mut contract = table.get(&URef::new(EVENTS_ADDR, AccessRights::READ)).unwrap().clone();
        contract.schemas.insert(
            "Flood",
            vec![SchemaField {
                name: "ticks".into(),
                ty: CLType::List(Box::new(CLType::Unit)),
            }],
        );
        table.insert(contract);

        let mut flood = String::from("event_Flood").to_bytes().unwrap();
        flood.extend_from_slice(&u32::MAX.to_le_bytes());
        let transforms = vec![
            dictionary_write(EVENTS_ADDR, flood),
            dictionary_write(EVENTS_ADDR, owner_changed_payload("event_OwnerChanged")),
        ];
        let results = extract_events(&success(transforms), &table, "event_").unwrap();

        assert_eq!(results.len(), 2);
        assert!(matches!(
            results[0].error(),
            Some(Error::FieldDecode { field, source: DecodeError::LengthExceedsInput { .. }, .. })
                if field == "ticks"
        ));
        assert!(results[1].is_ok());
    }

    #[test]
    fn custom_prefix_is_stripped() {
        let transforms = vec![dictionary_write(
            EVENTS_ADDR,
            owner_changed_payload("evt:OwnerChanged"),
        )];
        let results = extract_events(&success(transforms), &table(), "evt:").unwrap();
        assert_eq!(results[0].event().unwrap().name, "OwnerChanged");
    }

    #[test]
    fn transform_metadata_exposes_remaining_payload() {
        let entry: TransformEntry = serde_json::from_value(dictionary_write(
            EVENTS_ADDR,
            owner_changed_payload("event_OwnerChanged"),
        ))
        .unwrap();
        let metadata = parse_event_metadata_from_transform(&entry, "event_").unwrap();
        assert_eq!(metadata.name, "OwnerChanged");
        assert_eq!(metadata.item_key, "0");
        assert_eq!(metadata.events_uref.addr(), EVENTS_ADDR);
        assert_eq!(metadata.payload.len(), 33);
    }
}
