use std::fmt::Display;

use casper_types::bytesrepr::{FromBytes, ToBytes};

use crate::codec::{AccessRights, URef, byte_list};
use crate::error::Error;

const UREF_ADDR_LENGTH: usize = 32;

/// A dictionary entry as written to global state: the stored value, the
/// dictionary's seed URef address, and the item key, each length-prefixed.
///
/// For CES the stored value is always a `List(U8)` holding the event bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryEnvelope {
    pub payload: Vec<u8>,
    pub storage_location: URef,
    pub item_key: String,
}

impl DictionaryEnvelope {
    pub fn from_bytes(source: &[u8]) -> Result<Self, Error> {
        let (stored, rest) =
            casper_types::CLValue::from_bytes(source).map_err(malformed("payload"))?;
        if *stored.cl_type() != byte_list() {
            return Err(Error::MalformedEnvelope {
                reason: format!("payload must be List(U8), found {:?}", stored.cl_type()),
            });
        }
        let payload: Vec<u8> = stored.into_t().map_err(malformed("payload"))?;

        // The seed address carries its own length prefix; only the fixed
        // width that follows is trusted.
        let (_, rest) = u32::from_bytes(rest).map_err(malformed("uref"))?;
        let (addr, rest) = <[u8; UREF_ADDR_LENGTH]>::from_bytes(rest).map_err(malformed("uref"))?;
        let (item_key, _) = String::from_bytes(rest).map_err(malformed("item key"))?;

        Ok(Self {
            payload,
            storage_location: URef::new(addr, AccessRights::READ_ADD_WRITE),
            item_key,
        })
    }

    pub fn from_hex(source: &str) -> Result<Self, Error> {
        Self::from_bytes(&hex::decode(source)?)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let stored =
            casper_types::CLValue::from_t(self.payload.clone()).map_err(malformed("payload"))?;
        let mut out = stored.to_bytes()?;
        out.extend((UREF_ADDR_LENGTH as u32).to_bytes()?);
        out.extend(self.storage_location.addr().to_bytes()?);
        out.extend(self.item_key.to_bytes()?);
        Ok(out)
    }
}

fn malformed<E: Display>(part: &'static str) -> impl Fn(E) -> Error {
    move |err| Error::MalformedEnvelope {
        reason: format!("{part}: {err}"),
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;

    const BALLOT_CAST_HEX: &str = "420000003e000000100000006576656e745f42616c6c6f74436173740056befc13a6fd62e18f361700a5e08f966901c34df8041b36ec97d54d605c23de00000000000102e8030e0320000000d2263e86f497f42e405d5d1390aa3c1a8bfc35f3699fdc3be806a5cfe139dac90100000032";

    fn lcg_next(state: &mut u64) -> u64 {
        *state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1);
        *state
    }

    #[test]
    fn decodes_ballot_cast_envelope() {
        let envelope = DictionaryEnvelope::from_hex(BALLOT_CAST_HEX).unwrap();
        assert_eq!(envelope.payload.len(), 62);
        assert_eq!(envelope.item_key, "2");
        assert_eq!(
            envelope.storage_location.to_formatted_string(),
            "uref-d2263e86f497f42e405d5d1390aa3c1a8bfc35f3699fdc3be806a5cfe139dac9-007"
        );
        let (name, _) = String::from_bytes(&envelope.payload).unwrap();
        assert_eq!(name, "event_BallotCast");
    }

    #[test]
    fn reencoding_reproduces_source_bytes() {
        let source = hex::decode(BALLOT_CAST_HEX).unwrap();
        let envelope = DictionaryEnvelope::from_bytes(&source).unwrap();
        assert_eq!(envelope.to_bytes().unwrap(), source);
    }

    #[test]
    fn constructed_envelopes_decode_to_their_parts() {
        let mut seed = 0x5EED_u64;
        for _ in 0..500 {
            let payload_len = (lcg_next(&mut seed) % 96) as usize;
            let payload: Vec<u8> = (0..payload_len)
                .map(|_| lcg_next(&mut seed) as u8)
                .collect();
            let mut addr = [0_u8; 32];
            for b in &mut addr {
                *b = lcg_next(&mut seed) as u8;
            }
            let item_key = (lcg_next(&mut seed) % 10_000).to_string();

            let envelope = DictionaryEnvelope {
                payload,
                storage_location: URef::new(addr, AccessRights::READ_ADD_WRITE),
                item_key,
            };
            let decoded = DictionaryEnvelope::from_bytes(&envelope.to_bytes().unwrap()).unwrap();
            assert_eq!(decoded, envelope);
        }
    }

    #[test]
    fn non_byte_list_payload_is_rejected() {
        // List(U32) with a single element.
        let mut bytes = vec![8, 0, 0, 0, 1, 0, 0, 0, 7, 0, 0, 0, 0x0e, 0x04];
        bytes.extend_from_slice(&[32, 0, 0, 0]);
        bytes.extend_from_slice(&[0; 32]);
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        let err = DictionaryEnvelope::from_bytes(&bytes).unwrap_err();
        assert!(
            matches!(&err, Error::MalformedEnvelope { reason } if reason.contains("List(U32)")),
            "got {err}"
        );
    }

    #[test]
    fn truncated_envelope_is_rejected() {
        let source = hex::decode(BALLOT_CAST_HEX).unwrap();
        for cut in [3, 40, 70, source.len() - 1] {
            assert!(
                matches!(
                    DictionaryEnvelope::from_bytes(&source[..cut]),
                    Err(Error::MalformedEnvelope { .. })
                ),
                "cut at {cut}"
            );
        }
    }

    #[test]
    fn payload_length_mismatch_is_rejected() {
        let mut source = hex::decode(BALLOT_CAST_HEX).unwrap();
        // Inner list claims one more element than the value bytes hold.
        source[4] = 0x3f;
        assert!(matches!(
            DictionaryEnvelope::from_bytes(&source),
            Err(Error::MalformedEnvelope { .. })
        ));
    }
}
