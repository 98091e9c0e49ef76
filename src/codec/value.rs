use casper_types::bytesrepr::{
    self, FromBytes, ToBytes, U8_SERIALIZED_LENGTH, U32_SERIALIZED_LENGTH,
};
use casper_types::{CLType, Key, PublicKey, U128, U256, U512, URef};

use crate::codec::DecodeError;
use crate::codec::cltype::min_encoded_len;

const OPTION_NONE_TAG: u8 = 0;
const OPTION_SOME_TAG: u8 = 1;
const RESULT_ERR_TAG: u8 = 0;
const RESULT_OK_TAG: u8 = 1;

/// A decoded CL value. The variant set is closed and mirrors [`CLType`];
/// decoding always dispatches on the descriptor, never on the bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum CLValue {
    Bool(bool),
    I32(i32),
    I64(i64),
    U8(u8),
    U32(u32),
    U64(u64),
    U128(U128),
    U256(U256),
    U512(U512),
    Unit,
    String(String),
    Key(Key),
    URef(URef),
    PublicKey(PublicKey),
    Option(Option<Box<CLValue>>),
    List(Vec<CLValue>),
    ByteArray(Vec<u8>),
    Result(Result<Box<CLValue>, Box<CLValue>>),
    Map(Vec<(CLValue, CLValue)>),
    Tuple1(Box<CLValue>),
    Tuple2(Box<(CLValue, CLValue)>),
    Tuple3(Box<(CLValue, CLValue, CLValue)>),
}

impl CLValue {
    /// Decodes one value of type `ty` from the front of `bytes`, returning
    /// the unread remainder.
    pub fn read<'a>(bytes: &'a [u8], ty: &CLType) -> Result<(Self, &'a [u8]), DecodeError> {
        let decoded = match ty {
            CLType::Bool => scalar(bytes, Self::Bool)?,
            CLType::I32 => scalar(bytes, Self::I32)?,
            CLType::I64 => scalar(bytes, Self::I64)?,
            CLType::U8 => scalar(bytes, Self::U8)?,
            CLType::U32 => scalar(bytes, Self::U32)?,
            CLType::U64 => scalar(bytes, Self::U64)?,
            CLType::U128 => scalar(bytes, Self::U128)?,
            CLType::U256 => scalar(bytes, Self::U256)?,
            CLType::U512 => scalar(bytes, Self::U512)?,
            CLType::Unit => (Self::Unit, bytes),
            CLType::String => scalar(bytes, Self::String)?,
            CLType::Key => scalar(bytes, Self::Key)?,
            CLType::URef => scalar(bytes, Self::URef)?,
            CLType::PublicKey => scalar(bytes, Self::PublicKey)?,
            CLType::Option(inner) => {
                let (tag, rest) = u8::from_bytes(bytes)?;
                match tag {
                    OPTION_NONE_TAG => (Self::Option(None), rest),
                    OPTION_SOME_TAG => {
                        let (value, rest) = Self::read(rest, inner)?;
                        (Self::Option(Some(Box::new(value))), rest)
                    }
                    _ => return Err(bytesrepr::Error::Formatting.into()),
                }
            }
            CLType::List(inner) => {
                let (len, mut rest) = u32::from_bytes(bytes)?;
                let len = checked_len(len, min_encoded_len(inner), rest.len())?;
                let mut items = Vec::with_capacity(len);
                for _ in 0..len {
                    let (item, tail) = Self::read(rest, inner)?;
                    items.push(item);
                    rest = tail;
                }
                (Self::List(items), rest)
            }
            CLType::ByteArray(len) => {
                let (array, rest) = bytesrepr::safe_split_at(bytes, *len as usize)?;
                (Self::ByteArray(array.to_vec()), rest)
            }
            CLType::Result { ok, err } => {
                let (tag, rest) = u8::from_bytes(bytes)?;
                match tag {
                    RESULT_ERR_TAG => {
                        let (value, rest) = Self::read(rest, err)?;
                        (Self::Result(Err(Box::new(value))), rest)
                    }
                    RESULT_OK_TAG => {
                        let (value, rest) = Self::read(rest, ok)?;
                        (Self::Result(Ok(Box::new(value))), rest)
                    }
                    _ => return Err(bytesrepr::Error::Formatting.into()),
                }
            }
            CLType::Map { key, value } => {
                let (len, mut rest) = u32::from_bytes(bytes)?;
                let width = min_encoded_len(key) + min_encoded_len(value);
                let len = checked_len(len, width, rest.len())?;
                let mut entries = Vec::with_capacity(len);
                for _ in 0..len {
                    let (k, tail) = Self::read(rest, key)?;
                    let (v, tail) = Self::read(tail, value)?;
                    entries.push((k, v));
                    rest = tail;
                }
                (Self::Map(entries), rest)
            }
            CLType::Tuple1([inner]) => {
                let (value, rest) = Self::read(bytes, inner)?;
                (Self::Tuple1(Box::new(value)), rest)
            }
            CLType::Tuple2([t1, t2]) => {
                let (first, rest) = Self::read(bytes, t1)?;
                let (second, rest) = Self::read(rest, t2)?;
                (Self::Tuple2(Box::new((first, second))), rest)
            }
            CLType::Tuple3([t1, t2, t3]) => {
                let (first, rest) = Self::read(bytes, t1)?;
                let (second, rest) = Self::read(rest, t2)?;
                let (third, rest) = Self::read(rest, t3)?;
                (Self::Tuple3(Box::new((first, second, third))), rest)
            }
            CLType::Any => return Err(DecodeError::UndecodableAny),
        };
        Ok(decoded)
    }

    /// Decodes `bytes` as exactly one value of type `ty`.
    pub fn from_bytes(bytes: &[u8], ty: &CLType) -> Result<Self, DecodeError> {
        let (value, rest) = Self::read(bytes, ty)?;
        if !rest.is_empty() {
            return Err(DecodeError::TrailingBytes(rest.len()));
        }
        Ok(value)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_key(&self) -> Option<&Key> {
        match self {
            Self::Key(v) => Some(v),
            _ => None,
        }
    }

    fn append_bytes(&self, out: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        match self {
            Self::Bool(v) => out.extend(v.to_bytes()?),
            Self::I32(v) => out.extend(v.to_bytes()?),
            Self::I64(v) => out.extend(v.to_bytes()?),
            Self::U8(v) => out.push(*v),
            Self::U32(v) => out.extend(v.to_bytes()?),
            Self::U64(v) => out.extend(v.to_bytes()?),
            Self::U128(v) => out.extend(v.to_bytes()?),
            Self::U256(v) => out.extend(v.to_bytes()?),
            Self::U512(v) => out.extend(v.to_bytes()?),
            Self::Unit => {}
            Self::String(v) => out.extend(v.to_bytes()?),
            Self::Key(v) => out.extend(v.to_bytes()?),
            Self::URef(v) => out.extend(v.to_bytes()?),
            Self::PublicKey(v) => out.extend(v.to_bytes()?),
            Self::Option(None) => out.push(OPTION_NONE_TAG),
            Self::Option(Some(inner)) => {
                out.push(OPTION_SOME_TAG);
                inner.append_bytes(out)?;
            }
            Self::List(items) => {
                out.extend(encoded_len(items.len())?);
                for item in items {
                    item.append_bytes(out)?;
                }
            }
            Self::ByteArray(bytes) => out.extend_from_slice(bytes),
            Self::Result(Ok(inner)) => {
                out.push(RESULT_OK_TAG);
                inner.append_bytes(out)?;
            }
            Self::Result(Err(inner)) => {
                out.push(RESULT_ERR_TAG);
                inner.append_bytes(out)?;
            }
            Self::Map(entries) => {
                out.extend(encoded_len(entries.len())?);
                for (k, v) in entries {
                    k.append_bytes(out)?;
                    v.append_bytes(out)?;
                }
            }
            Self::Tuple1(inner) => inner.append_bytes(out)?,
            Self::Tuple2(inner) => {
                inner.0.append_bytes(out)?;
                inner.1.append_bytes(out)?;
            }
            Self::Tuple3(inner) => {
                inner.0.append_bytes(out)?;
                inner.1.append_bytes(out)?;
                inner.2.append_bytes(out)?;
            }
        }
        Ok(())
    }
}

impl ToBytes for CLValue {
    fn to_bytes(&self) -> Result<Vec<u8>, bytesrepr::Error> {
        let mut out = Vec::with_capacity(self.serialized_length());
        self.append_bytes(&mut out)?;
        Ok(out)
    }

    fn serialized_length(&self) -> usize {
        match self {
            Self::Bool(v) => v.serialized_length(),
            Self::I32(v) => v.serialized_length(),
            Self::I64(v) => v.serialized_length(),
            Self::U8(_) => U8_SERIALIZED_LENGTH,
            Self::U32(v) => v.serialized_length(),
            Self::U64(v) => v.serialized_length(),
            Self::U128(v) => v.serialized_length(),
            Self::U256(v) => v.serialized_length(),
            Self::U512(v) => v.serialized_length(),
            Self::Unit => 0,
            Self::String(v) => v.serialized_length(),
            Self::Key(v) => v.serialized_length(),
            Self::URef(v) => v.serialized_length(),
            Self::PublicKey(v) => v.serialized_length(),
            Self::Option(inner) => {
                U8_SERIALIZED_LENGTH + inner.as_ref().map_or(0, |v| v.serialized_length())
            }
            Self::List(items) => {
                U32_SERIALIZED_LENGTH + items.iter().map(ToBytes::serialized_length).sum::<usize>()
            }
            Self::ByteArray(bytes) => bytes.len(),
            Self::Result(Ok(inner) | Err(inner)) => {
                U8_SERIALIZED_LENGTH + inner.serialized_length()
            }
            Self::Map(entries) => {
                U32_SERIALIZED_LENGTH
                    + entries
                        .iter()
                        .map(|(k, v)| k.serialized_length() + v.serialized_length())
                        .sum::<usize>()
            }
            Self::Tuple1(inner) => inner.serialized_length(),
            Self::Tuple2(inner) => inner.0.serialized_length() + inner.1.serialized_length(),
            Self::Tuple3(inner) => {
                inner.0.serialized_length()
                    + inner.1.serialized_length()
                    + inner.2.serialized_length()
            }
        }
    }
}

fn scalar<T: FromBytes>(
    bytes: &[u8],
    wrap: impl FnOnce(T) -> CLValue,
) -> Result<(CLValue, &[u8]), DecodeError> {
    let (value, rest) = T::from_bytes(bytes)?;
    Ok((wrap(value), rest))
}

/// A collection's element count may not claim more items than the
/// remaining input can hold. Zero-width elements still cost one byte each
/// against that bound, so `Unit` lists stay proportional to the input.
fn checked_len(len: u32, width: usize, remaining: usize) -> Result<usize, DecodeError> {
    let len = len as usize;
    if len.saturating_mul(width.max(1)) > remaining {
        return Err(DecodeError::LengthExceedsInput { len, remaining });
    }
    Ok(len)
}

fn encoded_len(len: usize) -> Result<Vec<u8>, bytesrepr::Error> {
    u32::try_from(len)
        .map_err(|_| bytesrepr::Error::NotRepresentable)?
        .to_bytes()
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use casper_types::account::AccountHash;

    use super::*;

    #[test]
    fn decodes_ballot_cast_fields_in_order() {
        let voter = [0x56; 32];
        let mut bytes = vec![0x00];
        bytes.extend_from_slice(&voter);
        bytes.extend_from_slice(&[0, 0, 0, 0, 0x00, 0x01, 0x02, 0xe8, 0x03]);

        let types = [CLType::Key, CLType::U32, CLType::U8, CLType::U8, CLType::U512];
        let mut rest = bytes.as_slice();
        let mut values = Vec::new();
        for ty in &types {
            let (value, tail) = CLValue::read(rest, ty).unwrap();
            values.push(value);
            rest = tail;
        }

        assert_eq!(values[0], CLValue::Key(Key::Account(AccountHash::new(voter))));
        assert_eq!(values[1], CLValue::U32(0));
        assert_eq!(values[3], CLValue::U8(1));
        assert_eq!(values[4], CLValue::U512(U512::from(1000_u64)));
        assert!(rest.is_empty());
    }

    #[test]
    fn big_integers_use_minimal_width() {
        assert_eq!(CLValue::U512(U512::zero()).to_bytes().unwrap(), vec![0]);
        let thousand = CLValue::U512(U512::from(1000_u64));
        assert_eq!(thousand.to_bytes().unwrap(), vec![2, 0xe8, 0x03]);
        let max = CLValue::U128(U128::MAX);
        let bytes = max.to_bytes().unwrap();
        assert_eq!(bytes.len(), 17);
        assert_eq!(max.serialized_length(), 17);
        assert_eq!(CLValue::from_bytes(&bytes, &CLType::U128).unwrap(), max);
    }

    #[test]
    fn oversized_integer_is_rejected() {
        let mut bytes = vec![17];
        bytes.extend_from_slice(&[0xff; 17]);
        assert!(matches!(
            CLValue::from_bytes(&bytes, &CLType::U128),
            Err(DecodeError::Bytesrepr(_))
        ));
    }

    #[test]
    fn compound_values_roundtrip() {
        let ty = CLType::Map {
            key: Box::new(CLType::Tuple2([Box::new(CLType::Key), Box::new(CLType::U32)])),
            value: Box::new(CLType::U512),
        };
        let value = CLValue::Map(vec![(
            CLValue::Tuple2(Box::new((CLValue::Key(Key::Hash([1; 32])), CLValue::U32(9)))),
            CLValue::U512(U512::from(5_000_000_u64)),
        )]);
        let bytes = value.to_bytes().unwrap();
        assert_eq!(bytes.len(), value.serialized_length());
        assert_eq!(CLValue::from_bytes(&bytes, &ty).unwrap(), value);

        let result_ty = CLType::Result {
            ok: Box::new(CLType::Option(Box::new(CLType::String))),
            err: Box::new(CLType::U8),
        };
        for value in [
            CLValue::Result(Ok(Box::new(CLValue::Option(Some(Box::new(
                CLValue::String("ok".into()),
            )))))),
            CLValue::Result(Err(Box::new(CLValue::U8(3)))),
        ] {
            let bytes = value.to_bytes().unwrap();
            assert_eq!(CLValue::from_bytes(&bytes, &result_ty).unwrap(), value);
        }
    }

    #[test]
    fn any_cannot_be_decoded() {
        assert_eq!(
            CLValue::from_bytes(&[1, 2], &CLType::Any),
            Err(DecodeError::UndecodableAny)
        );
    }

    #[test]
    fn bad_option_tag_is_rejected() {
        assert_eq!(
            CLValue::from_bytes(&[5], &CLType::Option(Box::new(CLType::U8))),
            Err(DecodeError::Bytesrepr(bytesrepr::Error::Formatting))
        );
    }

    #[test]
    fn huge_list_prefix_fails_without_allocating() {
        let bytes = [0xff, 0xff, 0xff, 0xff, 1];
        assert_eq!(
            CLValue::from_bytes(&bytes, &CLType::List(Box::new(CLType::U8))),
            Err(DecodeError::LengthExceedsInput {
                len: u32::MAX as usize,
                remaining: 1
            })
        );
    }

    #[test]
    fn zero_width_collections_are_bounded_by_input() {
        let unit = || Box::new(CLType::Unit);
        let count = 30_000_000_u32.to_le_bytes();
        for ty in [
            CLType::List(unit()),
            CLType::List(Box::new(CLType::ByteArray(0))),
            CLType::List(Box::new(CLType::Tuple1([unit()]))),
            CLType::Map {
                key: unit(),
                value: unit(),
            },
        ] {
            assert_eq!(
                CLValue::from_bytes(&count, &ty),
                Err(DecodeError::LengthExceedsInput {
                    len: 30_000_000,
                    remaining: 0
                }),
                "{ty:?}"
            );
        }

        // A short unit list followed by as many bytes still decodes.
        let mut bytes = 2_u32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[0, 0]);
        let (value, rest) = CLValue::read(&bytes, &CLType::List(unit())).unwrap();
        assert_eq!(value, CLValue::List(vec![CLValue::Unit, CLValue::Unit]));
        assert_eq!(rest, &[0, 0]);
    }

    #[test]
    fn element_width_bounds_the_count() {
        let mut bytes = 3_u32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[0; 8]);
        assert_eq!(
            CLValue::from_bytes(&bytes, &CLType::List(Box::new(CLType::U32))),
            Err(DecodeError::LengthExceedsInput {
                len: 3,
                remaining: 8
            })
        );
    }
}
