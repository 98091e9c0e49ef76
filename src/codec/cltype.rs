use casper_types::CLType;
use casper_types::bytesrepr::FromBytes;

use crate::codec::DecodeError;

/// `List(U8)`, the descriptor of dictionary payloads.
pub fn byte_list() -> CLType {
    CLType::List(Box::new(CLType::U8))
}

/// Decodes exactly one serialized descriptor. Nesting depth is capped by
/// `casper_types`.
pub fn cl_type_from_bytes(bytes: &[u8]) -> Result<CLType, DecodeError> {
    let (ty, rest) = CLType::from_bytes(bytes)?;
    if !rest.is_empty() {
        return Err(DecodeError::TrailingBytes(rest.len()));
    }
    Ok(ty)
}

/// Fewest bytes any value of `ty` can occupy. Zero for shapes like `Unit`,
/// `ByteArray(0)` or `Tuple1(Unit)`.
pub fn min_encoded_len(ty: &CLType) -> usize {
    match ty {
        CLType::Unit | CLType::Any => 0,
        CLType::Bool
        | CLType::U8
        | CLType::U128
        | CLType::U256
        | CLType::U512
        | CLType::Option(_)
        | CLType::Result { .. }
        | CLType::PublicKey => 1,
        CLType::I32 | CLType::U32 | CLType::String | CLType::List(_) | CLType::Map { .. } => 4,
        CLType::I64 | CLType::U64 => 8,
        // Tag plus the shortest payload (an era id).
        CLType::Key => 9,
        CLType::URef => 33,
        CLType::ByteArray(len) => *len as usize,
        CLType::Tuple1([a]) => min_encoded_len(a),
        CLType::Tuple2([a, b]) => min_encoded_len(a) + min_encoded_len(b),
        CLType::Tuple3([a, b, c]) => min_encoded_len(a) + min_encoded_len(b) + min_encoded_len(c),
    }
}
