//! Descriptor-driven CL value decoding on top of `casper_types::bytesrepr`.
//!
//! Casper stores every typed value as its serialized bytes followed by a
//! `CLType` descriptor. The descriptor, keys and big integers come from
//! `casper-types`; [`CLValue`] is the value tree a descriptor walk produces
//! when the concrete Rust type is only known at runtime.

pub mod cltype;
pub mod hash;
pub mod json;
pub mod value;

pub use casper_types::bytesrepr;
pub use casper_types::{AccessRights, CLType, Key, PublicKey, U128, U256, U512, URef};
pub use cltype::{byte_list, cl_type_from_bytes, min_encoded_len};
pub use hash::Hash;
pub use value::CLValue;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("bytesrepr: {0}")]
    Bytesrepr(bytesrepr::Error),

    #[error("values of type Any carry no shape and cannot be decoded")]
    UndecodableAny,

    #[error("length prefix {len} exceeds the {remaining} bytes left")]
    LengthExceedsInput { len: usize, remaining: usize },

    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),
}

impl From<bytesrepr::Error> for DecodeError {
    fn from(err: bytesrepr::Error) -> Self {
        Self::Bytesrepr(err)
    }
}
