use crate::codec::Hash;
use crate::error::Error;
use crate::types::StoredValue;

/// The two global-state queries event resolution needs from a node.
///
/// Implementations own transport concerns (timeouts, cancellation, retries);
/// a failed query is surfaced to the caller as-is. Map transport failures
/// to [`Error::Client`].
///
/// No context or deadline is passed through these calls. A deadline or
/// cancellation signal lives in the implementation's own state and must be
/// checked there; resolution stops at the first query that returns an error.
pub trait StateClient {
    /// Hash of the most recent state root.
    fn get_state_root_hash_latest(&self) -> Result<Hash, Error>;

    /// `query_global_state` against `state_root_hash`, or the latest root
    /// when `None`. `key` is a formatted key (`hash-…`, `uref-…`) and `path`
    /// walks named keys from it.
    fn query_global_state(
        &self,
        state_root_hash: Option<&Hash>,
        key: &str,
        path: &[String],
    ) -> Result<StoredValue, Error>;
}

impl<T: StateClient + ?Sized> StateClient for &T {
    fn get_state_root_hash_latest(&self) -> Result<Hash, Error> {
        (**self).get_state_root_hash_latest()
    }

    fn query_global_state(
        &self,
        state_root_hash: Option<&Hash>,
        key: &str,
        path: &[String],
    ) -> Result<StoredValue, Error> {
        (**self).query_global_state(state_root_hash, key, path)
    }
}

impl<T: StateClient + ?Sized> StateClient for Box<T> {
    fn get_state_root_hash_latest(&self) -> Result<Hash, Error> {
        (**self).get_state_root_hash_latest()
    }

    fn query_global_state(
        &self,
        state_root_hash: Option<&Hash>,
        key: &str,
        path: &[String],
    ) -> Result<StoredValue, Error> {
        (**self).query_global_state(state_root_hash, key, path)
    }
}
