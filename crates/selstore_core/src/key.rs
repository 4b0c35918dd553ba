//! Storage keys for (root, selector) pairs.
//!
//! A key is the root's multihash bytes followed by the canonical CBOR
//! encoding of the selector. The multihash is self-delimiting, so a key can
//! be split back into its parts without a separator.

use crate::error::{CoreError, CoreResult};
use cid::Cid;
use multihash::Multihash;
use selstore_codec::{from_cbor, CanonicalEncoder, Value};
use std::fmt;
use std::io::Cursor;

/// Version of the key layout. Bump on any change to derivation.
pub const KEY_FORMAT_VERSION: u32 = 1;

/// An opaque datastore key identifying one traversal.
///
/// Two roots sharing a multihash but differing in codec or CID version map
/// to the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoreKey(Vec<u8>);

impl StoreKey {
    /// Derives the key for traversing `selector` from `root`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::KeyDerivation`] if the selector cannot be
    /// canonically encoded.
    pub fn derive(root: &Cid, selector: &Value) -> CoreResult<Self> {
        let mut encoder = CanonicalEncoder::with_prefix(root.hash().to_bytes());
        encoder.encode(selector).map_err(CoreError::KeyDerivation)?;
        Ok(Self(encoder.into_bytes()))
    }

    /// Wraps raw key bytes, as read back from a datastore listing.
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Splits the key into a version 1 root CID with `codec` and the
    /// selector.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::KeyDecoding`] if the key does not start with a
    /// valid multihash or the remainder is not a canonical selector.
    pub fn decode(&self, codec: u64) -> CoreResult<(Cid, Value)> {
        let mut cursor = Cursor::new(self.0.as_slice());
        let hash = Multihash::<64>::read(&mut cursor)
            .map_err(|e| CoreError::key_decoding(format!("invalid multihash prefix: {e}")))?;
        let offset = usize::try_from(cursor.position())
            .map_err(|_| CoreError::key_decoding("multihash prefix too long"))?;
        let selector = from_cbor(&self.0[offset..])
            .map_err(|e| CoreError::key_decoding(format!("invalid selector encoding: {e}")))?;
        Ok((Cid::new_v1(codec, hash), selector))
    }

    /// The raw key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consumes the key, returning its bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for StoreKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DAG_CBOR_CODEC;
    use selstore_codec::{to_canonical_cbor, MAX_NESTING_DEPTH};
    use sha2::{Digest, Sha256};

    const RAW_CODEC: u64 = 0x55;

    fn cid_of(data: &[u8], codec: u64) -> Cid {
        let hash = Multihash::<64>::wrap(0x12, &Sha256::digest(data)).unwrap();
        Cid::new_v1(codec, hash)
    }

    fn match_point() -> Value {
        Value::text_map([(".", Value::empty_map())])
    }

    fn nested(depth: usize) -> Value {
        (0..depth).fold(Value::Null, |inner, _| Value::Array(vec![inner]))
    }

    #[test]
    fn key_is_hash_then_selector() {
        let root = cid_of(b"root", DAG_CBOR_CODEC);
        let key = StoreKey::derive(&root, &match_point()).unwrap();

        let mut expected = root.hash().to_bytes();
        expected.extend(to_canonical_cbor(&match_point()).unwrap());
        assert_eq!(key.as_bytes(), expected.as_slice());
    }

    #[test]
    fn key_ignores_root_codec() {
        let a = StoreKey::derive(&cid_of(b"x", DAG_CBOR_CODEC), &match_point()).unwrap();
        let b = StoreKey::derive(&cid_of(b"x", RAW_CODEC), &match_point()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_inputs_give_distinct_keys() {
        let root = cid_of(b"x", DAG_CBOR_CODEC);
        let other_root = cid_of(b"y", DAG_CBOR_CODEC);
        let other_selector = Value::text_map([("a", Value::empty_map())]);

        let key = StoreKey::derive(&root, &match_point()).unwrap();
        assert_ne!(key, StoreKey::derive(&other_root, &match_point()).unwrap());
        assert_ne!(key, StoreKey::derive(&root, &other_selector).unwrap());
    }

    #[test]
    fn decode_reverses_derive() {
        let root = cid_of(b"root", DAG_CBOR_CODEC);
        let key = StoreKey::derive(&root, &match_point()).unwrap();
        let (decoded_root, selector) = key.decode(DAG_CBOR_CODEC).unwrap();
        assert_eq!(decoded_root, root);
        assert_eq!(selector, match_point());
    }

    #[test]
    fn decode_rejects_garbage() {
        let err = StoreKey::from_bytes(vec![0x12]).decode(DAG_CBOR_CODEC).unwrap_err();
        assert!(matches!(err, CoreError::KeyDecoding { .. }));

        let root = cid_of(b"root", DAG_CBOR_CODEC);
        let mut bytes = StoreKey::derive(&root, &match_point()).unwrap().into_bytes();
        bytes.push(0x00);
        let err = StoreKey::from_bytes(bytes).decode(DAG_CBOR_CODEC).unwrap_err();
        assert!(matches!(err, CoreError::KeyDecoding { .. }));
    }

    #[test]
    fn over_deep_selector_fails_derivation() {
        let root = cid_of(b"root", DAG_CBOR_CODEC);
        let err = StoreKey::derive(&root, &nested(MAX_NESTING_DEPTH + 1)).unwrap_err();
        assert!(matches!(err, CoreError::KeyDerivation(_)));
    }

    #[test]
    fn display_is_hex() {
        let key = StoreKey::from_bytes(vec![0xde, 0xad]);
        assert_eq!(key.to_string(), "dead");
    }
}
