//! Fuzz testing harnesses for selstore.
//!
//! Each target takes arbitrary bytes and must never panic. They can be
//! wired to cargo-fuzz, and the tests below drive them with proptest.

use selstore_codec::{from_cbor, to_canonical_cbor};
use selstore_core::{LinkIterator, Path, StoreKey, DAG_CBOR_CODEC};

/// Fuzz target for record log decoding.
///
/// Every input either decodes to a sequence of records or stops at the
/// first error; the iterator yields at most one error and then ends.
pub fn fuzz_record_decode(data: &[u8]) {
    let mut iter = LinkIterator::with_max_frame_size(data.to_vec(), 4096);
    let mut errors = 0;
    for item in iter.by_ref() {
        if item.is_err() {
            errors += 1;
        }
    }
    assert!(errors <= 1, "iterator yielded more than one error");
    assert!(iter.next().is_none(), "iterator resumed after ending");
}

/// Fuzz target for storage key decoding.
///
/// Whatever decodes must derive back to the same bytes.
pub fn fuzz_key_decode(data: &[u8]) {
    let key = StoreKey::from_bytes(data.to_vec());
    if let Ok((root, selector)) = key.decode(DAG_CBOR_CODEC) {
        let rederived = StoreKey::derive(&root, &selector).expect("decoded selector re-encodes");
        assert_eq!(rederived, key, "key did not survive decode and derive");
    }
}

/// Fuzz target for selector encoding.
///
/// Anything the decoder accepts re-encodes to the same bytes.
pub fn fuzz_selector_roundtrip(data: &[u8]) {
    if let Ok(value) = from_cbor(data) {
        let encoded = to_canonical_cbor(&value).expect("decoded value re-encodes");
        assert_eq!(encoded, data, "canonical encoding is not unique");
    }
}

/// Fuzz target for path parsing.
///
/// Parsing is idempotent through the string form.
pub fn fuzz_path_parse(data: &[u8]) {
    let text = String::from_utf8_lossy(data);
    let path = Path::parse(&text);
    assert_eq!(Path::parse(&path.to_string()), path);
    assert!(path.unrepresentable_segment().is_none());
}
