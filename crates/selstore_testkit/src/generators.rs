//! Property-based test generators using proptest.
//!
//! Strategies produce values that satisfy the record format's constraints:
//! path segments are non-empty and never contain `/`, and load errors are
//! never the empty string.

use crate::fixtures::{cid_for, RAW_CODEC};
use cid::Cid;
use proptest::prelude::*;
use selstore_codec::Value;
use selstore_core::{Link, Path, PathSegment, TraversedLink, DAG_CBOR_CODEC};

/// Strategy for CIDs over random content, raw or dag-cbor.
pub fn cid_strategy() -> impl Strategy<Value = Cid> {
    (
        prop_oneof![Just(RAW_CODEC), Just(DAG_CBOR_CODEC)],
        prop::collection::vec(any::<u8>(), 0..64),
    )
        .prop_map(|(codec, data)| cid_for(codec, &data))
}

/// Strategy for links.
pub fn link_strategy() -> impl Strategy<Value = Link> {
    cid_strategy().prop_map(Link::new)
}

/// Strategy for path segments: map keys or list indexes.
pub fn path_segment_strategy() -> impl Strategy<Value = PathSegment> {
    prop_oneof![
        prop::string::string_regex("[a-zA-Z_][a-zA-Z0-9_.-]{0,15}")
            .expect("Invalid regex")
            .prop_map(PathSegment::from),
        (0usize..1000).prop_map(PathSegment::from),
    ]
}

/// Strategy for paths of up to `max_len` segments.
pub fn path_strategy(max_len: usize) -> impl Strategy<Value = Path> {
    prop::collection::vec(path_segment_strategy(), 0..=max_len)
        .prop_map(|segments| Path::new(segments))
}

/// Strategy for load error messages, including non-ASCII text.
pub fn load_error_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::of(
        prop::string::string_regex("[ -~äöü€]{1,64}").expect("Invalid regex"),
    )
}

/// Strategy for single records.
pub fn traversed_link_strategy() -> impl Strategy<Value = TraversedLink> {
    (link_strategy(), path_strategy(6), load_error_strategy())
        .prop_map(|(link, path, error)| TraversedLink::new(link, path, error))
}

/// Strategy for record sequences of up to `max_len` entries.
pub fn traversed_links_strategy(max_len: usize) -> impl Strategy<Value = Vec<TraversedLink>> {
    prop::collection::vec(traversed_link_strategy(), 0..=max_len)
}

/// Strategy for selector-shaped values: nested text-keyed maps and lists
/// with scalar leaves.
pub fn selector_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::empty_map()),
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Integer),
        "[a-z>:@.|]{0,8}".prop_map(Value::Text),
    ];
    leaf.prop_recursive(5, 48, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-zA-Z>:@.|]{1,4}", inner, 1..4)
                .prop_map(|pairs| Value::text_map(pairs)),
        ]
    })
}

/// A selector and root pair.
pub fn root_and_selector_strategy() -> impl Strategy<Value = (Cid, Value)> {
    (cid_strategy(), selector_strategy())
}
