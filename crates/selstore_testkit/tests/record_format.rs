//! Record log properties: single-record and sequence round trips, corrupt
//! input handling.

use proptest::prelude::*;
use selstore_core::{
    decode_traversed_link, encode_traversed_link, encode_uvarint, CoreError, Link, LinkIterator,
    Path, TraversedLink, DEFAULT_MAX_FRAME_SIZE,
};
use selstore_testkit::{generate_cids, traversed_link_strategy, traversed_links_strategy};

fn encode_all(records: &[TraversedLink]) -> Vec<u8> {
    let mut out = Vec::new();
    for record in records {
        encode_traversed_link(&mut out, record, DEFAULT_MAX_FRAME_SIZE).unwrap();
    }
    out
}

proptest! {
    #[test]
    fn single_record_round_trips(record in traversed_link_strategy()) {
        let bytes = encode_all(std::slice::from_ref(&record));
        let (decoded, used) = decode_traversed_link(&bytes, DEFAULT_MAX_FRAME_SIZE)
            .unwrap()
            .unwrap();
        prop_assert_eq!(used, bytes.len());
        prop_assert_eq!(decoded, record);
    }

    #[test]
    fn sequence_round_trips(records in traversed_links_strategy(24)) {
        let replayed = LinkIterator::new(encode_all(&records)).collect_links().unwrap();
        prop_assert_eq!(replayed, records);
    }

    #[test]
    fn any_truncation_is_an_error(
        records in traversed_links_strategy(4),
        cut in any::<prop::sample::Index>(),
    ) {
        let bytes = encode_all(&records);
        prop_assume!(!bytes.is_empty());
        let cut = cut.index(bytes.len());
        // cutting at a frame boundary is a shorter valid log, not corruption
        let mut boundaries = vec![0];
        let mut pos = 0;
        for record in &records {
            let mut frame = Vec::new();
            encode_traversed_link(&mut frame, record, DEFAULT_MAX_FRAME_SIZE).unwrap();
            pos += frame.len();
            boundaries.push(pos);
        }
        let result = LinkIterator::new(bytes[..cut].to_vec()).collect_links();
        if boundaries.contains(&cut) {
            prop_assert!(result.is_ok());
        } else {
            prop_assert!(result.is_err());
        }
    }
}

#[test]
fn empty_log_yields_no_records() {
    let mut iter = LinkIterator::new(Vec::new());
    assert!(iter.next().is_none());
}

#[test]
fn error_text_distinguishes_success_from_failure() {
    let link = Link::new(generate_cids(1)[0]);
    let records = vec![
        TraversedLink::loaded(link, Path::root()),
        TraversedLink::failed(link, Path::root(), "x"),
        TraversedLink::new(link, Path::root(), Some(String::new())),
    ];
    let replayed = LinkIterator::new(encode_all(&records)).collect_links().unwrap();
    assert_eq!(replayed[0].load_error(), None);
    assert_eq!(replayed[1].load_error(), Some("x"));
    assert_eq!(replayed[2].load_error(), None);
}

fn frame(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    encode_uvarint(&mut out, payload.len() as u64);
    out.extend_from_slice(payload);
    out
}

#[test]
fn truncated_length_varint_stops_iteration() {
    let mut log = encode_all(&[TraversedLink::loaded(
        Link::new(generate_cids(1)[0]),
        Path::parse("a"),
    )]);
    log.push(0x80);

    let mut iter = LinkIterator::new(log);
    assert!(iter.next().unwrap().is_ok());
    assert!(matches!(
        iter.next(),
        Some(Err(CoreError::RecordDecoding { .. }))
    ));
    assert!(iter.next().is_none());
}

#[test]
fn path_length_overrun_is_an_error() {
    let mut payload = generate_cids(1)[0].to_bytes();
    encode_uvarint(&mut payload, 50);
    payload.extend_from_slice(b"short");
    let err = LinkIterator::new(frame(&payload)).collect_links().unwrap_err();
    assert!(matches!(err, CoreError::RecordDecoding { .. }));
}

#[test]
fn oversized_frame_is_an_error() {
    let mut log = Vec::new();
    encode_uvarint(&mut log, (DEFAULT_MAX_FRAME_SIZE + 1) as u64);
    log.extend_from_slice(&[0u8; 16]);
    let err = LinkIterator::new(log).collect_links().unwrap_err();
    assert!(matches!(err, CoreError::RecordDecoding { .. }));
}

#[test]
fn invalid_utf8_error_text_is_an_error() {
    let mut payload = generate_cids(1)[0].to_bytes();
    encode_uvarint(&mut payload, 0);
    payload.extend_from_slice(&[0xc3, 0x28]);
    let err = LinkIterator::new(frame(&payload)).collect_links().unwrap_err();
    assert!(matches!(err, CoreError::RecordDecoding { .. }));
}

#[derive(Debug, PartialEq)]
enum ReplayStop {
    Decode,
    Enough,
}

impl From<CoreError> for ReplayStop {
    fn from(_: CoreError) -> Self {
        Self::Decode
    }
}

#[test]
fn visit_error_stops_replay_early() {
    let records: Vec<_> = generate_cids(5)
        .into_iter()
        .map(|cid| TraversedLink::loaded(Link::new(cid), Path::root()))
        .collect();
    let mut seen = 0;
    let result = LinkIterator::new(encode_all(&records)).iterate(|_| {
        seen += 1;
        if seen == 3 {
            Err(ReplayStop::Enough)
        } else {
            Ok(())
        }
    });
    assert_eq!(result, Err(ReplayStop::Enough));
    assert_eq!(seen, 3);
}
