//! Benchmark utilities.

use selstore_core::{
    encode_traversed_link, Link, Path, PathSegment, TraversedLink, DEFAULT_MAX_FRAME_SIZE,
};
use selstore_testkit::generate_cids;

/// Generate `count` traversed links with paths `depth` segments deep.
///
/// Every tenth record carries a load failure.
pub fn generate_records(count: usize, depth: usize) -> Vec<TraversedLink> {
    generate_cids(count)
        .into_iter()
        .enumerate()
        .map(|(i, cid)| {
            let path = Path::new((0..depth).map(|d| {
                if d % 2 == 0 {
                    PathSegment::from(format!("field{d}"))
                } else {
                    PathSegment::from(i)
                }
            }));
            if i % 10 == 9 {
                TraversedLink::failed(Link::new(cid), path, "block not found")
            } else {
                TraversedLink::loaded(Link::new(cid), path)
            }
        })
        .collect()
}

/// Encode records into one record log.
pub fn encode_log(records: &[TraversedLink]) -> Vec<u8> {
    let mut out = Vec::new();
    for record in records {
        encode_traversed_link(&mut out, record, DEFAULT_MAX_FRAME_SIZE)
            .expect("benchmark records encode");
    }
    out
}
