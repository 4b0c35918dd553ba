//! CLI command implementations.

pub mod decode_key;
pub mod dump;
pub mod get;
pub mod has;
pub mod key;
pub mod records;

use crate::json::parse_selector;
use selstore_codec::Value;
use selstore_core::{Cid, SelectorStore};
use selstore_storage::FileDatastore;
use std::path::Path;
use std::sync::Arc;

/// Parses the (root, selector) pair shared by several commands.
pub fn parse_target(
    root: &str,
    selector: &str,
) -> Result<(Cid, Value), Box<dyn std::error::Error>> {
    let root: Cid = root
        .parse()
        .map_err(|e| format!("invalid root CID {root:?}: {e}"))?;
    let selector = parse_selector(selector)?;
    Ok((root, selector))
}

/// Opens the store kept in `path`.
pub fn open_store(path: &Path) -> Result<SelectorStore, Box<dyn std::error::Error>> {
    if !path.is_dir() {
        return Err(format!("No store found at {:?}", path).into());
    }
    let datastore = FileDatastore::open(path)?;
    Ok(SelectorStore::new(Arc::new(datastore)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use selstore_core::{loader_fn, BlockReader, Link, LinkContext, Path as LinkPath};

    const ROOT: &str = "bafkqaaa";
    const MATCH_POINT: &str = r#"{".":{}}"#;

    #[test]
    fn parse_target_rejects_bad_input() {
        assert!(parse_target("not-a-cid", MATCH_POINT).is_err());
        assert!(parse_target(ROOT, "{").is_err());
        assert!(parse_target(ROOT, r#"{"x":0.5}"#).is_err());
        assert!(parse_target(ROOT, MATCH_POINT).is_ok());
    }

    #[test]
    fn open_store_requires_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(open_store(&dir.path().join("missing")).is_err());
        assert!(open_store(dir.path()).is_ok());
    }

    #[test]
    fn commands_read_what_the_store_wrote() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(dir.path()).unwrap();
        let (root, selector) = parse_target(ROOT, MATCH_POINT).unwrap();

        let loader = loader_fn(|_: &LinkContext, _: &Link| {
            Ok(Box::new(std::io::empty()) as BlockReader)
        });
        let mut writer = store.new_traversal(&root, &selector, loader).unwrap();
        let _ = writer.load(&LinkContext::new(LinkPath::root()), &Link::new(root));
        writer.commit().unwrap();

        has::run(dir.path(), ROOT, MATCH_POINT).unwrap();
        get::run(dir.path(), ROOT, MATCH_POINT, "json", None).unwrap();
        assert!(get::run(dir.path(), ROOT, r#"{"a":{}}"#, "text", None).is_err());
    }
}
