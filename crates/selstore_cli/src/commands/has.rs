//! Has command implementation.

use super::{open_store, parse_target};
use std::path::Path;
use tracing::info;

/// Runs the has command: prints whether a traversal is stored.
pub fn run(path: &Path, root: &str, selector: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (root, selector) = parse_target(root, selector)?;
    info!("Checking {} in {:?}", root, path);
    let store = open_store(path)?;
    println!("{}", store.has(&root, &selector)?);
    Ok(())
}
