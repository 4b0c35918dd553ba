//! Get command implementation.

use super::records::{collect, print};
use super::{open_store, parse_target};
use std::path::Path;
use tracing::info;

/// Runs the get command: replays a stored traversal.
///
/// Records decoded before a corrupt frame are still printed.
pub fn run(
    path: &Path,
    root: &str,
    selector: &str,
    format: &str,
    limit: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (root, selector) = parse_target(root, selector)?;
    info!("Replaying traversal from {} in {:?}", root, path);

    let store = open_store(path)?;
    let iter = store.get(&root, &selector).map_err(|e| {
        if e.is_not_found() {
            format!("No traversal stored for root {root} with this selector")
        } else {
            e.to_string()
        }
    })?;

    let (records, decode_error) = collect(iter, limit);
    print(&records, format)?;
    match decode_error {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}
