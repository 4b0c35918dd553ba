//! Dump command implementation.

use super::records::{collect, print};
use selstore_core::LinkIterator;
use std::fs;
use std::path::Path;
use tracing::info;

/// Runs the dump command: decodes a raw record log read from a file.
pub fn run(
    file: &Path,
    format: &str,
    limit: Option<usize>,
    max_frame_size: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("Record log not found: {:?}", file).into());
    }
    let data = fs::read(file)?;
    info!("Dumping {} bytes from {:?}", data.len(), file);

    let iter = LinkIterator::with_max_frame_size(data, max_frame_size);
    let (records, decode_error) = collect(iter, limit);
    print(&records, format)?;
    match decode_error {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}
