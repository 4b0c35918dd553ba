//! Key command implementation.

use super::parse_target;
use selstore_core::StoreKey;

/// Runs the key command: prints the hex storage key for a traversal.
pub fn run(root: &str, selector: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (root, selector) = parse_target(root, selector)?;
    let key = StoreKey::derive(&root, &selector)?;
    println!("{key}");
    Ok(())
}
