//! Decode-key command implementation.

use crate::json::value_to_json;
use selstore_core::StoreKey;

/// Runs the decode-key command: splits a hex storage key into its root CID
/// and selector.
pub fn run(key_hex: &str, codec: u64) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = hex::decode(key_hex.trim()).map_err(|e| format!("invalid hex key: {e}"))?;
    let (root, selector) = StoreKey::from_bytes(bytes).decode(codec)?;
    println!("root:     {root}");
    println!("selector: {}", value_to_json(&selector));
    Ok(())
}
