//! Canonical CBOR encoder.

use crate::error::{CodecError, CodecResult};
use crate::value::{compare_encoded, Value};

/// Deepest container nesting the codec accepts, on both encode and decode.
///
/// Real selectors stay in single digits; the bound keeps recursion finite.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Encode a value to canonical CBOR bytes.
///
/// Output is deterministic (RFC 8949 §4.2.1):
/// - map keys sorted by encoded form, length-first then bytewise
/// - shortest integer and length arguments
/// - definite lengths only
///
/// # Errors
///
/// Returns [`CodecError::DepthLimitExceeded`] if the value nests deeper
/// than [`MAX_NESTING_DEPTH`], or [`CodecError::DuplicateMapKey`] if a map
/// repeats a key.
pub fn to_canonical_cbor(value: &Value) -> CodecResult<Vec<u8>> {
    let mut encoder = CanonicalEncoder::new();
    encoder.encode(value)?;
    Ok(encoder.into_bytes())
}

/// A canonical CBOR encoder writing into an owned buffer.
///
/// Successive `encode` calls append, so a caller can place several values
/// (or a prefix of its own) in one buffer.
#[derive(Debug, Default)]
pub struct CanonicalEncoder {
    buffer: Vec<u8>,
}

impl CanonicalEncoder {
    /// Create a new encoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an encoder that appends after existing bytes.
    pub fn with_prefix(prefix: Vec<u8>) -> Self {
        Self { buffer: prefix }
    }

    /// Encode a value.
    ///
    /// On error the buffer is left as it was before the call.
    pub fn encode(&mut self, value: &Value) -> CodecResult<()> {
        let mark = self.buffer.len();
        let result = self.encode_at(value, 0);
        if result.is_err() {
            self.buffer.truncate(mark);
        }
        result
    }

    /// Consume this encoder and return the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Get a reference to the encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    fn encode_at(&mut self, value: &Value, depth: usize) -> CodecResult<()> {
        match value {
            Value::Null => self.buffer.push(0xf6),
            Value::Bool(b) => self.buffer.push(if *b { 0xf5 } else { 0xf4 }),
            Value::Integer(n) => self.encode_integer(*n),
            Value::Bytes(b) => {
                self.encode_head(2, b.len() as u64);
                self.buffer.extend_from_slice(b);
            }
            Value::Text(s) => {
                self.encode_head(3, s.len() as u64);
                self.buffer.extend_from_slice(s.as_bytes());
            }
            Value::Array(items) => {
                check_depth(depth)?;
                self.encode_head(4, items.len() as u64);
                for item in items {
                    self.encode_at(item, depth + 1)?;
                }
            }
            Value::Map(pairs) => {
                check_depth(depth)?;
                self.encode_map(pairs, depth)?;
            }
        }
        Ok(())
    }

    #[allow(clippy::cast_sign_loss)]
    fn encode_integer(&mut self, n: i64) {
        if n >= 0 {
            self.encode_head(0, n as u64);
        } else {
            // major type 1 carries -1 - n, which is non-negative here
            self.encode_head(1, (-(n + 1)) as u64);
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn encode_head(&mut self, major_type: u8, value: u64) {
        let mt = major_type << 5;

        if value < 24 {
            self.buffer.push(mt | (value as u8));
        } else if value <= u64::from(u8::MAX) {
            self.buffer.push(mt | 24);
            self.buffer.push(value as u8);
        } else if value <= u64::from(u16::MAX) {
            self.buffer.push(mt | 25);
            self.buffer.extend_from_slice(&(value as u16).to_be_bytes());
        } else if value <= u64::from(u32::MAX) {
            self.buffer.push(mt | 26);
            self.buffer.extend_from_slice(&(value as u32).to_be_bytes());
        } else {
            self.buffer.push(mt | 27);
            self.buffer.extend_from_slice(&value.to_be_bytes());
        }
    }

    fn encode_map(&mut self, pairs: &[(Value, Value)], depth: usize) -> CodecResult<()> {
        let mut encoded_keys: Vec<(Vec<u8>, &Value)> = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            let mut key_encoder = CanonicalEncoder::new();
            key_encoder.encode_at(key, depth + 1)?;
            encoded_keys.push((key_encoder.into_bytes(), value));
        }
        encoded_keys.sort_by(|a, b| compare_encoded(&a.0, &b.0));
        if encoded_keys.windows(2).any(|w| w[0].0 == w[1].0) {
            return Err(CodecError::DuplicateMapKey);
        }

        self.encode_head(5, pairs.len() as u64);
        for (key_bytes, value) in encoded_keys {
            self.buffer.extend_from_slice(&key_bytes);
            self.encode_at(value, depth + 1)?;
        }
        Ok(())
    }
}

fn check_depth(depth: usize) -> CodecResult<()> {
    if depth >= MAX_NESTING_DEPTH {
        return Err(CodecError::DepthLimitExceeded {
            limit: MAX_NESTING_DEPTH,
        });
    }
    Ok(())
}
