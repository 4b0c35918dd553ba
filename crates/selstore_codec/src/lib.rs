//! # selstore codec
//!
//! Canonical CBOR encoding of selector values.
//!
//! Storage keys embed the encoded selector, so two structurally equal
//! selectors must encode to the same bytes on every platform and in every
//! process. This crate guarantees that:
//!
//! - Maps are sorted by key (length-first, then bytewise on encoded keys)
//! - Integers and lengths use the shortest encoding
//! - No floats, tags, or indefinite-length items
//! - Strings must be UTF-8
//! - Nesting is bounded by [`MAX_NESTING_DEPTH`]
//!
//! The decoder accepts only what the encoder produces.
//!
//! ## Usage
//!
//! ```
//! use selstore_codec::{from_cbor, to_canonical_cbor, Value};
//!
//! let selector = Value::text_map([(".", Value::empty_map())]);
//! let bytes = to_canonical_cbor(&selector).unwrap();
//! assert_eq!(from_cbor(&bytes).unwrap(), selector);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod encoder;
mod error;
mod value;

pub use decoder::{from_cbor, CanonicalDecoder};
pub use encoder::{to_canonical_cbor, CanonicalEncoder, MAX_NESTING_DEPTH};
pub use error::{CodecError, CodecResult};
pub use value::Value;
