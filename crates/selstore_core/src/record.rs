//! Record log framing.
//!
//! A traversal's log is a concatenation of frames, one per link load:
//!
//! ```text
//! uvarint(payload_len) | payload
//! payload = cid_bytes | uvarint(path_len) | path_utf8 | error_utf8
//! ```
//!
//! The error text runs to the end of the payload; an empty tail means the
//! load succeeded.

use crate::error::{CoreError, CoreResult};
use crate::types::{Link, Path, TraversedLink};
use crate::varint::{decode_uvarint, encode_uvarint};
use cid::Cid;
use std::io::Cursor;

/// Appends one frame for `record` to `out`.
///
/// On error nothing is written.
///
/// # Errors
///
/// Returns [`CoreError::RecordEncoding`] if the path has a segment that its
/// string form cannot carry (empty, or containing `/`), or if the payload
/// would exceed `max_frame_size`.
pub fn encode_traversed_link(
    out: &mut Vec<u8>,
    record: &TraversedLink,
    max_frame_size: usize,
) -> CoreResult<()> {
    if let Some(segment) = record.link_path().unrepresentable_segment() {
        return Err(CoreError::record_encoding(format!(
            "path segment {:?} cannot be represented",
            segment.as_str()
        )));
    }

    let cid_bytes = record.link().cid().to_bytes();
    let path = record.link_path().to_string();
    let error = record.load_error().unwrap_or_default();

    let mut payload = Vec::with_capacity(cid_bytes.len() + path.len() + error.len() + 4);
    payload.extend_from_slice(&cid_bytes);
    encode_uvarint(&mut payload, path.len() as u64);
    payload.extend_from_slice(path.as_bytes());
    payload.extend_from_slice(error.as_bytes());

    if payload.len() > max_frame_size {
        return Err(CoreError::record_encoding(format!(
            "frame of {} bytes exceeds limit of {max_frame_size}",
            payload.len()
        )));
    }

    encode_uvarint(out, payload.len() as u64);
    out.extend_from_slice(&payload);
    Ok(())
}

/// Decodes the frame at the front of `input`.
///
/// Returns `Ok(None)` when `input` is empty, otherwise the record and the
/// number of bytes the frame occupied.
///
/// # Errors
///
/// Returns [`CoreError::RecordDecoding`] for a truncated frame, a frame
/// larger than `max_frame_size`, or a malformed payload.
pub fn decode_traversed_link(
    input: &[u8],
    max_frame_size: usize,
) -> CoreResult<Option<(TraversedLink, usize)>> {
    if input.is_empty() {
        return Ok(None);
    }

    let (len, header) = decode_uvarint(input)
        .ok_or_else(|| CoreError::record_decoding("truncated frame length"))?;
    let len = usize::try_from(len)
        .ok()
        .filter(|&len| len <= max_frame_size)
        .ok_or_else(|| {
            CoreError::record_decoding(format!(
                "frame of {len} bytes exceeds limit of {max_frame_size}"
            ))
        })?;
    let end = header
        .checked_add(len)
        .filter(|&end| end <= input.len())
        .ok_or_else(|| {
            CoreError::record_decoding(format!(
                "frame claims {len} bytes but only {} remain",
                input.len() - header
            ))
        })?;

    let record = decode_payload(&input[header..end])?;
    Ok(Some((record, end)))
}

/// Sequential reader over an owned record log.
///
/// After the first error, or at end of input, the reader is finished and
/// keeps returning `Ok(None)`.
#[derive(Debug, Clone)]
pub struct RecordReader {
    data: Vec<u8>,
    pos: usize,
    max_frame_size: usize,
    finished: bool,
}

impl RecordReader {
    /// Creates a reader over `data`.
    #[must_use]
    pub fn new(data: Vec<u8>, max_frame_size: usize) -> Self {
        Self {
            data,
            pos: 0,
            max_frame_size,
            finished: false,
        }
    }

    /// Decodes the next record.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::RecordDecoding`] for a malformed frame. The
    /// reader does not resynchronise afterwards.
    pub fn next_record(&mut self) -> CoreResult<Option<TraversedLink>> {
        if self.finished {
            return Ok(None);
        }
        match decode_traversed_link(&self.data[self.pos..], self.max_frame_size) {
            Ok(Some((record, used))) => {
                self.pos += used;
                Ok(Some(record))
            }
            Ok(None) => {
                self.finished = true;
                Ok(None)
            }
            Err(err) => {
                self.finished = true;
                Err(err)
            }
        }
    }

    /// Bytes consumed so far.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Whether the reader has reached the end or failed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

fn decode_payload(payload: &[u8]) -> CoreResult<TraversedLink> {
    let mut cursor = Cursor::new(payload);
    let cid = Cid::read_bytes(&mut cursor)
        .map_err(|e| CoreError::record_decoding(format!("invalid cid: {e}")))?;
    // The cursor never moves past the slice, so this fits in usize.
    let mut pos = cursor.position() as usize;

    let (path_len, consumed) = decode_uvarint(&payload[pos..])
        .ok_or_else(|| CoreError::record_decoding("truncated path length"))?;
    pos += consumed;
    let path_end = usize::try_from(path_len)
        .ok()
        .and_then(|len| pos.checked_add(len))
        .filter(|&end| end <= payload.len())
        .ok_or_else(|| CoreError::record_decoding("path runs past end of frame"))?;

    let path = std::str::from_utf8(&payload[pos..path_end])
        .map_err(|_| CoreError::record_decoding("path is not valid UTF-8"))?;
    let error = std::str::from_utf8(&payload[path_end..])
        .map_err(|_| CoreError::record_decoding("error text is not valid UTF-8"))?;

    let load_error = (!error.is_empty()).then(|| error.to_string());
    Ok(TraversedLink::new(Link::new(cid), Path::parse(path), load_error))
}
