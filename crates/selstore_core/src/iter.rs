//! Replay of a stored traversal.

use crate::config::DEFAULT_MAX_FRAME_SIZE;
use crate::error::{CoreError, CoreResult};
use crate::record::RecordReader;
use crate::types::TraversedLink;
use std::iter::FusedIterator;

/// Forward-only iterator over the links of one recorded traversal, in the
/// order they were loaded.
///
/// Yields `Err` at most once; iteration ends after the first decode error.
#[derive(Debug, Clone)]
pub struct LinkIterator {
    reader: RecordReader,
}

impl LinkIterator {
    /// Creates an iterator over a record log.
    #[must_use]
    pub fn new(data: Vec<u8>) -> Self {
        Self::with_max_frame_size(data, DEFAULT_MAX_FRAME_SIZE)
    }

    /// Creates an iterator that rejects frames larger than `max_frame_size`.
    #[must_use]
    pub fn with_max_frame_size(data: Vec<u8>, max_frame_size: usize) -> Self {
        Self {
            reader: RecordReader::new(data, max_frame_size),
        }
    }

    /// Calls `visit` on each link in recording order.
    ///
    /// Stops at the first decode error or the first error returned by
    /// `visit`, and returns it. Stopping early is how a caller consumes
    /// only part of a traversal.
    ///
    /// # Errors
    ///
    /// Returns decode errors converted into `E`, or `visit`'s own error.
    pub fn iterate<E, F>(mut self, mut visit: F) -> Result<(), E>
    where
        E: From<CoreError>,
        F: FnMut(TraversedLink) -> Result<(), E>,
    {
        while let Some(link) = self.reader.next_record()? {
            visit(link)?;
        }
        Ok(())
    }

    /// Decodes the whole log.
    ///
    /// # Errors
    ///
    /// Returns the first decode error.
    pub fn collect_links(self) -> CoreResult<Vec<TraversedLink>> {
        self.collect()
    }
}

impl Iterator for LinkIterator {
    type Item = CoreResult<TraversedLink>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.next_record().transpose()
    }
}

impl FusedIterator for LinkIterator {}
