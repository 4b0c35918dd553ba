//! The link-loading seam between a traversal engine and block storage.
//!
//! A traversal engine calls a [`LinkLoader`] every time it is about to
//! follow a link. The store wraps a caller's loader in a
//! [`crate::TraversalWriter`] to record those calls.

use crate::types::{Link, Path};
use std::error::Error as StdError;
use std::io::Read;

/// A readable block of bytes returned by a successful load.
pub type BlockReader = Box<dyn Read + Send>;

/// The failure a loader reports. Its `Display` text is what gets recorded.
pub type LoadError = Box<dyn StdError + Send + Sync>;

/// Outcome of a single load.
pub type LoadResult = Result<BlockReader, LoadError>;

/// Context passed alongside each load request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkContext {
    /// Position of the link relative to the traversal root.
    pub link_path: Path,
}

impl LinkContext {
    /// Creates a context for a link found at `link_path`.
    #[must_use]
    pub fn new(link_path: Path) -> Self {
        Self { link_path }
    }
}

/// Resolves links to block bytes.
pub trait LinkLoader {
    /// Loads the block that `link` points at.
    fn load(&mut self, ctx: &LinkContext, link: &Link) -> LoadResult;
}

impl<F> LinkLoader for F
where
    F: FnMut(&LinkContext, &Link) -> LoadResult,
{
    fn load(&mut self, ctx: &LinkContext, link: &Link) -> LoadResult {
        self(ctx, link)
    }
}

/// Pins a closure to the loader signature so its argument types infer.
pub fn loader_fn<F>(f: F) -> F
where
    F: FnMut(&LinkContext, &Link) -> LoadResult,
{
    f
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn closures_are_loaders() {
        let mut calls = 0;
        let mut loader = loader_fn(|ctx: &LinkContext, _link: &Link| {
            calls += 1;
            let body = ctx.link_path.to_string().into_bytes();
            Ok(Box::new(Cursor::new(body)) as BlockReader)
        });

        let link = Link::new("bafkqaaa".parse().unwrap());
        let mut reader = loader
            .load(&LinkContext::new(Path::parse("a/b")), &link)
            .unwrap();
        let mut out = String::new();
        reader.read_to_string(&mut out).unwrap();
        assert_eq!(out, "a/b");
        drop(loader);
        assert_eq!(calls, 1);
    }
}
