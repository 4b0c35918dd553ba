//! Core type definitions: links, paths, traversed links.

use cid::Cid;
use std::fmt;
use std::str::FromStr;

/// Separator between segments in a path's string form.
pub const PATH_SEPARATOR: char = '/';

/// A reference from one graph node to another.
///
/// Equality and hashing are by the underlying CID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Link(Cid);

impl Link {
    /// Creates a link to `cid`.
    #[must_use]
    pub const fn new(cid: Cid) -> Self {
        Self(cid)
    }

    /// The CID this link points at.
    #[must_use]
    pub const fn cid(&self) -> &Cid {
        &self.0
    }
}

impl From<Cid> for Link {
    fn from(cid: Cid) -> Self {
        Self(cid)
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One step of a path: a map key or a list index.
///
/// Both kinds are held as their string form; an index segment is simply a
/// decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathSegment(String);

impl PathSegment {
    /// The segment's string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Interprets the segment as a list index.
    #[must_use]
    pub fn as_index(&self) -> Option<usize> {
        self.0.parse().ok()
    }

    /// Whether the segment survives a trip through the path string form.
    ///
    /// Empty segments and segments containing the separator do not.
    #[must_use]
    pub fn is_representable(&self) -> bool {
        !self.0.is_empty() && !self.0.contains(PATH_SEPARATOR)
    }
}

impl From<&str> for PathSegment {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self(index.to_string())
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a link sits relative to the traversal root.
///
/// The string form joins segments with `/`. Parsing ignores empty segments,
/// so `""` is the root path and `"/a//b/"` equals `"a/b"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    /// The empty path (the traversal root).
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Builds a path from segments.
    pub fn new(segments: impl IntoIterator<Item = PathSegment>) -> Self {
        Self {
            segments: segments.into_iter().collect(),
        }
    }

    /// Parses the canonical string form.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        Self::new(
            s.split(PATH_SEPARATOR)
                .filter(|seg| !seg.is_empty())
                .map(PathSegment::from),
        )
    }

    /// Returns a new path with `segment` appended.
    #[must_use]
    pub fn join(&self, segment: impl Into<PathSegment>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    /// The path without its last segment; `None` at the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.segments.split_last()?;
        Some(Self {
            segments: rest.to_vec(),
        })
    }

    /// The segments, root first.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` for the root path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The first segment that would not survive [`Path::parse`] of the
    /// string form, if any.
    #[must_use]
    pub fn unrepresentable_segment(&self) -> Option<&PathSegment> {
        self.segments.iter().find(|seg| !seg.is_representable())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{PATH_SEPARATOR}")?;
            }
            f.write_str(segment.as_str())?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// One recorded link-load attempt.
///
/// Created once per load, immutable afterwards. `load_error` holds the
/// underlying loader's failure text when the load failed; an empty message
/// is indistinguishable from success in the record format and is stored as
/// no error.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TraversedLink {
    link: Link,
    link_path: Path,
    load_error: Option<String>,
}

impl TraversedLink {
    /// Creates a record. `Some("")` is normalised to `None`.
    #[must_use]
    pub fn new(link: Link, link_path: Path, load_error: Option<String>) -> Self {
        Self {
            link,
            link_path,
            load_error: load_error.filter(|msg| !msg.is_empty()),
        }
    }

    /// A record of a successful load.
    #[must_use]
    pub fn loaded(link: Link, link_path: Path) -> Self {
        Self::new(link, link_path, None)
    }

    /// A record of a failed load.
    #[must_use]
    pub fn failed(link: Link, link_path: Path, message: impl Into<String>) -> Self {
        Self::new(link, link_path, Some(message.into()))
    }

    /// The link that was about to be loaded.
    #[must_use]
    pub fn link(&self) -> &Link {
        &self.link
    }

    /// Where the link was encountered.
    #[must_use]
    pub fn link_path(&self) -> &Path {
        &self.link_path
    }

    /// The load failure's message, if the load failed.
    #[must_use]
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_parse_and_display() {
        let path = Path::parse("linkedList/2");
        assert_eq!(path.len(), 2);
        assert_eq!(path.segments()[1].as_index(), Some(2));
        assert_eq!(path.to_string(), "linkedList/2");
    }

    #[test]
    fn path_parse_collapses_separators() {
        assert_eq!(Path::parse(""), Path::root());
        assert_eq!(Path::parse("/a//b/"), Path::parse("a/b"));
        assert_eq!(Path::root().to_string(), "");
    }

    #[test]
    fn path_join_and_parent() {
        let path = Path::root().join("a").join(0usize);
        assert_eq!(path.to_string(), "a/0");
        assert_eq!(path.parent(), Some(Path::parse("a")));
        assert_eq!(Path::root().parent(), None);
    }

    #[test]
    fn unrepresentable_segments() {
        assert!(Path::parse("a/b").unrepresentable_segment().is_none());
        let slash = Path::root().join("a/b");
        assert_eq!(slash.unrepresentable_segment().unwrap().as_str(), "a/b");
        let empty = Path::root().join("");
        assert!(empty.unrepresentable_segment().is_some());
    }

    #[test]
    fn traversed_link_normalises_empty_error() {
        let cid: Cid = "bafkqaaa".parse().unwrap();
        let link = Link::new(cid);
        let record = TraversedLink::new(link, Path::root(), Some(String::new()));
        assert_eq!(record.load_error(), None);
        assert_eq!(record, TraversedLink::loaded(link, Path::root()));

        let failed = TraversedLink::failed(link, Path::root(), "boom");
        assert_eq!(failed.load_error(), Some("boom"));
    }
}
