//! Path cursor for nested routing
//!
//! A [`Path`] splits the request path on `/` once and then walks the
//! segments forward. A router looks at [`Path::next`] to pick a child
//! handler; the child calls [`Path::increment`] before reading
//! [`Path::current`] and [`Path::next`] relative to its own level.
//!
//! Splitting is naive, so `/widgets/42` becomes `["", "widgets", "42"]` and
//! the cursor starts on the empty leading segment.
//!
//! A `Path` belongs to exactly one request. Advancing it needs `&mut`, so
//! it cannot be moved forward from two handlers at once.

use std::fmt;
use std::str::FromStr;

use http::Uri;

use crate::error::{Error, Result};

/// Forward-only cursor over the segments of a request path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    raw: String,
    query: Option<String>,
    segments: Vec<String>,
    index: usize,
}

impl Path {
    /// Cursor over a raw request target such as `/widgets/42?verbose=1`.
    ///
    /// Never fails: everything before the first `?` is split as-is.
    pub fn new(raw: &str) -> Self {
        let (path, query) = match raw.split_once('?') {
            Some((path, query)) => (path, Some(query.to_owned())),
            None => (raw, None),
        };
        Self {
            raw: path.to_owned(),
            query,
            segments: path.split('/').map(str::to_owned).collect(),
            index: 0,
        }
    }

    /// Like [`Path::new`], but first checks that `raw` is a valid URI
    pub fn parse(raw: &str) -> Result<Self> {
        raw.parse::<Uri>().map_err(Error::InvalidUri)?;
        Ok(Self::new(raw))
    }

    /// The path part of the request target
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Query string without the leading `?`
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// All segments, including empty ones
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Cursor position
    pub fn index(&self) -> usize {
        self.index
    }

    /// Segment under the cursor, or `""` past the end
    pub fn current(&self) -> &str {
        self.segments
            .get(self.index)
            .map_or("", String::as_str)
    }

    /// Segment after the cursor, or `""` past the end. Does not move.
    pub fn next(&self) -> &str {
        self.index
            .checked_add(1)
            .and_then(|i| self.segments.get(i))
            .map_or("", String::as_str)
    }

    /// Move the cursor forward by one segment
    pub fn increment(&mut self) {
        self.index = self.index.saturating_add(1);
    }
}

impl FromStr for Path {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<&str> for Path {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<&Uri> for Path {
    fn from(uri: &Uri) -> Self {
        let mut path = Self::new(uri.path());
        path.query = uri.query().map(str::to_owned);
        path
    }
}

impl From<Uri> for Path {
    fn from(uri: Uri) -> Self {
        Self::from(&uri)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
