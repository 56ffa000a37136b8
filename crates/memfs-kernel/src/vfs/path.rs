//! Segment paths and scheme-qualified URIs.
//!
//! A [`MemPath`] is nothing more than the list of names from the root. The
//! only parsing done is splitting on `/`; empty segments are dropped, so
//! `/folder/` and `/folder` are the same path. `.` and `..` are ordinary
//! names and case is preserved.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::{VfsError, VfsResult};

/// Path of an entry, as a sequence of names from the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemPath {
    segments: Vec<String>,
}

impl MemPath {
    /// The root path (no segments).
    pub fn root() -> Self {
        Self::default()
    }

    /// Split a `/`-separated string into segments.
    pub fn parse(s: &str) -> Self {
        Self {
            segments: s
                .split('/')
                .filter(|seg| !seg.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Build a path from already-split segments.
    ///
    /// Fails if a segment is empty or contains `/`.
    pub fn from_segments<I, S>(segments: I) -> VfsResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if let Some(bad) = segments.iter().find(|s| s.is_empty() || s.contains('/')) {
            return Err(VfsError::invalid_path(format!("bad segment {bad:?}")));
        }
        Ok(Self { segments })
    }

    /// The name segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns true for the root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Last segment, or `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Parent path, or `None` for the root.
    pub fn parent(&self) -> Option<MemPath> {
        if self.is_root() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Append one or more segments (`name` is itself split on `/`).
    pub fn join(&self, name: &str) -> MemPath {
        let mut segments = self.segments.clone();
        segments.extend(
            name.split('/')
                .filter(|seg| !seg.is_empty())
                .map(str::to_string),
        );
        Self { segments }
    }

    /// True if `prefix` is this path or one of its ancestors.
    pub fn starts_with(&self, prefix: &MemPath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }
}

impl fmt::Display for MemPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str("/");
        }
        for seg in &self.segments {
            write!(f, "/{seg}")?;
        }
        Ok(())
    }
}

impl FromStr for MemPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for MemPath {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

/// A letter followed by letters, digits, `+`, `-` or `.`.
pub(crate) fn is_valid_scheme(scheme: &str) -> bool {
    scheme.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// A scheme-qualified address such as `memfs:/a/b`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemUri {
    scheme: String,
    path: MemPath,
}

impl MemUri {
    /// Build a URI from its parts.
    pub fn new(scheme: impl Into<String>, path: MemPath) -> Self {
        Self {
            scheme: scheme.into(),
            path,
        }
    }

    /// Parse `scheme:/path`. An empty path after the colon means the root.
    pub fn parse(s: &str) -> VfsResult<Self> {
        let (scheme, rest) = s
            .split_once(':')
            .ok_or_else(|| VfsError::invalid_path(format!("missing scheme: {s}")))?;

        if !is_valid_scheme(scheme) {
            return Err(VfsError::invalid_path(format!("bad scheme: {s}")));
        }

        if !rest.is_empty() && !rest.starts_with('/') {
            return Err(VfsError::invalid_path(format!("path must be absolute: {s}")));
        }

        Ok(Self {
            scheme: scheme.to_string(),
            path: MemPath::parse(rest),
        })
    }

    /// The scheme (without the colon).
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// The path component.
    pub fn path(&self) -> &MemPath {
        &self.path
    }

    /// Consume into the path component.
    pub fn into_path(self) -> MemPath {
        self.path
    }
}

impl fmt::Display for MemUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.scheme, self.path)
    }
}

impl FromStr for MemUri {
    type Err = VfsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
