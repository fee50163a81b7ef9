//! Immutable hierarchical place paths.

use std::fmt;

use crate::error::{Error, Result};

/// An ordered sequence of 0-3 lowercase segments: country code, region
/// segment, locality name pattern.
///
/// Paths are append-only values: [`extend`] returns a new path and never
/// mutates a shared one, so navigation is a plain data operation. Building a
/// path runs no catalog query; resolution happens only when a resolve,
/// listing or geometry operation is invoked.
///
/// [`extend`]: PlacePath::extend
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PlacePath {
    segments: Vec<String>,
}

impl PlacePath {
    pub const MAX_DEPTH: usize = 3;

    /// The empty starting point for navigation.
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a path from raw segments, normalizing each one.
    pub fn new<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut path = Self::root();
        for segment in segments {
            path = path.extend(segment.as_ref())?;
        }
        Ok(path)
    }

    /// Append one lowercase-normalized segment, returning a new path.
    pub fn extend(&self, segment: &str) -> Result<Self> {
        let segment = segment.trim().to_lowercase();
        if self.segments.len() == Self::MAX_DEPTH {
            return Err(Error::PathTooDeep {
                path: format!("{self}.{segment}"),
                depth: self.segments.len() + 1,
            });
        }
        let mut segments = self.segments.clone();
        segments.push(segment);
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Uppercase ISO country code from the first segment.
    pub(crate) fn country_code(&self) -> Option<String> {
        self.segments.first().map(|s| s.to_uppercase())
    }

    /// Composite `<COUNTRY>-<SEGMENT>` region code synthesized from the
    /// first two segments.
    pub(crate) fn region_code(&self) -> Option<String> {
        match self.segments.as_slice() {
            [country, region, ..] => Some(format!(
                "{}-{}",
                country.to_uppercase(),
                region.to_uppercase()
            )),
            _ => None,
        }
    }
}

impl fmt::Display for PlacePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}
