//! Window arguments.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Which end of the cursor-bounded window a page is taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// The first `n` rows of the window (`first`).
    Head,
    /// The last `n` rows of the window (`last`).
    Tail,
}

/// Arguments of a single page request.
///
/// Cursors are the opaque tokens handed out with a previous page. When
/// neither `first` nor `last` is given, `first` defaults to the page size.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct WindowRequest {
    /// Only return rows strictly before this cursor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    /// Only return rows strictly after this cursor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
    /// Take this many rows from the head of the window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<u32>,
    /// Take this many rows from the tail of the window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<u32>,
    /// Per-request page size cap; never exceeds the configured maximum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_page_size: Option<u32>,
}

impl WindowRequest {
    /// Creates a request for the default first page.
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes `count` rows from the head of the window.
    pub fn with_first(mut self, count: u32) -> Self {
        self.first = Some(count);
        self
    }

    /// Takes `count` rows from the tail of the window.
    pub fn with_last(mut self, count: u32) -> Self {
        self.last = Some(count);
        self
    }

    /// Bounds the window to rows after `cursor`.
    pub fn with_after(mut self, cursor: impl Into<String>) -> Self {
        self.after = Some(cursor.into());
        self
    }

    /// Bounds the window to rows before `cursor`.
    pub fn with_before(mut self, cursor: impl Into<String>) -> Self {
        self.before = Some(cursor.into());
        self
    }

    /// Caps the page size for this request.
    pub fn with_max_page_size(mut self, max_page_size: u32) -> Self {
        self.max_page_size = Some(max_page_size);
        self
    }

    /// Resolves the anchor and the clamped row count.
    ///
    /// Fails with [`Error::ConflictingArguments`] when both `first` and
    /// `last` are present.
    pub fn resolve(&self, configured_max: u32) -> Result<(Anchor, u32)> {
        let max = self
            .max_page_size
            .map_or(configured_max, |max| max.min(configured_max));

        match (self.first, self.last) {
            (Some(_), Some(_)) => Err(Error::ConflictingArguments),
            (Some(first), None) => Ok((Anchor::Head, first.min(max))),
            (None, Some(last)) => Ok((Anchor::Tail, last.min(max))),
            (None, None) => Ok((Anchor::Head, max)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_defaults_to_max_page_size() {
        assert_eq!(WindowRequest::new().resolve(100).unwrap(), (Anchor::Head, 100));
    }

    #[test]
    fn counts_are_clamped() {
        let request = WindowRequest::new().with_last(500);
        assert_eq!(request.resolve(100).unwrap(), (Anchor::Tail, 100));

        let request = WindowRequest::new().with_first(50).with_max_page_size(20);
        assert_eq!(request.resolve(100).unwrap(), (Anchor::Head, 20));

        let request = WindowRequest::new().with_max_page_size(500);
        assert_eq!(request.resolve(100).unwrap(), (Anchor::Head, 100));
    }

    #[test]
    fn zero_is_kept() {
        let request = WindowRequest::new().with_first(0);
        assert_eq!(request.resolve(100).unwrap(), (Anchor::Head, 0));
    }

    #[test]
    fn first_and_last_conflict() {
        let request = WindowRequest::new().with_first(2).with_last(2);
        assert!(matches!(request.resolve(100), Err(Error::ConflictingArguments)));
    }

    #[test]
    fn deserializes_camel_case() {
        let request: WindowRequest =
            serde_json::from_str(r#"{"after": "abc", "first": 3, "maxPageSize": 10}"#).unwrap();
        assert_eq!(
            request,
            WindowRequest::new().with_after("abc").with_first(3).with_max_page_size(10)
        );
    }
}
