//! Result windows and page info.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::cursor::CursorCodec;
use crate::error::Result;
use crate::types::Record;

/// Boundary metadata of a page, in the relay connection shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Whether rows exist before this page.
    pub has_previous_page: bool,
    /// Whether rows exist after this page.
    pub has_next_page: bool,
    /// Cursor of the first row, if any.
    pub start_cursor: Option<String>,
    /// Cursor of the last row, if any.
    pub end_cursor: Option<String>,
}

/// A row together with its cursor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Edge<T> {
    /// Opaque position of the row.
    pub cursor: String,
    /// The row itself.
    pub node: T,
}

/// One page of rows in display order, with its boundary flags.
#[derive(Debug, Clone)]
pub struct Window<T> {
    items: Vec<T>,
    has_previous_page: bool,
    has_next_page: bool,
    codec: CursorCodec,
}

impl<T> Window<T> {
    pub(crate) fn new(
        items: Vec<T>,
        has_previous_page: bool,
        has_next_page: bool,
        codec: CursorCodec,
    ) -> Self {
        Self {
            items,
            has_previous_page,
            has_next_page,
            codec,
        }
    }

    /// Returns the rows of the page.
    #[inline]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consumes the page, returning its rows.
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Whether rows exist before this page.
    #[inline]
    pub fn has_previous_page(&self) -> bool {
        self.has_previous_page
    }

    /// Whether rows exist after this page.
    #[inline]
    pub fn has_next_page(&self) -> bool {
        self.has_next_page
    }

    /// Returns the number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the page holds no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Record> Window<T> {
    /// Encodes the position of `record` for use as `before`/`after`.
    pub fn cursor_for(&self, record: &T) -> Result<String> {
        self.codec.encode(record)
    }

    /// Returns the cursor of the first row.
    pub fn start_cursor(&self) -> Result<Option<String>> {
        self.items.first().map(|item| self.cursor_for(item)).transpose()
    }

    /// Returns the cursor of the last row.
    pub fn end_cursor(&self) -> Result<Option<String>> {
        self.items.last().map(|item| self.cursor_for(item)).transpose()
    }

    /// Returns the page metadata.
    pub fn page_info(&self) -> Result<PageInfo> {
        Ok(PageInfo {
            has_previous_page: self.has_previous_page,
            has_next_page: self.has_next_page,
            start_cursor: self.start_cursor()?,
            end_cursor: self.end_cursor()?,
        })
    }

    /// Pairs every row with its cursor.
    pub fn into_edges(self) -> Result<Vec<Edge<T>>> {
        let codec = self.codec;
        self.items
            .into_iter()
            .map(|node| {
                let cursor = codec.encode(&node)?;
                Ok(Edge { cursor, node })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::ordering::{KeysetOrdering, OrderDescriptor, SortOrder};
    use crate::types::Value;

    fn window(ids: &[i64]) -> Window<BTreeMap<String, Value>> {
        let ordering = KeysetOrdering::new(vec![
            OrderDescriptor::column("id", SortOrder::Asc).with_distinct(true),
        ])
        .unwrap();
        let items = ids
            .iter()
            .map(|id| BTreeMap::from([("id".to_owned(), Value::Int(*id))]))
            .collect();
        Window::new(items, true, false, CursorCodec::new(ordering))
    }

    #[test]
    fn page_info_cursors_match_edges() {
        let page = window(&[1, 2, 3]);
        let info = page.page_info().unwrap();
        assert!(info.has_previous_page);
        assert!(!info.has_next_page);

        let edges = page.into_edges().unwrap();
        assert_eq!(info.start_cursor.as_deref(), Some(edges[0].cursor.as_str()));
        assert_eq!(info.end_cursor.as_deref(), Some(edges[2].cursor.as_str()));
    }

    #[test]
    fn empty_page_has_no_cursors() {
        let page = window(&[]);
        assert!(page.is_empty());
        assert_eq!(page.start_cursor().unwrap(), None);
        assert_eq!(page.end_cursor().unwrap(), None);
    }

    #[test]
    fn page_info_serializes_camel_case() {
        let info = PageInfo {
            has_next_page: true,
            ..PageInfo::default()
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["hasNextPage"], true);
        assert_eq!(json["startCursor"], serde_json::Value::Null);
    }
}
