//! Column descriptors.

use std::fmt;
use std::sync::Arc;

use super::{SortConfig, SortDirection, TableRow};

/// How a column claims horizontal space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnWidth {
    /// Fixed width in terminal cells.
    Fixed(u16),
    /// Share of the remaining width, by weight.
    Flex(u16),
}

impl Default for ColumnWidth {
    fn default() -> Self {
        ColumnWidth::Flex(1)
    }
}

type Renderer<R> = Arc<dyn Fn(&R) -> String + Send + Sync>;

/// A table column: which field it shows, how it is labelled and whether it
/// can be sorted.
pub struct Column<R> {
    key: &'static str,
    header: &'static str,
    sortable: bool,
    width: ColumnWidth,
    render: Option<Renderer<R>>,
}

impl<R: TableRow> Column<R> {
    /// A non-sortable column showing the raw `key` field.
    pub fn new(key: &'static str, header: &'static str) -> Self {
        Self {
            key,
            header,
            sortable: false,
            width: ColumnWidth::default(),
            render: None,
        }
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn fixed(mut self, width: u16) -> Self {
        self.width = ColumnWidth::Fixed(width);
        self
    }

    pub fn flex(mut self, weight: u16) -> Self {
        self.width = ColumnWidth::Flex(weight);
        self
    }

    /// Custom cell text. Sorting still uses the raw field.
    pub fn render(mut self, f: impl Fn(&R) -> String + Send + Sync + 'static) -> Self {
        self.render = Some(Arc::new(f));
        self
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn header(&self) -> &'static str {
        self.header
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    pub fn width(&self) -> ColumnWidth {
        self.width
    }

    /// Cell text for `row`.
    pub fn cell(&self, row: &R) -> String {
        match &self.render {
            Some(render) => render(row),
            None => row.field(self.key).to_string(),
        }
    }

    /// Header text with a direction marker on the active sort column.
    pub fn label(&self, sort: &SortConfig) -> String {
        if self.sortable && sort.key == Some(self.key) {
            let marker = match sort.direction {
                SortDirection::Ascending => "▲",
                SortDirection::Descending => "▼",
            };
            format!("{} {}", self.header, marker)
        } else {
            self.header.to_string()
        }
    }
}

impl<R> Clone for Column<R> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            header: self.header,
            sortable: self.sortable,
            width: self.width,
            render: self.render.clone(),
        }
    }
}

impl<R> fmt::Debug for Column<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("header", &self.header)
            .field("sortable", &self.sortable)
            .field("width", &self.width)
            .finish_non_exhaustive()
    }
}
