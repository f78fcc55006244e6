//! Generic sortable, paginated table model.
//!
//! A [`TabularView`] never owns rows. The host passes the current data with
//! the loading and error flags of its request, and gets back what to draw:
//! a loading marker, an error with retry, an empty state or one page of
//! sorted rows. The view only remembers sort, page and cursor.

mod column;
mod sort;
mod value;

pub use column::{Column, ColumnWidth};
pub use sort::{SortConfig, SortDirection};
pub use value::{CellValue, RowKey, TableRow, row_key};

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};

/// Rows per page.
pub const ITEMS_PER_PAGE: usize = 50;

/// What the host should draw.
#[derive(Debug)]
pub enum TableOutcome<'a, R> {
    Loading,
    /// Error message; the host offers a retry.
    Failed(&'a str),
    Empty,
    Rows(PageView<'a, R>),
}

/// One page of sorted rows.
#[derive(Debug)]
pub struct PageView<'a, R> {
    pub rows: Vec<ViewRow<'a, R>>,
    /// 1-based.
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<R> PageView<'_, R> {
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Page controls are hidden when everything fits on one page.
    pub fn show_controls(&self) -> bool {
        self.total_pages > 1
    }
}

/// A rendered row.
#[derive(Debug)]
pub struct ViewRow<'a, R> {
    pub key: RowKey,
    pub row: &'a R,
    pub cells: Vec<String>,
    pub highlighted: bool,
    pub selected: bool,
}

/// Result of feeding a key to the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableEvent {
    Ignored,
    Handled,
    /// Enter on the selected row; fetch it with [`TabularView::selected`].
    Activated,
}

type Highlight<R> = Arc<dyn Fn(&R) -> bool + Send + Sync>;

pub struct TabularView<R> {
    columns: Vec<Column<R>>,
    sort: SortConfig,
    page: usize,
    cursor: usize,
    sort_focus: Option<usize>,
    highlight: Option<Highlight<R>>,
}

impl<R: TableRow> TabularView<R> {
    pub fn new(columns: Vec<Column<R>>) -> Self {
        let sort_focus = columns.iter().position(Column::is_sortable);
        Self {
            columns,
            sort: SortConfig::default(),
            page: 1,
            cursor: 0,
            sort_focus,
            highlight: None,
        }
    }

    /// Flag rows for emphasis. Has no effect on order or paging.
    pub fn highlight_row(mut self, f: impl Fn(&R) -> bool + Send + Sync + 'static) -> Self {
        self.highlight = Some(Arc::new(f));
        self
    }

    pub fn columns(&self) -> &[Column<R>] {
        &self.columns
    }

    pub fn sort(&self) -> SortConfig {
        self.sort
    }

    /// Key of the column `s` would sort by.
    pub fn sort_focus(&self) -> Option<&'static str> {
        self.sort_focus.map(|i| self.columns[i].key())
    }

    /// Sort by `key`, flipping direction when it is already the ascending
    /// sort column. Unknown and non-sortable columns are ignored.
    pub fn toggle_sort(&mut self, key: &str) -> bool {
        let Some(column) = self.columns.iter().find(|c| c.key() == key && c.is_sortable()) else {
            return false;
        };
        self.sort = self.sort.toggled(column.key());
        true
    }

    /// The current page for a dataset of `len` rows, clamped into range.
    pub fn page(&self, len: usize) -> usize {
        self.page.clamp(1, total_pages(len).max(1))
    }

    pub fn set_page(&mut self, page: usize, len: usize) {
        let page = page.clamp(1, total_pages(len).max(1));
        if page != self.page {
            self.page = page;
            self.cursor = 0;
        }
    }

    pub fn next_page(&mut self, len: usize) {
        let current = self.page(len);
        self.set_page(current + 1, len);
    }

    pub fn prev_page(&mut self, len: usize) {
        let current = self.page(len);
        self.set_page(current.saturating_sub(1), len);
    }

    /// Store the clamped page after the dataset changed size.
    pub fn sync(&mut self, len: usize) {
        let page = self.page(len);
        self.set_page(page, len);
        self.cursor = self.cursor.min(self.rows_on_page(len).saturating_sub(1));
    }

    /// Decide what to draw for `rows`.
    ///
    /// Loading wins over an error, an error over an empty dataset.
    pub fn view<'a>(
        &self,
        rows: &'a [R],
        loading: bool,
        error: Option<&'a str>,
    ) -> TableOutcome<'a, R> {
        if loading {
            return TableOutcome::Loading;
        }
        if let Some(message) = error {
            return TableOutcome::Failed(message);
        }
        if rows.is_empty() {
            return TableOutcome::Empty;
        }

        let page = self.page(rows.len());
        let cursor = self.cursor.min(self.rows_on_page(rows.len()).saturating_sub(1));
        let view_rows = self
            .page_indices(rows)
            .into_iter()
            .enumerate()
            .map(|(position, index)| {
                let row = &rows[index];
                ViewRow {
                    key: row_key(row, position),
                    row,
                    cells: self.columns.iter().map(|c| c.cell(row)).collect(),
                    highlighted: self.highlight.as_ref().is_some_and(|f| f(row)),
                    selected: position == cursor,
                }
            })
            .collect();

        TableOutcome::Rows(PageView {
            rows: view_rows,
            page,
            total_pages: total_pages(rows.len()),
            total_items: rows.len(),
        })
    }

    /// The row under the cursor.
    pub fn selected<'a>(&self, rows: &'a [R]) -> Option<&'a R> {
        let indices = self.page_indices(rows);
        let cursor = self.cursor.min(indices.len().saturating_sub(1));
        indices.get(cursor).map(|&i| &rows[i])
    }

    /// Cursor movement, paging and sorting keys.
    pub fn handle_key(&mut self, key: &KeyEvent, len: usize) -> TableEvent {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let last = self.rows_on_page(len).saturating_sub(1);
                self.cursor = (self.cursor + 1).min(last);
            }
            KeyCode::Left | KeyCode::PageUp | KeyCode::Char('h') => self.prev_page(len),
            KeyCode::Right | KeyCode::PageDown | KeyCode::Char('l') => self.next_page(len),
            KeyCode::Char('s') => {
                if let Some(key) = self.sort_focus() {
                    self.toggle_sort(key);
                }
            }
            KeyCode::Char(',') => self.move_sort_focus(false),
            KeyCode::Char('.') => self.move_sort_focus(true),
            KeyCode::Enter if len > 0 => return TableEvent::Activated,
            _ => return TableEvent::Ignored,
        }
        TableEvent::Handled
    }

    fn move_sort_focus(&mut self, forward: bool) {
        let sortable: Vec<usize> = (0..self.columns.len())
            .filter(|&i| self.columns[i].is_sortable())
            .collect();
        if sortable.is_empty() {
            return;
        }
        let at = self
            .sort_focus
            .and_then(|f| sortable.iter().position(|&i| i == f))
            .unwrap_or(0);
        let next = if forward {
            (at + 1) % sortable.len()
        } else {
            (at + sortable.len() - 1) % sortable.len()
        };
        self.sort_focus = Some(sortable[next]);
    }

    fn rows_on_page(&self, len: usize) -> usize {
        let start = (self.page(len) - 1) * ITEMS_PER_PAGE;
        len.saturating_sub(start).min(ITEMS_PER_PAGE)
    }

    fn page_indices(&self, rows: &[R]) -> Vec<usize> {
        let start = (self.page(rows.len()) - 1) * ITEMS_PER_PAGE;
        self.sort
            .order(rows)
            .into_iter()
            .skip(start)
            .take(ITEMS_PER_PAGE)
            .collect()
    }
}

/// Number of pages needed for `len` rows.
pub fn total_pages(len: usize) -> usize {
    len.div_ceil(ITEMS_PER_PAGE)
}
