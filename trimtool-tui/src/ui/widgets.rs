//! Drawing helpers shared by pages and modals.

use std::time::Duration;

use super::{Buffer, Rect, Style, theme};
use crate::format::truncate;
use crate::table::{ColumnWidth, TableOutcome, TableRow, TabularView};
use crate::toast::Toast;

const SPINNER_TRACK: usize = 8;
const SPINNER_SNAKE: usize = 6;
const SPINNER_FRAME_MS: u128 = 60;

/// Bordered box with a title in the top edge. Returns the inner area.
pub fn panel(buf: &mut Buffer, area: Rect, title: &str, focused: bool) -> Rect {
    if area.width < 2 || area.height < 2 {
        return Rect::new(area.x, area.y, 0, 0);
    }
    let border = Style::new().fg(if focused { theme::PRIMARY } else { theme::BORDER });
    let (left, right, top, bottom) = (area.x, area.right() - 1, area.y, area.bottom() - 1);

    for x in left + 1..right {
        buf.put_char(x, top, '─', border);
        buf.put_char(x, bottom, '─', border);
    }
    for y in top + 1..bottom {
        buf.put_char(left, y, '│', border);
        buf.put_char(right, y, '│', border);
    }
    buf.put_char(left, top, '┌', border);
    buf.put_char(right, top, '┐', border);
    buf.put_char(left, bottom, '└', border);
    buf.put_char(right, bottom, '┘', border);

    if !title.is_empty() {
        let style = if focused { theme::title() } else { theme::text().bold() };
        buf.put_str(left + 2, top, &format!(" {} ", title), style, area.width.saturating_sub(4));
    }
    area.inset(1, 1)
}

/// Clear a centered `width` x `height` box inside `outer` and frame it.
pub fn modal(buf: &mut Buffer, outer: Rect, width: u16, height: u16, title: &str) -> Rect {
    let area = outer.centered(width, height);
    buf.fill(area, Style::new().bg(theme::SURFACE));
    let inner = panel(buf, area, title, true);
    inner.inset(1, 0)
}

/// Snake bar loading indicator for the given elapsed time.
pub fn spinner(elapsed: Duration) -> String {
    let frame = (elapsed.as_millis() / SPINNER_FRAME_MS) as usize;
    let head = frame % (SPINNER_TRACK + SPINNER_SNAKE);
    (0..SPINNER_TRACK)
        .map(|i| if i < head && i + SPINNER_SNAKE >= head { '■' } else { '·' })
        .collect()
}

/// One line of text, clipped.
pub fn line(buf: &mut Buffer, area: Rect, text: &str, style: Style) {
    if !area.is_empty() {
        buf.put_str(area.x, area.y, text, style, area.width);
    }
}

/// Word-wrapped text. Returns the rows used.
pub fn paragraph(buf: &mut Buffer, area: Rect, text: &str, style: Style) -> u16 {
    let mut row = 0;
    for wrapped in wrap(text, area.width as usize) {
        if row >= area.height {
            break;
        }
        buf.put_str(area.x, area.y + row, &wrapped, style, area.width);
        row += 1;
    }
    row
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    use unicode_width::UnicodeWidthStr;

    let mut lines = Vec::new();
    for source in text.lines() {
        let mut current = String::new();
        for word in source.split_whitespace() {
            let needed = if current.is_empty() { word.width() } else { current.width() + 1 + word.width() };
            if needed > width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        lines.push(current);
    }
    lines
}

/// Selectable list; scrolls to keep `cursor` visible.
pub fn list(buf: &mut Buffer, area: Rect, items: &[String], cursor: Option<usize>) {
    let visible = area.height as usize;
    if visible == 0 {
        return;
    }
    let offset = cursor.map_or(0, |c| (c + 1).saturating_sub(visible));
    for (i, item) in items.iter().enumerate().skip(offset).take(visible) {
        let y = area.y + (i - offset) as u16;
        let selected = cursor == Some(i);
        let style = if selected {
            Style::new().fg(theme::TEXT).bg(theme::SELECTED)
        } else {
            theme::text()
        };
        let marker = if selected { "› " } else { "  " };
        buf.paint(Rect::new(area.x, y, area.width, 1), style);
        buf.put_str(area.x, y, &format!("{}{}", marker, item), style, area.width);
    }
}

/// Move a list cursor by `delta`, clamped to `len` items.
pub fn step(cursor: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    cursor.saturating_add_signed(delta).min(len - 1)
}

/// `[1] Dashboard  [2] Unprocessed ...` with the active entry highlighted.
pub fn tabs(buf: &mut Buffer, area: Rect, labels: &[&str], active: usize) {
    let mut x = area.x;
    for (i, label) in labels.iter().enumerate() {
        let text = format!(" {} {} ", i + 1, label);
        let style = if i == active {
            Style::new().fg(theme::BACKGROUND).bg(theme::PRIMARY).bold()
        } else {
            theme::muted()
        };
        let used = buf.put_str(x, area.y, &text, style, area.right().saturating_sub(x));
        x = x.saturating_add(used + 1);
        if x >= area.right() {
            break;
        }
    }
}

/// Key binding hints: `key action  key action`.
pub fn hints(buf: &mut Buffer, area: Rect, bindings: &[(&str, &str)]) {
    let mut x = area.x;
    for (key, action) in bindings {
        let remaining = area.right().saturating_sub(x);
        x += buf.put_str(x, area.y, key, theme::title(), remaining);
        let remaining = area.right().saturating_sub(x);
        x += buf.put_str(x, area.y, &format!(" {}  ", action), theme::muted(), remaining);
    }
}

/// Toast stack in the bottom-right corner, newest at the bottom.
pub fn toasts(buf: &mut Buffer, area: Rect, queue: &[Toast]) {
    let width = area.width.min(48);
    let mut bottom = area.bottom();
    for toast in queue.iter().rev() {
        if bottom < area.y + 3 {
            break;
        }
        let rect = Rect::new(area.right() - width, bottom - 3, width, 3);
        buf.fill(rect, Style::new().bg(theme::SURFACE));
        let accent = Style::new().fg(theme::toast(toast.level));
        for y in rect.y..rect.bottom() {
            buf.put_char(rect.x, y, '▌', accent);
        }
        let text = truncate(&toast.message, width.saturating_sub(3) as usize);
        buf.put_str(rect.x + 2, rect.y + 1, &text, theme::text(), width.saturating_sub(3));
        bottom -= 3;
    }
}

/// Draw a [`TabularView`] outcome into `area`.
///
/// The last row holds the page controls when there is more than one page.
pub fn table<R: TableRow>(
    buf: &mut Buffer,
    area: Rect,
    view: &TabularView<R>,
    rows: &[R],
    loading: bool,
    error: Option<&str>,
    phase: Duration,
) {
    if area.is_empty() {
        return;
    }
    match view.view(rows, loading, error) {
        TableOutcome::Loading => {
            let text = format!("{} Loading...", spinner(phase));
            line(buf, area.row(area.height / 2), &center(&text, area.width), theme::muted());
        }
        TableOutcome::Failed(message) => {
            let middle = area.height / 2;
            line(
                buf,
                area.row(middle.saturating_sub(1)),
                &center(&format!("Error: {}", message), area.width),
                theme::error(),
            );
            line(buf, area.row(middle + 1), &center("Press r to retry", area.width), theme::muted());
        }
        TableOutcome::Empty => {
            line(buf, area.row(area.height / 2), &center("No data available.", area.width), theme::muted());
        }
        TableOutcome::Rows(page) => {
            let widths = column_widths(
                &view.columns().iter().map(|c| c.width()).collect::<Vec<_>>(),
                area.width,
            );
            let (body, footer) = if page.show_controls() {
                area.split_bottom(1)
            } else {
                (area, Rect::default())
            };

            let sort = view.sort();
            let focus = view.sort_focus();
            let mut x = body.x;
            for (column, width) in view.columns().iter().zip(&widths) {
                let mut style = theme::text().bold();
                if column.is_sortable() && focus == Some(column.key()) {
                    style = style.underline();
                }
                buf.put_str(x, body.y, &truncate(&column.label(&sort), *width as usize), style, *width);
                x += width + 1;
            }

            let visible = body.height.saturating_sub(1) as usize;
            let selected = page.rows.iter().position(|r| r.selected).unwrap_or(0);
            let offset = (selected + 1).saturating_sub(visible);
            for (i, row) in page.rows.iter().skip(offset).take(visible).enumerate() {
                let y = body.y + 1 + i as u16;
                let rect = Rect::new(body.x, y, body.width, 1);
                let style = if row.selected {
                    Style::new().fg(theme::TEXT).bg(theme::SELECTED)
                } else if row.highlighted {
                    Style::new().fg(theme::TEXT).bg(theme::REVIEW)
                } else {
                    theme::text()
                };
                buf.paint(rect, style);

                let mut x = body.x;
                for (cell, width) in row.cells.iter().zip(&widths) {
                    buf.put_str(x, y, &truncate(cell, *width as usize), style, *width);
                    x += width + 1;
                }
            }

            if page.show_controls() {
                let prev = if page.has_prev() { theme::text() } else { theme::muted().dim() };
                let next = if page.has_next() { theme::text() } else { theme::muted().dim() };
                let mut x = footer.x;
                x += buf.put_str(x, footer.y, "← Previous", prev, footer.width);
                let status = format!(
                    "   Page {} of {} ({} items)   ",
                    page.page, page.total_pages, page.total_items
                );
                x += buf.put_str(x, footer.y, &status, theme::muted(), footer.right().saturating_sub(x));
                buf.put_str(x, footer.y, "Next →", next, footer.right().saturating_sub(x));
            }
        }
    }
}

/// Fixed columns get their width; flex columns share the rest by weight.
/// One cell of spacing separates columns.
pub fn column_widths(specs: &[ColumnWidth], total: u16) -> Vec<u16> {
    let gaps = specs.len().saturating_sub(1) as u16;
    let fixed: u16 = specs
        .iter()
        .map(|w| match w {
            ColumnWidth::Fixed(n) => *n,
            ColumnWidth::Flex(_) => 0,
        })
        .sum();
    let weights: u16 = specs
        .iter()
        .map(|w| match w {
            ColumnWidth::Flex(n) => *n,
            ColumnWidth::Fixed(_) => 0,
        })
        .sum();
    let mut remaining = total.saturating_sub(fixed + gaps);
    let mut weights_left = weights;

    specs
        .iter()
        .map(|w| match w {
            ColumnWidth::Fixed(n) => *n,
            ColumnWidth::Flex(n) => {
                if weights_left == 0 {
                    return 0;
                }
                let share = (remaining as u32 * *n as u32 / weights_left as u32) as u16;
                remaining -= share;
                weights_left -= n;
                share
            }
        })
        .collect()
}

fn center(text: &str, width: u16) -> String {
    let len = unicode_width::UnicodeWidthStr::width(text) as u16;
    let pad = width.saturating_sub(len) / 2;
    format!("{}{}", " ".repeat(pad as usize), text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{CellValue, Column};

    #[derive(Debug, Clone)]
    struct Row {
        id: i64,
        name: &'static str,
    }

    impl TableRow for Row {
        fn field(&self, key: &str) -> CellValue {
            match key {
                "id" => self.id.into(),
                "name" => self.name.into(),
                _ => CellValue::Null,
            }
        }
    }

    fn view() -> TabularView<Row> {
        TabularView::new(vec![
            Column::new("id", "ID").fixed(4),
            Column::new("name", "Name").sortable(),
        ])
    }

    #[test]
    fn test_column_widths_share_remaining_space() {
        let widths = column_widths(&[ColumnWidth::Fixed(10), ColumnWidth::Flex(1), ColumnWidth::Flex(3)], 52);
        assert_eq!(widths, vec![10, 10, 30]);
        assert_eq!(column_widths(&[ColumnWidth::Fixed(8)], 4), vec![8]);
    }

    #[test]
    fn test_spinner_moves() {
        assert_eq!(spinner(Duration::ZERO), "········");
        assert_eq!(spinner(Duration::from_millis(180)), "■■■·····");
        assert_ne!(spinner(Duration::from_millis(600)), spinner(Duration::from_millis(660)));
    }

    #[test]
    fn test_table_states() {
        let area = Rect::new(0, 0, 40, 6);
        let rows = vec![Row { id: 1, name: "b" }, Row { id: 2, name: "a" }];

        let mut buf = Buffer::new(40, 6);
        table(&mut buf, area, &view(), &[], false, None, Duration::ZERO);
        assert!(buf.text().contains("No data available."));

        let mut buf = Buffer::new(40, 6);
        table(&mut buf, area, &view(), &rows, false, Some("HTTP 500"), Duration::ZERO);
        assert!(buf.text().contains("Error: HTTP 500"));
        assert!(buf.text().contains("Press r to retry"));

        let mut buf = Buffer::new(40, 6);
        table(&mut buf, area, &view(), &rows, true, Some("ignored"), Duration::ZERO);
        assert!(buf.text().contains("Loading..."));
        assert!(!buf.text().contains("ignored"));
    }

    #[test]
    fn test_table_rows_follow_sort() {
        let rows = vec![Row { id: 1, name: "b" }, Row { id: 2, name: "a" }];
        let mut view = view();
        view.toggle_sort("name");

        let mut buf = Buffer::new(40, 6);
        table(&mut buf, Rect::new(0, 0, 40, 6), &view, &rows, false, None, Duration::ZERO);
        assert!(buf.row_text(0).starts_with("ID   Name ▲"));
        assert!(buf.row_text(1).starts_with("2    a"));
        assert!(buf.row_text(2).starts_with("1    b"));
        assert!(!buf.text().contains("Page"));
    }

    #[test]
    fn test_list_scrolls_to_cursor() {
        let items: Vec<String> = (1..=6).map(|i| format!("trim {}", i)).collect();
        let mut buf = Buffer::new(20, 3);
        list(&mut buf, Rect::new(0, 0, 20, 3), &items, Some(4));
        assert_eq!(buf.row_text(0), "  trim 3");
        assert_eq!(buf.row_text(2), "› trim 5");

        assert_eq!(step(0, -1, 6), 0);
        assert_eq!(step(5, 1, 6), 5);
        assert_eq!(step(2, 1, 0), 0);
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("Please select a trim", 10), vec!["Please", "select a", "trim"]);
    }
}
