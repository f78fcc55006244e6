//! Cell grid that frames are drawn into before being diffed to the terminal.

use unicode_width::UnicodeWidthChar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Style patch. Unset colors keep whatever the cell already has.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Style {
    pub fg: Option<Rgb>,
    pub bg: Option<Rgb>,
    pub bold: bool,
    pub dim: bool,
    pub underline: bool,
}

impl Style {
    pub const fn new() -> Self {
        Self {
            fg: None,
            bg: None,
            bold: false,
            dim: false,
            underline: false,
        }
    }

    pub const fn fg(mut self, color: Rgb) -> Self {
        self.fg = Some(color);
        self
    }

    pub const fn bg(mut self, color: Rgb) -> Self {
        self.bg = Some(color);
        self
    }

    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub const fn dim(mut self) -> Self {
        self.dim = true;
        self
    }

    pub const fn underline(mut self) -> Self {
        self.underline = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Rgb,
    pub bg: Rgb,
    pub bold: bool,
    pub dim: bool,
    pub underline: bool,
    /// Second column of a double-width character.
    pub wide_continuation: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: super::theme::TEXT,
            bg: super::theme::BACKGROUND,
            bold: false,
            dim: false,
            underline: false,
            wide_continuation: false,
        }
    }
}

impl Cell {
    fn apply(&mut self, style: Style) {
        if let Some(fg) = style.fg {
            self.fg = fg;
        }
        if let Some(bg) = style.bg {
            self.bg = bg;
        }
        self.bold = style.bold;
        self.dim = style.dim;
        self.underline = style.underline;
    }
}

/// A screen region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    /// Shrink by `h` columns and `v` rows on each side.
    pub fn inset(&self, h: u16, v: u16) -> Rect {
        Rect {
            x: self.x.saturating_add(h),
            y: self.y.saturating_add(v),
            width: self.width.saturating_sub(h * 2),
            height: self.height.saturating_sub(v * 2),
        }
    }

    /// Split off the first `rows` rows.
    pub fn split_top(&self, rows: u16) -> (Rect, Rect) {
        let rows = rows.min(self.height);
        (
            Rect::new(self.x, self.y, self.width, rows),
            Rect::new(self.x, self.y + rows, self.width, self.height - rows),
        )
    }

    /// Split off the last `rows` rows.
    pub fn split_bottom(&self, rows: u16) -> (Rect, Rect) {
        let rows = rows.min(self.height);
        let top = self.height - rows;
        (
            Rect::new(self.x, self.y, self.width, top),
            Rect::new(self.x, self.y + top, self.width, rows),
        )
    }

    /// Split off the first `cols` columns.
    pub fn split_left(&self, cols: u16) -> (Rect, Rect) {
        let cols = cols.min(self.width);
        (
            Rect::new(self.x, self.y, cols, self.height),
            Rect::new(self.x + cols, self.y, self.width - cols, self.height),
        )
    }

    /// A `width` x `height` region centered in this one, clipped to fit.
    pub fn centered(&self, width: u16, height: u16) -> Rect {
        let width = width.min(self.width);
        let height = height.min(self.height);
        Rect::new(
            self.x + (self.width - width) / 2,
            self.y + (self.height - height) / 2,
            width,
            height,
        )
    }

    /// Row `n` of this region as a one-line rect.
    pub fn row(&self, n: u16) -> Rect {
        if n >= self.height {
            return Rect::new(self.x, self.bottom(), self.width, 0);
        }
        Rect::new(self.x, self.y + n, self.width, 1)
    }
}

#[derive(Debug, Clone)]
pub struct Buffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Buffer {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width as usize * height as usize],
        }
    }

    /// Same size, but with cells no frame will ever produce, forcing a full
    /// repaint on the next diff.
    pub(crate) fn invalid(width: u16, height: u16) -> Self {
        let poisoned = Cell {
            ch: '\0',
            ..Cell::default()
        };
        Self {
            width,
            height,
            cells: vec![poisoned; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn area(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        (x < self.width && y < self.height).then(|| &self.cells[self.index(x, y)])
    }

    fn get_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        if x < self.width && y < self.height {
            let idx = self.index(x, y);
            Some(&mut self.cells[idx])
        } else {
            None
        }
    }

    fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    /// Blank `rect` and apply `style` to it.
    pub fn fill(&mut self, rect: Rect, style: Style) {
        for y in rect.y..rect.bottom().min(self.height) {
            for x in rect.x..rect.right().min(self.width) {
                if let Some(cell) = self.get_mut(x, y) {
                    *cell = Cell::default();
                    cell.apply(style);
                }
            }
        }
    }

    /// Restyle `rect` without touching its characters.
    pub fn paint(&mut self, rect: Rect, style: Style) {
        for y in rect.y..rect.bottom().min(self.height) {
            for x in rect.x..rect.right().min(self.width) {
                if let Some(cell) = self.get_mut(x, y) {
                    cell.apply(style);
                }
            }
        }
    }

    /// Write `text` at (`x`, `y`), clipped to `max_width` cells and the
    /// buffer edge. Returns the number of cells used.
    pub fn put_str(&mut self, x: u16, y: u16, text: &str, style: Style, max_width: u16) -> u16 {
        if y >= self.height {
            return 0;
        }
        let limit = max_width.min(self.width.saturating_sub(x));
        let mut used: u16 = 0;

        for ch in text.chars() {
            let ch = if ch.is_control() { ' ' } else { ch };
            let w = ch.width().unwrap_or(0) as u16;
            if w == 0 {
                continue;
            }
            if used + w > limit {
                break;
            }
            if let Some(cell) = self.get_mut(x + used, y) {
                cell.ch = ch;
                cell.wide_continuation = false;
                cell.apply(style);
            }
            if w == 2
                && let Some(cell) = self.get_mut(x + used + 1, y)
            {
                cell.ch = ' ';
                cell.wide_continuation = true;
                cell.apply(style);
            }
            used += w;
        }
        used
    }

    pub fn put_char(&mut self, x: u16, y: u16, ch: char, style: Style) {
        if let Some(cell) = self.get_mut(x, y) {
            cell.ch = ch;
            cell.wide_continuation = false;
            cell.apply(style);
        }
    }

    /// Cells of `self` that differ from `previous`.
    pub fn diff<'a>(&'a self, previous: &'a Buffer) -> impl Iterator<Item = (u16, u16, &'a Cell)> {
        let width = self.width as usize;
        self.cells
            .iter()
            .zip(previous.cells.iter())
            .enumerate()
            .filter(|(_, (now, before))| now != before)
            .map(move |(i, (cell, _))| ((i % width) as u16, (i / width) as u16, cell))
    }

    /// The characters of row `y`, trailing blanks removed.
    pub fn row_text(&self, y: u16) -> String {
        if y >= self.height {
            return String::new();
        }
        let start = self.index(0, y);
        let line: String = self.cells[start..start + self.width as usize]
            .iter()
            .filter(|c| !c.wide_continuation)
            .map(|c| c.ch)
            .collect();
        line.trim_end().to_string()
    }

    /// All rows joined by newlines.
    pub fn text(&self) -> String {
        (0..self.height)
            .map(|y| self.row_text(y))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_str_clips_to_width() {
        let mut buf = Buffer::new(10, 2);
        let used = buf.put_str(2, 0, "Toyota Camry", Style::new(), 6);
        assert_eq!(used, 6);
        assert_eq!(buf.row_text(0), "  Toyota");
        assert_eq!(buf.put_str(0, 5, "offscreen", Style::new(), 10), 0);
    }

    #[test]
    fn test_wide_chars_take_two_cells() {
        let mut buf = Buffer::new(6, 1);
        let used = buf.put_str(0, 0, "日本x", Style::new(), 6);
        assert_eq!(used, 5);
        assert!(buf.get(1, 0).is_some_and(|c| c.wide_continuation));
        assert_eq!(buf.row_text(0), "日本x");

        let mut narrow = Buffer::new(3, 1);
        assert_eq!(narrow.put_str(0, 0, "日本", Style::new(), 3), 2);
    }

    #[test]
    fn test_diff_reports_changed_cells_only() {
        let before = Buffer::new(4, 2);
        let mut after = before.clone();
        after.put_str(1, 1, "ab", Style::new().bold(), 4);

        let changed: Vec<(u16, u16, char)> = after.diff(&before).map(|(x, y, c)| (x, y, c.ch)).collect();
        assert_eq!(changed, vec![(1, 1, 'a'), (2, 1, 'b')]);
    }

    #[test]
    fn test_rect_splits() {
        let area = Rect::new(0, 0, 80, 24);
        let (top, rest) = area.split_top(3);
        assert_eq!(top.height, 3);
        assert_eq!(rest, Rect::new(0, 3, 80, 21));

        let (body, footer) = rest.split_bottom(1);
        assert_eq!(footer, Rect::new(0, 23, 80, 1));
        assert_eq!(body.height, 20);

        assert_eq!(area.centered(40, 10), Rect::new(20, 7, 40, 10));
        assert_eq!(area.centered(100, 100), area);
        assert_eq!(Rect::new(0, 0, 3, 3).inset(2, 2).width, 0);
    }
}
