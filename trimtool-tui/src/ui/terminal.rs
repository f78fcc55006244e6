//! Terminal session: raw mode, alternate screen and diffed frame output.

use std::io::{self, Stdout, Write};
use std::panic;

use crossterm::{
    cursor, queue,
    style::{Attribute, Color, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal,
};

use super::{Buffer, Cell, Rgb};

pub struct Terminal {
    stdout: Stdout,
    current: Buffer,
    previous: Buffer,
}

impl Terminal {
    /// Enter raw mode and the alternate screen.
    ///
    /// Also installs a panic hook that restores the terminal before the
    /// default handler prints the panic.
    pub fn new() -> io::Result<Self> {
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let _ = restore();
            original_hook(info);
        }));

        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        crossterm::execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)?;

        let (width, height) = terminal::size()?;
        Ok(Self {
            stdout,
            current: Buffer::new(width, height),
            previous: Buffer::invalid(width, height),
        })
    }

    /// Draw one frame and write the cells that changed since the last one.
    pub fn draw(&mut self, render: impl FnOnce(&mut Buffer)) -> io::Result<()> {
        let (width, height) = terminal::size()?;
        if width != self.current.width() || height != self.current.height() {
            self.current = Buffer::new(width, height);
            self.previous = Buffer::invalid(width, height);
            queue!(self.stdout, terminal::Clear(terminal::ClearType::All))?;
        }

        self.current.clear();
        render(&mut self.current);
        self.flush_diff()?;
        std::mem::swap(&mut self.current, &mut self.previous);
        Ok(())
    }

    /// Force the next frame to repaint every cell.
    pub fn invalidate(&mut self) {
        self.previous = Buffer::invalid(self.previous.width(), self.previous.height());
    }

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last: Option<(u16, u16)> = None;
        let mut pen: Option<Cell> = None;

        queue!(self.stdout, SetAttribute(Attribute::Reset))?;
        for (x, y, cell) in self.current.diff(&self.previous) {
            if cell.wide_continuation {
                continue;
            }
            if last != Some((x, y)) {
                queue!(self.stdout, cursor::MoveTo(x, y))?;
            }

            if pen.is_none_or(|p| p.fg != cell.fg) {
                queue!(self.stdout, SetForegroundColor(color(cell.fg)))?;
            }
            if pen.is_none_or(|p| p.bg != cell.bg) {
                queue!(self.stdout, SetBackgroundColor(color(cell.bg)))?;
            }
            if pen.is_none_or(|p| (p.bold, p.dim, p.underline) != (cell.bold, cell.dim, cell.underline)) {
                queue!(self.stdout, SetAttribute(Attribute::NormalIntensity))?;
                if cell.bold {
                    queue!(self.stdout, SetAttribute(Attribute::Bold))?;
                }
                if cell.dim {
                    queue!(self.stdout, SetAttribute(Attribute::Dim))?;
                }
                let underline = if cell.underline {
                    Attribute::Underlined
                } else {
                    Attribute::NoUnderline
                };
                queue!(self.stdout, SetAttribute(underline))?;
            }
            pen = Some(*cell);

            write!(self.stdout, "{}", cell.ch)?;
            let advance = unicode_width::UnicodeWidthChar::width(cell.ch).unwrap_or(1).max(1) as u16;
            last = Some((x + advance, y));
        }

        queue!(self.stdout, SetAttribute(Attribute::Reset))?;
        self.stdout.flush()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = restore();
    }
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}

fn restore() -> io::Result<()> {
    let mut stdout = io::stdout();
    crossterm::execute!(
        stdout,
        SetAttribute(Attribute::Reset),
        cursor::Show,
        terminal::LeaveAlternateScreen
    )?;
    terminal::disable_raw_mode()
}
