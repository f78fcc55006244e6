//! Terminal rendering: a cell buffer, the crossterm session that diffs it to
//! the screen, and the widgets pages draw with.

mod buffer;
mod input;
mod terminal;
pub mod theme;
pub mod widgets;

pub use buffer::{Buffer, Cell, Rect, Rgb, Style};
pub use input::{InputEvent, TextInput};
pub use terminal::Terminal;
