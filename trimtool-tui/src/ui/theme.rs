//! Console palette.

use super::{Rgb, Style};
use crate::toast::ToastLevel;

pub const BACKGROUND: Rgb = Rgb::new(22, 24, 30);
pub const SURFACE: Rgb = Rgb::new(32, 35, 44);
pub const BORDER: Rgb = Rgb::new(70, 75, 90);
pub const TEXT: Rgb = Rgb::new(220, 223, 228);
pub const MUTED: Rgb = Rgb::new(130, 136, 150);
pub const PRIMARY: Rgb = Rgb::new(96, 165, 250);
pub const SUCCESS: Rgb = Rgb::new(74, 222, 128);
pub const WARNING: Rgb = Rgb::new(251, 191, 36);
pub const ERROR: Rgb = Rgb::new(248, 113, 113);
pub const SELECTED: Rgb = Rgb::new(45, 60, 90);
pub const REVIEW: Rgb = Rgb::new(58, 50, 28);

pub const fn text() -> Style {
    Style::new().fg(TEXT)
}

pub const fn muted() -> Style {
    Style::new().fg(MUTED)
}

pub const fn title() -> Style {
    Style::new().fg(PRIMARY).bold()
}

pub const fn error() -> Style {
    Style::new().fg(ERROR)
}

pub fn toast(level: ToastLevel) -> Rgb {
    match level {
        ToastLevel::Info => PRIMARY,
        ToastLevel::Success => SUCCESS,
        ToastLevel::Warning => WARNING,
        ToastLevel::Error => ERROR,
    }
}
