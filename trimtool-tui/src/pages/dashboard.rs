//! Pipeline overview: headline counts and a manual processing trigger.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent};
use trimtool_lib::model::{ProcessSummary, Stats};

use crate::app::{Context, Frame, Mailbox, Page, PageId};
use crate::format::format_count;
use crate::request::{RequestController, RequestOptions, operation};
use crate::settings::PROCESS_LIMIT;
use crate::toast::Toaster;
use crate::ui::{Buffer, InputEvent, Rect, Style, TextInput, theme, widgets};

/// Batch size when the limit field is empty or not a number.
pub const DEFAULT_PROCESS_LIMIT: u32 = 500;

/// Reads the limit field. Blank or non-numeric text means the default;
/// zero and negatives are rejected.
fn parse_limit(text: &str) -> Result<u32, &'static str> {
    const INVALID: &str = "Please enter a valid limit greater than 0.";
    let Ok(value) = text.trim().parse::<i64>() else {
        return Ok(DEFAULT_PROCESS_LIMIT);
    };
    if value <= 0 {
        return Err(INVALID);
    }
    u32::try_from(value).map_err(|_| INVALID)
}

pub struct DashboardPage {
    ctx: Context,
    stats: RequestController<(), Stats>,
    process: RequestController<u32, ProcessSummary>,
    limit: TextInput,
    editing: bool,
    stored_limit: Mailbox<u32>,
}

impl DashboardPage {
    pub fn new(ctx: &Context) -> Self {
        let client = ctx.client().clone();
        let mut stats = ctx.controller(
            operation(move |(), cancel| {
                let client = client.clone();
                async move { Ok(client.stats(&cancel).await?) }
            }),
            RequestOptions::default(),
        );
        stats.attach(());

        let client = ctx.client().clone();
        let process = ctx.controller(
            operation(move |limit: u32, cancel| {
                let client = client.clone();
                async move { Ok(client.process_listings(limit, &cancel).await?) }
            }),
            RequestOptions::lazy(),
        );

        let stored_limit = ctx.mailbox();
        if let Some(settings) = ctx.settings().cloned() {
            let mailbox = stored_limit.clone();
            tokio::spawn(async move {
                match settings.get(&PROCESS_LIMIT).await {
                    Ok(Some(limit)) => mailbox.post(limit),
                    Ok(None) => {}
                    Err(e) => log::warn!("could not read process limit: {}", e),
                }
            });
        }

        Self {
            ctx: ctx.clone(),
            stats,
            process,
            limit: TextInput::new(DEFAULT_PROCESS_LIMIT.to_string()),
            editing: false,
            stored_limit,
        }
    }

    fn run_process(&mut self) {
        if self.process.is_loading() {
            return;
        }
        let limit = match parse_limit(self.limit.value()) {
            Ok(limit) => limit,
            Err(message) => {
                Toaster::global().error(message);
                return;
            }
        };
        self.limit.set(limit.to_string());
        if let Some(settings) = self.ctx.settings() {
            settings.save(&PROCESS_LIMIT, limit);
        }

        log::info!("processing up to {} listings", limit);
        let ctx = self.ctx.clone();
        self.ctx.submit(&self.process, limit, "Processing failed.", move |summary| {
            log::info!("process finished: {}", summary);
            Toaster::global().success(summary.to_string());
            ctx.refresh(PageId::Dashboard);
            ctx.refresh(PageId::Unprocessed);
            ctx.refresh(PageId::Processed);
        });
    }

    fn draw_stats(&self, buf: &mut Buffer, area: Rect) {
        let (cards, status) = area.split_top(5);
        self.stats.read(|state| {
            let value = |pick: fn(&Stats) -> u64| {
                if state.loading {
                    "...".to_string()
                } else {
                    format_count(state.data.as_ref().map_or(0, pick))
                }
            };
            let entries = [
                ("Total Listings", value(|s| s.total), theme::PRIMARY),
                ("Processed", value(|s| s.processed), theme::SUCCESS),
                ("Needs Review", value(|s| s.needs_review), theme::WARNING),
            ];

            let width = cards.width / entries.len() as u16;
            let mut rest = cards;
            for (title, value, color) in entries {
                let (card, remaining) = rest.split_left(width);
                rest = remaining;
                let inner = widgets::panel(buf, card.inset(1, 0), title, false);
                widgets::line(buf, inner.row(1), &value, Style::new().fg(color).bold());
            }

            if let Some(error) = &state.error {
                let text = format!("Error fetching stats: {}. Press r to retry.", error);
                widgets::line(buf, status.inset(1, 0), &text, theme::error());
            }
        });
    }

    fn draw_process_card(&self, buf: &mut Buffer, area: Rect, frame: &Frame) {
        let inner = widgets::panel(buf, area, "Process New Listings", self.editing);
        widgets::line(
            buf,
            inner,
            "Run the normalization pipeline on unprocessed listings.",
            theme::muted(),
        );
        let (input, button) = inner.row(2).split_left(24);
        self.limit.draw(buf, input, "Limit", self.editing);
        if self.process.is_loading() {
            let text = format!("{} Processing...", widgets::spinner(frame.phase));
            widgets::line(buf, button, &text, theme::muted());
        } else {
            widgets::line(buf, button, "[ Process Now ]", Style::new().fg(theme::PRIMARY).bold());
        }
    }
}

impl Page for DashboardPage {
    fn id(&self) -> PageId {
        PageId::Dashboard
    }

    fn draw(&self, buf: &mut Buffer, area: Rect, frame: &Frame) {
        let (heading, rest) = area.split_top(2);
        widgets::line(
            buf,
            heading,
            "Overview of the listing normalization pipeline.",
            theme::muted(),
        );
        let (stats, rest) = rest.split_top(7);
        self.draw_stats(buf, stats);
        let (card, _) = rest.split_top(5);
        self.draw_process_card(buf, card.inset(1, 0), frame);
    }

    fn handle_key(&mut self, key: &KeyEvent) -> bool {
        if self.editing {
            match key.code {
                KeyCode::Esc => self.editing = false,
                _ => {
                    if self.limit.handle_key(key) == InputEvent::Submitted {
                        self.editing = false;
                        self.run_process();
                    }
                }
            }
            return true;
        }
        match key.code {
            KeyCode::Char('r') => self.refresh(),
            KeyCode::Char('l') => self.editing = true,
            KeyCode::Char('p') | KeyCode::Enter => self.run_process(),
            _ => return false,
        }
        true
    }

    fn refresh(&mut self) {
        self.stats.refresh();
    }

    fn hints(&self) -> Vec<(&'static str, &'static str)> {
        if self.editing {
            vec![("Enter", "Process Now"), ("Esc", "done")]
        } else {
            vec![("l", "edit limit"), ("p", "Process Now"), ("r", "reload stats")]
        }
    }

    fn captures_input(&self) -> bool {
        self.editing
    }

    fn tick(&mut self, _now: Instant) {
        if let Some(limit) = self.stored_limit.drain().pop()
            && !self.editing
        {
            self.limit.set(limit.to_string());
        }
    }

    fn is_busy(&self) -> bool {
        self.stats.is_loading() || self.process.is_loading()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse_limit("250"), Ok(250));
        assert_eq!(parse_limit(" 42 "), Ok(42));
        assert_eq!(parse_limit(""), Ok(DEFAULT_PROCESS_LIMIT));
        assert_eq!(parse_limit("lots"), Ok(DEFAULT_PROCESS_LIMIT));
    }

    #[test]
    fn test_parse_limit_rejects_non_positive() {
        assert!(parse_limit("0").is_err());
        assert!(parse_limit("-5").is_err());
    }
}
