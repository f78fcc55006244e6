//! Everything the backend knows about one listing, in two sections.

use crossterm::event::{KeyCode, KeyEvent};
use serde_json::{Map, Value};
use trimtool_lib::model::{Listing, ListingDetails};

use crate::app::{Context, Frame, Modal, ModalAction};
use crate::request::{OperationError, RequestController, RequestOptions, operation};
use crate::ui::{Buffer, Rect, theme, widgets};

const FETCH_FAILED: &str = "Failed to fetch listing details.";

#[derive(Debug, Clone, PartialEq)]
enum Line {
    Heading(&'static str),
    Field(String, String),
    Note(&'static str),
    Blank,
}

fn fields(map: &Map<String, Value>) -> impl Iterator<Item = Line> + '_ {
    map.iter().map(|(key, value)| {
        Line::Field(ListingDetails::display_key(key), ListingDetails::display_value(value))
    })
}

fn layout(details: &ListingDetails) -> Vec<Line> {
    let mut lines = vec![Line::Heading("Base Listing Information")];
    lines.extend(fields(&details.listing));
    lines.push(Line::Blank);
    lines.push(Line::Heading("Website Details"));
    match &details.details {
        Some(map) if !map.is_empty() => lines.extend(fields(map)),
        _ => lines.push(Line::Note("No additional website details available")),
    }
    lines
}

pub struct DetailsModal {
    listing: Listing,
    details: RequestController<String, ListingDetails>,
    scroll: usize,
}

impl DetailsModal {
    pub fn new(ctx: &Context, listing: Listing) -> Self {
        let client = ctx.client().clone();
        let details = ctx.controller(
            operation(move |ad_id: String, cancel| {
                let client = client.clone();
                async move {
                    client.listing_details(&ad_id, &cancel).await.map_err(|e| {
                        if e.is_cancelled() {
                            OperationError::Cancelled
                        } else {
                            log::warn!("details for {}: {}", ad_id, e);
                            OperationError::Failed(FETCH_FAILED.to_string())
                        }
                    })
                }
            }),
            RequestOptions::lazy(),
        );

        let closer = ctx.clone();
        ctx.submit_with(&details, listing.ad_id.clone(), FETCH_FAILED, |_| {}, move |_| {
            closer.close_modal()
        });

        Self {
            listing,
            details,
            scroll: 0,
        }
    }

    fn line_count(&self) -> usize {
        self.details.read(|s| s.data.as_ref().map_or(0, |d| layout(d).len()))
    }
}

impl Modal for DetailsModal {
    fn title(&self) -> String {
        "Listing Details".to_string()
    }

    fn draw(&self, buf: &mut Buffer, area: Rect, frame: &Frame) {
        let width = area.width.saturating_sub(8).min(100);
        let height = area.height.saturating_sub(4);
        let inner = widgets::modal(buf, area, width, height, &self.title());
        let (body, footer) = inner.split_bottom(1);

        let subtitle = format!(
            "{} · {} {}",
            self.listing.ad_id, self.listing.brand, self.listing.model
        );
        let (head, body) = body.split_top(2);
        widgets::line(buf, head, &subtitle, theme::muted());

        self.details.read(|state| {
            if state.loading {
                let text = format!("{} Loading listing details...", widgets::spinner(frame.phase));
                widgets::line(buf, body, &text, theme::muted());
                return;
            }
            let Some(details) = &state.data else { return };
            let key_width = body.width / 3;
            for (row, line) in layout(details)
                .into_iter()
                .skip(self.scroll)
                .take(body.height as usize)
                .enumerate()
            {
                let area = body.row(row as u16);
                match line {
                    Line::Heading(text) => widgets::line(buf, area, text, theme::title()),
                    Line::Field(key, value) => {
                        let (label, rest) = area.split_left(key_width);
                        widgets::line(buf, label, &format!("{}:", key), theme::muted());
                        widgets::line(buf, rest, &value, theme::text());
                    }
                    Line::Note(text) => widgets::line(buf, area, text, theme::muted()),
                    Line::Blank => {}
                }
            }
        });

        widgets::hints(buf, footer, &[("↑/↓", "scroll"), ("Esc", "close")]);
    }

    fn handle_key(&mut self, key: &KeyEvent) -> ModalAction {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => return ModalAction::Close,
            KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Down => {
                let last = self.line_count().saturating_sub(1);
                self.scroll = (self.scroll + 1).min(last);
            }
            KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(10),
            KeyCode::PageDown => {
                let last = self.line_count().saturating_sub(1);
                self.scroll = (self.scroll + 10).min(last);
            }
            _ => {}
        }
        ModalAction::Handled
    }

    fn is_busy(&self) -> bool {
        self.details.is_loading()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_layout_sections() {
        let details: ListingDetails = serde_json::from_value(json!({
            "listing": {"ad_id": "A1", "processed_at": null},
            "details": {"mileage": 42000}
        }))
        .unwrap();

        let lines = layout(&details);
        assert_eq!(lines[0], Line::Heading("Base Listing Information"));
        assert!(lines.contains(&Line::Field("Processed at".into(), "N/A".into())));
        assert!(lines.contains(&Line::Field("Mileage".into(), "42000".into())));
        assert!(!lines.contains(&Line::Note("No additional website details available")));
    }

    #[test]
    fn test_missing_website_details() {
        let details: ListingDetails = serde_json::from_value(json!({
            "listing": {"ad_id": "A1"},
            "details": null
        }))
        .unwrap();
        assert_eq!(
            layout(&details).last(),
            Some(&Line::Note("No additional website details available"))
        );
    }
}
