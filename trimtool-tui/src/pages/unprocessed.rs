//! Listings the matcher has not handled yet.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent};
use trimtool_lib::model::{Listing, UnprocessedQuery};

use super::actions::{ActionSet, ListingActions};
use crate::app::{Context, Frame, Page, PageId};
use crate::request::{RequestController, RequestOptions, operation};
use crate::table::{Column, TableEvent, TabularView};
use crate::ui::{Buffer, Rect, widgets};

fn columns() -> Vec<Column<Listing>> {
    vec![
        Column::new("ad_id", "Ad ID").sortable().fixed(12),
        Column::new("brand", "Brand").sortable().flex(2),
        Column::new("model", "Model").sortable().flex(2),
        Column::new("year", "Year").sortable().fixed(6),
        Column::new("trim", "Raw Trim").sortable().flex(3),
        Column::new("needs_review", "Status")
            .fixed(14)
            .render(|l: &Listing| if l.needs_review { "Needs Review".into() } else { String::new() }),
    ]
}

pub struct UnprocessedPage {
    listings: RequestController<UnprocessedQuery, Vec<Listing>>,
    table: TabularView<Listing>,
    actions: ListingActions,
}

impl UnprocessedPage {
    pub fn new(ctx: &Context) -> Self {
        let client = ctx.client().clone();
        let mut listings = ctx.controller(
            operation(move |query: UnprocessedQuery, cancel| {
                let client = client.clone();
                async move { Ok(client.unprocessed_listings(&query, &cancel).await?) }
            }),
            RequestOptions::default(),
        );
        listings.attach(UnprocessedQuery::default());

        let set = ActionSet {
            candidates: true,
            details: false,
            review_flagged_only: false,
        };
        Self {
            listings,
            table: TabularView::new(columns()).highlight_row(|l: &Listing| l.needs_review),
            actions: ListingActions::new(ctx, PageId::Unprocessed, set),
        }
    }

    fn len(&self) -> usize {
        self.listings.read(|s| s.data.as_ref().map_or(0, Vec::len))
    }

    fn selected(&self) -> Option<Listing> {
        self.listings
            .read(|s| s.data.as_deref().and_then(|rows| self.table.selected(rows).cloned()))
    }
}

impl Page for UnprocessedPage {
    fn id(&self) -> PageId {
        PageId::Unprocessed
    }

    fn draw(&self, buf: &mut Buffer, area: Rect, frame: &Frame) {
        let inner = widgets::panel(buf, area, "Unprocessed Listings", true);
        self.listings.read(|s| {
            widgets::table(
                buf,
                inner,
                &self.table,
                s.data.as_deref().unwrap_or_default(),
                s.loading,
                s.error.as_deref(),
                frame.phase,
            );
        });
    }

    fn handle_key(&mut self, key: &KeyEvent) -> bool {
        if key.code == KeyCode::Char('r') {
            self.refresh();
            return true;
        }
        match self.table.handle_key(key, self.len()) {
            TableEvent::Handled => true,
            TableEvent::Activated => {
                if let Some(listing) = self.selected() {
                    self.actions.assign(&listing);
                }
                true
            }
            TableEvent::Ignored => {
                let selected = self.selected();
                self.actions.handle_key(key, selected.as_ref())
            }
        }
    }

    fn refresh(&mut self) {
        self.listings.refresh();
    }

    fn hints(&self) -> Vec<(&'static str, &'static str)> {
        let mut hints = vec![("↑/↓", "select"), ("←/→", "page"), ("s", "sort")];
        hints.extend(self.actions.hints());
        hints.push(("r", "reload"));
        hints
    }

    fn tick(&mut self, _now: Instant) {
        let len = self.len();
        self.table.sync(len);
    }

    fn is_busy(&self) -> bool {
        self.listings.is_loading() || self.actions.is_busy()
    }
}
