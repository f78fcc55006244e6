//! Matched listings with a debounced filter bar.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent};
use trimtool_lib::model::{AssignmentMethod, Listing, ProcessedQuery};

use super::actions::{ActionSet, ListingActions};
use crate::app::{Context, Frame, Page, PageId};
use crate::debounce::Debounced;
use crate::format::format_date;
use crate::request::{RequestController, RequestOptions, operation};
use crate::table::{Column, TableEvent, TabularView};
use crate::ui::{Buffer, InputEvent, Rect, Style, TextInput, theme, widgets};

/// Filter bar contents as typed.
#[derive(Debug, Clone, PartialEq)]
struct Filters {
    brand: String,
    model: String,
    method: AssignmentMethod,
    min_conf: String,
    max_conf: String,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            brand: String::new(),
            model: String::new(),
            method: AssignmentMethod::All,
            min_conf: "0".into(),
            max_conf: "1".into(),
        }
    }
}

/// Unparseable confidence text counts as 0.
fn parse_conf(text: &str) -> f64 {
    text.trim().parse().unwrap_or(0.0)
}

impl Filters {
    fn to_query(&self) -> ProcessedQuery {
        let mut query = ProcessedQuery::default();
        query.make = self.brand.trim().to_string();
        query.model = self.model.trim().to_string();
        query.method = self.method;
        query.set_min_conf(parse_conf(&self.min_conf));
        query.set_max_conf(parse_conf(&self.max_conf));
        query
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Brand,
    Model,
    Method,
    MinConf,
    MaxConf,
}

impl Field {
    const ORDER: [Field; 5] = [Self::Brand, Self::Model, Self::Method, Self::MinConf, Self::MaxConf];

    fn next(self, forward: bool) -> Self {
        let at = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        let len = Self::ORDER.len();
        Self::ORDER[if forward { (at + 1) % len } else { (at + len - 1) % len }]
    }
}

fn columns() -> Vec<Column<Listing>> {
    vec![
        Column::new("ad_id", "Ad ID").sortable().fixed(12),
        Column::new("brand", "Brand").sortable().flex(2),
        Column::new("model", "Model").sortable().flex(2),
        Column::new("trim", "Raw Trim").sortable().flex(3),
        Column::new("normalized_trim", "Normalized").sortable().flex(3),
        Column::new("confidence", "Conf.")
            .sortable()
            .fixed(6)
            .render(Listing::confidence_percent),
        Column::new("method", "Method").sortable().fixed(10),
        Column::new("needs_review", "Status")
            .fixed(13)
            .render(|l: &Listing| if l.needs_review { "Needs Review".into() } else { String::new() }),
        Column::new("processed_at", "Processed At")
            .sortable()
            .fixed(24)
            .render(|l: &Listing| format_date(l.processed_at.as_deref())),
    ]
}

pub struct ProcessedPage {
    listings: RequestController<ProcessedQuery, Vec<Listing>>,
    table: TabularView<Listing>,
    actions: ListingActions,
    filters: Debounced<Filters>,
    focus: Option<Field>,
    brand: TextInput,
    model: TextInput,
    min_conf: TextInput,
    max_conf: TextInput,
}

impl ProcessedPage {
    pub fn new(ctx: &Context) -> Self {
        let client = ctx.client().clone();
        let mut listings = ctx.controller(
            operation(move |query: ProcessedQuery, cancel| {
                let client = client.clone();
                async move { Ok(client.processed_listings(&query, &cancel).await?) }
            }),
            RequestOptions::default(),
        );
        let filters = Filters::default();
        listings.attach(filters.to_query());

        let set = ActionSet {
            candidates: false,
            details: true,
            review_flagged_only: true,
        };
        Self {
            listings,
            table: TabularView::new(columns()).highlight_row(|l: &Listing| l.needs_review),
            actions: ListingActions::new(ctx, PageId::Processed, set),
            min_conf: TextInput::new(filters.min_conf.clone()),
            max_conf: TextInput::new(filters.max_conf.clone()),
            brand: TextInput::default(),
            model: TextInput::default(),
            filters: Debounced::new(filters),
            focus: None,
        }
    }

    fn len(&self) -> usize {
        self.listings.read(|s| s.data.as_ref().map_or(0, Vec::len))
    }

    fn selected(&self) -> Option<Listing> {
        self.listings
            .read(|s| s.data.as_deref().and_then(|rows| self.table.selected(rows).cloned()))
    }

    fn input_mut(&mut self, field: Field) -> Option<&mut TextInput> {
        match field {
            Field::Brand => Some(&mut self.brand),
            Field::Model => Some(&mut self.model),
            Field::MinConf => Some(&mut self.min_conf),
            Field::MaxConf => Some(&mut self.max_conf),
            Field::Method => None,
        }
    }

    fn handle_filter_key(&mut self, field: Field, key: &KeyEvent) {
        let now = Instant::now();
        match key.code {
            KeyCode::Esc => {
                self.focus = None;
                return;
            }
            KeyCode::Tab => {
                self.focus = Some(field.next(true));
                return;
            }
            KeyCode::BackTab => {
                self.focus = Some(field.next(false));
                return;
            }
            _ => {}
        }

        if field == Field::Method {
            if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Right) {
                self.filters.update(now, |f| f.method = f.method.next());
            }
            return;
        }

        let Some(input) = self.input_mut(field) else { return };
        match input.handle_key(key) {
            InputEvent::Changed => {
                let value = input.value().to_string();
                self.filters.update(now, |f| match field {
                    Field::Brand => f.brand = value,
                    Field::Model => f.model = value,
                    Field::MinConf => f.min_conf = value,
                    Field::MaxConf => f.max_conf = value,
                    Field::Method => {}
                });
            }
            InputEvent::Submitted => {
                if let Some(filters) = self.filters.flush() {
                    self.listings.track(filters.to_query());
                }
            }
            InputEvent::Handled | InputEvent::Ignored => {}
        }
    }

    fn draw_filters(&self, buf: &mut Buffer, area: Rect) {
        let width = area.width / 5;
        let (brand, rest) = area.split_left(width);
        let (model, rest) = rest.split_left(width);
        let (method, rest) = rest.split_left(width);
        let (min_conf, max_conf) = rest.split_left(width);

        self.brand.draw(buf, brand, "Brand", self.focus == Some(Field::Brand));
        self.model.draw(buf, model, "Model", self.focus == Some(Field::Model));

        let focused = self.focus == Some(Field::Method);
        let style = if focused { Style::new().fg(theme::PRIMARY).bold() } else { theme::text() };
        let used = buf.put_str(method.x, method.y, "Method: ", theme::muted(), method.width);
        buf.put_str(
            method.x + used,
            method.y,
            self.filters.pending().method.label(),
            style,
            method.width.saturating_sub(used),
        );

        self.min_conf.draw(buf, min_conf, "Min Conf", self.focus == Some(Field::MinConf));
        self.max_conf.draw(buf, max_conf, "Max Conf", self.focus == Some(Field::MaxConf));
    }
}

impl Page for ProcessedPage {
    fn id(&self) -> PageId {
        PageId::Processed
    }

    fn draw(&self, buf: &mut Buffer, area: Rect, frame: &Frame) {
        let (filters, rest) = area.split_top(2);
        self.draw_filters(buf, filters.row(0));

        let inner = widgets::panel(buf, rest, "Processed Listings", self.focus.is_none());
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
        if let Some(field) = self.focus {
            self.handle_filter_key(field, key);
            return true;
        }
        match key.code {
            KeyCode::Char('/') => {
                self.focus = Some(Field::Brand);
                return true;
            }
            KeyCode::Char('m') => {
                self.filters.update(Instant::now(), |f| f.method = f.method.next());
                return true;
            }
            KeyCode::Char('r') => {
                self.refresh();
                return true;
            }
            _ => {}
        }
        match self.table.handle_key(key, self.len()) {
            TableEvent::Handled => true,
            TableEvent::Activated => {
                if let Some(listing) = self.selected() {
                    self.actions.details(&listing);
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
        if self.focus.is_some() {
            return vec![("Tab", "next filter"), ("Enter", "apply"), ("Esc", "done")];
        }
        let mut hints = vec![("/", "filter"), ("m", "method"), ("s", "sort")];
        hints.extend(self.actions.hints());
        hints.push(("r", "reload"));
        hints
    }

    fn captures_input(&self) -> bool {
        self.focus.is_some()
    }

    fn tick(&mut self, now: Instant) {
        if let Some(filters) = self.filters.poll(now) {
            log::debug!("processed filters settled: {:?}", filters);
            self.listings.track(filters.to_query());
        }
        let len = self.len();
        self.table.sync(len);
    }

    fn deadline(&self) -> Option<Instant> {
        self.filters.deadline()
    }

    fn is_busy(&self) -> bool {
        self.listings.is_loading() || self.actions.is_busy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filters_query() {
        let query = Filters::default().to_query();
        assert_eq!(query, ProcessedQuery::default());
    }

    #[test]
    fn test_filters_to_query() {
        let filters = Filters {
            brand: " Toyota ".into(),
            model: "Camry".into(),
            method: AssignmentMethod::Fuzzy,
            min_conf: "0.25".into(),
            max_conf: "7".into(),
        };
        let query = filters.to_query();
        assert_eq!(query.make, "Toyota");
        assert_eq!(query.method.as_param(), Some("fuzzy"));
        assert_eq!(query.min_conf(), 0.25);
        assert_eq!(query.max_conf(), 1.0);
    }

    #[test]
    fn test_bad_confidence_counts_as_zero() {
        let filters = Filters {
            min_conf: "abc".into(),
            max_conf: String::new(),
            ..Filters::default()
        };
        let query = filters.to_query();
        assert_eq!(query.min_conf(), 0.0);
        assert_eq!(query.max_conf(), 0.0);
    }

    #[test]
    fn test_filter_focus_cycles() {
        assert_eq!(Field::Brand.next(true), Field::Model);
        assert_eq!(Field::MaxConf.next(true), Field::Brand);
        assert_eq!(Field::Brand.next(false), Field::MaxConf);
    }
}
