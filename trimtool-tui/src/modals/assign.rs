//! Assign a canonical trim to a listing.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent};
use trimtool_lib::model::{Assignment, Listing, Trim, TrimQuery};

use super::AliasPromptModal;
use crate::app::{Context, Frame, Modal, ModalAction, PageId};
use crate::debounce::Debounced;
use crate::request::{RequestController, RequestOptions, operation};
use crate::toast::Toaster;
use crate::ui::{Buffer, InputEvent, Rect, TextInput, theme, widgets};

/// Trims requested per master search.
const SEARCH_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Search,
    FreeText,
    Candidate,
}

impl Tab {
    fn label(self) -> &'static str {
        match self {
            Self::Search => "Search Master",
            Self::FreeText => "Free Text",
            Self::Candidate => "From Candidate",
        }
    }
}

/// Master-trim search for `text`.
///
/// The listing's own "brand model" searches that pair; anything else is
/// split into a make (first word) and a model (the rest). `None` when either
/// part is missing.
pub fn master_search(listing: &Listing, text: &str) -> Option<TrimQuery> {
    let (make, model) = if text == default_search(listing) {
        (listing.brand.clone(), listing.model.clone())
    } else {
        let mut words = text.split_whitespace();
        let make = words.next().unwrap_or_default().to_string();
        (make, words.collect::<Vec<_>>().join(" "))
    };
    if make.is_empty() || model.is_empty() {
        return None;
    }
    Some(
        TrimQuery {
            make,
            model,
            ..TrimQuery::default()
        }
        .with_limit(SEARCH_LIMIT),
    )
}

fn default_search(listing: &Listing) -> String {
    format!("{} {}", listing.brand, listing.model)
}

pub struct AssignModal {
    ctx: Context,
    listing: Listing,
    origin: PageId,
    candidate: Option<String>,
    tab: Tab,
    search: TextInput,
    query: Debounced<String>,
    results: RequestController<Option<TrimQuery>, Vec<Trim>>,
    cursor: usize,
    free_text: TextInput,
    submit: RequestController<Assignment, ()>,
}

impl AssignModal {
    /// `origin` is refreshed after a successful assignment. A `candidate`
    /// opens on the "From Candidate" tab.
    pub fn new(ctx: &Context, listing: Listing, origin: PageId, candidate: Option<String>) -> Self {
        let client = ctx.client().clone();
        let mut results = ctx.controller(
            operation(move |query: Option<TrimQuery>, cancel| {
                let client = client.clone();
                async move {
                    match query {
                        Some(query) => Ok(client.trims(&query, &cancel).await?),
                        None => Ok(Vec::new()),
                    }
                }
            }),
            RequestOptions::default(),
        );

        let client = ctx.client().clone();
        let ad_id = listing.ad_id.clone();
        let submit = ctx.controller(
            operation(move |assignment: Assignment, cancel| {
                let client = client.clone();
                let ad_id = ad_id.clone();
                async move {
                    client.assign_trim(&ad_id, &assignment, &cancel).await?;
                    Ok(())
                }
            }),
            RequestOptions::lazy(),
        );

        let initial = default_search(&listing);
        results.attach(master_search(&listing, &initial));

        Self {
            ctx: ctx.clone(),
            tab: if candidate.is_some() { Tab::Candidate } else { Tab::Search },
            search: TextInput::new(initial.clone()),
            query: Debounced::new(initial),
            results,
            cursor: 0,
            free_text: TextInput::default(),
            submit,
            listing,
            origin,
            candidate,
        }
    }

    fn tabs(&self) -> Vec<Tab> {
        let mut tabs = vec![Tab::Search, Tab::FreeText];
        if self.candidate.is_some() {
            tabs.push(Tab::Candidate);
        }
        tabs
    }

    fn cycle_tab(&mut self, forward: bool) {
        let tabs = self.tabs();
        let at = tabs.iter().position(|t| *t == self.tab).unwrap_or(0);
        let next = if forward { at + 1 } else { at + tabs.len() - 1 } % tabs.len();
        self.tab = tabs[next];
    }

    fn selected_trim(&self) -> Option<Trim> {
        self.results
            .read(|s| s.data.as_ref().and_then(|trims| trims.get(self.cursor).cloned()))
    }

    fn assign(&mut self, assignment: Assignment, master: Option<Trim>) {
        if self.submit.is_loading() {
            return;
        }
        let ctx = self.ctx.clone();
        let listing = self.listing.clone();
        let origin = self.origin;
        self.ctx.submit(&self.submit, assignment, "Failed to assign trim.", move |()| {
            Toaster::global().success("Trim assigned successfully.");
            ctx.close_modal();
            ctx.refresh(origin);
            if let Some(trim) = master {
                ctx.open_modal(AliasPromptModal::new(&ctx, listing, trim));
            }
        });
    }
}

impl Modal for AssignModal {
    fn title(&self) -> String {
        format!("Assign Trim for {} {}", self.listing.brand, self.listing.model)
    }

    fn draw(&self, buf: &mut Buffer, area: Rect, frame: &Frame) {
        let inner = widgets::modal(buf, area, 76, 22, &self.title());
        let (tabs_row, rest) = inner.split_top(2);
        let (body, footer) = rest.split_bottom(1);

        let tabs = self.tabs();
        let labels: Vec<&str> = tabs.iter().map(|t| t.label()).collect();
        let active = tabs.iter().position(|t| *t == self.tab).unwrap_or(0);
        widgets::tabs(buf, tabs_row, &labels, active);

        match self.tab {
            Tab::Search => {
                let (input, list) = body.split_top(2);
                self.search.draw(buf, input, "Search", true);
                self.results.read(|state| {
                    if state.loading {
                        let text = format!("{} Searching...", widgets::spinner(frame.phase));
                        widgets::line(buf, list, &text, theme::muted());
                    } else if let Some(error) = &state.error {
                        widgets::line(buf, list, &format!("Error: {}", error), theme::error());
                    } else {
                        let trims = state.data.as_deref().unwrap_or_default();
                        if trims.is_empty() {
                            widgets::line(buf, list, "No matching trims.", theme::muted());
                        }
                        let items: Vec<String> = trims
                            .iter()
                            .map(|t| format!("{} ({})", t.trim_name, t.year_range()))
                            .collect();
                        widgets::list(buf, list, &items, Some(self.cursor));
                    }
                });
            }
            Tab::FreeText => {
                let used = widgets::paragraph(
                    buf,
                    body,
                    "Enter a normalized trim value manually. This will not be linked to the TrimMaster.",
                    theme::muted(),
                );
                self.free_text.draw(buf, body.row(used + 1), "Normalized Trim", true);
            }
            Tab::Candidate => {
                widgets::line(buf, body, "Assigning based on a candidate suggestion.", theme::muted());
                let candidate = self.candidate.as_deref().unwrap_or_default();
                widgets::line(buf, body.row(2), candidate, theme::text().bold());
            }
        }

        if self.submit.is_loading() {
            let text = format!("{} Assigning...", widgets::spinner(frame.phase));
            widgets::line(buf, footer, &text, theme::muted());
        } else {
            let action = match self.tab {
                Tab::Search => "Assign",
                Tab::FreeText => "Assign Manually",
                Tab::Candidate => "Confirm Assignment",
            };
            widgets::hints(buf, footer, &[("Enter", action), ("Tab", "switch tab"), ("Esc", "cancel")]);
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) -> ModalAction {
        match key.code {
            KeyCode::Esc => return ModalAction::Close,
            KeyCode::Tab => self.cycle_tab(true),
            KeyCode::BackTab => self.cycle_tab(false),
            _ => match self.tab {
                Tab::Search => match key.code {
                    KeyCode::Up | KeyCode::Down => {
                        let len = self.results.read(|s| s.data.as_ref().map_or(0, Vec::len));
                        let delta = if key.code == KeyCode::Up { -1 } else { 1 };
                        self.cursor = widgets::step(self.cursor, delta, len);
                    }
                    KeyCode::Enter => {
                        if let Some(trim) = self.selected_trim() {
                            self.assign(Assignment::TrimMasterId(trim.id), Some(trim));
                        }
                    }
                    _ => {
                        if self.search.handle_key(key) == InputEvent::Changed {
                            self.query.set(self.search.value().to_string(), Instant::now());
                        }
                    }
                },
                Tab::FreeText => {
                    if self.free_text.handle_key(key) == InputEvent::Submitted {
                        let text = self.free_text.value().trim().to_string();
                        if !text.is_empty() {
                            self.assign(Assignment::NormalizedTrim(text), None);
                        }
                    }
                }
                Tab::Candidate => {
                    if key.code == KeyCode::Enter
                        && let Some(candidate) = self.candidate.clone()
                    {
                        self.assign(Assignment::NormalizedTrim(candidate), None);
                    }
                }
            },
        }
        ModalAction::Handled
    }

    fn tick(&mut self, now: Instant) {
        if let Some(text) = self.query.poll(now) {
            self.results.track(master_search(&self.listing, &text));
            self.cursor = 0;
        }
    }

    fn deadline(&self) -> Option<Instant> {
        self.query.deadline()
    }

    fn is_busy(&self) -> bool {
        self.results.is_loading() || self.submit.is_loading()
    }
}
