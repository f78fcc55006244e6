//! Create an alias: pick a master trim, then name the alias.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent};
use trimtool_lib::model::{Alias, NewAlias, Trim, TrimQuery};

use crate::app::{Context, Frame, Modal, ModalAction, PageId};
use crate::debounce::Debounced;
use crate::request::{RequestController, RequestOptions, operation};
use crate::toast::Toaster;
use crate::ui::{Buffer, InputEvent, Rect, TextInput, theme, widgets};

const SEARCH_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Search,
    Alias,
}

pub struct AliasCreateModal {
    ctx: Context,
    focus: Field,
    search: TextInput,
    query: Debounced<String>,
    trims: RequestController<TrimQuery, Vec<Trim>>,
    cursor: usize,
    selected: Option<Trim>,
    alias: TextInput,
    form_error: Option<&'static str>,
    create: RequestController<NewAlias, Alias>,
}

impl AliasCreateModal {
    pub fn new(ctx: &Context) -> Self {
        let client = ctx.client().clone();
        let mut trims = ctx.controller(
            operation(move |query: TrimQuery, cancel| {
                let client = client.clone();
                async move { Ok(client.trims(&query, &cancel).await?) }
            }),
            RequestOptions::default(),
        );
        trims.attach(TrimQuery::default().with_limit(SEARCH_LIMIT));

        let client = ctx.client().clone();
        let create = ctx.controller(
            operation(move |alias: NewAlias, cancel| {
                let client = client.clone();
                async move { Ok(client.create_alias(&alias, &cancel).await?) }
            }),
            RequestOptions::lazy(),
        );

        Self {
            ctx: ctx.clone(),
            focus: Field::Search,
            search: TextInput::default(),
            query: Debounced::new(String::new()),
            trims,
            cursor: 0,
            selected: None,
            alias: TextInput::default(),
            form_error: None,
            create,
        }
    }

    fn result_count(&self) -> usize {
        self.trims.read(|s| s.data.as_ref().map_or(0, Vec::len))
    }

    fn select_current(&mut self) {
        let trim = self
            .trims
            .read(|s| s.data.as_ref().and_then(|t| t.get(self.cursor).cloned()));
        if let Some(trim) = trim {
            self.selected = Some(trim);
            self.focus = Field::Alias;
        }
    }

    fn submit(&mut self) {
        let alias = self.alias.value().trim();
        let Some(trim) = self.selected.as_ref().filter(|_| !alias.is_empty()) else {
            self.form_error = Some("Please select a trim and provide an alias.");
            return;
        };
        if self.create.is_loading() {
            return;
        }
        self.form_error = None;

        let ctx = self.ctx.clone();
        let request = NewAlias::new(trim.id, alias);
        self.ctx.submit(&self.create, request, "Failed to create alias.", move |created| {
            log::info!("created alias {:?} for trim {}", created.alias, created.trim_master_id);
            Toaster::global().success("Alias created successfully!");
            ctx.close_modal();
            ctx.refresh(PageId::Aliases);
        });
    }
}

impl Modal for AliasCreateModal {
    fn title(&self) -> String {
        "Create New Alias".to_string()
    }

    fn draw(&self, buf: &mut Buffer, area: Rect, frame: &Frame) {
        let inner = widgets::modal(buf, area, 72, 20, &self.title());
        let (body, footer) = inner.split_bottom(1);
        let (search_row, body) = body.split_top(1);
        let (selected_row, body) = body.split_top(2);
        let (body, form_rows) = body.split_bottom(3);

        self.search
            .draw(buf, search_row, "Search and Select Master Trim", self.focus == Field::Search);

        if let Some(trim) = &self.selected {
            let text = format!("Selected: {} {} - {}", trim.make, trim.model, trim.trim_name);
            widgets::line(buf, selected_row, &text, theme::text().bold());
        }

        self.trims.read(|state| {
            if state.loading {
                widgets::line(buf, body, &widgets::spinner(frame.phase), theme::muted());
            } else if let Some(error) = &state.error {
                widgets::line(buf, body, &format!("Error: {}", error), theme::error());
            } else if let Some(trims) = &state.data {
                let items: Vec<String> = trims
                    .iter()
                    .map(|t| format!("{} {} - {}", t.make, t.model, t.trim_name))
                    .collect();
                let cursor = (self.focus == Field::Search).then_some(self.cursor);
                widgets::list(buf, body, &items, cursor);
            }
        });

        self.alias.draw(buf, form_rows.row(0), "Alias Name", self.focus == Field::Alias);
        if let Some(error) = self.form_error {
            widgets::line(buf, form_rows.row(2), error, theme::error());
        }

        if self.create.is_loading() {
            let text = format!("{} Creating...", widgets::spinner(frame.phase));
            widgets::line(buf, footer, &text, theme::muted());
        } else {
            let enter = match self.focus {
                Field::Search => "select trim",
                Field::Alias => "Create Alias",
            };
            widgets::hints(buf, footer, &[("Enter", enter), ("Tab", "next field"), ("Esc", "Cancel")]);
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) -> ModalAction {
        match (self.focus, key.code) {
            (_, KeyCode::Esc) => return ModalAction::Close,
            (Field::Search, KeyCode::Tab) => self.focus = Field::Alias,
            (Field::Alias, KeyCode::Tab | KeyCode::BackTab) => self.focus = Field::Search,
            (Field::Search, KeyCode::Up) => self.cursor = widgets::step(self.cursor, -1, self.result_count()),
            (Field::Search, KeyCode::Down) => self.cursor = widgets::step(self.cursor, 1, self.result_count()),
            (Field::Search, KeyCode::Enter) => self.select_current(),
            (Field::Search, _) => {
                if self.search.handle_key(key) == InputEvent::Changed {
                    self.query.set(self.search.value().to_string(), Instant::now());
                }
            }
            (Field::Alias, _) => {
                if self.alias.handle_key(key) == InputEvent::Submitted {
                    self.submit();
                }
            }
        }
        ModalAction::Handled
    }

    fn tick(&mut self, now: Instant) {
        if let Some(text) = self.query.poll(now) {
            self.trims.track(TrimQuery::from_search(&text).with_limit(SEARCH_LIMIT));
            self.cursor = 0;
        }
    }

    fn deadline(&self) -> Option<Instant> {
        self.query.deadline()
    }

    fn is_busy(&self) -> bool {
        self.trims.is_loading() || self.create.is_loading()
    }
}
