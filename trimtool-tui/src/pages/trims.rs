//! Canonical trims: create form, make/model filters and the trim table.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent};
use trimtool_lib::model::{NewTrim, Trim, TrimQuery};

use crate::app::{Context, Frame, Mailbox, Page, PageId};
use crate::debounce::Debounced;
use crate::modals::TrimDrawer;
use crate::request::{RequestController, RequestOptions, operation};
use crate::table::{Column, TableEvent, TabularView};
use crate::toast::Toaster;
use crate::ui::{Buffer, InputEvent, Rect, TextInput, theme, widgets};

/// The table shows every trim the filters match.
const TRIM_LIMIT: u32 = 10_000;

const FORM_LABELS: [&str; 5] = ["Make/Brand", "Model", "Trim Name", "Year Start", "Year End"];

fn columns() -> Vec<Column<Trim>> {
    vec![
        Column::new("make", "Make/Brand").sortable().flex(2),
        Column::new("model", "Model").sortable().flex(2),
        Column::new("trim_name", "Trim Name").sortable().flex(3),
        Column::new("year_start", "Year Start").sortable().fixed(10),
        Column::new("year_end", "Year End").sortable().fixed(10),
    ]
}

fn parse_year(text: &str) -> Result<Option<i32>, &'static str> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    text.parse().map(Some).map_err(|_| "Years must be whole numbers.")
}

/// Validates the create form: make, model and trim name are required,
/// years are optional integers.
fn new_trim(values: [&str; 5]) -> Result<NewTrim, &'static str> {
    let [make, model, trim_name, year_start, year_end] = values.map(str::trim);
    if make.is_empty() || model.is_empty() || trim_name.is_empty() {
        return Err("Make, Model, and Trim Name are required.");
    }
    Ok(NewTrim {
        make: make.to_string(),
        model: model.to_string(),
        trim_name: trim_name.to_string(),
        year_start: parse_year(year_start)?,
        year_end: parse_year(year_end)?,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Table,
    Form(usize),
    Filter(usize),
}

/// Outcome of a create request, applied on the next tick.
#[derive(Debug)]
enum Created {
    Ok,
    Failed(String),
}

pub struct TrimsPage {
    ctx: Context,
    trims: RequestController<TrimQuery, Vec<Trim>>,
    table: TabularView<Trim>,
    filters: Debounced<(String, String)>,
    filter_inputs: [TextInput; 2],
    form: [TextInput; 5],
    form_error: Option<String>,
    create: RequestController<NewTrim, Trim>,
    created: Mailbox<Created>,
    focus: Focus,
}

fn trim_query((make, model): &(String, String)) -> TrimQuery {
    TrimQuery {
        make: make.trim().to_string(),
        model: model.trim().to_string(),
        skip: Some(0),
        ..TrimQuery::default()
    }
    .with_limit(TRIM_LIMIT)
}

impl TrimsPage {
    pub fn new(ctx: &Context) -> Self {
        let client = ctx.client().clone();
        let mut trims = ctx.controller(
            operation(move |query: TrimQuery, cancel| {
                let client = client.clone();
                async move { Ok(client.trims(&query, &cancel).await?) }
            }),
            RequestOptions::default(),
        );
        let filters = (String::new(), String::new());
        trims.attach(trim_query(&filters));

        let client = ctx.client().clone();
        let create = ctx.controller(
            operation(move |trim: NewTrim, cancel| {
                let client = client.clone();
                async move { Ok(client.create_trim(&trim, &cancel).await?) }
            }),
            RequestOptions::lazy(),
        );

        Self {
            ctx: ctx.clone(),
            trims,
            table: TabularView::new(columns()),
            filters: Debounced::new(filters),
            filter_inputs: Default::default(),
            form: Default::default(),
            form_error: None,
            create,
            created: ctx.mailbox(),
            focus: Focus::Table,
        }
    }

    fn len(&self) -> usize {
        self.trims.read(|s| s.data.as_ref().map_or(0, Vec::len))
    }

    fn selected(&self) -> Option<Trim> {
        self.trims
            .read(|s| s.data.as_deref().and_then(|rows| self.table.selected(rows).cloned()))
    }

    fn submit_form(&mut self) {
        if self.create.is_loading() {
            return;
        }
        let trim = match new_trim(self.form.each_ref().map(TextInput::value)) {
            Ok(trim) => trim,
            Err(message) => {
                self.form_error = Some(message.to_string());
                return;
            }
        };
        self.form_error = None;

        log::info!("creating trim {} {} {}", trim.make, trim.model, trim.trim_name);
        let ok = self.created.clone();
        let failed = self.created.clone();
        self.ctx.submit_with(
            &self.create,
            trim,
            "Failed to create trim.",
            move |_| {
                Toaster::global().success("Trim created successfully!");
                ok.post(Created::Ok);
            },
            move |err| failed.post(Created::Failed(err.message.clone())),
        );
    }

    fn handle_form_key(&mut self, index: usize, key: &KeyEvent) {
        match key.code {
            KeyCode::Esc => self.focus = Focus::Table,
            KeyCode::Tab => self.focus = Focus::Form((index + 1) % FORM_LABELS.len()),
            KeyCode::BackTab => {
                self.focus = Focus::Form((index + FORM_LABELS.len() - 1) % FORM_LABELS.len())
            }
            _ => {
                if self.form[index].handle_key(key) == InputEvent::Submitted {
                    self.submit_form();
                }
            }
        }
    }

    fn handle_filter_key(&mut self, index: usize, key: &KeyEvent) {
        match key.code {
            KeyCode::Esc => self.focus = Focus::Table,
            KeyCode::Tab | KeyCode::BackTab => self.focus = Focus::Filter(1 - index),
            _ => match self.filter_inputs[index].handle_key(key) {
                InputEvent::Changed => {
                    let value = self.filter_inputs[index].value().to_string();
                    self.filters.update(Instant::now(), |(make, model)| {
                        if index == 0 {
                            *make = value;
                        } else {
                            *model = value;
                        }
                    });
                }
                InputEvent::Submitted => {
                    if let Some(filters) = self.filters.flush() {
                        self.trims.track(trim_query(&filters));
                    }
                    self.focus = Focus::Table;
                }
                InputEvent::Handled | InputEvent::Ignored => {}
            },
        }
    }

    fn draw_form(&self, buf: &mut Buffer, area: Rect, frame: &Frame) {
        let focused = matches!(self.focus, Focus::Form(_));
        let inner = widgets::panel(buf, area, "Create New Trim", focused);
        let width = inner.width / FORM_LABELS.len() as u16;
        let mut rest = inner.row(0);
        for (i, label) in FORM_LABELS.iter().enumerate() {
            let (cell, remaining) = rest.split_left(width);
            rest = remaining;
            self.form[i].draw(buf, cell, label, self.focus == Focus::Form(i));
        }
        let status = inner.row(1);
        if self.create.is_loading() {
            let text = format!("{} Creating...", widgets::spinner(frame.phase));
            widgets::line(buf, status, &text, theme::muted());
        } else if let Some(error) = &self.form_error {
            widgets::line(buf, status, error, theme::error());
        }
    }
}

impl Page for TrimsPage {
    fn id(&self) -> PageId {
        PageId::Trims
    }

    fn draw(&self, buf: &mut Buffer, area: Rect, frame: &Frame) {
        let (form, rest) = area.split_top(4);
        self.draw_form(buf, form, frame);

        let (filters, rest) = rest.split_top(2);
        let (make, model) = filters.row(0).split_left(filters.width / 2);
        self.filter_inputs[0].draw(buf, make, "Filter by Make", self.focus == Focus::Filter(0));
        self.filter_inputs[1].draw(buf, model, "Filter by Model", self.focus == Focus::Filter(1));

        let inner = widgets::panel(buf, rest, "Manage Trims (TrimMaster)", self.focus == Focus::Table);
        self.trims.read(|s| {
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
        match self.focus {
            Focus::Form(index) => {
                self.handle_form_key(index, key);
                return true;
            }
            Focus::Filter(index) => {
                self.handle_filter_key(index, key);
                return true;
            }
            Focus::Table => {}
        }
        match key.code {
            KeyCode::Char('n') => {
                self.focus = Focus::Form(0);
                return true;
            }
            KeyCode::Char('/') => {
                self.focus = Focus::Filter(0);
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
                if let Some(trim) = self.selected() {
                    self.ctx.open_modal(TrimDrawer::new(&self.ctx, trim));
                }
                true
            }
            TableEvent::Ignored => false,
        }
    }

    fn refresh(&mut self) {
        self.trims.refresh();
    }

    fn hints(&self) -> Vec<(&'static str, &'static str)> {
        match self.focus {
            Focus::Form(_) => vec![("Tab", "next field"), ("Enter", "Create"), ("Esc", "done")],
            Focus::Filter(_) => vec![("Tab", "next filter"), ("Enter", "apply"), ("Esc", "done")],
            Focus::Table => vec![
                ("Enter", "details"),
                ("n", "new trim"),
                ("/", "filter"),
                ("s", "sort"),
                ("r", "reload"),
            ],
        }
    }

    fn captures_input(&self) -> bool {
        self.focus != Focus::Table
    }

    fn tick(&mut self, now: Instant) {
        for created in self.created.drain() {
            match created {
                Created::Ok => {
                    self.form.iter_mut().for_each(TextInput::clear);
                    self.trims.refresh();
                }
                Created::Failed(message) => self.form_error = Some(message),
            }
        }
        if let Some(filters) = self.filters.poll(now) {
            self.trims.track(trim_query(&filters));
        }
        let len = self.len();
        self.table.sync(len);
    }

    fn deadline(&self) -> Option<Instant> {
        self.filters.deadline()
    }

    fn is_busy(&self) -> bool {
        self.trims.is_loading() || self.create.is_loading()
    }
}
