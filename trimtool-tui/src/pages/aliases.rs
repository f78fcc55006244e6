//! Alias management: filters, table, create and delete.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent};
use trimtool_lib::model::{Alias, AliasQuery};

use crate::app::{Context, Frame, Mailbox, Page, PageId};
use crate::debounce::Debounced;
use crate::format::format_date;
use crate::modals::{AliasCreateModal, ConfirmModal};
use crate::request::{RequestController, RequestOptions, operation};
use crate::table::{Column, TableEvent, TabularView};
use crate::toast::Toaster;
use crate::ui::{Buffer, InputEvent, Rect, TextInput, widgets};

fn columns() -> Vec<Column<Alias>> {
    vec![
        Column::new("alias", "Alias").sortable().flex(2),
        Column::new("master", "Master Trim").sortable().flex(3),
        Column::new("created_at", "Created At")
            .sortable()
            .fixed(24)
            .render(|a: &Alias| format_date(a.created_at.as_deref())),
    ]
}

fn delete_message(alias: &Alias) -> String {
    format!(
        "Are you sure you want to delete the alias \"{}\"? This action cannot be undone.",
        alias.alias
    )
}

pub struct AliasesPage {
    ctx: Context,
    aliases: RequestController<AliasQuery, Vec<Alias>>,
    table: TabularView<Alias>,
    filters: Debounced<AliasQuery>,
    inputs: [TextInput; 2],
    filtering: Option<usize>,
    delete: RequestController<i64, ()>,
    confirmed: Mailbox<i64>,
}

impl AliasesPage {
    pub fn new(ctx: &Context) -> Self {
        let client = ctx.client().clone();
        let mut aliases = ctx.controller(
            operation(move |query: AliasQuery, cancel| {
                let client = client.clone();
                async move { Ok(client.aliases(&query, &cancel).await?) }
            }),
            RequestOptions::default(),
        );
        aliases.attach(AliasQuery::default());

        let client = ctx.client().clone();
        let delete = ctx.controller(
            operation(move |id: i64, cancel| {
                let client = client.clone();
                async move { Ok(client.delete_alias(id, &cancel).await?) }
            }),
            RequestOptions::lazy(),
        );

        Self {
            ctx: ctx.clone(),
            aliases,
            table: TabularView::new(columns()),
            filters: Debounced::new(AliasQuery::default()),
            inputs: Default::default(),
            filtering: None,
            delete,
            confirmed: ctx.mailbox(),
        }
    }

    fn len(&self) -> usize {
        self.aliases.read(|s| s.data.as_ref().map_or(0, Vec::len))
    }

    fn selected(&self) -> Option<Alias> {
        self.aliases
            .read(|s| s.data.as_deref().and_then(|rows| self.table.selected(rows).cloned()))
    }

    fn confirm_delete(&self, alias: &Alias) {
        let confirmed = self.confirmed.clone();
        let id = alias.id;
        let dialog = ConfirmModal::new(delete_message(alias), move || confirmed.post(id))
            .title("Delete Alias");
        self.ctx.open_modal(dialog);
    }

    fn delete(&self, id: i64) {
        log::info!("deleting alias {}", id);
        let ctx = self.ctx.clone();
        self.ctx.submit(&self.delete, id, "Failed to delete alias", move |()| {
            Toaster::global().success("Alias deleted successfully");
            ctx.refresh(PageId::Aliases);
        });
    }

    fn handle_filter_key(&mut self, index: usize, key: &KeyEvent) {
        match key.code {
            KeyCode::Esc => self.filtering = None,
            KeyCode::Tab | KeyCode::BackTab => self.filtering = Some(1 - index),
            _ => match self.inputs[index].handle_key(key) {
                InputEvent::Changed => {
                    let value = self.inputs[index].value().trim().to_string();
                    self.filters.update(Instant::now(), |query| {
                        if index == 0 {
                            query.make = value;
                        } else {
                            query.model = value;
                        }
                    });
                }
                InputEvent::Submitted => {
                    if let Some(query) = self.filters.flush() {
                        self.aliases.track(query);
                    }
                    self.filtering = None;
                }
                InputEvent::Handled | InputEvent::Ignored => {}
            },
        }
    }
}

impl Page for AliasesPage {
    fn id(&self) -> PageId {
        PageId::Aliases
    }

    fn draw(&self, buf: &mut Buffer, area: Rect, frame: &Frame) {
        let (filters, rest) = area.split_top(2);
        let (make, model) = filters.row(0).split_left(filters.width / 2);
        self.inputs[0].draw(buf, make, "Filter by Make", self.filtering == Some(0));
        self.inputs[1].draw(buf, model, "Filter by Model", self.filtering == Some(1));

        let inner = widgets::panel(buf, rest, "Manage Aliases", self.filtering.is_none());
        self.aliases.read(|s| {
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
        if let Some(index) = self.filtering {
            self.handle_filter_key(index, key);
            return true;
        }
        match key.code {
            KeyCode::Char('/') => self.filtering = Some(0),
            KeyCode::Char('n') => self.ctx.open_modal(AliasCreateModal::new(&self.ctx)),
            KeyCode::Char('x') | KeyCode::Delete => {
                if let Some(alias) = self.selected() {
                    self.confirm_delete(&alias);
                }
            }
            KeyCode::Char('r') => self.refresh(),
            _ => return self.table.handle_key(key, self.len()) != TableEvent::Ignored,
        }
        true
    }

    fn refresh(&mut self) {
        self.aliases.refresh();
    }

    fn hints(&self) -> Vec<(&'static str, &'static str)> {
        if self.filtering.is_some() {
            return vec![("Tab", "next filter"), ("Enter", "apply"), ("Esc", "done")];
        }
        vec![
            ("n", "Create New Alias"),
            ("x", "delete"),
            ("/", "filter"),
            ("s", "sort"),
            ("r", "reload"),
        ]
    }

    fn captures_input(&self) -> bool {
        self.filtering.is_some()
    }

    fn tick(&mut self, now: Instant) {
        for id in self.confirmed.drain() {
            self.delete(id);
        }
        if let Some(query) = self.filters.poll(now) {
            self.aliases.track(query);
        }
        let len = self.len();
        self.table.sync(len);
    }

    fn deadline(&self) -> Option<Instant> {
        self.filters.deadline()
    }

    fn is_busy(&self) -> bool {
        self.aliases.is_loading() || self.delete.is_loading()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_message_quotes_alias() {
        let alias = Alias {
            id: 3,
            trim_master_id: 9,
            alias: "xse v6".into(),
            make: Some("Toyota".into()),
            model: Some("Camry".into()),
            trim_name: Some("XSE".into()),
            created_at: None,
        };
        assert_eq!(
            delete_message(&alias),
            "Are you sure you want to delete the alias \"xse v6\"? This action cannot be undone."
        );
    }

    #[test]
    fn test_columns_match_table_layout() {
        let headers: Vec<&str> = columns().iter().map(|c| c.header()).collect();
        assert_eq!(headers, ["Alias", "Master Trim", "Created At"]);
    }
}
