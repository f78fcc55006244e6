//! Side drawer for one canonical trim: its aliases and a quick-add field.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent};
use trimtool_lib::model::{Alias, AliasQuery, NewAlias, Trim};

use crate::app::{Context, Frame, Mailbox, Modal, ModalAction, PageId};
use crate::request::{RequestController, RequestOptions, operation};
use crate::toast::Toaster;
use crate::ui::{Buffer, InputEvent, Rect, TextInput, theme, widgets};

const DRAWER_WIDTH: u16 = 52;

/// Aliases of `trim` among those returned for its make and model.
fn aliases_of<'a>(trim: &Trim, aliases: &'a [Alias]) -> Vec<&'a Alias> {
    aliases.iter().filter(|a| a.trim_master_id == trim.id).collect()
}

pub struct TrimDrawer {
    ctx: Context,
    trim: Trim,
    aliases: RequestController<AliasQuery, Vec<Alias>>,
    input: TextInput,
    create: RequestController<NewAlias, Alias>,
    added: Mailbox<()>,
}

impl TrimDrawer {
    pub fn new(ctx: &Context, trim: Trim) -> Self {
        let client = ctx.client().clone();
        let mut aliases = ctx.controller(
            operation(move |query: AliasQuery, cancel| {
                let client = client.clone();
                async move { Ok(client.aliases(&query, &cancel).await?) }
            }),
            RequestOptions::default(),
        );
        aliases.attach(AliasQuery {
            make: trim.make.clone(),
            model: trim.model.clone(),
        });

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
            trim,
            aliases,
            input: TextInput::default(),
            create,
            added: ctx.mailbox(),
        }
    }

    fn add_alias(&self) {
        let alias = self.input.value().trim();
        if alias.is_empty() || self.create.is_loading() {
            return;
        }
        let ctx = self.ctx.clone();
        let added = self.added.clone();
        let request = NewAlias::new(self.trim.id, alias);
        self.ctx.submit(&self.create, request, "Failed to add alias.", move |_| {
            Toaster::global().success("Alias added successfully!");
            ctx.refresh(PageId::Aliases);
            added.post(());
        });
    }
}

impl Modal for TrimDrawer {
    fn title(&self) -> String {
        self.trim.trim_name.clone()
    }

    fn draw(&self, buf: &mut Buffer, area: Rect, frame: &Frame) {
        let (_, drawer) = area.split_left(area.width.saturating_sub(DRAWER_WIDTH));
        let inner = widgets::panel(buf, drawer, &self.title(), true);
        let (body, footer) = inner.split_bottom(1);
        let (facts, body) = body.split_top(4);

        let rows = [
            ("Make", self.trim.make.clone()),
            ("Model", self.trim.model.clone()),
            ("Years", self.trim.year_range()),
        ];
        for (i, (label, value)) in rows.iter().enumerate() {
            let (l, v) = facts.row(i as u16).split_left(8);
            widgets::line(buf, l, label, theme::muted());
            widgets::line(buf, v, value, theme::text());
        }

        let (list_area, form) = body.split_bottom(3);
        let (heading, list_area) = list_area.split_top(1);
        widgets::line(buf, heading, "Associated Aliases", theme::title());
        self.aliases.read(|state| {
            if state.loading {
                widgets::line(buf, list_area, &widgets::spinner(frame.phase), theme::muted());
            } else if state.error.is_some() {
                widgets::line(buf, list_area, "Error loading aliases.", theme::error());
            } else if let Some(all) = &state.data {
                let mine = aliases_of(&self.trim, all);
                if mine.is_empty() {
                    widgets::line(buf, list_area, "No aliases found for this trim.", theme::muted());
                }
                let items: Vec<String> = mine.iter().map(|a| a.alias.clone()).collect();
                widgets::list(buf, list_area, &items, None);
            }
        });

        widgets::line(buf, form.row(0), "Add New Alias", theme::title());
        self.input.draw(buf, form.row(1), "Alias", true);

        if self.create.is_loading() {
            let text = format!("{} Adding...", widgets::spinner(frame.phase));
            widgets::line(buf, footer, &text, theme::muted());
        } else {
            widgets::hints(buf, footer, &[("Enter", "Add Alias"), ("Esc", "close")]);
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) -> ModalAction {
        if key.code == KeyCode::Esc {
            return ModalAction::Close;
        }
        if self.input.handle_key(key) == InputEvent::Submitted {
            self.add_alias();
        }
        ModalAction::Handled
    }

    fn tick(&mut self, _now: Instant) {
        if !self.added.drain().is_empty() {
            self.input.clear();
            self.aliases.refresh();
        }
    }

    fn is_busy(&self) -> bool {
        self.aliases.is_loading() || self.create.is_loading()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alias(id: i64, trim_master_id: i64, name: &str) -> Alias {
        Alias {
            id,
            trim_master_id,
            alias: name.into(),
            make: None,
            model: None,
            trim_name: None,
            created_at: None,
        }
    }

    #[test]
    fn test_aliases_filtered_to_trim() {
        let trim = Trim {
            id: 7,
            make: "Toyota".into(),
            model: "Camry".into(),
            trim_name: "XSE".into(),
            year_start: Some(2018),
            year_end: None,
        };
        let all = vec![alias(1, 7, "xse v6"), alias(2, 8, "se"), alias(3, 7, "xse")];
        let names: Vec<&str> = aliases_of(&trim, &all).iter().map(|a| a.alias.as_str()).collect();
        assert_eq!(names, ["xse v6", "xse"]);
    }
}
