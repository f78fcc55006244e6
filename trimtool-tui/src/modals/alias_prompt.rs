//! Offer to record a listing's raw trim as an alias of the trim it was
//! just assigned.

use crossterm::event::{KeyCode, KeyEvent};
use trimtool_lib::model::{Alias, Listing, NewAlias, Trim};

use crate::app::{Context, Frame, Modal, ModalAction, PageId};
use crate::request::{RequestController, RequestOptions, operation};
use crate::toast::Toaster;
use crate::ui::{Buffer, InputEvent, Rect, TextInput, theme, widgets};

pub struct AliasPromptModal {
    ctx: Context,
    listing: Listing,
    trim: Trim,
    alias: TextInput,
    create: RequestController<NewAlias, Alias>,
}

impl AliasPromptModal {
    pub fn new(ctx: &Context, listing: Listing, trim: Trim) -> Self {
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
            alias: TextInput::new(listing.raw_trim().to_lowercase()),
            listing,
            trim,
            create,
        }
    }

    fn confirm(&self) {
        let alias = self.alias.value().trim();
        if alias.is_empty() || self.create.is_loading() {
            return;
        }
        let ctx = self.ctx.clone();
        let request = NewAlias::new(self.trim.id, alias);
        self.ctx.submit(&self.create, request, "Failed to create alias.", move |_| {
            Toaster::global().success("Alias created successfully!");
            ctx.close_modal();
            ctx.refresh(PageId::Aliases);
        });
    }
}

impl Modal for AliasPromptModal {
    fn title(&self) -> String {
        "Add Alias for Raw Trim?".to_string()
    }

    fn draw(&self, buf: &mut Buffer, area: Rect, frame: &Frame) {
        let inner = widgets::modal(buf, area, 64, 14, &self.title());
        let (body, footer) = inner.split_bottom(1);

        let mut y = widgets::paragraph(
            buf,
            body,
            "Would you like to create an alias to improve future automatic matching?",
            theme::text(),
        ) + 1;
        self.alias.draw(buf, body.row(y), "Raw Trim (as Alias)", true);
        y += 1;
        let original = format!("Original: \"{}\"", self.listing.raw_trim());
        widgets::line(buf, body.row(y), &original, theme::muted());
        y += 2;
        widgets::line(buf, body.row(y), "Master Trim", theme::muted());
        let master = format!("{} {}", self.trim.make, self.trim.model);
        widgets::line(buf, body.row(y + 1), &master, theme::text().bold());
        widgets::line(buf, body.row(y + 2), &self.trim.trim_name, theme::text());

        if self.create.is_loading() {
            let text = format!("{} Creating...", widgets::spinner(frame.phase));
            widgets::line(buf, footer, &text, theme::muted());
        } else {
            widgets::hints(buf, footer, &[("Esc", "No, thanks"), ("Enter", "Yes, create alias")]);
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) -> ModalAction {
        if key.code == KeyCode::Esc {
            return ModalAction::Close;
        }
        if self.alias.handle_key(key) == InputEvent::Submitted {
            self.confirm();
        }
        ModalAction::Handled
    }

    fn is_busy(&self) -> bool {
        self.create.is_loading()
    }
}
