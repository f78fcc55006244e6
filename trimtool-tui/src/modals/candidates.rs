//! Ranked fuzzy-match candidates for a listing's raw trim.

use crossterm::event::{KeyCode, KeyEvent};
use trimtool_lib::model::{Candidate, Listing};

use super::AssignModal;
use crate::app::{Context, Frame, Modal, ModalAction, PageId};
use crate::request::{RequestController, RequestOptions, operation};
use crate::ui::{Buffer, Rect, theme, widgets};

pub struct CandidatesModal {
    ctx: Context,
    listing: Listing,
    origin: PageId,
    candidates: RequestController<String, Vec<Candidate>>,
    cursor: usize,
}

impl CandidatesModal {
    pub fn new(ctx: &Context, listing: Listing, origin: PageId) -> Self {
        let client = ctx.client().clone();
        let mut candidates = ctx.controller(
            operation(move |ad_id: String, cancel| {
                let client = client.clone();
                async move {
                    let list = client.listing_candidates(&ad_id, None, &cancel).await?;
                    Ok(list.candidates)
                }
            }),
            RequestOptions::default(),
        );
        candidates.attach(listing.ad_id.clone());
        Self {
            ctx: ctx.clone(),
            listing,
            origin,
            candidates,
            cursor: 0,
        }
    }

    fn len(&self) -> usize {
        self.candidates.read(|s| s.data.as_ref().map_or(0, Vec::len))
    }

    /// Hands the selected candidate over to the assign dialog.
    fn assign_selected(&self) -> ModalAction {
        let Some(candidate) = self
            .candidates
            .read(|s| s.data.as_ref().and_then(|c| c.get(self.cursor).cloned()))
        else {
            return ModalAction::Handled;
        };
        log::debug!("assigning candidate {:?} to {}", candidate.trim, self.listing.ad_id);
        self.ctx.open_modal(AssignModal::new(
            &self.ctx,
            self.listing.clone(),
            self.origin,
            Some(candidate.trim),
        ));
        ModalAction::Close
    }
}

impl Modal for CandidatesModal {
    fn title(&self) -> String {
        format!("Candidates for \"{}\"", self.listing.raw_trim())
    }

    fn draw(&self, buf: &mut Buffer, area: Rect, frame: &Frame) {
        let (_, drawer) = area.split_left(area.width.saturating_sub(48));
        let inner = widgets::panel(buf, drawer, &self.title(), true);
        let (body, footer) = inner.split_bottom(1);

        self.candidates.read(|state| {
            if state.loading {
                widgets::line(buf, body, &widgets::spinner(frame.phase), theme::muted());
            } else if let Some(error) = &state.error {
                widgets::line(buf, body, &format!("Error: {}", error), theme::error());
            } else if let Some(candidates) = &state.data {
                if candidates.is_empty() {
                    widgets::line(buf, body, "No candidates found.", theme::muted());
                    return;
                }
                let items: Vec<String> = candidates
                    .iter()
                    .map(|c| format!("{}  Score: {}", c.trim, c.score_percent()))
                    .collect();
                widgets::list(buf, body, &items, Some(self.cursor));
            }
        });

        widgets::hints(buf, footer, &[("Enter", "Assign"), ("r", "reload"), ("Esc", "close")]);
    }

    fn handle_key(&mut self, key: &KeyEvent) -> ModalAction {
        match key.code {
            KeyCode::Esc => ModalAction::Close,
            KeyCode::Up => {
                self.cursor = widgets::step(self.cursor, -1, self.len());
                ModalAction::Handled
            }
            KeyCode::Down => {
                self.cursor = widgets::step(self.cursor, 1, self.len());
                ModalAction::Handled
            }
            KeyCode::Char('r') => {
                self.cursor = 0;
                self.candidates.refresh();
                ModalAction::Handled
            }
            KeyCode::Enter => self.assign_selected(),
            _ => ModalAction::Handled,
        }
    }

    fn is_busy(&self) -> bool {
        self.candidates.is_loading()
    }
}
