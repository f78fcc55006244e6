//! Row actions shared by the listing pages.

use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyEvent};
use trimtool_lib::model::Listing;

use crate::app::{Context, PageId};
use crate::modals::{AssignModal, CandidatesModal, DetailsModal};
use crate::request::{Operation, RequestController, RequestOptions, operation};
use crate::toast::Toaster;

/// Which actions a page offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionSet {
    pub candidates: bool,
    pub details: bool,
    /// Only listings flagged for review can be marked reviewed.
    pub review_flagged_only: bool,
}

/// One controller per listing, so a mutation on one row never cancels
/// another row's. Repeating the action on the same row supersedes it.
struct RowMutations {
    operation: Operation<String, ()>,
    rows: HashMap<String, RequestController<String, ()>>,
}

impl RowMutations {
    fn new(operation: Operation<String, ()>) -> Self {
        Self {
            operation,
            rows: HashMap::new(),
        }
    }

    /// The controller for `ad_id`; settled controllers of other rows are
    /// dropped on the way.
    fn controller(&mut self, ctx: &Context, ad_id: &str) -> &RequestController<String, ()> {
        self.rows
            .retain(|id, controller| id == ad_id || controller.is_loading());
        self.rows
            .entry(ad_id.to_string())
            .or_insert_with(|| ctx.controller(self.operation.clone(), RequestOptions::lazy()))
    }

    fn is_busy(&self) -> bool {
        self.rows.values().any(|c| c.is_loading())
    }
}

pub struct ListingActions {
    ctx: Context,
    origin: PageId,
    set: ActionSet,
    reprocess: RowMutations,
    reviewed: RowMutations,
}

impl ListingActions {
    pub fn new(ctx: &Context, origin: PageId, set: ActionSet) -> Self {
        let client = ctx.client().clone();
        let reprocess = operation(move |ad_id: String, cancel| {
            let client = client.clone();
            async move { Ok(client.reprocess_listing(&ad_id, &cancel).await?) }
        });

        let client = ctx.client().clone();
        let reviewed = operation(move |ad_id: String, cancel| {
            let client = client.clone();
            async move { Ok(client.mark_reviewed(&ad_id, &cancel).await?) }
        });

        Self {
            ctx: ctx.clone(),
            origin,
            set,
            reprocess: RowMutations::new(reprocess),
            reviewed: RowMutations::new(reviewed),
        }
    }

    pub fn assign(&self, listing: &Listing) {
        self.ctx
            .open_modal(AssignModal::new(&self.ctx, listing.clone(), self.origin, None));
    }

    pub fn candidates(&self, listing: &Listing) {
        self.ctx
            .open_modal(CandidatesModal::new(&self.ctx, listing.clone(), self.origin));
    }

    pub fn details(&self, listing: &Listing) {
        self.ctx.open_modal(DetailsModal::new(&self.ctx, listing.clone()));
    }

    pub fn reprocess(&mut self, listing: &Listing) {
        log::info!("reprocessing {}", listing.ad_id);
        let ctx = self.ctx.clone();
        let origin = self.origin;
        let controller = self.reprocess.controller(&self.ctx, &listing.ad_id);
        self.ctx.submit(
            controller,
            listing.ad_id.clone(),
            "Failed to reprocess listing.",
            move |()| {
                Toaster::global().success("Successfully reprocessed listing.");
                ctx.refresh(origin);
            },
        );
    }

    pub fn mark_reviewed(&mut self, listing: &Listing) {
        if self.set.review_flagged_only && !listing.needs_review {
            Toaster::global().info("Listing is not flagged for review.");
            return;
        }
        let ctx = self.ctx.clone();
        let origin = self.origin;
        let controller = self.reviewed.controller(&self.ctx, &listing.ad_id);
        self.ctx.submit(
            controller,
            listing.ad_id.clone(),
            "Failed to mark as reviewed.",
            move |()| {
                Toaster::global().info("Marked as reviewed.");
                ctx.refresh(origin);
            },
        );
    }

    /// Run the action bound to `key` on `listing`.
    pub fn handle_key(&mut self, key: &KeyEvent, listing: Option<&Listing>) -> bool {
        let Some(listing) = listing else {
            return false;
        };
        match key.code {
            KeyCode::Char('a') => self.assign(listing),
            KeyCode::Char('c') if self.set.candidates => self.candidates(listing),
            KeyCode::Char('d') if self.set.details => self.details(listing),
            KeyCode::Char('p') => self.reprocess(listing),
            KeyCode::Char('v') => self.mark_reviewed(listing),
            _ => return false,
        }
        true
    }

    pub fn hints(&self) -> Vec<(&'static str, &'static str)> {
        let mut hints = vec![("a", "assign")];
        if self.set.candidates {
            hints.push(("c", "candidates"));
        }
        if self.set.details {
            hints.push(("d", "details"));
        }
        hints.extend([("p", "reprocess"), ("v", "reviewed")]);
        hints
    }

    pub fn is_busy(&self) -> bool {
        self.reprocess.is_busy() || self.reviewed.is_busy()
    }
}
