//! The five top-level screens, in navigation order.

mod actions;
mod aliases;
mod dashboard;
mod processed;
mod trims;
mod unprocessed;

pub use aliases::AliasesPage;
pub use dashboard::{DEFAULT_PROCESS_LIMIT, DashboardPage};
pub use processed::ProcessedPage;
pub use trims::TrimsPage;
pub use unprocessed::UnprocessedPage;

use crate::app::{Context, Page, PageId};

/// One page per [`PageId::ALL`] entry, in the same order.
pub fn build(ctx: &Context) -> Vec<Box<dyn Page>> {
    PageId::ALL
        .iter()
        .map(|id| -> Box<dyn Page> {
            match id {
                PageId::Dashboard => Box::new(DashboardPage::new(ctx)),
                PageId::Unprocessed => Box::new(UnprocessedPage::new(ctx)),
                PageId::Processed => Box::new(ProcessedPage::new(ctx)),
                PageId::Trims => Box::new(TrimsPage::new(ctx)),
                PageId::Aliases => Box::new(AliasesPage::new(ctx)),
            }
        })
        .collect()
}
