//! Dialogs and drawers pushed onto the modal stack.

mod alias_create;
mod alias_prompt;
mod assign;
mod candidates;
mod confirm;
mod details;
mod trim_drawer;

pub use alias_create::AliasCreateModal;
pub use alias_prompt::AliasPromptModal;
pub use assign::{AssignModal, master_search};
pub use candidates::CandidatesModal;
pub use confirm::ConfirmModal;
pub use details::DetailsModal;
pub use trim_drawer::TrimDrawer;
