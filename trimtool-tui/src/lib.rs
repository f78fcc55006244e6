//! Terminal console for the trim normalization backend.
//!
//! Pages for pipeline stats, unprocessed and processed listings, canonical
//! trims and aliases, drawn with crossterm and driven by a single event
//! loop. Backend calls go through [`request::RequestController`], which
//! keeps only the latest request per call site alive.

pub mod app;
pub mod config;
pub mod debounce;
pub mod error;
pub mod format;
pub mod modals;
pub mod pages;
pub mod paths;
pub mod request;
pub mod settings;
pub mod table;
pub mod toast;
pub mod ui;
pub mod wakeup;

mod rows;

pub use error::AppError;
