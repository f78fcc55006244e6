//! Backend REST operations

mod aliases;
mod listings;
mod query;
mod stats;
mod trims;

pub use listings::DEFAULT_PROCESS_LIMIT;
pub use listings::DEFAULT_TOP_N;
pub use query::*;
