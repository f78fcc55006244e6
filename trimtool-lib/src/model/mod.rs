//! Backend data shapes.

mod alias;
mod candidate;
mod de;
mod listing;
mod stats;
mod trim;

pub use alias::*;
pub use candidate::*;
pub use listing::*;
pub use stats::*;
pub use trim::*;
