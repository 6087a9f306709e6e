//! Core data models for the dashboard.

mod chart;
mod game;
mod metric;
mod record;
mod table;

pub use chart::*;
pub use game::*;
pub use metric::*;
pub use record::*;
pub use table::*;
