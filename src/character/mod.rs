//! Character attributes and the battle stats derived from them.

pub mod attributes;
pub mod derived_stats;

pub use attributes::*;
pub use derived_stats::*;
