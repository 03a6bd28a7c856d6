//! Real-time combat: enemy spawning, movement, and attacks on both sides.

pub mod logic;
pub mod types;

pub use logic::*;
pub use types::*;
