//! Dungeon progression: waves, clears and unlock gating.

pub mod progression;

pub use progression::*;
