//! Idle Dungeon - simulation core of an idle auto-battler.
//!
//! A character auto-fights waves of enemies across gated dungeons, levels
//! up, spends stat points and keeps progressing (approximately) while the
//! game is not running. Rendering and account handling live outside this
//! crate; the [`core::Session`] reports everything through typed events.

pub mod auth;
pub mod character;
pub mod combat;
pub mod core;
pub mod data;
pub mod dungeon;
pub mod save_manager;
