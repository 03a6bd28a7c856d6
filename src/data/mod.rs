//! Master data: enemy templates, dungeon definitions, the experience table
//! and tunable coefficients.

pub mod config;
pub mod lenient;
pub mod master;

pub use config::GameConfig;
pub use master::*;
