//! Core game state and logic.

pub mod constants;
pub mod game_logic;
pub mod game_state;
pub mod offline;
pub mod session;
pub mod tick;

pub use game_logic::{allocate_stat, gain_exp, ActionError, LevelUpReport};
pub use game_state::PlayerState;
pub use offline::{apply_offline_progress, estimate_offline, OfflineEstimate, OfflineReport};
pub use session::{Session, TransitionIntent};
pub use tick::{Side, StepError, TickEvent, TickResult};
