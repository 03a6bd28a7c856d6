//! Events and errors produced by a single simulation step.
//!
//! The session never touches presentation state. Everything a renderer or
//! log view needs is reported as a [`TickEvent`] in the [`TickResult`].

use super::offline::OfflineReport;
use crate::character::derived_stats::BattleStats;
use crate::combat::types::Lane;
use thiserror::Error;

/// Which combatant received damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Player,
    Enemy,
}

/// A single event produced by a step or a player action.
#[derive(Debug, Clone, PartialEq)]
pub enum TickEvent {
    // ── Combat ──────────────────────────────────────────────────
    /// An enemy entered the field.
    EnemySpawned {
        enemy_id: u64,
        template_id: u32,
        lane: Lane,
        is_boss: bool,
    },

    /// Damage was applied. `target` took `amount`.
    DamageDealt {
        target: Side,
        enemy_id: u64,
        amount: i64,
    },

    /// Cosmetic knock-back after a player attack.
    PlayerRecoil { offset: f64 },

    /// An enemy died and its experience was granted.
    EnemyDefeated {
        enemy_id: u64,
        template_id: u32,
        exp: u64,
        was_boss: bool,
    },

    /// An enemy walked off the left edge without effect.
    EnemyEscaped { enemy_id: u64 },

    /// HP reached zero. HP was restored and the field wiped.
    PlayerDied,

    // ── Character ───────────────────────────────────────────────
    LeveledUp {
        level: u32,
        stat_points_gained: u32,
    },

    /// Derived stats were recomputed.
    StatsChanged { max_hp: i64, battle: BattleStats },

    // ── Progression ─────────────────────────────────────────────
    WaveAdvanced { dungeon_id: u32, wave: u32 },

    DungeonCleared { dungeon_id: u32, clear_count: u32 },

    /// A dungeon became visible for the first time.
    DungeonUnlocked { dungeon_id: u32 },

    /// A switch was accepted and will commit after `ticks` frozen steps.
    TransitionScheduled { dungeon_id: u32, ticks: u32 },

    DungeonSwitched { dungeon_id: u32 },

    // ── Session ─────────────────────────────────────────────────
    GameSaved,

    OfflineProgress(OfflineReport),
}

/// Result of processing a single step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickResult {
    /// Events in chronological order. Queued action events come first.
    pub events: Vec<TickEvent>,
}

impl TickResult {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn any(&self, predicate: impl Fn(&TickEvent) -> bool) -> bool {
        self.events.iter().any(predicate)
    }
}

/// A step that could not complete. Logged at the step boundary; the next
/// step runs normally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    #[error("current dungeon {0} is missing from master data")]
    UnknownDungeon(u32),
    #[error("dungeon {dungeon_id} has no enemy templates to spawn")]
    NoEnemyTemplates { dungeon_id: u32 },
}
