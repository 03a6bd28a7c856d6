use super::constants::{PLAYER_START_X, PLAYER_WIDTH};
use crate::character::attributes::Attributes;
use crate::character::derived_stats::{derive_stats, BattleStats};
use crate::data::MasterData;
use crate::dungeon::DungeonProgression;
use serde::{Deserialize, Serialize};

/// Everything persisted about the player, saved as one JSON document.
///
/// `battle` and `max_hp` are stored for display but always re-derived on
/// load; the save is never trusted for them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerState {
    pub attributes: Attributes,
    #[serde(default)]
    pub battle: BattleStats,
    pub level: u32,
    pub exp: u64,
    pub next_exp: u64,
    /// Unspent points for [`crate::core::game_logic::allocate_stat`].
    pub stat_points: u32,
    pub hp: i64,
    pub max_hp: i64,
    /// Horizontal position of the player's back edge.
    pub x: f64,
    /// Ticks since the last player attack.
    pub attack_timer: u32,
    /// Unix seconds of the last save, used for offline catch-up.
    pub last_saved_at: i64,
    #[serde(default)]
    pub progression: DungeonProgression,
}

impl PlayerState {
    /// A level 1 character in the first dungeon with full HP.
    pub fn new(master: &MasterData, current_time: i64) -> Self {
        let mut state = Self {
            attributes: Attributes::new(),
            battle: BattleStats::default(),
            level: 1,
            exp: 0,
            next_exp: master.initial_next_exp(),
            stat_points: 0,
            hp: 0,
            max_hp: 0,
            x: PLAYER_START_X,
            attack_timer: 0,
            last_saved_at: current_time,
            progression: DungeonProgression::new(master.first_dungeon_id()),
        };
        state.refresh_stats();
        state
    }

    /// Re-derives battle stats and max HP, then clamps HP into
    /// `[0, max_hp]`. HP at or below zero is restored to full.
    pub fn refresh_stats(&mut self) {
        let derived = derive_stats(&self.attributes, self.level);
        self.battle = derived.battle;
        self.max_hp = derived.max_hp;
        if self.hp <= 0 {
            self.hp = self.max_hp;
        } else {
            self.hp = self.hp.min(self.max_hp);
        }
    }

    pub fn restore_hp(&mut self) {
        self.hp = self.max_hp;
    }

    pub fn take_damage(&mut self, amount: i64) {
        self.hp -= amount;
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0
    }

    /// X coordinate enemies measure their attack range against.
    pub fn front_edge(&self) -> f64 {
        self.x + PLAYER_WIDTH
    }
}
