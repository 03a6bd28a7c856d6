//! Dungeon wave progression and unlock gating.

use crate::core::constants::BOSS_WAVE_REQ_KILLS;
use crate::data::{DungeonDefinition, MasterData};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Persistent per-dungeon progress.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DungeonRecord {
    #[serde(default)]
    pub clear_count: u32,
}

/// What a single kill did to the progression state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillOutcome {
    /// Kill counted toward the current wave.
    Counted,
    /// The wave requirement was met; `wave` is the new current wave.
    WaveAdvanced { wave: u32 },
    /// The dungeon was cleared and counters reset to wave 1.
    Cleared { clear_count: u32 },
}

/// Kills needed to finish `wave` of `dungeon`. The boss wave needs exactly one.
pub fn required_kills(dungeon: &DungeonDefinition, wave: u32, default_req: u32) -> u32 {
    if is_boss_wave(dungeon, wave) {
        return BOSS_WAVE_REQ_KILLS;
    }
    dungeon
        .req_kills
        .filter(|&k| k > 0)
        .unwrap_or(default_req)
        .max(1)
}

/// The final wave of a boss dungeon.
pub fn is_boss_wave(dungeon: &DungeonDefinition, wave: u32) -> bool {
    dungeon.is_boss && wave == dungeon.total_waves()
}

/// Tracks the current dungeon, wave, kill counter and clear history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DungeonProgression {
    pub current_dungeon_id: u32,
    /// 1-based.
    pub current_wave: u32,
    pub kills_in_wave: u32,
    pub records: BTreeMap<u32, DungeonRecord>,
}

impl Default for DungeonProgression {
    fn default() -> Self {
        Self::new(1)
    }
}

impl DungeonProgression {
    pub fn new(dungeon_id: u32) -> Self {
        Self {
            current_dungeon_id: dungeon_id,
            current_wave: 1,
            kills_in_wave: 0,
            records: BTreeMap::new(),
        }
    }

    pub fn clears(&self, dungeon_id: u32) -> u32 {
        self.records
            .get(&dungeon_id)
            .map(|r| r.clear_count)
            .unwrap_or(0)
    }

    /// The first dungeon is always visible. Any later dungeon is visible once
    /// the dungeon before it has been cleared `req_clear` times (default 1).
    pub fn is_unlocked(&self, master: &MasterData, dungeon_id: u32) -> bool {
        match master.dungeon_index(dungeon_id) {
            Some(0) => true,
            Some(index) => {
                let previous = &master.dungeons[index - 1];
                self.clears(previous.id) >= master.dungeons[index].required_clears()
            }
            None => false,
        }
    }

    /// Visible and the character meets the level requirement.
    pub fn can_enter(&self, master: &MasterData, dungeon_id: u32, level: u32) -> bool {
        self.is_unlocked(master, dungeon_id)
            && master
                .dungeon(dungeon_id)
                .is_some_and(|d| level >= d.req_lv)
    }

    pub fn unlocked_dungeons(&self, master: &MasterData) -> Vec<u32> {
        master
            .dungeons
            .iter()
            .map(|d| d.id)
            .filter(|&id| self.is_unlocked(master, id))
            .collect()
    }

    /// Applies one kill in `dungeon`, which must be the current dungeon.
    pub fn record_kill(
        &mut self,
        dungeon: &DungeonDefinition,
        was_boss: bool,
        default_req: u32,
    ) -> KillOutcome {
        if was_boss {
            return self.clear_current(dungeon.id);
        }
        // Only the boss can finish a boss wave.
        if is_boss_wave(dungeon, self.current_wave) {
            return KillOutcome::Counted;
        }

        self.kills_in_wave += 1;
        if self.kills_in_wave < required_kills(dungeon, self.current_wave, default_req) {
            return KillOutcome::Counted;
        }

        self.current_wave += 1;
        self.kills_in_wave = 0;
        if self.current_wave > dungeon.total_waves() && !dungeon.is_boss {
            return self.clear_current(dungeon.id);
        }
        KillOutcome::WaveAdvanced {
            wave: self.current_wave,
        }
    }

    /// Counts a clear of `dungeon_id` and restarts it from wave 1.
    pub fn clear_current(&mut self, dungeon_id: u32) -> KillOutcome {
        let record = self.records.entry(dungeon_id).or_default();
        record.clear_count = record.clear_count.saturating_add(1);
        let clear_count = record.clear_count;
        self.current_wave = 1;
        self.kills_in_wave = 0;
        KillOutcome::Cleared { clear_count }
    }

    pub fn switch_to(&mut self, dungeon_id: u32) {
        self.current_dungeon_id = dungeon_id;
        self.current_wave = 1;
        self.kills_in_wave = 0;
    }

    /// The dungeon that became visible as a direct result of the latest
    /// clear of `cleared_id`, if any.
    pub fn newly_unlocked(&self, master: &MasterData, cleared_id: u32) -> Option<u32> {
        let index = master.dungeon_index(cleared_id)?;
        let next = master.dungeons.get(index + 1)?;
        (self.clears(cleared_id) == next.required_clears()).then_some(next.id)
    }

    /// Repairs state loaded from an older or foreign save. Returns true when
    /// anything changed.
    pub fn reconcile(&mut self, master: &MasterData) -> bool {
        let before = self.clone();

        let dungeon = match master.dungeon(self.current_dungeon_id) {
            Some(d) => d,
            None => {
                self.switch_to(master.first_dungeon_id());
                return true;
            }
        };

        self.current_wave = self.current_wave.clamp(1, dungeon.total_waves());
        let required = required_kills(dungeon, self.current_wave, master.config.default_req_kills);
        if self.kills_in_wave >= required {
            self.kills_in_wave = 0;
        }

        *self != before
    }
}
