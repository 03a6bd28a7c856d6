use super::lenient::value_as_f64;
use crate::core::constants::*;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Typed view of the master data `config` map.
///
/// Every coefficient has a default so a partial or missing map still yields
/// a playable configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "HashMap<String, Value>")]
pub struct GameConfig {
    /// Player attack interval before AGI reduction, in ticks.
    pub base_attack_interval: f64,
    /// Ticks removed from the attack interval per AGI point.
    pub agi_reduction: f64,
    /// Lower bound of the player attack interval, in ticks.
    pub attack_interval_floor: f64,
    /// Ticks between spawn attempts.
    pub spawn_rate: u32,
    /// Kills per wave when a dungeon does not configure its own.
    pub default_req_kills: u32,
    pub player_range: f64,
    pub enemy_range: f64,
    pub enemy_attack_interval: u32,
    /// X coordinate where enemies enter the playfield.
    pub field_width: f64,
    pub autosave_ticks: u32,
    /// Frozen ticks between scheduling and committing a dungeon switch.
    pub transition_ticks: u32,
    pub boss_hp_multiplier: f64,
    pub boss_exp_multiplier: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            base_attack_interval: DEFAULT_BASE_ATTACK_INTERVAL,
            agi_reduction: DEFAULT_AGI_REDUCTION,
            attack_interval_floor: DEFAULT_ATTACK_INTERVAL_FLOOR,
            spawn_rate: DEFAULT_SPAWN_RATE,
            default_req_kills: DEFAULT_REQ_KILLS,
            player_range: DEFAULT_PLAYER_RANGE,
            enemy_range: DEFAULT_ENEMY_RANGE,
            enemy_attack_interval: DEFAULT_ENEMY_ATTACK_INTERVAL,
            field_width: DEFAULT_FIELD_WIDTH,
            autosave_ticks: DEFAULT_AUTOSAVE_TICKS,
            transition_ticks: DEFAULT_TRANSITION_TICKS,
            boss_hp_multiplier: DEFAULT_BOSS_HP_MULTIPLIER,
            boss_exp_multiplier: DEFAULT_BOSS_EXP_MULTIPLIER,
        }
    }
}

impl From<HashMap<String, Value>> for GameConfig {
    fn from(map: HashMap<String, Value>) -> Self {
        let defaults = GameConfig::default();
        let num = |key: &str, default: f64| map.get(key).and_then(value_as_f64).unwrap_or(default);
        let ticks = |key: &str, default: u32| {
            map.get(key)
                .and_then(value_as_f64)
                .filter(|f| *f >= 0.0)
                .map(|f| f as u32)
                .unwrap_or(default)
        };

        Self {
            base_attack_interval: num("base_atk_interval", defaults.base_attack_interval),
            agi_reduction: num("agi_reduction", defaults.agi_reduction),
            attack_interval_floor: num("atk_interval_floor", defaults.attack_interval_floor),
            spawn_rate: ticks("spawn_rate", defaults.spawn_rate),
            default_req_kills: ticks("default_req_kills", defaults.default_req_kills).max(1),
            player_range: num("player_range", defaults.player_range),
            enemy_range: num("enemy_range", defaults.enemy_range),
            enemy_attack_interval: ticks("enemy_atk_interval", defaults.enemy_attack_interval),
            field_width: num("field_width", defaults.field_width),
            autosave_ticks: ticks("autosave_ticks", defaults.autosave_ticks),
            transition_ticks: ticks("transition_ticks", defaults.transition_ticks),
            boss_hp_multiplier: num("boss_hp_mult", defaults.boss_hp_multiplier),
            boss_exp_multiplier: num("boss_exp_mult", defaults.boss_exp_multiplier),
        }
    }
}

impl GameConfig {
    /// Effective player attack interval in ticks:
    /// `max(floor, base - agi * agi_reduction)`.
    pub fn attack_interval(&self, agi: u32) -> f64 {
        (self.base_attack_interval - agi as f64 * self.agi_reduction)
            .max(self.attack_interval_floor)
    }
}
