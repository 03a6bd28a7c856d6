use super::config::GameConfig;
use super::lenient;
use crate::core::constants::*;
use log::{info, warn};
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Failure to obtain master data. Callers normally fall back to
/// [`MasterData::builtin`] instead of surfacing this.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("could not read master data: {0}")]
    Io(#[from] io::Error),
    #[error("could not parse master data: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EnemyTemplate {
    #[serde(deserialize_with = "lenient::u32_field")]
    pub id: u32,
    #[serde(default = "default_enemy_name")]
    pub name: String,
    #[serde(default = "default_enemy_hp", deserialize_with = "lenient::u32_field")]
    pub hp: u32,
    #[serde(alias = "attack", default, deserialize_with = "lenient::u32_field")]
    pub atk: u32,
    #[serde(alias = "experience", default, deserialize_with = "lenient::u32_field")]
    pub exp: u32,
    #[serde(default = "default_enemy_speed", deserialize_with = "lenient::f64_field")]
    pub speed: f64,
    #[serde(default = "default_enemy_color")]
    pub color: String,
    #[serde(default = "default_enemy_width", deserialize_with = "lenient::f64_field")]
    pub width: f64,
    #[serde(default)]
    pub image: Option<String>,
}

fn default_enemy_name() -> String {
    "Slime".to_string()
}

fn default_enemy_hp() -> u32 {
    20
}

fn default_enemy_speed() -> f64 {
    1.0
}

fn default_enemy_color() -> String {
    DEFAULT_ENEMY_COLOR.to_string()
}

fn default_enemy_width() -> f64 {
    DEFAULT_ENEMY_WIDTH
}

fn default_one() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DungeonDefinition {
    #[serde(deserialize_with = "lenient::u32_field")]
    pub id: u32,
    #[serde(default)]
    pub name: String,
    /// Minimum character level to enter.
    #[serde(default = "default_one", deserialize_with = "lenient::u32_field")]
    pub req_lv: u32,
    /// Clears of the preceding dungeon needed before this one is visible.
    #[serde(default, deserialize_with = "lenient::opt_u32_field")]
    pub req_clear: Option<u32>,
    #[serde(alias = "waves", default = "default_one", deserialize_with = "lenient::u32_field")]
    pub wave_count: u32,
    #[serde(default, deserialize_with = "lenient::bool_field")]
    pub is_boss: bool,
    #[serde(default, deserialize_with = "lenient::opt_u32_field")]
    pub boss_id: Option<u32>,
    #[serde(default, deserialize_with = "lenient::id_list")]
    pub enemy_ids: Vec<u32>,
    #[serde(default, deserialize_with = "lenient::opt_u32_field")]
    pub req_kills: Option<u32>,
}

impl DungeonDefinition {
    pub fn total_waves(&self) -> u32 {
        self.wave_count.max(1)
    }

    pub fn required_clears(&self) -> u32 {
        self.req_clear.unwrap_or(DEFAULT_REQ_CLEARS)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExpRow {
    #[serde(deserialize_with = "lenient::u32_field")]
    pub lv: u32,
    #[serde(deserialize_with = "lenient::u64_field")]
    pub next_exp: u64,
    #[serde(default, deserialize_with = "lenient::u32_field")]
    pub reward_sp: u32,
}

/// Immutable game configuration loaded once per session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MasterData {
    #[serde(default)]
    pub config: GameConfig,
    #[serde(default)]
    pub enemies: Vec<EnemyTemplate>,
    #[serde(default)]
    pub dungeons: Vec<DungeonDefinition>,
    #[serde(default)]
    pub exp_table: Vec<ExpRow>,
}

impl Default for MasterData {
    fn default() -> Self {
        Self::builtin()
    }
}

impl MasterData {
    /// Degraded-mode data: one enemy, one dungeon, default coefficients.
    pub fn builtin() -> Self {
        Self {
            config: GameConfig::default(),
            enemies: vec![builtin_enemy()],
            dungeons: vec![builtin_dungeon()],
            exp_table: Vec::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, DataError> {
        let mut data: MasterData = serde_json::from_str(json)?;
        data.normalize();
        Ok(data)
    }

    pub fn load(path: &Path) -> Result<Self, DataError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Loads master data, falling back to [`MasterData::builtin`] on any error.
    pub fn load_or_builtin(path: &Path) -> Self {
        match Self::load(path) {
            Ok(data) => {
                info!(
                    "Loaded master data from {}: {} enemies, {} dungeons, {} exp rows",
                    path.display(),
                    data.enemies.len(),
                    data.dungeons.len(),
                    data.exp_table.len()
                );
                data
            }
            Err(e) => {
                warn!("{}; running with built-in master data", e);
                Self::builtin()
            }
        }
    }

    fn normalize(&mut self) {
        if self.enemies.is_empty() {
            warn!("Master data has no enemies; using the built-in enemy");
            self.enemies.push(builtin_enemy());
        }
        if self.dungeons.is_empty() {
            warn!("Master data has no dungeons; using the built-in dungeon");
            self.dungeons.push(builtin_dungeon());
        }
        self.exp_table.sort_by_key(|row| row.lv);
    }

    pub fn enemy(&self, id: u32) -> Option<&EnemyTemplate> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn dungeon(&self, id: u32) -> Option<&DungeonDefinition> {
        self.dungeons.iter().find(|d| d.id == id)
    }

    pub fn dungeon_index(&self, id: u32) -> Option<usize> {
        self.dungeons.iter().position(|d| d.id == id)
    }

    pub fn first_dungeon(&self) -> Option<&DungeonDefinition> {
        self.dungeons.first()
    }

    pub fn first_dungeon_id(&self) -> u32 {
        self.first_dungeon()
            .map(|d| d.id)
            .unwrap_or(BUILTIN_DUNGEON_ID)
    }

    /// Templates a dungeon may spawn. An empty or fully dangling id list
    /// allows every template.
    pub fn allowed_enemies(&self, dungeon: &DungeonDefinition) -> Vec<&EnemyTemplate> {
        let allowed: Vec<&EnemyTemplate> = dungeon
            .enemy_ids
            .iter()
            .filter_map(|&id| self.enemy(id))
            .collect();
        if allowed.is_empty() {
            self.enemies.iter().collect()
        } else {
            allowed
        }
    }

    pub fn exp_row(&self, level: u32) -> Option<&ExpRow> {
        self.exp_table.iter().find(|row| row.lv == level)
    }

    /// Experience needed to leave `level`. Without a table row the previous
    /// requirement grows by [`EXP_GROWTH_FALLBACK`].
    pub fn next_exp_for(&self, level: u32, previous: u64) -> u64 {
        match self.exp_row(level) {
            Some(row) => row.next_exp.max(1),
            None => ((previous as f64 * EXP_GROWTH_FALLBACK).floor() as u64).max(1),
        }
    }

    pub fn initial_next_exp(&self) -> u64 {
        self.exp_row(1)
            .map(|row| row.next_exp.max(1))
            .unwrap_or(DEFAULT_NEXT_EXP)
    }

    /// Stat points awarded when leaving `level`.
    pub fn reward_for(&self, level: u32) -> u32 {
        self.exp_row(level)
            .map(|row| row.reward_sp)
            .unwrap_or(DEFAULT_REWARD_SP)
    }
}

const BUILTIN_ENEMY_ID: u32 = 1;
const BUILTIN_DUNGEON_ID: u32 = 1;

fn builtin_enemy() -> EnemyTemplate {
    EnemyTemplate {
        id: BUILTIN_ENEMY_ID,
        name: "Slime".to_string(),
        hp: 20,
        atk: 5,
        exp: 10,
        speed: 1.0,
        color: DEFAULT_ENEMY_COLOR.to_string(),
        width: DEFAULT_ENEMY_WIDTH,
        image: None,
    }
}

fn builtin_dungeon() -> DungeonDefinition {
    DungeonDefinition {
        id: BUILTIN_DUNGEON_ID,
        name: "Grassland".to_string(),
        req_lv: 1,
        req_clear: None,
        wave_count: 3,
        is_boss: false,
        boss_id: None,
        enemy_ids: Vec::new(),
        req_kills: None,
    }
}
