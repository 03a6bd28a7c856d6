// Tick and timing
pub const TICKS_PER_SECOND: u32 = 60;
pub const DEFAULT_AUTOSAVE_TICKS: u32 = 600;
pub const DEFAULT_TRANSITION_TICKS: u32 = 30;

// Player attack timing (in ticks)
pub const DEFAULT_BASE_ATTACK_INTERVAL: f64 = 60.0;
pub const DEFAULT_AGI_REDUCTION: f64 = 0.2;
pub const DEFAULT_ATTACK_INTERVAL_FLOOR: f64 = 20.0;

// Playfield geometry (one-dimensional, in canvas pixels)
pub const PLAYER_START_X: f64 = 50.0;
pub const PLAYER_WIDTH: f64 = 30.0;
pub const DEFAULT_PLAYER_RANGE: f64 = 150.0;
pub const DEFAULT_FIELD_WIDTH: f64 = 800.0;
pub const PLAYER_TARGET_BACK_REACH: f64 = 20.0;
pub const ENEMY_ATTACK_BACK_REACH: f64 = 50.0;
pub const ENEMY_DESPAWN_X: f64 = -50.0;
pub const PLAYER_RECOIL_OFFSET: f64 = 10.0;

// Enemies
pub const DEFAULT_SPAWN_RATE: u32 = 100;
pub const DEFAULT_ENEMY_RANGE: f64 = 40.0;
pub const DEFAULT_ENEMY_ATTACK_INTERVAL: u32 = 80;
pub const DEFAULT_BOSS_HP_MULTIPLIER: f64 = 2.0;
pub const DEFAULT_BOSS_EXP_MULTIPLIER: f64 = 5.0;
pub const DEFAULT_ENEMY_WIDTH: f64 = 30.0;
pub const DEFAULT_ENEMY_COLOR: &str = "red";

// Dungeon progression
pub const DEFAULT_REQ_KILLS: u32 = 10;
pub const DEFAULT_REQ_CLEARS: u32 = 1;
pub const BOSS_WAVE_REQ_KILLS: u32 = 1;

// Character attributes
pub const NUM_ATTRIBUTES: usize = 6;
pub const NEW_GAME_ATTRIBUTE_VALUE: u32 = 5;

// Derived stat formulas
pub const BASE_HP: i64 = 100;
pub const HP_PER_LEVEL: i64 = 10;
pub const HP_PER_VIT: i64 = 5;
pub const DEF_SUB_PER_VIT: i64 = 3;
pub const MDEF_SUB_PER_INT: i64 = 2;

// XP and leveling
pub const DEFAULT_NEXT_EXP: u64 = 50;
pub const DEFAULT_REWARD_SP: u32 = 3;
pub const EXP_GROWTH_FALLBACK: f64 = 1.2;

// Offline progression
pub const OFFLINE_MIN_SECONDS: i64 = 10;
pub const MAX_OFFLINE_SECONDS: i64 = 7 * 24 * 60 * 60;
pub const OFFLINE_SEARCH_MULTIPLIER: f64 = 1.2;
pub const OFFLINE_ENEMY_BASE_HP: u64 = 20;
pub const OFFLINE_ENEMY_HP_PER_LEVEL: u64 = 5;
pub const OFFLINE_ENEMY_BASE_EXP: u64 = 10;
pub const OFFLINE_ENEMY_EXP_PER_LEVEL: u64 = 2;

// Persistence
pub const SAVE_KEY: &str = "cc_save_data";
