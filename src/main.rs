//! Headless driver for the idle dungeon simulation.
//!
//! Loads master data and the save, credits offline time, runs a number of
//! simulation steps and prints a summary. Logging goes through `env_logger`;
//! set `RUST_LOG=debug` for per-spawn detail.
//!
//! Usage:
//!   idle-dungeon [OPTIONS]
//!
//! Options:
//!   --ticks N        Steps to simulate (default: 36000 = 10 minutes at 60/s)
//!   --data PATH      Master data JSON (default: built-in data)
//!   --seed N         RNG seed (default: random)
//!   --save-dir DIR   Directory for the save file (default: platform data dir)
//!   --allocate ATTR  Spend one stat point on ATTR before running (repeatable)
//!   --dungeon ID     Switch to dungeon ID before running
//!   --reset          Delete the save and start a new character

use idle_dungeon::character::attributes::AttributeType;
use idle_dungeon::core::{Session, TickEvent};
use idle_dungeon::data::MasterData;
use idle_dungeon::save_manager::{FileStore, MemoryStore, SaveManager};
use log::warn;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::env;
use std::path::PathBuf;
use std::process;

// ── CLI Configuration ────────────────────────────────────────────────

struct RunConfig {
    ticks: u64,
    data: Option<PathBuf>,
    seed: Option<u64>,
    save_dir: Option<PathBuf>,
    allocate: Vec<AttributeType>,
    dungeon: Option<u32>,
    reset: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            ticks: 36_000,
            data: None,
            seed: None,
            save_dir: None,
            allocate: Vec::new(),
            dungeon: None,
            reset: false,
        }
    }
}

fn parse_args(args: &[String]) -> Result<RunConfig, String> {
    let mut config = RunConfig::default();
    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        let mut value = || {
            i += 1;
            args.get(i)
                .cloned()
                .ok_or_else(|| format!("{flag} requires a value"))
        };
        match flag {
            "--ticks" => {
                config.ticks = value()?
                    .parse()
                    .map_err(|_| "--ticks requires a number".to_string())?;
            }
            "--data" => config.data = Some(PathBuf::from(value()?)),
            "--seed" => {
                config.seed = Some(
                    value()?
                        .parse()
                        .map_err(|_| "--seed requires a number".to_string())?,
                );
            }
            "--save-dir" => config.save_dir = Some(PathBuf::from(value()?)),
            "--allocate" => {
                let attr = value()?.parse::<AttributeType>().map_err(|e| e.to_string())?;
                config.allocate.push(attr);
            }
            "--dungeon" => {
                config.dungeon = Some(
                    value()?
                        .parse()
                        .map_err(|_| "--dungeon requires a dungeon id".to_string())?,
                );
            }
            "--reset" => config.reset = true,
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            other => return Err(format!("Unknown argument: {other}")),
        }
        i += 1;
    }
    Ok(config)
}

fn print_usage() {
    eprintln!(
        "Idle Dungeon headless simulator\n\
         \n\
         Usage: idle-dungeon [OPTIONS]\n\
         \n\
         Options:\n\
         \x20 --ticks N        Steps to simulate (default: 36000)\n\
         \x20 --data PATH      Master data JSON (default: built-in data)\n\
         \x20 --seed N         RNG seed (default: random)\n\
         \x20 --save-dir DIR   Directory for the save file\n\
         \x20 --allocate ATTR  Spend a stat point on STR/VIT/AGI/INT/DEX/LUK\n\
         \x20 --dungeon ID     Switch to dungeon ID before running\n\
         \x20 --reset          Start a new character\n\
         \x20 --help, -h       Show this help"
    );
}

fn save_manager(save_dir: Option<&PathBuf>) -> SaveManager {
    let store = match save_dir {
        Some(dir) => FileStore::in_dir(dir).map_err(|e| e.to_string()),
        None => FileStore::new().map_err(|e| e.to_string()),
    };
    match store {
        Ok(store) => SaveManager::new(store),
        Err(e) => {
            warn!("{}; progress will not be saved", e);
            SaveManager::new(MemoryStore::new())
        }
    }
}

// ── Run Statistics ───────────────────────────────────────────────────

#[derive(Debug, Default)]
struct RunStats {
    kills: u64,
    boss_kills: u64,
    exp_gained: u64,
    escapes: u64,
    deaths: u64,
    damage_taken: i64,
    waves_advanced: u64,
    clears: u64,
    level_ups: u64,
    saves: u64,
}

impl RunStats {
    fn record(&mut self, event: &TickEvent) {
        match event {
            TickEvent::EnemyDefeated { exp, was_boss, .. } => {
                self.kills += 1;
                self.exp_gained += exp;
                if *was_boss {
                    self.boss_kills += 1;
                }
            }
            TickEvent::DamageDealt {
                target: idle_dungeon::core::Side::Player,
                amount,
                ..
            } => self.damage_taken += amount,
            TickEvent::EnemyEscaped { .. } => self.escapes += 1,
            TickEvent::PlayerDied => self.deaths += 1,
            TickEvent::WaveAdvanced { .. } => self.waves_advanced += 1,
            TickEvent::DungeonCleared { .. } => self.clears += 1,
            TickEvent::LeveledUp { .. } => self.level_ups += 1,
            TickEvent::GameSaved => self.saves += 1,
            TickEvent::DungeonUnlocked { dungeon_id } => {
                println!("  Unlocked dungeon {}", dungeon_id);
            }
            TickEvent::DungeonSwitched { dungeon_id } => {
                println!("  Entered dungeon {}", dungeon_id);
            }
            _ => {}
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let config = match parse_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            print_usage();
            process::exit(1);
        }
    };

    let master = match &config.data {
        Some(path) => MasterData::load_or_builtin(path),
        None => MasterData::builtin(),
    };
    let mut session = Session::load(master, save_manager(config.save_dir.as_ref()));
    if config.reset {
        session.reset_game();
    }

    // The headless driver acts as an authenticated host.
    match session.begin(true) {
        Ok(report) if report.has_progress() => {
            println!(
                "Offline for {}s: {} kills, +{} exp, level {} -> {}",
                report.elapsed_seconds,
                report.kills,
                report.exp_gained,
                report.level_before,
                report.level_after
            );
        }
        Ok(_) => {}
        Err(e) => {
            eprintln!("Could not start session: {}", e);
            process::exit(1);
        }
    }

    for attr in &config.allocate {
        if let Err(e) = session.allocate_stat(*attr) {
            eprintln!("Could not allocate {}: {}", attr, e);
        }
    }
    if let Some(dungeon_id) = config.dungeon {
        if let Err(e) = session.switch_dungeon(dungeon_id) {
            eprintln!("Could not enter dungeon {}: {}", dungeon_id, e);
        }
    }

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    println!("Running {} ticks...", config.ticks);
    let mut stats = RunStats::default();
    for _ in 0..config.ticks {
        let result = session.step(&mut rng);
        for event in &result.events {
            stats.record(event);
        }
    }
    if let Err(e) = session.save() {
        eprintln!("Final save failed: {}", e);
    }

    let player = session.player();
    let progression = &player.progression;
    println!();
    println!("Summary");
    println!("  Level:          {} ({}/{} exp)", player.level, player.exp, player.next_exp);
    println!(
        "  Attributes:     {} total, {} unspent points",
        player.attributes.total(),
        player.stat_points
    );
    println!("  HP:             {}/{}", player.hp, player.max_hp);
    println!(
        "  Dungeon:        {} wave {} ({} kills in wave)",
        progression.current_dungeon_id, progression.current_wave, progression.kills_in_wave
    );
    println!("  Kills:          {} ({} bosses)", stats.kills, stats.boss_kills);
    println!("  Exp gained:     {}", stats.exp_gained);
    println!("  Level ups:      {}", stats.level_ups);
    println!("  Waves:          {}", stats.waves_advanced);
    println!("  Clears:         {}", stats.clears);
    println!("  Escapes:        {}", stats.escapes);
    println!("  Deaths:         {}", stats.deaths);
    println!("  Damage taken:   {}", stats.damage_taken);
    println!("  Saves:          {}", stats.saves);
}
