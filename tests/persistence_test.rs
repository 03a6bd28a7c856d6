//! Persistence integration tests
//!
//! Saves written by older versions, corrupt saves, and the save triggers
//! of a running session.

use idle_dungeon::core::{PlayerState, Session, TickEvent};
use idle_dungeon::data::MasterData;
use idle_dungeon::save_manager::{FileStore, MemoryStore, SaveManager};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const KEY: &str = "cc_save_data";

fn manager_with(json: &str) -> SaveManager {
    let store = MemoryStore::new();
    store.insert(KEY, json);
    SaveManager::new(store)
}

// ============================================================================
// Loading older and damaged saves
// ============================================================================

#[test]
fn test_level_only_save_backfills_and_derives() {
    let master = MasterData::builtin();
    let state = manager_with(r#"{"level": 5}"#).load(&master, 1_000);

    assert_eq!(state.level, 5);
    assert_eq!(state.max_hp, 165);
    assert_eq!(state.hp, 165);
    assert_eq!(state.attributes.vit, 5);
    assert_eq!(state.stat_points, 0);
    assert_eq!(state.last_saved_at, 1_000);
    assert_eq!(state.progression.current_dungeon_id, 1);
    assert_eq!(state.progression.current_wave, 1);
}

#[test]
fn test_stored_derived_values_are_not_trusted() {
    let master = MasterData::builtin();
    let state = manager_with(
        r#"{
            "level": 1,
            "attributes": {"str": 10, "vit": 10, "int": 5, "dex": 5, "agi": 5, "luk": 5},
            "max_hp": 5000,
            "hp": 4000,
            "battle": {"atk": 999, "def_sub": 999}
        }"#,
    )
    .load(&master, 0);

    assert_eq!(state.max_hp, 150);
    assert_eq!(state.hp, 150);
    assert_eq!(state.battle.atk, 5);
    assert_eq!(state.battle.matk, 2);
    assert_eq!(state.battle.def_sub, 30);
}

#[test]
fn test_partial_attribute_object_defaults_missing_to_zero() {
    let master = MasterData::builtin();
    let state = manager_with(r#"{"attributes": {"str": 8}}"#).load(&master, 0);

    assert_eq!(state.attributes.str, 8);
    assert_eq!(state.attributes.vit, 0);
    assert_eq!(state.max_hp, 100);
}

#[test]
fn test_dead_save_loads_with_full_hp() {
    let master = MasterData::builtin();
    let state = manager_with(r#"{"hp": -20}"#).load(&master, 0);
    assert_eq!(state.hp, state.max_hp);
}

#[test]
fn test_unknown_dungeon_is_repaired() {
    let master = MasterData::builtin();
    let state = manager_with(
        r#"{"progression": {"current_dungeon_id": 42, "current_wave": 9, "kills_in_wave": 3,
            "records": {"42": {"clear_count": 2}}}}"#,
    )
    .load(&master, 0);

    assert_eq!(state.progression.current_dungeon_id, 1);
    assert_eq!(state.progression.current_wave, 1);
    assert_eq!(state.progression.kills_in_wave, 0);
    assert_eq!(state.progression.clears(42), 2, "history is kept");
}

#[test]
fn test_corrupt_saves_start_new_game() {
    let master = MasterData::builtin();
    for json in ["", "garbage", "[]", "42", r#"{"level": [1]}"#] {
        let state = manager_with(json).load(&master, 77);
        assert_eq!(state, PlayerState::new(&master, 77), "save {:?}", json);
    }
}

// ============================================================================
// Session save triggers
// ============================================================================

#[test]
fn test_session_saves_on_hide_and_reloads() {
    let store = MemoryStore::new();
    let master = MasterData::builtin();
    let mut session =
        Session::load_with_clock(master.clone(), SaveManager::new(store.clone()), || 500);
    session.begin(true).unwrap();
    session.player_mut().exp = 33;

    session.set_visible(false);
    assert!(session
        .drain_events()
        .iter()
        .any(|e| matches!(e, TickEvent::GameSaved)));

    let reloaded = Session::load_with_clock(master, SaveManager::new(store), || 500);
    assert_eq!(reloaded.player().exp, 33);
    assert_eq!(reloaded.player().last_saved_at, 500);
}

#[test]
fn test_session_saves_on_clear() {
    let store = MemoryStore::new();
    let master = MasterData::from_json(
        r#"{
            "config": {"spawn_rate": 1, "field_width": 150, "base_atk_interval": 1,
                       "atk_interval_floor": 1, "autosave_ticks": 100000},
            "enemies": [{"id": 1, "hp": 1, "atk": 1, "exp": 1}],
            "dungeons": [{"id": 1, "wave_count": 1, "req_kills": 2}]
        }"#,
    )
    .unwrap();
    let mut session =
        Session::load_with_clock(master.clone(), SaveManager::new(store.clone()), || 0);
    session.begin(true).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    for _ in 0..1_000 {
        let result = session.step(&mut rng);
        if result.any(|e| matches!(e, TickEvent::DungeonCleared { .. })) {
            break;
        }
    }

    let saved = SaveManager::new(store).load(&master, 0);
    assert_eq!(saved.progression.clears(1), 1);
}

#[test]
fn test_file_backed_session_round_trip() {
    let dir = std::env::temp_dir().join(format!("idle-dungeon-persist-{}", std::process::id()));
    let master = MasterData::builtin();

    {
        let mut session = Session::load_with_clock(
            master.clone(),
            SaveManager::new(FileStore::in_dir(&dir).unwrap()),
            || 10,
        );
        session.player_mut().level = 7;
        session.save().unwrap();
    }

    let session = Session::load_with_clock(
        master,
        SaveManager::new(FileStore::in_dir(&dir).unwrap()),
        || 10,
    );
    assert_eq!(session.player().level, 7);
    assert_eq!(session.player().max_hp, 185);

    let _ = std::fs::remove_dir_all(&dir);
}
