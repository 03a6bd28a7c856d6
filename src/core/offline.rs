//! Offline progression.
//!
//! Estimates the kills and experience the player would have earned while the
//! game was not ticking. Only the character levels up; dungeon waves, kills
//! and clears are left alone so unattended time cannot complete content.

use super::constants::*;
use super::game_logic::gain_exp;
use super::game_state::PlayerState;
use crate::character::derived_stats::damage;
use crate::data::{GameConfig, MasterData};
use log::info;

/// Closed-form outcome for a span of offline time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OfflineEstimate {
    pub kills: u64,
    pub exp: u64,
}

/// Report of offline progression results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OfflineReport {
    /// Seconds since the last save.
    pub elapsed_seconds: i64,
    /// Seconds actually credited after the offline cap.
    pub credited_seconds: i64,
    pub kills: u64,
    pub exp_gained: u64,
    pub level_before: u32,
    pub level_after: u32,
    pub stat_points_gained: u32,
}

impl OfflineReport {
    pub fn has_progress(&self) -> bool {
        self.exp_gained > 0
    }

    pub fn levels_gained(&self) -> u32 {
        self.level_after.saturating_sub(self.level_before)
    }
}

/// Estimates kills and experience for `elapsed_seconds` of unattended combat
/// against a synthetic average enemy scaled by level.
///
/// Time per kill is the hits needed at the live attack interval, inflated by
/// [`OFFLINE_SEARCH_MULTIPLIER`] for walking between enemies.
pub fn estimate_offline(
    player: &PlayerState,
    config: &GameConfig,
    elapsed_seconds: i64,
) -> OfflineEstimate {
    let elapsed = elapsed_seconds.clamp(0, MAX_OFFLINE_SECONDS);
    if elapsed == 0 {
        return OfflineEstimate::default();
    }

    let level = player.level.max(1) as u64;
    let enemy_hp = OFFLINE_ENEMY_BASE_HP + OFFLINE_ENEMY_HP_PER_LEVEL * level;
    let exp_per_kill = OFFLINE_ENEMY_BASE_EXP + OFFLINE_ENEMY_EXP_PER_LEVEL * level;

    let hit_damage = damage(player.battle.atk, 0, 0) as u64;
    let hits_to_kill = enemy_hp.div_ceil(hit_damage);

    let interval = config.attack_interval(player.attributes.agi).max(1.0);
    let attacks_per_second = TICKS_PER_SECOND as f64 / interval;
    let seconds_per_kill = hits_to_kill as f64 / attacks_per_second * OFFLINE_SEARCH_MULTIPLIER;

    let kills = (elapsed as f64 / seconds_per_kill).floor() as u64;
    OfflineEstimate {
        kills,
        exp: kills.saturating_mul(exp_per_kill),
    }
}

/// Credits the time since `player.last_saved_at` and stamps the save time.
///
/// Nothing is granted for gaps of [`OFFLINE_MIN_SECONDS`] or less, or when
/// the clock went backwards. Gaps beyond [`MAX_OFFLINE_SECONDS`] are capped.
pub fn apply_offline_progress(
    player: &mut PlayerState,
    master: &MasterData,
    current_time: i64,
) -> OfflineReport {
    let elapsed_seconds = current_time - player.last_saved_at;
    player.last_saved_at = current_time;

    let level_before = player.level;
    let mut report = OfflineReport {
        elapsed_seconds,
        level_before,
        level_after: level_before,
        ..OfflineReport::default()
    };
    if elapsed_seconds <= OFFLINE_MIN_SECONDS {
        return report;
    }

    let credited_seconds = elapsed_seconds.min(MAX_OFFLINE_SECONDS);
    let estimate = estimate_offline(player, &master.config, credited_seconds);
    let level_up = gain_exp(player, master, estimate.exp);

    report.credited_seconds = credited_seconds;
    report.kills = estimate.kills;
    report.exp_gained = estimate.exp;
    report.level_after = player.level;
    report.stat_points_gained = level_up.stat_points_gained;

    info!(
        "Offline for {}s: {} kills, {} exp, level {} -> {}",
        elapsed_seconds, report.kills, report.exp_gained, level_before, report.level_after
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> (MasterData, PlayerState) {
        let master = MasterData::builtin();
        let player = PlayerState::new(&master, 0);
        (master, player)
    }

    #[test]
    fn test_estimate_hundred_seconds_level_one() {
        let (master, player) = fresh();
        // 13 hits at 60/59 attacks per second, x1.2 => ~15.34s per kill
        let estimate = estimate_offline(&player, &master.config, 100);
        assert_eq!(estimate, OfflineEstimate { kills: 6, exp: 72 });
    }

    #[test]
    fn test_estimate_is_deterministic() {
        let (master, player) = fresh();
        let a = estimate_offline(&player, &master.config, 12_345);
        let b = estimate_offline(&player, &master.config, 12_345);
        assert_eq!(a, b);
    }

    #[test]
    fn test_estimate_non_positive_elapsed() {
        let (master, player) = fresh();
        assert_eq!(
            estimate_offline(&player, &master.config, 0),
            OfflineEstimate::default()
        );
        assert_eq!(
            estimate_offline(&player, &master.config, -50),
            OfflineEstimate::default()
        );
    }

    #[test]
    fn test_estimate_capped_at_max() {
        let (master, player) = fresh();
        let week = estimate_offline(&player, &master.config, MAX_OFFLINE_SECONDS);
        let two_weeks = estimate_offline(&player, &master.config, MAX_OFFLINE_SECONDS * 2);
        assert_eq!(week, two_weeks);
    }

    #[test]
    fn test_stronger_player_kills_faster() {
        let (master, mut player) = fresh();
        let weak = estimate_offline(&player, &master.config, 3_600);

        player.attributes.str = 40;
        player.refresh_stats();
        let strong = estimate_offline(&player, &master.config, 3_600);
        assert!(strong.kills > weak.kills);
    }

    #[test]
    fn test_apply_grants_exp_and_levels() {
        let (master, mut player) = fresh();

        let report = apply_offline_progress(&mut player, &master, 100);
        assert_eq!(report.kills, 6);
        assert_eq!(report.exp_gained, 72);
        assert_eq!(report.level_before, 1);
        assert_eq!(report.level_after, 2);
        assert_eq!(report.levels_gained(), 1);
        assert_eq!(player.exp, 22);
        assert_eq!(player.stat_points, 3);
        assert_eq!(player.last_saved_at, 100);
    }

    #[test]
    fn test_apply_below_threshold_grants_nothing() {
        let (master, mut player) = fresh();

        let report = apply_offline_progress(&mut player, &master, 10);
        assert!(!report.has_progress());
        assert_eq!(player.exp, 0);
        assert_eq!(player.last_saved_at, 10);
    }

    #[test]
    fn test_apply_clock_skew_grants_nothing() {
        let (master, mut player) = fresh();
        player.last_saved_at = 5_000;

        let report = apply_offline_progress(&mut player, &master, 1_000);
        assert_eq!(report.elapsed_seconds, -4_000);
        assert!(!report.has_progress());
        assert_eq!(player.last_saved_at, 1_000);
    }

    #[test]
    fn test_apply_never_touches_dungeon_state() {
        let (master, mut player) = fresh();
        player.progression.current_wave = 2;
        player.progression.kills_in_wave = 4;
        let before = player.progression.clone();

        apply_offline_progress(&mut player, &master, MAX_OFFLINE_SECONDS);
        assert_eq!(player.progression, before);
    }
}
