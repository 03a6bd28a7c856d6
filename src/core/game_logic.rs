use super::game_state::PlayerState;
use crate::character::attributes::AttributeType;
use crate::data::MasterData;
use thiserror::Error;

/// A player action that was refused. The session state is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("no unspent stat points")]
    NoStatPoints,
    #[error("dungeon {0} does not exist")]
    UnknownDungeon(u32),
    #[error("dungeon {0} is locked")]
    DungeonLocked(u32),
    #[error("dungeon requires level {required}, character is level {level}")]
    LevelTooLow { required: u32, level: u32 },
    #[error("a dungeon transition is already in progress")]
    TransitionInProgress,
    #[error("not authenticated")]
    NotAuthenticated,
}

/// Result of feeding experience through the level-up loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelUpReport {
    pub levels_gained: u32,
    pub stat_points_gained: u32,
}

impl LevelUpReport {
    pub fn leveled_up(&self) -> bool {
        self.levels_gained > 0
    }
}

/// Adds experience and processes every level-up it pays for.
///
/// Each level-up consumes `next_exp`, awards the stat points of the level
/// being left and looks up the next requirement. Stats are re-derived and HP
/// fully restored when at least one level was gained. Afterwards
/// `exp < next_exp` always holds.
pub fn gain_exp(player: &mut PlayerState, master: &MasterData, amount: u64) -> LevelUpReport {
    player.exp = player.exp.saturating_add(amount);
    player.next_exp = player.next_exp.max(1);

    let mut report = LevelUpReport::default();
    while player.exp >= player.next_exp {
        player.exp -= player.next_exp;

        let reward = master.reward_for(player.level);
        player.stat_points = player.stat_points.saturating_add(reward);
        player.level = player.level.saturating_add(1);
        player.next_exp = master.next_exp_for(player.level, player.next_exp);

        report.levels_gained += 1;
        report.stat_points_gained += reward;
    }

    if report.leveled_up() {
        player.refresh_stats();
        player.restore_hp();
    }
    report
}

/// Spends one stat point on `attr` and re-derives stats.
pub fn allocate_stat(player: &mut PlayerState, attr: AttributeType) -> Result<(), ActionError> {
    if player.stat_points == 0 {
        return Err(ActionError::NoStatPoints);
    }
    player.stat_points -= 1;
    player.attributes.increment(attr);
    player.refresh_stats();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_master() -> MasterData {
        MasterData::from_json(
            r#"{"exp_table": [
                {"lv": 1, "next_exp": 10, "reward_sp": 2},
                {"lv": 2, "next_exp": 20, "reward_sp": 4},
                {"lv": 3, "next_exp": 40, "reward_sp": 5}
            ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_gain_exp_without_level_up() {
        let master = MasterData::builtin();
        let mut player = PlayerState::new(&master, 0);

        let report = gain_exp(&mut player, &master, 49);
        assert_eq!(report, LevelUpReport::default());
        assert_eq!(player.exp, 49);
        assert_eq!(player.level, 1);
    }

    #[test]
    fn test_gain_exp_exact_threshold() {
        let master = MasterData::builtin();
        let mut player = PlayerState::new(&master, 0);

        let report = gain_exp(&mut player, &master, 50);
        assert_eq!(report.levels_gained, 1);
        assert_eq!(report.stat_points_gained, 3);
        assert_eq!(player.level, 2);
        assert_eq!(player.exp, 0);
        assert_eq!(player.next_exp, 60);
        assert_eq!(player.stat_points, 3);
    }

    #[test]
    fn test_gain_exp_multiple_levels_from_table() {
        let master = table_master();
        let mut player = PlayerState::new(&master, 0);
        assert_eq!(player.next_exp, 10);

        // 10 + 20 + 5 leftover
        let report = gain_exp(&mut player, &master, 35);
        assert_eq!(report.levels_gained, 2);
        assert_eq!(report.stat_points_gained, 6);
        assert_eq!(player.level, 3);
        assert_eq!(player.exp, 5);
        assert_eq!(player.next_exp, 40);
    }

    #[test]
    fn test_gain_exp_falls_back_past_table_end() {
        let master = table_master();
        let mut player = PlayerState::new(&master, 0);

        gain_exp(&mut player, &master, 10 + 20 + 40);
        assert_eq!(player.level, 4);
        assert_eq!(player.next_exp, 48);
        assert_eq!(player.stat_points, 2 + 4 + 5);
    }

    #[test]
    fn test_level_up_restores_hp_and_refreshes_stats() {
        let master = MasterData::builtin();
        let mut player = PlayerState::new(&master, 0);
        player.hp = 3;

        gain_exp(&mut player, &master, 50);
        assert_eq!(player.max_hp, 135);
        assert_eq!(player.hp, 135);
    }

    #[test]
    fn test_gain_exp_huge_amount_terminates() {
        let master = MasterData::builtin();
        let mut player = PlayerState::new(&master, 0);

        gain_exp(&mut player, &master, 10_000_000);
        assert!(player.exp < player.next_exp);
        assert!(player.level > 1);
    }

    #[test]
    fn test_gain_exp_repairs_zero_requirement() {
        let master = MasterData::builtin();
        let mut player = PlayerState::new(&master, 0);
        player.next_exp = 0;

        gain_exp(&mut player, &master, 0);
        assert!(player.exp < player.next_exp);
    }

    #[test]
    fn test_allocate_stat() {
        let master = MasterData::builtin();
        let mut player = PlayerState::new(&master, 0);
        player.stat_points = 1;

        allocate_stat(&mut player, AttributeType::Vit).unwrap();
        assert_eq!(player.stat_points, 0);
        assert_eq!(player.attributes.vit, 6);
        assert_eq!(player.max_hp, 130);
        assert_eq!(player.battle.def_sub, 18);
    }

    #[test]
    fn test_allocate_stat_without_points() {
        let master = MasterData::builtin();
        let mut player = PlayerState::new(&master, 0);

        assert_eq!(
            allocate_stat(&mut player, AttributeType::Str),
            Err(ActionError::NoStatPoints)
        );
        assert_eq!(player.attributes.str, 5);
        assert_eq!(player.stat_points, 0);
    }
}
