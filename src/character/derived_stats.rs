use super::attributes::Attributes;
use crate::core::constants::*;
use serde::{Deserialize, Serialize};

/// Battle stats shown on the status panel and consumed by combat.
///
/// Defense comes in two parts: `def_div` is the saturating percentage part
/// (from equipment, always 0 until an equipment system exists) and
/// `def_sub` is the flat part subtracted after the percentage.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BattleStats {
    pub atk: i64,
    pub matk: i64,
    pub def_div: i64,
    pub def_sub: i64,
    pub mdef_div: i64,
    pub mdef_sub: i64,
    pub hit: i64,
    pub eva: i64,
    pub cri: i64,
    pub res: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedStats {
    pub max_hp: i64,
    pub battle: BattleStats,
}

/// Derives max HP and battle stats from base attributes and level.
///
/// Fractional luck terms are evaluated in integer tenths so flooring is
/// exact: `floor(a + luk * 0.1) == (10a + luk) / 10` for non-negative input.
pub fn derive_stats(attrs: &Attributes, level: u32) -> DerivedStats {
    let str_ = attrs.str as i64;
    let vit = attrs.vit as i64;
    let agi = attrs.agi as i64;
    let int = attrs.int as i64;
    let dex = attrs.dex as i64;
    let luk = attrs.luk as i64;
    let level = level.max(1) as i64;

    let max_hp = BASE_HP + (level - 1) * HP_PER_LEVEL + vit * HP_PER_VIT;

    let battle = BattleStats {
        // floor(str/2 + luk*0.1), halving is integer
        atk: ((str_ / 2) * 10 + luk) / 10,
        matk: ((int / 2) * 10 + luk) / 10,
        def_div: 0,
        def_sub: vit * DEF_SUB_PER_VIT,
        mdef_div: 0,
        // floor(int*2 + vit*0.5)
        mdef_sub: int * MDEF_SUB_PER_INT + vit / 2,
        // floor(dex + luk*0.2)
        hit: (dex * 5 + luk) / 5,
        eva: (agi * 5 + luk) / 5,
        cri: luk,
        // floor(vit*0.5 + luk*0.2)
        res: (vit * 5 + luk * 2) / 10,
    };

    DerivedStats { max_hp, battle }
}

/// Percentage mitigation from the multiplicative defense term, truncated to
/// two decimals: `floor(def_div^(1/4) * 100) / 100`.
pub fn defense_reduction_percent(def_div: i64) -> f64 {
    if def_div <= 0 {
        return 0.0;
    }
    ((def_div as f64).sqrt().sqrt() * 100.0).floor() / 100.0
}

/// Shared damage formula for both combatants. Never returns less than 1.
pub fn damage(atk: i64, def_div: i64, def_sub: i64) -> i64 {
    let reduction = defense_reduction_percent(def_div);
    let raw = (atk as f64 * (100.0 - reduction) / 100.0 - def_sub as f64).floor();
    if raw < 1.0 {
        1
    } else {
        raw as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worked_example() {
        let attrs = Attributes {
            str: 10,
            vit: 10,
            int: 5,
            dex: 5,
            agi: 5,
            luk: 5,
        };
        let stats = derive_stats(&attrs, 1);

        assert_eq!(stats.battle.atk, 5);
        assert_eq!(stats.battle.matk, 2);
        assert_eq!(stats.battle.def_sub, 30);
        assert_eq!(stats.max_hp, 150);
    }

    #[test]
    fn test_new_character_stats() {
        let stats = derive_stats(&Attributes::new(), 1);

        assert_eq!(stats.max_hp, 125); // 100 + 0 + 5*5
        assert_eq!(stats.battle.atk, 2); // floor(2 + 0.5)
        assert_eq!(stats.battle.matk, 2);
        assert_eq!(stats.battle.def_div, 0);
        assert_eq!(stats.battle.def_sub, 15);
        assert_eq!(stats.battle.mdef_div, 0);
        assert_eq!(stats.battle.mdef_sub, 12); // 10 + 2
        assert_eq!(stats.battle.hit, 6); // floor(5 + 1.0)
        assert_eq!(stats.battle.eva, 6);
        assert_eq!(stats.battle.cri, 5);
        assert_eq!(stats.battle.res, 3); // floor(2.5 + 1.0)
    }

    #[test]
    fn test_max_hp_scales_with_level() {
        let attrs = Attributes::new();
        assert_eq!(derive_stats(&attrs, 1).max_hp, 125);
        assert_eq!(derive_stats(&attrs, 2).max_hp, 135);
        assert_eq!(derive_stats(&attrs, 11).max_hp, 225);
    }

    #[test]
    fn test_level_zero_treated_as_one() {
        let attrs = Attributes::new();
        assert_eq!(derive_stats(&attrs, 0), derive_stats(&attrs, 1));
    }

    #[test]
    fn test_zero_attributes() {
        let stats = derive_stats(&Attributes::uniform(0), 1);
        assert_eq!(stats.max_hp, 100);
        assert_eq!(stats.battle, BattleStats::default());
    }

    #[test]
    fn test_luck_tenths_floor_exactly() {
        // luk 10 contributes exactly +1 to atk, never 0.999...
        let mut attrs = Attributes::uniform(0);
        attrs.luk = 10;
        let stats = derive_stats(&attrs, 1);
        assert_eq!(stats.battle.atk, 1);
        assert_eq!(stats.battle.hit, 2);
        assert_eq!(stats.battle.res, 2);

        attrs.luk = 9;
        assert_eq!(derive_stats(&attrs, 1).battle.atk, 0);
    }

    #[test]
    fn test_damage_without_defense() {
        assert_eq!(damage(10, 0, 0), 10);
        assert_eq!(damage(1, 0, 0), 1);
        assert_eq!(damage(0, 0, 0), 1);
        assert_eq!(damage(-5, 0, 0), 1);
    }

    #[test]
    fn test_damage_flat_reduction() {
        assert_eq!(damage(50, 0, 15), 35);
        assert_eq!(damage(5, 0, 15), 1);
    }

    #[test]
    fn test_damage_percentage_reduction() {
        // def_div 16 -> 16^(1/4) = 2.00%
        assert_eq!(defense_reduction_percent(16), 2.0);
        assert_eq!(damage(100, 16, 0), 98);
        // def_div 10000 -> 10.00%
        assert_eq!(defense_reduction_percent(10_000), 10.0);
        assert_eq!(damage(100, 10_000, 5), 85);
    }

    #[test]
    fn test_reduction_truncates_to_two_decimals() {
        // 2^(1/4) = 1.18920...
        assert_eq!(defense_reduction_percent(2), 1.18);
        assert_eq!(defense_reduction_percent(0), 0.0);
        assert_eq!(defense_reduction_percent(-3), 0.0);
    }

    #[test]
    fn test_damage_non_increasing_in_defense() {
        let mut last = i64::MAX;
        for def_div in (0..2_000).step_by(37) {
            let d = damage(500, def_div, 0);
            assert!(d <= last);
            last = d;
        }
        let mut last = i64::MAX;
        for def_sub in 0..600 {
            let d = damage(500, 0, def_sub);
            assert!(d <= last);
            assert!(d >= 1);
            last = d;
        }
    }
}
