use crate::data::{EnemyTemplate, GameConfig};
use rand::Rng;

/// One of the three horizontal lanes enemies walk along. Only a hint for
/// the presentation layer; combat is one-dimensional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lane {
    Top,
    Middle,
    Bottom,
}

impl Lane {
    pub fn all() -> [Lane; 3] {
        [Lane::Top, Lane::Middle, Lane::Bottom]
    }

    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::all()[rng.gen_range(0..3)]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyState {
    Moving,
    Attacking,
}

/// A live enemy on the battlefield. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct EnemyInstance {
    /// Unique within a session.
    pub id: u64,
    pub template_id: u32,
    pub name: String,
    pub x: f64,
    pub lane: Lane,
    pub hp: i64,
    pub max_hp: i64,
    pub atk: i64,
    pub exp: u64,
    pub speed: f64,
    pub range: f64,
    pub attack_interval: u32,
    pub attack_timer: u32,
    pub state: EnemyState,
    pub is_boss: bool,
    pub color: String,
    pub width: f64,
}

impl EnemyInstance {
    /// A regular enemy entering at the right edge of the field.
    pub fn from_template(
        id: u64,
        template: &EnemyTemplate,
        config: &GameConfig,
        lane: Lane,
    ) -> Self {
        let hp = template.hp.max(1) as i64;
        Self {
            id,
            template_id: template.id,
            name: template.name.clone(),
            x: config.field_width,
            lane,
            hp,
            max_hp: hp,
            atk: template.atk as i64,
            exp: template.exp as u64,
            speed: template.speed,
            range: config.enemy_range,
            attack_interval: config.enemy_attack_interval,
            attack_timer: 0,
            state: EnemyState::Moving,
            is_boss: false,
            color: template.color.clone(),
            width: template.width,
        }
    }

    /// A boss: template stats scaled by the configured multipliers.
    pub fn boss_from_template(
        id: u64,
        template: &EnemyTemplate,
        config: &GameConfig,
        lane: Lane,
    ) -> Self {
        let mut enemy = Self::from_template(id, template, config, lane);
        let hp = ((template.hp as f64 * config.boss_hp_multiplier).floor() as i64).max(1);
        enemy.hp = hp;
        enemy.max_hp = hp;
        enemy.exp = (template.exp as f64 * config.boss_exp_multiplier).floor() as u64;
        enemy.is_boss = true;
        enemy
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn take_damage(&mut self, amount: i64) {
        self.hp -= amount;
    }
}
