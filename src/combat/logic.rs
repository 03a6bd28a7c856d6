use super::types::{EnemyInstance, EnemyState, Lane};
use crate::character::derived_stats::damage;
use crate::core::constants::*;
use crate::core::game_state::PlayerState;
use crate::core::tick::{Side, StepError, TickEvent};
use crate::data::{DungeonDefinition, EnemyTemplate, MasterData};
use crate::dungeon::{is_boss_wave, required_kills, DungeonProgression};
use log::debug;
use rand::Rng;

/// Transient combat state: live enemies and the spawn timer.
///
/// A step runs the phases in order: [`Battlefield::spawn_if_due`],
/// [`Battlefield::advance_enemies`], [`Battlefield::player_attack`].
#[derive(Debug, Clone, Default)]
pub struct Battlefield {
    pub enemies: Vec<EnemyInstance>,
    /// Ticks since the last spawn.
    pub spawn_timer: u32,
    next_enemy_id: u64,
}

impl Battlefield {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alive(&self) -> usize {
        self.enemies.len()
    }

    /// Removes every enemy and restarts the spawn timer.
    pub fn clear(&mut self) {
        self.enemies.clear();
        self.spawn_timer = 0;
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_enemy_id += 1;
        self.next_enemy_id
    }

    /// Spawns one enemy once the spawn timer exceeds `spawn_rate`.
    ///
    /// Normal waves only spawn while killed plus alive enemies stay below the
    /// wave requirement. The boss wave spawns a single boss into an empty
    /// field. The timer only resets when something spawns.
    pub fn spawn_if_due<R: Rng>(
        &mut self,
        master: &MasterData,
        dungeon: &DungeonDefinition,
        progression: &DungeonProgression,
        rng: &mut R,
        events: &mut Vec<TickEvent>,
    ) -> Result<(), StepError> {
        let config = &master.config;
        self.spawn_timer = self.spawn_timer.saturating_add(1);
        if self.spawn_timer <= config.spawn_rate {
            return Ok(());
        }

        let wave = progression.current_wave;
        let boss_wave = is_boss_wave(dungeon, wave);
        if boss_wave {
            if !self.enemies.is_empty() {
                return Ok(());
            }
        } else {
            let required = required_kills(dungeon, wave, config.default_req_kills);
            if progression.kills_in_wave + self.alive() as u32 >= required {
                return Ok(());
            }
        }

        let template = if boss_wave {
            match dungeon.boss_id.and_then(|id| master.enemy(id)) {
                Some(boss) => boss,
                None => random_template(master, dungeon, rng)?,
            }
        } else {
            random_template(master, dungeon, rng)?
        };

        let id = self.allocate_id();
        let lane = Lane::random(rng);
        let enemy = if boss_wave {
            EnemyInstance::boss_from_template(id, template, config, lane)
        } else {
            EnemyInstance::from_template(id, template, config, lane)
        };
        debug!(
            "Spawned {} #{} (boss: {}) in dungeon {} wave {}",
            enemy.name, id, enemy.is_boss, dungeon.id, wave
        );
        events.push(TickEvent::EnemySpawned {
            enemy_id: id,
            template_id: enemy.template_id,
            lane,
            is_boss: enemy.is_boss,
        });
        self.enemies.push(enemy);
        self.spawn_timer = 0;
        Ok(())
    }

    /// Moves enemies toward the player or lets them attack once in range.
    ///
    /// Range is measured from the player's front edge. Enemies that walk past
    /// [`ENEMY_DESPAWN_X`] are removed without effect.
    pub fn advance_enemies(&mut self, player: &mut PlayerState, events: &mut Vec<TickEvent>) {
        let front = player.front_edge();

        for enemy in &mut self.enemies {
            let distance = enemy.x - front;
            if distance <= enemy.range && distance > -ENEMY_ATTACK_BACK_REACH {
                enemy.state = EnemyState::Attacking;
                enemy.attack_timer = enemy.attack_timer.saturating_add(1);
                if enemy.attack_timer > enemy.attack_interval {
                    let amount = damage(enemy.atk, player.battle.def_div, player.battle.def_sub);
                    player.take_damage(amount);
                    enemy.attack_timer = 0;
                    events.push(TickEvent::DamageDealt {
                        target: Side::Player,
                        enemy_id: enemy.id,
                        amount,
                    });
                }
            } else {
                enemy.state = EnemyState::Moving;
                enemy.x -= enemy.speed;
            }
        }

        self.enemies.retain(|enemy| {
            if enemy.x < ENEMY_DESPAWN_X {
                events.push(TickEvent::EnemyEscaped { enemy_id: enemy.id });
                false
            } else {
                true
            }
        });
    }

    /// Index of the nearest enemy ahead of the player within range.
    /// The first enemy wins an exact tie.
    pub fn nearest_target(&self, player_x: f64, range: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (index, enemy) in self.enemies.iter().enumerate() {
            let distance = enemy.x - player_x;
            if distance <= -PLAYER_TARGET_BACK_REACH || distance >= range {
                continue;
            }
            if best.map_or(true, |(_, closest)| distance < closest) {
                best = Some((index, distance));
            }
        }
        best.map(|(index, _)| index)
    }

    /// Advances the player's attack cooldown and strikes the nearest target
    /// once it expires. The cooldown only resets when a target was hit.
    ///
    /// Returns the enemy if the hit killed it; it is already removed.
    pub fn player_attack(
        &mut self,
        player: &mut PlayerState,
        master: &MasterData,
        events: &mut Vec<TickEvent>,
    ) -> Option<EnemyInstance> {
        let config = &master.config;
        player.attack_timer = player.attack_timer.saturating_add(1);
        if player.attack_timer as f64 <= config.attack_interval(player.attributes.agi) {
            return None;
        }

        let index = self.nearest_target(player.x, config.player_range)?;
        player.attack_timer = 0;

        // Enemies carry no armor.
        let amount = damage(player.battle.atk, 0, 0);
        let enemy = &mut self.enemies[index];
        enemy.take_damage(amount);
        events.push(TickEvent::DamageDealt {
            target: Side::Enemy,
            enemy_id: enemy.id,
            amount,
        });
        events.push(TickEvent::PlayerRecoil {
            offset: PLAYER_RECOIL_OFFSET,
        });

        if enemy.is_alive() {
            None
        } else {
            Some(self.enemies.remove(index))
        }
    }
}

fn random_template<'a, R: Rng>(
    master: &'a MasterData,
    dungeon: &DungeonDefinition,
    rng: &mut R,
) -> Result<&'a EnemyTemplate, StepError> {
    let allowed = master.allowed_enemies(dungeon);
    if allowed.is_empty() {
        return Err(StepError::NoEnemyTemplates {
            dungeon_id: dungeon.id,
        });
    }
    Ok(allowed[rng.gen_range(0..allowed.len())])
}
