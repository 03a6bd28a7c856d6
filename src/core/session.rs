//! The session controller.
//!
//! [`Session`] owns all mutable game state for one player: the persisted
//! [`PlayerState`], the transient [`Battlefield`], master data and the save
//! manager. An external scheduler calls [`Session::step`] about 60 times a
//! second; player actions are methods on the session. Nothing is global.

use super::game_logic::{allocate_stat, gain_exp, ActionError};
use super::game_state::PlayerState;
use super::offline::{apply_offline_progress, OfflineReport};
use super::tick::{StepError, TickEvent, TickResult};
use crate::character::attributes::AttributeType;
use crate::combat::logic::Battlefield;
use crate::combat::types::EnemyInstance;
use crate::data::MasterData;
use crate::dungeon::KillOutcome;
use crate::save_manager::{SaveError, SaveManager};
use chrono::Utc;
use log::{debug, error, info, warn};
use rand::Rng;

/// A state change applied only after a delay, with the world frozen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionIntent {
    SwitchDungeon(u32),
}

#[derive(Debug, Clone, Copy)]
struct PendingTransition {
    intent: TransitionIntent,
    remaining_ticks: u32,
}

pub struct Session {
    player: PlayerState,
    battlefield: Battlefield,
    master: MasterData,
    saves: SaveManager,
    started: bool,
    paused: bool,
    pending: Option<PendingTransition>,
    autosave_counter: u32,
    /// Events from actions, delivered with the next step.
    outbox: Vec<TickEvent>,
    clock: Box<dyn Fn() -> i64>,
}

impl Session {
    /// Loads the saved player (or a new one) using the system clock.
    pub fn load(master: MasterData, saves: SaveManager) -> Self {
        Self::load_with_clock(master, saves, || Utc::now().timestamp())
    }

    /// `clock` returns the current time in Unix seconds.
    pub fn load_with_clock(
        master: MasterData,
        saves: SaveManager,
        clock: impl Fn() -> i64 + 'static,
    ) -> Self {
        let player = saves.load(&master, clock());
        Self {
            player,
            battlefield: Battlefield::new(),
            master,
            saves,
            started: false,
            paused: false,
            pending: None,
            autosave_counter: 0,
            outbox: Vec::new(),
            clock: Box::new(clock),
        }
    }

    fn now(&self) -> i64 {
        (self.clock)()
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut PlayerState {
        &mut self.player
    }

    pub fn battlefield(&self) -> &Battlefield {
        &self.battlefield
    }

    pub fn master(&self) -> &MasterData {
        &self.master
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// The scheduled transition and the frozen ticks left before it commits.
    pub fn pending_transition(&self) -> Option<(TransitionIntent, u32)> {
        self.pending.map(|p| (p.intent, p.remaining_ticks))
    }

    pub fn unlocked_dungeons(&self) -> Vec<u32> {
        self.player.progression.unlocked_dungeons(&self.master)
    }

    /// Starts the simulation once the host has confirmed a logged-in user.
    /// Runs offline catch-up for the time since the last save. A host that
    /// is already hidden stays paused until it is shown again.
    pub fn begin(&mut self, authenticated: bool) -> Result<OfflineReport, ActionError> {
        if !authenticated {
            warn!("Refusing to start session: not authenticated");
            return Err(ActionError::NotAuthenticated);
        }
        if self.started {
            return Ok(OfflineReport::default());
        }
        self.started = true;
        info!(
            "Session started: level {}, dungeon {}",
            self.player.level, self.player.progression.current_dungeon_id
        );

        let mut events = Vec::new();
        let report = self.catch_up(&mut events);
        self.outbox.extend(events);
        Ok(report)
    }

    /// Advances the simulation by one step.
    ///
    /// This is the error boundary for [`StepError`]: a failing step is
    /// logged and the next step proceeds normally.
    pub fn step<R: Rng>(&mut self, rng: &mut R) -> TickResult {
        let mut events = std::mem::take(&mut self.outbox);
        if self.started && !self.paused {
            if let Err(e) = self.try_step(rng, &mut events) {
                error!("Simulation step failed: {}", e);
            }
        }
        TickResult { events }
    }

    fn try_step<R: Rng>(
        &mut self,
        rng: &mut R,
        events: &mut Vec<TickEvent>,
    ) -> Result<(), StepError> {
        // The world stays frozen until a pending transition commits.
        if let Some(pending) = self.pending.as_mut() {
            pending.remaining_ticks = pending.remaining_ticks.saturating_sub(1);
            if pending.remaining_ticks == 0 {
                let intent = pending.intent;
                self.pending = None;
                self.apply_transition(intent, events);
            }
            return Ok(());
        }

        self.autosave_counter += 1;
        if self.autosave_counter >= self.master.config.autosave_ticks.max(1) {
            self.autosave_counter = 0;
            if self.persist() {
                events.push(TickEvent::GameSaved);
            }
        }

        let dungeon_id = self.player.progression.current_dungeon_id;
        let dungeon = self
            .master
            .dungeon(dungeon_id)
            .ok_or(StepError::UnknownDungeon(dungeon_id))?;

        self.battlefield
            .spawn_if_due(&self.master, dungeon, &self.player.progression, rng, events)?;
        self.battlefield.advance_enemies(&mut self.player, events);
        if let Some(enemy) = self
            .battlefield
            .player_attack(&mut self.player, &self.master, events)
        {
            self.on_enemy_defeated(enemy, events)?;
        }

        if self.player.is_dead() {
            info!("Player died; restoring HP and clearing the field");
            self.player.restore_hp();
            self.battlefield.clear();
            events.push(TickEvent::PlayerDied);
        }
        Ok(())
    }

    fn on_enemy_defeated(
        &mut self,
        enemy: EnemyInstance,
        events: &mut Vec<TickEvent>,
    ) -> Result<(), StepError> {
        events.push(TickEvent::EnemyDefeated {
            enemy_id: enemy.id,
            template_id: enemy.template_id,
            exp: enemy.exp,
            was_boss: enemy.is_boss,
        });

        let level_up = gain_exp(&mut self.player, &self.master, enemy.exp);
        if level_up.leveled_up() {
            info!("Reached level {}", self.player.level);
            events.push(TickEvent::LeveledUp {
                level: self.player.level,
                stat_points_gained: level_up.stat_points_gained,
            });
            events.push(self.stats_changed());
        }

        let dungeon_id = self.player.progression.current_dungeon_id;
        let dungeon = self
            .master
            .dungeon(dungeon_id)
            .ok_or(StepError::UnknownDungeon(dungeon_id))?;
        let outcome = self.player.progression.record_kill(
            dungeon,
            enemy.is_boss,
            self.master.config.default_req_kills,
        );

        match outcome {
            KillOutcome::Counted => {}
            KillOutcome::WaveAdvanced { wave } => {
                debug!("Dungeon {} advanced to wave {}", dungeon_id, wave);
                self.battlefield.clear();
                events.push(TickEvent::WaveAdvanced { dungeon_id, wave });
            }
            KillOutcome::Cleared { clear_count } => {
                info!("Cleared dungeon {} ({} clears)", dungeon_id, clear_count);
                self.battlefield.clear();
                events.push(TickEvent::DungeonCleared {
                    dungeon_id,
                    clear_count,
                });
                if let Some(next) = self.player.progression.newly_unlocked(&self.master, dungeon_id)
                {
                    info!("Unlocked dungeon {}", next);
                    events.push(TickEvent::DungeonUnlocked { dungeon_id: next });
                }
                if self.persist() {
                    events.push(TickEvent::GameSaved);
                }
            }
        }
        Ok(())
    }

    fn stats_changed(&self) -> TickEvent {
        TickEvent::StatsChanged {
            max_hp: self.player.max_hp,
            battle: self.player.battle,
        }
    }

    fn catch_up(&mut self, events: &mut Vec<TickEvent>) -> OfflineReport {
        let now = self.now();
        let report = apply_offline_progress(&mut self.player, &self.master, now);
        if report.has_progress() {
            events.push(TickEvent::OfflineProgress(report.clone()));
            if report.levels_gained() > 0 {
                events.push(TickEvent::LeveledUp {
                    level: self.player.level,
                    stat_points_gained: report.stat_points_gained,
                });
                events.push(self.stats_changed());
            }
        }
        if self.persist() {
            events.push(TickEvent::GameSaved);
        }
        report
    }

    fn save_player(&mut self) -> Result<(), SaveError> {
        self.player.last_saved_at = self.now();
        self.saves.save(&self.player)
    }

    /// Saves, logging instead of failing.
    fn persist(&mut self) -> bool {
        match self.save_player() {
            Ok(()) => {
                debug!("Saved game");
                true
            }
            Err(e) => {
                warn!("Save failed: {}", e);
                false
            }
        }
    }

    /// Saves immediately and stamps the save time.
    pub fn save(&mut self) -> Result<(), SaveError> {
        self.save_player()?;
        self.outbox.push(TickEvent::GameSaved);
        Ok(())
    }

    /// Spends one stat point and saves.
    pub fn allocate_stat(&mut self, attr: AttributeType) -> Result<(), ActionError> {
        allocate_stat(&mut self.player, attr)?;
        let changed = self.stats_changed();
        self.outbox.push(changed);
        if self.persist() {
            self.outbox.push(TickEvent::GameSaved);
        }
        Ok(())
    }

    fn check_entry(&self, dungeon_id: u32) -> Result<(), ActionError> {
        let dungeon = self
            .master
            .dungeon(dungeon_id)
            .ok_or(ActionError::UnknownDungeon(dungeon_id))?;
        if !self.player.progression.is_unlocked(&self.master, dungeon_id) {
            return Err(ActionError::DungeonLocked(dungeon_id));
        }
        if self.player.level < dungeon.req_lv {
            return Err(ActionError::LevelTooLow {
                required: dungeon.req_lv,
                level: self.player.level,
            });
        }
        Ok(())
    }

    /// Validates `intent` and schedules it. The simulation freezes for
    /// `transition_ticks` steps, then the change is applied in one piece.
    pub fn schedule_transition(&mut self, intent: TransitionIntent) -> Result<(), ActionError> {
        if self.pending.is_some() {
            return Err(ActionError::TransitionInProgress);
        }
        let TransitionIntent::SwitchDungeon(dungeon_id) = intent;
        self.check_entry(dungeon_id)?;

        let ticks = self.master.config.transition_ticks;
        self.outbox
            .push(TickEvent::TransitionScheduled { dungeon_id, ticks });
        if ticks == 0 {
            let mut events = Vec::new();
            self.apply_transition(intent, &mut events);
            self.outbox.extend(events);
        } else {
            self.pending = Some(PendingTransition {
                intent,
                remaining_ticks: ticks,
            });
        }
        Ok(())
    }

    pub fn switch_dungeon(&mut self, dungeon_id: u32) -> Result<(), ActionError> {
        self.schedule_transition(TransitionIntent::SwitchDungeon(dungeon_id))
    }

    /// Applies the pending transition now instead of waiting for the
    /// countdown. Returns false when nothing was pending.
    pub fn commit_transition(&mut self) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };
        let mut events = Vec::new();
        self.apply_transition(pending.intent, &mut events);
        self.outbox.extend(events);
        true
    }

    fn apply_transition(&mut self, intent: TransitionIntent, events: &mut Vec<TickEvent>) {
        match intent {
            TransitionIntent::SwitchDungeon(dungeon_id) => {
                self.player.progression.switch_to(dungeon_id);
                self.battlefield.clear();
                self.player.attack_timer = 0;
                info!("Switched to dungeon {}", dungeon_id);
                events.push(TickEvent::DungeonSwitched { dungeon_id });
                if self.persist() {
                    events.push(TickEvent::GameSaved);
                }
            }
        }
    }

    /// Host visibility. Hiding saves and pauses; showing credits the hidden
    /// time through offline catch-up and resumes.
    pub fn set_visible(&mut self, visible: bool) {
        let mut events = Vec::new();
        if !visible {
            if !self.paused {
                self.paused = true;
                if self.persist() {
                    events.push(TickEvent::GameSaved);
                }
            }
        } else if self.paused {
            self.paused = false;
            if self.started {
                self.catch_up(&mut events);
            }
        }
        self.outbox.extend(events);
    }

    /// Deletes the save and starts over as a new character.
    pub fn reset_game(&mut self) {
        if let Err(e) = self.saves.delete() {
            warn!("Could not delete save: {}", e);
        }
        self.player = PlayerState::new(&self.master, self.now());
        self.battlefield.clear();
        self.pending = None;
        self.autosave_counter = 0;
        info!("Game reset");

        let changed = self.stats_changed();
        self.outbox.push(changed);
        if self.persist() {
            self.outbox.push(TickEvent::GameSaved);
        }
    }

    /// Takes the queued action events without stepping.
    pub fn drain_events(&mut self) -> Vec<TickEvent> {
        std::mem::take(&mut self.outbox)
    }
}
