//! Session controller: the screen-level state machine
//!
//! Owns the active [`Session`], persistent [`Progress`], the input intent
//! snapshot, and the frame/countdown drivers. The host calls into it for
//! user actions and elapsed time, then drains the queued output events.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::driver::Drivers;
use crate::error::GameError;
use crate::persistence::Progress;
use crate::sim::{
    EventQueue, GameEvent, GamePhase, LevelCatalog, Session, SoundKind, TickInput, TickOutcome,
    level_name, tick,
};
use crate::tuning::Tuning;

/// Result of picking a level on the level-select screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Level started
    Started,
    /// Level is still locked; nothing changed
    Locked,
    /// Not on the level-select screen; nothing changed
    Ignored,
}

/// How a level appears on the level-select screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelStatus {
    Locked,
    Unlocked,
    Completed,
}

/// Results shown after a run ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub level: u32,
    pub won: bool,
    pub score: u64,
    pub coins_collected: u32,
    pub total_coins: u32,
    pub new_high_score: bool,
    /// Level offered by the "next level" action, if any
    pub next_level: Option<u32>,
    pub achievement: String,
}

/// Top-level game controller
#[derive(Debug)]
pub struct SessionController {
    phase: GamePhase,
    tuning: Tuning,
    catalog: LevelCatalog,
    progress: Progress,
    session: Option<Session>,
    /// Last level started; target of restart/next
    current_level: u32,
    input: TickInput,
    drivers: Drivers,
    events: EventQueue,
    summary: Option<RunSummary>,
}

impl SessionController {
    /// Create a controller on the menu screen
    pub fn new(tuning: Tuning, progress: Progress, level_seed: u64) -> Self {
        let catalog = LevelCatalog::new(level_seed, tuning.enemy_speed_multiplier);
        Self {
            phase: GamePhase::Menu,
            tuning,
            catalog,
            progress,
            session: None,
            current_level: 1,
            input: TickInput::default(),
            drivers: Drivers::new(),
            events: EventQueue::new(),
            summary: None,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// The active run, present while playing or paused
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Results of the last finished run (win or game over screen)
    pub fn summary(&self) -> Option<&RunSummary> {
        self.summary.as_ref()
    }

    pub fn drivers_running(&self) -> bool {
        self.drivers.is_running()
    }

    /// Take all queued output events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain()
    }

    /// Replace the intent snapshot read at the top of the next tick
    pub fn set_input(&mut self, input: TickInput) {
        self.input = input;
    }

    /// Per-level lock/completion state for the level-select screen
    pub fn level_statuses(&self) -> Vec<(u32, LevelStatus)> {
        (1..=LEVEL_COUNT)
            .map(|level| {
                let status = if !self.progress.is_unlocked(level) {
                    LevelStatus::Locked
                } else if self.progress.is_completed(level) {
                    LevelStatus::Completed
                } else {
                    LevelStatus::Unlocked
                };
                (level, status)
            })
            .collect()
    }

    // === Navigation ===

    /// Menu, win, or game over -> level select
    pub fn open_level_select(&mut self) {
        match self.phase {
            GamePhase::Menu | GamePhase::Win | GamePhase::GameOver => {
                self.events.sound(SoundKind::Coin);
                self.set_phase(GamePhase::LevelSelect);
            }
            phase => log::debug!("Ignoring level select from {phase:?}"),
        }
    }

    /// Level select, win, or game over -> menu
    pub fn back_to_menu(&mut self) {
        match self.phase {
            GamePhase::LevelSelect | GamePhase::Win | GamePhase::GameOver => {
                self.events.sound(SoundKind::Coin);
                self.summary = None;
                self.set_phase(GamePhase::Menu);
            }
            phase => log::debug!("Ignoring menu navigation from {phase:?}"),
        }
    }

    /// Pick a level on the level-select screen.
    ///
    /// Out-of-range levels are rejected before anything changes. Locked
    /// levels queue a toast and the rejection sound and change nothing else.
    pub fn select_level(&mut self, level: u32) -> Result<Selection, GameError> {
        let level = GameError::check_level(level)?;
        if self.phase != GamePhase::LevelSelect {
            log::debug!("Ignoring selection of level {level} from {:?}", self.phase);
            return Ok(Selection::Ignored);
        }
        if !self.progress.is_unlocked(level) {
            log::debug!("Level {level} is locked");
            self.events.sound(SoundKind::GameOver);
            self.events.toast("Complete previous level to unlock!");
            return Ok(Selection::Locked);
        }
        self.start_level(level)?;
        self.events.sound(SoundKind::Jump);
        Ok(Selection::Started)
    }

    /// Replay the last level from the win or game over screen
    pub fn restart_level(&mut self) -> Result<bool, GameError> {
        if !matches!(self.phase, GamePhase::Win | GamePhase::GameOver) {
            return Ok(false);
        }
        self.start_level(self.current_level)?;
        self.events.sound(SoundKind::Coin);
        Ok(true)
    }

    /// Advance to the following level after a win
    pub fn next_level(&mut self) -> Result<bool, GameError> {
        if self.phase != GamePhase::Win || self.current_level >= LEVEL_COUNT {
            return Ok(false);
        }
        self.start_level(self.current_level + 1)?;
        self.events.sound(SoundKind::Jump);
        Ok(true)
    }

    /// Pause or resume. Pausing halts both drivers; resuming restarts them
    /// from zero so no stale time is replayed.
    pub fn toggle_pause(&mut self) {
        match self.phase {
            GamePhase::Playing => {
                self.drivers.stop();
                self.set_phase(GamePhase::Paused);
                self.events.toast("Game Paused - Press P to Resume");
            }
            GamePhase::Paused => {
                self.drivers.start();
                self.set_phase(GamePhase::Playing);
                self.events.toast("Game Resumed!");
            }
            phase => log::debug!("Ignoring pause toggle from {phase:?}"),
        }
    }

    /// Abandon the current run. Score and lives are discarded; facts
    /// already persisted stay.
    pub fn exit_to_menu(&mut self) {
        if !matches!(self.phase, GamePhase::Playing | GamePhase::Paused) {
            return;
        }
        log::info!("Abandoned level {}", self.current_level);
        self.drivers.stop();
        self.session = None;
        self.input = TickInput::default();
        self.events.sound(SoundKind::GameOver);
        self.set_phase(GamePhase::Menu);
    }

    // === Time ===

    /// Feed elapsed wall time; runs whatever frames and countdown seconds
    /// are due
    pub fn update(&mut self, elapsed: f32) {
        let steps = self.drivers.advance(elapsed);
        for _ in 0..steps.frames {
            if self.phase != GamePhase::Playing {
                return;
            }
            self.frame();
        }
        for _ in 0..steps.seconds {
            if self.phase != GamePhase::Playing {
                return;
            }
            self.second_elapsed();
        }
    }

    /// Run one simulation tick. No-op unless playing.
    ///
    /// A tick that faults is rolled back: the frame is dropped, logged, and
    /// the next frame runs from the pre-fault state.
    pub fn frame(&mut self) {
        if self.phase != GamePhase::Playing {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let snapshot = session.snapshot();
        let ticks = session.time_ticks;
        let mut pending = EventQueue::new();
        let outcome = match tick(session, &self.input, &self.tuning, SIM_DT, &mut pending) {
            Ok(outcome) => outcome,
            Err(e) => {
                log::error!("Dropping frame at tick {ticks}: {e}");
                session.restore(snapshot);
                return;
            }
        };
        self.events.append(&mut pending);
        self.events.hud(session.hud());

        match outcome {
            TickOutcome::Continue => {}
            TickOutcome::LevelComplete => self.finish_run(true),
            TickOutcome::GameOver => self.finish_run(false),
        }
    }

    /// Count down one second of play. No-op unless playing.
    pub fn second_elapsed(&mut self) {
        if self.phase != GamePhase::Playing {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let time_up = session.countdown();
        self.events.hud(session.hud());
        if time_up {
            log::info!("Level {}: time up", session.level);
            self.finish_run(false);
        }
    }

    // === Internals ===

    fn set_phase(&mut self, phase: GamePhase) {
        log::debug!("Phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        self.events.screen(phase);
    }

    /// (Re)initialize a run. Fails without touching any state if the level
    /// cannot be generated.
    fn start_level(&mut self, level: u32) -> Result<(), GameError> {
        let layout = self.catalog.generate(level)?;
        let session = Session::new(layout);
        log::info!(
            "Starting level {} ({}) with {}s, {} coins, {} enemies",
            level,
            level_name(level),
            session.time_left,
            session.total_coins(),
            session.enemies.len()
        );

        self.events.hud(session.hud());
        self.session = Some(session);
        self.current_level = level;
        self.summary = None;
        self.input = TickInput::default();
        self.drivers.start();
        self.set_phase(GamePhase::Playing);
        self.events
            .toast(format!("Level {level} - {}!", level_name(level)));
        Ok(())
    }

    /// End the active run as a win or game over
    fn finish_run(&mut self, won: bool) {
        self.drivers.stop();
        let Some(session) = self.session.take() else {
            return;
        };
        let level = session.level;

        let mut next_level = None;
        if won {
            if let Err(e) = self.progress.mark_completed(level) {
                log::warn!("Could not mark level {level} completed: {e}");
            }
            if level < LEVEL_COUNT {
                match self.progress.unlock(level + 1) {
                    Ok(_) => next_level = Some(level + 1),
                    Err(e) => log::warn!("Could not unlock level {}: {e}", level + 1),
                }
                self.events
                    .toast(format!("Level {level} Complete! Next level unlocked!"));
            }
        }

        let new_high_score = self.progress.submit_score(session.score);
        let summary = RunSummary {
            level,
            won,
            score: session.score,
            coins_collected: session.coins_collected,
            total_coins: session.total_coins(),
            new_high_score,
            next_level,
            achievement: achievement(level, won, session.score),
        };
        log::info!(
            "Level {} {} with score {} ({}/{} coins)",
            level,
            if won { "won" } else { "lost" },
            summary.score,
            summary.coins_collected,
            summary.total_coins
        );

        self.summary = Some(summary);
        self.input = TickInput::default();
        self.events.sound(if won {
            SoundKind::Coin
        } else {
            SoundKind::GameOver
        });
        self.set_phase(if won {
            GamePhase::Win
        } else {
            GamePhase::GameOver
        });
    }
}

/// Line of praise for the results screen
pub fn achievement(level: u32, won: bool, score: u64) -> String {
    if won {
        return if level >= LEVEL_COUNT {
            format!("INCREDIBLE! You beat ALL {LEVEL_COUNT} levels! Master Champion!")
        } else {
            format!("Level {level} Complete! Level {} is now unlocked!", level + 1)
        };
    }
    match score {
        500.. => "AMAZING! So close to victory!",
        400.. => "GREAT PERFORMANCE! Keep pushing!",
        300.. => "GOOD EFFORT! You can do it!",
        200.. => "NICE TRY! Practice makes perfect!",
        100.. => "KEEP GOING! You're learning!",
        _ => "DON'T GIVE UP! Try again!",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{KeyValueStore, MemoryStore};
    use crate::sim::{Enemy, Hud};
    use glam::Vec2;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct SharedStore(Rc<RefCell<MemoryStore>>);

    impl KeyValueStore for SharedStore {
        fn get(&self, key: &str) -> Result<Option<String>, GameError> {
            self.0.borrow().get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), GameError> {
            self.0.borrow_mut().set(key, value)
        }
    }

    fn controller() -> SessionController {
        SessionController::new(
            Tuning::default(),
            Progress::load(Box::new(MemoryStore::new())),
            DEFAULT_LEVEL_SEED,
        )
    }

    fn playing(level: u32) -> SessionController {
        let mut c = controller();
        c.open_level_select();
        for l in 2..=level {
            c.progress.unlock(l).unwrap();
        }
        assert_eq!(c.select_level(level), Ok(Selection::Started));
        c.drain_events();
        c
    }

    fn sounds(events: &[GameEvent], kind: SoundKind) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::PlaySound(k) if *k == kind))
            .count()
    }

    #[test]
    fn test_menu_to_playing() {
        let mut c = controller();
        assert_eq!(c.phase(), GamePhase::Menu);
        c.open_level_select();
        assert_eq!(c.phase(), GamePhase::LevelSelect);
        assert_eq!(c.select_level(1), Ok(Selection::Started));
        assert_eq!(c.phase(), GamePhase::Playing);
        assert!(c.drivers_running());

        let session = c.session().unwrap();
        assert_eq!(session.score, 0);
        assert_eq!(session.lives, START_LIVES);
        assert_eq!(session.time_left, 210);

        let events = c.drain_events();
        assert!(events.contains(&GameEvent::UpdateScreen(GamePhase::Playing)));
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::ShowToast { text, .. } if text == "Level 1 - Tutorial!"
        )));
    }

    #[test]
    fn test_locked_selection_changes_nothing() {
        let mut c = controller();
        c.open_level_select();
        c.drain_events();

        assert_eq!(c.select_level(2), Ok(Selection::Locked));
        assert_eq!(c.phase(), GamePhase::LevelSelect);
        assert!(c.session().is_none());
        let events = c.drain_events();
        assert_eq!(sounds(&events, SoundKind::GameOver), 1);
        assert!(events.iter().any(|e| matches!(e, GameEvent::ShowToast { .. })));
        assert!(!events.iter().any(|e| matches!(e, GameEvent::UpdateScreen(_))));
    }

    #[test]
    fn test_invalid_level_rejected_first() {
        let mut c = controller();
        c.open_level_select();
        c.drain_events();
        assert_eq!(c.select_level(0), Err(GameError::InvalidLevel(0)));
        assert_eq!(c.select_level(42), Err(GameError::InvalidLevel(42)));
        assert_eq!(c.phase(), GamePhase::LevelSelect);
        assert!(c.drain_events().is_empty());
    }

    #[test]
    fn test_selection_outside_level_select_ignored() {
        let mut c = controller();
        assert_eq!(c.select_level(1), Ok(Selection::Ignored));
        assert_eq!(c.phase(), GamePhase::Menu);
    }

    #[test]
    fn test_pause_halts_ticks_and_countdown() {
        let mut c = playing(1);
        c.toggle_pause();
        assert_eq!(c.phase(), GamePhase::Paused);
        assert!(!c.drivers_running());

        let before = c.session().unwrap().clone();
        for _ in 0..50 {
            c.update(0.1);
        }
        c.frame();
        c.second_elapsed();
        let after = c.session().unwrap();
        assert_eq!(after.time_ticks, before.time_ticks);
        assert_eq!(after.time_left, before.time_left);

        c.toggle_pause();
        assert_eq!(c.phase(), GamePhase::Playing);
        assert!(c.drivers_running());
        c.update(1.0 / 60.0 + 0.001);
        assert_eq!(c.session().unwrap().time_ticks, before.time_ticks + 1);
    }

    #[test]
    fn test_countdown_emits_hud() {
        let mut c = playing(1);
        c.second_elapsed();
        let events = c.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::UpdateHud(Hud { time_left: 209, .. })
        )));
    }

    #[test]
    fn test_time_out_is_game_over_and_records_high_score() {
        let shared = SharedStore::default();
        let mut c = SessionController::new(
            Tuning::default(),
            Progress::load(Box::new(shared.clone())),
            DEFAULT_LEVEL_SEED,
        );
        c.open_level_select();
        c.select_level(1).unwrap();
        {
            let session = c.session.as_mut().unwrap();
            session.lives = 1;
            session.time_left = 1;
            session.score = 70;
        }
        c.second_elapsed();

        assert_eq!(c.phase(), GamePhase::GameOver);
        assert!(!c.drivers_running());
        assert!(c.session().is_none());
        assert_eq!(c.progress().high_score(), 70);
        assert_eq!(
            shared.0.borrow().get("arnabHighScore").unwrap().as_deref(),
            Some("70")
        );
        let summary = c.summary().unwrap();
        assert!(!summary.won);
        assert!(summary.new_high_score);
        assert_eq!(summary.next_level, None);
    }

    #[test]
    fn test_lower_score_keeps_high_score() {
        let mut c = playing(1);
        c.progress.submit_score(1000);
        c.session.as_mut().unwrap().time_left = 1;
        c.session.as_mut().unwrap().score = 20;
        c.second_elapsed();
        assert_eq!(c.progress().high_score(), 1000);
        assert!(!c.summary().unwrap().new_high_score);
    }

    #[test]
    fn test_flag_on_level_one_unlocks_two() {
        let shared = SharedStore::default();
        let mut c = SessionController::new(
            Tuning::default(),
            Progress::load(Box::new(shared.clone())),
            DEFAULT_LEVEL_SEED,
        );
        c.open_level_select();
        c.select_level(1).unwrap();
        {
            let session = c.session.as_mut().unwrap();
            session.enemies.clear();
            let flag = session.flag.rect;
            session.player.pos = Vec2::new(flag.x - 25.0, flag.y - 5.0);
        }
        c.frame();

        assert_eq!(c.phase(), GamePhase::Win);
        assert!(c.progress().is_completed(1));
        assert!(c.progress().is_unlocked(2));
        let store = shared.0.borrow();
        assert_eq!(store.get("level1Completed").unwrap().as_deref(), Some("true"));
        assert_eq!(store.get("unlockedLevels").unwrap().as_deref(), Some("[1,2]"));
        drop(store);

        let summary = c.summary().unwrap().clone();
        assert!(summary.won);
        assert_eq!(summary.score, WIN_SCORE);
        assert_eq!(summary.next_level, Some(2));
        let statuses = c.level_statuses();
        assert_eq!(statuses[0], (1, LevelStatus::Completed));
        assert_eq!(statuses[1], (2, LevelStatus::Unlocked));
        assert_eq!(statuses[2], (3, LevelStatus::Locked));

        assert_eq!(c.next_level(), Ok(true));
        assert_eq!(c.phase(), GamePhase::Playing);
        assert_eq!(c.session().unwrap().level, 2);
    }

    #[test]
    fn test_final_level_win_offers_no_next() {
        let mut c = playing(LEVEL_COUNT);
        {
            let session = c.session.as_mut().unwrap();
            session.enemies.clear();
            let flag = session.flag.rect;
            session.player.pos = Vec2::new(flag.x - 25.0, flag.y - 5.0);
        }
        c.frame();
        assert_eq!(c.phase(), GamePhase::Win);
        assert_eq!(c.summary().unwrap().next_level, None);
        assert_eq!(c.next_level(), Ok(false));
        assert!(c.summary().unwrap().achievement.contains("ALL"));
    }

    #[test]
    fn test_stomp_scenario() {
        let mut c = playing(1);
        {
            let session = c.session.as_mut().unwrap();
            session.coins.clear();
            session.enemies = vec![Enemy::new(600.0, 530.0, 60.0, 0.0, 2000.0)];
            // Falling onto the enemy's top
            session.player.pos = Vec2::new(595.0, 530.0 - 70.0 + 2.0);
            session.player.vel.y = 300.0;
        }
        c.frame();

        let session = c.session().unwrap();
        assert!(session.enemies[0].defeated);
        assert_eq!(session.score, STOMP_SCORE);
        assert!(session.player.vel.y < 0.0);
        assert_eq!(session.lives, START_LIVES);
    }

    #[test]
    fn test_exit_discards_run() {
        let mut c = playing(1);
        c.session.as_mut().unwrap().score = 999;
        c.exit_to_menu();
        assert_eq!(c.phase(), GamePhase::Menu);
        assert!(c.session().is_none());
        assert!(!c.drivers_running());
        assert_eq!(c.progress().high_score(), 0);
    }

    #[test]
    fn test_restart_after_game_over() {
        let mut c = playing(1);
        c.session.as_mut().unwrap().time_left = 1;
        c.second_elapsed();
        assert_eq!(c.phase(), GamePhase::GameOver);

        assert_eq!(c.restart_level(), Ok(true));
        assert_eq!(c.phase(), GamePhase::Playing);
        assert_eq!(c.session().unwrap().time_left, 210);
        assert_eq!(c.session().unwrap().lives, START_LIVES);
    }

    #[test]
    fn test_faulted_frame_is_rolled_back() {
        let mut c = playing(1);
        {
            let session = c.session.as_mut().unwrap();
            session.player.pos.x = f32::NAN;
        }
        let ticks = c.session().unwrap().time_ticks;
        c.frame();
        assert_eq!(c.phase(), GamePhase::Playing);
        let session = c.session().unwrap();
        assert_eq!(session.time_ticks, ticks);
        assert!(session.player.pos.x.is_nan());
        assert!(!session.platforms.is_empty());
        assert!(c.drain_events().is_empty());
    }

    #[test]
    fn test_unlocked_set_never_shrinks() {
        let mut c = playing(1);
        let mut last = c.progress().unlocked_levels().len();
        for _ in 0..3 {
            {
                let session = c.session.as_mut().unwrap();
                session.enemies.clear();
                let flag = session.flag.rect;
                session.player.pos = Vec2::new(flag.x - 25.0, flag.y - 5.0);
            }
            c.frame();
            let now = c.progress().unlocked_levels().len();
            assert!(now >= last);
            last = now;
            c.next_level().unwrap();
        }
        assert_eq!(last, 4);
    }

    #[test]
    fn test_achievement_thresholds() {
        assert_eq!(achievement(1, false, 0), "DON'T GIVE UP! Try again!");
        assert_eq!(achievement(1, false, 100), "KEEP GOING! You're learning!");
        assert_eq!(achievement(1, false, 550), "AMAZING! So close to victory!");
        assert!(achievement(2, true, 10).contains("Level 3"));
    }
}
