//! Output events emitted by the core
//!
//! The host drains these after each call into the core and forwards them to
//! its audio, toast, HUD, and screen collaborators.

use serde::{Deserialize, Serialize};

use super::state::GamePhase;
use crate::consts::TOAST_MS;

/// Sound cues the host should play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundKind {
    Jump,
    Coin,
    GameOver,
}

/// Heads-up display fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hud {
    pub score: u64,
    pub coins_collected: u32,
    pub total_coins: u32,
    pub lives: u8,
    pub level: u32,
    pub time_left: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PlaySound(SoundKind),
    ShowToast { text: String, duration_ms: u32 },
    UpdateHud(Hud),
    UpdateScreen(GamePhase),
}

/// Ordered buffer of pending events
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Vec<GameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn sound(&mut self, kind: SoundKind) {
        self.push(GameEvent::PlaySound(kind));
    }

    pub fn toast(&mut self, text: impl Into<String>) {
        self.push(GameEvent::ShowToast {
            text: text.into(),
            duration_ms: TOAST_MS,
        });
    }

    pub fn hud(&mut self, hud: Hud) {
        self.push(GameEvent::UpdateHud(hud));
    }

    pub fn screen(&mut self, phase: GamePhase) {
        self.push(GameEvent::UpdateScreen(phase));
    }

    /// Move all events from `other` to the end of this queue
    pub fn append(&mut self, other: &mut EventQueue) {
        self.events.append(&mut other.events);
    }

    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn as_slice(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of times a given sound was queued
    pub fn count_sound(&self, kind: SoundKind) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, GameEvent::PlaySound(k) if *k == kind))
            .count()
    }
}
