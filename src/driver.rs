//! Frame and countdown drivers
//!
//! The host reports elapsed wall time; the drivers turn it into whole
//! simulation frames and whole countdown seconds. Stopping discards any
//! partial frame or second, so a resume never replays stale time.

use crate::consts::{MAX_SUBSTEPS, SIM_DT};

/// Largest elapsed time the frame driver accepts per update (tab switches,
/// debugger stops). The countdown always sees the full elapsed time.
const MAX_ELAPSED: f32 = 0.1;

/// Work due after an update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverSteps {
    pub frames: u32,
    pub seconds: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Drivers {
    running: bool,
    frame_accumulator: f32,
    second_accumulator: f32,
}

impl Drivers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) both drivers from a clean slate
    pub fn start(&mut self) {
        self.running = true;
        self.frame_accumulator = 0.0;
        self.second_accumulator = 0.0;
    }

    /// Halt both drivers and drop any partial progress
    pub fn stop(&mut self) {
        self.running = false;
        self.frame_accumulator = 0.0;
        self.second_accumulator = 0.0;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Accumulate `elapsed` seconds and report the frames and seconds due
    pub fn advance(&mut self, elapsed: f32) -> DriverSteps {
        if !self.running || !elapsed.is_finite() || elapsed <= 0.0 {
            return DriverSteps::default();
        }
        self.frame_accumulator += elapsed.min(MAX_ELAPSED);
        let mut frames = 0;
        while self.frame_accumulator >= SIM_DT && frames < MAX_SUBSTEPS {
            self.frame_accumulator -= SIM_DT;
            frames += 1;
        }
        // Too far behind: forget the backlog rather than spiral
        if frames == MAX_SUBSTEPS {
            self.frame_accumulator = self.frame_accumulator.min(SIM_DT);
        }

        self.second_accumulator += elapsed;
        let mut seconds = 0;
        while self.second_accumulator >= 1.0 {
            self.second_accumulator -= 1.0;
            seconds += 1;
        }

        DriverSteps { frames, seconds }
    }
}
