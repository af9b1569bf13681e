//! Wall-approach round: a wall with the target silhouette closes in and the
//! figure has to be in pose when it arrives.

use crate::{config::WallConfig, types::ControlMode};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WallPhase {
    Approaching,
    Passed,
    Crashed,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WallEvent {
    /// The wall moved closer; `progress` reaches 1.0 on arrival.
    Approaching { progress: f32 },
    /// The wall arrived and the figure was judged on this tick.
    Judged { passed: bool, score: f32 },
    /// The verdict is still on screen.
    Feedback { ticks_left: u32 },
    /// Feedback finished; the caller moves on to the next pose.
    Advance,
}

#[derive(Clone, Debug)]
pub struct WallRound {
    config: WallConfig,
    progress: f32,
    phase: WallPhase,
    feedback_left: u32,
}

impl WallRound {
    pub fn new(config: WallConfig) -> Self {
        Self {
            config,
            progress: 0.0,
            phase: WallPhase::Approaching,
            feedback_left: 0,
        }
    }

    pub fn phase(&self) -> WallPhase {
        self.phase
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Starts a fresh wall at the far end.
    pub fn restart(&mut self) {
        self.progress = 0.0;
        self.phase = WallPhase::Approaching;
        self.feedback_left = 0;
    }

    /// Advances one frame. `score` is the current match score and is only
    /// read on the tick the wall arrives.
    pub fn tick(&mut self, score: f32, mode: ControlMode) -> WallEvent {
        if self.phase != WallPhase::Approaching {
            self.feedback_left = self.feedback_left.saturating_sub(1);
            if self.feedback_left == 0 {
                return WallEvent::Advance;
            }
            return WallEvent::Feedback {
                ticks_left: self.feedback_left,
            };
        }

        self.progress += self.config.speed;
        if self.progress < 1.0 {
            return WallEvent::Approaching {
                progress: self.progress,
            };
        }

        self.progress = 1.0;
        let threshold = self.config.thresholds.for_mode(mode);
        let passed = score >= threshold;
        self.phase = if passed {
            WallPhase::Passed
        } else {
            WallPhase::Crashed
        };
        self.feedback_left = self.config.feedback_ticks;
        log::info!(
            "wall {} ({} mode): score {:.1}, needed {:.0}",
            if passed { "passed" } else { "crashed" },
            mode.label(),
            score,
            threshold
        );
        WallEvent::Judged { passed, score }
    }
}

impl Default for WallRound {
    fn default() -> Self {
        Self::new(WallConfig::default())
    }
}
