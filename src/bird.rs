//! Bird physics: gravity, flapping, rotation, and the hit predicates.

use crate::game::{CANVAS_H, CANVAS_W, FLOOR_H, Phase};
use crate::pipe::Pipe;
use crate::sinks::FlapFrame;

/// Body size in virtual units.
pub const BIRD_SIZE: f64 = 30.0;

/// Upward impulse applied by a jump.
pub const JUMP_VELOCITY: f64 = -280.0;

/// Downward acceleration once the game is running.
pub const RUN_GRAVITY: f64 = 800.0;

/// Ready-phase bob: the bird see-saws around mid-screen under a constant
/// restoring acceleration whose sign flips at each midline crossing.
pub const BOB_ACCEL: f64 = -451.0;
pub const BOB_SPEED: f64 = 91.0;

/// Nose-up angle snapped on each jump.
pub const JUMP_ANGLE: f64 = -20.0;
/// The nose never points past straight down.
pub const MAX_ANGLE: f64 = 90.0;

#[derive(Debug, Clone)]
pub struct Bird {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    /// Vertical velocity, positive downward.
    pub v: f64,
    /// Vertical acceleration, positive downward.
    pub a: f64,
    /// Rotation in degrees, positive nose-down.
    pub phi: f64,
    /// Degrees added to `phi` each frame.
    pub dphi: f64,
    /// Timestamp of the last jump, for rotation onset.
    pub jump_time_ms: f64,
    /// Timestamp of the last wing-cycle restart.
    pub flight_time_ms: f64,
    pub frame: FlapFrame,
}

impl Bird {
    pub fn new() -> Self {
        let mut bird = Self {
            x: 0.0,
            y: 0.0,
            w: BIRD_SIZE,
            h: BIRD_SIZE,
            v: 0.0,
            a: 0.0,
            phi: 0.0,
            dphi: 0.0,
            jump_time_ms: 0.0,
            flight_time_ms: 0.0,
            frame: FlapFrame::Mid,
        };
        bird.set_initial_position();
        bird
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// Fixed horizontal anchor at 40% of the screen, vertically centered.
    pub fn set_initial_position(&mut self) {
        self.x = CANVAS_W * 0.4;
        self.y = CANVAS_H / 2.0 - self.h / 2.0;
    }

    /// Ready-phase swing: `dir` +1 starts moving down, -1 moving up.
    pub fn set_initial_motion(&mut self, dir: f64) {
        self.a = BOB_ACCEL * dir;
        self.v = BOB_SPEED * dir;
    }

    pub fn jump(&mut self, timestamp_ms: f64) {
        self.v = JUMP_VELOCITY;
        self.jump_time_ms = timestamp_ms;
        self.phi = JUMP_ANGLE;
        self.dphi = 0.0;
    }

    /// Advance one frame of physics.
    pub fn update(&mut self, dt: f64, phase: Phase) {
        if phase == Phase::Ready {
            // Bounce off the vertical midline: when the center is about to
            // cross it, snap back to center and flip the swing direction.
            let mid = CANVAS_H / 2.0;
            let center = self.y + self.h / 2.0;
            let behind = center - self.v * dt;
            if (center > mid && behind < mid) || (center < mid && behind > mid) {
                self.y = mid - self.h / 2.0;
                if self.v > 0.0 {
                    self.set_initial_motion(1.0);
                } else {
                    self.set_initial_motion(-1.0);
                }
            }
        } else if self.y < 0.0 {
            // Ceiling: kill the upward motion before integrating.
            self.v = 0.0;
            self.y = 0.0;
        }

        // Velocity first, then position.
        self.v += self.a * dt;
        self.y += self.v * dt;

        self.phi += self.dphi;
        if self.phi > MAX_ANGLE {
            self.phi = MAX_ANGLE;
        }
    }

    /// Within the pipe's horizontal span but outside its vertical gap.
    pub fn detect_collision(&self, pipe: &Pipe) -> bool {
        let overlap = (self.right() > pipe.x && self.right() < pipe.right())
            || (self.x > pipe.x && self.x < pipe.right());
        overlap && (self.y < pipe.bottom_of_top || self.bottom() > pipe.top_of_bottom)
    }

    /// The pipe's trailing edge crossed the bird's x since last frame.
    pub fn detect_pass(&self, pipe: &Pipe) -> bool {
        self.x <= pipe.prev_right && self.x >= pipe.right()
    }

    pub fn detect_fall(&self) -> bool {
        self.bottom() >= CANVAS_H - FLOOR_H
    }

    /// Wing animation: thresholds in ms since the last cycle restart.
    pub fn animate_flap(&mut self, timestamp_ms: f64) {
        let since = timestamp_ms - self.flight_time_ms;
        if since > 300.0 {
            self.frame = FlapFrame::Up;
            self.flight_time_ms = timestamp_ms;
        } else if since > 200.0 {
            self.frame = FlapFrame::Mid;
        } else if since > 100.0 {
            self.frame = FlapFrame::Down;
        }
    }
}

impl Default for Bird {
    fn default() -> Self {
        Self::new()
    }
}
