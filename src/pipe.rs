//! Scrolling pipe obstacles: a fixed ring of slots recycled off the left edge.

use rand::Rng;

use crate::game::{CANVAS_H, CANVAS_W, FLOOR_H};

/// Number of pipe slots alive at once. Slots are never destroyed, only
/// repositioned, so the set behaves like a ring buffer.
pub const PIPE_COUNT: usize = 3;

pub const PIPE_W: f64 = 52.0;
/// Pipe art geometry: the cap is drawn separately so the body can stretch.
pub const HEAD_H: f64 = 27.0;
pub const BODY_H: f64 = 320.0 - HEAD_H;

pub const MIN_HEIGHT: f64 = 40.0;
pub const MIN_GAP: f64 = 90.0;
pub const MAX_GAP: f64 = 130.0;
pub const MIN_SEPARATION: f64 = 150.0;
pub const MAX_SEPARATION: f64 = 180.0;

#[derive(Debug, Clone)]
pub struct Pipe {
    pub slot: usize,
    pub x: f64,
    pub w: f64,
    /// Shared scroll velocity; 0 or the active scroll speed.
    pub u: f64,
    /// Bottom edge of the top pipe (top of the passable gap).
    pub bottom_of_top: f64,
    /// Top edge of the bottom pipe (bottom of the passable gap).
    pub top_of_bottom: f64,
    /// Right edge one frame ago, read by pass detection.
    pub prev_right: f64,
}

impl Pipe {
    pub fn new(slot: usize, rng: &mut impl Rng) -> Self {
        let mut pipe = Self {
            slot,
            x: 0.0,
            w: PIPE_W,
            u: 0.0,
            bottom_of_top: 0.0,
            top_of_bottom: 0.0,
            prev_right: 0.0,
        };
        pipe.set_initial_position(rng);
        pipe
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    /// Staggered two-screens-out layout used at construction and restart.
    pub fn set_initial_position(&mut self, rng: &mut impl Rng) {
        self.x = CANVAS_W * 2.0 + MAX_SEPARATION * self.slot as f64;
        self.reload_vertical_position(rng);
        self.prev_right = self.right();
    }

    /// Redraw the gap. The draw ranges keep the widest possible gap clear
    /// of both the top of the screen and the floor.
    pub fn reload_vertical_position(&mut self, rng: &mut impl Rng) {
        self.bottom_of_top = rng.gen_range(MIN_HEIGHT..CANVAS_H - FLOOR_H - MIN_HEIGHT - MAX_GAP);
        self.top_of_bottom =
            rng.gen_range(self.bottom_of_top + MIN_GAP..self.bottom_of_top + MAX_GAP);
    }

    /// Respawn to the right of the pipe in the previous slot.
    fn reload_position(&mut self, anchor_right: f64, rng: &mut impl Rng) {
        self.x = anchor_right + rng.gen_range(MIN_SEPARATION..MAX_SEPARATION);
        self.reload_vertical_position(rng);
        // A respawn must never read as a crossing.
        self.prev_right = self.right();
    }

    fn advance(&mut self, dt: f64) {
        self.prev_right = self.right();
        self.x += self.u * dt;
    }
}

/// The fixed-slot obstacle set.
#[derive(Debug)]
pub struct PipeSet {
    pub pipes: Vec<Pipe>,
}

impl PipeSet {
    pub fn new(rng: &mut impl Rng) -> Self {
        let pipes = (0..PIPE_COUNT).map(|slot| Pipe::new(slot, rng)).collect();
        Self { pipes }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pipe> {
        self.pipes.iter()
    }

    pub fn set_scroll(&mut self, u: f64) {
        for pipe in &mut self.pipes {
            pipe.u = u;
        }
    }

    /// Back to the staggered restart layout, with fresh gaps.
    pub fn reset(&mut self, rng: &mut impl Rng) {
        for pipe in &mut self.pipes {
            pipe.set_initial_position(rng);
        }
    }

    /// Scroll every pipe; a pipe fully past the left edge respawns after
    /// the pipe in the previous slot, so ring order keeps the spacing
    /// statistically uniform indefinitely.
    pub fn update(&mut self, dt: f64, rng: &mut impl Rng) {
        for i in 0..self.pipes.len() {
            if self.pipes[i].x < -self.pipes[i].w {
                let prev = (i + self.pipes.len() - 1) % self.pipes.len();
                let anchor_right = self.pipes[prev].right();
                self.pipes[i].reload_position(anchor_right, rng);
            } else {
                self.pipes[i].advance(dt);
            }
        }
    }
}
