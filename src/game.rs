//! Game controller: the phase machine, score keeping, and the per-frame tick.

use rand::Rng;

use crate::bird::{Bird, RUN_GRAVITY};
use crate::clock::FrameClock;
use crate::pipe::{HEAD_H, PipeSet};
use crate::sinks::{AudioSink, Cue, FlapFrame, Rect, RenderSink, ScoreStore, Sprite};

/// Virtual canvas the simulation runs in; the render sink scales it to the
/// terminal. Matches the classic 288x512 sprite geometry, so the physics
/// constants below are in those units.
pub const CANVAS_W: f64 = 288.0;
pub const CANVAS_H: f64 = 512.0;
pub const FLOOR_H: f64 = 112.0;

/// Horizontal speed shared by the pipes and the floor strip while running.
pub const SCROLL_SPEED: f64 = -150.0;

/// Falling for longer than this after a jump starts the nose-down spin.
const SPIN_DELAY_MS: f64 = 600.0;
const SPIN_RATE: f64 = 8.0;

/// On a pipe hit the bird is flung down at least this fast and tumbles.
const CRASH_MIN_SPEED: f64 = 200.0;
const CRASH_SPIN_RATE: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Idle bob, waiting for the first input.
    Ready,
    /// Gravity and scroll active.
    Running,
    /// Scroll frozen after a hit; physics wind down until the bird grounds.
    Stopped,
}

pub struct Game {
    pub phase: Phase,
    pub score: u32,
    pub best: u32,
    pub bird: Bird,
    pub pipes: PipeSet,
    clock: FrameClock,
    floor_x: f64,
    floor_u: f64,
    /// Set once the bird has grounded; arms the restart input and keeps the
    /// game-over screen up.
    game_over: bool,
    store: Box<dyn ScoreStore>,
}

impl Game {
    /// Build a fresh game in the ready phase. A missing best-score record
    /// means no game was ever finished here; a zero record is written so
    /// the store is warm from the first launch.
    pub fn new(mut store: Box<dyn ScoreStore>, rng: &mut impl Rng) -> Self {
        let best = match store.load() {
            Some(best) => best,
            None => {
                store.save(0);
                0
            }
        };
        let mut bird = Bird::new();
        bird.set_initial_motion(1.0);
        Self {
            phase: Phase::Ready,
            score: 0,
            best,
            bird,
            pipes: PipeSet::new(rng),
            clock: FrameClock::new(),
            floor_x: 0.0,
            floor_u: SCROLL_SPEED,
            game_over: false,
            store,
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Single input entry point: the current phase decides what a primary
    /// press means, so there are no handlers to swap on transitions.
    pub fn handle_input(&mut self, timestamp_ms: f64, rng: &mut impl Rng, audio: &mut dyn AudioSink) {
        match self.phase {
            Phase::Ready => self.start(timestamp_ms, audio),
            Phase::Running => {
                self.bird.jump(timestamp_ms);
                audio.play(Cue::Flap);
            }
            Phase::Stopped => {
                // Ignored until the bird has grounded and the game-over
                // screen is up.
                if self.game_over {
                    self.restart(rng);
                }
            }
        }
    }

    fn start(&mut self, timestamp_ms: f64, audio: &mut dyn AudioSink) {
        self.phase = Phase::Running;
        self.bird.jump(timestamp_ms);
        audio.play(Cue::Flap);
        self.bird.a = RUN_GRAVITY;
        self.pipes.set_scroll(SCROLL_SPEED);
        self.clock.reset();
    }

    fn stop(&mut self) {
        self.phase = Phase::Stopped;
        self.pipes.set_scroll(0.0);
        self.floor_u = 0.0;
    }

    fn handle_pipe_collision(&mut self) {
        self.stop();
        if self.bird.v < CRASH_MIN_SPEED {
            self.bird.v = CRASH_MIN_SPEED;
        }
        self.bird.dphi = CRASH_SPIN_RATE;
    }

    fn handle_floor_collision(&mut self) {
        self.stop();
        self.bird.v = 0.0;
        self.bird.a = 0.0;
        if !self.game_over {
            self.game_over = true;
            if self.score >= self.best {
                self.best = self.score;
                self.store.save(self.best);
            }
        }
    }

    fn restart(&mut self, rng: &mut impl Rng) {
        self.phase = Phase::Ready;
        self.bird.set_initial_position();
        self.bird.set_initial_motion(1.0);
        self.bird.phi = 0.0;
        self.bird.dphi = 0.0;
        self.bird.jump_time_ms = 0.0;
        self.bird.frame = FlapFrame::Mid;
        self.floor_u = SCROLL_SPEED;
        self.score = 0;
        self.pipes.reset(rng);
        self.game_over = false;
    }

    /// One frame. Order is fixed: clock, pipes, bird, floor, draw,
    /// animation bookkeeping, then the fall check and the per-pipe
    /// collision/pass checks.
    pub fn tick(
        &mut self,
        timestamp_ms: f64,
        rng: &mut impl Rng,
        render: &mut dyn RenderSink,
        audio: &mut dyn AudioSink,
    ) {
        let dt = self.clock.tick(timestamp_ms);

        self.pipes.update(dt, rng);
        self.bird.update(dt, self.phase);
        self.update_floor(dt);

        self.draw(render);

        if self.phase == Phase::Running {
            self.bird.animate_flap(timestamp_ms);
            if timestamp_ms - self.bird.jump_time_ms > SPIN_DELAY_MS {
                self.bird.dphi = SPIN_RATE;
            }
        }

        // Ground first: a simultaneous ground and pipe hit is a ground hit.
        if self.phase != Phase::Ready && self.bird.detect_fall() {
            if self.phase == Phase::Running {
                audio.play(Cue::Hit);
            }
            self.handle_floor_collision();
        }

        if self.phase == Phase::Running {
            let mut hit = false;
            let mut passed = 0;
            for pipe in self.pipes.iter() {
                if self.bird.detect_collision(pipe) {
                    hit = true;
                } else if self.bird.detect_pass(pipe) {
                    passed += 1;
                }
            }
            for _ in 0..passed {
                self.score += 1;
                audio.play(Cue::Point);
            }
            if hit {
                audio.play(Cue::Hit);
                audio.play(Cue::Die);
                self.handle_pipe_collision();
            }
        }

        if self.game_over {
            self.draw_game_over(render);
        }
    }

    fn update_floor(&mut self, dt: f64) {
        self.floor_x += self.floor_u * dt;
        if self.floor_x <= -CANVAS_W {
            self.floor_x = 0.0;
        }
    }

    fn draw(&self, render: &mut dyn RenderSink) {
        render.clear();
        for pipe in self.pipes.iter() {
            // Top pipe: body stretched from the ceiling, cap facing down.
            let cap_top = pipe.bottom_of_top - HEAD_H;
            render.draw(
                Sprite::PipeBody { flipped: true },
                Rect::new(pipe.x, 0.0, pipe.w, cap_top.max(0.0)),
                0.0,
            );
            render.draw(
                Sprite::PipeHead { flipped: true },
                Rect::new(pipe.x, cap_top, pipe.w, HEAD_H),
                0.0,
            );
            // Bottom pipe: cap at the gap edge, body down to the floor.
            render.draw(
                Sprite::PipeHead { flipped: false },
                Rect::new(pipe.x, pipe.top_of_bottom, pipe.w, HEAD_H),
                0.0,
            );
            render.draw(
                Sprite::PipeBody { flipped: false },
                Rect::new(
                    pipe.x,
                    pipe.top_of_bottom + HEAD_H,
                    pipe.w,
                    CANVAS_H - pipe.top_of_bottom - HEAD_H,
                ),
                0.0,
            );
        }

        render.draw(
            Sprite::Bird(self.bird.frame),
            Rect::new(self.bird.x, self.bird.y, self.bird.w, self.bird.h),
            self.bird.phi,
        );

        // Two floor strips so the wrap never shows a seam.
        let floor_y = CANVAS_H - FLOOR_H;
        render.draw(
            Sprite::Floor,
            Rect::new(self.floor_x, floor_y, CANVAS_W, FLOOR_H),
            0.0,
        );
        render.draw(
            Sprite::Floor,
            Rect::new(self.floor_x + CANVAS_W, floor_y, CANVAS_W, FLOOR_H),
            0.0,
        );

        match self.phase {
            Phase::Running => self.draw_number(render, self.score, CANVAS_W / 2.0, 50.0),
            Phase::Ready => render.text(CANVAS_W / 2.0, CANVAS_H * 0.22, "PRESS SPACE"),
            Phase::Stopped => {}
        }
    }

    /// Digits laid out centered on `cx`, widths taken from the sink.
    fn draw_number(&self, render: &mut dyn RenderSink, num: u32, cx: f64, y: f64) {
        let digits: Vec<u8> = num.to_string().bytes().map(|b| b - b'0').collect();
        let total: f64 = digits
            .iter()
            .map(|&d| render.sprite_size(Sprite::Digit(d)).0)
            .sum();
        let mut x = cx - total / 2.0;
        for &d in &digits {
            let (w, h) = render.sprite_size(Sprite::Digit(d));
            render.draw(Sprite::Digit(d), Rect::new(x, y, w, h), 0.0);
            x += w;
        }
    }

    fn draw_game_over(&self, render: &mut dyn RenderSink) {
        render.dim();
        let (w, h) = render.sprite_size(Sprite::GameOver);
        render.draw(
            Sprite::GameOver,
            Rect::new(CANVAS_W / 2.0 - w / 2.0, 100.0, w, h),
            0.0,
        );
        render.text(CANVAS_W / 2.0, 200.0, "SCORE");
        self.draw_number(render, self.score, CANVAS_W / 2.0, 220.0);
        render.text(CANVAS_W / 2.0, 300.0, "BEST");
        self.draw_number(render, self.best, CANVAS_W / 2.0, 320.0);
        render.text(CANVAS_W / 2.0, 450.0, "SPACE TO RESTART");
    }
}
