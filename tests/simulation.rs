//! End-to-end simulation scenarios driven through recording sinks.

use std::cell::RefCell;
use std::rc::Rc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use flappy_term::bird::{BOB_ACCEL, BOB_SPEED, JUMP_VELOCITY, RUN_GRAVITY};
use flappy_term::game::{CANVAS_H, CANVAS_W, FLOOR_H, Game, Phase, SCROLL_SPEED};
use flappy_term::pipe::{MAX_SEPARATION, MIN_SEPARATION, PIPE_W};
use flappy_term::sinks::{AudioSink, Cue, Rect, RenderSink, ScoreStore, Sprite};

/// Captures the draw instructions of the most recent frame.
#[derive(Default)]
struct RecordingRender {
    draws: Vec<(Sprite, Rect)>,
    texts: Vec<String>,
    dims: u32,
}

impl RenderSink for RecordingRender {
    fn clear(&mut self) {
        self.draws.clear();
        self.texts.clear();
        self.dims = 0;
    }

    fn sprite_size(&self, sprite: Sprite) -> (f64, f64) {
        match sprite {
            Sprite::Digit(_) => (24.0, 36.0),
            Sprite::GameOver => (192.0, 42.0),
            _ => (1.0, 1.0),
        }
    }

    fn draw(&mut self, sprite: Sprite, dst: Rect, _deg: f64) {
        self.draws.push((sprite, dst));
    }

    fn text(&mut self, _cx: f64, _y: f64, s: &str) {
        self.texts.push(s.to_string());
    }

    fn dim(&mut self) {
        self.dims += 1;
    }
}

#[derive(Default)]
struct RecordingAudio {
    cues: Vec<Cue>,
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, cue: Cue) {
        self.cues.push(cue);
    }
}

#[derive(Default, Clone)]
struct SharedStore {
    inner: Rc<RefCell<(Option<u32>, Vec<u32>)>>,
}

impl SharedStore {
    fn with_best(best: u32) -> Self {
        let store = Self::default();
        store.inner.borrow_mut().0 = Some(best);
        store
    }

    fn saves(&self) -> Vec<u32> {
        self.inner.borrow().1.clone()
    }
}

impl ScoreStore for SharedStore {
    fn load(&mut self) -> Option<u32> {
        self.inner.borrow().0
    }

    fn save(&mut self, score: u32) {
        let mut inner = self.inner.borrow_mut();
        inner.0 = Some(score);
        inner.1.push(score);
    }
}

struct Harness {
    game: Game,
    store: SharedStore,
    rng: ChaCha8Rng,
    render: RecordingRender,
    audio: RecordingAudio,
}

impl Harness {
    fn new(best: Option<u32>, seed: u64) -> Self {
        let store = match best {
            Some(best) => SharedStore::with_best(best),
            None => SharedStore::default(),
        };
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let game = Game::new(Box::new(store.clone()), &mut rng);
        Self {
            game,
            store,
            rng,
            render: RecordingRender::default(),
            audio: RecordingAudio::default(),
        }
    }

    fn tick(&mut self, timestamp_ms: f64) {
        self.game
            .tick(timestamp_ms, &mut self.rng, &mut self.render, &mut self.audio);
    }

    fn press(&mut self, timestamp_ms: f64) {
        self.game
            .handle_input(timestamp_ms, &mut self.rng, &mut self.audio);
    }
}

#[test]
fn first_tick_establishes_baseline_without_motion() {
    let mut h = Harness::new(None, 1);
    assert_eq!(h.game.phase, Phase::Ready);
    let x0 = h.game.bird.x;
    let y0 = h.game.bird.y;
    assert_eq!(x0, CANVAS_W * 0.4);
    assert_eq!(y0, CANVAS_H / 2.0 - h.game.bird.h / 2.0);

    h.tick(987654.0);
    assert_eq!(h.game.bird.x, x0);
    assert_eq!(h.game.bird.y, y0);
}

#[test]
fn ready_bob_never_leaves_the_midline_band() {
    let mut h = Harness::new(None, 2);
    let mid = CANVAS_H / 2.0 - h.game.bird.h / 2.0;
    for i in 1..400 {
        h.tick(i as f64 * 16.0);
        assert!((h.game.bird.y - mid).abs() < 40.0);
        assert_eq!(h.game.phase, Phase::Ready);
    }
}

#[test]
fn start_transition_arms_gravity_and_scroll() {
    let mut h = Harness::new(None, 3);
    h.tick(16.0);
    h.press(20.0);
    assert_eq!(h.game.phase, Phase::Running);
    assert_eq!(h.game.bird.v, JUMP_VELOCITY);
    assert_eq!(h.game.bird.a, RUN_GRAVITY);
    assert!(h.game.pipes.iter().all(|p| p.u == SCROLL_SPEED));
    assert_eq!(h.audio.cues, vec![Cue::Flap]);

    // The clock re-baselined: the first running frame moves nothing.
    let y0 = h.game.bird.y;
    h.tick(500.0);
    assert_eq!(h.game.bird.y, y0);
    // From then on gravity integrates normally.
    h.tick(600.0);
    assert!((h.game.bird.v - (JUMP_VELOCITY + RUN_GRAVITY * 0.1)).abs() < 1e-9);
}

#[test]
fn running_physics_follow_semi_implicit_euler() {
    let mut h = Harness::new(None, 4);
    h.press(0.0);
    h.tick(0.0); // baseline
    h.game.bird.y = 100.0;
    h.game.bird.v = 0.0;
    let pipe_x_before: Vec<f64> = h.game.pipes.iter().map(|p| p.x).collect();

    h.tick(100.0); // dt = 0.1
    assert!((h.game.bird.v - 80.0).abs() < 1e-9);
    assert!((h.game.bird.y - 108.0).abs() < 1e-9);
    for (pipe, x0) in h.game.pipes.iter().zip(pipe_x_before) {
        assert!((pipe.x - (x0 - 15.0)).abs() < 1e-9);
    }
}

#[test]
fn pass_scores_exactly_once_per_pipe() {
    let mut h = Harness::new(None, 5);
    h.press(0.0);
    h.tick(0.0);

    // Put pipe 0 just ahead of the bird with a gap around it; park the
    // other pipes far away.
    let bird_x = h.game.bird.x;
    h.game.pipes.pipes[0].x = bird_x - PIPE_W + 10.0;
    h.game.pipes.pipes[0].bottom_of_top = 150.0;
    h.game.pipes.pipes[0].top_of_bottom = 350.0;
    h.game.pipes.pipes[1].x = 2000.0;
    h.game.pipes.pipes[2].x = 3000.0;
    // Keep the bird inside the gap the whole way.
    h.game.bird.v = 0.0;
    h.game.bird.a = 0.0;

    let mut total = 0u32;
    for i in 1..=20 {
        h.tick(i as f64 * 16.0);
        total = h.game.score;
        assert!(h.game.phase == Phase::Running, "unexpected stop at frame {i}");
    }
    assert_eq!(total, 1, "one traversal must score one point");
    assert_eq!(
        h.audio.cues.iter().filter(|c| **c == Cue::Point).count(),
        1
    );
}

#[test]
fn pipe_collision_stops_scroll_and_drops_the_bird() {
    let mut h = Harness::new(None, 6);
    h.press(0.0);
    h.tick(0.0);

    let bird_x = h.game.bird.x;
    h.game.pipes.pipes[0].x = bird_x - 5.0;
    h.game.pipes.pipes[0].bottom_of_top = 400.0;
    h.game.pipes.pipes[0].top_of_bottom = 430.0;
    h.game.bird.v = 0.0;
    h.audio.cues.clear();

    h.tick(16.0);
    assert_eq!(h.game.phase, Phase::Stopped);
    assert!(h.game.pipes.iter().all(|p| p.u == 0.0));
    assert!(h.game.bird.v >= 200.0);
    assert_eq!(h.game.bird.dphi, 10.0);
    assert_eq!(h.audio.cues, vec![Cue::Hit, Cue::Die]);
    assert!(!h.game.is_game_over());

    // Physics stay live: the bird keeps falling until it grounds, and only
    // then does the game-over screen come up.
    let mut t = 16.0;
    while !h.game.is_game_over() {
        t += 16.0;
        assert!(t < 5000.0, "bird never grounded");
        h.tick(t);
    }
    assert_eq!(h.game.bird.v, 0.0);
    assert_eq!(h.game.bird.a, 0.0);
    assert_eq!(h.render.dims, 1);
    assert!(h.render.texts.iter().any(|s| s == "SCORE"));
}

#[test]
fn grounding_updates_best_score_monotonically() {
    let mut h = Harness::new(Some(3), 7);
    h.press(0.0);
    h.game.score = 5;
    h.game.bird.y = CANVAS_H - FLOOR_H - h.game.bird.h;
    h.tick(16.0);
    assert_eq!(h.game.best, 5);
    assert_eq!(h.store.saves(), vec![5]);

    // A worse run afterwards leaves the record alone.
    h.press(32.0); // restart
    h.press(48.0); // start
    h.game.score = 2;
    h.game.bird.y = CANVAS_H - FLOOR_H - h.game.bird.h;
    h.tick(64.0);
    assert_eq!(h.game.best, 5);
    assert_eq!(h.store.saves(), vec![5]);
}

#[test]
fn restart_is_idempotent_regardless_of_history() {
    let snapshot = |game: &Game| {
        (
            game.bird.x,
            game.bird.y,
            game.bird.v,
            game.bird.a,
            game.bird.phi,
            game.bird.dphi,
            game.score,
        )
    };

    // History A: immediate ground slide.
    let mut a = Harness::new(Some(1), 8);
    a.press(0.0);
    a.game.bird.y = CANVAS_H - FLOOR_H - a.game.bird.h;
    a.tick(16.0);
    a.press(32.0);

    // History B: pipe crash at altitude, long tumble, then ground.
    let mut b = Harness::new(Some(1), 9);
    b.press(0.0);
    b.tick(0.0);
    b.game.pipes.pipes[0].x = b.game.bird.x - 5.0;
    b.game.pipes.pipes[0].bottom_of_top = 400.0;
    b.game.pipes.pipes[0].top_of_bottom = 430.0;
    b.game.score = 7;
    b.tick(16.0);
    let mut t = 16.0;
    while !b.game.is_game_over() {
        t += 16.0;
        b.tick(t);
    }
    b.press(t + 16.0);

    assert_eq!(a.game.phase, Phase::Ready);
    assert_eq!(b.game.phase, Phase::Ready);
    assert_eq!(snapshot(&a.game), snapshot(&b.game));
    assert_eq!(a.game.bird.v, BOB_SPEED);
    assert_eq!(a.game.bird.a, BOB_ACCEL);
}

#[test]
fn recycled_pipes_keep_their_separation_contract() {
    use flappy_term::pipe::PipeSet;

    let mut rng = ChaCha8Rng::seed_from_u64(10);
    let mut set = PipeSet::new(&mut rng);
    set.set_scroll(SCROLL_SPEED);

    // An anchor that advances after the respawn shifts the measured gap by
    // at most one frame of scroll.
    let frame_slack = -SCROLL_SPEED * 0.016 + 1e-9;

    let mut recycles = 0;
    let mut prev_xs: Vec<f64> = set.iter().map(|p| p.x).collect();
    for _ in 0..5000 {
        set.update(0.016, &mut rng);
        for (slot, pipe) in set.iter().enumerate() {
            if pipe.x > prev_xs[slot] {
                // This pipe respawned this frame.
                recycles += 1;
                let anchor = &set.pipes[(slot + 2) % 3];
                let gap_to_anchor = pipe.x - anchor.right();
                assert!(
                    gap_to_anchor >= MIN_SEPARATION - 1e-9
                        && gap_to_anchor <= MAX_SEPARATION + frame_slack,
                    "separation {gap_to_anchor} out of contract"
                );
            }
        }
        prev_xs = set.iter().map(|p| p.x).collect();
    }
    assert!(recycles >= 10, "expected sustained recycling, saw {recycles}");
}

#[test]
fn ceiling_clamp_holds_under_spammed_jumps() {
    let mut h = Harness::new(None, 11);
    h.press(0.0);
    for i in 1..200 {
        let t = i as f64 * 16.0;
        h.press(t);
        h.tick(t);
        // The clamp allows at most a one-frame excursion above the screen.
        assert!(h.game.bird.y >= JUMP_VELOCITY * 0.016 * 2.0);
        assert!(h.game.bird.phi <= 90.0);
    }
}

#[test]
fn score_digits_are_drawn_only_while_running() {
    let mut h = Harness::new(None, 12);
    h.tick(16.0);
    assert!(
        !h.render
            .draws
            .iter()
            .any(|(s, _)| matches!(s, Sprite::Digit(_)))
    );
    assert!(h.render.texts.iter().any(|s| s == "PRESS SPACE"));

    h.press(20.0);
    h.tick(32.0);
    assert!(
        h.render
            .draws
            .iter()
            .any(|(s, _)| matches!(s, Sprite::Digit(0)))
    );
}

#[test]
fn missing_best_score_defaults_to_zero_and_seeds_the_store() {
    let h = Harness::new(None, 13);
    assert_eq!(h.game.best, 0);
    assert_eq!(h.store.saves(), vec![0]);
}
