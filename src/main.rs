//! Terminal host: raw-mode lifecycle, input mapping, and the frame loop.

use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
        MouseEventKind,
    },
    execute, terminal,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::io::{self, stdout};
use std::time::{Duration, Instant};

use flappy_term::audio::{Audio, Muted};
use flappy_term::game::Game;
use flappy_term::render::TermRenderer;
use flappy_term::score::BestScoreFile;
use flappy_term::sinks::AudioSink;

fn main() -> io::Result<()> {
    terminal::enable_raw_mode()?;
    let mut out = stdout();
    execute!(
        out,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        terminal::DisableLineWrap,
        EnableMouseCapture,
    )?;

    let cleanup = |out: &mut io::Stdout| -> io::Result<()> {
        execute!(
            out,
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show,
            terminal::EnableLineWrap,
        )?;
        terminal::disable_raw_mode()
    };

    let (cols, rows) = terminal::size()?;
    let mut renderer = TermRenderer::new(cols as usize, rows as usize * 2);

    let mut audio: Box<dyn AudioSink> = match Audio::new() {
        Some(audio) => Box::new(audio),
        None => Box::new(Muted),
    };

    let store = BestScoreFile::new()?;
    let mut rng = SmallRng::from_entropy();
    let mut game = Game::new(Box::new(store), &mut rng);

    // One monotonic epoch feeds both input events and frame ticks.
    let epoch = Instant::now();
    let frame_dur = Duration::from_millis(33); // ~30 fps

    loop {
        let frame_start = Instant::now();

        // Input
        while event::poll(Duration::ZERO)? {
            let now_ms = epoch.elapsed().as_secs_f64() * 1000.0;
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        cleanup(&mut out)?;
                        return Ok(());
                    }
                    KeyCode::Char(' ') | KeyCode::Up | KeyCode::Enter => {
                        game.handle_input(now_ms, &mut rng, audio.as_mut());
                    }
                    _ => {}
                },
                Event::Mouse(mouse) => {
                    if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
                        game.handle_input(now_ms, &mut rng, audio.as_mut());
                    }
                }
                Event::Resize(c, r) => {
                    renderer.resize(c as usize, r as usize * 2);
                }
                _ => {}
            }
        }

        // Update + render
        let now_ms = epoch.elapsed().as_secs_f64() * 1000.0;
        game.tick(now_ms, &mut rng, &mut renderer, audio.as_mut());
        renderer.present(&mut out)?;

        // Frame pacing
        let elapsed = frame_start.elapsed();
        if elapsed < frame_dur {
            std::thread::sleep(frame_dur - elapsed);
        }
    }
}
