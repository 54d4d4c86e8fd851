//! Terminal render sink: an RGB pixel buffer drawn with half-block glyphs.
//!
//! Sprites arrive as virtual-canvas rectangles and are rasterized
//! procedurally; nothing here is an image file.

use crossterm::{
    cursor, queue,
    style::{self, Color as CColor},
};
use std::io::{self, Write};

use crate::bird::BIRD_SIZE;
use crate::game::{CANVAS_H, CANVAS_W, FLOOR_H};
use crate::pipe::{BODY_H, HEAD_H, PIPE_W};
use crate::sinks::{FlapFrame, Rect, RenderSink, Sprite};

// ── Colors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    const fn lerp(a: Rgb, b: Rgb, t_256: u16) -> Rgb {
        let t = t_256 as i32;
        Rgb(
            (a.0 as i32 + (b.0 as i32 - a.0 as i32) * t / 256) as u8,
            (a.1 as i32 + (b.1 as i32 - a.1 as i32) * t / 256) as u8,
            (a.2 as i32 + (b.2 as i32 - a.2 as i32) * t / 256) as u8,
        )
    }
}

const SKY_TOP: Rgb = Rgb(70, 180, 200);
const SKY_BOT: Rgb = Rgb(190, 232, 245);
const GRASS: Rgb = Rgb(84, 168, 55);
const GRASS_LIGHT: Rgb = Rgb(110, 200, 70);
const DIRT: Rgb = Rgb(210, 185, 110);
const DIRT_DARK: Rgb = Rgb(185, 160, 90);
const PIPE_L: Rgb = Rgb(74, 122, 26);
const PIPE_M: Rgb = Rgb(100, 170, 40);
const PIPE_R: Rgb = Rgb(115, 191, 46);
const PIPE_HI: Rgb = Rgb(145, 215, 62);
const CAP_DARK: Rgb = Rgb(60, 100, 20);
const BIRD_Y: Rgb = Rgb(245, 200, 66);
const BIRD_HI: Rgb = Rgb(255, 225, 100);
const BIRD_WING: Rgb = Rgb(215, 165, 35);
const BIRD_EYE: Rgb = Rgb(255, 255, 255);
const BIRD_PUPIL: Rgb = Rgb(20, 20, 20);
const BIRD_BEAK: Rgb = Rgb(225, 75, 35);
const BIRD_BEAK_HI: Rgb = Rgb(240, 110, 50);
const HILL_FAR: Rgb = Rgb(120, 195, 75);
const HILL_NEAR: Rgb = Rgb(95, 175, 55);
const WHITE: Rgb = Rgb(255, 255, 255);
const SHADOW: Rgb = Rgb(30, 30, 30);

// ── Pixel buffer with half-block rendering ──────────────────────────────────

pub struct PixelBuf {
    w: usize,
    h: usize, // pixel height = terminal rows * 2
    px: Vec<Rgb>,
}

impl PixelBuf {
    fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            px: vec![SKY_TOP; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
        self.px.resize(w * h, SKY_TOP);
    }

    fn set(&mut self, x: i32, y: i32, c: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.px[y as usize * self.w + x as usize] = c;
        }
    }

    fn get(&self, x: usize, y: usize) -> Rgb {
        self.px[y * self.w + x]
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, c: Rgb) {
        for dy in 0..h {
            for dx in 0..w {
                self.set(x + dx, y + dy, c);
            }
        }
    }

    fn render(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(out, cursor::MoveTo(0, 0))?;
        let rows = self.h / 2;
        let mut prev_fg = Rgb(0, 0, 0);
        let mut prev_bg = Rgb(0, 0, 0);
        let mut need_fg = true;
        let mut need_bg = true;

        for row in 0..rows {
            for col in 0..self.w {
                let top = self.get(col, row * 2);
                let bot = self.get(col, row * 2 + 1);

                if top == bot {
                    if need_bg || prev_bg != top {
                        queue!(
                            out,
                            style::SetBackgroundColor(CColor::Rgb {
                                r: top.0,
                                g: top.1,
                                b: top.2
                            })
                        )?;
                        prev_bg = top;
                        need_bg = false;
                    }
                    queue!(out, style::Print(' '))?;
                } else {
                    if need_fg || prev_fg != top {
                        queue!(
                            out,
                            style::SetForegroundColor(CColor::Rgb {
                                r: top.0,
                                g: top.1,
                                b: top.2
                            })
                        )?;
                        prev_fg = top;
                        need_fg = false;
                    }
                    if need_bg || prev_bg != bot {
                        queue!(
                            out,
                            style::SetBackgroundColor(CColor::Rgb {
                                r: bot.0,
                                g: bot.1,
                                b: bot.2
                            })
                        )?;
                        prev_bg = bot;
                        need_bg = false;
                    }
                    queue!(out, style::Print('\u{2580}'))?; // ▀
                }
            }
            if row < rows - 1 {
                queue!(out, style::ResetColor, style::Print("\r\n"))?;
                need_fg = true;
                need_bg = true;
            }
        }
        queue!(out, style::ResetColor)?;
        out.flush()
    }
}

// ── 3x5 bitmap glyphs ───────────────────────────────────────────────────────

#[rustfmt::skip]
const DIGITS: [[u8; 15]; 10] = [
    [1,1,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1], // 0
    [0,1,0, 1,1,0, 0,1,0, 0,1,0, 1,1,1], // 1
    [1,1,1, 0,0,1, 1,1,1, 1,0,0, 1,1,1], // 2
    [1,1,1, 0,0,1, 0,1,1, 0,0,1, 1,1,1], // 3
    [1,0,1, 1,0,1, 1,1,1, 0,0,1, 0,0,1], // 4
    [1,1,1, 1,0,0, 1,1,1, 0,0,1, 1,1,1], // 5
    [1,1,1, 1,0,0, 1,1,1, 1,0,1, 1,1,1], // 6
    [1,1,1, 0,0,1, 0,1,0, 0,1,0, 0,1,0], // 7
    [1,1,1, 1,0,1, 1,1,1, 1,0,1, 1,1,1], // 8
    [1,1,1, 1,0,1, 1,1,1, 0,0,1, 1,1,1], // 9
];

#[rustfmt::skip]
fn letter_glyph(ch: char) -> Option<&'static [u8; 15]> {
    match ch {
        'A' => Some(&[0,1,0, 1,0,1, 1,1,1, 1,0,1, 1,0,1]),
        'B' => Some(&[1,1,0, 1,0,1, 1,1,0, 1,0,1, 1,1,0]),
        'C' => Some(&[0,1,1, 1,0,0, 1,0,0, 1,0,0, 0,1,1]),
        'E' => Some(&[1,1,1, 1,0,0, 1,1,0, 1,0,0, 1,1,1]),
        'G' => Some(&[0,1,1, 1,0,0, 1,0,1, 1,0,1, 0,1,1]),
        'M' => Some(&[1,0,1, 1,1,1, 1,0,1, 1,0,1, 1,0,1]),
        'O' => Some(&[1,1,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1]),
        'P' => Some(&[1,1,0, 1,0,1, 1,1,0, 1,0,0, 1,0,0]),
        'R' => Some(&[1,1,0, 1,0,1, 1,1,0, 1,0,1, 1,0,1]),
        'S' => Some(&[0,1,1, 1,0,0, 0,1,0, 0,0,1, 1,1,0]),
        'T' => Some(&[1,1,1, 0,1,0, 0,1,0, 0,1,0, 0,1,0]),
        'V' => Some(&[1,0,1, 1,0,1, 1,0,1, 1,0,1, 0,1,0]),
        _ => None,
    }
}

fn pipe_shade(x: i32, total_w: i32) -> Rgb {
    if total_w <= 1 {
        return PIPE_M;
    }
    let t = (x as f64 / (total_w - 1) as f64 * 256.0) as u16;
    if t < 64 {
        Rgb::lerp(PIPE_L, PIPE_M, (t * 4).min(256))
    } else if t < 100 {
        Rgb::lerp(PIPE_M, PIPE_HI, ((t - 64) * 7).min(256))
    } else if t < 160 {
        Rgb::lerp(PIPE_HI, PIPE_R, ((t - 100) * 4).min(256))
    } else {
        Rgb::lerp(PIPE_R, PIPE_L, ((t - 160) * 3).min(256))
    }
}

// ── Render sink ─────────────────────────────────────────────────────────────

/// Rasterizes the game's draw instructions into a [`PixelBuf`] and flushes
/// it to the terminal. Virtual x/y are scaled to the buffer independently,
/// so any terminal size works.
pub struct TermRenderer {
    buf: PixelBuf,
    /// Pattern phase for the parallax hills, taken from the floor scroll.
    hill_phase: f64,
}

impl TermRenderer {
    pub fn new(pw: usize, ph: usize) -> Self {
        Self {
            buf: PixelBuf::new(pw.max(1), ph.max(2)),
            hill_phase: 0.0,
        }
    }

    pub fn resize(&mut self, pw: usize, ph: usize) {
        self.buf.resize(pw.max(1), ph.max(2));
    }

    pub fn present(&self, out: &mut impl Write) -> io::Result<()> {
        self.buf.render(out)
    }

    fn to_px(&self, dst: &Rect) -> (i32, i32, i32, i32) {
        let sx = self.buf.w as f64 / CANVAS_W;
        let sy = self.buf.h as f64 / CANVAS_H;
        let x0 = (dst.x * sx).round() as i32;
        let y0 = (dst.y * sy).round() as i32;
        let x1 = ((dst.x + dst.w) * sx).round() as i32;
        let y1 = ((dst.y + dst.h) * sy).round() as i32;
        (x0, y0, (x1 - x0).max(1), (y1 - y0).max(1))
    }

    fn floor_line(&self) -> i32 {
        ((CANVAS_H - FLOOR_H) / CANVAS_H * self.buf.h as f64).round() as i32
    }

    fn blit_sky(&mut self) {
        let sky_h = self.floor_line().max(1) as usize;
        for y in 0..self.buf.h {
            let t = ((y * 256) / sky_h).min(256) as u16;
            let c = Rgb::lerp(SKY_TOP, SKY_BOT, t);
            for x in 0..self.buf.w {
                self.buf.set(x as i32, y as i32, c);
            }
        }
    }

    fn blit_hills(&mut self) {
        let base = self.floor_line();
        let scale = self.buf.h as f64 / 48.0;
        // Far hills
        for x in 0..self.buf.w as i32 {
            let fx = (x as f64 + self.hill_phase * 0.2) * 0.04;
            let h = (fx.sin() * 6.0 + (fx * 1.7).sin() * 3.0) * scale;
            let top = base - h as i32 - (4.0 * scale) as i32;
            for y in top..base {
                self.buf.set(x, y, HILL_FAR);
            }
        }
        // Near hills
        for x in 0..self.buf.w as i32 {
            let fx = (x as f64 + self.hill_phase * 0.4) * 0.06;
            let h = (fx.sin() * 4.0 + (fx * 2.3).sin() * 2.0) * scale;
            let top = base - h as i32 - (2.0 * scale) as i32;
            for y in top..base {
                self.buf.set(x, y, HILL_NEAR);
            }
        }
    }

    fn blit_bird(&mut self, x: i32, y: i32, w: i32, h: i32, deg: f64, frame: FlapFrame) {
        let tilt = if deg < -10.0 {
            -1
        } else if deg > 30.0 {
            1
        } else {
            0
        };

        // Body with a highlight along the back
        self.buf.fill_rect(x, y, w, h, BIRD_Y);
        self.buf.fill_rect(x + 1, y, (w - 2).max(1), 1, BIRD_HI);

        // Wing rides the flap frame
        let wing_y = match frame {
            FlapFrame::Up => y + h / 4,
            FlapFrame::Mid => y + h / 2,
            FlapFrame::Down => y + (h * 3) / 4,
        };
        self.buf.fill_rect(
            x + 1,
            (wing_y + tilt).clamp(y, y + h - 1),
            (w / 3).max(1),
            (h / 3).max(1),
            BIRD_WING,
        );

        // Eye and beak on the leading edge
        let eye_x = x + (w * 2) / 3;
        let eye_y = y + h / 4 + tilt;
        self.buf.set(eye_x, eye_y, BIRD_EYE);
        self.buf.set(eye_x + 1, eye_y, BIRD_PUPIL);

        let beak_y = y + h / 2 + tilt;
        self.buf.fill_rect(x + w - 2, beak_y, 2, (h / 4).max(1), BIRD_BEAK);
        self.buf.set(x + w - 1, beak_y, BIRD_BEAK_HI);
    }

    fn blit_pipe_body(&mut self, x: i32, y: i32, w: i32, h: i32) {
        for dx in 0..w {
            let c = pipe_shade(dx, w);
            for dy in 0..h {
                self.buf.set(x + dx, y + dy, c);
            }
        }
    }

    fn blit_pipe_head(&mut self, x: i32, y: i32, w: i32, h: i32, flipped: bool) {
        // The cap sticks out a pixel on each side where there is room.
        let extra = if w >= 6 { 1 } else { 0 };
        let (x, w) = (x - extra, w + extra * 2);
        for dx in 0..w {
            let c = pipe_shade(dx, w);
            for dy in 0..h {
                self.buf.set(x + dx, y + dy, c);
            }
        }
        // Darkened rim on the gap-facing edge.
        let rim = if flipped { y + h - 1 } else { y };
        for dx in 0..w {
            self.buf.set(x + dx, rim, CAP_DARK);
        }
    }

    fn blit_floor(&mut self, x: i32, y: i32, w: i32, h: i32) {
        if x <= 0 {
            // The leading strip's offset drives the hill parallax next frame.
            self.hill_phase = -x as f64;
        }
        for dx in 0..w {
            let col = x + dx;
            if col < 0 || col >= self.buf.w as i32 {
                continue;
            }
            let alt = (dx / 3) % 2 == 0;
            self.buf.set(col, y, if alt { GRASS } else { GRASS_LIGHT });
            self.buf.set(col, y + 1, GRASS);
            for dy in 2..h {
                let stripe = (dx + dy * 2) % 12 < 6;
                self.buf.set(col, y + dy, if stripe { DIRT } else { DIRT_DARK });
            }
        }
    }

    /// Nearest-neighbor blit of a 3x5 glyph into an arbitrary pixel rect.
    fn blit_glyph(&mut self, glyph: &[u8; 15], x: i32, y: i32, w: i32, h: i32, fg: Rgb) {
        for dy in 0..h {
            let row = ((dy * 5) / h.max(1)).min(4) as usize;
            for dx in 0..w {
                let col = ((dx * 3) / w.max(1)).min(2) as usize;
                if glyph[row * 3 + col] == 1 {
                    self.buf.set(x + dx + 1, y + dy + 1, SHADOW);
                    self.buf.set(x + dx, y + dy, fg);
                }
            }
        }
    }

    fn blit_banner(&mut self, x: i32, y: i32, w: i32, h: i32) {
        let text = "GAME OVER";
        let cell = (w / text.len() as i32).max(4);
        let mut gx = x + (w - cell * text.len() as i32) / 2;
        for ch in text.chars() {
            if let Some(glyph) = letter_glyph(ch) {
                self.blit_glyph(glyph, gx, y, cell - 1, h.max(5), BIRD_Y);
            }
            gx += cell;
        }
    }
}

impl RenderSink for TermRenderer {
    fn clear(&mut self) {
        self.blit_sky();
        self.blit_hills();
    }

    fn sprite_size(&self, sprite: Sprite) -> (f64, f64) {
        match sprite {
            Sprite::Bird(_) => (BIRD_SIZE, BIRD_SIZE),
            Sprite::PipeHead { .. } => (PIPE_W, HEAD_H),
            Sprite::PipeBody { .. } => (PIPE_W, BODY_H),
            Sprite::Floor => (CANVAS_W, FLOOR_H),
            Sprite::GameOver => (192.0, 42.0),
            Sprite::Digit(_) => (24.0, 36.0),
        }
    }

    fn draw(&mut self, sprite: Sprite, dst: Rect, deg: f64) {
        let (x, y, w, h) = self.to_px(&dst);
        match sprite {
            Sprite::Bird(frame) => self.blit_bird(x, y, w, h, deg, frame),
            Sprite::PipeHead { flipped } => self.blit_pipe_head(x, y, w, h, flipped),
            Sprite::PipeBody { .. } => self.blit_pipe_body(x, y, w, h),
            Sprite::Floor => self.blit_floor(x, y, w, h),
            Sprite::GameOver => self.blit_banner(x, y, w, h),
            Sprite::Digit(d) => {
                let glyph = &DIGITS[(d as usize).min(9)];
                self.blit_glyph(glyph, x, y, w, h, WHITE);
            }
        }
    }

    fn text(&mut self, cx: f64, y: f64, s: &str) {
        let px_cx = (cx * self.buf.w as f64 / CANVAS_W).round() as i32;
        let px_y = (y * self.buf.h as f64 / CANVAS_H).round() as i32;
        let total_w = s.len() as i32 * 4 - 1;
        let mut x = px_cx - total_w / 2;
        for ch in s.chars() {
            if ch != ' ' {
                match letter_glyph(ch) {
                    Some(glyph) => self.blit_glyph(glyph, x, px_y, 3, 5, WHITE),
                    None => self.buf.fill_rect(x, px_y, 3, 5, WHITE),
                }
            }
            x += 4;
        }
    }

    fn dim(&mut self) {
        for y in 0..self.buf.h {
            for x in 0..self.buf.w {
                let c = self.buf.get(x, y);
                self.buf.set(x as i32, y as i32, Rgb(c.0 / 2, c.1 / 2, c.2 / 2));
            }
        }
    }
}
