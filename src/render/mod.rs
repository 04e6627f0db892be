//! Terminal renderer
//!
//! Draws the track into an RGB pixel buffer at two vertical pixels per
//! terminal row, then flushes it with U+2580 half-block cells so every cell
//! carries two independently colored pixels. Everything here is
//! presentation: it reads simulation state and never writes it.

use std::io::{self, Write};

use crossterm::{
    cursor, queue,
    style::{self, Color as CColor},
};

use crate::consts::{ARENA_H, ARENA_W, GROUND_H, ORB_RADIUS, PLAYER_SIZE};
use crate::sim::{GameState, ZONES};

/// 24-bit color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Blend toward `other` by `t` in [0, 1]
    pub fn mix(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let ch = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t) as u8;
        Rgb(ch(self.0, other.0), ch(self.1, other.1), ch(self.2, other.2))
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Rgb(r, g, b)
    }
}

const BG_TOP: Rgb = Rgb(8, 8, 26);
const BG_BOT: Rgb = Rgb(12, 12, 34);
const GRID: Rgb = Rgb(16, 15, 40);
const OBS_LIGHT: Rgb = Rgb(255, 71, 87);
const OBS_DARK: Rgb = Rgb(204, 51, 68);
const ORB_GOLD: Rgb = Rgb(255, 192, 72);
const ORB_CORE: Rgb = Rgb(255, 248, 232);
const WHITE: Rgb = Rgb(255, 255, 255);
const EYE_DARK: Rgb = Rgb(26, 26, 46);

/// Pixel buffer with half-block rendering (2 pixels per terminal row)
pub struct PixelBuf {
    pub w: usize,
    pub h: usize,
    px: Vec<Rgb>,
}

impl PixelBuf {
    pub fn new(w: usize, h: usize) -> Self {
        Self { w, h, px: vec![BG_TOP; w * h] }
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
        self.px.resize(w * h, BG_TOP);
    }

    pub fn set(&mut self, x: i32, y: i32, c: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.px[y as usize * self.w + x as usize] = c;
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Rgb {
        self.px[y * self.w + x]
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, c: Rgb) {
        for dy in 0..h {
            for dx in 0..w {
                self.set(x + dx, y + dy, c);
            }
        }
    }

    pub fn fill_circle(&mut self, cx: i32, cy: i32, r: i32, c: Rgb) {
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r {
                    self.set(cx + dx, cy + dy, c);
                }
            }
        }
    }

    /// Flush the buffer as half-block cells, batching color changes
    pub fn render(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(out, cursor::MoveTo(0, 0))?;
        let rows = self.h / 2;
        let mut fg: Option<Rgb> = None;
        let mut bg: Option<Rgb> = None;

        for row in 0..rows {
            for col in 0..self.w {
                let top = self.get(col, row * 2);
                let bot = self.get(col, row * 2 + 1);

                if top == bot {
                    if bg != Some(top) {
                        queue!(out, style::SetBackgroundColor(to_cterm(top)))?;
                        bg = Some(top);
                    }
                    queue!(out, style::Print(' '))?;
                } else {
                    if fg != Some(top) {
                        queue!(out, style::SetForegroundColor(to_cterm(top)))?;
                        fg = Some(top);
                    }
                    if bg != Some(bot) {
                        queue!(out, style::SetBackgroundColor(to_cterm(bot)))?;
                        bg = Some(bot);
                    }
                    queue!(out, style::Print('\u{2580}'))?;
                }
            }
            if row < rows - 1 {
                queue!(out, style::ResetColor, style::Print("\r\n"))?;
                fg = None;
                bg = None;
            }
        }
        queue!(out, style::ResetColor)?;
        Ok(())
    }
}

fn to_cterm(c: Rgb) -> CColor {
    CColor::Rgb { r: c.0, g: c.1, b: c.2 }
}

/// Cheap stable hash to [0, 1) for star placement
fn hash01(seed: u64) -> f32 {
    let x = seed
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    ((x >> 33) ^ x) as u32 as f32 / u32::MAX as f32
}

/// Frame effects owned by the front end (decay, colors, shake offsets)
pub struct SceneFx {
    pub flash: f32,
    pub flash_color: Rgb,
    pub shake: (i32, i32),
}

/// Draw one frame of the track into the buffer
pub fn draw_scene(buf: &mut PixelBuf, state: &GameState, fx: &SceneFx) {
    let (bw_i, bh_i) = (buf.w as i32, buf.h as i32);
    let bw = buf.w as f32;
    let bh = buf.h as f32;
    let sx = |x: f32| (x / ARENA_W * bw) as i32 + fx.shake.0;
    let sy = |y: f32| (y / ARENA_H * bh) as i32 + fx.shake.1;
    let zone = Rgb::from(ZONES[state.zone_index].color);

    // Backdrop gradient with a faint scrolling grid
    let grid_step = (40.0 / ARENA_W * bw).max(4.0) as i32;
    let grid_offset = (state.distance_px / ARENA_W * bw) as i32 % grid_step;
    for y in 0..bh_i {
        let base = BG_TOP.mix(BG_BOT, y as f32 / bh);
        for x in 0..bw_i {
            let on_grid = (x + grid_offset) % grid_step == 0 || y % grid_step == 0;
            buf.set(x, y, if on_grid { base.mix(GRID, 0.6) } else { base });
        }
    }

    // Starfield, scrolling slowly with distance
    for i in 0..60u64 {
        let x = (hash01(i) * ARENA_W - state.distance_px * (0.05 + hash01(i * 31) * 0.1))
            .rem_euclid(ARENA_W);
        let y = hash01(i * 7) * ARENA_H;
        let tw = 0.3 + 0.7 * (0.5 + 0.5 * (state.player.glow_pulse + hash01(i * 13) * 6.0).sin());
        buf.set(sx(x), sy(y), BG_BOT.mix(WHITE, 0.4 * tw));
    }

    // Ceiling and floor strips in the zone color, glow fading into the sky
    let strip = ((GROUND_H / ARENA_H * bh) as i32).max(1);
    let glow_depth = (50.0 / ARENA_H * bh) as i32;
    for d in 0..glow_depth {
        let t = 1.0 - d as f32 / glow_depth as f32;
        let glow = BG_TOP.mix(zone, 0.15 * t);
        for x in 0..bw_i {
            buf.set(x, strip + d, glow);
            buf.set(x, bh_i - 1 - strip - d, glow);
        }
    }
    buf.fill_rect(0, 0, bw_i, strip, zone);
    buf.fill_rect(0, bh_i - strip, bw_i, strip, zone);

    // Orbs pulse between gold shell and pale core
    for orb in &state.orbs {
        let pulse = 1.0 + orb.pulse.sin() * 0.3;
        let r = ((ORB_RADIUS / ARENA_H * bh * pulse) as i32).max(1);
        let c = sx(orb.pos.x);
        let cy = sy(orb.pos.y);
        buf.fill_circle(c, cy, r, ORB_GOLD);
        buf.fill_circle(c, cy, (r / 2).max(1), ORB_CORE);
    }

    // Trail fades out behind the player
    for (i, p) in state.player.trail.iter().enumerate() {
        let t = 1.0 - i as f32 / state.player.trail.len().max(1) as f32;
        let size = ((PLAYER_SIZE * 0.5 * t / ARENA_H * bh) as i32).max(1);
        let c = BG_BOT.mix(zone, 0.35 * t);
        buf.fill_rect(sx(p.x) - size / 2, sy(p.y) - size / 2, size, size, c);
    }

    // Player: squashed body, highlight strip, two eyes
    let p = &state.player;
    let pw = ((PLAYER_SIZE * p.squash / ARENA_W * bw) as i32).max(2);
    let ph = ((PLAYER_SIZE * (2.0 - p.squash) / ARENA_H * bh) as i32).max(2);
    let pcx = sx(p.x + PLAYER_SIZE / 2.0);
    let pcy = sy(p.y + PLAYER_SIZE / 2.0);
    buf.fill_rect(pcx - pw / 2, pcy - ph / 2, pw, ph, zone);
    buf.fill_rect(pcx - pw / 2 + 1, pcy - ph / 2, pw - 2, (ph / 3).max(1), zone.mix(WHITE, 0.25));
    let eye_y = pcy - ph / 6;
    buf.set(pcx + pw / 4, eye_y, EYE_DARK);
    buf.set(pcx - pw / 4, eye_y, EYE_DARK);

    // Obstacles: vertical gradient, dark toward the attached surface
    for obs in &state.obstacles {
        let x0 = sx(obs.x);
        let x1 = sx(obs.x + obs.w);
        let y0 = sy(obs.y);
        let y1 = sy(obs.y + obs.h);
        for y in y0..y1 {
            let mut t = (y - y0) as f32 / (y1 - y0).max(1) as f32;
            if !obs.ceiling {
                t = 1.0 - t;
            }
            let c = OBS_LIGHT.mix(OBS_DARK, t);
            for x in x0..x1 {
                buf.set(x, y, c);
            }
        }
    }

    // Particles, faded by remaining life
    for part in &state.particles {
        let c = BG_BOT.mix(Rgb::from(part.color), part.life.clamp(0.0, 1.0));
        let s = ((part.size / ARENA_H * bh) as i32).max(1);
        buf.fill_rect(sx(part.pos.x), sy(part.pos.y), s, s, c);
    }

    // Full-screen flash on milestones and death
    if fx.flash > 0.02 {
        for y in 0..buf.h {
            for x in 0..buf.w {
                let c = buf.get(x, y).mix(fx.flash_color, fx.flash * 0.3);
                buf.set(x as i32, y as i32, c);
            }
        }
    }

    draw_hud(buf, state);
}

fn draw_hud(buf: &mut PixelBuf, state: &GameState) {
    let cx = buf.w as i32 / 2;
    let right = buf.w as i32 - 16;
    draw_number(buf, cx, 4, state.score, WHITE);
    if state.best_score > 0 {
        draw_number(buf, right, 4, state.best_score, ORB_GOLD.mix(BG_TOP, 0.3));
    }
    if state.combo > 0 {
        draw_number(buf, cx, 11, state.combo as u64, ORB_GOLD);
    }
}

/// 3x5 bitmap digits, one 3-bit mask per row
#[rustfmt::skip]
const DIGITS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111], // 0
    [0b010, 0b110, 0b010, 0b010, 0b111], // 1
    [0b111, 0b001, 0b111, 0b100, 0b111], // 2
    [0b111, 0b001, 0b011, 0b001, 0b111], // 3
    [0b101, 0b101, 0b111, 0b001, 0b001], // 4
    [0b111, 0b100, 0b111, 0b001, 0b111], // 5
    [0b111, 0b100, 0b111, 0b101, 0b111], // 6
    [0b111, 0b001, 0b010, 0b010, 0b010], // 7
    [0b111, 0b101, 0b111, 0b101, 0b111], // 8
    [0b111, 0b101, 0b111, 0b001, 0b111], // 9
];

fn draw_digit(buf: &mut PixelBuf, x: i32, y: i32, d: usize, c: Rgb) {
    for (row, mask) in DIGITS[d].iter().enumerate() {
        for col in 0..3 {
            if mask >> (2 - col) & 1 == 1 {
                buf.set(x + col, y + row as i32, c);
            }
        }
    }
}

/// Draw `n` centered on `cx` (3px digits, 1px spacing)
pub fn draw_number(buf: &mut PixelBuf, cx: i32, y: i32, n: u64, c: Rgb) {
    let s = n.to_string();
    let total_w = s.len() as i32 * 4 - 1;
    let start = cx - total_w / 2;
    for (i, ch) in s.bytes().enumerate() {
        draw_digit(buf, start + i as i32 * 4, y, (ch - b'0') as usize, c);
    }
}

/// Print a centered text line on top of the rendered canvas
pub fn overlay_line(
    out: &mut impl Write,
    cols: u16,
    row: u16,
    text: &str,
    color: Rgb,
) -> io::Result<()> {
    let col = (cols.saturating_sub(text.len() as u16)) / 2;
    queue!(
        out,
        cursor::MoveTo(col, row),
        style::SetForegroundColor(to_cterm(color)),
        style::Print(text),
        style::ResetColor,
    )
}
