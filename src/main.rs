//! Flip Runner entry point
//!
//! Terminal front end: fixed-timestep driver around the simulation, input
//! mapped to the single action signal, and per-tick events turned into
//! toasts, flashes, shake, and best-score persistence.

use std::io::{self, Write, stdout};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode},
    execute, terminal,
};

use flip_runner::consts::*;
use flip_runner::persistence;
use flip_runner::render::{PixelBuf, Rgb, SceneFx, draw_scene, overlay_line};
use flip_runner::sim::{GameEvent, GameState, RunPhase, TickInput, ZONES, tick};

/// A transient text line shown near the top of the screen
struct Toast {
    text: String,
    color: Rgb,
    ttl: u32,
}

/// Event-driven frame effects
struct Fx {
    flash: f32,
    flash_color: Rgb,
    shake: f32,
    toasts: Vec<Toast>,
}

impl Fx {
    fn new() -> Self {
        Self {
            flash: 0.0,
            flash_color: Rgb(255, 255, 255),
            shake: 0.0,
            toasts: Vec::new(),
        }
    }

    fn toast(&mut self, text: String, color: Rgb) {
        self.toasts.push(Toast { text, color, ttl: 50 });
    }

    fn decay(&mut self) {
        self.flash *= 0.88;
        self.shake *= 0.85;
        self.toasts.retain_mut(|t| {
            t.ttl = t.ttl.saturating_sub(1);
            t.ttl > 0
        });
    }
}

fn main() -> io::Result<()> {
    env_logger::init();

    let best = persistence::load_best();
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0x5eed);
    let mut state = GameState::new(seed, best);
    log::info!("flip-runner starting (seed {seed}, best score {best})");

    terminal::enable_raw_mode()?;
    let mut out = stdout();
    execute!(
        out,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        terminal::DisableLineWrap,
    )?;

    let cleanup = |out: &mut io::Stdout| -> io::Result<()> {
        execute!(
            out,
            terminal::LeaveAlternateScreen,
            cursor::Show,
            terminal::EnableLineWrap,
        )?;
        terminal::disable_raw_mode()
    };

    let (cols, rows) = terminal::size()?;
    let mut buf = PixelBuf::new(cols as usize, rows as usize * 2);

    let mut input = TickInput::default();
    let mut fx = Fx::new();
    let mut accumulator = 0.0f32;
    let mut last = Instant::now();
    let mut frame = 0u64;
    let frame_dur = Duration::from_millis(33); // ~30 fps terminal pacing

    loop {
        let frame_start = Instant::now();

        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        cleanup(&mut out)?;
                        return Ok(());
                    }
                    KeyCode::Char(' ' | 'w' | 's')
                    | KeyCode::Up
                    | KeyCode::Down
                    | KeyCode::Enter => input.action = true,
                    _ => {}
                },
                Event::Resize(c, r) => buf.resize(c as usize, r as usize * 2),
                _ => {}
            }
        }

        // Fixed-timestep simulation with a substep cap
        let now = Instant::now();
        let dt = (now - last).as_secs_f32().min(0.1);
        last = now;
        accumulator += dt;
        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            for ev in tick(&mut state, &input) {
                apply_event(&ev, &mut fx);
            }
            input.action = false;
            accumulator -= SIM_DT;
            substeps += 1;
        }

        fx.decay();
        frame += 1;

        let shake_px = if fx.shake > 0.5 {
            let j = (frame.wrapping_mul(2654435761) % 9) as i32;
            (j % 3 - 1, j / 3 - 1)
        } else {
            (0, 0)
        };
        draw_scene(
            &mut buf,
            &state,
            &SceneFx { flash: fx.flash, flash_color: fx.flash_color, shake: shake_px },
        );
        buf.render(&mut out)?;
        draw_overlays(&mut out, &state, &fx, buf.w as u16, (buf.h / 2) as u16)?;
        out.flush()?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_dur {
            std::thread::sleep(frame_dur - elapsed);
        }
    }
}

fn apply_event(ev: &GameEvent, fx: &mut Fx) {
    match ev {
        GameEvent::Flipped { .. } => {
            fx.flash = fx.flash.max(0.15);
            fx.flash_color = Rgb(255, 255, 255);
        }
        GameEvent::OrbCollected { .. } => {}
        GameEvent::NearMiss { bonus } => {
            fx.toast(format!("CLOSE! +{bonus}"), Rgb(255, 192, 72));
        }
        GameEvent::ZoneEntered { zone } => {
            let z = &ZONES[*zone];
            fx.toast(z.name.to_string(), Rgb::from(z.color));
            fx.flash = 0.6;
            fx.flash_color = Rgb::from(z.color);
        }
        GameEvent::Died { score, new_best, .. } => {
            fx.flash = 1.0;
            fx.flash_color = Rgb(255, 71, 87);
            fx.shake = 14.0;
            if *new_best {
                fx.toast("NEW BEST!".to_string(), Rgb(255, 192, 72));
                if let Err(e) = persistence::save_best(*score) {
                    log::warn!("could not save best score: {e}");
                }
            }
        }
    }
}

fn draw_overlays(
    out: &mut impl Write,
    state: &GameState,
    fx: &Fx,
    cols: u16,
    rows: u16,
) -> io::Result<()> {
    let mid = rows / 2;
    match state.phase {
        RunPhase::Idle => {
            overlay_line(out, cols, mid.saturating_sub(2), "F L I P   R U N N E R", Rgb(108, 92, 231))?;
            overlay_line(out, cols, mid, "flip gravity - dodge the blocks - grab the orbs", Rgb(140, 140, 170))?;
            overlay_line(out, cols, mid + 2, "press SPACE to run  /  q to quit", Rgb(200, 200, 220))?;
        }
        RunPhase::Dead if state.dead_ticks > RESTART_DELAY_TICKS => {
            overlay_line(out, cols, mid.saturating_sub(3), "G A M E   O V E R", Rgb(255, 71, 87))?;
            overlay_line(
                out,
                cols,
                mid.saturating_sub(1),
                &format!("score {}   best {}", state.score, state.best_score),
                Rgb(255, 255, 255),
            )?;
            overlay_line(
                out,
                cols,
                mid,
                &format!(
                    "orbs {}   flips {}   near misses {}",
                    state.stats.orbs, state.stats.flips, state.stats.near_misses
                ),
                Rgb(140, 140, 170),
            )?;
            overlay_line(out, cols, mid + 2, "press SPACE to run again", Rgb(200, 200, 220))?;
        }
        _ => {
            // Speed multiplier, bottom-left
            crossterm::queue!(
                out,
                cursor::MoveTo(1, rows.saturating_sub(1)),
                crossterm::style::SetForegroundColor(crossterm::style::Color::Rgb {
                    r: 120,
                    g: 120,
                    b: 150
                }),
                crossterm::style::Print(format!("{:.1}x", state.speed / BASE_SPEED)),
                crossterm::style::ResetColor,
            )?;
        }
    }

    for (i, toast) in fx.toasts.iter().enumerate() {
        overlay_line(out, cols, 2 + i as u16, &toast.text, toast.color)?;
    }
    Ok(())
}
