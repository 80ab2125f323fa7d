//! Opens a window, draws a tile floor and a sprite that a worker thread
//! moves and animates. Arrow keys pan the camera, Escape quits.
//!
//! Pass a 16x16-glyph font sheet as the first argument to get a status label.

use std::f32::consts::TAU;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use sprite_engine::coords::{ColorRgba, Rect, Vec2};
use sprite_engine::device::GpuInit;
use sprite_engine::input::Key;
use sprite_engine::jobs::{JobSender, RenderJob};
use sprite_engine::logging::{LoggingConfig, init_logging};
use sprite_engine::render::{SharedVec2, TextureSource};
use sprite_engine::renderer::{ObjectDesc, Renderer, RendererConfig};
use sprite_engine::text::{BitmapFont, DEFAULT_LETTERS, TextLabel};
use sprite_engine::window::{DesktopWindow, Window, WindowConfig};

const TILE: f32 = 64.0;
const SPRITE: f32 = 48.0;
const CAMERA_SPEED: f32 = 240.0;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let window = DesktopWindow::open(
        WindowConfig {
            title: "sprite-engine demo".to_string(),
            ..WindowConfig::default()
        },
        GpuInit::default(),
    )?;
    let mut renderer = Renderer::new(
        window,
        RendererConfig {
            clear_color: ColorRgba::from_rgba8(10, 10, 18, 255),
            ..RendererConfig::default()
        },
    );

    build_floor(&mut renderer)?;

    let running = Arc::new(AtomicBool::new(true));
    let worker = {
        let jobs = renderer.jobs();
        let running = running.clone();
        thread::Builder::new()
            .name("sprite-worker".into())
            .spawn(move || animate_sprite(jobs, running))
            .context("failed to spawn worker thread")?
    };

    let mut label = match std::env::args().nth(1) {
        Some(path) => Some(create_label(&mut renderer, path)?),
        None => None,
    };

    while !renderer.window().should_close() {
        let input = renderer.window().input();
        if input.key_down(Key::Escape) {
            break;
        }

        let dt = renderer.frame_time().map_or(0.0, |t| t.dt);
        let mut pan = Vec2::ZERO;
        for (key, dir) in [
            (Key::ArrowLeft, Vec2::new(-1.0, 0.0)),
            (Key::ArrowRight, Vec2::new(1.0, 0.0)),
            (Key::ArrowDown, Vec2::new(0.0, -1.0)),
            (Key::ArrowUp, Vec2::new(0.0, 1.0)),
        ] {
            if input.key_down(key) {
                pan += dir;
            }
        }
        if pan != Vec2::ZERO {
            renderer.camera().translate(pan * (CAMERA_SPEED * dt));
        }

        if let Some(label) = &mut label
            && input.key_pressed(Key::Space)
        {
            let camera = renderer.camera().get();
            let text = format!("CAMERA {:.0} {:.0}", camera.x, camera.y);
            label.set_text(&renderer.jobs(), &text, Vec2::new(8.0, 8.0));
        }

        renderer.frame();
    }

    running.store(false, Ordering::Relaxed);
    if worker.join().is_err() {
        log::error!("sprite worker panicked");
    }
    Ok(())
}

/// Static checkerboard built directly on the rendering thread.
fn build_floor(renderer: &mut Renderer<DesktopWindow>) -> Result<()> {
    let viewport = renderer.window().size();
    let cols = (viewport.width / TILE).ceil() as usize + 1;
    let rows = (viewport.height / TILE).ceil() as usize + 1;

    let mut ctx = renderer.context();
    let floor = ctx.create_object(&ObjectDesc::new(checker_sheet(), cols * rows))?;
    ctx.with_object(floor.id(), |object, gpu| {
        for row in 0..rows {
            for col in 0..cols {
                let tex_x = if (row + col) % 2 == 0 { 0.0 } else { 8.0 };
                object.create_rect(
                    Rect::square(col as f32 * TILE, row as f32 * TILE, TILE),
                    Rect::square(tex_x, 0.0, 8.0),
                );
            }
        }
        object.update_buffers(gpu);
    });
    log::info!("floor has {} tiles", cols * rows);
    Ok(())
}

/// Creates the sprite through the queue, then moves it through its
/// translation cell and flips its animation frame with jobs.
fn animate_sprite(jobs: JobSender, running: Arc<AtomicBool>) {
    let position = SharedVec2::new(Vec2::new(200.0, 200.0));
    let desc = ObjectDesc::new(sprite_sheet(), 1)
        .with_translation(position.clone())
        .with_bounds(Rect::square(0.0, 0.0, SPRITE));

    let (tx, rx) = crossbeam_channel::bounded(1);
    let create = RenderJob::create_object(desc, move |result| {
        let _ = tx.send(result.map_err(|e| format!("{e:#}")));
    });
    if !jobs.submit(create) {
        log::error!("job queue rejected sprite creation");
        return;
    }

    let Some(handle) = wait_while_running(&rx, &running) else {
        return;
    };

    let quad = Rect::square(0.0, 0.0, SPRITE);
    let submit_frame = |frame: usize| {
        let tex = Rect::square(frame as f32 * 16.0, 0.0, 16.0);
        let job = RenderJob::for_object(&handle, move |object, gpu| {
            if object.free_vertex() == 0 {
                object.create_rect(quad, tex);
            } else {
                object.modify_rect(0, quad, tex);
            }
            object.update_buffers(gpu);
        });
        if !jobs.submit(job) {
            log::warn!("job queue full, skipped sprite frame");
        }
    };
    submit_frame(0);

    let mut t: f32 = 0.0;
    let mut tick: usize = 0;
    while running.load(Ordering::Relaxed) {
        t += 1.0 / 60.0;
        tick += 1;
        position.set(Vec2::new(
            300.0 + 200.0 * (t * 0.5 * TAU).cos(),
            250.0 + 150.0 * (t * 0.5 * TAU).sin(),
        ));
        if tick % 30 == 0 {
            submit_frame((tick / 30) % 2);
        }
        thread::sleep(Duration::from_millis(16));
    }
}

/// Waits for a job result, giving up once `running` clears. The renderer may
/// close before it ever drains the job, keeping its sender alive.
fn wait_while_running<T>(
    rx: &Receiver<std::result::Result<T, String>>,
    running: &AtomicBool,
) -> Option<T> {
    loop {
        match rx.recv_timeout(Duration::from_millis(50)) {
            Ok(Ok(value)) => return Some(value),
            Ok(Err(e)) => {
                log::error!("render job failed: {e}");
                return None;
            }
            Err(RecvTimeoutError::Timeout) if running.load(Ordering::Relaxed) => {}
            Err(_) => return None,
        }
    }
}

fn create_label(renderer: &mut Renderer<DesktopWindow>, path: String) -> Result<TextLabel> {
    let font = Arc::new(BitmapFont::new(TextureSource::file(path), DEFAULT_LETTERS));
    let mut label = TextLabel::create(&mut renderer.context(), font, 32)?;
    label.set_text(&renderer.jobs(), "PRESS SPACE", Vec2::new(8.0, 8.0));
    Ok(label)
}

/// Two 8x8 tiles side by side.
fn checker_sheet() -> TextureSource {
    let (width, height) = (16u32, 8u32);
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for _y in 0..height {
        for x in 0..width {
            let shade = if x < 8 { 40 } else { 56 };
            pixels.extend_from_slice(&[shade, shade, shade + 12, 255]);
        }
    }
    TextureSource::Rgba {
        width,
        height,
        pixels,
    }
}

/// Two 16x16 animation frames: a filled diamond and a hollow one.
fn sprite_sheet() -> TextureSource {
    let (width, height) = (32u32, 16u32);
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            let (frame, lx) = (x / 16, x % 16);
            let d = (lx - 8).abs() + (y - 8).abs();
            let lit = if frame == 0 { d < 7 } else { (5..7).contains(&d) };
            let px = if lit { [250, 180, 40, 255] } else { [0, 0, 0, 0] };
            pixels.extend_from_slice(&px);
        }
    }
    TextureSource::Rgba {
        width,
        height,
        pixels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_waiting_once_shut_down() {
        let (_tx, rx) = crossbeam_channel::bounded::<std::result::Result<u32, String>>(1);
        let running = AtomicBool::new(false);
        assert_eq!(wait_while_running(&rx, &running), None);
    }

    #[test]
    fn returns_result_when_it_arrives() {
        let (tx, rx) = crossbeam_channel::bounded(1);
        tx.send(Ok(7)).unwrap();
        assert_eq!(wait_while_running(&rx, &AtomicBool::new(true)), Some(7));
    }
}
