// Fibroblasts - LLS Migration Simulator
// Copyright (c) 2025 Filipe da Veiga Ventura Alves
// Licensed under MIT License

mod gpu;

use std::{
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Context;
use clap::Parser;
use fibroblasts::{naming, tessellate, Palette, SceneVertex, Simulation, SimulationSettings};
use rand::{rngs::SmallRng, SeedableRng};
use winit::{
    event::{ElementState, Event, KeyEvent, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
};

use crate::gpu::GpuState;

const CENSUS_INTERVAL_TICKS: u64 = 1000;

#[derive(Parser, Debug)]
#[command(name = "fibroblasts", about = "Fibroblasts migration to LLS", version)]
struct Args {
    /// Settings file (defaults to ./fibroblast_settings.json when present)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// RNG seed; overrides the settings file
    #[arg(long)]
    seed: Option<u64>,

    /// Run without a window on a simulated clock
    #[arg(long)]
    headless: bool,

    /// Ticks to run in headless mode
    #[arg(long, default_value_t = 10_000)]
    ticks: u64,

    /// Write the effective settings back to the settings file
    #[arg(long)]
    save_settings: bool,
}

// ============================================================================
// SETTINGS
// ============================================================================

fn load_settings(args: &Args) -> anyhow::Result<SimulationSettings> {
    let path = args
        .settings
        .clone()
        .unwrap_or_else(SimulationSettings::default_path);

    let mut settings = if path.exists() {
        match SimulationSettings::load_from_disk(&path) {
            Ok(settings) => {
                log::info!("loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("failed to load settings from {}: {e:?}; using defaults", path.display());
                SimulationSettings::default()
            }
        }
    } else {
        if args.settings.is_some() {
            log::warn!("settings file {} not found; using defaults", path.display());
        }
        SimulationSettings::default()
    };

    if let Some(seed) = args.seed {
        settings.rng_seed = Some(seed);
    }
    settings.sanitize();

    if args.save_settings {
        settings
            .save_to_disk(&path)
            .with_context(|| format!("saving settings to {}", path.display()))?;
        log::info!("saved settings to {}", path.display());
    }
    Ok(settings)
}

fn log_census(sim: &Simulation, now: u64) {
    let census = sim.census();
    match census.mean_vertex_distance {
        Some(mean) => log::info!(
            "tick {} (t={} ms): {} moving, {} resting, mean vertex distance {:.2}",
            sim.ticks(),
            now,
            census.moving,
            census.resting,
            mean
        ),
        None => log::info!(
            "tick {} (t={} ms): {} moving, {} resting, no LLS placed",
            sim.ticks(),
            now,
            census.moving,
            census.resting
        ),
    }
}

// ============================================================================
// DRIVERS
// ============================================================================

/// Steps on a simulated clock of one frame interval per tick.
fn run_headless(settings: &SimulationSettings, mut sim: Simulation, ticks: u64) {
    let interval = settings.frame_interval_ms();
    let started = Instant::now();
    let mut now = 0;
    for i in 0..ticks {
        now = i * interval;
        sim.tick(now);
        if sim.ticks() % CENSUS_INTERVAL_TICKS == 0 {
            log_census(&sim, now);
        }
    }
    log_census(&sim, now);
    log::info!(
        "headless run finished: {} ticks in {:.2} s",
        ticks,
        started.elapsed().as_secs_f32()
    );
}

struct FrameClock {
    start: Instant,
    interval: Duration,
    next_frame: Instant,
    frame_count: u32,
    frame_time_sum: f32,
    last_frame: Instant,
    last_fps_update: Instant,
}

impl FrameClock {
    fn new(target_fps: u32) -> Self {
        let now = Instant::now();
        Self {
            start: now,
            interval: Duration::from_secs_f64(1.0 / f64::from(target_fps.max(1))),
            next_frame: now,
            frame_count: 0,
            frame_time_sum: 0.0,
            last_frame: now,
            last_fps_update: now,
        }
    }

    /// Milliseconds since the window opened; the simulation's monotonic clock.
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn frame_due(&mut self) -> bool {
        let now = Instant::now();
        if now < self.next_frame {
            return false;
        }
        self.next_frame += self.interval;
        if self.next_frame < now {
            // Fell behind; don't try to catch up with a burst of frames.
            self.next_frame = now + self.interval;
        }
        true
    }

    fn record_frame(&mut self) {
        let now = Instant::now();
        self.frame_time_sum += now.duration_since(self.last_frame).as_secs_f32();
        self.frame_count += 1;
        self.last_frame = now;
    }

    fn get_fps_and_frame_time(&mut self) -> Option<(f32, f32)> {
        let elapsed = self.last_fps_update.elapsed();
        if elapsed.as_secs_f32() >= 0.5 && self.frame_count > 0 {
            let fps = self.frame_count as f32 / elapsed.as_secs_f32();
            let avg_frame_time_ms = (self.frame_time_sum / self.frame_count as f32) * 1000.0;
            self.frame_count = 0;
            self.frame_time_sum = 0.0;
            self.last_fps_update = Instant::now();
            return Some((fps, avg_frame_time_ms));
        }
        None
    }
}

fn run_windowed(settings: SimulationSettings, mut sim: Simulation) -> anyhow::Result<()> {
    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        event_loop
            .create_window(
                winit::window::WindowAttributes::default()
                    .with_title("Fibroblasts migration to LLS")
                    .with_inner_size(winit::dpi::PhysicalSize::new(settings.width, settings.height)),
            )
            .context("creating window")?,
    );

    let mut gpu = pollster::block_on(GpuState::new(window.clone(), &settings))?;
    let palette = Palette::from(&settings);
    let mut clock = FrameClock::new(settings.target_fps);
    let mut frame: Vec<SceneVertex> = Vec::new();

    event_loop.run(move |event, target| match event {
        Event::WindowEvent { ref event, window_id } if window_id == window.id() => match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                log_census(&sim, clock.now_ms());
                target.exit();
            }
            WindowEvent::Resized(physical_size) => gpu.resize(*physical_size),
            WindowEvent::RedrawRequested => {
                // A whole tick completes before the frame is tessellated.
                let now = clock.now_ms();
                sim.tick(now);
                tessellate(&sim, &palette, &mut frame);

                match gpu.render(&frame) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => gpu.reconfigure(),
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("GPU out of memory; exiting");
                        target.exit();
                    }
                    Err(e) => log::warn!("surface error: {e:?}"),
                }

                clock.record_frame();
                if let Some((fps, frame_time_ms)) = clock.get_fps_and_frame_time() {
                    window.set_title(&format!(
                        "Fibroblasts migration to LLS | {:.0} FPS | {:.2} ms/frame",
                        fps, frame_time_ms
                    ));
                }
                if sim.ticks() % CENSUS_INTERVAL_TICKS == 0 {
                    log_census(&sim, now);
                }
            }
            _ => {}
        },
        Event::AboutToWait => {
            if clock.frame_due() {
                window.request_redraw();
            }
            target.set_control_flow(ControlFlow::WaitUntil(clock.next_frame));
        }
        _ => {}
    })?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    use env_logger::Env;
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let settings = load_settings(&args)?;

    let seed = settings.rng_seed.unwrap_or_else(rand::random);
    log::info!("run {} (seed {})", naming::generate_run_name(&settings, seed), seed);

    let mut rng = SmallRng::seed_from_u64(seed);
    let sim = Simulation::new(&settings, &mut rng, 0);

    if args.headless {
        run_headless(&settings, sim, args.ticks);
        Ok(())
    } else {
        run_windowed(settings, sim)
    }
}
