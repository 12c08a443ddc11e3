#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line runner for the isometric arena.
//!
//! The simulation runs on its own thread and publishes a frame after every
//! tick. A presenter thread picks up the newest frame through the shared
//! exchange. When the run ends a summary is printed to stdout.

mod summary;

use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

use anyhow::{anyhow, ensure, Context, Result};
use clap::Parser;
use iso_arena_rendering::{Frame, FrameExchange, Presenter};
use iso_arena_session::{Session, StepOutcome};
use iso_arena_system_bootstrap::ArenaConfig;
use iso_arena_system_input::KeyState;
use iso_arena_system_progression::FirstChoice;
use iso_arena_world::query;

use crate::summary::RunSummary;

/// Runs an arena session without a window.
#[derive(Debug, Parser)]
#[command(name = "iso-arena", version)]
struct Args {
    /// TOML arena configuration. Built-in defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of ticks to simulate before stopping.
    #[arg(long, default_value_t = 3_600)]
    ticks: u64,
    /// Ticks per second of wall time.
    #[arg(long, default_value_t = 60)]
    tick_rate: u32,
    /// Overrides the seed from the configuration.
    #[arg(long)]
    seed: Option<u64>,
    /// Paces ticks against the wall clock instead of running flat out.
    #[arg(long)]
    realtime: bool,
}

/// Presenter that only records what it would have drawn.
#[derive(Debug, Default)]
struct HeadlessPresenter {
    frames: u64,
    last_tick: u64,
}

impl Presenter for HeadlessPresenter {
    fn present(&mut self, frame: &Frame) -> Result<()> {
        ensure!(
            self.frames == 0 || frame.tick > self.last_tick,
            "frame for tick {} arrived after tick {}",
            frame.tick,
            self.last_tick
        );
        self.frames += 1;
        self.last_tick = frame.tick;
        log::trace!(
            "presented tick {} with {} drawables",
            frame.tick,
            frame.drawables.len()
        );
        Ok(())
    }
}

fn main() -> Result<()> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let args = Args::parse();
    ensure!(args.tick_rate > 0, "--tick-rate must be positive");

    let mut config = match &args.config {
        Some(path) => ArenaConfig::load(path)
            .with_context(|| format!("failed to load arena config from {}", path.display()))?,
        None => ArenaConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let exchange = Arc::new(FrameExchange::new());
    let running = Arc::new(AtomicBool::new(true));

    let presenter = {
        let exchange = Arc::clone(&exchange);
        let running = Arc::clone(&running);
        thread::Builder::new()
            .name("presenter".into())
            .spawn(move || present(&exchange, &running))
            .context("failed to spawn presenter thread")?
    };

    let simulation = {
        let exchange = Arc::clone(&exchange);
        let running = Arc::clone(&running);
        let ticks = args.ticks;
        let tick_rate = args.tick_rate;
        let realtime = args.realtime;
        thread::Builder::new()
            .name("simulation".into())
            .spawn(move || {
                let summary = simulate(&config, ticks, tick_rate, realtime, &exchange);
                running.store(false, Ordering::Release);
                summary
            })
            .context("failed to spawn simulation thread")?
    };

    let simulated = simulation.join();
    running.store(false, Ordering::Release);
    let mut summary = simulated.map_err(|_| anyhow!("simulation thread panicked"))?;
    summary.frames_presented = presenter
        .join()
        .map_err(|_| anyhow!("presenter thread panicked"))??;

    println!("{summary}");
    Ok(())
}

fn simulate(
    config: &ArenaConfig,
    ticks: u64,
    tick_rate: u32,
    realtime: bool,
    exchange: &FrameExchange,
) -> RunSummary {
    let dt = Duration::from_secs(1) / tick_rate;
    let keys = KeyState::new();
    let mut policy = FirstChoice;
    let mut session = Session::new(config);
    let mut back = Frame::new();
    let started = Instant::now();

    for tick in 0..ticks {
        if session.step(dt, &keys) == StepOutcome::GameOver {
            break;
        }
        session.resolve_offers(&mut policy);

        let world = session.world();
        back.capture(
            query::tick_index(world),
            &query::sprite_view(world),
            query::camera(world),
            query::clock_seconds(world),
        );
        exchange.publish(&mut back);

        if realtime {
            let due = started + dt * u32::try_from(tick + 1).unwrap_or(u32::MAX);
            if let Some(wait) = due.checked_duration_since(Instant::now()) {
                thread::sleep(wait);
            }
        }
    }

    RunSummary::of(&session)
}

fn present(exchange: &FrameExchange, running: &AtomicBool) -> Result<u64> {
    let mut presenter = HeadlessPresenter::default();
    let mut front = Frame::new();
    loop {
        let finished = !running.load(Ordering::Acquire);
        if exchange.take_latest(&mut front) {
            presenter.present(&front)?;
        } else if finished {
            return Ok(presenter.frames);
        } else {
            thread::sleep(Duration::from_millis(1));
        }
    }
}
