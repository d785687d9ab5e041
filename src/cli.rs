use std::{path::PathBuf, sync::Arc, time::Instant};

use clap::{Parser, ValueEnum};
use indicatif::ProgressBar;
use log::{LevelFilter, info};
use portalcast::{
    BufferedRenderer, Camera, PixelBuffer, RenderConfig, RenderInfo, Renderer, Scene, TileRenderer,
    util::FrameTimes,
};

#[derive(Copy, Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Flies a camera through a portal scene and reports render speed.
#[derive(Debug, Parser)]
#[command(name = "portalcast")]
struct Args {
    /// TOML file with render settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Use screenshot quality settings
    #[arg(long)]
    highres: bool,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    #[arg(long)]
    cast_limit: Option<u32>,

    #[arg(long)]
    anti_alias: bool,

    /// Number of render threads, 0 for one per CPU
    #[arg(short, long)]
    threads: Option<usize>,

    #[arg(short, long)]
    frames: Option<usize>,

    /// Render on a background thread, one frame ahead of the camera
    #[arg(long)]
    buffered: bool,

    #[arg(long, value_enum, default_value = "info")]
    log_level: LogLevel,
}

impl Args {
    fn render_config(&self) -> anyhow::Result<RenderConfig> {
        let mut config = match &self.config {
            Some(path) => RenderConfig::load(path)?,
            None => RenderConfig::default(),
        };
        if self.highres {
            config = config.highres();
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(cast_limit) = self.cast_limit {
            config.cast_limit = cast_limit;
        }
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        if let Some(frames) = self.frames {
            config.frames = frames;
        }
        config.anti_alias |= self.anti_alias;
        Ok(config)
    }
}

fn render_info(config: &RenderConfig, camera: &Camera) -> RenderInfo {
    RenderInfo::builder()
        .world(camera.world)
        .eye(camera.eye)
        .frame(camera.frame)
        .width(config.width)
        .height(config.height)
        .cast_limit(config.cast_limit)
        .anti_alias(config.anti_alias)
        .shading(config.shading())
        .build()
}

/// Longest time step used for the roll correction.
const MAX_STEP: f64 = 0.2;

/// Moves the camera by one frame's worth of motion.
fn step(config: &RenderConfig, scene: &Scene, camera: &mut Camera, dt: f64) -> anyhow::Result<()> {
    camera.look(config.turn, 0.0);
    let displacement = camera.frame.forward * config.speed;
    let hops = camera.travel(scene, &displacement)?;
    if hops > 0 {
        info!("Passed {hops} portal(s), now in world {:?}", camera.world);
    }
    camera.upright(dt.min(MAX_STEP));
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.log_level.into())
        .init();

    let config = args.render_config()?;
    info!(
        "Rendering {} frames of {:?} at {}x{}, cast limit {}, {} threads",
        config.frames,
        config.scene,
        config.width,
        config.height,
        config.cast_limit,
        config.thread_count()
    );

    let (scene, mut camera) = config.build_scene()?;
    let scene = Arc::new(scene);
    let renderer = TileRenderer::builder()
        .height(config.height)
        .worker_count(config.thread_count())
        .pin_to_cores(config.pin_threads)
        .build()?;

    let bar = ProgressBar::new(config.frames as u64);
    let mut times = FrameTimes::default();
    let mut last_frame = Instant::now();

    if args.buffered {
        let mut renderer = BufferedRenderer::new(renderer)?;
        for frame in 0..config.frames {
            if frame == 0 {
                renderer.request(&scene, &render_info(&config, &camera))?;
            }
            step(&config, &scene, &mut camera, times.average().as_secs_f64())?;
            if frame + 1 < config.frames {
                renderer.request(&scene, &render_info(&config, &camera))?;
            }
            renderer.wait_frame()?;
            times.add_sample(last_frame.elapsed());
            last_frame = Instant::now();
            bar.inc(1);
        }
    } else {
        let mut renderer = renderer;
        let mut buffer = PixelBuffer::new(config.width, config.height, 3);
        for _ in 0..config.frames {
            renderer.render(&scene, &render_info(&config, &camera), &mut buffer)?;
            let elapsed = last_frame.elapsed();
            times.add_sample(elapsed);
            last_frame = Instant::now();
            step(&config, &scene, &mut camera, elapsed.as_secs_f64())?;
            bar.inc(1);
        }
    }
    bar.finish();

    info!("Frame times: {times}");
    Ok(())
}
