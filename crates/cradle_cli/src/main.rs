//! Cradle CLI - headless driver for the Newton's cradle swing engine
//!
//! Loads a scene, replays a drag gesture against it and prints what the
//! engine produced:
//! - `init`: write the reference scene to `cradle.toml`
//! - `simulate`: run one release and print the swing series
//! - `frames`: sample every bearing's rotation over the master timeline

mod config;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use cradle_core::{DragEvent, GestureDirection};
use cradle_physics::{Cradle, SwingSeries};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Replay drag gestures against a Newton's cradle scene
#[derive(Parser, Debug)]
#[command(name = "cradle")]
#[command(about = "Replay drag gestures against a Newton's cradle scene")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write the reference scene
    Init {
        /// Directory to write cradle.toml into
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Overwrite an existing scene file
        #[arg(long)]
        force: bool,
    },

    /// Release a bearing and print the resulting swing series
    Simulate {
        #[command(flatten)]
        gesture: GestureArgs,

        /// Print the series as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print sampled bearing rotations as JSON lines
    Frames {
        #[command(flatten)]
        gesture: GestureArgs,

        /// Samples per simulated second
        #[arg(long, default_value = "30")]
        fps: u32,
    },
}

#[derive(Args, Debug)]
struct GestureArgs {
    /// Scene file or directory containing cradle.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Index of the grabbed bearing
    #[arg(short, long)]
    grab: usize,

    /// Gesture direction (clockwise | counter-clockwise)
    #[arg(short, long)]
    direction: GestureDirection,

    /// Rotation at release, in degrees
    #[arg(short, long, allow_negative_numbers = true)]
    rotation: f32,
}

impl GestureArgs {
    /// Drag events for a straight pull from rest to the release rotation
    fn events(&self) -> [DragEvent; 4] {
        [
            DragEvent::Start {
                grabbed_index: self.grab,
                direction: self.direction,
            },
            DragEvent::Drag {
                rotation: self.rotation / 2.0,
            },
            DragEvent::Drag {
                rotation: self.rotation,
            },
            DragEvent::End {
                rotation: self.rotation,
                grabbed_index: self.grab,
            },
        ]
    }

    /// Build the scene and replay the gesture on it
    fn replay(&self) -> Result<(Cradle, SwingSeries)> {
        let scene = config::resolve_scene(self.config.as_deref())?;
        let mut cradle = Cradle::from_scene(&scene).context("Failed to initialize cradle")?;

        let mut series = None;
        for event in self.events() {
            series = cradle
                .handle(event)
                .with_context(|| format!("Gesture rejected at {}", event.name()))?
                .or(series);
        }

        let series = series.context("Gesture ended without a release")?;
        Ok((cradle, series))
    }
}

#[derive(Serialize)]
struct Frame {
    t: f32,
    rotations: Vec<f32>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init { dir, force } => cmd_init(dir, force),
        Commands::Simulate { gesture, json } => cmd_simulate(&gesture, json),
        Commands::Frames { gesture, fps } => cmd_frames(&gesture, fps),
    }
}

fn cmd_init(dir: PathBuf, force: bool) -> Result<()> {
    let path = config::write_default_scene(&dir, force)?;
    tracing::info!("Wrote {}", path.display());
    Ok(())
}

fn cmd_simulate(gesture: &GestureArgs, json: bool) -> Result<()> {
    let (_, series) = gesture.replay()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&series)?);
        return Ok(());
    }

    println!(
        "swing series: {:.3}s -> {:.3}s",
        series.started_at, series.finished_at
    );
    for swing in &series.swings {
        println!(
            "  bearing {}: outward {:>7.2} deg, back {:>6.2} deg, {} keyframes{}",
            swing.position,
            swing.outward_angle,
            swing.fall_back_rotation_amount,
            swing.keyframes,
            if swing.will_instigate_collision {
                " (collides)"
            } else {
                ""
            }
        );
    }
    for cascade in &series.cascades {
        println!(
            "  collision from bearing {} -> {:?} with energy {:.2}",
            cascade.collision.collider, cascade.selected, cascade.energy
        );
    }
    if let Some(halt) = series.halt {
        println!("  halted: {halt:?}");
    }

    Ok(())
}

fn cmd_frames(gesture: &GestureArgs, fps: u32) -> Result<()> {
    if fps == 0 {
        anyhow::bail!("--fps must be at least 1");
    }

    let (cradle, _) = gesture.replay()?;
    let mut master = cradle.master_timeline();
    let dt = 1.0 / fps as f32;

    master.start();
    loop {
        let frame = Frame {
            t: master.current_time(),
            rotations: master.sample().into_iter().map(|(_, r)| r).collect(),
        };
        println!("{}", serde_json::to_string(&frame)?);

        if !master.is_playing() {
            break;
        }
        master.tick(dt);
    }

    Ok(())
}
