#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel World Engine
//!
//! A persistent, shared voxel world: deterministic procedural terrain, a sparse world store,
//! player physics, block interaction and a mutation channel that keeps every viewer of a
//! world in sync through a remote store.
//!
//! ## Key Modules
//!
//! * `application_state` - Window lifecycle and input handling
//! * `config` - Engine tunables, loadable from JSON
//! * `core` - Shared-state utilities used throughout the engine
//! * `engine_state` - The engine: terrain, world store, sync, physics, interaction, camera
//! * `error` - Error types
//!
//! ## Architecture
//!
//! One `EngineState` owns one session of one world. Terrain is generated from the world's
//! seed and type when the session starts; from then on, the only way the world changes is
//! through mutations read back from the remote store, applied at the start of a frame. A
//! player's own break and place actions are written to the remote store and take effect when
//! their echo arrives, exactly like another player's edits.
//!
//! Rendering sits behind the `RenderSink` trait. The engine hands it voxel deltas and a
//! camera transform every frame.
//!
//! ## Usage
//!
//! ```no_run
//! use clap::Parser;
//! use voxel_world_engine::{init_logging, run, LaunchOptions};
//!
//! init_logging();
//! run(LaunchOptions::parse())?;
//! # Ok::<(), voxel_world_engine::EngineError>(())
//! ```

pub mod application_state;
pub mod config;
pub mod core;
pub mod engine_state;
pub mod error;

use std::path::PathBuf;

use clap::Parser;
use log::info;

use engine_state::voxels::terrain::{WorldDescriptor, WorldType};

pub use config::{EngineConfig, PhysicsConfig, RetractionPolicy};
pub use engine_state::EngineState;
pub use error::EngineError;

#[cfg(not(target_family = "wasm"))]
use application_state::ApplicationState;
#[cfg(not(target_family = "wasm"))]
use engine_state::{
    render::{HeadlessRenderSink, RenderSink},
    sync::memory_store::InMemoryRemoteStore,
    PlayerAction,
};
#[cfg(not(target_family = "wasm"))]
use winit::event_loop::EventLoop;

/// World collection used when none is given on the command line.
pub const DEFAULT_WORLD_ID: &str = "worlds/local";

/// How a session is launched.
#[derive(Parser, Clone, Debug, PartialEq)]
#[command(author, version, about, long_about = None)]
pub struct LaunchOptions {
    /// JSON engine configuration; defaults apply when absent
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// World seed
    #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
    pub seed: i64,

    /// Terrain generator
    #[arg(short = 't', long, value_enum, default_value = "default")]
    pub world_type: WorldType,

    /// Remote collection holding the world's mutation records
    #[arg(short, long, default_value = DEFAULT_WORLD_ID)]
    pub world: String,

    /// Length of the headless session
    #[arg(short, long, default_value_t = 600)]
    pub frames: usize,

    /// Open a window instead of running the scripted headless session
    #[arg(long)]
    pub windowed: bool,
}

impl LaunchOptions {
    /// The world the options select.
    pub fn descriptor(&self) -> WorldDescriptor {
        WorldDescriptor {
            seed: self.seed,
            world_type: self.world_type,
        }
    }

    /// The configuration file's contents, or the defaults.
    pub fn load_config(&self) -> Result<EngineConfig, EngineError> {
        match &self.config {
            Some(path) => EngineConfig::load(path),
            None => Ok(EngineConfig::default()),
        }
    }
}

/// Installs the logger. Safe to call more than once.
#[cfg(not(target_family = "wasm"))]
pub fn init_logging() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG");

    if log_builder.try_init().is_ok() {
        info!("Logger initialized");
    }
}

/// Installs the logger and the console panic hook. Safe to call more than once.
#[cfg(target_family = "wasm")]
pub fn init_logging() {
    std::panic::set_hook(Box::new(console_error_panic_hook::hook));
    if console_log::init_with_level(log::Level::Info).is_ok() {
        info!("Logger initialized");
    }
}

/// Runs a session against an in-process remote store.
///
/// Without `--windowed`, a scripted player walks, looks down, breaks a block and places one
/// while a second viewer of the same world follows along; both views are compared at the
/// end.
#[cfg(not(target_family = "wasm"))]
pub fn run(options: LaunchOptions) -> Result<(), EngineError> {
    let config = options.load_config()?;
    let descriptor = options.descriptor();
    let store = InMemoryRemoteStore::new();

    let engine_state = EngineState::new(
        descriptor,
        &options.world,
        Box::new(store.clone()),
        config.clone(),
    )?;

    if options.windowed {
        return run_windowed(engine_state, HeadlessRenderSink::default());
    }

    let observer = EngineState::new(descriptor, &options.world, Box::new(store), config)?;
    run_headless(engine_state, observer, options.frames);
    Ok(())
}

/// Opens a window and drives `engine_state` from its events until it is closed.
#[cfg(not(target_family = "wasm"))]
pub fn run_windowed<R: RenderSink>(
    engine_state: EngineState,
    renderer: R,
) -> Result<(), EngineError> {
    let event_loop = EventLoop::new()?;
    let mut state = ApplicationState::new(engine_state, renderer);
    event_loop.run_app(&mut state)?;
    Ok(())
}

#[cfg(not(target_family = "wasm"))]
const HEADLESS_FRAME: web_time::Duration = web_time::Duration::from_micros(16_667);

#[cfg(not(target_family = "wasm"))]
fn run_headless(mut player: EngineState, mut observer: EngineState, frames: usize) {
    let mut player_view = HeadlessRenderSink::default();
    let mut observer_view = HeadlessRenderSink::default();

    for frame in 0..frames {
        player.player_actions = scripted_action(frame);
        let report = player.advance(HEADLESS_FRAME, &mut player_view);
        observer.advance(HEADLESS_FRAME, &mut observer_view);

        if frame % 60 == 0 || report.respawned {
            info!(
                "Frame {}: player at {:?}, {} mutations applied",
                frame, report.hud_position, report.sync.applied
            );
        }
    }

    // Drain echoes of the last frame's writes.
    player.advance(HEADLESS_FRAME, &mut player_view);
    observer.advance(HEADLESS_FRAME, &mut observer_view);

    info!(
        "Player sees {} voxels, observer sees {} ({})",
        player_view.visible.len(),
        observer_view.visible.len(),
        if player_view.visible == observer_view.visible {
            "converged"
        } else {
            "diverged"
        }
    );

    player.shutdown();
    observer.shutdown();
}

/// Walk forward for two seconds, look down and break the block ahead, then fill the hole
/// with a new block.
#[cfg(not(target_family = "wasm"))]
fn scripted_action(frame: usize) -> PlayerAction {
    let mut action = PlayerAction::default();
    match frame {
        0..=119 => action.movement.forward = true,
        150 => {
            action.rotate_view = Some((0.0, 400.0));
            action.break_block = true;
        }
        180 => action.place_block = true,
        _ => {}
    }
    action
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(list: &[&str]) -> Result<LaunchOptions, clap::Error> {
        let argv = std::iter::once("voxel-world-engine").chain(list.iter().copied());
        LaunchOptions::try_parse_from(argv)
    }

    #[test]
    fn no_arguments_launch_the_default_world() {
        let options = parse(&[]).expect("no arguments should parse");

        assert_eq!(options.config, None);
        assert_eq!(
            options.descriptor(),
            WorldDescriptor {
                seed: 0,
                world_type: WorldType::DEFAULT,
            }
        );
        assert_eq!(options.world, DEFAULT_WORLD_ID);
        assert_eq!(options.frames, 600);
        assert!(!options.windowed);
    }

    #[test]
    fn arguments_override_defaults() {
        let options = parse(&[
            "--seed",
            "-42",
            "--world-type",
            "superflat",
            "--world",
            "worlds/test",
            "--frames",
            "10",
        ])
        .expect("arguments should parse");

        assert_eq!(options.seed, -42);
        assert_eq!(options.world_type, WorldType::SUPERFLAT);
        assert_eq!(options.world, "worlds/test");
        assert_eq!(options.frames, 10);
        assert!(!options.windowed);
    }

    #[test]
    fn bad_arguments_are_rejected() {
        for bad in [
            &["--seed"][..],
            &["--seed", "abc"],
            &["--world-type", "islands"],
            &["--frames", "-3"],
            &["--fly"],
        ] {
            assert!(parse(bad).is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn headless_session_runs_to_completion() {
        let options = parse(&["--seed", "3", "--world-type", "superflat", "--frames", "240"])
            .expect("arguments should parse");

        run(options).expect("headless session should run");
    }
}
