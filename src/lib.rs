#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Streaming Engine
//!
//! Procedural voxel terrain that streams around a moving focus point.
//!
//! The engine decides which cubic chunks of space must exist, fills each one
//! with solid or empty voxels from a heightmap, culls every face that touches
//! another solid voxel, and assembles the surviving quads into one mesh per
//! chunk. As the focus moves, chunks are created, evicted and regenerated,
//! and the render objects that show them are pooled and reused.
//!
//! ## Key Modules
//!
//! * `core` - Shared-ownership primitives used throughout the engine
//! * `engine_state` - The streaming driver and its voxel, streaming, meshing
//!   and task-management subsystems
//!
//! ## Architecture
//!
//! The engine is backend-agnostic. It produces per-chunk vertex, normal, UV
//! and index buffers and hands them to render objects behind the
//! `Presentation` trait; drawing is someone else's job. The bundled
//! `HeadlessPresentation` just records what it was asked to show.
//!
//! ## Usage
//!
//! ```rust,no_run
//! fn main() {
//!     voxel_streaming_engine::run().unwrap();
//! }
//! ```
//!
//! The binary takes an optional path to a JSON settings file:
//!
//! ```bash
//! RUST_LOG=debug cargo run --release -- settings.json
//! ```

use cgmath::{Point3, Vector3};
use log::{info, LevelFilter};

use engine_state::{
    error::StreamingError,
    rendering::HeadlessPresentation,
    settings::{load_settings, Settings},
    voxels::height_field::PerlinHeightField,
};

pub mod core;
pub mod engine_state;

pub use engine_state::{StreamingEngine, StreamingStats, TickReport};

/// Chunks the demo walk crosses.
const WALK_STEPS: usize = 12;

/// Upper bound on ticks spent draining one cycle.
const MAX_TICKS_PER_STEP: usize = 100_000;

/// Runs the headless demo: streams Perlin terrain around a focus point that
/// walks diagonally across the world, then reports what was built.
///
/// # Errors
/// Returns an error if the settings file cannot be loaded or streaming hits
/// a fatal condition.
pub fn run() -> Result<(), StreamingError> {
    let settings = match std::env::args().nth(1) {
        Some(path) => load_settings(path),
        None => Ok(Settings::default()),
    };

    let level = match &settings {
        Ok(settings) if settings.debug => LevelFilter::Debug,
        _ => LevelFilter::Info,
    };
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .filter_level(level)
        .parse_env("RUST_LOG")
        .init();
    info!("Logger initialized");

    let settings = settings?;
    let presentation = HeadlessPresentation::new();
    let mut engine = StreamingEngine::new(
        settings.clone(),
        PerlinHeightField::new(&settings),
        presentation.clone(),
    )?;

    let mut rng = fastrand::Rng::with_seed(settings.seed as u64);
    let chunk_size = settings.chunk_world_size();
    let mut focus = Point3::new(0.0, settings.max_terrain_height() * 0.5, 0.0);
    let heading = Vector3::new(1.0, 0.0, 0.5);

    for step in 0..=WALK_STEPS {
        let jitter = Vector3::new(rng.f32() - 0.5, rng.f32() - 0.5, rng.f32() - 0.5);
        engine.set_focus(focus + jitter * chunk_size * 0.25);
        let ticks = engine.run_until_idle(MAX_TICKS_PER_STEP)?;
        info!(
            "Step {step}: focus chunk {:?}, {} chunks resident, idle after {ticks} ticks",
            engine.focus(),
            engine.registry().read()?.len()
        );
        focus += heading * chunk_size;
    }

    let stats = engine.stats();
    let records = presentation.snapshot();
    let uploaded: usize = records.iter().map(|record| record.uploaded_bytes).sum();
    info!("{stats:#?}");
    info!(
        "{} render objects, {} visible, {} vertices and {uploaded} bytes currently uploaded",
        records.len(),
        presentation.visible_count(),
        records.iter().map(|record| record.vertex_count).sum::<usize>()
    );
    Ok(())
}
