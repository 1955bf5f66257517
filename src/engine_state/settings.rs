//! # Settings
//!
//! World generation and streaming settings, loaded from JSON.
//!
//! Keys are camelCase and every key is optional; missing keys take the
//! defaults below.
//!
//! ```json
//! {
//!     "blocksPerMeter": 1,
//!     "generationRadiusInChunks": 2,
//!     "voxelsPerChunkSide": 16,
//!     "maxHeightInChunks": 4,
//!     "octaves": 2,
//!     "bootstrapRadiusInChunks": 1
//! }
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use super::error::ConfigError;
use super::rendering::meshing::MAX_VERTICES_PER_CHUNK;

/// Largest accepted streaming radius, in chunk hops. A radius-32 plan holds
/// 45,825 chunks.
pub const MAX_GENERATION_RADIUS: u32 = 32;

/// Settings for terrain generation and chunk streaming.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Voxels per world unit along each axis.
    pub blocks_per_meter: u32,
    /// Flood-fill radius, in chunk hops, of the resident set around the focus.
    pub generation_radius_in_chunks: u32,
    /// Voxels along each side of a cubic chunk (N).
    pub voxels_per_chunk_side: u32,
    /// Terrain height range, in chunks, that a height sample of 1.0 maps to.
    pub max_height_in_chunks: u32,
    /// Horizontal smoothness of the default noise; higher is rougher.
    pub smooth: f32,
    /// Noise octaves summed by the default height field.
    pub octaves: u32,
    /// Amplitude falloff between octaves.
    pub persistence: f32,
    /// Seed of the default height field.
    pub seed: u32,
    /// Radius for the very first cycle so something shows quickly.
    pub bootstrap_radius_in_chunks: Option<u32>,
    /// Drop planned chunks with a negative Y coordinate.
    pub suppress_below_ground: bool,
    /// Background mesh worker threads.
    pub mesh_workers: usize,
    /// Threads one chunk's face pass is split across.
    pub mesh_fanout: usize,
    /// Height samples kept in an LRU cache; zero disables it.
    pub height_cache_columns: usize,
    /// Verbose logging for the binary.
    pub debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            blocks_per_meter: 1,
            generation_radius_in_chunks: 2,
            voxels_per_chunk_side: 16,
            max_height_in_chunks: 4,
            smooth: 0.5,
            octaves: 2,
            persistence: 0.5,
            seed: 0,
            bootstrap_radius_in_chunks: None,
            suppress_below_ground: false,
            mesh_workers: 4,
            mesh_fanout: 1,
            height_cache_columns: 0,
            debug: false,
        }
    }
}

impl Settings {
    /// Voxels along each side of a chunk, as `usize`.
    pub fn side(&self) -> usize {
        self.voxels_per_chunk_side as usize
    }

    /// Length of one chunk side in world units.
    pub fn chunk_world_size(&self) -> f32 {
        self.voxels_per_chunk_side as f32 / self.blocks_per_meter as f32
    }

    /// World-space height a normalized height sample of 1.0 maps to.
    pub fn max_terrain_height(&self) -> f32 {
        self.max_height_in_chunks as f32 * self.chunk_world_size()
    }

    /// Vertices a chunk of the given side emits in the worst case.
    ///
    /// A 3D checkerboard exposes every internal face, `3N²(N-1)` of them, and
    /// with unloaded neighbours every boundary cell of the solid colour adds
    /// its outward faces, about `3N²` more. Four vertices per face.
    ///
    /// Saturates at `u64::MAX` for sides too large to count.
    pub fn worst_case_vertices(side: u32) -> u64 {
        let n = side as u128;
        u64::try_from(4 * (3 * n * n * n + 3 * n * n)).unwrap_or(u64::MAX)
    }

    /// Checks that these settings describe a world the engine can build.
    ///
    /// # Errors
    /// * [`ConfigError::NonPositive`] for zero dimensions or worker counts
    /// * [`ConfigError::VertexBudget`] if a chunk could exceed the vertex budget
    /// * [`ConfigError::OutOfRange`] if the generation radius exceeds
    ///   [`MAX_GENERATION_RADIUS`]
    /// * [`ConfigError::InvalidNoise`] for unusable noise parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("blocksPerMeter", self.blocks_per_meter as usize),
            ("voxelsPerChunkSide", self.voxels_per_chunk_side as usize),
            ("maxHeightInChunks", self.max_height_in_chunks as usize),
            ("octaves", self.octaves as usize),
            ("meshWorkers", self.mesh_workers),
            ("meshFanout", self.mesh_fanout),
        ];
        if let Some((field, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::NonPositive { field });
        }

        let worst_case_vertices = Self::worst_case_vertices(self.voxels_per_chunk_side);
        if worst_case_vertices > MAX_VERTICES_PER_CHUNK as u64 {
            return Err(ConfigError::VertexBudget {
                side: self.voxels_per_chunk_side,
                worst_case_vertices,
                budget: MAX_VERTICES_PER_CHUNK,
            });
        }

        let radius_limits = [
            ("generationRadiusInChunks", Some(self.generation_radius_in_chunks)),
            ("bootstrapRadiusInChunks", self.bootstrap_radius_in_chunks),
        ];
        for (field, radius) in radius_limits {
            if let Some(value) = radius.filter(|&radius| radius > MAX_GENERATION_RADIUS) {
                return Err(ConfigError::OutOfRange {
                    field,
                    value: value as u64,
                    max: MAX_GENERATION_RADIUS as u64,
                });
            }
        }

        if !(self.smooth.is_finite() && self.smooth > 0.0) {
            return Err(ConfigError::InvalidNoise {
                field: "smooth",
                reason: "must be a positive number",
            });
        }
        if !(self.persistence > 0.0 && self.persistence <= 1.0) {
            return Err(ConfigError::InvalidNoise {
                field: "persistence",
                reason: "must be in (0, 1]",
            });
        }

        Ok(())
    }
}

/// Reads settings from a JSON file and validates them.
///
/// # Errors
/// Returns [`ConfigError::Io`] or [`ConfigError::Json`] if the file cannot be
/// read or parsed, or any error from [`Settings::validate`].
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings, ConfigError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let settings: Settings = serde_json::from_reader(reader)?;
    settings.validate()?;
    Ok(settings)
}
