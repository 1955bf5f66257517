//! # Height Field Module
//!
//! The terrain oracle: maps a horizontal world position to a normalized
//! height in `[0, 1]`. Chunk fill scales that sample into world units and
//! compares each voxel's Y against it, so terrain is a pure heightmap.
//!
//! Implementations are interchangeable:
//! - [`PerlinHeightField`]: layered Perlin noise for natural terrain
//! - [`ConstantHeightField`]: a flat plane, mostly for testing
//! - [`CachedHeightField`]: an LRU cache in front of any other height field

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;
use noise::{NoiseFn, Perlin};

use crate::engine_state::settings::Settings;

/// Base horizontal frequency of the default terrain noise at `smooth = 0.5`.
pub const PERLIN_SCALE_FACTOR: f64 = 0.02;
/// Offset added to sample positions so the world origin is not a lattice point.
pub const PERLIN_OFFSET: f64 = 10000.0;

/// A deterministic, stateless terrain height function.
///
/// `sample` must return a value in `[0, 1]` and must return the same value
/// for the same inputs; it is called from mesh and generation code on
/// several threads at once.
pub trait HeightField: Send + Sync {
    /// Normalized terrain height at the given world column.
    fn sample(&self, world_x: f32, world_z: f32) -> f32;
}

/// Fractal Perlin noise terrain.
///
/// Sums `octaves` layers of Perlin noise, each at double the frequency and
/// `persistence` times the amplitude of the previous one, then maps the
/// result from `[-1, 1]` into `[0, 1]`.
pub struct PerlinHeightField {
    perlin: Perlin,
    base_frequency: f64,
    octaves: u32,
    persistence: f64,
}

impl PerlinHeightField {
    /// Creates a height field from the noise parameters in `settings`.
    pub fn new(settings: &Settings) -> Self {
        PerlinHeightField {
            perlin: Perlin::new(settings.seed),
            base_frequency: PERLIN_SCALE_FACTOR * settings.smooth as f64 / 0.5,
            octaves: settings.octaves.max(1),
            persistence: settings.persistence as f64,
        }
    }
}

impl HeightField for PerlinHeightField {
    fn sample(&self, world_x: f32, world_z: f32) -> f32 {
        let mut frequency = self.base_frequency;
        let mut amplitude = 1.0;
        let mut total = 0.0;
        let mut range = 0.0;

        for _ in 0..self.octaves {
            let point = [
                world_x as f64 * frequency + PERLIN_OFFSET,
                world_z as f64 * frequency + PERLIN_OFFSET,
            ];
            total += self.perlin.get(point) * amplitude;
            range += amplitude;
            amplitude *= self.persistence;
            frequency *= 2.0;
        }

        (((total / range) + 1.0) * 0.5).clamp(0.0, 1.0) as f32
    }
}

/// A flat terrain at a fixed normalized height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantHeightField(pub f32);

impl HeightField for ConstantHeightField {
    fn sample(&self, _world_x: f32, _world_z: f32) -> f32 {
        self.0.clamp(0.0, 1.0)
    }
}

/// Memoizes height samples of an inner height field in an LRU cache.
///
/// Vertically stacked chunks sample the same columns, so a cache sized to a
/// few layers of chunk columns avoids most repeated noise evaluations.
/// Entries are keyed by the exact bit patterns of the inputs.
pub struct CachedHeightField<H: HeightField> {
    inner: H,
    cache: Mutex<LruCache<(u32, u32), f32>>,
}

impl<H: HeightField> CachedHeightField<H> {
    /// Wraps `inner` with a cache holding up to `capacity` columns.
    pub fn new(inner: H, capacity: NonZeroUsize) -> Self {
        CachedHeightField {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Number of columns currently cached.
    pub fn cached_columns(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }
}

impl<H: HeightField> HeightField for CachedHeightField<H> {
    fn sample(&self, world_x: f32, world_z: f32) -> f32 {
        let key = (world_x.to_bits(), world_z.to_bits());
        // A poisoned cache only costs us the memoization.
        let Ok(mut cache) = self.cache.lock() else {
            return self.inner.sample(world_x, world_z);
        };
        if let Some(height) = cache.get(&key) {
            return *height;
        }
        let height = self.inner.sample(world_x, world_z);
        cache.put(key, height);
        height
    }
}

impl<H: HeightField + ?Sized> HeightField for std::sync::Arc<H> {
    fn sample(&self, world_x: f32, world_z: f32) -> f32 {
        (**self).sample(world_x, world_z)
    }
}
