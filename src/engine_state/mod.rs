//! # Engine State Module
//!
//! The streaming engine: keeps the chunks around a moving focus resident,
//! meshed and handed to the presentation layer.
//!
//! ## Key Components
//!
//! * `StreamingEngine` - The driver that sequences planning, reconciliation and meshing
//! * `error` - Error types for configuration, registry and meshing failures
//! * `rendering` - Render object interface, renderer pool and mesh generation
//! * `settings` - World and streaming settings, loaded from JSON
//! * `streaming` - Wanted-set planning and chunk lifecycle reconciliation
//! * `task_management` - Background worker pool for mesh builds
//! * `voxels` - Chunk storage, terrain height fields and the chunk registry
//!
//! ## Architecture
//!
//! Work happens in cycles. A cycle starts when the focus enters a new chunk:
//! the planner computes the wanted set, the lifecycle manager reconciles the
//! registry and renderer pool against it under the registry's write lock,
//! and one mesh task per renderer awaiting a draw goes to the workers. Mesh
//! tasks only ever read the registry.
//!
//! A new cycle never starts while mesh tasks are outstanding. A focus change
//! that arrives mid-cycle is remembered and acted on once the current cycle
//! drains, so registry mutation and meshing never interleave and no chunk is
//! left waiting for a renderer.
//!
//! ## Performance Considerations
//!
//! * Mesh builds run on a worker pool, optionally fanned out per chunk
//! * Renderers are pooled and reused rather than recreated
//! * Terrain samples can be memoized in an LRU cache

use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::time::Duration;

use cgmath::Point3;
use log::{debug, error, info, warn};
use web_time::Instant;

use crate::core::Shared;
use error::{MeshError, StreamingError};
use rendering::{tasks::ChunkMeshResult, tasks::ChunkMeshTask, ChunkRenderer, Presentation};
use settings::Settings;
use streaming::{expected_count, ChunkLifecycleManager, ChunkSetPlanner};
use task_management::TaskManager;
use voxels::{
    coordinates::ChunkCoordinate,
    height_field::{CachedHeightField, HeightField},
    registry::ChunkRegistry,
};

pub mod error;
pub mod rendering;
pub mod settings;
pub mod stats;
pub mod streaming;
pub mod task_management;
pub mod voxels;

pub use stats::{StreamingStats, TickReport};

/// Tries a mesh build gets before it is abandoned until the next cycle.
pub const MAX_MESH_ATTEMPTS: u32 = 3;

/// Keeps the chunks around a moving focus point resident and drawn.
///
/// # Examples
///
/// ```
/// use cgmath::Point3;
/// use voxel_streaming_engine::engine_state::{
///     rendering::HeadlessPresentation, settings::Settings,
///     voxels::height_field::ConstantHeightField, StreamingEngine,
/// };
///
/// let settings = Settings {
///     generation_radius_in_chunks: 1,
///     voxels_per_chunk_side: 8,
///     ..Settings::default()
/// };
/// let mut engine = StreamingEngine::new(
///     settings,
///     ConstantHeightField(0.5),
///     HeadlessPresentation::new(),
/// )
/// .unwrap();
///
/// engine.set_focus(Point3::new(0.0, 0.0, 0.0));
/// engine.run_until_idle(10_000).unwrap();
/// assert_eq!(engine.registry().read().unwrap().len(), 7);
/// ```
pub struct StreamingEngine {
    /// Validated settings
    settings: Settings,
    /// Resident chunks, shared read-only with mesh tasks
    registry: Shared<ChunkRegistry>,
    /// Terrain new chunks are filled from
    height_field: Box<dyn HeightField>,
    /// Computes wanted sets
    planner: ChunkSetPlanner,
    /// Reconciles the registry and owns the renderer pool
    lifecycle: ChunkLifecycleManager,
    /// Creates render objects and supplies the chunk material
    presentation: Box<dyn Presentation>,
    /// Worker pool for mesh builds
    task_manager: TaskManager<ChunkMeshTask>,
    /// Chunk containing the focus point, once one was set
    focus: Option<ChunkCoordinate>,
    /// Whether a cycle should run as soon as meshing drains
    pending_cycle: bool,
    /// Whether the first cycle has already run
    bootstrapped: bool,
    /// Failed builds to publish again on the next tick
    retries: VecDeque<ChunkMeshTask>,
    /// Running totals
    stats: StreamingStats,
}

impl StreamingEngine {
    /// Creates an engine with no focus and nothing resident.
    ///
    /// # Arguments
    /// * `settings` - World and streaming settings; validated here
    /// * `height_field` - Terrain function; cached if `height_cache_columns > 0`
    /// * `presentation` - Creates the render objects chunks are shown with
    ///
    /// # Errors
    /// Returns [`StreamingError::Config`] if the settings are invalid.
    pub fn new<H, P>(settings: Settings, height_field: H, presentation: P) -> Result<Self, StreamingError>
    where
        H: HeightField + 'static,
        P: Presentation + 'static,
    {
        settings.validate()?;

        let height_field: Box<dyn HeightField> = match NonZeroUsize::new(settings.height_cache_columns) {
            Some(capacity) => Box::new(CachedHeightField::new(height_field, capacity)),
            None => Box::new(height_field),
        };

        let capacity = expected_count(settings.generation_radius_in_chunks);
        info!(
            "Streaming engine: radius {}, {}³ voxels per chunk, {} mesh workers",
            settings.generation_radius_in_chunks, settings.voxels_per_chunk_side, settings.mesh_workers
        );

        Ok(StreamingEngine {
            registry: Shared::new(ChunkRegistry::with_capacity(capacity)),
            height_field,
            planner: ChunkSetPlanner::from_settings(&settings),
            lifecycle: ChunkLifecycleManager::with_capacity(capacity),
            presentation: Box::new(presentation),
            task_manager: TaskManager::new(settings.mesh_workers),
            focus: None,
            pending_cycle: false,
            bootstrapped: false,
            retries: VecDeque::new(),
            stats: StreamingStats::default(),
            settings,
        })
    }

    /// Moves the focus point.
    ///
    /// A cycle is queued whenever the focus enters a different chunk, and on
    /// the very first call.
    pub fn set_focus(&mut self, world_position: Point3<f32>) {
        let coordinate = ChunkCoordinate::from_focus(world_position, &self.settings);
        if self.focus != Some(coordinate) {
            debug!("focus moved to chunk {coordinate}");
            self.focus = Some(coordinate);
            self.pending_cycle = true;
        }
    }

    /// Advances streaming by one step without blocking.
    ///
    /// Phases, in order:
    /// 1. Apply finished meshes; drop stale ones; queue retryable failures
    /// 2. Publish queued retries
    /// 3. If nothing is in flight and a cycle is pending, plan, reconcile and
    ///    publish mesh tasks
    /// 4. Feed queued tasks to free workers
    ///
    /// # Errors
    /// Fatal failures end the tick: a registry collision during
    /// reconciliation, a chunk exceeding the vertex budget, or a poisoned
    /// registry lock.
    pub fn tick(&mut self) -> Result<TickReport, StreamingError> {
        let mut report = TickReport::default();

        for result in self.task_manager.drain_completed() {
            self.apply_mesh_result(result, &mut report)?;
        }

        while let Some(task) = self.retries.pop_front() {
            self.task_manager.publish_task(task);
        }

        if self.pending_cycle && self.task_manager.in_flight() == 0 {
            report.cycle = self.run_cycle()?;
        }

        self.task_manager.process_queued_tasks();
        report.in_flight = self.task_manager.in_flight();
        Ok(report)
    }

    /// Ticks until no cycle is pending and no mesh task is outstanding, or
    /// until `max_ticks` ticks have run. Sleeps briefly between ticks while
    /// workers are busy.
    ///
    /// # Returns
    /// The number of ticks run.
    ///
    /// # Errors
    /// Any error returned by [`tick`](Self::tick).
    pub fn run_until_idle(&mut self, max_ticks: usize) -> Result<usize, StreamingError> {
        for ticks in 0..max_ticks {
            if self.is_idle() {
                return Ok(ticks);
            }
            let report = self.tick()?;
            if report.in_flight > 0 {
                std::thread::sleep(Duration::from_millis(1));
            }
        }
        Ok(max_ticks)
    }

    /// Whether all requested work is done.
    pub fn is_idle(&self) -> bool {
        !self.pending_cycle && self.retries.is_empty() && self.task_manager.in_flight() == 0
    }

    /// The chunk containing the focus point, once one was set.
    pub fn focus(&self) -> Option<ChunkCoordinate> {
        self.focus
    }

    /// The settings the engine runs with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Shared handle to the chunk registry.
    pub fn registry(&self) -> &Shared<ChunkRegistry> {
        &self.registry
    }

    /// The renderer pool, indexed by renderer id.
    pub fn renderers(&self) -> &[ChunkRenderer] {
        self.lifecycle.renderers()
    }

    /// Running totals.
    pub fn stats(&self) -> &StreamingStats {
        &self.stats
    }

    /// Radius of the next cycle. The first cycle may use the smaller
    /// bootstrap radius, in which case a full-radius cycle is queued after it.
    fn next_cycle_radius(&mut self) -> u32 {
        let full = self.settings.generation_radius_in_chunks;
        if self.bootstrapped {
            return full;
        }
        self.bootstrapped = true;
        match self.settings.bootstrap_radius_in_chunks {
            Some(bootstrap) if bootstrap < full => {
                self.pending_cycle = true;
                bootstrap
            }
            _ => full,
        }
    }

    /// Plans, reconciles and publishes mesh tasks for one cycle.
    fn run_cycle(&mut self) -> Result<Option<streaming::ReconcileReport>, StreamingError> {
        self.pending_cycle = false;
        let Some(focus) = self.focus else {
            return Ok(None);
        };
        let radius = self.next_cycle_radius();

        let started = Instant::now();
        let wanted = self.planner.plan(focus, radius);

        let (report, tasks) = {
            let mut registry = self.registry.write()?;
            let report = self.lifecycle.reconcile(
                &wanted,
                &mut registry,
                &self.settings,
                self.height_field.as_ref(),
                self.presentation.as_mut(),
            )?;

            let mut tasks = Vec::with_capacity(report.awaiting_draw.len());
            for &id in &report.awaiting_draw {
                let Some(coordinate) = self.lifecycle.renderer(id).and_then(ChunkRenderer::chunk)
                else {
                    continue;
                };
                let Some(chunk) = registry.lookup(coordinate) else {
                    continue;
                };
                tasks.push(ChunkMeshTask::new(
                    self.registry.clone(),
                    id,
                    coordinate,
                    chunk.generation(),
                    self.settings.mesh_fanout,
                ));
            }
            (report, tasks)
        };

        let duration = started.elapsed();
        self.stats.record_cycle(&report, duration);
        info!(
            "Cycle {} around {focus} (radius {radius}): {} created, {} evicted, {} recycled, {} spawned, {} parked, {} rebuilt, {} meshes queued in {:?}",
            self.stats.cycles,
            report.created,
            report.evicted,
            report.recycled,
            report.spawned,
            report.parked,
            report.rebuilt,
            tasks.len(),
            duration
        );

        for task in tasks {
            self.task_manager.publish_task(task);
        }
        Ok(Some(report))
    }

    /// Routes one finished mesh build.
    fn apply_mesh_result(
        &mut self,
        result: ChunkMeshResult,
        report: &mut TickReport,
    ) -> Result<(), StreamingError> {
        let ChunkMeshResult {
            renderer_id,
            coordinate,
            generation,
            attempt,
            result,
        } = result;

        match result {
            Ok(mesh) => {
                let current = self
                    .registry
                    .read()?
                    .lookup(coordinate)
                    .map(|chunk| chunk.generation());
                let applied = current == Some(generation)
                    && self
                        .lifecycle
                        .renderer_mut(renderer_id)
                        .filter(|renderer| renderer.chunk() == Some(coordinate))
                        .is_some_and(|renderer| {
                            renderer.apply_mesh(&mesh, self.presentation.default_material(), &self.settings)
                        });

                if applied {
                    debug!(
                        "renderer {renderer_id} drew chunk {coordinate} ({} quads)",
                        mesh.quad_count()
                    );
                    self.stats.meshes_built += 1;
                    report.meshes_applied += 1;
                } else {
                    debug!("dropped stale mesh of chunk {coordinate} for renderer {renderer_id}");
                    report.stale_results += 1;
                }
                Ok(())
            }
            Err(err) if err.is_retryable() && attempt < MAX_MESH_ATTEMPTS => {
                warn!("{err}; retrying on the next tick (attempt {attempt} of {MAX_MESH_ATTEMPTS})");
                self.retries.push_back(
                    ChunkMeshTask::new(
                        self.registry.clone(),
                        renderer_id,
                        coordinate,
                        generation,
                        self.settings.mesh_fanout,
                    )
                    .with_attempt(attempt + 1),
                );
                self.stats.mesh_retries += 1;
                report.retries_queued += 1;
                Ok(())
            }
            Err(err) if err.is_retryable() => {
                error!("{err}; giving up after {attempt} attempts until the next cycle");
                let bound = self
                    .lifecycle
                    .renderer(renderer_id)
                    .and_then(|renderer| renderer.chunk());
                if bound == Some(coordinate) {
                    self.lifecycle.abandon(renderer_id, &mut *self.registry.write()?);
                }
                self.stats.meshes_abandoned += 1;
                report.builds_abandoned += 1;
                Ok(())
            }
            Err(MeshError::ChunkNotResident(_)) => {
                debug!("chunk {coordinate} left before its mesh was built");
                report.stale_results += 1;
                Ok(())
            }
            Err(err) => {
                error!("mesh build for chunk {coordinate} failed: {err}");
                Err(err.into())
            }
        }
    }
}
