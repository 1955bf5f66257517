//! # Chunk Lifecycle Manager
//!
//! Reconciles the chunks that are resident against the chunks that should
//! be, and keeps a pool of renderers so objects are reused instead of being
//! destroyed and recreated as the focus moves.
//!
//! ## Reconciliation
//!
//! [`ChunkLifecycleManager::reconcile`] applies one planning result:
//!
//! 1. Every resident chunk is marked `Keep` if wanted, `Remove` otherwise.
//! 2. Renderers showing `Remove` chunks return to the pool, then those
//!    chunks are deleted from the registry.
//! 3. Every wanted coordinate that is not resident gets a freshly generated
//!    chunk in state `AwaitDraw`.
//! 4. Pooled renderers are handed the `AwaitDraw` chunks, oldest-available
//!    first and in coordinate order. Each assigned renderer is
//!    `AwaitingDraw` and its chunk `Done`. Renderers left over are hidden;
//!    chunks left over get newly created renderers.
//! 5. Kept chunks that touch a created or evicted chunk across a face have
//!    their renderer sent back to `AwaitingDraw`, since their boundary faces
//!    were culled against a different set of neighbours.
//! 6. The ids of all `AwaitingDraw` renderers are reported so the caller can
//!    start their mesh builds.
//!
//! Calling it twice with the same wanted set changes nothing the second
//! time: no chunk is regenerated and no renderer is reassigned.
//!
//! ## Ordering
//!
//! Every step walks coordinates in sorted order and the pool in
//! `(available_since, id)` order, so a given registry and wanted set always
//! produce the same assignment.

use std::collections::HashSet;

use log::debug;

use crate::engine_state::{
    error::RegistryError,
    rendering::{ChunkRenderer, Presentation, RendererState},
    settings::Settings,
    voxels::{
        chunk::{ChunkData, ChunkState},
        coordinates::ChunkCoordinate,
        height_field::HeightField,
        registry::ChunkRegistry,
    },
};

/// What one reconciliation did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Chunks generated and inserted
    pub created: usize,
    /// Chunks removed from the registry
    pub evicted: usize,
    /// Pooled renderers handed a new chunk
    pub recycled: usize,
    /// Renderers created because the pool ran dry
    pub spawned: usize,
    /// Pooled renderers hidden for lack of a chunk
    pub parked: usize,
    /// Kept chunks queued for a rebuild because a face neighbour came or went
    pub rebuilt: usize,
    /// Renderers whose mesh must now be built, by id
    pub awaiting_draw: Vec<usize>,
}

impl ReconcileReport {
    /// Whether the reconciliation changed nothing.
    pub fn is_noop(&self) -> bool {
        self.created == 0
            && self.evicted == 0
            && self.recycled == 0
            && self.spawned == 0
            && self.parked == 0
            && self.rebuilt == 0
    }
}

/// Owns the renderer pool and applies wanted sets to the registry.
#[derive(Default)]
pub struct ChunkLifecycleManager {
    /// Every renderer ever created, indexed by id
    renderers: Vec<ChunkRenderer>,
    /// Number of reconciliations run so far
    cycle: u64,
}

impl ChunkLifecycleManager {
    /// Creates a manager with an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a manager with room for `capacity` renderers.
    pub fn with_capacity(capacity: usize) -> Self {
        ChunkLifecycleManager {
            renderers: Vec::with_capacity(capacity),
            cycle: 0,
        }
    }

    /// All renderers, indexed by id.
    pub fn renderers(&self) -> &[ChunkRenderer] {
        &self.renderers
    }

    /// The renderer with the given id.
    pub fn renderer(&self, id: usize) -> Option<&ChunkRenderer> {
        self.renderers.get(id)
    }

    /// Mutable access to the renderer with the given id.
    pub fn renderer_mut(&mut self, id: usize) -> Option<&mut ChunkRenderer> {
        self.renderers.get_mut(id)
    }

    /// The renderer currently assigned to `coordinate`, if any.
    pub fn renderer_for(&self, coordinate: ChunkCoordinate) -> Option<&ChunkRenderer> {
        self.renderers
            .iter()
            .find(|renderer| renderer.chunk() == Some(coordinate))
    }

    /// Number of reconciliations run so far.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Gives up on drawing renderer `id`'s chunk for now.
    ///
    /// The renderer returns to the pool hidden, and its chunk goes back to
    /// `AwaitDraw` so the next reconciliation assigns it again.
    ///
    /// # Returns
    /// The chunk the renderer was assigned to, if any.
    pub fn abandon(&mut self, id: usize, registry: &mut ChunkRegistry) -> Option<ChunkCoordinate> {
        let renderer = self.renderers.get_mut(id)?;
        let coordinate = renderer.chunk()?;
        renderer.release(self.cycle);
        renderer.park();
        if let Some(chunk) = registry.lookup_mut(coordinate) {
            chunk.state = ChunkState::AwaitDraw;
        }
        Some(coordinate)
    }

    /// Brings the registry and renderer pool in line with `wanted`.
    ///
    /// # Arguments
    /// * `wanted` - The coordinates that should be resident
    /// * `registry` - The chunk registry, exclusively borrowed for the cycle
    /// * `settings` - World settings used to generate new chunks
    /// * `height_field` - Terrain used to fill new chunks
    /// * `presentation` - Creates render objects when the pool runs dry
    ///
    /// # Errors
    /// Returns [`RegistryError::Collision`] if a generated chunk's coordinate
    /// is already resident, which means the registry and the diff disagree.
    pub fn reconcile<H: HeightField + ?Sized>(
        &mut self,
        wanted: &HashSet<ChunkCoordinate>,
        registry: &mut ChunkRegistry,
        settings: &Settings,
        height_field: &H,
        presentation: &mut dyn Presentation,
    ) -> Result<ReconcileReport, RegistryError> {
        self.cycle += 1;
        let mut report = ReconcileReport::default();

        // Mark
        for chunk in registry.iter_mut() {
            chunk.state = if wanted.contains(&chunk.coordinate()) {
                match chunk.state {
                    ChunkState::AwaitDraw => ChunkState::AwaitDraw,
                    _ => ChunkState::Keep,
                }
            } else {
                ChunkState::Remove
            };
        }

        // Evict
        let mut removed: Vec<ChunkCoordinate> = registry
            .iter()
            .filter(|chunk| chunk.state == ChunkState::Remove)
            .map(ChunkData::coordinate)
            .collect();
        removed.sort();
        let removed_set: HashSet<_> = removed.iter().copied().collect();
        for renderer in &mut self.renderers {
            if renderer.chunk().is_some_and(|c| removed_set.contains(&c)) {
                renderer.release(self.cycle);
            }
        }
        for coordinate in &removed {
            registry.remove(*coordinate);
            debug!("chunk {coordinate} evicted");
        }
        report.evicted = removed.len();

        // Create
        let mut missing: Vec<ChunkCoordinate> = wanted
            .iter()
            .copied()
            .filter(|coordinate| !registry.contains(*coordinate))
            .collect();
        missing.sort();
        let mut touched = removed_set;
        touched.extend(missing.iter().copied());
        for coordinate in missing {
            let generation = registry.next_generation();
            registry.insert(ChunkData::generate(coordinate, settings, height_field, generation))?;
            debug!("chunk {coordinate} generated");
            report.created += 1;
        }

        // Assign
        let mut awaiting: Vec<ChunkCoordinate> = registry
            .iter()
            .filter(|chunk| chunk.state == ChunkState::AwaitDraw)
            .map(ChunkData::coordinate)
            .collect();
        awaiting.sort();

        let mut pool: Vec<usize> = self
            .renderers
            .iter()
            .filter(|renderer| renderer.state() == RendererState::Available)
            .map(ChunkRenderer::id)
            .collect();
        pool.sort_by_key(|&id| (self.renderers[id].available_since(), id));

        let mut awaiting = awaiting.into_iter();
        for id in pool {
            match awaiting.next() {
                Some(coordinate) => {
                    self.renderers[id].assign(coordinate);
                    mark_done(registry, coordinate);
                    report.recycled += 1;
                }
                None => {
                    if self.renderers[id].park() {
                        report.parked += 1;
                    }
                }
            }
        }
        for coordinate in awaiting {
            let id = self.renderers.len();
            let object = presentation.create_object(&format!("Chunk - {id}"));
            let mut renderer = ChunkRenderer::new(id, object, self.cycle);
            renderer.assign(coordinate);
            self.renderers.push(renderer);
            mark_done(registry, coordinate);
            report.spawned += 1;
        }

        // Rebuild seams
        if !touched.is_empty() {
            let mut seams: Vec<ChunkCoordinate> = registry
                .iter()
                .filter(|chunk| chunk.state == ChunkState::Keep)
                .map(ChunkData::coordinate)
                .filter(|coordinate| {
                    coordinate
                        .neighbors()
                        .iter()
                        .any(|neighbor| touched.contains(neighbor))
                })
                .collect();
            seams.sort();
            for coordinate in seams {
                let renderer = self
                    .renderers
                    .iter_mut()
                    .find(|renderer| renderer.chunk() == Some(coordinate));
                if renderer.is_some_and(ChunkRenderer::invalidate) {
                    report.rebuilt += 1;
                }
            }
        }

        // Report
        report.awaiting_draw = self
            .renderers
            .iter()
            .filter(|renderer| renderer.state() == RendererState::AwaitingDraw)
            .map(ChunkRenderer::id)
            .collect();

        Ok(report)
    }
}

fn mark_done(registry: &mut ChunkRegistry, coordinate: ChunkCoordinate) {
    if let Some(chunk) = registry.lookup_mut(coordinate) {
        chunk.state = ChunkState::Done;
    }
}
