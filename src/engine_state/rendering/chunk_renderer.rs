//! Pooled render objects for chunks.
//!
//! A `ChunkRenderer` wraps one presentation object and displays at most one
//! chunk at a time. Renderers are never destroyed: when their chunk is
//! evicted they return to the pool and are handed the next chunk that needs
//! drawing.
//!
//! ```text
//! Available --assign--> AwaitingDraw --apply_mesh--> Drawn
//!     ^                      |                         |
//!     +-------release--------+-------------------------+
//! ```
//!
//! All transitions are driven by reconciliation and by applying finished
//! mesh builds; nothing else touches renderer state.

use log::debug;

use super::{MaterialHandle, MeshBuffers, RenderObject};
use crate::engine_state::{settings::Settings, voxels::coordinates::ChunkCoordinate};

/// Where a renderer stands in its pool lifecycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RendererState {
    /// In the pool, free to take a chunk.
    Available,
    /// Assigned to a chunk whose mesh has not been applied yet.
    AwaitingDraw,
    /// Showing its chunk's mesh.
    Drawn,
}

/// A pooled render object and the chunk it currently displays.
pub struct ChunkRenderer {
    /// Stable index in the renderer pool
    id: usize,
    /// The chunk being displayed, if any
    chunk: Option<ChunkCoordinate>,
    /// Pool lifecycle state
    state: RendererState,
    /// Reconciliation cycle in which this renderer last became available
    available_since: u64,
    /// Whether the backing object is currently shown
    visible: bool,
    /// The presentation object
    object: Box<dyn RenderObject>,
}

impl ChunkRenderer {
    /// Wraps a freshly created, hidden render object.
    ///
    /// # Arguments
    /// * `id` - Index of this renderer in the pool
    /// * `object` - The presentation object to drive
    /// * `cycle` - Current reconciliation cycle
    pub fn new(id: usize, object: Box<dyn RenderObject>, cycle: u64) -> Self {
        ChunkRenderer {
            id,
            chunk: None,
            state: RendererState::Available,
            available_since: cycle,
            visible: false,
            object,
        }
    }

    /// Stable index of this renderer in the pool.
    pub fn id(&self) -> usize {
        self.id
    }

    /// The chunk this renderer displays, if any.
    pub fn chunk(&self) -> Option<ChunkCoordinate> {
        self.chunk
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RendererState {
        self.state
    }

    /// Cycle in which this renderer last returned to the pool.
    pub fn available_since(&self) -> u64 {
        self.available_since
    }

    /// Whether the backing object is shown.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Takes on `coordinate`; its mesh still has to be built and applied.
    pub fn assign(&mut self, coordinate: ChunkCoordinate) {
        debug!("renderer {} assigned to chunk {}", self.id, coordinate);
        self.chunk = Some(coordinate);
        self.state = RendererState::AwaitingDraw;
    }

    /// Returns to the pool after the displayed chunk was evicted.
    ///
    /// The object keeps showing its old mesh until it is reassigned and
    /// redrawn, or parked.
    pub fn release(&mut self, cycle: u64) {
        self.chunk = None;
        self.state = RendererState::Available;
        self.available_since = cycle;
    }

    /// Asks for the assigned chunk's mesh to be built again.
    ///
    /// Returns `true` if a drawn renderer went back to awaiting a draw. The
    /// current mesh stays visible until the new one is applied.
    pub fn invalidate(&mut self) -> bool {
        if self.chunk.is_none() || self.state != RendererState::Drawn {
            return false;
        }
        debug!("renderer {} invalidated", self.id);
        self.state = RendererState::AwaitingDraw;
        true
    }

    /// Hides an available renderer that was left without a chunk.
    ///
    /// Returns `true` if the object was visible and has now been hidden.
    pub fn park(&mut self) -> bool {
        if !self.visible {
            return false;
        }
        debug!("renderer {} parked", self.id);
        self.object.set_visible(false);
        self.visible = false;
        true
    }

    /// Uploads `mesh` and shows it at the assigned chunk's position.
    ///
    /// The object is placed at the chunk's world origin and scaled by
    /// `1 / blocksPerMeter`, since mesh vertices are in voxel units.
    ///
    /// # Returns
    /// `false`, leaving everything untouched, unless the renderer is
    /// awaiting a draw.
    pub fn apply_mesh(
        &mut self,
        mesh: &MeshBuffers,
        material: MaterialHandle,
        settings: &Settings,
    ) -> bool {
        let Some(coordinate) = self.chunk else {
            return false;
        };
        if self.state != RendererState::AwaitingDraw {
            return false;
        }

        self.object.set_mesh(mesh);
        self.object.set_material(material);
        self.object.set_transform(
            coordinate.world_origin(settings),
            1.0 / settings.blocks_per_meter as f32,
        );
        self.object.set_visible(true);
        self.visible = true;
        self.state = RendererState::Drawn;
        true
    }
}
