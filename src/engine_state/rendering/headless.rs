//! An in-memory presentation layer.
//!
//! `HeadlessPresentation` draws nothing. Every object it creates writes its
//! latest state into a shared record table, which the binary reports on and
//! tests assert against. Uploads are measured in bytes the way a GPU backend
//! would see them, by casting the mesh arrays with `bytemuck`.

use cgmath::Point3;
use log::warn;

use super::{MaterialHandle, MeshBuffers, Presentation, RenderObject};
use crate::core::Shared;

/// What a headless object was last told to show.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectRecord {
    /// Name given at creation
    pub name: String,
    /// Current visibility
    pub visible: bool,
    /// World position, once a transform was set
    pub position: Option<Point3<f32>>,
    /// Uniform scale
    pub scale: f32,
    /// Current material, once one was set
    pub material: Option<MaterialHandle>,
    /// Vertices in the current mesh
    pub vertex_count: usize,
    /// Indices in the current mesh
    pub index_count: usize,
    /// Bytes uploaded for the current mesh
    pub uploaded_bytes: usize,
    /// Number of meshes ever uploaded to this object
    pub mesh_uploads: usize,
}

impl ObjectRecord {
    fn new(name: &str) -> Self {
        ObjectRecord {
            name: name.to_string(),
            visible: false,
            position: None,
            scale: 1.0,
            material: None,
            vertex_count: 0,
            index_count: 0,
            uploaded_bytes: 0,
            mesh_uploads: 0,
        }
    }
}

/// A [`Presentation`] that records object state instead of drawing.
#[derive(Clone)]
pub struct HeadlessPresentation {
    records: Shared<Vec<ObjectRecord>>,
    material: MaterialHandle,
}

impl Default for HeadlessPresentation {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessPresentation {
    /// Creates a presentation with no objects.
    pub fn new() -> Self {
        HeadlessPresentation {
            records: Shared::new(Vec::new()),
            material: MaterialHandle(1),
        }
    }

    /// A copy of every object's current record, in creation order.
    pub fn snapshot(&self) -> Vec<ObjectRecord> {
        self.records
            .read()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    /// Number of objects created so far.
    pub fn object_count(&self) -> usize {
        self.records.read().map(|records| records.len()).unwrap_or(0)
    }

    /// Number of currently visible objects.
    pub fn visible_count(&self) -> usize {
        self.records
            .read()
            .map(|records| records.iter().filter(|record| record.visible).count())
            .unwrap_or(0)
    }
}

impl Presentation for HeadlessPresentation {
    fn create_object(&mut self, name: &str) -> Box<dyn RenderObject> {
        let index = match self.records.write() {
            Ok(mut records) => {
                records.push(ObjectRecord::new(name));
                records.len() - 1
            }
            Err(err) => {
                warn!("{err}; object {name} will not be recorded");
                usize::MAX
            }
        };
        Box::new(HeadlessObject {
            index,
            records: self.records.clone(),
        })
    }

    fn default_material(&self) -> MaterialHandle {
        self.material
    }
}

/// A render object backed by one slot of the record table.
struct HeadlessObject {
    index: usize,
    records: Shared<Vec<ObjectRecord>>,
}

impl HeadlessObject {
    fn update(&self, apply: impl FnOnce(&mut ObjectRecord)) {
        if let Ok(mut records) = self.records.write() {
            if let Some(record) = records.get_mut(self.index) {
                apply(record);
            }
        }
    }
}

impl RenderObject for HeadlessObject {
    fn set_mesh(&mut self, mesh: &MeshBuffers) {
        let uploaded_bytes = mesh.vertex_bytes().len()
            + mesh.normal_bytes().len()
            + mesh.uv_bytes().len()
            + mesh.index_bytes().len();
        self.update(|record| {
            record.vertex_count = mesh.vertex_count();
            record.index_count = mesh.triangle_indices.len();
            record.uploaded_bytes = uploaded_bytes;
            record.mesh_uploads += 1;
        });
    }

    fn set_material(&mut self, material: MaterialHandle) {
        self.update(|record| record.material = Some(material));
    }

    fn set_transform(&mut self, position: Point3<f32>, scale: f32) {
        self.update(|record| {
            record.position = Some(position);
            record.scale = scale;
        });
    }

    fn set_visible(&mut self, visible: bool) {
        self.update(|record| record.visible = visible);
    }
}
