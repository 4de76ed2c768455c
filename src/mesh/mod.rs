mod memory;

#[cfg(test)]
pub(crate) mod fixtures;

pub use memory::{InMemoryMesh, MeshBuilder, MeshNotification};

use crate::math::Point2;
use crate::topology::{EdgeId, PolygonId, UvSetId, VertexId};

/// Snapshot of one mesh polygon.
///
/// `edge_ids[i]` runs from `vertex_ids[i]` to `vertex_ids[(i + 1) % n]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshPolygon {
    pub id: PolygonId,
    pub vertex_ids: Vec<VertexId>,
    pub edge_ids: Vec<EdgeId>,
    pub triangles: Vec<[VertexId; 3]>,
}

/// Snapshot of one mesh corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshVertex {
    pub id: VertexId,
    pub polygon_id: PolygonId,
    /// Slot of the corner in the mesh's vertex buffer.
    pub row_index: usize,
}

/// Query and command interface of the mesh owning the UV data.
///
/// Vertex, edge and polygon ids are shared between the mesh and its UV
/// sets: every mesh corner has exactly one UV vertex per UV set.
pub trait MeshGeometry {
    /// All polygons of the mesh.
    fn polygons(&self) -> Vec<MeshPolygon>;

    /// The corner with the given id.
    fn vertex(&self, id: VertexId) -> Option<MeshVertex>;

    /// The stored UV coordinates of a corner in a UV set.
    fn uv(&self, uv_set: UvSetId, id: VertexId) -> Option<Point2>;

    /// All corners located at the same 3D point as `id`, including `id`.
    fn merged_vertex(&self, id: VertexId) -> Vec<VertexId>;

    /// All polygon edges coinciding with `id` in 3D, including `id`.
    fn merged_edge(&self, id: EdgeId) -> Vec<EdgeId>;

    /// Persists new UV coordinates for the given corners.
    fn apply_uv_edits(&mut self, uv_set: UvSetId, edits: &[(VertexId, Point2)]);

    /// Registers edges as UV seams.
    fn add_tex_seam_edges(&mut self, uv_set: UvSetId, edge_ids: &[EdgeId]);

    /// Unregisters edges as UV seams.
    fn remove_tex_seam_edges(&mut self, uv_set: UvSetId, edge_ids: &[EdgeId]);

    /// Reports corners whose UV connectivity changed, so that render
    /// buffers can be re-derived.
    fn uv_topology_changed(&mut self, _uv_set: UvSetId, _vertex_ids: &[VertexId]) {}
}
