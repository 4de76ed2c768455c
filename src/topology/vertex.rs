use std::fmt;

use crate::math::Point2;

use super::edge::EdgeId;
use super::polygon::PolygonId;

/// Stable identifier of a UV vertex, assigned by the source mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertexId(pub u32);

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One UV-space corner of exactly one polygon.
///
/// Many vertices can coincide through merging; each still owns its own
/// position, which is kept equal to the positions of its merged siblings.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub id: VertexId,
    /// The UV coordinates of the corner.
    pub position: Point2,
    /// The polygon this corner belongs to.
    pub polygon_id: PolygonId,
    /// The two boundary edges of the polygon meeting at this corner:
    /// the edge arriving at it, then the edge leaving it.
    pub edge_ids: [EdgeId; 2],
    /// Opaque slot in the render buffer of the UV set.
    pub row_index: usize,
}

impl Vertex {
    /// Returns the incident edge that is not `edge`, or `None` if `edge` is
    /// not incident to this vertex.
    #[must_use]
    pub fn other_edge(&self, edge: EdgeId) -> Option<EdgeId> {
        match self.edge_ids {
            [a, b] if a == edge => Some(b),
            [a, b] if b == edge => Some(a),
            _ => None,
        }
    }
}
