use std::fmt;

use super::polygon::PolygonId;
use super::vertex::VertexId;

/// Stable identifier of a UV edge, assigned by the source mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(pub u32);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Directed boundary edge of one polygon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub id: EdgeId,
    /// Start and end vertex, in polygon winding order.
    pub vertex_ids: [VertexId; 2],
    /// The polygon owning this edge.
    pub polygon_id: PolygonId,
}

impl Edge {
    /// Returns `true` if `vertex` is one of the two endpoints.
    #[must_use]
    pub fn contains(&self, vertex: VertexId) -> bool {
        self.vertex_ids.contains(&vertex)
    }

    /// Returns the endpoint that is not `vertex`.
    #[must_use]
    pub fn other_vertex(&self, vertex: VertexId) -> Option<VertexId> {
        match self.vertex_ids {
            [a, b] if a == vertex => Some(b),
            [a, b] if b == vertex => Some(a),
            _ => None,
        }
    }
}
