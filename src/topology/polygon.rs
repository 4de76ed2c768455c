use std::fmt;

use crate::math::polygon_2d::polygon_center;
use crate::math::Point2;

use super::edge::EdgeId;
use super::vertex::VertexId;

/// Stable identifier of a UV polygon, assigned by the source mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PolygonId(pub u32);

impl fmt::Display for PolygonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A polygon of the UV set: a cyclic boundary plus the triangles used to
/// draw it.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub id: PolygonId,
    /// Boundary corners in cyclic order.
    pub vertex_ids: Vec<VertexId>,
    /// Boundary edges in cyclic order; `edge_ids[i]` runs from
    /// `vertex_ids[i]` to `vertex_ids[i + 1]`.
    pub edge_ids: Vec<EdgeId>,
    /// Triangles covering the polygon.
    pub triangles: Vec<[VertexId; 3]>,
    /// Cached UV-space center, refreshed whenever a corner moves.
    pub center: Point2,
}

impl Polygon {
    /// Recomputes the cached center from the corner positions.
    pub fn update_center(&mut self, corners: &[Point2]) {
        self.center = polygon_center(corners);
    }
}
