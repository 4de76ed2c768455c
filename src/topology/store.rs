use std::collections::BTreeMap;

use crate::error::TopologyError;
use crate::math::Point2;

use super::{Edge, EdgeId, Polygon, PolygonId, Vertex, VertexId};

/// Flat id-indexed storage of the vertices, edges and polygons of one UV set.
///
/// Entities reference each other only through their ids; the store is the
/// sole owner of the values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubobjectStore {
    vertices: BTreeMap<VertexId, Vertex>,
    edges: BTreeMap<EdgeId, Edge>,
    polygons: BTreeMap<PolygonId, Polygon>,
}

impl SubobjectStore {
    /// Creates a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Vertex operations ---

    /// Inserts a vertex, replacing any vertex with the same id.
    pub fn add_vertex(&mut self, vertex: Vertex) {
        self.vertices.insert(vertex.id, vertex);
    }

    /// Returns a reference to the vertex, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is not in the store.
    pub fn vertex(&self, id: VertexId) -> Result<&Vertex, TopologyError> {
        self.vertices
            .get(&id)
            .ok_or_else(|| TopologyError::vertex_not_found(id))
    }

    /// Returns a mutable reference to the vertex, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is not in the store.
    pub fn vertex_mut(&mut self, id: VertexId) -> Result<&mut Vertex, TopologyError> {
        self.vertices
            .get_mut(&id)
            .ok_or_else(|| TopologyError::vertex_not_found(id))
    }

    /// Returns the UV position of a vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is not in the store.
    pub fn position(&self, id: VertexId) -> Result<Point2, TopologyError> {
        Ok(self.vertex(id)?.position)
    }

    /// Iterates over all vertices in ascending id order.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    /// Iterates over all vertex ids in ascending order.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices.keys().copied()
    }

    /// Number of vertices in the store.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    // --- Edge operations ---

    /// Inserts an edge, replacing any edge with the same id.
    pub fn add_edge(&mut self, edge: Edge) {
        self.edges.insert(edge.id, edge);
    }

    /// Returns a reference to the edge, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is not in the store.
    pub fn edge(&self, id: EdgeId) -> Result<&Edge, TopologyError> {
        self.edges
            .get(&id)
            .ok_or_else(|| TopologyError::edge_not_found(id))
    }

    /// Iterates over all edges in ascending id order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Iterates over all edge ids in ascending order.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges.keys().copied()
    }

    /// Number of edges in the store.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    // --- Polygon operations ---

    /// Inserts a polygon, replacing any polygon with the same id.
    pub fn add_polygon(&mut self, polygon: Polygon) {
        self.polygons.insert(polygon.id, polygon);
    }

    /// Returns a reference to the polygon, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the polygon is not in the store.
    pub fn polygon(&self, id: PolygonId) -> Result<&Polygon, TopologyError> {
        self.polygons
            .get(&id)
            .ok_or_else(|| TopologyError::polygon_not_found(id))
    }

    /// Iterates over all polygons in ascending id order.
    pub fn polygons(&self) -> impl Iterator<Item = &Polygon> {
        self.polygons.values()
    }

    /// Iterates over all polygon ids in ascending order.
    pub fn polygon_ids(&self) -> impl Iterator<Item = PolygonId> + '_ {
        self.polygons.keys().copied()
    }

    /// Number of polygons in the store.
    #[must_use]
    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    /// Recomputes the cached centers of the given polygons.
    ///
    /// # Errors
    ///
    /// Returns an error if a polygon or one of its corners is missing.
    pub fn update_polygon_centers(
        &mut self,
        polygon_ids: impl IntoIterator<Item = PolygonId>,
    ) -> Result<(), TopologyError> {
        for polygon_id in polygon_ids {
            let corners = self
                .polygon(polygon_id)?
                .vertex_ids
                .iter()
                .map(|&v| self.position(v))
                .collect::<Result<Vec<_>, _>>()?;
            if let Some(polygon) = self.polygons.get_mut(&polygon_id) {
                polygon.update_center(&corners);
            }
        }
        Ok(())
    }

    /// Returns `true` if both stores hold exactly the same vertex and edge ids.
    #[must_use]
    pub fn same_id_space(&self, other: &Self) -> bool {
        self.vertices.keys().eq(other.vertices.keys())
            && self.edges.keys().eq(other.edges.keys())
            && self.polygons.keys().eq(other.polygons.keys())
    }
}
