use thiserror::Error;

use crate::topology::{EdgeId, PolygonId, UvSetId, VertexId};

/// Top-level error type for the UV topology engine.
#[derive(Debug, Error)]
pub enum UvWeldError {
    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Mesh(#[from] MeshError),
}

/// Errors related to the UV topology of a single UV set.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("no UV set with id {0}")]
    UnknownUvSet(UvSetId),

    #[error("UV set {source_set} does not share the vertex and edge ids of UV set {target_set}")]
    IncompatibleUvSet {
        source_set: UvSetId,
        target_set: UvSetId,
    },

    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl TopologyError {
    pub(crate) fn vertex_not_found(id: VertexId) -> Self {
        Self::EntityNotFound(format!("vertex {id}"))
    }

    pub(crate) fn edge_not_found(id: EdgeId) -> Self {
        Self::EntityNotFound(format!("edge {id}"))
    }

    pub(crate) fn polygon_not_found(id: PolygonId) -> Self {
        Self::EntityNotFound(format!("polygon {id}"))
    }
}

/// Errors raised while reading or building the source mesh.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MeshError {
    #[error("polygon {0} has fewer than 3 corners")]
    DegeneratePolygon(PolygonId),

    #[error("polygon {0} has different numbers of corners and edges")]
    MalformedPolygon(PolygonId),

    #[error("vertex {vertex} has no UV coordinates in UV set {uv_set}")]
    MissingUv { vertex: VertexId, uv_set: UvSetId },

    #[error("mesh edge between points {0} and {1} is shared by more than two polygons")]
    NonManifoldEdge(usize, usize),

    #[error("polygon has {corners} corners but {uvs} UV coordinates")]
    UvCountMismatch { corners: usize, uvs: usize },

    #[error("point index {0} is out of range")]
    PointOutOfRange(usize),

    #[error("mesh vertex {0} is not known to the mesh")]
    UnknownVertex(VertexId),
}

/// Convenience type alias for results using [`UvWeldError`].
pub type Result<T> = std::result::Result<T, UvWeldError>;
