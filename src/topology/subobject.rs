use super::{Edge, MergedEdge, MergedVertex, Polygon, SubobjectStore, Vertex, VertexId};

/// The three subobject levels a UV set can be edited at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SubobjectLevel {
    Vertex,
    Edge,
    Polygon,
}

/// Shared interface of single and merged subobjects.
pub trait Subobject {
    /// The level this subobject lives on.
    fn level(&self) -> SubobjectLevel;

    /// Whether this is a merged group rather than a single subobject.
    fn is_merged(&self) -> bool;

    /// The corners spanned by this subobject, i.e. the vertices that move
    /// when it is transformed.
    fn vertex_ids(&self, store: &SubobjectStore) -> Vec<VertexId>;
}

impl Subobject for Vertex {
    fn level(&self) -> SubobjectLevel {
        SubobjectLevel::Vertex
    }

    fn is_merged(&self) -> bool {
        false
    }

    fn vertex_ids(&self, _store: &SubobjectStore) -> Vec<VertexId> {
        vec![self.id]
    }
}

impl Subobject for Edge {
    fn level(&self) -> SubobjectLevel {
        SubobjectLevel::Edge
    }

    fn is_merged(&self) -> bool {
        false
    }

    fn vertex_ids(&self, _store: &SubobjectStore) -> Vec<VertexId> {
        self.vertex_ids.to_vec()
    }
}

impl Subobject for Polygon {
    fn level(&self) -> SubobjectLevel {
        SubobjectLevel::Polygon
    }

    fn is_merged(&self) -> bool {
        false
    }

    fn vertex_ids(&self, _store: &SubobjectStore) -> Vec<VertexId> {
        self.vertex_ids.clone()
    }
}

impl Subobject for MergedVertex {
    fn level(&self) -> SubobjectLevel {
        SubobjectLevel::Vertex
    }

    fn is_merged(&self) -> bool {
        true
    }

    fn vertex_ids(&self, _store: &SubobjectStore) -> Vec<VertexId> {
        self.ids().collect()
    }
}

impl Subobject for MergedEdge {
    fn level(&self) -> SubobjectLevel {
        SubobjectLevel::Edge
    }

    fn is_merged(&self) -> bool {
        true
    }

    fn vertex_ids(&self, store: &SubobjectStore) -> Vec<VertexId> {
        let mut ids: Vec<VertexId> = self
            .ids()
            .filter_map(|id| store.edge(id).ok())
            .flat_map(|edge| edge.vertex_ids)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}
