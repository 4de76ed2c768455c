use std::collections::{BTreeSet, HashMap};

use slotmap::SlotMap;

use crate::error::TopologyError;

use super::{EdgeId, MergedEdge, MergedEdgeId, MergedVertex, MergedVertexId, VertexId};

/// Partition of the vertex and edge ids of one UV set into merged groups.
///
/// Every vertex id maps to exactly one [`MergedVertex`] and every edge id to
/// exactly one [`MergedEdge`]. Group handles are generational keys, so a
/// handle to a group that has been dissolved never resolves again.
#[derive(Debug, Clone, Default)]
pub struct MergeRegistry {
    merged_vertices: SlotMap<MergedVertexId, MergedVertex>,
    merged_edges: SlotMap<MergedEdgeId, MergedEdge>,
    vertex_groups: HashMap<VertexId, MergedVertexId>,
    edge_groups: HashMap<EdgeId, MergedEdgeId>,
    seams: BTreeSet<EdgeId>,
}

impl MergeRegistry {
    /// Creates a new, empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Merged vertex operations ---

    /// Registers a new merged vertex and returns its handle.
    ///
    /// # Errors
    ///
    /// Returns an error if `ids` is empty or one of the ids already belongs
    /// to a group.
    pub fn add_merged_vertex(
        &mut self,
        ids: BTreeSet<VertexId>,
    ) -> Result<MergedVertexId, TopologyError> {
        if ids.is_empty() {
            return Err(TopologyError::InvariantViolation(
                "merged vertex without members".into(),
            ));
        }
        if let Some(taken) = ids.iter().find(|id| self.vertex_groups.contains_key(id)) {
            return Err(TopologyError::InvariantViolation(format!(
                "vertex {taken} already belongs to a merged vertex"
            )));
        }
        let key = self.merged_vertices.insert(MergedVertex::new(ids));
        for id in self.merged_vertices[key].ids() {
            self.vertex_groups.insert(id, key);
        }
        Ok(key)
    }

    /// Returns the handle of the merged vertex containing `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is not registered.
    pub fn merged_vertex_id(&self, id: VertexId) -> Result<MergedVertexId, TopologyError> {
        self.vertex_groups
            .get(&id)
            .copied()
            .ok_or_else(|| TopologyError::vertex_not_found(id))
    }

    /// Returns the merged vertex behind a handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle no longer resolves.
    pub fn merged_vertex(&self, key: MergedVertexId) -> Result<&MergedVertex, TopologyError> {
        self.merged_vertices
            .get(key)
            .ok_or_else(|| TopologyError::EntityNotFound(format!("merged vertex {key:?}")))
    }

    /// Returns the merged vertex containing `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is not registered.
    pub fn merged_vertex_of(&self, id: VertexId) -> Result<&MergedVertex, TopologyError> {
        self.merged_vertex(self.merged_vertex_id(id)?)
    }

    /// Returns `true` if the handle still resolves to a merged vertex.
    #[must_use]
    pub fn contains_merged_vertex(&self, key: MergedVertexId) -> bool {
        self.merged_vertices.contains_key(key)
    }

    /// Iterates over all merged vertices.
    pub fn merged_vertices(&self) -> impl Iterator<Item = (MergedVertexId, &MergedVertex)> {
        self.merged_vertices.iter()
    }

    /// Number of merged vertices.
    #[must_use]
    pub fn merged_vertex_count(&self) -> usize {
        self.merged_vertices.len()
    }

    /// Moves `ids` out of the merged vertex `key` into a new merged vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if `ids` is empty, is not a proper subset of the
    /// group, or the handle does not resolve.
    pub fn separate_vertices(
        &mut self,
        key: MergedVertexId,
        ids: &BTreeSet<VertexId>,
    ) -> Result<MergedVertexId, TopologyError> {
        let group = self.merged_vertex(key)?;
        if ids.is_empty() || ids.len() >= group.len() || !ids.is_subset(group.id_set()) {
            return Err(TopologyError::InvariantViolation(format!(
                "cannot separate {} of {} vertices from merged vertex {key:?}",
                ids.len(),
                group.len()
            )));
        }
        if let Some(group) = self.merged_vertices.get_mut(key) {
            group.id_set_mut().retain(|id| !ids.contains(id));
        }
        for id in ids {
            self.vertex_groups.remove(id);
        }
        self.add_merged_vertex(ids.clone())
    }

    /// Dissolves the given merged vertices into one new merged vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if a handle does not resolve.
    pub fn merge_vertex_groups(
        &mut self,
        keys: &BTreeSet<MergedVertexId>,
    ) -> Result<MergedVertexId, TopologyError> {
        if let Some(missing) = keys.iter().find(|k| !self.merged_vertices.contains_key(**k)) {
            return Err(TopologyError::EntityNotFound(format!(
                "merged vertex {missing:?}"
            )));
        }
        let mut ids = BTreeSet::new();
        for key in keys {
            if let Some(group) = self.merged_vertices.remove(*key) {
                ids.extend(group.ids());
            }
        }
        for id in &ids {
            self.vertex_groups.remove(id);
        }
        self.add_merged_vertex(ids)
    }

    // --- Merged edge operations ---

    /// Registers a new merged edge and returns its handle. Single-member
    /// groups are recorded as seams.
    ///
    /// # Errors
    ///
    /// Returns an error if a member already belongs to a group.
    pub fn add_merged_edge(&mut self, edge: MergedEdge) -> Result<MergedEdgeId, TopologyError> {
        if let Some(taken) = edge.ids().find(|id| self.edge_groups.contains_key(id)) {
            return Err(TopologyError::InvariantViolation(format!(
                "edge {taken} already belongs to a merged edge"
            )));
        }
        let key = self.merged_edges.insert(edge);
        for id in edge.ids() {
            self.edge_groups.insert(id, key);
        }
        if edge.is_seam() {
            self.seams.insert(edge.first());
        }
        Ok(key)
    }

    /// Returns the handle of the merged edge containing `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is not registered.
    pub fn merged_edge_id(&self, id: EdgeId) -> Result<MergedEdgeId, TopologyError> {
        self.edge_groups
            .get(&id)
            .copied()
            .ok_or_else(|| TopologyError::edge_not_found(id))
    }

    /// Returns the merged edge behind a handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle no longer resolves.
    pub fn merged_edge(&self, key: MergedEdgeId) -> Result<&MergedEdge, TopologyError> {
        self.merged_edges
            .get(key)
            .ok_or_else(|| TopologyError::EntityNotFound(format!("merged edge {key:?}")))
    }

    /// Returns the merged edge containing `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is not registered.
    pub fn merged_edge_of(&self, id: EdgeId) -> Result<&MergedEdge, TopologyError> {
        self.merged_edge(self.merged_edge_id(id)?)
    }

    /// Returns `true` if the handle still resolves to a merged edge.
    #[must_use]
    pub fn contains_merged_edge(&self, key: MergedEdgeId) -> bool {
        self.merged_edges.contains_key(key)
    }

    /// Iterates over all merged edges.
    pub fn merged_edges(&self) -> impl Iterator<Item = (MergedEdgeId, &MergedEdge)> {
        self.merged_edges.iter()
    }

    /// Number of merged edges.
    #[must_use]
    pub fn merged_edge_count(&self) -> usize {
        self.merged_edges.len()
    }

    /// Tears a welded merged edge apart.
    ///
    /// The larger member stays behind under `key`; the smaller member moves
    /// to the returned new handle. Both become seams.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle does not resolve or is already a seam.
    pub fn tear_edge(&mut self, key: MergedEdgeId) -> Result<MergedEdgeId, TopologyError> {
        let Some((first, second)) = self.merged_edge(key)?.pair() else {
            return Err(TopologyError::InvariantViolation(format!(
                "merged edge {key:?} is already a seam"
            )));
        };
        self.merged_edges[key] = MergedEdge::seam(second);
        self.seams.insert(second);
        self.edge_groups.remove(&first);
        self.add_merged_edge(MergedEdge::seam(first))
    }

    /// Welds two seams into one merged edge kept under `keep`; `absorb` is
    /// dissolved.
    ///
    /// # Errors
    ///
    /// Returns an error if either handle does not resolve, they are the same
    /// group, or either one is not a seam.
    pub fn weld_edges(
        &mut self,
        keep: MergedEdgeId,
        absorb: MergedEdgeId,
    ) -> Result<MergedEdgeId, TopologyError> {
        let a = *self.merged_edge(keep)?;
        let b = *self.merged_edge(absorb)?;
        if keep == absorb || !a.is_seam() || !b.is_seam() {
            return Err(TopologyError::InvariantViolation(format!(
                "cannot weld merged edges {keep:?} and {absorb:?}"
            )));
        }
        self.merged_edges.remove(absorb);
        self.merged_edges[keep] = MergedEdge::welded(a.first(), b.first());
        self.edge_groups.insert(b.first(), keep);
        self.seams.remove(&a.first());
        self.seams.remove(&b.first());
        Ok(keep)
    }

    // --- Seams ---

    /// Returns `true` if `id` is a registered seam edge.
    #[must_use]
    pub fn is_seam(&self, id: EdgeId) -> bool {
        self.seams.contains(&id)
    }

    /// Iterates over the seam edges in ascending id order.
    pub fn seam_edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.seams.iter().copied()
    }

    /// Number of seam edges.
    #[must_use]
    pub fn seam_count(&self) -> usize {
        self.seams.len()
    }

    // --- Snapshots ---

    /// The vertex partition as sorted groups, in ascending order.
    #[must_use]
    pub fn vertex_partition(&self) -> Vec<Vec<VertexId>> {
        let mut groups: Vec<Vec<VertexId>> = self
            .merged_vertices
            .values()
            .map(|group| group.ids().collect())
            .collect();
        groups.sort();
        groups
    }

    /// The edge partition as sorted groups, in ascending order.
    #[must_use]
    pub fn edge_partition(&self) -> Vec<Vec<EdgeId>> {
        let mut groups: Vec<Vec<EdgeId>> = self
            .merged_edges
            .values()
            .map(|group| group.ids().collect())
            .collect();
        groups.sort();
        groups
    }
}
