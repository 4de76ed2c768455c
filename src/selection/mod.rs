pub mod special;

use std::collections::BTreeSet;

use tracing::debug;

use crate::error::{Result, TopologyError};
use crate::math::{average, Point2};
use crate::topology::{
    EdgeId, MergeRegistry, MergedEdgeId, MergedVertexId, PolygonId, Subobject, SubobjectLevel,
    SubobjectStore, UvTopology, VertexId,
};

/// How a pick combines with the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOp {
    /// The pick becomes the whole selection.
    Replace,
    /// The pick is added to the selection.
    Add,
    /// The pick is removed from the selection.
    Remove,
    /// Each picked element flips its selection state.
    Toggle,
}

/// Applies `op` to `set`, returning `true` if the set changed.
fn apply_op<K: Ord + Copy>(set: &mut BTreeSet<K>, picked: &BTreeSet<K>, op: SelectionOp) -> bool {
    match op {
        SelectionOp::Replace => {
            if set == picked {
                return false;
            }
            set.clone_from(picked);
            true
        }
        SelectionOp::Add => picked.iter().fold(false, |changed, k| set.insert(*k) || changed),
        SelectionOp::Remove => picked.iter().fold(false, |changed, k| set.remove(k) || changed),
        SelectionOp::Toggle => {
            for k in picked {
                if !set.remove(k) {
                    set.insert(*k);
                }
            }
            !picked.is_empty()
        }
    }
}

/// Selection state of one UV set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionManager {
    vertices: BTreeSet<MergedVertexId>,
    edges: BTreeSet<MergedEdgeId>,
    polygons: BTreeSet<PolygonId>,
    unselected_polygons: BTreeSet<PolygonId>,
}

impl SelectionManager {
    /// Creates an empty selection over the given polygons.
    #[must_use]
    pub fn new(polygon_ids: impl IntoIterator<Item = PolygonId>) -> Self {
        Self {
            unselected_polygons: polygon_ids.into_iter().collect(),
            ..Self::default()
        }
    }

    // --- Mutation ---

    /// Resolves vertex picks to their merged vertices and applies `op`.
    ///
    /// # Errors
    ///
    /// Returns an error if a vertex is unknown.
    pub fn update_vertices(
        &mut self,
        registry: &MergeRegistry,
        ids: &[VertexId],
        op: SelectionOp,
    ) -> std::result::Result<bool, TopologyError> {
        let picked = ids
            .iter()
            .map(|&id| registry.merged_vertex_id(id))
            .collect::<std::result::Result<BTreeSet<_>, _>>()?;
        Ok(apply_op(&mut self.vertices, &picked, op))
    }

    /// Resolves edge picks to their merged edges and applies `op`.
    ///
    /// # Errors
    ///
    /// Returns an error if an edge is unknown.
    pub fn update_edges(
        &mut self,
        registry: &MergeRegistry,
        ids: &[EdgeId],
        op: SelectionOp,
    ) -> std::result::Result<bool, TopologyError> {
        let picked = ids
            .iter()
            .map(|&id| registry.merged_edge_id(id))
            .collect::<std::result::Result<BTreeSet<_>, _>>()?;
        Ok(apply_op(&mut self.edges, &picked, op))
    }

    /// Applies `op` to polygon picks, keeping the unselected set in step.
    ///
    /// # Errors
    ///
    /// Returns an error if a polygon is unknown.
    pub fn update_polygons(
        &mut self,
        store: &SubobjectStore,
        ids: &[PolygonId],
        op: SelectionOp,
    ) -> std::result::Result<bool, TopologyError> {
        let mut picked = BTreeSet::new();
        for &id in ids {
            store.polygon(id)?;
            picked.insert(id);
        }
        if !apply_op(&mut self.polygons, &picked, op) {
            return Ok(false);
        }
        self.unselected_polygons = store
            .polygon_ids()
            .filter(|id| !self.polygons.contains(id))
            .collect();
        Ok(true)
    }

    /// Deselects everything at `level`. Returns `true` if anything was
    /// selected.
    pub fn clear(&mut self, level: SubobjectLevel) -> bool {
        match level {
            SubobjectLevel::Vertex => !std::mem::take(&mut self.vertices).is_empty(),
            SubobjectLevel::Edge => !std::mem::take(&mut self.edges).is_empty(),
            SubobjectLevel::Polygon => {
                let selected = std::mem::take(&mut self.polygons);
                let changed = !selected.is_empty();
                self.unselected_polygons.extend(selected);
                changed
            }
        }
    }

    /// Selects every subobject at `level`.
    pub fn select_all(
        &mut self,
        level: SubobjectLevel,
        store: &SubobjectStore,
        registry: &MergeRegistry,
    ) -> bool {
        let before = self.count(level);
        match level {
            SubobjectLevel::Vertex => {
                self.vertices = registry.merged_vertices().map(|(k, _)| k).collect();
            }
            SubobjectLevel::Edge => {
                self.edges = registry.merged_edges().map(|(k, _)| k).collect();
            }
            SubobjectLevel::Polygon => {
                self.polygons = store.polygon_ids().collect();
                self.unselected_polygons.clear();
            }
        }
        self.count(level) != before
    }

    /// Flips the selection state of every subobject at `level`.
    pub fn invert(
        &mut self,
        level: SubobjectLevel,
        store: &SubobjectStore,
        registry: &MergeRegistry,
    ) -> bool {
        match level {
            SubobjectLevel::Vertex => {
                self.vertices = registry
                    .merged_vertices()
                    .map(|(k, _)| k)
                    .filter(|k| !self.vertices.contains(k))
                    .collect();
            }
            SubobjectLevel::Edge => {
                self.edges = registry
                    .merged_edges()
                    .map(|(k, _)| k)
                    .filter(|k| !self.edges.contains(k))
                    .collect();
            }
            SubobjectLevel::Polygon => {
                std::mem::swap(&mut self.polygons, &mut self.unselected_polygons);
            }
        }
        match level {
            SubobjectLevel::Vertex => registry.merged_vertex_count() > 0,
            SubobjectLevel::Edge => registry.merged_edge_count() > 0,
            SubobjectLevel::Polygon => store.polygon_count() > 0,
        }
    }

    // --- Re-resolution after topology changes ---

    /// A merged vertex was split: the new part inherits the selection state
    /// of `original`.
    pub(crate) fn on_vertex_split(&mut self, original: MergedVertexId, new: MergedVertexId) {
        if self.vertices.contains(&original) {
            self.vertices.insert(new);
        }
    }

    /// Several merged vertices were merged into `new`. The result is
    /// selected if any part was; returns `true` if selected and unselected
    /// parts were coalesced.
    pub(crate) fn on_vertices_merged(
        &mut self,
        parts: &BTreeSet<MergedVertexId>,
        new: MergedVertexId,
    ) -> bool {
        let selected = parts.iter().filter(|k| self.vertices.remove(k)).count();
        if selected > 0 {
            self.vertices.insert(new);
        }
        selected > 0 && selected < parts.len()
    }

    /// A merged edge was torn: the new part inherits the selection state of
    /// `original`.
    pub(crate) fn on_edge_split(&mut self, original: MergedEdgeId, new: MergedEdgeId) {
        if self.edges.contains(&original) {
            self.edges.insert(new);
        }
    }

    /// `absorbed` was welded into `kept`. Returns `true` if exactly one of
    /// them was selected.
    pub(crate) fn on_edges_welded(&mut self, kept: MergedEdgeId, absorbed: MergedEdgeId) -> bool {
        let kept_selected = self.edges.contains(&kept);
        let absorbed_selected = self.edges.remove(&absorbed);
        if absorbed_selected {
            self.edges.insert(kept);
        }
        kept_selected != absorbed_selected
    }

    // --- Queries ---

    /// Selected merged vertices.
    pub fn merged_vertices(&self) -> impl Iterator<Item = MergedVertexId> + '_ {
        self.vertices.iter().copied()
    }

    /// Selected merged edges.
    pub fn merged_edges(&self) -> impl Iterator<Item = MergedEdgeId> + '_ {
        self.edges.iter().copied()
    }

    /// Selected polygons in ascending id order.
    pub fn polygons(&self) -> impl Iterator<Item = PolygonId> + '_ {
        self.polygons.iter().copied()
    }

    /// Unselected polygons in ascending id order.
    pub fn unselected_polygons(&self) -> impl Iterator<Item = PolygonId> + '_ {
        self.unselected_polygons.iter().copied()
    }

    /// Returns `true` if the polygon is selected.
    #[must_use]
    pub fn is_polygon_selected(&self, id: PolygonId) -> bool {
        self.polygons.contains(&id)
    }

    /// Number of selected merged subobjects (or polygons) at `level`.
    #[must_use]
    pub fn count(&self, level: SubobjectLevel) -> usize {
        match level {
            SubobjectLevel::Vertex => self.vertices.len(),
            SubobjectLevel::Edge => self.edges.len(),
            SubobjectLevel::Polygon => self.polygons.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self, level: SubobjectLevel) -> bool {
        self.count(level) == 0
    }

    /// The underlying vertex ids of the selected merged vertices.
    ///
    /// # Errors
    ///
    /// Returns an error if a selected handle no longer resolves.
    pub fn vertex_ids(
        &self,
        registry: &MergeRegistry,
    ) -> std::result::Result<BTreeSet<VertexId>, TopologyError> {
        let mut ids = BTreeSet::new();
        for &key in &self.vertices {
            ids.extend(registry.merged_vertex(key)?.ids());
        }
        Ok(ids)
    }

    /// The underlying edge ids of the selected merged edges.
    ///
    /// # Errors
    ///
    /// Returns an error if a selected handle no longer resolves.
    pub fn edge_ids(
        &self,
        registry: &MergeRegistry,
    ) -> std::result::Result<BTreeSet<EdgeId>, TopologyError> {
        let mut ids = BTreeSet::new();
        for &key in &self.edges {
            ids.extend(registry.merged_edge(key)?.ids());
        }
        Ok(ids)
    }

    /// Every vertex spanned by the selection at `level`; this is the set a
    /// transform of the selection moves.
    ///
    /// # Errors
    ///
    /// Returns an error if a selected handle no longer resolves.
    pub fn spanned_vertex_ids(
        &self,
        level: SubobjectLevel,
        store: &SubobjectStore,
        registry: &MergeRegistry,
    ) -> std::result::Result<BTreeSet<VertexId>, TopologyError> {
        let mut ids = BTreeSet::new();
        match level {
            SubobjectLevel::Vertex => {
                for &key in &self.vertices {
                    ids.extend(registry.merged_vertex(key)?.vertex_ids(store));
                }
            }
            SubobjectLevel::Edge => {
                for &key in &self.edges {
                    ids.extend(registry.merged_edge(key)?.vertex_ids(store));
                }
            }
            SubobjectLevel::Polygon => {
                for &id in &self.polygons {
                    ids.extend(store.polygon(id)?.vertex_ids(store));
                }
            }
        }
        Ok(ids)
    }
}

/// Selection entry points of a UV set, applying the special selection
/// policy of its configuration.
impl UvTopology {
    /// Updates the vertex selection with raw vertex picks.
    ///
    /// # Errors
    ///
    /// Returns an error if a vertex is unknown.
    pub fn select_vertices(&mut self, ids: &[VertexId], op: SelectionOp) -> Result<bool> {
        Ok(self.selection.update_vertices(&self.registry, ids, op)?)
    }

    /// Updates the edge selection with raw edge picks. With the seam policy
    /// on, a picked seam brings its whole seam chain along.
    ///
    /// # Errors
    ///
    /// Returns an error if an edge is unknown.
    pub fn select_edges(&mut self, ids: &[EdgeId], op: SelectionOp) -> Result<bool> {
        let picked: Vec<EdgeId> = if self.config.selection.by_seam {
            let mut expanded = BTreeSet::new();
            for &id in ids {
                expanded.extend(special::seam_chain(&self.store, &self.registry, id)?);
            }
            expanded.into_iter().collect()
        } else {
            ids.to_vec()
        };
        Ok(self.selection.update_edges(&self.registry, &picked, op)?)
    }

    /// Updates the polygon selection. With the cluster policy on, a picked
    /// polygon brings its whole UV island along.
    ///
    /// # Errors
    ///
    /// Returns an error if a polygon is unknown.
    pub fn select_polygons(&mut self, ids: &[PolygonId], op: SelectionOp) -> Result<bool> {
        let picked: Vec<PolygonId> = if self.config.selection.by_cluster {
            let mut expanded = BTreeSet::new();
            for &id in ids {
                expanded.extend(special::cluster(&self.store, &self.registry, id)?);
            }
            expanded.into_iter().collect()
        } else {
            ids.to_vec()
        };
        Ok(self.selection.update_polygons(&self.store, &picked, op)?)
    }

    /// Deselects everything at `level`.
    pub fn clear_selection(&mut self, level: SubobjectLevel) -> bool {
        self.selection.clear(level)
    }

    /// Selects everything at `level`.
    pub fn select_all(&mut self, level: SubobjectLevel) -> bool {
        self.selection.select_all(level, &self.store, &self.registry)
    }

    /// Inverts the selection at `level`.
    pub fn invert_selection(&mut self, level: SubobjectLevel) -> bool {
        self.selection.invert(level, &self.store, &self.registry)
    }

    /// Underlying ids of the selected vertices.
    ///
    /// # Errors
    ///
    /// Returns an error if the selection references a dissolved group.
    pub fn selected_vertex_ids(&self) -> Result<BTreeSet<VertexId>> {
        Ok(self.selection.vertex_ids(&self.registry)?)
    }

    /// Underlying ids of the selected edges.
    ///
    /// # Errors
    ///
    /// Returns an error if the selection references a dissolved group.
    pub fn selected_edge_ids(&self) -> Result<BTreeSet<EdgeId>> {
        Ok(self.selection.edge_ids(&self.registry)?)
    }

    /// Ids of the selected polygons.
    #[must_use]
    pub fn selected_polygon_ids(&self) -> BTreeSet<PolygonId> {
        self.selection.polygons().collect()
    }

    /// Returns `true` if the merged vertex containing `id` is selected.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is unknown.
    pub fn is_vertex_selected(&self, id: VertexId) -> Result<bool> {
        let key = self.registry.merged_vertex_id(id)?;
        Ok(self.selection.merged_vertices().any(|k| k == key))
    }

    /// Returns `true` if the merged edge containing `id` is selected.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is unknown.
    pub fn is_edge_selected(&self, id: EdgeId) -> Result<bool> {
        let key = self.registry.merged_edge_id(id)?;
        Ok(self.selection.merged_edges().any(|k| k == key))
    }

    /// Average UV position of the vertices spanned by the selection at
    /// `level`, or `None` if nothing is selected.
    ///
    /// # Errors
    ///
    /// Returns an error if the selection references a dissolved group.
    pub fn selection_center(&self, level: SubobjectLevel) -> Result<Option<Point2>> {
        let ids = self
            .selection
            .spanned_vertex_ids(level, &self.store, &self.registry)?;
        let positions = ids
            .into_iter()
            .map(|id| self.store.position(id))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let center = average(&positions);
        debug!(?level, ?center, "selection center");
        Ok(center)
    }
}
