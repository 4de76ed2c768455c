use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use crate::config::UvWeldConfig;
use crate::error::{Result, TopologyError};
use crate::mesh::MeshGeometry;
use crate::operations::{
    BreakVertices, DetachPolygons, SplitEdges, StitchEdges, StitchOutcome, StitchPolygons,
};
use crate::topology::{EdgeId, UvSetId, UvTopology, VertexId};

/// The UV sets of a mesh, one independent [`UvTopology`] per UV channel.
///
/// The container keeps the mesh's seam registration in step with the
/// topology of each set it creates, pastes or removes.
#[derive(Debug, Clone, Default)]
pub struct UvSets {
    config: UvWeldConfig,
    sets: BTreeMap<UvSetId, UvTopology>,
}

impl UvSets {
    /// Creates an empty container whose sets will use `config`.
    #[must_use]
    pub fn new(config: UvWeldConfig) -> Self {
        Self {
            config,
            sets: BTreeMap::new(),
        }
    }

    /// The configuration given to every UV set.
    #[must_use]
    pub fn config(&self) -> &UvWeldConfig {
        &self.config
    }

    /// Replaces the configuration of the container and of every set in it.
    pub fn set_config(&mut self, config: UvWeldConfig) {
        self.config = config;
        for topology in self.sets.values_mut() {
            topology.set_config(config);
        }
    }

    /// Derives the topology of `uv_set` from the mesh and registers its seams
    /// with the mesh. An existing set with the same id is replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the mesh is malformed or lacks UVs for `uv_set`.
    pub fn create<M: MeshGeometry + ?Sized>(
        &mut self,
        uv_set: UvSetId,
        mesh: &mut M,
    ) -> Result<&mut UvTopology> {
        let topology = UvTopology::derive_from_mesh(&*mesh, uv_set, self.config)?;
        let old_seams = self.sets.get(&uv_set).map(seams).unwrap_or_default();
        sync_seams(mesh, uv_set, &old_seams, &seams(&topology));
        info!(%uv_set, "created UV set");
        self.sets.insert(uv_set, topology);
        self.get_mut(uv_set)
    }

    /// The topology of `uv_set`.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::UnknownUvSet`] if the set does not exist.
    pub fn get(&self, uv_set: UvSetId) -> Result<&UvTopology> {
        Ok(self
            .sets
            .get(&uv_set)
            .ok_or(TopologyError::UnknownUvSet(uv_set))?)
    }

    /// Mutable access to the topology of `uv_set`.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::UnknownUvSet`] if the set does not exist.
    pub fn get_mut(&mut self, uv_set: UvSetId) -> Result<&mut UvTopology> {
        Ok(self
            .sets
            .get_mut(&uv_set)
            .ok_or(TopologyError::UnknownUvSet(uv_set))?)
    }

    /// Drops `uv_set` and unregisters its seams from the mesh.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::UnknownUvSet`] if the set does not exist.
    pub fn remove<M: MeshGeometry + ?Sized>(
        &mut self,
        uv_set: UvSetId,
        mesh: &mut M,
    ) -> Result<UvTopology> {
        let topology = self
            .sets
            .remove(&uv_set)
            .ok_or(TopologyError::UnknownUvSet(uv_set))?;
        sync_seams(mesh, uv_set, &seams(&topology), &BTreeSet::new());
        debug!(%uv_set, "removed UV set");
        Ok(topology)
    }

    /// Ids of every UV set, ascending.
    pub fn uv_set_ids(&self) -> impl Iterator<Item = UvSetId> + '_ {
        self.sets.keys().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// An independent deep copy of the topology and selection of `uv_set`.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::UnknownUvSet`] if the set does not exist.
    pub fn copy(&self, uv_set: UvSetId) -> Result<UvTopology> {
        Ok(self.get(uv_set)?.clone())
    }

    /// Replaces the topology of `uv_set` with a copied one.
    ///
    /// Every pasted position is pushed to the mesh and the mesh's seam
    /// registration is brought in line with the pasted seams.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::UnknownUvSet`] if the set does not exist, or
    /// [`TopologyError::IncompatibleUvSet`] if the copy was taken from a
    /// mesh with different vertex, edge or polygon ids.
    pub fn paste<M: MeshGeometry + ?Sized>(
        &mut self,
        uv_set: UvSetId,
        topology: UvTopology,
        mesh: &mut M,
    ) -> Result<()> {
        let target = self.get(uv_set)?;
        if !target.store().same_id_space(topology.store()) {
            return Err(TopologyError::IncompatibleUvSet {
                source_set: topology.uv_set_id(),
                target_set: uv_set,
            }
            .into());
        }

        let old_seams = seams(target);
        let pasted = topology.copy_to(uv_set);
        publish(mesh, &pasted, &old_seams);
        debug!(%uv_set, from = %topology.uv_set_id(), "pasted UV set");
        self.sets.insert(uv_set, pasted);
        Ok(())
    }

    /// Creates `to` as a copy of `from`, pushing its positions and seams to
    /// the mesh. An existing set `to` is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::UnknownUvSet`] if `from` does not exist.
    pub fn duplicate<M: MeshGeometry + ?Sized>(
        &mut self,
        from: UvSetId,
        to: UvSetId,
        mesh: &mut M,
    ) -> Result<&mut UvTopology> {
        let copy = self.get(from)?.copy_to(to);
        let old_seams = self.sets.get(&to).map(seams).unwrap_or_default();
        publish(mesh, &copy, &old_seams);
        info!(%from, %to, "duplicated UV set");
        self.sets.insert(to, copy);
        self.get_mut(to)
    }

    /// Splits edges of `uv_set`; see [`SplitEdges`].
    ///
    /// # Errors
    ///
    /// Returns an error if the set or an edge is unknown.
    pub fn split_edges<M: MeshGeometry + ?Sized>(
        &mut self,
        uv_set: UvSetId,
        edge_ids: &[EdgeId],
        mesh: &mut M,
    ) -> Result<bool> {
        SplitEdges::new(edge_ids.to_vec()).execute(self.get_mut(uv_set)?, mesh)
    }

    /// Stitches seams of `uv_set`; see [`StitchEdges`].
    ///
    /// # Errors
    ///
    /// Returns an error if the set or an edge is unknown.
    pub fn stitch_edges<M: MeshGeometry + ?Sized>(
        &mut self,
        uv_set: UvSetId,
        edge_ids: &[EdgeId],
        mesh: &mut M,
    ) -> Result<StitchOutcome> {
        StitchEdges::new(edge_ids.to_vec()).execute(self.get_mut(uv_set)?, mesh)
    }

    /// Detaches the selected polygons of `uv_set`; see [`DetachPolygons`].
    ///
    /// # Errors
    ///
    /// Returns an error if the set is unknown.
    pub fn detach_polygons<M: MeshGeometry + ?Sized>(
        &mut self,
        uv_set: UvSetId,
        mesh: &mut M,
    ) -> Result<bool> {
        DetachPolygons::new().execute(self.get_mut(uv_set)?, mesh)
    }

    /// Stitches the selected polygons of `uv_set` to their neighbors; see
    /// [`StitchPolygons`].
    ///
    /// # Errors
    ///
    /// Returns an error if the set is unknown.
    pub fn stitch_polygons<M: MeshGeometry + ?Sized>(
        &mut self,
        uv_set: UvSetId,
        mesh: &mut M,
    ) -> Result<StitchOutcome> {
        StitchPolygons::new().execute(self.get_mut(uv_set)?, mesh)
    }

    /// Breaks merged vertices of `uv_set`; see [`BreakVertices`].
    ///
    /// # Errors
    ///
    /// Returns an error if the set or a vertex is unknown.
    pub fn break_vertices<M: MeshGeometry + ?Sized>(
        &mut self,
        uv_set: UvSetId,
        vertex_ids: &[VertexId],
        mesh: &mut M,
    ) -> Result<bool> {
        BreakVertices::new(vertex_ids.to_vec()).execute(self.get_mut(uv_set)?, mesh)
    }
}

fn seams(topology: &UvTopology) -> BTreeSet<EdgeId> {
    topology.registry().seam_edges().collect()
}

/// Tells the mesh which seams appeared and which disappeared.
fn sync_seams<M: MeshGeometry + ?Sized>(
    mesh: &mut M,
    uv_set: UvSetId,
    old: &BTreeSet<EdgeId>,
    new: &BTreeSet<EdgeId>,
) {
    let removed: Vec<EdgeId> = old.difference(new).copied().collect();
    let added: Vec<EdgeId> = new.difference(old).copied().collect();
    if !removed.is_empty() {
        mesh.remove_tex_seam_edges(uv_set, &removed);
    }
    if !added.is_empty() {
        mesh.add_tex_seam_edges(uv_set, &added);
    }
}

/// Pushes every position and seam of `topology` to the mesh.
fn publish<M: MeshGeometry + ?Sized>(
    mesh: &mut M,
    topology: &UvTopology,
    old_seams: &BTreeSet<EdgeId>,
) {
    let uv_set = topology.uv_set_id();
    let edits: Vec<_> = topology
        .store()
        .vertices()
        .map(|vertex| (vertex.id, vertex.position))
        .collect();
    mesh.apply_uv_edits(uv_set, &edits);
    sync_seams(mesh, uv_set, old_seams, &seams(topology));
    let ids: Vec<VertexId> = edits.iter().map(|&(id, _)| id).collect();
    mesh.uv_topology_changed(uv_set, &ids);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::UvWeldError;
    use crate::math::Point2;
    use crate::mesh::fixtures;
    use crate::operations::IsValid;
    use crate::selection::SelectionOp;
    use crate::topology::{PolygonId, SubobjectLevel};

    const UV0: UvSetId = UvSetId(0);
    const UV1: UvSetId = UvSetId(1);

    #[test]
    fn create_registers_seams() {
        let mut mesh = fixtures::quad_of_two_triangles();
        let mut sets = UvSets::default();
        sets.create(UV0, &mut mesh).unwrap();

        assert_eq!(sets.uv_set_ids().collect::<Vec<_>>(), vec![UV0]);
        assert_eq!(
            mesh.seam_edges(UV0),
            BTreeSet::from([EdgeId(0), EdgeId(1), EdgeId(4), EdgeId(5)])
        );
    }

    #[test]
    fn unknown_set_is_reported() {
        let mut mesh = fixtures::quad_of_two_triangles();
        let mut sets = UvSets::default();
        assert!(matches!(
            sets.get(UV1).unwrap_err(),
            UvWeldError::Topology(TopologyError::UnknownUvSet(UvSetId(1)))
        ));
        assert!(sets.split_edges(UV1, &[EdgeId(2)], &mut mesh).is_err());
        assert!(sets.remove(UV1, &mut mesh).is_err());
    }

    #[test]
    fn scenario_split_shared_diagonal() {
        let mut mesh = fixtures::quad_of_two_triangles();
        let mut sets = UvSets::default();
        sets.create(UV0, &mut mesh).unwrap();

        assert!(sets.split_edges(UV0, &[EdgeId(2)], &mut mesh).unwrap());

        let uv = sets.get(UV0).unwrap();
        assert_eq!(uv.registry().seam_count(), 6);
        assert_eq!(uv.registry().merged_vertex_count(), 6);
        assert_eq!(mesh.seam_edges(UV0).len(), 6);
    }

    #[test]
    fn scenario_stitch_torn_quads() {
        let mut mesh = fixtures::two_torn_quads();
        let mut sets = UvSets::default();
        sets.create(UV0, &mut mesh).unwrap();

        let outcome = sets.stitch_edges(UV0, &[EdgeId(1)], &mut mesh).unwrap();

        assert!(outcome.changed);
        let uv = sets.get(UV0).unwrap();
        assert_eq!(uv.registry().seam_count(), 6);
        assert_eq!(uv.merged_edge_ids(EdgeId(1)).unwrap().len(), 2);
        assert_eq!(mesh.seam_edges(UV0).len(), 6);
    }

    #[test]
    fn scenario_detach_whole_mesh() {
        let mut mesh = fixtures::grid(2, 2);
        let mut sets = UvSets::default();
        sets.create(UV0, &mut mesh)
            .unwrap()
            .select_all(SubobjectLevel::Polygon);
        assert!(!sets.detach_polygons(UV0, &mut mesh).unwrap());
    }

    #[test]
    fn scenario_stitch_mesh_boundary() {
        let mut mesh = fixtures::two_torn_quads();
        let mut sets = UvSets::default();
        sets.create(UV0, &mut mesh).unwrap();
        assert_eq!(
            sets.stitch_edges(UV0, &[EdgeId(0)], &mut mesh).unwrap(),
            StitchOutcome::default()
        );
    }

    #[test]
    fn copies_are_independent() {
        let mut mesh = fixtures::grid(2, 1);
        let mut sets = UvSets::default();
        sets.create(UV0, &mut mesh).unwrap();
        let mut copy = sets.copy(UV0).unwrap();

        SplitEdges::new(vec![EdgeId(1)])
            .execute(&mut copy, &mut mesh)
            .unwrap();

        assert!(copy.is_seam(EdgeId(1)));
        assert!(!sets.get(UV0).unwrap().is_seam(EdgeId(1)));
    }

    #[test]
    fn paste_replaces_topology_and_syncs_mesh() {
        let mut mesh = fixtures::two_torn_quads();
        mesh.duplicate_uv_set(UV0, UV1);
        let mut sets = UvSets::default();
        sets.create(UV0, &mut mesh).unwrap();
        sets.create(UV1, &mut mesh).unwrap();
        sets.get_mut(UV0)
            .unwrap()
            .select_polygons(&[PolygonId(1)], SelectionOp::Replace)
            .unwrap();
        sets.stitch_edges(UV0, &[EdgeId(7)], &mut mesh).unwrap();

        let copy = sets.copy(UV0).unwrap();
        sets.paste(UV1, copy, &mut mesh).unwrap();

        let pasted = sets.get(UV1).unwrap();
        assert_eq!(pasted.uv_set_id(), UV1);
        assert_eq!(
            pasted.registry().vertex_partition(),
            sets.get(UV0).unwrap().registry().vertex_partition()
        );
        assert_eq!(pasted.selected_polygon_ids(), BTreeSet::from([PolygonId(1)]));
        assert_eq!(mesh.uv(UV1, VertexId(4)), Some(Point2::new(1.5, 0.0)));
        assert_eq!(mesh.seam_edges(UV1), mesh.seam_edges(UV0));
        assert!(IsValid::new().execute(pasted));
    }

    #[test]
    fn paste_from_other_mesh_is_rejected() {
        let mut quad = fixtures::quad_of_two_triangles();
        let mut grid = fixtures::grid(1, 1);
        let mut sets = UvSets::default();
        sets.create(UV0, &mut quad).unwrap();
        let mut other = UvSets::default();
        other.create(UV0, &mut grid).unwrap();

        let err = sets
            .paste(UV0, other.copy(UV0).unwrap(), &mut quad)
            .unwrap_err();
        assert!(matches!(
            err,
            UvWeldError::Topology(TopologyError::IncompatibleUvSet { .. })
        ));
    }

    #[test]
    fn duplicate_and_remove() {
        let mut mesh = fixtures::quad_of_two_triangles();
        let mut sets = UvSets::default();
        sets.create(UV0, &mut mesh).unwrap();
        sets.duplicate(UV0, UV1, &mut mesh).unwrap();

        assert_eq!(sets.len(), 2);
        assert_eq!(mesh.uv(UV1, VertexId(2)), mesh.uv(UV0, VertexId(2)));
        assert_eq!(mesh.seam_edges(UV1).len(), 4);

        sets.remove(UV1, &mut mesh).unwrap();
        assert_eq!(sets.len(), 1);
        assert!(mesh.seam_edges(UV1).is_empty());
    }

    #[test]
    fn config_reaches_every_set() {
        let mut mesh = fixtures::grid(1, 1);
        let mut sets = UvSets::default();
        sets.create(UV0, &mut mesh).unwrap();
        let config = UvWeldConfig::default().with_merge_tolerance(1e-3);
        sets.set_config(config);
        assert_eq!(sets.get(UV0).unwrap().config(), &config);
    }
}
