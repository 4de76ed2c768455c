pub mod edge;
pub mod merged;
pub mod polygon;
pub mod registry;
pub mod store;
pub mod subobject;
pub mod vertex;

pub use edge::{Edge, EdgeId};
pub use merged::{MergedEdge, MergedEdgeId, MergedVertex, MergedVertexId};
pub use polygon::{Polygon, PolygonId};
pub use registry::MergeRegistry;
pub use store::SubobjectStore;
pub use subobject::{Subobject, SubobjectLevel};
pub use vertex::{Vertex, VertexId};

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use tracing::{debug, warn};

use crate::config::UvWeldConfig;
use crate::error::{MeshError, Result, TopologyError};
use crate::math::{polygon_2d::polygon_center, quantize, Point2};
use crate::mesh::MeshGeometry;
use crate::selection::SelectionManager;

/// Identifier of a UV channel of a mesh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UvSetId(pub u8);

impl fmt::Display for UvSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The complete UV topology of one UV set: subobjects, their merged groups,
/// and the selection expressed in terms of those groups.
#[derive(Debug, Clone)]
pub struct UvTopology {
    pub(crate) uv_set_id: UvSetId,
    pub(crate) config: UvWeldConfig,
    pub(crate) store: SubobjectStore,
    pub(crate) registry: MergeRegistry,
    pub(crate) selection: SelectionManager,
}

impl UvTopology {
    /// Derives the UV topology of `uv_set` from the mesh.
    ///
    /// Creates one vertex per polygon corner, one edge per polygon boundary
    /// edge and one polygon per mesh polygon. Corners the mesh considers
    /// merged are grouped by UV position; edges the mesh considers merged are
    /// welded when their endpoints fall in the same merged vertices. Every
    /// other edge becomes a seam.
    ///
    /// # Errors
    ///
    /// Returns an error if the mesh is malformed or lacks UVs for `uv_set`.
    pub fn derive_from_mesh<M: MeshGeometry + ?Sized>(
        mesh: &M,
        uv_set: UvSetId,
        config: UvWeldConfig,
    ) -> Result<Self> {
        let store = build_store(mesh, uv_set)?;
        let mut registry = MergeRegistry::new();
        derive_merged_vertices(mesh, &store, &mut registry, config.merge_tolerance)?;
        derive_merged_edges(mesh, &store, &mut registry)?;

        debug!(
            %uv_set,
            vertices = store.vertex_count(),
            merged_vertices = registry.merged_vertex_count(),
            seams = registry.seam_count(),
            "derived UV topology"
        );

        let selection = SelectionManager::new(store.polygon_ids());
        Ok(Self {
            uv_set_id: uv_set,
            config,
            store,
            registry,
            selection,
        })
    }

    /// The UV set this topology belongs to.
    #[must_use]
    pub fn uv_set_id(&self) -> UvSetId {
        self.uv_set_id
    }

    /// The configuration this UV set was built with.
    #[must_use]
    pub fn config(&self) -> &UvWeldConfig {
        &self.config
    }

    /// Replaces the configuration, e.g. to change the selection policy.
    pub fn set_config(&mut self, config: UvWeldConfig) {
        self.config = config;
    }

    /// The vertices, edges and polygons of this UV set.
    #[must_use]
    pub fn store(&self) -> &SubobjectStore {
        &self.store
    }

    /// The merged vertex and merged edge partition.
    #[must_use]
    pub fn registry(&self) -> &MergeRegistry {
        &self.registry
    }

    /// The current selection.
    #[must_use]
    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    /// Returns an independent deep copy of this topology, relabelled as
    /// belonging to `uv_set`.
    #[must_use]
    pub fn copy_to(&self, uv_set: UvSetId) -> Self {
        let mut copy = self.clone();
        copy.uv_set_id = uv_set;
        copy
    }

    /// Returns `true` if `edge` is currently a seam.
    #[must_use]
    pub fn is_seam(&self, edge: EdgeId) -> bool {
        self.registry.is_seam(edge)
    }

    /// All vertex ids merged with `id`, including `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is unknown.
    pub fn merged_vertex_ids(&self, id: VertexId) -> Result<Vec<VertexId>> {
        Ok(self.registry.merged_vertex_of(id)?.ids().collect())
    }

    /// All edge ids merged with `id`, including `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is unknown.
    pub fn merged_edge_ids(&self, id: EdgeId) -> Result<Vec<EdgeId>> {
        Ok(self.registry.merged_edge_of(id)?.ids().collect())
    }

    /// Expands vertex ids to every member of their merged vertices.
    pub(crate) fn expand_to_merged(
        &self,
        ids: impl IntoIterator<Item = VertexId>,
    ) -> std::result::Result<BTreeSet<VertexId>, TopologyError> {
        let mut expanded = BTreeSet::new();
        for id in ids {
            if expanded.contains(&id) {
                continue;
            }
            expanded.extend(self.registry.merged_vertex_of(id)?.ids());
        }
        Ok(expanded)
    }

    /// Writes `position` into every given vertex and refreshes the centers of
    /// their polygons. Returns the edits to forward to the mesh.
    pub(crate) fn move_vertices(
        &mut self,
        moves: &BTreeMap<VertexId, Point2>,
    ) -> std::result::Result<Vec<(VertexId, Point2)>, TopologyError> {
        let mut polygons = BTreeSet::new();
        for (&id, &position) in moves {
            let vertex = self.store.vertex_mut(id)?;
            vertex.position = position;
            polygons.insert(vertex.polygon_id);
        }
        self.store.update_polygon_centers(polygons)?;
        Ok(moves.iter().map(|(&id, &p)| (id, p)).collect())
    }
}

/// Creates the vertices, edges and polygons of a UV set from the mesh.
fn build_store<M: MeshGeometry + ?Sized>(mesh: &M, uv_set: UvSetId) -> Result<SubobjectStore> {
    let mut store = SubobjectStore::new();

    for polygon in mesh.polygons() {
        let n = polygon.vertex_ids.len();
        if n < 3 {
            return Err(MeshError::DegeneratePolygon(polygon.id).into());
        }
        if polygon.edge_ids.len() != n {
            return Err(MeshError::MalformedPolygon(polygon.id).into());
        }

        let mut corners = Vec::with_capacity(n);
        for (i, &id) in polygon.vertex_ids.iter().enumerate() {
            let mesh_vertex = mesh.vertex(id).ok_or(MeshError::UnknownVertex(id))?;
            let position = mesh
                .uv(uv_set, id)
                .ok_or(MeshError::MissingUv { vertex: id, uv_set })?;
            corners.push(position);
            store.add_vertex(Vertex {
                id,
                position,
                polygon_id: polygon.id,
                edge_ids: [polygon.edge_ids[(i + n - 1) % n], polygon.edge_ids[i]],
                row_index: mesh_vertex.row_index,
            });
            store.add_edge(Edge {
                id: polygon.edge_ids[i],
                vertex_ids: [id, polygon.vertex_ids[(i + 1) % n]],
                polygon_id: polygon.id,
            });
        }

        store.add_polygon(Polygon {
            id: polygon.id,
            center: polygon_center(&corners),
            vertex_ids: polygon.vertex_ids,
            edge_ids: polygon.edge_ids,
            triangles: polygon.triangles,
        });
    }

    Ok(store)
}

/// Groups the corners of every mesh-level merged vertex by UV position.
fn derive_merged_vertices<M: MeshGeometry + ?Sized>(
    mesh: &M,
    store: &SubobjectStore,
    registry: &mut MergeRegistry,
    tolerance: f64,
) -> std::result::Result<(), TopologyError> {
    let mut assigned: HashSet<VertexId> = HashSet::new();

    for vertex in store.vertices() {
        if assigned.contains(&vertex.id) {
            continue;
        }
        let mut mesh_group: BTreeSet<VertexId> = mesh
            .merged_vertex(vertex.id)
            .into_iter()
            .filter(|id| !assigned.contains(id) && store.vertex(*id).is_ok())
            .collect();
        mesh_group.insert(vertex.id);

        let mut buckets: BTreeMap<(i64, i64), BTreeSet<VertexId>> = BTreeMap::new();
        for &id in &mesh_group {
            let key = quantize(&store.position(id)?, tolerance);
            buckets.entry(key).or_default().insert(id);
        }
        for ids in buckets.into_values() {
            registry.add_merged_vertex(ids)?;
        }
        assigned.extend(mesh_group);
    }

    Ok(())
}

/// The unordered pair of merged vertices an edge connects.
pub(crate) fn merged_endpoints(
    store: &SubobjectStore,
    registry: &MergeRegistry,
    edge: EdgeId,
) -> std::result::Result<(MergedVertexId, MergedVertexId), TopologyError> {
    let [a, b] = store.edge(edge)?.vertex_ids;
    let (a, b) = (registry.merged_vertex_id(a)?, registry.merged_vertex_id(b)?);
    Ok((a.min(b), a.max(b)))
}

/// Welds every pair of mesh-merged edges whose endpoints were merged in UV
/// space; all other edges become seams.
fn derive_merged_edges<M: MeshGeometry + ?Sized>(
    mesh: &M,
    store: &SubobjectStore,
    registry: &mut MergeRegistry,
) -> std::result::Result<(), TopologyError> {
    let mut assigned: HashSet<EdgeId> = HashSet::new();

    for edge in store.edges() {
        if assigned.contains(&edge.id) {
            continue;
        }
        let partners: Vec<EdgeId> = mesh
            .merged_edge(edge.id)
            .into_iter()
            .filter(|id| *id != edge.id && store.edge(*id).is_ok())
            .collect();
        if partners.len() > 1 {
            warn!(edge = %edge.id, "mesh edge has more than one partner; keeping it as a seam");
        }

        let weld_with = match partners.as_slice() {
            [partner] if !assigned.contains(partner) => {
                let same_ends = merged_endpoints(store, registry, edge.id)?
                    == merged_endpoints(store, registry, *partner)?;
                same_ends.then_some(*partner)
            }
            _ => None,
        };

        match weld_with {
            Some(partner) => {
                registry.add_merged_edge(MergedEdge::welded(edge.id, partner))?;
                assigned.insert(partner);
            }
            None => {
                registry.add_merged_edge(MergedEdge::seam(edge.id))?;
            }
        }
        assigned.insert(edge.id);
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mesh::fixtures;
    use approx::assert_relative_eq;

    fn derive(mesh: &impl MeshGeometry) -> UvTopology {
        UvTopology::derive_from_mesh(mesh, UvSetId(0), UvWeldConfig::default()).unwrap()
    }

    #[test]
    fn welded_diagonal_is_derived() {
        let uv = derive(&fixtures::quad_of_two_triangles());

        assert_eq!(uv.store().vertex_count(), 6);
        assert_eq!(uv.store().edge_count(), 6);
        assert_eq!(uv.registry().merged_vertex_count(), 4);
        assert_eq!(uv.registry().merged_edge_count(), 5);
        assert_eq!(
            uv.merged_edge_ids(EdgeId(2)).unwrap(),
            vec![EdgeId(2), EdgeId(3)]
        );
        assert_eq!(
            uv.registry().seam_edges().collect::<Vec<_>>(),
            vec![EdgeId(0), EdgeId(1), EdgeId(4), EdgeId(5)]
        );
        assert_eq!(
            uv.merged_vertex_ids(VertexId(0)).unwrap(),
            vec![VertexId(0), VertexId(3)]
        );
    }

    #[test]
    fn separate_islands_are_seamed() {
        let uv = derive(&fixtures::two_torn_quads());

        assert_eq!(uv.registry().seam_count(), 8);
        assert_eq!(uv.registry().merged_vertex_count(), 8);
        assert!(uv.is_seam(EdgeId(1)));
        assert!(uv.is_seam(EdgeId(7)));
    }

    #[test]
    fn closed_mesh_has_no_seams() {
        let uv = derive(&fixtures::closed_tetrahedron());

        assert_eq!(uv.registry().seam_count(), 0);
        assert_eq!(uv.registry().merged_edge_count(), 6);
        assert_eq!(uv.registry().merged_vertex_count(), 4);
    }

    #[test]
    fn vertices_know_their_edges() {
        let uv = derive(&fixtures::two_torn_quads());
        let vertex = uv.store().vertex(VertexId(1)).unwrap();

        assert_eq!(vertex.edge_ids, [EdgeId(0), EdgeId(1)]);
        assert_eq!(vertex.polygon_id, PolygonId(0));
        assert_eq!(vertex.row_index, 1);
        assert_eq!(
            uv.store().edge(EdgeId(1)).unwrap().vertex_ids,
            [VertexId(1), VertexId(2)]
        );
    }

    #[test]
    fn polygon_centers_are_cached() {
        let uv = derive(&fixtures::two_torn_quads());
        let center = uv.store().polygon(PolygonId(1)).unwrap().center;
        assert_relative_eq!(center.x, 2.5);
        assert_relative_eq!(center.y, 0.5);
    }

    #[test]
    fn missing_uv_set_is_reported() {
        let mesh = fixtures::quad_of_two_triangles();
        let err = UvTopology::derive_from_mesh(&mesh, UvSetId(3), UvWeldConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::UvWeldError::Mesh(MeshError::MissingUv { .. })
        ));
    }

    #[test]
    fn copy_is_independent() {
        let uv = derive(&fixtures::quad_of_two_triangles());
        let copy = uv.copy_to(UvSetId(1));

        assert_eq!(copy.uv_set_id(), UvSetId(1));
        assert_eq!(copy.store(), uv.store());
        assert_eq!(
            copy.registry().vertex_partition(),
            uv.registry().vertex_partition()
        );
    }
}
