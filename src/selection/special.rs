use std::collections::{BTreeSet, VecDeque};

use crate::error::TopologyError;
use crate::topology::{EdgeId, MergeRegistry, PolygonId, SubobjectStore};

/// Every seam edge connected to `edge` through shared merged vertices.
///
/// Returns just `edge` when it is not a seam.
///
/// # Errors
///
/// Returns an error if an edge or vertex is unknown.
pub fn seam_chain(
    store: &SubobjectStore,
    registry: &MergeRegistry,
    edge: EdgeId,
) -> Result<BTreeSet<EdgeId>, TopologyError> {
    store.edge(edge)?;
    let mut chain = BTreeSet::from([edge]);
    if !registry.is_seam(edge) {
        return Ok(chain);
    }

    let mut queue = VecDeque::from([edge]);
    while let Some(current) = queue.pop_front() {
        for endpoint in store.edge(current)?.vertex_ids {
            for corner in registry.merged_vertex_of(endpoint)?.ids() {
                for next in store.vertex(corner)?.edge_ids {
                    if registry.is_seam(next) && chain.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
        }
    }

    Ok(chain)
}

/// The UV island containing `polygon`: every polygon reachable through
/// welded edges.
///
/// # Errors
///
/// Returns an error if a polygon or edge is unknown.
pub fn cluster(
    store: &SubobjectStore,
    registry: &MergeRegistry,
    polygon: PolygonId,
) -> Result<BTreeSet<PolygonId>, TopologyError> {
    store.polygon(polygon)?;
    let mut island = BTreeSet::from([polygon]);
    let mut queue = VecDeque::from([polygon]);

    while let Some(current) = queue.pop_front() {
        for &edge in &store.polygon(current)?.edge_ids {
            let Some(partner) = registry.merged_edge_of(edge)?.partner(edge) else {
                continue;
            };
            let neighbor = store.edge(partner)?.polygon_id;
            if island.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }

    Ok(island)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::UvWeldConfig;
    use crate::mesh::fixtures;
    use crate::topology::{UvSetId, UvTopology};

    fn derive(mesh: &crate::mesh::InMemoryMesh) -> UvTopology {
        UvTopology::derive_from_mesh(mesh, UvSetId(0), UvWeldConfig::default()).unwrap()
    }

    #[test]
    fn seam_chain_follows_island_border() {
        let uv = derive(&fixtures::two_torn_quads());
        let chain = seam_chain(uv.store(), uv.registry(), EdgeId(0)).unwrap();
        assert_eq!(chain, (0..4).map(EdgeId).collect());
    }

    #[test]
    fn seam_chain_of_welded_edge_is_itself() {
        let uv = derive(&fixtures::quad_of_two_triangles());
        let chain = seam_chain(uv.store(), uv.registry(), EdgeId(2)).unwrap();
        assert_eq!(chain, BTreeSet::from([EdgeId(2)]));
    }

    #[test]
    fn cluster_stops_at_seams() {
        let uv = derive(&fixtures::two_torn_quads());
        let island = cluster(uv.store(), uv.registry(), PolygonId(1)).unwrap();
        assert_eq!(island, BTreeSet::from([PolygonId(1)]));
    }

    #[test]
    fn cluster_crosses_welded_edges() {
        let uv = derive(&fixtures::grid(3, 2));
        let island = cluster(uv.store(), uv.registry(), PolygonId(4)).unwrap();
        assert_eq!(island.len(), 6);
    }

    #[test]
    fn unknown_pick_is_an_error() {
        let uv = derive(&fixtures::grid(1, 1));
        assert!(cluster(uv.store(), uv.registry(), PolygonId(9)).is_err());
        assert!(seam_chain(uv.store(), uv.registry(), EdgeId(99)).is_err());
    }
}
