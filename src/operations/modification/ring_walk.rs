use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::trace;

use crate::error::TopologyError;
use crate::topology::{
    EdgeId, MergeRegistry, MergedEdgeId, MergedVertexId, SubobjectStore, VertexId,
};

/// The complete change set of a split, computed before anything mutates.
#[derive(Debug, Default)]
pub(crate) struct SplitPlan {
    /// Welded merged edges to tear, in ascending order of their first edge.
    pub tears: Vec<MergedEdgeId>,
    /// Pieces to move out of each merged vertex into new merged vertices.
    pub separations: BTreeMap<MergedVertexId, Vec<BTreeSet<VertexId>>>,
}

impl SplitPlan {
    pub fn is_empty(&self) -> bool {
        self.tears.is_empty() && self.separations.is_empty()
    }
}

/// The corner reached from `corner` by crossing its edge `edge`, or `None`
/// when that edge is a seam or is about to be torn.
fn across(
    store: &SubobjectStore,
    registry: &MergeRegistry,
    group: MergedVertexId,
    corner: VertexId,
    edge: EdgeId,
    cuts: &HashSet<MergedEdgeId>,
) -> Result<Option<VertexId>, TopologyError> {
    let key = registry.merged_edge_id(edge)?;
    if cuts.contains(&key) {
        return Ok(None);
    }
    match registry.merged_edge(key)?.partner(edge) {
        Some(partner) => matching_corner(store, registry, group, edge, corner, partner).map(Some),
        None => Ok(None),
    }
}

/// Partitions the members of `group` into the pieces that stay connected
/// through welded edges once every merged edge in `cuts` is torn.
///
/// Each member has two edges, so a piece is a stretch of the ring of corners
/// around the merged vertex. Pieces come out ordered by their smallest
/// member; the first one holds the smallest member of the group.
fn pieces(
    store: &SubobjectStore,
    registry: &MergeRegistry,
    group: MergedVertexId,
    cuts: &HashSet<MergedEdgeId>,
) -> Result<Vec<BTreeSet<VertexId>>, TopologyError> {
    let mut assigned = BTreeSet::new();
    let mut pieces = Vec::new();

    for start in registry.merged_vertex(group)?.ids() {
        if assigned.contains(&start) {
            continue;
        }
        let mut piece = BTreeSet::new();
        let mut stack = vec![start];
        while let Some(corner) = stack.pop() {
            if !piece.insert(corner) {
                continue;
            }
            for edge in store.vertex(corner)?.edge_ids {
                if let Some(next) = across(store, registry, group, corner, edge, cuts)? {
                    if !piece.contains(&next) {
                        stack.push(next);
                    }
                }
            }
        }
        assigned.extend(piece.iter().copied());
        pieces.push(piece);
    }

    trace!(?group, pieces = pieces.len(), "ring walk");
    Ok(pieces)
}

/// The corner of `partner` that sits at `corner`'s end of the welded edge
/// `leaving`.
fn matching_corner(
    store: &SubobjectStore,
    registry: &MergeRegistry,
    group: MergedVertexId,
    leaving: EdgeId,
    corner: VertexId,
    partner: EdgeId,
) -> Result<VertexId, TopologyError> {
    let from = store.edge(leaving)?;
    let to = store.edge(partner)?;
    // Welded edges normally run in opposite directions.
    let index = usize::from(from.vertex_ids[0] == corner);
    [to.vertex_ids[index], to.vertex_ids[1 - index]]
        .into_iter()
        .find(|&v| registry.merged_vertex_id(v).is_ok_and(|k| k == group))
        .ok_or_else(|| {
            TopologyError::InvariantViolation(format!(
                "welded edges {leaving} and {partner} do not share merged vertex of {corner}"
            ))
        })
}

/// Plans tearing the welded merged edges of `requested`.
///
/// Around each endpoint, the corners of the merged vertex form a ring linked
/// by welded edges. With every requested edge cut, that ring falls apart into
/// pieces; each piece but the one holding the smallest corner becomes a new
/// merged vertex. A merged edge is torn when, at one of its endpoints or
/// more, its two corners land in different pieces; an edge enclosed at both
/// ends by welded edges stays welded. Corners of merged vertices listed in
/// `broken` are all separated from one another, and every welded edge in
/// `requested` touching them is torn.
pub(crate) fn plan_split(
    store: &SubobjectStore,
    registry: &MergeRegistry,
    requested: impl IntoIterator<Item = EdgeId>,
    broken: &BTreeSet<MergedVertexId>,
) -> Result<SplitPlan, TopologyError> {
    let mut candidates: BTreeMap<EdgeId, (MergedEdgeId, EdgeId)> = BTreeMap::new();
    for edge in requested {
        let key = registry.merged_edge_id(edge)?;
        if let Some((e1, e2)) = registry.merged_edge(key)?.pair() {
            candidates.insert(e1, (key, e2));
        }
    }
    let cuts: HashSet<MergedEdgeId> = candidates.values().map(|&(key, _)| key).collect();

    let mut plan = SplitPlan::default();
    let mut ring_pieces: BTreeMap<MergedVertexId, Vec<BTreeSet<VertexId>>> = BTreeMap::new();
    let mut split_groups = BTreeSet::new();

    for (&e1, &(key, e2)) in &candidates {
        let mut splittable = false;
        for corner in store.edge(e1)?.vertex_ids {
            let group = registry.merged_vertex_id(corner)?;
            if broken.contains(&group) {
                splittable = true;
                continue;
            }
            let other = matching_corner(store, registry, group, e1, corner, e2)?;
            let group_pieces = match ring_pieces.entry(group) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => entry.insert(pieces(store, registry, group, &cuts)?),
            };
            let enclosed = group_pieces
                .iter()
                .any(|piece| piece.contains(&corner) && piece.contains(&other));
            if enclosed {
                trace!(%e1, %corner, "endpoint enclosed");
            } else {
                split_groups.insert(group);
                splittable = true;
            }
        }
        if splittable {
            plan.tears.push(key);
        }
    }

    for group in split_groups {
        if let Some(group_pieces) = ring_pieces.remove(&group) {
            plan.separations
                .insert(group, group_pieces.into_iter().skip(1).collect());
        }
    }

    for &group in broken {
        let members = registry.merged_vertex(group)?;
        if members.len() > 1 {
            plan.separations.insert(
                group,
                members.ids().skip(1).map(|id| BTreeSet::from([id])).collect(),
            );
        }
    }

    Ok(plan)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::UvWeldConfig;
    use crate::mesh::{fixtures, InMemoryMesh};
    use crate::topology::{UvSetId, UvTopology};

    fn derive(mesh: &InMemoryMesh) -> UvTopology {
        UvTopology::derive_from_mesh(mesh, UvSetId(0), UvWeldConfig::default()).unwrap()
    }

    #[test]
    fn boundary_corner_is_its_own_piece_once_cut() {
        let uv = derive(&fixtures::quad_of_two_triangles());
        let registry = uv.registry();
        let group = registry.merged_vertex_id(VertexId(0)).unwrap();
        let cut = registry.merged_edge_id(EdgeId(2)).unwrap();

        let whole = pieces(uv.store(), registry, group, &HashSet::new()).unwrap();
        assert_eq!(whole, vec![BTreeSet::from([VertexId(0), VertexId(3)])]);

        let torn = pieces(uv.store(), registry, group, &HashSet::from([cut])).unwrap();
        assert_eq!(
            torn,
            vec![BTreeSet::from([VertexId(0)]), BTreeSet::from([VertexId(3)])]
        );
    }

    #[test]
    fn single_cut_around_interior_vertex_keeps_it_whole() {
        // Corner v2 of quad 0 is the center of a 2x2 grid; e1 (v1 -> v2)
        // is welded to e7 of quad 1.
        let uv = derive(&fixtures::grid(2, 2));
        let registry = uv.registry();
        let group = registry.merged_vertex_id(VertexId(2)).unwrap();
        let cut = registry.merged_edge_id(EdgeId(1)).unwrap();

        let center = pieces(uv.store(), registry, group, &HashSet::from([cut])).unwrap();
        assert_eq!(center.len(), 1);
        assert_eq!(center[0].len(), 4);
    }

    #[test]
    fn cuts_on_one_side_of_a_seam_separate_every_stretch() {
        // At point (2, 1) of a 3x3 grid the ring is v6 (quad 1), v11
        // (quad 2), v20 (quad 5), v17 (quad 4). With e10 already a seam,
        // cutting e5 and e6 leaves three stretches: v6, v11 and v17 + v20.
        let mut uv = derive(&fixtures::grid(3, 3));
        let seam = uv.registry.merged_edge_id(EdgeId(10)).unwrap();
        uv.registry.tear_edge(seam).unwrap();
        let group = uv.registry().merged_vertex_id(VertexId(11)).unwrap();

        let plan = plan_split(
            uv.store(),
            uv.registry(),
            [EdgeId(5), EdgeId(6)],
            &BTreeSet::new(),
        )
        .unwrap();

        assert_eq!(plan.tears.len(), 2);
        assert_eq!(
            plan.separations[&group],
            vec![
                BTreeSet::from([VertexId(11)]),
                BTreeSet::from([VertexId(17), VertexId(20)]),
            ]
        );
    }

    #[test]
    fn plan_skips_seams() {
        let uv = derive(&fixtures::two_torn_quads());
        let plan = plan_split(
            uv.store(),
            uv.registry(),
            [EdgeId(0), EdgeId(1)],
            &BTreeSet::new(),
        )
        .unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn plan_separates_both_diagonal_corners() {
        let uv = derive(&fixtures::quad_of_two_triangles());
        let plan = plan_split(uv.store(), uv.registry(), [EdgeId(3)], &BTreeSet::new()).unwrap();
        assert_eq!(plan.tears.len(), 1);
        let runs: Vec<_> = plan.separations.values().flatten().cloned().collect();
        assert_eq!(runs.len(), 2);
        assert!(runs.contains(&BTreeSet::from([VertexId(0)])));
        assert!(runs.contains(&BTreeSet::from([VertexId(2)])));
    }

    #[test]
    fn broken_vertex_keeps_smallest_corner() {
        let uv = derive(&fixtures::grid(2, 2));
        let registry = uv.registry();
        let group = registry.merged_vertex_id(VertexId(2)).unwrap();

        let plan = plan_split(
            uv.store(),
            registry,
            std::iter::empty(),
            &BTreeSet::from([group]),
        )
        .unwrap();

        let runs = &plan.separations[&group];
        assert_eq!(runs.len(), 3);
        assert!(runs.iter().all(|run| run.len() == 1 && !run.contains(&VertexId(2))));
    }
}
