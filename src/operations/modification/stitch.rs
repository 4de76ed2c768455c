use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::error::{Result, TopologyError};
use crate::math::{average, Point2};
use crate::mesh::MeshGeometry;
use crate::topology::{merged_endpoints, EdgeId, MergedVertexId, UvTopology, VertexId};

/// Result of a stitch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StitchOutcome {
    /// The topology changed.
    pub changed: bool,
    /// Selected and unselected subobjects were coalesced, so the selection
    /// now covers a different set of underlying ids.
    pub selection_changed: bool,
}

/// Welds seam edges back to the edge they share in the 3D mesh.
///
/// Only seams whose mesh edge is shared by exactly one other polygon edge
/// qualify; a seam on a real mesh boundary is never stitched. The endpoints
/// of each stitched pair snap to the average UV position of everything
/// merged with them.
pub struct StitchEdges {
    edge_ids: Vec<EdgeId>,
}

impl StitchEdges {
    /// Creates a new `StitchEdges` operation.
    #[must_use]
    pub fn new(edge_ids: Vec<EdgeId>) -> Self {
        Self { edge_ids }
    }

    /// Executes the stitch.
    ///
    /// # Errors
    ///
    /// Returns an error if an edge is unknown or the topology is found to be
    /// inconsistent; the UV set is left untouched in both cases.
    pub fn execute<M: MeshGeometry + ?Sized>(
        &self,
        uv: &mut UvTopology,
        mesh: &mut M,
    ) -> Result<StitchOutcome> {
        let pairs = stitch_pairs(uv, &*mesh, &self.edge_ids)?;
        if pairs.is_empty() {
            debug!(requested = self.edge_ids.len(), "nothing to stitch");
            return Ok(StitchOutcome::default());
        }

        let plan = plan_stitch(uv, &*mesh, &pairs)?;
        let mut outcome = StitchOutcome {
            changed: true,
            selection_changed: false,
        };

        let mut moves = BTreeMap::new();
        for (groups, position) in &plan.merges {
            for &group in groups {
                for id in uv.registry.merged_vertex(group)?.ids() {
                    moves.insert(id, *position);
                }
            }
            if groups.len() > 1 {
                let merged = uv.registry.merge_vertex_groups(groups)?;
                outcome.selection_changed |= uv.selection.on_vertices_merged(groups, merged);
            }
        }

        let edits = uv.move_vertices(&moves)?;

        let mut welded = Vec::with_capacity(plan.welds.len() * 2);
        for &(low, high) in &plan.welds {
            let keep = uv.registry.merged_edge_id(low)?;
            let absorb = uv.registry.merged_edge_id(high)?;
            uv.registry.weld_edges(keep, absorb)?;
            outcome.selection_changed |= uv.selection.on_edges_welded(keep, absorb);
            welded.extend([low, high]);
        }
        welded.sort_unstable();

        debug!(
            uv_set = %uv.uv_set_id,
            pairs = pairs.len(),
            welded = welded.len() / 2,
            moved = edits.len(),
            "stitched seams"
        );

        let uv_set = uv.uv_set_id;
        mesh.apply_uv_edits(uv_set, &edits);
        if !welded.is_empty() {
            mesh.remove_tex_seam_edges(uv_set, &welded);
        }
        let affected: Vec<VertexId> = moves.into_keys().collect();
        mesh.uv_topology_changed(uv_set, &affected);
        Ok(outcome)
    }
}

/// The single other polygon edge the mesh merges with `edge`, if any.
fn mesh_partner<M: MeshGeometry + ?Sized>(mesh: &M, edge: EdgeId) -> Option<EdgeId> {
    let others: Vec<EdgeId> = mesh
        .merged_edge(edge)
        .into_iter()
        .filter(|&other| other != edge)
        .collect();
    match others.as_slice() {
        [partner] => Some(*partner),
        _ => None,
    }
}

/// Requested seams paired with their mesh partner, as ordered pairs.
fn stitch_pairs<M: MeshGeometry + ?Sized>(
    uv: &UvTopology,
    mesh: &M,
    requested: &[EdgeId],
) -> Result<BTreeSet<(EdgeId, EdgeId)>> {
    let mut pairs = BTreeSet::new();
    for &edge in requested {
        uv.registry.merged_edge_id(edge)?;
        if !uv.registry.is_seam(edge) {
            continue;
        }
        let Some(partner) = mesh_partner(mesh, edge) else {
            continue;
        };
        if uv.store.edge(partner).is_ok() && uv.registry.is_seam(partner) {
            pairs.insert((edge.min(partner), edge.max(partner)));
        }
    }
    Ok(pairs)
}

/// The complete change set of a stitch, computed before anything mutates.
#[derive(Debug, Default)]
struct StitchPlan {
    /// Merged vertices to join, with the position they snap to.
    merges: Vec<(BTreeSet<MergedVertexId>, Point2)>,
    /// Seam pairs, ordered, that connect the same merged vertices once the
    /// merges are done.
    welds: BTreeSet<(EdgeId, EdgeId)>,
}

/// Groups the merged vertices at the ends of every pair by mesh vertex,
/// computes the averaged position each group snaps to, and finds every seam
/// around them that the merges close.
fn plan_stitch<M: MeshGeometry + ?Sized>(
    uv: &UvTopology,
    mesh: &M,
    pairs: &BTreeSet<(EdgeId, EdgeId)>,
) -> Result<StitchPlan> {
    let mut by_mesh_vertex: BTreeMap<VertexId, BTreeSet<MergedVertexId>> = BTreeMap::new();
    for &(a, b) in pairs {
        for edge in [a, b] {
            for corner in uv.store.edge(edge)?.vertex_ids {
                let mesh_key = mesh
                    .merged_vertex(corner)
                    .into_iter()
                    .min()
                    .unwrap_or(corner);
                by_mesh_vertex
                    .entry(mesh_key)
                    .or_default()
                    .insert(uv.registry.merged_vertex_id(corner)?);
            }
        }
    }

    let mut plan = StitchPlan::default();
    // Every merged vertex of a merge is represented by the smallest handle
    // of that merge.
    let mut representative: BTreeMap<MergedVertexId, MergedVertexId> = BTreeMap::new();
    let mut candidates = BTreeSet::new();
    for (mesh_key, groups) in by_mesh_vertex {
        let mut positions = Vec::new();
        for &group in &groups {
            for id in uv.registry.merged_vertex(group)?.ids() {
                positions.push(uv.store.position(id)?);
                candidates.extend(uv.store.vertex(id)?.edge_ids);
            }
        }
        let position = average(&positions).ok_or_else(|| {
            TopologyError::InvariantViolation(format!("empty merged vertex at mesh vertex {mesh_key}"))
        })?;
        if let Some(&first) = groups.first() {
            representative.extend(groups.iter().map(|&group| (group, first)));
        }
        plan.merges.push((groups, position));
    }

    let planned_endpoints = |edge: EdgeId| -> Result<(MergedVertexId, MergedVertexId)> {
        let (a, b) = merged_endpoints(&uv.store, &uv.registry, edge)?;
        let a = representative.get(&a).copied().unwrap_or(a);
        let b = representative.get(&b).copied().unwrap_or(b);
        Ok((a.min(b), a.max(b)))
    };

    for edge in candidates {
        if !uv.registry.is_seam(edge) {
            continue;
        }
        let Some(partner) = mesh_partner(mesh, edge) else {
            continue;
        };
        if uv.store.edge(partner).is_err() || !uv.registry.is_seam(partner) {
            continue;
        }
        if planned_endpoints(edge)? == planned_endpoints(partner)? {
            plan.welds.insert((edge.min(partner), edge.max(partner)));
        }
    }
    Ok(plan)
}
