use std::collections::BTreeSet;

use tracing::debug;

use crate::error::Result;
use crate::mesh::MeshGeometry;
use crate::topology::{EdgeId, UvTopology, VertexId};

use super::ring_walk::{plan_split, SplitPlan};

/// Tears welded UV edges apart into pairs of seams.
///
/// Each torn edge's endpoints are re-partitioned with a ring walk: corners
/// that are no longer connected to the rest of their merged vertex through
/// welded edges move into a merged vertex of their own. An edge whose both
/// endpoints are fully enclosed by welded edges is left alone.
pub struct SplitEdges {
    edge_ids: Vec<EdgeId>,
}

impl SplitEdges {
    /// Creates a new `SplitEdges` operation.
    #[must_use]
    pub fn new(edge_ids: Vec<EdgeId>) -> Self {
        Self { edge_ids }
    }

    /// Executes the split. Returns `false` if no requested edge could be
    /// torn, in which case nothing was modified.
    ///
    /// # Errors
    ///
    /// Returns an error if an edge is unknown or the topology is found to be
    /// inconsistent; the UV set is left untouched in both cases.
    pub fn execute<M: MeshGeometry + ?Sized>(
        &self,
        uv: &mut UvTopology,
        mesh: &mut M,
    ) -> Result<bool> {
        let plan = plan_split(
            &uv.store,
            &uv.registry,
            self.edge_ids.iter().copied(),
            &BTreeSet::new(),
        )?;
        if plan.tears.is_empty() {
            debug!(requested = self.edge_ids.len(), "nothing to split");
            return Ok(false);
        }
        apply_split_plan(uv, mesh, plan)?;
        Ok(true)
    }
}

/// Carries out a split plan and notifies the mesh of new seams and of the
/// corners whose connectivity changed.
pub(crate) fn apply_split_plan<M: MeshGeometry + ?Sized>(
    uv: &mut UvTopology,
    mesh: &mut M,
    plan: SplitPlan,
) -> Result<()> {
    let mut torn = Vec::with_capacity(plan.tears.len() * 2);
    let mut affected: BTreeSet<VertexId> = BTreeSet::new();

    for &key in &plan.tears {
        let new_key = uv.registry.tear_edge(key)?;
        uv.selection.on_edge_split(key, new_key);
        for part in [key, new_key] {
            let edge = uv.registry.merged_edge(part)?.first();
            affected.extend(uv.store.edge(edge)?.vertex_ids);
            torn.push(edge);
        }
    }

    let mut new_groups = 0;
    for (group, runs) in plan.separations {
        affected.extend(uv.registry.merged_vertex(group)?.ids());
        for run in runs {
            let new_group = uv.registry.separate_vertices(group, &run)?;
            uv.selection.on_vertex_split(group, new_group);
            new_groups += 1;
        }
    }

    debug!(
        uv_set = %uv.uv_set_id,
        torn = torn.len() / 2,
        new_groups,
        "split merged edges"
    );

    torn.sort_unstable();
    if !torn.is_empty() {
        mesh.add_tex_seam_edges(uv.uv_set_id, &torn);
    }
    let affected: Vec<VertexId> = affected.into_iter().collect();
    mesh.uv_topology_changed(uv.uv_set_id, &affected);
    Ok(())
}
