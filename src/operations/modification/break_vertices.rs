use std::collections::BTreeSet;

use tracing::debug;

use crate::error::Result;
use crate::mesh::MeshGeometry;
use crate::topology::{UvTopology, VertexId};

use super::ring_walk::plan_split;
use super::split::apply_split_plan;

/// Breaks merged vertices apart so that every member corner stands alone.
///
/// All welded edges touching a broken vertex are torn. Their far endpoints
/// are re-partitioned with the same ring walk [`super::SplitEdges`] uses.
pub struct BreakVertices {
    vertex_ids: Vec<VertexId>,
}

impl BreakVertices {
    /// Creates a new `BreakVertices` operation.
    #[must_use]
    pub fn new(vertex_ids: Vec<VertexId>) -> Self {
        Self { vertex_ids }
    }

    /// Executes the break. Returns `false` if every requested vertex was
    /// already alone in its merged vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if a vertex is unknown or the topology is found to
    /// be inconsistent; the UV set is left untouched in both cases.
    pub fn execute<M: MeshGeometry + ?Sized>(
        &self,
        uv: &mut UvTopology,
        mesh: &mut M,
    ) -> Result<bool> {
        let mut broken = BTreeSet::new();
        for &id in &self.vertex_ids {
            let key = uv.registry.merged_vertex_id(id)?;
            if uv.registry.merged_vertex(key)?.len() > 1 {
                broken.insert(key);
            }
        }
        if broken.is_empty() {
            debug!(requested = self.vertex_ids.len(), "nothing to break");
            return Ok(false);
        }

        let mut incident = BTreeSet::new();
        for &key in &broken {
            for corner in uv.registry.merged_vertex(key)?.ids() {
                incident.extend(
                    uv.store
                        .vertex(corner)?
                        .edge_ids
                        .into_iter()
                        .filter(|&edge| !uv.registry.is_seam(edge)),
                );
            }
        }

        let plan = plan_split(&uv.store, &uv.registry, incident, &broken)?;
        if plan.is_empty() {
            return Ok(false);
        }
        debug!(
            broken = broken.len(),
            tears = plan.tears.len(),
            "breaking merged vertices"
        );
        apply_split_plan(uv, mesh, plan)?;
        Ok(true)
    }
}
