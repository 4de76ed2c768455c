use std::collections::BTreeMap;

use tracing::debug;

use crate::error::Result;
use crate::math::Point2;
use crate::mesh::MeshGeometry;
use crate::topology::{UvTopology, VertexId};

/// Places vertices at explicit UV positions.
///
/// Each position applies to the whole merged vertex of the given id. When
/// several ids of one merged vertex are given, the last one wins.
pub struct SetVertexPositions {
    positions: Vec<(VertexId, Point2)>,
}

impl SetVertexPositions {
    /// Creates a new `SetVertexPositions` operation.
    #[must_use]
    pub fn new(positions: Vec<(VertexId, Point2)>) -> Self {
        Self { positions }
    }

    /// Executes the placement. Returns `false` if no positions were given.
    ///
    /// # Errors
    ///
    /// Returns an error if a vertex is unknown; nothing moves in that case.
    pub fn execute<M: MeshGeometry + ?Sized>(
        &self,
        uv: &mut UvTopology,
        mesh: &mut M,
    ) -> Result<bool> {
        let mut moves = BTreeMap::new();
        for &(id, position) in &self.positions {
            for member in uv.registry.merged_vertex_of(id)?.ids() {
                moves.insert(member, position);
            }
        }
        if moves.is_empty() {
            return Ok(false);
        }

        let edits = uv.move_vertices(&moves)?;
        debug!(moved = edits.len(), "set vertex positions");
        mesh.apply_uv_edits(uv.uv_set_id, &edits);
        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::UvWeldConfig;
    use crate::mesh::{fixtures, MeshNotification};
    use crate::topology::UvSetId;

    #[test]
    fn whole_merged_vertex_moves() {
        let mut mesh = fixtures::quad_of_two_triangles();
        let mut uv =
            UvTopology::derive_from_mesh(&mesh, UvSetId(0), UvWeldConfig::default()).unwrap();
        let target = Point2::new(-0.5, -0.5);

        assert!(SetVertexPositions::new(vec![(VertexId(3), target)])
            .execute(&mut uv, &mut mesh)
            .unwrap());

        assert_eq!(uv.store().position(VertexId(0)).unwrap(), target);
        assert_eq!(uv.store().position(VertexId(3)).unwrap(), target);
        assert_eq!(
            mesh.notifications(),
            &[MeshNotification::UvEdits {
                uv_set: UvSetId(0),
                vertex_ids: vec![VertexId(0), VertexId(3)],
            }]
        );
    }

    #[test]
    fn unknown_vertex_moves_nothing() {
        let mut mesh = fixtures::quad_of_two_triangles();
        let mut uv =
            UvTopology::derive_from_mesh(&mesh, UvSetId(0), UvWeldConfig::default()).unwrap();
        let before = uv.store().clone();
        assert!(SetVertexPositions::new(vec![
            (VertexId(0), Point2::new(3.0, 3.0)),
            (VertexId(30), Point2::new(3.0, 3.0)),
        ])
        .execute(&mut uv, &mut mesh)
        .is_err());
        assert_eq!(uv.store(), &before);
    }
}
