use std::collections::BTreeMap;

use tracing::debug;

use crate::error::Result;
use crate::math::Vector2;
use crate::mesh::MeshGeometry;
use crate::topology::{SubobjectLevel, UvTopology};

/// Moves everything spanned by the selection at one level by a UV offset.
///
/// Merged partners of the moved vertices move along, so merged vertices
/// stay coincident.
pub struct TranslateSelection {
    level: SubobjectLevel,
    delta: Vector2,
}

impl TranslateSelection {
    /// Creates a new `TranslateSelection` operation.
    #[must_use]
    pub fn new(level: SubobjectLevel, delta: Vector2) -> Self {
        Self { level, delta }
    }

    /// Executes the translation. Returns `false` if nothing is selected at
    /// the level.
    ///
    /// # Errors
    ///
    /// Returns an error if the selection references a dissolved group.
    pub fn execute<M: MeshGeometry + ?Sized>(
        &self,
        uv: &mut UvTopology,
        mesh: &mut M,
    ) -> Result<bool> {
        let spanned = uv
            .selection
            .spanned_vertex_ids(self.level, &uv.store, &uv.registry)?;
        if spanned.is_empty() {
            return Ok(false);
        }

        let mut moves = BTreeMap::new();
        for id in uv.expand_to_merged(spanned)? {
            moves.insert(id, uv.store.position(id)? + self.delta);
        }
        let edits = uv.move_vertices(&moves)?;
        debug!(level = ?self.level, moved = edits.len(), "translated selection");
        mesh.apply_uv_edits(uv.uv_set_id, &edits);
        Ok(true)
    }
}
