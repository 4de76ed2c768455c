use tracing::debug;

use crate::error::Result;
use crate::mesh::MeshGeometry;
use crate::operations::query::SelectionBorder;
use crate::topology::UvTopology;

use super::{SplitEdges, StitchEdges, StitchOutcome};

/// Tears the selected polygons away from the rest of their UV island by
/// splitting the selection border.
pub struct DetachPolygons;

impl DetachPolygons {
    /// Creates a new `DetachPolygons` operation.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes the detach. Returns `false` if the selection has no border
    /// or nothing along it could be split.
    ///
    /// # Errors
    ///
    /// Returns an error if the topology is found to be inconsistent.
    pub fn execute<M: MeshGeometry + ?Sized>(
        &self,
        uv: &mut UvTopology,
        mesh: &mut M,
    ) -> Result<bool> {
        let border = SelectionBorder::new().execute(uv)?;
        if border.is_empty() {
            debug!("selection has no border to detach");
            return Ok(false);
        }
        SplitEdges::new(border).execute(uv, mesh)
    }
}

impl Default for DetachPolygons {
    fn default() -> Self {
        Self::new()
    }
}

/// Stitches the seams along the selection border back to their mesh
/// neighbors.
pub struct StitchPolygons;

impl StitchPolygons {
    /// Creates a new `StitchPolygons` operation.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes the stitch.
    ///
    /// # Errors
    ///
    /// Returns an error if the topology is found to be inconsistent.
    pub fn execute<M: MeshGeometry + ?Sized>(
        &self,
        uv: &mut UvTopology,
        mesh: &mut M,
    ) -> Result<StitchOutcome> {
        let border = SelectionBorder::new().execute(uv)?;
        if border.is_empty() {
            debug!("selection has no border to stitch");
            return Ok(StitchOutcome::default());
        }
        StitchEdges::new(border).execute(uv, mesh)
    }
}

impl Default for StitchPolygons {
    fn default() -> Self {
        Self::new()
    }
}
