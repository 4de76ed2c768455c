use std::collections::BTreeSet;

use crate::error::Result;
use crate::selection::special::cluster;
use crate::topology::{PolygonId, UvTopology};

/// Splits the polygons of a UV set into islands connected through welded
/// edges.
///
/// Islands are ordered by their smallest polygon id.
pub struct Islands;

impl Islands {
    /// Creates a new `Islands` query.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns an error if a polygon references an unknown edge.
    pub fn execute(&self, uv: &UvTopology) -> Result<Vec<BTreeSet<PolygonId>>> {
        let mut seen = BTreeSet::new();
        let mut islands = Vec::new();
        for id in uv.store().polygon_ids() {
            if seen.contains(&id) {
                continue;
            }
            let island = cluster(uv.store(), uv.registry(), id)?;
            seen.extend(island.iter().copied());
            islands.push(island);
        }
        Ok(islands)
    }
}

impl Default for Islands {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::UvWeldConfig;
    use crate::mesh::fixtures;
    use crate::topology::UvSetId;

    #[test]
    fn island_count_per_fixture() {
        for (mesh, expected) in [
            (fixtures::two_torn_quads(), 2),
            (fixtures::quad_of_two_triangles(), 1),
            (fixtures::closed_tetrahedron(), 1),
            (fixtures::grid(3, 3), 1),
        ] {
            let uv =
                UvTopology::derive_from_mesh(&mesh, UvSetId(0), UvWeldConfig::default()).unwrap();
            assert_eq!(Islands::new().execute(&uv).unwrap().len(), expected);
        }
    }
}
