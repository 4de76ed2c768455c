use std::collections::BTreeMap;

use crate::error::Result;
use crate::topology::{EdgeId, MergedEdgeId, UvTopology};

/// Computes the border of the polygon selection.
///
/// The border is every edge of a selected polygon whose merged edge is
/// reached an odd number of times from the selection: welded edges between
/// a selected and an unselected polygon, and seams of selected polygons.
/// Edges come back in ascending id order.
pub struct SelectionBorder;

impl SelectionBorder {
    /// Creates a new `SelectionBorder` query.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns an error if a selected polygon references an unknown edge.
    pub fn execute(&self, uv: &UvTopology) -> Result<Vec<EdgeId>> {
        let mut hits: BTreeMap<MergedEdgeId, Vec<EdgeId>> = BTreeMap::new();
        for id in uv.selection().polygons() {
            for &edge in &uv.store().polygon(id)?.edge_ids {
                hits.entry(uv.registry().merged_edge_id(edge)?)
                    .or_default()
                    .push(edge);
            }
        }

        let mut border: Vec<EdgeId> = hits
            .into_values()
            .filter(|edges| edges.len() % 2 == 1)
            .flatten()
            .collect();
        border.sort_unstable();
        Ok(border)
    }
}

impl Default for SelectionBorder {
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
    use crate::selection::SelectionOp;
    use crate::topology::{PolygonId, UvSetId};

    #[test]
    fn border_of_one_grid_quad() {
        let mesh = fixtures::grid(2, 1);
        let mut uv =
            UvTopology::derive_from_mesh(&mesh, UvSetId(0), UvWeldConfig::default()).unwrap();
        uv.select_polygons(&[PolygonId(0)], SelectionOp::Replace)
            .unwrap();

        // All four edges of quad 0: three seams and the weld to quad 1.
        assert_eq!(
            SelectionBorder::new().execute(&uv).unwrap(),
            (0..4).map(EdgeId).collect::<Vec<_>>()
        );
    }

    #[test]
    fn interior_welds_are_not_border() {
        let mesh = fixtures::grid(2, 1);
        let mut uv =
            UvTopology::derive_from_mesh(&mesh, UvSetId(0), UvWeldConfig::default()).unwrap();
        uv.select_polygons(&[PolygonId(0), PolygonId(1)], SelectionOp::Replace)
            .unwrap();

        let border = SelectionBorder::new().execute(&uv).unwrap();
        assert_eq!(border.len(), 6);
        assert!(!border.contains(&EdgeId(1)));
        assert!(!border.contains(&EdgeId(7)));
    }

    #[test]
    fn no_selection_no_border() {
        let mesh = fixtures::grid(1, 1);
        let uv = UvTopology::derive_from_mesh(&mesh, UvSetId(0), UvWeldConfig::default()).unwrap();
        assert!(SelectionBorder::new().execute(&uv).unwrap().is_empty());
    }
}
