use std::collections::{BTreeMap, BTreeSet};

use nalgebra::distance;
use tracing::warn;

use crate::error::TopologyError;
use crate::topology::{merged_endpoints, UvTopology, VertexId};

/// Validates the structural consistency of a UV set.
///
/// Checks that vertices and edges are partitioned by their merged groups,
/// that the seam set matches the single-member merged edges, that welded
/// edges connect the same merged vertices, that subobjects reference each
/// other consistently, and that the selection only holds live handles.
pub struct IsValid;

impl IsValid {
    /// Creates a new `IsValid` query.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes the validation, returning `true` if the UV set is valid.
    #[must_use]
    pub fn execute(&self, uv: &UvTopology) -> bool {
        match self.check(uv) {
            Ok(()) => true,
            Err(err) => {
                warn!(uv_set = %uv.uv_set_id(), %err, "invalid UV topology");
                false
            }
        }
    }

    /// Runs the validation and reports the first violation found.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::InvariantViolation`] describing the first
    /// broken invariant.
    pub fn check(&self, uv: &UvTopology) -> Result<(), TopologyError> {
        check_vertex_partition(uv)?;
        check_edge_partition(uv)?;
        check_references(uv)?;
        check_selection(uv)
    }

    /// Checks that the members of every merged vertex are linked to one
    /// another through welded edges.
    ///
    /// Splits, breaks and detaches keep this. A stitch joins every corner at
    /// a shared mesh point, which may leave a merged vertex in pieces.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::InvariantViolation`] naming the first merged
    /// vertex that is not connected.
    pub fn check_connected(&self, uv: &UvTopology) -> Result<(), TopologyError> {
        let (store, registry) = (uv.store(), uv.registry());
        let mut links: BTreeMap<VertexId, Vec<VertexId>> = BTreeMap::new();

        for (_, group) in registry.merged_edges() {
            let Some((a, b)) = group.pair() else {
                continue;
            };
            let far = store.edge(b)?.vertex_ids;
            for corner in store.edge(a)?.vertex_ids {
                let key = registry.merged_vertex_id(corner)?;
                for other in far {
                    if registry.merged_vertex_id(other)? == key {
                        links.entry(corner).or_default().push(other);
                        links.entry(other).or_default().push(corner);
                    }
                }
            }
        }

        for (key, group) in registry.merged_vertices() {
            let Some(first) = group.first() else {
                continue;
            };
            let mut reached = BTreeSet::new();
            let mut stack = vec![first];
            while let Some(corner) = stack.pop() {
                if reached.insert(corner) {
                    stack.extend(links.get(&corner).into_iter().flatten().copied());
                }
            }
            if reached.len() != group.len() {
                return Err(violation(format!(
                    "merged vertex {key:?} is not connected through welded edges"
                )));
            }
        }
        Ok(())
    }
}

impl Default for IsValid {
    fn default() -> Self {
        Self::new()
    }
}

fn violation(message: String) -> TopologyError {
    TopologyError::InvariantViolation(message)
}

fn check_vertex_partition(uv: &UvTopology) -> Result<(), TopologyError> {
    let (store, registry) = (uv.store(), uv.registry());
    let max_spread = 2.0 * uv.config().merge_tolerance;
    let mut members = 0;

    for (key, group) in registry.merged_vertices() {
        let Some(first) = group.first() else {
            return Err(violation(format!("merged vertex {key:?} is empty")));
        };
        let anchor = store.position(first)?;
        for id in group.ids() {
            if registry.merged_vertex_id(id)? != key {
                return Err(violation(format!("vertex {id} is indexed under another group")));
            }
            if distance(&anchor, &store.position(id)?) > max_spread {
                return Err(violation(format!(
                    "vertex {id} does not coincide with merged vertex {key:?}"
                )));
            }
        }
        members += group.len();
    }

    if members != store.vertex_count() {
        return Err(violation(format!(
            "{members} merged vertex members for {} vertices",
            store.vertex_count()
        )));
    }
    Ok(())
}

fn check_edge_partition(uv: &UvTopology) -> Result<(), TopologyError> {
    let (store, registry) = (uv.store(), uv.registry());
    let mut members = 0;
    let mut seams = 0;

    for (key, group) in registry.merged_edges() {
        for id in group.ids() {
            if registry.merged_edge_id(id)? != key {
                return Err(violation(format!("edge {id} is indexed under another group")));
            }
        }
        match group.pair() {
            None => {
                if !registry.is_seam(group.first()) {
                    return Err(violation(format!(
                        "single edge {} is not a seam",
                        group.first()
                    )));
                }
                seams += 1;
            }
            Some((a, b)) => {
                if registry.is_seam(a) || registry.is_seam(b) {
                    return Err(violation(format!("welded edge {a} or {b} is a seam")));
                }
                if store.edge(a)?.polygon_id == store.edge(b)?.polygon_id {
                    return Err(violation(format!("edges {a} and {b} share a polygon")));
                }
                if merged_endpoints(store, registry, a)? != merged_endpoints(store, registry, b)? {
                    return Err(violation(format!(
                        "welded edges {a} and {b} connect different merged vertices"
                    )));
                }
            }
        }
        members += group.len();
    }

    if members != store.edge_count() {
        return Err(violation(format!(
            "{members} merged edge members for {} edges",
            store.edge_count()
        )));
    }
    if seams != registry.seam_count() {
        return Err(violation(format!(
            "{} seams recorded for {seams} single edges",
            registry.seam_count()
        )));
    }
    Ok(())
}

fn check_references(uv: &UvTopology) -> Result<(), TopologyError> {
    let store = uv.store();

    for vertex in store.vertices() {
        let polygon = store.polygon(vertex.polygon_id)?;
        if !polygon.vertex_ids.contains(&vertex.id) {
            return Err(violation(format!(
                "polygon {} does not own vertex {}",
                polygon.id, vertex.id
            )));
        }
        for edge in vertex.edge_ids {
            if !store.edge(edge)?.contains(vertex.id) {
                return Err(violation(format!(
                    "edge {edge} does not touch vertex {}",
                    vertex.id
                )));
            }
        }
    }

    for edge in store.edges() {
        if !store.polygon(edge.polygon_id)?.edge_ids.contains(&edge.id) {
            return Err(violation(format!(
                "polygon {} does not own edge {}",
                edge.polygon_id, edge.id
            )));
        }
    }
    Ok(())
}

fn check_selection(uv: &UvTopology) -> Result<(), TopologyError> {
    let (store, registry, selection) = (uv.store(), uv.registry(), uv.selection());

    if let Some(key) = selection
        .merged_vertices()
        .find(|k| !registry.contains_merged_vertex(*k))
    {
        return Err(violation(format!("selected merged vertex {key:?} is gone")));
    }
    if let Some(key) = selection
        .merged_edges()
        .find(|k| !registry.contains_merged_edge(*k))
    {
        return Err(violation(format!("selected merged edge {key:?} is gone")));
    }

    let selected: BTreeSet<_> = selection.polygons().collect();
    let unselected: BTreeSet<_> = selection.unselected_polygons().collect();
    let all: BTreeSet<_> = store.polygon_ids().collect();
    if !selected.is_disjoint(&unselected) || (&selected | &unselected) != all {
        return Err(violation(
            "polygon selection buffers do not partition the polygons".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::UvWeldConfig;
    use crate::math::Point2;
    use crate::mesh::fixtures;
    use crate::topology::{UvSetId, VertexId};

    fn derive(mesh: &crate::mesh::InMemoryMesh) -> UvTopology {
        UvTopology::derive_from_mesh(mesh, UvSetId(0), UvWeldConfig::default()).unwrap()
    }

    #[test]
    fn derived_topologies_are_valid() {
        for mesh in [
            fixtures::quad_of_two_triangles(),
            fixtures::two_torn_quads(),
            fixtures::closed_tetrahedron(),
            fixtures::grid(3, 2),
        ] {
            let uv = derive(&mesh);
            assert!(IsValid::new().check(&uv).is_ok());
            assert!(IsValid::new().check_connected(&uv).is_ok());
        }
    }

    #[test]
    fn corners_left_without_a_welded_link_are_detected() {
        // Tearing e1 of a 2x2 grid without separating its boundary end
        // leaves v1 and v4 grouped with nothing linking them.
        let mut uv = derive(&fixtures::grid(2, 2));
        let key = uv.registry.merged_edge_id(crate::topology::EdgeId(1)).unwrap();
        uv.registry.tear_edge(key).unwrap();
        let group = uv.registry.merged_vertex_id(VertexId(1)).unwrap();

        assert!(IsValid::new().check(&uv).is_ok());
        assert_eq!(
            IsValid::new().check_connected(&uv).unwrap_err(),
            TopologyError::InvariantViolation(format!(
                "merged vertex {group:?} is not connected through welded edges"
            ))
        );
    }

    #[test]
    fn drifting_member_is_detected() {
        let mut uv = derive(&fixtures::quad_of_two_triangles());
        uv.store.vertex_mut(VertexId(3)).unwrap().position = Point2::new(0.5, 0.5);

        let err = IsValid::new().check(&uv).unwrap_err();
        assert!(matches!(err, TopologyError::InvariantViolation(_)));
        assert!(!IsValid::new().execute(&uv));
    }

    #[test]
    fn stale_selection_handle_is_detected() {
        let mut uv = derive(&fixtures::quad_of_two_triangles());
        uv.select_vertices(&[VertexId(0)], crate::selection::SelectionOp::Replace)
            .unwrap();
        // Re-creating the group under a new handle leaves the old one dangling.
        let key = uv.registry.merged_vertex_id(VertexId(0)).unwrap();
        uv.registry
            .merge_vertex_groups(&BTreeSet::from([key]))
            .unwrap();

        assert_eq!(
            IsValid::new().check(&uv).unwrap_err(),
            TopologyError::InvariantViolation(format!("selected merged vertex {key:?} is gone"))
        );
    }
}
