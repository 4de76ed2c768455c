use std::collections::BTreeSet;

use super::edge::EdgeId;
use super::vertex::VertexId;

slotmap::new_key_type! {
    /// Unique identifier for a merged vertex in the merge registry.
    pub struct MergedVertexId;
}

slotmap::new_key_type! {
    /// Unique identifier for a merged edge in the merge registry.
    pub struct MergedEdgeId;
}

/// Vertices that are edited as one UV point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedVertex {
    ids: BTreeSet<VertexId>,
}

impl MergedVertex {
    pub(crate) fn new(ids: BTreeSet<VertexId>) -> Self {
        Self { ids }
    }

    /// The member vertex ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.ids.iter().copied()
    }

    #[must_use]
    pub fn contains(&self, id: VertexId) -> bool {
        self.ids.contains(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Smallest member id, used as a deterministic representative.
    #[must_use]
    pub fn first(&self) -> Option<VertexId> {
        self.ids.first().copied()
    }

    pub(crate) fn id_set(&self) -> &BTreeSet<VertexId> {
        &self.ids
    }

    pub(crate) fn id_set_mut(&mut self) -> &mut BTreeSet<VertexId> {
        &mut self.ids
    }
}

/// One or two edges edited as one UV edge.
///
/// A single member makes the edge a seam; two members make it a welded
/// interior edge shared by two polygons. No other size can be expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergedEdge {
    first: EdgeId,
    second: Option<EdgeId>,
}

impl MergedEdge {
    /// A seam consisting of a single edge.
    #[must_use]
    pub fn seam(edge: EdgeId) -> Self {
        Self {
            first: edge,
            second: None,
        }
    }

    /// A welded pair, stored with the smaller id first.
    #[must_use]
    pub fn welded(a: EdgeId, b: EdgeId) -> Self {
        Self {
            first: a.min(b),
            second: Some(a.max(b)),
        }
    }

    /// Returns `true` if this merged edge has a single member.
    #[must_use]
    pub fn is_seam(&self) -> bool {
        self.second.is_none()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        if self.second.is_some() {
            2
        } else {
            1
        }
    }

    /// Always `false`: a merged edge has at least one member.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The member edge ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = EdgeId> {
        std::iter::once(self.first).chain(self.second)
    }

    #[must_use]
    pub fn contains(&self, id: EdgeId) -> bool {
        self.first == id || self.second == Some(id)
    }

    /// The welded partner of `edge`, if this is a welded pair containing it.
    #[must_use]
    pub fn partner(&self, edge: EdgeId) -> Option<EdgeId> {
        match self.second {
            Some(second) if self.first == edge => Some(second),
            Some(second) if second == edge => Some(self.first),
            _ => None,
        }
    }

    /// The welded pair `(smaller id, larger id)`, if this is not a seam.
    #[must_use]
    pub fn pair(&self) -> Option<(EdgeId, EdgeId)> {
        self.second.map(|second| (self.first, second))
    }

    /// Smallest member id.
    #[must_use]
    pub fn first(&self) -> EdgeId {
        self.first
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn welded_pair_is_ordered() {
        let me = MergedEdge::welded(EdgeId(7), EdgeId(3));
        assert_eq!(me.pair(), Some((EdgeId(3), EdgeId(7))));
        assert_eq!(me.partner(EdgeId(3)), Some(EdgeId(7)));
        assert_eq!(me.partner(EdgeId(7)), Some(EdgeId(3)));
        assert_eq!(me.partner(EdgeId(5)), None);
        assert_eq!(me.len(), 2);
        assert!(!me.is_seam());
    }

    #[test]
    fn seam_has_single_member() {
        let me = MergedEdge::seam(EdgeId(4));
        assert!(me.is_seam());
        assert_eq!(me.len(), 1);
        assert_eq!(me.ids().collect::<Vec<_>>(), vec![EdgeId(4)]);
        assert_eq!(me.partner(EdgeId(4)), None);
    }

    #[test]
    fn merged_vertex_reports_members_in_order() {
        let mv = MergedVertex::new([VertexId(5), VertexId(1), VertexId(3)].into());
        assert_eq!(
            mv.ids().collect::<Vec<_>>(),
            vec![VertexId(1), VertexId(3), VertexId(5)]
        );
        assert_eq!(mv.first(), Some(VertexId(1)));
        assert!(mv.contains(VertexId(3)));
        assert!(!mv.contains(VertexId(2)));
    }
}
