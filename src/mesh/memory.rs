use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::{MeshError, Result};
use crate::math::{Point2, Point3};
use crate::topology::{EdgeId, PolygonId, UvSetId, VertexId};

use super::{MeshGeometry, MeshPolygon, MeshVertex};

/// A notification received by an [`InMemoryMesh`].
#[derive(Debug, Clone, PartialEq)]
pub enum MeshNotification {
    UvEdits {
        uv_set: UvSetId,
        vertex_ids: Vec<VertexId>,
    },
    SeamsAdded {
        uv_set: UvSetId,
        edge_ids: Vec<EdgeId>,
    },
    SeamsRemoved {
        uv_set: UvSetId,
        edge_ids: Vec<EdgeId>,
    },
    TopologyChanged {
        uv_set: UvSetId,
        vertex_ids: Vec<VertexId>,
    },
}

/// Undirected key of a mesh edge, by point indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct EdgeKey(usize, usize);

impl EdgeKey {
    fn new(a: usize, b: usize) -> Self {
        Self(a.min(b), a.max(b))
    }
}

#[allow(clippy::cast_possible_truncation)]
fn index_to_id(index: usize) -> u32 {
    index as u32
}

/// Incrementally assembles an [`InMemoryMesh`] from shared 3D points and
/// per-corner UV coordinates.
#[derive(Debug, Clone, Default)]
pub struct MeshBuilder {
    points: Vec<Point3>,
    polygons: Vec<(Vec<usize>, Vec<Point2>)>,
}

impl MeshBuilder {
    /// Creates a builder over the given shared points.
    #[must_use]
    pub fn new(points: Vec<Point3>) -> Self {
        Self {
            points,
            polygons: Vec::new(),
        }
    }

    /// Adds a polygon over point indices, with one UV coordinate per corner
    /// for UV set 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the polygon has fewer than 3 corners, a point
    /// index is out of range, or the UV count does not match.
    pub fn add_polygon(&mut self, corners: &[usize], uvs: &[Point2]) -> Result<PolygonId> {
        let id = PolygonId(index_to_id(self.polygons.len()));
        if corners.len() < 3 {
            return Err(MeshError::DegeneratePolygon(id).into());
        }
        if corners.len() != uvs.len() {
            return Err(MeshError::UvCountMismatch {
                corners: corners.len(),
                uvs: uvs.len(),
            }
            .into());
        }
        if let Some(&bad) = corners.iter().find(|&&c| c >= self.points.len()) {
            return Err(MeshError::PointOutOfRange(bad).into());
        }
        self.polygons.push((corners.to_vec(), uvs.to_vec()));
        Ok(id)
    }

    /// Builds the mesh, computing which corners and edges coincide in 3D.
    ///
    /// # Errors
    ///
    /// Returns an error if a mesh edge is shared by more than two polygons.
    pub fn build(self) -> Result<InMemoryMesh> {
        let mut mesh = InMemoryMesh {
            points: self.points,
            ..InMemoryMesh::default()
        };
        let mut edge_groups: BTreeMap<EdgeKey, Vec<EdgeId>> = BTreeMap::new();
        let mut corner_count = 0;
        let mut uvs = HashMap::new();

        for (index, (corners, corner_uvs)) in self.polygons.into_iter().enumerate() {
            let polygon_id = PolygonId(index_to_id(index));
            let n = corners.len();
            // Every corner owns the edge leaving it, so both id spaces advance together.
            let vertex_ids: Vec<VertexId> = (corner_count..corner_count + n)
                .map(|i| VertexId(index_to_id(i)))
                .collect();
            let edge_ids: Vec<EdgeId> = (corner_count..corner_count + n)
                .map(|i| EdgeId(index_to_id(i)))
                .collect();
            corner_count += n;

            for (i, (&vertex_id, &point)) in vertex_ids.iter().zip(&corners).enumerate() {
                mesh.vertices.insert(
                    vertex_id,
                    MeshVertex {
                        id: vertex_id,
                        polygon_id,
                        row_index: mesh.vertices.len(),
                    },
                );
                mesh.corner_points.insert(vertex_id, point);
                mesh.point_corners.entry(point).or_default().push(vertex_id);
                uvs.insert(vertex_id, corner_uvs[i]);

                let next_point = corners[(i + 1) % n];
                mesh.edge_points.insert(edge_ids[i], EdgeKey::new(point, next_point));
                edge_groups
                    .entry(EdgeKey::new(point, next_point))
                    .or_default()
                    .push(edge_ids[i]);
            }

            let triangles = (1..n - 1)
                .map(|i| [vertex_ids[0], vertex_ids[i], vertex_ids[i + 1]])
                .collect();
            mesh.polygons.push(MeshPolygon {
                id: polygon_id,
                vertex_ids,
                edge_ids,
                triangles,
            });
        }

        for (key, group) in edge_groups {
            if group.len() > 2 {
                return Err(MeshError::NonManifoldEdge(key.0, key.1).into());
            }
            mesh.edge_groups.insert(key, group);
        }
        mesh.uvs.insert(UvSetId::default(), uvs);
        Ok(mesh)
    }
}

/// A self-contained mesh implementing [`MeshGeometry`].
///
/// Keeps its own copy of every UV set and records each notification it
/// receives, in order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMesh {
    points: Vec<Point3>,
    polygons: Vec<MeshPolygon>,
    vertices: BTreeMap<VertexId, MeshVertex>,
    corner_points: HashMap<VertexId, usize>,
    point_corners: HashMap<usize, Vec<VertexId>>,
    edge_points: HashMap<EdgeId, EdgeKey>,
    edge_groups: BTreeMap<EdgeKey, Vec<EdgeId>>,
    uvs: BTreeMap<UvSetId, HashMap<VertexId, Point2>>,
    seams: BTreeMap<UvSetId, BTreeSet<EdgeId>>,
    notifications: Vec<MeshNotification>,
}

impl InMemoryMesh {
    /// The 3D position of a corner.
    #[must_use]
    pub fn point(&self, id: VertexId) -> Option<Point3> {
        self.corner_points
            .get(&id)
            .and_then(|&i| self.points.get(i))
            .copied()
    }

    /// Sets the UV coordinates of a corner without emitting a notification,
    /// creating the UV set if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the corner is unknown.
    pub fn set_uv(&mut self, uv_set: UvSetId, id: VertexId, uv: Point2) -> Result<()> {
        if !self.vertices.contains_key(&id) {
            return Err(MeshError::UnknownVertex(id).into());
        }
        self.uvs.entry(uv_set).or_default().insert(id, uv);
        Ok(())
    }

    /// Copies every UV coordinate of `from` into `to`.
    pub fn duplicate_uv_set(&mut self, from: UvSetId, to: UvSetId) {
        let copy = self.uvs.get(&from).cloned().unwrap_or_default();
        self.uvs.insert(to, copy);
    }

    /// The UV sets the mesh holds coordinates for.
    pub fn uv_set_ids(&self) -> impl Iterator<Item = UvSetId> + '_ {
        self.uvs.keys().copied()
    }

    /// The edges currently registered as seams in a UV set.
    #[must_use]
    pub fn seam_edges(&self, uv_set: UvSetId) -> BTreeSet<EdgeId> {
        self.seams.get(&uv_set).cloned().unwrap_or_default()
    }

    /// Notifications received so far, oldest first.
    #[must_use]
    pub fn notifications(&self) -> &[MeshNotification] {
        &self.notifications
    }

    /// Clears the notification log.
    pub fn clear_notifications(&mut self) {
        self.notifications.clear();
    }
}

impl MeshGeometry for InMemoryMesh {
    fn polygons(&self) -> Vec<MeshPolygon> {
        self.polygons.clone()
    }

    fn vertex(&self, id: VertexId) -> Option<MeshVertex> {
        self.vertices.get(&id).copied()
    }

    fn uv(&self, uv_set: UvSetId, id: VertexId) -> Option<Point2> {
        self.uvs.get(&uv_set).and_then(|set| set.get(&id)).copied()
    }

    fn merged_vertex(&self, id: VertexId) -> Vec<VertexId> {
        self.corner_points
            .get(&id)
            .and_then(|point| self.point_corners.get(point))
            .cloned()
            .unwrap_or_default()
    }

    fn merged_edge(&self, id: EdgeId) -> Vec<EdgeId> {
        self.edge_points
            .get(&id)
            .and_then(|key| self.edge_groups.get(key))
            .cloned()
            .unwrap_or_default()
    }

    fn apply_uv_edits(&mut self, uv_set: UvSetId, edits: &[(VertexId, Point2)]) {
        let set = self.uvs.entry(uv_set).or_default();
        for &(id, uv) in edits {
            set.insert(id, uv);
        }
        self.notifications.push(MeshNotification::UvEdits {
            uv_set,
            vertex_ids: edits.iter().map(|&(id, _)| id).collect(),
        });
    }

    fn add_tex_seam_edges(&mut self, uv_set: UvSetId, edge_ids: &[EdgeId]) {
        self.seams
            .entry(uv_set)
            .or_default()
            .extend(edge_ids.iter().copied());
        self.notifications.push(MeshNotification::SeamsAdded {
            uv_set,
            edge_ids: edge_ids.to_vec(),
        });
    }

    fn remove_tex_seam_edges(&mut self, uv_set: UvSetId, edge_ids: &[EdgeId]) {
        if let Some(seams) = self.seams.get_mut(&uv_set) {
            for id in edge_ids {
                seams.remove(id);
            }
        }
        self.notifications.push(MeshNotification::SeamsRemoved {
            uv_set,
            edge_ids: edge_ids.to_vec(),
        });
    }

    fn uv_topology_changed(&mut self, uv_set: UvSetId, vertex_ids: &[VertexId]) {
        self.notifications.push(MeshNotification::TopologyChanged {
            uv_set,
            vertex_ids: vertex_ids.to_vec(),
        });
    }
}
