#![allow(clippy::unwrap_used)]

use crate::math::{Point2, Point3};

use super::{InMemoryMesh, MeshBuilder};

fn uv(u: f64, v: f64) -> Point2 {
    Point2::new(u, v)
}

#[allow(clippy::cast_precision_loss)]
fn coord(i: usize) -> f64 {
    i as f64
}

/// A unit quad cut along its diagonal into two triangles that are welded in
/// UV space.
///
/// Corners: triangle 0 = v0 (p0), v1 (p1), v2 (p2); triangle 1 = v3 (p0),
/// v4 (p2), v5 (p3). The diagonal is e2 (v2 -> v0) welded to e3 (v3 -> v4).
pub fn quad_of_two_triangles() -> InMemoryMesh {
    let points = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
    ];
    let mut builder = MeshBuilder::new(points);
    builder
        .add_polygon(&[0, 1, 2], &[uv(0.0, 0.0), uv(1.0, 0.0), uv(1.0, 1.0)])
        .unwrap();
    builder
        .add_polygon(&[0, 2, 3], &[uv(0.0, 0.0), uv(1.0, 1.0), uv(0.0, 1.0)])
        .unwrap();
    builder.build().unwrap()
}

/// Two quads sharing the mesh edge p1-p4, unwrapped as separate UV islands.
///
/// Quad 0 = v0 (p0), v1 (p1), v2 (p4), v3 (p3) with edges e0..e3; quad 1 =
/// v4 (p1), v5 (p2), v6 (p5), v7 (p4) with edges e4..e7. The mesh welds e1
/// (p1 -> p4) to e7 (p4 -> p1), but both are UV seams.
pub fn two_torn_quads() -> InMemoryMesh {
    let points = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(2.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(2.0, 1.0, 0.0),
    ];
    let mut builder = MeshBuilder::new(points);
    builder
        .add_polygon(
            &[0, 1, 4, 3],
            &[uv(0.0, 0.0), uv(1.0, 0.0), uv(1.0, 1.0), uv(0.0, 1.0)],
        )
        .unwrap();
    builder
        .add_polygon(
            &[1, 2, 5, 4],
            &[uv(2.0, 0.0), uv(3.0, 0.0), uv(3.0, 1.0), uv(2.0, 1.0)],
        )
        .unwrap();
    builder.build().unwrap()
}

/// A closed tetrahedron whose UVs are a projection of its points, so every
/// edge is welded and there are no seams at all.
pub fn closed_tetrahedron() -> InMemoryMesh {
    let points = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
    ];
    let project = |p: &Point3| uv(p.x + 0.3 * p.z, p.y + 0.6 * p.z);
    let uvs: Vec<Point2> = points.iter().map(project).collect();
    let mut builder = MeshBuilder::new(points);
    for face in [[0, 2, 1], [0, 1, 3], [1, 2, 3], [0, 3, 2]] {
        let face_uvs: Vec<Point2> = face.iter().map(|&i| uvs[i]).collect();
        builder.add_polygon(&face, &face_uvs).unwrap();
    }
    builder.build().unwrap()
}

/// A `cols` x `rows` grid of unit quads forming one fully welded UV island.
///
/// Quad `(i, j)` has polygon id `j * cols + i`; its corners are, in order,
/// `(i, j)`, `(i + 1, j)`, `(i + 1, j + 1)`, `(i, j + 1)`, so its vertex and
/// edge ids start at `4 * (j * cols + i)`.
pub fn grid(cols: usize, rows: usize) -> InMemoryMesh {
    let mut points = Vec::new();
    for j in 0..=rows {
        for i in 0..=cols {
            points.push(Point3::new(coord(i), coord(j), 0.0));
        }
    }
    let index = |i: usize, j: usize| j * (cols + 1) + i;
    let mut builder = MeshBuilder::new(points);
    for j in 0..rows {
        for i in 0..cols {
            let corners = [
                index(i, j),
                index(i + 1, j),
                index(i + 1, j + 1),
                index(i, j + 1),
            ];
            let uvs = [
                uv(coord(i), coord(j)),
                uv(coord(i + 1), coord(j)),
                uv(coord(i + 1), coord(j + 1)),
                uv(coord(i), coord(j + 1)),
            ];
            builder.add_polygon(&corners, &uvs).unwrap();
        }
    }
    builder.build().unwrap()
}
