//! Walks a two-quad strip through the edit operations and logs the result
//! of each step.
//!
//! Run with `cargo run --example walkthrough`; raise verbosity with
//! `RUST_LOG=uvweld=debug`.

use tracing::info;
use uvweld::math::{Point2, Point3};
use uvweld::mesh::{InMemoryMesh, MeshBuilder};
use uvweld::operations::{Islands, IsValid};
use uvweld::selection::SelectionOp;
use uvweld::topology::{EdgeId, PolygonId, VertexId};
use uvweld::{UvSetId, UvSets, UvWeldConfig, UvWeldError};

const UV_SET: UvSetId = UvSetId(0);

/// Two unit quads side by side, unwrapped flat and welded along p1-p4.
fn strip() -> Result<InMemoryMesh, UvWeldError> {
    let points = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(2.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(2.0, 1.0, 0.0),
    ];
    let uvs: Vec<Point2> = points.iter().map(|p| Point2::new(p.x, p.y)).collect();
    let mut builder = MeshBuilder::new(points);
    for corners in [[0, 1, 4, 3], [1, 2, 5, 4]] {
        let corner_uvs: Vec<Point2> = corners.iter().map(|&c| uvs[c]).collect();
        builder.add_polygon(&corners, &corner_uvs)?;
    }
    builder.build()
}

fn report(sets: &UvSets, step: &str) -> Result<(), UvWeldError> {
    let uv = sets.get(UV_SET)?;
    let seams: Vec<EdgeId> = uv.registry().seam_edges().collect();
    info!(
        step,
        seams = seams.len(),
        islands = Islands::new().execute(uv)?.len(),
        merged_vertices = uv.registry().merged_vertex_count(),
        valid = IsValid::new().execute(uv),
        "UV set state"
    );
    Ok(())
}

fn main() -> Result<(), UvWeldError> {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("walkthrough=info".parse().unwrap_or_default())
        .add_directive("uvweld=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let mut mesh = strip()?;
    let mut sets = UvSets::new(UvWeldConfig::default());
    sets.create(UV_SET, &mut mesh)?;
    report(&sets, "created")?;

    // e1 runs p1 -> p4 in quad 0 and is welded to e7 in quad 1.
    sets.split_edges(UV_SET, &[EdgeId(1)], &mut mesh)?;
    report(&sets, "split")?;

    let outcome = sets.stitch_edges(UV_SET, &[EdgeId(1)], &mut mesh)?;
    info!(changed = outcome.changed, "stitched");
    report(&sets, "stitch")?;

    sets.get_mut(UV_SET)?
        .select_polygons(&[PolygonId(1)], SelectionOp::Replace)?;
    sets.detach_polygons(UV_SET, &mut mesh)?;
    report(&sets, "detach")?;

    let backup = sets.copy(UV_SET)?;
    sets.stitch_polygons(UV_SET, &mut mesh)?;
    report(&sets, "stitch polygons")?;

    sets.break_vertices(UV_SET, &[VertexId(1)], &mut mesh)?;
    report(&sets, "break")?;

    sets.paste(UV_SET, backup, &mut mesh)?;
    report(&sets, "paste")?;

    info!(notifications = mesh.notifications().len(), "done");
    Ok(())
}
