mod break_vertices;
mod detach;
mod ring_walk;
mod split;
mod stitch;

pub use break_vertices::BreakVertices;
pub use detach::{DetachPolygons, StitchPolygons};
pub use split::SplitEdges;
pub use stitch::{StitchEdges, StitchOutcome};
