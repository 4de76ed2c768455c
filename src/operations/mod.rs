pub mod modification;
pub mod query;
pub mod transform;

pub use modification::{
    BreakVertices, DetachPolygons, SplitEdges, StitchEdges, StitchOutcome, StitchPolygons,
};
pub use query::{IsValid, Islands, SelectionBorder};
pub use transform::{SetVertexPositions, TranslateSelection};
