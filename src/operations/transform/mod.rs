mod set_positions;
mod translate;

pub use set_positions::SetVertexPositions;
pub use translate::TranslateSelection;
