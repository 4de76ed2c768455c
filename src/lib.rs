pub mod config;
pub mod error;
pub mod math;
pub mod mesh;
pub mod operations;
pub mod selection;
pub mod topology;
pub mod uv_sets;

pub use config::{SelectionPolicy, UvWeldConfig};
pub use error::{Result, UvWeldError};
pub use topology::{UvSetId, UvTopology};
pub use uv_sets::UvSets;
