use serde::{Deserialize, Serialize};

/// Default grid resolution used to decide that two UV positions coincide.
pub const DEFAULT_MERGE_TOLERANCE: f64 = 1e-6;

/// Opt-in rules that grow a single pick into a connected set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionPolicy {
    /// Picking a seam edge also picks every seam edge connected to it.
    pub by_seam: bool,
    /// Picking a polygon also picks the rest of its UV island.
    pub by_cluster: bool,
}

/// Configuration of the UV topology engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UvWeldConfig {
    /// UV positions closer than this are treated as the same point when the
    /// initial merged vertices are derived from the mesh.
    pub merge_tolerance: f64,
    /// Special selection rules.
    pub selection: SelectionPolicy,
}

impl Default for UvWeldConfig {
    fn default() -> Self {
        Self {
            merge_tolerance: DEFAULT_MERGE_TOLERANCE,
            selection: SelectionPolicy::default(),
        }
    }
}

impl UvWeldConfig {
    /// Returns a copy of this config with the given selection policy.
    #[must_use]
    pub fn with_selection(mut self, selection: SelectionPolicy) -> Self {
        self.selection = selection;
        self
    }

    /// Returns a copy of this config with the given merge tolerance.
    #[must_use]
    pub fn with_merge_tolerance(mut self, merge_tolerance: f64) -> Self {
        self.merge_tolerance = merge_tolerance;
        self
    }
}
