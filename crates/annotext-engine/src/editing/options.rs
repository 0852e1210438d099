use serde::{Deserialize, Serialize};

/// What to do with incoming annotations whose range runs past the end of
/// the content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundsPolicy {
    /// Fail with `InvalidRange`.
    #[default]
    Reject,
    /// Pull both boundaries back to the content length.
    Clamp,
}

/// Per-document behaviour knobs, loadable from the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentOptions {
    pub bounds: BoundsPolicy,
}

impl DocumentOptions {
    #[must_use]
    pub fn with_bounds(mut self, bounds: BoundsPolicy) -> Self {
        self.bounds = bounds;
        self
    }
}
