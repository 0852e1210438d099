/// Result of applying a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Scalar ranges in the new content touched by the edit. A deletion is
    /// reported as the empty range where the removed text used to start.
    pub changed: Vec<std::ops::Range<usize>>,
    pub version: u64,
}
