/// Running totals of a directory scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    /// Files whose metadata was read.
    pub scanned: u64,
    pub bytes: u128,
}
