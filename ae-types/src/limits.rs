/// Engine-wide caps shared by every crate that needs to reason about bounds
/// without depending on the full `abstract-interp` engine crate (e.g.
/// `ae-contracts`'s default trait methods).
///
/// The authoritative, user-configurable copy lives in
/// `abstract_interp::Config`; this mirrors only the default so low-level
/// crates have something sane to fall back on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Upper bound for any single gep-index materialization and for
    /// accumulated byte offsets.
    pub max_field_limit: u32,
}

impl Limits {
    /// `MaxFieldLimit` default of 512
    pub const DEFAULT_MAX_FIELD_LIMIT: u32 = 512;
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_field_limit: Self::DEFAULT_MAX_FIELD_LIMIT,
        }
    }
}
