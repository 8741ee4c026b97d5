//! The two engine failure modes that are `Result::Err`, as opposed to the
//! taxonomy entries (defect, infeasibility, unreachable node, top value)
//! that are ordinary, always-safe return values.

use ae_types::IcfgNodeId;

/// A hard failure during analysis.
///
/// `Defect`, `Infeasibility`, and `TopValue` never appear here — they are
/// encoded directly in a [`crate::report::Bug`], a skipped node, or an
/// [`crate::absval::AbsVal::top`] value, never as an error.
#[derive(Debug, Clone, PartialEq, derive_more::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EngineError {
    /// An invariant the consumed IR promised is broken (e.g. a `Gep`
    /// struct-field index that isn't a constant). The enclosing function's
    /// analysis is abandoned; the engine continues with other functions.
    #[display(fmt = "contract violation at {node}: {detail}")]
    ContractViolation {
        /// The program point where the violation was observed.
        node: IcfgNodeId,
        /// Human-readable description of what was expected.
        detail: String,
    },
    /// `svf_assert`/`svf_assert_eq` observed a non-`[1,1]` value. Aborts
    /// the whole run: these hooks exist to validate the engine itself.
    #[display(fmt = "test hook failed at {node}: {detail}")]
    TestHookFailure {
        /// The program point of the failing hook call.
        node: IcfgNodeId,
        /// What the hook observed instead of the expected value.
        detail: String,
    },
}

impl EngineError {
    /// `true` for [`EngineError::TestHookFailure`], the one variant that
    /// aborts the entire run rather than just the enclosing function.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::TestHookFailure { .. })
    }
}

impl std::error::Error for EngineError {}
