//! Tunables recognized by the fixpoint driver and call dispatcher.

use ae_types::Limits;

/// How a recursive call is approximated by the call-site dispatcher.
///
/// `Top` havocs the callee's observable effects unconditionally and is the
/// only mode that requires no extra iteration; `WidenOnly`/`WidenNarrow`
/// feed the havoced post-state back through one widening (and, for the
/// latter, one narrowing) round against the pre-call state before handing
/// it to the `Ret` node, recovering some precision on self-recursive
/// accumulator patterns at the cost of an extra state computation per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HandleRecur {
    /// Havoc and return; no extra refinement round.
    #[default]
    Top,
    /// Havoc, then widen once against the pre-call state.
    WidenOnly,
    /// Havoc, widen once, then narrow once.
    WidenNarrow,
}

/// Engine-wide configuration, threaded by reference through the driver,
/// the call dispatcher, and the external-API registry.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Upper bound for any single gep-index materialization and for
    /// accumulated byte offsets.
    pub max_field_limit: u32,
    /// Number of iterations of a cycle body run before widening engages.
    pub widen_delay: u32,
    /// When `false`, every array/struct-field gep index collapses to offset
    /// 0 instead of being walked (see `gep_walk::walk`) — trades field
    /// sensitivity for speed on array-heavy code.
    pub model_arrays: bool,
    /// How recursive calls are approximated.
    pub handle_recur: HandleRecur,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_field_limit: Limits::DEFAULT_MAX_FIELD_LIMIT,
            widen_delay: 3,
            model_arrays: true,
            handle_recur: HandleRecur::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_knobs() {
        let cfg = Config::default();
        assert_eq!(cfg.max_field_limit, 512);
        assert_eq!(cfg.widen_delay, 3);
        assert!(cfg.model_arrays);
        assert_eq!(cfg.handle_recur, HandleRecur::Top);
    }
}
