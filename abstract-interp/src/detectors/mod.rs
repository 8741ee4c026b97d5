//! Pluggable defect observers (section 4.10 of the design). A detector
//! watches the fixpoint driver's finished node states; it never feeds back
//! into the analysis itself.

mod buffer_overflow;
mod double_free;
mod null_ptr_deref;
mod use_after_free;

pub use buffer_overflow::BufferOverflowDetector;
pub use double_free::DoubleFreeDetector;
pub use null_ptr_deref::NullPtrDerefDetector;
pub use use_after_free::UseAfterFreeDetector;

use ae_contracts::{
    Icfg,
    Pag,
};
use ae_types::IcfgNodeId;

use crate::{
    alloc_size::AllocSizeTracker,
    config::Config,
    report::{
        Bug,
        Event,
    },
    state::AbsState,
};

/// Read-only context a detector needs beyond the node and its finished
/// state: the PAG (to re-inspect the statements a node carries), the ICFG
/// (to resolve a call's arguments), the cached allocation sizes, engine
/// configuration, and the current interprocedural call stack for event-stack
/// attribution.
pub struct DetectorCtx<'a> {
    pub pag: &'a dyn Pag,
    pub icfg: &'a dyn Icfg,
    pub alloc_sizes: &'a AllocSizeTracker,
    pub cfg: &'a Config,
    pub call_stack: &'a [Event],
}

/// A pluggable observer of the fixpoint driver. Detectors only ever see a
/// shared reference to the state they're shown — they cannot mutate the
/// analysis, only accumulate reports to return from `finish`.
pub trait Detector {
    /// Called once per node, on its finished post-state — after every
    /// attached statement has been interpreted and, for a `Call` node,
    /// after the call dispatcher has run.
    fn on_node(&mut self, state: &AbsState, node: IcfgNodeId, ctx: &DetectorCtx);

    /// Called once per dispatched external call, on the state as it stood
    /// immediately *before* the external-API model's own mutation — so a
    /// detector like [`DoubleFreeDetector`] can tell whether an address was
    /// already freed coming into this call.
    fn on_external(&mut self, state: &AbsState, call: IcfgNodeId, fn_name: &str, ctx: &DetectorCtx);

    /// Drain this detector's accumulated bug reports.
    fn finish(&mut self) -> Vec<Bug>;
}
