//! The engine's working context: the external collaborators (borrowed for
//! the whole run) plus the mutable bookkeeping threaded through the driver,
//! the call dispatcher, and the detectors.

use indexmap::IndexMap;

use ae_contracts::{
    CallGraph,
    Icfg,
    Pag,
    Wto,
};
use ae_types::IcfgNodeId;

use crate::{
    alloc_size::AllocSizeTracker,
    config::Config,
    detectors::Detector,
    report::Event,
    state::AbsState,
};

/// Everything [`crate::driver`] and [`crate::call`] need, bundled so they
/// don't have to pass eight parameters to every function.
pub struct EngineCtx<'a> {
    pub pag: &'a dyn Pag,
    pub icfg: &'a dyn Icfg,
    pub call_graph: &'a dyn CallGraph,
    pub wto: &'a dyn Wto,
    pub cfg: &'a Config,
    pub alloc_sizes: AllocSizeTracker,
    pub detectors: Vec<Box<dyn Detector>>,
    pub call_stack: Vec<Event>,
    /// The post-state last computed for each program point, across every
    /// function analyzed so far this run. Since the fixpoint overwrites
    /// this entry every time a node is revisited, by the time a function's
    /// run completes each of its entries holds the converged state — this
    /// map is also the engine's top-level output.
    pub state_at: IndexMap<IcfgNodeId, AbsState>,
    /// The state immediately before the most recent dispatch of each
    /// external call, paired with the resolved function name (or `None`
    /// for an unresolved indirect call). Detectors run against this in a
    /// single finalization pass after the whole run converges, rather than
    /// on every transient iteration, so a defect that only looked real
    /// mid-fixpoint doesn't linger in the report.
    pub external_calls: IndexMap<IcfgNodeId, (AbsState, Option<String>)>,
}
