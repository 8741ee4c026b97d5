#![warn(missing_docs)]
//! Whole-program abstract interpretation engine for memory-safety defect
//! detection (buffer overflow, null-pointer dereference, double-free,
//! use-after-free).
//!
//! [`AbstractInterpretation::run`] is the entry point: given a
//! [`Pag`]/[`Icfg`]/[`CallGraph`]/[`Wto`] supplied by an upstream front-end,
//! it interprets the global initializer once, runs one weak-topological-order
//! fixpoint per function in [`CallGraph::functions`] seeded from that
//! post-state, then a single finalization pass over the converged states
//! that produces deduplicated [`Bug`] reports. Detectors never run inline
//! during fixpoint iteration — only against the value a node settled on,
//! so a transient non-converged state never becomes a spurious report.

mod absval;
mod addrset;
mod alloc_size;
mod branch;
mod call;
mod config;
mod ctx;
mod detectors;
mod driver;
mod error;
mod external;
mod gep_walk;
mod interp;
mod interval;
mod report;
mod state;

pub use absval::AbsVal;
pub use addrset::AddrSet;
pub use config::{
    Config,
    HandleRecur,
};
pub use detectors::{
    BufferOverflowDetector,
    Detector,
    DetectorCtx,
    DoubleFreeDetector,
    NullPtrDerefDetector,
    UseAfterFreeDetector,
};
pub use error::EngineError;
pub use interval::Interval;
pub use report::{
    Bug,
    BugKind,
    Event,
    Severity,
};
pub use state::AbsState;

use hashbrown::HashSet;
use indexmap::IndexMap;
use tracing::instrument;

use ae_contracts::{
    CallGraph,
    Icfg,
    Pag,
    Wto,
};
use ae_types::IcfgNodeId;

use crate::{
    alloc_size::AllocSizeTracker,
    ctx::EngineCtx,
};

/// The converged post-state at every reached program point, plus the
/// deduplicated defects the detector pass found.
#[derive(Debug)]
pub struct RunResult {
    /// Converged post-state, keyed by ICFG node, in first-reached order —
    /// stable across runs regardless of process-local hasher seeding.
    pub state_at: IndexMap<IcfgNodeId, AbsState>,
    /// Deduplicated bug reports, in the order their owning detector emitted
    /// them.
    pub bugs: Vec<Bug>,
}

/// Entry point for a whole-program analysis run.
///
/// Holds no state of its own — [`run`](Self::run) takes every collaborator
/// by reference and returns a self-contained [`RunResult`].
pub struct AbstractInterpretation;

impl AbstractInterpretation {
    /// Analyze every function reachable from `icfg.global_entry()`.
    ///
    /// `detectors` observe the converged state at every node and every
    /// dispatched external call once the whole run has settled; their
    /// reports are deduped by [`Bug::dedup_key`] before being returned.
    ///
    /// Returns `Err` only for an [`EngineError::TestHookFailure`] — a
    /// `svf_assert`/`svf_assert_eq` mismatch, which aborts the whole run.
    /// A [`EngineError::ContractViolation`] instead abandons only the
    /// function it occurred in and is logged at `warn`.
    #[instrument(skip_all)]
    pub fn run(
        pag: &dyn Pag,
        icfg: &dyn Icfg,
        call_graph: &dyn CallGraph,
        wto: &dyn Wto,
        cfg: &Config,
        detectors: Vec<Box<dyn Detector>>,
    ) -> Result<RunResult, EngineError> {
        let mut ctx = EngineCtx {
            pag,
            icfg,
            call_graph,
            wto,
            cfg,
            alloc_sizes: AllocSizeTracker::new(),
            detectors,
            call_stack: Vec::new(),
            state_at: IndexMap::new(),
            external_calls: IndexMap::new(),
        };

        let global_exit = run_global_init(icfg.global_entry(), &mut ctx)?;

        for f in call_graph.functions() {
            match driver::run_function(f, global_exit.clone(), &mut ctx) {
                Ok(_) => {}
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => tracing::warn!(error = %e, "abandoning function after contract violation"),
            }
        }

        Ok(finalize(ctx))
    }
}

/// Interpret the global initializer's statements once, against the empty
/// state, to seed every function's fixpoint.
fn run_global_init(global_entry: IcfgNodeId, ctx: &mut EngineCtx) -> Result<AbsState, EngineError> {
    let mut state = AbsState::empty();
    let pag = ctx.pag;
    for stmt in pag.statements_of(global_entry) {
        interp::interpret(&stmt, &mut state, pag, ctx.cfg, global_entry, &mut ctx.alloc_sizes)?;
    }
    ctx.state_at.insert(global_entry, state.clone());
    Ok(state)
}

/// Replay every converged node and dispatched external call through the
/// detectors, then drain and dedupe their reports.
fn finalize(mut ctx: EngineCtx) -> RunResult {
    let mut detectors = std::mem::take(&mut ctx.detectors);
    let dctx = detectors::DetectorCtx {
        pag: ctx.pag,
        icfg: ctx.icfg,
        alloc_sizes: &ctx.alloc_sizes,
        cfg: ctx.cfg,
        call_stack: &ctx.call_stack,
    };

    for (node, state) in &ctx.state_at {
        for d in detectors.iter_mut() {
            d.on_node(state, *node, &dctx);
        }
    }
    for (call, (state, name)) in &ctx.external_calls {
        if let Some(name) = name {
            for d in detectors.iter_mut() {
                d.on_external(state, *call, name, &dctx);
            }
        }
    }

    let mut seen = HashSet::new();
    let mut bugs = Vec::new();
    for d in detectors.iter_mut() {
        for bug in d.finish() {
            if seen.insert(bug.dedup_key()) {
                bugs.push(bug);
            }
        }
    }

    RunResult { state_at: ctx.state_at, bugs }
}
