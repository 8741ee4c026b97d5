//! Flags a `Load`/`Store` through a pointer whose address set contains
//! `NULL_PTR`, or through a pointer that has never been materialized at all
//! (an uninitialized, still-bottom value).

use hashbrown::HashSet;

use ae_ir::Statement;
use ae_types::{
    IcfgNodeId,
    NodeId,
};

use crate::{
    detectors::{
        Detector,
        DetectorCtx,
    },
    report::{
        Bug,
        BugKind,
        Severity,
    },
    state::AbsState,
};

#[derive(Debug, Default)]
pub struct NullPtrDerefDetector {
    seen: HashSet<(IcfgNodeId, NodeId)>,
    bugs: Vec<Bug>,
}

impl NullPtrDerefDetector {
    pub fn new() -> Self {
        Self::default()
    }

    fn check(&mut self, node: IcfgNodeId, ptr: NodeId, state: &AbsState, ctx: &DetectorCtx) {
        let val = state.get(ptr);
        let severity = if val.is_bottom() {
            Severity::Full
        } else {
            let addrs = val.as_addrs();
            let null = ae_types::VirtualAddress::to_addr(NodeId::NULL_PTR);
            if !addrs.contains(null) {
                return;
            }
            if addrs.len() == 1 {
                Severity::Full
            } else {
                Severity::Partial
            }
        };
        if self.seen.insert((node, ptr)) {
            self.bugs.push(Bug {
                kind: BugKind::NullPtrDeref,
                severity,
                node,
                var: ptr,
                event_stack: ctx.call_stack.to_vec(),
            });
        }
    }
}

impl Detector for NullPtrDerefDetector {
    fn on_node(&mut self, state: &AbsState, node: IcfgNodeId, ctx: &DetectorCtx) {
        for stmt in ctx.pag.statements_of(node) {
            match stmt {
                Statement::Load { rhs: ptr, .. } | Statement::Store { lhs: ptr, .. } => {
                    self.check(node, ptr, state, ctx);
                }
                _ => {}
            }
        }
    }

    fn on_external(&mut self, _state: &AbsState, _call: IcfgNodeId, _fn_name: &str, _ctx: &DetectorCtx) {}

    fn finish(&mut self) -> Vec<Bug> {
        std::mem::take(&mut self.bugs)
    }
}
