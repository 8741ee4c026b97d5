//! Flags a `Load`/`Store` whose pointer's address set intersects `S.freed`.

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
pub struct UseAfterFreeDetector {
    seen: HashSet<(IcfgNodeId, NodeId)>,
    bugs: Vec<Bug>,
}

impl UseAfterFreeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    fn check(&mut self, node: IcfgNodeId, ptr: NodeId, state: &AbsState, ctx: &DetectorCtx) {
        let addrs = state.get(ptr).as_addrs();
        if addrs.is_empty() {
            return;
        }
        let freed_count = addrs.iter().filter(|a| state.is_freed(NodeId::from(a.from_addr().raw()))).count();
        if freed_count == 0 {
            return;
        }
        let severity = if freed_count == addrs.len() { Severity::Full } else { Severity::Partial };
        if self.seen.insert((node, ptr)) {
            self.bugs.push(Bug {
                kind: BugKind::UseAfterFree,
                severity,
                node,
                var: ptr,
                event_stack: ctx.call_stack.to_vec(),
            });
        }
    }
}

impl Detector for UseAfterFreeDetector {
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
