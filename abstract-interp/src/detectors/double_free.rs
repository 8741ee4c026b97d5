//! Flags a `free`-family call whose argument's address set intersects
//! `S.freed` *before* the call runs — i.e. something already known freed on
//! this path is about to be freed again.

use hashbrown::HashSet;

use ae_types::{
    IcfgNodeId,
    NodeId,
};

use crate::{
    detectors::{
        Detector,
        DetectorCtx,
    },
    external,
    report::{
        Bug,
        BugKind,
        Severity,
    },
    state::AbsState,
};

#[derive(Debug, Default)]
pub struct DoubleFreeDetector {
    seen: HashSet<(IcfgNodeId, NodeId)>,
    bugs: Vec<Bug>,
}

impl DoubleFreeDetector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Detector for DoubleFreeDetector {
    fn on_node(&mut self, _state: &AbsState, _node: IcfgNodeId, _ctx: &DetectorCtx) {}

    fn on_external(&mut self, state: &AbsState, call: IcfgNodeId, fn_name: &str, ctx: &DetectorCtx) {
        let Some(arg_idx) = external::free_arg_index(fn_name) else { return };
        let ptr = ctx.icfg.argument(call, arg_idx);
        let addrs = state.get(ptr).as_addrs();
        if addrs.is_empty() {
            return;
        }
        let freed_count = addrs.iter().filter(|a| state.is_freed(NodeId::from(a.from_addr().raw()))).count();
        if freed_count == 0 {
            return;
        }
        let severity = if freed_count == addrs.len() { Severity::Full } else { Severity::Partial };
        if self.seen.insert((call, ptr)) {
            self.bugs.push(Bug {
                kind: BugKind::DoubleFree,
                severity,
                node: call,
                var: ptr,
                event_stack: ctx.call_stack.to_vec(),
            });
        }
    }

    fn finish(&mut self) -> Vec<Bug> {
        std::mem::take(&mut self.bugs)
    }
}
