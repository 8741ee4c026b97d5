//! Flags a `Gep`-derived access whose byte offset may reach or exceed its
//! base object's allocation size, and the handful of external APIs whose
//! length argument plays the same role (`"BUF_CHECK:Arg_len,Arg_ptr"`).

use hashbrown::HashSet;

use ae_ir::Statement;
use ae_types::{
    IcfgNodeId,
    NodeId,
    Word,
};

use crate::{
    detectors::{
        Detector,
        DetectorCtx,
    },
    gep_walk,
    report::{
        Bug,
        BugKind,
        Severity,
    },
    state::AbsState,
};

/// `(fn_name, length_arg_index, pointer_arg_index)`. Representative, not
/// exhaustive — the point is the check shape, not full libc coverage.
const BUF_CHECKS: &[(&str, usize, usize)] = &[
    ("memcpy", 2, 0),
    ("memmove", 2, 0),
    ("strncpy", 2, 0),
    ("strncat", 2, 0),
    ("fread", 1, 0),
    ("read", 2, 1),
];

#[derive(Debug, Default)]
pub struct BufferOverflowDetector {
    seen: HashSet<(IcfgNodeId, NodeId)>,
    bugs: Vec<Bug>,
}

impl BufferOverflowDetector {
    pub fn new() -> Self {
        Self::default()
    }

    fn report(&mut self, node: IcfgNodeId, var: NodeId, access: (Word, Word), alloc: (Word, Word), ctx: &DetectorCtx) {
        let (access_lb, access_ub) = access;
        let (alloc_lb, alloc_ub) = alloc;
        if access_ub < alloc_lb {
            return;
        }
        let severity = if access_lb >= alloc_ub { Severity::Full } else { Severity::Partial };
        if !self.seen.insert((node, var)) {
            return;
        }
        self.bugs.push(Bug {
            kind: BugKind::BufferOverflow { access_lb, access_ub, alloc_lb, alloc_ub },
            severity,
            node,
            var,
            event_stack: ctx.call_stack.to_vec(),
        });
    }
}

impl Detector for BufferOverflowDetector {
    fn on_node(&mut self, state: &AbsState, node: IcfgNodeId, ctx: &DetectorCtx) {
        for stmt in ctx.pag.statements_of(node) {
            let Statement::Gep { lhs, rhs, pairs, constant_offset } = stmt else { continue };
            let Ok(access) = gep_walk::byte_offset(
                &pairs,
                constant_offset,
                state,
                ctx.pag,
                ctx.cfg.max_field_limit as Word,
                ctx.cfg.model_arrays,
                node,
            ) else {
                continue;
            };
            let Some(access_range) = access.finite_range() else { continue };
            for addr in state.get(rhs).as_addrs().iter() {
                let alloc = ctx.alloc_sizes.size_of(addr.from_addr(), ctx.pag, ctx.cfg.max_field_limit as Word);
                let Some(alloc_range) = alloc.finite_range() else { continue };
                self.report(node, lhs, access_range, alloc_range, ctx);
            }
        }
    }

    fn on_external(&mut self, state: &AbsState, call: IcfgNodeId, fn_name: &str, ctx: &DetectorCtx) {
        let Some((_, len_idx, ptr_idx)) = BUF_CHECKS.iter().find(|(name, ..)| *name == fn_name) else { return };
        let len = state.get(ctx.icfg.argument(call, *len_idx)).as_interval();
        let Some(access_range) = len.finite_range() else { return };
        for addr in state.get(ctx.icfg.argument(call, *ptr_idx)).as_addrs().iter() {
            let alloc = ctx.alloc_sizes.size_of(addr.from_addr(), ctx.pag, ctx.cfg.max_field_limit as Word);
            let Some(alloc_range) = alloc.finite_range() else { continue };
            self.report(call, ctx.icfg.argument(call, *ptr_idx), access_range, alloc_range, ctx);
        }
    }

    fn finish(&mut self) -> Vec<Bug> {
        std::mem::take(&mut self.bugs)
    }
}
