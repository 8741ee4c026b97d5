//! One transfer function per [`Statement`] kind. `Branch`/`Call` carry no
//! direct value-level update here: `Branch` is consumed by
//! [`crate::branch`], `Call` by [`crate::call`] (its `CallPE`/`RetPE`
//! operands are ordinary assignments handled below).

use ae_contracts::{
    Pag,
    VarKind,
};
use ae_ir::{
    BinOp,
    CastKind,
    Predicate,
    Statement,
    UnOp,
};
use ae_types::{
    IcfgNodeId,
    NodeId,
    Word,
};

use crate::{
    absval::AbsVal,
    addrset::AddrSet,
    alloc_size::AllocSizeTracker,
    config::Config,
    error::EngineError,
    gep_walk,
    interval::Interval,
    state::AbsState,
};

/// Interpret one statement, mutating `state` in place.
///
/// `node` is only used to attribute a possible [`EngineError::ContractViolation`]
/// to its program point; `alloc_sizes` records freshly computed allocation
/// sizes so the overflow detector can later look them up through
/// [`crate::alloc_size::AllocSizeTracker::size_of`].
pub fn interpret(
    stmt: &Statement,
    state: &mut AbsState,
    pag: &dyn Pag,
    cfg: &Config,
    node: IcfgNodeId,
    alloc_sizes: &mut AllocSizeTracker,
) -> Result<(), EngineError> {
    match stmt {
        Statement::Addr { lhs, rhs, array_sizes } => {
            interpret_addr(*lhs, *rhs, array_sizes.as_deref(), state, pag, alloc_sizes);
        }
        Statement::Copy { lhs, rhs, kind } => {
            let val = interpret_copy(*rhs, *kind, state, pag);
            state.set(*lhs, val);
        }
        Statement::Gep { lhs, rhs, pairs, constant_offset } => {
            let offset =
                gep_walk::element_index(pairs, *constant_offset, state, pag, cfg.max_field_limit as Word, cfg.model_arrays, node)?;
            let addrs = state.gep_obj_addrs(*rhs, &offset, pag, cfg.max_field_limit as Word);
            state.set(*lhs, AbsVal::Addrs(addrs));
        }
        Statement::Load { lhs, rhs } => {
            let val = state.load_value(*rhs);
            state.set(*lhs, val);
        }
        Statement::Store { lhs, rhs } => {
            let val = state.get(*rhs);
            state.store_value(*lhs, &val);
        }
        Statement::Phi { res, op_vars } => {
            let joined = op_vars.iter().map(|v| state.get(*v)).fold(AbsVal::Bottom, |acc, v| acc.join(&v));
            state.set(*res, joined);
        }
        Statement::Select { res, cond, t, f } => {
            let val = match state.get(*cond).as_interval().as_numeral() {
                Some(0) => state.get(*f),
                Some(_) => state.get(*t),
                None => state.get(*t).join(&state.get(*f)),
            };
            state.set(*res, val);
        }
        Statement::Cmp { res, op0, op1, predicate } => {
            let val = interpret_cmp(state.get(*op0), state.get(*op1), *predicate);
            state.set(*res, AbsVal::Interval(val));
        }
        Statement::BinaryOp { res, op0, op1, opcode } => {
            let a = state.get(*op0).as_interval();
            let b = state.get(*op1).as_interval();
            let val = match opcode {
                BinOp::Add => a.add(&b),
                BinOp::Sub => a.sub(&b),
                BinOp::Mul => a.mul(&b),
                BinOp::Div => a.div(&b),
                BinOp::Rem => a.rem(&b),
                BinOp::And => a.bitand(&b),
                BinOp::Or => a.bitor(&b),
                BinOp::Xor => a.bitxor(&b),
                BinOp::Shl => a.shl(&b),
                BinOp::Shr => a.shr(&b),
            };
            state.set(*res, AbsVal::Interval(val));
        }
        Statement::UnaryOp { res, op, opcode } => {
            let a = state.get(*op).as_interval();
            let val = match opcode {
                UnOp::Neg => Interval::num(0).sub(&a),
                UnOp::Not => match a.as_numeral() {
                    Some(k) => Interval::num(!k),
                    None if a.is_bottom() => Interval::bottom(),
                    None => Interval::top(),
                },
            };
            state.set(*res, AbsVal::Interval(val));
        }
        Statement::Branch { .. } => {}
        Statement::CallPE { lhs, rhs } | Statement::RetPE { lhs, rhs } => {
            let val = state.get(*rhs);
            state.set(*lhs, val);
        }
    }
    Ok(())
}

fn interpret_addr(
    lhs: NodeId,
    rhs: NodeId,
    array_sizes: Option<&[NodeId]>,
    state: &mut AbsState,
    pag: &dyn Pag,
    alloc_sizes: &mut AllocSizeTracker,
) {
    let var = pag.node(rhs);
    let base = pag.base_object(rhs);
    if base.is_heap || base.is_stack {
        state.init_obj(rhs);
        if let Some(sizes) = array_sizes {
            let total = sizes
                .iter()
                .map(|s| state.get(*s).as_interval())
                .fold(Interval::num(1), |acc, i| acc.mul(&i));
            alloc_sizes.record(rhs, total);
        }
    }
    let mut val = match var.kind {
        VarKind::ConstantInt(k) => AbsVal::num(k),
        VarKind::ConstantNull => AbsVal::addr_of(NodeId::NULL_PTR),
        VarKind::ConstantFloat | VarKind::ConstantData | VarKind::ConstantArray | VarKind::ConstantStruct => {
            AbsVal::top()
        }
        VarKind::Global | VarKind::Other => AbsVal::addr_of(rhs),
    };
    if let AbsVal::Interval(i) = val {
        let ty = pag.type_info(var.ty);
        if ty.bit_width > 0 {
            val = AbsVal::Interval(i.meet(&representable_range(ty.bit_width, ty.is_signed_int)));
        }
    }
    state.set(lhs, val);
}

fn representable_range(bit_width: u32, is_signed: bool) -> Interval {
    let width = bit_width.min(127);
    if is_signed {
        let half = 1i128 << (width.saturating_sub(1));
        Interval::range(-half, half - 1)
    } else {
        let max = (1i128 << width) - 1;
        Interval::range(0, max)
    }
}

fn interpret_copy(rhs: NodeId, kind: CastKind, state: &AbsState, pag: &dyn Pag) -> AbsVal {
    let val = state.get(rhs);
    match kind {
        CastKind::Val | CastKind::SExt | CastKind::FPTrunc | CastKind::BitCast => val,
        CastKind::ZExt => match val.as_interval().as_numeral() {
            Some(k) => {
                let ty = pag.type_info(pag.node(rhs).ty);
                let width = ty.bit_width.min(127);
                let mask = (1i128 << width) - 1;
                AbsVal::num(k & mask)
            }
            None => AbsVal::top(),
        },
        CastKind::FPToSI | CastKind::FPToUI | CastKind::SIToFP | CastKind::UIToFP => {
            if val.as_interval().is_numeral() {
                val
            } else {
                AbsVal::top()
            }
        }
        CastKind::Trunc { dst_bit_width } => {
            let width = dst_bit_width.min(127);
            let half = 1i128 << width.saturating_sub(1);
            let full_range = Interval::range(-half, half - 1);
            match val.as_interval().finite_range() {
                Some((lo, hi)) => {
                    let (lo_t, hi_t) = (lo.min(half - 1).max(-half), hi.min(half - 1).max(-half));
                    AbsVal::Interval(if lo_t > hi_t { full_range } else { Interval::range(lo_t, hi_t) })
                }
                None => AbsVal::Interval(full_range),
            }
        }
        CastKind::IntToPtr => AbsVal::top(),
        CastKind::PtrToInt => AbsVal::top(),
    }
}

fn interpret_cmp(a: AbsVal, b: AbsVal, predicate: Predicate) -> Interval {
    match (a, b) {
        (AbsVal::Interval(a), AbsVal::Interval(b)) => match predicate {
            Predicate::Eq => a.eq_cmp(&b),
            Predicate::Ne => a.ne_cmp(&b),
            Predicate::Lt => a.lt_cmp(&b),
            Predicate::Le => a.le_cmp(&b),
            Predicate::Gt => a.gt_cmp(&b),
            Predicate::Ge => a.ge_cmp(&b),
            Predicate::FcmpFalse => Interval::ff(),
            Predicate::FcmpTrue => Interval::tt(),
        },
        (AbsVal::Addrs(a), AbsVal::Addrs(b)) => addr_cmp(&a, &b, predicate),
        (AbsVal::Bottom, _) | (_, AbsVal::Bottom) => Interval::bottom(),
        _ => Interval::maybe_bool(),
    }
}

fn addr_cmp(a: &AddrSet, b: &AddrSet, predicate: Predicate) -> Interval {
    match predicate {
        Predicate::Eq => {
            if a.is_empty() && b.is_empty() {
                Interval::tt()
            } else if a.has_intersect(b) {
                Interval::maybe_bool()
            } else {
                Interval::ff()
            }
        }
        Predicate::Ne => {
            if a.is_empty() && b.is_empty() {
                Interval::ff()
            } else if a.has_intersect(b) {
                Interval::maybe_bool()
            } else {
                Interval::tt()
            }
        }
        Predicate::FcmpFalse => Interval::ff(),
        Predicate::FcmpTrue => Interval::tt(),
        Predicate::Lt | Predicate::Le | Predicate::Gt | Predicate::Ge => {
            if a.len() == 1 && b.len() == 1 {
                let aw = Interval::num(a.iter().next().expect("len checked above").raw() as Word);
                let bw = Interval::num(b.iter().next().expect("len checked above").raw() as Word);
                match predicate {
                    Predicate::Lt => aw.lt_cmp(&bw),
                    Predicate::Le => aw.le_cmp(&bw),
                    Predicate::Gt => aw.gt_cmp(&bw),
                    _ => aw.ge_cmp(&bw),
                }
            } else {
                Interval::maybe_bool()
            }
        }
    }
}
