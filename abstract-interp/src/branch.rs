//! The branch-feasibility oracle: refines a candidate post-state along one
//! outgoing control-flow edge of a conditional node, or reports that the
//! edge cannot be taken from the given pre-state at all.
//!
//! Per the documented contract for the one Open Question spec.md leaves to
//! this implementation (see `DESIGN.md`), the backward memory-cell
//! refinement in step 2.d follows *at most one `Copy`, then at most one
//! `Load`* — never transitively across multiple `Copy` hops.

use ae_contracts::{
    IcfgEdge,
    Pag,
};
use ae_ir::{
    CastKind,
    Predicate,
    Statement,
};
use ae_types::{
    IcfgNodeId,
    NodeId,
    Word,
};

use crate::{
    absval::AbsVal,
    interval::Interval,
    state::AbsState,
};

/// Attempt to take control-flow edge `edge` (sourced at `node`) from
/// `state`. Returns the refined post-state if the edge is feasible, `None`
/// if it is provably infeasible. An unconditional edge is always feasible
/// and returns `state` unchanged.
pub fn refine_along_edge(state: &AbsState, node: IcfgNodeId, edge: &IcfgEdge, pag: &dyn Pag) -> Option<AbsState> {
    let (Some(edge_cond), Some(edge_value)) = (edge.condition, edge.cond_value) else {
        return Some(state.clone());
    };

    // Step 1: an unmaterialized condition refines nothing; the edge is
    // feasible by default.
    if state.get(edge_cond).is_bottom() {
        return Some(state.clone());
    }

    // Step 2a.
    let res_val = state.get(edge_cond).as_interval().meet(&Interval::num(edge_value));
    if res_val.is_bottom() {
        return None;
    }
    let mut refined = state.clone();
    refined.set(edge_cond, AbsVal::Interval(res_val));

    match defining_statement(pag, node, edge_cond) {
        Some(Statement::Cmp { op0, op1, predicate, .. }) => {
            refine_cmp(&mut refined, pag, node, op0, op1, predicate, edge_value);
        }
        _ => {
            // Step 3: switch-like — `edge_cond` is itself the key.
            let constraint = Interval::num(edge_value);
            backward_refine_cell(&mut refined, pag, node, edge_cond, &constraint);
        }
    }
    Some(refined)
}

/// Look up the statement (at `node`) that assigns `target`, if any.
fn defining_statement(pag: &dyn Pag, node: IcfgNodeId, target: NodeId) -> Option<Statement> {
    pag.statements_of(node).into_iter().find(|s| s.defined_var() == Some(target))
}

/// Steps 2b-2d: normalize the comparison so a numeral sits on the right,
/// invert the predicate for the false edge, then meet the free operand's
/// interval with the implied half-plane.
fn refine_cmp(state: &mut AbsState, pag: &dyn Pag, node: IcfgNodeId, op0: NodeId, op1: NodeId, predicate: Predicate, edge_value: Word) {
    if matches!(predicate, Predicate::FcmpFalse | Predicate::FcmpTrue) {
        // Feasibility was already fully decided by the resVal check; there
        // is no free operand to refine further.
        return;
    }

    let a = state.get(op0).as_interval();
    let b = state.get(op1).as_interval();
    let (var, c, predicate) = if !a.is_numeral() && b.is_numeral() {
        (op0, b.as_numeral().expect("checked is_numeral above"), predicate)
    } else if a.is_numeral() && !b.is_numeral() {
        (op1, a.as_numeral().expect("checked is_numeral above"), predicate.swapped())
    } else {
        // Both numeral (nothing left to refine) or neither (no singleton
        // to normalize the comparison around).
        return;
    };
    let predicate = if edge_value == 0 { predicate.inverted() } else { predicate };

    let constraint = match predicate {
        Predicate::Eq => Interval::num(c),
        Predicate::Ne => return,
        Predicate::Gt => Interval::at_least(c + 1),
        Predicate::Ge => Interval::at_least(c),
        Predicate::Lt => Interval::at_most(c - 1),
        Predicate::Le => Interval::at_most(c),
        Predicate::FcmpFalse | Predicate::FcmpTrue => return,
    };

    let met = state.get(var).meet(&AbsVal::Interval(constraint.clone()));
    state.set(var, met);

    if predicate == Predicate::Eq {
        backward_refine_cell(state, pag, node, var, &constraint);
    }
}

/// Walk backward from `var` through at most one `Copy`, then at most one
/// `Load`, and meet the constraint into every memory cell the `Load`
/// reads from.
fn backward_refine_cell(state: &mut AbsState, pag: &dyn Pag, node: IcfgNodeId, var: NodeId, constraint: &Interval) {
    let mut cur = var;
    if let Some(Statement::Copy { rhs, kind: CastKind::Val, .. }) = defining_statement(pag, node, cur) {
        cur = rhs;
    }
    if let Some(Statement::Load { rhs: ptr, .. }) = defining_statement(pag, node, cur) {
        for addr in state.get(ptr).as_addrs().iter() {
            let internal = addr.from_addr();
            let refined = state.load(internal).meet(&AbsVal::Interval(constraint.clone()));
            state.store(internal, refined);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ae_contracts::{
        BaseObj,
        TypeInfo,
        Var,
        VarKind,
    };
    use ae_types::{
        TypeId,
        Word as W,
    };

    struct ToyPag {
        stmts: Vec<Statement>,
    }

    impl Pag for ToyPag {
        fn node(&self, _id: NodeId) -> Var {
            Var {
                kind: VarKind::Other,
                ty: TypeId::new(0),
                is_pointer: false,
                is_const_data: false,
                has_value: true,
                base_object_id: None,
            }
        }
        fn gep_obj_var(&self, base_obj_id: NodeId, field_idx: W) -> NodeId {
            NodeId::new(base_obj_id.raw() * 100 + field_idx as u32)
        }
        fn type_info(&self, _ty: TypeId) -> TypeInfo {
            TypeInfo {
                byte_size: 4,
                is_array: false,
                elem_type: None,
                is_signed_int: true,
                bit_width: 32,
            }
        }
        fn flat_elem_idx(&self, _ty: TypeId, i: W) -> W {
            i
        }
        fn struct_field_offset(&self, _ty: TypeId, field_idx: W) -> W {
            field_idx * 4
        }
        fn indirect_call_targets(&self, _call_id: IcfgNodeId) -> Vec<ae_types::FunctionId> {
            Vec::new()
        }
        fn statements_of(&self, _node: IcfgNodeId) -> Vec<Statement> {
            self.stmts.clone()
        }
        fn base_object(&self, _id: NodeId) -> BaseObj {
            BaseObj {
                is_constant_byte_size: true,
                byte_size: 4,
                is_global: false,
                is_heap: false,
                is_stack: true,
            }
        }
    }

    fn cond_edge(cond: NodeId, value: Word) -> IcfgEdge {
        IcfgEdge {
            from: IcfgNodeId::new(0),
            to: IcfgNodeId::new(1),
            condition: Some(cond),
            cond_value: Some(value),
        }
    }

    #[test]
    fn definite_cmp_leaves_exactly_one_edge_feasible() {
        let cond = NodeId::new(1);
        let a = NodeId::new(2);
        let pag = ToyPag {
            stmts: vec![Statement::Cmp {
                res: cond,
                op0: a,
                op1: NodeId::new(3),
                predicate: Predicate::Lt,
            }],
        };
        let mut state = AbsState::empty();
        state.set(cond, AbsVal::Interval(Interval::maybe_bool()));
        state.set(a, AbsVal::Interval(Interval::range(0, 20)));
        state.set(NodeId::new(3), AbsVal::Interval(Interval::num(10)));

        let node = IcfgNodeId::new(0);
        let true_edge = refine_along_edge(&state, node, &cond_edge(cond, 1), &pag);
        let false_edge = refine_along_edge(&state, node, &cond_edge(cond, 0), &pag);
        assert!(true_edge.is_some());
        assert!(false_edge.is_some());
        let true_a = true_edge.unwrap().get(a).as_interval();
        let false_a = false_edge.unwrap().get(a).as_interval();
        assert_eq!(true_a, Interval::range(0, 9));
        assert_eq!(false_a, Interval::range(10, 20));
    }

    #[test]
    fn contradictory_cmp_makes_edge_infeasible() {
        let cond = NodeId::new(1);
        let pag = ToyPag {
            stmts: vec![Statement::Cmp {
                res: cond,
                op0: NodeId::new(2),
                op1: NodeId::new(3),
                predicate: Predicate::Eq,
            }],
        };
        let mut state = AbsState::empty();
        state.set(cond, AbsVal::Interval(Interval::ff()));
        let node = IcfgNodeId::new(0);
        assert!(refine_along_edge(&state, node, &cond_edge(cond, 1), &pag).is_none());
    }

    #[test]
    fn unmaterialized_condition_is_feasible_without_refinement() {
        let pag = ToyPag { stmts: Vec::new() };
        let state = AbsState::empty();
        let node = IcfgNodeId::new(0);
        let refined = refine_along_edge(&state, node, &cond_edge(NodeId::new(9), 1), &pag).unwrap();
        assert!(refined.get(NodeId::new(9)).is_bottom());
    }

    #[test]
    fn switch_like_refines_through_one_copy_and_one_load() {
        let key = NodeId::new(1);
        let copied_from = NodeId::new(2);
        let ptr = NodeId::new(3);
        let pag = ToyPag {
            stmts: vec![
                Statement::Copy {
                    lhs: key,
                    rhs: copied_from,
                    kind: CastKind::Val,
                },
                Statement::Load { lhs: copied_from, rhs: ptr },
            ],
        };
        let mut state = AbsState::empty();
        state.set(key, AbsVal::Interval(Interval::maybe_bool()));
        let obj = NodeId::new(4);
        state.set(ptr, AbsVal::addr_of(obj));
        state.store(obj.into(), AbsVal::Interval(Interval::range(0, 100)));

        let node = IcfgNodeId::new(0);
        let refined = refine_along_edge(&state, node, &cond_edge(key, 7), &pag).unwrap();
        assert_eq!(refined.load(obj.into()), AbsVal::Interval(Interval::num(7)));
    }
}
