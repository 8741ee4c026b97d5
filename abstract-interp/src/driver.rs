//! The weak-topological-order fixpoint driver (section 4.7): singleton
//! program points are visited once per enclosing pass; a cycle's head is
//! stabilized through an increasing (widening) phase followed by a
//! decreasing (narrowing) phase before its body is considered final.

use ae_contracts::Component;
use ae_ir::NodeKind;
use ae_types::{
    FunctionId,
    IcfgNodeId,
};

use crate::{
    branch,
    call,
    ctx::EngineCtx,
    error::EngineError,
    interp,
    state::AbsState,
};

/// Fixed bound on the decreasing (narrowing) phase — spec leaves this
/// unspecified beyond "a fixed bound"; four rounds recovers the common
/// precision losses (a loop-carried upper bound over-widened to `+inf`)
/// without risking runaway iteration on pathological input.
const NARROW_ROUNDS: u32 = 4;

/// A generous ceiling on the increasing phase beyond `widen_delay`, purely
/// as a backstop against a malformed `widen_with` that failed to converge;
/// a sound widening operator never reaches it.
const MAX_WIDEN_ROUNDS: u32 = 10_000;

/// Run function `f`'s fixpoint to convergence, seeded with `entry_state` at
/// its entry node. Returns the converged post-state at `f`'s exit node (or
/// an empty state if the exit was never reached this run).
pub fn run_function(f: FunctionId, entry_state: AbsState, ctx: &mut EngineCtx) -> Result<AbsState, EngineError> {
    let components = ctx.wto.for_function(f);
    for component in &components {
        process_component(component, f, &entry_state, ctx)?;
    }
    let exit = ctx.icfg.fun_exit(f);
    Ok(ctx.state_at.get(&exit).cloned().unwrap_or_else(AbsState::empty))
}

fn process_component(component: &Component, f: FunctionId, entry_state: &AbsState, ctx: &mut EngineCtx) -> Result<(), EngineError> {
    match component {
        Component::Singleton(n) => process_singleton(*n, f, entry_state, ctx),
        Component::Cycle { head, body } => process_cycle(*head, body, f, entry_state, ctx),
    }
}

fn process_singleton(n: IcfgNodeId, f: FunctionId, entry_state: &AbsState, ctx: &mut EngineCtx) -> Result<(), EngineError> {
    let pre = if n == ctx.icfg.fun_entry(f) {
        entry_state.clone()
    } else {
        match merge_predecessors(n, ctx) {
            Some(s) => s,
            None => return Ok(()),
        }
    };
    let post = run_node_body(n, pre, f, ctx)?;
    ctx.state_at.insert(n, post);
    Ok(())
}

/// Join the (branch-refined) post-states of every in-edge already computed
/// this run. `None` means no predecessor has reached a post-state yet —
/// the node is simply not reachable on this pass.
fn merge_predecessors(n: IcfgNodeId, ctx: &EngineCtx) -> Option<AbsState> {
    let mut acc: Option<AbsState> = None;
    for edge in ctx.icfg.in_edges(n) {
        let Some(pred_state) = ctx.state_at.get(&edge.from) else { continue };
        let Some(refined) = branch::refine_along_edge(pred_state, edge.from, &edge, ctx.pag) else { continue };
        acc = Some(match acc {
            Some(mut a) => {
                a.join_with(&refined);
                a
            }
            None => refined,
        });
    }
    acc
}

/// Interpret every statement attached to `n`, then (for a `Call` node)
/// dispatch the call.
fn run_node_body(n: IcfgNodeId, mut state: AbsState, f: FunctionId, ctx: &mut EngineCtx) -> Result<AbsState, EngineError> {
    let pag = ctx.pag;
    let cfg = ctx.cfg;
    for stmt in pag.statements_of(n) {
        interp::interpret(&stmt, &mut state, pag, cfg, n, &mut ctx.alloc_sizes)?;
    }
    if ctx.icfg.kind(n) == NodeKind::Call {
        state = call::dispatch(n, state, f, ctx)?;
    }
    Ok(state)
}

/// Process `head`, then each component of `body` in order, with `head`'s
/// pre-state pinned to `head_pre` rather than re-derived from its in-edges.
fn run_cycle_round(
    head: IcfgNodeId,
    body: &[Component],
    f: FunctionId,
    head_pre: &AbsState,
    entry_state: &AbsState,
    ctx: &mut EngineCtx,
) -> Result<(), EngineError> {
    let post = run_node_body(head, head_pre.clone(), f, ctx)?;
    ctx.state_at.insert(head, post);
    for component in body {
        process_component(component, f, entry_state, ctx)?;
    }
    Ok(())
}

/// What `head` would receive on its next round: the join of every in-edge
/// reaching it, including the back-edge(s) from `body`'s last node(s) —
/// which is only meaningful *after* `run_cycle_round` has just stored a
/// fresh post-state for them. `entry_state` is folded in too when `head` is
/// the function's own entry, so a self-looping entry node (a `while` whose
/// header coincides with function entry) still sees its seed every round,
/// not just the back-edge contribution.
fn head_incoming(head: IcfgNodeId, f: FunctionId, entry_state: &AbsState, fallback: &AbsState, ctx: &EngineCtx) -> AbsState {
    let merged = merge_predecessors(head, ctx);
    if head == ctx.icfg.fun_entry(f) {
        let mut acc = entry_state.clone();
        if let Some(m) = merged {
            acc.join_with(&m);
        }
        acc
    } else {
        merged.unwrap_or_else(|| fallback.clone())
    }
}

fn process_cycle(head: IcfgNodeId, body: &[Component], f: FunctionId, entry_state: &AbsState, ctx: &mut EngineCtx) -> Result<(), EngineError> {
    let seed = if head == ctx.icfg.fun_entry(f) {
        entry_state.clone()
    } else {
        merge_predecessors(head, ctx).unwrap_or_else(AbsState::empty)
    };

    let mut p = seed;
    let w = ctx.cfg.widen_delay;
    let mut i: u32 = 0;
    loop {
        run_cycle_round(head, body, f, &p, entry_state, ctx)?;
        let p_prime = head_incoming(head, f, entry_state, &p, ctx);
        if i > 0 && i < w && p_prime.leq(&p) {
            break;
        }
        if i >= w {
            let widened = p.widening(&p_prime, ctx.pag, ctx.cfg.max_field_limit);
            let stabilized = widened.leq(&p);
            p = widened;
            if stabilized || i > w + MAX_WIDEN_ROUNDS {
                break;
            }
        } else {
            p = p_prime;
        }
        i += 1;
    }
    ctx.state_at.insert(head, p.clone());

    for _ in 0..NARROW_ROUNDS {
        run_cycle_round(head, body, f, &p, entry_state, ctx)?;
        let p_prime = head_incoming(head, f, entry_state, &p, ctx);
        if p.leq(&p_prime) {
            break;
        }
        p = p.narrowing(&p_prime);
        ctx.state_at.insert(head, p.clone());
    }
    ctx.state_at.insert(head, p);
    Ok(())
}
