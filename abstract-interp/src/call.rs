//! The call-site dispatcher (section 4.8): external / recursive / direct /
//! indirect call handling.

use ae_types::FunctionId;
use ae_types::IcfgNodeId;

use crate::{
    absval::AbsVal,
    config::HandleRecur,
    ctx::EngineCtx,
    driver,
    error::EngineError,
    external,
    report::Event,
    state::AbsState,
};

/// Dispatch the call at `call_node`, within function `caller`, given the
/// state right before the call. Returns the state right after the call —
/// the call node's own post-state, which the fixpoint driver then feeds
/// forward to the matching `Ret` node like any other successor.
pub fn dispatch(call_node: IcfgNodeId, state: AbsState, caller: FunctionId, ctx: &mut EngineCtx) -> Result<AbsState, EngineError> {
    match ctx.icfg.called_function(call_node) {
        Some(callee) => dispatch_one(call_node, state, caller, callee, ctx),
        None => dispatch_indirect(call_node, state, caller, ctx),
    }
}

fn dispatch_indirect(call_node: IcfgNodeId, state: AbsState, caller: FunctionId, ctx: &mut EngineCtx) -> Result<AbsState, EngineError> {
    let targets = ctx.pag.indirect_call_targets(call_node);
    if targets.is_empty() {
        return apply_external(call_node, state, ctx, None);
    }
    let mut acc: Option<AbsState> = None;
    for callee in targets {
        let s = dispatch_one(call_node, state.clone(), caller, callee, ctx)?;
        acc = Some(match acc {
            Some(mut a) => {
                a.join_with(&s);
                a
            }
            None => s,
        });
    }
    Ok(acc.unwrap_or(state))
}

fn dispatch_one(call_node: IcfgNodeId, state: AbsState, caller: FunctionId, callee: FunctionId, ctx: &mut EngineCtx) -> Result<AbsState, EngineError> {
    if ctx.icfg.is_external(callee) {
        let name = ctx.icfg.function_name(callee).to_string();
        return apply_external(call_node, state, ctx, Some(name));
    }
    if ctx.call_graph.scc_of(callee) == ctx.call_graph.scc_of(caller) {
        return Ok(havoc_recursive(call_node, state, ctx));
    }
    ctx.call_stack.push(Event::Call(call_node));
    let result = driver::run_function(callee, state, ctx);
    ctx.call_stack.pop();
    result
}

/// Record the pre-mutation state (for the detectors' later finalization
/// pass) then apply the name-keyed external-API model.
fn apply_external(call_node: IcfgNodeId, mut state: AbsState, ctx: &mut EngineCtx, name: Option<String>) -> Result<AbsState, EngineError> {
    ctx.external_calls.insert(call_node, (state.clone(), name.clone()));
    external::apply(call_node, name.as_deref(), &mut state, ctx)?;
    Ok(state)
}

/// A call into the current function's own SCC: havoc what the callee could
/// plausibly have touched (its return value and whatever its arguments'
/// pointees reach) rather than recursing, then apply
/// [`HandleRecur`]'s chosen refinement round.
fn havoc_recursive(call_node: IcfgNodeId, state: AbsState, ctx: &EngineCtx) -> AbsState {
    let mut havoced = state.clone();
    if let Some(ret) = ctx.icfg.return_var(call_node) {
        havoced.set(ret, AbsVal::top());
    }
    for i in 0..ctx.icfg.argument_count(call_node) {
        let arg = ctx.icfg.argument(call_node, i);
        let addrs = havoced.get(arg).as_addrs();
        if !addrs.is_empty() {
            havoced.store_many(&addrs, &AbsVal::top());
        }
    }
    match ctx.cfg.handle_recur {
        HandleRecur::Top => havoced,
        HandleRecur::WidenOnly => state.widening(&havoced, ctx.pag, ctx.cfg.max_field_limit),
        HandleRecur::WidenNarrow => {
            let widened = state.widening(&havoced, ctx.pag, ctx.cfg.max_field_limit);
            widened.narrowing(&havoced)
        }
    }
}
