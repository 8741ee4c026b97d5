//! The external-API model registry (section 4.9): name-keyed transfer
//! functions applied at a call site whose callee has no analyzable body,
//! in place of recursing into a WTO.
//!
//! Coverage here is representative of the consumed IR's `extapi`-style
//! model table, not exhaustive: memcpy/memset/strcpy/strcat-family,
//! malloc/calloc/realloc, the free family, a handful of read-only string
//! queries (strlen/memcmp/strcmp/strncmp/atoi/atol/strtol), the `scanf`
//! family, and the `svf_assert`/`svf_assert_eq` test hooks.

use ae_types::{
    IcfgNodeId,
    NodeId,
};

use crate::{
    absval::AbsVal,
    ctx::EngineCtx,
    error::EngineError,
    interval::Interval,
    state::AbsState,
};

/// The argument index of a `free`-family call's freed pointer, if `name`
/// names one. Shared with [`crate::detectors::DoubleFreeDetector`], which
/// needs to ask the same question about the pre-call state.
pub fn free_arg_index(name: &str) -> Option<usize> {
    matches!(name, "free" | "cfree" | "delete" | "operator delete" | "operator delete[]").then_some(0)
}

/// Apply the model for `name` (or a conservative unmodeled-external
/// fallback when `name` is `None` or unrecognized) at `call_node`, mutating
/// `state` in place.
pub fn apply(call_node: IcfgNodeId, name: Option<&str>, state: &mut AbsState, ctx: &mut EngineCtx) -> Result<(), EngineError> {
    let Some(name) = name else {
        havoc_return(call_node, state, ctx);
        return Ok(());
    };
    match name {
        "memcpy" | "memmove" | "strcpy" | "strncpy" => model_copy(call_node, state, ctx, 0, 1),
        "strcat" | "strncat" => model_append(call_node, state, ctx, 0, 1),
        "memset" => model_memset(call_node, state, ctx),
        "malloc" => model_malloc(call_node, state, ctx),
        "calloc" => model_calloc(call_node, state, ctx),
        "realloc" => model_realloc(call_node, state, ctx),
        "fgets" => model_copy_unknown(call_node, state, ctx, 0),
        "strlen" => bind_return(call_node, state, ctx, AbsVal::Interval(Interval::at_least(0))),
        "memcmp" | "strcmp" | "strncmp" | "atoi" | "atol" | "strtol" | "getenv" => {
            bind_return(call_node, state, ctx, AbsVal::top())
        }
        _ if free_arg_index(name).is_some() => {
            model_free(call_node, state, ctx, free_arg_index(name).expect("checked above"))
        }
        "scanf" | "fscanf" | "sscanf" => model_scanf(call_node, state, ctx, name),
        "svf_assert" => return check_assert(call_node, state, ctx, false),
        "svf_assert_eq" => return check_assert(call_node, state, ctx, true),
        _ => havoc_return(call_node, state, ctx),
    }
    Ok(())
}

fn bind_return(call: IcfgNodeId, state: &mut AbsState, ctx: &EngineCtx, val: AbsVal) {
    if let Some(ret) = ctx.icfg.return_var(call) {
        state.set(ret, val);
    }
}

fn havoc_return(call: IcfgNodeId, state: &mut AbsState, ctx: &EngineCtx) {
    bind_return(call, state, ctx, AbsVal::top());
}

/// `dst = src` (memcpy/strcpy/strncpy, modulo the length bound this
/// abstraction doesn't track byte-for-byte): whatever `src` could hold,
/// `dst` now holds too. Returns `dst`.
fn model_copy(call: IcfgNodeId, state: &mut AbsState, ctx: &EngineCtx, dst_idx: usize, src_idx: usize) {
    let dst = ctx.icfg.argument(call, dst_idx);
    let src = ctx.icfg.argument(call, src_idx);
    let val = state.load_value(src);
    state.store_value(dst, &val);
    bind_return(call, state, ctx, state.get(dst));
}

/// `dst += src` (strcat/strncat): a weak update, since the existing
/// contents of `dst` are still live up to its NUL terminator.
fn model_append(call: IcfgNodeId, state: &mut AbsState, ctx: &EngineCtx, dst_idx: usize, src_idx: usize) {
    let dst = ctx.icfg.argument(call, dst_idx);
    let src = ctx.icfg.argument(call, src_idx);
    let joined = state.load_value(dst).join(&state.load_value(src));
    state.store_value(dst, &joined);
    bind_return(call, state, ctx, state.get(dst));
}

/// `memset(dst, c, n)`: every cell reachable from `dst` now holds `c`'s
/// interval (a strong update at this abstraction's granularity, since the
/// engine doesn't model sub-object byte ranges).
fn model_memset(call: IcfgNodeId, state: &mut AbsState, ctx: &EngineCtx) {
    let dst = ctx.icfg.argument(call, 0);
    let c = ctx.icfg.argument(call, 1);
    let val = AbsVal::Interval(state.get(c).as_interval());
    state.store_value(dst, &val);
    bind_return(call, state, ctx, state.get(dst));
}

/// `malloc`: the consumed IR is expected to attach an ordinary `Addr`
/// statement to the call node for the freshly materialized heap object, so
/// by the time this model runs `return_var` (if any) is typically already
/// bound — this only covers the degenerate case where it wasn't.
fn model_malloc(call: IcfgNodeId, state: &mut AbsState, ctx: &EngineCtx) {
    if let Some(ret) = ctx.icfg.return_var(call) {
        if state.get(ret).is_bottom() {
            havoc_return(call, state, ctx);
        }
    }
}

/// `calloc`: same materialization as `malloc`, plus the buffer starts
/// zeroed rather than unknown.
fn model_calloc(call: IcfgNodeId, state: &mut AbsState, ctx: &EngineCtx) {
    model_malloc(call, state, ctx);
    if let Some(ret) = ctx.icfg.return_var(call) {
        if !state.get(ret).is_bottom() {
            state.store_value(ret, &AbsVal::num(0));
        }
    }
}

/// `realloc(ptr, size)`: the old object is freed, a fresh one is
/// materialized (same assumption as `malloc`), and its contents start as
/// whatever the old object held.
fn model_realloc(call: IcfgNodeId, state: &mut AbsState, ctx: &EngineCtx) {
    let old = ctx.icfg.argument(call, 0);
    let old_val = state.load_value(old);
    for addr in state.get(old).as_addrs().iter() {
        state.add_freed(NodeId::from(addr.from_addr().raw()));
    }
    model_malloc(call, state, ctx);
    if let Some(ret) = ctx.icfg.return_var(call) {
        if !state.get(ret).is_bottom() {
            state.store_value(ret, &old_val);
        }
    }
}

fn model_free(call: IcfgNodeId, state: &mut AbsState, ctx: &EngineCtx, arg_idx: usize) {
    let ptr = ctx.icfg.argument(call, arg_idx);
    for addr in state.get(ptr).as_addrs().iter() {
        state.add_freed(NodeId::from(addr.from_addr().raw()));
    }
}

/// `fgets(buf, n, stream)`: the buffer now holds unknown string contents.
fn model_copy_unknown(call: IcfgNodeId, state: &mut AbsState, ctx: &EngineCtx, dst_idx: usize) {
    let dst = ctx.icfg.argument(call, dst_idx);
    state.store_value(dst, &AbsVal::top());
    bind_return(call, state, ctx, state.get(dst));
}

/// `scanf`/`fscanf`/`sscanf`: every pointer-out argument after the format
/// string (and, for `fscanf`/`sscanf`, after the stream/source string) now
/// holds an unknown value.
fn model_scanf(call: IcfgNodeId, state: &mut AbsState, ctx: &EngineCtx, name: &str) {
    let start = if name == "scanf" { 1 } else { 2 };
    for i in start..ctx.icfg.argument_count(call) {
        let ptr = ctx.icfg.argument(call, i);
        state.store_value(ptr, &AbsVal::top());
    }
    bind_return(call, state, ctx, AbsVal::top());
}

fn check_assert(call: IcfgNodeId, state: &AbsState, ctx: &EngineCtx, eq: bool) -> Result<(), EngineError> {
    if eq {
        let a = state.get(ctx.icfg.argument(call, 0)).as_interval();
        let b = state.get(ctx.icfg.argument(call, 1)).as_interval();
        match (a.as_numeral(), b.as_numeral()) {
            (Some(x), Some(y)) if x == y => Ok(()),
            _ => Err(EngineError::TestHookFailure { node: call, detail: format!("svf_assert_eq failed: {a:?} vs {b:?}") }),
        }
    } else {
        let v = state.get(ctx.icfg.argument(call, 0)).as_interval();
        match v.as_numeral() {
            Some(1) => Ok(()),
            _ => Err(EngineError::TestHookFailure { node: call, detail: format!("svf_assert failed: {v:?}") }),
        }
    }
}
