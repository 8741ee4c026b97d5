//! The two offset-accumulation walks a `Gep` statement's `(idx_var,
//! gep_type)` pairs are reduced through: an element-index form for
//! in-memory materialization ([`crate::state::AbsState::gep_obj_addrs`])
//! and a byte-offset form for the overflow detector.
//!
//! Both walk the pairs innermost-first (i.e. in reverse of their stored,
//! outermost-first order), accumulate a running offset, and clamp the
//! final result to `[0, max_field_limit]` — an empty (bottom) result is
//! promoted to `[0,0]` rather than propagated, since "no feasible offset"
//! still has to materialize *some* access for the detectors to reason
//! about.
//!
//! When [`crate::config::Config::model_arrays`] is `false`, every
//! array/struct-field pair collapses to offset 0 instead of being walked —
//! the caller trades field sensitivity for speed on array-heavy code. The
//! `constant_offset` fast path is unaffected: it is already a single known
//! value, not a per-index computation.

use ae_contracts::Pag;
use ae_ir::{
    GepPair,
    GepPairKind,
};
use ae_types::{
    IcfgNodeId,
    Word,
};

use crate::{
    error::EngineError,
    interval::Interval,
    state::AbsState,
};

/// Which quantity a [`GepPairKind::Indexable`] pair contributes: its
/// element *count* (element-index form) or its element *byte size*
/// (byte-offset form).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkMode {
    ElementIndex,
    ByteOffset,
}

fn walk(
    pairs: &[GepPair],
    constant_offset: Option<Word>,
    state: &AbsState,
    pag: &dyn Pag,
    max_field_limit: Word,
    model_arrays: bool,
    mode: WalkMode,
    node: IcfgNodeId,
) -> Result<Interval, EngineError> {
    let clamp = Interval::range(0, max_field_limit);
    if let Some(c) = constant_offset {
        return Ok(Interval::num(c).meet(&clamp));
    }
    if !model_arrays {
        return Ok(Interval::num(0));
    }
    let mut acc = Interval::num(0);
    for pair in pairs.iter().rev() {
        let idx_val = state.get(pair.idx_var).as_interval();
        let contribution = match pair.kind {
            GepPairKind::Indexable { elem_byte_size } => match mode {
                WalkMode::ByteOffset => idx_val.mul(&Interval::num(elem_byte_size)),
                WalkMode::ElementIndex => idx_val,
            },
            GepPairKind::StructField { struct_type } => {
                let idx = idx_val.as_numeral().ok_or_else(|| EngineError::ContractViolation {
                    node,
                    detail: "struct-field gep index is not a compile-time constant".into(),
                })?;
                let off = match mode {
                    WalkMode::ByteOffset => pag.struct_field_offset(struct_type, idx),
                    WalkMode::ElementIndex => pag.flat_elem_idx(struct_type, idx),
                };
                Interval::num(off)
            }
        };
        acc = acc.add(&contribution);
    }
    let clamped = acc.meet(&clamp);
    Ok(if clamped.is_bottom() { Interval::num(0) } else { clamped })
}

/// The element-index form: used to pick which gep-object fields to
/// materialize in memory.
#[allow(clippy::too_many_arguments)]
pub fn element_index(
    pairs: &[GepPair],
    constant_offset: Option<Word>,
    state: &AbsState,
    pag: &dyn Pag,
    max_field_limit: Word,
    model_arrays: bool,
    node: IcfgNodeId,
) -> Result<Interval, EngineError> {
    walk(pairs, constant_offset, state, pag, max_field_limit, model_arrays, WalkMode::ElementIndex, node)
}

/// The byte-offset form: used by the buffer-overflow detector to compare
/// an access against an allocation size.
#[allow(clippy::too_many_arguments)]
pub fn byte_offset(
    pairs: &[GepPair],
    constant_offset: Option<Word>,
    state: &AbsState,
    pag: &dyn Pag,
    max_field_limit: Word,
    model_arrays: bool,
    node: IcfgNodeId,
) -> Result<Interval, EngineError> {
    walk(pairs, constant_offset, state, pag, max_field_limit, model_arrays, WalkMode::ByteOffset, node)
}
