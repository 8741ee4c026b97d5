//! Bug reports: the engine's primary output.

use ae_types::{
    IcfgNodeId,
    NodeId,
    Word,
};

/// Whether a defect is certain on every path through the observed state,
/// or only on some subset of the pointer/address values the state tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    /// Every address/value the offending operand could take triggers the
    /// defect.
    Full,
    /// Only some of the addresses/values the offending operand could take
    /// trigger the defect; others are safe.
    Partial,
}

/// One entry of a [`Bug`]'s accumulated event stack: a call site or branch
/// decision visited on the way from the bug's root cause to its observation
/// point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Event {
    /// A call site entered en route to the bug.
    Call(IcfgNodeId),
    /// A branch taken en route to the bug, and the value that selected it.
    Branch(IcfgNodeId, Word),
}

/// The kind of memory-safety defect a detector observed, along with the
/// operand-specific facts needed to render a useful diagnostic.
#[derive(Debug, Clone, PartialEq, derive_more::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BugKind {
    /// A `Gep`-derived access whose byte-offset range may reach or exceed
    /// the base object's allocation size.
    #[display(fmt = "buffer overflow: access [{access_lb},{access_ub}] vs allocation [{alloc_lb},{alloc_ub}]")]
    BufferOverflow {
        /// Lower bound of the access's byte-offset interval.
        access_lb: Word,
        /// Upper bound of the access's byte-offset interval.
        access_ub: Word,
        /// Lower bound of the base object's allocation-size interval.
        alloc_lb: Word,
        /// Upper bound of the base object's allocation-size interval.
        alloc_ub: Word,
    },
    /// A `Load`/`Store` through a pointer whose address set contains
    /// `NULL_PTR`.
    NullPtrDeref,
    /// A `free`-family call on a pointer some/all of whose addresses are
    /// already in `S.freed`.
    DoubleFree,
    /// A `Load`/`Store` through a pointer some/all of whose addresses are
    /// in `S.freed`.
    UseAfterFree,
}

/// One reported defect.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bug {
    /// What kind of defect this is, with kind-specific operand facts.
    pub kind: BugKind,
    /// Full (every reachable value triggers it) or partial.
    pub severity: Severity,
    /// The program point where the detector observed the defect.
    pub node: IcfgNodeId,
    /// The variable whose value the defect concerns (the pointer being
    /// dereferenced/freed, or the `Gep` destination for overflow).
    pub var: NodeId,
    /// The call sites and branch decisions between the bug's root cause
    /// and its observation point, outermost first.
    pub event_stack: Vec<Event>,
}

impl Bug {
    /// The `(node, var, BugKind variant tag)` key detectors dedupe by —
    /// two reports at the same site naming the same kind of defect on the
    /// same variable are the same report.
    pub fn dedup_key(&self) -> (IcfgNodeId, NodeId, &'static str) {
        let tag = match self.kind {
            BugKind::BufferOverflow { .. } => "buffer_overflow",
            BugKind::NullPtrDeref => "null_ptr_deref",
            BugKind::DoubleFree => "double_free",
            BugKind::UseAfterFree => "use_after_free",
        };
        (self.node, self.var, tag)
    }
}
