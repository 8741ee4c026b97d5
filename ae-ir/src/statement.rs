use ae_types::{
    IcfgNodeId,
    NodeId,
    Word,
};

use crate::{
    gep::GepPair,
    opcode::{
        BinOp,
        CastKind,
        Predicate,
        UnOp,
    },
};

/// One outgoing edge of a `Branch` statement: the successor program point
/// and the condition value that makes that edge taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BranchTarget {
    /// The program point reached when this edge is taken.
    pub successor: IcfgNodeId,
    /// The value of `cond` that selects this edge.
    pub cond_value: Word,
}

/// A single PAG/SVFIR statement.
///
/// Every node along an ICFG carries zero or more of these, attached in
/// source order; the statement interpreter runs one transfer
/// function per kind.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Statement {
    /// Materializes `rhs` as an object and binds its address (or constant
    /// value) to `lhs`.
    Addr {
        /// The pointer variable receiving the materialized value.
        lhs: NodeId,
        /// The object being addressed.
        rhs: NodeId,
        /// Size operands of a stack/heap allocation, if any; multiplied
        /// together by the allocation-size tracker. Absent
        /// for allocations with a statically known, unit size.
        array_sizes: Option<Vec<NodeId>>,
    },
    /// A pure value conversion from `rhs` to `lhs`.
    Copy {
        /// Destination variable.
        lhs: NodeId,
        /// Source variable.
        rhs: NodeId,
        /// The conversion to apply.
        kind: CastKind,
    },
    /// Pointer arithmetic: `lhs` is derived from `rhs` by the offsets named
    /// in `pairs`.
    Gep {
        /// Destination pointer variable.
        lhs: NodeId,
        /// Base pointer variable.
        rhs: NodeId,
        /// The `(idx_var, gep_type)` pairs, outermost first; the
        /// interpreter walks them in reverse
        pairs: Vec<GepPair>,
        /// Fast path when the whole offset is already a compile-time
        /// constant.
        constant_offset: Option<Word>,
    },
    /// Reads through a pointer.
    Load {
        /// Destination variable.
        lhs: NodeId,
        /// Pointer variable being read through.
        rhs: NodeId,
    },
    /// Writes through a pointer. Note the unusual operand order inherited
    /// from the consumed IR: `lhs` is the pointer, `rhs` is the value.
    Store {
        /// Pointer variable being written through.
        lhs: NodeId,
        /// Value variable being stored.
        rhs: NodeId,
    },
    /// Joins every incoming value unconditionally.
    Phi {
        /// Destination variable.
        res: NodeId,
        /// One operand per incoming control-flow edge.
        op_vars: Vec<NodeId>,
    },
    /// Conditional value selection.
    Select {
        /// Destination variable.
        res: NodeId,
        /// The condition variable.
        cond: NodeId,
        /// Value taken when `cond` is true.
        t: NodeId,
        /// Value taken when `cond` is false.
        f: NodeId,
    },
    /// A comparison producing a three-valued boolean.
    Cmp {
        /// Destination variable.
        res: NodeId,
        /// Left operand.
        op0: NodeId,
        /// Right operand.
        op1: NodeId,
        /// The comparison predicate.
        predicate: Predicate,
    },
    /// A binary arithmetic or bitwise operation.
    BinaryOp {
        /// Destination variable.
        res: NodeId,
        /// Left operand.
        op0: NodeId,
        /// Right operand.
        op1: NodeId,
        /// The operation to apply.
        opcode: BinOp,
    },
    /// A unary arithmetic or bitwise operation.
    UnaryOp {
        /// Destination variable.
        res: NodeId,
        /// The operand.
        op: NodeId,
        /// The operation to apply.
        opcode: UnOp,
    },
    /// A conditional control transfer; carries no value-level state update,
    /// consumed entirely by the branch-feasibility oracle.
    Branch {
        /// The variable whose value selects the taken edge.
        cond: NodeId,
        /// The possible successors and the condition values that select
        /// them.
        successors: Vec<BranchTarget>,
    },
    /// Binds a callee's formal parameter to the matching actual argument
    /// across a call edge.
    CallPE {
        /// The callee's formal parameter.
        lhs: NodeId,
        /// The caller's actual argument.
        rhs: NodeId,
    },
    /// Binds the caller's actual-return variable to the callee's formal
    /// return value across a return edge.
    RetPE {
        /// The caller's actual-return variable.
        lhs: NodeId,
        /// The callee's formal return variable.
        rhs: NodeId,
    },
}

impl Statement {
    /// The variable this statement assigns to, if any. `Branch` assigns
    /// nothing; every other kind assigns exactly one variable.
    pub const fn defined_var(&self) -> Option<NodeId> {
        match self {
            Self::Addr { lhs, .. }
            | Self::Copy { lhs, .. }
            | Self::Gep { lhs, .. }
            | Self::Load { lhs, .. }
            | Self::CallPE { lhs, .. }
            | Self::RetPE { lhs, .. } => Some(*lhs),
            Self::Phi { res, .. }
            | Self::Select { res, .. }
            | Self::Cmp { res, .. }
            | Self::BinaryOp { res, .. }
            | Self::UnaryOp { res, .. } => Some(*res),
            Self::Store { .. } | Self::Branch { .. } => None,
        }
    }
}
