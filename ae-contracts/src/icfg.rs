use ae_ir::NodeKind;
use ae_types::{
    FunctionId,
    IcfgNodeId,
    NodeId,
    Word,
};

/// A control-flow edge between two ICFG program points.
///
/// `condition`/`cond_value` are present exactly when the edge is one of
/// several outgoing edges of a `Branch` statement; the branch-feasibility
/// oracle uses them to decide whether this edge can be taken
/// from a given abstract state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IcfgEdge {
    /// Source program point.
    pub from: IcfgNodeId,
    /// Destination program point.
    pub to: IcfgNodeId,
    /// The variable whose value selects this edge, if conditional.
    pub condition: Option<NodeId>,
    /// The value `condition` must take for this edge to be taken.
    pub cond_value: Option<Word>,
}

/// The interprocedural control-flow graph: nodes are program points, edges
/// are intra- or inter-procedural control transitions.
///
/// An external collaborator; the engine treats every method here as
/// read-only.
pub trait Icfg {
    /// Every reachable program point, in an implementation-defined but
    /// stable order.
    fn nodes(&self) -> Vec<IcfgNodeId>;

    /// The kind of a program point.
    fn kind(&self, n: IcfgNodeId) -> NodeKind;

    /// The single global-initializer entry point.
    fn global_entry(&self) -> IcfgNodeId;

    /// The entry program point of a function.
    fn fun_entry(&self, f: FunctionId) -> IcfgNodeId;

    /// The exit program point of a function.
    fn fun_exit(&self, f: FunctionId) -> IcfgNodeId;

    /// The program point immediately after `call_node` returns.
    fn ret_node_of(&self, call_node: IcfgNodeId) -> IcfgNodeId;

    /// Incoming control-flow edges.
    fn in_edges(&self, n: IcfgNodeId) -> Vec<IcfgEdge>;

    /// Outgoing control-flow edges.
    fn out_edges(&self, n: IcfgNodeId) -> Vec<IcfgEdge>;

    /// The `i`-th actual argument of a `Call` node.
    fn argument(&self, call_node: IcfgNodeId, i: usize) -> NodeId;

    /// Number of actual arguments at `call_node`. Consulted by external-API
    /// models for variadic functions (the `scanf` family) before indexing
    /// `argument` defensively.
    fn argument_count(&self, call_node: IcfgNodeId) -> usize;

    /// The statically known callee of a `Call` node, if direct. `None` for
    /// an indirect call (resolved instead via `Pag::indirect_call_targets`
    /// and `CallGraph::callees`).
    fn called_function(&self, call_node: IcfgNodeId) -> Option<FunctionId>;

    /// `true` iff `f` has no analyzable body (a declaration-only symbol,
    /// e.g. a libc function). The call dispatcher applies an
    /// external-API model instead of recursing into `f`'s WTO.
    fn is_external(&self, f: FunctionId) -> bool;

    /// The symbol name of `f`, used to key the external-API model
    /// registry when `is_external(f)` is true.
    fn function_name(&self, f: FunctionId) -> &str;

    /// The variable that receives `call_node`'s return value, if the
    /// result is used by the caller. Consulted by the external-API
    /// registry (no callee exit state exists to bind a `RetPE` from) and
    /// by the recursive-call havoc rule.
    fn return_var(&self, call_node: IcfgNodeId) -> Option<NodeId>;
}
