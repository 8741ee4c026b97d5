use ae_types::{
    FunctionId,
    IcfgNodeId,
    SccId,
};

/// The call graph: which functions a call site may invoke, and how
/// functions group into recursion-forming strongly connected components.
///
/// An external collaborator; construction (including indirect-call
/// resolution via `Pag::indirect_call_targets`) happens upstream.
pub trait CallGraph {
    /// The strongly connected component `f` belongs to. A function with no
    /// recursive cycle is alone in its own singleton SCC.
    fn scc_of(&self, f: FunctionId) -> SccId;

    /// The functions `call_node` may invoke. A direct call site resolves to
    /// exactly one; an indirect call site may resolve to several.
    fn callees(&self, call_node: IcfgNodeId) -> Vec<FunctionId>;

    /// Every function in the whole-program call graph, in an
    /// implementation-defined but stable order. The top-level driver uses
    /// this as its root set: each one gets its own fixpoint run, seeded
    /// from the global-initializer post-state.
    fn functions(&self) -> Vec<FunctionId>;
}
