//! Toy ICFG/PAG/CallGraph/WTO fixtures for the end-to-end scenario tests.
//!
//! Every graph here is built by hand with a small set of node/edge helpers
//! rather than modeling a real front-end; the point is to exercise the
//! engine's contract surface; not to look like a real SVFIR.

#![allow(dead_code)]

use std::cell::RefCell;

use hashbrown::HashMap;

use ae_contracts::{
    BaseObj,
    CallGraph,
    Component,
    Icfg,
    IcfgEdge,
    Pag,
    TypeInfo,
    Var,
    VarKind,
    Wto,
};
use ae_ir::{
    NodeKind,
    Statement,
};
use ae_types::{
    FunctionId,
    IcfgNodeId,
    NodeId,
    SccId,
    TypeId,
    Word,
};

/// A hand-assembled whole-program graph implementing every `ae-contracts`
/// trait at once. Fields are public; scenario tests populate them directly.
#[derive(Default)]
pub struct Toy {
    pub kind: HashMap<IcfgNodeId, NodeKind>,
    pub stmts: HashMap<IcfgNodeId, Vec<Statement>>,
    pub out: HashMap<IcfgNodeId, Vec<IcfgEdge>>,
    pub inn: HashMap<IcfgNodeId, Vec<IcfgEdge>>,
    pub global_entry: IcfgNodeId,
    pub fun_entry: HashMap<FunctionId, IcfgNodeId>,
    pub fun_exit: HashMap<FunctionId, IcfgNodeId>,
    pub ret_of: HashMap<IcfgNodeId, IcfgNodeId>,
    pub args: HashMap<IcfgNodeId, Vec<NodeId>>,
    pub called: HashMap<IcfgNodeId, FunctionId>,
    pub external_name: HashMap<FunctionId, String>,
    pub return_var: HashMap<IcfgNodeId, NodeId>,
    pub functions: Vec<FunctionId>,
    pub scc: HashMap<FunctionId, SccId>,
    pub wto: HashMap<FunctionId, Vec<Component>>,
    pub base_obj: HashMap<NodeId, BaseObj>,
    pub var_kind: HashMap<NodeId, VarKind>,
    next_gep: RefCell<u32>,
    gep_cache: RefCell<HashMap<(NodeId, Word), NodeId>>,
}

impl Toy {
    pub fn new() -> Self {
        Self { next_gep: RefCell::new(1_000_000), ..Default::default() }
    }

    pub fn add_node(&mut self, id: u32, kind: NodeKind) -> IcfgNodeId {
        let n = IcfgNodeId::new(id);
        self.kind.insert(n, kind);
        n
    }

    /// An unconditional edge.
    pub fn edge(&mut self, from: IcfgNodeId, to: IcfgNodeId) {
        let e = IcfgEdge { from, to, condition: None, cond_value: None };
        self.out.entry(from).or_default().push(e);
        self.inn.entry(to).or_default().push(e);
    }

    /// A conditional edge, taken when `cond` equals `value`.
    pub fn cond_edge(&mut self, from: IcfgNodeId, to: IcfgNodeId, cond: NodeId, value: Word) {
        let e = IcfgEdge { from, to, condition: Some(cond), cond_value: Some(value) };
        self.out.entry(from).or_default().push(e);
        self.inn.entry(to).or_default().push(e);
    }

    pub fn set_stmts(&mut self, n: IcfgNodeId, stmts: Vec<Statement>) {
        self.stmts.insert(n, stmts);
    }

    /// Register a direct, internal (non-external) call from `call` to
    /// `callee`, with the matching `Ret` node and actual arguments.
    pub fn direct_call(&mut self, call: IcfgNodeId, ret: IcfgNodeId, callee: FunctionId, args: Vec<NodeId>) {
        self.called.insert(call, callee);
        self.ret_of.insert(call, ret);
        self.args.insert(call, args);
    }

    /// Register a call to an external (bodyless) function named `name`.
    pub fn external_call(&mut self, call: IcfgNodeId, ret: IcfgNodeId, fn_id: FunctionId, name: &str, args: Vec<NodeId>) {
        self.external_name.insert(fn_id, name.to_string());
        self.called.insert(call, fn_id);
        self.ret_of.insert(call, ret);
        self.args.insert(call, args);
    }

    pub fn set_base_obj(&mut self, obj: NodeId, base: BaseObj) {
        self.base_obj.insert(obj, base);
    }
}

impl Pag for Toy {
    fn node(&self, id: NodeId) -> Var {
        Var {
            kind: self.var_kind.get(&id).copied().unwrap_or(VarKind::Other),
            ty: TypeId::new(0),
            is_pointer: true,
            is_const_data: false,
            has_value: true,
            base_object_id: None,
        }
    }

    fn gep_obj_var(&self, base_obj_id: NodeId, field_idx: Word) -> NodeId {
        let key = (base_obj_id, field_idx);
        if let Some(existing) = self.gep_cache.borrow().get(&key) {
            return *existing;
        }
        let mut next = self.next_gep.borrow_mut();
        let id = NodeId::new(*next);
        *next += 1;
        self.gep_cache.borrow_mut().insert(key, id);
        id
    }

    fn type_info(&self, _ty: TypeId) -> TypeInfo {
        TypeInfo { byte_size: 4, is_array: false, elem_type: None, is_signed_int: true, bit_width: 32 }
    }

    fn flat_elem_idx(&self, _ty: TypeId, i: Word) -> Word {
        i
    }

    fn struct_field_offset(&self, _ty: TypeId, field_idx: Word) -> Word {
        field_idx * 4
    }

    fn indirect_call_targets(&self, _call_id: IcfgNodeId) -> Vec<FunctionId> {
        Vec::new()
    }

    fn statements_of(&self, node: IcfgNodeId) -> Vec<Statement> {
        self.stmts.get(&node).cloned().unwrap_or_default()
    }

    fn base_object(&self, id: NodeId) -> BaseObj {
        self.base_obj.get(&id).copied().unwrap_or(BaseObj {
            is_constant_byte_size: true,
            byte_size: 4,
            is_global: false,
            is_heap: false,
            is_stack: true,
        })
    }
}

impl Icfg for Toy {
    fn nodes(&self) -> Vec<IcfgNodeId> {
        self.kind.keys().copied().collect()
    }

    fn kind(&self, n: IcfgNodeId) -> NodeKind {
        self.kind[&n]
    }

    fn global_entry(&self) -> IcfgNodeId {
        self.global_entry
    }

    fn fun_entry(&self, f: FunctionId) -> IcfgNodeId {
        self.fun_entry[&f]
    }

    fn fun_exit(&self, f: FunctionId) -> IcfgNodeId {
        self.fun_exit[&f]
    }

    fn ret_node_of(&self, call_node: IcfgNodeId) -> IcfgNodeId {
        self.ret_of[&call_node]
    }

    fn in_edges(&self, n: IcfgNodeId) -> Vec<IcfgEdge> {
        self.inn.get(&n).cloned().unwrap_or_default()
    }

    fn out_edges(&self, n: IcfgNodeId) -> Vec<IcfgEdge> {
        self.out.get(&n).cloned().unwrap_or_default()
    }

    fn argument(&self, call_node: IcfgNodeId, i: usize) -> NodeId {
        self.args[&call_node][i]
    }

    fn argument_count(&self, call_node: IcfgNodeId) -> usize {
        self.args.get(&call_node).map_or(0, Vec::len)
    }

    fn called_function(&self, call_node: IcfgNodeId) -> Option<FunctionId> {
        self.called.get(&call_node).copied()
    }

    fn is_external(&self, f: FunctionId) -> bool {
        self.external_name.contains_key(&f)
    }

    fn function_name(&self, f: FunctionId) -> &str {
        self.external_name.get(&f).map(String::as_str).unwrap_or("")
    }

    fn return_var(&self, call_node: IcfgNodeId) -> Option<NodeId> {
        self.return_var.get(&call_node).copied()
    }
}

impl CallGraph for Toy {
    fn scc_of(&self, f: FunctionId) -> SccId {
        self.scc.get(&f).copied().unwrap_or(SccId::new(f.raw()))
    }

    fn callees(&self, call_node: IcfgNodeId) -> Vec<FunctionId> {
        self.called.get(&call_node).copied().into_iter().collect()
    }

    fn functions(&self) -> Vec<FunctionId> {
        self.functions.clone()
    }
}

impl Wto for Toy {
    fn for_function(&self, f: FunctionId) -> Vec<Component> {
        self.wto.get(&f).cloned().unwrap_or_default()
    }
}
