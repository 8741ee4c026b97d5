//! The abstract state `S`: the map from
//! variables to values, the map from memory cells to values, and the set of
//! base objects known freed on the current path.
//!
//! `var_to_val`/`addr_to_val` are insertion-ordered (`indexmap::IndexMap`
//! rather than `hashbrown::HashMap`): spec.md's design notes require a
//! `var_to_val` dump to stay stable across runs, which a hash map keyed by
//! a per-process-randomized hasher cannot guarantee. `freed` stays a plain
//! `HashSet` — it is only ever queried by membership, never iterated for
//! output.

use hashbrown::HashSet;
use indexmap::{
    IndexMap,
    IndexSet,
};

use ae_contracts::Pag;
use ae_types::{
    InternalId,
    NodeId,
    VirtualAddress,
    Word,
};

use crate::{
    absval::AbsVal,
    addrset::AddrSet,
    interval::Interval,
};

/// The abstract state threaded through the fixpoint driver.
///
/// Invariants:
/// - (I1) every address stored under a variable's `Addrs` value is valid
///   (carries the `0x7F` tag) — guaranteed structurally here since the only
///   way to construct an `Addrs` value is [`VirtualAddress::to_addr`].
/// - (I2) `addr_to_val` is sparse: a missing key means "never assigned,
///   stored into, or initialized", and reads of it are `⊤` (uninitialized
///   memory is conservatively unknown, never an error).
/// - (I3) `freed` only grows within a single trace through the engine.
/// - (I4) storing through a pointer whose address set contains `NULL_PTR`
///   is a no-op for that one address, but other addresses in the same
///   store are still written.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbsState {
    var_to_val: IndexMap<NodeId, AbsVal>,
    addr_to_val: IndexMap<InternalId, AbsVal>,
    freed: HashSet<NodeId>,
}

impl AbsState {
    /// The empty state, as created at the global ICFG entry.
    pub fn empty() -> Self {
        Self {
            var_to_val: IndexMap::new(),
            addr_to_val: IndexMap::new(),
            freed: HashSet::new(),
        }
    }

    /// The current value of variable `v`. A variable never assigned on
    /// this path reads as bottom — the fixpoint has simply not reached a
    /// defining statement for it yet, which is a different situation from
    /// an uninitialized memory cell (see [`AbsState::load`]).
    pub fn get(&self, v: NodeId) -> AbsVal {
        self.var_to_val.get(&v).cloned().unwrap_or(AbsVal::Bottom)
    }

    /// Bind `v` to `val`.
    pub fn set(&mut self, v: NodeId, val: AbsVal) {
        self.var_to_val.insert(v, val);
    }

    /// Read memory cell `addr`. Per (I2), a cell that has never been
    /// written reads as top rather than bottom: the engine has no
    /// information about it, but that is not the same as knowing it can
    /// hold no value.
    pub fn load(&self, addr: InternalId) -> AbsVal {
        self.addr_to_val.get(&addr).cloned().unwrap_or(AbsVal::top())
    }

    /// Overwrite memory cell `addr` unconditionally (a strong update).
    /// Used directly by external-API models that already iterate one
    /// concrete cell at a time; [`AbsState::store_value`] decides when a
    /// `Store` statement's update must instead be weak.
    pub fn store(&mut self, addr: InternalId, val: AbsVal) {
        self.addr_to_val.insert(addr, val);
    }

    /// Write `val` into every address of `addrs`: a strong update when
    /// `addrs` is a singleton, a weak (join) update otherwise, since a
    /// multi-address store may or may not hit any one of them depending on
    /// which alias is live at runtime. The reserved `NULL_PTR` address is
    /// skipped per (I4).
    pub fn store_many(&mut self, addrs: &AddrSet, val: &AbsVal) {
        let strong = addrs.len() == 1;
        let null = VirtualAddress::to_addr(NodeId::NULL_PTR);
        for addr in addrs.iter() {
            if addr == null {
                continue;
            }
            let internal = addr.from_addr();
            if strong {
                self.store(internal, val.clone());
            } else {
                let joined = self.load(internal).join(val);
                self.store(internal, joined);
            }
        }
    }

    /// Load through pointer `v`: joins the contents of every address in
    /// `v`'s address set.
    pub fn load_value(&self, v: NodeId) -> AbsVal {
        match self.get(v) {
            AbsVal::Bottom => AbsVal::Bottom,
            AbsVal::Interval(_) => AbsVal::top(),
            AbsVal::Addrs(addrs) if addrs.is_empty() => AbsVal::top(),
            AbsVal::Addrs(addrs) => addrs
                .iter()
                .map(|a| self.load(a.from_addr()))
                .fold(AbsVal::Bottom, |acc, v| acc.join(&v)),
        }
    }

    /// Store `val` through pointer `v`.
    pub fn store_value(&mut self, v: NodeId, val: &AbsVal) {
        let addrs = self.get(v).as_addrs();
        self.store_many(&addrs, val);
    }

    /// `true` iff `id` is known freed on this path.
    pub fn is_freed(&self, id: NodeId) -> bool {
        self.freed.contains(&id)
    }

    /// Record `id` as freed.
    pub fn add_freed(&mut self, id: NodeId) {
        self.freed.insert(id);
    }

    /// Materialize a fresh object `obj_id`: clears any stale freed flag and
    /// prior memory contents so an allocation site revisited on a later
    /// iteration (e.g. a loop body, or simply re-running a cycle during
    /// the fixpoint) starts from a blank object rather than carrying over
    /// a previous iteration's facts.
    pub fn init_obj(&mut self, obj_id: NodeId) {
        self.freed.remove(&obj_id);
        self.addr_to_val.shift_remove(&InternalId::from_node(obj_id));
    }

    /// GEP address materialization: for each address of `ptr`
    /// and each index in `offset ∩ [0, max_field_limit]`, derive (or
    /// look up) the gep-object id via the external `Pag`, bind it to its
    /// own singleton address set, and include it in the returned set. An
    /// empty intersection yields the empty set.
    pub fn gep_obj_addrs(
        &mut self,
        ptr: NodeId,
        offset: &Interval,
        pag: &dyn Pag,
        max_field_limit: Word,
    ) -> AddrSet {
        let clipped = offset.meet(&Interval::range(0, max_field_limit));
        let Some((lb, ub)) = clipped.finite_range() else {
            return AddrSet::empty();
        };
        let mut result = AddrSet::empty();
        for addr in self.get(ptr).as_addrs().iter() {
            let base = NodeId::from(addr.from_addr().raw());
            let mut i = lb;
            while i <= ub {
                let gep_id = pag.gep_obj_var(base, i);
                self.var_to_val.insert(gep_id, AbsVal::addr_of(gep_id));
                result.insert(VirtualAddress::to_addr(gep_id));
                i += 1;
            }
        }
        result
    }

    /// `self <= other`, pointwise over every variable, memory cell, and
    /// the freed set.
    pub fn leq(&self, other: &Self) -> bool {
        self.var_to_val
            .keys()
            .chain(other.var_to_val.keys())
            .all(|v| self.get(*v).leq(&other.get(*v)))
            && self
                .addr_to_val
                .keys()
                .chain(other.addr_to_val.keys())
                .all(|a| self.load(*a).leq(&other.load(*a)))
            && self.freed.is_subset(&other.freed)
    }

    /// `true` iff `self` and `other` denote the same state.
    pub fn equals(&self, other: &Self) -> bool {
        self.leq(other) && other.leq(self)
    }

    /// Merge `other` into `self` in place (join).
    pub fn join_with(&mut self, other: &Self) {
        for v in other.var_to_val.keys().copied().collect::<Vec<_>>() {
            let joined = self.get(v).join(&other.get(v));
            self.var_to_val.insert(v, joined);
        }
        for a in other.addr_to_val.keys().copied().collect::<Vec<_>>() {
            let joined = self.load(a).join(&other.load(a));
            self.addr_to_val.insert(a, joined);
        }
        for id in &other.freed {
            self.freed.insert(*id);
        }
    }

    /// Meet `other` into `self` in place.
    pub fn meet_with(&mut self, other: &Self) {
        let keys: Vec<_> = self.var_to_val.keys().copied().collect();
        for v in keys {
            let met = self.get(v).meet(&other.get(v));
            self.var_to_val.insert(v, met);
        }
        let addr_keys: Vec<_> = self.addr_to_val.keys().copied().collect();
        for a in addr_keys {
            let met = self.load(a).meet(&other.load(a));
            self.addr_to_val.insert(a, met);
        }
        self.freed.retain(|id| other.freed.contains(id));
    }

    /// Widen `self` (the previous iterate) against `other` (the new
    /// iterate), returning the result as a fresh state.
    pub fn widening(&self, other: &Self, pag: &dyn Pag, max_field_limit: u32) -> Self {
        let mut result = self.clone();
        for v in other.var_to_val.keys().chain(self.var_to_val.keys()).copied().collect::<IndexSet<_>>() {
            let widened = self.get(v).widen_with(&other.get(v), pag, max_field_limit);
            result.var_to_val.insert(v, widened);
        }
        for a in other
            .addr_to_val
            .keys()
            .chain(self.addr_to_val.keys())
            .copied()
            .collect::<IndexSet<_>>()
        {
            let widened = self.load(a).widen_with(&other.load(a), pag, max_field_limit);
            result.addr_to_val.insert(a, widened);
        }
        result.freed = self.freed.union(&other.freed).copied().collect();
        result
    }

    /// Narrow `self` against `other`, returning the result as a fresh
    /// state. The freed set is never narrowed — it is monotone by
    /// construction (I3) and has no infinite-bound analogue to recover.
    pub fn narrowing(&self, other: &Self) -> Self {
        let mut result = self.clone();
        for (v, val) in &self.var_to_val {
            let narrowed = val.narrow_with(&other.get(*v));
            result.var_to_val.insert(*v, narrowed);
        }
        for (a, val) in &self.addr_to_val {
            let narrowed = val.narrow_with(&other.load(*a));
            result.addr_to_val.insert(*a, narrowed);
        }
        result
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
    use ae_ir::Statement;
    use ae_types::{
        IcfgNodeId,
        TypeId,
    };

    struct NoopPag;

    impl Pag for NoopPag {
        fn node(&self, _id: NodeId) -> Var {
            Var {
                kind: VarKind::Other,
                ty: TypeId::new(0),
                is_pointer: true,
                is_const_data: false,
                has_value: true,
                base_object_id: None,
            }
        }
        fn gep_obj_var(&self, base_obj_id: NodeId, field_idx: Word) -> NodeId {
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
        fn flat_elem_idx(&self, _ty: TypeId, i: Word) -> Word {
            i
        }
        fn struct_field_offset(&self, _ty: TypeId, field_idx: Word) -> Word {
            field_idx * 4
        }
        fn indirect_call_targets(&self, _call_id: IcfgNodeId) -> Vec<ae_types::FunctionId> {
            Vec::new()
        }
        fn statements_of(&self, _node: IcfgNodeId) -> Vec<Statement> {
            Vec::new()
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

    #[test]
    fn uninitialized_var_reads_bottom_uninitialized_memory_reads_top() {
        let s = AbsState::empty();
        assert!(s.get(NodeId::new(1)).is_bottom());
        assert_eq!(s.load(InternalId::new(1)), AbsVal::top());
    }

    #[test]
    fn store_then_load_round_trips() {
        let mut s = AbsState::empty();
        let p = NodeId::new(1);
        let obj = NodeId::new(2);
        s.set(p, AbsVal::addr_of(obj));
        s.store_value(p, &AbsVal::num(42));
        assert_eq!(s.load_value(p), AbsVal::num(42));
    }

    #[test]
    fn null_write_is_a_no_op_but_other_addresses_still_written() {
        let mut s = AbsState::empty();
        let p = NodeId::new(1);
        let other = NodeId::new(2);
        let mut addrs = AddrSet::empty();
        addrs.insert(VirtualAddress::to_addr(NodeId::NULL_PTR));
        addrs.insert(VirtualAddress::to_addr(other));
        s.set(p, AbsVal::Addrs(addrs));
        s.store_value(p, &AbsVal::num(7));
        assert_eq!(s.load(InternalId::from_node(other)), AbsVal::num(7));
    }

    #[test]
    fn freed_set_is_monotone_under_join() {
        let mut a = AbsState::empty();
        let mut b = AbsState::empty();
        let obj = NodeId::new(5);
        a.add_freed(obj);
        a.join_with(&b);
        assert!(a.is_freed(obj));
        b.join_with(&a);
        assert!(b.is_freed(obj));
    }

    #[test]
    fn gep_obj_addrs_clips_to_max_field_limit() {
        let mut s = AbsState::empty();
        let ptr = NodeId::new(1);
        let base = NodeId::new(10);
        s.set(ptr, AbsVal::addr_of(base));
        let pag = NoopPag;
        let addrs = s.gep_obj_addrs(ptr, &Interval::range(0, 1000), &pag, 3);
        // Clipped to [0,3] inclusive => 4 materialized fields.
        assert_eq!(addrs.len(), 4);
    }

    #[test]
    fn leq_and_equals_hold_for_identical_states() {
        let mut s = AbsState::empty();
        s.set(NodeId::new(1), AbsVal::num(3));
        let t = s.clone();
        assert!(s.leq(&t));
        assert!(s.equals(&t));
    }

    #[test]
    fn widening_with_addr_set_expands_missing_fields() {
        let pag = NoopPag;
        let mut prev = AbsState::empty();
        let mut next = AbsState::empty();
        let v = NodeId::new(1);
        prev.set(v, AbsVal::addr_of(NodeId::new(10)));
        next.set(v, AbsVal::Addrs(AddrSet::from_iter_addrs([VirtualAddress::to_addr(NodeId::new(20))])));
        let widened = prev.widening(&next, &pag, 2);
        let addrs = widened.get(v).as_addrs();
        assert!(addrs.contains(VirtualAddress::to_addr(NodeId::new(20))));
    }
}
