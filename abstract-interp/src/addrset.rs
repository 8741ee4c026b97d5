//! Finite sets of tagged virtual addresses: the pointer half of
//! the reduced product. Union is join, intersection is meet; the empty set
//! is bottom.

use hashbrown::HashSet;

use ae_types::VirtualAddress;

/// A finite, duplicate-free set of [`VirtualAddress`]es.
///
/// Bounded only by the number of distinct objects and gep-object indices
/// the analysis has materialized — there is no intrinsic cap here; the cap
/// lives one level up, in [`crate::absval::AbsVal`]'s widening rule, via
/// `MaxFieldLimit`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AddrSet(HashSet<VirtualAddress>);

impl AddrSet {
    /// The empty set (bottom of this lattice).
    pub fn empty() -> Self {
        Self(HashSet::new())
    }

    /// A set containing exactly one address.
    pub fn singleton(addr: VirtualAddress) -> Self {
        let mut set = HashSet::with_capacity(1);
        set.insert(addr);
        Self(set)
    }

    /// Build from any iterator of addresses.
    pub fn from_iter_addrs(addrs: impl IntoIterator<Item = VirtualAddress>) -> Self {
        Self(addrs.into_iter().collect())
    }

    /// `true` iff this set has no addresses (bottom).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct addresses.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` iff `addr` is a member.
    pub fn contains(&self, addr: VirtualAddress) -> bool {
        self.0.contains(&addr)
    }

    /// Add `addr` to the set.
    pub fn insert(&mut self, addr: VirtualAddress) {
        self.0.insert(addr);
    }

    /// Iterate the set's members.
    pub fn iter(&self) -> impl Iterator<Item = VirtualAddress> + '_ {
        self.0.iter().copied()
    }

    /// Join: set union.
    pub fn union(&self, other: &Self) -> Self {
        Self(self.0.union(&other.0).copied().collect())
    }

    /// Meet: set intersection.
    pub fn intersect(&self, other: &Self) -> Self {
        Self(self.0.intersection(&other.0).copied().collect())
    }

    /// `true` iff the two sets share at least one address.
    pub fn has_intersect(&self, other: &Self) -> bool {
        self.0.iter().any(|a| other.0.contains(a))
    }

    /// `self <= other` in the subset order.
    pub fn leq(&self, other: &Self) -> bool {
        self.0.is_subset(&other.0)
    }

    /// Addresses present in `other` but absent from `self`; used by
    /// [`crate::absval::AbsVal`]'s gep-index widening expansion to decide
    /// what needs to be materialized.
    pub fn missing_from(&self, other: &Self) -> impl Iterator<Item = VirtualAddress> + '_ {
        other.0.iter().copied().filter(move |a| !self.0.contains(a))
    }
}

impl FromIterator<VirtualAddress> for AddrSet {
    fn from_iter<T: IntoIterator<Item = VirtualAddress>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ae_types::NodeId;

    fn addr(n: u32) -> VirtualAddress {
        VirtualAddress::to_addr(NodeId::new(n))
    }

    #[test]
    fn union_and_intersect_agree_with_membership() {
        let a = AddrSet::from_iter_addrs([addr(1), addr(2)]);
        let b = AddrSet::from_iter_addrs([addr(2), addr(3)]);
        let u = a.union(&b);
        assert!(u.contains(addr(1)) && u.contains(addr(2)) && u.contains(addr(3)));
        let i = a.intersect(&b);
        assert!(i.contains(addr(2)) && !i.contains(addr(1)));
    }

    #[test]
    fn empty_set_is_union_identity() {
        let a = AddrSet::from_iter_addrs([addr(1)]);
        assert_eq!(a.union(&AddrSet::empty()), a);
    }

    #[test]
    fn has_intersect_matches_nonempty_intersection() {
        let a = AddrSet::from_iter_addrs([addr(1)]);
        let b = AddrSet::from_iter_addrs([addr(1)]);
        let c = AddrSet::from_iter_addrs([addr(2)]);
        assert!(a.has_intersect(&b));
        assert!(!a.has_intersect(&c));
    }

    #[test]
    fn leq_is_subset() {
        let a = AddrSet::from_iter_addrs([addr(1)]);
        let b = AddrSet::from_iter_addrs([addr(1), addr(2)]);
        assert!(a.leq(&b));
        assert!(!b.leq(&a));
    }
}
