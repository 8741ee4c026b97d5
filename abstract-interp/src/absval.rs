//! The reduced-union abstract value: every PAG variable and
//! memory cell holds exactly one of these. `join`/`meet`/`widen`/`narrow`
//! dispatch on the tag; a value of one tag met against a value of the
//! other degrades to bottom (they denote disjoint universes), while a join
//! against bottom is the identity.

use ae_contracts::Pag;
use ae_types::{
    NodeId,
    VirtualAddress,
    Word,
};

use crate::{
    addrset::AddrSet,
    interval::Interval,
};

/// Tagged union of an [`Interval`] or an [`AddrSet`], or bottom.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AbsVal {
    /// No possible value.
    Bottom,
    /// A numeric/interval value.
    Interval(Interval),
    /// A set of pointer values.
    Addrs(AddrSet),
}

impl AbsVal {
    /// Bottom.
    pub const fn bottom() -> Self {
        Self::Bottom
    }

    /// The numeral `k`.
    pub const fn num(k: Word) -> Self {
        Self::Interval(Interval::num(k))
    }

    /// The unconstrained interval `[-inf, +inf]`.
    pub const fn top() -> Self {
        Self::Interval(Interval::top())
    }

    /// A single-address pointer value.
    pub fn addr(addr: VirtualAddress) -> Self {
        Self::Addrs(AddrSet::singleton(addr))
    }

    /// A single-address pointer value naming `id`.
    pub fn addr_of(id: NodeId) -> Self {
        Self::addr(VirtualAddress::to_addr(id))
    }

    /// `true` for [`AbsVal::Bottom`].
    pub const fn is_bottom(&self) -> bool {
        matches!(self, Self::Bottom)
    }

    /// The interval projection, if this is an interval value (bottom
    /// included as [`Interval::bottom`]).
    pub fn as_interval(&self) -> Interval {
        match self {
            Self::Bottom => Interval::bottom(),
            Self::Interval(i) => i.clone(),
            Self::Addrs(_) => Interval::bottom(),
        }
    }

    /// The address-set projection, if this is a pointer value (bottom
    /// included as [`AddrSet::empty`]).
    pub fn as_addrs(&self) -> AddrSet {
        match self {
            Self::Bottom => AddrSet::empty(),
            Self::Addrs(a) => a.clone(),
            Self::Interval(_) => AddrSet::empty(),
        }
    }

    /// `self <= other`.
    pub fn leq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bottom, _) => true,
            (_, Self::Bottom) => self.is_bottom(),
            (Self::Interval(a), Self::Interval(b)) => a.leq(b),
            (Self::Addrs(a), Self::Addrs(b)) => a.leq(b),
            _ => false,
        }
    }

    /// Join. Mixed-tag operations keep whichever operand is not bottom; if
    /// both carry incompatible tags (neither is bottom) the result is
    /// bottom — the engine treats that as a contract violation upstream,
    /// never a silent join of unrelated universes.
    pub fn join(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Bottom, x) | (x, Self::Bottom) => x.clone(),
            (Self::Interval(a), Self::Interval(b)) => Self::Interval(a.join(b)),
            (Self::Addrs(a), Self::Addrs(b)) => Self::Addrs(a.union(b)),
            _ => Self::Bottom,
        }
    }

    /// Meet.
    pub fn meet(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Bottom, _) | (_, Self::Bottom) => Self::Bottom,
            (Self::Interval(a), Self::Interval(b)) => Self::Interval(a.meet(b)),
            (Self::Addrs(a), Self::Addrs(b)) => Self::Addrs(a.intersect(b)),
            _ => Self::Bottom,
        }
    }

    /// Widening. For intervals this is [`Interval::widen_with`]. For
    /// address sets, widening is a join-expansion along the gep-index axis
    /// rather than a true domain-theoretic widening: every address present
    /// in `other` but
    /// missing from `self` is expanded to every gep-field of that
    /// address's base object, up to `max_field_limit`, before unioning.
    /// This is what bounds the otherwise-unbounded address lattice.
    pub fn widen_with(&self, other: &Self, pag: &dyn Pag, max_field_limit: u32) -> Self {
        match (self, other) {
            (Self::Bottom, x) | (x, Self::Bottom) => x.clone(),
            (Self::Interval(a), Self::Interval(b)) => Self::Interval(a.widen_with(b)),
            (Self::Addrs(a), Self::Addrs(b)) => {
                Self::Addrs(expand_addr_widening(a, b, pag, max_field_limit))
            }
            _ => Self::Bottom,
        }
    }

    /// Narrowing. For intervals this is [`Interval::narrow_with`]; address
    /// sets have no infinite bound to recover, so narrowing an address set
    /// is the identity on `self`.
    pub fn narrow_with(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Bottom, _) => Self::Bottom,
            (_, Self::Bottom) => Self::Bottom,
            (Self::Interval(a), Self::Interval(b)) => Self::Interval(a.narrow_with(b)),
            (Self::Addrs(a), Self::Addrs(_)) => Self::Addrs(a.clone()),
            _ => Self::Bottom,
        }
    }
}

/// Expand `lhs` with every gep-field (up to `max_field_limit`) of each
/// address in `rhs` that `lhs` doesn't already have, then union.
fn expand_addr_widening(lhs: &AddrSet, rhs: &AddrSet, pag: &dyn Pag, max_field_limit: u32) -> AddrSet {
    let mut expanded = lhs.clone();
    for missing in lhs.missing_from(rhs) {
        let internal = missing.from_addr();
        let base = NodeId::from(internal.raw());
        for field in 0..max_field_limit as Word {
            let gep_id = pag.gep_obj_var(base, field);
            expanded.insert(VirtualAddress::to_addr(gep_id));
        }
    }
    expanded.union(rhs)
}

impl Default for AbsVal {
    fn default() -> Self {
        Self::Bottom
    }
}
