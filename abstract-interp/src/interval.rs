//! Interval lattice over the extended integers: closed ranges
//! `[lb, ub]` with `-inf`/`+inf` endpoints, plus a distinguished bottom for
//! "no value". Every numeral the engine ever stores is an `Interval`.

use core::cmp;

use ae_types::Word;

/// A lower or upper bound of an [`Interval`]: either a finite word, or one
/// of the two infinities.
///
/// Declaration order (`NegInf < Finite(_) < PosInf`) makes the derived
/// `Ord` exactly the order we want, so arithmetic and widening can compare
/// bounds directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Bound {
    /// `-infinity`.
    NegInf,
    /// A finite endpoint.
    Finite(Word),
    /// `+infinity`.
    PosInf,
}

impl Bound {
    const fn neg(self) -> Self {
        match self {
            Self::NegInf => Self::PosInf,
            Self::PosInf => Self::NegInf,
            Self::Finite(w) => Self::Finite(-w),
        }
    }

    fn add(self, other: Self) -> Self {
        match (self, other) {
            (Self::NegInf, _) | (_, Self::NegInf) => Self::NegInf,
            (Self::PosInf, _) | (_, Self::PosInf) => Self::PosInf,
            (Self::Finite(a), Self::Finite(b)) => Self::Finite(a.saturating_add(b)),
        }
    }

    fn sub(self, other: Self) -> Self {
        self.add(other.neg())
    }

    const fn is_zero(self) -> bool {
        matches!(self, Self::Finite(0))
    }

    fn mul(self, other: Self) -> Self {
        if self.is_zero() || other.is_zero() {
            return Self::Finite(0);
        }
        match (self, other) {
            (Self::Finite(a), Self::Finite(b)) => Self::Finite(a.saturating_mul(b)),
            _ => {
                let negative = self.sign() * other.sign() < 0;
                if negative {
                    Self::NegInf
                } else {
                    Self::PosInf
                }
            }
        }
    }

    fn sign(self) -> i8 {
        match self {
            Self::NegInf => -1,
            Self::PosInf => 1,
            Self::Finite(w) => w.signum() as i8,
        }
    }

    const fn finite(self) -> Option<Word> {
        match self {
            Self::Finite(w) => Some(w),
            _ => None,
        }
    }
}

/// Closed interval `[lb, ub]` over `Word ∪ {-inf, +inf}`, or bottom
/// ("no value"). A *numeral* is a non-bottom interval with `lb = ub`,
/// both finite.
///
/// Arithmetic is sound: every operation rounds its result outward rather
/// than guessing. Division and remainder by an interval that may contain
/// zero yield [`Interval::top`] rather than failing — division by zero is
/// never an engine error.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Interval {
    /// No possible value.
    Bottom,
    /// `[lo, hi]`, maintained with `lo <= hi`.
    Range {
        /// Lower bound.
        lo: Bound,
        /// Upper bound.
        hi: Bound,
    },
}

impl Interval {
    /// The empty interval.
    pub const fn bottom() -> Self {
        Self::Bottom
    }

    /// `[-inf, +inf]`.
    pub const fn top() -> Self {
        Self::Range {
            lo: Bound::NegInf,
            hi: Bound::PosInf,
        }
    }

    /// The singleton interval `[k, k]`.
    pub const fn num(k: Word) -> Self {
        Self::Range {
            lo: Bound::Finite(k),
            hi: Bound::Finite(k),
        }
    }

    /// `[l, u]`, or bottom if `l > u`.
    pub const fn range(l: Word, u: Word) -> Self {
        if l > u {
            Self::Bottom
        } else {
            Self::Range {
                lo: Bound::Finite(l),
                hi: Bound::Finite(u),
            }
        }
    }

    /// `[c, +inf]`. Used by the branch oracle to refine a `>`/`>=`
    /// comparison against a numeral right-hand side.
    pub const fn at_least(c: Word) -> Self {
        Self::Range {
            lo: Bound::Finite(c),
            hi: Bound::PosInf,
        }
    }

    /// `[-inf, c]`. Used by the branch oracle to refine a `<`/`<=`
    /// comparison against a numeral right-hand side.
    pub const fn at_most(c: Word) -> Self {
        Self::Range {
            lo: Bound::NegInf,
            hi: Bound::Finite(c),
        }
    }

    /// Build from two already-computed bounds, collapsing to bottom if
    /// `lo > hi`.
    fn from_bounds(lo: Bound, hi: Bound) -> Self {
        if lo > hi {
            Self::Bottom
        } else {
            Self::Range { lo, hi }
        }
    }

    /// The three-valued boolean `[0,1]` used by comparisons that cannot be
    /// resolved statically.
    pub const fn maybe_bool() -> Self {
        Self::range(0, 1)
    }

    /// The definite boolean `[1,1]`.
    pub const fn tt() -> Self {
        Self::num(1)
    }

    /// The definite boolean `[0,0]`.
    pub const fn ff() -> Self {
        Self::num(0)
    }

    /// `true` for [`Interval::Bottom`].
    pub const fn is_bottom(&self) -> bool {
        matches!(self, Self::Bottom)
    }

    /// `true` for exactly `[-inf, +inf]`.
    pub const fn is_top(&self) -> bool {
        matches!(
            self,
            Self::Range {
                lo: Bound::NegInf,
                hi: Bound::PosInf,
            }
        )
    }

    /// `true` for a finite, single-point interval.
    pub const fn is_numeral(&self) -> bool {
        matches!(self, Self::Range { lo: Bound::Finite(a), hi: Bound::Finite(b) } if *a == *b)
    }

    /// The single value of a numeral interval, if it is one.
    pub const fn as_numeral(&self) -> Option<Word> {
        match self {
            Self::Range {
                lo: Bound::Finite(a),
                hi: Bound::Finite(b),
            } if *a == *b => Some(*a),
            _ => None,
        }
    }

    /// `(lo, hi)` if both bounds are finite.
    pub fn finite_range(&self) -> Option<(Word, Word)> {
        match self {
            Self::Range {
                lo: Bound::Finite(l),
                hi: Bound::Finite(h),
            } => Some((*l, *h)),
            _ => None,
        }
    }

    /// `true` if `k` lies within this interval.
    pub fn contains(&self, k: Word) -> bool {
        match self {
            Self::Bottom => false,
            Self::Range { lo, hi } => *lo <= Bound::Finite(k) && Bound::Finite(k) <= *hi,
        }
    }

    /// `true` iff zero could be a value of this interval.
    pub fn may_contain_zero(&self) -> bool {
        match self {
            Self::Bottom => false,
            Self::Range { lo, hi } => *lo <= Bound::Finite(0) && Bound::Finite(0) <= *hi,
        }
    }

    fn bounds(&self) -> Option<(Bound, Bound)> {
        match self {
            Self::Bottom => None,
            Self::Range { lo, hi } => Some((*lo, *hi)),
        }
    }

    /// `self <= other` in the lattice order, i.e. `self` denotes a subset.
    pub fn leq(&self, other: &Self) -> bool {
        match (self.bounds(), other.bounds()) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some((l1, h1)), Some((l2, h2))) => l2 <= l1 && h1 <= h2,
        }
    }

    /// Least upper bound.
    pub fn join(&self, other: &Self) -> Self {
        match (self.bounds(), other.bounds()) {
            (None, _) => other.clone(),
            (_, None) => self.clone(),
            (Some((l1, h1)), Some((l2, h2))) => Self::Range {
                lo: cmp::min(l1, l2),
                hi: cmp::max(h1, h2),
            },
        }
    }

    /// Greatest lower bound.
    pub fn meet(&self, other: &Self) -> Self {
        match (self.bounds(), other.bounds()) {
            (None, _) | (_, None) => Self::Bottom,
            (Some((l1, h1)), Some((l2, h2))) => {
                Self::from_bounds(cmp::max(l1, l2), cmp::min(h1, h2))
            }
        }
    }

    /// Standard interval widening: `[a,b] ∇ [c,d] = [c<a ? -inf : a, d>b ?
    /// +inf : b]`. Widening `self` (the previous iterate)
    /// against `other` (the new iterate).
    pub fn widen_with(&self, other: &Self) -> Self {
        match (self.bounds(), other.bounds()) {
            (None, _) => other.clone(),
            (_, None) => self.clone(),
            (Some((a, b)), Some((c, d))) => Self::Range {
                lo: if c < a { Bound::NegInf } else { a },
                hi: if d > b { Bound::PosInf } else { b },
            },
        }
    }

    /// Narrowing: replaces an infinite bound of `self` with the
    /// corresponding finite bound of `other`.
    pub fn narrow_with(&self, other: &Self) -> Self {
        match (self.bounds(), other.bounds()) {
            (None, _) => Self::Bottom,
            (Some(_), None) => Self::Bottom,
            (Some((a, b)), Some((c, d))) => {
                let lo = if a == Bound::NegInf { c } else { a };
                let hi = if b == Bound::PosInf { d } else { b };
                Self::from_bounds(lo, hi)
            }
        }
    }

    /// Interval addition.
    pub fn add(&self, other: &Self) -> Self {
        self.zip_map(other, Bound::add, Bound::add)
    }

    /// Interval subtraction.
    pub fn sub(&self, other: &Self) -> Self {
        match (self.bounds(), other.bounds()) {
            (None, _) | (_, None) => Self::Bottom,
            (Some((a, b)), Some((c, d))) => Self::from_bounds(a.sub(d), b.sub(c)),
        }
    }

    /// Interval multiplication: the min/max of the four corner products.
    pub fn mul(&self, other: &Self) -> Self {
        match (self.bounds(), other.bounds()) {
            (None, _) | (_, None) => Self::Bottom,
            (Some((a, b)), Some((c, d))) => {
                let corners = [a.mul(c), a.mul(d), b.mul(c), b.mul(d)];
                let lo = corners.into_iter().min().unwrap_or(Bound::NegInf);
                let hi = corners.into_iter().max().unwrap_or(Bound::PosInf);
                Self::from_bounds(lo, hi)
            }
        }
    }

    /// Interval division. Division by an interval that may contain zero
    /// yields top rather than an error.
    pub fn div(&self, other: &Self) -> Self {
        if other.is_bottom() || self.is_bottom() {
            return Self::Bottom;
        }
        if other.may_contain_zero() {
            return Self::top();
        }
        match (self.bounds(), other.bounds()) {
            (Some((a, b)), Some((c, d))) => {
                let div = |x: Bound, y: Bound| -> Bound {
                    match (x.finite(), y.finite()) {
                        (Some(x), Some(y)) if y != 0 => Bound::Finite(x.wrapping_div(y)),
                        _ => {
                            let neg = x.sign() * y.sign() < 0;
                            if neg {
                                Bound::NegInf
                            } else {
                                Bound::PosInf
                            }
                        }
                    }
                };
                let corners = [div(a, c), div(a, d), div(b, c), div(b, d)];
                let lo = corners.into_iter().min().unwrap_or(Bound::NegInf);
                let hi = corners.into_iter().max().unwrap_or(Bound::PosInf);
                Self::from_bounds(lo, hi)
            }
            _ => Self::Bottom,
        }
    }

    /// Interval remainder, modeled as `[0, max(|c|,|d|) - 1]` joined with
    /// its negation when the dividend may be negative — the standard
    /// conservative widening used when an exact modular image isn't worth
    /// tracking. Remainder by a possibly-zero divisor yields top.
    pub fn rem(&self, other: &Self) -> Self {
        if other.is_bottom() || self.is_bottom() {
            return Self::Bottom;
        }
        if other.may_contain_zero() {
            return Self::top();
        }
        let Some((_, d_hi)) = other.bounds() else {
            return Self::top();
        };
        let Some(bound) = d_hi.finite().map(Word::abs).or(other
            .bounds()
            .and_then(|(lo, _)| lo.finite())
            .map(Word::abs))
        else {
            return Self::top();
        };
        if bound == 0 {
            return Self::top();
        }
        Self::range(-(bound - 1), bound - 1)
    }

    /// Bitwise AND. Exact only when both operands are numerals; otherwise
    /// the bit pattern is unknown and the result widens to the envelope
    /// implied by the narrower non-negative bound, conservatively to top
    /// when either side may be negative.
    pub fn bitand(&self, other: &Self) -> Self {
        self.exact_or_else(other, |a, b| a & b, Self::bitwise_nonneg_bound)
    }

    /// Bitwise OR; see [`Interval::bitand`].
    pub fn bitor(&self, other: &Self) -> Self {
        self.exact_or_else(other, |a, b| a | b, Self::bitwise_nonneg_bound)
    }

    /// Bitwise XOR; see [`Interval::bitand`].
    pub fn bitxor(&self, other: &Self) -> Self {
        self.exact_or_else(other, |a, b| a ^ b, Self::bitwise_nonneg_bound)
    }

    fn bitwise_nonneg_bound(&self, other: &Self) -> Self {
        match (self.bounds(), other.bounds()) {
            (Some((Bound::Finite(a_lo), Bound::Finite(a_hi))), Some((Bound::Finite(b_lo), Bound::Finite(b_hi))))
                if a_lo >= 0 && b_lo >= 0 =>
            {
                let hi = a_hi.max(b_hi) as u128;
                let bound = hi.checked_next_power_of_two().unwrap_or(u128::MAX);
                Self::range(0, bound.saturating_sub(1).min(Word::MAX as u128) as Word)
            }
            _ => Self::top(),
        }
    }

    /// Left shift by a numeral amount; top if the shift amount is unknown.
    pub fn shl(&self, other: &Self) -> Self {
        match (self.bounds(), other.as_numeral()) {
            (Some((a, b)), Some(k)) if (0..128).contains(&k) => {
                let shift = |x: Bound| match x {
                    Bound::Finite(w) => w
                        .checked_shl(k as u32)
                        .filter(|r| r.checked_shr(k as u32) == Some(w))
                        .map(Bound::Finite)
                        .unwrap_or(if w < 0 { Bound::NegInf } else { Bound::PosInf }),
                    inf => inf,
                };
                Self::from_bounds(shift(a), shift(b))
            }
            _ if self.is_bottom() => Self::Bottom,
            _ => Self::top(),
        }
    }

    /// Arithmetic right shift by a numeral amount; top if the shift amount
    /// is unknown.
    pub fn shr(&self, other: &Self) -> Self {
        match (self.bounds(), other.as_numeral()) {
            (Some((a, b)), Some(k)) if (0..128).contains(&k) => {
                let shift = |x: Bound| match x {
                    Bound::Finite(w) => Bound::Finite(w >> k as u32),
                    inf => inf,
                };
                Self::from_bounds(shift(a), shift(b))
            }
            _ if self.is_bottom() => Self::Bottom,
            _ => Self::top(),
        }
    }

    /// `==` as a three-valued interval: definitely false when the ranges
    /// don't overlap, definitely true only when both sides are the same
    /// numeral, maybe otherwise.
    pub fn eq_cmp(&self, other: &Self) -> Self {
        if self.is_bottom() || other.is_bottom() {
            return Self::Bottom;
        }
        if let (Some(a), Some(b)) = (self.as_numeral(), other.as_numeral()) {
            return if a == b { Self::tt() } else { Self::ff() };
        }
        if self.meet(other).is_bottom() {
            Self::ff()
        } else {
            Self::maybe_bool()
        }
    }

    /// `!=` as a three-valued interval; the complement of [`Interval::eq_cmp`].
    pub fn ne_cmp(&self, other: &Self) -> Self {
        if self.is_bottom() || other.is_bottom() {
            return Self::Bottom;
        }
        if let (Some(a), Some(b)) = (self.as_numeral(), other.as_numeral()) {
            return if a != b { Self::tt() } else { Self::ff() };
        }
        if self.meet(other).is_bottom() {
            Self::tt()
        } else {
            Self::maybe_bool()
        }
    }

    /// `<` as a three-valued interval.
    pub fn lt_cmp(&self, other: &Self) -> Self {
        self.ordered_cmp(other, |a, b| a < b, |(_, h1), (l2, _)| h1 < l2, |(l1, _), (_, h2)| l1 >= h2)
    }

    /// `<=` as a three-valued interval.
    pub fn le_cmp(&self, other: &Self) -> Self {
        self.ordered_cmp(other, |a, b| a <= b, |(_, h1), (l2, _)| h1 <= l2, |(l1, _), (_, h2)| l1 > h2)
    }

    /// `>` as a three-valued interval.
    pub fn gt_cmp(&self, other: &Self) -> Self {
        other.lt_cmp(self)
    }

    /// `>=` as a three-valued interval.
    pub fn ge_cmp(&self, other: &Self) -> Self {
        other.le_cmp(self)
    }

    fn zip_map(&self, other: &Self, lo_op: impl Fn(Bound, Bound) -> Bound, hi_op: impl Fn(Bound, Bound) -> Bound) -> Self {
        match (self.bounds(), other.bounds()) {
            (None, _) | (_, None) => Self::Bottom,
            (Some((l1, h1)), Some((l2, h2))) => Self::from_bounds(lo_op(l1, l2), hi_op(h1, h2)),
        }
    }

    fn exact_or_else(
        &self,
        other: &Self,
        exact: impl Fn(Word, Word) -> Word,
        fallback: impl Fn(&Self, &Self) -> Self,
    ) -> Self {
        if self.is_bottom() || other.is_bottom() {
            return Self::Bottom;
        }
        match (self.as_numeral(), other.as_numeral()) {
            (Some(a), Some(b)) => Self::num(exact(a, b)),
            _ => fallback(self, other),
        }
    }

    fn ordered_cmp(
        &self,
        other: &Self,
        exact: impl Fn(Word, Word) -> bool,
        definitely_true: impl Fn((Bound, Bound), (Bound, Bound)) -> bool,
        definitely_false: impl Fn((Bound, Bound), (Bound, Bound)) -> bool,
    ) -> Self {
        let (Some(b1), Some(b2)) = (self.bounds(), other.bounds()) else {
            return Self::Bottom;
        };
        if let (Some(a), Some(b)) = (self.as_numeral(), other.as_numeral()) {
            return if exact(a, b) { Self::tt() } else { Self::ff() };
        }
        if definitely_true(b1, b2) {
            Self::tt()
        } else if definitely_false(b1, b2) {
            Self::ff()
        } else {
            Self::maybe_bool()
        }
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::Bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples() -> Vec<Interval> {
        vec![
            Interval::bottom(),
            Interval::top(),
            Interval::num(0),
            Interval::num(5),
            Interval::num(-3),
            Interval::range(-10, 10),
            Interval::range(0, 100),
        ]
    }

    #[test]
    fn join_is_idempotent_commutative_and_absorbing() {
        for a in samples() {
            assert_eq!(a.join(&a), a);
        }
        for a in samples() {
            for b in samples() {
                assert_eq!(a.join(&b), b.join(&a));
            }
        }
    }

    #[test]
    fn meet_is_idempotent_and_commutative() {
        for a in samples() {
            assert_eq!(a.meet(&a), a);
        }
        for a in samples() {
            for b in samples() {
                assert_eq!(a.meet(&b), b.meet(&a));
            }
        }
    }

    #[test]
    fn bottom_is_join_identity_top_is_meet_identity() {
        for a in samples() {
            assert_eq!(Interval::bottom().join(&a), a);
            assert_eq!(Interval::top().meet(&a), a);
        }
    }

    #[test]
    fn absorption_law_holds() {
        for a in samples() {
            for b in samples() {
                assert_eq!(a.join(&a.meet(&b)), a);
            }
        }
    }

    #[test]
    fn widening_covers_the_join() {
        for a in samples() {
            for b in samples() {
                assert!(a.join(&b).leq(&a.widen_with(&b)));
            }
        }
    }

    #[test]
    fn widening_stabilizes_an_ascending_chain() {
        let mut acc = Interval::num(0);
        let chain = [
            Interval::range(0, 1),
            Interval::range(0, 2),
            Interval::range(0, 3),
            Interval::range(0, 4),
        ];
        for step in chain {
            acc = acc.widen_with(&step);
        }
        assert_eq!(
            acc,
            Interval::Range {
                lo: Bound::Finite(0),
                hi: Bound::PosInf
            }
        );
        // Once the upper bound has escaped to +inf a further widen against
        // a still-larger finite bound is a no-op.
        let widened_again = acc.widen_with(&Interval::range(0, 1000));
        assert_eq!(widened_again, acc);
    }

    #[test]
    fn address_round_trip_free_arithmetic_is_sound() {
        let a = Interval::range(1, 3);
        let b = Interval::range(2, 5);
        assert_eq!(a.add(&b), Interval::range(3, 8));
        assert_eq!(a.sub(&b), Interval::range(-4, 1));
        assert_eq!(a.mul(&b), Interval::range(2, 15));
    }

    #[test]
    fn division_by_interval_containing_zero_is_top_not_an_error() {
        let a = Interval::range(1, 10);
        let b = Interval::range(-1, 1);
        assert_eq!(a.div(&b), Interval::top());
    }

    #[test]
    fn narrowing_recovers_finite_bounds_after_widening() {
        let prev = Interval::range(0, 3);
        let wide = prev.widen_with(&Interval::range(0, 4)).widen_with(&Interval::range(0, 100));
        assert_eq!(wide, Interval::Range { lo: Bound::Finite(0), hi: Bound::PosInf });
        let narrowed = wide.narrow_with(&Interval::range(0, 9));
        assert_eq!(narrowed, Interval::range(0, 9));
    }

    #[test]
    fn comparisons_resolve_definitely_when_ranges_are_disjoint() {
        let small = Interval::range(0, 5);
        let big = Interval::range(10, 20);
        assert_eq!(small.lt_cmp(&big), Interval::tt());
        assert_eq!(big.lt_cmp(&small), Interval::ff());
        assert_eq!(small.eq_cmp(&big), Interval::ff());
    }

    #[test]
    fn comparisons_are_maybe_when_ranges_overlap() {
        let a = Interval::range(0, 10);
        let b = Interval::range(5, 15);
        assert_eq!(a.lt_cmp(&b), Interval::maybe_bool());
        assert_eq!(a.eq_cmp(&b), Interval::maybe_bool());
    }
}
