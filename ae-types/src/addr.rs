use core::fmt;

use crate::{
    InternalId,
    NodeId,
};

/// Tag byte marking a 32-bit word as a virtual address rather than a plain
/// numeral. Chosen so addresses and intervals can share a word-typed slot
/// without ambiguity.
const ADDR_TAG: u32 = 0x7F;
const TAG_SHIFT: u32 = 24;
const TAG_MASK: u32 = 0xFF << TAG_SHIFT;

/// A 32-bit tagged word: the high byte is the constant tag `0x7F`, the low
/// 24 bits are an [`InternalId`] derived from a [`NodeId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct VirtualAddress(u32);

impl VirtualAddress {
    /// Encode a node id as a virtual address: `0x7F000000 | id`.
    pub const fn to_addr(id: NodeId) -> Self {
        Self(ADDR_TAG << TAG_SHIFT | InternalId::from_node(id).raw())
    }

    /// Decode the internal id carried by a (assumed valid) virtual address:
    /// `word & 0x00FFFFFF`.
    pub const fn from_addr(self) -> InternalId {
        InternalId::new(self.0)
    }

    /// `true` iff the word's top byte equals `0x7F`, i.e. this word is a
    /// valid address rather than a numeral that happens to share the slot.
    pub const fn is_valid(self) -> bool {
        self.0 & TAG_MASK == ADDR_TAG << TAG_SHIFT
    }

    /// The raw tagged word.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Reinterpret a raw word as a virtual address without checking the
    /// tag. Used only when decoding words that have already been confirmed
    /// valid by [`VirtualAddress::is_valid`].
    pub const fn from_raw_unchecked(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for VirtualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

impl From<NodeId> for VirtualAddress {
    fn from(id: NodeId) -> Self {
        Self::to_addr(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_is_sound() {
        for raw in [0u32, 1, 42, 0x00FF_FFFE, 0x00FF_FFFF] {
            let id = NodeId::new(raw);
            let addr = VirtualAddress::to_addr(id);
            assert!(addr.is_valid());
            assert_eq!(addr.from_addr(), InternalId::from_node(id));
            // to_addr(from_addr(w)) = w for every valid address w.
            let reconstructed =
                VirtualAddress::to_addr(NodeId::new(addr.from_addr().raw()));
            assert_eq!(reconstructed, addr);
        }
    }

    #[test]
    fn tag_distinguishes_addresses_from_numerals() {
        let numeral_word: u32 = 0x0012_3456;
        assert!(!VirtualAddress::from_raw_unchecked(numeral_word).is_valid());
        let addr = VirtualAddress::to_addr(NodeId::new(0x12_3456));
        assert!(addr.is_valid());
    }
}
