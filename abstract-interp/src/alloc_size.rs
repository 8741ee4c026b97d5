//! Allocation-size tracking: the byte-size interval of the object a pointer
//! ultimately refers to, consulted by the buffer-overflow detector.
//!
//! The naive design traces backward through `Copy`/`Load`/`Gep`/call edges
//! until it reaches an `Addr` or a global. This engine instead follows
//! [`ae_contracts::Var::base_object_id`]: by the time a pointer variable
//! holds an address set, `Copy`/`Load`/`Gep`/call-edge indirection has
//! already been resolved into concrete address-set members, so walking the
//! PAG's own base-object chain reaches the same answer without re-deriving
//! it from the ICFG.

use hashbrown::HashMap;

use ae_contracts::Pag;
use ae_types::{
    InternalId,
    NodeId,
    Word,
};

use crate::interval::Interval;

/// Caches the size interval computed for each heap/stack allocation site
/// when its `Addr` statement is interpreted (see
/// [`crate::interp::interpret`]'s handling of `array_sizes`).
#[derive(Debug, Clone, Default)]
pub struct AllocSizeTracker {
    sizes: HashMap<NodeId, Interval>,
}

impl AllocSizeTracker {
    /// A tracker with no recorded allocation sizes yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the computed size of allocation site `obj_id`.
    pub fn record(&mut self, obj_id: NodeId, size: Interval) {
        self.sizes.insert(obj_id, size);
    }

    /// The size interval of the object memory cell `addr` ultimately
    /// belongs to. Follows `base_object_id` up to 64 hops (a generous
    /// bound on gep-chain depth; a longer chain indicates a cycle in
    /// malformed input) before giving up and returning the object itself
    /// as the base.
    pub fn size_of(&self, addr: InternalId, pag: &dyn Pag, max_field_limit: Word) -> Interval {
        let mut current = NodeId::from(addr.raw());
        for _ in 0..64 {
            match pag.node(current).base_object_id {
                Some(base) if base != current => current = base,
                _ => break,
            }
        }
        let base_obj = pag.base_object(current);
        if base_obj.is_constant_byte_size {
            Interval::num(base_obj.byte_size)
        } else {
            self.sizes
                .get(&current)
                .cloned()
                .unwrap_or_else(|| Interval::num(max_field_limit))
        }
    }
}
