#![warn(missing_docs)]
//! Atomic identifiers and the virtual-address encoding shared by every crate
//! in the abstract-interpretation engine.
//!
//! Nothing here knows about lattices, statements, or fixpoints; it only
//! fixes the wire-level vocabulary that the ICFG/PAG builders (external
//! collaborators) and the engine agree on.

mod addr;
mod ids;
mod limits;

pub use addr::VirtualAddress;
pub use ids::{
    FunctionId,
    IcfgNodeId,
    InternalId,
    NodeId,
    SccId,
    TypeId,
};
pub use limits::Limits;

/// Register/word-sized value used throughout the engine for interval
/// bounds, byte offsets, and field indices.
pub type Word = i128;
