use core::fmt;

/// Opaque 32-bit handle assigned by the IR builder, unique across every
/// variable and object in a program. `NodeId` values are produced by the
/// external `Pag`/`Icfg` collaborators (see `ae-contracts`); the engine
/// never constructs one except through the two reserved constants below.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// The reserved id denoting a null pointer value.
    pub const NULL_PTR: Self = Self(u32::MAX);

    /// The reserved id denoting the "black-hole" object: a distinguished
    /// abstract object standing in for "any object". Reads and writes to it
    /// are permitted but uninformative.
    pub const BLACK_HOLE: Self = Self(u32::MAX - 1);

    /// Wrap a raw id assigned by the IR builder.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw id, as assigned by the IR builder.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// `true` for the reserved null-pointer id.
    pub const fn is_null(self) -> bool {
        matches!(self, Self::NULL_PTR)
    }

    /// `true` for the reserved black-hole object id.
    pub const fn is_black_hole(self) -> bool {
        matches!(self, Self::BLACK_HOLE)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::NULL_PTR => write!(f, "%null"),
            Self::BLACK_HOLE => write!(f, "%blackhole"),
            Self(raw) => write!(f, "%{raw}"),
        }
    }
}

impl From<u32> for NodeId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<NodeId> for u32 {
    fn from(id: NodeId) -> Self {
        id.0
    }
}

/// The low 24 bits of a [`VirtualAddress`](crate::VirtualAddress): the
/// engine's internal name for a memory cell, independent of the `0x7F` tag
/// byte that distinguishes an address word from a numeral word.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct InternalId(u32);

impl InternalId {
    /// Bitmask covering the low 24 bits that carry an internal id.
    pub const MASK: u32 = 0x00FF_FFFF;

    /// Construct from a raw value, truncating to 24 bits.
    pub const fn new(raw: u32) -> Self {
        Self(raw & Self::MASK)
    }

    /// Derive an internal id from the `NodeId` the builder assigned it.
    pub const fn from_node(id: NodeId) -> Self {
        Self::new(id.raw())
    }

    /// The raw 24-bit value.
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for InternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<NodeId> for InternalId {
    fn from(id: NodeId) -> Self {
        Self::from_node(id)
    }
}

/// Identifies a function in the interprocedural call graph. Distinct from
/// [`NodeId`] because functions are not PAG variables.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct FunctionId(u32);

impl FunctionId {
    /// Wrap a raw id assigned by the call-graph builder.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw id.
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@fn{}", self.0)
    }
}

/// Identifies a strongly-connected component of the call graph, used to
/// recognize recursive calls.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct SccId(u32);

impl SccId {
    /// Wrap a raw id assigned by the SCC-detection pre-pass.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw id.
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SccId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scc{}", self.0)
    }
}

/// Identifies a program point in the ICFG. Kept distinct from [`NodeId`]
/// because a program point is not itself a PAG variable or object, even
/// though it may carry statements that mention many of them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct IcfgNodeId(u32);

impl IcfgNodeId {
    /// Wrap a raw id assigned by the ICFG builder.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw id.
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for IcfgNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Identifies a type recognized by the external type oracle
/// (`Pag::type_info`), e.g. a struct layout or array element type.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    /// Wrap a raw id assigned by the IR builder's type table.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw id.
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ty{}", self.0)
    }
}
