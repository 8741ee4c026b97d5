use ae_types::{
    NodeId,
    TypeId,
    Word,
};

/// One `(idx_var, gep_type)` pair of a `Gep` statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GepPair {
    /// The index variable. For [`GepPairKind::StructField`] this must name
    /// a node whose interval is a numeral at interpretation time.
    pub idx_var: NodeId,
    /// Whether this pair indexes into an array/pointer or a struct field.
    pub kind: GepPairKind,
}

/// Distinguishes the two walk rules for offset accumulation: pointer/array
/// pairs contribute multiplicatively (`idx * stride`), struct pairs
/// contribute additively via a field-offset lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GepPairKind {
    /// Pointer or array indexing. `stride` is the element byte size
    /// (byte-offset form) or element count (element-index form); the
    /// interpreter picks the right one
    Indexable {
        /// Element stride in bytes.
        elem_byte_size: Word,
    },
    /// Struct field indexing. The field offset is looked up from the
    /// external type oracle (`Pag::type_info().struct_field_offset`)
    /// keyed by `struct_type`; `idx_var` must resolve to a constant.
    StructField {
        /// The struct type being indexed into.
        struct_type: TypeId,
    },
}
