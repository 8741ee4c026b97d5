use ae_ir::Statement;
use ae_types::{
    IcfgNodeId,
    NodeId,
    TypeId,
    Word,
};

/// How `Pag::node`'s `Addr`-statement rhs should be materialized: the dispatch the statement interpreter performs depends
/// entirely on which kind of object `rhs` names.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VarKind {
    /// A constant integer, stored as a numeral interval.
    ConstantInt(Word),
    /// A constant floating-point value, stored as a numeral interval.
    ConstantFloat,
    /// The constant null pointer.
    ConstantNull,
    /// Constant scalar data other than int/float/null (e.g. a constant
    /// expression); stored as a numeral interval when representable,
    /// `⊤` otherwise per the engine's cast rules.
    ConstantData,
    /// A constant array; this maps to `⊤` rather than an
    /// element-wise numeral.
    ConstantArray,
    /// A constant struct; same treatment as `ConstantArray`.
    ConstantStruct,
    /// A global variable or function; materializes to an address set.
    Global,
    /// Any other (non-constant, local/heap/stack) object; materializes to
    /// an address set.
    Other,
}

/// A PAG variable or object, as reported by [`Pag::node`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Var {
    /// What kind of value this node names.
    pub kind: VarKind,
    /// The static type of the variable.
    pub ty: TypeId,
    /// Whether this variable has pointer type.
    pub is_pointer: bool,
    /// Whether this variable denotes constant data (any `VarKind::Constant*`
    /// variant).
    pub is_const_data: bool,
    /// Whether this variable currently carries a value (false for e.g. an
    /// opaque external symbol with no known initializer).
    pub has_value: bool,
    /// The base object this variable was derived from via `Gep`, if any.
    pub base_object_id: Option<NodeId>,
}

/// Per-type facts needed by the `Gep` element-index/byte-offset walk and by
/// `Copy`'s width-dependent casts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeInfo {
    /// Size of one value of this type, in bytes.
    pub byte_size: Word,
    /// Whether this type is an array type.
    pub is_array: bool,
    /// The element type, for array/pointer types.
    pub elem_type: Option<TypeId>,
    /// Whether an integer of this type is signed.
    pub is_signed_int: bool,
    /// Bit width, for integer/float types.
    pub bit_width: u32,
}

/// Facts about the base object a pointer ultimately refers to, used by the
/// allocation-size tracker and the overflow detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseObj {
    /// Whether `byte_size` is a statically known constant (as opposed to a
    /// runtime-computed allocation size).
    pub is_constant_byte_size: bool,
    /// The object's size in bytes, when known.
    pub byte_size: Word,
    /// Whether this object lives in static/global storage.
    pub is_global: bool,
    /// Whether this object was heap-allocated.
    pub is_heap: bool,
    /// Whether this object lives on the stack.
    pub is_stack: bool,
}

/// The program-assignment graph (PAG/SVFIR): nodes are abstract variables
/// and objects, edges are the [`Statement`]s the engine interprets.
///
/// This is an external collaborator: the engine only reads from
/// it, never mutates it, and never constructs one itself — pointer
/// analysis, type layout, and indirect-call resolution all happen upstream
/// of this crate.
///
/// # Example
///
/// ```
/// use ae_contracts::{Pag, Var, VarKind, TypeInfo, BaseObj};
/// use ae_ir::Statement;
/// use ae_types::{IcfgNodeId, NodeId, TypeId, Word};
///
/// struct Toy;
///
/// impl Pag for Toy {
///     fn node(&self, _id: NodeId) -> Var {
///         Var { kind: VarKind::Other, ty: TypeId::new(0), is_pointer: true,
///               is_const_data: false, has_value: true, base_object_id: None }
///     }
///     fn gep_obj_var(&self, base_obj_id: NodeId, _field_idx: Word) -> NodeId { base_obj_id }
///     fn type_info(&self, _ty: TypeId) -> TypeInfo {
///         TypeInfo { byte_size: 4, is_array: false, elem_type: None,
///                    is_signed_int: true, bit_width: 32 }
///     }
///     fn flat_elem_idx(&self, _ty: TypeId, i: Word) -> Word { i }
///     fn struct_field_offset(&self, _ty: TypeId, field_idx: Word) -> Word { field_idx * 4 }
///     fn indirect_call_targets(&self, _call: IcfgNodeId) -> Vec<ae_types::FunctionId> { Vec::new() }
///     fn statements_of(&self, _node: IcfgNodeId) -> Vec<Statement> { Vec::new() }
///     fn base_object(&self, _id: NodeId) -> BaseObj {
///         BaseObj { is_constant_byte_size: true, byte_size: 4, is_global: false,
///                   is_heap: false, is_stack: true }
///     }
/// }
/// ```
pub trait Pag {
    /// Look up what kind of variable/object `id` names.
    fn node(&self, id: NodeId) -> Var;

    /// Derive (or look up) the gep-object id for field `field_idx` of the
    /// base object `base_obj_id`.
    fn gep_obj_var(&self, base_obj_id: NodeId, field_idx: Word) -> NodeId;

    /// Layout facts about `ty`.
    fn type_info(&self, ty: TypeId) -> TypeInfo;

    /// Flatten a possibly-nested array/struct element index `i` of `ty`
    /// into a single linear field index, for the element-index form of the
    /// `Gep` walk.
    fn flat_elem_idx(&self, ty: TypeId, i: Word) -> Word;

    /// Byte offset of field `field_idx` within struct type `ty`, for the
    /// byte-offset form of the `Gep` walk.
    fn struct_field_offset(&self, ty: TypeId, field_idx: Word) -> Word;

    /// Functions an indirect call site might target, as resolved by the
    /// upstream pointer-analysis pre-pass.
    fn indirect_call_targets(&self, call_id: IcfgNodeId) -> Vec<ae_types::FunctionId>;

    /// The statements attached to an ICFG program point, in source order.
    fn statements_of(&self, node: IcfgNodeId) -> Vec<Statement>;

    /// Facts about the base object `id` ultimately refers to.
    fn base_object(&self, id: NodeId) -> BaseObj;
}
