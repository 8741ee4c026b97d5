/// The kind of an ICFG node.
///
/// `Global` is the program's single global-initializer node; `Intra` is an
/// ordinary intraprocedural program point; `FunEntry`/`FunExit` bracket a
/// function body; `Call`/`Ret` bracket a call site, with the matching
/// `Ret` reachable via `Icfg::ret_node_of`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    /// The global ICFG entry, where `AbsState` starts empty.
    Global,
    /// An ordinary intraprocedural program point.
    Intra,
    /// The entry program point of a function.
    FunEntry,
    /// The exit program point of a function.
    FunExit,
    /// A call site; exposes `argument(i)`, `called_function`, and the
    /// matching `Ret` node.
    Call,
    /// The program point immediately after a call site returns.
    Ret,
}

impl NodeKind {
    /// `true` for the two node kinds that bracket a call site.
    pub const fn is_call_site(self) -> bool {
        matches!(self, Self::Call | Self::Ret)
    }
}
