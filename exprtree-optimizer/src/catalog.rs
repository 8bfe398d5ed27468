//! Lookup tables of library facts
//!
//! Catalogs are plain sets of descriptors. Lookups fall back to the generic
//! definition of a member or type, so registering `List<T>.Count` once covers
//! every `List<X>.Count`.

use exprtree_core::member::{Member, ParameterRef};
use exprtree_core::types::Type;
use rustc_hash::FxHashSet;

/// Set of members
#[derive(Debug, Clone, Default)]
pub struct MemberTable {
    members: FxHashSet<Member>,
}

impl MemberTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member
    pub fn insert(&mut self, member: Member) {
        self.members.insert(member);
    }

    /// Whether the member or its generic definition is in the table
    pub fn contains(&self, member: &Member) -> bool {
        self.members.contains(member)
            || member
                .generic_definition()
                .map_or(false, |definition| self.members.contains(definition))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl FromIterator<Member> for MemberTable {
    fn from_iter<I: IntoIterator<Item = Member>>(iter: I) -> Self {
        Self {
            members: iter.into_iter().collect(),
        }
    }
}

/// Set of parameters
#[derive(Debug, Clone, Default)]
pub struct ParameterTable {
    parameters: FxHashSet<ParameterRef>,
}

impl ParameterTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter
    pub fn insert(&mut self, parameter: ParameterRef) {
        self.parameters.insert(parameter);
    }

    /// Whether the parameter, or the same position on the generic
    /// definition of its member, is in the table
    pub fn contains(&self, parameter: &ParameterRef) -> bool {
        self.parameters.contains(parameter)
            || parameter
                .generic_definition()
                .map_or(false, |definition| self.parameters.contains(&definition))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

impl FromIterator<ParameterRef> for ParameterTable {
    fn from_iter<I: IntoIterator<Item = ParameterRef>>(iter: I) -> Self {
        Self {
            parameters: iter.into_iter().collect(),
        }
    }
}

/// Set of types
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    types: FxHashSet<Type>,
}

impl TypeTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a type
    pub fn insert(&mut self, ty: Type) {
        self.types.insert(ty);
    }

    /// Whether the type or its generic definition is in the table
    pub fn contains(&self, ty: &Type) -> bool {
        self.types.contains(ty)
            || ty
                .generic_definition()
                .map_or(false, |definition| self.types.contains(definition))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl FromIterator<Type> for TypeTable {
    fn from_iter<I: IntoIterator<Item = Type>>(iter: I) -> Self {
        Self {
            types: iter.into_iter().collect(),
        }
    }
}

/// Library facts consulted by [`crate::semantics::DefaultSemanticProvider`]
#[derive(Debug, Clone, Default)]
pub struct SemanticCatalog {
    /// Members without side effects
    pub pure_members: MemberTable,
    /// Members that never throw
    pub never_throw_members: MemberTable,
    /// Value types whose default construction has no side effect
    pub pure_types: TypeTable,
    /// Parameters their member only reads
    pub const_parameters: ParameterTable,
    /// Types whose instances cannot be mutated
    pub immutable_types: TypeTable,
}

impl SemanticCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pure member
    pub fn with_pure_member(mut self, member: Member) -> Self {
        self.pure_members.insert(member);
        self
    }

    /// Register a member that never throws
    pub fn with_never_throw_member(mut self, member: Member) -> Self {
        self.never_throw_members.insert(member);
        self
    }

    /// Register a value type with pure default construction
    pub fn with_pure_type(mut self, ty: Type) -> Self {
        self.pure_types.insert(ty);
        self
    }

    /// Register a read-only parameter
    pub fn with_const_parameter(mut self, parameter: ParameterRef) -> Self {
        self.const_parameters.insert(parameter);
        self
    }

    /// Register an immutable type
    pub fn with_immutable_type(mut self, ty: Type) -> Self {
        self.immutable_types.insert(ty);
        self
    }
}
