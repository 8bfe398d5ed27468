//! Member and parameter descriptors
//!
//! Descriptors are opaque identities owned by the host library. The
//! optimizer only compares them, reads their static types and uses them as
//! lookup keys into semantic catalogs and evaluator factories.

use crate::types::Type;
use std::fmt;
use std::sync::Arc;

/// Kind of member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// Method, called with arguments
    Method,
    /// Property getter
    Property,
    /// Field read
    Field,
    /// Instance constructor
    Constructor,
    /// Indexed property getter
    Indexer,
}

/// Declared parameter of a member
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterInfo {
    /// Parameter name
    pub name: String,
    /// Parameter type
    pub ty: Type,
}

/// Member data behind a [`Member`] handle
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct MemberInfo {
    /// Member name
    pub name: String,
    /// Type declaring the member
    pub declaring_type: Type,
    /// Method, property, field, constructor or indexer
    pub kind: MemberKind,
    /// Static members have no receiver
    pub is_static: bool,
    /// Declared parameters in order
    pub parameters: Vec<ParameterInfo>,
    /// Result type: return, property or field type; the declaring type for
    /// constructors
    pub ty: Type,
    /// Open generic definition of a constructed generic member
    pub generic_definition: Option<Member>,
}

/// Cheap to clone member descriptor
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Member(Arc<MemberInfo>);

impl Member {
    /// Wrap member data
    pub fn new(info: MemberInfo) -> Self {
        Self(Arc::new(info))
    }

    /// Static method
    pub fn static_method(
        declaring_type: Type,
        name: impl Into<String>,
        parameters: Vec<(&str, Type)>,
        ret: Type,
    ) -> Self {
        Self::build(declaring_type, name, MemberKind::Method, true, parameters, ret)
    }

    /// Instance method
    pub fn instance_method(
        declaring_type: Type,
        name: impl Into<String>,
        parameters: Vec<(&str, Type)>,
        ret: Type,
    ) -> Self {
        Self::build(declaring_type, name, MemberKind::Method, false, parameters, ret)
    }

    /// Instance or static property getter
    pub fn property(declaring_type: Type, name: impl Into<String>, ty: Type, is_static: bool) -> Self {
        Self::build(declaring_type, name, MemberKind::Property, is_static, Vec::new(), ty)
    }

    /// Instance or static field
    pub fn field(declaring_type: Type, name: impl Into<String>, ty: Type, is_static: bool) -> Self {
        Self::build(declaring_type, name, MemberKind::Field, is_static, Vec::new(), ty)
    }

    /// Constructor of `declaring_type`
    pub fn constructor(declaring_type: Type, parameters: Vec<(&str, Type)>) -> Self {
        let ty = declaring_type.clone();
        Self::build(declaring_type, ".ctor", MemberKind::Constructor, false, parameters, ty)
    }

    /// Indexer getter
    pub fn indexer(declaring_type: Type, parameters: Vec<(&str, Type)>, ty: Type) -> Self {
        Self::build(declaring_type, "Item", MemberKind::Indexer, false, parameters, ty)
    }

    fn build(
        declaring_type: Type,
        name: impl Into<String>,
        kind: MemberKind,
        is_static: bool,
        parameters: Vec<(&str, Type)>,
        ty: Type,
    ) -> Self {
        Self::new(MemberInfo {
            name: name.into(),
            declaring_type,
            kind,
            is_static,
            parameters: parameters
                .into_iter()
                .map(|(name, ty)| ParameterInfo {
                    name: name.to_string(),
                    ty,
                })
                .collect(),
            ty,
            generic_definition: None,
        })
    }

    /// Same member, recorded as an instantiation of `definition`
    pub fn instantiated_from(&self, definition: Member) -> Member {
        let info = &self.0;
        Member::new(MemberInfo {
            name: info.name.clone(),
            declaring_type: info.declaring_type.clone(),
            kind: info.kind,
            is_static: info.is_static,
            parameters: info.parameters.clone(),
            ty: info.ty.clone(),
            generic_definition: Some(definition),
        })
    }

    /// Member data
    pub fn info(&self) -> &MemberInfo {
        &self.0
    }

    /// Member name
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Result type
    pub fn ty(&self) -> &Type {
        &self.0.ty
    }

    /// Member kind
    pub fn kind(&self) -> MemberKind {
        self.0.kind
    }

    /// Whether the member has no receiver
    pub fn is_static(&self) -> bool {
        self.0.is_static
    }

    /// Declared parameters
    pub fn parameters(&self) -> &[ParameterInfo] {
        &self.0.parameters
    }

    /// Open generic definition, if this is an instantiation
    pub fn generic_definition(&self) -> Option<&Member> {
        self.0.generic_definition.as_ref()
    }

    /// Descriptor of the parameter at `position`
    pub fn parameter(&self, position: usize) -> Option<ParameterRef> {
        (position < self.0.parameters.len()).then(|| ParameterRef {
            member: self.clone(),
            position,
        })
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.0.declaring_type, self.0.name)
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0.declaring_type, self.0.name)
    }
}

/// Parameter descriptor: a member and a parameter position
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterRef {
    /// Declaring member
    pub member: Member,
    /// Zero-based position
    pub position: usize,
}

impl ParameterRef {
    /// Declared parameter data
    pub fn info(&self) -> &ParameterInfo {
        &self.member.parameters()[self.position]
    }

    /// Same position on the generic definition of the declaring member
    pub fn generic_definition(&self) -> Option<ParameterRef> {
        self.member.generic_definition().map(|definition| ParameterRef {
            member: definition.clone(),
            position: self.position,
        })
    }
}
