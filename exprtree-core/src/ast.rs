//! Immutable, statically typed expression trees
//!
//! Nodes are shared through `Arc` and never mutated. A rewrite that leaves a
//! node alone hands back the same `Arc`, so callers can use
//! [`Expr::ptr_eq`] to tell "unchanged" from "rebuilt".

use crate::member::Member;
use crate::types::Type;
use crate::value::Value;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

#[derive(Debug)]
struct VariableInfo {
    name: String,
    ty: Type,
}

/// Variable bound by a lambda, block or catch clause
///
/// Variables compare by identity: two variables with the same name and type
/// are still different variables.
#[derive(Clone)]
pub struct Variable(Arc<VariableInfo>);

impl Variable {
    /// Create a fresh variable
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self(Arc::new(VariableInfo {
            name: name.into(),
            ty,
        }))
    }

    /// Variable name, for display only
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Declared type
    pub fn ty(&self) -> &Type {
        &self.0.ty
    }

    /// Reference to this variable
    pub fn expr(&self) -> Expr {
        Expr::parameter(self.clone())
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as usize).hash(state);
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.name)
    }
}

#[derive(Debug)]
struct LabelInfo {
    name: String,
    ty: Type,
}

/// Jump target, compared by identity
#[derive(Clone)]
pub struct LabelTarget(Arc<LabelInfo>);

impl LabelTarget {
    /// Create a fresh label
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self(Arc::new(LabelInfo {
            name: name.into(),
            ty,
        }))
    }

    /// Label name
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Type of the value carried by jumps to this label
    pub fn ty(&self) -> &Type {
        &self.0.ty
    }
}

impl PartialEq for LabelTarget {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for LabelTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.name)
    }
}

/// Flavor of a jump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GotoKind {
    /// Plain jump
    Goto,
    /// Return from the enclosing lambda
    Return,
    /// Leave a loop
    Break,
    /// Next loop iteration
    Continue,
}

/// Array construction flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewArrayKind {
    /// One dimensional array from its elements
    Init,
    /// Array of default elements from one size per dimension
    Bounds,
}

/// Type test flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTestMode {
    /// Instance-of test, true for the type and its subtypes
    Is,
    /// Exact runtime type equality
    Equal,
}

/// One arm of a switch
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    /// Values selecting this arm
    pub test_values: Vec<Expr>,
    /// Arm body
    pub body: Expr,
}

impl SwitchCase {
    /// Create a case
    pub fn new(test_values: Vec<Expr>, body: Expr) -> Self {
        Self { test_values, body }
    }
}

/// Catch clause data
#[derive(Debug, PartialEq)]
pub struct CatchNode {
    /// Exception type caught
    pub test: Type,
    /// Variable receiving the exception
    pub variable: Option<Variable>,
    /// Filter deciding whether the clause handles the exception
    pub filter: Option<Expr>,
    /// Handler body
    pub body: Expr,
}

/// Catch clause of a try expression, shared like [`Expr`]
#[derive(Clone)]
pub struct CatchClause(Arc<CatchNode>);

impl CatchClause {
    /// Create a catch clause
    pub fn new(test: Type, variable: Option<Variable>, filter: Option<Expr>, body: Expr) -> Self {
        Self(Arc::new(CatchNode {
            test,
            variable,
            filter,
            body,
        }))
    }

    /// Clause data
    pub fn node(&self) -> &CatchNode {
        &self.0
    }

    /// Exception type caught
    pub fn test(&self) -> &Type {
        &self.0.test
    }

    /// Bound exception variable
    pub fn variable(&self) -> Option<&Variable> {
        self.0.variable.as_ref()
    }

    /// Filter expression
    pub fn filter(&self) -> Option<&Expr> {
        self.0.filter.as_ref()
    }

    /// Handler body
    pub fn body(&self) -> &Expr {
        &self.0.body
    }

    /// Whether both handles refer to the same clause
    pub fn ptr_eq(a: &CatchClause, b: &CatchClause) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// Same clause with a new filter and body, or this clause when both are
    /// the identical nodes
    pub fn with_parts(&self, filter: Option<Expr>, body: Expr) -> CatchClause {
        let same_filter = match (&filter, self.filter()) {
            (None, None) => true,
            (Some(new), Some(old)) => Expr::ptr_eq(new, old),
            _ => false,
        };
        if same_filter && Expr::ptr_eq(&body, self.body()) {
            return self.clone();
        }
        CatchClause::new(self.0.test.clone(), self.0.variable.clone(), filter, body)
    }

    /// Same clause with another bound variable
    pub fn with_variable(&self, variable: Option<Variable>) -> CatchClause {
        CatchClause::new(
            self.0.test.clone(),
            variable,
            self.0.filter.clone(),
            self.0.body.clone(),
        )
    }
}

impl PartialEq for CatchClause {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || *self.0 == *other.0
    }
}

impl fmt::Debug for CatchClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Node kinds
#[derive(Debug, PartialEq)]
pub enum ExprKind {
    /// Literal value
    Constant(Value),
    /// Variable reference
    Parameter(Variable),
    /// Default value of the node type
    Default,
    /// Conversion of the operand to the node type
    Convert {
        /// Converted expression
        operand: Expr,
    },
    /// Method call
    Call {
        /// Receiver, absent for static methods
        receiver: Option<Expr>,
        /// Called method
        method: Member,
        /// Arguments in declaration order
        args: Vec<Expr>,
    },
    /// Property or field read
    MemberAccess {
        /// Receiver, absent for static members
        receiver: Option<Expr>,
        /// Accessed member
        member: Member,
    },
    /// Object construction
    New {
        /// Constructor, absent for value type default construction
        constructor: Option<Member>,
        /// Constructor arguments
        args: Vec<Expr>,
    },
    /// Array construction
    NewArray {
        /// Element type
        element: Type,
        /// Elements or dimension sizes
        kind: NewArrayKind,
        /// Elements for `Init`, sizes for `Bounds`
        items: Vec<Expr>,
    },
    /// Array element or indexer read
    Index {
        /// Indexed object
        receiver: Expr,
        /// Indexer member, absent for arrays
        indexer: Option<Member>,
        /// One index per dimension or indexer parameter
        args: Vec<Expr>,
        /// Whether the node is an assignment target
        lvalue: bool,
    },
    /// Delegate or lambda invocation
    Invoke {
        /// Invoked expression
        callee: Expr,
        /// Arguments
        args: Vec<Expr>,
    },
    /// Function literal
    Lambda {
        /// Bound parameters
        params: Vec<Variable>,
        /// Body
        body: Expr,
    },
    /// Ternary conditional
    Conditional {
        /// Boolean test
        test: Expr,
        /// Value when the test holds
        if_true: Expr,
        /// Value otherwise
        if_false: Expr,
    },
    /// Short-circuiting conjunction
    AndAlso {
        /// Evaluated first
        left: Expr,
        /// Evaluated when `left` is true
        right: Expr,
    },
    /// Short-circuiting disjunction
    OrElse {
        /// Evaluated first
        left: Expr,
        /// Evaluated when `left` is false
        right: Expr,
    },
    /// Multi-way branch
    Switch {
        /// Switched value
        value: Expr,
        /// Equality method, default equality when absent
        comparison: Option<Member>,
        /// Arms in order
        cases: Vec<SwitchCase>,
        /// Body used when no case matches
        default: Option<Expr>,
    },
    /// Runtime type test
    TypeTest {
        /// Tested value
        operand: Expr,
        /// Type tested against
        target: Type,
        /// Instance-of or exact equality
        mode: TypeTestMode,
    },
    /// Exception throw, rethrow when `exception` is absent
    Throw {
        /// Thrown exception
        exception: Option<Expr>,
    },
    /// Sequence with local variables, valued by its last expression
    Block {
        /// Block-scoped variables
        variables: Vec<Variable>,
        /// Expressions in order
        exprs: Vec<Expr>,
    },
    /// Protected region
    Try {
        /// Protected body
        body: Expr,
        /// Catch clauses in order
        handlers: Vec<CatchClause>,
        /// Always runs on exit
        finally: Option<Expr>,
        /// Runs when the body exits with an exception
        fault: Option<Expr>,
    },
    /// Jump
    Goto {
        /// Jump flavor
        kind: GotoKind,
        /// Destination
        target: LabelTarget,
        /// Value carried to the label
        value: Option<Expr>,
    },
}

/// Node data: static type and kind
#[derive(Debug, PartialEq)]
pub struct ExprNode {
    /// Static type of the node
    pub ty: Type,
    /// Node kind and children
    pub kind: ExprKind,
}

/// Shared handle to an immutable expression node
#[derive(Clone)]
pub struct Expr(Arc<ExprNode>);

/// Number of small integers kept as shared constant nodes
const SMALL_INT32_COUNT: i32 = 16;

impl Expr {
    /// Build a node with an explicit static type
    pub fn new(kind: ExprKind, ty: Type) -> Self {
        Self(Arc::new(ExprNode { ty, kind }))
    }

    /// Static type
    pub fn ty(&self) -> &Type {
        &self.0.ty
    }

    /// Node kind
    pub fn kind(&self) -> &ExprKind {
        &self.0.kind
    }

    /// Whether both handles refer to the same node
    pub fn ptr_eq(a: &Expr, b: &Expr) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// Constant value, if this is a constant node
    pub fn as_constant(&self) -> Option<&Value> {
        match self.kind() {
            ExprKind::Constant(value) => Some(value),
            _ => None,
        }
    }

    /// Constant of the given type
    pub fn constant(value: Value, ty: Type) -> Self {
        match (&value, &ty) {
            (Value::Boolean(b), Type::Boolean) => Self::boolean(*b),
            (Value::Int32(i), Type::Int32) => Self::int32(*i),
            _ => Self::new(ExprKind::Constant(value), ty),
        }
    }

    /// Shared boolean constant
    pub fn boolean(value: bool) -> Self {
        static TRUE: OnceLock<Expr> = OnceLock::new();
        static FALSE: OnceLock<Expr> = OnceLock::new();
        let cell = if value { &TRUE } else { &FALSE };
        cell.get_or_init(|| Self::new(ExprKind::Constant(Value::Boolean(value)), Type::Boolean))
            .clone()
    }

    /// Integer constant, shared for small non-negative values
    pub fn int32(value: i32) -> Self {
        static SMALL: OnceLock<Vec<Expr>> = OnceLock::new();
        if (0..SMALL_INT32_COUNT).contains(&value) {
            let small = SMALL.get_or_init(|| {
                (0..SMALL_INT32_COUNT)
                    .map(|i| Self::new(ExprKind::Constant(Value::Int32(i)), Type::Int32))
                    .collect()
            });
            return small[value as usize].clone();
        }
        Self::new(ExprKind::Constant(Value::Int32(value)), Type::Int32)
    }

    /// String constant
    pub fn string(value: impl AsRef<str>) -> Self {
        Self::new(ExprKind::Constant(Value::string(value)), Type::String)
    }

    /// Null constant of a reference or nullable type
    pub fn null(ty: Type) -> Self {
        Self::new(ExprKind::Constant(Value::Null), ty)
    }

    /// Variable reference
    pub fn parameter(variable: Variable) -> Self {
        let ty = variable.ty().clone();
        Self::new(ExprKind::Parameter(variable), ty)
    }

    /// Default value of `ty`
    pub fn default(ty: Type) -> Self {
        Self::new(ExprKind::Default, ty)
    }

    /// Conversion to `ty`
    pub fn convert(operand: Expr, ty: Type) -> Self {
        Self::new(ExprKind::Convert { operand }, ty)
    }

    /// Method call typed by the method's return type
    pub fn call(receiver: Option<Expr>, method: Member, args: Vec<Expr>) -> Self {
        let ty = method.ty().clone();
        Self::new(
            ExprKind::Call {
                receiver,
                method,
                args,
            },
            ty,
        )
    }

    /// Property or field read
    pub fn member(receiver: Option<Expr>, member: Member) -> Self {
        let ty = member.ty().clone();
        Self::new(ExprKind::MemberAccess { receiver, member }, ty)
    }

    /// Construction through a constructor
    pub fn new_object(constructor: Member, args: Vec<Expr>) -> Self {
        let ty = constructor.ty().clone();
        Self::new(
            ExprKind::New {
                constructor: Some(constructor),
                args,
            },
            ty,
        )
    }

    /// Value type construction without a constructor
    pub fn new_value_type(ty: Type) -> Self {
        Self::new(
            ExprKind::New {
                constructor: None,
                args: Vec::new(),
            },
            ty,
        )
    }

    /// One dimensional array from its elements
    pub fn new_array_init(element: Type, items: Vec<Expr>) -> Self {
        let ty = Type::array(element.clone());
        Self::new(
            ExprKind::NewArray {
                element,
                kind: NewArrayKind::Init,
                items,
            },
            ty,
        )
    }

    /// Array of default elements with one size per dimension
    pub fn new_array_bounds(element: Type, bounds: Vec<Expr>) -> Self {
        let ty = Type::Array {
            element: Box::new(element.clone()),
            rank: bounds.len(),
        };
        Self::new(
            ExprKind::NewArray {
                element,
                kind: NewArrayKind::Bounds,
                items: bounds,
            },
            ty,
        )
    }

    /// Array element read
    pub fn array_index(receiver: Expr, indices: Vec<Expr>) -> Self {
        Self::index(receiver, None, indices, false)
    }

    /// Indexed read or assignment target
    pub fn index(receiver: Expr, indexer: Option<Member>, args: Vec<Expr>, lvalue: bool) -> Self {
        let ty = match (&indexer, receiver.ty()) {
            (Some(indexer), _) => indexer.ty().clone(),
            (None, Type::Array { element, .. }) => (**element).clone(),
            (None, _) => Type::Object,
        };
        Self::new(
            ExprKind::Index {
                receiver,
                indexer,
                args,
                lvalue,
            },
            ty,
        )
    }

    /// Invocation typed by the callee's delegate return type
    pub fn invoke(callee: Expr, args: Vec<Expr>) -> Self {
        let ty = match callee.ty() {
            Type::Function { ret, .. } => (**ret).clone(),
            _ => Type::Object,
        };
        Self::new(ExprKind::Invoke { callee, args }, ty)
    }

    /// Function literal
    pub fn lambda(params: Vec<Variable>, body: Expr) -> Self {
        let ty = Type::function(
            params.iter().map(|p| p.ty().clone()).collect(),
            body.ty().clone(),
        );
        Self::new(ExprKind::Lambda { params, body }, ty)
    }

    /// Conditional typed by its true branch
    pub fn conditional(test: Expr, if_true: Expr, if_false: Expr) -> Self {
        let ty = if_true.ty().clone();
        Self::conditional_typed(test, if_true, if_false, ty)
    }

    /// Conditional with an explicit type, `Void` discards branch values
    pub fn conditional_typed(test: Expr, if_true: Expr, if_false: Expr, ty: Type) -> Self {
        Self::new(
            ExprKind::Conditional {
                test,
                if_true,
                if_false,
            },
            ty,
        )
    }

    /// `left && right`
    pub fn and_also(left: Expr, right: Expr) -> Self {
        Self::new(ExprKind::AndAlso { left, right }, Type::Boolean)
    }

    /// `left || right`
    pub fn or_else(left: Expr, right: Expr) -> Self {
        Self::new(ExprKind::OrElse { left, right }, Type::Boolean)
    }

    /// Switch with an explicit result type
    pub fn switch(
        value: Expr,
        comparison: Option<Member>,
        cases: Vec<SwitchCase>,
        default: Option<Expr>,
        ty: Type,
    ) -> Self {
        Self::new(
            ExprKind::Switch {
                value,
                comparison,
                cases,
                default,
            },
            ty,
        )
    }

    /// Instance-of test
    pub fn type_is(operand: Expr, target: Type) -> Self {
        Self::new(
            ExprKind::TypeTest {
                operand,
                target,
                mode: TypeTestMode::Is,
            },
            Type::Boolean,
        )
    }

    /// Exact type equality test
    pub fn type_equal(operand: Expr, target: Type) -> Self {
        Self::new(
            ExprKind::TypeTest {
                operand,
                target,
                mode: TypeTestMode::Equal,
            },
            Type::Boolean,
        )
    }

    /// Throw typed as `ty`
    pub fn throw(exception: Option<Expr>, ty: Type) -> Self {
        Self::new(ExprKind::Throw { exception }, ty)
    }

    /// Throw of a constant exception value
    pub fn throw_value(exception: Value, ty: Type) -> Self {
        let exception_ty = exception.runtime_type().unwrap_or_else(Type::exception);
        Self::throw(Some(Self::constant(exception, exception_ty)), ty)
    }

    /// Block typed by its last expression
    pub fn block(variables: Vec<Variable>, exprs: Vec<Expr>) -> Self {
        let ty = exprs.last().map_or(Type::Void, |e| e.ty().clone());
        Self::block_typed(variables, exprs, ty)
    }

    /// Block with an explicit type
    pub fn block_typed(variables: Vec<Variable>, exprs: Vec<Expr>, ty: Type) -> Self {
        Self::new(ExprKind::Block { variables, exprs }, ty)
    }

    /// Try with catch clauses only
    pub fn try_catch(body: Expr, handlers: Vec<CatchClause>) -> Self {
        Self::try_full(body, handlers, None, None)
    }

    /// Try with every optional part
    pub fn try_full(
        body: Expr,
        handlers: Vec<CatchClause>,
        finally: Option<Expr>,
        fault: Option<Expr>,
    ) -> Self {
        let ty = body.ty().clone();
        Self::new(
            ExprKind::Try {
                body,
                handlers,
                finally,
                fault,
            },
            ty,
        )
    }

    /// Jump typed as `ty`
    pub fn goto(kind: GotoKind, target: LabelTarget, value: Option<Expr>, ty: Type) -> Self {
        Self::new(ExprKind::Goto { kind, target, value }, ty)
    }

    /// Call `f` on each direct child, including catch clause filters and
    /// bodies
    pub fn for_each_child(&self, mut f: impl FnMut(&Expr)) {
        match self.kind() {
            ExprKind::Constant(_) | ExprKind::Parameter(_) | ExprKind::Default => {}
            ExprKind::Convert { operand } => f(operand),
            ExprKind::Call { receiver, args, .. } => {
                receiver.iter().chain(args).for_each(f);
            }
            ExprKind::MemberAccess { receiver, .. } => receiver.iter().for_each(f),
            ExprKind::New { args, .. } => args.iter().for_each(f),
            ExprKind::NewArray { items, .. } => items.iter().for_each(f),
            ExprKind::Index { receiver, args, .. } => {
                std::iter::once(receiver).chain(args).for_each(f);
            }
            ExprKind::Invoke { callee, args } => {
                std::iter::once(callee).chain(args).for_each(f);
            }
            ExprKind::Lambda { body, .. } => f(body),
            ExprKind::Conditional {
                test,
                if_true,
                if_false,
            } => {
                f(test);
                f(if_true);
                f(if_false);
            }
            ExprKind::AndAlso { left, right } | ExprKind::OrElse { left, right } => {
                f(left);
                f(right);
            }
            ExprKind::Switch {
                value,
                cases,
                default,
                ..
            } => {
                f(value);
                for case in cases {
                    case.test_values.iter().for_each(&mut f);
                    f(&case.body);
                }
                default.iter().for_each(f);
            }
            ExprKind::TypeTest { operand, .. } => f(operand),
            ExprKind::Throw { exception } => exception.iter().for_each(f),
            ExprKind::Block { exprs, .. } => exprs.iter().for_each(f),
            ExprKind::Try {
                body,
                handlers,
                finally,
                fault,
            } => {
                f(body);
                for handler in handlers {
                    if let Some(filter) = handler.filter() {
                        f(filter);
                    }
                    f(handler.body());
                }
                finally.iter().chain(fault).for_each(f);
            }
            ExprKind::Goto { value, .. } => value.iter().for_each(f),
        }
    }

    /// Number of nodes in the tree
    pub fn node_count(&self) -> usize {
        let mut count = 1;
        self.for_each_child(|child| count += child.node_count());
        count
    }

    /// Rebuild the node with every direct child replaced by `f(child)`
    ///
    /// Children are visited in [`Expr::for_each_child`] order. When `f`
    /// hands back every child unchanged the node itself is returned.
    pub fn try_map_children<E>(&self, mut f: impl FnMut(&Expr) -> Result<Expr, E>) -> Result<Expr, E> {
        let kind = match self.kind() {
            ExprKind::Constant(_) | ExprKind::Parameter(_) | ExprKind::Default => {
                return Ok(self.clone())
            }
            ExprKind::Convert { operand } => ExprKind::Convert {
                operand: f(operand)?,
            },
            ExprKind::Call {
                receiver,
                method,
                args,
            } => ExprKind::Call {
                receiver: receiver.as_ref().map(&mut f).transpose()?,
                method: method.clone(),
                args: map_all(args, &mut f)?,
            },
            ExprKind::MemberAccess { receiver, member } => ExprKind::MemberAccess {
                receiver: receiver.as_ref().map(&mut f).transpose()?,
                member: member.clone(),
            },
            ExprKind::New { constructor, args } => ExprKind::New {
                constructor: constructor.clone(),
                args: map_all(args, &mut f)?,
            },
            ExprKind::NewArray {
                element,
                kind,
                items,
            } => ExprKind::NewArray {
                element: element.clone(),
                kind: *kind,
                items: map_all(items, &mut f)?,
            },
            ExprKind::Index {
                receiver,
                indexer,
                args,
                lvalue,
            } => ExprKind::Index {
                receiver: f(receiver)?,
                indexer: indexer.clone(),
                args: map_all(args, &mut f)?,
                lvalue: *lvalue,
            },
            ExprKind::Invoke { callee, args } => ExprKind::Invoke {
                callee: f(callee)?,
                args: map_all(args, &mut f)?,
            },
            ExprKind::Lambda { params, body } => ExprKind::Lambda {
                params: params.clone(),
                body: f(body)?,
            },
            ExprKind::Conditional {
                test,
                if_true,
                if_false,
            } => ExprKind::Conditional {
                test: f(test)?,
                if_true: f(if_true)?,
                if_false: f(if_false)?,
            },
            ExprKind::AndAlso { left, right } => ExprKind::AndAlso {
                left: f(left)?,
                right: f(right)?,
            },
            ExprKind::OrElse { left, right } => ExprKind::OrElse {
                left: f(left)?,
                right: f(right)?,
            },
            ExprKind::Switch {
                value,
                comparison,
                cases,
                default,
            } => {
                let value = f(value)?;
                let mut new_cases = Vec::with_capacity(cases.len());
                for case in cases {
                    let test_values = map_all(&case.test_values, &mut f)?;
                    new_cases.push(SwitchCase::new(test_values, f(&case.body)?));
                }
                ExprKind::Switch {
                    value,
                    comparison: comparison.clone(),
                    cases: new_cases,
                    default: default.as_ref().map(&mut f).transpose()?,
                }
            }
            ExprKind::TypeTest {
                operand,
                target,
                mode,
            } => ExprKind::TypeTest {
                operand: f(operand)?,
                target: target.clone(),
                mode: *mode,
            },
            ExprKind::Throw { exception } => ExprKind::Throw {
                exception: exception.as_ref().map(&mut f).transpose()?,
            },
            ExprKind::Block { variables, exprs } => ExprKind::Block {
                variables: variables.clone(),
                exprs: map_all(exprs, &mut f)?,
            },
            ExprKind::Try {
                body,
                handlers,
                finally,
                fault,
            } => {
                let body = f(body)?;
                let mut new_handlers = Vec::with_capacity(handlers.len());
                for handler in handlers {
                    let filter = handler.filter().map(&mut f).transpose()?;
                    let handler_body = f(handler.body())?;
                    new_handlers.push(handler.with_parts(filter, handler_body));
                }
                ExprKind::Try {
                    body,
                    handlers: new_handlers,
                    finally: finally.as_ref().map(&mut f).transpose()?,
                    fault: fault.as_ref().map(&mut f).transpose()?,
                }
            }
            ExprKind::Goto { kind, target, value } => ExprKind::Goto {
                kind: *kind,
                target: target.clone(),
                value: value.as_ref().map(&mut f).transpose()?,
            },
        };

        let rebuilt = Expr::new(kind, self.ty().clone());
        if same_children(self, &rebuilt) {
            Ok(self.clone())
        } else {
            Ok(rebuilt)
        }
    }

    /// Infallible form of [`Expr::try_map_children`]
    pub fn map_children(&self, mut f: impl FnMut(&Expr) -> Expr) -> Expr {
        match self.try_map_children(|child| Ok::<_, std::convert::Infallible>(f(child))) {
            Ok(expr) => expr,
            Err(never) => match never {},
        }
    }
}

fn map_all<E>(exprs: &[Expr], f: &mut impl FnMut(&Expr) -> Result<Expr, E>) -> Result<Vec<Expr>, E> {
    exprs.iter().map(f).collect()
}

/// Whether both nodes have pairwise identical direct children
fn same_children(a: &Expr, b: &Expr) -> bool {
    let mut left = Vec::new();
    a.for_each_child(|child| left.push(child.clone()));
    let mut index = 0;
    let mut same = true;
    b.for_each_child(|child| {
        same &= left.get(index).map_or(false, |l| Expr::ptr_eq(l, child));
        index += 1;
    });
    same && index == left.len()
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        Expr::ptr_eq(self, other) || *self.0 == *other.0
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Expr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ExprKind::Constant(value) => write!(f, "{value}"),
            ExprKind::Parameter(variable) => write!(f, "{}", variable.name()),
            ExprKind::Default => write!(f, "default({})", self.ty()),
            ExprKind::Convert { operand } => write!(f, "({}){operand}", self.ty()),
            ExprKind::Call {
                receiver,
                method,
                args,
            } => {
                match receiver {
                    Some(receiver) => write!(f, "{receiver}.{}(", method.name())?,
                    None => write!(f, "{method}(")?,
                }
                write_list(f, args)?;
                write!(f, ")")
            }
            ExprKind::MemberAccess { receiver, member } => match receiver {
                Some(receiver) => write!(f, "{receiver}.{}", member.name()),
                None => write!(f, "{member}"),
            },
            ExprKind::New { args, .. } => {
                write!(f, "new {}(", self.ty())?;
                write_list(f, args)?;
                write!(f, ")")
            }
            ExprKind::NewArray {
                element,
                kind,
                items,
            } => {
                match kind {
                    NewArrayKind::Init => write!(f, "new {element}[] {{")?,
                    NewArrayKind::Bounds => write!(f, "new {element}[")?,
                }
                write_list(f, items)?;
                match kind {
                    NewArrayKind::Init => write!(f, "}}"),
                    NewArrayKind::Bounds => write!(f, "]"),
                }
            }
            ExprKind::Index { receiver, args, .. } => {
                write!(f, "{receiver}[")?;
                write_list(f, args)?;
                write!(f, "]")
            }
            ExprKind::Invoke { callee, args } => {
                write!(f, "({callee})(")?;
                write_list(f, args)?;
                write!(f, ")")
            }
            ExprKind::Lambda { params, body } => {
                write!(f, "(")?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", param.name())?;
                }
                write!(f, ") => {body}")
            }
            ExprKind::Conditional {
                test,
                if_true,
                if_false,
            } => write!(f, "({test} ? {if_true} : {if_false})"),
            ExprKind::AndAlso { left, right } => write!(f, "({left} && {right})"),
            ExprKind::OrElse { left, right } => write!(f, "({left} || {right})"),
            ExprKind::Switch {
                value,
                cases,
                default,
                ..
            } => {
                write!(f, "switch ({value}) {{")?;
                for case in cases {
                    write!(f, " case ")?;
                    write_list(f, &case.test_values)?;
                    write!(f, ": {};", case.body)?;
                }
                if let Some(default) = default {
                    write!(f, " default: {default};")?;
                }
                write!(f, " }}")
            }
            ExprKind::TypeTest {
                operand,
                target,
                mode,
            } => match mode {
                TypeTestMode::Is => write!(f, "({operand} is {target})"),
                TypeTestMode::Equal => write!(f, "({operand} is exactly {target})"),
            },
            ExprKind::Throw { exception } => match exception {
                Some(exception) => write!(f, "throw {exception}"),
                None => write!(f, "rethrow"),
            },
            ExprKind::Block { exprs, .. } => {
                write!(f, "{{ ")?;
                for expr in exprs {
                    write!(f, "{expr}; ")?;
                }
                write!(f, "}}")
            }
            ExprKind::Try {
                body,
                handlers,
                finally,
                fault,
            } => {
                write!(f, "try {{ {body} }}")?;
                for handler in handlers {
                    write!(f, " catch ({}", handler.test())?;
                    if let Some(variable) = handler.variable() {
                        write!(f, " {}", variable.name())?;
                    }
                    write!(f, ")")?;
                    if let Some(filter) = handler.filter() {
                        write!(f, " when ({filter})")?;
                    }
                    write!(f, " {{ {} }}", handler.body())?;
                }
                if let Some(finally) = finally {
                    write!(f, " finally {{ {finally} }}")?;
                }
                if let Some(fault) = fault {
                    write!(f, " fault {{ {fault} }}")?;
                }
                Ok(())
            }
            ExprKind::Goto { kind, target, value } => {
                let keyword = match kind {
                    GotoKind::Goto => "goto",
                    GotoKind::Return => "return",
                    GotoKind::Break => "break",
                    GotoKind::Continue => "continue",
                };
                write!(f, "{keyword} {}", target.name())?;
                if let Some(value) = value {
                    write!(f, " {value}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
#[path = "ast_tests.rs"]
mod tests;
