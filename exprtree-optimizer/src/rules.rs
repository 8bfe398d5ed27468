//! Node-kind rewrite rules
//!
//! Each rule receives a node whose children are already optimized and
//! returns either that same node or an equivalent replacement with the same
//! static type. Operand rules are tried in a fixed order: throw
//! propagation, null dereference prediction, constant folding, then
//! kind-specific simplifications.

mod call;
mod catch;
mod conditional;
mod convert;
mod index;
mod invoke;
mod logical;
mod member;
mod new;
mod new_array;
mod switch;
