//! Predicate node tree.
//!
//! The tree is built by the host (an expression-construction layer, a macro,
//! or by hand through the [`Expr`] constructors) and handed to the compiler
//! read-only. Every node kind the compiler understands is a variant of the
//! closed [`Expr`] enum, so adding a kind is a compile-time-checked change.

pub mod expr;
pub mod operators;
pub mod values;

pub use expr::{Expr, InValues, Method, Sql, SqlFunc, SubSelect};
pub use operators::{BinaryOp, UnaryOp};
pub use values::Value;
