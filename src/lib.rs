pub mod ast;
pub mod compiler;
pub mod dialect;
pub mod error;
pub mod schema;

pub use compiler::SqlExpression;

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::compiler::{EvalHook, Param, SqlExpression};
    pub use crate::dialect::Dialect;
    pub use crate::error::*;
    pub use crate::schema::*;
}
