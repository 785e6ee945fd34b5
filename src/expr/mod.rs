//! Formula evaluation for change values.
//!
//! Change values may reference roll data (`@attributes.body.value`). The
//! evaluator works in two steps:
//! - `replace_formula_data`: substitute every resolvable `@path` with its value
//! - `Expression`: parse and evaluate what is left
//!
//! ## Design Philosophy
//!
//! The grammar is deliberately small and closed: literals, `+ - * / %`,
//! parentheses, bare-name lookup into roll data, and a handful of math
//! functions. Nothing outside it can run, so authored content can never
//! execute arbitrary code.

mod error;
mod eval;
mod formula;
mod lexer;
mod parser;

pub use error::ExpressionError;
pub use eval::{evaluate, Expression, Scalar};
pub use formula::{replace_formula_data, RollData};
pub use parser::{BinOp, Expr, UnaryOp, MAX_DEPTH};
