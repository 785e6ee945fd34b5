//! Expression errors.

/// Errors raised while lexing, parsing or evaluating a formula.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ExpressionError {
    /// A character outside the formula grammar.
    #[error("unexpected character '{ch}' at offset {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    /// A string literal without its closing quote.
    #[error("unterminated string starting at offset {pos}")]
    UnterminatedString { pos: usize },

    /// A token the parser did not expect at this point.
    #[error("unexpected {found} at offset {pos}")]
    UnexpectedToken { found: String, pos: usize },

    /// The formula ended in the middle of an expression.
    #[error("unexpected end of formula")]
    UnexpectedEnd,

    /// An empty formula.
    #[error("empty formula")]
    Empty,

    /// An `@` reference that formula substitution could not fill.
    #[error("unresolved reference '@{0}'")]
    UnresolvedReference(String),

    /// A bare name that is not present in the roll data.
    #[error("unknown variable '{0}'")]
    UnknownVariable(String),

    /// A call to a function outside the supported set.
    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    /// A function called with the wrong number of arguments.
    #[error("function '{function}' expects {expected} argument(s), got {found}")]
    Arity {
        function: String,
        expected: &'static str,
        found: usize,
    },

    /// Nesting or tree depth past the parser's limit.
    #[error("formula nested too deeply at offset {pos}")]
    TooDeep { pos: usize },

    /// Division or modulo by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// An arithmetic operator applied to text that is not a number.
    #[error("operator '{op}' needs numbers, got '{operand}'")]
    NonNumeric { op: &'static str, operand: String },
}
