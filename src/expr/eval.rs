//! Formula evaluation.

use serde::{Deserialize, Serialize};

use super::formula::{replace_formula_data, RollData};
use super::parser::{parse, BinOp, Expr, UnaryOp};
use super::ExpressionError;
use crate::core::value::{format_number, is_numeric_text};
use crate::core::Value;

/// Result of evaluating a formula.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
    Bool(bool),
}

impl Scalar {
    /// Render as a change value. Integral numbers have no fractional part.
    #[must_use]
    pub fn to_change_value(&self) -> String {
        match self {
            Scalar::Number(n) => format_number(*n),
            Scalar::Text(s) => s.clone(),
            Scalar::Bool(b) => b.to_string(),
        }
    }

    /// Get as number if this is a Number value.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Truthiness used by condition formulas.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Scalar::Number(n) => *n != 0.0 && !n.is_nan(),
            Scalar::Text(s) => !s.is_empty(),
            Scalar::Bool(b) => *b,
        }
    }

    fn to_number(&self, op: &'static str) -> Result<f64, ExpressionError> {
        match self {
            Scalar::Number(n) => Ok(*n),
            Scalar::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Scalar::Text(s) if is_numeric_text(s) => Ok(s.trim().parse().unwrap_or(0.0)),
            Scalar::Text(s) => Err(ExpressionError::NonNumeric {
                op,
                operand: s.clone(),
            }),
        }
    }
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_change_value())
    }
}

/// A parsed formula, reusable across evaluations.
#[derive(Clone, Debug, PartialEq)]
pub struct Expression {
    root: Expr,
}

impl Expression {
    /// Parse formula text. `@` references are not substituted here.
    pub fn parse(source: &str) -> Result<Self, ExpressionError> {
        Ok(Self {
            root: parse(source)?,
        })
    }

    /// Evaluate against roll data. Bare names are looked up in `data`.
    pub fn eval(&self, data: &RollData<'_>) -> Result<Scalar, ExpressionError> {
        eval_expr(&self.root, data)
    }
}

/// Substitute roll data into `expression` and evaluate the result.
///
/// ```
/// use tabletop_effects::core::Value;
/// use tabletop_effects::expr::{evaluate, RollData, Scalar};
///
/// let data = Value::from(serde_json::json!({ "attributes": { "mind": 3 } }));
/// let result = evaluate("@attributes.mind * 2 + 1", &RollData::new(&data)).unwrap();
///
/// assert_eq!(result, Scalar::Number(7.0));
/// assert_eq!(result.to_change_value(), "7");
/// ```
pub fn evaluate(expression: &str, data: &RollData<'_>) -> Result<Scalar, ExpressionError> {
    let substituted = replace_formula_data(expression, data);
    Expression::parse(&substituted)?.eval(data)
}

fn eval_expr(expr: &Expr, data: &RollData<'_>) -> Result<Scalar, ExpressionError> {
    match expr {
        Expr::Number(n) => Ok(Scalar::Number(*n)),
        Expr::Text(s) => Ok(Scalar::Text(s.clone())),
        Expr::Bool(b) => Ok(Scalar::Bool(*b)),
        Expr::Reference(path) => Err(ExpressionError::UnresolvedReference(path.clone())),
        Expr::Variable(name) => match data.get(name) {
            Some(Value::Number(n)) => Ok(Scalar::Number(*n)),
            Some(Value::Text(s)) => Ok(Scalar::Text(s.clone())),
            Some(Value::Bool(b)) => Ok(Scalar::Bool(*b)),
            _ => Err(ExpressionError::UnknownVariable(name.clone())),
        },
        Expr::Unary { op, expr } => {
            let value = eval_expr(expr, data)?;
            let n = value.to_number(match op {
                UnaryOp::Plus => "+",
                UnaryOp::Neg => "-",
            })?;
            Ok(Scalar::Number(match op {
                UnaryOp::Plus => n,
                UnaryOp::Neg => -n,
            }))
        }
        Expr::Binary { op, lhs, rhs } => {
            let lhs = eval_expr(lhs, data)?;
            let rhs = eval_expr(rhs, data)?;
            eval_binary(*op, lhs, rhs)
        }
        Expr::Call { name, args } => {
            if !FUNCTIONS.contains(&name.strip_prefix("Math.").unwrap_or(name.as_str())) {
                return Err(ExpressionError::UnknownFunction(name.clone()));
            }
            let values = args
                .iter()
                .map(|arg| eval_expr(arg, data)?.to_number("call"))
                .collect::<Result<Vec<_>, _>>()?;
            call_function(name, &values)
        }
    }
}

fn eval_binary(op: BinOp, lhs: Scalar, rhs: Scalar) -> Result<Scalar, ExpressionError> {
    if op == BinOp::Add && (matches!(lhs, Scalar::Text(_)) || matches!(rhs, Scalar::Text(_))) {
        return Ok(Scalar::Text(format!("{lhs}{rhs}")));
    }

    let a = lhs.to_number(op.symbol())?;
    let b = rhs.to_number(op.symbol())?;
    let result = match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div | BinOp::Rem if b == 0.0 => return Err(ExpressionError::DivisionByZero),
        BinOp::Div => a / b,
        BinOp::Rem => a % b,
    };
    Ok(Scalar::Number(result))
}

const FUNCTIONS: [&str; 6] = ["floor", "ceil", "round", "abs", "min", "max"];

fn call_function(name: &str, args: &[f64]) -> Result<Scalar, ExpressionError> {
    let function = name.strip_prefix("Math.").unwrap_or(name);
    let unary = |f: fn(f64) -> f64| match args {
        [x] => Ok(Scalar::Number(f(*x))),
        _ => Err(ExpressionError::Arity {
            function: function.to_string(),
            expected: "1",
            found: args.len(),
        }),
    };

    match function {
        "floor" => unary(f64::floor),
        "ceil" => unary(f64::ceil),
        "round" => unary(|x| (x + 0.5).floor()),
        "abs" => unary(f64::abs),
        "min" | "max" => {
            let pick = if function == "min" { f64::min } else { f64::max };
            args.iter()
                .copied()
                .reduce(pick)
                .map(Scalar::Number)
                .ok_or_else(|| ExpressionError::Arity {
                    function: function.to_string(),
                    expected: "at least 1",
                    found: 0,
                })
        }
        _ => Err(ExpressionError::UnknownFunction(name.to_string())),
    }
}
