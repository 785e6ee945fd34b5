//! Formula parser.
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! expr     := term (('+' | '-') term)*
//! term     := unary (('*' | '/' | '%') unary)*
//! unary    := ('+' | '-') unary | primary
//! primary  := NUMBER | STRING | 'true' | 'false' | '@' PATH
//!           | NAME '(' (expr (',' expr)*)? ')' | NAME | '(' expr ')'
//! ```
//!
//! Both the nesting of signs, parentheses and calls and the depth of the
//! resulting tree are capped at [`MAX_DEPTH`]. Authored formulas never get
//! near it; anything past it is rejected instead of exhausting the stack
//! while parsing, evaluating or dropping the tree.

use serde::{Deserialize, Serialize};

use super::lexer::{tokenize, Token, TokenKind};
use super::ExpressionError;

/// Binary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinOp {
    /// Operator symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
        }
    }
}

/// Unary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Plus,
    Neg,
}

/// Parsed formula syntax tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Number(f64),
    Text(String),
    Bool(bool),
    /// Bare name looked up in roll data.
    Variable(String),
    /// `@path` that substitution left unresolved.
    Reference(String),
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        name: String,
        args: Vec<Expr>,
    },
}

/// Deepest nesting, and deepest syntax tree, a formula may have.
pub const MAX_DEPTH: usize = 128;

/// Parse a formula into a syntax tree.
pub fn parse(source: &str) -> Result<Expr, ExpressionError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        tokens,
        cursor: 0,
        nesting: 0,
    };
    if parser.peek() == &TokenKind::Eof {
        return Err(ExpressionError::Empty);
    }
    let (expr, _) = parser.parse_expr()?;
    match parser.peek() {
        TokenKind::Eof => Ok(expr),
        _ => Err(parser.unexpected()),
    }
}

/// A subtree and its depth.
type Node = (Expr, usize);

struct Parser {
    tokens: Vec<Token>,
    cursor: usize,
    /// Open signs, parentheses and calls around the cursor.
    nesting: usize,
}

impl Parser {
    fn peek(&self) -> &TokenKind {
        // tokenize always terminates with Eof, and the cursor never moves past it
        &self.tokens[self.cursor].kind
    }

    fn advance(&mut self) -> TokenKind {
        let kind = self.tokens[self.cursor].kind.clone();
        if kind != TokenKind::Eof {
            self.cursor += 1;
        }
        kind
    }

    fn unexpected(&self) -> ExpressionError {
        let token = &self.tokens[self.cursor];
        match token.kind {
            TokenKind::Eof => ExpressionError::UnexpectedEnd,
            ref kind => ExpressionError::UnexpectedToken {
                found: kind.describe(),
                pos: token.pos,
            },
        }
    }

    fn pos(&self) -> usize {
        self.tokens[self.cursor].pos
    }

    fn enter(&mut self, pos: usize) -> Result<(), ExpressionError> {
        self.nesting += 1;
        if self.nesting > MAX_DEPTH {
            return Err(ExpressionError::TooDeep { pos });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.nesting -= 1;
    }

    fn deeper(depth: usize, pos: usize) -> Result<usize, ExpressionError> {
        if depth >= MAX_DEPTH {
            return Err(ExpressionError::TooDeep { pos });
        }
        Ok(depth + 1)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), ExpressionError> {
        if self.peek() == &kind {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn parse_expr(&mut self) -> Result<Node, ExpressionError> {
        let (mut lhs, mut depth) = self.parse_term()?;
        loop {
            let op = match self.peek() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => return Ok((lhs, depth)),
            };
            let pos = self.pos();
            self.advance();
            let (rhs, rhs_depth) = self.parse_term()?;
            depth = Self::deeper(depth.max(rhs_depth), pos)?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn parse_term(&mut self) -> Result<Node, ExpressionError> {
        let (mut lhs, mut depth) = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Rem,
                _ => return Ok((lhs, depth)),
            };
            let pos = self.pos();
            self.advance();
            let (rhs, rhs_depth) = self.parse_unary()?;
            depth = Self::deeper(depth.max(rhs_depth), pos)?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn parse_unary(&mut self) -> Result<Node, ExpressionError> {
        let op = match self.peek() {
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Minus => UnaryOp::Neg,
            _ => return self.parse_primary(),
        };
        let pos = self.pos();
        self.advance();
        self.enter(pos)?;
        let (expr, depth) = self.parse_unary()?;
        self.leave();
        Ok((
            Expr::Unary {
                op,
                expr: Box::new(expr),
            },
            Self::deeper(depth, pos)?,
        ))
    }

    fn parse_primary(&mut self) -> Result<Node, ExpressionError> {
        let pos = self.pos();
        match self.peek().clone() {
            TokenKind::Number(n) => {
                self.advance();
                Ok((Expr::Number(n), 1))
            }
            TokenKind::Str(s) => {
                self.advance();
                Ok((Expr::Text(s), 1))
            }
            TokenKind::Reference(path) => {
                self.advance();
                Ok((Expr::Reference(path), 1))
            }
            TokenKind::Ident(name) => {
                self.advance();
                match name.as_str() {
                    "true" => return Ok((Expr::Bool(true), 1)),
                    "false" => return Ok((Expr::Bool(false), 1)),
                    _ => {}
                }
                if self.peek() == &TokenKind::LParen {
                    self.advance();
                    self.enter(pos)?;
                    let (args, depth) = self.parse_args()?;
                    self.leave();
                    Ok((Expr::Call { name, args }, Self::deeper(depth, pos)?))
                } else {
                    Ok((Expr::Variable(name), 1))
                }
            }
            TokenKind::LParen => {
                self.advance();
                self.enter(pos)?;
                let node = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                self.leave();
                Ok(node)
            }
            _ => Err(self.unexpected()),
        }
    }

    /// Call arguments and the depth of the deepest one.
    fn parse_args(&mut self) -> Result<(Vec<Expr>, usize), ExpressionError> {
        let mut args = Vec::new();
        let mut depth = 0;
        if self.peek() == &TokenKind::RParen {
            self.advance();
            return Ok((args, depth));
        }
        loop {
            let (arg, arg_depth) = self.parse_expr()?;
            args.push(arg);
            depth = depth.max(arg_depth);
            match self.advance() {
                TokenKind::Comma => continue,
                TokenKind::RParen => return Ok((args, depth)),
                TokenKind::Eof => return Err(ExpressionError::UnexpectedEnd),
                kind => {
                    return Err(ExpressionError::UnexpectedToken {
                        found: kind.describe(),
                        pos: self.tokens[self.cursor - 1].pos,
                    })
                }
            }
        }
    }
}
