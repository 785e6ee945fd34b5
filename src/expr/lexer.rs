//! Formula tokenizer.

use super::ExpressionError;

/// Token kinds of the formula grammar.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Str(String),
    /// Bare name, possibly dotted (`attributes.body.value`, `floor`).
    Ident(String),
    /// `@path` left over after formula substitution.
    Reference(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    LParen,
    RParen,
    Comma,
    Eof,
}

impl TokenKind {
    /// Short description for error messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Number(n) => format!("number {n}"),
            TokenKind::Str(s) => format!("string '{s}'"),
            TokenKind::Ident(name) => format!("name '{name}'"),
            TokenKind::Reference(path) => format!("reference '@{path}'"),
            TokenKind::Plus => "'+'".into(),
            TokenKind::Minus => "'-'".into(),
            TokenKind::Star => "'*'".into(),
            TokenKind::Slash => "'/'".into(),
            TokenKind::Percent => "'%'".into(),
            TokenKind::LParen => "'('".into(),
            TokenKind::RParen => "')'".into(),
            TokenKind::Comma => "','".into(),
            TokenKind::Eof => "end of formula".into(),
        }
    }
}

/// A token with its byte offset in the source.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: usize,
}

/// Characters allowed after `@` in a roll-data reference.
pub(crate) fn is_reference_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-')
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || ch == '$'
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '$' | '.')
}

/// Split a formula into tokens. The last token is always `Eof`.
pub fn tokenize(source: &str) -> Result<Vec<Token>, ExpressionError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        let kind = match ch {
            '+' => single(&mut chars, TokenKind::Plus),
            '-' => single(&mut chars, TokenKind::Minus),
            '*' => single(&mut chars, TokenKind::Star),
            '/' => single(&mut chars, TokenKind::Slash),
            '%' => single(&mut chars, TokenKind::Percent),
            '(' => single(&mut chars, TokenKind::LParen),
            ')' => single(&mut chars, TokenKind::RParen),
            ',' => single(&mut chars, TokenKind::Comma),
            '"' | '\'' => {
                chars.next();
                let mut value = String::new();
                loop {
                    match chars.next() {
                        None => return Err(ExpressionError::UnterminatedString { pos }),
                        Some((_, c)) if c == ch => break,
                        Some((_, '\\')) => match chars.next() {
                            Some((_, escaped)) => value.push(escaped),
                            None => return Err(ExpressionError::UnterminatedString { pos }),
                        },
                        Some((_, c)) => value.push(c),
                    }
                }
                TokenKind::Str(value)
            }
            '@' => {
                chars.next();
                let mut path = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if !is_reference_char(c) {
                        break;
                    }
                    path.push(c);
                    chars.next();
                }
                if path.is_empty() {
                    return Err(ExpressionError::UnexpectedChar { ch, pos });
                }
                TokenKind::Reference(path)
            }
            c if c.is_ascii_digit() || c == '.' => {
                let mut text = String::new();
                while let Some(&(_, d)) = chars.peek() {
                    if !(d.is_ascii_digit() || d == '.') {
                        break;
                    }
                    text.push(d);
                    chars.next();
                }
                let value = text
                    .parse::<f64>()
                    .map_err(|_| ExpressionError::UnexpectedChar { ch: c, pos })?;
                TokenKind::Number(value)
            }
            c if is_ident_start(c) => {
                let mut name = String::new();
                while let Some(&(_, d)) = chars.peek() {
                    if !is_ident_char(d) {
                        break;
                    }
                    name.push(d);
                    chars.next();
                }
                TokenKind::Ident(name)
            }
            other => return Err(ExpressionError::UnexpectedChar { ch: other, pos }),
        };

        tokens.push(Token { kind, pos });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        pos: source.len(),
    });
    Ok(tokens)
}

fn single(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    kind: TokenKind,
) -> TokenKind {
    chars.next();
    kind
}
