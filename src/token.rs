//! Token shapes produced by the reader functions in [`crate::definitions`].
//!
//! Every token carries a half-open byte range `start..end` into the source
//! text, so `code[start..end]` always reproduces the matched text.

use serde_json::Value;

/// A scalar literal value recognized by the scalar readers.
#[derive(Debug, Clone, PartialEq)]
pub enum Lit {
    /// The `null` keyword.
    Null,
    /// `true` or `false`.
    Bool(bool),
    /// A floating point literal such as `4.4` or `-1.5`.
    Float(f64),
    /// An integer literal such as `42` or `-10`.
    Integer(i64),
    /// A double-quoted string literal, stored without the quotes.
    String(String),
}

impl Lit {
    /// Converts the literal into a plain JSON value for the compiler.
    pub fn to_json(&self) -> Value {
        match self {
            Lit::Null => Value::Null,
            Lit::Bool(b) => Value::Bool(*b),
            Lit::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Lit::Integer(i) => Value::Number((*i).into()),
            Lit::String(s) => Value::String(s.clone()),
        }
    }
}

/// An identifier with its position, used both as a standalone token payload
/// and as an object-property key.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub start: usize,
    pub end: usize,
}

/// A `key value` pair inside an object expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub key: Ident,
    pub value: Token,
    pub start: usize,
    pub end: usize,
}

/// The payload of a [`Token`], discriminated by shape.
///
/// `Mark` covers the structural tokens (whitespace, comments, punctuation,
/// keywords) that drive the grammar but never appear in compiled output;
/// their `tag` mirrors the underscore-prefixed names of the original
/// dialect (`_Space`, `_Note`, `_BraceOpen`, ...).
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Literal { value: Lit, raw: String },
    Identifier { name: String },
    Object { properties: Vec<Property> },
    Array { elements: Vec<Token> },
    Mark { tag: &'static str, text: String },
}

/// The smallest unit recognized by a reader, with its byte range.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn literal(value: Lit, raw: impl Into<String>, start: usize, end: usize) -> Self {
        Token {
            kind: TokenKind::Literal {
                value,
                raw: raw.into(),
            },
            start,
            end,
        }
    }

    pub fn identifier(name: impl Into<String>, start: usize, end: usize) -> Self {
        Token {
            kind: TokenKind::Identifier { name: name.into() },
            start,
            end,
        }
    }

    pub fn mark(tag: &'static str, text: impl Into<String>, start: usize, end: usize) -> Self {
        Token {
            kind: TokenKind::Mark {
                tag,
                text: text.into(),
            },
            start,
            end,
        }
    }

    /// The identifier payload, if this token is an identifier.
    pub fn as_identifier(&self) -> Option<Ident> {
        match &self.kind {
            TokenKind::Identifier { name } => Some(Ident {
                name: name.clone(),
                start: self.start,
                end: self.end,
            }),
            _ => None,
        }
    }

    /// The literal payload, if this token is a literal.
    pub fn as_literal(&self) -> Option<&Lit> {
        match &self.kind {
            TokenKind::Literal { value, .. } => Some(value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_to_json() {
        assert_eq!(Lit::Null.to_json(), Value::Null);
        assert_eq!(Lit::Bool(true).to_json(), Value::Bool(true));
        assert_eq!(Lit::Integer(-10).to_json(), serde_json::json!(-10));
        assert_eq!(Lit::Float(4.4).to_json(), serde_json::json!(4.4));
        assert_eq!(
            Lit::String("hello".to_string()).to_json(),
            serde_json::json!("hello")
        );
    }

    #[test]
    fn test_accessors() {
        let token = Token::identifier("User", 6, 10);
        let ident = token.as_identifier().unwrap();
        assert_eq!(ident.name, "User");
        assert_eq!((ident.start, ident.end), (6, 10));
        assert!(token.as_literal().is_none());

        let token = Token::literal(Lit::Integer(42), "42", 0, 2);
        assert_eq!(token.as_literal(), Some(&Lit::Integer(42)));
        assert!(token.as_identifier().is_none());
    }
}
