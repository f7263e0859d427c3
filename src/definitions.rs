//! The named token readers that make up the base `.idea` dialect.
//!
//! Each reader attempts one token type at a byte offset and returns `None`
//! on non-match — failure is a normal outcome here, never an error. The
//! tree grammars register these on a [`Lexer`] (see the `definitions`
//! hooks in [`crate::tree`]) and drive them through `expect`/`optional`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::lexer::Lexer;
use crate::token::{Lit, Property, Token, TokenKind};

/// The scalar literal keys, in match order. `Float` must come before
/// `Integer` so `4.4` is not split at the dot.
pub const SCALAR: &[&str] = &[
    "Null",
    "Boolean",
    "String",
    "Float",
    "Integer",
    "Environment",
];

/// Every data-expression key: scalars plus the composite forms.
pub const DATA: &[&str] = &[
    "Null",
    "Boolean",
    "String",
    "Float",
    "Integer",
    "Environment",
    "Object",
    "Array",
];

/// Registers the full base dialect: structural tokens, scalars, composites
/// and the identifier families. Keyword readers are layered on top by the
/// individual tree grammars.
pub fn register(lexer: &mut Lexer) {
    lexer.define("line", line);
    lexer.define("space", space);
    lexer.define("whitespace", whitespace);
    lexer.define("note", note);
    lexer.define("comment", comment);
    lexer.define(")", paren_close);
    lexer.define("(", paren_open);
    lexer.define("}", brace_close);
    lexer.define("{", brace_open);
    lexer.define("]", square_close);
    lexer.define("[", square_open);
    lexer.define("!", final_mark);
    lexer.define("?", question_mark);
    lexer.define("Null", null);
    lexer.define("Boolean", boolean);
    lexer.define("String", string);
    lexer.define("Float", float);
    lexer.define("Integer", integer);
    lexer.define("Array", array);
    lexer.define("Object", object);
    lexer.define("Environment", environment);
    lexer.define("AnyIdentifier", any_identifier);
    lexer.define("UpperIdentifier", upper_identifier);
    lexer.define("CapitalIdentifier", capital_identifier);
    lexer.define("CamelIdentifier", camel_identifier);
    lexer.define("LowerIdentifier", lower_identifier);
    lexer.define("AttributeIdentifier", attribute_identifier);
}

/// Matches `pattern` anchored at `start` and wraps the text in a
/// structural `Mark` token.
pub fn scan(tag: &'static str, pattern: &Regex, code: &str, start: usize) -> Option<Token> {
    let found = pattern.find(code.get(start..)?)?;
    let end = start + found.end();
    Some(Token::mark(tag, found.as_str(), start, end))
}

/// Like [`scan`] but produces an `Identifier` token.
pub fn identifier(pattern: &Regex, code: &str, start: usize) -> Option<Token> {
    let found = pattern.find(code.get(start..)?)?;
    Some(Token::identifier(found.as_str(), start, start + found.end()))
}

// === Structural readers ===

static LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\n\r]+").unwrap());
static SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ +").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s+").unwrap());
// lazy so a note closes at the first `*/`, even with `//` inside
static NOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)^/\*.*?\*/").unwrap());
static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^//[^\n\r]*").unwrap());

fn line(code: &str, index: usize, _lexer: &Lexer) -> Option<Token> {
    scan("_Line", &LINE, code, index)
}

fn space(code: &str, index: usize, _lexer: &Lexer) -> Option<Token> {
    scan("_Space", &SPACE, code, index)
}

fn whitespace(code: &str, index: usize, _lexer: &Lexer) -> Option<Token> {
    scan("_Whitespace", &WHITESPACE, code, index)
}

fn note(code: &str, index: usize, _lexer: &Lexer) -> Option<Token> {
    scan("_Note", &NOTE, code, index)
}

fn comment(code: &str, index: usize, _lexer: &Lexer) -> Option<Token> {
    scan("_Comment", &COMMENT, code, index)
}

fn punctuation(tag: &'static str, ch: char, code: &str, index: usize) -> Option<Token> {
    if code.get(index..)?.starts_with(ch) {
        Some(Token::mark(tag, ch, index, index + ch.len_utf8()))
    } else {
        None
    }
}

fn paren_open(code: &str, index: usize, _lexer: &Lexer) -> Option<Token> {
    punctuation("_ParenOpen", '(', code, index)
}

fn paren_close(code: &str, index: usize, _lexer: &Lexer) -> Option<Token> {
    punctuation("_ParenClose", ')', code, index)
}

fn brace_open(code: &str, index: usize, _lexer: &Lexer) -> Option<Token> {
    punctuation("_BraceOpen", '{', code, index)
}

fn brace_close(code: &str, index: usize, _lexer: &Lexer) -> Option<Token> {
    punctuation("_BraceClose", '}', code, index)
}

fn square_open(code: &str, index: usize, _lexer: &Lexer) -> Option<Token> {
    punctuation("_SquareOpen", '[', code, index)
}

fn square_close(code: &str, index: usize, _lexer: &Lexer) -> Option<Token> {
    punctuation("_SquareClose", ']', code, index)
}

fn final_mark(code: &str, index: usize, _lexer: &Lexer) -> Option<Token> {
    punctuation("_Final", '!', code, index)
}

fn question_mark(code: &str, index: usize, _lexer: &Lexer) -> Option<Token> {
    punctuation("_Optional", '?', code, index)
}

// === Scalar readers ===

fn null(code: &str, index: usize, _lexer: &Lexer) -> Option<Token> {
    if code.get(index..)?.starts_with("null") {
        Some(Token::literal(Lit::Null, "null", index, index + 4))
    } else {
        None
    }
}

fn boolean(code: &str, index: usize, _lexer: &Lexer) -> Option<Token> {
    let rest = code.get(index..)?;
    if rest.starts_with("true") {
        Some(Token::literal(Lit::Bool(true), "true", index, index + 4))
    } else if rest.starts_with("false") {
        Some(Token::literal(Lit::Bool(false), "false", index, index + 5))
    } else {
        None
    }
}

/// Double-quoted string, read verbatim to the next quote. Escape sequences
/// pass through untouched; an unterminated string is simply a non-match.
fn string(code: &str, index: usize, _lexer: &Lexer) -> Option<Token> {
    let rest = code.get(index..)?;
    if !rest.starts_with('"') {
        return None;
    }
    let close = rest[1..].find('"')? + 1;
    let value = rest[1..close].to_string();
    let end = index + close + 1;
    Some(Token::literal(
        Lit::String(value),
        &rest[..close + 1],
        index,
        end,
    ))
}

static FLOAT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d+\.\d+").unwrap());
static INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d+").unwrap());

fn float(code: &str, index: usize, _lexer: &Lexer) -> Option<Token> {
    let found = FLOAT.find(code.get(index..)?)?;
    let value = found.as_str().parse().ok()?;
    Some(Token::literal(
        Lit::Float(value),
        found.as_str(),
        index,
        index + found.end(),
    ))
}

fn integer(code: &str, index: usize, _lexer: &Lexer) -> Option<Token> {
    let found = INTEGER.find(code.get(index..)?)?;
    let value = found.as_str().parse().ok()?;
    Some(Token::literal(
        Lit::Integer(value),
        found.as_str(),
        index,
        index + found.end(),
    ))
}

/// `env("NAME")`, substituted once at parse time through the lexer's
/// injected lookup. An unset variable substitutes the empty string.
fn environment(code: &str, index: usize, lexer: &Lexer) -> Option<Token> {
    let rest = code.get(index..)?;
    if !rest.starts_with("env(\"") {
        return None;
    }
    let close = rest[5..].find("\")")? + 5;
    let name = &rest[5..close];
    let value = lexer.env_lookup(name).unwrap_or_default();
    let end = index + close + 2;
    Some(Token::literal(
        Lit::String(value),
        &rest[..close + 2],
        index,
        end,
    ))
}

// === Composite readers ===

/// `[ Data* ]`. Parses greedily with a sub-lexer cloned from the caller;
/// any malformed content makes the whole reader a non-match, so no partial
/// token ever escapes.
fn array(code: &str, index: usize, lexer: &Lexer) -> Option<Token> {
    let mut sub = lexer.clone();
    sub.load(code, index);
    let mut elements = Vec::new();
    let result: Result<(), crate::error::ParseError> = (|| {
        sub.expect(&["["])?;
        sub.optional(&["whitespace"])?;
        while sub.next(DATA)? {
            let value = sub.expect(DATA)?;
            sub.optional(&["whitespace"])?;
            elements.push(value);
        }
        sub.expect(&["]"])?;
        Ok(())
    })();
    result.ok()?;
    Some(Token {
        kind: TokenKind::Array { elements },
        start: index,
        end: sub.index(),
    })
}

/// `{ (AnyIdentifier Data)* }`, same full-backtrack contract as [`array`].
fn object(code: &str, index: usize, lexer: &Lexer) -> Option<Token> {
    let mut sub = lexer.clone();
    sub.load(code, index);
    let mut properties = Vec::new();
    let result: Result<(), crate::error::ParseError> = (|| {
        sub.expect(&["{"])?;
        sub.optional(&["whitespace"])?;
        while sub.next(&["AnyIdentifier"])? {
            let key = sub.expect(&["AnyIdentifier"])?;
            sub.expect(&["whitespace"])?;
            let value = sub.expect(DATA)?;
            sub.optional(&["whitespace"])?;
            let key = key
                .as_identifier()
                .ok_or(crate::error::ParseError::InvalidDeclaration {
                    expected: "object key",
                })?;
            properties.push(Property {
                start: key.start,
                end: value.end,
                key,
                value,
            });
        }
        sub.expect(&["}"])?;
        Ok(())
    })();
    result.ok()?;
    Some(Token {
        kind: TokenKind::Object { properties },
        start: index,
        end: sub.index(),
    })
}

// === Identifier families ===

static ANY_IDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*").unwrap());
static UPPER_IDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z_][A-Z0-9_]*").unwrap());
static CAPITAL_IDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z_][a-zA-Z0-9_]*").unwrap());
static CAMEL_IDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z_][a-zA-Z0-9_]*").unwrap());
static LOWER_IDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z_][a-z0-9_]*").unwrap());
static ATTRIBUTE_IDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@[a-z](\.?[a-z0-9_]+)*").unwrap());

fn any_identifier(code: &str, index: usize, _lexer: &Lexer) -> Option<Token> {
    identifier(&ANY_IDENT, code, index)
}

fn upper_identifier(code: &str, index: usize, _lexer: &Lexer) -> Option<Token> {
    identifier(&UPPER_IDENT, code, index)
}

fn capital_identifier(code: &str, index: usize, _lexer: &Lexer) -> Option<Token> {
    identifier(&CAPITAL_IDENT, code, index)
}

fn camel_identifier(code: &str, index: usize, _lexer: &Lexer) -> Option<Token> {
    identifier(&CAMEL_IDENT, code, index)
}

fn lower_identifier(code: &str, index: usize, _lexer: &Lexer) -> Option<Token> {
    identifier(&LOWER_IDENT, code, index)
}

/// `@namespaced.attribute` — the name keeps the leading `@`; the grammar
/// strips it when folding attributes into the config.
fn attribute_identifier(code: &str, index: usize, _lexer: &Lexer) -> Option<Token> {
    identifier(&ATTRIBUTE_IDENT, code, index)
}

// === Keyword readers (layered on by the tree grammars) ===

fn keyword(tag: &'static str, word: &'static str, code: &str, index: usize) -> Option<Token> {
    if code.get(index..)?.starts_with(word) {
        Some(Token::mark(tag, word, index, index + word.len()))
    } else {
        None
    }
}

pub fn enum_word(code: &str, index: usize, _lexer: &Lexer) -> Option<Token> {
    keyword("_EnumWord", "enum", code, index)
}

pub fn type_word(code: &str, index: usize, _lexer: &Lexer) -> Option<Token> {
    keyword("_TypeWord", "type", code, index)
}

pub fn model_word(code: &str, index: usize, _lexer: &Lexer) -> Option<Token> {
    keyword("_ModelWord", "model", code, index)
}

pub fn prop_word(code: &str, index: usize, _lexer: &Lexer) -> Option<Token> {
    keyword("_PropWord", "prop", code, index)
}

pub fn plugin_word(code: &str, index: usize, _lexer: &Lexer) -> Option<Token> {
    keyword("_PluginWord", "plugin", code, index)
}

pub fn use_word(code: &str, index: usize, _lexer: &Lexer) -> Option<Token> {
    keyword("_UseWord", "use", code, index)
}
