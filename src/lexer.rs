//! The stateful cursor and token-reader registry that the grammars in
//! [`crate::tree`] are built on.
//!
//! A `Lexer` owns a byte cursor over the source text and an ordered
//! dictionary of named [`Reader`] functions. Grammars compose the matching
//! primitives (`expect`, `optional`, `next`, `read`) instead of consuming a
//! pre-tokenized stream, which keeps lookahead and backtracking cheap: a
//! speculative attempt snapshots the integer cursor with [`Lexer::index`]
//! and restores it with [`Lexer::seek`] on failure.

use std::sync::Arc;

use crate::error::ParseError;
use crate::token::Token;

/// A token reader: attempts to match one token type at `index` and returns
/// `None` on non-match. Readers never mutate the source or advance any
/// cursor; the lexer parameter supplies the registry for nested reads and
/// the injected environment lookup.
pub type Reader = fn(code: &str, index: usize, lexer: &Lexer) -> Option<Token>;

/// Resolves an environment variable name to its value at parse time.
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// A named registry entry.
#[derive(Clone)]
pub struct Definition {
    pub key: String,
    pub reader: Reader,
}

/// The cursor + registry. Cloning is cheap: the source and the dictionary
/// are shared behind `Arc`, and the dictionary is only copied when a clone
/// registers new definitions (`define` is copy-on-write). Clones are fully
/// independent otherwise — moving a clone's cursor never affects the
/// original.
#[derive(Clone)]
pub struct Lexer {
    code: Arc<str>,
    index: usize,
    dictionary: Arc<Vec<Definition>>,
    env: EnvLookup,
}

impl Default for Lexer {
    fn default() -> Self {
        Self::new()
    }
}

impl Lexer {
    /// An empty lexer reading environment variables from the process
    /// environment. Use the tree `definitions` hooks to populate the
    /// dictionary.
    pub fn new() -> Self {
        Lexer {
            code: Arc::from(""),
            index: 0,
            dictionary: Arc::new(Vec::new()),
            env: Arc::new(|name| std::env::var(name).ok()),
        }
    }

    /// Replaces the default process-environment lookup, so tests and
    /// embedders can supply deterministic environments.
    pub fn with_env(mut self, env: EnvLookup) -> Self {
        self.env = env;
        self
    }

    /// Resolves an `env("NAME")` substitution. Used by the `Environment`
    /// reader.
    pub fn env_lookup(&self, name: &str) -> Option<String> {
        (self.env)(name)
    }

    /// Resets the lexer over new source text at the given offset.
    pub fn load(&mut self, code: &str, start: usize) -> &mut Self {
        self.code = Arc::from(code);
        self.index = start;
        self
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// The current cursor position (a byte offset).
    pub fn index(&self) -> usize {
        self.index
    }

    /// Moves the cursor. Grammars use this to roll back speculative parses.
    pub fn seek(&mut self, index: usize) {
        self.index = index;
    }

    /// Registers or overwrites a definition; the last `define` for a key
    /// wins. Calling this on a clone never affects the lexer it was cloned
    /// from.
    pub fn define(&mut self, key: &str, reader: Reader) {
        let dictionary = Arc::make_mut(&mut self.dictionary);
        if let Some(existing) = dictionary.iter_mut().find(|d| d.key == key) {
            existing.reader = reader;
        } else {
            dictionary.push(Definition {
                key: key.to_string(),
                reader,
            });
        }
    }

    pub fn get(&self, key: &str) -> Option<&Definition> {
        self.dictionary.iter().find(|d| d.key == key)
    }

    /// Tries each named key in order (or every registered definition when
    /// `keys` is `None`) at `start`, returning the first match. Naming a
    /// key that was never registered is a caller bug and fails with
    /// `UnknownDefinition`.
    pub fn match_at(
        &self,
        start: usize,
        keys: Option<&[&str]>,
    ) -> Result<Option<Token>, ParseError> {
        match keys {
            Some(keys) => {
                for key in keys {
                    let definition =
                        self.get(key)
                            .ok_or_else(|| ParseError::UnknownDefinition {
                                key: (*key).to_string(),
                            })?;
                    if let Some(token) = (definition.reader)(&self.code, start, self) {
                        return Ok(Some(token));
                    }
                }
                Ok(None)
            }
            None => {
                for definition in self.dictionary.iter() {
                    if let Some(token) = (definition.reader)(&self.code, start, self) {
                        return Ok(Some(token));
                    }
                }
                Ok(None)
            }
        }
    }

    /// Pure lookahead: does any of `keys` match at the cursor?
    pub fn next(&self, keys: &[&str]) -> Result<bool, ParseError> {
        Ok(self.match_at(self.index, Some(keys))?.is_some())
    }

    /// Matches and advances, or leaves the cursor untouched and returns
    /// `Ok(None)`. Only errs on an unregistered key.
    pub fn optional(&mut self, keys: &[&str]) -> Result<Option<Token>, ParseError> {
        match self.match_at(self.index, Some(keys))? {
            Some(token) => {
                self.index = token.end;
                Ok(Some(token))
            }
            None => Ok(None),
        }
    }

    /// Matches and advances, or fails with an `UnexpectedToken` /
    /// `UnexpectedEof` naming the expected keys. The workhorse for
    /// mandatory tokens.
    pub fn expect(&mut self, keys: &[&str]) -> Result<Token, ParseError> {
        if let Some(token) = self.match_at(self.index, Some(keys))? {
            self.index = token.end;
            return Ok(token);
        }
        let expected = keys.join(", ");
        if self.index >= self.code.len() {
            log::trace!("expect({expected}) failed at end of input");
            return Err(ParseError::UnexpectedEof {
                expected,
                span: (self.index, 0).into(),
            });
        }
        let mut found = self.substring(self.index, self.next_space()).to_string();
        if found.is_empty() {
            // cursor sits on whitespace; show the single character instead
            found = self.code[self.index..].chars().take(1).collect();
        }
        log::trace!("expect({expected}) failed at {}: found {found:?}", self.index);
        let span = (self.index, found.len()).into();
        Err(ParseError::UnexpectedToken {
            found,
            expected,
            span,
        })
    }

    /// Tries every registered definition at the cursor and advances past
    /// the first match. Generic "whatever comes next" probing.
    pub fn read(&mut self) -> Option<Token> {
        match self.match_at(self.index, None) {
            Ok(Some(token)) => {
                self.index = token.end;
                Some(token)
            }
            _ => None,
        }
    }

    /// A clamped slice of the source; `start == end` yields `""`.
    pub fn substring(&self, start: usize, end: usize) -> &str {
        let len = self.code.len();
        let start = start.min(len);
        let end = end.min(len).max(start);
        self.code.get(start..end).unwrap_or("")
    }

    /// The offset of the next whitespace character at or after the cursor,
    /// or the input length if there is none. Used to build readable error
    /// snippets.
    pub fn next_space(&self) -> usize {
        self.code[self.index..]
            .char_indices()
            .find(|(_, c)| c.is_whitespace())
            .map(|(i, _)| self.index + i)
            .unwrap_or(self.code.len())
    }
}
