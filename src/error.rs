use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Every failure the lexer, grammars, and compiler can produce.
///
/// Errors carry byte spans into the source text rather than the text
/// itself; render a full report by attaching the source with
/// `miette::Report::new(err).with_source_code(code.to_string())`.
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum ParseError {
    /// A grammar referenced a token key that was never registered on the
    /// lexer. Always a caller-configuration bug, never data-dependent.
    #[error("Unknown definition {key}")]
    #[diagnostic(
        code(lexer::unknown_definition),
        help("Register the definition on the lexer before using it in a grammar.")
    )]
    UnknownDefinition { key: String },

    /// No registered definition matched at the current position.
    #[error("Unexpected {found} expecting {expected}")]
    #[diagnostic(
        code(parser::unexpected_token),
        help("The parser found text it did not expect in this position.")
    )]
    UnexpectedToken {
        found: String,
        expected: String,
        #[label("expected {expected} here")]
        span: SourceSpan,
    },

    /// The input ended while a token was still required.
    #[error("Unexpected end of input expecting {expected}")]
    #[diagnostic(
        code(parser::unexpected_eof),
        help("The input ended while the parser still expected more tokens.")
    )]
    UnexpectedEof {
        expected: String,
        #[label("input ended here")]
        span: SourceSpan,
    },

    /// An attribute argument names a prop/enum/type/model that was never
    /// declared. Only raised by the finalizing compile pass.
    #[error("Unknown reference {name}")]
    #[diagnostic(
        code(compiler::unknown_reference),
        help("Attribute arguments must reference a declared prop, enum, type or model.")
    )]
    UnknownReference {
        name: String,
        #[label("not declared anywhere in this schema")]
        span: SourceSpan,
    },

    /// Two top-level declarations share a name within one compiled scope.
    #[error("Duplicate {name}")]
    #[diagnostic(code(compiler::duplicate_declaration))]
    Duplicate {
        name: String,
        #[label("already declared")]
        span: SourceSpan,
    },

    /// A compiler entry point was handed the wrong declaration kind.
    #[error("Invalid {expected}")]
    #[diagnostic(code(compiler::invalid_declaration))]
    InvalidDeclaration { expected: &'static str },
}

impl ParseError {
    /// The byte range this error points at, when it has one.
    pub fn offsets(&self) -> Option<(usize, usize)> {
        let span = match self {
            ParseError::UnexpectedToken { span, .. }
            | ParseError::UnexpectedEof { span, .. }
            | ParseError::UnknownReference { span, .. }
            | ParseError::Duplicate { span, .. } => span,
            _ => return None,
        };
        Some((span.offset(), span.offset() + span.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = ParseError::UnknownDefinition {
            key: "unknownKey".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown definition unknownKey");

        let err = ParseError::UnexpectedEof {
            expected: "}".to_string(),
            span: (12, 0).into(),
        };
        assert_eq!(err.to_string(), "Unexpected end of input expecting }");
        assert_eq!(err.offsets(), Some((12, 12)));

        let err = ParseError::Duplicate {
            name: "Status".to_string(),
            span: (20, 6).into(),
        };
        assert_eq!(err.to_string(), "Duplicate Status");
        assert_eq!(err.offsets(), Some((20, 26)));
    }
}
