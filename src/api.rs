//! The public entry points: parse a whole `.idea` document into a
//! [`SchemaConfig`], in either the merge-ready or the finalized form.

use crate::compiler;
use crate::error::ParseError;
use crate::lexer::{EnvLookup, Lexer};
use crate::schema::SchemaConfig;
use crate::tree::SchemaTree;

/// Parses and compiles a schema into its merge-ready form: identifier
/// references stay as `"${Name}"` placeholders and every section is kept,
/// so configs from several files can be merged before resolution.
///
/// ```
/// let config = idea_core::parse(r#"enum Status { ACTIVE "Active" }"#).unwrap();
/// assert_eq!(
///     config.r#enum.unwrap()["Status"]["ACTIVE"],
///     serde_json::json!("Active")
/// );
/// ```
pub fn parse(code: &str) -> Result<SchemaConfig, ParseError> {
    let program = SchemaTree::parse(code)?;
    compiler::schema(&program)
}

/// Parses, compiles and validates a schema into its final form: duplicate
/// declarations are rejected, identifier references are resolved and
/// inlined, and the `prop` and `use` sections are dropped.
pub fn finalize(code: &str) -> Result<SchemaConfig, ParseError> {
    let program = SchemaTree::parse(code)?;
    compiler::finalize(&program)
}

/// [`parse`] with an injected environment lookup for `env("NAME")`
/// substitutions, instead of the default `std::env::var` read.
pub fn parse_with(code: &str, env: EnvLookup) -> Result<SchemaConfig, ParseError> {
    let mut lexer = Lexer::new().with_env(env);
    let program = SchemaTree::parse_with(&mut lexer, code)?;
    compiler::schema(&program)
}

/// [`finalize`] with an injected environment lookup.
pub fn finalize_with(code: &str, env: EnvLookup) -> Result<SchemaConfig, ParseError> {
    let mut lexer = Lexer::new().with_env(env);
    let program = SchemaTree::parse_with(&mut lexer, code)?;
    compiler::finalize(&program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_parse_keeps_every_section() {
        let code = r#"
use "./other.idea"
prop Text { type "text" }
model User { name String @field.input(Text) }
"#;
        let config = parse(code).unwrap();
        assert!(config.r#use.is_some());
        assert!(config.prop.is_some());
        let models = config.model.unwrap();
        assert_eq!(
            models["User"].columns[0].attributes["field.input"],
            json!("${Text}")
        );
    }

    #[test]
    fn test_finalize_inlines_and_drops() {
        let code = r#"
use "./other.idea"
prop Text { type "text" }
model User { name String @field.input(Text) }
"#;
        let config = finalize(code).unwrap();
        assert!(config.r#use.is_none());
        assert!(config.prop.is_none());
        let models = config.model.unwrap();
        assert_eq!(
            models["User"].columns[0].attributes["field.input"],
            json!({ "type": "text" })
        );
    }

    #[test]
    fn test_finalize_is_deterministic() {
        let code = r#"
enum Roles { ADMIN "Admin" USER "User" }
model User { id String @id role Roles }
"#;
        let first = finalize(code).unwrap();
        let second = finalize(code).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    }

    #[test]
    fn test_injected_environment() {
        let env: EnvLookup =
            Arc::new(|name: &str| (name == "SECRET").then(|| "s3cret".to_string()));
        let code = r#"plugin "./auth" { secret env("SECRET") missing env("OTHER") }"#;
        let config = parse_with(code, env).unwrap();
        let plugins = config.plugin.unwrap();
        assert_eq!(plugins["./auth"]["secret"], json!("s3cret"));
        // unset variables substitute the empty string
        assert_eq!(plugins["./auth"]["missing"], json!(""));
    }
}
