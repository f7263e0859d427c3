//! Compiles parsed declarations into the normalized [`SchemaConfig`].
//!
//! All functions are stateless. The raw pass ([`schema`]) keeps identifier
//! references as `"${Name}"` placeholders so configs from several files can
//! be merged before resolution; the finalizing pass ([`finalize`]) resolves
//! every reference against the declarations of the same program and drops
//! the `prop` and `use` sections from the output.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::ast::{AttributeDecl, Declaration, EnumDecl, Program, TypeDecl};
use crate::error::ParseError;
use crate::schema::{Column, SchemaConfig, TypeConfig};
use crate::token::{Token, TokenKind};

/// Resolved values keyed by declared name, built during the finalize pass.
type Refs = BTreeMap<String, Value>;

/// Compiles a data-expression token into a plain JSON value. Identifier
/// references become `"${Name}"` placeholders.
pub fn data(token: &Token) -> Result<Value, ParseError> {
    compile_data(token, None)
}

/// Compiles an `Object` token into a JSON map; duplicate keys keep the
/// last written value.
pub fn object(token: &Token) -> Result<serde_json::Map<String, Value>, ParseError> {
    match &token.kind {
        TokenKind::Object { properties } => compile_object(properties, None),
        _ => Err(ParseError::InvalidDeclaration { expected: "Object" }),
    }
}

/// Compiles an `Array` token into a JSON vector.
pub fn array(token: &Token) -> Result<Vec<Value>, ParseError> {
    match &token.kind {
        TokenKind::Array { elements } => compile_array(elements, None),
        _ => Err(ParseError::InvalidDeclaration { expected: "Array" }),
    }
}

fn compile_data(token: &Token, refs: Option<&Refs>) -> Result<Value, ParseError> {
    match &token.kind {
        TokenKind::Literal { value, .. } => Ok(value.to_json()),
        TokenKind::Identifier { name } => match refs {
            None => Ok(Value::String(format!("${{{name}}}"))),
            Some(refs) => {
                refs.get(name)
                    .cloned()
                    .ok_or_else(|| ParseError::UnknownReference {
                        name: name.clone(),
                        span: (token.start, token.end - token.start).into(),
                    })
            }
        },
        TokenKind::Object { properties } => {
            Ok(Value::Object(compile_object(properties, refs)?))
        }
        TokenKind::Array { elements } => Ok(Value::Array(compile_array(elements, refs)?)),
        TokenKind::Mark { .. } => Err(ParseError::InvalidDeclaration {
            expected: "data expression",
        }),
    }
}

fn compile_object(
    properties: &[crate::token::Property],
    refs: Option<&Refs>,
) -> Result<serde_json::Map<String, Value>, ParseError> {
    let mut object = serde_json::Map::new();
    for property in properties {
        // last write wins on duplicate keys
        object.insert(property.key.name.clone(), compile_data(&property.value, refs)?);
    }
    Ok(object)
}

fn compile_array(elements: &[Token], refs: Option<&Refs>) -> Result<Vec<Value>, ParseError> {
    elements
        .iter()
        .map(|element| compile_data(element, refs))
        .collect()
}

/// Folds attributes into a map: a bare `@attr` compiles to `true`, one
/// argument to that value, several arguments to an array. Repeated names
/// keep the last written value.
fn compile_attributes(
    attributes: &[AttributeDecl],
    refs: Option<&Refs>,
) -> Result<BTreeMap<String, Value>, ParseError> {
    let mut map = BTreeMap::new();
    for attribute in attributes {
        let value = match attribute.args.as_slice() {
            [] => Value::Bool(true),
            [arg] => compile_data(arg, refs)?,
            args => Value::Array(
                args.iter()
                    .map(|arg| compile_data(arg, refs))
                    .collect::<Result<_, _>>()?,
            ),
        };
        map.insert(attribute.name.clone(), value);
    }
    Ok(map)
}

fn compile_variants(decl: &EnumDecl) -> Result<BTreeMap<String, Value>, ParseError> {
    let mut variants = BTreeMap::new();
    for variant in &decl.variants {
        variants.insert(variant.name.name.clone(), compile_data(&variant.value, None)?);
    }
    Ok(variants)
}

fn compile_type(decl: &TypeDecl, refs: Option<&Refs>) -> Result<TypeConfig, ParseError> {
    Ok(TypeConfig {
        name: decl.name.name.clone(),
        mutable: decl.mutable,
        attributes: compile_attributes(&decl.attributes, refs)?,
        columns: decl
            .columns
            .iter()
            .map(|column| {
                Ok(Column {
                    r#type: column.type_name.name.clone(),
                    name: column.name.name.clone(),
                    required: column.required,
                    multiple: column.multiple,
                    attributes: compile_attributes(&column.attributes, refs)?,
                })
            })
            .collect::<Result<_, ParseError>>()?,
    })
}

/// Compiles a single enum declaration to `(name, variants)`.
pub fn enum_declaration(
    declaration: &Declaration,
) -> Result<(String, BTreeMap<String, Value>), ParseError> {
    match declaration {
        Declaration::Enum(decl) => Ok((decl.name.name.clone(), compile_variants(decl)?)),
        _ => Err(ParseError::InvalidDeclaration { expected: "Enum" }),
    }
}

/// Compiles a single type declaration, references kept as placeholders.
pub fn type_declaration(declaration: &Declaration) -> Result<TypeConfig, ParseError> {
    match declaration {
        Declaration::Type(decl) => compile_type(decl, None),
        _ => Err(ParseError::InvalidDeclaration { expected: "Type" }),
    }
}

/// Compiles a single model declaration, references kept as placeholders.
pub fn model_declaration(declaration: &Declaration) -> Result<TypeConfig, ParseError> {
    match declaration {
        Declaration::Model(decl) => compile_type(&decl.0, None),
        _ => Err(ParseError::InvalidDeclaration { expected: "Model" }),
    }
}

/// Compiles a single prop declaration to `(name, config)`.
pub fn prop_declaration(declaration: &Declaration) -> Result<(String, Value), ParseError> {
    match declaration {
        Declaration::Prop(decl) => {
            Ok((decl.name.name.clone(), compile_data(&decl.value, None)?))
        }
        _ => Err(ParseError::InvalidDeclaration { expected: "Prop" }),
    }
}

/// Compiles a single plugin declaration to `(path, config)`.
pub fn plugin_declaration(declaration: &Declaration) -> Result<(String, Value), ParseError> {
    match declaration {
        Declaration::Plugin(decl) => {
            Ok((decl.path.value.clone(), compile_data(&decl.value, None)?))
        }
        _ => Err(ParseError::InvalidDeclaration { expected: "Plugin" }),
    }
}

/// Extracts the path of a use declaration.
pub fn use_declaration(declaration: &Declaration) -> Result<String, ParseError> {
    match declaration {
        Declaration::Use(decl) => Ok(decl.path.value.clone()),
        _ => Err(ParseError::InvalidDeclaration { expected: "Use" }),
    }
}

/// Compiles a program into the merge-ready config: references stay as
/// `"${Name}"` placeholders and every section is kept.
pub fn schema(program: &Program) -> Result<SchemaConfig, ParseError> {
    build(program, false)
}

/// Compiles a program into the final config: identifier references must
/// resolve to a declared prop, enum, type or model and are inlined; the
/// `prop` and `use` sections are dropped from the output.
pub fn finalize(program: &Program) -> Result<SchemaConfig, ParseError> {
    build(program, true)
}

fn build(program: &Program, resolve: bool) -> Result<SchemaConfig, ParseError> {
    log::debug!(
        "compiling {} declarations (resolve: {resolve})",
        program.body.len()
    );
    let mut refs: Refs = BTreeMap::new();
    if resolve {
        // props and enums are referenceable regardless of declaration
        // order; types and models only once compiled below
        for declaration in &program.body {
            match declaration {
                Declaration::Prop(decl) => {
                    refs.insert(decl.name.name.clone(), compile_data(&decl.value, None)?);
                }
                Declaration::Enum(decl) => {
                    refs.insert(
                        decl.name.name.clone(),
                        Value::Object(compile_variants(decl)?.into_iter().collect()),
                    );
                }
                _ => {}
            }
        }
    }

    let mut config = SchemaConfig::default();
    for declaration in &program.body {
        let name = declaration.name().to_string();
        let (start, end) = declaration.name_span();
        let duplicate = || ParseError::Duplicate {
            name: name.clone(),
            span: (start, end - start).into(),
        };
        let attribute_refs = resolve.then_some(&refs);
        match declaration {
            Declaration::Enum(decl) => {
                let section = config.r#enum.get_or_insert_with(BTreeMap::new);
                if section.contains_key(&name) {
                    return Err(duplicate());
                }
                section.insert(name, compile_variants(decl)?);
            }
            Declaration::Type(decl) => {
                let compiled = compile_type(decl, attribute_refs)?;
                let section = config.r#type.get_or_insert_with(BTreeMap::new);
                if section.contains_key(&name) {
                    return Err(duplicate());
                }
                if resolve {
                    refs.insert(name.clone(), serde_json::json!(&compiled));
                }
                section.insert(name, compiled);
            }
            Declaration::Model(decl) => {
                let compiled = compile_type(&decl.0, attribute_refs)?;
                let section = config.model.get_or_insert_with(BTreeMap::new);
                if section.contains_key(&name) {
                    return Err(duplicate());
                }
                if resolve {
                    refs.insert(name.clone(), serde_json::json!(&compiled));
                }
                section.insert(name, compiled);
            }
            Declaration::Prop(decl) => {
                let section = config.prop.get_or_insert_with(BTreeMap::new);
                if section.contains_key(&name) {
                    return Err(duplicate());
                }
                section.insert(name, compile_data(&decl.value, None)?);
            }
            Declaration::Plugin(decl) => {
                let section = config.plugin.get_or_insert_with(BTreeMap::new);
                if section.contains_key(&name) {
                    return Err(duplicate());
                }
                section.insert(name, compile_data(&decl.value, None)?);
            }
            Declaration::Use(decl) => {
                config
                    .r#use
                    .get_or_insert_with(Vec::new)
                    .push(decl.path.value.clone());
            }
        }
    }

    if resolve {
        config.prop = None;
        config.r#use = None;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions;
    use crate::lexer::Lexer;
    use crate::tree::{EnumTree, SchemaTree};
    use serde_json::json;

    fn data_token(code: &str) -> Token {
        let mut lexer = Lexer::new();
        definitions::register(&mut lexer);
        lexer.load(code, 0);
        lexer.expect(definitions::DATA).unwrap()
    }

    #[test]
    fn test_object_compilation() {
        let token = data_token(r#"{ foo "bar" bar 4.4 }"#);
        let compiled = object(&token).unwrap();
        assert_eq!(Value::Object(compiled), json!({ "foo": "bar", "bar": 4.4 }));
    }

    #[test]
    fn test_object_last_write_wins() {
        let token = data_token(r#"{ key "first" key "second" }"#);
        let compiled = object(&token).unwrap();
        assert_eq!(compiled.get("key"), Some(&json!("second")));
        assert_eq!(compiled.len(), 1);
    }

    #[test]
    fn test_nested_structure_preserved() {
        let token = data_token(r#"{ list [1 2 [3]] deep { inner { ok true } } }"#);
        let compiled = data(&token).unwrap();
        assert_eq!(
            compiled,
            json!({ "list": [1, 2, [3]], "deep": { "inner": { "ok": true } } })
        );
    }

    #[test]
    fn test_invalid_entry_points() {
        let token = data_token("42");
        assert_eq!(
            object(&token).unwrap_err().to_string(),
            "Invalid Object"
        );
        assert_eq!(array(&token).unwrap_err().to_string(), "Invalid Array");

        let program = SchemaTree::parse(r#"use "./a.idea""#).unwrap();
        let err = enum_declaration(&program.body[0]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid Enum");
    }

    #[test]
    fn test_enum_compilation() {
        let decl = EnumTree::parse(r#"enum Status { ACTIVE "Active" }"#).unwrap();
        let (name, variants) =
            enum_declaration(&Declaration::Enum(decl)).unwrap();
        assert_eq!(name, "Status");
        assert_eq!(variants, BTreeMap::from([("ACTIVE".to_string(), json!("Active"))]));
    }

    #[test]
    fn test_duplicate_enum_rejected() {
        let program =
            SchemaTree::parse(r#"enum Status {A "a"} enum Status {B "b"}"#).unwrap();
        let err = finalize(&program).unwrap_err();
        assert_eq!(err.to_string(), "Duplicate Status");
        // the raw pass rejects the collision too
        assert_eq!(schema(&program).unwrap_err().to_string(), "Duplicate Status");
    }

    #[test]
    fn test_attribute_folding() {
        let code = r#"model User @label("User" "Users") { id String @id @min(4) @max(4) @min(1) }"#;
        let program = SchemaTree::parse(code).unwrap();
        let config = schema(&program).unwrap();
        let models = config.model.unwrap();
        let user = &models["User"];
        assert_eq!(user.attributes["label"], json!(["User", "Users"]));
        let attributes = &user.columns[0].attributes;
        assert_eq!(attributes["id"], json!(true));
        assert_eq!(attributes["max"], json!(4));
        // repeated names keep the last written value
        assert_eq!(attributes["min"], json!(1));
    }

    #[test]
    fn test_raw_pass_keeps_placeholders() {
        let code = r#"model User { name String @field.input(Text) }"#;
        let config = schema(&SchemaTree::parse(code).unwrap()).unwrap();
        let models = config.model.unwrap();
        let column = &models["User"].columns[0];
        assert_eq!(column.attributes["field.input"], json!("${Text}"));
    }

    #[test]
    fn test_finalize_resolves_references() {
        let code = r#"
prop Text { type "text" }
model User {
  name String @field.input(Text)
}
"#;
        let config = finalize(&SchemaTree::parse(code).unwrap()).unwrap();
        assert!(config.prop.is_none());
        let models = config.model.unwrap();
        let column = &models["User"].columns[0];
        assert_eq!(column.attributes["field.input"], json!({ "type": "text" }));
    }

    #[test]
    fn test_finalize_resolves_enum_references() {
        let code = r#"
enum Roles { ADMIN "Admin" }
model User {
  role String @options(Roles)
}
"#;
        let config = finalize(&SchemaTree::parse(code).unwrap()).unwrap();
        let models = config.model.unwrap();
        let column = &models["User"].columns[0];
        assert_eq!(column.attributes["options"], json!({ "ADMIN": "Admin" }));
    }

    #[test]
    fn test_finalize_unknown_reference() {
        let code = r#"model User { name String @field.input(Missing) }"#;
        let err = finalize(&SchemaTree::parse(code).unwrap()).unwrap_err();
        assert_eq!(err.to_string(), "Unknown reference Missing");
        let (start, end) = err.offsets().unwrap();
        assert_eq!(&code[start..end], "Missing");
    }

    #[test]
    fn test_finalize_drops_prop_and_use() {
        let code = r#"
use "./other.idea"
prop Text { type "text" }
enum Roles { ADMIN "Admin" }
"#;
        let program = SchemaTree::parse(code).unwrap();
        let raw = schema(&program).unwrap();
        assert_eq!(raw.r#use, Some(vec!["./other.idea".to_string()]));
        assert!(raw.prop.is_some());

        let finalized = finalize(&program).unwrap();
        assert!(finalized.r#use.is_none());
        assert!(finalized.prop.is_none());
        assert!(finalized.r#enum.is_some());
    }
}
