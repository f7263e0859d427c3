//! Declaration nodes produced by the tree grammars in [`crate::tree`] and
//! consumed by [`crate::compiler`].
//!
//! Every node carries its half-open byte span so errors raised during
//! compilation can point back into the source text.

use crate::token::{Ident, Token};

/// A whole parsed schema: the ordered top-level declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub body: Vec<Declaration>,
    pub start: usize,
    pub end: usize,
}

/// One top-level declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Enum(EnumDecl),
    Type(TypeDecl),
    Model(ModelDecl),
    Prop(PropDecl),
    Plugin(PluginDecl),
    Use(UseDecl),
}

impl Declaration {
    /// The declared name, as written in the source. `use` declarations are
    /// keyed by their path.
    pub fn name(&self) -> &str {
        match self {
            Declaration::Enum(decl) => &decl.name.name,
            Declaration::Type(decl) => &decl.name.name,
            Declaration::Model(decl) => &decl.0.name.name,
            Declaration::Prop(decl) => &decl.name.name,
            Declaration::Plugin(decl) => &decl.path.value,
            Declaration::Use(decl) => &decl.path.value,
        }
    }

    /// The span of the declared name itself, for pinpoint error labels.
    pub fn name_span(&self) -> (usize, usize) {
        match self {
            Declaration::Enum(decl) => (decl.name.start, decl.name.end),
            Declaration::Type(decl) => (decl.name.start, decl.name.end),
            Declaration::Model(decl) => (decl.0.name.start, decl.0.name.end),
            Declaration::Prop(decl) => (decl.name.start, decl.name.end),
            Declaration::Plugin(decl) => (decl.path.start, decl.path.end),
            Declaration::Use(decl) => (decl.path.start, decl.path.end),
        }
    }

    pub fn span(&self) -> (usize, usize) {
        match self {
            Declaration::Enum(decl) => (decl.start, decl.end),
            Declaration::Type(decl) => (decl.start, decl.end),
            Declaration::Model(decl) => (decl.0.start, decl.0.end),
            Declaration::Prop(decl) => (decl.start, decl.end),
            Declaration::Plugin(decl) => (decl.start, decl.end),
            Declaration::Use(decl) => (decl.start, decl.end),
        }
    }
}

/// `enum Name { KEY "Value" ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub name: Ident,
    pub variants: Vec<VariantDecl>,
    pub start: usize,
    pub end: usize,
}

/// One `KEY "Value"` entry inside an enum body.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantDecl {
    pub name: Ident,
    pub value: Token,
    pub start: usize,
    pub end: usize,
}

/// `type Name! @attr(...) { columns }` — also the payload of a model,
/// which shares the exact same surface.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    pub name: Ident,
    /// `true` unless the declaration carries a trailing `!`.
    pub mutable: bool,
    pub attributes: Vec<AttributeDecl>,
    pub columns: Vec<ColumnDecl>,
    pub start: usize,
    pub end: usize,
}

/// `model Name! @attr(...) { columns }`
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDecl(pub TypeDecl);

/// One `name Type[]? @attr(...)` column inside a type or model body.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDecl {
    pub name: Ident,
    pub type_name: Ident,
    /// `false` when the column carries a trailing `?`.
    pub required: bool,
    /// `true` when the column type carries `[]`.
    pub multiple: bool,
    pub attributes: Vec<AttributeDecl>,
    pub start: usize,
    pub end: usize,
}

/// `@name(arg ...)` on a declaration or column. The name is stored without
/// the leading `@`, dots preserved (`field.input`).
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDecl {
    pub name: String,
    pub args: Vec<Token>,
    pub start: usize,
    pub end: usize,
}

/// `prop Name { config }`
#[derive(Debug, Clone, PartialEq)]
pub struct PropDecl {
    pub name: Ident,
    /// Always an `Object` token.
    pub value: Token,
    pub start: usize,
    pub end: usize,
}

/// A quoted path with its span, used by plugin and use declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct PathLit {
    pub value: String,
    pub start: usize,
    pub end: usize,
}

/// `plugin "path" { config }`
#[derive(Debug, Clone, PartialEq)]
pub struct PluginDecl {
    pub path: PathLit,
    /// Always an `Object` token.
    pub value: Token,
    pub start: usize,
    pub end: usize,
}

/// `use "path"`
#[derive(Debug, Clone, PartialEq)]
pub struct UseDecl {
    pub path: PathLit,
    pub start: usize,
    pub end: usize,
}
