//! Recursive-descent grammars, one per declaration kind.
//!
//! Every tree is independently usable (`EnumTree::parse`,
//! `ModelTree::parse`, ...) and registers its own keyword on top of the
//! base dialect through its `definitions` hook; [`SchemaTree`] registers
//! the full union and loops over declarations until end of input.
//!
//! Backtracking is cursor-based: a speculative piece snapshots
//! `lexer.index()` and seeks back on a miss, so no grammar rule ever
//! leaks a failed attempt.

use crate::ast::{
    AttributeDecl, ColumnDecl, Declaration, EnumDecl, ModelDecl, PathLit, PluginDecl, Program,
    PropDecl, TypeDecl, UseDecl, VariantDecl,
};
use crate::definitions::{self, SCALAR};
use crate::error::ParseError;
use crate::lexer::Lexer;
use crate::token::{Ident, Lit};

/// Attribute arguments: any data expression, or a capitalized identifier
/// referencing a declared prop/enum/type/model.
const ARGUMENT: &[&str] = &[
    "Null",
    "Boolean",
    "String",
    "Float",
    "Integer",
    "Environment",
    "Object",
    "Array",
    "CapitalIdentifier",
];

const KEYWORDS: &[&str] = &[
    "EnumWord",
    "TypeWord",
    "ModelWord",
    "PropWord",
    "PluginWord",
    "UseWord",
];

/// The shared grammar machinery the public trees delegate to.
struct TreeParser<'a> {
    lexer: &'a mut Lexer,
}

impl<'a> TreeParser<'a> {
    fn new(lexer: &'a mut Lexer) -> Self {
        TreeParser { lexer }
    }

    /// Skips a run of whitespace, block notes and line comments.
    fn noncode(&mut self) -> Result<(), ParseError> {
        while self
            .lexer
            .optional(&["whitespace", "note", "comment"])?
            .is_some()
        {}
        Ok(())
    }

    fn at_end(&self) -> bool {
        self.lexer.index() >= self.lexer.code().len()
    }

    fn expect_identifier(&mut self, key: &str) -> Result<Ident, ParseError> {
        let token = self.lexer.expect(&[key])?;
        token
            .as_identifier()
            .ok_or(ParseError::InvalidDeclaration { expected: "identifier" })
    }

    /// A quoted path for plugin/use declarations.
    fn expect_path(&mut self) -> Result<PathLit, ParseError> {
        let token = self.lexer.expect(&["String"])?;
        match token.as_literal() {
            Some(Lit::String(value)) => Ok(PathLit {
                value: value.clone(),
                start: token.start,
                end: token.end,
            }),
            _ => Err(ParseError::InvalidDeclaration { expected: "path" }),
        }
    }

    /// `@name` or `@name(arg ...)`. The stored name drops the leading `@`.
    fn attribute(&mut self) -> Result<AttributeDecl, ParseError> {
        let ident = self.expect_identifier("AttributeIdentifier")?;
        let name = ident.name.trim_start_matches('@').to_string();
        let mut end = ident.end;
        let mut args = Vec::new();
        if self.lexer.optional(&["("])?.is_some() {
            self.noncode()?;
            while self.lexer.next(ARGUMENT)? {
                args.push(self.lexer.expect(ARGUMENT)?);
                self.noncode()?;
            }
            end = self.lexer.expect(&[")"])?.end;
        }
        Ok(AttributeDecl {
            name,
            args,
            start: ident.start,
            end,
        })
    }

    /// Zero or more attributes separated by noncode, with full rollback of
    /// any trailing noncode that is not followed by an attribute.
    fn attributes(&mut self) -> Result<Vec<AttributeDecl>, ParseError> {
        let mut attributes = Vec::new();
        loop {
            let snapshot = self.lexer.index();
            self.noncode()?;
            if self.lexer.next(&["AttributeIdentifier"])? {
                attributes.push(self.attribute()?);
            } else {
                self.lexer.seek(snapshot);
                break;
            }
        }
        Ok(attributes)
    }

    /// One `name Type[]? @attr(...)` column.
    fn column(&mut self) -> Result<ColumnDecl, ParseError> {
        let name = self.expect_identifier("CamelIdentifier")?;
        self.lexer.expect(&["whitespace"])?;
        let type_name = self.expect_identifier("CapitalIdentifier")?;
        let multiple = if self.lexer.optional(&["["])?.is_some() {
            self.lexer.expect(&["]"])?;
            true
        } else {
            false
        };
        let required = self.lexer.optional(&["?"])?.is_none();
        let attributes = self.attributes()?;
        let end = attributes
            .last()
            .map(|a| a.end)
            .unwrap_or(self.lexer.index());
        Ok(ColumnDecl {
            start: name.start,
            end,
            name,
            type_name,
            required,
            multiple,
            attributes,
        })
    }

    /// `enum Name { KEY "Value" ... }`
    fn enum_declaration(&mut self) -> Result<EnumDecl, ParseError> {
        let word = self.lexer.expect(&["EnumWord"])?;
        self.lexer.expect(&["whitespace"])?;
        let name = self.expect_identifier("CapitalIdentifier")?;
        self.noncode()?;
        self.lexer.expect(&["{"])?;
        self.noncode()?;
        let mut variants = Vec::new();
        while self.lexer.next(&["UpperIdentifier", "LowerIdentifier"])? {
            let key = self
                .lexer
                .expect(&["UpperIdentifier", "LowerIdentifier"])?
                .as_identifier()
                .ok_or(ParseError::InvalidDeclaration { expected: "identifier" })?;
            self.lexer.expect(&["whitespace"])?;
            let value = self.lexer.expect(SCALAR)?;
            self.noncode()?;
            variants.push(VariantDecl {
                start: key.start,
                end: value.end,
                name: key,
                value,
            });
        }
        let close = self.lexer.expect(&["}"])?;
        Ok(EnumDecl {
            name,
            variants,
            start: word.start,
            end: close.end,
        })
    }

    /// The shared body of type and model declarations.
    fn type_declaration(&mut self, keyword: &str) -> Result<TypeDecl, ParseError> {
        let word = self.lexer.expect(&[keyword])?;
        self.lexer.expect(&["whitespace"])?;
        let name = self.expect_identifier("CapitalIdentifier")?;
        let mutable = self.lexer.optional(&["!"])?.is_none();
        let attributes = self.attributes()?;
        self.noncode()?;
        self.lexer.expect(&["{"])?;
        self.noncode()?;
        let mut columns = Vec::new();
        while self.lexer.next(&["CamelIdentifier"])? {
            columns.push(self.column()?);
            self.noncode()?;
        }
        let close = self.lexer.expect(&["}"])?;
        Ok(TypeDecl {
            name,
            mutable,
            attributes,
            columns,
            start: word.start,
            end: close.end,
        })
    }

    /// `prop Name { config }` — the braced config is one `Object` token.
    fn prop_declaration(&mut self) -> Result<PropDecl, ParseError> {
        let word = self.lexer.expect(&["PropWord"])?;
        self.lexer.expect(&["whitespace"])?;
        let name = self.expect_identifier("CapitalIdentifier")?;
        self.lexer.expect(&["whitespace"])?;
        let value = self.lexer.expect(&["Object"])?;
        Ok(PropDecl {
            start: word.start,
            end: value.end,
            name,
            value,
        })
    }

    /// `plugin "path" { config }`
    fn plugin_declaration(&mut self) -> Result<PluginDecl, ParseError> {
        let word = self.lexer.expect(&["PluginWord"])?;
        self.lexer.expect(&["whitespace"])?;
        let path = self.expect_path()?;
        self.lexer.expect(&["whitespace"])?;
        let value = self.lexer.expect(&["Object"])?;
        Ok(PluginDecl {
            start: word.start,
            end: value.end,
            path,
            value,
        })
    }

    /// `use "path"`
    fn use_declaration(&mut self) -> Result<UseDecl, ParseError> {
        let word = self.lexer.expect(&["UseWord"])?;
        self.lexer.expect(&["whitespace"])?;
        let path = self.expect_path()?;
        Ok(UseDecl {
            start: word.start,
            end: path.end,
            path,
        })
    }

    /// Dispatches on the leading keyword; `Ok(None)` at end of input.
    fn declaration(&mut self) -> Result<Option<Declaration>, ParseError> {
        self.noncode()?;
        if self.at_end() {
            return Ok(None);
        }
        let declaration = if self.lexer.next(&["EnumWord"])? {
            Declaration::Enum(self.enum_declaration()?)
        } else if self.lexer.next(&["TypeWord"])? {
            Declaration::Type(self.type_declaration("TypeWord")?)
        } else if self.lexer.next(&["ModelWord"])? {
            Declaration::Model(ModelDecl(self.type_declaration("ModelWord")?))
        } else if self.lexer.next(&["PropWord"])? {
            Declaration::Prop(self.prop_declaration()?)
        } else if self.lexer.next(&["PluginWord"])? {
            Declaration::Plugin(self.plugin_declaration()?)
        } else if self.lexer.next(&["UseWord"])? {
            Declaration::Use(self.use_declaration()?)
        } else {
            // force the error that names every keyword
            self.lexer.expect(KEYWORDS)?;
            unreachable!("expect on a non-matching position always errs")
        };
        Ok(Some(declaration))
    }

    /// The whole schema: declarations separated by noncode, to the end.
    fn program(&mut self) -> Result<Program, ParseError> {
        let start = self.lexer.index();
        let mut body = Vec::new();
        while let Some(declaration) = self.declaration()? {
            body.push(declaration);
        }
        Ok(Program {
            end: body.last().map(|d| d.span().1).unwrap_or(start),
            body,
            start,
        })
    }
}

macro_rules! tree {
    ($(#[$doc:meta])* $name:ident, $keyword:literal, $reader:path, $node:ty, $method:ident) => {
        $(#[$doc])*
        pub struct $name;

        impl $name {
            /// Registers the base dialect plus this tree's keyword.
            pub fn definitions(lexer: &mut Lexer) {
                definitions::register(lexer);
                lexer.define($keyword, $reader);
            }

            /// Parses exactly one declaration of this kind from the start
            /// of `code`.
            pub fn parse(code: &str) -> Result<$node, ParseError> {
                let mut lexer = Lexer::new();
                Self::parse_with(&mut lexer, code)
            }

            /// Same as [`Self::parse`], on a caller-supplied lexer (for
            /// custom dialects or an injected environment lookup).
            pub fn parse_with(lexer: &mut Lexer, code: &str) -> Result<$node, ParseError> {
                Self::definitions(lexer);
                lexer.load(code, 0);
                TreeParser::new(lexer).$method()
            }
        }
    };
}

tree!(
    /// `enum Name { KEY "Value" ... }`
    EnumTree,
    "EnumWord",
    definitions::enum_word,
    EnumDecl,
    enum_declaration
);

tree!(
    /// `prop Name { config }`
    PropTree,
    "PropWord",
    definitions::prop_word,
    PropDecl,
    prop_declaration
);

tree!(
    /// `plugin "path" { config }`
    PluginTree,
    "PluginWord",
    definitions::plugin_word,
    PluginDecl,
    plugin_declaration
);

tree!(
    /// `use "path"`
    UseTree,
    "UseWord",
    definitions::use_word,
    UseDecl,
    use_declaration
);

/// `type Name! @attr(...) { columns }`
pub struct TypeTree;

impl TypeTree {
    pub fn definitions(lexer: &mut Lexer) {
        definitions::register(lexer);
        lexer.define("TypeWord", definitions::type_word);
    }

    pub fn parse(code: &str) -> Result<TypeDecl, ParseError> {
        let mut lexer = Lexer::new();
        Self::parse_with(&mut lexer, code)
    }

    pub fn parse_with(lexer: &mut Lexer, code: &str) -> Result<TypeDecl, ParseError> {
        Self::definitions(lexer);
        lexer.load(code, 0);
        TreeParser::new(lexer).type_declaration("TypeWord")
    }
}

/// `model Name! @attr(...) { columns }` — same surface as a type.
pub struct ModelTree;

impl ModelTree {
    pub fn definitions(lexer: &mut Lexer) {
        definitions::register(lexer);
        lexer.define("ModelWord", definitions::model_word);
    }

    pub fn parse(code: &str) -> Result<ModelDecl, ParseError> {
        let mut lexer = Lexer::new();
        Self::parse_with(&mut lexer, code)
    }

    pub fn parse_with(lexer: &mut Lexer, code: &str) -> Result<ModelDecl, ParseError> {
        Self::definitions(lexer);
        lexer.load(code, 0);
        TreeParser::new(lexer)
            .type_declaration("ModelWord")
            .map(ModelDecl)
    }
}

/// The top-level grammar: any sequence of declarations.
pub struct SchemaTree;

impl SchemaTree {
    /// Registers the base dialect plus every declaration keyword.
    pub fn definitions(lexer: &mut Lexer) {
        definitions::register(lexer);
        lexer.define("EnumWord", definitions::enum_word);
        lexer.define("TypeWord", definitions::type_word);
        lexer.define("ModelWord", definitions::model_word);
        lexer.define("PropWord", definitions::prop_word);
        lexer.define("PluginWord", definitions::plugin_word);
        lexer.define("UseWord", definitions::use_word);
    }

    pub fn parse(code: &str) -> Result<Program, ParseError> {
        let mut lexer = Lexer::new();
        Self::parse_with(&mut lexer, code)
    }

    pub fn parse_with(lexer: &mut Lexer, code: &str) -> Result<Program, ParseError> {
        log::trace!("parsing schema of {} bytes", code.len());
        Self::definitions(lexer);
        lexer.load(code, 0);
        TreeParser::new(lexer).program()
    }
}
