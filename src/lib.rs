pub mod api;
pub mod ast;
pub mod compiler;
pub mod definitions;
pub mod error;
pub mod lexer;
pub mod schema;
pub mod token;
pub mod tree;
pub mod utils;

pub use api::{finalize, finalize_with, parse, parse_with};
pub use error::ParseError;
pub use lexer::{EnvLookup, Lexer};
pub use schema::{Column, SchemaConfig, TypeConfig};
pub use tree::{EnumTree, ModelTree, PluginTree, PropTree, SchemaTree, TypeTree, UseTree};
