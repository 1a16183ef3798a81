// Parser module: tree-sitter front end and the per-run parse cache

pub mod ast;
mod cache;
mod javascript;

pub use ast::*;
pub use cache::ParseCache;
pub use javascript::{contains_jsx, for_each_descendant, jsx_tags, JavaScriptParser, JsVariant, SourceFile};
