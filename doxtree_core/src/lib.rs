//! `doxtree_core` turns documented C++ headers into a nested tree of
//! entities (namespaces, groups, types, functions, ...) that renderers walk to
//! produce documentation pages.
//!
//! ## Processing Pipeline
//!
//! ```text
//! C++ source file
//!   → Parser (tree-sitter C++ grammar)
//!   → Preprocessor (expands configured macros, blanks unknown macro-like tokens)
//!   → Declaration query (ordered stream of comments and declarations)
//!   → Assembler (containment stack rebuilds nesting from byte ranges)
//!       ↳ Translator (doc comment commands → Markdown, group and visibility)
//!   → Entity tree (merged across files by namespace and group name)
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading from `doxtree.yaml`: file patterns,
//!   macro definitions and the group tree.
//! - [`project`]: File discovery and whole-project assembly.
//! - [`lexer`] and [`translator`]: The doc comment micro-language.
//! - [`stack`]: The interval containment stack behind the assembler.
//! - [`syntax`]: The tree-sitter adapter and declaration query.
//!
//! ## Key Types
//!
//! - [`Entity`]: A node of the documentation tree.
//! - [`SourceParser`]: Parses one file at a time into a shared root entity.
//! - [`Project`]: A whole project's entity tree together with its warnings.
//! - [`Diagnostics`]: Run-wide collector of non-fatal warnings.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use doxtree_core::Project;
//! use std::path::Path;
//!
//! let project = Project::build(Path::new(".")).unwrap();
//! for diagnostic in &project.diagnostics {
//!     eprintln!("{}: {}", diagnostic.file.display(), diagnostic.message());
//! }
//! for namespace in &project.root.namespaces {
//!     println!("{}", namespace.name);
//! }
//! ```

pub use assembler::*;
pub use config::*;
pub use diagnostics::*;
pub use entity::*;
pub use error::*;
pub use preprocess::*;
pub use project::*;
pub use source::*;
pub use stack::*;
pub use syntax::*;
pub use translator::*;

mod assembler;
pub mod config;
mod diagnostics;
mod entity;
#[allow(unused_assignments)]
mod error;
pub mod lexer;
mod preprocess;
pub mod project;
mod source;
pub mod stack;
pub mod syntax;
pub mod tokens;
pub mod translator;

#[cfg(test)]
mod __fixtures;
