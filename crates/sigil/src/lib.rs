// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

// Warn on missing documentation for public items
#![warn(missing_docs)]

//! # sigil
//!
//! A server-side HTML template engine: `@`-directive source is compiled to
//! an AST and the AST is walked against a dynamically-typed [`Value`]
//! context, producing an automatically-escaped HTML string.
//!
//! ## Features
//!
//! - A dynamic [`Value`] model with numeric promotion, deep copies, and an
//!   embedder `from_value`/`to_value` round-trip.
//! - Mixed HTML/directive-mode templates: `if`/`else if`/`else`, `unless`,
//!   `for` loops, dotted member access, helper calls, object literals,
//!   inline ternaries.
//! - Automatic HTML escaping with an explicit `rawHtml` escape hatch.
//! - A helper registry and a filename-keyed, LRU-bounded template cache.
//!
//! ## Quick Start
//!
//! ```rust
//! use sigil::{Engine, MemoryResolver, Value};
//!
//! let engine = Engine::new(MemoryResolver::new());
//! let template = engine.templ("<p>@{people.firstname} - @{people.lastname}</p>");
//!
//! let mut people = Value::Null;
//! people.set_member("firstname", Value::string("Foo"));
//! people.set_member("lastname", Value::string("Bar"));
//! let mut ctx = Value::Null;
//! ctx.set_member("people", people);
//!
//! assert_eq!(template.render(ctx, &engine), "<p>Foo - Bar</p>");
//! ```

/// Abstract syntax tree types for templates.
pub mod ast;
/// The two built-in helpers (`include`, `rawHtml`).
pub mod builtins;
/// The engine's filename-keyed template cache.
pub mod cache;
/// The engine facade: helper registry + template cache + render entry point.
pub mod engine;
/// Error types and soft-error diagnostics.
pub mod error;
/// HTML escaping and the `rawHtml` escape hatch.
pub mod escaper;
/// The tree-walking evaluator.
pub mod evaluator;
/// Tokenises template source into HTML-text and directive tokens.
pub mod lexer;
/// Hand-written recursive-descent parser producing a [`ast::TemplateAst`].
pub mod parser;
/// The filesystem collaborator behind `include`/`templ_file`.
pub mod resolver;
/// Compiled templates, owning source text and a lazily-parsed AST.
pub mod template;
/// The dynamic [`Value`] type and its numeric/string/bool coercions.
pub mod value;

pub use ast::{ElseIf, Node, ObjectMember, TemplateAst};
pub use engine::{Engine, HelperFn};
pub use error::{diagnose, Diagnostic, Error, Result, SYNTAX_ERROR_SENTINEL};
pub use resolver::{FileSystemResolver, MemoryResolver, Resolver};
pub use template::Template;
pub use value::{BinaryOp, Value, ValueType};

#[cfg(test)]
mod tests;
