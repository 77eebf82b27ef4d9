// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! A compiled [`Template`]: owns its source text and, lazily on first
//! render, its parsed AST.
//!
//! A template compiles once; rendering afterwards is just a walk over the
//! cached AST. Compilation failure does not fail the constructor — per
//! `SPEC_FULL.md` §4.C's error policy, a template whose source does not
//! parse becomes the single distinguished "syntax error" template, whose
//! render always returns [`crate::error::SYNTAX_ERROR_SENTINEL`]. This
//! keeps `Template::render` total: it never returns a `Result`.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::ast::TemplateAst;
use crate::engine::Engine;
use crate::error::SYNTAX_ERROR_SENTINEL;
use crate::evaluator;
use crate::value::Value;

/// A compiled template: source text plus a lazily-parsed AST.
///
/// Lazy compilation happens under a `OnceLock`, matching the single-
/// initialisation contract in `SPEC_FULL.md` §5: a `Template` is not
/// thread-safe to race the *first* render of across threads (the embedder
/// must serialise that), but `OnceLock` makes that race merely redundant
/// work rather than undefined behaviour.
#[derive(Debug)]
pub struct Template {
    source: String,
    ast: OnceLock<Result<TemplateAst, ()>>,
}

impl Template {
    /// Wraps `source` in an uncompiled template. Parsing happens lazily on
    /// first render.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ast: OnceLock::new(),
        }
    }

    /// The template's original source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    fn compiled(&self) -> &Result<TemplateAst, ()> {
        self.ast.get_or_init(|| {
            crate::parser::parse(&self.source).map_err(|e| {
                crate::error::diagnose(crate::error::Diagnostic::SyntaxError);
                tracing::debug!(target: "sigil", "parse error: {e}");
            })
        })
    }

    /// Renders against `Null` context (`Template::render()` with no
    /// argument, in the original three-call-shape API).
    pub fn render_default(&self, engine: &Engine) -> String {
        self.render(Value::Null, engine)
    }

    /// Renders against an explicit [`Value`] context.
    pub fn render(&self, context: Value, engine: &Engine) -> String {
        match self.compiled() {
            Ok(ast) => evaluator::render(&ast.body, context, engine),
            Err(()) => SYNTAX_ERROR_SENTINEL.to_string(),
        }
    }

    /// Convenience overload accepting a plain string-keyed map, wrapped as
    /// an `Object` context.
    pub fn render_map(&self, context: HashMap<String, Value>, engine: &Engine) -> String {
        self.render(Value::from(context), engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::MemoryResolver;

    fn engine() -> Engine {
        Engine::new(MemoryResolver::new())
    }

    #[test]
    fn no_directive_template_renders_source_verbatim() {
        let t = Template::new("<p>just html, no directives</p>");
        assert_eq!(
            t.render_default(&engine()),
            "<p>just html, no directives</p>"
        );
    }

    #[test]
    fn malformed_source_renders_syntax_error_sentinel() {
        let t = Template::new("@if(a) missing braces");
        assert_eq!(t.render_default(&engine()), SYNTAX_ERROR_SENTINEL);
    }

    #[test]
    fn render_is_idempotent() {
        let t = Template::new("<p>@{1+1}</p>");
        let e = engine();
        let first = t.render_default(&e);
        let second = t.render_default(&e);
        assert_eq!(first, second);
    }

    #[test]
    fn render_map_wraps_as_object_context() {
        let t = Template::new("@name");
        let mut map = HashMap::new();
        map.insert("name".to_string(), Value::string("Ada"));
        assert_eq!(t.render_map(map, &engine()), "Ada");
    }
}
