// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! The two built-in helpers every [`Engine`](crate::engine::Engine) ships
//! with: `include` (recursive template inclusion) and `rawHtml` (the escape
//! hatch in [`crate::escaper`]).
//!
//! Both differ from ordinary registered helpers in needing access the
//! engine itself (`include`, to compile/cache the included file) rather
//! than only `(context, args)`; [`Engine::call_helper`](crate::engine::Engine::call_helper)
//! special-cases their names before consulting the user helper registry.

use crate::engine::Engine;
use crate::escaper;
use crate::value::Value;

/// `include(engine, ctx, args)`: `args[0]` is a filename string;
/// `engine.templ_file(name).render(ctx)` is returned as a string `Value`.
/// No arguments yields an empty string.
pub fn include(engine: &Engine, ctx: &Value, args: &Value) -> Value {
    match args.at(0) {
        Some(Value::String { text: path, .. }) => {
            let rendered = engine.templ_file(path).render(ctx.clone(), engine);
            Value::string(rendered)
        }
        _ => Value::string(String::new()),
    }
}

/// `rawHtml`: see [`crate::escaper::raw_html`].
pub fn raw_html(_ctx: &Value, args: &Value) -> Value {
    let items: Vec<Value> = args.iter_values().cloned().collect();
    escaper::raw_html(&items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::MemoryResolver;

    #[test]
    fn include_renders_named_template_against_same_context() {
        let resolver = MemoryResolver::new();
        resolver.add_template("partial.sigil", "<span>@name</span>");
        let engine = Engine::new(resolver);

        let mut ctx = Value::Null;
        ctx.set_member("name", Value::string("Ada"));

        let result = include(
            &engine,
            &ctx,
            &Value::Array(vec![Value::string("partial.sigil")]),
        );
        assert!(matches!(result, Value::String { ref text, .. } if text == "<span>Ada</span>"));
    }

    #[test]
    fn include_with_no_args_is_empty() {
        let engine = Engine::new(MemoryResolver::new());
        let result = include(&engine, &Value::Null, &Value::Array(vec![]));
        assert!(matches!(result, Value::String { ref text, .. } if text.is_empty()));
    }

    #[test]
    fn raw_html_unwraps_single_arg_array() {
        let result = raw_html(&Value::Null, &Value::Array(vec![Value::string("&amp;")]));
        assert!(matches!(result, Value::String { ref text, safe: true } if text == "&"));
    }
}
