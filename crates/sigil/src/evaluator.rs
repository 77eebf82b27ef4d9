// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! The tree-walking evaluator: renders an [`Node`] sibling list against a
//! context [`Value`] and an [`Engine`] handle, producing an HTML string.
//!
//! Loop scoping replaces the original engine's `parentContext`-through-a-
//! reserved-object-key trick with an explicit scope stack: each `for` loop
//! pushes a fresh frame containing only the loop variable, and
//! [`find_variable`] walks the stack from the innermost frame outward. This
//! means a loop body can never observe or mutate the caller's context
//! object, and nothing reserves a magic key on user data.

use crate::ast::{ElseIf, Node};
use crate::engine::Engine;
use crate::error::{diagnose, Diagnostic};
use crate::escaper;
use crate::value::Value;

/// Resolves `name` directly against a single context Value (no scope-stack
/// walk): an `Object` member lookup first, falling back to the pseudo
/// members `length`/`size`/`empty?`/`isEmpty?` on `Array`/`Object`. This is
/// the non-recursive half of the original `findVariable`; the scope-stack
/// walk lives in [`find_variable`].
fn find_variable_in_value(ctx: &Value, name: &str) -> Option<Value> {
    if let Some(v) = ctx.member(name) {
        return Some(v.clone());
    }
    if ctx.is_array() || ctx.is_object() {
        match name {
            "length" | "size" => return Some(Value::Int(ctx.size() as i64)),
            "empty?" | "isEmpty?" => return Some(Value::Bool(ctx.is_empty())),
            _ => {}
        }
    }
    None
}

/// `findVariable(ctx, name)`: walks the scope stack from the innermost
/// (last) frame to the outermost, resolving `name` against each frame via
/// [`find_variable_in_value`]. Returns `None` (and lets the caller emit the
/// `UnknownVariable` diagnostic) once every frame has been tried.
fn find_variable(scopes: &[Value], name: &str) -> Option<Value> {
    scopes
        .iter()
        .rev()
        .find_map(|frame| find_variable_in_value(frame, name))
}

/// Walks a dotted member chain starting from `current`, stopping as soon as
/// a step yields `Null` (matching "stops if any step yields Null" in the
/// evaluator contract — subsequent steps are not attempted once the chain
/// has gone dead).
fn apply_member_chain(mut current: Value, member: &Option<Box<Node>>) -> Value {
    let mut next = member;
    while let Some(node) = next {
        if current.is_null() {
            break;
        }
        let Node::Variable { name, member } = node.as_ref() else {
            break;
        };
        current = match find_variable_in_value(&current, name) {
            Some(v) => v,
            None => {
                diagnose(Diagnostic::UnknownVariable(name));
                Value::Null
            }
        };
        next = member;
    }
    current
}

/// Renders `body` against `context`, using `engine` for helper lookup and
/// recursive template inclusion.
pub fn render(body: &[Node], context: Value, engine: &Engine) -> String {
    let mut scopes = vec![context];
    eval_body(body, &mut scopes, engine)
}

fn eval_body(body: &[Node], scopes: &mut Vec<Value>, engine: &Engine) -> String {
    let mut out = String::new();
    for node in body {
        match node {
            Node::HtmlText(text) => out.push_str(text),
            Node::If {
                cond,
                then,
                elseif_chain,
                else_branch,
            } => out.push_str(&eval_if(
                cond,
                then,
                elseif_chain,
                else_branch,
                scopes,
                engine,
            )),
            Node::Unless {
                cond,
                then,
                else_branch,
            } => {
                if eval_expr(cond, scopes, engine).to_bool() {
                    if let Some(else_branch) = else_branch {
                        out.push_str(&eval_body(else_branch, scopes, engine));
                    }
                } else {
                    out.push_str(&eval_body(then, scopes, engine));
                }
            }
            Node::ForLoop {
                var_name,
                list_expr,
                body,
            } => {
                let list = eval_expr(list_expr, scopes, engine);
                if list.is_array() || list.is_object() {
                    for element in list.iter_values() {
                        let mut frame = Value::Null;
                        frame.set_member(var_name.clone(), element.clone());
                        scopes.push(frame);
                        out.push_str(&eval_body(body, scopes, engine));
                        scopes.pop();
                    }
                }
            }
            other => out.push_str(&stringify_for_output(eval_expr(other, scopes, engine))),
        }
    }
    out
}

fn eval_if(
    cond: &Node,
    then: &[Node],
    elseif_chain: &[ElseIf],
    else_branch: &Option<Vec<Node>>,
    scopes: &mut Vec<Value>,
    engine: &Engine,
) -> String {
    if eval_expr(cond, scopes, engine).to_bool() {
        return eval_body(then, scopes, engine);
    }
    for clause in elseif_chain {
        if eval_expr(&clause.cond, scopes, engine).to_bool() {
            return eval_body(&clause.body, scopes, engine);
        }
    }
    match else_branch {
        Some(body) => eval_body(body, scopes, engine),
        None => String::new(),
    }
}

/// Stringifies a Value for emission into the output stream: an unsafe
/// string is HTML-escaped; a safe string, or anything else, is emitted via
/// [`Value::to_display_string`] verbatim.
fn stringify_for_output(value: Value) -> String {
    match value {
        Value::String { text, safe: false } => escaper::escape(&text),
        Value::String { text, safe: true } => text,
        other => other.to_display_string(),
    }
}

/// Evaluates an expression node to a [`Value`]. Arithmetic/ternary/helper
/// composition never escapes; escaping only happens when a node's result is
/// stringified directly into the output by [`eval_body`].
fn eval_expr(node: &Node, scopes: &mut Vec<Value>, engine: &Engine) -> Value {
    match node {
        Node::IntLiteral(n) => Value::Int(*n),
        // An author-supplied literal is never HTML-escaped on output;
        // marking it safe here means the generic stringify path in
        // `eval_body` leaves it untouched.
        Node::StringLiteral(s) => Value::safe_string(s.clone()),
        Node::HtmlText(text) => Value::safe_string(text.clone()),
        Node::Variable { name, member } => {
            let root = match find_variable(scopes, name) {
                Some(v) => v,
                None => {
                    diagnose(Diagnostic::UnknownVariable(name));
                    Value::Null
                }
            };
            apply_member_chain(root, member)
        }
        Node::Helper { name, args, member } => {
            let evaluated_args =
                Value::Array(args.iter().map(|a| eval_expr(a, scopes, engine)).collect());
            let context = scopes.last().cloned().unwrap_or(Value::Null);
            let result = engine.call_helper(name, &context, &evaluated_args);
            // Helper output is never re-escaped on output, unlike a bare
            // `Variable` dereference: a helper (e.g. `include`) commonly
            // returns already-rendered HTML, and the original engine's
            // Helper evaluation never calls its escaper either — only
            // the Variable case does. Helpers that want escaped user data
            // in their result are expected to call the escaper themselves.
            match apply_member_chain(result, member) {
                Value::String { text, .. } => Value::safe_string(text),
                other => other,
            }
        }
        Node::Object { members } => Value::Object(
            members
                .iter()
                .map(|m| (m.name.clone(), eval_expr(&m.value, scopes, engine)))
                .collect(),
        ),
        Node::BinaryExpression { op, lhs, rhs } => {
            let lhs = eval_expr(lhs, scopes, engine);
            let rhs = eval_expr(rhs, scopes, engine);
            lhs.apply_binary_op(*op, &rhs)
        }
        Node::Ternary { cond, then, else_ } => {
            if eval_expr(cond, scopes, engine).to_bool() {
                eval_expr(then, scopes, engine)
            } else {
                eval_expr(else_, scopes, engine)
            }
        }
        Node::If { .. } | Node::Unless { .. } | Node::ForLoop { .. } => {
            Value::safe_string(eval_body(std::slice::from_ref(node), scopes, engine))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::MemoryResolver;
    use std::collections::HashMap;

    fn engine() -> Engine {
        Engine::new(MemoryResolver::new())
    }

    fn render_source(source: &str, ctx: Value) -> String {
        let body = crate::parser::parse(source).unwrap().body;
        render(&body, ctx, &engine())
    }

    #[test]
    fn scenario_dotted_member_lookup() {
        let mut people = Value::Null;
        people.set_member("firstname", Value::string("Foo"));
        people.set_member("lastname", Value::string("Bar"));
        let mut ctx = Value::Null;
        ctx.set_member("people", people);

        let out = render_source("<p>@{people.firstname} - @{people.lastname}</p>", ctx);
        assert_eq!(out, "<p>Foo - Bar</p>");
    }

    #[test]
    fn scenario_for_loop_preserves_whitespace() {
        let mut ctx = Value::Null;
        ctx.set_member(
            "list",
            Value::Array(vec![Value::string("Adam"), Value::string("Bert")]),
        );
        let out = render_source("<ul>\n@for(item in list) { <li>@item</li>\n}</ul>", ctx);
        assert_eq!(out, "<ul>\n <li>Adam</li>\n <li>Bert</li>\n</ul>");
    }

    #[test]
    fn scenario_auto_escape_of_string_variable() {
        let mut ctx = Value::Null;
        ctx.set_member("string", Value::string("<b>Hello</b>"));
        let out = render_source("<p>@string</p>", ctx);
        assert_eq!(out, "<p>&lt;b&gt;Hello&lt;/b&gt;</p>");
    }

    #[test]
    fn scenario_if_else_if_else() {
        let cases = [(true, false, "A"), (false, true, "B"), (false, false, "C")];
        for (a, b, expected) in cases {
            let mut ctx = Value::Null;
            ctx.set_member("a", Value::Bool(a));
            ctx.set_member("b", Value::Bool(b));
            let out = render_source("@if(a){A}else if(b){B}else{C}", ctx);
            assert_eq!(out, expected);
        }
    }

    #[test]
    fn scenario_inline_ternary() {
        let mut ctx = Value::Null;
        ctx.set_member("c", Value::Bool(true));
        ctx.set_member("x", Value::string("T"));
        ctx.set_member("y", Value::string("F"));
        assert_eq!(
            render_source("<p>@{c ? x : y}</p>", ctx.clone()),
            "<p>T</p>"
        );

        ctx.set_member("c", Value::Bool(false));
        assert_eq!(render_source("<p>@{c ? x : y}</p>", ctx), "<p>F</p>");
    }

    #[test]
    fn scenario_nested_helper_calls() {
        let mut engine = engine();
        engine.register_helper("printString", |_ctx: &Value, args: &Value| {
            let a = args.at(0).map(Value::to_display_string).unwrap_or_default();
            let b = args.at(1).map(Value::to_display_string).unwrap_or_default();
            Value::string(format!("{a}{b}"))
        });
        engine.register_helper("multiply", |_ctx: &Value, args: &Value| {
            let a = args.at(0).map(Value::to_int).unwrap_or(0);
            let b = args.at(1).map(Value::to_int).unwrap_or(0);
            Value::Int(a * b)
        });

        let body = crate::parser::parse(
            "<p>@printString( printString(\"10*\",\"20=\"), multiply(10,20))</p>",
        )
        .unwrap()
        .body;
        let out = render(&body, Value::Null, &engine);
        assert_eq!(out, "<p>10*20=200</p>");
    }

    #[test]
    fn scenario_object_literal_as_helper_argument() {
        let mut engine = engine();
        engine.register_helper("returnObject", |_ctx: &Value, args: &Value| {
            match args.at(0) {
                Some(obj @ Value::Object(members)) if members.len() == 3 => {
                    Value::string(obj.to_display_string())
                }
                _ => Value::string("wrong"),
            }
        });

        let body = crate::parser::parse("@returnObject({string:\"hello\", empty:{}, integer:10})")
            .unwrap()
            .body;
        let out = render(&body, Value::Null, &engine);
        assert_ne!(out, "wrong");
    }

    #[test]
    fn loop_scope_does_not_leak_into_parent_after_iteration() {
        let mut ctx = Value::Null;
        ctx.set_member("list", Value::Array(vec![Value::Int(1)]));
        let body = crate::parser::parse("@for(item in list){@item}@item")
            .unwrap()
            .body;
        let out = render(&body, ctx, &engine());
        // the second (top-level) `@item` is unknown once the loop scope pops
        assert_eq!(out, "1");
    }

    #[test]
    fn unknown_variable_degrades_to_empty_not_panic() {
        let out = render_source("<p>@missing</p>", Value::Null);
        assert_eq!(out, "<p></p>");
    }

    #[test]
    fn unknown_helper_degrades_to_empty_not_panic() {
        let body = crate::parser::parse("@doesNotExist()").unwrap().body;
        let out = render(&body, Value::Null, &engine());
        assert_eq!(out, "");
    }

    #[test]
    fn map_context_convenience_resolves_like_object() {
        let mut map = HashMap::new();
        map.insert("x".to_string(), Value::Int(5));
        let ctx: Value = map.into();
        let out = render_source("@x", ctx);
        assert_eq!(out, "5");
    }
}
