// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! End-to-end rendering scenarios and universal invariants, exercising the
//! full lexer -> parser -> evaluator -> escaper pipeline through the public
//! [`Engine`]/[`Template`] API rather than any one module in isolation.

use crate::*;
use std::collections::HashMap;

fn engine() -> Engine {
    Engine::new(MemoryResolver::new())
}

fn render(source: &str, ctx: Value) -> String {
    engine().templ(source).render(ctx, &engine())
}

#[test]
fn scenario_1_plain_text_and_at_at_escape() {
    let out = render("<p>email@@example.com</p>", Value::Null);
    assert_eq!(out, "<p>email@example.com</p>");
}

#[test]
fn scenario_2_dotted_member_lookup() {
    let mut people = Value::Null;
    people.set_member("firstname", Value::string("Foo"));
    people.set_member("lastname", Value::string("Bar"));
    let mut ctx = Value::Null;
    ctx.set_member("people", people);

    let out = render("<p>@{people.firstname} - @{people.lastname}</p>", ctx);
    assert_eq!(out, "<p>Foo - Bar</p>");
}

#[test]
fn scenario_3_for_loop_preserves_whitespace() {
    let mut ctx = Value::Null;
    ctx.set_member(
        "list",
        Value::Array(vec![Value::string("Adam"), Value::string("Bert")]),
    );
    let out = render("<ul>\n@for(item in list) { <li>@item</li>\n}</ul>", ctx);
    assert_eq!(out, "<ul>\n <li>Adam</li>\n <li>Bert</li>\n</ul>");
}

#[test]
fn scenario_4_auto_escape_of_string_variable() {
    let mut ctx = Value::Null;
    ctx.set_member("string", Value::string("<b>Hello</b>"));
    let out = render("<p>@string</p>", ctx);
    assert_eq!(out, "<p>&lt;b&gt;Hello&lt;/b&gt;</p>");
}

#[test]
fn scenario_5_nested_helper_calls_with_mixed_literals() {
    let mut eng = engine();
    eng.register_helper("printString", |_ctx, args| {
        let a = args.at(0).map(Value::to_display_string).unwrap_or_default();
        let b = args.at(1).map(Value::to_display_string).unwrap_or_default();
        Value::string(format!("{a}{b}"))
    });
    eng.register_helper("multiply", |_ctx, args| {
        let a = args.at(0).map(Value::to_int).unwrap_or(0);
        let b = args.at(1).map(Value::to_int).unwrap_or(0);
        Value::Int(a * b)
    });

    let out = eng
        .templ("<p>@printString( printString(\"10*\",\"20=\"), multiply(10,20))</p>")
        .render(Value::Null, &eng);
    assert_eq!(out, "<p>10*20=200</p>");
}

#[test]
fn scenario_6_if_else_if_else() {
    for (a, b, expected) in [(true, false, "A"), (false, true, "B"), (false, false, "C")] {
        let mut ctx = Value::Null;
        ctx.set_member("a", Value::Bool(a));
        ctx.set_member("b", Value::Bool(b));
        let out = render("@if(a){A}else if(b){B}else{C}", ctx);
        assert_eq!(out, expected);
    }
}

#[test]
fn scenario_7_object_literal_as_helper_argument() {
    let mut eng = engine();
    eng.register_helper("returnObject", |_ctx, args| match args.at(0) {
        Some(Value::Object(members)) if members.len() == 3 => Value::string("ok: size 3"),
        _ => Value::string("wrong"),
    });

    let out = eng
        .templ("@returnObject({string:\"hello\", empty:{}, integer:10})")
        .render(Value::Null, &eng);
    assert_eq!(out, "ok: size 3");
}

#[test]
fn scenario_8_inline_ternary() {
    let mut ctx = Value::Null;
    ctx.set_member("c", Value::Bool(true));
    ctx.set_member("x", Value::string("T"));
    ctx.set_member("y", Value::string("F"));
    assert_eq!(render("<p>@{c ? x : y}</p>", ctx.clone()), "<p>T</p>");

    ctx.set_member("c", Value::Bool(false));
    assert_eq!(render("<p>@{c ? x : y}</p>", ctx), "<p>F</p>");
}

#[test]
fn include_renders_recursively_against_the_passed_context() {
    let resolver = MemoryResolver::new();
    resolver.add_template("header.sigil", "<h1>@title</h1>");
    let eng = Engine::new(resolver);

    let mut ctx = Value::Null;
    ctx.set_member("title", Value::string("Welcome"));

    let out = eng
        .templ("@include(\"header.sigil\")<p>body</p>")
        .render(ctx, &eng);
    assert_eq!(out, "<h1>Welcome</h1><p>body</p>");
}

#[test]
fn missing_include_file_degrades_to_empty_not_panic() {
    let eng = Engine::new(MemoryResolver::new());
    let out = eng
        .templ("@include(\"missing.sigil\")")
        .render(Value::Null, &eng);
    assert_eq!(out, "");
}

#[test]
fn render_map_overload_wraps_hashmap_as_object_context() {
    let mut map = HashMap::new();
    map.insert("name".to_string(), Value::string("Ada"));
    let out = engine().templ("@name").render_map(map, &engine());
    assert_eq!(out, "Ada");
}

#[test]
fn invariant_numeric_identity_holds_for_sample_values() {
    for v in [
        Value::Int(0),
        Value::Int(-7),
        Value::Int(42),
        Value::Double(3.5),
    ] {
        let result = v.apply_binary_op(BinaryOp::Add, &Value::Int(0));
        assert_eq!(result.to_int(), v.to_int());
    }
}

#[test]
fn invariant_raw_html_undoes_escape_for_all_four_entities() {
    for sample in ["&", ">", "<", "\"", "<b>&\"Hi\"</b>"] {
        let escaped = escaper::escape(sample);
        let result = engine().call_helper(
            "rawHtml",
            &Value::Null,
            &Value::Array(vec![Value::string(escaped)]),
        );
        assert!(matches!(result, Value::String { ref text, safe: true } if text == sample));
    }
}

#[test]
fn invariant_no_directive_template_renders_source_unchanged() {
    for source in [
        "plain text",
        "<div class=\"x\">nothing special</div>",
        "",
        "<p>café \u{1F600} na\u{00EF}ve résumé</p>",
    ] {
        assert_eq!(render(source, Value::Null), source);
    }
}

#[test]
fn invariant_double_at_renders_single_at() {
    assert_eq!(render("@@", Value::Null), "@");
    assert_eq!(render("a@@b@@c", Value::Null), "a@b@c");
}

#[test]
fn invariant_object_insertion_order_preserved_in_for_loop() {
    let mut obj = Value::Null;
    obj.set_member("z", Value::Int(1));
    obj.set_member("a", Value::Int(2));
    obj.set_member("m", Value::Int(3));
    let mut ctx = Value::Null;
    ctx.set_member("obj", obj);

    let out = render("@for(v in obj){@v,}", ctx);
    assert_eq!(out, "1,2,3,");
}

#[test]
fn invariant_render_is_idempotent() {
    let t = engine().templ("<p>@{1+2*3}</p>@if(true){yes}");
    let e = engine();
    assert_eq!(t.render(Value::Null, &e), t.render(Value::Null, &e));
}

#[test]
fn malformed_template_degrades_to_syntax_error_sentinel_never_panics() {
    let malformed_sources = [
        "@if(a) no opening brace for body",
        "@{unterminated",
        "@for(x) missing in-expr {}",
        "@{1 + }",
    ];
    for source in malformed_sources {
        let out = render(source, Value::Null);
        assert_eq!(out, SYNTAX_ERROR_SENTINEL);
    }
}

#[test]
fn unknown_variable_and_unknown_helper_degrade_without_panicking() {
    assert_eq!(render("<p>@nope</p>", Value::Null), "<p></p>");
    assert_eq!(render("@alsoNope()", Value::Null), "");
}
