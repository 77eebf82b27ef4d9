// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! HTML escaping, and the `rawHtml` escape hatch that undoes it.
//!
//! `&` is substituted first and foremost so that the entities introduced by
//! the later substitutions (`&gt;`, `&lt;`, `&quot;`) are not themselves
//! re-escaped.

use crate::value::Value;

/// Replaces, in this exact order, `&` -> `&amp;`, `>` -> `&gt;`,
/// `<` -> `&lt;`, `"` -> `&quot;`.
pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('>', "&gt;")
        .replace('<', "&lt;")
        .replace('"', "&quot;")
}

/// Undoes [`escape`]'s four substitutions, in reverse order.
fn unescape(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// The `rawHtml` built-in: accepts exactly one argument. If it is a
/// `String`, undoes the four HTML substitutions and returns the result
/// flagged safe so the evaluator will not re-escape it on output. Any other
/// argument passes through unchanged. Zero or more-than-one arguments yield
/// an empty string.
pub fn raw_html(args: &[Value]) -> Value {
    match args {
        [Value::String { text, .. }] => Value::safe_string(unescape(text)),
        [other] => other.clone(),
        _ => Value::string(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_in_mandated_order() {
        assert_eq!(escape("&"), "&amp;");
        assert_eq!(escape("<b>Hello</b>"), "&lt;b&gt;Hello&lt;/b&gt;");
        assert_eq!(escape("\"quoted\""), "&quot;quoted&quot;");
    }

    #[test]
    fn ampersand_escaped_first_so_entities_are_not_reescaped() {
        // If `&` were escaped after `>`/`<`, the `&` introduced by those
        // substitutions would itself get turned into `&amp;`.
        assert_eq!(escape(">"), "&gt;");
    }

    #[test]
    fn raw_html_round_trips_escape() {
        let original = "<b>Hello & \"World\"</b>";
        let escaped = escape(original);
        let result = raw_html(&[Value::string(escaped)]);
        match result {
            Value::String { text, safe } => {
                assert!(safe);
                assert_eq!(text, original);
            }
            other => panic!("expected safe string, got {other:?}"),
        }
    }

    #[test]
    fn raw_html_passes_through_non_string_arguments() {
        let result = raw_html(&[Value::Int(5)]);
        assert!(matches!(result, Value::Int(5)));
    }

    #[test]
    fn raw_html_wrong_arity_returns_empty_string() {
        assert!(matches!(raw_html(&[]), Value::String { ref text, .. } if text.is_empty()));
        assert!(matches!(
            raw_html(&[Value::Int(1), Value::Int(2)]),
            Value::String { ref text, .. } if text.is_empty()
        ));
    }
}
