//! Tag substitution engine for templates

use super::TagValueMap;

/// Replace every `{key}` in the template with its value.
///
/// Keys are applied in map order, so a value that itself contains another
/// `{key}` may be rewritten by a later key. Keys absent from the template are
/// ignored and placeholders without a value are left untouched.
pub fn render(template: &str, values: &TagValueMap) -> String {
    let mut result = template.to_string();

    for (key, value) in values {
        let pattern = format!("{{{}}}", key);
        // Null renders empty, arrays and objects as compact JSON. Neither
        // follows JavaScript string coercion ("null", "1,2").
        let replacement = match value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Bool(b) => b.to_string(),
            serde_json::Value::Null => String::new(),
            _ => value.to_string(),
        };
        result = result.replace(&pattern, &replacement);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{extract_tags, missing_tags};
    use serde_json::json;

    fn values(v: serde_json::Value) -> TagValueMap {
        match v {
            serde_json::Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_render_simple() {
        assert_eq!(render("dear {name}", &values(json!({"name": "Bob"}))), "dear Bob");
    }

    #[test]
    fn test_render_replaces_every_occurrence() {
        assert_eq!(render("{a}-{a}", &values(json!({"a": "x"}))), "x-x");
    }

    #[test]
    fn test_render_without_values_leaves_placeholders() {
        assert_eq!(render("dear {name}", &TagValueMap::new()), "dear {name}");
        assert_eq!(
            render("{a} and {b}", &values(json!({"a": "1"}))),
            "1 and {b}"
        );
    }

    #[test]
    fn test_render_unknown_keys_are_inert() {
        assert_eq!(
            render("hello", &values(json!({"name": "Bob"}))),
            "hello"
        );
    }

    #[test]
    fn test_render_literal_special_characters() {
        let rendered = render("total: {price.$}", &values(json!({"price.$": "4.20"})));
        assert_eq!(rendered, "total: 4.20");

        // Only the exact `{key}` form is replaced
        assert_eq!(render("price.$", &values(json!({"price.$": "x"}))), "price.$");
    }

    #[test]
    fn test_render_later_keys_see_earlier_output() {
        let rendered = render("{a}", &values(json!({"a": "{b}", "b": "done"})));
        assert_eq!(rendered, "done");

        // Reverse insertion order leaves the introduced placeholder alone
        let rendered = render("{a}", &values(json!({"b": "done", "a": "{b}"})));
        assert_eq!(rendered, "{b}");
    }

    #[test]
    fn test_render_scalar_values() {
        let rendered = render(
            "{count} items, gift={gift}, note={note}",
            &values(json!({"count": 42, "gift": true, "note": null})),
        );
        assert_eq!(rendered, "42 items, gift=true, note=");
    }

    #[test]
    fn test_render_structured_values_as_json() {
        let rendered = render(
            "ids={ids} meta={meta}",
            &values(json!({"ids": [1, 2], "meta": {"k": "v"}})),
        );
        assert_eq!(rendered, r#"ids=[1,2] meta={"k":"v"}"#);
    }

    #[test]
    fn test_complete_map_leaves_no_known_placeholders() {
        let templates = [
            "dear {username}",
            "{a}{b}{a} - {c}",
            "Order {order_id} shipped via {carrier} to {address}",
        ];

        for template in templates {
            let mut complete = TagValueMap::new();
            for tag in extract_tags(template) {
                complete.insert(tag.clone(), json!(format!("<{}>", tag.len())));
            }

            assert!(missing_tags(template, &complete).is_empty());

            let rendered = render(template, &complete);
            for key in complete.keys() {
                assert!(!rendered.contains(&format!("{{{}}}", key)), "{rendered}");
            }
        }
    }
}
