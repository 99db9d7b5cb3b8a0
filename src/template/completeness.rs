//! Completeness check of supplied tag values against a template

use super::extract::extract_tags;
use super::TagValueMap;

/// List the template's placeholders that have no key in `supplied`.
///
/// Order follows the template and duplicates are kept, so a tag used twice
/// and not supplied is reported twice. A key with an empty value counts as
/// supplied.
pub fn missing_tags(template: &str, supplied: &TagValueMap) -> Vec<String> {
    extract_tags(template)
        .into_iter()
        .filter(|tag| !supplied.contains_key(tag))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn values(v: serde_json::Value) -> TagValueMap {
        match v {
            serde_json::Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_missing_keeps_duplicates() {
        let missing = missing_tags("dear {name}, {name} again", &TagValueMap::new());
        assert_eq!(missing, vec!["name", "name"]);
    }

    #[test]
    fn test_nothing_missing() {
        let missing = missing_tags("dear {name}", &values(json!({"name": "Bob"})));
        assert!(missing.is_empty());
    }

    #[test]
    fn test_missing_subset() {
        let missing = missing_tags("{a} and {b}", &values(json!({"a": "1"})));
        assert_eq!(missing, vec!["b"]);
    }

    #[test]
    fn test_empty_value_counts_as_present() {
        let missing = missing_tags("hi {name}", &values(json!({"name": ""})));
        assert!(missing.is_empty());
    }

    #[test]
    fn test_extra_keys_are_ignored() {
        let missing = missing_tags(
            "{c} then {a}",
            &values(json!({"a": "1", "unused": "x"})),
        );
        assert_eq!(missing, vec!["c"]);
    }
}
