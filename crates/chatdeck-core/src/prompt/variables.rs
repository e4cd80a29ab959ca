//! `{{variable}}` placeholders in prompt templates.

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Values collected by the variable dialog, keyed by placeholder name.
pub type VariableValues = HashMap<String, String>;

static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();

fn placeholder() -> &'static Regex {
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z0-9_.\-]+)\s*\}\}").expect("placeholder pattern is valid")
    })
}

/// Unique placeholder names in order of first appearance.
pub fn extract_variables(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in placeholder().captures_iter(template) {
        let name = &caps[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Names present in the template whose value is absent or blank.
pub fn missing_variables(template: &str, values: &VariableValues) -> Vec<String> {
    extract_variables(template)
        .into_iter()
        .filter(|name| values.get(name).is_none_or(|v| v.trim().is_empty()))
        .collect()
}

/// Replaces every placeholder that has a value; unknown ones are left as written.
pub fn substitute_variables(template: &str, values: &VariableValues) -> String {
    placeholder()
        .replace_all(template, |caps: &Captures| match values.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> VariableValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_extract_unique_in_order() {
        let names = extract_variables("Translate {{text}} into {{ lang }}, keep {{text}} short");
        assert_eq!(names, vec!["text".to_string(), "lang".to_string()]);
    }

    #[test]
    fn test_extract_ignores_single_braces() {
        assert!(extract_variables("fn main() { {x} }").is_empty());
        assert!(extract_variables("{{ }}").is_empty());
    }

    #[test]
    fn test_substitute_all_occurrences() {
        let result = substitute_variables(
            "{{name}} meets {{ name }} in {{city}}",
            &values(&[("name", "Ann"), ("city", "Oslo")]),
        );
        assert_eq!(result, "Ann meets Ann in Oslo");
    }

    #[test]
    fn test_substitute_leaves_unknown_placeholders() {
        let result = substitute_variables("{{a}} {{b}}", &values(&[("a", "1")]));
        assert_eq!(result, "1 {{b}}");
    }

    #[test]
    fn test_substituted_value_is_not_reexpanded() {
        let result = substitute_variables("{{a}}", &values(&[("a", "{{b}}"), ("b", "x")]));
        assert_eq!(result, "{{b}}");
    }

    #[test]
    fn test_missing_variables() {
        let missing =
            missing_variables("{{a}} {{b}} {{c}}", &values(&[("b", "  "), ("c", "x")]));
        assert_eq!(missing, vec!["a".to_string(), "b".to_string()]);
    }
}
