//! `{field}` placeholder substitution.

use crate::error::{JsonPipeError, Result};
use crate::record::{Record, value_text};

/// Render `template`, replacing each `{name}` with the text of that field.
///
/// `{{` and `}}` produce literal braces. A placeholder naming a field the
/// record doesn't have is an error, as is an unbalanced brace.
pub fn render(template: &str, record: &Record) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars();

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                let rest = chars.as_str();
                if let Some(after) = rest.strip_prefix('{') {
                    out.push('{');
                    chars = after.chars();
                    continue;
                }
                let end = rest.find('}').ok_or_else(|| {
                    JsonPipeError::Config(format!(
                        "Single '{{' encountered in template '{}'",
                        template
                    ))
                })?;
                let name = &rest[..end];
                let value = record
                    .get(name)
                    .ok_or_else(|| JsonPipeError::MissingField {
                        field: name.to_string(),
                    })?;
                out.push_str(&value_text(value));
                chars = rest[end + 1..].chars();
            }
            '}' => {
                let rest = chars.as_str();
                let after = rest.strip_prefix('}').ok_or_else(|| {
                    JsonPipeError::Config(format!(
                        "Single '}}' encountered in template '{}'",
                        template
                    ))
                })?;
                out.push('}');
                chars = after.chars();
            }
            other => out.push(other),
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_render_fields() {
        let rec = record(json!({"id": "A", "description": "Office"}));
        assert_eq!(render("{description}_{id}", &rec).unwrap(), "Office_A");
    }

    #[test]
    fn test_render_non_string_values() {
        let rec = record(json!({"n": 7, "ok": false}));
        assert_eq!(render("n={n} ok={ok}", &rec).unwrap(), "n=7 ok=false");
    }

    #[test]
    fn test_render_escaped_braces() {
        let rec = record(json!({"id": "A"}));
        assert_eq!(render("{{{id}}}", &rec).unwrap(), "{A}");
        assert_eq!(render(r"\d{{3}}", &rec).unwrap(), r"\d{3}");
    }

    #[test]
    fn test_render_missing_field() {
        let rec = record(json!({"id": "A"}));
        let err = render("{id}_{name}", &rec).unwrap_err();
        assert!(matches!(err, JsonPipeError::MissingField { field } if field == "name"));
    }

    #[test]
    fn test_render_unbalanced() {
        let rec = record(json!({"id": "A"}));
        assert!(matches!(render("{id", &rec), Err(JsonPipeError::Config(_))));
        assert!(matches!(render("id}", &rec), Err(JsonPipeError::Config(_))));
    }

    #[test]
    fn test_render_plain_text_and_unicode() {
        let rec = record(json!({"city": "Zürich"}));
        assert_eq!(render("café {city}", &rec).unwrap(), "café Zürich");
    }
}
