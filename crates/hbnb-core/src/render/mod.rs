//! Human-readable rendering of entity attribute values
//!
//! Strings are single-quoted with `'` and `\` escaped, numbers are bare,
//! lists and maps render their elements with the same rules.

use serde_json::Value;

/// Render one attribute value for `show` / `all` output
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote(s),
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(render_value).collect();
            format!("[{}]", inner.join(", "))
        }
        Value::Object(map) => {
            let inner: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", k, render_value(v)))
                .collect();
            format!("{{{}}}", inner.join(", "))
        }
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_scalars() {
        assert_eq!(render_value(&json!("John")), "'John'");
        assert_eq!(render_value(&json!(3)), "3");
        assert_eq!(render_value(&json!(3.5)), "3.5");
        assert_eq!(render_value(&json!(true)), "true");
        assert_eq!(render_value(&Value::Null), "null");
    }

    #[test]
    fn test_render_escapes_quotes() {
        assert_eq!(render_value(&json!("it's")), "'it\\'s'");
    }

    #[test]
    fn test_render_list() {
        assert_eq!(render_value(&json!(["a", 1])), "['a', 1]");
    }
}
