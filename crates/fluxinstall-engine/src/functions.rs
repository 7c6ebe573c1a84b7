//! Template functions (global functions available in templates)
//!
//! The install templates get exactly three helpers, registered from an
//! explicit [`FunctionTable`] rather than a process-wide registry:
//!
//! ```jinja2
//! - --git-path={{ join(",", git_paths) }}
//! {{ indent(4, config_file_content) }}
//! flux-config.yaml: "{{ base64enc(config_file_content) }}"
//! ```

use base64::Engine as _;
use minijinja::{Environment, Value};

/// Concatenate strings with a separator (no trailing separator)
///
/// Usage: {{ join(",", git_paths) }}
#[must_use]
pub fn join(separator: String, items: Vec<String>) -> String {
    items.join(&separator)
}

/// Prefix every line of `text` with `spaces` spaces
///
/// The first line is padded, and so is every line following a newline,
/// blank lines included.
///
/// Usage: {{ indent(4, config_file_content) }}
#[must_use]
pub fn indent(spaces: usize, text: String) -> String {
    let pad = " ".repeat(spaces);
    let mut result = String::with_capacity(text.len() + spaces * (text.matches('\n').count() + 1));

    result.push_str(&pad);
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            result.push('\n');
            result.push_str(&pad);
        }
        result.push_str(line);
    }

    result
}

/// Base64 encode a string (standard alphabet, padded)
///
/// Usage: {{ base64enc(config_file_content) }}
#[must_use]
pub fn base64enc(text: String) -> String {
    base64::engine::general_purpose::STANDARD.encode(text.as_bytes())
}

/// Named functions injected into every template environment
#[derive(Debug, Clone)]
pub struct FunctionTable {
    entries: Vec<(&'static str, Value)>,
}

impl Default for FunctionTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl FunctionTable {
    /// The `join`, `indent` and `base64enc` helpers
    pub fn standard() -> Self {
        Self {
            entries: vec![
                ("join", Value::from_function(join)),
                ("indent", Value::from_function(indent)),
                ("base64enc", Value::from_function(base64enc)),
            ],
        }
    }

    /// Function names, in registration order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| *n == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Register every function as a global of `env`
    pub fn install(&self, env: &mut Environment<'_>) {
        for (name, function) in &self.entries {
            env.add_global(*name, function.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join() {
        assert_eq!(join(",".to_string(), vec!["dir1".into(), "dir2".into()]), "dir1,dir2");
        assert_eq!(join(",".to_string(), vec!["only".into()]), "only");
        assert_eq!(join(",".to_string(), vec![]), "");
    }

    #[test]
    fn test_indent() {
        let result = indent(4, "line1\nline2".to_string());
        assert_eq!(result, "    line1\n    line2");
    }

    #[test]
    fn test_indent_pads_blank_lines() {
        let result = indent(2, "a\n\nb".to_string());
        assert_eq!(result, "  a\n  \n  b");
    }

    #[test]
    fn test_indent_trailing_newline() {
        let result = indent(2, "a\n".to_string());
        assert_eq!(result, "  a\n  ");
    }

    #[test]
    fn test_indent_empty() {
        assert_eq!(indent(3, String::new()), "   ");
        assert_eq!(indent(0, "x\ny".to_string()), "x\ny");
    }

    #[test]
    fn test_base64enc() {
        insta::assert_snapshot!(base64enc("hello world".to_string()), @"aGVsbG8gd29ybGQ=");
        assert_eq!(base64enc(String::new()), "");
        assert_eq!(base64enc("a".to_string()), "YQ==");
    }

    #[test]
    fn test_standard_table() {
        let table = FunctionTable::standard();
        let names: Vec<_> = table.names().collect();
        assert_eq!(names, vec!["join", "indent", "base64enc"]);
        assert!(table.contains("indent"));
        assert!(!table.contains("StringsJoin"));
    }

    #[test]
    fn test_install_into_environment() {
        let mut env = Environment::new();
        FunctionTable::standard().install(&mut env);

        let rendered = env
            .render_str(
                r#"{{ join("-", ["a", "b", "c"]) }}|{{ indent(2, "x\ny") }}|{{ base64enc("a") }}"#,
                (),
            )
            .unwrap();
        assert_eq!(rendered, "a-b-c|  x\n  y|YQ==");
    }
}
