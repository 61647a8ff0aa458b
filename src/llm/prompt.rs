//! Prompt Templates and Assembly
//!
//! Named prompt templates are loaded once from an embedded TOML document and
//! treated as immutable afterwards. Rendering substitutes `{placeholder}`
//! keys from a value map and fails fast on any placeholder with no mapping,
//! never silently substituting a blank.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::Deserialize;
use tracing::debug;

use crate::types::{ForgeError, Result};

const PROMPTS_TOML: &str = include_str!("prompts.toml");

static TEMPLATES: LazyLock<PromptTemplates> = LazyLock::new(|| {
    // The embedded document is part of the build; a parse failure is a
    // programming error caught by the template tests.
    toml::from_str::<PromptsFile>(PROMPTS_TOML)
        .map(|f| f.prompts)
        .unwrap_or_else(|e| panic!("embedded prompts.toml is invalid: {}", e))
});

#[derive(Debug, Deserialize)]
struct PromptsFile {
    prompts: PromptTemplates,
}

/// The three content-pipeline templates, loaded from embedded TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct PromptTemplates {
    pub preanalysis: String,
    pub core_features: String,
    pub overview: String,
}

impl PromptTemplates {
    /// Access the process-wide template set.
    pub fn get() -> &'static PromptTemplates {
        &TEMPLATES
    }
}

/// Substitute `{placeholder}` keys in `template` from `vars`.
///
/// `{{` and `}}` escape literal braces. A placeholder missing from `vars`
/// is a hard error; unused entries in `vars` are fine.
pub fn render(name: &str, template: &str, vars: &HashMap<&str, String>) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                if chars.peek() == Some(&'{') {
                    chars.next();
                    out.push('{');
                    continue;
                }
                let mut key = String::new();
                let mut closed = false;
                for k in chars.by_ref() {
                    if k == '}' {
                        closed = true;
                        break;
                    }
                    key.push(k);
                }
                if !closed {
                    return Err(ForgeError::MissingPlaceholder {
                        template: name.to_string(),
                        placeholder: format!("{{{}", key),
                    });
                }
                match vars.get(key.as_str()) {
                    Some(value) => out.push_str(value),
                    None => {
                        return Err(ForgeError::MissingPlaceholder {
                            template: name.to_string(),
                            placeholder: key,
                        });
                    }
                }
            }
            '}' => {
                if chars.peek() == Some(&'}') {
                    chars.next();
                }
                out.push('}');
            }
            _ => out.push(c),
        }
    }

    debug!("Rendered template '{}' ({} chars)", name, out.len());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(entries: &[(&'static str, &str)]) -> HashMap<&'static str, String> {
        entries
            .iter()
            .map(|(k, v)| (*k, v.to_string()))
            .collect()
    }

    #[test]
    fn test_basic_substitution() {
        let rendered = render("greet", "Hello {name}", &vars(&[("name", "World")])).unwrap();
        assert_eq!(rendered, "Hello World");
    }

    #[test]
    fn test_missing_placeholder_fails() {
        let err = render("greet", "Hello {name}", &HashMap::new());
        assert!(matches!(
            err,
            Err(ForgeError::MissingPlaceholder { .. })
        ));
    }

    #[test]
    fn test_unused_vars_allowed() {
        let rendered = render(
            "greet",
            "Hello {name}",
            &vars(&[("name", "World"), ("extra", "unused")]),
        )
        .unwrap();
        assert_eq!(rendered, "Hello World");
    }

    #[test]
    fn test_escaped_braces() {
        let rendered = render("fmt", "a {{literal}} and {key}", &vars(&[("key", "v")])).unwrap();
        assert_eq!(rendered, "a {literal} and v");
    }

    #[test]
    fn test_repeated_placeholder() {
        let rendered = render("rep", "{x} and {x}", &vars(&[("x", "1")])).unwrap();
        assert_eq!(rendered, "1 and 1");
    }

    #[test]
    fn test_unterminated_placeholder_fails() {
        let err = render("bad", "Hello {name", &vars(&[("name", "x")]));
        assert!(err.is_err());
    }

    #[test]
    fn test_embedded_templates_parse() {
        let templates = PromptTemplates::get();
        assert!(templates.preanalysis.contains("{tree}"));
        assert!(templates.core_features.contains("{files_content}"));
        assert!(templates.overview.contains("{core_features}"));
    }

    #[test]
    fn test_embedded_templates_render() {
        let templates = PromptTemplates::get();
        let rendered = render(
            "preanalysis",
            &templates.preanalysis,
            &vars(&[("project_name", "demo"), ("tree", "src/main.rs")]),
        )
        .unwrap();
        assert!(rendered.contains("demo"));
        assert!(rendered.contains("src/main.rs"));
    }
}
