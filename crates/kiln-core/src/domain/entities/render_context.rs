//! Variable substitution context for template rendering.
//!
//! ## Built-in Variables
//!
//! | Variable | Example | Source |
//! |----------|---------|--------|
//! | `PROJECT_NAME` | "Shop Platform" | Project |
//! | `PROJECT_NAME_SNAKE` | "shop_platform" | Computed |
//! | `PROJECT_NAME_KEBAB` | "shop-platform" | Computed |
//! | `PROJECT_NAME_PASCAL` | "ShopPlatform" | Computed |
//! | `REPOSITORY_NAME` | "shop" | Project |
//! | `USER_NAME` | "alice" | Project |
//! | `CORE_VERSION` | "1.2.0" | Project |
//! | `NODE_ID` | "n1" | Node |
//! | `NODE_NAME` (+ `_SNAKE`, `_KEBAB`, `_PASCAL`) | "order-api" | Node |
//! | `LANGUAGE` | "go" | Node |
//! | `YEAR` | "2026" | Clock |
//! | `META_<KEY>` | any scalar node metadata | Node |

use std::collections::HashMap;

use chrono::{Datelike, Utc};
use serde_json::Value;

use crate::domain::entities::project::{Node, Project};

#[derive(Debug, Clone)]
pub struct RenderContext {
    variables: HashMap<String, String>,
}

impl RenderContext {
    /// Context with the project-name variables only.
    pub fn new(project_name: impl Into<String>) -> Self {
        let name = project_name.into();
        let mut ctx = Self {
            variables: HashMap::new(),
        };
        ctx.insert_cased("PROJECT_NAME", &name);
        ctx.variables
            .insert("YEAR".to_string(), Utc::now().year().to_string());
        ctx
    }

    /// Full context for rendering `node` of `project`.
    pub fn for_node(project: &Project, node: &Node) -> Self {
        let mut ctx = Self::new(&project.name)
            .with_variable("REPOSITORY_NAME", &project.repository_name)
            .with_variable("USER_NAME", &project.user_name)
            .with_variable("CORE_VERSION", &project.core_version)
            .with_variable("NODE_ID", &node.id)
            .with_variable("LANGUAGE", &node.language);
        ctx.insert_cased("NODE_NAME", &node.name);

        for (key, value) in node.metadata.iter() {
            let scalar = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => continue,
            };
            let var = format!("META_{}", to_snake_case(key).to_uppercase());
            ctx.variables.insert(var, scalar);
        }

        ctx
    }

    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(|s| s.as_str())
    }

    /// Replace every `{{VARIABLE}}` placeholder with its value.
    ///
    /// Single left-to-right pass: substituted values are emitted verbatim
    /// and never scanned again. Unknown placeholders are left untouched.
    pub fn render(&self, template: &str) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];

            let Some(end) = after.find("}}") else {
                rest = &rest[start..];
                break;
            };

            match self.variables.get(&after[..end]) {
                Some(value) => {
                    result.push_str(value);
                    rest = &after[end + 2..];
                }
                None => {
                    // Step one brace so `{{{{KEY}}` still resolves the inner name.
                    result.push('{');
                    rest = &rest[start + 1..];
                }
            }
        }

        result.push_str(rest);
        result
    }

    fn insert_cased(&mut self, base: &str, value: &str) {
        self.variables.insert(base.to_string(), value.to_string());
        self.variables
            .insert(format!("{base}_SNAKE"), to_snake_case(value));
        self.variables
            .insert(format!("{base}_KEBAB"), to_kebab_case(value));
        self.variables
            .insert(format!("{base}_PASCAL"), to_pascal_case(value));
    }
}

// ============================================================================
// String Case Conversion Helpers
// ============================================================================

pub(crate) fn to_snake_case(s: &str) -> String {
    split_words(s).join("_")
}

pub(crate) fn to_kebab_case(s: &str) -> String {
    split_words(s).join("-")
}

pub(crate) fn to_pascal_case(s: &str) -> String {
    split_words(s)
        .into_iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => {
                    let mut out = String::new();
                    out.extend(first.to_uppercase());
                    out.push_str(chars.as_str());
                    out
                }
                None => String::new(),
            }
        })
        .collect()
}

/// Split on `_`, `-`, `.`, whitespace, camelCase transitions and acronym
/// boundaries (`HTTPServer` → `http`, `server`).
fn split_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '_' || c == '-' || c == '.' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(current.to_lowercase());
                current.clear();
            }
            continue;
        }

        if let Some(&next) = chars.peek() {
            let camel = c.is_lowercase() && next.is_uppercase();
            let acronym = c.is_uppercase()
                && next.is_uppercase()
                && chars.clone().nth(1).is_some_and(|n| n.is_lowercase());
            if camel || acronym {
                current.push(c);
                words.push(current.to_lowercase());
                current.clear();
                continue;
            }
        }

        current.push(c);
    }

    if !current.is_empty() {
        words.push(current.to_lowercase());
    }

    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::metadata::Metadata;
    use crate::domain::entities::project::ModificationDetails;
    use serde_json::json;

    fn project() -> Project {
        Project {
            name: "Shop Platform".into(),
            repository_name: "shop".into(),
            user_name: "alice".into(),
            core_version: "1.2.0".into(),
            metadata: Metadata::new(),
            nodes: vec![],
            modification_details: ModificationDetails::new("alice", Utc::now()),
        }
    }

    #[test]
    fn project_name_variants() {
        let ctx = RenderContext::new("my awesome project");
        assert_eq!(ctx.get("PROJECT_NAME_SNAKE"), Some("my_awesome_project"));
        assert_eq!(ctx.get("PROJECT_NAME_KEBAB"), Some("my-awesome-project"));
        assert_eq!(ctx.get("PROJECT_NAME_PASCAL"), Some("MyAwesomeProject"));
    }

    #[test]
    fn node_context_includes_scalar_metadata() {
        let mut metadata = Metadata::new();
        metadata.insert("port", json!(8080));
        metadata.insert("goModule", "example.com/orders");
        metadata.insert("license", json!({"path": "/x"}));
        let node = Node::new("n1", "order-api", "go").with_metadata(metadata);

        let ctx = RenderContext::for_node(&project(), &node);

        assert_eq!(ctx.get("NODE_NAME_PASCAL"), Some("OrderApi"));
        assert_eq!(ctx.get("LANGUAGE"), Some("go"));
        assert_eq!(ctx.get("META_PORT"), Some("8080"));
        assert_eq!(ctx.get("META_GO_MODULE"), Some("example.com/orders"));
        assert_eq!(ctx.get("META_LICENSE"), None);
    }

    #[test]
    fn render_leaves_unknown_placeholders() {
        let ctx = RenderContext::new("demo");
        assert_eq!(
            ctx.render("{{PROJECT_NAME}} {{UNKNOWN}}"),
            "demo {{UNKNOWN}}"
        );
    }

    #[test]
    fn metadata_values_are_not_rendered_again() {
        let mut metadata = Metadata::new();
        metadata.insert("description", "service for {{PROJECT_NAME}}");
        let node = Node::new("n1", "orders", "go").with_metadata(metadata);

        let outputs: std::collections::HashSet<String> = (0..200)
            .map(|_| RenderContext::for_node(&project(), &node).render("{{META_DESCRIPTION}}"))
            .collect();

        assert_eq!(outputs.len(), 1);
        assert!(outputs.contains("service for {{PROJECT_NAME}}"));
    }

    #[test]
    fn render_handles_adjacent_and_unterminated_placeholders() {
        let ctx = RenderContext::new("demo").with_variable("A", "x");
        assert_eq!(ctx.render("{{A}}{{A}}-{{PROJECT_NAME}}"), "xx-demo");
        assert_eq!(ctx.render("{{NOPE}} {{A}}"), "{{NOPE}} x");
        assert_eq!(ctx.render("tail {{A"), "tail {{A");
        assert_eq!(ctx.render("{{{{A}}"), "{{x");
    }

    #[test]
    fn split_words_handles_acronyms() {
        assert_eq!(to_snake_case("HTTPServer"), "http_server");
        assert_eq!(to_snake_case("orderApi"), "order_api");
    }
}
