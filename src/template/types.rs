//! Template types and errors

use std::fmt;

use thiserror::Error;

/// Template-specific error type
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Template unreadable: {id}: {source}")]
    Unreadable {
        id: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed template {id}: {source}")]
    Malformed {
        id: String,
        #[source]
        source: MalformedTemplate,
    },
}

/// Result type for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Structural defect found while parsing template text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason} (at byte {position})")]
pub struct MalformedTemplate {
    /// Byte offset of the offending marker
    pub position: usize,
    pub reason: String,
}

impl MalformedTemplate {
    pub(crate) fn new(position: usize, reason: impl Into<String>) -> Self {
        Self {
            position,
            reason: reason.into(),
        }
    }
}

/// One node of a parsed template.
///
/// Conditional branches only ever contain `Literal` and `Scalar` nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Text copied to the output unchanged
    Literal(String),
    /// `{{name}}`
    Scalar(String),
    /// `{{#if name}}…{{else}}…{{/if}}`
    Conditional {
        name: String,
        then_branch: Vec<Node>,
        else_branch: Option<Vec<Node>>,
    },
}

/// A parsed, validated template ready for rendering
#[derive(Debug, Clone)]
pub struct Template {
    id: String,
    source: String,
    nodes: Vec<Node>,
}

impl Template {
    /// Parse `source` under the given identifier
    pub fn parse(id: impl Into<String>, source: impl Into<String>) -> TemplateResult<Self> {
        let id = id.into();
        let source = source.into();
        let nodes = super::parser::parse(&source).map_err(|source| TemplateError::Malformed {
            id: id.clone(),
            source,
        })?;

        Ok(Self { id, source, nodes })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The raw template text as loaded
    pub fn raw(&self) -> &str {
        &self.source
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} nodes)", self.id, self.nodes.len())
    }
}

/// Check a template identifier: 1-64 chars of alphanumerics, dash or underscore
pub fn is_valid_template_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 64
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_id_validation() {
        assert!(is_valid_template_id("verify-email"));
        assert!(is_valid_template_id("payment_unconfirmed"));
        assert!(!is_valid_template_id(""));
        assert!(!is_valid_template_id("../etc/passwd"));
        assert!(!is_valid_template_id(&"a".repeat(65)));
    }

    #[test]
    fn test_parse_reports_template_id() {
        let err = Template::parse("broken", "{{#if x}}never closed").unwrap_err();
        match err {
            TemplateError::Malformed { id, source } => {
                assert_eq!(id, "broken");
                assert_eq!(source.position, 0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
