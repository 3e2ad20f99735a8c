//! Rendering of parsed templates against a context

use std::time::Instant;

use super::context::TemplateContext;
use super::format::Formatter;
use super::types::{Node, Template, TemplateResult};
use crate::metrics::TemplateMetrics;

/// Resolves conditional blocks and substitutes `{{name}}` placeholders.
///
/// Branch selection happens before substitution, and every substituted
/// value is emitted once: text produced by a value is never scanned again.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderEngine {
    formatter: Formatter,
}

impl PlaceholderEngine {
    pub fn new(formatter: Formatter) -> Self {
        Self { formatter }
    }

    pub fn formatter(&self) -> &Formatter {
        &self.formatter
    }

    /// Parse and render raw template text in one step
    pub fn render(&self, raw: &str, context: &TemplateContext) -> TemplateResult<String> {
        let template = Template::parse("inline", raw)?;
        Ok(self.render_template(&template, context))
    }

    /// Render an already-parsed template.
    ///
    /// Placeholders without a binding render as the empty string.
    pub fn render_template(&self, template: &Template, context: &TemplateContext) -> String {
        let started = Instant::now();
        let mut output = String::with_capacity(template.raw().len());
        self.render_nodes(template.nodes(), context, &mut output);

        TemplateMetrics::record_render(template.id(), started.elapsed());
        output
    }

    fn render_nodes(&self, nodes: &[Node], context: &TemplateContext, output: &mut String) {
        for node in nodes {
            match node {
                Node::Literal(text) => output.push_str(text),
                Node::Scalar(name) => {
                    if let Some(value) = context.get(name) {
                        output.push_str(&self.formatter.value(value));
                    }
                }
                Node::Conditional {
                    name,
                    then_branch,
                    else_branch,
                } => {
                    if context.is_truthy(name) {
                        self.render_nodes(then_branch, context, output);
                    } else if let Some(branch) = else_branch {
                        self.render_nodes(branch, context, output);
                    }
                }
            }
        }
    }
}
