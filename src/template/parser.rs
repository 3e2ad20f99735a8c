//! Parser turning template text into a flat node list with conditional blocks.
//!
//! Markers:
//! - `{{name}}` scalar placeholder
//! - `{{#if name}}`, `{{else}}`, `{{/if}}` conditional block
//!
//! Blocks do not nest. A `{{` that does not open one of the markers above
//! stays literal text and scanning resumes right after it.

use super::types::{MalformedTemplate, Node};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// A classified `{{…}}` marker
enum Marker<'a> {
    Scalar(&'a str),
    If(&'a str),
    Else,
    EndIf,
    Text,
}

/// Block currently being filled
struct OpenBlock {
    name: String,
    position: usize,
    then_branch: Vec<Node>,
    else_branch: Option<Vec<Node>>,
}

impl OpenBlock {
    fn current_branch(&mut self) -> &mut Vec<Node> {
        match self.else_branch {
            Some(ref mut nodes) => nodes,
            None => &mut self.then_branch,
        }
    }
}

/// Parse template text into nodes
pub fn parse(source: &str) -> Result<Vec<Node>, MalformedTemplate> {
    let mut nodes: Vec<Node> = Vec::new();
    let mut open: Option<OpenBlock> = None;
    let mut cursor = 0;

    while let Some(offset) = source[cursor..].find(OPEN) {
        let start = cursor + offset;
        let Some(len) = source[start + OPEN.len()..].find(CLOSE) else {
            break;
        };
        let inner = &source[start + OPEN.len()..start + OPEN.len() + len];
        let end = start + OPEN.len() + len + CLOSE.len();

        let target = match open {
            Some(ref mut block) => block.current_branch(),
            None => &mut nodes,
        };
        push_literal(target, &source[cursor..start]);

        match classify(inner, start)? {
            Marker::Scalar(name) => target.push(Node::Scalar(name.to_string())),
            Marker::Text => {
                // Keep only the braces; a real marker may start inside the span
                push_literal(target, OPEN);
                cursor = start + OPEN.len();
                continue;
            }
            Marker::If(name) => {
                if let Some(ref block) = open {
                    return Err(MalformedTemplate::new(
                        start,
                        format!(
                            "conditional block '{}' opened inside block '{}'",
                            name, block.name
                        ),
                    ));
                }
                open = Some(OpenBlock {
                    name: name.to_string(),
                    position: start,
                    then_branch: Vec::new(),
                    else_branch: None,
                });
            }
            Marker::Else => match open {
                Some(ref mut block) if block.else_branch.is_none() => {
                    block.else_branch = Some(Vec::new());
                }
                Some(ref block) => {
                    return Err(MalformedTemplate::new(
                        start,
                        format!("second {{{{else}}}} in block '{}'", block.name),
                    ));
                }
                None => {
                    return Err(MalformedTemplate::new(
                        start,
                        "{{else}} outside of a conditional block",
                    ));
                }
            },
            Marker::EndIf => match open.take() {
                Some(block) => nodes.push(Node::Conditional {
                    name: block.name,
                    then_branch: block.then_branch,
                    else_branch: block.else_branch,
                }),
                None => {
                    return Err(MalformedTemplate::new(
                        start,
                        "{{/if}} without a matching {{#if}}",
                    ));
                }
            },
        }

        cursor = end;
    }

    if let Some(block) = open {
        return Err(MalformedTemplate::new(
            block.position,
            format!("conditional block '{}' is never closed", block.name),
        ));
    }

    push_literal(&mut nodes, &source[cursor..]);
    Ok(nodes)
}

fn classify(inner: &str, position: usize) -> Result<Marker<'_>, MalformedTemplate> {
    let trimmed = inner.trim();

    if let Some(helper) = trimmed.strip_prefix('#') {
        let helper = helper.trim_start();
        let Some(rest) = helper.strip_prefix("if") else {
            return Err(MalformedTemplate::new(
                position,
                format!("unsupported block helper '{{{{{}}}}}'", trimmed),
            ));
        };
        if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
            return Err(MalformedTemplate::new(
                position,
                format!("unsupported block helper '{{{{{}}}}}'", trimmed),
            ));
        }
        let name = rest.trim();
        if name.is_empty() {
            return Err(MalformedTemplate::new(
                position,
                "{{#if}} without a condition name",
            ));
        }
        if !is_identifier(name) {
            return Err(MalformedTemplate::new(
                position,
                format!("invalid condition name '{}'", name),
            ));
        }
        return Ok(Marker::If(name));
    }

    if let Some(closing) = trimmed.strip_prefix('/') {
        if closing.trim() == "if" {
            return Ok(Marker::EndIf);
        }
        return Err(MalformedTemplate::new(
            position,
            format!("unsupported closing marker '{{{{{}}}}}'", trimmed),
        ));
    }

    if trimmed == "else" {
        return Ok(Marker::Else);
    }

    if is_identifier(trimmed) {
        return Ok(Marker::Scalar(trimmed));
    }

    Ok(Marker::Text)
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
}

fn push_literal(nodes: &mut Vec<Node>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Node::Literal(existing)) = nodes.last_mut() {
        existing.push_str(text);
    } else {
        nodes.push(Node::Literal(text.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(text: &str) -> Node {
        Node::Literal(text.to_string())
    }

    fn scalar(name: &str) -> Node {
        Node::Scalar(name.to_string())
    }

    #[test]
    fn test_parse_plain_text() {
        assert_eq!(parse("hello").unwrap(), vec![literal("hello")]);
        assert!(parse("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_scalars() {
        let nodes = parse("Hi {{name}}, from {{ university_name }}!").unwrap();
        assert_eq!(
            nodes,
            vec![
                literal("Hi "),
                scalar("name"),
                literal(", from "),
                scalar("university_name"),
                literal("!"),
            ]
        );
    }

    #[test]
    fn test_parse_conditional_with_else() {
        let nodes = parse("a{{#if paid}}yes {{amount}}{{else}}no{{/if}}b").unwrap();
        assert_eq!(
            nodes,
            vec![
                literal("a"),
                Node::Conditional {
                    name: "paid".to_string(),
                    then_branch: vec![literal("yes "), scalar("amount")],
                    else_branch: Some(vec![literal("no")]),
                },
                literal("b"),
            ]
        );
    }

    #[test]
    fn test_parse_adjacent_blocks_sharing_a_name() {
        let nodes = parse("{{#if x}}1{{/if}}{{#if x}}2{{else}}3{{/if}}").unwrap();
        assert_eq!(nodes.len(), 2);
        assert!(matches!(
            &nodes[1],
            Node::Conditional { else_branch: Some(branch), .. } if branch == &vec![literal("3")]
        ));
    }

    #[test]
    fn test_non_marker_braces_stay_literal() {
        let nodes = parse("{{ not a marker }} and {{").unwrap();
        assert_eq!(nodes, vec![literal("{{ not a marker }} and {{")]);
    }

    #[test]
    fn test_placeholder_after_stray_braces_is_parsed() {
        let nodes = parse("<style>a{{ color: red }</style><p>Hi {{name}}</p>").unwrap();
        assert_eq!(
            nodes,
            vec![
                literal("<style>a{{ color: red }</style><p>Hi "),
                scalar("name"),
                literal("</p>"),
            ]
        );
    }

    #[test]
    fn test_unclosed_block_is_malformed() {
        let err = parse("x {{#if remarks}}text").unwrap_err();
        assert_eq!(err.position, 2);
        assert!(err.reason.contains("never closed"));
    }

    #[test]
    fn test_if_without_name_is_malformed() {
        let err = parse("{{#if}}text{{/if}}").unwrap_err();
        assert!(err.reason.contains("without a condition name"));
    }

    #[test]
    fn test_stray_markers_are_malformed() {
        assert!(parse("text{{/if}}").is_err());
        assert!(parse("text{{else}}").is_err());
        assert!(parse("{{#if a}}1{{else}}2{{else}}3{{/if}}").is_err());
        assert!(parse("{{#each items}}{{/each}}").is_err());
        assert!(parse("{{#iffy a}}{{/if}}").is_err());
    }

    #[test]
    fn test_nested_blocks_are_malformed() {
        let err = parse("{{#if a}}{{#if b}}x{{/if}}{{/if}}").unwrap_err();
        assert!(err.reason.contains("inside block 'a'"));
    }
}
