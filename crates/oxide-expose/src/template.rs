//! Route template compilation.
//!
//! A template is a path made of literal text, typed placeholders and
//! optional groups:
//!
//! - `/posts` - literal path
//! - `/posts/<int:id>` - typed placeholder (`<id>` defaults to `str`)
//! - `/posts/<int:id>(/<str:slug>)?` - optional group, may nest
//!
//! The same node tree drives both the anchored matching regex and the
//! reverse walk used to build URLs.

use std::collections::HashSet;

use regex::Regex;

use crate::converter::{Converter, Value};
use crate::error::{ExposeError, Result};
use crate::request::RouteArgs;

/// A typed placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    /// Parameter name.
    pub name: String,
    /// Converter used to match, parse and format the value.
    pub converter: Converter,
    /// Position in depth-first, left-to-right order.
    pub index: usize,
}

/// A node of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateNode {
    /// Literal text, matched verbatim.
    Literal(String),
    /// A typed placeholder.
    Placeholder(ParamSpec),
    /// A span that may be entirely absent.
    OptionalGroup(Vec<TemplateNode>),
}

/// Outcome of a reverse walk over a node sequence.
enum Walk {
    Complete,
    /// A required placeholder had no argument left.
    MissingArg,
    /// An optional group could not be filled.
    SkippedGroup,
}

/// A compiled route template.
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    source: String,
    nodes: Vec<TemplateNode>,
    regex: Regex,
    params: Vec<ParamSpec>,
}

impl CompiledTemplate {
    /// Compiles a template.
    ///
    /// # Errors
    ///
    /// Fails on unknown converter ids, malformed placeholders, duplicate
    /// parameter names, unbalanced or empty groups, and `any` placeholders
    /// that are not the last node.
    ///
    /// # Example
    ///
    /// ```
    /// use oxide_expose::{CompiledTemplate, Value};
    ///
    /// let template = CompiledTemplate::compile("/posts/<int:id>(/<str:slug>)?")
    ///     .unwrap();
    /// let args = template.captures("/posts/7/hello").unwrap();
    /// assert_eq!(args.get("id"), Some(&Value::Int(7)));
    /// assert_eq!(args.str("slug"), Some("hello"));
    /// ```
    pub fn compile(template: &str) -> Result<Self> {
        let nodes = Parser::new(template).parse()?;

        let mut params = Vec::new();
        collect_params(&nodes, &mut params);

        let mut seen = HashSet::new();
        for param in &params {
            if !seen.insert(param.name.as_str()) {
                return Err(ExposeError::DuplicateParam {
                    template: template.to_string(),
                    param: param.name.clone(),
                });
            }
        }

        let mut trailing_any = None;
        check_any_is_last(&nodes, template, &mut trailing_any)?;

        let mut pattern = String::from("^");
        write_pattern(&nodes, &mut pattern);
        pattern.push('$');
        let regex = Regex::new(&pattern)?;

        Ok(Self {
            source: template.to_string(),
            nodes,
            regex,
            params,
        })
    }

    /// Returns the template source.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the parsed node tree.
    pub fn nodes(&self) -> &[TemplateNode] {
        &self.nodes
    }

    /// Returns the anchored matching pattern.
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Returns parameters in positional order.
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Matches a whole path and converts the captured values.
    ///
    /// Returns `None` when the path does not match structurally or when a
    /// captured value fails to parse. Placeholders inside an absent optional
    /// group are left out of the result.
    pub fn captures(&self, path: &str) -> Option<RouteArgs> {
        let caps = self.regex.captures(path)?;

        let mut args = RouteArgs::new();
        for param in &self.params {
            let Some(raw) = caps.get(param.index + 1) else {
                continue;
            };
            let Some(value) = param.converter.parse(raw.as_str()) else {
                tracing::trace!(
                    template = %self.source,
                    param = %param.name,
                    converter = %param.converter,
                    raw = raw.as_str(),
                    "converter rejected captured value"
                );
                return None;
            };
            args.insert(param.name.clone(), value);
        }

        Some(args)
    }

    /// Builds a path from positional arguments.
    ///
    /// Building stops at the first placeholder with no argument left, and at
    /// an optional group whose placeholders cannot all be filled. A dangling
    /// `/` is dropped only when a required placeholder is left unfilled, so a
    /// path that stops before an optional group still matches this template.
    /// Extra arguments are ignored.
    pub fn reverse(&self, args: &[Value]) -> String {
        let mut path = String::new();
        let mut cursor = 0;

        if let Walk::MissingArg = reverse_nodes(&self.nodes, args, &mut cursor, &mut path) {
            if path.ends_with('/') {
                path.pop();
            }
        }

        if path.is_empty() {
            path.push('/');
        }

        path
    }
}

fn reverse_nodes(
    nodes: &[TemplateNode],
    args: &[Value],
    cursor: &mut usize,
    out: &mut String,
) -> Walk {
    for node in nodes {
        match node {
            TemplateNode::Literal(text) => out.push_str(text),
            TemplateNode::Placeholder(param) => {
                let Some(value) = args.get(*cursor) else {
                    return Walk::MissingArg;
                };
                out.push_str(&param.converter.format(value));
                *cursor += 1;
            }
            TemplateNode::OptionalGroup(inner) => {
                let remaining = args.len().saturating_sub(*cursor);
                if remaining == 0 || remaining < required_params(inner) {
                    return Walk::SkippedGroup;
                }
                let walk = reverse_nodes(inner, args, cursor, out);
                if !matches!(walk, Walk::Complete) {
                    return walk;
                }
            }
        }
    }
    Walk::Complete
}

/// Placeholders a group needs filled, nested groups excluded.
fn required_params(nodes: &[TemplateNode]) -> usize {
    nodes
        .iter()
        .filter(|node| matches!(node, TemplateNode::Placeholder(_)))
        .count()
}

fn collect_params(nodes: &[TemplateNode], params: &mut Vec<ParamSpec>) {
    for node in nodes {
        match node {
            TemplateNode::Literal(_) => {}
            TemplateNode::Placeholder(param) => params.push(param.clone()),
            TemplateNode::OptionalGroup(inner) => collect_params(inner, params),
        }
    }
}

fn check_any_is_last(
    nodes: &[TemplateNode],
    template: &str,
    any: &mut Option<String>,
) -> Result<()> {
    for node in nodes {
        if let Some(param) = any {
            return Err(ExposeError::MisplacedAny {
                template: template.to_string(),
                param: param.clone(),
            });
        }
        match node {
            TemplateNode::Literal(_) => {}
            TemplateNode::Placeholder(param) => {
                if param.converter == Converter::Any {
                    *any = Some(param.name.clone());
                }
            }
            TemplateNode::OptionalGroup(inner) => check_any_is_last(inner, template, any)?,
        }
    }
    Ok(())
}

fn write_pattern(nodes: &[TemplateNode], pattern: &mut String) {
    for node in nodes {
        match node {
            TemplateNode::Literal(text) => pattern.push_str(&regex::escape(text)),
            TemplateNode::Placeholder(param) => {
                pattern.push('(');
                pattern.push_str(param.converter.regex_fragment());
                pattern.push(')');
            }
            TemplateNode::OptionalGroup(inner) => {
                pattern.push_str("(?:");
                write_pattern(inner, pattern);
                pattern.push_str(")?");
            }
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Single-pass template parser.
struct Parser<'a> {
    template: &'a str,
    /// Open groups: the byte offset of `(` and the nodes collected so far.
    stack: Vec<(usize, Vec<TemplateNode>)>,
    literal: String,
    next_index: usize,
}

impl<'a> Parser<'a> {
    fn new(template: &'a str) -> Self {
        Self {
            template,
            stack: vec![(0, Vec::new())],
            literal: String::new(),
            next_index: 0,
        }
    }

    fn parse(mut self) -> Result<Vec<TemplateNode>> {
        let bytes = self.template.as_bytes();
        let mut pos = 0;

        while pos < bytes.len() {
            match bytes[pos] {
                b'<' => pos = self.placeholder(pos)?,
                b'(' => {
                    self.flush_literal();
                    self.stack.push((pos, Vec::new()));
                    pos += 1;
                }
                b')' => pos = self.close_group(pos)?,
                _ => {
                    let rest = &self.template[pos..];
                    let end = rest.find(['<', '(', ')']).unwrap_or(rest.len());
                    self.literal.push_str(&rest[..end]);
                    pos += end;
                }
            }
        }

        self.flush_literal();
        if self.stack.len() > 1 {
            let offset = self.stack[self.stack.len() - 1].0;
            return Err(self.unbalanced(offset));
        }
        Ok(self.stack.pop().map(|(_, nodes)| nodes).unwrap_or_default())
    }

    /// Parses `<converter:name>` or `<name>` starting at `start`.
    fn placeholder(&mut self, start: usize) -> Result<usize> {
        let rest = &self.template[start..];
        let Some(end) = rest.find('>') else {
            return Err(ExposeError::InvalidPlaceholder {
                template: self.template.to_string(),
                placeholder: rest.to_string(),
            });
        };
        let inner = &rest[1..end];

        let (converter_id, name) = inner.split_once(':').unwrap_or(("str", inner));
        if !is_identifier(name) {
            return Err(ExposeError::InvalidPlaceholder {
                template: self.template.to_string(),
                placeholder: rest[..=end].to_string(),
            });
        }
        let converter =
            Converter::from_id(converter_id).ok_or_else(|| ExposeError::UnknownConverter {
                template: self.template.to_string(),
                converter: converter_id.to_string(),
            })?;

        self.flush_literal();
        self.push(TemplateNode::Placeholder(ParamSpec {
            name: name.to_string(),
            converter,
            index: self.next_index,
        }));
        self.next_index += 1;

        Ok(start + end + 1)
    }

    /// Closes a group at `pos`, which must read `)?`.
    fn close_group(&mut self, pos: usize) -> Result<usize> {
        if self.stack.len() < 2 || self.template.as_bytes().get(pos + 1) != Some(&b'?') {
            return Err(self.unbalanced(pos));
        }
        self.flush_literal();
        let Some((_, nodes)) = self.stack.pop() else {
            return Err(self.unbalanced(pos));
        };
        if nodes.is_empty() {
            return Err(ExposeError::EmptyGroup(self.template.to_string()));
        }
        self.push(TemplateNode::OptionalGroup(nodes));
        Ok(pos + 2)
    }

    fn flush_literal(&mut self) {
        if !self.literal.is_empty() {
            let text = std::mem::take(&mut self.literal);
            self.push(TemplateNode::Literal(text));
        }
    }

    fn push(&mut self, node: TemplateNode) {
        if let Some((_, nodes)) = self.stack.last_mut() {
            nodes.push(node);
        }
    }

    fn unbalanced(&self, offset: usize) -> ExposeError {
        ExposeError::UnbalancedGroup {
            template: self.template.to_string(),
            offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(template: &str) -> CompiledTemplate {
        CompiledTemplate::compile(template).unwrap()
    }

    #[test]
    fn test_literal_template() {
        let template = compile("/users");
        assert_eq!(template.pattern(), "^/users$");
        assert!(template.captures("/users").is_some());
        assert!(template.captures("/users/").is_none());
        assert!(template.captures("/posts").is_none());
    }

    #[test]
    fn test_placeholder_defaults_to_str() {
        let template = compile("/users/<name>");
        assert_eq!(template.params()[0].converter, Converter::Str);
        let args = template.captures("/users/ann").unwrap();
        assert_eq!(args.str("name"), Some("ann"));
    }

    #[test]
    fn test_nested_groups() {
        let template = compile("/a(/<int:x>(/<int:y>)?)?");
        assert_eq!(template.pattern(), r"^/a(?:/(\d+)(?:/(\d+))?)?$");
        assert_eq!(template.captures("/a").unwrap().len(), 0);
        assert_eq!(template.captures("/a/1").unwrap().int("x"), Some(1));
        assert_eq!(template.captures("/a/1/2").unwrap().int("y"), Some(2));
        assert!(template.captures("/a//2").is_none());
    }

    #[test]
    fn test_params_are_depth_first() {
        let template = compile("/<int:a>(/<str:b>(.<str:c>)?)?/<any:d>");
        let names: Vec<_> = template.params().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c", "d"]);
        let indexes: Vec<_> = template.params().iter().map(|p| p.index).collect();
        assert_eq!(indexes, [0, 1, 2, 3]);
    }

    #[test]
    fn test_parse_failure_is_non_match() {
        let template = compile("/d/<date:day>");
        assert!(template.captures("/d/2000-01-01").is_some());
        assert!(template.captures("/d/2000-02-31").is_none());
    }

    #[test]
    fn test_literal_is_escaped() {
        let template = compile("/file.json");
        assert!(template.captures("/file.json").is_some());
        assert!(template.captures("/filexjson").is_none());
    }

    #[test]
    fn test_unknown_converter() {
        let err = CompiledTemplate::compile("/<uuid:id>").unwrap_err();
        assert!(matches!(
            err,
            ExposeError::UnknownConverter { converter, .. } if converter == "uuid"
        ));
    }

    #[test]
    fn test_unbalanced_groups() {
        for template in ["/a(/<int:b>", "/a/<int:b>)?", "/a(/b)", "/a((/b)?"] {
            let err = CompiledTemplate::compile(template).unwrap_err();
            assert!(
                matches!(err, ExposeError::UnbalancedGroup { .. }),
                "{template}: {err:?}"
            );
        }
    }

    #[test]
    fn test_empty_group() {
        let err = CompiledTemplate::compile("/a()?").unwrap_err();
        assert!(matches!(err, ExposeError::EmptyGroup(_)));
    }

    #[test]
    fn test_invalid_placeholders() {
        for template in ["/<int:>", "/<int:a", "/<1a>", "/<int:a-b>"] {
            let err = CompiledTemplate::compile(template).unwrap_err();
            assert!(
                matches!(err, ExposeError::InvalidPlaceholder { .. }),
                "{template}: {err:?}"
            );
        }
    }

    #[test]
    fn test_any_matches_newlines() {
        let template = compile("/f/<any:p>");
        let path = template.reverse(&["a\nb/c".into()]);
        assert_eq!(path, "/f/a\nb/c");
        assert_eq!(template.captures(&path).unwrap().str("p"), Some("a\nb/c"));
    }

    #[test]
    fn test_duplicate_param() {
        let err = CompiledTemplate::compile("/<a>/<int:a>").unwrap_err();
        assert!(matches!(err, ExposeError::DuplicateParam { param, .. } if param == "a"));
    }

    #[test]
    fn test_any_must_be_last() {
        assert!(CompiledTemplate::compile("/files/<any:path>").is_ok());
        assert!(CompiledTemplate::compile("/files(/<any:path>)?").is_ok());
        for template in [
            "/files/<any:path>/raw",
            "/files/<any:path>/<str:name>",
            "/files(/<any:path>)?/x",
        ] {
            let err = CompiledTemplate::compile(template).unwrap_err();
            assert!(
                matches!(err, ExposeError::MisplacedAny { .. }),
                "{template}: {err:?}"
            );
        }
    }

    #[test]
    fn test_reverse_required_params() {
        let template = compile("/test2/<int:a>/<str:b>");
        assert_eq!(template.reverse(&[]), "/test2");
        assert_eq!(template.reverse(&[2.into()]), "/test2/2");
        assert_eq!(template.reverse(&[2.into(), "foo".into()]), "/test2/2/foo");
        assert_eq!(
            template.reverse(&[2.into(), "foo".into(), "extra".into()]),
            "/test2/2/foo"
        );
    }

    #[test]
    fn test_reverse_optional_groups() {
        let template = compile("/test3/<int:a>/foo(/<str:b>)?(.<str:c>)?");
        assert_eq!(template.reverse(&[]), "/test3");
        assert_eq!(template.reverse(&[2.into()]), "/test3/2/foo");
        assert_eq!(template.reverse(&[2.into(), "bar".into()]), "/test3/2/foo/bar");
        assert_eq!(
            template.reverse(&[2.into(), "bar".into(), "json".into()]),
            "/test3/2/foo/bar.json"
        );
    }

    #[test]
    fn test_reverse_does_not_emit_partial_group() {
        let template = compile("/p(/<int:a>-<int:b>)?");
        assert_eq!(template.reverse(&[1.into()]), "/p");
        assert_eq!(template.reverse(&[1.into(), 2.into()]), "/p/1-2");
    }

    #[test]
    fn test_reverse_keeps_slash_before_skipped_group() {
        let template = compile("/x/<int:a>/(<str:b>)?");
        let path = template.reverse(&[1.into()]);
        assert_eq!(path, "/x/1/");
        assert_eq!(template.captures(&path).unwrap().int("a"), Some(1));

        let path = template.reverse(&[1.into(), "y".into()]);
        assert_eq!(path, "/x/1/y");
        assert_eq!(template.captures(&path).unwrap().str("b"), Some("y"));

        let nested = compile("/n/<int:a>(/<int:b>/(<str:c>)?)?");
        let path = nested.reverse(&[1.into(), 2.into()]);
        assert_eq!(path, "/n/1/2/");
        assert!(nested.captures(&path).is_some());
    }

    #[test]
    fn test_reverse_root() {
        assert_eq!(compile("/").reverse(&[]), "/");
        assert_eq!(compile("/<int:a>").reverse(&[]), "/");
    }
}
