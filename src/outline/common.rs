//! Common types and utilities shared across all language walkers.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};
use tree_sitter::Node;

// ============ Patterns ============

static LINE_BREAK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*[\r\n]+\s*").unwrap());
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

// ============ Line Kinds ============

/// Declaration keyword of a JavaScript binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binding {
    Var,
    Let,
    Const,
}

impl Binding {
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword.trim() {
            "let" => Self::Let,
            "const" => Self::Const,
            _ => Self::Var,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Var => "VAR",
            Self::Let => "LET",
            Self::Const => "CONST",
        }
    }
}

/// Label vocabulary shared by every walker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Namespace,
    Class,
    Struct,
    Interface,
    Enum,
    Record,
    Union,
    Method,
    Constructor,
    Destructor,
    Field,
    Property,
    Event,
    Delegate,
    Function,
    FunctionDecl,
    ForwardDecl,
    Variable(Binding),
    ArrowFunction(Binding),
    Getter,
    Setter,
    Decorator,
    ScriptBlock,
    CodeBlock,
    Directive,
    Note,
    Error,
}

impl Kind {
    /// Kinds that own nested declarations and are never folded into a kind group
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Self::Namespace | Self::Class | Self::Struct | Self::Union | Self::Enum | Self::ForwardDecl
        )
    }

    /// Kinds whose children are reordered by kind when regrouped
    pub fn orders_members(&self) -> bool {
        matches!(self, Self::Namespace | Self::Class | Self::Struct | Self::Union)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Namespace => "NAMESPACE",
            Self::Class => "CLASS",
            Self::Struct => "STRUCT",
            Self::Interface => "INTERFACE",
            Self::Enum => "ENUM",
            Self::Record => "RECORD",
            Self::Union => "UNION",
            Self::Method => "METH",
            Self::Constructor => "CONSTRUCTOR",
            Self::Destructor => "DESTRUCTOR",
            Self::Field => "FIELD",
            Self::Property => "PROP",
            Self::Event => "EVENT",
            Self::Delegate => "DELEGATE",
            Self::Function => "FUNC",
            Self::FunctionDecl => "FUNC_DECL",
            Self::ForwardDecl => "FORWARD_DECL",
            Self::Variable(binding) => return write!(f, "VARIABLE ({})", binding.label()),
            Self::ArrowFunction(binding) => {
                return write!(f, "ARROW_FUNCTION ({})", binding.label())
            }
            Self::Getter => "GETTER",
            Self::Setter => "SETTER",
            Self::Decorator => "DECORATOR",
            Self::ScriptBlock => "SCRIPT BLOCK",
            Self::CodeBlock => "CODE BLOCK",
            Self::Directive => "DIRECTIVE",
            Self::Note => "NOTE",
            Self::Error => "ERROR",
        };
        f.write_str(label)
    }
}

impl Serialize for Kind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============ Outline Lines ============

/// One rendered line of an outline.
///
/// `kind` is `None` for bare members listed under a kind group header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineLine {
    pub depth: usize,
    pub kind: Option<Kind>,
    pub text: String,
}

impl OutlineLine {
    pub fn entry(depth: usize, kind: Kind, text: impl Into<String>) -> Self {
        Self {
            depth,
            kind: Some(kind),
            text: text.into(),
        }
    }

    pub fn header(depth: usize, kind: Kind) -> Self {
        Self::entry(depth, kind, String::new())
    }

    pub fn member(depth: usize, text: impl Into<String>) -> Self {
        Self {
            depth,
            kind: None,
            text: text.into(),
        }
    }

    pub fn render(&self) -> String {
        let indent = "  ".repeat(self.depth);
        match self.kind {
            Some(kind) if self.text.is_empty() => format!("{indent}{kind}:"),
            Some(kind) => format!("{indent}{kind}: {}", self.text),
            None => format!("{indent}{}", self.text),
        }
    }
}

/// Lines and directives collected from one source file
#[derive(Debug, Default)]
pub struct Outline {
    pub lines: Vec<OutlineLine>,
    pub directives: BTreeSet<String>,
}

impl Outline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, depth: usize, kind: Kind, text: impl Into<String>) {
        self.lines.push(OutlineLine::entry(depth, kind, text));
    }

    /// Record an import/using/include; blanks are dropped, duplicates collapse
    pub fn directive(&mut self, text: impl AsRef<str>) {
        let text = collapse_whitespace(text.as_ref());
        if !text.is_empty() {
            self.directives.insert(text);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.directives.is_empty()
    }
}

// ============ Text Utilities ============

/// Get the text a node spans, or `default` when the node is absent.
///
/// Invalid UTF-8 is replaced rather than rejected.
pub fn node_text<'a>(node: Option<Node>, source: &'a [u8], default: &'a str) -> Cow<'a, str> {
    let Some(node) = node else {
        return Cow::Borrowed(default);
    };
    let slice = source.get(node.start_byte()..node.end_byte()).unwrap_or(&[]);
    String::from_utf8_lossy(slice)
}

/// Text of a present node
pub fn get_node_text<'a>(node: Node, source: &'a [u8]) -> Cow<'a, str> {
    node_text(Some(node), source, "")
}

/// Text of an optional field, trimmed, with a placeholder when missing or blank
pub fn field_text(node: Node, field: &str, source: &[u8], default: &str) -> String {
    let text = node_text(node.child_by_field_name(field), source, default);
    let text = text.trim();
    if text.is_empty() {
        default.to_string()
    } else {
        text.to_string()
    }
}

/// Collapse a fragment that spans several source lines into one line
pub fn normalize_fragment(text: &str) -> String {
    let trimmed = text.trim();
    if !trimmed.contains('\n') && !trimmed.contains('\r') {
        return trimmed.to_string();
    }
    let joined = LINE_BREAK_RUN.replace_all(trimmed, " ");
    joined.replace("( ", "(").replace(" )", ")")
}

/// Squash every whitespace run to a single space
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text.trim(), " ").into_owned()
}

/// Join a declared type and a name, dropping an empty or `void` type
pub fn join_signature(declared_type: &str, rest: &str) -> String {
    let declared_type = declared_type.trim();
    if declared_type.is_empty() || declared_type == "void" {
        rest.trim().to_string()
    } else {
        format!("{} {}", declared_type, rest.trim())
    }
}

// ============ Node Lookup ============

/// First direct child whose kind is one of `kinds`
pub fn child_of_kind<'a>(node: Node<'a>, kinds: &[&str]) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|child| kinds.contains(&child.kind()));
    found
}

/// Resolve a declaration's name: the `name` field first, then any identifier-like child
pub fn name_node<'a>(node: Node<'a>) -> Option<Node<'a>> {
    node.child_by_field_name("name").or_else(|| {
        child_of_kind(
            node,
            &[
                "identifier",
                "type_identifier",
                "field_identifier",
                "property_identifier",
                "namespace_identifier",
            ],
        )
    })
}

/// Name text with a placeholder when nothing name-like exists
pub fn name_text(node: Node, source: &[u8], default: &str) -> String {
    let text = node_text(name_node(node), source, default);
    let text = text.trim();
    if text.is_empty() {
        default.to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::Parser;

    #[test]
    fn test_node_text_default_for_missing_node() {
        assert_eq!(node_text(None, b"abc", "[UnnamedType]"), "[UnnamedType]");
        assert_eq!(node_text(None, b"abc", ""), "");
    }

    #[test]
    fn test_node_text_replaces_invalid_utf8() {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_python::LANGUAGE.into()).unwrap();
        let source = b"x = '\xff'\n";
        let tree = parser.parse(source, None).unwrap();
        let text = get_node_text(tree.root_node(), source);
        assert!(text.contains('\u{FFFD}'));
    }

    #[test]
    fn test_normalize_fragment_collapses_lines() {
        let params = "(\n    int a,\n    int b\n)";
        assert_eq!(normalize_fragment(params), "(int a, int b)");
        assert_eq!(normalize_fragment("(a, b)"), "(a, b)");
    }

    #[test]
    fn test_join_signature_drops_void() {
        assert_eq!(join_signature("void", "Run()"), "Run()");
        assert_eq!(join_signature("", "Run()"), "Run()");
        assert_eq!(join_signature("int", "Count()"), "int Count()");
    }

    #[test]
    fn test_render_lines() {
        assert_eq!(OutlineLine::entry(0, Kind::Class, "A").render(), "CLASS: A");
        assert_eq!(OutlineLine::entry(1, Kind::Method, "M()").render(), "  METH: M()");
        assert_eq!(OutlineLine::header(1, Kind::Field).render(), "  FIELD:");
        assert_eq!(OutlineLine::member(2, "int x").render(), "    int x");
        assert_eq!(
            OutlineLine::entry(0, Kind::ArrowFunction(Binding::Const), "f(a)").render(),
            "ARROW_FUNCTION (CONST): f(a)"
        );
    }

    #[test]
    fn test_directives_are_sorted_and_deduplicated() {
        let mut outline = Outline::new();
        outline.directive("using B");
        outline.directive("using A");
        outline.directive("using  A");
        outline.directive("   ");
        let directives: Vec<_> = outline.directives.iter().cloned().collect();
        assert_eq!(directives, vec!["using A".to_string(), "using B".to_string()]);
    }
}
