//! C#-specific outline extraction using tree-sitter AST.
//!
//! This module handles C# files (.cs) and the `@code` blocks of Razor views:
//! - `using` directives (plain, `static`, alias and `global` forms)
//! - Block and file-scoped namespaces
//! - Classes, structs, interfaces, enums and records
//! - Methods, constructors, destructors, operators and local functions
//! - Fields, properties, indexers, events and delegates

use tree_sitter::Node;

use super::common::{
    child_of_kind, collapse_whitespace, field_text, get_node_text, join_signature, name_node,
    name_text, node_text, normalize_fragment, Kind, Outline,
};

// ============ Node Kinds ============

/// C# syntax node kinds the walker reacts to
#[derive(Debug, Clone, Copy, PartialEq)]
enum CsNode {
    UsingDirective,
    Namespace,
    FileScopedNamespace,
    TypeDeclaration(Kind),
    Method,
    Operator,
    Constructor,
    Destructor,
    Field,
    EventField,
    Event,
    Property,
    Indexer,
    Delegate,
    Other,
}

impl CsNode {
    fn from_kind(kind: &str) -> Self {
        match kind {
            "using_directive" => Self::UsingDirective,
            "namespace_declaration" => Self::Namespace,
            "file_scoped_namespace_declaration" => Self::FileScopedNamespace,
            "class_declaration" => Self::TypeDeclaration(Kind::Class),
            "struct_declaration" => Self::TypeDeclaration(Kind::Struct),
            "interface_declaration" => Self::TypeDeclaration(Kind::Interface),
            "enum_declaration" => Self::TypeDeclaration(Kind::Enum),
            "record_declaration" | "record_struct_declaration" => {
                Self::TypeDeclaration(Kind::Record)
            }
            "method_declaration" | "local_function_statement" => Self::Method,
            "operator_declaration" => Self::Operator,
            "constructor_declaration" => Self::Constructor,
            "destructor_declaration" => Self::Destructor,
            "field_declaration" => Self::Field,
            "event_field_declaration" => Self::EventField,
            "event_declaration" => Self::Event,
            "property_declaration" => Self::Property,
            "indexer_declaration" => Self::Indexer,
            "delegate_declaration" => Self::Delegate,
            _ => Self::Other,
        }
    }
}

/// Children that can sit between a member's modifiers and its name without being its type
const NON_TYPE_PREFIXES: &[&str] = &[
    "attribute_list",
    "modifier",
    "explicit_interface_specifier",
    "type_parameter_list",
];

// ============ Main Entry Point ============

/// Extract outline lines and `using` directives from a C# syntax tree
pub fn extract_outline(root: Node, source: &[u8], outline: &mut Outline) {
    walk(outline, root, source, 0);
}

/// Walk the members of a type body at `depth`, discarding directives.
///
/// Used for code embedded in other files where `using` lines are not file-level.
pub fn extract_members(body: Node, source: &[u8], depth: usize, outline: &mut Outline) {
    let mut scratch = Outline::new();
    walk_children(&mut scratch, body, source, depth);
    outline.lines.append(&mut scratch.lines);
}

fn walk(out: &mut Outline, node: Node, source: &[u8], depth: usize) {
    match CsNode::from_kind(node.kind()) {
        CsNode::UsingDirective => out.directive(using_text(node, source)),
        CsNode::Namespace => {
            let name = field_text(node, "name", source, "[UnknownNamespace]");
            out.push(depth, Kind::Namespace, name);
            if let Some(body) = node.child_by_field_name("body") {
                walk_children(out, body, source, depth + 1);
            }
        }
        CsNode::FileScopedNamespace => {
            let name = field_text(node, "name", source, "[UnknownNamespace]");
            out.push(depth, Kind::Namespace, name);
            walk_children(out, node, source, depth + 1);
        }
        CsNode::TypeDeclaration(kind) => extract_type(out, node, source, depth, kind),
        CsNode::Method => {
            let name = method_name(node, source);
            let params = parameters(node, source);
            let return_type = declared_type(node, source);
            out.push(depth, Kind::Method, join_signature(&return_type, &format!("{name}{params}")));
        }
        CsNode::Operator => {
            let params = parameters(node, source);
            let return_type = declared_type(node, source);
            let symbol = operator_symbol(node, source);
            out.push(
                depth,
                Kind::Method,
                join_signature(&return_type, &format!("operator {symbol}{params}")),
            );
        }
        CsNode::Constructor => {
            let name = name_text(node, source, "[Constructor]");
            out.push(depth, Kind::Constructor, format!("{name}{}", parameters(node, source)));
        }
        CsNode::Destructor => {
            let name = name_text(node, source, "[Destructor]");
            out.push(depth, Kind::Destructor, format!("~{name}{}", parameters(node, source)));
        }
        CsNode::Field => {
            extract_variables(out, node, source, depth, Kind::Field, "[UnnamedField]", "[ComplexField]")
        }
        CsNode::EventField => {
            extract_variables(out, node, source, depth, Kind::Event, "[UnnamedEvent]", "[ComplexEvent]")
        }
        CsNode::Event => {
            let event_type = field_text(node, "type", source, "<unknown_type>");
            let name = name_text(node, source, "[UnnamedEvent]");
            out.push(depth, Kind::Event, format!("{event_type} {name}"));
        }
        CsNode::Property => {
            let property_type = field_text(node, "type", source, "<unknown_type>");
            let name = member_name(node, source).unwrap_or_else(|| "[UnnamedProperty]".to_string());
            out.push(depth, Kind::Property, format!("{property_type} {name}"));
        }
        CsNode::Indexer => {
            let indexer_type = field_text(node, "type", source, "<unknown_type>");
            let params = node
                .child_by_field_name("parameters")
                .or_else(|| child_of_kind(node, &["bracketed_parameter_list"]))
                .map(|p| normalize_fragment(&get_node_text(p, source)))
                .unwrap_or_else(|| "[]".to_string());
            out.push(depth, Kind::Property, format!("{indexer_type} this{params}"));
        }
        CsNode::Delegate => {
            let return_type = declared_type(node, source);
            let name = name_text(node, source, "[Delegate]");
            let params = parameters(node, source);
            out.push(depth, Kind::Delegate, join_signature(&return_type, &format!("{name}{params}")));
        }
        CsNode::Other => walk_children(out, node, source, depth),
    }
}

/// Walk every child in order; a file-scoped namespace nests the siblings after it
fn walk_children(out: &mut Outline, node: Node, source: &[u8], depth: usize) {
    let mut child_depth = depth;
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk(out, child, source, child_depth);
        if CsNode::from_kind(child.kind()) == CsNode::FileScopedNamespace {
            child_depth = depth + 1;
        }
    }
}

// ============ Type Extraction ============

fn extract_type(out: &mut Outline, node: Node, source: &[u8], depth: usize, kind: Kind) {
    let mut name = name_text(node, source, "[UnnamedType]");
    if let Some(type_params) = type_parameters(node) {
        name.push_str(get_node_text(type_params, source).trim());
    }
    out.push(depth, kind, name);

    if let Some(body) = node.child_by_field_name("body") {
        walk_children(out, body, source, depth + 1);
    }
}

fn type_parameters(node: Node) -> Option<Node> {
    node.child_by_field_name("type_parameters")
        .or_else(|| child_of_kind(node, &["type_parameter_list"]))
}

// ============ Member Helpers ============

/// Emit one line per declarator of a field-like declaration
fn extract_variables(
    out: &mut Outline,
    node: Node,
    source: &[u8],
    depth: usize,
    kind: Kind,
    unnamed: &str,
    complex: &str,
) {
    let mut type_node = node.child_by_field_name("type");
    let mut declarators = Vec::new();

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "variable_declarator" {
            declarators.push(child);
        }
    }

    // Modern grammars nest the declarators in a variable_declaration
    if declarators.is_empty() {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() != "variable_declaration" {
                continue;
            }
            if type_node.is_none() {
                type_node = child.child_by_field_name("type");
            }
            let mut inner = child.walk();
            for sub_child in child.children(&mut inner) {
                if sub_child.kind() == "variable_declarator" {
                    declarators.push(sub_child);
                }
            }
        }
    }

    let type_text = collapse_whitespace(&node_text(type_node, source, "<unknown_type>"));

    if declarators.is_empty() {
        out.push(depth, kind, format!("{type_text} {complex}"));
        return;
    }
    for declarator in declarators {
        let name = name_text(declarator, source, unnamed);
        out.push(depth, kind, format!("{type_text} {name}"));
    }
}

/// Name of a member that may be an explicit interface implementation
fn member_name(node: Node, source: &[u8]) -> Option<String> {
    let specifier = child_of_kind(node, &["explicit_interface_specifier"])
        .map(|s| get_node_text(s, source).trim().to_string());
    let name = name_node(node).map(|n| get_node_text(n, source).trim().to_string());

    let full_name = match (specifier, name) {
        (Some(specifier), Some(name)) if specifier.ends_with('.') => format!("{specifier}{name}"),
        (Some(specifier), Some(name)) => format!("{specifier}.{name}"),
        (None, Some(name)) => name,
        (Some(specifier), None) => specifier,
        (None, None) => return None,
    };
    Some(full_name).filter(|name| !name.is_empty())
}

fn method_name(node: Node, source: &[u8]) -> String {
    let mut name = member_name(node, source).unwrap_or_else(|| "[UnknownMethod]".to_string());
    if let Some(type_params) = type_parameters(node) {
        name.push_str(get_node_text(type_params, source).trim());
    }
    name
}

fn parameters(node: Node, source: &[u8]) -> String {
    node.child_by_field_name("parameters")
        .or_else(|| child_of_kind(node, &["parameter_list"]))
        .map(|p| normalize_fragment(&get_node_text(p, source)))
        .unwrap_or_else(|| "()".to_string())
}

/// Return or declared type of a method-like member; empty when none is found
fn declared_type(node: Node, source: &[u8]) -> String {
    let explicit = node
        .child_by_field_name("returns")
        .or_else(|| node.child_by_field_name("type"))
        .or_else(|| node.child_by_field_name("return_type"));
    if let Some(type_node) = explicit {
        return collapse_whitespace(&get_node_text(type_node, source));
    }

    // Fall back to the last named child ahead of the name or parameter list
    let stop = node.child_by_field_name("name").map(|n| n.id());
    let mut candidate = None;
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if Some(child.id()) == stop || child.kind() == "parameter_list" {
            break;
        }
        if child.is_named() && !NON_TYPE_PREFIXES.contains(&child.kind()) {
            candidate = Some(child);
        }
    }
    candidate
        .map(|c| collapse_whitespace(&get_node_text(c, source)))
        .unwrap_or_default()
}

/// The overloaded operator token following the `operator` keyword
fn operator_symbol(node: Node, source: &[u8]) -> String {
    if let Some(op) = node.child_by_field_name("operator") {
        return get_node_text(op, source).trim().to_string();
    }
    let mut seen_keyword = false;
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if seen_keyword {
            return get_node_text(child, source).trim().to_string();
        }
        seen_keyword = child.kind() == "operator";
    }
    "[operator]".to_string()
}

/// Normalize a using directive to `Name`, `static Name` or `Alias = Name`
fn using_text(node: Node, source: &[u8]) -> String {
    let raw = collapse_whitespace(&get_node_text(node, source));
    let raw = raw.strip_prefix("global ").unwrap_or(&raw);
    let raw = raw.strip_prefix("using").unwrap_or(raw);
    raw.trim().trim_end_matches(';').trim().to_string()
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::Parser;

    fn outline_of(code: &str) -> Outline {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_c_sharp::LANGUAGE.into()).unwrap();
        let tree = parser.parse(code, None).unwrap();
        let mut outline = Outline::new();
        extract_outline(tree.root_node(), code.as_bytes(), &mut outline);
        outline
    }

    fn rendered(code: &str) -> Vec<String> {
        outline_of(code).lines.iter().map(|l| l.render()).collect()
    }

    #[test]
    fn test_class_with_void_method() {
        let lines = rendered("class A { void M(){} }");
        assert_eq!(lines, vec!["CLASS: A".to_string(), "  METH: M()".to_string()]);
    }

    #[test]
    fn test_namespace_members_and_return_types() {
        let code = r#"
namespace App.Services
{
    public class Calculator<T>
    {
        private int total;
        public string Name { get; set; }
        public Calculator(int seed) { total = seed; }
        ~Calculator() { }
        public int Add(int a, int b) { return a + b; }
        public event EventHandler Changed;
    }

    public interface IShape { double Area(); }
    public delegate void Notify(string message);
}
"#;
        let lines = rendered(code);
        assert!(lines.contains(&"NAMESPACE: App.Services".to_string()));
        assert!(lines.contains(&"  CLASS: Calculator<T>".to_string()));
        assert!(lines.contains(&"    FIELD: int total".to_string()));
        assert!(lines.contains(&"    PROP: string Name".to_string()));
        assert!(lines.contains(&"    CONSTRUCTOR: Calculator(int seed)".to_string()));
        assert!(lines.contains(&"    DESTRUCTOR: ~Calculator()".to_string()));
        assert!(lines.contains(&"    METH: int Add(int a, int b)".to_string()));
        assert!(lines.contains(&"    EVENT: EventHandler Changed".to_string()));
        assert!(lines.contains(&"  INTERFACE: IShape".to_string()));
        assert!(lines.contains(&"    METH: double Area()".to_string()));
        assert!(lines.contains(&"  DELEGATE: Notify(string message)".to_string()));
    }

    #[test]
    fn test_usings_are_collected_as_directives() {
        let code = r#"
using System;
using static System.Math;
using Json = System.Text.Json;
using System;

class A {}
"#;
        let outline = outline_of(code);
        let directives: Vec<_> = outline.directives.iter().cloned().collect();
        assert_eq!(
            directives,
            vec![
                "Json = System.Text.Json".to_string(),
                "System".to_string(),
                "static System.Math".to_string(),
            ]
        );
        assert_eq!(outline.lines.len(), 1);
    }

    #[test]
    fn test_multiple_field_declarators() {
        let lines = rendered("class P { public int x, y; }");
        assert!(lines.contains(&"  FIELD: int x".to_string()));
        assert!(lines.contains(&"  FIELD: int y".to_string()));
    }

    #[test]
    fn test_multiline_parameters_collapse_to_one_line() {
        let code = "class A {\n    public void Run(\n        int a,\n        int b)\n    { }\n}";
        let lines = rendered(code);
        assert!(lines.contains(&"  METH: Run(int a, int b)".to_string()));
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_file_scoped_namespace_nests_following_types() {
        let code = "namespace App;\n\npublic class Widget { }\n";
        let lines = rendered(code);
        assert_eq!(lines, vec!["NAMESPACE: App".to_string(), "  CLASS: Widget".to_string()]);
    }

    #[test]
    fn test_struct_and_enum_labels() {
        let lines = rendered("struct Point { public int X; } enum Color { Red, Green }");
        assert!(lines.contains(&"STRUCT: Point".to_string()));
        assert!(lines.contains(&"  FIELD: int X".to_string()));
        assert!(lines.contains(&"ENUM: Color".to_string()));
    }
}
