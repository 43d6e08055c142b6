//! C/C++ outline extraction using tree-sitter AST.
//!
//! Handles C and C++ sources and headers (.c, .h, .cpp, .hpp, .cc, .hh, .cxx):
//! - `#include` paths (collected as directives)
//! - Namespaces, classes, structs, unions and enums
//! - Function definitions, with constructor/destructor detection
//! - Prototypes, forward declarations and fields
//!
//! Template declarations, `extern "C"` blocks and preprocessor conditionals
//! are transparent. The flat line list is regrouped afterwards by
//! [`super::regroup`].

use tree_sitter::Node;

use super::common::{
    collapse_whitespace, get_node_text, join_signature, node_text, normalize_fragment, Kind,
    Outline,
};

// ============ Node Kinds ============

#[derive(Debug, Clone, Copy, PartialEq)]
enum CppNode {
    Include,
    Namespace,
    TypeSpecifier(Kind),
    EnumSpecifier,
    FunctionDefinition,
    Declaration,
    TypeDefinition,
    Other,
}

impl CppNode {
    fn from_kind(kind: &str) -> Self {
        match kind {
            "preproc_include" => Self::Include,
            "namespace_definition" => Self::Namespace,
            "class_specifier" => Self::TypeSpecifier(Kind::Class),
            "struct_specifier" => Self::TypeSpecifier(Kind::Struct),
            "union_specifier" => Self::TypeSpecifier(Kind::Union),
            "enum_specifier" => Self::EnumSpecifier,
            "function_definition" => Self::FunctionDefinition,
            "declaration" | "field_declaration" => Self::Declaration,
            "type_definition" => Self::TypeDefinition,
            _ => Self::Other,
        }
    }

    fn is_specifier(&self) -> bool {
        matches!(self, Self::TypeSpecifier(_) | Self::EnumSpecifier)
    }
}

// ============ Main Entry Point ============

/// Extract outline lines and includes from a C/C++ syntax tree
pub fn extract_outline(root: Node, source: &[u8], outline: &mut Outline) {
    walk(outline, root, source, 0);
}

fn walk(out: &mut Outline, node: Node, source: &[u8], depth: usize) {
    match CppNode::from_kind(node.kind()) {
        CppNode::Include => {
            if let Some(path) = node.child_by_field_name("path") {
                out.directive(get_node_text(path, source));
            }
        }

        CppNode::Namespace => {
            let name = node_text(node.child_by_field_name("name"), source, "[Anonymous]");
            out.push(depth, Kind::Namespace, collapse_whitespace(&name));
            if let Some(body) = node.child_by_field_name("body") {
                walk_children(out, body, source, depth + 1);
            }
        }

        CppNode::TypeSpecifier(_) | CppNode::EnumSpecifier => {
            if node.child_by_field_name("body").is_some() {
                extract_type(out, node, source, depth);
            } else {
                out.push(depth, Kind::ForwardDecl, specifier_text(node, source));
            }
        }

        CppNode::FunctionDefinition => extract_function(out, node, source, depth),

        CppNode::Declaration => extract_declaration(out, node, source, depth),

        // `typedef struct { ... } Name;` only contributes its body
        CppNode::TypeDefinition => {
            if let Some(specifier) = node.child_by_field_name("type") {
                if specifier.child_by_field_name("body").is_some()
                    && CppNode::from_kind(specifier.kind()).is_specifier()
                {
                    extract_type(out, specifier, source, depth);
                }
            }
        }

        CppNode::Other => walk_children(out, node, source, depth),
    }
}

fn walk_children(out: &mut Outline, node: Node, source: &[u8], depth: usize) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk(out, child, source, depth);
    }
}

// ============ Types ============

/// Emit a specifier that has a body; enums are not descended into
fn extract_type(out: &mut Outline, node: Node, source: &[u8], depth: usize) {
    let name = node_text(node.child_by_field_name("name"), source, "[Anonymous]");
    let name = collapse_whitespace(&name);

    match CppNode::from_kind(node.kind()) {
        CppNode::TypeSpecifier(kind) => {
            out.push(depth, kind, name);
            if let Some(body) = node.child_by_field_name("body") {
                walk_children(out, body, source, depth + 1);
            }
        }
        _ => out.push(depth, Kind::Enum, name),
    }
}

/// `class Foo`, `struct Bar`, `enum class Baz`
fn specifier_text(node: Node, source: &[u8]) -> String {
    let text = collapse_whitespace(&get_node_text(node, source));
    text.trim_end_matches(';').trim().to_string()
}

// ============ Functions ============

/// A function declarator reached through pointer/reference wrappers
struct FunctionShape<'a> {
    declarator: Node<'a>,
    /// `*` and `&` marks collected on the way down, applied to the return type
    marks: String,
}

fn find_function_declarator(node: Node) -> Option<FunctionShape> {
    let mut marks = String::new();
    let mut current = node;
    loop {
        match current.kind() {
            "function_declarator" => {
                return Some(FunctionShape {
                    declarator: current,
                    marks,
                })
            }
            "pointer_declarator" => marks.push('*'),
            "reference_declarator" => marks.push('&'),
            "init_declarator" | "parenthesized_declarator" | "attributed_declarator" => {}
            _ => return None,
        }
        current = inner_declarator(current)?;
    }
}

/// Step one level into a declarator; reference declarators have no `declarator` field
fn inner_declarator(node: Node) -> Option<Node> {
    node.child_by_field_name("declarator").or_else(|| {
        if node.kind() == "reference_declarator" || node.kind() == "parenthesized_declarator" {
            let count = node.named_child_count();
            count.checked_sub(1).and_then(|last| node.named_child(last))
        } else {
            None
        }
    })
}

/// Declared type of a declaration, with leading `const`/`volatile` qualifiers
fn declared_type(node: Node, source: &[u8]) -> Option<String> {
    let type_node = node.child_by_field_name("type")?;
    let mut qualifiers = Vec::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.id() == type_node.id() {
            break;
        }
        if child.kind() == "type_qualifier" {
            qualifiers.push(get_node_text(child, source).trim().to_string());
        }
    }
    qualifiers.push(collapse_whitespace(&get_node_text(type_node, source)));
    Some(qualifiers.join(" "))
}

/// `name(params)` plus trailing qualifiers such as `const`
fn function_head(shape: &FunctionShape, source: &[u8]) -> String {
    let declarator = shape.declarator;
    let name = node_text(declarator.child_by_field_name("declarator"), source, "[unnamed_func]");
    let params = node_text(declarator.child_by_field_name("parameters"), source, "()");
    let mut head = format!("{}{}", collapse_whitespace(&name), normalize_fragment(&params));

    let mut cursor = declarator.walk();
    for child in declarator.children(&mut cursor) {
        if child.kind() == "type_qualifier" {
            head.push(' ');
            head.push_str(get_node_text(child, source).trim());
        }
    }
    head
}

fn function_signature(return_type: Option<&str>, shape: &FunctionShape, source: &[u8]) -> String {
    let head = function_head(shape, source);
    let return_type = match return_type {
        Some(t) if shape.marks.is_empty() => t.to_string(),
        Some(t) => format!("{t}{}", shape.marks),
        None => String::new(),
    };
    join_signature(&return_type, &head)
}

fn extract_function(out: &mut Outline, node: Node, source: &[u8], depth: usize) {
    let Some(shape) = node
        .child_by_field_name("declarator")
        .and_then(find_function_declarator)
    else {
        return;
    };

    let return_type = declared_type(node, source);
    let kind = match return_type {
        Some(_) => Kind::Function,
        None => untyped_function_kind(&shape, source),
    };
    out.push(depth, kind, function_signature(return_type.as_deref(), &shape, source));
}

/// Constructor, destructor or conversion operator, judged by the last `::` segment
fn untyped_function_kind(shape: &FunctionShape, source: &[u8]) -> Kind {
    let name = node_text(shape.declarator.child_by_field_name("declarator"), source, "");
    let last_segment = name.rsplit("::").next().unwrap_or("").trim();
    if last_segment.starts_with('~') {
        Kind::Destructor
    } else if last_segment.starts_with("operator") {
        Kind::Function
    } else {
        Kind::Constructor
    }
}

// ============ Declarations ============

fn extract_declaration(out: &mut Outline, node: Node, source: &[u8], depth: usize) {
    let type_node = node.child_by_field_name("type");
    let mut cursor = node.walk();
    let declarators: Vec<Node> = node.children_by_field_name("declarator", &mut cursor).collect();

    // Type introduced inline: `struct Point { ... } origin;`
    if let Some(specifier) = type_node.filter(|t| CppNode::from_kind(t.kind()).is_specifier()) {
        if specifier.child_by_field_name("body").is_some() {
            extract_type(out, specifier, source, depth);
            let keyword = specifier.child(0).map(|k| get_node_text(k, source).into_owned());
            let type_text = match specifier.child_by_field_name("name") {
                Some(name) => format!(
                    "{} {}",
                    keyword.unwrap_or_default().trim(),
                    collapse_whitespace(&get_node_text(name, source))
                ),
                None => keyword.unwrap_or_default().trim().to_string(),
            };
            emit_fields(out, &declarators, &type_text, source, depth);
            return;
        }
        if declarators.is_empty() {
            out.push(depth, Kind::ForwardDecl, specifier_text(specifier, source));
            return;
        }
    }

    let return_type = declared_type(node, source);
    let type_text = return_type.clone().unwrap_or_else(|| "<unknown_type>".to_string());

    let mut variables = Vec::new();
    for declarator in declarators {
        match find_function_declarator(declarator) {
            Some(shape) => {
                let signature = function_signature(return_type.as_deref(), &shape, source);
                out.push(depth, Kind::FunctionDecl, signature);
            }
            None => variables.push(declarator),
        }
    }
    emit_fields(out, &variables, &type_text, source, depth);
}

/// One `FIELD: type name` per variable declarator
fn emit_fields(out: &mut Outline, declarators: &[Node], type_text: &str, source: &[u8], depth: usize) {
    for &declarator in declarators {
        let mut marks = String::new();
        let mut current = declarator;
        while let Some(inner) = inner_declarator(current) {
            match current.kind() {
                "pointer_declarator" => marks.push('*'),
                "reference_declarator" => marks.push('&'),
                _ => {}
            }
            current = inner;
        }

        let name = collapse_whitespace(&get_node_text(current, source));
        if name.is_empty() || name == type_text {
            continue;
        }
        out.push(depth, Kind::Field, format!("{type_text}{marks} {name}"));
    }
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::Parser;

    fn outline_of(code: &str) -> Outline {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_cpp::LANGUAGE.into()).unwrap();
        let tree = parser.parse(code, None).unwrap();
        let mut outline = Outline::new();
        extract_outline(tree.root_node(), code.as_bytes(), &mut outline);
        outline
    }

    fn rendered(outline: &Outline) -> Vec<String> {
        outline.lines.iter().map(|l| l.render()).collect()
    }

    #[test]
    fn test_class_members() {
        let code = r#"
class Shape {
public:
    Shape(int sides);
    virtual ~Shape();
    int sides() const { return sides_; }
    void draw();
private:
    int sides_;
    const char* name_;
};
"#;
        let outline = outline_of(code);
        assert_eq!(
            rendered(&outline),
            vec![
                "CLASS: Shape",
                "  FUNC_DECL: Shape(int sides)",
                "  FUNC_DECL: ~Shape()",
                "  FUNC: int sides() const",
                "  FUNC_DECL: draw()",
                "  FIELD: int sides_",
                "  FIELD: const char* name_",
            ]
        );
    }

    #[test]
    fn test_out_of_line_definitions() {
        let code = r#"
Shape::Shape(int sides) : sides_(sides) {}
Shape::~Shape() {}
void Shape::draw() {}
int area(int w, int h) { return w * h; }
"#;
        let outline = outline_of(code);
        assert_eq!(
            rendered(&outline),
            vec![
                "CONSTRUCTOR: Shape::Shape(int sides)",
                "DESTRUCTOR: Shape::~Shape()",
                "FUNC: Shape::draw()",
                "FUNC: int area(int w, int h)",
            ]
        );
    }

    #[test]
    fn test_includes_namespaces_and_forward_declarations() {
        let code = r#"
#include <vector>
#include "shape.h"
#include <vector>

namespace geo {
class Point;
struct Size { int w; int h; };
enum Color { Red, Green };
}
namespace {
int counter;
}
"#;
        let outline = outline_of(code);
        let directives: Vec<_> = outline.directives.iter().cloned().collect();
        assert_eq!(directives, vec!["\"shape.h\"", "<vector>"]);
        assert_eq!(
            rendered(&outline),
            vec![
                "NAMESPACE: geo",
                "  FORWARD_DECL: class Point",
                "  STRUCT: Size",
                "    FIELD: int w",
                "    FIELD: int h",
                "  ENUM: Color",
                "NAMESPACE: [Anonymous]",
                "  FIELD: int counter",
            ]
        );
    }

    #[test]
    fn test_header_guard_and_templates_are_transparent() {
        let code = r#"
#ifndef STACK_H
#define STACK_H
template <typename T>
class Stack {
    T* items;
};
extern "C" {
int c_api(void);
}
#endif
"#;
        let outline = outline_of(code);
        assert_eq!(
            rendered(&outline),
            vec!["CLASS: Stack", "  FIELD: T* items", "FUNC_DECL: int c_api(void)"]
        );
    }

    #[test]
    fn test_pointer_returning_prototype() {
        let outline = outline_of("char *dup(const char *s);\nvoid reset(void);\n");
        assert_eq!(
            rendered(&outline),
            vec!["FUNC_DECL: char* dup(const char *s)", "FUNC_DECL: reset(void)"]
        );
    }

    #[test]
    fn test_inline_struct_with_variable() {
        let outline = outline_of("struct Point { int x; } origin;\n");
        assert_eq!(
            rendered(&outline),
            vec!["STRUCT: Point", "  FIELD: int x", "FIELD: struct Point origin"]
        );
    }
}
