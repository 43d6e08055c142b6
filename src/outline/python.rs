//! Python-specific outline extraction using tree-sitter AST.
//!
//! This module handles Python files (.py, .pyi):
//! - `import` and `from ... import` statements (collected as directives)
//! - Decorators, emitted ahead of the definition they wrap
//! - Function definitions with return annotations
//! - Class definitions with their superclass lists

use tree_sitter::Node;

use super::common::{
    collapse_whitespace, field_text, get_node_text, node_text, normalize_fragment, Kind, Outline,
};

// ============ Main Entry Point ============

/// Extract outline lines and imports from a Python syntax tree
pub fn extract_outline(root: Node, source: &[u8], outline: &mut Outline) {
    walk(outline, root, source, 0);
}

fn walk(out: &mut Outline, node: Node, source: &[u8], depth: usize) {
    match node.kind() {
        "import_statement" => {
            let mut cursor = node.walk();
            for name in node.children_by_field_name("name", &mut cursor) {
                out.directive(format!("import {}", get_node_text(name, source).trim()));
            }
        }

        "import_from_statement" | "future_import_statement" => {
            out.directive(from_import_text(node, source));
        }

        "decorated_definition" => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                if child.kind() == "decorator" {
                    out.push(depth, Kind::Decorator, decorator_text(child, source));
                }
            }
            let definition = node
                .child_by_field_name("definition")
                .or_else(|| node.child(node.child_count().saturating_sub(1)));
            if let Some(definition) = definition {
                walk(out, definition, source, depth);
            }
        }

        "function_definition" => {
            let name = field_text(node, "name", source, "[lambda]");
            let params = node_text(node.child_by_field_name("parameters"), source, "()");
            let mut signature = format!("{name}{}", normalize_fragment(&params));
            if let Some(return_type) = node.child_by_field_name("return_type") {
                signature.push_str(" -> ");
                signature.push_str(&collapse_whitespace(&get_node_text(return_type, source)));
            }
            out.push(depth, Kind::Function, signature);
            walk_body(out, node, source, depth + 1);
        }

        "class_definition" => {
            let name = field_text(node, "name", source, "[UnnamedClass]");
            let superclasses = node_text(node.child_by_field_name("superclasses"), source, "");
            out.push(depth, Kind::Class, format!("{name}{}", normalize_fragment(&superclasses)));
            walk_body(out, node, source, depth + 1);
        }

        // Module, blocks and anything else: look inside at the same depth
        _ => walk_children(out, node, source, depth),
    }
}

fn walk_body(out: &mut Outline, node: Node, source: &[u8], depth: usize) {
    if let Some(body) = node.child_by_field_name("body") {
        walk_children(out, body, source, depth);
    }
}

fn walk_children(out: &mut Outline, node: Node, source: &[u8], depth: usize) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk(out, child, source, depth);
    }
}

/// `from module import a, b as c` / `from module import *`
fn from_import_text(node: Node, source: &[u8]) -> String {
    let module = if node.kind() == "future_import_statement" {
        "__future__".to_string()
    } else {
        field_text(node, "module_name", source, "")
    };

    let mut names = Vec::new();
    let mut cursor = node.walk();
    for name in node.children_by_field_name("name", &mut cursor) {
        names.push(collapse_whitespace(&get_node_text(name, source)));
    }
    if names.is_empty() {
        let mut cursor = node.walk();
        let wildcard = node
            .children(&mut cursor)
            .any(|child| child.kind() == "wildcard_import");
        if wildcard {
            names.push("*".to_string());
        }
    }

    format!("from {module} import {}", names.join(", "))
}

fn decorator_text(node: Node, source: &[u8]) -> String {
    let text = get_node_text(node, source);
    format!("@{}", collapse_whitespace(text.trim().trim_start_matches('@')))
}

// ============ Tests ============
