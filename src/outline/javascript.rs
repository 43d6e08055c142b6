//! JavaScript-specific outline extraction using tree-sitter AST.
//!
//! Handles `.js`, `.mjs` and `.cjs` files as well as `<script>` blocks
//! embedded in Razor views.

use tree_sitter::Node;

use super::common::{
    collapse_whitespace, get_node_text, name_node, name_text, node_text, normalize_fragment,
    Binding, Kind, Outline,
};

// ============ Main Entry Point ============

/// Extract outline lines and imports from a JavaScript syntax tree
pub fn extract_outline(root: Node, source: &[u8], outline: &mut Outline) {
    walk(outline, root, source, 0);
}

/// Walk an embedded script at `depth`; its imports are not file-level directives
pub fn extract_nested(root: Node, source: &[u8], depth: usize, outline: &mut Outline) {
    let mut scratch = Outline::new();
    walk(&mut scratch, root, source, depth);
    outline.lines.append(&mut scratch.lines);
}

fn walk(out: &mut Outline, node: Node, source: &[u8], depth: usize) {
    match node.kind() {
        "import_statement" => {
            let text = collapse_whitespace(&get_node_text(node, source));
            out.directive(text.trim_end_matches(';').trim());
        }

        "function_declaration" | "generator_function_declaration" => {
            let name = name_text(node, source, "[anonymous_function]");
            out.push(depth, Kind::Function, format!("{name}{}", parameters(node, source)));
        }

        "class_declaration" => {
            let mut name = name_text(node, source, "[UnnamedClass]");
            let mut cursor = node.walk();
            let heritage = node
                .children(&mut cursor)
                .find(|child| child.kind() == "class_heritage");
            if let Some(heritage) = heritage {
                name.push(' ');
                name.push_str(&collapse_whitespace(&get_node_text(heritage, source)));
            }
            out.push(depth, Kind::Class, name);

            if let Some(body) = node.child_by_field_name("body") {
                walk_children(out, body, source, depth + 1);
            }
        }

        "method_definition" => {
            let name = name_text(node, source, "[unnamed_method]");
            let kind = if name == "constructor" {
                Kind::Constructor
            } else if has_token(node, "get") {
                Kind::Getter
            } else if has_token(node, "set") {
                Kind::Setter
            } else {
                Kind::Method
            };
            out.push(depth, kind, format!("{name}{}", parameters(node, source)));
        }

        "field_definition" => {
            let property = node
                .child_by_field_name("property")
                .or_else(|| name_node(node))
                .or_else(|| {
                    let mut cursor = node.walk();
                    let found = node
                        .children(&mut cursor)
                        .find(|child| child.kind() == "private_property_identifier");
                    found
                });
            let name = node_text(property, source, "[unnamed_field]");
            out.push(depth, Kind::Field, name.trim());
        }

        "lexical_declaration" | "variable_declaration" => {
            extract_declarators(out, node, source, depth)
        }

        // Program, export wrappers and anything else: look inside at the same depth
        _ => walk_children(out, node, source, depth),
    }
}

fn walk_children(out: &mut Outline, node: Node, source: &[u8], depth: usize) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk(out, child, source, depth);
    }
}

/// One line per declarator, reclassified by the kind of its initializer
fn extract_declarators(out: &mut Outline, node: Node, source: &[u8], depth: usize) {
    let keyword = node
        .child(0)
        .map(|token| get_node_text(token, source).into_owned())
        .unwrap_or_default();
    let binding = Binding::from_keyword(&keyword);

    let mut cursor = node.walk();
    for declarator in node.children(&mut cursor) {
        if declarator.kind() != "variable_declarator" {
            continue;
        }
        let name = node_text(declarator.child_by_field_name("name"), source, "[unnamed_variable]");
        let name = collapse_whitespace(&name);

        match declarator.child_by_field_name("value") {
            Some(value) if value.kind() == "arrow_function" => {
                let params = arrow_parameters(value, source);
                out.push(depth, Kind::ArrowFunction(binding), format!("{name}{params}"));
            }
            Some(value) if matches!(value.kind(), "function_expression" | "function" | "generator_function") => {
                out.push(depth, Kind::Function, format!("{name}{}", parameters(value, source)));
            }
            _ => out.push(depth, Kind::Variable(binding), name),
        }
    }
}

fn parameters(node: Node, source: &[u8]) -> String {
    normalize_fragment(&node_text(node.child_by_field_name("parameters"), source, "()"))
}

/// `(a, b)` for a parenthesized list, `(a)` for a bare single parameter
fn arrow_parameters(node: Node, source: &[u8]) -> String {
    if let Some(params) = node.child_by_field_name("parameters") {
        return normalize_fragment(&get_node_text(params, source));
    }
    if let Some(param) = node.child_by_field_name("parameter") {
        return format!("({})", get_node_text(param, source).trim());
    }
    "()".to_string()
}

/// Whether an anonymous keyword token such as `get` precedes the member name
fn has_token(node: Node, token: &str) -> bool {
    let name = node.child_by_field_name("name").map(|n| n.id());
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if Some(child.id()) == name {
            break;
        }
        if !child.is_named() && child.kind() == token {
            return true;
        }
    }
    false
}

// ============ Tests ============
