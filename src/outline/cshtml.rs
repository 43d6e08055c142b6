//! Razor view (.cshtml, .razor) outline extraction.
//!
//! The file is parsed as HTML. `<script>` blocks are re-parsed as JavaScript
//! and `@code` / `@functions` blocks as C#, each nested one level under a
//! marker line. Leading `@page`, `@model`, `@using` and `@inject` lines are
//! reported as directives.

use once_cell::sync::Lazy;
use regex::bytes::Regex;
use tree_sitter::Node;

use super::common::{get_node_text, Kind, Outline};
use super::csharp;
use super::javascript;
use super::registry::{Grammar, GrammarRegistry};

// ============ Constants ============

/// Only this many leading lines are scanned for directives
const DIRECTIVE_SCAN_LINES: usize = 30;

const DIRECTIVE_PREFIXES: [&str; 4] = ["@page", "@model", "@using", "@inject"];

/// Directive lines render one level in, directly under the file header, where
/// the other languages put their directive summary line. Compatibility with
/// existing reports; the markup outline itself starts at depth 0.
const DIRECTIVE_DEPTH: usize = 1;

/// Synthetic class that gives `@code` members a type body to parse in
const CODE_BLOCK_WRAPPER: &str = "__RazorCodeBlock";

static CODE_BLOCK_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)@(functions|code)\b\s*\{").unwrap());

// ============ Main Entry Point ============

/// Extract directive lines, script blocks and code blocks from a Razor view
pub fn extract_outline(
    root: Node,
    source: &[u8],
    registry: &GrammarRegistry,
    outline: &mut Outline,
) {
    scan_directives(source, outline);

    let mut ctx = RazorContext {
        source,
        registry,
        consumed_until: 0,
    };
    ctx.walk(outline, root, 0);
}

/// `DIRECTIVE` lines for the leading Razor directives
fn scan_directives(source: &[u8], outline: &mut Outline) {
    let text = String::from_utf8_lossy(source);
    for line in text.lines().take(DIRECTIVE_SCAN_LINES) {
        let trimmed = line.trim();
        if DIRECTIVE_PREFIXES.iter().any(|prefix| trimmed.starts_with(prefix)) {
            outline.push(DIRECTIVE_DEPTH, Kind::Directive, trimmed);
        }
    }
}

// ============ Markup Walk ============

struct RazorContext<'a> {
    source: &'a [u8],
    registry: &'a GrammarRegistry,
    /// End of the last code block; markup inside it was already summarized as C#
    consumed_until: usize,
}

impl<'a> RazorContext<'a> {
    fn walk(&mut self, out: &mut Outline, node: Node, depth: usize) {
        if node.end_byte() <= self.consumed_until {
            return;
        }

        match node.kind() {
            "script_element" => self.script_block(out, node, depth),
            "text" => self.code_blocks(out, node, depth),
            _ => {
                let mut cursor = node.walk();
                for child in node.children(&mut cursor) {
                    self.walk(out, child, depth);
                }
            }
        }
    }

    fn script_block(&mut self, out: &mut Outline, node: Node, depth: usize) {
        out.push(depth, Kind::ScriptBlock, "");

        let mut cursor = node.walk();
        let raw = node.children(&mut cursor).find(|c| c.kind() == "raw_text");
        let Some(raw) = raw else {
            return;
        };
        let script = get_node_text(raw, self.source);
        if script.trim().is_empty() {
            return;
        }

        if !self.registry.is_available(Grammar::JavaScript) {
            out.push(depth + 1, Kind::Note, "JavaScript parser not available for script block");
            return;
        }
        let script = script.as_bytes();
        match self.registry.parse(Grammar::JavaScript, script) {
            Ok(tree) => javascript::extract_nested(tree.root_node(), script, depth + 1, out),
            Err(err) => out.push(depth + 1, Kind::Error, err.to_string()),
        }
    }

    /// Find every `@code {` / `@functions {` marker starting in this text node
    fn code_blocks(&mut self, out: &mut Outline, node: Node, depth: usize) {
        let source = self.source;
        let end = node.end_byte().min(source.len());
        let mut search_from = node.start_byte().max(self.consumed_until);

        while search_from < end {
            let Some(caps) = CODE_BLOCK_MARKER.captures(&source[search_from..end]) else {
                break;
            };
            let (Some(marker), Some(token)) = (caps.get(0), caps.get(1)) else {
                break;
            };
            let token = String::from_utf8_lossy(token.as_bytes()).into_owned();
            let open = search_from + marker.end() - 1;

            let (inner_end, resume) = match matching_brace(source, open) {
                Some(close) => (close, close + 1),
                None => match last_brace(&source[open + 1..end]) {
                    Some(offset) => (open + 1 + offset, open + 2 + offset),
                    None => (end, end),
                },
            };

            out.push(depth, Kind::CodeBlock, format!("@{token}"));
            self.summarize_code(out, &source[open + 1..inner_end], depth + 1);

            self.consumed_until = resume;
            search_from = resume;
        }
    }

    fn summarize_code(&self, out: &mut Outline, code: &[u8], depth: usize) {
        if code.iter().all(u8::is_ascii_whitespace) {
            return;
        }
        if !self.registry.is_available(Grammar::CSharp) {
            out.push(depth, Kind::Note, "C# parser not available for code block");
            return;
        }

        let mut wrapped = format!("class {CODE_BLOCK_WRAPPER} {{\n").into_bytes();
        wrapped.extend_from_slice(code);
        wrapped.extend_from_slice(b"\n}\n");

        match self.registry.parse(Grammar::CSharp, &wrapped) {
            Ok(tree) => {
                if let Some(body) = wrapper_body(tree.root_node(), &wrapped) {
                    csharp::extract_members(body, &wrapped, depth, out);
                }
            }
            Err(err) => out.push(depth, Kind::Error, err.to_string()),
        }
    }
}

// ============ Helpers ============

/// Index of the `}` closing the `{` at `open`
fn matching_brace(source: &[u8], open: usize) -> Option<usize> {
    let mut nesting = 0usize;
    for (offset, byte) in source.get(open..)?.iter().enumerate() {
        match byte {
            b'{' => nesting += 1,
            b'}' => {
                nesting = nesting.saturating_sub(1);
                if nesting == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }
    None
}

fn last_brace(text: &[u8]) -> Option<usize> {
    text.iter().rposition(|&b| b == b'}')
}

/// Body of the synthetic wrapper class
fn wrapper_body<'t>(root: Node<'t>, source: &[u8]) -> Option<Node<'t>> {
    let mut cursor = root.walk();
    let class = root.children(&mut cursor).find(|child| {
        child.kind() == "class_declaration"
            && child
                .child_by_field_name("name")
                .is_some_and(|name| get_node_text(name, source) == CODE_BLOCK_WRAPPER)
    });
    class.and_then(|class| class.child_by_field_name("body"))
}

// ============ Tests ============
