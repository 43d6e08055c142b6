//! Regrouping of C/C++ outlines.
//!
//! Two passes over the flat line list produced by the C/C++ walker:
//!
//! 1. [`reparent_qualified`] moves top-level out-of-line definitions such as
//!    `int Foo::Bar()` under a synthesized `CLASS: Foo` group.
//! 2. [`group_kinds`] rebuilds the tree from depths, orders namespace and type
//!    members by kind and folds runs of same-kind siblings under a `KIND:` header.

use std::collections::BTreeMap;
use std::iter::Peekable;
use std::vec::IntoIter;

use super::common::{Kind, OutlineLine};

/// Preferred order of members inside namespace, class, struct and union bodies
const MEMBER_ORDER: [Kind; 5] = [
    Kind::Field,
    Kind::Constructor,
    Kind::Destructor,
    Kind::Function,
    Kind::FunctionDecl,
];

/// Run both passes
pub fn regroup(lines: Vec<OutlineLine>) -> Vec<OutlineLine> {
    group_kinds(reparent_qualified(lines))
}

// ============ Owner Grouping ============

/// Move `Owner::member` definitions at depth 0 into per-owner `CLASS` groups.
///
/// Groups are appended after the remaining lines, sorted by owner. Lines
/// whose signature does not split cleanly stay where they are.
pub fn reparent_qualified(lines: Vec<OutlineLine>) -> Vec<OutlineLine> {
    let mut remaining = Vec::with_capacity(lines.len());
    let mut owners: BTreeMap<String, Vec<OutlineLine>> = BTreeMap::new();

    for line in lines {
        let qualified = match line.kind {
            Some(kind) if line.depth == 0 && !kind.is_container() => {
                split_qualified(&line.text).map(|(owner, text)| (owner, kind, text))
            }
            _ => None,
        };
        match qualified {
            Some((owner, kind, text)) => {
                owners.entry(owner).or_default().push(OutlineLine::entry(1, kind, text))
            }
            None => remaining.push(line),
        }
    }

    for (owner, members) in owners {
        remaining.push(OutlineLine::entry(0, Kind::Class, owner));
        remaining.extend(members);
    }
    remaining
}

/// Keywords whose parenthesized operand belongs to the declared type
const TYPE_OPERATORS: [&str; 6] = [
    "decltype",
    "typeof",
    "__typeof__",
    "alignas",
    "__attribute__",
    "__declspec",
];

/// Split `ret Owner::member(args)` into `Owner` and `ret member(args)`
fn split_qualified(signature: &str) -> Option<(String, String)> {
    let head_end = parameter_list_start(signature).unwrap_or(signature.len());
    let (head, tail) = signature.split_at(head_end);

    let separator = last_scope_separator(head)?;
    let qualifiers = &head[..separator];
    let member = head[separator + 2..].trim();
    if member.is_empty() || member.contains(char::is_whitespace) {
        return None;
    }
    // `::global()` has no owner
    if qualifiers.is_empty() || qualifiers.ends_with(char::is_whitespace) {
        return None;
    }

    let mut words = split_top_level(qualifiers);
    let owner = words.pop()?;
    let declared_type = words.join(" ");
    let text = format!("{declared_type} {member}{tail}").trim().to_string();
    Some((owner, text))
}

/// Offset of the `(` opening the parameter list.
///
/// Parentheses inside template arguments, inside other parentheses, or
/// after `decltype`-like keywords are skipped.
fn parameter_list_start(signature: &str) -> Option<usize> {
    let mut angles = 0usize;
    let mut parens = 0usize;
    for (index, ch) in signature.char_indices() {
        match ch {
            '<' if parens == 0 => angles += 1,
            '>' if parens == 0 => angles = angles.saturating_sub(1),
            '(' => {
                if angles == 0 && parens == 0 {
                    let before = signature[..index].trim_end();
                    if !TYPE_OPERATORS.iter().any(|kw| ends_with_word(before, kw)) {
                        return Some(index);
                    }
                }
                parens += 1;
            }
            ')' => parens = parens.saturating_sub(1),
            _ => {}
        }
    }
    None
}

fn ends_with_word(text: &str, word: &str) -> bool {
    text.strip_suffix(word).is_some_and(|rest| {
        !rest
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
    })
}

/// Offset of the last `::` outside template arguments and parentheses
fn last_scope_separator(head: &str) -> Option<usize> {
    let bytes = head.as_bytes();
    let mut nesting = 0usize;
    let mut found = None;
    let mut index = 0;
    while index < bytes.len() {
        match bytes[index] {
            b'<' | b'(' => nesting += 1,
            b'>' | b')' => nesting = nesting.saturating_sub(1),
            b':' if nesting == 0 && bytes.get(index + 1) == Some(&b':') => {
                found = Some(index);
                index += 2;
                continue;
            }
            _ => {}
        }
        index += 1;
    }
    found
}

/// Split on whitespace that is not inside template arguments or parentheses
fn split_top_level(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut nesting = 0usize;

    for ch in text.chars() {
        match ch {
            '<' | '(' => nesting += 1,
            '>' | ')' => nesting = nesting.saturating_sub(1),
            c if c.is_whitespace() && nesting == 0 => {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

// ============ Kind Grouping ============

struct TreeNode {
    line: OutlineLine,
    children: Vec<TreeNode>,
}

/// Order namespace and type members and fold same-kind runs; depths are recomputed
pub fn group_kinds(lines: Vec<OutlineLine>) -> Vec<OutlineLine> {
    let mut lines = lines.into_iter().peekable();
    let forest = build_forest(&mut lines, 0);
    let forest = group_forest(forest, false);

    let mut out = Vec::new();
    flatten(forest, 0, &mut out);
    out
}

fn build_forest(lines: &mut Peekable<IntoIter<OutlineLine>>, min_depth: usize) -> Vec<TreeNode> {
    let mut nodes = Vec::new();
    while let Some(line) = lines.next_if(|line| line.depth >= min_depth) {
        let children = build_forest(lines, line.depth + 1);
        nodes.push(TreeNode { line, children });
    }
    nodes
}

fn group_forest(nodes: Vec<TreeNode>, ordered: bool) -> Vec<TreeNode> {
    let mut nodes: Vec<TreeNode> = nodes
        .into_iter()
        .map(|mut node| {
            let orders_members = node.line.kind.is_some_and(|k| k.orders_members());
            node.children = group_forest(std::mem::take(&mut node.children), orders_members);
            node
        })
        .collect();

    if ordered {
        nodes.sort_by_key(member_rank);
    }

    let mut grouped = Vec::with_capacity(nodes.len());
    let mut nodes = nodes.into_iter().peekable();
    while let Some(node) = nodes.next() {
        let Some(kind) = groupable_kind(&node) else {
            grouped.push(node);
            continue;
        };

        let mut run = vec![node];
        while let Some(next) = nodes.next_if(|next| groupable_kind(next) == Some(kind)) {
            run.push(next);
        }

        if run.len() < 2 {
            grouped.extend(run);
            continue;
        }

        let mut members: Vec<String> = run.into_iter().map(|n| n.line.text).collect();
        members.sort();
        members.dedup();
        grouped.push(TreeNode {
            line: OutlineLine::header(0, kind),
            children: members
                .into_iter()
                .map(|text| TreeNode {
                    line: OutlineLine::member(0, text),
                    children: Vec::new(),
                })
                .collect(),
        });
    }
    grouped
}

/// Kind of a childless, non-container entry
fn groupable_kind(node: &TreeNode) -> Option<Kind> {
    node.line
        .kind
        .filter(|kind| !kind.is_container() && node.children.is_empty())
}

/// Preferred kinds first, then other kinds by label, then nested containers
fn member_rank(node: &TreeNode) -> (usize, String) {
    match node.line.kind {
        Some(kind) if kind.is_container() => (MEMBER_ORDER.len() + 1, String::new()),
        Some(kind) => match MEMBER_ORDER.iter().position(|k| *k == kind) {
            Some(position) => (position, String::new()),
            None => (MEMBER_ORDER.len(), kind.to_string()),
        },
        None => (MEMBER_ORDER.len() + 1, String::new()),
    }
}

fn flatten(nodes: Vec<TreeNode>, depth: usize, out: &mut Vec<OutlineLine>) {
    for node in nodes {
        let mut line = node.line;
        line.depth = depth;
        out.push(line);
        flatten(node.children, depth + 1, out);
    }
}

// ============ Tests ============
