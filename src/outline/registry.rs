//! Grammar registry: the tree-sitter languages this run can parse.
//!
//! Built once at startup and passed by reference to every walker, so a
//! grammar that fails to load only disables its own languages.

use std::collections::HashMap;
use std::fmt;

use tracing::{info, warn};
use tree_sitter::{Language, Parser, Tree};

use crate::error::{OutlineError, Result};

/// Deepest syntax tree the recursive walkers accept
pub const MAX_TREE_DEPTH: usize = 1000;

/// Backing grammars, one per parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grammar {
    CSharp,
    JavaScript,
    Html,
    Python,
    Cpp,
}

impl Grammar {
    pub const ALL: [Grammar; 5] = [
        Grammar::CSharp,
        Grammar::JavaScript,
        Grammar::Html,
        Grammar::Python,
        Grammar::Cpp,
    ];

    /// Get the tree-sitter language for this grammar
    fn tree_sitter_language(&self) -> Language {
        match self {
            Self::CSharp => tree_sitter_c_sharp::LANGUAGE.into(),
            Self::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Self::Html => tree_sitter_html::LANGUAGE.into(),
            Self::Python => tree_sitter_python::LANGUAGE.into(),
            Self::Cpp => tree_sitter_cpp::LANGUAGE.into(),
        }
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CSharp => "C#",
            Self::JavaScript => "JavaScript",
            Self::Html => "HTML",
            Self::Python => "Python",
            Self::Cpp => "C++",
        };
        f.write_str(name)
    }
}

/// Loaded grammars keyed by [`Grammar`]
pub struct GrammarRegistry {
    languages: HashMap<Grammar, Language>,
}

impl GrammarRegistry {
    /// Load every known grammar; failures are logged and leave that grammar disabled
    pub fn load() -> Self {
        Self::with_grammars(&Grammar::ALL)
    }

    /// Load only the listed grammars
    pub fn with_grammars(grammars: &[Grammar]) -> Self {
        let mut languages = HashMap::new();
        for &grammar in grammars {
            match load_grammar(grammar) {
                Ok(language) => {
                    info!("Loaded {} grammar", grammar);
                    languages.insert(grammar, language);
                }
                Err(err) => {
                    warn!("{}; {} files will be skipped", err, grammar);
                }
            }
        }
        Self { languages }
    }

    pub fn is_available(&self, grammar: Grammar) -> bool {
        self.languages.contains_key(&grammar)
    }

    /// Parse `source` with a fresh parser for `grammar`.
    ///
    /// Trees nested deeper than [`MAX_TREE_DEPTH`] are rejected before any
    /// walker sees them.
    pub fn parse(&self, grammar: Grammar, source: &[u8]) -> Result<Tree> {
        let language = self
            .languages
            .get(&grammar)
            .ok_or(OutlineError::GrammarUnavailable(grammar))?;
        let mut parser = Parser::new();
        parser
            .set_language(language)
            .map_err(|source| OutlineError::GrammarLoad { grammar, source })?;
        let tree = parser
            .parse(source, None)
            .ok_or(OutlineError::ParseFailed(grammar))?;
        if exceeds_depth(&tree, MAX_TREE_DEPTH) {
            return Err(OutlineError::TooDeep {
                grammar,
                limit: MAX_TREE_DEPTH,
            });
        }
        Ok(tree)
    }
}

/// Iterative pre-order walk that stops as soon as a node sits below `limit`
fn exceeds_depth(tree: &Tree, limit: usize) -> bool {
    let mut cursor = tree.walk();
    let mut depth = 0usize;
    loop {
        if cursor.goto_first_child() {
            depth += 1;
            if depth > limit {
                return true;
            }
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                return false;
            }
            depth -= 1;
        }
    }
}

fn load_grammar(grammar: Grammar) -> Result<Language> {
    let language = grammar.tree_sitter_language();
    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .map_err(|source| OutlineError::GrammarLoad { grammar, source })?;
    Ok(language)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_all_grammars() {
        let registry = GrammarRegistry::load();
        for grammar in Grammar::ALL {
            assert!(registry.is_available(grammar), "{grammar} should load");
        }
    }

    #[test]
    fn test_unlisted_grammar_is_unavailable() {
        let registry = GrammarRegistry::with_grammars(&[Grammar::Python]);
        assert!(registry.is_available(Grammar::Python));
        assert!(!registry.is_available(Grammar::Cpp));
        let err = registry.parse(Grammar::Cpp, b"int x;").unwrap_err();
        assert!(matches!(err, OutlineError::GrammarUnavailable(Grammar::Cpp)));
    }

    #[test]
    fn test_parse_returns_tree() {
        let registry = GrammarRegistry::with_grammars(&[Grammar::Python]);
        let tree = registry.parse(Grammar::Python, b"def f():\n    pass\n").unwrap();
        assert_eq!(tree.root_node().kind(), "module");
    }

    #[test]
    fn test_every_grammar_parses() {
        let registry = GrammarRegistry::load();
        let samples: [(Grammar, &[u8], &str); 5] = [
            (Grammar::CSharp, b"class A {}", "compilation_unit"),
            (Grammar::JavaScript, b"let a = 1;", "program"),
            (Grammar::Html, b"<p>x</p>", "document"),
            (Grammar::Python, b"x = 1\n", "module"),
            (Grammar::Cpp, b"int x;", "translation_unit"),
        ];
        for (grammar, source, root) in samples {
            let tree = registry.parse(grammar, source).unwrap();
            assert_eq!(tree.root_node().kind(), root, "{grammar}");
            assert!(!tree.root_node().has_error(), "{grammar}");
        }
    }

    #[test]
    fn test_deeply_nested_source_is_rejected() {
        let registry = GrammarRegistry::with_grammars(&[Grammar::JavaScript]);
        let source = format!("{}{}", "[".repeat(50_000), "]".repeat(50_000));
        let err = registry.parse(Grammar::JavaScript, source.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            OutlineError::TooDeep { grammar: Grammar::JavaScript, limit: MAX_TREE_DEPTH }
        ));
    }

    #[test]
    fn test_moderate_nesting_is_accepted() {
        let registry = GrammarRegistry::with_grammars(&[Grammar::JavaScript]);
        let source = format!("{}{}", "[".repeat(100), "]".repeat(100));
        assert!(registry.parse(Grammar::JavaScript, source.as_bytes()).is_ok());
    }
}
