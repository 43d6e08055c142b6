//! Outline extraction: per-language declaration walkers over tree-sitter ASTs.
//!
//! Each language has its own submodule that walks the syntax tree and
//! records one [`OutlineLine`] per declaration, plus the file's
//! imports/usings/includes as directives.
//!
//! ## Architecture
//!
//! ```text
//! outline/
//! ├── mod.rs         - Entry point, language dispatch
//! ├── common.rs      - Line kinds, outline records, node-text helpers
//! ├── registry.rs    - Grammar loading and parsing
//! ├── csharp.rs      - C# walker
//! ├── javascript.rs  - JavaScript walker
//! ├── python.rs      - Python walker
//! ├── cpp.rs         - C/C++ walker
//! ├── cshtml.rs      - Razor views: HTML with embedded JavaScript and C#
//! └── regroup.rs     - C/C++ post-processing (owner grouping, kind groups)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use outline::{summarize_source, GrammarRegistry, SupportedLanguage};
//!
//! let registry = GrammarRegistry::load();
//! let outline = summarize_source(SupportedLanguage::CSharp, b"class A {}", &registry)?;
//! ```

pub mod common;
pub mod cpp;
pub mod csharp;
pub mod cshtml;
pub mod javascript;
pub mod python;
pub mod regroup;
pub mod registry;

use std::fmt;
use std::path::Path;

use serde::{Serialize, Serializer};

use crate::error::Result;

pub use common::{Kind, Outline, OutlineLine};
pub use registry::{Grammar, GrammarRegistry};

// ============ Supported Languages ============

/// Source languages recognized by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupportedLanguage {
    CSharp,
    JavaScript,
    Cshtml,
    Python,
    Cpp,
}

impl SupportedLanguage {
    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "cs" => Some(Self::CSharp),
            "js" | "mjs" | "cjs" => Some(Self::JavaScript),
            "cshtml" | "razor" => Some(Self::Cshtml),
            "py" | "pyi" => Some(Self::Python),
            "c" | "h" | "cpp" | "hpp" | "cc" | "hh" | "cxx" => Some(Self::Cpp),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Grammar used to parse the whole file
    pub fn primary_grammar(&self) -> Grammar {
        match self {
            Self::CSharp => Grammar::CSharp,
            Self::JavaScript => Grammar::JavaScript,
            Self::Cshtml => Grammar::Html,
            Self::Python => Grammar::Python,
            Self::Cpp => Grammar::Cpp,
        }
    }

    /// Tag shown in the section header
    pub fn tag(&self) -> &'static str {
        match self {
            Self::CSharp => "C#",
            Self::JavaScript => "JavaScript",
            Self::Cshtml => "CSHTML",
            Self::Python => "Python",
            Self::Cpp => "C/C++",
        }
    }

    /// Label of the directive summary line
    pub fn directive_label(&self) -> &'static str {
        match self {
            Self::CSharp => "USINGS",
            Self::JavaScript | Self::Python => "IMPORTS",
            Self::Cshtml => "DIRECTIVES",
            Self::Cpp => "INCLUDES",
        }
    }
}

impl fmt::Display for SupportedLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl Serialize for SupportedLanguage {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

// ============ Main Entry Point ============

/// Parse `source` and build its outline.
///
/// C/C++ outlines are passed through [`regroup::regroup`] before returning.
pub fn summarize_source(
    language: SupportedLanguage,
    source: &[u8],
    registry: &GrammarRegistry,
) -> Result<Outline> {
    let tree = registry.parse(language.primary_grammar(), source)?;
    let root = tree.root_node();
    let mut outline = Outline::new();

    match language {
        SupportedLanguage::CSharp => csharp::extract_outline(root, source, &mut outline),
        SupportedLanguage::JavaScript => javascript::extract_outline(root, source, &mut outline),
        SupportedLanguage::Python => python::extract_outline(root, source, &mut outline),
        SupportedLanguage::Cshtml => {
            cshtml::extract_outline(root, source, registry, &mut outline)
        }
        SupportedLanguage::Cpp => {
            cpp::extract_outline(root, source, &mut outline);
            outline.lines = regroup::regroup(outline.lines);
        }
    }

    Ok(outline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OutlineError;

    #[test]
    fn test_language_from_extension() {
        assert_eq!(SupportedLanguage::from_extension("cs"), Some(SupportedLanguage::CSharp));
        assert_eq!(SupportedLanguage::from_extension("MJS"), Some(SupportedLanguage::JavaScript));
        assert_eq!(SupportedLanguage::from_extension("razor"), Some(SupportedLanguage::Cshtml));
        assert_eq!(SupportedLanguage::from_extension("pyi"), Some(SupportedLanguage::Python));
        assert_eq!(SupportedLanguage::from_extension("hh"), Some(SupportedLanguage::Cpp));
        assert_eq!(SupportedLanguage::from_extension("ts"), None);
    }

    #[test]
    fn test_language_from_path() {
        let path = Path::new("src/widgets/Button.cxx");
        assert_eq!(SupportedLanguage::from_path(path), Some(SupportedLanguage::Cpp));
        assert_eq!(SupportedLanguage::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn test_summarize_csharp_source() {
        let registry = GrammarRegistry::load();
        let outline =
            summarize_source(SupportedLanguage::CSharp, b"class A { void M(){} }", &registry)
                .unwrap();
        let rendered: Vec<_> = outline.lines.iter().map(|l| l.render()).collect();
        assert_eq!(rendered, vec!["CLASS: A", "  METH: M()"]);
    }

    #[test]
    fn test_summarize_cpp_source_is_regrouped() {
        let registry = GrammarRegistry::load();
        let source = b"struct P { int x; int y; };\n";
        let outline = summarize_source(SupportedLanguage::Cpp, source, &registry).unwrap();
        let rendered: Vec<_> = outline.lines.iter().map(|l| l.render()).collect();
        assert_eq!(rendered, vec!["STRUCT: P", "  FIELD:", "    int x", "    int y"]);
    }

    #[test]
    fn test_summarize_cpp_keeps_parenthesized_return_types() {
        let registry = GrammarRegistry::load();
        let source = b"std::function<void(int)> make_handler() { return {}; }\n\
                       decltype(auto) Foo::get() { return 1; }\n";
        let outline = summarize_source(SupportedLanguage::Cpp, source, &registry).unwrap();
        let rendered: Vec<_> = outline.lines.iter().map(|l| l.render()).collect();
        assert_eq!(
            rendered,
            vec![
                "FUNC: std::function<void(int)> make_handler()",
                "CLASS: Foo",
                "  FUNC: decltype(auto) get()",
            ]
        );
    }

    #[test]
    fn test_summarize_without_grammar_fails() {
        let registry = GrammarRegistry::with_grammars(&[Grammar::CSharp]);
        let err = summarize_source(SupportedLanguage::Python, b"x = 1\n", &registry).unwrap_err();
        assert!(matches!(err, OutlineError::GrammarUnavailable(Grammar::Python)));
    }
}
