//! Project report: one section per summarized file, rendered as text or JSON.

use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::config::ReportFormat;
use crate::error::{OutlineError, Result};
use crate::outline::{Kind, Outline, OutlineLine, SupportedLanguage};

// ============ File Sections ============

/// Outline of one source file
#[derive(Debug, Clone, Serialize)]
pub struct FileSection {
    pub path: String,
    pub language: SupportedLanguage,
    pub directives: Vec<String>,
    pub lines: Vec<OutlineLine>,
}

impl FileSection {
    /// Build a section; files without lines or directives produce none
    pub fn from_outline(path: &Path, language: SupportedLanguage, outline: Outline) -> Option<Self> {
        if outline.is_empty() {
            return None;
        }
        Some(Self {
            path: path.display().to_string(),
            language,
            directives: outline.directives.into_iter().collect(),
            lines: outline.lines,
        })
    }

    /// Section standing in for a file that could not be processed
    pub fn failed(path: &Path, language: SupportedLanguage, message: &str) -> Self {
        let path = path.display().to_string();
        let error = OutlineLine::entry(1, Kind::Error, format!("{path}: {message}"));
        Self {
            path,
            language,
            directives: Vec::new(),
            lines: vec![error],
        }
    }

    pub fn render(&self) -> String {
        let mut out = Vec::with_capacity(self.lines.len() + 2);
        out.push(format!("-- FILE: {} ({}) --", self.path, self.language.tag()));
        if !self.directives.is_empty() {
            out.push(format!(
                "  {}: {}",
                self.language.directive_label(),
                self.directives.join(", ")
            ));
        }
        out.extend(self.lines.iter().map(OutlineLine::render));
        out.join("\n")
    }
}

// ============ Report ============

#[derive(Debug, Default, Serialize)]
pub struct Report {
    pub sections: Vec<FileSection>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, section: FileSection) {
        self.sections.push(section);
    }

    /// Sections separated by a blank line, with no leading blank line
    pub fn render_text(&self) -> String {
        self.sections
            .iter()
            .map(FileSection::render)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn render_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Text => Ok(self.render_text()),
            ReportFormat::Json => self.render_json(),
        }
    }

    /// Write the rendered report, creating the parent directory when needed
    pub fn write(&self, path: &Path, format: ReportFormat) -> Result<()> {
        let contents = self.render(format)?;
        let write_error = |source: std::io::Error| OutlineError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(write_error)?;
                info!("Created output directory: {}", parent.display());
            }
        }
        fs::write(path, contents).map_err(write_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn section(path: &str, language: SupportedLanguage, directives: &[&str], lines: Vec<OutlineLine>) -> FileSection {
        let mut outline = Outline::new();
        for directive in directives {
            outline.directive(directive);
        }
        outline.lines = lines;
        FileSection::from_outline(&PathBuf::from(path), language, outline).unwrap()
    }

    #[test]
    fn test_empty_outline_has_no_section() {
        let result = FileSection::from_outline(Path::new("a.cs"), SupportedLanguage::CSharp, Outline::new());
        assert!(result.is_none());
    }

    #[test]
    fn test_section_render_with_directives() {
        let section = section(
            "src/A.cs",
            SupportedLanguage::CSharp,
            &["using B", "using A", "using A"],
            vec![OutlineLine::entry(0, Kind::Class, "A")],
        );
        assert_eq!(
            section.render(),
            "-- FILE: src/A.cs (C#) --\n  USINGS: using A, using B\nCLASS: A"
        );
    }

    #[test]
    fn test_failed_section() {
        let section = FileSection::failed(Path::new("bad.py"), SupportedLanguage::Python, "boom");
        assert_eq!(section.render(), "-- FILE: bad.py (Python) --\n  ERROR: bad.py: boom");
    }

    #[test]
    fn test_report_text_separates_sections() {
        let mut report = Report::new();
        report.push(section("a.js", SupportedLanguage::JavaScript, &[], vec![OutlineLine::entry(0, Kind::Function, "f()")]));
        report.push(section("b.h", SupportedLanguage::Cpp, &["<vector>"], vec![]));
        assert_eq!(
            report.render_text(),
            "-- FILE: a.js (JavaScript) --\nFUNC: f()\n\n-- FILE: b.h (C/C++) --\n  INCLUDES: <vector>"
        );
    }

    #[test]
    fn test_report_json_shape() {
        let mut report = Report::new();
        report.push(section(
            "m.py",
            SupportedLanguage::Python,
            &["import os"],
            vec![OutlineLine::header(0, Kind::Field), OutlineLine::member(1, "int x")],
        ));
        let value: serde_json::Value = serde_json::from_str(&report.render_json().unwrap()).unwrap();
        let section = &value["sections"][0];
        assert_eq!(section["path"], "m.py");
        assert_eq!(section["language"], "Python");
        assert_eq!(section["directives"][0], "import os");
        assert_eq!(section["lines"][0]["kind"], "FIELD");
        assert_eq!(section["lines"][1]["kind"], serde_json::Value::Null);
        assert_eq!(section["lines"][1]["depth"], 1);
    }

    #[test]
    fn test_write_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("nested/out/summary.txt");
        let mut report = Report::new();
        report.push(section("a.js", SupportedLanguage::JavaScript, &[], vec![OutlineLine::entry(0, Kind::Function, "f()")]));

        report.write(&target, ReportFormat::Text).unwrap();
        let written = fs::read_to_string(&target).unwrap();
        assert!(written.starts_with("-- FILE: a.js (JavaScript) --"));
    }

    #[test]
    fn test_write_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "file, not a directory").unwrap();
        let target = blocker.join("summary.txt");

        let err = Report::new().write(&target, ReportFormat::Text).unwrap_err();
        assert!(matches!(err, OutlineError::Write { .. }));
    }
}
