//! Run configuration: where to scan, where to write, and what to skip.

use std::path::PathBuf;

use clap::ValueEnum;

/// Directory names pruned from every walk
pub const EXCLUDED_DIRS: [&str; 13] = [
    ".git",
    "obj",
    "bin",
    "venv",
    ".vs",
    "node_modules",
    "tmp",
    "temp",
    "tmp_project_files",
    "x64",
    "Debug",
    "Release",
    "Profiling",
];

/// Output format of the summary file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct OutlineConfig {
    pub scan_directory: PathBuf,
    pub output_file: PathBuf,
    pub format: ReportFormat,
    /// Honor .gitignore / .ignore files in addition to the fixed exclusions
    pub respect_ignore_files: bool,
    pub excluded_dirs: Vec<String>,
}

impl OutlineConfig {
    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.excluded_dirs.iter().any(|dir| dir == name)
    }
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            scan_directory: PathBuf::from("."),
            output_file: PathBuf::from("./CODE_SUMMARY.txt"),
            format: ReportFormat::Text,
            respect_ignore_files: false,
            excluded_dirs: EXCLUDED_DIRS.iter().map(|dir| dir.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OutlineConfig::default();
        assert_eq!(config.scan_directory, PathBuf::from("."));
        assert_eq!(config.output_file, PathBuf::from("./CODE_SUMMARY.txt"));
        assert_eq!(config.format, ReportFormat::Text);
        assert!(config.is_excluded_dir("node_modules"));
        assert!(config.is_excluded_dir("Release"));
        assert!(!config.is_excluded_dir("release"));
        assert!(!config.is_excluded_dir("src"));
    }
}
