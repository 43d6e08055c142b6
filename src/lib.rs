//! Structural outlines of C#, JavaScript, Razor, Python and C/C++ source trees.
//!
//! A scan walks a directory, parses every recognized file with tree-sitter
//! and writes one report section per file listing its namespaces, types,
//! members, functions and imports.

pub mod config;
pub mod error;
pub mod outline;
pub mod report;


use std::fs;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use tracing::{debug, info, warn};

use crate::config::OutlineConfig;
use crate::error::{OutlineError, Result};
use crate::outline::{summarize_source, GrammarRegistry, SupportedLanguage};
use crate::report::{FileSection, Report};

// ============ Directory Walk ============

/// Recognized source files under the scan directory, in file-name order
pub fn collect_source_files(config: &OutlineConfig) -> Vec<(PathBuf, SupportedLanguage)> {
    let excluded = config.clone();
    let walker = WalkBuilder::new(&config.scan_directory)
        .standard_filters(config.respect_ignore_files)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            if entry.depth() == 0 || !is_dir {
                return true;
            }
            !excluded.is_excluded_dir(&entry.file_name().to_string_lossy())
        })
        .build();

    let mut files = Vec::new();
    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Skipping unreadable entry: {}", err);
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        if let Some(language) = SupportedLanguage::from_path(entry.path()) {
            files.push((entry.into_path(), language));
        }
    }
    files
}

// ============ File Processing ============

/// Summarize one file.
///
/// Returns `None` when the file has nothing to report or its grammar is not
/// loaded; a read or parse failure becomes an error section.
pub fn summarize_file(
    path: &Path,
    language: SupportedLanguage,
    registry: &GrammarRegistry,
) -> Option<FileSection> {
    if !registry.is_available(language.primary_grammar()) {
        debug!("No {} grammar, skipping {}", language.primary_grammar(), path.display());
        return None;
    }
    debug!("Summarizing {} as {}", path.display(), language);

    let result = fs::read(path)
        .map_err(OutlineError::from)
        .and_then(|source| summarize_source(language, &source, registry));

    match result {
        Ok(outline) => FileSection::from_outline(path, language, outline),
        Err(err) => {
            warn!("Failed to process {}: {}", path.display(), err);
            Some(FileSection::failed(path, language, &err.to_string()))
        }
    }
}

/// Walk the scan directory and collect a section per file with content
pub fn scan_directory(config: &OutlineConfig, registry: &GrammarRegistry) -> Report {
    let files = collect_source_files(config);
    let mut report = Report::new();

    for (path, language) in &files {
        if let Some(section) = summarize_file(path, *language, registry) {
            report.push(section);
        }
    }

    info!(
        "Scanned {} source files, {} with content",
        files.len(),
        report.sections.len()
    );
    report
}

/// Scan and write the report to the configured destination
pub fn run(config: &OutlineConfig) -> Result<Report> {
    let registry = GrammarRegistry::load();
    let report = scan_directory(config, &registry);

    if let Err(err) = report.write(&config.output_file, config.format) {
        tracing::error!("{}", err);
        return Err(err);
    }

    let written = fs::canonicalize(&config.output_file).unwrap_or_else(|_| config.output_file.clone());
    info!("Summary written to {}", written.display());
    Ok(report)
}
