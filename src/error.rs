use std::path::PathBuf;

use thiserror::Error;

use crate::outline::Grammar;

#[derive(Debug, Error)]
pub enum OutlineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0} grammar is not available")]
    GrammarUnavailable(Grammar),

    #[error("failed to load {grammar} grammar: {source}")]
    GrammarLoad {
        grammar: Grammar,
        #[source]
        source: tree_sitter::LanguageError,
    },

    #[error("{0} parser produced no syntax tree")]
    ParseFailed(Grammar),

    #[error("{grammar} syntax tree nests deeper than {limit} levels")]
    TooDeep { grammar: Grammar, limit: usize },

    #[error("failed to write report to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, OutlineError>;
