use thiserror::Error;

/// Failures while assembling a [`Tree`](crate::model::Tree) from records.
#[derive(Debug, Error, PartialEq)]
pub enum TreeError {
    #[error("no roots, possible cycle in graph")]
    NoRoot,
    #[error("duplicate path: {0}")]
    DuplicatePath(String),
    #[error("path {path} is nested {depth} levels deep, limit is {limit}")]
    TooDeep {
        path: String,
        depth: usize,
        limit: usize,
    },
}

/// Failures while reading header-less CSV input.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("can not parse: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}: no values in row")]
    EmptyRow { line: u64 },
    #[error("line {line}: {field}({value}) is not float")]
    NotFloat {
        line: u64,
        field: &'static str,
        value: String,
    },
    #[error("line {line}: {field}({value}) is not finite")]
    NotFinite {
        line: u64,
        field: &'static str,
        value: String,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("can not read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("can not decode config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field} must be {expected}, got {value}")]
    Invalid {
        field: &'static str,
        expected: &'static str,
        value: f64,
    },
}
