use std::path::PathBuf;

use thiserror::Error;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Fatal problems while loading the sales spreadsheet.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open sales data '{0}': {1}")]
    Open(PathBuf, std::io::Error),
    #[error("failed to read CSV headers: {0}")]
    Headers(csv::Error),
    #[error("missing required column: `{0}`")]
    MissingColumn(&'static str),
    #[error("failed to read workbook '{0}': {1}")]
    Workbook(PathBuf, calamine::Error),
    #[error("workbook '{0}' has no worksheets")]
    NoWorksheet(PathBuf),
    #[error("line {line}: CSV parse error: {source}")]
    Record { line: usize, source: csv::Error },
    #[error("line {line}: expected {expected} fields, found {found}")]
    RaggedRow { line: usize, expected: usize, found: usize },
    #[error("line {line}: invalid value '{value}' in column `{column}`")]
    InvalidValue {
        line: usize,
        column: &'static str,
        value: String,
    },
}

impl From<LoadError> for AppError {
    fn from(err: LoadError) -> Self {
        AppError::new(2, err.to_string())
    }
}
