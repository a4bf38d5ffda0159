use thiserror::Error;

#[derive(Error, Debug)]
pub enum TallyError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("No transaction with id {0}")]
    NotFound(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

/// Which part of the system an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Validation,
    Store,
    Export,
    Environment,
}

impl TallyError {
    pub fn class(&self) -> ErrorClass {
        match self {
            TallyError::Validation(_) => ErrorClass::Validation,
            TallyError::Db(_) | TallyError::NotFound(_) => ErrorClass::Store,
            TallyError::Csv(_)
            | TallyError::Xlsx(_)
            | TallyError::Pdf(_)
            | TallyError::Export(_) => ErrorClass::Export,
            TallyError::Io(_) | TallyError::Settings(_) => ErrorClass::Environment,
        }
    }
}

pub type Result<T> = std::result::Result<T, TallyError>;
