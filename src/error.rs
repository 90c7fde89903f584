use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("row {row}: invalid timestamp '{value}', expected YYYY-MM-DD HH:MM:SS")]
    InvalidTimestamp { row: usize, value: String },
    #[error("row {row}: invalid rating '{value}', expected an integer from 1 to 5")]
    InvalidRating { row: usize, value: String },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CsatError {
    #[error("cannot compute CSAT for an empty group")]
    EmptyGroup,
}
