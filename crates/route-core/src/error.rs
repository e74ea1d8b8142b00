use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SvError {
    /// A route cannot be assembled from the variant(s).
    #[error("Dispatch error: {0}")]
    DispatchError(String),

    /// A breakend pair that does not rearrange anything.
    #[error("Degenerate breakend: {0}")]
    DegenerateBreakendError(String),

    #[error("Evaluation error: {0}")]
    EvaluationError(String),

    #[error("Parsing error: {0}")]
    ParsingError(String),

    #[error("IO error: {0}")]
    IOError(String),

    #[error("Value error: {0}")]
    ValueError(String),

    #[error("{0}")]
    CliError(String),
}

impl SvError {
    pub fn is_same_type(&self, other: &SvError) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl From<std::io::Error> for SvError {
    fn from(e: std::io::Error) -> Self {
        SvError::IOError(e.to_string())
    }
}

impl From<csv::Error> for SvError {
    fn from(e: csv::Error) -> Self {
        SvError::ParsingError(e.to_string())
    }
}

impl From<serde_json::Error> for SvError {
    fn from(e: serde_json::Error) -> Self {
        SvError::ParsingError(e.to_string())
    }
}

impl From<std::num::ParseIntError> for SvError {
    fn from(e: std::num::ParseIntError) -> Self {
        SvError::ParsingError(e.to_string())
    }
}

impl From<std::num::ParseFloatError> for SvError {
    fn from(e: std::num::ParseFloatError) -> Self {
        SvError::ParsingError(e.to_string())
    }
}
