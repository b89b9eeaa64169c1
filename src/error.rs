//! Typed errors for the readers and the metric evaluator.

#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("Failed to read delimited row: {0}")]
    Csv(#[from] csv::Error),
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),
    #[error("Line {line}: missing column `{column}`")]
    MissingColumn { line: u64, column: String },
    #[error("Line {line}: expected {expected} columns, found {found}")]
    ExtraColumns { line: u64, expected: usize, found: usize },
    #[error("Line {line}: column `{column}` is empty")]
    EmptyField { line: u64, column: String },
    #[error("Line {line}: column `{column}` has invalid count `{value}`")]
    InvalidCount {
        line: u64,
        column: String,
        value: String,
    },
    #[error("Line {line}: rider count overflows the aggregate")]
    CountOverflow { line: u64 },
    #[error("Line {line}: invalid value `{value}`")]
    InvalidValue { line: u64, value: String },
}

#[derive(thiserror::Error, Debug)]
pub enum EvalError {
    #[error("Line {line}: {reason}")]
    Parse { line: u64, reason: String },
    #[error("Failed to read evaluation data: {0}")]
    Io(#[from] std::io::Error),
    #[error("Metric `{0}` has no recorded values")]
    MissingMetric(String),
}
