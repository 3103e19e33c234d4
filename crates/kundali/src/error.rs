use thiserror::Error;

/// A single form field that could not be turned into its typed value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
    #[error("{field} must be a whole number, got '{value}'")]
    NotAnInteger { field: &'static str, value: String },
    #[error("{field} must be a decimal number, got '{value}'")]
    NotADecimal { field: &'static str, value: String },
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: String,
        min: String,
        max: String,
    },
    #[error("{field}: {message}")]
    Unrecognized { field: &'static str, message: String },
}

impl FieldError {
    pub fn field(&self) -> &'static str {
        match self {
            FieldError::Empty { field }
            | FieldError::NotAnInteger { field, .. }
            | FieldError::NotADecimal { field, .. }
            | FieldError::OutOfRange { field, .. }
            | FieldError::Unrecognized { field, .. } => *field,
        }
    }
}

/// Every field error of one form submission.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", join_field_errors(.errors))]
pub struct FieldCoercionError {
    pub errors: Vec<FieldError>,
}

impl FieldCoercionError {
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.errors.iter().map(FieldError::field)
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields().any(|f| f == field)
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// The engine rejected the birth data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct ValidationError {
    pub reason: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChartError {
    #[error("Input error: please check your birth data.")]
    InvalidInput,
    #[error("Output path error: the engine tried to write to disk although an in-memory dictionary was requested.")]
    OutputPathUnavailable,
    #[error("{0}")]
    InvalidParameter(String),
    #[error("Chart generation returned no data.")]
    EmptyResult,
    #[error("Chart type '{0}' not found in the generated data.")]
    ChartNotFound(String),
    #[error("Chart '{id}' has an unexpected shape: {reason}")]
    MalformedChart { id: String, reason: String },
    #[error("Unrecognized engine response: {0}")]
    UnrecognizedResponse(String),
}

/// Failures talking to the engine itself, as opposed to the engine's verdicts.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("failed to start engine program '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("engine I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("engine program '{program}' exited with {status}: {stderr}")]
    Exit {
        program: String,
        status: String,
        stderr: String,
    },
    #[error("engine sent an undecodable reply: {0}")]
    Protocol(String),
    #[error("engine call out of order: {0}")]
    OutOfOrder(&'static str),
    #[error("failed to load recorded dataset from {path}: {message}")]
    Dataset { path: String, message: String },
}

/// First failure of a submission; the pipeline stops there.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Form(#[from] FieldCoercionError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Chart(#[from] ChartError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl PipelineError {
    /// Short heading for user-facing messages.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Form(_) => "Form Error",
            PipelineError::Validation(_) => "Validation Error",
            PipelineError::Chart(_) => "Chart Error",
            PipelineError::Engine(_) => "Engine Error",
        }
    }
}
