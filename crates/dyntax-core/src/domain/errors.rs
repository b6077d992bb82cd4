use std::error::Error;
use std::fmt::{Display, Formatter};

pub type DynTaxResult<T> = Result<T, DynTaxError>;
pub type ExtractResult<T> = DynTaxResult<T>;
pub type SynthesisResult<T> = DynTaxResult<T>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DynTaxErrorCategory {
    Success,
    InputValidationError,
    IoSystemError,
    ComputationError,
    InternalError,
}

impl DynTaxErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::InputValidationError => 2,
            Self::IoSystemError => 3,
            Self::ComputationError => 4,
            Self::InternalError => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::InputValidationError => "InputValidationError",
            Self::IoSystemError => "IoSystemError",
            Self::ComputationError => "ComputationError",
            Self::InternalError => "InternalError",
        }
    }

    pub const fn is_fatal(self) -> bool {
        !matches!(self, Self::Success)
    }
}

/// What went wrong, independent of how it is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DynTaxErrorKind {
    /// A required log marker is missing or a table row count disagrees.
    MalformedLog,
    /// No step index could be derived from a log identifier.
    UnrecognizedIdentifier,
    /// A timestep was requested from fewer than two records.
    DegenerateSeries,
    /// A record or configuration value violates its invariants.
    InvalidInput,
    InvalidConfiguration,
    Persistence,
    Io,
    Script,
}

impl DynTaxErrorKind {
    pub const fn category(self) -> DynTaxErrorCategory {
        match self {
            Self::MalformedLog
            | Self::UnrecognizedIdentifier
            | Self::InvalidInput
            | Self::InvalidConfiguration
            | Self::Persistence
            | Self::Script => DynTaxErrorCategory::InputValidationError,
            Self::Io => DynTaxErrorCategory::IoSystemError,
            Self::DegenerateSeries => DynTaxErrorCategory::ComputationError,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynTaxError {
    kind: DynTaxErrorKind,
    placeholder: &'static str,
    message: String,
}

impl DynTaxError {
    pub fn new(
        kind: DynTaxErrorKind,
        placeholder: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            placeholder,
            message: message.into(),
        }
    }

    pub fn malformed_log(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(DynTaxErrorKind::MalformedLog, placeholder, message)
    }

    pub fn unrecognized_identifier(message: impl Into<String>) -> Self {
        Self::new(
            DynTaxErrorKind::UnrecognizedIdentifier,
            "INPUT.LOG_IDENTIFIER",
            message,
        )
    }

    pub fn degenerate_series(message: impl Into<String>) -> Self {
        Self::new(
            DynTaxErrorKind::DegenerateSeries,
            "RUN.DEGENERATE_SERIES",
            message,
        )
    }

    pub fn invalid_input(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(DynTaxErrorKind::InvalidInput, placeholder, message)
    }

    pub fn invalid_configuration(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(DynTaxErrorKind::InvalidConfiguration, placeholder, message)
    }

    pub fn persistence(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(DynTaxErrorKind::Persistence, placeholder, message)
    }

    pub fn io_system(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(DynTaxErrorKind::Io, placeholder, message)
    }

    pub fn script(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(DynTaxErrorKind::Script, placeholder, message)
    }

    pub const fn kind(&self) -> DynTaxErrorKind {
        self.kind
    }

    pub const fn category(&self) -> DynTaxErrorCategory {
        self.kind.category()
    }

    pub const fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category().exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        let severity = if self.category().is_fatal() {
            "ERROR"
        } else {
            "INFO"
        };
        format!("{}: [{}] {}", severity, self.placeholder, self.message)
    }

    pub fn fatal_exit_line(&self) -> Option<String> {
        self.category()
            .is_fatal()
            .then(|| format!("FATAL EXIT CODE: {}", self.exit_code()))
    }
}

impl Display for DynTaxError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category().as_str(),
            self.placeholder,
            self.message
        )
    }
}

impl Error for DynTaxError {}
