use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExError>;

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers can match on without
/// parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Validation
    InvalidInput,
    InvalidCast,

    // Integration/IO
    Io,
    Serialization,
    Persistence,
    Configuration,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Stable `ERR_*` code, safe to match on
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidCast => "ERR_INVALID_CAST",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Configuration => "ERR_CONFIGURATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a kind for programmatic handling plus optional context about the
/// operation, preference name and owner that were involved.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    preference: Option<String>,
    owner: Option<String>,
    message: String,
}

impl ExError {
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            preference: None,
            owner: None,
            message: String::new(),
        }
    }

    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    pub fn with_preference(mut self, name: impl Into<String>) -> Self {
        self.preference = Some(name.into());
        self
    }

    /// Add owning record context (rendered as `type#id`)
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Operation that failed, e.g. `set_preference`
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn preference(&self) -> Option<&str> {
        self.preference.as_deref()
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(preference) = &self.preference {
            write!(f, " (preference: {})", preference)?;
        }
        if let Some(owner) = &self.owner {
            write!(f, " (owner: {})", owner)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

/// Domain failures raised while casting or validating preference data
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PreferenceError {
    /// A value tagged as structured data is not valid JSON
    #[error("Value is not valid JSON: {reason}")]
    InvalidJson { reason: String },

    /// A value tagged as a date could not be parsed
    #[error("Value is not a recognised date: {value}")]
    InvalidDate { value: String },

    /// A value tagged as a decimal could not be represented exactly
    #[error("Value is not a representable decimal: {value}")]
    InvalidDecimal { value: String },

    /// Preferences table name is not a plain SQL identifier
    #[error("Invalid preferences table name: {name:?}")]
    InvalidTableName { name: String },
}

impl From<PreferenceError> for ExError {
    fn from(err: PreferenceError) -> Self {
        let message = err.to_string();
        match err {
            PreferenceError::InvalidJson { .. } => ExError::new(ExErrorKind::Serialization)
                .with_op("cast_json")
                .with_message(message),
            PreferenceError::InvalidDate { .. } => ExError::new(ExErrorKind::InvalidCast)
                .with_op("cast_date")
                .with_message(message),
            PreferenceError::InvalidDecimal { .. } => ExError::new(ExErrorKind::InvalidCast)
                .with_op("cast_decimal")
                .with_message(message),
            PreferenceError::InvalidTableName { .. } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_op("resolve_table")
                    .with_message(message)
            }
        }
    }
}

impl From<serde_json::Error> for PreferenceError {
    fn from(err: serde_json::Error) -> Self {
        PreferenceError::InvalidJson {
            reason: err.to_string(),
        }
    }
}
