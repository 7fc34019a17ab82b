use thiserror::Error;

/// Result type alias using HbnbError
pub type Result<T> = std::result::Result<T, HbnbError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code used for logging, programmatic
/// handling and tests. Console messages are carried by [`HbnbError`]; the
/// kind is what structured logs and the storage layer report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Command validation
    MissingArgument,
    UnknownClass,
    NotFound,
    InvalidInput,
    MalformedLiteral,

    // Storage
    Io,
    Serialization,
    Persistence,
    ConstraintViolation,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::MissingArgument => "ERR_MISSING_ARGUMENT",
            ExErrorKind::UnknownClass => "ERR_UNKNOWN_CLASS",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::MalformedLiteral => "ERR_MALFORMED_LITERAL",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Storage backends return this type; it carries a stable kind plus the
/// operation and entity the failure relates to.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context (usually a composite key)
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add custom message
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

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
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
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity: {})", entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Domain error taxonomy for the console and the entity model
///
/// The first six variants display as the fixed messages the console prints.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HbnbError {
    #[error("** class name missing **")]
    ClassNameMissing,

    #[error("** class doesn't exist **")]
    UnknownClass { class_name: String },

    #[error("** instance id missing **")]
    InstanceIdMissing,

    #[error("** no instance found **")]
    InstanceNotFound { key: String },

    #[error("** attribute name missing **")]
    AttributeNameMissing,

    #[error("** value missing **")]
    ValueMissing,

    /// A `{...}` payload did not follow the dictionary literal grammar
    #[error("Malformed dictionary literal at offset {offset}: {reason}")]
    MalformedLiteral { offset: usize, reason: String },

    /// A persisted timestamp could not be parsed
    #[error("Invalid timestamp for {field}: {value}")]
    InvalidTimestamp { field: String, value: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<HbnbError> for ExError {
    fn from(err: HbnbError) -> Self {
        match err {
            HbnbError::ClassNameMissing => ExError::new(ExErrorKind::MissingArgument)
                .with_message("class name missing"),

            HbnbError::UnknownClass { class_name } => ExError::new(ExErrorKind::UnknownClass)
                .with_message(format!("Unknown class: {}", class_name)),

            HbnbError::InstanceIdMissing => ExError::new(ExErrorKind::MissingArgument)
                .with_message("instance id missing"),

            HbnbError::InstanceNotFound { key } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(key)
                .with_message("no instance found"),

            HbnbError::AttributeNameMissing => ExError::new(ExErrorKind::MissingArgument)
                .with_message("attribute name missing"),

            HbnbError::ValueMissing => {
                ExError::new(ExErrorKind::MissingArgument).with_message("value missing")
            }

            HbnbError::MalformedLiteral { offset, reason } => {
                ExError::new(ExErrorKind::MalformedLiteral)
                    .with_message(format!("offset {}: {}", offset, reason))
            }

            HbnbError::InvalidTimestamp { field, value } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_message(format!("Invalid timestamp for {}: {}", field, value))
            }

            HbnbError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            HbnbError::Internal { message } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}

impl From<serde_json::Error> for HbnbError {
    fn from(err: serde_json::Error) -> Self {
        HbnbError::Serialization {
            message: err.to_string(),
        }
    }
}
