use pvsnap_core_types::EntryId;
use thiserror::Error;

/// Result type alias using SnapError
pub type Result<T> = std::result::Result<T, SnapError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers can match on, log, or
/// surface to a UI without depending on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Structural/Validation
    InvalidInput,
    NotFound,
    TypeMismatch,
    MissingField,

    // Live values
    UnreadableValue,
    WriteFailure,

    // Integration/IO
    Io,
    Serialization,
    Config,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::TypeMismatch => "ERR_TYPE_MISMATCH",
            ExErrorKind::MissingField => "ERR_MISSING_FIELD",
            ExErrorKind::UnreadableValue => "ERR_UNREADABLE_VALUE",
            ExErrorKind::WriteFailure => "ERR_WRITE_FAILURE",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification plus optional context (operation, entry, PV) for
/// programmatic handling and log correlation.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    pv_name: Option<String>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            pv_name: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add PV name context
    pub fn with_pv_name(mut self, pv_name: impl Into<String>) -> Self {
        self.pv_name = Some(pv_name.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the entity ID context, if any
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Get the PV name context, if any
    pub fn pv_name(&self) -> Option<&str> {
        self.pv_name.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
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
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(pv_name) = &self.pv_name {
            write!(f, " (pv_name: {})", pv_name)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Error taxonomy for pvsnap operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SnapError {
    /// Identifier absent from the entry store
    #[error("Entry not found: {entry_id}")]
    EntryNotFound { entry_id: EntryId },

    /// Operation invoked on an entry of the wrong type
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// Caller supplied input the operation cannot act on
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// A PV could not be read
    #[error("Could not read {pv_name}: {reason}")]
    UnreadableValue { pv_name: String, reason: String },

    /// A PV could not be written
    #[error("Could not write {value} to {pv_name}: {reason}")]
    WriteFailure {
        pv_name: String,
        value: String,
        reason: String,
    },

    /// Snapshot does not record the collection it was taken from
    #[error("Snapshot {entry_id} does not have an origin collection")]
    NoOriginCollection { entry_id: EntryId },

    /// Configuration could not be located or parsed
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Filesystem error
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization error (JSON/TOML encoding or decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<std::io::Error> for SnapError {
    fn from(err: std::io::Error) -> Self {
        SnapError::Io {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for SnapError {
    fn from(err: serde_json::Error) -> Self {
        SnapError::Serialization {
            message: err.to_string(),
        }
    }
}

/// Conversion from SnapError to ExError
impl From<SnapError> for ExError {
    fn from(err: SnapError) -> Self {
        match err {
            SnapError::EntryNotFound { entry_id } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(entry_id.to_string())
                .with_message("Entry not found"),
            SnapError::TypeMismatch { expected, found } => {
                ExError::new(ExErrorKind::TypeMismatch)
                    .with_message(format!("expected {}, found {}", expected, found))
            }
            SnapError::InvalidInput { reason } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(reason)
            }
            SnapError::UnreadableValue { pv_name, reason } => {
                ExError::new(ExErrorKind::UnreadableValue)
                    .with_pv_name(pv_name)
                    .with_message(reason)
            }
            SnapError::WriteFailure {
                pv_name,
                value,
                reason,
            } => ExError::new(ExErrorKind::WriteFailure)
                .with_pv_name(pv_name)
                .with_message(format!("value {}: {}", value, reason)),
            SnapError::NoOriginCollection { entry_id } => {
                ExError::new(ExErrorKind::MissingField)
                    .with_entity_id(entry_id.to_string())
                    .with_message("Snapshot does not have an origin collection")
            }
            SnapError::Config { message } => {
                ExError::new(ExErrorKind::Config).with_message(message)
            }
            SnapError::Io { message } => ExError::new(ExErrorKind::Io).with_message(message),
            SnapError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
            SnapError::Internal { message } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}

impl SnapError {
    /// Classify this error without building the full structured form
    pub fn kind(&self) -> ExErrorKind {
        match self {
            SnapError::EntryNotFound { .. } => ExErrorKind::NotFound,
            SnapError::TypeMismatch { .. } => ExErrorKind::TypeMismatch,
            SnapError::InvalidInput { .. } => ExErrorKind::InvalidInput,
            SnapError::UnreadableValue { .. } => ExErrorKind::UnreadableValue,
            SnapError::WriteFailure { .. } => ExErrorKind::WriteFailure,
            SnapError::NoOriginCollection { .. } => ExErrorKind::MissingField,
            SnapError::Config { .. } => ExErrorKind::Config,
            SnapError::Io { .. } => ExErrorKind::Io,
            SnapError::Serialization { .. } => ExErrorKind::Serialization,
            SnapError::Internal { .. } => ExErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_not_found_kind() {
        let id = EntryId::new();
        let ex: ExError = SnapError::EntryNotFound { entry_id: id }.into();
        assert_eq!(ex.kind(), ExErrorKind::NotFound);
        assert_eq!(ex.code(), "ERR_NOT_FOUND");
        assert_eq!(ex.entity_id(), Some(id.to_string().as_str()));
    }

    #[test]
    fn test_write_failure_keeps_pv_context() {
        let err = SnapError::WriteFailure {
            pv_name: "MTR:01:VAL".to_string(),
            value: "3.5".to_string(),
            reason: "access denied".to_string(),
        };
        assert_eq!(err.kind(), ExErrorKind::WriteFailure);

        let ex: ExError = err.into();
        assert_eq!(ex.pv_name(), Some("MTR:01:VAL"));
        assert!(ex.to_string().contains("ERR_WRITE_FAILURE"));
        assert!(ex.to_string().contains("MTR:01:VAL"));
    }

    #[test]
    fn test_ex_error_display_includes_op() {
        let ex = ExError::new(ExErrorKind::InvalidInput)
            .with_op("apply")
            .with_message("Collections cannot be applied");
        assert_eq!(
            ex.to_string(),
            "[ERR_INVALID_INPUT] in operation 'apply': Collections cannot be applied"
        );
    }

    #[test]
    fn test_ex_error_source_chain() {
        use std::error::Error as _;

        let inner = ExError::new(ExErrorKind::Io).with_message("disk gone");
        let outer = ExError::new(ExErrorKind::Config).with_source(inner);
        assert_eq!(outer.source_error().map(|e| e.kind()), Some(ExErrorKind::Io));
        assert!(outer.source().is_some());
    }
}
