//! Common error infrastructure for action-core.
//!
//! Domain-specific errors (`ActionError`, `PlayError`) live next to the code
//! that raises them; this module holds what they share.
//!
//! # Design Principles
//!
//! - **Contained**: no error escapes a single instance or a single `play` call
//! - **Stable Codes**: every variant has an `error_code` for log correlation
//! - **Severity Classification**: content faults are told apart from expected misses

/// Severity level of an error, used for categorization and logging priority.
///
/// - **Recoverable**: expected world churn (target vanished, slot busy)
/// - **Validation**: the request itself is unusable as sent
/// - **Internal**: the content/configuration is inconsistent
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - a later request may succeed unchanged.
    ///
    /// Examples: target despawned, blocking slot occupied
    Recoverable,

    /// Validation error - invalid input, should not retry without changes.
    ///
    /// Examples: missing target, unknown action id
    Validation,

    /// Internal error - content or configuration fault.
    ///
    /// Examples: projectile action without a usable projectile entry
    Internal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates broken content or a bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Common trait for all action-core errors.
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Default implementation uses the error type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
