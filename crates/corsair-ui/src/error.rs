//! Error types for the GUI runtime.

use std::fmt;

use crate::widget::PropKey;

/// Errors that can occur during tree mutation, dispatch, or scheduling.
///
/// Every fallible operation leaves prior state untouched when it reports
/// one of these; retry policy belongs entirely to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiError {
    /// A widget handle whose slot has been freed or reused.
    DeadWidget,

    /// Attempt to attach a child that already has a parent.
    AlreadyParented,

    /// Attempt to attach a widget as a child of its own descendant.
    CycleRejected,

    /// A property key the widget does not support.
    UnknownProperty {
        /// The offending key.
        key: PropKey,
    },

    /// `set_focus` requested a widget that is not in the ring.
    NotACandidate,

    /// A transition was requested with a zero tick count.
    InvalidDuration,

    /// A behavior callback re-entered its own widget mid-dispatch.
    ReentrantDispatch {
        /// Behavior type name.
        name: &'static str,
    },

    /// A widget behavior callback failed.
    Behavior {
        /// Behavior type name.
        name: &'static str,
        /// Description of the failure.
        message: String,
    },
}

impl fmt::Display for UiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UiError::DeadWidget => {
                write!(f, "Widget handle is no longer alive")
            }
            UiError::AlreadyParented => {
                write!(f, "Child already has a parent")
            }
            UiError::CycleRejected => {
                write!(f, "Insertion would create an ownership cycle")
            }
            UiError::UnknownProperty { key } => {
                write!(f, "Unsupported property key: {:?}", key)
            }
            UiError::NotACandidate => {
                write!(f, "Widget is not a focus candidate")
            }
            UiError::InvalidDuration => {
                write!(f, "Transition duration must be at least one tick")
            }
            UiError::ReentrantDispatch { name } => {
                write!(f, "Reentrant dispatch into '{}' behavior", name)
            }
            UiError::Behavior { name, message } => {
                write!(f, "'{}' behavior failed: {}", name, message)
            }
        }
    }
}

impl std::error::Error for UiError {}

/// Result type alias for runtime operations.
pub type UiResult<T> = Result<T, UiError>;
