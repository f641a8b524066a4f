//! Error types for flow parsing.
//!
//! Every parser, tokenizer and template failure is reported as a
//! [`FlowError`]. The offending input is always carried in the error so
//! callers can print it without keeping their own copy.

use std::fmt;
use thiserror::Error;

/// Result type alias for flow operations.
pub type FlowResult<T> = Result<T, FlowError>;

/// Coarse classification of flow and switch errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed text: bad numbers, empty values, unbalanced groups.
    Structural,
    /// A field (or missing field) the command does not allow.
    CommandValidity,
    /// A field-implication rule was violated.
    SemanticValidity,
    /// The bridge or port does not exist.
    ResourceAbsence,
    /// An OpenFlow port number could not be assigned.
    Allocation,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structural => write!(f, "structural"),
            Self::CommandValidity => write!(f, "command-validity"),
            Self::SemanticValidity => write!(f, "semantic-validity"),
            Self::ResourceAbsence => write!(f, "resource-absence"),
            Self::Allocation => write!(f, "allocation"),
        }
    }
}

/// Errors produced while rendering, tokenizing or parsing a flow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    /// The flow text is malformed.
    #[error("bad flow definition {input:?} ({reason})")]
    Parse {
        /// The flow text being parsed.
        input: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The template could not be expanded with the given arguments.
    #[error("bad flow template {template:?} ({reason})")]
    Template {
        /// The template text.
        template: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The actions string could not be tokenized.
    #[error("bad actions {actions:?} ({reason})")]
    Action {
        /// The actions text after `actions=`.
        actions: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A field is not valid for the command.
    #[error("bad flow {input:?} (field {field:?} not allowed in {command})")]
    NotAllowed {
        /// The flow text.
        input: String,
        /// The rejected field.
        field: String,
        /// The command name, e.g. `del-flows`.
        command: String,
    },

    /// An add-flow without any action.
    #[error("bad flow {input:?} (empty actions)")]
    MissingActions {
        /// The flow text.
        input: String,
    },

    /// A field the simulated switch does not implement.
    #[error("field {field:?} is not implemented by the simulated switch")]
    NotImplemented {
        /// The field name.
        field: String,
    },

    /// A field-implication rule was violated.
    #[error("bad flow {input:?} ({reason})")]
    BadFlow {
        /// The flow text.
        input: String,
        /// The violated combination.
        reason: String,
    },
}

impl FlowError {
    /// Creates a structural parse error.
    pub fn parse(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Creates a template expansion error.
    pub fn template(template: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Template {
            template: template.into(),
            reason: reason.into(),
        }
    }

    /// Creates an action tokenizer error.
    pub fn action(actions: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Action {
            actions: actions.into(),
            reason: reason.into(),
        }
    }

    /// Creates a semantic validity error.
    pub fn bad_flow(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::BadFlow {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Returns the error classification.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse { .. } | Self::Template { .. } | Self::Action { .. } => {
                ErrorKind::Structural
            }
            Self::NotAllowed { .. } | Self::MissingActions { .. } | Self::NotImplemented { .. } => {
                ErrorKind::CommandValidity
            }
            Self::BadFlow { .. } => ErrorKind::SemanticValidity,
        }
    }
}
