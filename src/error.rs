use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::workflow::{EditorId, EntityKind, Role};

/// Top-level error for everything the crate does outside the pure guard.
#[derive(Debug, Error)]
pub enum EditorialError {
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl EditorialError {
    /// The `{ "message": ... }` body handed back to the acting user.
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            message: self.to_string(),
        }
    }

    /// Returns the workflow rejection, if that is what this error is.
    pub fn as_workflow(&self) -> Option<&WorkflowError> {
        match self {
            EditorialError::Workflow(e) => Some(e),
            _ => None,
        }
    }
}

/// Reasons the transition guard refuses a request. All of them are
/// recoverable by the user and none of them leave a partial write behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("{kind} {id} not found")]
    EntityNotFound { kind: EntityKind, id: u64 },

    #[error("cannot {action} while status is {from}")]
    InvalidTransition { from: String, action: &'static str },

    #[error("{0} is required")]
    MissingRequiredField(RequiredField),

    #[error("editor {editor_id} does not exist")]
    UnknownReference { editor_id: EditorId },

    #[error("{role} is not allowed to {action}")]
    ActorNotAuthorized { role: Role, action: &'static str },
}

/// Inputs the guard can demand at a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    Comment,
    Decision,
    EditorSelection,
    FullPaperFile,
    CopyrightForm,
}

impl std::fmt::Display for RequiredField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequiredField::Comment => write!(f, "Comment"),
            RequiredField::Decision => write!(f, "Decision"),
            RequiredField::EditorSelection => write!(f, "Editor selection"),
            RequiredField::FullPaperFile => write!(f, "Full paper file"),
            RequiredField::CopyrightForm => write!(f, "Copyright form"),
        }
    }
}

/// Errors talking to the remote workflow API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Any non-success HTTP status other than 404 on a lookup.
    #[error("status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Structured error payload, both what we surface and what the server sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}
