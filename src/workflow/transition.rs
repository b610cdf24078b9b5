use std::fmt;

use serde::{Deserialize, Serialize};

use super::editor::EditorId;

/// Accept or reject, as chosen by the reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Accept,
    Reject,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Accept => write!(f, "accept"),
            Decision::Reject => write!(f, "reject"),
        }
    }
}

/// A file the author is handing over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUpload {
    pub file_name: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl FileUpload {
    pub fn named(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            url: None,
        }
    }
}

/// A requested manuscript state change together with its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum ManuscriptTransition {
    AssignEditor { editor_id: EditorId },
    EditorReview { decision: Decision, comment: String },
    FinalDecision { decision: Decision, comment: String },
    RequestCopyright,
    ReceiveCopyright { file_name: String },
}

/// Payload-free manuscript actions, used to ask what an actor may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManuscriptAction {
    AssignEditor,
    EditorReview,
    FinalDecision,
    RequestCopyright,
    ReceiveCopyright,
}

impl ManuscriptAction {
    pub const ALL: [ManuscriptAction; 5] = [
        ManuscriptAction::AssignEditor,
        ManuscriptAction::EditorReview,
        ManuscriptAction::FinalDecision,
        ManuscriptAction::RequestCopyright,
        ManuscriptAction::ReceiveCopyright,
    ];

    /// Phrase used in error messages ("cannot <describe> while ...").
    pub fn describe(self) -> &'static str {
        match self {
            ManuscriptAction::AssignEditor => "assign an editor",
            ManuscriptAction::EditorReview => "review the manuscript",
            ManuscriptAction::FinalDecision => "record the final decision",
            ManuscriptAction::RequestCopyright => "request the copyright form",
            ManuscriptAction::ReceiveCopyright => "record the copyright form",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ManuscriptAction::AssignEditor => "assign_editor",
            ManuscriptAction::EditorReview => "editor_review",
            ManuscriptAction::FinalDecision => "final_decision",
            ManuscriptAction::RequestCopyright => "request_copyright",
            ManuscriptAction::ReceiveCopyright => "receive_copyright",
        }
    }
}

impl ManuscriptTransition {
    pub fn action(&self) -> ManuscriptAction {
        match self {
            ManuscriptTransition::AssignEditor { .. } => ManuscriptAction::AssignEditor,
            ManuscriptTransition::EditorReview { .. } => ManuscriptAction::EditorReview,
            ManuscriptTransition::FinalDecision { .. } => ManuscriptAction::FinalDecision,
            ManuscriptTransition::RequestCopyright => ManuscriptAction::RequestCopyright,
            ManuscriptTransition::ReceiveCopyright { .. } => ManuscriptAction::ReceiveCopyright,
        }
    }
}

/// A requested conference-abstract state change together with its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum AbstractTransition {
    AssignEditor { editor_id: EditorId },
    EditorReview { comment: String },
    Reject { comment: String },
    AssignConferenceEditor { editor_id: EditorId },
    ConferenceEditorReview { comment: String },
    FinalDecision { decision: Decision, comment: String },
    SubmitFullPaper { files: Vec<FileUpload> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbstractAction {
    AssignEditor,
    EditorReview,
    Reject,
    AssignConferenceEditor,
    ConferenceEditorReview,
    FinalDecision,
    SubmitFullPaper,
}

impl AbstractAction {
    pub const ALL: [AbstractAction; 7] = [
        AbstractAction::AssignEditor,
        AbstractAction::EditorReview,
        AbstractAction::Reject,
        AbstractAction::AssignConferenceEditor,
        AbstractAction::ConferenceEditorReview,
        AbstractAction::FinalDecision,
        AbstractAction::SubmitFullPaper,
    ];

    pub fn describe(self) -> &'static str {
        match self {
            AbstractAction::AssignEditor => "assign an editor",
            AbstractAction::EditorReview => "review the abstract",
            AbstractAction::Reject => "reject the abstract",
            AbstractAction::AssignConferenceEditor => "assign a conference editor",
            AbstractAction::ConferenceEditorReview => "review as conference editor",
            AbstractAction::FinalDecision => "record the final decision",
            AbstractAction::SubmitFullPaper => "submit a full paper",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AbstractAction::AssignEditor => "assign_editor",
            AbstractAction::EditorReview => "editor_review",
            AbstractAction::Reject => "reject",
            AbstractAction::AssignConferenceEditor => "assign_conference_editor",
            AbstractAction::ConferenceEditorReview => "conference_editor_review",
            AbstractAction::FinalDecision => "final_decision",
            AbstractAction::SubmitFullPaper => "submit_full_paper",
        }
    }
}

impl AbstractTransition {
    pub fn action(&self) -> AbstractAction {
        match self {
            AbstractTransition::AssignEditor { .. } => AbstractAction::AssignEditor,
            AbstractTransition::EditorReview { .. } => AbstractAction::EditorReview,
            AbstractTransition::Reject { .. } => AbstractAction::Reject,
            AbstractTransition::AssignConferenceEditor { .. } => {
                AbstractAction::AssignConferenceEditor
            }
            AbstractTransition::ConferenceEditorReview { .. } => {
                AbstractAction::ConferenceEditorReview
            }
            AbstractTransition::FinalDecision { .. } => AbstractAction::FinalDecision,
            AbstractTransition::SubmitFullPaper { .. } => AbstractAction::SubmitFullPaper,
        }
    }
}
