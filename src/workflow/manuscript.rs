use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::editor::EditorId;
use super::role::Role;

/// Where a manuscript sits in the review pipeline.
///
/// Pending → Assigned to Editor → Accepted by Editor → Accepted → Awaiting
/// Copyright → Copyright Received, with Rejected reachable from the editor
/// and admin decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ManuscriptStatus {
    Pending,
    #[serde(rename = "Assigned to Editor")]
    AssignedToEditor,
    #[serde(rename = "Accepted by Editor")]
    AcceptedByEditor,
    #[serde(rename = "Rejected by Editor")]
    RejectedByEditor,
    #[serde(rename = "Awaiting Copyright")]
    AwaitingCopyright,
    #[serde(rename = "Copyright Received")]
    CopyrightReceived,
    Accepted,
    Rejected,
}

impl ManuscriptStatus {
    /// No transition of any kind leaves a terminal status.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ManuscriptStatus::Rejected
                | ManuscriptStatus::RejectedByEditor
                | ManuscriptStatus::CopyrightReceived
        )
    }
}

impl fmt::Display for ManuscriptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ManuscriptStatus::Pending => "Pending",
            ManuscriptStatus::AssignedToEditor => "Assigned to Editor",
            ManuscriptStatus::AcceptedByEditor => "Accepted by Editor",
            ManuscriptStatus::RejectedByEditor => "Rejected by Editor",
            ManuscriptStatus::AwaitingCopyright => "Awaiting Copyright",
            ManuscriptStatus::CopyrightReceived => "Copyright Received",
            ManuscriptStatus::Accepted => "Accepted",
            ManuscriptStatus::Rejected => "Rejected",
        };
        write!(f, "{label}")
    }
}

/// The editor's advisory verdict, tracked apart from `status` until the
/// admin ratifies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EditorStatus {
    #[default]
    #[serde(rename = "Pending Review")]
    PendingReview,
    #[serde(rename = "Accepted by Editor")]
    AcceptedByEditor,
    #[serde(rename = "Rejected by Editor")]
    RejectedByEditor,
}

impl fmt::Display for EditorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditorStatus::PendingReview => write!(f, "Pending Review"),
            EditorStatus::AcceptedByEditor => write!(f, "Accepted by Editor"),
            EditorStatus::RejectedByEditor => write!(f, "Rejected by Editor"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinalDecision {
    Accepted,
    Rejected,
}

impl fmt::Display for FinalDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinalDecision::Accepted => write!(f, "Accepted"),
            FinalDecision::Rejected => write!(f, "Rejected"),
        }
    }
}

/// One submitted paper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manuscript {
    pub id: u64,
    pub manuscript_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author_id: Option<u64>,
    pub status: ManuscriptStatus,
    /// `null` on the wire means "Pending Review".
    #[serde(default)]
    pub editor_status: Option<EditorStatus>,
    #[serde(default, alias = "assignedEditor")]
    pub assigned_editor_id: Option<EditorId>,
    #[serde(default)]
    pub admin_final_decision: Option<FinalDecision>,
    /// Note left by the author at submission.
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub editor_comment: Option<String>,
    #[serde(default)]
    pub admin_final_comment: Option<String>,
    #[serde(default)]
    pub copyright_file: Option<String>,
    /// Who recorded the copyright form: the author or an admin on their behalf.
    #[serde(default)]
    pub copyright_received_by: Option<Role>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub assigned_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub editor_reviewed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub admin_decided_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub copyright_requested_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub copyright_received_at: Option<DateTime<Utc>>,
}

impl Manuscript {
    /// A freshly submitted manuscript in `Pending`.
    pub fn new(
        id: u64,
        manuscript_id: impl Into<String>,
        title: impl Into<String>,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            manuscript_id: manuscript_id.into(),
            title: title.into(),
            author_id: None,
            status: ManuscriptStatus::Pending,
            editor_status: None,
            assigned_editor_id: None,
            admin_final_decision: None,
            comment: None,
            editor_comment: None,
            admin_final_comment: None,
            copyright_file: None,
            copyright_received_by: None,
            created_at: submitted_at,
            updated_at: submitted_at,
            assigned_at: None,
            editor_reviewed_at: None,
            admin_decided_at: None,
            copyright_requested_at: None,
            copyright_received_at: None,
        }
    }

    pub fn with_author(mut self, author_id: u64) -> Self {
        self.author_id = Some(author_id);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn editor_status(&self) -> EditorStatus {
        self.editor_status.unwrap_or_default()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submitted() -> DateTime<Utc> {
        "2024-03-01T09:00:00Z".parse().unwrap()
    }

    #[test]
    fn new_manuscript_is_pending() {
        let m = Manuscript::new(1, "MS-2024-001", "Soil carbon", submitted());
        assert_eq!(m.status, ManuscriptStatus::Pending);
        assert_eq!(m.editor_status(), EditorStatus::PendingReview);
        assert!(m.assigned_editor_id.is_none());
        assert_eq!(m.created_at, m.updated_at);
    }

    #[test]
    fn status_uses_display_strings_on_the_wire() {
        let json = serde_json::to_string(&ManuscriptStatus::AssignedToEditor).unwrap();
        assert_eq!(json, r#""Assigned to Editor""#);
        assert_eq!(
            ManuscriptStatus::AwaitingCopyright.to_string(),
            "Awaiting Copyright"
        );
    }

    #[test]
    fn deserializes_api_shape() {
        let json = r#"{
            "id": 12,
            "manuscript_id": "MS-2024-012",
            "status": "Assigned to Editor",
            "editor_status": null,
            "assignedEditor": 7,
            "createdAt": "2024-03-01T09:00:00Z",
            "updatedAt": "2024-03-02T09:00:00Z"
        }"#;
        let m: Manuscript = serde_json::from_str(json).unwrap();
        assert_eq!(m.assigned_editor_id, Some(7));
        assert_eq!(m.editor_status(), EditorStatus::PendingReview);
        assert!(m.assigned_at.is_none());
        assert!(m.title.is_empty());
    }

    #[test]
    fn terminal_statuses() {
        assert!(ManuscriptStatus::Rejected.is_terminal());
        assert!(ManuscriptStatus::RejectedByEditor.is_terminal());
        assert!(ManuscriptStatus::CopyrightReceived.is_terminal());
        assert!(!ManuscriptStatus::Accepted.is_terminal());
        assert!(!ManuscriptStatus::Pending.is_terminal());
    }
}
