use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::editor::EditorId;
use super::role::Role;

/// Conference abstracts go through two editor stages before the admin
/// decides. Rejected is reachable from every non-terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbstractStatus {
    Submitted,
    #[serde(rename = "Assigned to Editor")]
    AssignedToEditor,
    #[serde(rename = "Reviewed by Editor")]
    ReviewedByEditor,
    #[serde(rename = "Assigned to Conference Editor")]
    AssignedToConferenceEditor,
    #[serde(rename = "Reviewed by Conference Editor")]
    ReviewedByConferenceEditor,
    Accepted,
    Rejected,
}

impl AbstractStatus {
    /// Accepted still admits full paper uploads, but no status change.
    pub fn is_terminal(self) -> bool {
        matches!(self, AbstractStatus::Accepted | AbstractStatus::Rejected)
    }
}

impl fmt::Display for AbstractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AbstractStatus::Submitted => "Submitted",
            AbstractStatus::AssignedToEditor => "Assigned to Editor",
            AbstractStatus::ReviewedByEditor => "Reviewed by Editor",
            AbstractStatus::AssignedToConferenceEditor => "Assigned to Conference Editor",
            AbstractStatus::ReviewedByConferenceEditor => "Reviewed by Conference Editor",
            AbstractStatus::Accepted => "Accepted",
            AbstractStatus::Rejected => "Rejected",
        };
        write!(f, "{label}")
    }
}

/// A full paper uploaded against an accepted abstract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullPaperFile {
    pub id: String,
    pub file_name: String,
    #[serde(default)]
    pub url: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConferenceAbstract {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub conference: Option<String>,
    #[serde(default)]
    pub author_id: Option<u64>,
    pub status: AbstractStatus,
    #[serde(default)]
    pub assigned_editor: Option<EditorId>,
    #[serde(default)]
    pub assigned_conference_editor: Option<EditorId>,
    #[serde(default)]
    pub editor_comment: Option<String>,
    #[serde(default)]
    pub conference_editor_comment: Option<String>,
    #[serde(default)]
    pub admin_final_comment: Option<String>,
    /// Which role sent the abstract to `Rejected`.
    #[serde(default)]
    pub rejected_by: Option<Role>,
    #[serde(default)]
    pub full_paper_files: Vec<FullPaperFile>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub assigned_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub editor_reviewed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub conference_assigned_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub conference_editor_reviewed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub admin_decided_at: Option<DateTime<Utc>>,
}

impl ConferenceAbstract {
    pub fn new(id: u64, title: impl Into<String>, submitted_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.into(),
            conference: None,
            author_id: None,
            status: AbstractStatus::Submitted,
            assigned_editor: None,
            assigned_conference_editor: None,
            editor_comment: None,
            conference_editor_comment: None,
            admin_final_comment: None,
            rejected_by: None,
            full_paper_files: Vec::new(),
            created_at: submitted_at,
            updated_at: submitted_at,
            assigned_at: None,
            editor_reviewed_at: None,
            conference_assigned_at: None,
            conference_editor_reviewed_at: None,
            admin_decided_at: None,
        }
    }

    pub fn with_author(mut self, author_id: u64) -> Self {
        self.author_id = Some(author_id);
        self
    }

    pub fn with_conference(mut self, conference: impl Into<String>) -> Self {
        self.conference = Some(conference.into());
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Editors who currently hold or held a stage of this abstract.
    pub fn involves_editor(&self, editor_id: EditorId) -> bool {
        self.assigned_editor == Some(editor_id)
            || self.assigned_conference_editor == Some(editor_id)
    }
}
