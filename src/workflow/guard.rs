use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{RequiredField, WorkflowError};

use super::conference_abstract::{AbstractStatus, ConferenceAbstract, FullPaperFile};
use super::editor::{EditorDirectory, EditorId};
use super::manuscript::{EditorStatus, FinalDecision, Manuscript, ManuscriptStatus};
use super::role::{Actor, Role};
use super::transition::{
    AbstractAction, AbstractTransition, Decision, ManuscriptAction, ManuscriptTransition,
};

/// Decides whether a requested transition may happen and, if so, produces
/// the updated entity.
///
/// The guard never mutates its input: it works on a clone and hands the
/// clone back only when every check has passed, so a rejected request
/// leaves nothing half-written. Checks run in a fixed order: current state,
/// then actor, then payload.
pub struct TransitionGuard;

impl TransitionGuard {
    /// Apply `transition` to `manuscript` on behalf of `actor`.
    pub fn apply_manuscript<D: EditorDirectory + ?Sized>(
        manuscript: &Manuscript,
        transition: &ManuscriptTransition,
        actor: &Actor,
        editors: &D,
        now: DateTime<Utc>,
    ) -> Result<Manuscript, WorkflowError> {
        Self::authorize_manuscript(manuscript, transition.action(), actor)?;

        let mut next = manuscript.clone();
        match transition {
            ManuscriptTransition::AssignEditor { editor_id } => {
                resolve_editor(editors, *editor_id)?;
                next.status = ManuscriptStatus::AssignedToEditor;
                next.editor_status = Some(EditorStatus::PendingReview);
                next.assigned_editor_id = Some(*editor_id);
                next.assigned_at = Some(now);
            }
            ManuscriptTransition::EditorReview { decision, comment } => {
                let comment = require_comment(comment)?;
                let (status, editor_status) = match decision {
                    Decision::Accept => (
                        ManuscriptStatus::AcceptedByEditor,
                        EditorStatus::AcceptedByEditor,
                    ),
                    Decision::Reject => (ManuscriptStatus::Rejected, EditorStatus::RejectedByEditor),
                };
                next.status = status;
                next.editor_status = Some(editor_status);
                next.editor_comment = Some(comment);
                next.editor_reviewed_at = Some(now);
            }
            ManuscriptTransition::FinalDecision { decision, comment } => {
                let comment = require_comment(comment)?;
                let (status, final_decision) = match decision {
                    Decision::Accept => (ManuscriptStatus::Accepted, FinalDecision::Accepted),
                    Decision::Reject => (ManuscriptStatus::Rejected, FinalDecision::Rejected),
                };
                next.status = status;
                next.admin_final_decision = Some(final_decision);
                next.admin_final_comment = Some(comment);
                next.admin_decided_at = Some(now);
            }
            ManuscriptTransition::RequestCopyright => {
                next.status = ManuscriptStatus::AwaitingCopyright;
                next.copyright_requested_at = Some(now);
            }
            ManuscriptTransition::ReceiveCopyright { file_name } => {
                let file_name = file_name.trim();
                if file_name.is_empty() {
                    return Err(WorkflowError::MissingRequiredField(
                        RequiredField::CopyrightForm,
                    ));
                }
                next.status = ManuscriptStatus::CopyrightReceived;
                next.copyright_file = Some(file_name.to_string());
                next.copyright_received_by = Some(actor.role);
                next.copyright_received_at = Some(now);
            }
        }
        next.updated_at = now;
        Ok(next)
    }

    /// State and actor checks for a manuscript action, without a payload.
    pub fn authorize_manuscript(
        manuscript: &Manuscript,
        action: ManuscriptAction,
        actor: &Actor,
    ) -> Result<(), WorkflowError> {
        let status = manuscript.status;
        let state_ok = match action {
            ManuscriptAction::AssignEditor => status == ManuscriptStatus::Pending,
            ManuscriptAction::EditorReview => {
                status == ManuscriptStatus::AssignedToEditor
                    && manuscript.assigned_editor_id.is_some()
            }
            ManuscriptAction::FinalDecision => {
                status == ManuscriptStatus::AcceptedByEditor
                    && manuscript.editor_status() == EditorStatus::AcceptedByEditor
                    && manuscript.admin_final_decision.is_none()
            }
            ManuscriptAction::RequestCopyright => status == ManuscriptStatus::Accepted,
            ManuscriptAction::ReceiveCopyright => status == ManuscriptStatus::AwaitingCopyright,
        };
        if !state_ok {
            return Err(WorkflowError::InvalidTransition {
                from: status.to_string(),
                action: action.describe(),
            });
        }

        let allowed = match action {
            ManuscriptAction::AssignEditor
            | ManuscriptAction::FinalDecision
            | ManuscriptAction::RequestCopyright => actor.role == Role::Admin,
            ManuscriptAction::EditorReview => {
                actor.occupies(Role::Editor, manuscript.assigned_editor_id)
            }
            ManuscriptAction::ReceiveCopyright => {
                actor.role == Role::Admin || is_author(actor, manuscript.author_id)
            }
        };
        if !allowed {
            return Err(WorkflowError::ActorNotAuthorized {
                role: actor.role,
                action: action.describe(),
            });
        }
        Ok(())
    }

    /// Actions `actor` may currently take on `manuscript`.
    pub fn manuscript_actions(manuscript: &Manuscript, actor: &Actor) -> Vec<ManuscriptAction> {
        ManuscriptAction::ALL
            .into_iter()
            .filter(|a| Self::authorize_manuscript(manuscript, *a, actor).is_ok())
            .collect()
    }

    /// Apply `transition` to a conference abstract on behalf of `actor`.
    pub fn apply_abstract<D: EditorDirectory + ?Sized>(
        item: &ConferenceAbstract,
        transition: &AbstractTransition,
        actor: &Actor,
        editors: &D,
        now: DateTime<Utc>,
    ) -> Result<ConferenceAbstract, WorkflowError> {
        Self::authorize_abstract(item, transition.action(), actor)?;

        let mut next = item.clone();
        match transition {
            AbstractTransition::AssignEditor { editor_id } => {
                resolve_editor(editors, *editor_id)?;
                next.status = AbstractStatus::AssignedToEditor;
                next.assigned_editor = Some(*editor_id);
                next.assigned_at = Some(now);
            }
            AbstractTransition::EditorReview { comment } => {
                next.editor_comment = Some(require_comment(comment)?);
                next.status = AbstractStatus::ReviewedByEditor;
                next.editor_reviewed_at = Some(now);
            }
            AbstractTransition::Reject { comment } => {
                let comment = require_comment(comment)?;
                match actor.role {
                    Role::Editor => {
                        next.editor_comment = Some(comment);
                        next.editor_reviewed_at = Some(now);
                    }
                    Role::ConferenceEditor => {
                        next.conference_editor_comment = Some(comment);
                        next.conference_editor_reviewed_at = Some(now);
                    }
                    Role::Admin | Role::Author => {
                        next.admin_final_comment = Some(comment);
                        next.admin_decided_at = Some(now);
                    }
                }
                next.status = AbstractStatus::Rejected;
                next.rejected_by = Some(actor.role);
            }
            AbstractTransition::AssignConferenceEditor { editor_id } => {
                resolve_editor(editors, *editor_id)?;
                next.status = AbstractStatus::AssignedToConferenceEditor;
                next.assigned_conference_editor = Some(*editor_id);
                next.conference_assigned_at = Some(now);
            }
            AbstractTransition::ConferenceEditorReview { comment } => {
                next.conference_editor_comment = Some(require_comment(comment)?);
                next.status = AbstractStatus::ReviewedByConferenceEditor;
                next.conference_editor_reviewed_at = Some(now);
            }
            AbstractTransition::FinalDecision { decision, comment } => {
                match decision {
                    Decision::Accept => {
                        let comment = comment.trim();
                        if !comment.is_empty() {
                            next.admin_final_comment = Some(comment.to_string());
                        }
                        next.status = AbstractStatus::Accepted;
                    }
                    Decision::Reject => {
                        next.admin_final_comment = Some(require_comment(comment)?);
                        next.status = AbstractStatus::Rejected;
                        next.rejected_by = Some(Role::Admin);
                    }
                }
                next.admin_decided_at = Some(now);
            }
            AbstractTransition::SubmitFullPaper { files } => {
                if files.is_empty() || files.iter().any(|f| f.file_name.trim().is_empty()) {
                    return Err(WorkflowError::MissingRequiredField(
                        RequiredField::FullPaperFile,
                    ));
                }
                next.full_paper_files
                    .extend(files.iter().map(|f| FullPaperFile {
                        id: Uuid::new_v4().to_string(),
                        file_name: f.file_name.trim().to_string(),
                        url: f.url.clone(),
                        submitted_at: now,
                    }));
            }
        }
        next.updated_at = now;
        Ok(next)
    }

    /// State and actor checks for an abstract action, without a payload.
    pub fn authorize_abstract(
        item: &ConferenceAbstract,
        action: AbstractAction,
        actor: &Actor,
    ) -> Result<(), WorkflowError> {
        let status = item.status;
        let state_ok = match action {
            AbstractAction::AssignEditor => status == AbstractStatus::Submitted,
            AbstractAction::EditorReview => status == AbstractStatus::AssignedToEditor,
            AbstractAction::Reject => !status.is_terminal(),
            AbstractAction::AssignConferenceEditor => status == AbstractStatus::ReviewedByEditor,
            AbstractAction::ConferenceEditorReview => {
                status == AbstractStatus::AssignedToConferenceEditor
            }
            AbstractAction::FinalDecision => status == AbstractStatus::ReviewedByConferenceEditor,
            AbstractAction::SubmitFullPaper => status == AbstractStatus::Accepted,
        };
        if !state_ok {
            return Err(WorkflowError::InvalidTransition {
                from: status.to_string(),
                action: action.describe(),
            });
        }

        let allowed = match action {
            AbstractAction::AssignEditor
            | AbstractAction::AssignConferenceEditor
            | AbstractAction::FinalDecision => actor.role == Role::Admin,
            AbstractAction::EditorReview => actor.occupies(Role::Editor, item.assigned_editor),
            AbstractAction::ConferenceEditorReview => {
                actor.occupies(Role::ConferenceEditor, item.assigned_conference_editor)
            }
            AbstractAction::Reject => {
                actor.role == Role::Admin
                    || match status {
                        AbstractStatus::AssignedToEditor => {
                            actor.occupies(Role::Editor, item.assigned_editor)
                        }
                        AbstractStatus::AssignedToConferenceEditor => {
                            actor.occupies(Role::ConferenceEditor, item.assigned_conference_editor)
                        }
                        _ => false,
                    }
            }
            AbstractAction::SubmitFullPaper => is_author(actor, item.author_id),
        };
        if !allowed {
            return Err(WorkflowError::ActorNotAuthorized {
                role: actor.role,
                action: action.describe(),
            });
        }
        Ok(())
    }

    /// Actions `actor` may currently take on `item`.
    pub fn abstract_actions(item: &ConferenceAbstract, actor: &Actor) -> Vec<AbstractAction> {
        AbstractAction::ALL
            .into_iter()
            .filter(|a| Self::authorize_abstract(item, *a, actor).is_ok())
            .collect()
    }
}

fn require_comment(comment: &str) -> Result<String, WorkflowError> {
    let trimmed = comment.trim();
    if trimmed.is_empty() {
        return Err(WorkflowError::MissingRequiredField(RequiredField::Comment));
    }
    Ok(trimmed.to_string())
}

// Id 0 is what an unselected editor dropdown submits.
fn resolve_editor<D: EditorDirectory + ?Sized>(
    editors: &D,
    editor_id: EditorId,
) -> Result<(), WorkflowError> {
    if editor_id == 0 {
        return Err(WorkflowError::MissingRequiredField(
            RequiredField::EditorSelection,
        ));
    }
    editors
        .find_editor(editor_id)
        .map(|_| ())
        .ok_or(WorkflowError::UnknownReference { editor_id })
}

fn is_author(actor: &Actor, author_id: Option<u64>) -> bool {
    actor.role == Role::Author && author_id.is_none_or(|id| id == actor.id)
}
