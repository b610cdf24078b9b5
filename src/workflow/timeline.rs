//! History views rebuilt from an entity's current fields.
//!
//! There is no event log behind these: each milestone is emitted when the
//! field that records it is populated. Re-reading an entity and asking for
//! its timeline again always yields the same events in the same order.
//! Milestones that lack their own timestamp fall back to `updatedAt`.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::conference_abstract::{AbstractStatus, ConferenceAbstract};
use super::editor::{EditorDirectory, EditorId};
use super::manuscript::{EditorStatus, Manuscript, ManuscriptStatus};
use super::role::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Milestone {
    Submitted,
    EditorAssigned,
    EditorDecision,
    ConferenceEditorAssigned,
    ConferenceEditorDecision,
    AdminDecision,
    CopyrightRequested,
    CopyrightReceived,
    FullPaperSubmitted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEvent {
    pub milestone: Milestone,
    pub title: String,
    pub actor: String,
    pub comment: Option<String>,
    pub at: DateTime<Utc>,
}

impl TimelineEvent {
    fn new(milestone: Milestone, title: impl Into<String>, actor: impl Into<String>) -> Self {
        Self {
            milestone,
            title: title.into(),
            actor: actor.into(),
            comment: None,
            at: DateTime::<Utc>::MIN_UTC,
        }
    }

    fn with_comment(mut self, comment: Option<&String>) -> Self {
        self.comment = comment.cloned();
        self
    }

    fn at(mut self, at: DateTime<Utc>) -> Self {
        self.at = at;
        self
    }
}

fn editor_label(editors: &dyn EditorDirectory, id: Option<EditorId>, fallback: &str) -> String {
    id.map(|id| editors.editor_label(id))
        .unwrap_or_else(|| fallback.to_string())
}

const MANUSCRIPT_STEPS: usize = 6;

/// Lazy iterator over a manuscript's milestones.
#[derive(Clone)]
pub struct ManuscriptTimeline<'a> {
    manuscript: &'a Manuscript,
    editors: &'a dyn EditorDirectory,
    step: usize,
}

impl Manuscript {
    /// A fresh timeline over this snapshot. Call again to restart.
    pub fn timeline<'a>(&'a self, editors: &'a dyn EditorDirectory) -> ManuscriptTimeline<'a> {
        ManuscriptTimeline {
            manuscript: self,
            editors,
            step: 0,
        }
    }
}

impl ManuscriptTimeline<'_> {
    fn event_at(&self, step: usize) -> Option<TimelineEvent> {
        let m = self.manuscript;
        let or_updated = |at: Option<DateTime<Utc>>| at.unwrap_or(m.updated_at);
        match step {
            0 => Some(
                TimelineEvent::new(
                    Milestone::Submitted,
                    format!("Manuscript {} submitted", m.manuscript_id),
                    "Author",
                )
                .with_comment(m.comment.as_ref())
                .at(m.created_at),
            ),
            1 => m.assigned_editor_id.map(|id| {
                TimelineEvent::new(
                    Milestone::EditorAssigned,
                    format!("Assigned to {}", self.editors.editor_label(id)),
                    "Admin",
                )
                .at(or_updated(m.assigned_at))
            }),
            2 => {
                let title = match m.editor_status() {
                    EditorStatus::PendingReview => return None,
                    EditorStatus::AcceptedByEditor => "Accepted by editor",
                    EditorStatus::RejectedByEditor => "Rejected by editor",
                };
                Some(
                    TimelineEvent::new(
                        Milestone::EditorDecision,
                        title,
                        editor_label(self.editors, m.assigned_editor_id, "Editor"),
                    )
                    .with_comment(m.editor_comment.as_ref())
                    .at(or_updated(m.editor_reviewed_at)),
                )
            }
            3 => m.admin_final_decision.map(|decision| {
                TimelineEvent::new(
                    Milestone::AdminDecision,
                    format!("Final decision: {decision}"),
                    "Admin",
                )
                .with_comment(m.admin_final_comment.as_ref())
                .at(or_updated(m.admin_decided_at))
            }),
            4 => {
                let requested = m.copyright_requested_at.is_some()
                    || matches!(
                        m.status,
                        ManuscriptStatus::AwaitingCopyright | ManuscriptStatus::CopyrightReceived
                    );
                requested.then(|| {
                    TimelineEvent::new(
                        Milestone::CopyrightRequested,
                        "Copyright form requested",
                        "Admin",
                    )
                    .at(or_updated(m.copyright_requested_at))
                })
            }
            5 => {
                let received = m.copyright_file.is_some()
                    || m.status == ManuscriptStatus::CopyrightReceived;
                received.then(|| {
                    let title = match &m.copyright_file {
                        Some(file) => format!("Copyright form received ({file})"),
                        None => "Copyright form received".to_string(),
                    };
                    let actor = match m.copyright_received_by {
                        Some(Role::Admin) => "Admin",
                        _ => "Author",
                    };
                    TimelineEvent::new(Milestone::CopyrightReceived, title, actor)
                        .at(or_updated(m.copyright_received_at))
                })
            }
            _ => None,
        }
    }
}

impl Iterator for ManuscriptTimeline<'_> {
    type Item = TimelineEvent;

    fn next(&mut self) -> Option<TimelineEvent> {
        while self.step < MANUSCRIPT_STEPS {
            let step = self.step;
            self.step += 1;
            if let Some(event) = self.event_at(step) {
                return Some(event);
            }
        }
        None
    }
}

const ABSTRACT_FIXED_STEPS: usize = 6;

/// Lazy iterator over a conference abstract's milestones, followed by one
/// event per uploaded full paper file.
#[derive(Clone)]
pub struct AbstractTimeline<'a> {
    item: &'a ConferenceAbstract,
    editors: &'a dyn EditorDirectory,
    step: usize,
}

impl ConferenceAbstract {
    pub fn timeline<'a>(&'a self, editors: &'a dyn EditorDirectory) -> AbstractTimeline<'a> {
        AbstractTimeline {
            item: self,
            editors,
            step: 0,
        }
    }
}

impl AbstractTimeline<'_> {
    fn event_at(&self, step: usize) -> Option<TimelineEvent> {
        let a = self.item;
        let or_updated = |at: Option<DateTime<Utc>>| at.unwrap_or(a.updated_at);
        match step {
            0 => {
                let title = match &a.conference {
                    Some(conference) => format!("Abstract submitted to {conference}"),
                    None => "Abstract submitted".to_string(),
                };
                Some(TimelineEvent::new(Milestone::Submitted, title, "Author").at(a.created_at))
            }
            1 => a.assigned_editor.map(|id| {
                TimelineEvent::new(
                    Milestone::EditorAssigned,
                    format!("Assigned to {}", self.editors.editor_label(id)),
                    "Admin",
                )
                .at(or_updated(a.assigned_at))
            }),
            2 => a.editor_comment.as_ref().map(|comment| {
                let title = if a.rejected_by == Some(Role::Editor) {
                    "Rejected by editor"
                } else {
                    "Reviewed by editor"
                };
                TimelineEvent::new(
                    Milestone::EditorDecision,
                    title,
                    editor_label(self.editors, a.assigned_editor, "Editor"),
                )
                .with_comment(Some(comment))
                .at(or_updated(a.editor_reviewed_at))
            }),
            3 => a.assigned_conference_editor.map(|id| {
                TimelineEvent::new(
                    Milestone::ConferenceEditorAssigned,
                    format!("Assigned to conference editor {}", self.editors.editor_label(id)),
                    "Admin",
                )
                .at(or_updated(a.conference_assigned_at))
            }),
            4 => a.conference_editor_comment.as_ref().map(|comment| {
                let title = if a.rejected_by == Some(Role::ConferenceEditor) {
                    "Rejected by conference editor"
                } else {
                    "Reviewed by conference editor"
                };
                TimelineEvent::new(
                    Milestone::ConferenceEditorDecision,
                    title,
                    editor_label(self.editors, a.assigned_conference_editor, "Conference editor"),
                )
                .with_comment(Some(comment))
                .at(or_updated(a.conference_editor_reviewed_at))
            }),
            5 => {
                let title = match (a.status, a.rejected_by) {
                    (AbstractStatus::Accepted, _) => "Accepted",
                    (AbstractStatus::Rejected, Some(Role::Admin)) => "Rejected",
                    _ => return None,
                };
                Some(
                    TimelineEvent::new(Milestone::AdminDecision, title, "Admin")
                        .with_comment(a.admin_final_comment.as_ref())
                        .at(or_updated(a.admin_decided_at)),
                )
            }
            n => a.full_paper_files.get(n - ABSTRACT_FIXED_STEPS).map(|file| {
                TimelineEvent::new(
                    Milestone::FullPaperSubmitted,
                    format!("Full paper submitted: {}", file.file_name),
                    "Author",
                )
                .at(file.submitted_at)
            }),
        }
    }
}

impl Iterator for AbstractTimeline<'_> {
    type Item = TimelineEvent;

    fn next(&mut self) -> Option<TimelineEvent> {
        let end = ABSTRACT_FIXED_STEPS + self.item.full_paper_files.len();
        while self.step < end {
            let step = self.step;
            self.step += 1;
            if let Some(event) = self.event_at(step) {
                return Some(event);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::{
        Actor, AbstractTransition, Decision, Editor, FileUpload, ManuscriptTransition,
        TransitionGuard,
    };

    fn t(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn editors() -> Vec<Editor> {
        vec![Editor::new(7, "Prof. J. Mensah"), Editor::new(9, "Dr. K. Ito")]
    }

    #[test]
    fn pending_manuscript_has_only_submission() {
        let m = Manuscript::new(1, "MS-1", "T", t("2024-03-01T09:00:00Z"))
            .with_comment("Please consider");
        let events: Vec<_> = m.timeline(&editors()).collect();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].milestone, Milestone::Submitted);
        assert_eq!(events[0].comment.as_deref(), Some("Please consider"));
        assert_eq!(events[0].at, t("2024-03-01T09:00:00Z"));
    }

    #[test]
    fn reviewed_manuscript_lists_milestones_in_order() {
        let eds = editors();
        let mut m = Manuscript::new(1, "MS-1", "T", t("2024-03-01T09:00:00Z"));
        m = TransitionGuard::apply_manuscript(
            &m,
            &ManuscriptTransition::AssignEditor { editor_id: 7 },
            &Actor::admin(1),
            &eds,
            t("2024-03-02T09:00:00Z"),
        )
        .unwrap();
        m = TransitionGuard::apply_manuscript(
            &m,
            &ManuscriptTransition::EditorReview {
                decision: Decision::Accept,
                comment: "Strong".into(),
            },
            &Actor::editor(7),
            &eds,
            t("2024-03-03T09:00:00Z"),
        )
        .unwrap();
        m = TransitionGuard::apply_manuscript(
            &m,
            &ManuscriptTransition::FinalDecision {
                decision: Decision::Reject,
                comment: "Not novel enough".into(),
            },
            &Actor::admin(1),
            &eds,
            t("2024-03-04T09:00:00Z"),
        )
        .unwrap();

        let events: Vec<_> = m.timeline(&eds).collect();
        let milestones: Vec<_> = events.iter().map(|e| e.milestone).collect();
        assert_eq!(
            milestones,
            vec![
                Milestone::Submitted,
                Milestone::EditorAssigned,
                Milestone::EditorDecision,
                Milestone::AdminDecision
            ]
        );
        assert_eq!(events[1].title, "Assigned to Prof. J. Mensah");
        assert_eq!(events[2].actor, "Prof. J. Mensah");
        assert_eq!(events[2].comment.as_deref(), Some("Strong"));
        assert_eq!(events[3].title, "Final decision: Rejected");
        assert_eq!(events[3].at, t("2024-03-04T09:00:00Z"));
    }

    #[test]
    fn missing_stage_timestamps_fall_back_to_updated_at() {
        let mut m = Manuscript::new(1, "MS-1", "T", t("2024-03-01T09:00:00Z"));
        m.status = ManuscriptStatus::AssignedToEditor;
        m.assigned_editor_id = Some(42);
        m.updated_at = t("2024-03-09T09:00:00Z");

        let events: Vec<_> = m.timeline(&editors()).collect();
        assert_eq!(events[1].title, "Assigned to Editor #42");
        assert_eq!(events[1].at, t("2024-03-09T09:00:00Z"));
    }

    #[test]
    fn timeline_is_restartable_and_deterministic() {
        let eds = editors();
        let mut m = Manuscript::new(1, "MS-1", "T", t("2024-03-01T09:00:00Z"));
        m.status = ManuscriptStatus::CopyrightReceived;
        m.assigned_editor_id = Some(7);
        m.editor_status = Some(EditorStatus::AcceptedByEditor);
        m.admin_final_decision = Some(crate::workflow::FinalDecision::Accepted);
        m.copyright_file = Some("form.pdf".into());

        let first: Vec<_> = m.timeline(&eds).collect();
        let second: Vec<_> = m.timeline(&eds).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 6);
        assert_eq!(first[5].title, "Copyright form received (form.pdf)");

        let mut partial = m.timeline(&eds);
        partial.next();
        let restarted = partial.clone().count();
        assert_eq!(restarted, 5);
    }

    #[test]
    fn copyright_event_names_who_recorded_it() {
        let eds = editors();
        let mut m = Manuscript::new(1, "MS-1", "T", t("2024-03-01T09:00:00Z"));
        m.status = ManuscriptStatus::CopyrightReceived;
        m.copyright_file = Some("form.pdf".into());

        let author_sent: Vec<_> = m.timeline(&eds).collect();
        assert_eq!(author_sent.last().unwrap().actor, "Author");

        m.copyright_received_by = Some(Role::Admin);
        let admin_recorded: Vec<_> = m.timeline(&eds).collect();
        let last = admin_recorded.last().unwrap();
        assert_eq!(last.milestone, Milestone::CopyrightReceived);
        assert_eq!(last.actor, "Admin");
    }

    #[test]
    fn abstract_timeline_includes_rejection_stage_and_files() {
        let eds = editors();
        let mut a = ConferenceAbstract::new(2, "Tidal", t("2024-05-10T12:00:00Z"))
            .with_conference("ICMR 2024");
        a = TransitionGuard::apply_abstract(
            &a,
            &AbstractTransition::AssignEditor { editor_id: 7 },
            &Actor::admin(1),
            &eds,
            t("2024-05-11T12:00:00Z"),
        )
        .unwrap();
        let rejected = TransitionGuard::apply_abstract(
            &a,
            &AbstractTransition::Reject {
                comment: "Off topic".into(),
            },
            &Actor::editor(7),
            &eds,
            t("2024-05-12T12:00:00Z"),
        )
        .unwrap();
        let events: Vec<_> = rejected.timeline(&eds).collect();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].title, "Abstract submitted to ICMR 2024");
        assert_eq!(events[2].title, "Rejected by editor");
        assert_eq!(events[2].comment.as_deref(), Some("Off topic"));

        let mut accepted = a.clone();
        accepted.status = AbstractStatus::Accepted;
        accepted.admin_final_comment = Some("Approved".into());
        accepted = TransitionGuard::apply_abstract(
            &accepted,
            &AbstractTransition::SubmitFullPaper {
                files: vec![FileUpload::named("paper.pdf")],
            },
            &Actor::author(1),
            &eds,
            t("2024-06-01T12:00:00Z"),
        )
        .unwrap();
        let events: Vec<_> = accepted.timeline(&eds).collect();
        let last = events.last().unwrap();
        assert_eq!(last.milestone, Milestone::FullPaperSubmitted);
        assert_eq!(last.title, "Full paper submitted: paper.pdf");
        assert_eq!(last.at, t("2024-06-01T12:00:00Z"));
        assert_eq!(events[events.len() - 2].title, "Accepted");
    }
}
