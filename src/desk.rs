use std::future::Future;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::error::EditorialError;
use crate::service::WorkflowService;
use crate::workflow::{
    AbstractAction, AbstractTransition, Actor, ConferenceAbstract, Decision, EditorId,
    FileUpload, Manuscript, ManuscriptAction, ManuscriptTransition, TimelineEvent,
    TransitionGuard,
};

/// Work currently sitting with one editor.
#[derive(Debug, Clone, Default)]
pub struct Assignments {
    pub manuscripts: Vec<Manuscript>,
    pub abstracts: Vec<ConferenceAbstract>,
}

/// Options for [`ReviewDesk::watch_manuscript`] and [`ReviewDesk::watch_abstract`].
#[derive(Debug, Clone, Copy)]
pub struct WatchOptions {
    pub interval: Duration,
    /// Stop after this many fetches even if no terminal status was reached.
    pub max_polls: Option<u32>,
}

impl WatchOptions {
    pub fn every(interval: Duration) -> Self {
        Self {
            interval,
            max_polls: None,
        }
    }

    pub fn max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = Some(max_polls);
        self
    }
}

/// One user's view of the review workflow: every operation is issued as
/// `actor` against the given service.
pub struct ReviewDesk<S> {
    service: S,
    actor: Actor,
}

impl<S: WorkflowService> ReviewDesk<S> {
    pub fn new(service: S, actor: Actor) -> Self {
        Self { service, actor }
    }

    pub fn actor(&self) -> Actor {
        self.actor
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    // --- Manuscripts ---

    pub async fn manuscript(&self, id: u64) -> Result<Manuscript, EditorialError> {
        self.service.fetch_manuscript(id).await
    }

    async fn apply_manuscript(
        &self,
        id: u64,
        transition: ManuscriptTransition,
    ) -> Result<Manuscript, EditorialError> {
        self.service
            .apply_manuscript_transition(id, &transition, &self.actor)
            .await
    }

    /// Pending → Assigned to Editor.
    pub async fn assign_editor(
        &self,
        manuscript_id: u64,
        editor_id: EditorId,
    ) -> Result<Manuscript, EditorialError> {
        self.apply_manuscript(manuscript_id, ManuscriptTransition::AssignEditor { editor_id })
            .await
    }

    pub async fn editor_review(
        &self,
        manuscript_id: u64,
        decision: Decision,
        comment: &str,
    ) -> Result<Manuscript, EditorialError> {
        self.apply_manuscript(
            manuscript_id,
            ManuscriptTransition::EditorReview {
                decision,
                comment: comment.to_string(),
            },
        )
        .await
    }

    pub async fn admin_final_decision(
        &self,
        manuscript_id: u64,
        decision: Decision,
        comment: &str,
    ) -> Result<Manuscript, EditorialError> {
        self.apply_manuscript(
            manuscript_id,
            ManuscriptTransition::FinalDecision {
                decision,
                comment: comment.to_string(),
            },
        )
        .await
    }

    pub async fn request_copyright(&self, manuscript_id: u64) -> Result<Manuscript, EditorialError> {
        self.apply_manuscript(manuscript_id, ManuscriptTransition::RequestCopyright)
            .await
    }

    pub async fn receive_copyright(
        &self,
        manuscript_id: u64,
        file_name: &str,
    ) -> Result<Manuscript, EditorialError> {
        self.apply_manuscript(
            manuscript_id,
            ManuscriptTransition::ReceiveCopyright {
                file_name: file_name.to_string(),
            },
        )
        .await
    }

    pub async fn manuscript_timeline(
        &self,
        id: u64,
    ) -> Result<(Manuscript, Vec<TimelineEvent>), EditorialError> {
        let manuscript = self.service.fetch_manuscript(id).await?;
        let editors = self.service.editors().await?;
        let events = manuscript.timeline(&editors).collect();
        Ok((manuscript, events))
    }

    /// What this desk's actor may do with the manuscript right now.
    pub async fn manuscript_actions(&self, id: u64) -> Result<Vec<ManuscriptAction>, EditorialError> {
        let manuscript = self.service.fetch_manuscript(id).await?;
        Ok(TransitionGuard::manuscript_actions(&manuscript, &self.actor))
    }

    // --- Conference abstracts ---

    pub async fn conference_abstract(&self, id: u64) -> Result<ConferenceAbstract, EditorialError> {
        self.service.fetch_abstract(id).await
    }

    async fn apply_abstract(
        &self,
        id: u64,
        transition: AbstractTransition,
    ) -> Result<ConferenceAbstract, EditorialError> {
        self.service
            .apply_abstract_transition(id, &transition, &self.actor)
            .await
    }

    pub async fn assign_abstract_editor(
        &self,
        abstract_id: u64,
        editor_id: EditorId,
    ) -> Result<ConferenceAbstract, EditorialError> {
        self.apply_abstract(abstract_id, AbstractTransition::AssignEditor { editor_id })
            .await
    }

    pub async fn abstract_editor_review(
        &self,
        abstract_id: u64,
        comment: &str,
    ) -> Result<ConferenceAbstract, EditorialError> {
        self.apply_abstract(
            abstract_id,
            AbstractTransition::EditorReview {
                comment: comment.to_string(),
            },
        )
        .await
    }

    pub async fn reject_abstract(
        &self,
        abstract_id: u64,
        comment: &str,
    ) -> Result<ConferenceAbstract, EditorialError> {
        self.apply_abstract(
            abstract_id,
            AbstractTransition::Reject {
                comment: comment.to_string(),
            },
        )
        .await
    }

    /// Reviewed by Editor → Assigned to Conference Editor.
    pub async fn assign_conference_editor(
        &self,
        abstract_id: u64,
        editor_id: EditorId,
    ) -> Result<ConferenceAbstract, EditorialError> {
        self.apply_abstract(
            abstract_id,
            AbstractTransition::AssignConferenceEditor { editor_id },
        )
        .await
    }

    pub async fn conference_editor_review(
        &self,
        abstract_id: u64,
        comment: &str,
    ) -> Result<ConferenceAbstract, EditorialError> {
        self.apply_abstract(
            abstract_id,
            AbstractTransition::ConferenceEditorReview {
                comment: comment.to_string(),
            },
        )
        .await
    }

    pub async fn abstract_final_decision(
        &self,
        abstract_id: u64,
        decision: Decision,
        comment: &str,
    ) -> Result<ConferenceAbstract, EditorialError> {
        self.apply_abstract(
            abstract_id,
            AbstractTransition::FinalDecision {
                decision,
                comment: comment.to_string(),
            },
        )
        .await
    }

    pub async fn submit_full_paper(
        &self,
        abstract_id: u64,
        files: Vec<FileUpload>,
    ) -> Result<ConferenceAbstract, EditorialError> {
        self.apply_abstract(abstract_id, AbstractTransition::SubmitFullPaper { files })
            .await
    }

    pub async fn abstract_timeline(
        &self,
        id: u64,
    ) -> Result<(ConferenceAbstract, Vec<TimelineEvent>), EditorialError> {
        let item = self.service.fetch_abstract(id).await?;
        let editors = self.service.editors().await?;
        let events = item.timeline(&editors).collect();
        Ok((item, events))
    }

    pub async fn abstract_actions(&self, id: u64) -> Result<Vec<AbstractAction>, EditorialError> {
        let item = self.service.fetch_abstract(id).await?;
        Ok(TransitionGuard::abstract_actions(&item, &self.actor))
    }

    // --- Dashboards ---

    pub async fn assignments_for(&self, editor_id: EditorId) -> Result<Assignments, EditorialError> {
        Ok(Assignments {
            manuscripts: self.service.manuscripts_assigned_to(editor_id).await?,
            abstracts: self.service.abstracts_assigned_to(editor_id).await?,
        })
    }

    /// The acting editor's own queue.
    pub async fn my_assignments(&self) -> Result<Assignments, EditorialError> {
        self.assignments_for(self.actor.id).await
    }

    // --- Status watching ---

    /// Poll a manuscript until it reaches a terminal status (or `max_polls`
    /// runs out), calling `on_change` for the first fetch and for every
    /// fetch that differs from the previous one. Returns the last fetch.
    pub async fn watch_manuscript(
        &self,
        id: u64,
        options: WatchOptions,
        on_change: impl FnMut(&Manuscript),
    ) -> Result<Manuscript, EditorialError> {
        poll_until(
            options,
            || self.service.fetch_manuscript(id),
            Manuscript::is_terminal,
            on_change,
        )
        .await
    }

    pub async fn watch_abstract(
        &self,
        id: u64,
        options: WatchOptions,
        on_change: impl FnMut(&ConferenceAbstract),
    ) -> Result<ConferenceAbstract, EditorialError> {
        poll_until(
            options,
            || self.service.fetch_abstract(id),
            ConferenceAbstract::is_terminal,
            on_change,
        )
        .await
    }
}

// Each fetch is taken as the whole truth; nothing is assumed about how the
// entity got from the previous snapshot to this one.
async fn poll_until<T, F, Fut>(
    options: WatchOptions,
    mut fetch: F,
    is_terminal: fn(&T) -> bool,
    mut on_change: impl FnMut(&T),
) -> Result<T, EditorialError>
where
    T: PartialEq,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, EditorialError>>,
{
    if options.interval.is_zero() {
        return Err(EditorialError::Config(
            "watch interval must be greater than zero".into(),
        ));
    }
    let mut ticker = tokio::time::interval(options.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last: Option<T> = None;
    let mut polls = 0u32;

    loop {
        ticker.tick().await;
        let current = fetch().await?;
        polls += 1;
        debug!(poll = polls, "watch fetched entity");

        if last.as_ref() != Some(&current) {
            on_change(&current);
        }
        let done = is_terminal(&current) || options.max_polls.is_some_and(|max| polls >= max);
        if done {
            return Ok(current);
        }
        last = Some(current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RequiredField, WorkflowError};
    use crate::service::{InMemoryWorkflowService, StoreSnapshot};
    use crate::workflow::{
        AbstractStatus, EditorStatus, FinalDecision, ManuscriptStatus, Milestone,
    };
    use chrono::{DateTime, Utc};
    use std::sync::Arc;

    fn t(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn store() -> Arc<InMemoryWorkflowService> {
        Arc::new(InMemoryWorkflowService::new(StoreSnapshot::demo(t(
            "2024-06-01T00:00:00Z",
        ))))
    }

    fn desk(store: &Arc<InMemoryWorkflowService>, actor: Actor) -> ReviewDesk<Arc<InMemoryWorkflowService>> {
        ReviewDesk::new(Arc::clone(store), actor)
    }

    fn workflow_error(err: EditorialError) -> WorkflowError {
        err.as_workflow().cloned().expect("workflow error")
    }

    #[tokio::test]
    async fn scenario_a_assign_editor() {
        let store = store();
        let admin = desk(&store, Actor::admin(1));
        let m = admin.assign_editor(1, 7).await.unwrap();
        assert_eq!(m.status, ManuscriptStatus::AssignedToEditor);
        assert_eq!(m.assigned_editor_id, Some(7));
    }

    #[tokio::test]
    async fn scenario_b_empty_comment_is_refused() {
        let store = store();
        let editor = desk(&store, Actor::editor(7));
        let err = editor.editor_review(2, Decision::Accept, "").await.unwrap_err();
        assert_eq!(
            workflow_error(err),
            WorkflowError::MissingRequiredField(RequiredField::Comment)
        );
        let m = editor.manuscript(2).await.unwrap();
        assert_eq!(m.status, ManuscriptStatus::AssignedToEditor);
        assert_eq!(m.editor_status(), EditorStatus::PendingReview);
    }

    #[tokio::test]
    async fn scenario_c_admin_rejection_is_final() {
        let store = store();
        let editor = desk(&store, Actor::editor(7));
        let admin = desk(&store, Actor::admin(1));

        editor
            .editor_review(2, Decision::Accept, "Convincing results")
            .await
            .unwrap();
        let m = admin
            .admin_final_decision(2, Decision::Reject, "Not novel enough")
            .await
            .unwrap();
        assert_eq!(m.admin_final_decision, Some(FinalDecision::Rejected));
        assert_eq!(m.admin_final_comment.as_deref(), Some("Not novel enough"));
        assert_eq!(m.status, ManuscriptStatus::Rejected);

        let err = admin
            .admin_final_decision(2, Decision::Accept, "Reconsidered")
            .await
            .unwrap_err();
        assert!(matches!(
            workflow_error(err),
            WorkflowError::InvalidTransition { .. }
        ));
        assert!(admin.manuscript_actions(2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn scenario_d_accept_then_full_paper() {
        let store = store();
        let admin = desk(&store, Actor::admin(1));
        let author = desk(&store, Actor::author(51));

        let a = admin
            .abstract_final_decision(21, Decision::Accept, "Approved")
            .await
            .unwrap();
        assert_eq!(a.status, AbstractStatus::Accepted);

        let a = author
            .submit_full_paper(21, vec![FileUpload::named("buoys-full.pdf")])
            .await
            .unwrap();
        assert_eq!(a.full_paper_files.len(), 1);
        assert_eq!(a.full_paper_files[0].file_name, "buoys-full.pdf");
    }

    #[tokio::test]
    async fn scenario_e_conference_editor_needs_editor_stage() {
        let store = store();
        let admin = desk(&store, Actor::admin(1));
        let err = admin.assign_conference_editor(20, 3).await.unwrap_err();
        assert!(matches!(
            workflow_error(err),
            WorkflowError::InvalidTransition { .. }
        ));
        let a = admin.conference_abstract(20).await.unwrap();
        assert_eq!(a.status, AbstractStatus::Submitted);
    }

    #[tokio::test]
    async fn abstract_full_walkthrough_with_timeline() {
        let store = store();
        let admin = desk(&store, Actor::admin(1));
        let editor = desk(&store, Actor::editor(3));
        let conference_editor = desk(&store, Actor::conference_editor(9));

        admin.assign_abstract_editor(20, 3).await.unwrap();
        assert_eq!(
            editor.abstract_actions(20).await.unwrap(),
            vec![AbstractAction::EditorReview, AbstractAction::Reject]
        );
        editor.abstract_editor_review(20, "Good fit").await.unwrap();
        admin.assign_conference_editor(20, 9).await.unwrap();
        conference_editor
            .conference_editor_review(20, "Poster session")
            .await
            .unwrap();
        admin
            .abstract_final_decision(20, Decision::Reject, "Programme is full")
            .await
            .unwrap();

        let (item, events) = admin.abstract_timeline(20).await.unwrap();
        assert_eq!(item.status, AbstractStatus::Rejected);
        let milestones: Vec<_> = events.iter().map(|e| e.milestone).collect();
        assert_eq!(
            milestones,
            vec![
                Milestone::Submitted,
                Milestone::EditorAssigned,
                Milestone::EditorDecision,
                Milestone::ConferenceEditorAssigned,
                Milestone::ConferenceEditorDecision,
                Milestone::AdminDecision,
            ]
        );
        assert_eq!(events[5].title, "Rejected");
        assert_eq!(events[5].comment.as_deref(), Some("Programme is full"));
        assert_eq!(events[1].title, "Assigned to Dr. Ana Lima");
    }

    #[tokio::test]
    async fn manuscript_copyright_flow_through_desk() {
        let store = store();
        let admin = desk(&store, Actor::admin(1));
        let editor = desk(&store, Actor::editor(7));
        let author = desk(&store, Actor::author(41));

        editor.editor_review(2, Decision::Accept, "Ready").await.unwrap();
        admin
            .admin_final_decision(2, Decision::Accept, "Accepted for vol. 12")
            .await
            .unwrap();
        admin.request_copyright(2).await.unwrap();
        assert_eq!(
            author.manuscript_actions(2).await.unwrap(),
            vec![ManuscriptAction::ReceiveCopyright]
        );
        let m = author.receive_copyright(2, "copyright-MS-2024-002.pdf").await.unwrap();
        assert_eq!(m.status, ManuscriptStatus::CopyrightReceived);

        let (_, events) = admin.manuscript_timeline(2).await.unwrap();
        assert_eq!(events.len(), 6);
        assert_eq!(events.last().unwrap().milestone, Milestone::CopyrightReceived);
    }

    #[tokio::test]
    async fn my_assignments_lists_editor_queue() {
        let store = store();
        let editor = desk(&store, Actor::editor(7));
        let queue = editor.my_assignments().await.unwrap();
        assert_eq!(queue.manuscripts.len(), 1);
        assert_eq!(queue.manuscripts[0].manuscript_id, "MS-2024-002");
        assert!(queue.abstracts.is_empty());

        let admin = desk(&store, Actor::admin(1));
        let queue = admin.assignments_for(9).await.unwrap();
        assert_eq!(queue.abstracts.len(), 1);
    }

    #[tokio::test]
    async fn watch_stops_after_max_polls_and_reports_once() {
        let store = store();
        let admin = desk(&store, Actor::admin(1));
        let mut seen = Vec::new();
        let last = admin
            .watch_manuscript(
                1,
                WatchOptions::every(Duration::from_millis(1)).max_polls(3),
                |m| seen.push(m.status),
            )
            .await
            .unwrap();
        assert_eq!(last.status, ManuscriptStatus::Pending);
        assert_eq!(seen, vec![ManuscriptStatus::Pending]);
    }

    #[tokio::test]
    async fn watch_follows_another_actor_to_terminal_status() {
        let store = store();
        let watcher = desk(&store, Actor::author(41));
        let editor = desk(&store, Actor::editor(7));
        let mut seen = Vec::new();

        let watch = watcher.watch_manuscript(
            2,
            WatchOptions::every(Duration::from_millis(2)).max_polls(500),
            |m| seen.push(m.status),
        );
        let act = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            editor
                .editor_review(2, Decision::Reject, "Outside journal scope")
                .await
        };
        let (watched, acted) = tokio::join!(watch, act);

        acted.unwrap();
        let last = watched.unwrap();
        assert_eq!(last.status, ManuscriptStatus::Rejected);
        assert_eq!(
            seen,
            vec![ManuscriptStatus::AssignedToEditor, ManuscriptStatus::Rejected]
        );
    }

    #[tokio::test]
    async fn watch_returns_immediately_on_terminal_abstract() {
        let store = store();
        let admin = desk(&store, Actor::admin(1));
        admin.reject_abstract(20, "Duplicate submission").await.unwrap();

        let mut calls = 0;
        let last = admin
            .watch_abstract(20, WatchOptions::every(Duration::from_millis(1)), |_| {
                calls += 1
            })
            .await
            .unwrap();
        assert_eq!(last.status, AbstractStatus::Rejected);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn watch_surfaces_missing_entity() {
        let store = store();
        let admin = desk(&store, Actor::admin(1));
        let err = admin
            .watch_manuscript(999, WatchOptions::every(Duration::from_millis(1)), |_| {})
            .await
            .unwrap_err();
        assert!(matches!(
            workflow_error(err),
            WorkflowError::EntityNotFound { id: 999, .. }
        ));
    }

    #[tokio::test]
    async fn watch_refuses_zero_interval() {
        let store = store();
        let admin = desk(&store, Actor::admin(1));
        let mut calls = 0;
        let err = admin
            .watch_manuscript(1, WatchOptions::every(Duration::ZERO).max_polls(1), |_| {
                calls += 1
            })
            .await
            .unwrap_err();
        assert!(matches!(err, EditorialError::Config(_)));
        assert_eq!(err.to_string(), "Config error: watch interval must be greater than zero");
        assert_eq!(calls, 0);
    }
}
