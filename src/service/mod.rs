//! The collaborator that owns workflow state.
//!
//! [`WorkflowService`] is the only way the rest of the crate reads or
//! changes a manuscript or abstract. Two implementations exist: an
//! in-process store and a client for the remote back-office API. Either
//! way, one `apply_*` call is one logical unit that is rejected whole on
//! any guard failure.

pub mod memory;
pub mod rest;

use serde::Serialize;

use crate::error::EditorialError;
use crate::workflow::{
    AbstractTransition, Actor, ConferenceAbstract, Editor, EditorId, Manuscript,
    ManuscriptTransition,
};

pub use memory::{InMemoryWorkflowService, StoreSnapshot};
pub use rest::RestWorkflowService;

#[allow(async_fn_in_trait)]
pub trait WorkflowService {
    async fn editors(&self) -> Result<Vec<Editor>, EditorialError>;

    async fn fetch_manuscript(&self, id: u64) -> Result<Manuscript, EditorialError>;

    async fn apply_manuscript_transition(
        &self,
        id: u64,
        transition: &ManuscriptTransition,
        actor: &Actor,
    ) -> Result<Manuscript, EditorialError>;

    async fn manuscripts_assigned_to(
        &self,
        editor_id: EditorId,
    ) -> Result<Vec<Manuscript>, EditorialError>;

    async fn fetch_abstract(&self, id: u64) -> Result<ConferenceAbstract, EditorialError>;

    async fn apply_abstract_transition(
        &self,
        id: u64,
        transition: &AbstractTransition,
        actor: &Actor,
    ) -> Result<ConferenceAbstract, EditorialError>;

    /// Abstracts where `editor_id` holds either editor stage.
    async fn abstracts_assigned_to(
        &self,
        editor_id: EditorId,
    ) -> Result<Vec<ConferenceAbstract>, EditorialError>;
}

/// Body of a transition request: who is asking and what they ask for.
#[derive(Debug, Serialize)]
pub struct TransitionRequest<'a, T> {
    pub actor: &'a Actor,
    pub transition: &'a T,
}

impl<S: WorkflowService> WorkflowService for std::sync::Arc<S> {
    async fn editors(&self) -> Result<Vec<Editor>, EditorialError> {
        (**self).editors().await
    }

    async fn fetch_manuscript(&self, id: u64) -> Result<Manuscript, EditorialError> {
        (**self).fetch_manuscript(id).await
    }

    async fn apply_manuscript_transition(
        &self,
        id: u64,
        transition: &ManuscriptTransition,
        actor: &Actor,
    ) -> Result<Manuscript, EditorialError> {
        (**self).apply_manuscript_transition(id, transition, actor).await
    }

    async fn manuscripts_assigned_to(
        &self,
        editor_id: EditorId,
    ) -> Result<Vec<Manuscript>, EditorialError> {
        (**self).manuscripts_assigned_to(editor_id).await
    }

    async fn fetch_abstract(&self, id: u64) -> Result<ConferenceAbstract, EditorialError> {
        (**self).fetch_abstract(id).await
    }

    async fn apply_abstract_transition(
        &self,
        id: u64,
        transition: &AbstractTransition,
        actor: &Actor,
    ) -> Result<ConferenceAbstract, EditorialError> {
        (**self).apply_abstract_transition(id, transition, actor).await
    }

    async fn abstracts_assigned_to(
        &self,
        editor_id: EditorId,
    ) -> Result<Vec<ConferenceAbstract>, EditorialError> {
        (**self).abstracts_assigned_to(editor_id).await
    }
}
