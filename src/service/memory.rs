use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{EditorialError, WorkflowError};
use crate::workflow::{
    AbstractStatus, AbstractTransition, Actor, ConferenceAbstract, Editor, EditorId,
    EditorStatus, EntityKind, Manuscript, ManuscriptStatus, ManuscriptTransition,
    TransitionGuard,
};

use super::WorkflowService;

/// Everything the in-process store holds, in the shape it is saved to disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub editors: Vec<Editor>,
    #[serde(default)]
    pub manuscripts: Vec<Manuscript>,
    #[serde(default)]
    pub abstracts: Vec<ConferenceAbstract>,
}

impl StoreSnapshot {
    pub fn with_editor(mut self, editor: Editor) -> Self {
        self.editors.push(editor);
        self
    }

    pub fn with_manuscript(mut self, manuscript: Manuscript) -> Self {
        self.manuscripts.push(manuscript);
        self
    }

    pub fn with_abstract(mut self, item: ConferenceAbstract) -> Self {
        self.abstracts.push(item);
        self
    }

    /// Fixture data for `editorial demo` and offline experiments.
    pub fn demo(now: DateTime<Utc>) -> Self {
        let day = Duration::days(1);
        let submitted = now - day * 10;

        let mut assigned = Manuscript::new(2, "MS-2024-002", "Low-cost perovskite encapsulation", submitted)
            .with_author(41);
        assigned.status = ManuscriptStatus::AssignedToEditor;
        assigned.editor_status = Some(EditorStatus::PendingReview);
        assigned.assigned_editor_id = Some(7);
        assigned.assigned_at = Some(submitted + day);
        assigned.updated_at = submitted + day;

        let mut reviewed = ConferenceAbstract::new(21, "Wave-powered buoys for coastal sensing", submitted)
            .with_author(51)
            .with_conference("Marine Renewables Summit 2024");
        reviewed.status = AbstractStatus::ReviewedByConferenceEditor;
        reviewed.assigned_editor = Some(3);
        reviewed.assigned_at = Some(submitted + day);
        reviewed.editor_comment = Some("Clear contribution, good fit.".into());
        reviewed.editor_reviewed_at = Some(submitted + day * 2);
        reviewed.assigned_conference_editor = Some(9);
        reviewed.conference_assigned_at = Some(submitted + day * 3);
        reviewed.conference_editor_comment = Some("Recommend oral session.".into());
        reviewed.conference_editor_reviewed_at = Some(submitted + day * 4);
        reviewed.updated_at = submitted + day * 4;

        StoreSnapshot::default()
            .with_editor(Editor::new(3, "Dr. Ana Lima").with_specialization("Ecology"))
            .with_editor(Editor::new(7, "Prof. J. Mensah").with_specialization("Materials science"))
            .with_editor(Editor::new(9, "Dr. K. Ito").with_specialization("Marine engineering"))
            .with_manuscript(
                Manuscript::new(1, "MS-2024-001", "Soil carbon under rotational grazing", submitted)
                    .with_author(40)
                    .with_comment("Revised after desk review."),
            )
            .with_manuscript(assigned)
            .with_abstract(
                ConferenceAbstract::new(20, "Tidal array wake modelling", submitted)
                    .with_author(50)
                    .with_conference("Marine Renewables Summit 2024"),
            )
            .with_abstract(reviewed)
    }
}

#[derive(Debug, Default)]
struct StoreState {
    editors: Vec<Editor>,
    manuscripts: BTreeMap<u64, Manuscript>,
    abstracts: BTreeMap<u64, ConferenceAbstract>,
}

impl From<StoreSnapshot> for StoreState {
    fn from(snapshot: StoreSnapshot) -> Self {
        Self {
            editors: snapshot.editors,
            manuscripts: snapshot.manuscripts.into_iter().map(|m| (m.id, m)).collect(),
            abstracts: snapshot.abstracts.into_iter().map(|a| (a.id, a)).collect(),
        }
    }
}

impl StoreState {
    fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            editors: self.editors.clone(),
            manuscripts: self.manuscripts.values().cloned().collect(),
            abstracts: self.abstracts.values().cloned().collect(),
        }
    }
}

/// Process-local workflow state, optionally mirrored to a JSON file.
///
/// Transitions hold the write lock from guard check to commit, so requests
/// against the same store are applied one at a time.
pub struct InMemoryWorkflowService {
    state: RwLock<StoreState>,
    path: Option<PathBuf>,
}

impl InMemoryWorkflowService {
    pub fn new(snapshot: StoreSnapshot) -> Self {
        Self {
            state: RwLock::new(snapshot.into()),
            path: None,
        }
    }

    /// Load the snapshot at `path` (empty store if the file does not exist
    /// yet) and write back to it after every accepted transition.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, EditorialError> {
        let path = path.as_ref().to_path_buf();
        let snapshot = if tokio::fs::try_exists(&path).await? {
            let contents = tokio::fs::read_to_string(&path).await?;
            serde_json::from_str::<StoreSnapshot>(&contents)?
        } else {
            StoreSnapshot::default()
        };
        debug!(
            path = %path.display(),
            manuscripts = snapshot.manuscripts.len(),
            abstracts = snapshot.abstracts.len(),
            "opened workflow store"
        );
        Ok(Self {
            state: RwLock::new(snapshot.into()),
            path: Some(path),
        })
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        self.state.read().await.snapshot()
    }

    /// Replace the whole store content, e.g. to seed it.
    pub async fn restore(&self, snapshot: StoreSnapshot) -> Result<(), EditorialError> {
        let mut state = self.state.write().await;
        let previous = std::mem::replace(&mut *state, snapshot.into());
        if let Err(e) = self.flush(&state).await {
            *state = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Write the current state to the backing file, if there is one.
    pub async fn persist(&self) -> Result<(), EditorialError> {
        let state = self.state.read().await;
        self.flush(&state).await
    }

    async fn flush(&self, state: &StoreState) -> Result<(), EditorialError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&state.snapshot())?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}

impl WorkflowService for InMemoryWorkflowService {
    async fn editors(&self) -> Result<Vec<Editor>, EditorialError> {
        Ok(self.state.read().await.editors.clone())
    }

    async fn fetch_manuscript(&self, id: u64) -> Result<Manuscript, EditorialError> {
        self.state
            .read()
            .await
            .manuscripts
            .get(&id)
            .cloned()
            .ok_or_else(|| {
                WorkflowError::EntityNotFound {
                    kind: EntityKind::Manuscript,
                    id,
                }
                .into()
            })
    }

    async fn apply_manuscript_transition(
        &self,
        id: u64,
        transition: &ManuscriptTransition,
        actor: &Actor,
    ) -> Result<Manuscript, EditorialError> {
        let mut state = self.state.write().await;
        let current = state
            .manuscripts
            .get(&id)
            .ok_or(WorkflowError::EntityNotFound {
                kind: EntityKind::Manuscript,
                id,
            })?;
        let action = transition.action().name();
        let next = match TransitionGuard::apply_manuscript(
            current,
            transition,
            actor,
            &state.editors,
            Utc::now(),
        ) {
            Ok(next) => next,
            Err(e) => {
                warn!(manuscript_id = id, action, role = %actor.role, error = %e, "transition rejected");
                return Err(e.into());
            }
        };

        let previous = state.manuscripts.insert(id, next.clone());
        if let Err(e) = self.flush(&state).await {
            if let Some(previous) = previous {
                state.manuscripts.insert(id, previous);
            }
            return Err(e);
        }
        info!(manuscript_id = id, action, role = %actor.role, status = %next.status, "transition applied");
        Ok(next)
    }

    async fn manuscripts_assigned_to(
        &self,
        editor_id: EditorId,
    ) -> Result<Vec<Manuscript>, EditorialError> {
        Ok(self
            .state
            .read()
            .await
            .manuscripts
            .values()
            .filter(|m| m.assigned_editor_id == Some(editor_id))
            .cloned()
            .collect())
    }

    async fn fetch_abstract(&self, id: u64) -> Result<ConferenceAbstract, EditorialError> {
        self.state
            .read()
            .await
            .abstracts
            .get(&id)
            .cloned()
            .ok_or_else(|| {
                WorkflowError::EntityNotFound {
                    kind: EntityKind::Abstract,
                    id,
                }
                .into()
            })
    }

    async fn apply_abstract_transition(
        &self,
        id: u64,
        transition: &AbstractTransition,
        actor: &Actor,
    ) -> Result<ConferenceAbstract, EditorialError> {
        let mut state = self.state.write().await;
        let current = state.abstracts.get(&id).ok_or(WorkflowError::EntityNotFound {
            kind: EntityKind::Abstract,
            id,
        })?;
        let action = transition.action().name();
        let next = match TransitionGuard::apply_abstract(
            current,
            transition,
            actor,
            &state.editors,
            Utc::now(),
        ) {
            Ok(next) => next,
            Err(e) => {
                warn!(abstract_id = id, action, role = %actor.role, error = %e, "transition rejected");
                return Err(e.into());
            }
        };

        let previous = state.abstracts.insert(id, next.clone());
        if let Err(e) = self.flush(&state).await {
            if let Some(previous) = previous {
                state.abstracts.insert(id, previous);
            }
            return Err(e);
        }
        info!(abstract_id = id, action, role = %actor.role, status = %next.status, "transition applied");
        Ok(next)
    }

    async fn abstracts_assigned_to(
        &self,
        editor_id: EditorId,
    ) -> Result<Vec<ConferenceAbstract>, EditorialError> {
        Ok(self
            .state
            .read()
            .await
            .abstracts
            .values()
            .filter(|a| a.involves_editor(editor_id))
            .cloned()
            .collect())
    }
}
