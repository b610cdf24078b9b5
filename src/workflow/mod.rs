//! The review workflow core: entity models, the transition guard and
//! timeline derivation. Nothing in here performs I/O.

mod conference_abstract;
mod editor;
mod guard;
mod manuscript;
mod role;
mod timeline;
mod transition;

use serde::{Deserialize, Serialize};

pub use conference_abstract::{AbstractStatus, ConferenceAbstract, FullPaperFile};
pub use editor::{Editor, EditorDirectory, EditorId};
pub use guard::TransitionGuard;
pub use manuscript::{EditorStatus, FinalDecision, Manuscript, ManuscriptStatus};
pub use role::{Actor, Role};
pub use timeline::{AbstractTimeline, Milestone, ManuscriptTimeline, TimelineEvent};
pub use transition::{
    AbstractAction, AbstractTransition, Decision, FileUpload, ManuscriptAction,
    ManuscriptTransition,
};

/// The two kinds of entity that move through a review workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Manuscript,
    Abstract,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Manuscript => write!(f, "manuscript"),
            EntityKind::Abstract => write!(f, "abstract"),
        }
    }
}
