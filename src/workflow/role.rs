use std::fmt;

use serde::{Deserialize, Serialize};

/// Who is acting on a manuscript or abstract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Author,
    Editor,
    ConferenceEditor,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Author => write!(f, "author"),
            Role::Editor => write!(f, "editor"),
            Role::ConferenceEditor => write!(f, "conference editor"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// The authenticated user behind a request. For editors and conference
/// editors `id` is their editor id; for authors it is their user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: u64,
    pub role: Role,
}

impl Actor {
    pub fn new(id: u64, role: Role) -> Self {
        Self { id, role }
    }

    pub fn admin(id: u64) -> Self {
        Self::new(id, Role::Admin)
    }

    pub fn editor(id: u64) -> Self {
        Self::new(id, Role::Editor)
    }

    pub fn conference_editor(id: u64) -> Self {
        Self::new(id, Role::ConferenceEditor)
    }

    pub fn author(id: u64) -> Self {
        Self::new(id, Role::Author)
    }

    /// True when this actor holds `role` and is the one recorded in `slot`.
    pub(crate) fn occupies(&self, role: Role, slot: Option<u64>) -> bool {
        self.role == role && slot == Some(self.id)
    }
}
