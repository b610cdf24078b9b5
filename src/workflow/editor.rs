use serde::{Deserialize, Serialize};

pub type EditorId = u64;

/// An editor as the back office knows them. Manuscripts and abstracts only
/// ever store the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Editor {
    pub id: EditorId,
    pub name: String,
    #[serde(default)]
    pub specialization: Option<String>,
}

impl Editor {
    pub fn new(id: EditorId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            specialization: None,
        }
    }

    pub fn with_specialization(mut self, specialization: impl Into<String>) -> Self {
        self.specialization = Some(specialization.into());
        self
    }
}

/// Resolves editor ids.
pub trait EditorDirectory {
    fn find_editor(&self, id: EditorId) -> Option<&Editor>;

    /// Display label for an editor id; falls back to `Editor #<id>`.
    fn editor_label(&self, id: EditorId) -> String {
        self.find_editor(id)
            .map(|e| e.name.clone())
            .unwrap_or_else(|| format!("Editor #{id}"))
    }
}

impl EditorDirectory for [Editor] {
    fn find_editor(&self, id: EditorId) -> Option<&Editor> {
        self.iter().find(|e| e.id == id)
    }
}

impl EditorDirectory for Vec<Editor> {
    fn find_editor(&self, id: EditorId) -> Option<&Editor> {
        self.as_slice().find_editor(id)
    }
}
