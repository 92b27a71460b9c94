//! Project dashboard: title/description editing with undo, and the active
//! content tab remembered per session.

use crate::api::HttpBackend;
use crate::error::{DeskError, Result};
use crate::history::History;
use crate::selection::SessionStore;
use crate::types::{Project, ProjectPatch};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Session key for the dashboard's active tab.
pub const PROJECT_TAB_KEY: &str = "projectTab";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectTab {
    #[default]
    Generate,
    Critique,
    Planner,
}

impl ProjectTab {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectTab::Generate => "generate",
            ProjectTab::Critique => "critique",
            ProjectTab::Planner => "planner",
        }
    }

    /// Route a consumer form mounted under this tab returns to.
    pub fn route(self, project_id: &str) -> String {
        format!("/projects/{project_id}/{}", self.as_str())
    }
}

impl fmt::Display for ProjectTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProjectTab {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "generate" => Ok(ProjectTab::Generate),
            "critique" => Ok(ProjectTab::Critique),
            "planner" => Ok(ProjectTab::Planner),
            _ => Err(DeskError::InvalidTab(s.to_string())),
        }
    }
}

/// Backend operation the editor needs to save.
pub trait ProjectApi {
    fn update_project(&self, id: &str, patch: &ProjectPatch) -> Result<Project>;
}

impl ProjectApi for HttpBackend {
    fn update_project(&self, id: &str, patch: &ProjectPatch) -> Result<Project> {
        HttpBackend::update_project(self, id, patch)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Snapshot {
    title: String,
    description: String,
    tab: ProjectTab,
}

pub struct ProjectEditor {
    project: Project,
    session: Arc<dyn SessionStore>,
    history: History<Snapshot>,
}

impl ProjectEditor {
    /// Open `project`, restoring the tab last used in this session.
    pub fn open(project: Project, session: Arc<dyn SessionStore>) -> Self {
        let tab = match session.get(PROJECT_TAB_KEY) {
            Ok(Some(raw)) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "unknown project tab in session, using default");
                ProjectTab::default()
            }),
            Ok(None) => ProjectTab::default(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read project tab");
                ProjectTab::default()
            }
        };
        let initial = Snapshot {
            title: project.title.clone(),
            description: project.description.clone().unwrap_or_default(),
            tab,
        };
        Self {
            project,
            session,
            history: History::new(initial),
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn title(&self) -> &str {
        &self.history.current().title
    }

    pub fn description(&self) -> &str {
        &self.history.current().description
    }

    pub fn tab(&self) -> ProjectTab {
        self.history.current().tab
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        let mut next = self.history.current().clone();
        next.title = title.into();
        self.apply(next);
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        let mut next = self.history.current().clone();
        next.description = description.into();
        self.apply(next);
    }

    pub fn set_tab(&mut self, tab: ProjectTab) {
        let mut next = self.history.current().clone();
        next.tab = tab;
        self.apply(next);
        self.write_tab();
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        let moved = self.history.undo().is_some();
        if moved {
            self.write_tab();
        }
        moved
    }

    pub fn redo(&mut self) -> bool {
        let moved = self.history.redo().is_some();
        if moved {
            self.write_tab();
        }
        moved
    }

    /// Fields that differ from the loaded project.
    pub fn pending_changes(&self) -> ProjectPatch {
        let current = self.history.current();
        let mut patch = ProjectPatch::default();
        if current.title != self.project.title {
            patch.title = Some(current.title.clone());
        }
        if current.description != self.project.description.as_deref().unwrap_or_default() {
            patch.description = Some(current.description.clone());
        }
        patch
    }

    /// Send changed fields. Returns `false` without a request if nothing
    /// changed.
    pub fn save(&mut self, api: &dyn ProjectApi) -> Result<bool> {
        let patch = self.pending_changes();
        if patch.is_empty() {
            return Ok(false);
        }
        if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(DeskError::user_input("Project title cannot be empty."));
        }
        let updated = api.update_project(&self.project.id, &patch)?;
        tracing::debug!(id = %updated.id, "project saved");
        self.project = updated;
        Ok(true)
    }

    fn apply(&mut self, next: Snapshot) {
        if &next != self.history.current() {
            self.history.push(next);
        }
    }

    fn write_tab(&self) {
        if let Err(e) = self.session.set(PROJECT_TAB_KEY, self.tab().as_str()) {
            tracing::warn!(error = %e, "could not persist project tab");
        }
    }
}
