use chrono::{Local, SubsecRound, Utc};

use crate::error::{SessionError, StoreError};
use crate::models::{field, Principal, Project, ProjectDraft};
use crate::store::{Collection, Direction, DocumentStore, Query, Value};

/// The current principal's projects, newest first, plus the active pointer.
#[derive(Debug, Default)]
pub(crate) struct ProjectRegistry {
    projects: Vec<Project>,
    active: Option<String>,
}

impl ProjectRegistry {
    pub(crate) fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub(crate) fn active(&self) -> Option<&Project> {
        let id = self.active.as_deref()?;
        self.projects.iter().find(|p| p.id == id)
    }

    pub(crate) fn active_id(&self) -> Option<String> {
        self.active().map(|p| p.id.clone())
    }

    /// Refetch the principal's projects. Selects the newest one when nothing
    /// (or nothing that still exists) is active.
    pub(crate) fn list(
        &mut self,
        store: &impl DocumentStore,
        principal: &Principal,
    ) -> Result<(), StoreError> {
        let query = Query::new()
            .where_eq(field::USER_ID, principal.uid.as_str())
            .order_by(field::CREATED_AT, Direction::Descending);
        let projects = store
            .query(Collection::Projects, &query)?
            .iter()
            .map(Project::from_document)
            .collect::<Result<Vec<_>, _>>()?;

        self.projects = projects;
        self.select_first_if_none();
        Ok(())
    }

    /// Create a project owned by `principal` and make it active.
    pub(crate) fn create(
        &mut self,
        store: &mut impl DocumentStore,
        principal: Option<&Principal>,
        draft: ProjectDraft,
    ) -> Result<Project, SessionError> {
        let principal = principal.ok_or(SessionError::NotSignedIn)?;
        // Stored timestamps keep microseconds
        let now = Utc::now().trunc_subsecs(6);

        let mut fields = draft.clone().into_fields();
        fields.insert(field::USER_ID.into(), Value::from(principal.uid.as_str()));
        fields.insert(field::CREATED_AT.into(), Value::from(now));
        let id = store.add(Collection::Projects, fields)?;

        let project = Project {
            id,
            name: draft.name,
            description: draft.description,
            owner_id: principal.uid.clone(),
            created_at: now.with_timezone(&Local),
        };
        self.projects.insert(0, project.clone());
        self.active = Some(project.id.clone());
        Ok(project)
    }

    /// Overwrite name and description.
    pub(crate) fn rename(
        &mut self,
        store: &mut impl DocumentStore,
        id: &str,
        draft: ProjectDraft,
    ) -> Result<(), StoreError> {
        let mut fields = draft.clone().into_fields();
        fields.insert(field::UPDATED_AT.into(), Value::from(Utc::now().trunc_subsecs(6)));
        store.update(Collection::Projects, id, fields)?;

        if let Some(project) = self.projects.iter_mut().find(|p| p.id == id) {
            project.name = draft.name;
            project.description = draft.description;
        }
        Ok(())
    }

    /// Delete the project document. Its items and costs are left in place.
    pub(crate) fn remove(&mut self, store: &mut impl DocumentStore, id: &str) -> Result<(), StoreError> {
        store.delete(Collection::Projects, id)?;
        self.projects.retain(|p| p.id != id);
        self.select_first_if_none();
        Ok(())
    }

    pub(crate) fn select(&mut self, id: &str) -> Result<(), SessionError> {
        if !self.projects.iter().any(|p| p.id == id) {
            return Err(SessionError::UnknownProject(id.to_string()));
        }
        self.active = Some(id.to_string());
        Ok(())
    }

    pub(crate) fn clear(&mut self) {
        self.projects.clear();
        self.active = None;
    }

    fn select_first_if_none(&mut self) {
        if self.active().is_none() {
            self.active = self.projects.first().map(|p| p.id.clone());
        }
    }
}
