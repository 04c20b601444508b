//! Session-scoped state: the mirrored principal, the project registry and
//! the two entry registries for the active project.
//!
//! A `Session` is the single consumer of identity events. Every registry is
//! re-derived from the store on demand; nothing is cached across sessions.

mod entries;
mod projects;

use std::collections::HashSet;

use crate::auth::{SessionEvent, Subscription};
use crate::error::SessionError;
use crate::models::{field, Entry, EntryDraft, EntryKind, Principal, Project, ProjectDraft, Summary};
use crate::store::{Collection, DocumentStore, Query};
use entries::EntryRegistry;
use projects::ProjectRegistry;

pub(crate) struct Session<S: DocumentStore> {
    store: S,
    subscription: Subscription,
    principal: Option<Principal>,
    projects: ProjectRegistry,
    items: EntryRegistry,
    costs: EntryRegistry,
}

impl<S: DocumentStore> Session<S> {
    pub(crate) fn new(store: S, subscription: Subscription) -> Self {
        Self {
            store,
            subscription,
            principal: None,
            projects: ProjectRegistry::default(),
            items: EntryRegistry::new(EntryKind::Item),
            costs: EntryRegistry::new(EntryKind::Cost),
        }
    }

    /// Apply every identity change delivered since the last call.
    ///
    /// All pending events are applied even if one of the refetches fails;
    /// the last failure is returned.
    pub(crate) fn sync_identity(&mut self) -> Result<(), SessionError> {
        let mut result = Ok(());
        for event in self.subscription.drain() {
            if let Err(e) = self.apply(event) {
                result = Err(e);
            }
        }
        result
    }

    fn apply(&mut self, event: SessionEvent) -> Result<(), SessionError> {
        match event {
            SessionEvent::SignedIn(principal) => {
                log::info!("event=session_identity state=signed_in uid={}", principal.uid);
                if self.principal.as_ref() != Some(&principal) {
                    self.reset();
                }
                self.principal = Some(principal);
                self.refresh_projects()
            }
            SessionEvent::SignedOut => {
                log::info!("event=session_identity state=signed_out");
                self.principal = None;
                self.reset();
                Ok(())
            }
        }
    }

    fn reset(&mut self) {
        self.projects.clear();
        self.items.clear();
        self.costs.clear();
    }

    pub(crate) fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    pub(crate) fn projects(&self) -> &[Project] {
        self.projects.projects()
    }

    pub(crate) fn active_project(&self) -> Option<&Project> {
        self.projects.active()
    }

    pub(crate) fn entries(&self, kind: EntryKind) -> &[Entry] {
        match kind {
            EntryKind::Item => self.items.entries(),
            EntryKind::Cost => self.costs.entries(),
        }
    }

    pub(crate) fn summary(&self) -> Summary {
        Summary::of(self.items.entries(), self.costs.entries())
    }

    // ── Projects ──────────────────────────────────────────────

    /// Refetch projects, then the entries of whichever project ends up active.
    pub(crate) fn refresh_projects(&mut self) -> Result<(), SessionError> {
        let principal = self.principal.as_ref().ok_or(SessionError::NotSignedIn)?;
        self.projects.list(&self.store, principal)?;
        log::debug!(
            "event=projects_fetch count={} active={:?}",
            self.projects.projects().len(),
            self.projects.active_id()
        );
        self.refresh_entries()
    }

    pub(crate) fn refresh_entries(&mut self) -> Result<(), SessionError> {
        match self.projects.active_id() {
            Some(id) => {
                self.items.list(&self.store, &id)?;
                self.costs.list(&self.store, &id)?;
            }
            None => {
                self.items.clear();
                self.costs.clear();
            }
        }
        Ok(())
    }

    /// Activate a listed project, looked up by id or by name.
    pub(crate) fn select_project(&mut self, key: &str) -> Result<(), SessionError> {
        let id = Project::find(self.projects.projects(), key)
            .map(|p| p.id.clone())
            .ok_or_else(|| SessionError::UnknownProject(key.to_string()))?;
        if self.projects.active_id().as_deref() == Some(id.as_str()) {
            return Ok(());
        }
        self.projects.select(&id)?;
        log::debug!("event=project_select id={id}");
        self.refresh_entries()
    }

    pub(crate) fn create_project(&mut self, draft: ProjectDraft) -> Result<Project, SessionError> {
        let project = self
            .projects
            .create(&mut self.store, self.principal.as_ref(), draft)?;
        log::info!("event=project_create status=ok id={}", project.id);
        self.refresh_entries()?;
        Ok(project)
    }

    pub(crate) fn rename_project(&mut self, id: &str, draft: ProjectDraft) -> Result<(), SessionError> {
        self.projects.rename(&mut self.store, id, draft)?;
        log::info!("event=project_rename status=ok id={id}");
        Ok(())
    }

    /// Delete a project. Its items and costs are NOT deleted; see
    /// [`Session::orphaned_entries`].
    pub(crate) fn remove_project(&mut self, id: &str) -> Result<(), SessionError> {
        let before = self.projects.active_id();
        self.projects.remove(&mut self.store, id)?;
        log::info!("event=project_delete status=ok id={id}");
        if self.projects.active_id() != before {
            self.refresh_entries()?;
        }
        Ok(())
    }

    // ── Entries ───────────────────────────────────────────────

    pub(crate) fn add_entry(&mut self, kind: EntryKind, draft: EntryDraft) -> Result<Entry, SessionError> {
        let project_id = self
            .projects
            .active_id()
            .ok_or(SessionError::NoActiveProject)?;
        let owner = self.principal.as_ref().ok_or(SessionError::NotSignedIn)?;
        let registry = match kind {
            EntryKind::Item => &mut self.items,
            EntryKind::Cost => &mut self.costs,
        };
        let entry = registry.add(&mut self.store, &project_id, &owner.uid, draft)?;
        log::info!("event=entry_add status=ok kind={kind} id={} project={project_id}", entry.id);
        Ok(entry)
    }

    /// Only entries of the active project can be changed.
    pub(crate) fn update_entry(
        &mut self,
        kind: EntryKind,
        id: &str,
        draft: EntryDraft,
    ) -> Result<(), SessionError> {
        let registry = match kind {
            EntryKind::Item => &mut self.items,
            EntryKind::Cost => &mut self.costs,
        };
        registry.require(id)?;
        registry.update(&mut self.store, id, draft)?;
        log::info!("event=entry_update status=ok kind={kind} id={id}");
        Ok(())
    }

    pub(crate) fn remove_entry(&mut self, kind: EntryKind, id: &str) -> Result<(), SessionError> {
        let registry = match kind {
            EntryKind::Item => &mut self.items,
            EntryKind::Cost => &mut self.costs,
        };
        registry.require(id)?;
        registry.remove(&mut self.store, id)?;
        log::info!("event=entry_delete status=ok kind={kind} id={id}");
        Ok(())
    }

    // ── Orphans ───────────────────────────────────────────────

    /// The principal's entries whose project document no longer exists.
    pub(crate) fn orphaned_entries(&self, kind: EntryKind) -> Result<Vec<Entry>, SessionError> {
        let principal = self.principal.as_ref().ok_or(SessionError::NotSignedIn)?;
        let owned = Query::new().where_eq(field::USER_ID, principal.uid.as_str());
        let live: HashSet<String> = self
            .store
            .query(Collection::Projects, &owned)?
            .into_iter()
            .map(|doc| doc.id)
            .collect();

        let orphans = self
            .store
            .query(kind.collection(), &owned)?
            .iter()
            .filter(|doc| {
                doc.text(field::PROJECT_ID)
                    .map(|pid| !live.contains(pid))
                    .unwrap_or(false)
            })
            .map(|doc| Entry::from_document(kind, doc))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(orphans)
    }

    /// Delete orphaned entries of `kind`. Returns how many were removed.
    pub(crate) fn purge_orphans(&mut self, kind: EntryKind) -> Result<usize, SessionError> {
        let orphans = self.orphaned_entries(kind)?;
        for entry in &orphans {
            self.store.delete(kind.collection(), &entry.id)?;
        }
        log::info!("event=orphans_purge status=ok kind={kind} count={}", orphans.len());
        Ok(orphans.len())
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &S {
        &self.store
    }
}
