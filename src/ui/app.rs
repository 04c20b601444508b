use crate::backend::Backend;
use crate::models::{Entry, EntryKind, Principal, Project, Summary};
use crate::ui::util::ListCursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Dashboard,
    Projects,
}

impl Screen {
    pub(crate) fn all() -> &'static [Screen] {
        &[Self::Dashboard, Self::Projects]
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dashboard => write!(f, "Dashboard"),
            Self::Projects => write!(f, "Projects"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    Password,
    Confirm,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::Password => write!(f, "PASSWORD"),
            Self::Confirm => write!(f, "CONFIRM"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AuthIntent {
    SignIn,
    Register,
}

/// An email waiting for its password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PasswordPrompt {
    pub(crate) intent: AuthIntent,
    pub(crate) email: String,
}

/// Pending action that requires user confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PendingAction {
    DeleteProject { id: String, name: String },
    DeleteEntry { kind: EntryKind, id: String, label: String },
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) password_input: String,
    pub(crate) status_message: String,
    pub(crate) status_is_error: bool,
    pub(crate) show_help: bool,
    pub(crate) currency: String,

    // Mirror of the session, copied on every refresh
    pub(crate) principal: Option<Principal>,
    pub(crate) projects: Vec<Project>,
    pub(crate) active_project: Option<Project>,
    pub(crate) items: Vec<Entry>,
    pub(crate) costs: Vec<Entry>,
    pub(crate) summary: Summary,

    // Projects
    pub(crate) project_cursor: ListCursor,

    // Dashboard
    pub(crate) focus: EntryKind,
    pub(crate) item_cursor: ListCursor,
    pub(crate) cost_cursor: ListCursor,

    // Prompts
    pub(crate) password_prompt: Option<PasswordPrompt>,
    pub(crate) pending_action: Option<PendingAction>,
    pub(crate) confirm_message: String,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new(currency: impl Into<String>) -> Self {
        Self {
            running: true,
            screen: Screen::Dashboard,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            password_input: String::new(),
            status_message: String::new(),
            status_is_error: false,
            show_help: false,
            currency: currency.into(),

            principal: None,
            projects: Vec::new(),
            active_project: None,
            items: Vec::new(),
            costs: Vec::new(),
            summary: Summary::default(),

            project_cursor: ListCursor::default(),

            focus: EntryKind::Item,
            item_cursor: ListCursor::default(),
            cost_cursor: ListCursor::default(),

            password_prompt: None,
            pending_action: None,
            confirm_message: String::new(),

            visible_rows: 20,
        }
    }

    /// Copy the session's current view into the app and keep cursors in range.
    pub(crate) fn refresh(&mut self, backend: &Backend) {
        let session = &backend.session;
        let switched = self.active_project.as_ref().map(|p| &p.id)
            != session.active_project().map(|p| &p.id);

        self.principal = session.principal().cloned();
        self.projects = session.projects().to_vec();
        self.active_project = session.active_project().cloned();
        self.items = session.entries(EntryKind::Item).to_vec();
        self.costs = session.entries(EntryKind::Cost).to_vec();
        self.summary = session.summary();

        if switched {
            self.item_cursor.top();
            self.cost_cursor.top();
        }
        self.project_cursor.clamp(self.projects.len());
        self.item_cursor.clamp(self.items.len());
        self.cost_cursor.clamp(self.costs.len());
    }

    pub(crate) fn entries(&self, kind: EntryKind) -> &[Entry] {
        match kind {
            EntryKind::Item => &self.items,
            EntryKind::Cost => &self.costs,
        }
    }

    pub(crate) fn cursor(&self, kind: EntryKind) -> ListCursor {
        match kind {
            EntryKind::Item => self.item_cursor,
            EntryKind::Cost => self.cost_cursor,
        }
    }

    pub(crate) fn cursor_mut(&mut self, kind: EntryKind) -> &mut ListCursor {
        match kind {
            EntryKind::Item => &mut self.item_cursor,
            EntryKind::Cost => &mut self.cost_cursor,
        }
    }

    /// The entry under the cursor in the focused table.
    pub(crate) fn focused_entry(&self) -> Option<&Entry> {
        self.entries(self.focus).get(self.cursor(self.focus).index)
    }

    /// The project under the cursor on the Projects screen.
    pub(crate) fn selected_project(&self) -> Option<&Project> {
        self.projects.get(self.project_cursor.index)
    }

    /// The project a project-level command applies to: the cursor row on
    /// the Projects screen, the active project everywhere else.
    pub(crate) fn target_project(&self) -> Option<&Project> {
        match self.screen {
            Screen::Projects => self.selected_project(),
            Screen::Dashboard => self.active_project.as_ref(),
        }
    }

    pub(crate) fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            EntryKind::Item => EntryKind::Cost,
            EntryKind::Cost => EntryKind::Item,
        };
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
        self.status_is_error = false;
    }

    pub(crate) fn set_error(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
        self.status_is_error = true;
    }

    pub(crate) fn confirm(&mut self, message: String, action: PendingAction) {
        self.confirm_message = message;
        self.pending_action = Some(action);
        self.input_mode = InputMode::Confirm;
    }

    pub(crate) fn prompt_password(&mut self, intent: AuthIntent, email: String) {
        self.password_prompt = Some(PasswordPrompt { intent, email });
        self.password_input.clear();
        self.input_mode = InputMode::Password;
    }

    pub(crate) fn cancel_prompts(&mut self) {
        self.password_prompt = None;
        self.password_input.clear();
        self.pending_action = None;
        self.confirm_message.clear();
        self.input_mode = InputMode::Normal;
    }
}
