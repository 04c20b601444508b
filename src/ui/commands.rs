use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;

use super::app::{App, AuthIntent, InputMode, PendingAction, Screen};
use super::util::{format_amount, plural, split_description, split_trailing_amount};
use crate::backend::Backend;
use crate::models::{EntryDraft, EntryKind, ProjectDraft};

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &mut Backend) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit ProjCost", cmd_quit, r);
    register_command!("quit", "Quit ProjCost", cmd_quit, r);
    register_command!("d", "Go to Dashboard", cmd_dashboard, r);
    register_command!("dashboard", "Go to Dashboard", cmd_dashboard, r);
    register_command!("p", "Go to Projects", cmd_projects, r);
    register_command!("projects", "Go to Projects", cmd_projects, r);
    register_command!("h", "Show available commands", cmd_help, r);
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!(
        "login",
        "Sign in (e.g. :login ada@example.com)",
        cmd_login,
        r
    );
    register_command!(
        "register",
        "Create an account (e.g. :register ada@example.com)",
        cmd_register,
        r
    );
    register_command!("logout", "Sign out", cmd_logout, r);
    register_command!(
        "project",
        "Create project (e.g. :project Kitchen | Full remodel)",
        cmd_project,
        r
    );
    register_command!(
        "rename-project",
        "Rename project (e.g. :rename-project Kitchen v2 | notes)",
        cmd_rename_project,
        r
    );
    register_command!(
        "delete-project",
        "Delete the selected project",
        cmd_delete_project,
        r
    );
    register_command!(
        "select",
        "Switch active project (e.g. :select Kitchen)",
        cmd_select,
        r
    );
    register_command!(
        "add-item",
        "Add item (e.g. :add-item Cabinet 300)",
        cmd_add_item,
        r
    );
    register_command!(
        "add-cost",
        "Add cost (e.g. :add-cost Labor 124.50)",
        cmd_add_cost,
        r
    );
    register_command!(
        "edit",
        "Update selected entry (e.g. :edit Cabinet 320)",
        cmd_edit,
        r
    );
    register_command!("delete", "Delete selected entry", cmd_delete, r);
    register_command!(
        "export",
        "Export active project to CSV (e.g. :export ~/kitchen.csv)",
        cmd_export,
        r
    );
    register_command!("r", "Reload projects and entries", cmd_refresh, r);
    register_command!("refresh", "Reload projects and entries", cmd_refresh, r);
    register_command!(
        "orphans",
        "Count entries of deleted projects (:orphans purge removes them)",
        cmd_orphans,
        r
    );

    r
});

/// Run a `:` command. Failures land on the status line; the app keeps going.
pub(crate) fn handle_command(input: &str, app: &mut App, backend: &mut Backend) {
    let trimmed = input.trim().trim_start_matches(':');
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if cmd_name.is_empty() {
        return;
    }

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        if let Err(e) = (cmd.run)(args, app, backend) {
            log::warn!("event=command status=failed name={cmd_name} error={e:#}");
            app.set_error(format!("{e:#}"));
        }
        app.refresh(backend);
    } else {
        let suggestion = find_closest(cmd_name);
        app.set_error(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }
}

/// Finish a `:login` / `:register` once the password has been typed.
pub(crate) fn submit_password(app: &mut App, backend: &mut Backend) {
    let password = std::mem::take(&mut app.password_input);
    app.input_mode = InputMode::Normal;
    let Some(prompt) = app.password_prompt.take() else {
        return;
    };

    let result = match prompt.intent {
        AuthIntent::SignIn => backend.identity.sign_in(&prompt.email, &password),
        AuthIntent::Register => backend.identity.register(&prompt.email, &password),
    };
    match result {
        Ok(principal) => {
            app.screen = Screen::Dashboard;
            match backend.sync() {
                Ok(()) => app.set_status(format!("Signed in as {principal}")),
                Err(e) => app.set_error(format!("{e:#}")),
            }
        }
        Err(e) => app.set_error(e.to_string()),
    }
    app.refresh(backend);
}

/// Carry out the action the user just confirmed.
pub(crate) fn confirm_pending(app: &mut App, backend: &mut Backend) {
    let action = app.pending_action.take();
    app.input_mode = InputMode::Normal;
    app.confirm_message.clear();

    let result = match action {
        Some(PendingAction::DeleteProject { id, name }) => backend
            .session
            .remove_project(&id)
            .map(|()| format!("Deleted project: {name}")),
        Some(PendingAction::DeleteEntry { kind, id, label }) => backend
            .session
            .remove_entry(kind, &id)
            .map(|()| format!("Deleted {}: {label}", kind.as_str().to_lowercase())),
        None => return,
    };
    match result {
        Ok(msg) => app.set_status(msg),
        Err(e) => app.set_error(e.to_string()),
    }
    app.refresh(backend);
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 1) // skip single-letter aliases for suggestions
        .min_by_key(|k| levenshtein(input, k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _backend: &mut Backend) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_dashboard(_args: &str, app: &mut App, _backend: &mut Backend) -> anyhow::Result<()> {
    app.screen = Screen::Dashboard;
    Ok(())
}

fn cmd_projects(_args: &str, app: &mut App, _backend: &mut Backend) -> anyhow::Result<()> {
    app.screen = Screen::Projects;
    Ok(())
}

fn cmd_help(_args: &str, app: &mut App, _backend: &mut Backend) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

fn cmd_login(args: &str, app: &mut App, _backend: &mut Backend) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status("Usage: :login <email>");
        return Ok(());
    }
    app.prompt_password(AuthIntent::SignIn, args.to_string());
    Ok(())
}

fn cmd_register(args: &str, app: &mut App, _backend: &mut Backend) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status("Usage: :register <email>");
        return Ok(());
    }
    app.prompt_password(AuthIntent::Register, args.to_string());
    Ok(())
}

fn cmd_logout(_args: &str, app: &mut App, backend: &mut Backend) -> anyhow::Result<()> {
    backend.identity.sign_out()?;
    backend.sync()?;
    app.screen = Screen::Dashboard;
    app.set_status("Logged out successfully");
    Ok(())
}

fn cmd_project(args: &str, app: &mut App, backend: &mut Backend) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status("Usage: :project <name> [| description]");
        return Ok(());
    }
    let (name, description) = split_description(args);
    let draft = ProjectDraft::parse(name, description.unwrap_or(""))?;
    let project = backend.session.create_project(draft)?;
    app.project_cursor.top();
    app.set_status(format!("Created project: {}", project.name));
    Ok(())
}

fn cmd_rename_project(args: &str, app: &mut App, backend: &mut Backend) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status("Usage: :rename-project <name> [| description]");
        return Ok(());
    }
    let Some(target) = app.target_project().cloned() else {
        app.set_status("No project selected");
        return Ok(());
    };
    let (name, description) = split_description(args);
    let draft = ProjectDraft::parse(name, description.unwrap_or(&target.description))?;
    let new_name = draft.name.clone();
    backend.session.rename_project(&target.id, draft)?;
    app.set_status(format!("Renamed '{}' to '{new_name}'", target.name));
    Ok(())
}

fn cmd_delete_project(_args: &str, app: &mut App, _backend: &mut Backend) -> anyhow::Result<()> {
    let Some(target) = app.target_project().cloned() else {
        app.set_status("No project selected");
        return Ok(());
    };
    app.confirm(
        format!("Delete project '{}'? Its items and costs are kept", target.name),
        PendingAction::DeleteProject {
            id: target.id,
            name: target.name,
        },
    );
    Ok(())
}

fn cmd_select(args: &str, app: &mut App, backend: &mut Backend) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status("Usage: :select <project name or id>");
        return Ok(());
    }
    backend.session.select_project(args)?;
    if let Some(active) = backend.session.active_project() {
        if let Some(pos) = backend.session.projects().iter().position(|p| p.id == active.id) {
            app.project_cursor.jump(pos);
        }
        app.set_status(format!("Active project: {}", active.name));
    }
    Ok(())
}

fn cmd_add_item(args: &str, app: &mut App, backend: &mut Backend) -> anyhow::Result<()> {
    add_entry(EntryKind::Item, args, app, backend)
}

fn cmd_add_cost(args: &str, app: &mut App, backend: &mut Backend) -> anyhow::Result<()> {
    add_entry(EntryKind::Cost, args, app, backend)
}

fn add_entry(
    kind: EntryKind,
    args: &str,
    app: &mut App,
    backend: &mut Backend,
) -> anyhow::Result<()> {
    let Some((label, amount)) = split_trailing_amount(args) else {
        app.set_status(format!(
            "Usage: :add-{} <{}> <amount>",
            kind.as_str().to_lowercase(),
            kind.label_field()
        ));
        return Ok(());
    };
    let draft = EntryDraft::parse(kind, label, amount)?;
    let entry = backend.session.add_entry(kind, draft)?;
    app.focus = kind;
    app.set_status(format!(
        "Added {}: {} {}",
        kind.as_str().to_lowercase(),
        entry.label,
        format_amount(entry.magnitude, &app.currency)
    ));
    Ok(())
}

fn cmd_edit(args: &str, app: &mut App, backend: &mut Backend) -> anyhow::Result<()> {
    let Some(entry) = app.focused_entry().cloned() else {
        app.set_status("Select an item or cost on the Dashboard first");
        return Ok(());
    };
    let Some((label, amount)) = split_trailing_amount(args) else {
        app.set_status(format!(
            "Usage: :edit <{}> <amount>",
            entry.kind.label_field()
        ));
        return Ok(());
    };
    let draft = EntryDraft::parse(entry.kind, label, amount)?;
    backend.session.update_entry(entry.kind, &entry.id, draft)?;
    app.set_status(format!("Updated {}: {label}", entry.kind.as_str().to_lowercase()));
    Ok(())
}

fn cmd_delete(_args: &str, app: &mut App, backend: &mut Backend) -> anyhow::Result<()> {
    if app.screen == Screen::Projects {
        return cmd_delete_project("", app, backend);
    }
    let Some(entry) = app.focused_entry().cloned() else {
        app.set_status("Select an item or cost on the Dashboard first");
        return Ok(());
    };
    app.confirm(
        format!("Delete {} '{}'?", entry.kind.as_str().to_lowercase(), entry.label),
        PendingAction::DeleteEntry {
            kind: entry.kind,
            id: entry.id,
            label: entry.label,
        },
    );
    Ok(())
}

fn cmd_export(args: &str, app: &mut App, _backend: &mut Backend) -> anyhow::Result<()> {
    let Some(project) = app.active_project.as_ref() else {
        app.set_status("No active project to export");
        return Ok(());
    };
    let path = if args.is_empty() {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        PathBuf::from(home).join(crate::export::default_file_name(&project.name))
    } else {
        PathBuf::from(crate::run::shellexpand(args))
    };

    let rows = crate::export::write_csv(&path, &app.items, &app.costs)?;
    app.set_status(format!(
        "Exported {} to {}",
        plural(rows, "entry row"),
        path.display()
    ));
    Ok(())
}

fn cmd_refresh(_args: &str, app: &mut App, backend: &mut Backend) -> anyhow::Result<()> {
    backend.session.refresh_projects()?;
    app.set_status("Reloaded");
    Ok(())
}

fn cmd_orphans(args: &str, app: &mut App, backend: &mut Backend) -> anyhow::Result<()> {
    if args == "purge" {
        let mut removed = 0;
        for &kind in EntryKind::all() {
            removed += backend.session.purge_orphans(kind)?;
        }
        app.set_status(format!("Purged {removed} orphaned entries"));
        return Ok(());
    }
    let items = backend.session.orphaned_entries(EntryKind::Item)?.len();
    let costs = backend.session.orphaned_entries(EntryKind::Cost)?.len();
    app.set_status(format!(
        "{} and {} belong to deleted projects",
        plural(items, "item"),
        plural(costs, "cost")
    ));
    Ok(())
}
