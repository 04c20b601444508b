use anyhow::{bail, Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use crate::backend::Backend;
use crate::models::{EntryDraft, EntryKind, ProjectDraft};
use crate::ui::util::{format_amount, plural};

pub(crate) fn as_cli(args: &[String], backend: &mut Backend, currency: &str) -> Result<()> {
    let rest = &args[2..];
    match args[1].as_str() {
        "register" => cli_register(rest, backend),
        "login" => cli_login(rest, backend),
        "logout" => cli_logout(backend),
        "whoami" => cli_whoami(backend),
        "projects" => cli_projects(backend),
        "project-new" => cli_project_new(rest, backend),
        "project-rename" => cli_project_rename(rest, backend),
        "project-delete" => cli_project_delete(rest, backend),
        "items" => cli_entries(EntryKind::Item, rest, backend, currency),
        "costs" => cli_entries(EntryKind::Cost, rest, backend, currency),
        "add-item" => cli_add(EntryKind::Item, rest, backend, currency),
        "add-cost" => cli_add(EntryKind::Cost, rest, backend, currency),
        "update-item" => cli_update(EntryKind::Item, rest, backend),
        "update-cost" => cli_update(EntryKind::Cost, rest, backend),
        "delete-item" => cli_delete(EntryKind::Item, rest, backend),
        "delete-cost" => cli_delete(EntryKind::Cost, rest, backend),
        "summary" | "s" => cli_summary(rest, backend, currency),
        "export" => cli_export(rest, backend),
        "orphans" => cli_orphans(rest, backend, currency),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("projcost {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("ProjCost - track what your projects cost");
    println!();
    println!("Usage: projcost [command]");
    println!();
    println!("Commands:");
    println!("  (none)                              Launch interactive TUI");
    println!("  register <email>                    Create an account and sign in");
    println!("  login <email>                       Sign in");
    println!("  logout                              Sign out");
    println!("  whoami                              Show the signed-in account");
    println!("  projects                            List projects (* marks the active one)");
    println!("  project-new <name>                  Create a project");
    println!("  project-rename <project> <name>     Rename a project");
    println!("    --description <text>              Set the description (new/rename)");
    println!("  project-delete <project>            Delete a project (its entries are kept)");
    println!("  items | costs                       List entries of a project");
    println!("  add-item <name> <cost>              Add an item");
    println!("  add-cost <description> <amount>     Add a cost");
    println!("  update-item <id> <name> <cost>      Update an item");
    println!("  update-cost <id> <desc> <amount>    Update a cost");
    println!("  delete-item <id> | delete-cost <id> Delete an entry");
    println!("  summary                             Print project totals");
    println!("  export [path]                       Export a project to CSV");
    println!("    --project <id|name>               Project to use (default: newest)");
    println!("  orphans [--purge]                   List entries of deleted projects");
    println!("  --help, -h                          Show this help");
    println!("  --version, -V                       Show version");
    println!();
    println!("Passwords are read from the terminal, or from stdin when piped.");
}

// ── Argument helpers ─────────────────────────────────────────

const VALUE_FLAGS: &[&str] = &["--project", "--description"];

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

/// Arguments that are neither flags nor flag values.
fn positional(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if VALUE_FLAGS.contains(&arg.as_str()) {
            iter.next();
        } else if !arg.starts_with("--") {
            out.push(arg.as_str());
        }
    }
    out
}

fn use_project(args: &[String], backend: &mut Backend) -> Result<()> {
    if let Some(key) = flag_value(args, "--project") {
        backend.session.select_project(key)?;
    }
    Ok(())
}

fn read_password(prompt: &str) -> Result<String> {
    let stdin = io::stdin();
    if !stdin.is_terminal() {
        let mut line = String::new();
        stdin
            .lock()
            .read_line(&mut line)
            .context("Failed to read password from stdin")?;
        return Ok(line.trim_end_matches(['\r', '\n']).to_string());
    }

    eprint!("{prompt}");
    io::stderr().flush()?;
    enable_raw_mode()?;
    let result = read_masked();
    disable_raw_mode()?;
    eprintln!();
    result
}

fn read_masked() -> Result<String> {
    let mut password = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Enter => return Ok(password),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                bail!("Cancelled")
            }
            KeyCode::Esc => bail!("Cancelled"),
            KeyCode::Backspace => {
                if password.pop().is_some() {
                    eprint!("\u{8} \u{8}");
                }
            }
            KeyCode::Char(c) => {
                password.push(c);
                eprint!("*");
            }
            _ => {}
        }
        io::stderr().flush()?;
    }
}

// ── Identity ─────────────────────────────────────────────────

fn cli_register(args: &[String], backend: &mut Backend) -> Result<()> {
    let Some(email) = args.first() else {
        bail!("Usage: projcost register <email>");
    };
    let password = read_password("Password: ")?;
    let principal = backend.identity.register(email, &password)?;
    backend.sync()?;
    println!("Registered and signed in as {principal}");
    Ok(())
}

fn cli_login(args: &[String], backend: &mut Backend) -> Result<()> {
    let Some(email) = args.first() else {
        bail!("Usage: projcost login <email>");
    };
    let password = read_password("Password: ")?;
    let principal = backend.identity.sign_in(email, &password)?;
    backend.sync()?;
    println!("Signed in as {principal}");
    Ok(())
}

fn cli_logout(backend: &mut Backend) -> Result<()> {
    backend.identity.sign_out()?;
    backend.sync()?;
    println!("Logged out successfully");
    Ok(())
}

fn cli_whoami(backend: &Backend) -> Result<()> {
    match backend.session.principal() {
        Some(p) => println!("{} ({})", p.email, p.uid),
        None => println!("Not signed in"),
    }
    Ok(())
}

// ── Projects ─────────────────────────────────────────────────

fn cli_projects(backend: &Backend) -> Result<()> {
    let projects = backend.session.projects();
    if projects.is_empty() {
        println!("No projects");
        return Ok(());
    }
    let active = backend.session.active_project().map(|p| p.id.as_str());

    println!("  {:<32} {:<24} {:<16} Description", "ID", "Name", "Created");
    println!("{}", "─".repeat(90));
    for p in projects {
        let marker = if Some(p.id.as_str()) == active { "*" } else { " " };
        println!(
            "{marker} {:<32} {:<24} {:<16} {}",
            p.id,
            p.name,
            p.created_at.format("%Y-%m-%d %H:%M"),
            p.description
        );
    }
    Ok(())
}

fn cli_project_new(args: &[String], backend: &mut Backend) -> Result<()> {
    let name = positional(args).join(" ");
    if name.is_empty() {
        bail!("Usage: projcost project-new <name> [--description <text>]");
    }
    let description = flag_value(args, "--description").unwrap_or("");
    let project = backend
        .session
        .create_project(ProjectDraft::parse(&name, description)?)?;
    println!("Created project {} ({})", project.name, project.id);
    Ok(())
}

fn cli_project_rename(args: &[String], backend: &mut Backend) -> Result<()> {
    let pos = positional(args);
    let Some((key, name)) = pos.split_first().filter(|(_, rest)| !rest.is_empty()) else {
        bail!("Usage: projcost project-rename <project> <new name> [--description <text>]");
    };
    backend.session.select_project(key)?;
    let Some(project) = backend.session.active_project().cloned() else {
        bail!("unknown project: {key}");
    };
    let description = flag_value(args, "--description").unwrap_or(&project.description);
    let draft = ProjectDraft::parse(&name.join(" "), description)?;
    let new_name = draft.name.clone();
    backend.session.rename_project(&project.id, draft)?;
    println!("Renamed '{}' to '{new_name}'", project.name);
    Ok(())
}

fn cli_project_delete(args: &[String], backend: &mut Backend) -> Result<()> {
    let Some(key) = positional(args).first().copied() else {
        bail!("Usage: projcost project-delete <project>");
    };
    backend.session.select_project(key)?;
    let Some(project) = backend.session.active_project().cloned() else {
        bail!("unknown project: {key}");
    };
    let items = backend.session.entries(EntryKind::Item).len();
    let costs = backend.session.entries(EntryKind::Cost).len();
    backend.session.remove_project(&project.id)?;
    println!("Deleted project {}", project.name);
    if items + costs > 0 {
        println!(
            "Kept {} and {}; see `projcost orphans`",
            plural(items, "item"),
            plural(costs, "cost")
        );
    }
    Ok(())
}

// ── Entries ──────────────────────────────────────────────────

fn cli_entries(
    kind: EntryKind,
    args: &[String],
    backend: &mut Backend,
    currency: &str,
) -> Result<()> {
    use_project(args, backend)?;
    let Some(project) = backend.session.active_project() else {
        bail!("no active project");
    };
    let entries = backend.session.entries(kind);
    println!("{} - {}", project.name, plural(entries.len(), &kind.as_str().to_lowercase()));
    for e in entries {
        println!(
            "  {:<32} {:<32} {:>14}",
            e.id,
            e.label,
            format_amount(e.magnitude, currency)
        );
    }
    Ok(())
}

/// `<label...> <amount>`: the last positional is the amount.
fn label_and_amount<'a>(pos: &[&'a str]) -> Option<(String, &'a str)> {
    let (amount, label) = pos.split_last()?;
    if label.is_empty() {
        return None;
    }
    Some((label.join(" "), *amount))
}

fn cli_add(kind: EntryKind, args: &[String], backend: &mut Backend, currency: &str) -> Result<()> {
    let Some((label, amount)) = label_and_amount(&positional(args)) else {
        bail!(
            "Usage: projcost add-{} <{}> <amount> [--project <id|name>]",
            kind.as_str().to_lowercase(),
            kind.label_field()
        );
    };
    let draft = EntryDraft::parse(kind, &label, amount)?;
    use_project(args, backend)?;
    let entry = backend.session.add_entry(kind, draft)?;
    println!(
        "Added {} {} {} ({})",
        kind.as_str().to_lowercase(),
        entry.label,
        format_amount(entry.magnitude, currency),
        entry.id
    );
    Ok(())
}

fn cli_update(kind: EntryKind, args: &[String], backend: &mut Backend) -> Result<()> {
    let pos = positional(args);
    let parsed = pos
        .split_first()
        .and_then(|(id, rest)| label_and_amount(rest).map(|(label, amount)| (*id, label, amount)));
    let Some((id, label, amount)) = parsed else {
        bail!(
            "Usage: projcost update-{} <id> <{}> <amount> [--project <id|name>]",
            kind.as_str().to_lowercase(),
            kind.label_field()
        );
    };
    let draft = EntryDraft::parse(kind, &label, amount)?;
    use_project(args, backend)?;
    backend.session.update_entry(kind, id, draft)?;
    println!("Updated {} {id}", kind.as_str().to_lowercase());
    Ok(())
}

fn cli_delete(kind: EntryKind, args: &[String], backend: &mut Backend) -> Result<()> {
    let Some(id) = positional(args).first().copied() else {
        bail!(
            "Usage: projcost delete-{} <id> [--project <id|name>]",
            kind.as_str().to_lowercase()
        );
    };
    use_project(args, backend)?;
    backend.session.remove_entry(kind, id)?;
    println!("Deleted {} {id}", kind.as_str().to_lowercase());
    Ok(())
}

// ── Reports ──────────────────────────────────────────────────

fn cli_summary(args: &[String], backend: &mut Backend, currency: &str) -> Result<()> {
    use_project(args, backend)?;
    let Some(project) = backend.session.active_project() else {
        bail!("no active project");
    };
    let summary = backend.session.summary();

    println!("ProjCost - {}", project.name);
    println!("{}", "─".repeat(40));
    println!(
        "  Items:      {:>14}  ({})",
        format_amount(summary.items_total, currency),
        plural(summary.items_count, "item")
    );
    println!(
        "  Costs:      {:>14}  ({})",
        format_amount(summary.costs_total, currency),
        plural(summary.costs_count, "cost")
    );
    println!("  Total:      {:>14}", format_amount(summary.total(), currency));
    Ok(())
}

fn cli_export(args: &[String], backend: &mut Backend) -> Result<()> {
    use_project(args, backend)?;
    let Some(project) = backend.session.active_project() else {
        bail!("no active project");
    };

    let output_path = positional(args)
        .first()
        .map(|a| PathBuf::from(shellexpand(a)))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(crate::export::default_file_name(&project.name))
        });

    let rows = crate::export::write_csv(
        &output_path,
        backend.session.entries(EntryKind::Item),
        backend.session.entries(EntryKind::Cost),
    )?;
    println!(
        "Exported {} of {} to {}",
        plural(rows, "entry row"),
        project.name,
        output_path.display()
    );
    Ok(())
}

fn cli_orphans(args: &[String], backend: &mut Backend, currency: &str) -> Result<()> {
    let purge = args.iter().any(|a| a == "--purge");
    for &kind in EntryKind::all() {
        let orphans = backend.session.orphaned_entries(kind)?;
        println!("{}: {}", kind, plural(orphans.len(), "orphan"));
        for e in &orphans {
            println!(
                "  {:<32} {:<32} {:>14}  (project {})",
                e.id,
                e.label,
                format_amount(e.magnitude, currency),
                e.project_id
            );
        }
        if purge && !orphans.is_empty() {
            let removed = backend.session.purge_orphans(kind)?;
            println!("  purged {removed}");
        }
    }
    Ok(())
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_positional_skips_flags_and_values() {
        let args = strings(&["Kitchen", "sink", "--project", "Bath", "120", "--purge"]);
        assert_eq!(positional(&args), vec!["Kitchen", "sink", "120"]);
        assert_eq!(flag_value(&args, "--project"), Some("Bath"));
        assert_eq!(flag_value(&args, "--description"), None);
    }

    #[test]
    fn test_label_and_amount() {
        assert_eq!(
            label_and_amount(&["Kitchen", "sink", "120.50"]),
            Some(("Kitchen sink".to_string(), "120.50"))
        );
        assert_eq!(label_and_amount(&["120"]), None);
        assert_eq!(label_and_amount(&[]), None);
    }

    #[test]
    fn test_shellexpand_home() {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        assert_eq!(shellexpand("~/out.csv"), format!("{home}/out.csv"));
        assert_eq!(shellexpand("/tmp/out.csv"), "/tmp/out.csv");
    }

    fn signed_in() -> Backend {
        let mut backend = Backend::open_in_memory().unwrap();
        backend
            .identity
            .register("ada@example.com", "secret1")
            .unwrap();
        backend.sync().unwrap();
        backend
    }

    #[test]
    fn test_add_with_project_flag() {
        let mut backend = signed_in();
        cli_project_new(&strings(&["Kitchen"]), &mut backend).unwrap();
        cli_project_new(&strings(&["Bath"]), &mut backend).unwrap();

        cli_add(
            EntryKind::Item,
            &strings(&["Cabinet", "300", "--project", "kitchen"]),
            &mut backend,
            "Rs",
        )
        .unwrap();
        assert_eq!(backend.session.active_project().unwrap().name, "Kitchen");
        assert_eq!(backend.session.entries(EntryKind::Item).len(), 1);
    }

    #[test]
    fn test_add_rejects_bad_amount_before_store() {
        let mut backend = signed_in();
        cli_project_new(&strings(&["Kitchen"]), &mut backend).unwrap();
        let err = cli_add(
            EntryKind::Cost,
            &strings(&["Labor", "lots"]),
            &mut backend,
            "Rs",
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "amount must be a number, got 'lots'");
        assert!(backend.session.entries(EntryKind::Cost).is_empty());
    }

    #[test]
    fn test_rename_keeps_description() {
        let mut backend = signed_in();
        cli_project_new(
            &strings(&["Kitchen", "--description", "Full remodel"]),
            &mut backend,
        )
        .unwrap();
        cli_project_rename(&strings(&["Kitchen", "Kitchen", "v2"]), &mut backend).unwrap();
        let active = backend.session.active_project().unwrap();
        assert_eq!(active.name, "Kitchen v2");
        assert_eq!(active.description, "Full remodel");
    }

    #[test]
    fn test_update_and_delete_by_id() {
        let mut backend = signed_in();
        cli_project_new(&strings(&["Kitchen"]), &mut backend).unwrap();
        cli_add(EntryKind::Item, &strings(&["Sink", "120"]), &mut backend, "Rs").unwrap();
        let id = backend.session.entries(EntryKind::Item)[0].id.clone();

        let args = strings(&[id.as_str(), "Steel", "sink", "150"]);
        cli_update(EntryKind::Item, &args, &mut backend).unwrap();
        let item = &backend.session.entries(EntryKind::Item)[0];
        assert_eq!(item.label, "Steel sink");
        assert_eq!(item.magnitude, rust_decimal::Decimal::from(150));

        cli_delete(EntryKind::Item, &strings(&[id.as_str()]), &mut backend).unwrap();
        assert!(backend.session.entries(EntryKind::Item).is_empty());
    }

    #[test]
    fn test_delete_project_leaves_orphans() {
        let mut backend = signed_in();
        cli_project_new(&strings(&["Kitchen"]), &mut backend).unwrap();
        cli_add(EntryKind::Cost, &strings(&["Labor", "124.50"]), &mut backend, "Rs").unwrap();
        cli_project_delete(&strings(&["Kitchen"]), &mut backend).unwrap();

        assert!(backend.session.projects().is_empty());
        assert_eq!(backend.session.orphaned_entries(EntryKind::Cost).unwrap().len(), 1);
        cli_orphans(&strings(&["--purge"]), &mut backend, "Rs").unwrap();
        assert!(backend.session.orphaned_entries(EntryKind::Cost).unwrap().is_empty());
    }

    fn switch_to_bob(backend: &mut Backend) {
        backend.identity.sign_out().unwrap();
        backend
            .identity
            .register("bob@example.com", "secret2")
            .unwrap();
        backend.sync().unwrap();
    }

    #[test]
    fn test_project_flag_only_finds_own_projects() {
        let mut backend = signed_in();
        cli_project_new(&strings(&["Kitchen"]), &mut backend).unwrap();
        let kitchen_id = backend.session.active_project().unwrap().id.clone();

        switch_to_bob(&mut backend);
        for key in ["Kitchen", kitchen_id.as_str()] {
            let err = cli_add(
                EntryKind::Item,
                &strings(&["Cabinet", "300", "--project", key]),
                &mut backend,
                "Rs",
            )
            .unwrap_err();
            assert_eq!(err.to_string(), format!("unknown project: {key}"));
        }
    }

    #[test]
    fn test_update_and_delete_reject_other_users_ids() {
        let mut backend = signed_in();
        cli_project_new(&strings(&["Kitchen"]), &mut backend).unwrap();
        cli_add(EntryKind::Item, &strings(&["Sink", "120"]), &mut backend, "Rs").unwrap();
        let id = backend.session.entries(EntryKind::Item)[0].id.clone();

        switch_to_bob(&mut backend);
        cli_project_new(&strings(&["Garage"]), &mut backend).unwrap();
        let err = cli_update(EntryKind::Item, &strings(&[id.as_str(), "Mine", "1"]), &mut backend)
            .unwrap_err();
        assert_eq!(err.to_string(), format!("unknown item: {id}"));
        let err = cli_delete(EntryKind::Item, &strings(&[id.as_str()]), &mut backend).unwrap_err();
        assert_eq!(err.to_string(), format!("unknown item: {id}"));
        cli_orphans(&strings(&["--purge"]), &mut backend, "Rs").unwrap();

        backend.identity.sign_out().unwrap();
        backend.identity.sign_in("ada@example.com", "secret1").unwrap();
        backend.sync().unwrap();
        let items = backend.session.entries(EntryKind::Item);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].label, "Sink");
    }

    #[test]
    fn test_commands_require_sign_in() {
        let mut backend = Backend::open_in_memory().unwrap();
        let err = cli_project_new(&strings(&["Kitchen"]), &mut backend).unwrap_err();
        assert_eq!(err.to_string(), "not signed in");
        let err = cli_summary(&[], &mut backend, "Rs").unwrap_err();
        assert_eq!(err.to_string(), "no active project");
    }
}
