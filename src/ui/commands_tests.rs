#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;

use super::app::{App, AuthIntent, InputMode, PendingAction, Screen};
use super::commands::{confirm_pending, handle_command, submit_password};
use super::util::format_amount;
use crate::backend::Backend;
use crate::models::EntryKind;

fn setup() -> (App, Backend) {
    let backend = Backend::open_in_memory().unwrap();
    let mut app = App::new("Rs");
    app.refresh(&backend);
    (app, backend)
}

fn run(app: &mut App, backend: &mut Backend, input: &str) {
    handle_command(input, app, backend);
}

fn signed_in() -> (App, Backend) {
    let (mut app, mut backend) = setup();
    run(&mut app, &mut backend, "register ada@example.com");
    app.password_input = "secret1".into();
    submit_password(&mut app, &mut backend);
    (app, backend)
}

fn with_project(name: &str) -> (App, Backend) {
    let (mut app, mut backend) = signed_in();
    run(&mut app, &mut backend, &format!("project {name}"));
    (app, backend)
}

// ── Registry ──────────────────────────────────────────────────

#[test]
fn test_unknown_command_suggests_closest() {
    let (mut app, mut backend) = setup();
    run(&mut app, &mut backend, "projcts");
    assert!(app.status_is_error);
    assert_eq!(
        app.status_message,
        "Unknown command: :projcts. Did you mean :projects?"
    );
}

#[test]
fn test_leading_colon_is_ignored() {
    let (mut app, mut backend) = setup();
    run(&mut app, &mut backend, ":projects");
    assert_eq!(app.screen, Screen::Projects);
}

#[test]
fn test_quit_stops_app() {
    let (mut app, mut backend) = setup();
    run(&mut app, &mut backend, "q");
    assert!(!app.running);
}

// ── Identity ──────────────────────────────────────────────────

#[test]
fn test_login_prompts_for_password() {
    let (mut app, mut backend) = setup();
    run(&mut app, &mut backend, "login ada@example.com");
    assert_eq!(app.input_mode, InputMode::Password);
    let prompt = app.password_prompt.as_ref().unwrap();
    assert_eq!(prompt.intent, AuthIntent::SignIn);
    assert_eq!(prompt.email, "ada@example.com");
    assert!(backend.identity.current().is_none());
}

#[test]
fn test_register_signs_in_and_mirrors_principal() {
    let (app, _backend) = signed_in();
    assert_eq!(app.input_mode, InputMode::Normal);
    assert_eq!(app.principal.as_ref().unwrap().email, "ada@example.com");
    assert_eq!(app.status_message, "Signed in as ada@example.com");
    assert!(app.password_input.is_empty());
}

#[test]
fn test_weak_password_shows_raw_message() {
    let (mut app, mut backend) = setup();
    run(&mut app, &mut backend, "register ada@example.com");
    app.password_input = "123".into();
    submit_password(&mut app, &mut backend);
    assert!(app.status_is_error);
    assert_eq!(app.status_message, "password should be at least 6 characters");
    assert!(app.principal.is_none());
}

#[test]
fn test_wrong_password_is_rejected() {
    let (mut app, mut backend) = signed_in();
    run(&mut app, &mut backend, "logout");
    run(&mut app, &mut backend, "login ada@example.com");
    app.password_input = "not-it".into();
    submit_password(&mut app, &mut backend);
    assert_eq!(app.status_message, "invalid email or password");
    assert!(app.principal.is_none());
}

#[test]
fn test_logout_clears_mirror() {
    let (mut app, mut backend) = with_project("Kitchen");
    run(&mut app, &mut backend, "add-item Cabinet 300");
    run(&mut app, &mut backend, "logout");
    assert_eq!(app.status_message, "Logged out successfully");
    assert!(app.principal.is_none());
    assert!(app.projects.is_empty());
    assert!(app.active_project.is_none());
    assert!(app.items.is_empty());
}

#[test]
fn test_login_again_restores_projects() {
    let (mut app, mut backend) = with_project("Kitchen");
    run(&mut app, &mut backend, "logout");
    run(&mut app, &mut backend, "login ada@example.com");
    app.password_input = "secret1".into();
    submit_password(&mut app, &mut backend);
    assert_eq!(app.active_project.as_ref().unwrap().name, "Kitchen");
}

// ── Projects ──────────────────────────────────────────────────

#[test]
fn test_project_requires_sign_in() {
    let (mut app, mut backend) = setup();
    run(&mut app, &mut backend, "project Kitchen");
    assert!(app.status_is_error);
    assert_eq!(app.status_message, "not signed in");
}

#[test]
fn test_project_creates_and_activates() {
    let (app, _backend) = with_project("Kitchen | Full remodel");
    let active = app.active_project.as_ref().unwrap();
    assert_eq!(active.name, "Kitchen");
    assert_eq!(active.description, "Full remodel");
    assert_eq!(app.status_message, "Created project: Kitchen");
}

#[test]
fn test_rename_keeps_description_when_omitted() {
    let (mut app, mut backend) = with_project("Kitchen | Full remodel");
    run(&mut app, &mut backend, "rename-project Kitchen v2");
    let active = app.active_project.as_ref().unwrap();
    assert_eq!(active.name, "Kitchen v2");
    assert_eq!(active.description, "Full remodel");
}

#[test]
fn test_rename_with_blank_name_is_rejected() {
    let (mut app, mut backend) = with_project("Kitchen");
    run(&mut app, &mut backend, "rename-project  | notes");
    assert!(app.status_is_error);
    assert_eq!(app.status_message, "project name is required");
    assert_eq!(app.active_project.as_ref().unwrap().name, "Kitchen");
}

#[test]
fn test_select_by_name_switches_entries() {
    let (mut app, mut backend) = with_project("Kitchen");
    run(&mut app, &mut backend, "add-item Cabinet 300");
    run(&mut app, &mut backend, "project Bath");
    assert!(app.items.is_empty());

    run(&mut app, &mut backend, "select kitchen");
    assert_eq!(app.active_project.as_ref().unwrap().name, "Kitchen");
    assert_eq!(app.items.len(), 1);
    assert_eq!(app.status_message, "Active project: Kitchen");
}

#[test]
fn test_select_unknown_project() {
    let (mut app, mut backend) = with_project("Kitchen");
    run(&mut app, &mut backend, "select Garage");
    assert_eq!(app.status_message, "unknown project: Garage");
}

#[test]
fn test_delete_project_needs_confirmation_and_keeps_entries() {
    let (mut app, mut backend) = with_project("Kitchen");
    run(&mut app, &mut backend, "add-item Cabinet 300");
    run(&mut app, &mut backend, "delete-project");
    assert_eq!(app.input_mode, InputMode::Confirm);
    assert!(matches!(
        app.pending_action,
        Some(PendingAction::DeleteProject { ref name, .. }) if name == "Kitchen"
    ));

    confirm_pending(&mut app, &mut backend);
    assert_eq!(app.input_mode, InputMode::Normal);
    assert!(app.projects.is_empty());
    assert_eq!(app.status_message, "Deleted project: Kitchen");

    run(&mut app, &mut backend, "orphans");
    assert_eq!(
        app.status_message,
        "1 item and 0 costs belong to deleted projects"
    );
    run(&mut app, &mut backend, "orphans purge");
    assert_eq!(app.status_message, "Purged 1 orphaned entries");
}

// ── Entries ───────────────────────────────────────────────────

#[test]
fn test_kitchen_total() {
    let (mut app, mut backend) = with_project("Kitchen");
    run(&mut app, &mut backend, "add-item Cabinet 300");
    run(&mut app, &mut backend, "add-item Sink 120.50");
    run(&mut app, &mut backend, "add-cost Labor 124.50");

    assert_eq!(app.summary.items_total, dec!(420.50));
    assert_eq!(app.summary.costs_total, dec!(124.50));
    assert_eq!(app.summary.total(), dec!(545.00));
    assert_eq!(format_amount(app.summary.total(), &app.currency), "Rs545.00");
    assert_eq!(app.focus, EntryKind::Cost);
}

#[test]
fn test_add_requires_active_project() {
    let (mut app, mut backend) = signed_in();
    run(&mut app, &mut backend, "add-item Cabinet 300");
    assert!(app.status_is_error);
    assert_eq!(app.status_message, "no active project");
}

#[test]
fn test_negative_amount_is_rejected() {
    let (mut app, mut backend) = with_project("Kitchen");
    run(&mut app, &mut backend, "add-cost Refund -5");
    assert_eq!(app.status_message, "amount must not be negative, got -5");
    assert!(app.costs.is_empty());
}

#[test]
fn test_add_without_amount_shows_usage() {
    let (mut app, mut backend) = with_project("Kitchen");
    run(&mut app, &mut backend, "add-cost Labor");
    assert!(!app.status_is_error);
    assert_eq!(app.status_message, "Usage: :add-cost <description> <amount>");
}

#[test]
fn test_edit_updates_focused_entry() {
    let (mut app, mut backend) = with_project("Kitchen");
    run(&mut app, &mut backend, "add-item Cabinet 300");
    run(&mut app, &mut backend, "add-item Sink 120");
    app.focus = EntryKind::Item;
    app.item_cursor.top();

    run(&mut app, &mut backend, "edit Oak cabinet 320");
    assert_eq!(app.items[0].label, "Oak cabinet");
    assert_eq!(app.items[0].magnitude, dec!(320));
    assert_eq!(app.items[1].label, "Sink");
    assert_eq!(app.summary.items_total, dec!(440));
}

#[test]
fn test_delete_entry_cancel_then_confirm() {
    let (mut app, mut backend) = with_project("Kitchen");
    run(&mut app, &mut backend, "add-cost Labor 124.50");

    run(&mut app, &mut backend, "delete");
    assert_eq!(app.confirm_message, "Delete cost 'Labor'?");
    app.cancel_prompts();
    assert_eq!(app.costs.len(), 1);
    assert!(app.pending_action.is_none());

    run(&mut app, &mut backend, "delete");
    confirm_pending(&mut app, &mut backend);
    assert!(app.costs.is_empty());
    assert_eq!(app.status_message, "Deleted cost: Labor");
}

#[test]
fn test_export_writes_active_project() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kitchen.csv");
    let (mut app, mut backend) = with_project("Kitchen");
    run(&mut app, &mut backend, "add-item Cabinet 300");
    run(&mut app, &mut backend, &format!("export {}", path.display()));

    assert!(!app.status_is_error, "{}", app.status_message);
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("Item,Cabinet,300.00"));
    assert!(text.contains("Total,,300.00"));
}
