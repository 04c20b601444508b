use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

use crate::backend::Backend;
use crate::ui::app::{App, InputMode, Screen};
use crate::ui::commands;
use crate::ui::util::ListCursor;

pub(crate) fn as_tui(backend: &mut Backend, currency: &str) -> Result<()> {
    let mut app = App::new(currency);
    app.refresh(backend);
    if app.principal.is_none() {
        app.set_status("Sign in with :login <email> or :register <email>");
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;

    let result = run_app(&mut terminal, &mut app, backend);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        log::error!("event=tui_exit status=failed error={e:#}");
        eprintln!("Error: {e:?}");
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    backend: &mut Backend,
) -> Result<()> {
    while app.running {
        terminal.draw(|f| {
            // 1 tab + 1 status + 1 cmd + 2 borders + 1 header
            let content_height = f.area().height.saturating_sub(6) as usize;
            app.visible_rows = content_height.max(1);
            crate::ui::render::render(f, app);
        })?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.show_help {
                app.show_help = false;
                continue;
            }
            match app.input_mode {
                InputMode::Normal => handle_normal_input(key, app, backend),
                InputMode::Command => handle_command_input(key, app, backend),
                InputMode::Password => handle_password_input(key, app, backend),
                InputMode::Confirm => handle_confirm_input(key, app, backend),
            }
        }
    }
    Ok(())
}

// ── Input handlers ───────────────────────────────────────────

fn handle_normal_input(key: event::KeyEvent, app: &mut App, backend: &mut Backend) {
    match key.code {
        KeyCode::Char(':') => {
            app.input_mode = InputMode::Command;
            app.command_input.clear();
        }
        KeyCode::Char('q') | KeyCode::Char('c')
            if key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            app.running = false;
        }
        KeyCode::Char('j') | KeyCode::Down => move_cursor(app, Motion::Down),
        KeyCode::Char('k') | KeyCode::Up => move_cursor(app, Motion::Up),
        KeyCode::Char('g') => move_cursor(app, Motion::Top),
        KeyCode::Char('G') => move_cursor(app, Motion::Bottom),
        KeyCode::Char('1') => switch_screen(app, Screen::Dashboard),
        KeyCode::Char('2') => switch_screen(app, Screen::Projects),
        KeyCode::Tab | KeyCode::BackTab => {
            let next = match app.screen {
                Screen::Dashboard => Screen::Projects,
                Screen::Projects => Screen::Dashboard,
            };
            switch_screen(app, next);
        }
        KeyCode::Char('h') | KeyCode::Left | KeyCode::Char('l') | KeyCode::Right
            if app.screen == Screen::Dashboard =>
        {
            app.toggle_focus();
        }
        KeyCode::Enter if app.screen == Screen::Projects => {
            if let Some(project) = app.selected_project() {
                let cmd = format!("select {}", project.id);
                commands::handle_command(&cmd, app, backend);
            }
        }
        KeyCode::Char('e') if app.screen == Screen::Dashboard => {
            // Prefill the command bar with the current values
            if let Some(entry) = app.focused_entry() {
                app.command_input = format!("edit {} {}", entry.label, entry.magnitude);
                app.input_mode = InputMode::Command;
            }
        }
        KeyCode::Char('D') => commands::handle_command("delete", app, backend),
        KeyCode::Char('r') => commands::handle_command("refresh", app, backend),
        KeyCode::Char('?') => {
            app.show_help = true;
        }
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..app.visible_rows / 2 {
                move_cursor(app, Motion::Down);
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..app.visible_rows / 2 {
                move_cursor(app, Motion::Up);
            }
        }
        KeyCode::Esc => app.set_status(""),
        _ => {}
    }
}

fn handle_command_input(key: event::KeyEvent, app: &mut App, backend: &mut Backend) {
    match key.code {
        KeyCode::Enter => {
            let input = std::mem::take(&mut app.command_input);
            app.input_mode = InputMode::Normal;
            app.set_status("");
            commands::handle_command(&input, app, backend);
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
        }
        KeyCode::Backspace => {
            app.command_input.pop();
            if app.command_input.is_empty() {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.command_input.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let trimmed = app.command_input.trim_end();
            if let Some(pos) = trimmed.rfind(' ') {
                app.command_input.truncate(pos + 1);
            } else {
                app.command_input.clear();
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char(c) => {
            app.command_input.push(c);
        }
        _ => {}
    }
}

fn handle_password_input(key: event::KeyEvent, app: &mut App, backend: &mut Backend) {
    match key.code {
        KeyCode::Enter => commands::submit_password(app, backend),
        KeyCode::Esc => {
            app.cancel_prompts();
            app.set_status("Cancelled");
        }
        KeyCode::Backspace => {
            app.password_input.pop();
        }
        KeyCode::Char(c) => {
            app.password_input.push(c);
        }
        _ => {}
    }
}

fn handle_confirm_input(key: event::KeyEvent, app: &mut App, backend: &mut Backend) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => commands::confirm_pending(app, backend),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.cancel_prompts();
            app.set_status("Cancelled");
        }
        _ => {}
    }
}

// ── Navigation helpers ───────────────────────────────────────

fn switch_screen(app: &mut App, screen: Screen) {
    app.screen = screen;
    if screen == Screen::Projects {
        let active = app.active_project.as_ref().map(|p| p.id.as_str());
        if let Some(pos) = app.projects.iter().position(|p| Some(p.id.as_str()) == active) {
            app.project_cursor.jump(pos);
        }
    }
    app.set_status(format!("{screen}"));
}

enum Motion {
    Down,
    Up,
    Top,
    Bottom,
}

/// Apply `motion` to the list the current screen navigates. Entry tables
/// sit under the summary cards, so their page is shorter.
fn move_cursor(app: &mut App, motion: Motion) {
    let (len, page) = match app.screen {
        Screen::Projects => (app.projects.len(), app.visible_rows),
        Screen::Dashboard => (
            app.entries(app.focus).len(),
            app.visible_rows.saturating_sub(6).max(1),
        ),
    };
    let cursor: &mut ListCursor = match app.screen {
        Screen::Projects => &mut app.project_cursor,
        Screen::Dashboard => {
            let kind = app.focus;
            app.cursor_mut(kind)
        }
    };
    match motion {
        Motion::Down => cursor.down(len, page),
        Motion::Up => cursor.up(),
        Motion::Top => cursor.top(),
        Motion::Bottom => cursor.bottom(len, page),
    }
}
