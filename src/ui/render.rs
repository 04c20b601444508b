use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs},
    Frame,
};

use super::app::{App, InputMode, Screen};
use super::commands;
use super::theme;

/// Normal-mode bindings shown in the help overlay.
const KEYS: &[(&str, &str)] = &[
    ("j/k", "Move cursor"),
    ("g/G", "Jump to top/bottom"),
    ("1/2, Tab", "Dashboard / Projects"),
    ("h/l", "Focus items or costs"),
    ("Enter", "Make project active"),
    ("e", "Edit focused entry"),
    ("D", "Delete with confirmation"),
    ("r", "Reload from the store"),
    (":", "Command mode"),
    ("Ctrl-q", "Quit"),
];

pub(crate) fn render(f: &mut Frame, app: &App) {
    let [tabs, body, status, command] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(5),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(f.area());

    render_tab_bar(f, tabs, app);
    match app.screen {
        Screen::Dashboard => super::screens::dashboard::render(f, body, app),
        Screen::Projects => super::screens::projects::render(f, body, app),
    }
    render_status_bar(f, status, app);
    render_command_bar(f, command, app);

    if app.show_help {
        render_help_overlay(f, f.area());
    }
}

fn render_tab_bar(f: &mut Frame, area: Rect, app: &App) {
    let screens = Screen::all();
    let selected = screens.iter().position(|s| *s == app.screen);
    let titles = screens
        .iter()
        .enumerate()
        .map(|(i, s)| Line::from(format!(" {}:{s} ", i + 1)));

    let tabs = Tabs::new(titles)
        .select(selected.unwrap_or(0))
        .style(Style::default().fg(theme::TEXT_DIM).bg(theme::HEADER_BG))
        .highlight_style(
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD),
        )
        .divider(Span::styled("│", Style::default().fg(theme::OVERLAY)));
    f.render_widget(tabs, area);
}

fn mode_color(mode: InputMode) -> ratatui::style::Color {
    match mode {
        InputMode::Normal => theme::ACCENT,
        InputMode::Command => theme::GREEN,
        InputMode::Password => theme::YELLOW,
        InputMode::Confirm => theme::RED,
    }
}

/// Who is signed in and which project the dashboard shows.
fn session_breadcrumb(app: &App) -> String {
    match (&app.principal, &app.active_project) {
        (None, _) => " signed out".to_string(),
        (Some(p), None) => format!(" {} › no project", p.email),
        (Some(p), Some(project)) => format!(" {} › {}", p.email, project.name),
    }
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let hint = match app.screen {
        Screen::Dashboard => "h/l focus  e edit  D delete  ? help ",
        Screen::Projects => "Enter select  D delete  ? help ",
    };
    let [left, right] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(hint.len() as u16)]).areas(area);

    let mode = Span::styled(
        format!(" {} ", app.input_mode),
        Style::default()
            .fg(theme::HEADER_BG)
            .bg(mode_color(app.input_mode))
            .add_modifier(Modifier::BOLD),
    );
    let crumb = Span::raw(session_breadcrumb(app));
    f.render_widget(
        Paragraph::new(Line::from(vec![mode, crumb])).style(theme::status_bar_style()),
        left,
    );
    f.render_widget(
        Paragraph::new(hint)
            .right_aligned()
            .style(theme::status_bar_style()),
        right,
    );
}

fn render_command_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut cursor = None;
    let line = match app.input_mode {
        InputMode::Command => {
            cursor = Some(1 + app.command_input.chars().count());
            Line::from(vec![
                Span::styled(":", Style::default().fg(theme::ACCENT)),
                Span::styled(app.command_input.as_str(), theme::command_bar_style()),
            ])
        }
        InputMode::Password => {
            let prompt = app
                .password_prompt
                .as_ref()
                .map_or_else(String::new, |p| format!("password for {}: ", p.email));
            let masked = "*".repeat(app.password_input.chars().count());
            cursor = Some(prompt.chars().count() + masked.len());
            Line::from(vec![
                Span::styled(prompt, Style::default().fg(theme::YELLOW)),
                Span::styled(masked, theme::command_bar_style()),
            ])
        }
        InputMode::Confirm => Line::from(vec![
            Span::styled(
                app.confirm_message.as_str(),
                Style::default().fg(theme::YELLOW),
            ),
            Span::styled(" [y/N]", Style::default().fg(theme::RED)),
        ]),
        InputMode::Normal if app.status_message.is_empty() => {
            Line::styled(" : command   ? help", theme::dim_style())
        }
        InputMode::Normal if app.status_is_error => {
            Line::styled(app.status_message.as_str(), theme::error_style())
        }
        InputMode::Normal => Line::styled(app.status_message.as_str(), theme::command_bar_style()),
    };

    f.render_widget(
        Paragraph::new(line).style(Style::default().bg(theme::COMMAND_BG)),
        area,
    );
    if let Some(col) = cursor {
        f.set_cursor_position((area.x + col as u16, area.y));
    }
}

/// A rect of at most `width` x `height` in the middle of `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    )
}

fn help_section(title: &'static str) -> Row<'static> {
    Row::new([Cell::from(title).style(
        Style::default()
            .fg(theme::YELLOW)
            .add_modifier(Modifier::BOLD),
    )])
}

fn render_help_overlay(f: &mut Frame, area: Rect) {
    // Aliases share a description; list each command once under its long name
    let mut listed: Vec<(&str, &str)> = Vec::new();
    let mut names: Vec<_> = commands::COMMANDS.iter().collect();
    names.sort_by_key(|(name, _)| std::cmp::Reverse(name.len()));
    for (&name, cmd) in names {
        if !listed.iter().any(|(_, desc)| *desc == cmd.description) {
            listed.push((name, cmd.description));
        }
    }
    listed.sort_by_key(|(name, _)| *name);

    let mut rows = vec![help_section("Keys")];
    rows.extend(
        KEYS.iter()
            .map(|(key, desc)| Row::new([format!("  {key}"), desc.to_string()])),
    );
    rows.push(Row::new([""]));
    rows.push(help_section("Commands"));
    rows.extend(
        listed
            .iter()
            .map(|(name, desc)| Row::new([format!("  :{name}"), desc.to_string()])),
    );

    let popup = centered(area, 72, rows.len() as u16 + 2);
    let table = Table::new(rows, [Constraint::Length(20), Constraint::Min(10)])
        .style(theme::normal_style())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme::ACCENT))
                .title(Span::styled(" ProjCost help ", theme::title_style()))
                .title_bottom(Line::styled(" any key closes ", theme::dim_style()).centered())
                .style(Style::default().bg(theme::HEADER_BG)),
        );

    f.render_widget(Clear, popup);
    f.render_widget(table, popup);
}
