use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::truncate;

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(
            format!(" Projects ({}) ", app.projects.len()),
            theme::title_style(),
        ));

    if app.projects.is_empty() {
        let hint = if app.principal.is_some() {
            "Create one with :project <name> [| description]"
        } else {
            "Sign in with :login <email> to see your projects"
        };
        let msg = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "No projects",
                theme::dim_style().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(hint, theme::dim_style())),
        ])
        .centered()
        .block(block);
        f.render_widget(msg, area);
        return;
    }

    let header = Row::new(
        ["", "Name", "Description", "Created"]
            .iter()
            .map(|h| Cell::from(*h).style(theme::header_style())),
    )
    .height(1);

    let active_id = app.active_project.as_ref().map(|p| p.id.as_str());

    let rows: Vec<Row> = app
        .projects
        .iter()
        .enumerate()
        .skip(app.project_cursor.scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, project)| {
            let is_active = Some(project.id.as_str()) == active_id;
            let marker = if is_active { "\u{25cf}" } else { " " };
            let style = if i == app.project_cursor.index {
                theme::selected_style()
            } else if is_active {
                Style::default().fg(theme::GREEN)
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };
            Row::new(vec![
                Cell::from(marker),
                Cell::from(truncate(&project.name, 30)),
                Cell::from(truncate(&project.description, 50)),
                Cell::from(project.created_at.format("%Y-%m-%d %H:%M").to_string()),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(2),
        Constraint::Length(30),
        Constraint::Min(20),
        Constraint::Length(17),
    ];
    let table = Table::new(rows, widths).header(header).block(block);
    f.render_widget(table, area);
}
