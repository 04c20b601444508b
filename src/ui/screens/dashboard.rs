use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use rust_decimal::Decimal;

use crate::models::EntryKind;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, plural, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    if app.principal.is_none() {
        render_notice(
            f,
            area,
            "Not signed in",
            "Sign in with :login <email> or create an account with :register <email>",
        );
        return;
    }
    let Some(project) = app.active_project.as_ref() else {
        render_notice(
            f,
            area,
            "No projects yet",
            "Create one with :project <name> [| description]",
        );
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Summary cards
            Constraint::Min(5),    // Entry tables
        ])
        .split(area);

    render_summary_cards(f, chunks[0], app, &project.name);

    let tables = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    render_entries(f, tables[0], app, EntryKind::Item);
    render_entries(f, tables[1], app, EntryKind::Cost);
}

fn render_notice(f: &mut Frame, area: Rect, headline: &str, hint: &str) {
    let msg = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            headline.to_string(),
            theme::dim_style().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(hint.to_string(), theme::dim_style())),
    ])
    .centered()
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY)),
    );
    f.render_widget(msg, area);
}

fn render_summary_cards(f: &mut Frame, area: Rect, app: &App, project_name: &str) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(33),
            Constraint::Percentage(33),
            Constraint::Percentage(34),
        ])
        .split(area);

    let summary = &app.summary;
    render_card(
        f,
        cards[0],
        "Items Total",
        format_amount(summary.items_total, &app.currency),
        theme::YELLOW,
        plural(summary.items_count, "item"),
    );
    render_card(
        f,
        cards[1],
        "Additional Costs",
        format_amount(summary.costs_total, &app.currency),
        theme::PEACH,
        plural(summary.costs_count, "cost item"),
    );
    render_card(
        f,
        cards[2],
        "Total Project Cost",
        format_amount(summary.total(), &app.currency),
        theme::GREEN,
        project_name.to_string(),
    );
}

fn render_card(
    f: &mut Frame,
    area: Rect,
    title: &str,
    display: String,
    color: Color,
    subtitle: String,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(format!(" {title} "), theme::title_style()));

    let text = Paragraph::new(vec![
        Line::from(Span::styled(
            display,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(subtitle, theme::dim_style())),
    ])
    .centered()
    .block(block);

    f.render_widget(text, area);
}

fn render_entries(f: &mut Frame, area: Rect, app: &App, kind: EntryKind) {
    let entries = app.entries(kind);
    let focused = app.focus == kind;
    let (title, label_header, amount_header) = match kind {
        EntryKind::Item => ("Items", "Name", "Cost"),
        EntryKind::Cost => ("Costs", "Description", "Amount"),
    };

    let border = if focused { theme::ACCENT } else { theme::OVERLAY };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(Span::styled(
            format!(" {title} ({}) ", entries.len()),
            theme::title_style(),
        ));

    if entries.is_empty() {
        let hint = format!(
            "Add one with :add-{} <{}> <amount>",
            kind.as_str().to_lowercase(),
            kind.label_field()
        );
        let msg = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(hint, theme::dim_style())),
        ])
        .centered()
        .block(block);
        f.render_widget(msg, area);
        return;
    }

    let header = Row::new(
        [label_header, amount_header]
            .iter()
            .map(|h| Cell::from(*h).style(theme::header_style())),
    )
    .height(1);

    let cursor = app.cursor(kind);
    let label_width = (area.width as usize).saturating_sub(20);

    let rows: Vec<Row> = entries
        .iter()
        .enumerate()
        .skip(cursor.scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, entry)| {
            let style = if focused && i == cursor.index {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };
            let amount_style = if entry.magnitude == Decimal::ZERO {
                theme::dim_style()
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(truncate(&entry.label, label_width)),
                Cell::from(Span::styled(
                    format_amount(entry.magnitude, &app.currency),
                    amount_style,
                )),
            ])
            .style(style)
        })
        .collect();

    let widths = [Constraint::Min(10), Constraint::Length(16)];
    let table = Table::new(rows, widths).header(header).block(block);
    f.render_widget(table, area);
}
