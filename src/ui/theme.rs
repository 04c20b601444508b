use ratatui::style::{Color, Modifier, Style};

// Warm dark palette; amounts read in yellow/peach/green on the dashboard.
pub(crate) const HEADER_BG: Color = Color::Rgb(36, 39, 58);
pub(crate) const ACCENT: Color = Color::Rgb(138, 173, 244);
pub(crate) const GREEN: Color = Color::Rgb(166, 218, 149);
pub(crate) const RED: Color = Color::Rgb(237, 135, 150);
pub(crate) const YELLOW: Color = Color::Rgb(238, 212, 159);
pub(crate) const PEACH: Color = Color::Rgb(245, 169, 127);
pub(crate) const TEXT_DIM: Color = Color::Rgb(128, 135, 162);
pub(crate) const OVERLAY: Color = Color::Rgb(73, 77, 100);
pub(crate) const COMMAND_BG: Color = Color::Rgb(30, 32, 48);

const TEXT: Color = Color::Rgb(202, 211, 245);
const ROW_ALT: Color = Color::Rgb(41, 44, 60);
const BAR_BG: Color = Color::Rgb(54, 58, 79);

pub(crate) fn header_style() -> Style {
    Style::new()
        .fg(TEXT)
        .bg(HEADER_BG)
        .add_modifier(Modifier::BOLD)
}

pub(crate) fn selected_style() -> Style {
    Style::new()
        .fg(HEADER_BG)
        .bg(ACCENT)
        .add_modifier(Modifier::BOLD)
}

pub(crate) fn normal_style() -> Style {
    Style::new().fg(TEXT)
}

pub(crate) fn dim_style() -> Style {
    Style::new().fg(TEXT_DIM)
}

pub(crate) fn alt_row_style() -> Style {
    Style::new().fg(TEXT).bg(ROW_ALT)
}

pub(crate) fn command_bar_style() -> Style {
    Style::new().fg(TEXT).bg(COMMAND_BG)
}

pub(crate) fn error_style() -> Style {
    Style::new().fg(RED).bg(COMMAND_BG).add_modifier(Modifier::BOLD)
}

pub(crate) fn status_bar_style() -> Style {
    Style::new().fg(TEXT_DIM).bg(BAR_BG)
}

pub(crate) fn title_style() -> Style {
    Style::new().fg(TEXT_DIM).add_modifier(Modifier::BOLD)
}
