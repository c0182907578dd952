use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{field_line, render_empty};
use crate::app::App;
use crate::ui::styles;
use crate::utils::format_optional;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(profile) = app.data.profile.as_ref() else {
        render_empty(frame, area, "Profile", app.loading);
        return;
    };

    let lines = vec![
        Line::from(Span::styled(profile.display_name(), styles::title_style())),
        Line::from(""),
        field_line("Username", profile.username.clone()),
        field_line("Email", format_optional(profile.email.as_deref(), "-")),
        field_line("First name", format_optional(profile.first_name.as_deref(), "-")),
        field_line("Last name", format_optional(profile.last_name.as_deref(), "-")),
        field_line("Role", format_optional(profile.role.as_deref(), "-")),
        Line::from(""),
        field_line("Backend", app.config.api_base_url.clone()),
        field_line("Token storage", app.session.store().backend_name().to_string()),
    ];

    let block = Block::default()
        .title(" Profile ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
