//! One module per dashboard view.

pub mod analytics;
pub mod dashboard;
pub mod orders;
pub mod products;
pub mod profile;
pub mod store;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::ui::styles;

/// Shared "nothing loaded yet" panel
pub(crate) fn render_empty(frame: &mut Frame, area: Rect, title: &str, loading: bool) {
    let message = if loading {
        "Loading..."
    } else {
        "No data - press u to reload"
    };
    let block = Block::default()
        .title(format!(" {} ", title))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(message, styles::muted_style()))).block(block),
        area,
    );
}

/// `label: value` detail line
pub(crate) fn field_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<16}", label), styles::muted_style()),
        Span::styled(value, styles::list_item_style()),
    ])
}
