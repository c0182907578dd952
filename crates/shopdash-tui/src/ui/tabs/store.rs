use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::{field_line, render_empty};
use crate::app::App;
use crate::ui::styles;
use crate::utils::{format_amount, format_optional};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(info) = app.data.store_info.as_ref() else {
        if app.loading {
            render_empty(frame, area, "Store", true);
        } else {
            let block = Block::default()
                .title(" Store ")
                .title_style(styles::title_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(false));
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "Store details have not been set up yet",
                    styles::muted_style(),
                ))
                .block(block),
                area,
            );
        }
        return;
    };

    let fee = info
        .delivery_fee
        .map(|fee| format_amount(fee, info.currency.as_deref()))
        .unwrap_or_else(|| "-".to_string());

    let mut lines = vec![
        field_line("Contact", format_optional(info.contact_email.as_deref(), "-")),
        field_line("Currency", format_optional(info.currency.as_deref(), "-")),
        field_line("Delivery fee", fee),
        field_line("Image", format_optional(info.store_image.as_deref(), "-")),
        Line::from(""),
        Line::from(Span::styled("About", styles::highlight_style())),
        Line::from(format_optional(info.about.as_deref(), "-")),
        Line::from(""),
        Line::from(Span::styled("Bank details", styles::highlight_style())),
    ];
    lines.extend(
        format_optional(info.bank_details.as_deref(), "-")
            .lines()
            .map(|l| Line::from(l.to_string())),
    );

    let block = Block::default()
        .title(" Store ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}
