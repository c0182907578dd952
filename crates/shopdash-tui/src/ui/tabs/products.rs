use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use super::{field_line, render_empty};
use crate::app::App;
use crate::ui::styles;
use crate::utils::{format_amount, format_optional, truncate_string};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    if app.data.products.is_empty() {
        render_empty(frame, area, "Products", app.loading);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_product_list(frame, app, chunks[0]);
    render_product_detail(frame, app, chunks[1]);
}

fn render_product_list(frame: &mut Frame, app: &App, area: Rect) {
    let currency = app.data.currency();

    let header = Row::new([Cell::from("Name"), Cell::from("Category"), Cell::from("Price")])
        .style(styles::title_style())
        .height(1);

    let rows: Vec<Row> = app
        .data
        .products
        .iter()
        .enumerate()
        .map(|(i, product)| {
            let style = if i == app.product_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            Row::new(vec![
                Cell::from(truncate_string(&product.product_name, 30)),
                Cell::from(product.category_display().to_string()),
                Cell::from(format_amount(product.price, currency)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Percentage(50),
        Constraint::Fill(1),
        Constraint::Length(14),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(format!(" Products ({}) ", app.data.products.len()))
                .title_style(styles::title_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.product_selection));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_product_detail(frame: &mut Frame, app: &App, area: Rect) {
    let currency = app.data.currency();

    let lines = match app.selected_product() {
        Some(product) => {
            let mut lines = vec![
                Line::from(Span::styled(product.product_name.clone(), styles::title_style())),
                Line::from(""),
                field_line("ID", product.product_id.to_string()),
                field_line("Category", product.category_display().to_string()),
                field_line("Price", format_amount(product.price, currency)),
            ];

            // Sales figures come from the analytics endpoint
            if let Some(perf) = app
                .data
                .product_performance
                .iter()
                .find(|p| p.product_id == product.product_id)
            {
                lines.push(field_line("Units sold", perf.sales.to_string()));
                lines.push(field_line("Revenue", format_amount(perf.revenue, currency)));
            }

            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("Details", styles::highlight_style())));
            lines.push(Line::from(format_optional(
                product.details.as_deref(),
                "No description",
            )));
            if let Some(image) = product.image.as_deref() {
                lines.push(Line::from(""));
                lines.push(field_line("Image", image.to_string()));
            }
            lines
        }
        None => vec![Line::from(Span::styled("No product selected", styles::muted_style()))],
    };

    let block = Block::default()
        .title(" Product ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}
