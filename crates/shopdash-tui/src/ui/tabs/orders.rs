use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use super::{field_line, render_empty};
use crate::app::App;
use crate::ui::styles;
use crate::utils::{format_amount, format_optional, format_timestamp, truncate_string};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    if app.data.orders.is_none() {
        render_empty(frame, area, "Orders", app.loading);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_order_list(frame, app, chunks[0]);
    render_order_detail(frame, app, chunks[1]);
}

fn render_order_list(frame: &mut Frame, app: &App, area: Rect) {
    let currency = app.data.currency();

    let header = Row::new([
        Cell::from("Order"),
        Cell::from("Customer"),
        Cell::from("Qty"),
        Cell::from("Amount"),
        Cell::from("Status"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = app
        .orders()
        .iter()
        .enumerate()
        .map(|(i, order)| {
            let style = if i == app.order_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            let status = order.status();
            Row::new(vec![
                Cell::from(order.order_number.clone()),
                Cell::from(truncate_string(&order.username, 16)),
                Cell::from(format!("{:>3}", order.quantity)),
                Cell::from(format_amount(order.amount, currency)),
                Cell::from(status.to_string()).style(styles::order_status_style(status)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Fill(2),
        Constraint::Fill(2),
        Constraint::Length(4),
        Constraint::Length(14),
        Constraint::Length(11),
    ];

    let (count, page) = app
        .data
        .orders
        .as_ref()
        .map(|p| (p.count, app.order_query.page.unwrap_or(1)))
        .unwrap_or((0, 1));
    let filter = match app.order_query.search.as_deref() {
        Some(term) => format!(" - \"{}\"", term),
        None => String::new(),
    };
    let title = format!(" Orders ({}) - page {}{} ", count, page, filter);

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::title_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.order_selection));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_order_detail(frame: &mut Frame, app: &App, area: Rect) {
    let currency = app.data.currency();

    let (title, lines) = match app.selected_order() {
        Some(order) => {
            let status = order.status();
            let mut lines = vec![
                Line::from(vec![
                    Span::styled(order.order_number.clone(), styles::title_style()),
                    Span::raw("  "),
                    Span::styled(status.to_string(), styles::order_status_style(status)),
                ]),
                Line::from(""),
                field_line("Customer", format!("{} (#{})", order.username, order.user_id)),
                field_line("Product", format!("#{} x {}", order.product_id, order.quantity)),
                field_line("Amount", format_amount(order.amount, currency)),
                field_line(
                    "Placed",
                    order
                        .timestamp
                        .as_deref()
                        .map(format_timestamp)
                        .unwrap_or_else(|| "-".to_string()),
                ),
                Line::from(""),
                Line::from(Span::styled("Payment", styles::highlight_style())),
                Line::from(vec![
                    Span::styled(format!("{:<16}", "Status"), styles::muted_style()),
                    Span::styled(
                        format_optional(order.payment_status.as_deref(), "-"),
                        styles::payment_style(order.is_paid()),
                    ),
                ]),
                field_line("Method", format_optional(order.payment_method.as_deref(), "-")),
                field_line("Invoice", format_optional(order.invoice_id.as_deref(), "-")),
                Line::from(""),
                Line::from(Span::styled("Delivery", styles::highlight_style())),
                field_line("Method", format_optional(order.delivery_method.as_deref(), "-")),
                field_line("Address", format_optional(order.delivery_address.as_deref(), "-")),
            ];
            let next = status.advance();
            if next != status {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    format!("[s] mark as {}", next),
                    styles::muted_style(),
                )));
            }
            (" Order ".to_string(), lines)
        }
        None => (
            " Order ".to_string(),
            vec![Line::from(Span::styled("No orders", styles::muted_style()))],
        ),
    };

    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}
