use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use shopdash_core::models::OrderStatus;

use super::render_empty;
use crate::app::App;
use crate::ui::styles;
use crate::utils::{bar, format_amount, truncate_string};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(summary) = app.data.summary.as_ref() else {
        render_empty(frame, area, "Dashboard", app.loading);
        return;
    };
    let currency = app.data.currency();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(6)])
        .split(area);

    // Headline cards
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(rows[0]);
    let headline = [
        ("Revenue", format_amount(summary.total_revenue, currency)),
        ("Active orders", summary.active_orders.to_string()),
        ("Products", summary.total_products.to_string()),
        ("Customers", summary.total_customers.to_string()),
    ];
    for (slot, (label, value)) in cards.iter().zip(headline) {
        let block = Block::default()
            .title(format!(" {} ", label))
            .title_style(styles::muted_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(false));
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(value, styles::highlight_style()))).block(block),
            *slot,
        );
    }

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(rows[1]);

    render_trend(frame, app, bottom[0]);
    render_recent_orders(frame, app, bottom[1]);
}

fn render_trend(frame: &mut Frame, app: &App, area: Rect) {
    let Some(summary) = app.data.summary.as_ref() else {
        return;
    };
    let currency = app.data.currency();
    let max = summary
        .revenue_trend
        .iter()
        .map(|m| m.amount)
        .fold(0.0_f64, f64::max);
    let bar_width = (area.width as usize).saturating_sub(24).max(1);

    let lines: Vec<Line> = summary
        .revenue_trend
        .iter()
        .map(|m| {
            Line::from(vec![
                Span::styled(format!(" {:<4}", truncate_string(&m.month, 4)), styles::muted_style()),
                Span::styled(format!("{:<w$}", bar(m.amount, max, bar_width), w = bar_width), styles::success_style()),
                Span::raw(format!(" {}", format_amount(m.amount, currency))),
            ])
        })
        .collect();

    let block = Block::default()
        .title(" Revenue trend ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_recent_orders(frame: &mut Frame, app: &App, area: Rect) {
    let Some(summary) = app.data.summary.as_ref() else {
        return;
    };
    let currency = app.data.currency();

    let header = Row::new([
        Cell::from("Order"),
        Cell::from("Customer"),
        Cell::from("Status"),
        Cell::from("Amount"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = summary
        .recent_orders
        .iter()
        .map(|order| {
            let status = OrderStatus::parse(order.order_status.as_deref());
            Row::new(vec![
                Cell::from(order.order_number.clone()),
                Cell::from(truncate_string(&order.username, 18)),
                Cell::from(status.to_string()).style(styles::order_status_style(status)),
                Cell::from(format_amount(order.total_amount, currency)),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [
        Constraint::Fill(2),
        Constraint::Fill(2),
        Constraint::Length(11),
        Constraint::Length(14),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(format!(" Recent orders ({}) ", summary.recent_orders.len()))
            .title_style(styles::title_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(false)),
    );
    frame.render_widget(table, area);
}
