use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use super::field_line;
use crate::app::App;
use crate::ui::styles;
use crate::utils::{bar, format_amount, truncate_string};

/// Rows shown in the best seller table
const TOP_PRODUCTS: usize = 10;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(columns[0]);

    render_revenue(frame, app, left[0]);
    render_order_trend(frame, app, left[1]);
    render_top_products(frame, app, columns[1]);
}

fn panel(title: &str) -> Block<'static> {
    Block::default()
        .title(format!(" {} ", title))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false))
}

fn waiting(app: &App) -> Vec<Line<'static>> {
    let message = if app.loading { "Loading..." } else { "No data" };
    vec![Line::from(Span::styled(message, styles::muted_style()))]
}

fn render_revenue(frame: &mut Frame, app: &App, area: Rect) {
    let currency = app.data.currency();
    let lines = match app.data.revenue_analytics.as_ref() {
        Some(revenue) => {
            let max = revenue.peak_month().map(|m| m.amount).unwrap_or(0.0);
            let bar_width = (area.width as usize).saturating_sub(26).max(1);

            let mut lines = vec![
                field_line("Total", format_amount(revenue.total_revenue, currency)),
                field_line("Avg order", format_amount(revenue.average_order_value, currency)),
                Line::from(""),
            ];
            lines.extend(revenue.monthly_revenue_trend.iter().map(|m| {
                Line::from(vec![
                    Span::styled(format!(" {:<4}", truncate_string(&m.month, 4)), styles::muted_style()),
                    Span::styled(format!("{:<w$}", bar(m.amount, max, bar_width), w = bar_width), styles::success_style()),
                    Span::raw(format!(" {}", format_amount(m.amount, currency))),
                ])
            }));
            lines
        }
        None => waiting(app),
    };
    frame.render_widget(Paragraph::new(lines).block(panel("Revenue")), area);
}

fn render_order_trend(frame: &mut Frame, app: &App, area: Rect) {
    let lines = match app.data.order_analytics.as_ref() {
        Some(stats) => {
            let max = stats
                .monthly_order_trend
                .iter()
                .map(|m| m.count)
                .max()
                .unwrap_or(0) as f64;
            let bar_width = (area.width as usize).saturating_sub(16).max(1);

            let mut lines = vec![
                field_line("Total orders", stats.total_orders.to_string()),
                field_line("Per customer", format!("{:.2}", stats.order_frequency)),
                Line::from(""),
            ];
            lines.extend(stats.monthly_order_trend.iter().map(|m| {
                Line::from(vec![
                    Span::styled(format!(" {:<4}", truncate_string(&m.month, 4)), styles::muted_style()),
                    Span::styled(format!("{:<w$}", bar(m.count as f64, max, bar_width), w = bar_width), styles::highlight_style()),
                    Span::raw(format!(" {}", m.count)),
                ])
            }));
            lines
        }
        None => waiting(app),
    };
    frame.render_widget(Paragraph::new(lines).block(panel("Orders")), area);
}

fn render_top_products(frame: &mut Frame, app: &App, area: Rect) {
    let currency = app.data.currency();
    let products = &app.data.product_performance;

    let header = Row::new([Cell::from("Product"), Cell::from("Sold"), Cell::from("Revenue")])
        .style(styles::title_style())
        .height(1);

    let rows: Vec<Row> = products
        .iter()
        .take(TOP_PRODUCTS)
        .map(|p| {
            Row::new(vec![
                Cell::from(truncate_string(&p.product_name, 28)),
                Cell::from(format!("{:>5}", p.sales)),
                Cell::from(format_amount(p.revenue, currency)),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [
        Constraint::Fill(1),
        Constraint::Length(6),
        Constraint::Length(14),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(panel(&format!("Best sellers ({})", products.len())));
    frame.render_widget(table, area);
}
