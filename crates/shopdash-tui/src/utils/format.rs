/// Format a money amount with thousands separators, e.g. `USD 1,234.50`.
/// Without a currency code a `$` prefix is used.
pub fn format_amount(amount: f64, currency: Option<&str>) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if negative { "-" } else { "" };
    match currency.map(str::trim).filter(|c| !c.is_empty()) {
        Some(code) => format!("{}{} {}.{:02}", sign, code, grouped, frac),
        None => format!("{}${}.{:02}", sign, grouped, frac),
    }
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format an optional string, returning a default if None or empty
pub fn format_optional(value: Option<&str>, default: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(default)
        .to_string()
}

/// Format a timestamp to a more readable format
pub fn format_timestamp(timestamp: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(timestamp) {
        dt.format("%b %d, %Y %H:%M").to_string()
    } else if timestamp.len() >= 10 {
        // Fall back to the YYYY-MM-DD prefix
        timestamp.chars().take(10).collect()
    } else {
        timestamp.to_string()
    }
}

/// Horizontal bar scaled against `max`, at most `width` cells
pub fn bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || value <= 0.0 || width == 0 {
        return String::new();
    }
    let cells = ((value / max) * width as f64).round() as usize;
    "█".repeat(cells.clamp(1, width))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0, None), "$0.00");
        assert_eq!(format_amount(1234.5, None), "$1,234.50");
        assert_eq!(format_amount(1234567.891, Some("EUR")), "EUR 1,234,567.89");
        assert_eq!(format_amount(-12.0, Some(" ")), "-$12.00");
        assert_eq!(format_amount(999.999, None), "$1,000.00");
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("Crème brûlée", 8), "Crème...");
    }

    #[test]
    fn test_format_optional() {
        assert_eq!(format_optional(Some("Courier"), "-"), "Courier");
        assert_eq!(format_optional(Some("  "), "-"), "-");
        assert_eq!(format_optional(None, "-"), "-");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp("2025-04-02T09:30:00Z"), "Apr 02, 2025 09:30");
        assert_eq!(format_timestamp("2025-04-02 09:30"), "2025-04-02");
        assert_eq!(format_timestamp("soon"), "soon");
    }

    #[test]
    fn test_bar() {
        assert_eq!(bar(5.0, 10.0, 10), "█████");
        assert_eq!(bar(10.0, 10.0, 4), "████");
        assert_eq!(bar(0.1, 100.0, 10), "█");
        assert_eq!(bar(0.0, 10.0, 10), "");
        assert_eq!(bar(3.0, 0.0, 10), "");
    }
}
