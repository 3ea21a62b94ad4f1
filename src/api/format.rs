/// Formats a tooltip number with `,` thousands grouping and at most three
/// fraction digits, trailing zeros trimmed (`1234567.5` -> `1,234,567.5`).
#[must_use]
pub fn format_grouped(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let text = format!("{:.3}", value.abs());
    let (integer, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3 + 4);
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if !fraction.is_empty() {
        grouped.push('.');
        grouped.push_str(fraction);
    }

    if value < 0.0 && grouped.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Metric column name without an aggregate wrapper: `Sum(ARRESTS)` -> `ARRESTS`.
#[must_use]
pub fn metric_display_name(metric: &str) -> &str {
    metric
        .strip_prefix("Sum(")
        .and_then(|rest| rest.strip_suffix(')'))
        .unwrap_or(metric)
}
