//! Formatting utilities for dashboard display.

/// Format an amount in Indian rupees with lakh/crore digit grouping.
///
/// Zero renders as `₹0`. Everything else gets two decimals, the last three
/// integer digits grouped together and every two digits before that.
///
/// # Examples
/// ```
/// use salewatch::display::format_inr;
///
/// assert_eq!(format_inr(0.0), "₹0");
/// assert_eq!(format_inr(1_234_567.89), "₹12,34,567.89");
/// assert_eq!(format_inr(-1500.0), "₹-1,500.00");
/// ```
pub fn format_inr(amount: f64) -> String {
    if amount == 0.0 {
        return "₹0".to_string();
    }

    let fixed = format!("{:.2}", amount.abs());
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("₹{sign}{}.{fraction}", group_indian(integer))
}

/// Format a count with thousands separators (`100,000`).
pub fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Format a percentage with one decimal place.
pub fn format_percent(value: f64) -> String {
    format!("{value:.1}%")
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}
