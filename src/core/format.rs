//! Rupee formatting for projection figures.

const CRORE: f64 = 10_000_000.0;
const LAKH: f64 = 100_000.0;

/// Formats an amount the way the calculator displays it: crores and lakhs
/// abbreviated to two decimals, smaller amounts with Indian digit grouping.
pub fn format_inr(amount: f64) -> String {
    if !amount.is_finite() {
        return "₹0".to_string();
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    let magnitude = amount.abs();

    if magnitude >= CRORE {
        format!("{sign}₹{:.2} Cr", magnitude / CRORE)
    } else if magnitude >= LAKH {
        format!("{sign}₹{:.2} L", magnitude / LAKH)
    } else {
        format!("{sign}₹{}", group_indian(magnitude))
    }
}

/// Groups the integer part as 12,34,567 and keeps up to three fraction digits.
fn group_indian(magnitude: f64) -> String {
    let fixed = format!("{magnitude:.3}");
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 2);
    let digits = whole.len();
    for (idx, ch) in whole.chars().enumerate() {
        let remaining = digits - idx;
        if idx > 0 && (remaining == 3 || (remaining > 3 && (remaining - 3) % 2 == 0)) {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if fraction.is_empty() {
        grouped
    } else {
        format!("{grouped}.{fraction}")
    }
}
