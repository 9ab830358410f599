//! Currency display and small arithmetic helpers shared by the analytics.

/// Formats `amount` en-US style, e.g. `$1,234.50` or `-$5.00`.
pub fn format_currency(amount: f64, code: &str) -> String {
    let code = code.trim().to_uppercase();
    let precision = minor_units_for(&code);
    let body = group_digits(&format!("{:.*}", precision as usize, amount.abs()));
    let sign = if amount < 0.0 && body.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    match symbol_for(&code) {
        Some(symbol) => format!("{}{}{}", sign, symbol, body),
        None => format!("{}{}\u{a0}{}", sign, code, body),
    }
}

/// `part` as a percentage of `total`; zero when `total` is not positive.
pub fn calculate_percentage(part: f64, total: f64) -> f64 {
    if total > 0.0 && part.is_finite() {
        (part * 100.0) / total
    } else {
        0.0
    }
}

/// Reads a user-typed amount such as `$1,234.50`, ignoring symbols and grouping.
pub fn parse_currency(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let negative = trimmed.starts_with('-') || (trimmed.starts_with('(') && trimmed.ends_with(')'));
    let cleaned: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    let value: f64 = cleaned.parse().ok()?;
    Some(if negative { -value } else { value })
}

fn symbol_for(code: &str) -> Option<&'static str> {
    match code {
        "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "JPY" => Some("¥"),
        "INR" => Some("₹"),
        _ => None,
    }
}

fn minor_units_for(code: &str) -> u8 {
    match code {
        "JPY" => 0,
        "KWD" | "BHD" => 3,
        _ => 2,
    }
}

fn group_digits(number: &str) -> String {
    let (int_part, fraction) = match number.find('.') {
        Some(pos) => number.split_at(pos),
        None => (number, ""),
    };
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped.push_str(fraction);
    grouped
}
