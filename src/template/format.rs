//! Output formatting for rendered values.
//!
//! These rules are part of the mail output contract: amounts, dates and
//! field labels must render identically across releases.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use super::context::Value;

/// Locale-bound formatter shared by the renderer and the content generators
#[derive(Debug, Clone)]
pub struct Formatter {
    timezone: Tz,
    currency_symbol: String,
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(chrono_tz::Asia::Kolkata, "₹")
    }
}

impl Formatter {
    pub fn new(timezone: Tz, currency_symbol: impl Into<String>) -> Self {
        Self {
            timezone,
            currency_symbol: currency_symbol.into(),
        }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// `₹1,23,456`, or `₹1,234.50` when the amount has a fractional part
    pub fn currency(&self, amount: f64) -> String {
        let sign = if amount < 0.0 { "-" } else { "" };
        format!("{}{}{}", sign, self.currency_symbol, group_amount(amount.abs()))
    }

    /// `October 18, 2026`
    pub fn date(&self, date: NaiveDate) -> String {
        date.format("%B %-d, %Y").to_string()
    }

    /// `October 18, 2026 at 3:45 PM`, in the configured timezone
    pub fn datetime(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.timezone)
            .format("%B %-d, %Y at %-I:%M %p")
            .to_string()
    }

    /// Render a context value for insertion into HTML
    pub fn value(&self, value: &Value) -> String {
        match value {
            Value::Text(text) => escape_html(text),
            Value::Number(n) => format_number(*n),
            Value::Currency(amount) => self.currency(*amount),
            Value::Date(date) => self.date(*date),
            Value::DateTime(at) => self.datetime(*at),
            Value::Flag(flag) => flag.to_string(),
            Value::Fragment(fragment) => fragment.as_str().to_string(),
        }
    }
}

/// Integers print without separators (years, counts); other numbers as-is
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Indian digit grouping: last three digits, then groups of two.
fn group_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        group_digits(&format!("{}", amount as u64))
    } else {
        let fixed = format!("{:.2}", amount);
        match fixed.split_once('.') {
            Some((whole, fraction)) => format!("{}.{}", group_digits(whole), fraction),
            None => group_digits(&fixed),
        }
    }
}

fn group_digits(digits: &str) -> String {
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

    format!("{},{}", groups.join(","), tail)
}

/// Turn a machine field name into a human label.
///
/// `phoneNumber` -> `Phone Number`, `date_of_birth` -> `Date Of Birth`,
/// `category3` -> `Category 3`.
pub fn field_label(key: &str) -> String {
    if key.starts_with("category") {
        if let Some(last) = key.chars().last() {
            return format!("Category {}", last);
        }
    }

    let mut spaced = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            spaced.push(' ');
        }
        spaced.push(c);
    }

    spaced
        .split(|c: char| c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Escape text for inclusion in HTML element content or attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
