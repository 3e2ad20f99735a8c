//! Field tables for coach and player records

use chrono::{DateTime, NaiveDate};

use super::{ContentGenerator, HEADER_CELL_STYLE, LABEL_CELL_STYLE, VALUE_CELL_STYLE};
use crate::template::{escape_html, field_label, Formatter, Fragment};

/// One submitted record: field name to value, in submission order
pub type FieldRecord = serde_json::Map<String, serde_json::Value>;

/// How group headers are numbered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Numbering {
    /// `Player 1 Information`, `Player 2 Information`, …
    Always,
    /// `Coach Information` for a single record, numbered otherwise
    WhenSeveral,
}

/// Two-column label/value table, one header row per record
#[derive(Debug, Clone)]
pub struct EntityTable {
    group: &'static str,
    numbering: Numbering,
    formatter: Formatter,
}

impl EntityTable {
    pub fn coaches(formatter: Formatter) -> Self {
        Self {
            group: "Coach",
            numbering: Numbering::WhenSeveral,
            formatter,
        }
    }

    pub fn players(formatter: Formatter) -> Self {
        Self {
            group: "Player",
            numbering: Numbering::Always,
            formatter,
        }
    }

    fn header(&self, index: usize, total: usize) -> String {
        match self.numbering {
            Numbering::WhenSeveral if total == 1 => format!("{} Information", self.group),
            _ => format!("{} {} Information", self.group, index + 1),
        }
    }

    fn cell_value(&self, value: &serde_json::Value) -> String {
        match value {
            serde_json::Value::Null => String::new(),
            serde_json::Value::Bool(b) => b.to_string(),
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::String(s) => self.text_value(s),
            serde_json::Value::Array(items) => items
                .iter()
                .map(|item| self.cell_value(item))
                .collect::<Vec<_>>()
                .join(", "),
            serde_json::Value::Object(_) => escape_html(&value.to_string()),
        }
    }

    /// Date-shaped strings are shown as long dates, everything else as text
    fn text_value(&self, s: &str) -> String {
        if let Ok(at) = DateTime::parse_from_rfc3339(s) {
            let local = at.with_timezone(&self.formatter.timezone());
            return self.formatter.date(local.date_naive());
        }
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return self.formatter.date(date);
        }
        escape_html(s)
    }
}

impl ContentGenerator for EntityTable {
    type Record = FieldRecord;

    fn generate(&self, records: &[FieldRecord]) -> Fragment {
        let mut html = String::new();

        for (index, record) in records.iter().enumerate() {
            if record.is_empty() {
                continue;
            }

            html.push_str(&format!(
                r#"<tr><td colspan="2" style="{}"><strong>{}</strong></td></tr>"#,
                HEADER_CELL_STYLE,
                self.header(index, records.len())
            ));

            for (key, value) in record {
                html.push_str(&format!(
                    r#"<tr><td style="{}"><strong>{}</strong></td><td style="{}">{}</td></tr>"#,
                    LABEL_CELL_STYLE,
                    escape_html(&field_label(key)),
                    VALUE_CELL_STYLE,
                    self.cell_value(value)
                ));
            }
        }

        Fragment::new(html)
    }
}
