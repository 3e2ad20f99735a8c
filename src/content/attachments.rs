use super::ContentGenerator;
use crate::template::{escape_html, Fragment};

/// Bullet list naming the files attached to a message
#[derive(Debug, Clone, Copy, Default)]
pub struct AttachmentList;

impl ContentGenerator for AttachmentList {
    type Record = String;

    fn generate(&self, records: &[String]) -> Fragment {
        if records.is_empty() {
            return Fragment::empty();
        }

        let items: String = records
            .iter()
            .map(|name| format!("<li>{}</li>", escape_html(name)))
            .collect();
        Fragment::new(format!(r#"<ul style="margin: 0; padding-left: 20px;">{}</ul>"#, items))
    }
}
