//! Content generators: pre-rendered HTML fragments built from structured records.
//!
//! Each generator turns a slice of records into a [`Fragment`] that is bound
//! to a placeholder and inserted verbatim. An empty slice always yields an
//! empty fragment, which conditional blocks treat as falsy.
//!
//! Entity tables show every field of a record; callers that need to hide
//! internal fields must drop them before handing the record over.

mod attachments;
mod costs;
mod entities;

pub use attachments::AttachmentList;
pub use costs::{Accommodation, AccommodationTable, CostBreakdown, CostLine, CostTable, SportLine};
pub use entities::{EntityTable, FieldRecord};

use crate::template::Fragment;

/// Builds one fragment from an ordered set of records.
///
/// Records are emitted in the order given; generators never sort.
pub trait ContentGenerator {
    type Record;

    fn generate(&self, records: &[Self::Record]) -> Fragment;
}

const HEADER_CELL_STYLE: &str =
    "padding: 10px; background-color: #dbeafe; font-weight: 600;";
const LABEL_CELL_STYLE: &str =
    "padding: 8px; border: 1px solid #e5e7eb; background-color: #f9fafb;";
const VALUE_CELL_STYLE: &str = "padding: 8px; border: 1px solid #e5e7eb;";
const LINE_CELL_STYLE: &str =
    "padding: 12px; border-bottom: 1px solid #e5e7eb; color: #4b5563;";
const TOTAL_CELL_STYLE: &str =
    "padding: 12px; background-color: #f9fafb; font-weight: 700; color: #111827;";
