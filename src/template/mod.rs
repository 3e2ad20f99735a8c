//! Mail template system.
//!
//! This module provides:
//! - Template parsing into literal, placeholder and conditional nodes
//! - A read-only, process-wide template cache loaded from disk
//! - The placeholder engine and the value formatting rules it applies
//!
//! # Example
//!
//! ```ignore
//! let store = TemplateStore::new("templates");
//! let template = store.resolve("signup").await?;
//!
//! let context = TemplateContext::new()
//!     .with("name", "Ada")
//!     .with("isFormSignup", true);
//!
//! let html = PlaceholderEngine::default().render_template(&template, &context);
//! ```

mod context;
mod format;
mod parser;
mod store;
mod substitution;
mod types;

pub use context::{Fragment, TemplateContext, Value};
pub use format::{escape_html, field_label, format_number, Formatter};
pub use store::{create_template_store, TemplateStore};
pub use substitution::PlaceholderEngine;
pub use types::{
    is_valid_template_id, MalformedTemplate, Node, Template, TemplateError, TemplateResult,
};

/// Identifiers of the templates shipped with the service
pub mod ids {
    pub const VERIFY_EMAIL: &str = "verify-email";
    pub const SIGNUP: &str = "signup";
    pub const REGISTRATION: &str = "registration";
    pub const PAYMENT_UNCONFIRMED: &str = "payment-unconfirmed";
    pub const PAYMENT_CONFIRMED: &str = "payment-confirmed";

    /// Every shipped template, for startup warming
    pub const ALL: [&str; 5] = [
        VERIFY_EMAIL,
        SIGNUP,
        REGISTRATION,
        PAYMENT_UNCONFIRMED,
        PAYMENT_CONFIRMED,
    ];
}
