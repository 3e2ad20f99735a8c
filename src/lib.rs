// Infrastructure layer (shared components)
pub mod infrastructure;

// Re-export infrastructure modules at the crate root
pub use infrastructure::config;
pub use infrastructure::error;
pub use infrastructure::metrics;
pub use infrastructure::postgres;

// Composition layer
pub mod content;
pub mod template;

// Delivery layer
pub mod message;
pub mod notification;
pub mod records;
pub mod transport;

// Supporting modules
pub mod telemetry;
