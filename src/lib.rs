//! kabus_trader - order desk for a broker trading API
//!
//! This library provides the order table, validation and normalization of
//! order rows, and the handoff of validated batches to an order sink.

pub mod api;
pub mod bus;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod lock;
pub mod orders;
pub mod services;
pub mod store;

// Re-export commonly used types
pub use bus::EventBus;
pub use config::AppConfig;
pub use events::{BatchEvent, Event};
pub use orders::{prepare_submission, validate_rows, OrderRowInput, OrderSubmission, OrderTable};

#[cfg(test)]
mod config_tests;
#[cfg(test)]
mod events_tests;
