//! Application-wide constants
//!
//! Centralizes the hardcoded values of the order desk so they can be
//! tuned in one place.

/// Order row constants
pub mod orders {
    /// Exchange code sent with every order (TSE)
    pub const DEFAULT_EXCHANGE: u32 = 9;

    /// Shares per order (one trading unit)
    pub const DEFAULT_QTY: u32 = 100;

    pub const DEFAULT_BATCH_NAME: &str = "manual batch";

    /// Initial value of the limit price / distance inputs on a new row
    pub const DEFAULT_LIMIT_PRICE: i64 = 1;
    pub const DEFAULT_DISTANCE: i64 = 1;

    /// Accepted range of the price and distance inputs
    pub const MIN_INPUT: i64 = 1;
    pub const MAX_INPUT: i64 = 1_000_000_000;

    /// Separator used when showing all form errors on one line
    pub const ERROR_SEPARATOR: &str = " / ";
}

/// Local persistence constants
pub mod store {
    pub const DEFAULT_DATA_DIR: &str = "data";
    pub const ORDERS_FILE: &str = "orders.jsonl";
    pub const BATCH_EVENTS_FILE: &str = "batch_events.jsonl";
    pub const ACCOUNTS_FILE: &str = "api_accounts.jsonl";
}

/// Process-level constants
pub mod app {
    pub const LOCK_FILE_NAME: &str = "trade_automation_app.lock";
    pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
    pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";
    pub const CONFIG_PATH_ENV: &str = "KABUS_CONFIG";
    pub const EVENT_BUS_CAPACITY: usize = 256;
    pub const READY_STATUS: &str = "Ready.";
}

/// Logging event names for structured logging
pub mod events {
    pub const BATCH_QUEUED: &str = "batch_queued";
    pub const BATCH_SCHEDULED: &str = "batch_scheduled";
    pub const BATCH_DUE: &str = "batch_due";
    pub const SUBMIT_REJECTED: &str = "submit_rejected";
    pub const ACCOUNT_SAVED: &str = "account_saved";
}
