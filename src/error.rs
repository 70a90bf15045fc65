//! Custom error types for the order desk
//!
//! Provides structured, typed errors instead of generic Box<dyn Error>

use thiserror::Error;
use uuid::Uuid;

use crate::constants::orders::ERROR_SEPARATOR;

/// One problem found in the order form.
///
/// `row` is the 1-based position of the offending row as the operator sees it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("add at least one order row.")]
    NoRows,

    #[error("row {row}: symbol required")]
    MissingSymbol { row: usize },

    #[error("row {row}: limit price must be ≥ 1")]
    LimitPriceTooLow { row: usize },

    #[error("row {row}: stop-loss distance must be ≥ 1")]
    StopLossTooLow { row: usize },

    #[error("row {row}: take-profit distance must be ≥ 1")]
    TakeProfitTooLow { row: usize },
}

impl ValidationError {
    /// Row the error belongs to, `None` for form-wide errors.
    pub fn row(&self) -> Option<usize> {
        match self {
            ValidationError::NoRows => None,
            ValidationError::MissingSymbol { row }
            | ValidationError::LimitPriceTooLow { row }
            | ValidationError::StopLossTooLow { row }
            | ValidationError::TakeProfitTooLow { row } => Some(*row),
        }
    }
}

/// Every validation problem of a form, in row order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", join_messages(.0))]
pub struct ValidationErrors(pub Vec<ValidationError>);

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(ERROR_SEPARATOR)
}

impl ValidationErrors {
    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Order table errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TableError {
    #[error("Row not found: {0}")]
    RowNotFound(u64),
}

/// Local store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Batch not found: {0}")]
    BatchNotFound(Uuid),

    #[error("Invalid account: {0}")]
    InvalidAccount(String),

    #[error("Store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Single-instance lock errors
#[derive(Error, Debug)]
pub enum LockError {
    #[error("Another instance is already running{}", owner_suffix(.pid))]
    AlreadyRunning { pid: Option<u32> },

    #[error("Lock file error: {0}")]
    Io(#[from] std::io::Error),
}

fn owner_suffix(pid: &Option<u32>) -> String {
    pid.map(|p| format!(" (pid {})", p)).unwrap_or_default()
}

/// Submission errors
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("Order form is invalid: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Order sink error: {0}")]
    Store(#[from] StoreError),

    #[error("Scheduler error: {0}")]
    Schedule(String),
}

/// Top-level application errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Lock error: {0}")]
    Lock(#[from] LockError),

    #[error("Scheduler error: {0}")]
    Scheduler(String),
}

impl From<tokio_cron_scheduler::JobSchedulerError> for SubmitError {
    fn from(err: tokio_cron_scheduler::JobSchedulerError) -> Self {
        SubmitError::Schedule(err.to_string())
    }
}

impl From<tokio_cron_scheduler::JobSchedulerError> for AppError {
    fn from(err: tokio_cron_scheduler::JobSchedulerError) -> Self {
        AppError::Scheduler(err.to_string())
    }
}
