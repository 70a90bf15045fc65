use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::orders::types::SCHEDULE_FORMAT;

#[derive(Clone, Debug, PartialEq)]
pub enum BatchEvent {
    Queued {
        batch_id: Uuid,
        orders: usize,
    },
    Scheduled {
        batch_id: Uuid,
        orders: usize,
        at: NaiveDateTime,
    },
    Due {
        batch_id: Uuid,
    },
}

// Global Event Enum
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Batch(BatchEvent),
    SubmitRejected { errors: Vec<String> },
    AccountSaved { name: String },
}

impl Event {
    /// One-line message for the desk's status line.
    pub fn status_message(&self) -> String {
        match self {
            Event::Batch(BatchEvent::Queued { orders, .. }) => {
                format!("Submitted {} order(s).", orders)
            }
            Event::Batch(BatchEvent::Scheduled { orders, at, .. }) => {
                format!("Scheduled {} order(s) for {}.", orders, at.format(SCHEDULE_FORMAT))
            }
            Event::Batch(BatchEvent::Due { batch_id }) => {
                format!("Scheduled batch {} is due.", batch_id)
            }
            Event::SubmitRejected { errors } => {
                format!("Submission blocked: {} problem(s) in the order form.", errors.len())
            }
            Event::AccountSaved { name } => format!("Saved API account '{}'.", name),
        }
    }
}
