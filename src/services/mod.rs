pub mod submission;

pub use submission::{SubmissionReceipt, SubmissionService};
