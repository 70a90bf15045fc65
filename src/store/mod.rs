pub mod accounts;
pub mod jsonl;
pub mod traits;
pub mod types;

pub use accounts::{AccountStore, ApiAccount};
pub use jsonl::JsonlOrderStore;
pub use traits::{OrderSink, StoreResult};
pub use types::{BatchStatus, BatchSummary, OrderBatch};
