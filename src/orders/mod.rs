pub mod normalize;
pub mod table;
pub mod types;
pub mod validation;

pub use normalize::{normalize, prepare_submission};
pub use table::{FormState, OrderRow, OrderTable, RowId};
pub use types::{
    EntryType, OrderDefaults, OrderRowInput, OrderSubmission, Product, RowPatch, RunMode, RunPlan,
    Side,
};
pub use validation::{validate_row, validate_rows};

#[cfg(test)]
mod table_tests;
