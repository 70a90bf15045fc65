use crate::error::ValidationErrors;

use super::types::{OrderDefaults, OrderRowInput, OrderSubmission, RunPlan};
use super::validation::validate_rows;

/// Turn validated rows into submissions.
///
/// Rows without a symbol are skipped. Callers are expected to have run
/// [`validate_rows`] first; use [`prepare_submission`] to do both.
pub fn normalize(
    rows: &[OrderRowInput],
    plan: &RunPlan,
    defaults: &OrderDefaults,
) -> Vec<OrderSubmission> {
    rows.iter()
        .filter(|row| !row.trimmed_symbol().is_empty())
        .map(|row| OrderSubmission::from_row(row, plan, defaults))
        .collect()
}

/// Validate, then normalize. Submission is gated on an empty error list.
pub fn prepare_submission(
    rows: &[OrderRowInput],
    plan: &RunPlan,
    defaults: &OrderDefaults,
) -> Result<Vec<OrderSubmission>, ValidationErrors> {
    let errors = validate_rows(rows);
    if !errors.is_empty() {
        return Err(ValidationErrors(errors));
    }
    Ok(normalize(rows, plan, defaults))
}
