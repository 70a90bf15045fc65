//! Order form validation
//!
//! Pure functions: no I/O and no hidden state, so the desk can re-run them
//! on every edit and get the same answer for the same rows.

use crate::constants::orders::MIN_INPUT;
use crate::error::ValidationError;

use super::types::{EntryType, OrderRowInput};

/// Check one row. `row` is its 1-based position.
///
/// A missing symbol stops the checks for that row; the numeric rules are
/// all evaluated so every problem surfaces at once. The limit price is
/// only looked at for limit entries, since the control is disabled otherwise.
pub fn validate_row(row: usize, input: &OrderRowInput) -> Vec<ValidationError> {
    if input.trimmed_symbol().is_empty() {
        return vec![ValidationError::MissingSymbol { row }];
    }

    let mut errors = Vec::new();
    if input.entry_type == EntryType::Limit && input.limit_price < MIN_INPUT {
        errors.push(ValidationError::LimitPriceTooLow { row });
    }
    if input.stop_loss_distance < MIN_INPUT {
        errors.push(ValidationError::StopLossTooLow { row });
    }
    if input.take_profit_distance < MIN_INPUT {
        errors.push(ValidationError::TakeProfitTooLow { row });
    }
    errors
}

/// Validate the whole form. An empty result means submission may proceed.
pub fn validate_rows(rows: &[OrderRowInput]) -> Vec<ValidationError> {
    if rows.is_empty() {
        return vec![ValidationError::NoRows];
    }

    rows.iter()
        .enumerate()
        .flat_map(|(idx, input)| validate_row(idx + 1, input))
        .collect()
}
