//! The editable order table.
//!
//! Rows are kept in display order and each carries a [`RowId`] assigned at
//! creation. Ids are never reused, so a row can be addressed after other
//! rows are removed around it.

use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::orders::{ERROR_SEPARATOR, MAX_INPUT};
use crate::error::TableError;

use super::types::{OrderRowInput, RowPatch, RunMode, RunPlan};
use super::validation::validate_rows;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(pub u64);

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OrderRow {
    pub id: RowId,
    pub input: OrderRowInput,
}

/// Result of validating the current form, for the submit gate and error line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FormState {
    pub errors: Vec<String>,
    pub error_text: String,
    pub submit_enabled: bool,
}

#[derive(Clone, Debug)]
pub struct OrderTable {
    rows: Vec<OrderRow>,
    next_id: u64,
    run_mode: RunMode,
    scheduled_at: NaiveDateTime,
}

impl Default for OrderTable {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderTable {
    /// A table with one blank row, set to run immediately.
    pub fn new() -> Self {
        let mut table = Self {
            rows: Vec::new(),
            next_id: 1,
            run_mode: RunMode::Immediate,
            scheduled_at: now_to_second(),
        };
        table.add_row();
        table
    }

    pub fn add_row(&mut self) -> RowId {
        let id = RowId(self.next_id);
        self.next_id += 1;
        self.rows.push(OrderRow {
            id,
            input: OrderRowInput::default(),
        });
        debug!("[DESK] Added row {} (rows: {})", id.0, self.rows.len());
        id
    }

    pub fn update_row(&mut self, id: RowId, patch: RowPatch) -> Result<(), TableError> {
        let row = self
            .rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(TableError::RowNotFound(id.0))?;
        patch.apply(&mut row.input);
        // Inputs top out where the entry controls do.
        let input = &mut row.input;
        input.limit_price = input.limit_price.min(MAX_INPUT);
        input.stop_loss_distance = input.stop_loss_distance.min(MAX_INPUT);
        input.take_profit_distance = input.take_profit_distance.min(MAX_INPUT);
        Ok(())
    }

    /// Remove the given rows. Unknown ids are ignored. The table never ends
    /// up empty: removing the last row leaves a fresh blank one.
    pub fn remove_rows(&mut self, ids: &[RowId]) -> usize {
        let before = self.rows.len();
        self.rows.retain(|r| !ids.contains(&r.id));
        let removed = before - self.rows.len();
        if self.rows.is_empty() {
            self.add_row();
        }
        debug!("[DESK] Removed {} row(s)", removed);
        removed
    }

    /// Back to a single blank row, immediate run, scheduled time reset to now.
    pub fn clear(&mut self) {
        self.rows.clear();
        self.add_row();
        self.run_mode = RunMode::Immediate;
        self.scheduled_at = now_to_second();
    }

    pub fn set_run_mode(&mut self, mode: RunMode) {
        self.run_mode = mode;
    }

    pub fn set_scheduled_at(&mut self, at: NaiveDateTime) {
        self.scheduled_at = at;
    }

    pub fn run_mode(&self) -> RunMode {
        self.run_mode
    }

    pub fn scheduled_at(&self) -> NaiveDateTime {
        self.scheduled_at
    }

    /// The scheduled-time control only shows for scheduled runs.
    pub fn schedule_visible(&self) -> bool {
        self.run_mode == RunMode::Scheduled
    }

    pub fn limit_price_enabled(&self, id: RowId) -> Option<bool> {
        self.row(id).map(|r| r.input.limit_price_enabled())
    }

    pub fn rows(&self) -> &[OrderRow] {
        &self.rows
    }

    pub fn row(&self, id: RowId) -> Option<&OrderRow> {
        self.rows.iter().find(|r| r.id == id)
    }

    /// 1-based display position of a row.
    pub fn position(&self, id: RowId) -> Option<usize> {
        self.rows.iter().position(|r| r.id == id).map(|idx| idx + 1)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn inputs(&self) -> Vec<OrderRowInput> {
        self.rows.iter().map(|r| r.input.clone()).collect()
    }

    /// The scheduled time only counts when the run mode says so.
    pub fn run_plan(&self) -> RunPlan {
        match self.run_mode {
            RunMode::Immediate => RunPlan::Immediate,
            RunMode::Scheduled => RunPlan::Scheduled {
                at: self.scheduled_at,
            },
        }
    }

    pub fn form_state(&self) -> FormState {
        let errors: Vec<String> = validate_rows(&self.inputs())
            .iter()
            .map(ToString::to_string)
            .collect();
        FormState {
            error_text: errors.join(ERROR_SEPARATOR),
            submit_enabled: errors.is_empty(),
            errors,
        }
    }
}

fn now_to_second() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}
