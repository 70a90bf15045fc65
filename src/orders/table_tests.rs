//! Unit tests for the order table: row identity, visibility and form state.

#[cfg(test)]
mod table_tests {
    use chrono::NaiveDate;

    use crate::error::TableError;
    use crate::orders::table::*;
    use crate::orders::types::*;

    fn symbol(s: &str) -> RowPatch {
        RowPatch {
            symbol: Some(s.to_string()),
            ..RowPatch::default()
        }
    }

    // ============= Row Lifecycle Tests =============

    #[test]
    fn test_new_table_has_one_blank_row() {
        let table = OrderTable::new();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].input, OrderRowInput::default());
        assert_eq!(table.run_mode(), RunMode::Immediate);
        assert!(!table.schedule_visible());
    }

    #[test]
    fn test_row_ids_are_stable_and_unique() {
        let mut table = OrderTable::new();
        let first = table.rows()[0].id;
        let second = table.add_row();
        let third = table.add_row();

        table.remove_rows(&[second]);
        let fourth = table.add_row();

        assert_ne!(fourth, second);
        assert_eq!(table.position(first), Some(1));
        assert_eq!(table.position(third), Some(2));
        assert_eq!(table.position(fourth), Some(3));
        assert_eq!(table.position(second), None);
    }

    #[test]
    fn test_remove_all_rows_leaves_fresh_row() {
        let mut table = OrderTable::new();
        let a = table.rows()[0].id;
        let b = table.add_row();
        table.update_row(a, symbol("7203")).unwrap();

        let removed = table.remove_rows(&[a, b]);

        assert_eq!(removed, 2);
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].input, OrderRowInput::default());
        assert!(table.rows()[0].id != a && table.rows()[0].id != b);
    }

    #[test]
    fn test_update_unknown_row() {
        let mut table = OrderTable::new();
        let err = table.update_row(RowId(99), symbol("7203")).unwrap_err();
        assert_eq!(err, TableError::RowNotFound(99));
    }

    #[test]
    fn test_update_clamps_to_input_ceiling() {
        let mut table = OrderTable::new();
        let id = table.rows()[0].id;
        table
            .update_row(
                id,
                RowPatch {
                    take_profit_distance: Some(5_000_000_000),
                    ..RowPatch::default()
                },
            )
            .unwrap();
        assert_eq!(table.row(id).unwrap().input.take_profit_distance, 1_000_000_000);
    }

    // ============= Visibility Tests =============

    #[test]
    fn test_limit_price_enabled_follows_entry_type() {
        let mut table = OrderTable::new();
        let id = table.rows()[0].id;
        assert_eq!(table.limit_price_enabled(id), Some(false));

        table
            .update_row(
                id,
                RowPatch {
                    entry_type: Some(EntryType::Limit),
                    ..RowPatch::default()
                },
            )
            .unwrap();
        assert_eq!(table.limit_price_enabled(id), Some(true));
        assert_eq!(table.limit_price_enabled(RowId(42)), None);
    }

    #[test]
    fn test_run_plan_follows_run_mode() {
        let mut table = OrderTable::new();
        let at = NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        table.set_scheduled_at(at);
        assert_eq!(table.run_plan(), RunPlan::Immediate);

        table.set_run_mode(RunMode::Scheduled);
        assert!(table.schedule_visible());
        assert_eq!(table.run_plan(), RunPlan::Scheduled { at });
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut table = OrderTable::new();
        let id = table.rows()[0].id;
        table.update_row(id, symbol("7203")).unwrap();
        table.add_row();
        table.set_run_mode(RunMode::Scheduled);

        table.clear();

        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].input.symbol, "");
        assert_eq!(table.run_mode(), RunMode::Immediate);
    }

    // ============= Form State Tests =============

    #[test]
    fn test_form_state_blocks_blank_row() {
        let table = OrderTable::new();
        let state = table.form_state();
        assert!(!state.submit_enabled);
        assert_eq!(state.errors, vec!["row 1: symbol required".to_string()]);
        assert_eq!(state.error_text, "row 1: symbol required");
    }

    #[test]
    fn test_form_state_joins_errors() {
        let mut table = OrderTable::new();
        let first = table.rows()[0].id;
        table.add_row();
        table
            .update_row(
                first,
                RowPatch {
                    symbol: Some("7203".to_string()),
                    stop_loss_distance: Some(0),
                    ..RowPatch::default()
                },
            )
            .unwrap();

        let state = table.form_state();
        assert_eq!(
            state.error_text,
            "row 1: stop-loss distance must be ≥ 1 / row 2: symbol required"
        );
    }

    #[test]
    fn test_form_state_enables_submit() {
        let mut table = OrderTable::new();
        let id = table.rows()[0].id;
        table.update_row(id, symbol("7203")).unwrap();

        let state = table.form_state();
        assert!(state.submit_enabled);
        assert!(state.errors.is_empty());
        assert_eq!(state.error_text, "");
    }
}
