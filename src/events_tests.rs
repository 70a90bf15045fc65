//! Unit tests for Events and their status-line rendering.

#[cfg(test)]
mod events_tests {
    use chrono::NaiveDate;
    use uuid::Uuid;

    use crate::events::*;

    #[test]
    fn test_queued_status() {
        let event = Event::Batch(BatchEvent::Queued {
            batch_id: Uuid::new_v4(),
            orders: 3,
        });
        assert_eq!(event.status_message(), "Submitted 3 order(s).");
    }

    #[test]
    fn test_scheduled_status_uses_wall_clock_format() {
        let at = NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(9, 0, 5)
            .unwrap();
        let event = Event::Batch(BatchEvent::Scheduled {
            batch_id: Uuid::new_v4(),
            orders: 1,
            at,
        });
        assert_eq!(event.status_message(), "Scheduled 1 order(s) for 2026-10-19 09:00:05.");
    }

    #[test]
    fn test_due_status_names_batch() {
        let batch_id = Uuid::new_v4();
        let event = Event::Batch(BatchEvent::Due { batch_id });
        assert!(event.status_message().contains(&batch_id.to_string()));
    }

    #[test]
    fn test_rejected_status_counts_errors() {
        let event = Event::SubmitRejected {
            errors: vec!["row 1: symbol required".to_string(), "row 2: symbol required".to_string()],
        };
        assert_eq!(
            event.status_message(),
            "Submission blocked: 2 problem(s) in the order form."
        );
    }

    #[test]
    fn test_account_saved_status() {
        let event = Event::AccountSaved { name: "kabu-main".to_string() };
        assert_eq!(event.status_message(), "Saved API account 'kabu-main'.");
    }
}
