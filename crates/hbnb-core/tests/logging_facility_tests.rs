#![allow(clippy::unwrap_used, clippy::expect_used)]

use hbnb_core::core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};
use hbnb_core::errors::HbnbError;
use hbnb_core::logging_facility::test_capture::init_test_capture;
use hbnb_core::{log_op_end, log_op_error, log_op_start};

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name);

    capture.assert_event_exists(op_name, EVENT_START);
}

#[test]
fn test_log_op_end_macro_records_duration() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42);

    let end_events: Vec<_> = capture
        .events_for(op_name)
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END))
        .collect();
    assert_eq!(end_events.len(), 1, "Should have exactly one end event");
    assert_eq!(end_events[0].fields.get("duration_ms"), Some(&"42".to_string()));
}

#[test]
fn test_log_op_error_includes_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = HbnbError::InstanceNotFound {
        key: "User.1".to_string(),
    };
    log_op_error!(op_name, err, duration_ms = 10);

    let error_event = capture
        .events_for(op_name)
        .into_iter()
        .find(|e| e.event.as_deref() == Some(EVENT_END_ERROR))
        .expect("Should have error event");
    assert_eq!(
        error_event.fields.get("err_code"),
        Some(&"ERR_NOT_FOUND".to_string())
    );
    assert_eq!(error_event.level, tracing::Level::WARN);
}

#[test]
fn test_extra_fields_are_captured() {
    let capture = init_test_capture();
    let op_name = "test_log_macros_fields_unique_4";

    log_op_start!(op_name, entity_kind = "Place", entity_count = 3);

    let start_event = capture
        .events_for(op_name)
        .into_iter()
        .next()
        .expect("Should have start event");
    assert_eq!(
        start_event.fields.get("entity_kind"),
        Some(&"Place".to_string())
    );
    assert_eq!(start_event.fields.get("entity_count"), Some(&"3".to_string()));
    assert!(start_event
        .component
        .as_deref()
        .unwrap_or_default()
        .starts_with("logging_facility_tests"));
}

#[test]
#[should_panic(expected = "Expected event")]
fn test_assert_event_exists_fails_for_missing_event() {
    let capture = init_test_capture();

    capture.assert_event_exists("nonexistent_op_truly_unique_999", EVENT_START);
}
