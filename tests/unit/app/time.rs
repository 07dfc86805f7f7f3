use ::time::macros::datetime;

use super::*;

#[test]
fn default_format_is_twelve_hour_without_padding() {
    let app = TimeApp::new(TimeOptions {
        utc_offset_hours: Some(0),
        ..TimeOptions::default()
    })
    .unwrap();
    assert_eq!(app.label(datetime!(2024-03-01 14:05 UTC)).unwrap(), "2:05");
    assert_eq!(app.label(datetime!(2024-03-01 00:30 UTC)).unwrap(), "12:30");
}

#[test]
fn offset_is_applied() {
    let app = TimeApp::new(TimeOptions {
        format: "[hour]:[minute]".to_owned(),
        utc_offset_hours: Some(-5),
        ..TimeOptions::default()
    })
    .unwrap();
    assert_eq!(app.label(datetime!(2024-03-01 14:05 UTC)).unwrap(), "09:05");
}

#[test]
fn bad_format_is_rejected() {
    let err = TimeApp::new(TimeOptions {
        format: "[nonsense".to_owned(),
        ..TimeOptions::default()
    });
    assert!(matches!(err, Err(DotboardError::Validation(_))));
}
