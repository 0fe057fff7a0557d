use std::sync::{Arc, Mutex};

use serde_json::json;

use super::*;
use crate::config::{ContactSettings, FormEncoding};
use crate::error::{HttpError, SubmitError};
use crate::http::RequestBody;
use crate::http::fake::{FakeClient, Recorded};
use crate::storage::{MemoryStore, StoreHandle, read_key, write_key};

const MIN: i64 = 60_000;
const NOW: i64 = 1_700_000_000_000;

fn store() -> StoreHandle {
    Arc::new(Mutex::new(MemoryStore::default()))
}

fn settings() -> ContactSettings {
    ContactSettings {
        endpoint: "https://forms.example.com/f/abc".to_string(),
        ..ContactSettings::default()
    }
}

fn filled(settings: ContactSettings, store: StoreHandle) -> ContactForm {
    let mut form = ContactForm::new(settings, store);
    form.open(NOW);
    *form.field_mut(Field::Alias).unwrap() = "anon".to_string();
    *form.field_mut(Field::Message).unwrap() = "missing track 12".to_string();
    form
}

#[test]
fn honeypot_rejects_silently_without_request() {
    let mut form = filled(settings(), store());
    *form.field_mut(Field::Honeypot).unwrap() = "http://spam".to_string();
    assert_eq!(form.begin_submit(NOW), Err(Rejected::Honeypot));
    assert_eq!(form.status(), &FormStatus::Idle);
    assert_eq!(form.fields().alias, "anon");
}

#[test]
fn cooldown_blocks_on_open_and_submit_with_rounded_up_minutes() {
    let store = store();
    write_key(&store, COOLDOWN_KEY, &(NOW - 4 * MIN - 1).to_string());
    let mut form = filled(settings(), store.clone());
    assert_eq!(
        form.status(),
        &FormStatus::RateLimited {
            remaining_minutes: 11
        }
    );
    assert_eq!(form.begin_submit(NOW), Err(Rejected::Busy));

    // One millisecond into the window still counts as a whole window.
    write_key(&store, COOLDOWN_KEY, &(NOW - 1).to_string());
    assert_eq!(form.remaining_minutes(NOW), Some(15));
    assert_eq!(form.remaining_minutes(NOW + 15 * MIN), None);
}

#[test]
fn cooldown_checked_again_at_submit_time() {
    let store = store();
    let mut form = filled(settings(), store.clone());
    assert_eq!(form.status(), &FormStatus::Idle);

    write_key(&store, COOLDOWN_KEY, &NOW.to_string());
    assert_eq!(form.begin_submit(NOW + 30_000), Err(Rejected::Invalid));
    assert_eq!(
        form.status(),
        &FormStatus::RateLimited {
            remaining_minutes: 15
        }
    );
}

#[test]
fn unreadable_cooldown_timestamp_is_ignored() {
    let store = store();
    write_key(&store, COOLDOWN_KEY, "yesterday");
    let form = filled(settings(), store);
    assert_eq!(form.remaining_minutes(NOW), None);
    assert_eq!(form.status(), &FormStatus::Idle);
}

#[test]
fn captcha_required_when_configured() {
    let cfg = ContactSettings {
        captcha: true,
        ..settings()
    };
    let mut form = filled(cfg, store());
    assert_eq!(form.begin_submit(NOW), Err(Rejected::Invalid));
    assert_eq!(form.status(), &FormStatus::Error(FormError::CaptchaMissing));

    *form.field_mut(Field::Captcha).unwrap() = "token".to_string();
    let submission = form.begin_submit(NOW).unwrap();
    match submission.body {
        RequestBody::Multipart(fields) => assert!(
            fields.contains(&("g-recaptcha-response".to_string(), "token".to_string()))
        ),
        other => panic!("unexpected body {other:?}"),
    }
}

#[test]
fn required_fields_and_endpoint_are_checked() {
    let mut form = ContactForm::new(settings(), store());
    form.open(NOW);
    assert_eq!(form.begin_submit(NOW), Err(Rejected::Invalid));
    assert_eq!(form.status(), &FormStatus::Error(FormError::Required));

    let mut form = filled(ContactSettings::default(), store());
    assert_eq!(form.begin_submit(NOW), Err(Rejected::Invalid));
    assert_eq!(form.status(), &FormStatus::Error(FormError::Unavailable));
}

#[test]
fn multipart_body_carries_fields_and_honeypot() {
    let mut form = filled(settings(), store());
    let submission = form.begin_submit(NOW).unwrap();
    assert_eq!(form.status(), &FormStatus::Submitting);
    assert_eq!(submission.endpoint, "https://forms.example.com/f/abc");
    assert_eq!(
        submission.body,
        RequestBody::Multipart(vec![
            ("alias".to_string(), "anon".to_string()),
            ("message".to_string(), "missing track 12".to_string()),
            ("_gotcha".to_string(), String::new()),
        ])
    );

    // No second submission while one is in flight, and fields are frozen.
    assert_eq!(form.begin_submit(NOW), Err(Rejected::Busy));
    assert!(form.field_mut(Field::Alias).is_none());
}

#[test]
fn json_encoding_sends_a_field_map() {
    let cfg = ContactSettings {
        encoding: FormEncoding::Json,
        ..settings()
    };
    let mut form = filled(cfg, store());
    let submission = form.begin_submit(NOW).unwrap();
    assert_eq!(
        submission.body,
        RequestBody::Json(json!({
            "alias": "anon",
            "message": "missing track 12",
            "_gotcha": "",
        }))
    );
}

#[test]
fn successful_send_records_cooldown_and_resets() {
    let store = store();
    let mut form = filled(settings(), store.clone());
    let submission = form.begin_submit(NOW).unwrap();

    let http = FakeClient::new().respond(200, r#"{"ok":true}"#);
    let result = submission.send(&http);
    assert!(result.is_ok());
    assert!(matches!(
        http.recorded().as_slice(),
        [Recorded::Post(url, _)] if url == "https://forms.example.com/f/abc"
    ));

    form.finish(result, NOW);
    assert_eq!(form.status(), &FormStatus::Success);
    assert_eq!(form.fields(), &Fields::default());
    assert_eq!(read_key(&store, COOLDOWN_KEY), Some(NOW.to_string()));

    assert!(!form.should_auto_close(NOW + 2_999));
    assert!(form.should_auto_close(NOW + 3_000));

    form.open(NOW + MIN);
    assert_eq!(
        form.status(),
        &FormStatus::RateLimited {
            remaining_minutes: 14
        }
    );
    assert!(!form.should_auto_close(NOW + 10 * MIN));
}

#[test]
fn server_rejection_keeps_fields_and_shows_reason() {
    let store = store();
    let mut form = filled(settings(), store.clone());
    let submission = form.begin_submit(NOW).unwrap();

    let http = FakeClient::new().respond(
        422,
        r#"{"errors":[{"message":"email is invalid"},{"message":"too short"}]}"#,
    );
    let result = submission.send(&http);
    assert!(matches!(
        result,
        Err(SubmitError::Rejected { status: 422, .. })
    ));
    form.finish(result, NOW);
    assert_eq!(
        form.status(),
        &FormStatus::Error(FormError::Server("email is invalid, too short".to_string()))
    );
    assert_eq!(form.fields().alias, "anon");
    assert_eq!(read_key(&store, COOLDOWN_KEY), None);

    // A failed attempt can be retried.
    assert!(form.begin_submit(NOW).is_ok());
}

#[test]
fn transport_failure_is_generic() {
    let mut form = filled(settings(), store());
    form.begin_submit(NOW).unwrap();
    form.finish(
        Err(SubmitError::Http(HttpError::Transport {
            url: "https://forms.example.com/f/abc".to_string(),
            message: "timed out".to_string(),
        })),
        NOW,
    );
    assert_eq!(form.status(), &FormStatus::Error(FormError::Failed));
}

#[test]
fn server_message_reads_errors_or_error() {
    assert_eq!(
        server_message(br#"{"errors":[{"message":"a"},{"code":"x"},{"message":"b"}]}"#),
        Some("a, b".to_string())
    );
    assert_eq!(
        server_message(br#"{"error":"form not found"}"#),
        Some("form not found".to_string())
    );
    assert_eq!(
        server_message(br#"{"errors":[],"error":"fallback"}"#),
        Some("fallback".to_string())
    );
    assert_eq!(server_message(b"<html>"), None);
    assert_eq!(server_message(br#"{"ok":false}"#), None);
}
