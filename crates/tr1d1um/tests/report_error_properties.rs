//! Property tests for error classification.

use std::fmt;

use http::StatusCode;
use proptest::prelude::*;
use tr1d1um::{report_error, timeout_status, Tr1d1umResponse, TIMEOUT_MESSAGE};

#[derive(Debug)]
struct TextError(String);

impl fmt::Display for TextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for TextError {}

fn classify(text: String) -> Tr1d1umResponse {
    let mut resp = Tr1d1umResponse::new();
    report_error(Some(&TextError(text)), &mut resp);
    resp
}

fn message_of(resp: &Tr1d1umResponse) -> String {
    let body: serde_json::Value = serde_json::from_slice(&resp.body).unwrap();
    body["message"].as_str().unwrap().to_owned()
}

prop_compose! {
    fn timeout_text()(
        prefix in "[ -~]{0,40}",
        marker in prop_oneof![
            Just("context canceled"),
            Just("context deadline exceeded"),
            Just("deadline exceeded"),
        ],
    ) -> String {
        format!("{prefix}{marker}")
    }
}

prop_compose! {
    fn client_timeout_text()(
        prefix in "[ -~]{0,40}",
        suffix in "[ -~]{0,40}",
    ) -> String {
        format!("{prefix}Client.Timeout exceeded{suffix}")
    }
}

proptest! {
    #[test]
    fn test_timeout_suffixes_map_to_timeout(text in timeout_text()) {
        let resp = classify(text);
        prop_assert_eq!(resp.code, timeout_status());
        prop_assert_eq!(message_of(&resp), TIMEOUT_MESSAGE);
    }

    #[test]
    fn test_client_timeout_anywhere_maps_to_timeout(text in client_timeout_text()) {
        let resp = classify(text);
        prop_assert_eq!(resp.code, timeout_status());
    }

    #[test]
    fn test_other_errors_map_to_internal(text in "[a-z ]{0,60}") {
        prop_assume!(!text.ends_with("context canceled"));
        prop_assume!(!text.ends_with("deadline exceeded"));

        let resp = classify(text);
        prop_assert_eq!(resp.code, StatusCode::INTERNAL_SERVER_ERROR);
        prop_assert_eq!(message_of(&resp), "");
    }

    #[test]
    fn test_body_is_always_json(text in ".{0,80}") {
        let resp = classify(text);
        prop_assert_eq!(resp.content_type(), Some("application/json"));
        prop_assert!(serde_json::from_slice::<serde_json::Value>(&resp.body).is_ok());
    }

    #[test]
    fn test_canceled_in_the_middle_is_not_a_timeout(suffix in "[a-z]{1,20}") {
        let resp = classify(format!("context canceled{suffix}"));
        prop_assert_eq!(resp.code, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
