//! Assertion helpers for tests.

use axum::http::StatusCode;
use pretty_assertions::assert_eq;

use super::app::TestResponse;
use backdrop::models::Rgb;

/// Assert response has expected status code
pub fn assert_status(response: &TestResponse, expected: StatusCode) {
    assert_eq!(
        response.status, expected,
        "Expected status {}, got {}. Body: {}",
        expected,
        response.status,
        response.text()
    );
}

/// Assert response is OK (200)
pub fn assert_ok(response: &TestResponse) {
    assert_status(response, StatusCode::OK);
}

/// Assert JSON error response has expected status field and an error message
pub fn assert_json_error(response: &TestResponse, expected_status: StatusCode) {
    assert_status(response, expected_status);
    let json: serde_json::Value = response.json();
    assert_eq!(
        json["status"].as_u64(),
        Some(expected_status.as_u16() as u64),
        "Full response: {}",
        serde_json::to_string_pretty(&json).unwrap()
    );
    assert!(json["error"].is_string(), "Expected error message");
}

/// Assert an analyze response and return the color it reports
pub fn assert_valid_analyze_response(response: &TestResponse) -> Rgb {
    assert_ok(response);
    let json: serde_json::Value = response.json();

    let correlation_id = json["correlation_id"].as_str().unwrap();
    assert_eq!(correlation_id.len(), 36, "Unexpected id {correlation_id}");

    let label = json["label_color"].as_str().unwrap();
    assert!(label == "white" || label == "black", "Unexpected label {label}");

    json["color"].as_str().unwrap().parse().unwrap()
}

/// Assert two colors differ by at most `tolerance` per channel
pub fn assert_color_near(actual: Rgb, expected: Rgb, tolerance: u8) {
    let close = actual.r.abs_diff(expected.r) <= tolerance
        && actual.g.abs_diff(expected.g) <= tolerance
        && actual.b.abs_diff(expected.b) <= tolerance;
    assert!(close, "Expected {expected} (±{tolerance}), got {actual}");
}
