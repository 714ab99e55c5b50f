//! Maps an upstream status code and buffered body onto an [`EventResult`].

use reqwest::StatusCode;
use serde_json::Value;

use crate::result::EventResult;
use crate::retry::RetryableStatus;

/// What the notifier should do with a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Classification {
    Done(EventResult),
    Retryable(RetryableStatus),
}

pub(crate) fn classify(status: StatusCode, body: &[u8]) -> Classification {
    if let Some(retryable) = RetryableStatus::from_status(status) {
        return Classification::Retryable(retryable);
    }

    let result = match status {
        StatusCode::OK | StatusCode::CREATED | StatusCode::ACCEPTED => success(status, body),
        StatusCode::BAD_REQUEST => rejected(status, body),
        _ => unclassified(status, body),
    };
    Classification::Done(result)
}

/// Terminal result for a status the notifier does not interpret
pub(crate) fn unclassified(status: StatusCode, body: &[u8]) -> EventResult {
    EventResult::Error {
        status: status.as_u16().to_string(),
        message: String::new(),
        errors: Some(raw_text(body)),
    }
}

fn success(status: StatusCode, body: &[u8]) -> EventResult {
    match parse_object(body) {
        Some(json) => EventResult::Success {
            status: string_field(&json, "status").unwrap_or_default(),
            message: string_field(&json, "message").unwrap_or_default(),
            dedup_key: string_field(&json, "dedup_key")
                .or_else(|| string_field(&json, "incident_key")),
        },
        None => EventResult::Success {
            status: reason(status),
            message: raw_text(body),
            dedup_key: None,
        },
    }
}

fn rejected(status: StatusCode, body: &[u8]) -> EventResult {
    match parse_object(body) {
        Some(json) => EventResult::Error {
            status: string_field(&json, "status").unwrap_or_default(),
            message: string_field(&json, "message").unwrap_or_default(),
            errors: json
                .get("errors")
                .filter(|errors| !errors.is_null())
                .map(Value::to_string),
        },
        None => EventResult::Error {
            status: reason(status),
            message: raw_text(body),
            errors: None,
        },
    }
}

fn parse_object(body: &[u8]) -> Option<Value> {
    serde_json::from_slice::<Value>(body)
        .ok()
        .filter(Value::is_object)
}

fn string_field(json: &Value, key: &str) -> Option<String> {
    match json.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn reason(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_u16().to_string())
}

pub(crate) fn raw_text(body: &[u8]) -> String {
    String::from_utf8_lossy(body).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn done(status: u16, body: &str) -> EventResult {
        match classify(StatusCode::from_u16(status).unwrap(), body.as_bytes()) {
            Classification::Done(result) => result,
            other => panic!("Expected terminal result, got {other:?}"),
        }
    }

    #[test]
    fn test_success_statuses() {
        let body = r#"{"status":"success","message":"Event processed","dedup_key":"KEY"}"#;
        let expected = EventResult::success("success", "Event processed", Some("KEY"));

        for status in [200, 201, 202] {
            assert_eq!(done(status, body), expected);
        }
    }

    #[test]
    fn test_success_without_dedup_key() {
        let result = done(202, r#"{"status":"success","message":"Event processed"}"#);
        assert_eq!(result, EventResult::success("success", "Event processed", None));
    }

    #[test]
    fn test_success_legacy_incident_key() {
        let result = done(
            200,
            r#"{"status":"success","message":"Event processed","incident_key":"LEGACY"}"#,
        );
        assert_eq!(result.dedup_key(), Some("LEGACY"));
    }

    #[test]
    fn test_dedup_key_preferred_over_incident_key() {
        let result = done(
            200,
            r#"{"status":"success","message":"ok","dedup_key":"NEW","incident_key":"OLD"}"#,
        );
        assert_eq!(result.dedup_key(), Some("NEW"));
    }

    #[test]
    fn test_bad_request_errors_array_kept_verbatim() {
        let result = done(
            400,
            r#"{"status":"invalid event","message":"Event object is invalid","errors":["some error from upstream server..."]}"#,
        );
        assert_eq!(
            result,
            EventResult::error(
                "invalid event",
                "Event object is invalid",
                Some(r#"["some error from upstream server..."]"#)
            )
        );
    }

    #[test]
    fn test_bad_request_malformed_body() {
        let result = done(400, "<html>Bad Request</html>");
        assert_eq!(
            result,
            EventResult::error("Bad Request", "<html>Bad Request</html>", None)
        );
    }

    #[test]
    fn test_unclassified_status_empty_body() {
        assert_eq!(done(403, ""), EventResult::error("403", "", Some("")));
    }

    #[test]
    fn test_unclassified_status_keeps_raw_body() {
        assert_eq!(done(503, "{}"), EventResult::error("503", "", Some("{}")));
    }

    #[test]
    fn test_retryable_statuses() {
        assert_eq!(
            classify(StatusCode::INTERNAL_SERVER_ERROR, b"{}"),
            Classification::Retryable(RetryableStatus::ServerError)
        );
        assert_eq!(
            classify(StatusCode::TOO_MANY_REQUESTS, b""),
            Classification::Retryable(RetryableStatus::RateLimited)
        );
    }
}
