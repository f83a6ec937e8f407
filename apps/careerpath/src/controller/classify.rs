//! Outcome classification: turns a raw `HttpResponse` into a typed payload or
//! an `ErrorInfo`. Shared by the request controller and the CV client.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::errors::{ErrorInfo, MSG_INVALID_FORMAT, MSG_NO_DATA};
use crate::flows::FlowConfig;
use crate::transport::HttpResponse;

/// Classifies a flow response.
///
/// Order: status, then JSON parse, then shape check, then typed decode. A body that
/// passes the shape check but still fails to decode (e.g. numbers where
/// strings are expected) is an invalid format, not incomplete data.
pub fn classify_response<P: DeserializeOwned>(
    flow: &FlowConfig,
    response: &HttpResponse,
) -> Result<P, ErrorInfo> {
    let body = success_body(response)?;
    flow.shape.check(&body)?;
    decode(body)
}

/// Returns the parsed JSON body of a 2xx response, or the classified failure.
pub fn success_body(response: &HttpResponse) -> Result<Value, ErrorInfo> {
    if !response.is_success() {
        warn!("Backend returned status {}", response.status);
        return Err(ErrorInfo::from_status(
            response.status,
            body_error_message(&response.body),
        ));
    }

    if response.body.trim().is_empty() {
        return Err(ErrorInfo::server(MSG_NO_DATA));
    }

    serde_json::from_str(&response.body).map_err(|e| {
        warn!("Response body is not valid JSON: {e}");
        ErrorInfo::server(MSG_INVALID_FORMAT)
    })
}

/// Decodes an already-checked body into its payload type.
pub fn decode<P: DeserializeOwned>(body: Value) -> Result<P, ErrorInfo> {
    serde_json::from_value(body).map_err(|e| {
        warn!("Response body does not match the expected structure: {e}");
        ErrorInfo::server(MSG_INVALID_FORMAT)
    })
}

/// Pulls a human-readable error out of an error response body.
/// The backend uses `message` on the guidance endpoints and `error` elsewhere.
fn body_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .filter_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(str::to_string)
}
