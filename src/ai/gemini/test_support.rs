use wiremock::matchers::{method, path_regex};
use wiremock::{MockBuilder, ResponseTemplate};

pub const STREAM_GENERATE_CONTENT_PATH_REGEX: &str = r"^/v1beta/models/[^/]+:streamGenerateContent$";

pub fn post_path_regex(pattern: &str) -> MockBuilder {
    wiremock::Mock::given(method("POST")).and(path_regex(pattern))
}

/// Build an SSE body with one `data:` event per JSON value.
pub fn sse_response(events: &[serde_json::Value]) -> ResponseTemplate {
    let body: String = events
        .iter()
        .map(|event| format!("data: {}\r\n\r\n", event))
        .collect();

    ResponseTemplate::new(200).set_body_raw(body, "text/event-stream")
}
