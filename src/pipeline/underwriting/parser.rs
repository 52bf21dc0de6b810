use super::types::DealDecision;
use super::UnderwritingError;

/// Remove a markdown code fence around the reply, if there is one.
///
/// Handles a ```` ```json ```` fence (any case) or a leading bare
/// ```` ``` ```` fence, with or without the closing fence. Text that is not
/// fenced is returned trimmed.
pub fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();

    const JSON_FENCE: &str = "```json";

    // ASCII lowercasing keeps byte offsets, so the index applies to `trimmed`.
    let (body, fenced) = if let Some(start) = trimmed.to_ascii_lowercase().find(JSON_FENCE) {
        (&trimmed[start + JSON_FENCE.len()..], true)
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        (rest, true)
    } else {
        (trimmed, false)
    };

    if !fenced {
        return body;
    }

    let body = match body.find("```") {
        Some(end) => &body[..end],
        None => body,
    };
    body.trim()
}

/// Parse the decision engine's reply into a `DealDecision`.
pub fn parse_decision(response: &str) -> Result<DealDecision, UnderwritingError> {
    let json = strip_code_fence(response);
    if json.is_empty() {
        return Err(UnderwritingError::EmptyResponse);
    }
    serde_json::from_str(json).map_err(|e| UnderwritingError::MalformedDecision(e.to_string()))
}
