//! Cleanup for model output that wraps JSON in markdown fences.

/// Strip markdown code fences and surrounding whitespace from a model reply.
pub fn clean_json_response(raw: &str) -> &str {
    let mut s = raw.trim();
    if let Some(rest) = s.strip_prefix("```json") {
        s = rest;
    } else if let Some(rest) = s.strip_prefix("```") {
        s = rest;
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest;
    }
    s.trim()
}
