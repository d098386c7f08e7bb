//! Probe result extraction
//!
//! The probe agent prints its results as one JSON array to its log stream,
//! possibly surrounded by other output.

use patrol_core::domain::probe::ProbeResult;

use crate::error::{Result, RunError};

/// Parses the agent's log text into probe results
///
/// Entries are passed through as the agent wrote them. When the output holds
/// several arrays, the one with the most results wins; earlier ones on a tie.
pub fn extract(raw: &str) -> Result<Vec<ProbeResult>> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(parse_error("agent produced no output", raw));
    }

    let whole = match serde_json::from_str::<Vec<ProbeResult>>(text) {
        Ok(results) => return Ok(results),
        Err(e) => e,
    };

    // Fall back to arrays embedded in the output; a stray `[]` must not hide
    // the real result array
    let mut best: Option<Vec<ProbeResult>> = None;
    for (start, _) in text.match_indices('[') {
        let mut stream =
            serde_json::Deserializer::from_str(&text[start..]).into_iter::<Vec<ProbeResult>>();
        if let Some(Ok(results)) = stream.next() {
            if best.as_ref().is_none_or(|b| results.len() > b.len()) {
                best = Some(results);
            }
        }
    }

    best.ok_or_else(|| parse_error(whole.to_string(), raw))
}

fn parse_error(message: impl Into<String>, raw: &str) -> RunError {
    RunError::ResultParse {
        message: message.into(),
        logs: raw.to_string(),
    }
}
