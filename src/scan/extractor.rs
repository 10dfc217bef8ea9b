use serde_json::Value;
use thiserror::Error;
use url::Url;

/// Key aliases under which scan sources embed the transaction reference.
const REFERENCE_KEYS: [&str; 3] = ["tx_ref", "reference", "txRef"];

#[derive(Debug, Error, PartialEq, Eq)]
#[error("payload does not contain a transaction reference")]
pub struct MalformedPayload;

/// Result of one branch of the fallback pipeline. `Parsed` with an empty
/// string means the branch recognized the format but found no reference,
/// which is a malformed payload rather than a reason to try the next branch.
#[derive(Debug, PartialEq, Eq)]
pub enum ParseAttempt {
    Parsed(String),
    NoMatch,
}

/// Normalize a raw scan payload (camera decode, uploaded-image decode, or
/// operator-typed text) into a transaction reference.
///
/// The branch order is a deliberate tie-break policy: structured JSON wins
/// over deep links, deep links win over bare text. Pure and deterministic.
pub fn extract_reference(raw: &str) -> Result<String, MalformedPayload> {
    for attempt in [parse_json, parse_url, parse_raw] {
        if let ParseAttempt::Parsed(reference) = attempt(raw) {
            if reference.is_empty() {
                return Err(MalformedPayload);
            }
            return Ok(reference);
        }
    }
    Err(MalformedPayload)
}

/// JSON object payloads, e.g. `{"tx_ref":"T1"}`.
fn parse_json(raw: &str) -> ParseAttempt {
    let Ok(value) = serde_json::from_str::<Value>(raw) else {
        return ParseAttempt::NoMatch;
    };
    let Value::Object(map) = value else {
        return ParseAttempt::NoMatch;
    };

    for key in REFERENCE_KEYS {
        if let Some(Value::String(s)) = map.get(key) {
            let s = s.trim();
            if !s.is_empty() {
                return ParseAttempt::Parsed(s.to_string());
            }
        }
    }

    // A structured payload without a reference stays in this branch and
    // fails, instead of falling through to the raw-text fallback.
    ParseAttempt::Parsed(String::new())
}

/// Deep-link payloads, e.g. `https://pay.example.com/cb?reference=T2`.
fn parse_url(raw: &str) -> ParseAttempt {
    let Ok(url) = Url::parse(raw.trim()) else {
        return ParseAttempt::NoMatch;
    };

    let mut aliased_but_empty = false;
    for (key, value) in url.query_pairs() {
        if REFERENCE_KEYS.contains(&key.as_ref()) {
            let value = value.trim();
            if !value.is_empty() {
                return ParseAttempt::Parsed(value.to_string());
            }
            aliased_but_empty = true;
        }
    }

    // Same rule as the JSON branch: a recognized alias with an empty value
    // is terminal, while a URL with no alias at all falls through to raw.
    if aliased_but_empty {
        ParseAttempt::Parsed(String::new())
    } else {
        ParseAttempt::NoMatch
    }
}

/// Last resort: the payload itself is the reference.
fn parse_raw(raw: &str) -> ParseAttempt {
    ParseAttempt::Parsed(raw.trim().to_string())
}
