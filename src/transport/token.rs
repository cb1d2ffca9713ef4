use serde::Deserialize;

use super::code::WireCode;
use crate::domain::AccessToken;

#[derive(Debug, Clone, Deserialize)]
struct TokenJsonResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<WireCode>,
}

/// Returns `Ok(None)` when the body parses but carries no usable token.
pub fn decode_token_json_response(json: &str) -> Result<Option<AccessToken>, serde_json::Error> {
    let parsed: TokenJsonResponse = serde_json::from_str(json)?;

    let Some(token) = parsed.access_token.filter(|token| !token.trim().is_empty()) else {
        return Ok(None);
    };

    Ok(Some(AccessToken {
        token,
        expires_in: parsed
            .expires_in
            .and_then(|value| value.as_u64()),
    }))
}
