use serde::{Deserialize, Serialize};

const RAW_DETAIL_LIMIT: usize = 200;

/// Error body returned by the collection resource on a non-success status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub detail: serde_json::Value,
}

/// One entry of a request validation failure (`422`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    #[serde(default)]
    pub loc: Vec<serde_json::Value>,
    pub msg: String,
}

impl ApiError {
    pub fn message(&self) -> Option<String> {
        match &self.detail {
            serde_json::Value::String(text) => Some(text.clone()),
            serde_json::Value::Array(_) => {
                let issues: Vec<ValidationIssue> =
                    serde_json::from_value(self.detail.clone()).ok()?;
                let parts: Vec<String> = issues
                    .iter()
                    .map(|issue| match issue.loc.last() {
                        Some(serde_json::Value::String(field)) => {
                            format!("{field}: {}", issue.msg)
                        }
                        _ => issue.msg.clone(),
                    })
                    .collect();
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join("; "))
                }
            }
            _ => None,
        }
    }
}

/// Human readable summary of an error response body.
pub fn describe_error_body(body: &[u8]) -> String {
    if let Some(message) = serde_json::from_slice::<ApiError>(body)
        .ok()
        .and_then(|err| err.message())
    {
        return message;
    }

    let raw = String::from_utf8_lossy(body);
    let raw = raw.trim();
    if raw.chars().count() > RAW_DETAIL_LIMIT {
        let truncated: String = raw.chars().take(RAW_DETAIL_LIMIT).collect();
        format!("{truncated}...")
    } else {
        raw.to_string()
    }
}
