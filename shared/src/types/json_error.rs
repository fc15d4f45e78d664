use serde::{Deserialize, Serialize};

/// The error envelope every API route answers with.
///
/// Page routes get redirects instead; only the API surface speaks this
/// shape. The message stays generic for backend failures — detail lives in
/// the server log, not the response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}
