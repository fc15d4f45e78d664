use anyhow::{Context, Result, anyhow};
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Full};
use hyper::{Response, StatusCode, header};
use serde::Serialize;
use std::convert::Infallible;
use tracing::{debug, warn};

use shared::types::ErrorResponse;

/// Serialize any `Serialize` type and deliver it as a JSON response.
/// This is the primary helper all handlers should use instead of
/// writing their own one-off serialization + response-building blocks.
pub fn deliver_serialized_json<T: Serialize>(
    data: &T,
    status: StatusCode,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    let json = serde_json::to_string(data).context("Failed to serialize response")?;

    debug!("Delivering JSON response, size: {} bytes", json.len());

    let response = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(json)).boxed())
        .map_err(|e| anyhow!("Failed to build JSON response: {}", e))?;

    Ok(response)
}

/// Delivers the `{"error": …}` envelope with the specified status.
pub fn deliver_error_json(
    message: &str,
    status: StatusCode,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    warn!("Delivering error JSON: {} - {}", status.as_u16(), message);

    deliver_serialized_json(&ErrorResponse::new(message), status)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(
        response: Response<BoxBody<Bytes, Infallible>>,
    ) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn error_json_uses_error_envelope() {
        let response = deliver_error_json("Unauthorized", StatusCode::UNAUTHORIZED).unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers()["content-type"].to_str().unwrap(),
            "application/json"
        );
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": "Unauthorized" })
        );
    }

    #[tokio::test]
    async fn serialized_json_carries_the_given_status() {
        let response = deliver_serialized_json(
            &serde_json::json!({ "ok": true }),
            StatusCode::OK,
        )
        .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!({ "ok": true }));
    }
}
