use std::convert::Infallible;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use bytes::Bytes;
use futures_util::stream;
use http_body_util::BodyExt;
use http_body_util::combinators::BoxBody;
use hyper::body::Incoming as IncomingBody;
use hyper::{Request, Response, StatusCode};
use tracing::{error, info, warn};

use crate::AppState;
use crate::handlers::http::utils::{deliver_error_json, deliver_serialized_json, get_header_value};
use crate::session::{require_admin, resolve};

/// Upload ceiling: 10 MiB.
const MAX_SIZE: usize = 10 * 1024 * 1024;

/// Slack for multipart framing around the file bytes.
const MULTIPART_OVERHEAD: usize = 16 * 1024;

/// Content types accepted for ticket attachments.
const ALLOWED_TYPES: &[&str] = &[
    "application/pdf",
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "text/plain",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// POST /api/upload
///
/// Accepts a single multipart `file` field, stores it in the object
/// store, and returns the public URL it will be served from.
pub async fn handle_upload(
    req: Request<IncomingBody>,
    state: AppState,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    let claims = resolve(&req, state.jwt_secret.as_deref());
    if let Err(e) = require_admin(claims.as_ref()) {
        warn!("Unauthorised upload attempt");
        return deliver_error_json(e.message(), e.status());
    }

    let Some(store) = state.storage.clone() else {
        return deliver_error_json("Upload service not configured", StatusCode::SERVICE_UNAVAILABLE);
    };

    // Uploads need a public base to hand back a URL; the proxy-only
    // storage setup cannot accept them.
    if !store.has_public_base() {
        return deliver_error_json("Upload service not configured", StatusCode::SERVICE_UNAVAILABLE);
    }

    let boundary = get_header_value(req.headers(), "content-type")
        .and_then(|ct| multer::parse_boundary(ct).ok());

    let Some(boundary) = boundary else {
        warn!("Upload without a multipart body");
        return deliver_error_json("No file provided", StatusCode::BAD_REQUEST);
    };

    let body = match req.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!("Failed to read upload body: {}", e);
            return deliver_error_json("Invalid multipart body", StatusCode::BAD_REQUEST);
        }
    };

    if body.len() > MAX_SIZE + MULTIPART_OVERHEAD {
        return deliver_error_json("File too large (max 10 MB)", StatusCode::BAD_REQUEST);
    }

    let file = match read_file_field(body, boundary).await {
        Ok(Some(file)) => file,
        Ok(None) => {
            return deliver_error_json("No file provided", StatusCode::BAD_REQUEST);
        }
        Err(e) => {
            warn!("Malformed multipart body: {}", e);
            return deliver_error_json("Invalid multipart body", StatusCode::BAD_REQUEST);
        }
    };

    if file.bytes.len() > MAX_SIZE {
        return deliver_error_json("File too large (max 10 MB)", StatusCode::BAD_REQUEST);
    }

    if !is_allowed_type(&file.content_type) {
        warn!("Rejected upload content type: {}", file.content_type);
        return deliver_error_json("File type not allowed", StatusCode::BAD_REQUEST);
    }

    let key = object_key(&file.name);

    info!(
        "Uploading {} ({} bytes, {})",
        key,
        file.bytes.len(),
        file.content_type
    );

    if let Err(e) = store.put_object(&key, file.bytes, &file.content_type).await {
        error!("Object store upload failed: {:#}", e);
        return deliver_error_json("Upload failed", StatusCode::INTERNAL_SERVER_ERROR);
    }

    // public_url was checked above.
    let file_url = store.public_url(&key).unwrap_or_default();

    deliver_serialized_json(&serde_json::json!({ "fileUrl": file_url }), StatusCode::OK)
}

struct UploadedFile {
    name: String,
    content_type: String,
    bytes: Bytes,
}

/// Pull the `file` field out of a buffered multipart body.
async fn read_file_field(body: Bytes, boundary: String) -> multer::Result<Option<UploadedFile>> {
    let mut multipart = multer::Multipart::new(
        stream::once(async move { Ok::<Bytes, Infallible>(body) }),
        boundary,
    );

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let name = field
            .file_name()
            .unwrap_or("upload")
            .to_string();
        let content_type = field
            .content_type()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let bytes = field.bytes().await?;

        return Ok(Some(UploadedFile {
            name,
            content_type,
            bytes,
        }));
    }

    Ok(None)
}

fn is_allowed_type(content_type: &str) -> bool {
    ALLOWED_TYPES.contains(&content_type)
}

/// Object key: upload instant in millis + the sanitized client filename.
fn object_key(file_name: &str) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);

    format!("{}-{}", millis, sanitize_filename(file_name))
}

/// Keep `[A-Za-z0-9.-]`; everything else becomes `_`.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
