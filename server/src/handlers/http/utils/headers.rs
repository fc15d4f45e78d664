use hyper::Request;
use hyper::header::HeaderMap;
use tracing::debug;

/// Extract a header value as a string
pub fn get_header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(|s| {
        debug!("Retrieved header: {}", name);
        s.to_string()
    })
}

/// Look up a single query-string parameter on the request URI.
pub fn query_param<B>(req: &Request<B>, name: &str) -> Option<String> {
    let query = req.uri().query()?;
    form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with_uri(uri: &str) -> Request<()> {
        Request::builder().uri(uri).body(()).unwrap()
    }

    #[test]
    fn query_param_finds_named_value() {
        let req = request_with_uri("/api/file?key=123-report.pdf");
        assert_eq!(query_param(&req, "key").as_deref(), Some("123-report.pdf"));
    }

    #[test]
    fn query_param_decodes_percent_encoding() {
        let req = request_with_uri("/api/file?url=https%3A%2F%2Ffiles.example.com%2Ftd-tickets%2Fa.pdf");
        assert_eq!(
            query_param(&req, "url").as_deref(),
            Some("https://files.example.com/td-tickets/a.pdf")
        );
    }

    #[test]
    fn query_param_empty_value_counts_as_absent() {
        let req = request_with_uri("/api/file?key=");
        assert_eq!(query_param(&req, "key"), None);
    }

    #[test]
    fn query_param_absent_without_query_string() {
        let req = request_with_uri("/api/file");
        assert_eq!(query_param(&req, "key"), None);
    }

}
