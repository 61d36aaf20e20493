//! Classification of non-success HTTP responses.

use reqwest::StatusCode;

/// A request that reached the server but came back with a non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpStatusError {
    /// HTTP 401
    Unauthorized(String),
    /// HTTP 403
    Forbidden(String),
    /// HTTP 404
    NotFound(String),
    /// HTTP 429
    RateLimited(String),
    /// Any other 4xx
    ClientError(u16, String),
    /// Any 5xx
    ServerError(u16, String),
}

impl std::fmt::Display for HttpStatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpStatusError::Unauthorized(url) => {
                write!(
                    f,
                    "Authentication failed for {}. Check your MODRINTH_TOKEN.",
                    url
                )
            }
            HttpStatusError::Forbidden(url) => write!(f, "Access forbidden: {}", url),
            HttpStatusError::NotFound(url) => write!(f, "Not found: {}", url),
            HttpStatusError::RateLimited(url) => {
                write!(f, "Rate limit exceeded: {}. Try again later.", url)
            }
            HttpStatusError::ClientError(code, url) => {
                write!(f, "Request error: HTTP {} from {}", code, url)
            }
            HttpStatusError::ServerError(code, url) => {
                write!(f, "Server error: HTTP {} from {}", code, url)
            }
        }
    }
}

impl std::error::Error for HttpStatusError {}

/// Maps a status code to its [`HttpStatusError`], or `None` for success codes.
pub fn classify_status(status: StatusCode, url: &str) -> Option<HttpStatusError> {
    let url = url.to_string();
    match status {
        s if s.is_success() => None,
        StatusCode::UNAUTHORIZED => Some(HttpStatusError::Unauthorized(url)),
        StatusCode::FORBIDDEN => Some(HttpStatusError::Forbidden(url)),
        StatusCode::NOT_FOUND => Some(HttpStatusError::NotFound(url)),
        StatusCode::TOO_MANY_REQUESTS => Some(HttpStatusError::RateLimited(url)),
        s if s.is_server_error() => Some(HttpStatusError::ServerError(s.as_u16(), url)),
        s if s.is_client_error() => Some(HttpStatusError::ClientError(s.as_u16(), url)),
        // 1xx/3xx that reqwest did not follow are still not usable payloads
        s => Some(HttpStatusError::ClientError(s.as_u16(), url)),
    }
}

/// Converts an error from `error_for_status()` into an `anyhow::Error`.
/// Status failures become [`HttpStatusError`], anything else is kept as is.
pub fn check_status(error: reqwest::Error) -> anyhow::Error {
    let url = error
        .url()
        .map(|u| u.to_string())
        .unwrap_or_else(|| "(unknown url)".to_string());
    match error.status().and_then(|s| classify_status(s, &url)) {
        Some(status_error) => anyhow::Error::from(status_error),
        None => anyhow::Error::from(error),
    }
}
