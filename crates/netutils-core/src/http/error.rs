//! Transport-level failures (below HTTP status handling).

/// Error from a single HTTP exchange.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// libcurl reported a failure (timeout, connection, TLS, ...).
    #[error("curl: {0}")]
    Curl(#[from] curl::Error),
    /// The request body reader failed before `expected` bytes were sent.
    #[error("request body aborted after {sent} of {expected} bytes")]
    BodyAborted { sent: u64, expected: u64 },
    /// The response declared gzip but did not decompress.
    #[error("decode response body: {0}")]
    Decode(#[source] std::io::Error),
}
