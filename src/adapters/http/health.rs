//! Liveness endpoint.

/// `GET /healthcheck` - always answers `ok` while the process is serving.
pub async fn healthcheck() -> &'static str {
    "ok"
}
