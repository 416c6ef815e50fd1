use crate::resource_id::ResourceIdError;

/// Errors raised by the catalog core.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// Any failure contacting the upstream API or decoding what it sent back.
    #[error("{0}")]
    UpstreamRequestFailed(String),

    #[error("access to this resource is forbidden")]
    Forbidden,
}

impl CatalogError {
    /// Wraps a malformed relation URL in the upstream failure of the operation that
    /// received it.
    pub(crate) fn malformed(fallback: &str, err: ResourceIdError) -> Self {
        tracing::error!(error = %err, "Upstream returned a malformed resource URL");
        CatalogError::UpstreamRequestFailed(fallback.to_string())
    }
}
