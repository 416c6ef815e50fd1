use crate::config::Upstream;
use crate::errors::CatalogError;
use crate::metrics_defs::{UPSTREAM_REQUEST_DURATION, UPSTREAM_REQUEST_FAILED};
use serde::Deserialize;
use serde_json::Value;
use shared::{counter, histogram};
use std::time::{Duration, Instant};
use url::Url;

/// Body of a 4xx response from the upstream API.
#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// Thin JSON client for the upstream API. Every call is a single attempt.
#[derive(Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    base_url: Url,
}

impl UpstreamClient {
    pub fn new(config: &Upstream) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;

        // Without a trailing slash `join` would replace the last segment of the base.
        let mut base_url = config.url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(UpstreamClient { client, base_url })
    }

    /// Issues `GET <base>/<path>?<query>` and decodes the JSON body.
    ///
    /// A 4xx response fails with the upstream's `detail` message, or `fallback` when
    /// it has none. Every other failure fails with `fallback`; the cause is logged.
    pub async fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
        fallback: &str,
    ) -> Result<Value, CatalogError> {
        let started = Instant::now();
        let result = self.send(path, query, fallback).await;

        histogram!(UPSTREAM_REQUEST_DURATION).record(started.elapsed().as_secs_f64());
        if result.is_err() {
            counter!(UPSTREAM_REQUEST_FAILED).increment(1);
        }

        result
    }

    async fn send(
        &self,
        path: &str,
        query: &[(&str, String)],
        fallback: &str,
    ) -> Result<Value, CatalogError> {
        let failed = || CatalogError::UpstreamRequestFailed(fallback.to_string());

        let url = self.base_url.join(path).map_err(|e| {
            tracing::error!(path, error = %e, "Could not build upstream URL");
            failed()
        })?;

        tracing::debug!(%url, ?query, "Requesting upstream");

        let response = self
            .client
            .get(url.clone())
            .query(query)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(%url, error = %e, "Upstream request failed");
                failed()
            })?;

        let status = response.status();

        if status.is_client_error() {
            let message = response
                .bytes()
                .await
                .ok()
                .and_then(|body| serde_json::from_slice::<ErrorBody>(&body).ok())
                .and_then(|body| body.detail)
                .unwrap_or_else(|| fallback.to_string());

            tracing::warn!(%url, %status, %message, "Upstream rejected request");
            return Err(CatalogError::UpstreamRequestFailed(message));
        }

        if !status.is_success() {
            tracing::error!(%url, %status, "Upstream returned an error status");
            return Err(failed());
        }

        response.json::<Value>().await.map_err(|e| {
            tracing::error!(%url, error = %e, "Could not decode upstream response");
            failed()
        })
    }
}
