// Copyright 2025 the OSM Canvas Authors
// SPDX-License-Identifier: Apache-2.0

//! Remote map data source.
//!
//! A `MapSource` turns a bounding box into a raw OSM XML document. The
//! region is validated before anything goes over the wire, and a
//! non-success status is a terminal failure for that request.

use crate::model::{BboxError, BoundingBox};
use crate::settings;
use std::future::Future;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid region: {0}")]
    Validation(#[from] BboxError),
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("server responded with HTTP {status}")]
    Status { status: u16, body: String },
}

/// Anything that can provide raw OSM XML for a region
pub trait MapSource: Send + Sync {
    fn fetch(&self, bbox: &BoundingBox) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// The OpenStreetMap editing API (`/api/0.6/map`)
pub struct OsmApi {
    client: reqwest::Client,
    url: String,
}

impl OsmApi {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_url(settings::remote::API_URL)
    }

    pub fn with_url(url: impl Into<String>) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(settings::remote::USER_AGENT)
            .timeout(settings::remote::TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl MapSource for OsmApi {
    async fn fetch(&self, bbox: &BoundingBox) -> Result<String, FetchError> {
        bbox.validate()?;

        let query = bbox.to_query();
        tracing::info!("Requesting map data for bbox={}", query);

        let response = self
            .client
            .get(&self.url)
            .query(&[("bbox", query.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::error!("Map request failed: HTTP {}", status);
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!("Received {} bytes of map data", body.len());
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_region_rejected_before_request() {
        // Unroutable address: reaching the network would fail differently
        let api = OsmApi::with_url("http://127.0.0.1:9/map").unwrap();
        let inverted = BoundingBox {
            min_lon: 0.1,
            min_lat: 0.0,
            max_lon: 0.0,
            max_lat: 0.1,
        };

        let err = api.fetch(&inverted).await.unwrap_err();
        assert!(matches!(
            err,
            FetchError::Validation(BboxError::InvertedLongitude)
        ));
    }

    #[test]
    fn test_status_error_message() {
        let err = FetchError::Status {
            status: 509,
            body: "Bandwidth limit exceeded".to_string(),
        };
        assert_eq!(err.to_string(), "server responded with HTTP 509");
    }
}
