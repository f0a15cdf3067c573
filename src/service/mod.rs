//! The remote analysis backend, seen from the viewer.

mod http;

pub use http::HttpGraphService;

use crate::request::{Reply, Request};
use std::future::Future;
use thiserror::Error;

/// Every way a fetch can fail. The controller treats all of them as a
/// transport failure: reported, never retried.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid backend URL '{0}'")]
    InvalidUrl(String),

    #[error("Request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{path} answered with HTTP {status}")]
    Status { path: String, status: u16 },

    #[error("Could not decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Request task failed: {0}")]
    TaskFailed(String),
}

/// Answers [`Request`]s. Implementations may complete requests in any order;
/// the controller sorts out staleness.
pub trait GraphService: Send + Sync {
    fn fetch(&self, request: &Request) -> impl Future<Output = Result<Reply, ServiceError>> + Send;
}
