//! Adapter interfaces for external systems.
//!
//! The only external system is the web: DOI resolution, the HAL archive and
//! arbitrary download URLs. Everything that talks to it goes through the
//! [`Fetcher`] trait so resolution can be exercised without a network.

pub mod http;
pub mod user_agent;

use thiserror::Error;

pub use http::HttpFetcher;
pub use user_agent::{FixedUserAgent, RandomUserAgents, UserAgentSource, USER_AGENTS};

/// Errors returned by a [`Fetcher`]
#[derive(Debug, Error)]
pub enum FetchError {
    /// Not an absolute http(s) URL; nothing was sent
    #[error("Not a fetchable URL: '{0}'")]
    InvalidUrl(String),

    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("Request to {url} returned status {status}")]
    Status { url: String, status: u16 },
}

/// Trait for retrieving remote content
pub trait Fetcher {
    /// GET `url` and return the body.
    ///
    /// `accept` sets the `Accept` header when given. Any non-success status
    /// is an error.
    fn get(&self, url: &str, accept: Option<&str>) -> Result<Vec<u8>, FetchError>;

    /// GET `url` and decode the body as UTF-8 (lossily)
    fn get_text(&self, url: &str, accept: Option<&str>) -> Result<String, FetchError> {
        let body = self.get(url, accept)?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

impl<F: Fetcher + ?Sized> Fetcher for Box<F> {
    fn get(&self, url: &str, accept: Option<&str>) -> Result<Vec<u8>, FetchError> {
        (**self).get(url, accept)
    }
}
