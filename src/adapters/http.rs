//! Blocking HTTP fetcher.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::Url;
use tracing::debug;

use super::user_agent::{RandomUserAgents, UserAgentSource};
use super::{FetchError, Fetcher};

/// Default request timeout
const TIMEOUT: Duration = Duration::from_secs(30);

/// [`Fetcher`] backed by `reqwest::blocking`
pub struct HttpFetcher {
    client: Client,
    user_agents: Box<dyn UserAgentSource>,
}

impl HttpFetcher {
    /// Create a fetcher rotating through the built-in user agents
    pub fn new() -> Result<Self, FetchError> {
        Self::with_user_agents(Box::new(RandomUserAgents))
    }

    /// Create a fetcher with a custom `User-Agent` strategy
    pub fn with_user_agents(user_agents: Box<dyn UserAgentSource>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| FetchError::Request {
                url: String::new(),
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            user_agents,
        })
    }
}

impl Fetcher for HttpFetcher {
    fn get(&self, url: &str, accept: Option<&str>) -> Result<Vec<u8>, FetchError> {
        let parsed = Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl(url.to_string()));
        }

        debug!("get url: {}", url);
        let mut request = self
            .client
            .get(parsed)
            .header(USER_AGENT, self.user_agents.user_agent());
        if let Some(accept) = accept {
            request = request.header(ACCEPT, accept);
        }

        let request_error = |e: reqwest::Error| FetchError::Request {
            url: url.to_string(),
            message: e.to_string(),
        };
        let response = request.send().map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().map_err(request_error)?;
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::FixedUserAgent;

    fn fetcher() -> HttpFetcher {
        HttpFetcher::with_user_agents(Box::new(FixedUserAgent::new("test"))).unwrap()
    }

    #[test]
    fn test_non_url_fails_without_request() {
        let err = fetcher().get("10.1137/0206024", None).unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        let err = fetcher().get("file:///etc/passwd", None).unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));

        let err = fetcher().get("ftp://example.org/paper.pdf", None).unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }
}
