//! `User-Agent` strategies for outgoing requests.
//!
//! Some publishers refuse obvious scripts, so requests rotate through a pool
//! of browser identifiers. Tests inject [`FixedUserAgent`].

use rand::seq::SliceRandom;

/// Browser identifiers the random strategy picks from
pub const USER_AGENTS: [&str; 9] = [
    "Mozilla/5.0 (Windows NT 6.1; WOW64) AppleWebKit/535.1 (KHTML, like Gecko) Chrome/13.0.782.112 Safari/535.1",
    "Mozilla/5.0 (Windows NT 6.0) AppleWebKit/535.1 (KHTML, like Gecko) Chrome/13.0.782.112 Safari/535.1",
    "Mozilla/5.0 (Windows NT 6.1) AppleWebKit/537.1 (KHTML, like Gecko) Chrome/21.0.1180.89 Safari/537.1",
    "Mozilla/5.0 (Windows NT 5.1; rv:5.0.1) Gecko/20100101 Firefox/5.0.1",
    "Mozilla/5.0 (Windows; U; Windows NT 5.1; en-US; rv:1.8.0.4) Gecko/20060508 Firefox/1.5.0.4",
    "Mozilla/5.0 (Windows; U; Win98; fr; rv:1.8.1) Gecko/20061010 Firefox/2.0",
    "Opera/9.80 (Windows NT 6.1; WOW64; U; ru) Presto/2.10.289 Version/12.00",
    "Opera/9.80 (Windows NT 6.1; Win64; x64; Edition Yx) Presto/2.12.388 Version/12.11",
    "Opera/9.80 (Windows NT 6.1; MRA 6.0 (build 6001)) Presto/2.12.388 Version/12.10",
];

/// Source of `User-Agent` header values
pub trait UserAgentSource: Send + Sync {
    /// Header value for the next request
    fn user_agent(&self) -> String;
}

/// Picks a random entry from [`USER_AGENTS`] for every request
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomUserAgents;

impl UserAgentSource for RandomUserAgents {
    fn user_agent(&self) -> String {
        USER_AGENTS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(USER_AGENTS[0])
            .to_string()
    }
}

/// Always sends the same value
#[derive(Debug, Clone)]
pub struct FixedUserAgent(pub String);

impl FixedUserAgent {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl UserAgentSource for FixedUserAgent {
    fn user_agent(&self) -> String {
        self.0.clone()
    }
}
