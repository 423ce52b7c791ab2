//! Access tokens as a capability.
//!
//! Acquiring tokens is outside this crate: callers hand in a [`TokenSource`].
//! The device-code polling loop is kept generic over the poll request and
//! the sleep so any OAuth client can drive it.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OAuth token endpoint response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Supplies the bearer token for upload requests.
pub trait TokenSource {
    fn access_token(&self) -> Result<String>;

    fn authorization_header(&self) -> Result<String> {
        Ok(format!("Bearer {}", self.access_token()?))
    }
}

/// A token fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Accepts a bare access token or a token endpoint JSON response.
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        if value.is_empty() {
            bail!("empty token");
        }
        if value.starts_with('{') {
            let token: Token = serde_json::from_str(value).context("parse token JSON")?;
            return Ok(Self(token.access_token));
        }
        Ok(Self(value.to_string()))
    }
}

impl TokenSource for StaticToken {
    fn access_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

impl TokenSource for Token {
    fn access_token(&self) -> Result<String> {
        Ok(self.access_token.clone())
    }
}

/// Device authorization response (RFC 8628).
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceCode {
    pub device_code: String,
    #[serde(default)]
    pub user_code: Option<String>,
    #[serde(default, alias = "verification_uri")]
    pub verification_url: Option<String>,
    pub expires_in: u64,
    #[serde(default = "default_interval")]
    pub interval: u64,
    #[serde(default)]
    pub message: Option<String>,
}

fn default_interval() -> u64 {
    5
}

/// Outcome of one poll, and of the whole loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DevicePoll {
    Pending,
    Success(Token),
    Expired,
}

/// Bounds of a device-code polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub expires_in: Duration,
}

impl PollPolicy {
    /// Intervals below one second are raised to one second.
    pub fn new(interval: Duration, expires_in: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_secs(1)),
            expires_in,
        }
    }
}

impl From<&DeviceCode> for PollPolicy {
    fn from(code: &DeviceCode) -> Self {
        Self::new(
            Duration::from_secs(code.interval),
            Duration::from_secs(code.expires_in),
        )
    }
}

/// Calls `poll` every `interval` until it yields a token, reports expiry, or
/// `expires_in` has elapsed. Never returns `Pending`.
pub fn poll_device_code<P, S>(policy: PollPolicy, mut poll: P, mut sleep: S) -> Result<DevicePoll>
where
    P: FnMut() -> Result<DevicePoll>,
    S: FnMut(Duration),
{
    let mut elapsed = Duration::ZERO;
    while elapsed < policy.expires_in {
        match poll()? {
            DevicePoll::Pending => {}
            done => return Ok(done),
        }
        sleep(policy.interval);
        elapsed += policy.interval;
    }
    tracing::debug!(?elapsed, "device code expired");
    Ok(DevicePoll::Expired)
}
