//! HTTP probe for external play URLs.

use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::Serialize;
use tracing::{debug, warn};

/// Timeout for one probe request.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(8);

pub const UNAVAILABLE_TITLE: &str = "Game unavailable";
pub const UNAVAILABLE_MESSAGE: &str =
    "This game can't be started right now. Please try again later or pick another game.";

/// Result of probing a play URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum Availability {
    Available,
    /// The server answered with a non-success status.
    Unavailable { status: u16 },
    /// No answer at all (DNS, connect, TLS, timeout).
    Unreachable { reason: String },
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }
}

/// What the page should do when the play button is pressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum PlayDecision {
    Navigate { url: String },
    ShowModal { title: String, message: String },
}

impl PlayDecision {
    /// Maps a probe result to a decision for `url`.
    pub fn from_availability(url: &str, availability: &Availability) -> Self {
        if availability.is_available() {
            PlayDecision::Navigate { url: url.into() }
        } else {
            PlayDecision::ShowModal {
                title: UNAVAILABLE_TITLE.into(),
                message: UNAVAILABLE_MESSAGE.into(),
            }
        }
    }
}

/// Checks play URLs before navigation.
pub struct PlayProbe {
    http: reqwest::Client,
}

impl PlayProbe {
    /// Creates a probe with its own HTTP client.
    pub fn new() -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(PROBE_TIMEOUT).build()?;
        Ok(Self { http })
    }

    /// Creates a probe on top of an existing HTTP client.
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Probes `url` with `HEAD`, falling back to `GET` for servers that
    /// refuse `HEAD`.
    pub async fn check(&self, url: &str) -> Availability {
        let status = match self.status_of(Method::HEAD, url).await {
            Ok(StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED) => {
                debug!(url, "HEAD refused, probing with GET");
                self.status_of(Method::GET, url).await
            }
            other => other,
        };

        match status {
            Ok(status) if status.is_success() => Availability::Available,
            Ok(status) => {
                warn!(url, status = status.as_u16(), "play target unavailable");
                Availability::Unavailable {
                    status: status.as_u16(),
                }
            }
            Err(e) => {
                warn!(url, error = %e, "play target unreachable");
                Availability::Unreachable {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Probes `url` and returns what the page should do.
    pub async fn decide(&self, url: &str) -> PlayDecision {
        let availability = self.check(url).await;
        PlayDecision::from_availability(url, &availability)
    }

    async fn status_of(&self, method: Method, url: &str) -> Result<StatusCode, reqwest::Error> {
        let resp = self.http.request(method, url).send().await?;
        Ok(resp.status())
    }
}
