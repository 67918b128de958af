use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::collaborators::{Probe, ProbeError, ProbeStatus};

/// HEAD-request probe. Only the status line is consumed; no body is read.
#[derive(Clone)]
pub struct HttpProbe {
    http: Client,
    timeout: Duration,
}

impl HttpProbe {
    pub fn new(timeout: Duration) -> Self {
        Self {
            http: Client::new(),
            timeout,
        }
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn probe(&self, target: &Url) -> Result<ProbeStatus, ProbeError> {
        if !matches!(target.scheme(), "http" | "https") {
            return Err(ProbeError::InvalidTarget {
                target: target.to_string(),
                message: format!("unsupported scheme {:?}", target.scheme()),
            });
        }

        let response = self
            .http
            .head(target.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    ProbeError::TimedOut(self.timeout)
                } else {
                    ProbeError::Transport(err.to_string())
                }
            })?;

        Ok(ProbeStatus(response.status().as_u16()))
    }
}

#[cfg(test)]
#[path = "tests/probe_tests.rs"]
mod tests;
