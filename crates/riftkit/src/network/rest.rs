use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use ureq::Agent;

use super::{parse_json, read_body, user_agent};
use crate::error::{Error, Result};

/// Client for a public REST service rooted at `base_url`.
#[derive(Clone)]
pub struct RestClient {
    agent: Agent,
    base_url: String,
    token: Option<String>,
}

impl RestClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Send `Authorization: Bearer <token>` with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        if endpoint.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
        }
    }

    fn bearer(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }

    pub fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = self.url(endpoint);
        debug!("GET {}", url);

        let mut request = self
            .agent
            .get(&url)
            .header("Accept", "application/json")
            .header("User-Agent", &user_agent());
        if let Some(auth) = self.bearer() {
            request = request.header("Authorization", &auth);
        }

        let response = request.call().map_err(network)?;
        let body = read_body(response, network)?;
        parse_json(endpoint, &body)
    }

    pub fn post_json<B: Serialize, T: DeserializeOwned>(&self, endpoint: &str, body: &B) -> Result<T> {
        let url = self.url(endpoint);
        debug!("POST {}", url);

        let mut request = self
            .agent
            .post(&url)
            .header("Accept", "application/json")
            .header("User-Agent", &user_agent());
        if let Some(auth) = self.bearer() {
            request = request.header("Authorization", &auth);
        }

        let response = request.send_json(body).map_err(network)?;
        let body = read_body(response, network)?;
        parse_json(endpoint, &body)
    }

    /// POST raw bytes and return the response status with its body.
    pub fn post_bytes(&self, endpoint: &str, content_type: &str, data: Vec<u8>) -> Result<(u16, String)> {
        let url = self.url(endpoint);
        debug!("POST {} ({} bytes)", url, data.len());

        let mut request = self
            .agent
            .post(&url)
            .header("Content-Type", content_type)
            .header("User-Agent", &user_agent());
        if let Some(auth) = self.bearer() {
            request = request.header("Authorization", &auth);
        }

        let response = request.send(data).map_err(network)?;
        let status = response.status().as_u16();
        let body = read_body(response, network)?;
        Ok((status, body))
    }
}

fn network(e: ureq::Error) -> Error {
    Error::Network(e.to_string())
}
