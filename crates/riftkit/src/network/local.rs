use std::sync::Mutex;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use ureq::Agent;
use ureq::tls::TlsConfig;

use super::{parse_json, read_body, user_agent};
use crate::credentials::{CredentialSource, Credentials};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    Get,
    Put,
    Post,
}

impl Method {
    fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Post => "POST",
        }
    }
}

/// Client for the game client's local HTTPS API.
///
/// Credentials are discovered on first use and kept only while requests keep
/// succeeding: a transport failure or a 401 drops them, so the next request
/// reads the lockfile again and follows the client across restarts.
pub struct LocalClient {
    source: Box<dyn CredentialSource>,
    agent: Agent,
    cached: Mutex<Option<Credentials>>,
}

impl LocalClient {
    pub fn new(source: impl CredentialSource + 'static, timeout: Duration) -> Self {
        // The local API serves a self-signed certificate for 127.0.0.1.
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .tls_config(TlsConfig::builder().disable_verification(true).build())
            .build()
            .into();

        Self {
            source: Box::new(source),
            agent,
            cached: Mutex::new(None),
        }
    }

    /// Current credentials, reading the lockfile if nothing is cached.
    pub fn credentials(&self) -> Result<Credentials> {
        let mut cached = self
            .cached
            .lock()
            .map_err(|_| Error::PeerUnavailable("credential cache poisoned".to_string()))?;

        if let Some(creds) = cached.as_ref() {
            return Ok(creds.clone());
        }

        let creds = self.source.discover()?;
        info!("Connected to local client on port {}", creds.port);
        *cached = Some(creds.clone());
        Ok(creds)
    }

    fn invalidate(&self) {
        if let Ok(mut cached) = self.cached.lock()
            && cached.take().is_some()
        {
            debug!("Dropped cached credentials");
        }
    }

    pub fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let body = self.execute(Method::Get, endpoint, None)?;
        parse_json(endpoint, &body)
    }

    pub fn put_json<B: Serialize, T: DeserializeOwned>(&self, endpoint: &str, body: &B) -> Result<T> {
        let payload = serde_json::to_value(body)?;
        let body = self.execute(Method::Put, endpoint, Some(&payload))?;
        parse_json(endpoint, &body)
    }

    pub fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        let payload = serde_json::to_value(body)?;
        let body = self.execute(Method::Post, endpoint, Some(&payload))?;
        parse_json(endpoint, &body)
    }

    /// POST without a body, ignoring whatever the server answers.
    pub fn post_empty(&self, endpoint: &str) -> Result<()> {
        self.execute(Method::Post, endpoint, None).map(|_| ())
    }

    fn execute(
        &self,
        method: Method,
        endpoint: &str,
        payload: Option<&serde_json::Value>,
    ) -> Result<String> {
        let creds = self.credentials()?;
        let url = format!("{}{}", creds.base_url(), endpoint);
        let auth = creds.basic_auth_header();
        let ua = user_agent();

        debug!("{} {}", method.as_str(), endpoint);

        let result = match method {
            Method::Get => self
                .agent
                .get(&url)
                .header("Authorization", &auth)
                .header("Accept", "application/json")
                .header("User-Agent", &ua)
                .call(),
            Method::Put | Method::Post => {
                let request = if method == Method::Put {
                    self.agent.put(&url)
                } else {
                    self.agent.post(&url)
                };
                let request = request
                    .header("Authorization", &auth)
                    .header("Accept", "application/json")
                    .header("User-Agent", &ua);
                match payload {
                    Some(payload) => request.send_json(payload),
                    None => request.send_empty(),
                }
            }
        };

        let response = result.map_err(|e| self.unavailable(e))?;

        if response.status().as_u16() == 401 {
            self.invalidate();
        }

        read_body(response, |e| self.unavailable(e))
    }

    /// Transport failure: the client may have restarted on another port.
    fn unavailable(&self, e: ureq::Error) -> Error {
        self.invalidate();
        Error::PeerUnavailable(e.to_string())
    }
}
