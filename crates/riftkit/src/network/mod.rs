//! HTTP plumbing.
//!
//! - [`LocalClient`]: the game client's local HTTPS API, authenticated with
//!   credentials from the lockfile
//! - [`RestClient`]: public REST services (mail, exchange rates, uploads)
//!
//! Both return response bodies as text and decode JSON separately so that a
//! schema mismatch surfaces as [`Error::MalformedResponse`] rather than a
//! transport error.

mod local;
mod rest;
#[cfg(test)]
pub(crate) mod testing;

pub use local::LocalClient;
pub use rest::RestClient;

use serde::de::DeserializeOwned;
use ureq::Body;
use ureq::http::Response;

use crate::error::{Error, Result};

/// Longest response body kept in a `RequestRejected` error.
const MAX_ERROR_BODY: usize = 512;

fn user_agent() -> String {
    format!(
        "riftkit/{} ({})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS
    )
}

/// Read the body of a response, turning non-2xx statuses into
/// [`Error::RequestRejected`].
///
/// A body that cannot be read (timeout, peer hung up mid-response) is a
/// transport failure, so `transport` classifies it the same way the caller
/// classifies a failed request.
fn read_body(
    mut response: Response<Body>,
    transport: impl FnOnce(ureq::Error) -> Error,
) -> Result<String> {
    let status = response.status();
    let body = response.body_mut().read_to_string().map_err(transport)?;

    if status.is_success() {
        Ok(body)
    } else {
        let mut body = body;
        if body.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        Err(Error::RequestRejected {
            status: status.as_u16(),
            body,
        })
    }
}

fn parse_json<T: DeserializeOwned>(endpoint: &str, body: &str) -> Result<T> {
    // Some endpoints answer 204 with nothing; let `()` and `Option` decode it.
    let body = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(body).map_err(|e| Error::MalformedResponse(format!("{}: {}", endpoint, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[allow(dead_code)]
        id: u32,
    }

    #[test]
    fn test_parse_json_schema_mismatch() {
        let err = parse_json::<Sample>("/x", r#"{"name":"a"}"#).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn test_parse_json_empty_body_as_unit() {
        parse_json::<()>("/x", "").unwrap();
        assert!(parse_json::<Option<Sample>>("/x", "  ").unwrap().is_none());
    }
}
