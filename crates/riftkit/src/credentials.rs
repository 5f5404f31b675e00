//! Local game-client credential discovery.
//!
//! A running client writes a one-line lockfile:
//!
//! ```text
//! LeagueClient:14512:50287:Xy3kq9v1TqW0bLrPaG8h2A:https
//! ```
//!
//! Fields are process name, pid, port, password and protocol. The file
//! disappears when the client exits, and port/password change on every
//! launch, so the file is read again on every [`CredentialSource::discover`].

use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

use crate::error::{Error, Result};

/// Username the local API expects in Basic auth.
const AUTH_USER: &str = "riot";

/// Connection details for the local client API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub process: String,
    pub pid: u32,
    pub port: u16,
    pub password: String,
    pub protocol: String,
}

impl Credentials {
    /// Parse the contents of a lockfile.
    pub fn parse(content: &str) -> Result<Self> {
        let fields: Vec<&str> = content.trim().split(':').collect();
        if fields.len() < 5 {
            return Err(Error::InvalidLockfile(format!(
                "expected 5 fields, found {}",
                fields.len()
            )));
        }

        let pid = fields[1]
            .parse::<u32>()
            .map_err(|_| Error::InvalidLockfile(format!("invalid pid '{}'", fields[1])))?;
        let port = fields[2]
            .parse::<u16>()
            .map_err(|_| Error::InvalidLockfile(format!("invalid port '{}'", fields[2])))?;

        let password = fields[3];
        if password.is_empty() {
            return Err(Error::InvalidLockfile("empty password".to_string()));
        }

        let protocol = match fields[4] {
            "" => "https",
            p => p,
        };

        Ok(Self {
            process: fields[0].to_string(),
            pid,
            port,
            password: password.to_string(),
            protocol: protocol.to_string(),
        })
    }

    /// Value for the `Authorization` header.
    pub fn basic_auth_header(&self) -> String {
        let raw = format!("{}:{}", AUTH_USER, self.password);
        format!("Basic {}", STANDARD.encode(raw))
    }

    /// Base URL of the local API, without trailing slash.
    pub fn base_url(&self) -> String {
        format!("{}://127.0.0.1:{}", self.protocol, self.port)
    }
}

/// Anything that can produce fresh credentials for the local client.
pub trait CredentialSource: Send + Sync {
    /// Returns [`Error::PeerUnavailable`] when the client is not running.
    fn discover(&self) -> Result<Credentials>;
}

/// Reads the first lockfile that exists among a list of candidate paths.
#[derive(Debug, Clone)]
pub struct LockfileSource {
    candidates: Vec<PathBuf>,
}

impl LockfileSource {
    pub fn new(candidates: Vec<PathBuf>) -> Self {
        Self { candidates }
    }

    /// Configured paths first, then the platform install locations.
    pub fn with_defaults(extra: &[PathBuf]) -> Self {
        let mut candidates = extra.to_vec();
        for path in default_lockfile_paths() {
            if !candidates.contains(&path) {
                candidates.push(path);
            }
        }
        Self::new(candidates)
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    fn read(path: &Path) -> Result<Option<Credentials>> {
        match fs::read_to_string(path) {
            Ok(content) => Credentials::parse(&content).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Io(e)),
        }
    }
}

impl CredentialSource for LockfileSource {
    fn discover(&self) -> Result<Credentials> {
        for path in &self.candidates {
            if let Some(creds) = Self::read(path)? {
                debug!("Read lockfile {} (port {})", path.display(), creds.port);
                return Ok(creds);
            }
        }
        Err(Error::PeerUnavailable(
            "lockfile not found; is the game client running?".to_string(),
        ))
    }
}

/// Fixed credentials, for tests and for users who pass port/password directly.
#[derive(Debug, Clone)]
pub struct StaticSource(pub Credentials);

impl CredentialSource for StaticSource {
    fn discover(&self) -> Result<Credentials> {
        Ok(self.0.clone())
    }
}

/// Install locations of the client lockfile per platform.
pub fn default_lockfile_paths() -> Vec<PathBuf> {
    if cfg!(target_os = "windows") {
        vec![
            PathBuf::from(r"C:\Riot Games\League of Legends\lockfile"),
            PathBuf::from(r"D:\Riot Games\League of Legends\lockfile"),
        ]
    } else if cfg!(target_os = "macos") {
        vec![PathBuf::from(
            "/Applications/League of Legends.app/Contents/LoL/lockfile",
        )]
    } else {
        Vec::new()
    }
}
