//! Replay downloader and uploader.
//!
//! Downloads are performed by the game client itself: we ask it to fetch
//! the `.rofl` for a match, poll the replay metadata until it is ready, then
//! locate the file in the client's replay folder.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use strum::{Display, EnumString};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::network::{LocalClient, RestClient};
use crate::poll::Identified;
use crate::shutdown::ShutdownSignal;
use crate::storage::Tabular;

const MATCHES: &str = "/lol-match-history/v1/products/lol/current-summoner/matches";
const ROFLS_PATH: &str = "/lol-replays/v1/rofls/path";

/// Delay between replay metadata checks while a download runs.
const DOWNLOAD_POLL: Duration = Duration::from_secs(1);

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MatchHistory {
    games: GameList,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GameList {
    games: Vec<RawGame>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawGame {
    game_id: u64,
    game_creation: i64,
    game_duration: u64,
    game_mode: String,
    queue_id: i32,
    participants: Vec<RawParticipant>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawParticipant {
    champion_id: u32,
    stats: RawStats,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawStats {
    win: bool,
    kills: u32,
    deaths: u32,
    assists: u32,
}

/// One match of the local player's history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSummary {
    pub game_id: u64,
    pub created_at: Option<DateTime<Utc>>,
    pub duration_secs: u64,
    pub game_mode: String,
    pub queue_id: i32,
    pub champion_id: u32,
    pub win: Option<bool>,
    pub kda: String,
}

impl From<RawGame> for MatchSummary {
    fn from(raw: RawGame) -> Self {
        // The current-summoner endpoint only lists the local player.
        let me = raw.participants.first();
        Self {
            game_id: raw.game_id,
            created_at: Utc.timestamp_millis_opt(raw.game_creation).single(),
            duration_secs: raw.game_duration,
            game_mode: raw.game_mode,
            queue_id: raw.queue_id,
            champion_id: me.map(|p| p.champion_id).unwrap_or_default(),
            win: me.map(|p| p.stats.win),
            kda: me
                .map(|p| format!("{}/{}/{}", p.stats.kills, p.stats.deaths, p.stats.assists))
                .unwrap_or_default(),
        }
    }
}

impl Identified for MatchSummary {
    fn identifier(&self) -> String {
        self.game_id.to_string()
    }
}

impl Tabular for MatchSummary {
    fn headers() -> &'static [&'static str] {
        &["Game", "Date", "Mode", "Duration", "Champion", "Result", "KDA"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.game_id.to_string(),
            self.created_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
            self.game_mode.clone(),
            format!("{}:{:02}", self.duration_secs / 60, self.duration_secs % 60),
            self.champion_id.to_string(),
            match self.win {
                Some(true) => "Win",
                Some(false) => "Loss",
                None => "",
            }
            .to_string(),
            self.kda.clone(),
        ]
    }
}

/// Download state reported by the client for one replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, EnumString, Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ReplayState {
    /// Downloaded and ready to watch.
    Watch,
    /// Available on the server, not downloaded yet.
    Download,
    Downloading,
    Checking,
    Found,
    Incompatible,
    MissingOrExpired,
    Error,
    LostConnection,
    #[serde(other)]
    Unknown,
}

impl ReplayState {
    /// Whether the state will not change without user action.
    pub fn is_final(&self) -> bool {
        !matches!(self, Self::Downloading | Self::Checking | Self::Found)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayMetadata {
    pub game_id: u64,
    pub state: ReplayState,
    #[serde(default)]
    pub download_progress: u32,
}

pub fn recent_matches(client: &LocalClient, count: usize) -> Result<Vec<MatchSummary>> {
    let endpoint = format!("{}?begIndex=0&endIndex={}", MATCHES, count);
    let history: MatchHistory = client.get_json(&endpoint)?;
    Ok(history
        .games
        .games
        .into_iter()
        .map(MatchSummary::from)
        .collect())
}

/// Folder the client saves `.rofl` files to.
pub fn replays_path(client: &LocalClient) -> Result<PathBuf> {
    let path: String = client.get_json(ROFLS_PATH)?;
    Ok(PathBuf::from(path))
}

pub fn replay_metadata(client: &LocalClient, game_id: u64) -> Result<ReplayMetadata> {
    client.get_json(&format!("/lol-replays/v1/metadata/{}", game_id))
}

/// Ask the client to start downloading a replay.
pub fn request_download(client: &LocalClient, game_id: u64) -> Result<()> {
    let endpoint = format!("/lol-replays/v1/rofls/{}/download", game_id);
    client.post_json::<_, ()>(
        &endpoint,
        &json!({ "componentType": "replay-button_match-history" }),
    )?;
    info!("Requested replay download for game {}", game_id);
    Ok(())
}

/// Poll replay metadata until the download settles, `timeout` passes or
/// shutdown is requested. Returns the last state seen.
pub fn wait_for_download(
    client: &LocalClient,
    game_id: u64,
    timeout: Duration,
    shutdown: &ShutdownSignal,
) -> Result<ReplayState> {
    let started = Instant::now();
    loop {
        let meta = replay_metadata(client, game_id)?;
        debug!(
            "Replay {}: {} ({}%)",
            game_id, meta.state, meta.download_progress
        );
        if meta.state.is_final() || started.elapsed() >= timeout {
            return Ok(meta.state);
        }
        if shutdown.wait(DOWNLOAD_POLL) {
            return Ok(meta.state);
        }
    }
}

/// Find `<platform>-<game_id>.rofl` in `dir`.
pub fn find_replay_file(dir: &Path, game_id: u64) -> Result<Option<PathBuf>> {
    let suffix = format!("-{}.rofl", game_id);
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(&suffix));
        if matches {
            return Ok(Some(path));
        }
    }
    Ok(None)
}

/// Download a replay and return its file path once it is on disk.
pub fn download(
    client: &LocalClient,
    game_id: u64,
    timeout: Duration,
    shutdown: &ShutdownSignal,
) -> Result<PathBuf> {
    let state = replay_metadata(client, game_id)?.state;
    let state = match state {
        ReplayState::Watch => state,
        ReplayState::Download | ReplayState::Error | ReplayState::LostConnection => {
            request_download(client, game_id)?;
            wait_for_download(client, game_id, timeout, shutdown)?
        }
        _ => wait_for_download(client, game_id, timeout, shutdown)?,
    };

    if state != ReplayState::Watch {
        return Err(Error::InvalidInput(format!(
            "replay for game {} is not available ({})",
            game_id, state
        )));
    }

    let dir = replays_path(client)?;
    find_replay_file(&dir, game_id)?.ok_or_else(|| {
        Error::InvalidInput(format!(
            "replay for game {} not found in {}",
            game_id,
            dir.display()
        ))
    })
}

/// Upload a `.rofl` file to a replay-sharing endpoint. Returns the HTTP
/// status.
pub fn upload(rest: &RestClient, path: &Path) -> Result<u16> {
    let is_rofl = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("rofl"));
    if !is_rofl {
        return Err(Error::InvalidInput(format!(
            "not a replay file: {}",
            path.display()
        )));
    }

    let data = fs::read(path)?;
    if data.is_empty() {
        return Err(Error::InvalidInput(format!("empty file: {}", path.display())));
    }

    let size = data.len();
    let (status, _) = rest.post_bytes("", "application/octet-stream", data)?;
    info!("Uploaded {} ({} bytes) -> {}", path.display(), size, status);
    Ok(status)
}
