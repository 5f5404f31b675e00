//! Chat presence: read and update availability and status message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use tracing::info;

use crate::error::Result;
use crate::network::LocalClient;
use crate::storage::{SnapshotStore, Tabular};

const CHAT_ME: &str = "/lol-chat/v1/me";

/// Snapshot name of the status history.
pub const HISTORY_SNAPSHOT: &str = "status_history";
/// Entries kept in the status history.
pub const HISTORY_CAP: usize = 100;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum Availability {
    #[strum(to_string = "chat", serialize = "online")]
    Chat,
    #[strum(to_string = "away")]
    Away,
    #[strum(to_string = "dnd", serialize = "busy")]
    Dnd,
    #[strum(to_string = "mobile")]
    Mobile,
    #[strum(to_string = "offline")]
    Offline,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Chat => "Online",
            Self::Away => "Away",
            Self::Dnd => "In game / busy",
            Self::Mobile => "Mobile",
            Self::Offline => "Offline",
        }
    }
}

/// The local player's chat presence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatMe {
    pub game_name: String,
    pub game_tag: String,
    pub puuid: String,
    pub availability: String,
    pub status_message: String,
}

impl ChatMe {
    /// Parsed availability; `None` for states this tool cannot set
    /// (e.g. spectating).
    pub fn availability(&self) -> Option<Availability> {
        self.availability.parse().ok()
    }

    pub fn display_name(&self) -> String {
        if self.game_tag.is_empty() {
            self.game_name.clone()
        } else {
            format!("{}#{}", self.game_name, self.game_tag)
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusUpdate<'a> {
    availability: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    status_message: Option<&'a str>,
}

pub fn current_status(client: &LocalClient) -> Result<ChatMe> {
    client.get_json(CHAT_ME)
}

/// Change availability and, when given, the status message.
pub fn set_status(
    client: &LocalClient,
    availability: Availability,
    message: Option<&str>,
) -> Result<ChatMe> {
    let update = StatusUpdate {
        availability: availability.as_str(),
        status_message: message,
    };
    let me: ChatMe = client.put_json(CHAT_ME, &update)?;
    info!("Status set to {} ({:?})", availability, message.unwrap_or(""));
    Ok(me)
}

/// One successful status change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub timestamp: DateTime<Utc>,
    pub availability: Availability,
    pub message: String,
}

impl StatusEntry {
    pub fn now(availability: Availability, message: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            availability,
            message: message.to_string(),
        }
    }
}

impl Tabular for StatusEntry {
    fn headers() -> &'static [&'static str] {
        &["Time", "Status", "Message"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            self.availability.to_string(),
            self.message.clone(),
        ]
    }
}

/// Append to the persisted history, keeping the newest [`HISTORY_CAP`].
pub fn record_status(store: &SnapshotStore, entry: StatusEntry) -> Result<Vec<StatusEntry>> {
    store.append_capped(HISTORY_SNAPSHOT, entry, HISTORY_CAP)
}

pub fn load_history(store: &SnapshotStore) -> Result<Vec<StatusEntry>> {
    store.load_or_default(HISTORY_SNAPSHOT)
}

/// Set the status and record it in the history.
pub fn update_and_record(
    client: &LocalClient,
    store: &SnapshotStore,
    availability: Availability,
    message: Option<&str>,
) -> Result<ChatMe> {
    let me = set_status(client, availability, message)?;
    let stored_message = message.unwrap_or(&me.status_message);
    record_status(store, StatusEntry::now(availability, stored_message))?;
    Ok(me)
}
