//! Friend-list tracker.
//!
//! The client API does not say when a friendship started, so the tracker
//! remembers when it first saw each friend (`friends.json`, keyed by puuid)
//! and derives "recently added" from that.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::network::LocalClient;
use crate::poll::Identified;
use crate::storage::{SnapshotStore, Tabular};

const FRIENDS: &str = "/lol-chat/v1/friends";

pub const SNAPSHOT: &str = "friends";

/// Friends first seen within this window count as recently added.
pub const RECENT_DAYS: i64 = 7;

/// Friend entry as returned by the chat API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatFriend {
    pub id: String,
    pub puuid: String,
    pub game_name: String,
    pub game_tag: String,
    pub name: String,
    pub availability: String,
    pub status_message: String,
}

impl ChatFriend {
    pub fn display_name(&self) -> String {
        match (self.game_name.is_empty(), self.game_tag.is_empty()) {
            (false, false) => format!("{}#{}", self.game_name, self.game_tag),
            (false, true) => self.game_name.clone(),
            _ => self.name.clone(),
        }
    }
}

impl Identified for ChatFriend {
    fn identifier(&self) -> String {
        if self.puuid.is_empty() {
            self.id.clone()
        } else {
            self.puuid.clone()
        }
    }
}

pub fn fetch_friends(client: &LocalClient) -> Result<Vec<ChatFriend>> {
    client.get_json(FRIENDS)
}

/// Friend with tracking information.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Friend {
    pub puuid: String,
    pub display_name: String,
    pub availability: String,
    pub status_message: String,
    /// First time the tracker saw this friend; `None` if the stored
    /// timestamp is unreadable.
    pub since: Option<DateTime<Utc>>,
    pub recently_added: bool,
}

impl Tabular for Friend {
    fn headers() -> &'static [&'static str] {
        &["Name", "Status", "Since", "New", "Message"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.display_name.clone(),
            self.availability.clone(),
            self.since
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "?".to_string()),
            if self.recently_added { "yes" } else { "" }.to_string(),
            self.status_message.clone(),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct SeenFriend {
    name: String,
    /// RFC 3339; kept as text so a damaged value is reported, not dropped.
    first_seen: String,
    /// Present before tracking started; never counts as recently added.
    #[serde(default)]
    imported: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct FriendsSnapshot {
    friends: BTreeMap<String, SeenFriend>,
}

/// Result of merging a fresh friend list into the snapshot.
#[derive(Debug, Clone, Default)]
pub struct FriendsReport {
    pub friends: Vec<Friend>,
    /// Friends not in the previous snapshot.
    pub added: Vec<Friend>,
    /// Display names of friends that disappeared.
    pub removed: Vec<String>,
}

pub struct FriendTracker {
    store: SnapshotStore,
}

impl FriendTracker {
    pub fn new(store: SnapshotStore) -> Self {
        Self { store }
    }

    /// Merge `fetched` into the stored snapshot and save it.
    ///
    /// On the very first run every friend is recorded as imported, so an
    /// existing list is not reported as a wave of new friends.
    pub fn refresh(&self, fetched: &[ChatFriend], now: DateTime<Utc>) -> Result<FriendsReport> {
        let previous: Option<FriendsSnapshot> = self.store.load(SNAPSHOT)?;
        let baseline = previous.is_none();
        let mut snapshot = previous.unwrap_or_default();

        let mut report = FriendsReport::default();
        let mut present = HashSet::new();

        for chat_friend in fetched {
            let id = chat_friend.identifier();
            if id.is_empty() {
                continue;
            }
            present.insert(id.clone());

            let is_new = !snapshot.friends.contains_key(&id);
            let seen = snapshot.friends.entry(id.clone()).or_insert_with(|| SeenFriend {
                name: chat_friend.display_name(),
                first_seen: now.to_rfc3339(),
                imported: baseline,
            });
            seen.name = chat_friend.display_name();

            let friend = to_friend(&id, chat_friend, seen, now);
            if is_new && !baseline {
                report.added.push(friend.clone());
            }
            report.friends.push(friend);
        }

        let gone: Vec<String> = snapshot
            .friends
            .keys()
            .filter(|id| !present.contains(*id))
            .cloned()
            .collect();
        for id in gone {
            if let Some(seen) = snapshot.friends.remove(&id) {
                report.removed.push(seen.name);
            }
        }

        if baseline {
            info!("Started tracking {} friends", report.friends.len());
        } else if !report.added.is_empty() || !report.removed.is_empty() {
            info!(
                "Friends: {} added, {} removed",
                report.added.len(),
                report.removed.len()
            );
        }

        self.store.save(SNAPSHOT, &snapshot)?;
        report.friends.sort_by(|a, b| {
            b.recently_added
                .cmp(&a.recently_added)
                .then_with(|| a.display_name.to_lowercase().cmp(&b.display_name.to_lowercase()))
        });
        Ok(report)
    }
}

fn to_friend(id: &str, chat: &ChatFriend, seen: &SeenFriend, now: DateTime<Utc>) -> Friend {
    let since = match DateTime::parse_from_rfc3339(&seen.first_seen) {
        Ok(t) => Some(t.with_timezone(&Utc)),
        Err(e) => {
            warn!(
                "Unreadable first-seen time for {} ({:?}): {}",
                seen.name, seen.first_seen, e
            );
            None
        }
    };

    let recently_added = !seen.imported && since.is_some_and(|t| is_recent(t, now));
    debug!("{} since {:?} recent={}", seen.name, since, recently_added);

    Friend {
        puuid: id.to_string(),
        display_name: chat.display_name(),
        availability: chat.availability.clone(),
        status_message: chat.status_message.clone(),
        since,
        recently_added,
    }
}

/// Whether `since` lies within [`RECENT_DAYS`] before `now`.
pub fn is_recent(since: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(since) < Duration::days(RECENT_DAYS)
}
