//! # riftkit
//!
//! Core library for the riftkit game-client companion tools.
//!
//! This crate provides:
//! - Lockfile discovery and an authenticated client for the game client's
//!   local HTTPS API
//! - A polling loop with snapshot diffing for change notifications
//! - Feature modules: status, friends, loot, ranked, replays, disposable
//!   mail, currency conversion
//! - Wrappers for media (ffmpeg) and image conversion
//! - JSON snapshot storage and CSV/JSON exports

pub mod config;
pub mod credentials;
pub mod currency;
pub mod error;
pub mod friends;
pub mod imaging;
pub mod loot;
pub mod mail;
pub mod media;
pub mod network;
pub mod poll;
pub mod ranked;
pub mod replay;
pub mod shutdown;
pub mod status;
pub mod storage;

pub use config::{Config, ConfigBuilder};
pub use credentials::{
    CredentialSource, Credentials, LockfileSource, StaticSource, default_lockfile_paths,
};
pub use currency::{GameCurrency, Rates, convert, fetch_rates};
pub use error::{Error, Result};
pub use friends::{ChatFriend, Friend, FriendTracker, FriendsReport};
pub use imaging::{ImageFormat, convert_image};
pub use loot::{LootItem, LootSort};
pub use mail::{MailAccount, Mailbox, Message, MessageSummary, create_account};
pub use media::{Preset, ProgressParser, TranscodeOptions, Transcoder};
pub use network::{LocalClient, RestClient};
pub use poll::{Identified, PollStats, Poller, SeenSet, diff_new};
pub use ranked::{RankedQueue, RankedSnapshot};
pub use replay::{MatchSummary, ReplayMetadata, ReplayState};
pub use shutdown::{ShutdownSignal, StopReason};
pub use status::{Availability, ChatMe, StatusEntry};
pub use storage::{CsvExporter, ExportFormat, JsonExporter, SnapshotStore, Tabular};
