use std::path::PathBuf;

use clap::{Parser, Subcommand};
use riftkit::{Availability, LootSort, Preset};

#[derive(Parser)]
#[command(name = "riftkit")]
#[command(version)]
#[command(about = "Companion tools for the game client's local API")]
pub struct Args {
    /// Config file (default: <config dir>/riftkit/config.toml)
    #[arg(short, long, global = true, env = "RIFTKIT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show or change chat presence
    Status {
        #[command(subcommand)]
        action: StatusAction,
    },
    /// Friend list with recently added friends
    Friends {
        #[command(subcommand)]
        action: FriendsAction,
    },
    /// Inventory viewer
    Loot {
        #[command(subcommand)]
        action: LootAction,
    },
    /// Ranked stats for every queue
    Ranked {
        /// Append the current stats to the ranked history
        #[arg(long)]
        record: bool,
    },
    /// Match history replays
    Replay {
        #[command(subcommand)]
        action: ReplayAction,
    },
    /// Disposable email inbox
    Mail {
        #[command(subcommand)]
        action: MailAction,
    },
    /// Currency conversion
    Currency {
        #[command(subcommand)]
        action: CurrencyAction,
    },
    /// Convert audio/video with ffmpeg
    Media {
        input: PathBuf,
        output: PathBuf,
        #[arg(short, long, value_parser = parse_preset, default_value = "default")]
        preset: Preset,
        /// Video codec (-c:v)
        #[arg(long)]
        video_codec: Option<String>,
        /// Audio codec (-c:a)
        #[arg(long)]
        audio_codec: Option<String>,
        /// Extra ffmpeg arguments, after `--`
        #[arg(last = true)]
        extra: Vec<String>,
    },
    /// Convert an image to another format
    Image {
        input: PathBuf,
        output: PathBuf,
        /// Output format, when the extension is not enough (e.g. png, jpeg)
        #[arg(short, long)]
        format: Option<String>,
    },
    /// Show the discovered client connection
    Creds,
}

#[derive(Subcommand)]
pub enum StatusAction {
    /// Current presence
    Show,
    /// Change presence
    Set {
        #[arg(value_parser = parse_availability)]
        availability: Availability,
        /// Status message
        #[arg(short, long)]
        message: Option<String>,
    },
    /// Previous status changes
    History {
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },
}

#[derive(Subcommand)]
pub enum FriendsAction {
    /// List friends, recently added first
    List {
        /// Only show recently added friends
        #[arg(long)]
        recent: bool,
    },
    /// Report friends as they are added
    Watch,
}

#[derive(Subcommand)]
pub enum LootAction {
    /// Print inventory as a table
    List {
        /// Substring of the item type (e.g. champion, skin)
        #[arg(short = 't', long = "type")]
        item_type: Option<String>,
        #[arg(short, long, value_parser = parse_loot_sort, default_value = "name")]
        sort: LootSort,
    },
    /// Write inventory to a .csv or .json file
    Export {
        output: PathBuf,
        #[arg(short = 't', long = "type")]
        item_type: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ReplayAction {
    /// Recent matches
    List {
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,
    },
    /// Download the replay of a match
    Download {
        game_id: u64,
        /// Seconds to wait for the download
        #[arg(long, default_value_t = 120)]
        timeout: u64,
    },
    /// Upload a .rofl file
    Upload {
        file: PathBuf,
        /// Upload URL
        #[arg(long, env = "RIFTKIT_UPLOAD_URL")]
        endpoint: String,
        #[arg(long, env = "RIFTKIT_UPLOAD_TOKEN")]
        token: Option<String>,
    },
    /// Download replays of new matches as they appear
    Watch {
        #[arg(long, default_value_t = 120)]
        timeout: u64,
    },
}

#[derive(Subcommand)]
pub enum MailAction {
    /// Create a new address (replaces the saved one)
    New,
    /// List received messages
    Inbox,
    /// Print one message
    Read { id: String },
    /// Print messages as they arrive
    Watch,
}

#[derive(Subcommand)]
pub enum CurrencyAction {
    /// Convert between fiat currencies
    Convert { amount: f64, from: String, to: String },
    /// In-game points to fiat, or fiat to points with --reverse
    Points {
        amount: f64,
        /// Fiat currency (default: the configured points currency)
        #[arg(long)]
        currency: Option<String>,
        #[arg(short, long)]
        reverse: bool,
    },
}

fn parse_availability(s: &str) -> Result<Availability, String> {
    s.parse()
        .map_err(|_| format!("unknown availability '{}' (chat, away, dnd, mobile, offline)", s))
}

fn parse_loot_sort(s: &str) -> Result<LootSort, String> {
    s.parse()
        .map_err(|_| format!("unknown sort '{}' (name, value, count)", s))
}

fn parse_preset(s: &str) -> Result<Preset, String> {
    s.parse()
        .map_err(|_| format!("unknown preset '{}' (default, audio-only, copy)", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_set() {
        let args = Args::parse_from(["riftkit", "status", "set", "busy", "-m", "ranked"]);
        match args.command {
            Command::Status {
                action: StatusAction::Set {
                    availability,
                    message,
                },
            } => {
                assert_eq!(availability, Availability::Dnd);
                assert_eq!(message.as_deref(), Some("ranked"));
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn test_parse_media_extra_args() {
        let args = Args::parse_from([
            "riftkit", "media", "in.mp4", "out.mp3", "-p", "audio-only", "--", "-b:a", "192k",
        ]);
        match args.command {
            Command::Media { preset, extra, .. } => {
                assert_eq!(preset, Preset::AudioOnly);
                assert_eq!(extra, vec!["-b:a", "192k"]);
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::parse_from(["riftkit", "ranked", "--record", "-v"]);
        assert!(args.verbose);
        assert!(matches!(args.command, Command::Ranked { record: true }));
    }

    #[test]
    fn test_invalid_sort_is_rejected() {
        assert!(Args::try_parse_from(["riftkit", "loot", "list", "--sort", "price"]).is_err());
    }
}
