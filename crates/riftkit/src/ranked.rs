//! Ranked-stats dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::network::LocalClient;
use crate::storage::{SnapshotStore, Tabular};

const RANKED_STATS: &str = "/lol-ranked/v1/current-ranked-stats";

pub const HISTORY_SNAPSHOT: &str = "ranked_history";
pub const HISTORY_CAP: usize = 365;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RankedStats {
    queues: Vec<RawQueue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawQueue {
    queue_type: String,
    tier: String,
    division: String,
    league_points: i32,
    wins: u32,
    losses: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedQueue {
    pub queue: String,
    pub tier: String,
    pub division: String,
    pub league_points: i32,
    pub wins: u32,
    pub losses: u32,
}

impl From<RawQueue> for RankedQueue {
    fn from(raw: RawQueue) -> Self {
        let unranked = raw.tier.is_empty() || raw.tier.eq_ignore_ascii_case("NONE");
        let division = match raw.division.as_str() {
            "NA" | "NONE" => String::new(),
            d => d.to_string(),
        };

        Self {
            queue: queue_label(&raw.queue_type).to_string(),
            tier: if unranked {
                "UNRANKED".to_string()
            } else {
                raw.tier
            },
            division: if unranked { String::new() } else { division },
            league_points: raw.league_points,
            wins: raw.wins,
            losses: raw.losses,
        }
    }
}

impl RankedQueue {
    pub fn is_ranked(&self) -> bool {
        self.tier != "UNRANKED"
    }

    pub fn games(&self) -> u32 {
        self.wins + self.losses
    }

    /// Fraction of games won, `None` without games.
    pub fn win_rate(&self) -> Option<f64> {
        match self.games() {
            0 => None,
            games => Some(self.wins as f64 / games as f64),
        }
    }

    /// e.g. "GOLD II 45 LP", "MASTER 120 LP", "UNRANKED".
    pub fn rank(&self) -> String {
        if !self.is_ranked() {
            return self.tier.clone();
        }
        if self.division.is_empty() {
            format!("{} {} LP", self.tier, self.league_points)
        } else {
            format!("{} {} {} LP", self.tier, self.division, self.league_points)
        }
    }
}

impl Tabular for RankedQueue {
    fn headers() -> &'static [&'static str] {
        &["Queue", "Rank", "Wins", "Losses", "Win rate"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.queue.clone(),
            self.rank(),
            self.wins.to_string(),
            self.losses.to_string(),
            self.win_rate()
                .map(|r| format!("{:.1}%", r * 100.0))
                .unwrap_or_else(|| "-".to_string()),
        ]
    }
}

fn queue_label(queue_type: &str) -> &str {
    match queue_type {
        "RANKED_SOLO_5x5" => "Solo/Duo",
        "RANKED_FLEX_SR" => "Flex 5v5",
        "RANKED_TFT" => "TFT",
        "RANKED_TFT_DOUBLE_UP" => "TFT Double Up",
        "RANKED_TFT_TURBO" => "TFT Hyper Roll",
        other => other,
    }
}

pub fn fetch_ranked(client: &LocalClient) -> Result<Vec<RankedQueue>> {
    let stats: RankedStats = client.get_json(RANKED_STATS)?;
    Ok(stats.queues.into_iter().map(RankedQueue::from).collect())
}

/// Dated copy of all queues, for the history file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedSnapshot {
    pub taken_at: DateTime<Utc>,
    pub queues: Vec<RankedQueue>,
}

pub fn record_snapshot(
    store: &SnapshotStore,
    queues: &[RankedQueue],
    now: DateTime<Utc>,
) -> Result<Vec<RankedSnapshot>> {
    let snapshot = RankedSnapshot {
        taken_at: now,
        queues: queues.to_vec(),
    };
    store.append_capped(HISTORY_SNAPSHOT, snapshot, HISTORY_CAP)
}

/// LP change per queue since the previous snapshot, for queues whose tier
/// and division did not change.
pub fn lp_delta(previous: &RankedSnapshot, current: &[RankedQueue]) -> Vec<(String, i32)> {
    current
        .iter()
        .filter_map(|q| {
            let before = previous.queues.iter().find(|p| p.queue == q.queue)?;
            (before.tier == q.tier && before.division == q.division && q.is_ranked())
                .then(|| (q.queue.clone(), q.league_points - before.league_points))
        })
        .collect()
}
