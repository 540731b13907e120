//! Peg ledger and user directory types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Snapshot schema version.
pub const DATA_VERSION: u32 = 1;

/// A single peg given from one person to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Peg {
    pub id: u64,
    pub sender: String,
    pub recipient: String,
    pub comment: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Peg {
    /// Whether the comment carried at least one configured keyword.
    pub fn has_keywords(&self) -> bool {
        !self.keywords.is_empty()
    }
}

/// A known person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            email: None,
            updated_at: Utc::now(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Aggregated pegs received by one person.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub person_id: String,
    pub pegs: usize,
    pub keyword_pegs: usize,
}

/// Outcome of closing a round: everything that was in the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedRound {
    pub total: usize,
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// Persistent data structure for the peg store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreData {
    /// Schema version for migrations.
    pub version: u32,
    /// Next peg id to hand out.
    pub next_peg_id: u64,
    /// All pegs of the current round, oldest first.
    pub pegs: Vec<Peg>,
    /// Known people by id.
    pub users: HashMap<String, User>,
}

impl Default for StoreData {
    fn default() -> Self {
        Self {
            version: DATA_VERSION,
            next_peg_id: 1,
            pegs: Vec::new(),
            users: HashMap::new(),
        }
    }
}
