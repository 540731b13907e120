//! Peg ledger and user directory with optional JSON snapshot.

use crate::error::StoreError;
use crate::types::*;
use chrono::Utc;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

/// Peg ledger plus the people the bot knows about.
///
/// Everything lives in memory. When a snapshot path is configured, the whole
/// store is written to it after every mutation and read back on open.
pub struct PegStore {
    data: RwLock<StoreData>,
    snapshot_path: Option<PathBuf>,
    /// Held across serialize, write and rename so snapshots never interleave.
    persist_lock: Mutex<()>,
}

impl PegStore {
    /// Create an empty store that never touches disk.
    pub fn in_memory() -> Arc<Self> {
        Arc::new(Self {
            data: RwLock::new(StoreData::default()),
            snapshot_path: None,
            persist_lock: Mutex::new(()),
        })
    }

    /// Open a store, loading the snapshot at `path` if it exists.
    pub async fn open(path: Option<PathBuf>) -> Result<Arc<Self>, StoreError> {
        let store = Arc::new(Self {
            data: RwLock::new(StoreData::default()),
            snapshot_path: path,
            persist_lock: Mutex::new(()),
        });

        store.load().await?;

        Ok(store)
    }

    async fn load(&self) -> Result<(), StoreError> {
        let Some(path) = &self.snapshot_path else {
            info!("Peg store running in memory only");
            return Ok(());
        };

        if !path.exists() {
            info!("Peg snapshot not found at {:?}, starting fresh", path);
            return Ok(());
        }

        let raw = fs::read(path).await?;
        let data: StoreData = serde_json::from_slice(&raw)?;

        if data.version != DATA_VERSION {
            warn!(
                "Peg snapshot version {} differs from {}, loading anyway",
                data.version, DATA_VERSION
            );
        }

        info!(
            "Loaded peg store: {} pegs, {} users",
            data.pegs.len(),
            data.users.len()
        );

        *self.data.write().await = data;

        Ok(())
    }

    /// Write the snapshot, if one is configured.
    ///
    /// The state is read after taking the persist lock, so the last writer
    /// always saves the newest ledger.
    pub async fn persist(&self) -> Result<(), StoreError> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };

        let _guard = self.persist_lock.lock().await;

        let raw = {
            let data = self.data.read().await;
            serde_json::to_vec_pretty(&*data)?
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &raw).await?;
        fs::rename(&temp_path, path).await?;

        debug!("Saved peg store ({} bytes) to {:?}", raw.len(), path);
        Ok(())
    }

    /// Record a peg. Self-pegs are rejected.
    pub async fn give_peg(
        &self,
        sender: &str,
        recipient: &str,
        comment: &str,
        keywords: Vec<String>,
    ) -> Result<Peg, StoreError> {
        self.record_peg(sender, recipient, comment, keywords, None)
            .await
    }

    /// Record a peg unless `sender` has already given `allowance` pegs.
    ///
    /// The count and the insert happen under one write lock.
    pub async fn give_peg_within(
        &self,
        sender: &str,
        recipient: &str,
        comment: &str,
        keywords: Vec<String>,
        allowance: usize,
    ) -> Result<Peg, StoreError> {
        self.record_peg(sender, recipient, comment, keywords, Some(allowance))
            .await
    }

    #[instrument(skip(self, comment, keywords))]
    async fn record_peg(
        &self,
        sender: &str,
        recipient: &str,
        comment: &str,
        keywords: Vec<String>,
        allowance: Option<usize>,
    ) -> Result<Peg, StoreError> {
        if sender == recipient {
            return Err(StoreError::SelfPeg);
        }

        let peg = {
            let mut data = self.data.write().await;

            if let Some(allowance) = allowance {
                let given = data.pegs.iter().filter(|p| p.sender == sender).count();
                if given >= allowance {
                    return Err(StoreError::NoPegsLeft {
                        sender: sender.to_string(),
                        allowance,
                    });
                }
            }

            let peg = Peg {
                id: data.next_peg_id,
                sender: sender.to_string(),
                recipient: recipient.to_string(),
                comment: comment.to_string(),
                keywords,
                created_at: Utc::now(),
            };
            data.next_peg_id += 1;
            data.pegs.push(peg.clone());
            peg
        };

        self.persist().await?;

        info!("Peg #{} recorded", peg.id);
        Ok(peg)
    }

    /// Remove the most recent peg `sender` gave to `recipient`.
    #[instrument(skip(self))]
    pub async fn take_back_peg(&self, sender: &str, recipient: &str) -> Result<Peg, StoreError> {
        let removed = {
            let mut data = self.data.write().await;
            let index = data
                .pegs
                .iter()
                .rposition(|p| p.sender == sender && p.recipient == recipient)
                .ok_or_else(|| StoreError::NoPegToTakeBack {
                    sender: sender.to_string(),
                    recipient: recipient.to_string(),
                })?;
            data.pegs.remove(index)
        };

        self.persist().await?;

        info!("Peg #{} taken back", removed.id);
        Ok(removed)
    }

    /// Pegs given by a person, oldest first.
    pub async fn given_by(&self, sender: &str) -> Vec<Peg> {
        let data = self.data.read().await;
        data.pegs
            .iter()
            .filter(|p| p.sender == sender)
            .cloned()
            .collect()
    }

    /// Number of pegs a person has given this round.
    pub async fn given_count(&self, sender: &str) -> usize {
        let data = self.data.read().await;
        data.pegs.iter().filter(|p| p.sender == sender).count()
    }

    /// Pegs received by a person, oldest first.
    pub async fn received_by(&self, recipient: &str) -> Vec<Peg> {
        let data = self.data.read().await;
        data.pegs
            .iter()
            .filter(|p| p.recipient == recipient)
            .cloned()
            .collect()
    }

    /// Total pegs in the ledger.
    pub async fn peg_count(&self) -> usize {
        self.data.read().await.pegs.len()
    }

    /// Recipients ranked by pegs received, then keyword pegs, then id.
    pub async fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        rank(&self.data.read().await.pegs)
    }

    /// Clear every peg. Returns how many were removed.
    #[instrument(skip(self))]
    pub async fn reset(&self) -> Result<usize, StoreError> {
        let removed = {
            let mut data = self.data.write().await;
            let removed = data.pegs.len();
            data.pegs.clear();
            removed
        };

        self.persist().await?;

        info!("Reset peg ledger ({} pegs removed)", removed);
        Ok(removed)
    }

    /// Rank and clear the ledger in one step. Nothing is cleared when the
    /// ledger is already empty.
    #[instrument(skip(self))]
    pub async fn finish_round(&self) -> Result<FinishedRound, StoreError> {
        let round = {
            let mut data = self.data.write().await;
            let pegs = std::mem::take(&mut data.pegs);
            FinishedRound {
                total: pegs.len(),
                leaderboard: rank(&pegs),
            }
        };

        if round.total > 0 {
            self.persist().await?;
            info!("Round finished with {} pegs", round.total);
        }

        Ok(round)
    }

    /// Insert or replace a person.
    pub async fn upsert_user(&self, user: User) -> Result<(), StoreError> {
        {
            let mut data = self.data.write().await;
            data.users.insert(user.id.clone(), user);
        }
        self.persist().await
    }

    /// Insert or replace many people with a single snapshot write.
    pub async fn upsert_users(&self, users: Vec<User>) -> Result<usize, StoreError> {
        let count = users.len();
        {
            let mut data = self.data.write().await;
            for user in users {
                data.users.insert(user.id.clone(), user);
            }
        }
        self.persist().await?;
        Ok(count)
    }

    pub async fn user(&self, id: &str) -> Option<User> {
        self.data.read().await.users.get(id).cloned()
    }

    pub async fn users(&self) -> Vec<User> {
        let data = self.data.read().await;
        let mut users: Vec<User> = data.users.values().cloned().collect();
        users.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        users
    }

    /// Display name for a person, falling back to their id.
    pub async fn display_name(&self, id: &str) -> String {
        self.user(id)
            .await
            .map(|u| u.display_name)
            .unwrap_or_else(|| id.to_string())
    }
}

fn rank(pegs: &[Peg]) -> Vec<LeaderboardEntry> {
    let mut totals: HashMap<&str, LeaderboardEntry> = HashMap::new();

    for peg in pegs {
        let entry = totals
            .entry(peg.recipient.as_str())
            .or_insert_with(|| LeaderboardEntry {
                person_id: peg.recipient.clone(),
                pegs: 0,
                keyword_pegs: 0,
            });
        entry.pegs += 1;
        if peg.has_keywords() {
            entry.keyword_pegs += 1;
        }
    }

    let mut entries: Vec<LeaderboardEntry> = totals.into_values().collect();
    entries.sort_by(|a, b| {
        b.pegs
            .cmp(&a.pegs)
            .then(b.keyword_pegs.cmp(&a.keyword_pegs))
            .then_with(|| a.person_id.cmp(&b.person_id))
    });
    entries
}
