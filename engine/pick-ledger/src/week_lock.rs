//! Per-(league, season, week) exclusivity

use crate::ids::WeekKey;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

/// Held while a lock transition or backfill touches one week
pub struct WeekGuard {
    key: WeekKey,
    _guard: OwnedMutexGuard<()>,
}

impl WeekGuard {
    pub fn key(&self) -> &WeekKey {
        &self.key
    }
}

impl Drop for WeekGuard {
    fn drop(&mut self) {
        debug!(week = %self.key, "Released week token");
    }
}

/// Hands out one exclusivity token per week key.
///
/// Lock transitions and backfills for the same week queue behind each other;
/// different weeks proceed independently.
#[derive(Debug, Default)]
pub struct WeekLockRegistry {
    tokens: DashMap<WeekKey, Arc<Mutex<()>>>,
}

impl WeekLockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn token(&self, key: &WeekKey) -> Arc<Mutex<()>> {
        self.tokens.entry(key.clone()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }

    /// Wait for the week's token
    pub async fn acquire(&self, key: &WeekKey) -> WeekGuard {
        let guard = self.token(key).lock_owned().await;
        debug!(week = %key, "Acquired week token");
        WeekGuard { key: key.clone(), _guard: guard }
    }

    /// Take the token only if nobody holds it
    pub fn try_acquire(&self, key: &WeekKey) -> Option<WeekGuard> {
        let guard = self.token(key).try_lock_owned().ok()?;
        Some(WeekGuard { key: key.clone(), _guard: guard })
    }
}
