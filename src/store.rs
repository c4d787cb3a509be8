//! Persistence collaborator boundary.
//!
//! The engine only ever works on in-memory snapshots; whoever owns durable
//! storage implements `ProgressStore`. Methods look synchronous by contract —
//! real backends hide their own async behind this seam. The built-in
//! `MemoryStore` backs tests and single-node runs.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::{UnlockRecord, UserStats};

pub trait ProgressStore: Send + Sync {
  fn load_unlock_state(&self, user_id: &str, case_id: &str) -> Vec<UnlockRecord>;
  fn save_unlock_state(&self, user_id: &str, case_id: &str, records: &[UnlockRecord]);
  fn load_balance(&self, user_id: &str) -> Option<u32>;
  fn save_balance(&self, user_id: &str, balance: u32);
  fn load_stats(&self, user_id: &str) -> UserStats;
  fn save_stats(&self, user_id: &str, stats: &UserStats);
  fn load_achievements(&self, user_id: &str) -> Vec<String>;
  fn save_achievements(&self, user_id: &str, ids: &[String]);
}

/// In-memory store. A poisoned lock here means another thread panicked
/// mid-write; treating that as fatal is the intended behavior.
#[derive(Default)]
pub struct MemoryStore {
  unlocks: Mutex<HashMap<(String, String), Vec<UnlockRecord>>>,
  balances: Mutex<HashMap<String, u32>>,
  stats: Mutex<HashMap<String, UserStats>>,
  achievements: Mutex<HashMap<String, Vec<String>>>,
}

impl ProgressStore for MemoryStore {
  fn load_unlock_state(&self, user_id: &str, case_id: &str) -> Vec<UnlockRecord> {
    self
      .unlocks
      .lock()
      .expect("unlock store poisoned")
      .get(&(user_id.to_string(), case_id.to_string()))
      .cloned()
      .unwrap_or_default()
  }

  fn save_unlock_state(&self, user_id: &str, case_id: &str, records: &[UnlockRecord]) {
    self
      .unlocks
      .lock()
      .expect("unlock store poisoned")
      .insert((user_id.to_string(), case_id.to_string()), records.to_vec());
  }

  fn load_balance(&self, user_id: &str) -> Option<u32> {
    self.balances.lock().expect("balance store poisoned").get(user_id).copied()
  }

  fn save_balance(&self, user_id: &str, balance: u32) {
    self.balances.lock().expect("balance store poisoned").insert(user_id.to_string(), balance);
  }

  fn load_stats(&self, user_id: &str) -> UserStats {
    self.stats.lock().expect("stats store poisoned").get(user_id).cloned().unwrap_or_default()
  }

  fn save_stats(&self, user_id: &str, stats: &UserStats) {
    self.stats.lock().expect("stats store poisoned").insert(user_id.to_string(), stats.clone());
  }

  fn load_achievements(&self, user_id: &str) -> Vec<String> {
    self
      .achievements
      .lock()
      .expect("achievement store poisoned")
      .get(user_id)
      .cloned()
      .unwrap_or_default()
  }

  fn save_achievements(&self, user_id: &str, ids: &[String]) {
    self
      .achievements
      .lock()
      .expect("achievement store poisoned")
      .insert(user_id.to_string(), ids.to_vec());
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::UnlockMethod;

  #[test]
  fn unlock_state_round_trips_per_user_and_case() {
    let store = MemoryStore::default();
    let rec = UnlockRecord {
      case_id: "case-2".into(),
      step_id: "hs-2-hidden".into(),
      unlocked: true,
      method: UnlockMethod::Purchased,
    };
    store.save_unlock_state("ada", "case-2", std::slice::from_ref(&rec));

    assert_eq!(store.load_unlock_state("ada", "case-2"), vec![rec]);
    assert!(store.load_unlock_state("ada", "case-3").is_empty());
    assert!(store.load_unlock_state("grace", "case-2").is_empty());
  }

  #[test]
  fn balance_is_absent_until_first_save() {
    let store = MemoryStore::default();
    assert_eq!(store.load_balance("ada"), None);
    store.save_balance("ada", 7);
    assert_eq!(store.load_balance("ada"), Some(7));
  }
}
