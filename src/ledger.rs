//! Hint economy: per-user unlock ledger and spendable balance.
//!
//! Each (user, step) pair is a tiny state machine: locked, then unlocked by
//! condition (credits the step's reward) or by purchase (debits its cost).
//! Unlocks are monotonic; only an explicit case reset (fired on retry and
//! after completion) clears them. The ledger holds an in-memory snapshot and
//! exposes load/save hooks; it never owns the storage medium.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{info, instrument};

use crate::domain::{CaseSpec, UnlockMethod, UnlockRecord};

/// Hard ceiling on the spendable balance.
pub const BALANCE_CAP: u32 = 99;

/// Outcome of an auto-unlock attempt. Re-reporting an already-true condition
/// is a normal event, not an error.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AutoUnlock {
  Unlocked { step_id: String, hint_text: String, reward: u32, balance: u32 },
  AlreadyUnlocked { step_id: String },
}

/// Outcome of a purchase attempt. Failures are values the UI reports; state
/// and balance stay untouched on any non-`Purchased` arm.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Purchase {
  Purchased { step_id: String, hint_text: String, cost: u32, balance: u32 },
  InsufficientFunds { step_id: String, cost: u32, balance: u32 },
  AlreadyUnlocked { step_id: String },
}

/// One user's unlock state across all cases, plus their point balance.
#[derive(Clone, Debug, Default)]
pub struct HintLedger {
  balance: u32,
  entries: HashMap<String, UnlockRecord>,
}

impl HintLedger {
  pub fn new(starting_balance: u32) -> Self {
    Self { balance: starting_balance.min(BALANCE_CAP), entries: HashMap::new() }
  }

  /// Rebuild from persisted snapshots. Records that were never unlocked are
  /// dropped; presence in the map means unlocked.
  pub fn from_snapshot(records: Vec<UnlockRecord>, balance: u32) -> Self {
    let entries = records
      .into_iter()
      .filter(|r| r.unlocked)
      .map(|r| (r.step_id.clone(), r))
      .collect();
    Self { balance: balance.min(BALANCE_CAP), entries }
  }

  /// Snapshot of one case's records for the persistence collaborator.
  pub fn snapshot(&self, case_id: &str) -> Vec<UnlockRecord> {
    let mut out: Vec<UnlockRecord> = self
      .entries
      .values()
      .filter(|r| r.case_id == case_id)
      .cloned()
      .collect();
    out.sort_by(|a, b| a.step_id.cmp(&b.step_id));
    out
  }

  pub fn balance(&self) -> u32 {
    self.balance
  }

  pub fn is_unlocked(&self, step_id: &str) -> bool {
    self.entries.contains_key(step_id)
  }

  /// How a step was unlocked, if it is.
  pub fn method_of(&self, step_id: &str) -> Option<UnlockMethod> {
    self.entries.get(step_id).map(|r| r.method)
  }

  /// Ids of revealed steps for a case; seeds the condition evaluator's skip
  /// set so rewards are credited at most once.
  pub fn revealed_for(&self, case_id: &str) -> HashSet<String> {
    self
      .entries
      .values()
      .filter(|r| r.case_id == case_id)
      .map(|r| r.step_id.clone())
      .collect()
  }

  /// Count of hints the user bought for this case; feeds the final-score
  /// penalty.
  pub fn purchased_count(&self, case_id: &str) -> u32 {
    self
      .entries
      .values()
      .filter(|r| r.case_id == case_id && r.method == UnlockMethod::Purchased)
      .count() as u32
  }

  /// Unlock a step whose condition came true, crediting its reward (capped).
  /// Idempotent: a step that is already unlocked credits nothing.
  ///
  /// A step id absent from the case definition is caller/config breakage and
  /// is the only failing path.
  #[instrument(level = "debug", skip(self, case), fields(case_id = %case.id, %step_id))]
  pub fn auto_unlock(&mut self, case: &CaseSpec, step_id: &str) -> Result<AutoUnlock, String> {
    let step = case
      .hint_step(step_id)
      .ok_or_else(|| format!("Unknown hint step '{}' in case '{}'", step_id, case.id))?;

    if self.entries.contains_key(step_id) {
      return Ok(AutoUnlock::AlreadyUnlocked { step_id: step_id.to_string() });
    }

    self.balance = (self.balance + step.reward).min(BALANCE_CAP);
    self.entries.insert(
      step_id.to_string(),
      UnlockRecord {
        case_id: case.id.clone(),
        step_id: step_id.to_string(),
        unlocked: true,
        method: UnlockMethod::Auto,
      },
    );
    info!(target: "hints", case_id = %case.id, %step_id, reward = step.reward, balance = self.balance, "Hint auto-unlocked");
    Ok(AutoUnlock::Unlocked {
      step_id: step_id.to_string(),
      hint_text: step.hint_text.clone(),
      reward: step.reward,
      balance: self.balance,
    })
  }

  /// Buy a hint outright. Check-then-debit happens atomically on this
  /// snapshot; the caller persists the updated ledger afterwards.
  #[instrument(level = "debug", skip(self, case), fields(case_id = %case.id, %step_id))]
  pub fn purchase_unlock(&mut self, case: &CaseSpec, step_id: &str) -> Result<Purchase, String> {
    let step = case
      .hint_step(step_id)
      .ok_or_else(|| format!("Unknown hint step '{}' in case '{}'", step_id, case.id))?;

    if self.entries.contains_key(step_id) {
      return Ok(Purchase::AlreadyUnlocked { step_id: step_id.to_string() });
    }
    if self.balance < step.cost {
      info!(target: "hints", case_id = %case.id, %step_id, cost = step.cost, balance = self.balance, "Hint purchase rejected: insufficient funds");
      return Ok(Purchase::InsufficientFunds {
        step_id: step_id.to_string(),
        cost: step.cost,
        balance: self.balance,
      });
    }

    self.balance -= step.cost;
    self.entries.insert(
      step_id.to_string(),
      UnlockRecord {
        case_id: case.id.clone(),
        step_id: step_id.to_string(),
        unlocked: true,
        method: UnlockMethod::Purchased,
      },
    );
    info!(target: "hints", case_id = %case.id, %step_id, cost = step.cost, balance = self.balance, "Hint purchased");
    Ok(Purchase::Purchased {
      step_id: step_id.to_string(),
      hint_text: step.hint_text.clone(),
      cost: step.cost,
      balance: self.balance,
    })
  }

  /// Drop every entry scoped to the case. Fired on retry and after the final
  /// score is recorded. The balance is left alone.
  #[instrument(level = "debug", skip(self))]
  pub fn reset_case(&mut self, case_id: &str) {
    self.entries.retain(|_, r| r.case_id != case_id);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cases::builtin_cases;

  fn case_two() -> CaseSpec {
    builtin_cases().into_iter().find(|c| c.id == "case-2").expect("case-2 in builtin bank")
  }

  #[test]
  fn purchase_with_insufficient_funds_mutates_nothing() {
    let case = case_two();
    let mut ledger = HintLedger::new(2);
    // hs-2-hidden costs 3.
    let out = ledger.purchase_unlock(&case, "hs-2-hidden").expect("known step");
    assert!(matches!(out, Purchase::InsufficientFunds { cost: 3, balance: 2, .. }));
    assert_eq!(ledger.balance(), 2);
    assert!(!ledger.is_unlocked("hs-2-hidden"));
  }

  #[test]
  fn purchase_debits_once_then_rejects_repeat() {
    let case = case_two();
    let mut ledger = HintLedger::new(5);
    let first = ledger.purchase_unlock(&case, "hs-2-hidden").expect("known step");
    assert!(matches!(first, Purchase::Purchased { cost: 3, balance: 2, .. }));
    assert_eq!(ledger.balance(), 2);
    assert!(ledger.is_unlocked("hs-2-hidden"));

    let second = ledger.purchase_unlock(&case, "hs-2-hidden").expect("known step");
    assert!(matches!(second, Purchase::AlreadyUnlocked { .. }));
    assert_eq!(ledger.balance(), 2);
  }

  #[test]
  fn auto_unlock_credits_exactly_once() {
    let case = case_two();
    let mut ledger = HintLedger::new(0);
    let reward = case.hint_step("hs-2-hidden").expect("step").reward;

    let first = ledger.auto_unlock(&case, "hs-2-hidden").expect("known step");
    assert!(matches!(first, AutoUnlock::Unlocked { .. }));
    assert_eq!(ledger.balance(), reward);

    let second = ledger.auto_unlock(&case, "hs-2-hidden").expect("known step");
    assert!(matches!(second, AutoUnlock::AlreadyUnlocked { .. }));
    assert_eq!(ledger.balance(), reward);
  }

  #[test]
  fn balance_never_goes_negative_under_any_purchase_sequence() {
    let case = case_two();
    let mut ledger = HintLedger::new(4);
    for step in &case.hint_steps {
      let _ = ledger.purchase_unlock(&case, &step.id).expect("known step");
      // u32 makes underflow a panic, so reaching here at all proves the
      // check-then-debit ordering.
    }
  }

  #[test]
  fn unlocks_are_monotonic_until_reset() {
    let case = case_two();
    let mut ledger = HintLedger::new(9);
    ledger.purchase_unlock(&case, "hs-2-hidden").expect("known step");
    for _ in 0..3 {
      assert!(ledger.is_unlocked("hs-2-hidden"));
    }
    ledger.reset_case(&case.id);
    assert!(!ledger.is_unlocked("hs-2-hidden"));
  }

  #[test]
  fn reset_scopes_to_one_case() {
    let bank = builtin_cases();
    let c2 = bank.iter().find(|c| c.id == "case-2").expect("case-2");
    let c3 = bank.iter().find(|c| c.id == "case-3").expect("case-3");
    let mut ledger = HintLedger::new(50);
    ledger.purchase_unlock(c2, "hs-2-hidden").expect("known step");
    ledger.purchase_unlock(c3, "hs-3-grid").expect("known step");

    ledger.reset_case("case-2");
    assert!(!ledger.is_unlocked("hs-2-hidden"));
    assert!(ledger.is_unlocked("hs-3-grid"));
  }

  #[test]
  fn unknown_step_is_an_error() {
    let case = case_two();
    let mut ledger = HintLedger::new(5);
    assert!(ledger.auto_unlock(&case, "no-such-step").is_err());
    assert!(ledger.purchase_unlock(&case, "no-such-step").is_err());
    assert_eq!(ledger.balance(), 5);
  }

  #[test]
  fn rewards_clamp_at_the_cap() {
    let case = case_two();
    let mut ledger = HintLedger::new(BALANCE_CAP);
    ledger.auto_unlock(&case, "hs-2-hidden").expect("known step");
    assert_eq!(ledger.balance(), BALANCE_CAP);
  }

  #[test]
  fn snapshot_round_trips_through_load() {
    let case = case_two();
    let mut ledger = HintLedger::new(8);
    ledger.purchase_unlock(&case, "hs-2-hidden").expect("known step");
    ledger.auto_unlock(&case, "hs-2-display").expect("known step");

    let records = ledger.snapshot(&case.id);
    let restored = HintLedger::from_snapshot(records, ledger.balance());
    assert!(restored.is_unlocked("hs-2-hidden"));
    assert!(restored.is_unlocked("hs-2-display"));
    assert_eq!(restored.balance(), ledger.balance());
    assert_eq!(restored.purchased_count(&case.id), 1);
  }
}
