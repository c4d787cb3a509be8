//! Declarative achievement checks over user stats.
//!
//! Same reactive shape as the hint-condition sweep: a fixed list of
//! `(id, check)` pairs is evaluated after each stats change, and the caller
//! diffs the output against what the user already holds.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::domain::UserStats;

/// One stat threshold an achievement can gate on.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatCheck {
  CasesCompletedAtLeast { count: u32 },
  PerfectCasesAtLeast { count: u32 },
  HintsPurchasedAtLeast { count: u32 },
  HintsEarnedAtLeast { count: u32 },
  TotalScoreAtLeast { points: u32 },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AchievementDef {
  pub id: String,
  pub title: String,
  pub description: String,
  pub check: StatCheck,
}

pub fn stat_check_met(check: &StatCheck, stats: &UserStats) -> bool {
  match check {
    StatCheck::CasesCompletedAtLeast { count } => stats.cases_completed >= *count,
    StatCheck::PerfectCasesAtLeast { count } => stats.perfect_cases >= *count,
    StatCheck::HintsPurchasedAtLeast { count } => stats.hints_purchased >= *count,
    StatCheck::HintsEarnedAtLeast { count } => stats.hints_earned >= *count,
    StatCheck::TotalScoreAtLeast { points } => stats.total_score >= *points,
  }
}

/// Newly earned achievement ids, in definition order.
#[instrument(level = "debug", skip_all, fields(held = already_held.len()))]
pub fn evaluate_achievements(
  defs: &[AchievementDef],
  stats: &UserStats,
  already_held: &HashSet<String>,
) -> Vec<String> {
  defs
    .iter()
    .filter(|d| !already_held.contains(&d.id))
    .filter(|d| stat_check_met(&d.check, stats))
    .map(|d| d.id.clone())
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cases::builtin_achievements;

  #[test]
  fn first_closed_case_earns_the_opener() {
    let defs = builtin_achievements();
    let stats = UserStats { cases_completed: 1, total_score: 1700, ..Default::default() };
    let earned = evaluate_achievements(&defs, &stats, &HashSet::new());
    assert!(earned.contains(&"first-case-closed".to_string()));
  }

  #[test]
  fn held_achievements_are_not_re_reported() {
    let defs = builtin_achievements();
    let stats = UserStats { cases_completed: 1, ..Default::default() };
    let mut held = HashSet::new();
    held.insert("first-case-closed".to_string());
    let earned = evaluate_achievements(&defs, &stats, &held);
    assert!(!earned.contains(&"first-case-closed".to_string()));
  }

  #[test]
  fn thresholds_gate_until_reached() {
    let defs = builtin_achievements();
    let stats = UserStats::default();
    assert!(evaluate_achievements(&defs, &stats, &HashSet::new()).is_empty());
  }
}
