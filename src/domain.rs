//! Domain models used by the backend: cases, objectives, hint steps, unlock
//! records, and the per-user stat counters achievements read.

use serde::{Deserialize, Serialize};

use crate::predicates::Check;

/// Where did we get the case from?
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CaseSource {
  LocalBank, // from user-provided TOML bank
  Builtin,   // shipped with the binary
}

/// Tri-state outcome of scoring a single objective.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveStatus {
  Complete,
  Partial,
  Absent,
}

/// A scored requirement, instantiated fresh on every validation pass.
/// Never mutated in place; each run builds a new set.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Objective {
  pub id: String,
  pub title: String,
  pub description: String,
  pub points: u32,
  pub status: ObjectiveStatus,
  /// Points this objective contributed to the run's score.
  pub earned: u32,
}

/// Template an `Objective` is built from. Belongs to exactly one case.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ObjectiveSpec {
  pub id: String,
  pub title: String,
  #[serde(default)] pub description: String,
  pub points: u32,
  /// Check awarding full points.
  pub complete: Check,
  /// Looser check awarding floor(points/2). Each case enumerates its own
  /// pairs; nothing is inferred from the complete check.
  #[serde(default)] pub partial: Option<Check>,
  pub done_note: String,
  #[serde(default)] pub partial_note: String,
  pub missing_note: String,
}

/// Result of one validation run over a case.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ValidationResult {
  #[serde(rename = "caseId")]
  pub case_id: String,
  pub score: u32,
  #[serde(rename = "maxScore")]
  pub max_score: u32,
  pub solved: bool,
  pub feedback: Vec<String>,
  pub objectives: Vec<Objective>,
}

/// A gated piece of guidance. Steps are ordered within a case, but each
/// condition is independently satisfiable, so they may unlock out of order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HintStep {
  pub id: String,
  /// Human-readable condition key resolved by the predicate library.
  pub condition: String,
  pub hint_text: String,
  /// Points credited when the condition auto-unlocks this hint.
  pub reward: u32,
  /// Points debited when the learner buys the hint instead.
  pub cost: u32,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UnlockMethod {
  Auto,
  Purchased,
}

/// Per (user, step) unlock memory. Once `unlocked`, the record stays until an
/// explicit case reset (or the post-completion purge).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnlockRecord {
  pub case_id: String,
  pub step_id: String,
  pub unlocked: bool,
  pub method: UnlockMethod,
}

/// How the final case score is assembled on completion.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScoringSpec {
  pub base_points: u32,
  pub per_clue_points: u32,
  #[serde(default)] pub hint_penalty: u32,
  pub max_cap: u32,
}

/// One detective case: brief, ordered objectives, gated hint steps, and the
/// completion scoring parameters. Read-only to the engine.
#[derive(Clone, Debug, Serialize)]
pub struct CaseSpec {
  pub id: String,
  pub title: String,
  pub brief: String,
  pub source: CaseSource,
  pub objectives: Vec<ObjectiveSpec>,
  pub hint_steps: Vec<HintStep>,
  pub scoring: ScoringSpec,
}

impl CaseSpec {
  /// Sum of all objective points; the ceiling of any validation score.
  pub fn max_score(&self) -> u32 {
    self.objectives.iter().map(|o| o.points).sum()
  }

  pub fn hint_step(&self, step_id: &str) -> Option<&HintStep> {
    self.hint_steps.iter().find(|s| s.id == step_id)
  }
}

/// Counters the achievement checks read. Updated as the learner plays,
/// persisted per user by the progress store.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserStats {
  pub cases_completed: u32,
  pub perfect_cases: u32,
  pub hints_purchased: u32,
  pub hints_earned: u32,
  pub total_score: u32,
}
