//! Case validation: run every objective check over the submitted code and
//! assemble a scored, ordered result.
//!
//! The sweep is pure and deterministic: the same `(case, html, css)` always
//! yields the same scores, statuses, and feedback ordering. The editor calls
//! this on every keystroke, so nothing in here may panic or block.

use tracing::instrument;

use crate::domain::{CaseSpec, Objective, ObjectiveStatus, ValidationResult};
use crate::predicates::check_met;

/// Score the submitted code against one case.
///
/// Objectives are evaluated in declaration order. A satisfied complete check
/// earns full points; otherwise a satisfied partial check earns exactly
/// floor(points/2); otherwise nothing. One feedback line is pushed per
/// objective, matching its outcome.
#[instrument(level = "debug", skip_all, fields(case_id = %case.id, html_len = html.len(), css_len = css.len()))]
pub fn validate_case(case: &CaseSpec, html: &str, css: &str) -> ValidationResult {
  let mut score = 0u32;
  let mut feedback = Vec::with_capacity(case.objectives.len());
  let mut objectives = Vec::with_capacity(case.objectives.len());

  for spec in &case.objectives {
    let (status, earned) = if check_met(&spec.complete, html, css) {
      (ObjectiveStatus::Complete, spec.points)
    } else if spec.partial.as_ref().is_some_and(|c| check_met(c, html, css)) {
      (ObjectiveStatus::Partial, spec.points / 2)
    } else {
      (ObjectiveStatus::Absent, 0)
    };

    feedback.push(match status {
      ObjectiveStatus::Complete => spec.done_note.clone(),
      ObjectiveStatus::Partial => spec.partial_note.clone(),
      ObjectiveStatus::Absent => spec.missing_note.clone(),
    });

    score += earned;
    objectives.push(Objective {
      id: spec.id.clone(),
      title: spec.title.clone(),
      description: spec.description.clone(),
      points: spec.points,
      status,
      earned,
    });
  }

  let solved = !objectives.is_empty() && objectives.iter().all(|o| o.status == ObjectiveStatus::Complete);
  ValidationResult {
    case_id: case.id.to_string(),
    score,
    max_score: case.max_score(),
    solved,
    feedback,
    objectives,
  }
}

/// Degradation for an unknown case id: zero score, a single feedback line,
/// no objectives. The per-keystroke caller must never see an error path.
pub fn unknown_case_result(case_id: &str) -> ValidationResult {
  ValidationResult {
    case_id: case_id.to_string(),
    score: 0,
    max_score: 0,
    solved: false,
    feedback: vec![format!("Unknown case: {case_id}")],
    objectives: Vec::new(),
  }
}
