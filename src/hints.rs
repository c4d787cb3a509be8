//! Reactive hint-condition evaluation.
//!
//! Runs on every code-change event. The sweep itself is stateless: callers
//! diff the output against what the ledger already shows as revealed, which
//! is what prevents duplicate reward crediting.

use std::collections::HashSet;

use tracing::instrument;

use crate::domain::CaseSpec;
use crate::predicates::condition_met;

/// Ids of hint steps whose condition is satisfied by the current code and
/// that are not already revealed, in case declaration order.
#[instrument(level = "debug", skip_all, fields(case_id = %case.id, revealed = already_revealed.len()))]
pub fn evaluate_conditions(
  case: &CaseSpec,
  html: &str,
  css: &str,
  already_revealed: &HashSet<String>,
) -> Vec<String> {
  case
    .hint_steps
    .iter()
    .filter(|s| !already_revealed.contains(&s.id))
    .filter(|s| condition_met(&s.condition, html, css))
    .map(|s| s.id.clone())
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cases::builtin_cases;

  fn case_two() -> CaseSpec {
    builtin_cases().into_iter().find(|c| c.id == "case-2").expect("case-2 in builtin bank")
  }

  #[test]
  fn hidden_attribute_step_fires_exactly_once_removed() {
    let case = case_two();
    let none = HashSet::new();

    let still_hidden = evaluate_conditions(&case, "<div hidden>the safe</div>", "", &none);
    assert!(!still_hidden.contains(&"hs-2-hidden".to_string()));

    let revealed = evaluate_conditions(&case, "<div>the safe</div>", "", &none);
    assert_eq!(revealed.iter().filter(|id| *id == "hs-2-hidden").count(), 1);
  }

  #[test]
  fn already_revealed_steps_are_skipped() {
    let case = case_two();
    let mut seen = HashSet::new();
    seen.insert("hs-2-hidden".to_string());
    let out = evaluate_conditions(&case, "<div>the safe</div>", "", &seen);
    assert!(!out.contains(&"hs-2-hidden".to_string()));
  }

  #[test]
  fn output_follows_step_declaration_order() {
    let case = case_two();
    // Both conditions satisfied at once: hidden attribute gone, display swapped.
    let out = evaluate_conditions(&case, "<div>the safe</div>", "#evidence { display: block; }", &HashSet::new());
    let ids: Vec<&str> = case.hint_steps.iter().map(|s| s.id.as_str()).collect();
    let positions: Vec<usize> = out
      .iter()
      .map(|id| ids.iter().position(|x| x == id).expect("known step"))
      .collect();
    let mut sorted = positions.clone();
    sorted.sort_unstable();
    assert_eq!(positions, sorted);
    assert!(out.len() >= 2);
  }

  #[test]
  fn placeholder_conditions_never_fire() {
    let case = builtin_cases().into_iter().find(|c| c.id == "case-3").expect("case-3");
    let out = evaluate_conditions(&case, "<main>tidy</main>", "main { display: grid; }", &HashSet::new());
    assert!(!out.contains(&"hs-3-files".to_string()));
  }
}
