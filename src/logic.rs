//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Scoring code changes and crediting newly satisfied hint conditions
//!   - Hint purchases and per-step unlock state
//!   - Case reset and case close (final score, stats, achievement sweep)
//!
//! Every mutating path runs inside `AppState::with_ledger`, which serializes
//! writers per user and persists through the progress store.

use std::collections::HashSet;

use tracing::{error, info, instrument};

use crate::achievements::evaluate_achievements;
use crate::domain::{ObjectiveStatus, ValidationResult};
use crate::hints::evaluate_conditions;
use crate::ledger::{AutoUnlock, Purchase};
use crate::protocol::{AchievementOut, CaseCloseOut, HintStepOut, UnlockedHintOut};
use crate::score::finalize_score;
use crate::state::AppState;
use crate::validate::{unknown_case_result, validate_case};

/// Editor change event: validate the code, then sweep hint conditions and
/// credit any step that just became true. Unknown case ids degrade to a
/// zero-score result; this path must never fail.
#[instrument(level = "info", skip(state, html, css), fields(%user_id, %case_id, html_len = html.len(), css_len = css.len()))]
pub async fn on_code_changed(
  state: &AppState,
  user_id: &str,
  case_id: &str,
  html: &str,
  css: &str,
) -> (ValidationResult, Vec<UnlockedHintOut>, u32) {
  let Some(case) = state.case(case_id) else {
    let balance = state.with_ledger(user_id, |l| l.balance()).await;
    return (unknown_case_result(case_id), Vec::new(), balance);
  };

  state
    .with_ledger(user_id, |ledger| {
      let result = validate_case(case, html, css);
      let revealed = ledger.revealed_for(&case.id);
      let newly = evaluate_conditions(case, html, css, &revealed);

      let mut unlocked = Vec::new();
      for step_id in newly {
        match ledger.auto_unlock(case, &step_id) {
          Ok(AutoUnlock::Unlocked { step_id, hint_text, reward, .. }) => {
            unlocked.push(UnlockedHintOut { step_id, hint_text, reward });
          }
          Ok(AutoUnlock::AlreadyUnlocked { .. }) => {}
          Err(e) => {
            error!(target: "hints", %case_id, error = %e, "Auto-unlock failed for evaluated step")
          }
        }
      }

      if !unlocked.is_empty() {
        state.persist_case(user_id, &case.id, ledger);
        let mut stats = state.store.load_stats(user_id);
        stats.hints_earned += unlocked.len() as u32;
        state.store.save_stats(user_id, &stats);
        info!(target: "hints", %user_id, case_id = %case.id, count = unlocked.len(), balance = ledger.balance(), "Hints auto-unlocked on code change");
      }

      (result, unlocked, ledger.balance())
    })
    .await
}

/// Buy a hint. Economic failures come back as `Purchase` values; an unknown
/// case or step id is caller breakage and comes back as `Err`.
#[instrument(level = "info", skip(state), fields(%user_id, %case_id, %step_id))]
pub async fn purchase_hint(
  state: &AppState,
  user_id: &str,
  case_id: &str,
  step_id: &str,
) -> Result<(Purchase, u32), String> {
  let case = state.case(case_id).ok_or_else(|| format!("Unknown case: {case_id}"))?;
  state
    .with_ledger(user_id, |ledger| {
      let purchase = ledger.purchase_unlock(case, step_id)?;
      if matches!(purchase, Purchase::Purchased { .. }) {
        state.persist_case(user_id, &case.id, ledger);
        let mut stats = state.store.load_stats(user_id);
        stats.hints_purchased += 1;
        state.store.save_stats(user_id, &stats);
      }
      Ok((purchase, ledger.balance()))
    })
    .await
}

/// Per-step unlock state for the hint panel. Hint text is attached only for
/// steps the ledger already shows as unlocked.
#[instrument(level = "info", skip(state), fields(%user_id, %case_id))]
pub async fn hint_state(
  state: &AppState,
  user_id: &str,
  case_id: &str,
) -> Result<(u32, Vec<HintStepOut>), String> {
  let case = state.case(case_id).ok_or_else(|| format!("Unknown case: {case_id}"))?;
  Ok(
    state
      .with_ledger(user_id, |ledger| {
        let steps = case
          .hint_steps
          .iter()
          .map(|s| {
            let unlocked = ledger.is_unlocked(&s.id);
            HintStepOut {
              step_id: s.id.clone(),
              cost: s.cost,
              reward: s.reward,
              unlocked,
              method: ledger.method_of(&s.id),
              hint_text: if unlocked { Some(s.hint_text.clone()) } else { None },
            }
          })
          .collect();
        (ledger.balance(), steps)
      })
      .await,
  )
}

/// Retry a case: drop its unlock records so hints can re-unlock. The balance
/// is left alone.
#[instrument(level = "info", skip(state), fields(%user_id, %case_id))]
pub async fn reset_case(state: &AppState, user_id: &str, case_id: &str) -> Result<(), String> {
  let case = state.case(case_id).ok_or_else(|| format!("Unknown case: {case_id}"))?;
  state
    .with_ledger(user_id, |ledger| {
      ledger.reset_case(&case.id);
      state.persist_case(user_id, &case.id, ledger);
    })
    .await;
  info!(target: "hints", %user_id, case_id = %case.id, "Case ledger reset");
  Ok(())
}

/// Close a case: refuse with the list of missing objectives unless solved;
/// otherwise compute the final score, update stats, sweep achievements, and
/// purge the case's ledger entries.
#[instrument(level = "info", skip(state, html, css), fields(%user_id, %case_id))]
pub async fn close_case(
  state: &AppState,
  user_id: &str,
  case_id: &str,
  html: &str,
  css: &str,
) -> Result<CaseCloseOut, String> {
  let case = state.case(case_id).ok_or_else(|| format!("Unknown case: {case_id}"))?;
  let result = validate_case(case, html, css);
  if !result.solved {
    let missing = result
      .objectives
      .iter()
      .filter(|o| o.status != ObjectiveStatus::Complete)
      .map(|o| o.title.clone())
      .collect();
    return Ok(CaseCloseOut::Unsolved { case_id: case.id.clone(), missing });
  }

  let clues_found = result.objectives.len() as u32;
  let (final_score, hints_used) = state
    .with_ledger(user_id, |ledger| {
      let hints_used = ledger.purchased_count(&case.id);
      let final_score = finalize_score(&case.scoring, clues_found, hints_used);

      // Completion is recorded below; the case's ledger entries are purged.
      ledger.reset_case(&case.id);
      state.persist_case(user_id, &case.id, ledger);
      (final_score, hints_used)
    })
    .await;

  let mut stats = state.store.load_stats(user_id);
  stats.cases_completed += 1;
  if hints_used == 0 {
    stats.perfect_cases += 1;
  }
  stats.total_score = stats.total_score.saturating_add(final_score);
  state.store.save_stats(user_id, &stats);

  let held_list = state.store.load_achievements(user_id);
  let held: HashSet<String> = held_list.iter().cloned().collect();
  let new_achievements = evaluate_achievements(&state.achievements, &stats, &held);
  if !new_achievements.is_empty() {
    let mut all = held_list;
    all.extend(new_achievements.iter().cloned());
    state.store.save_achievements(user_id, &all);
  }

  info!(target: "validation", %user_id, case_id = %case.id, final_score, hints_used, "Case closed");
  Ok(CaseCloseOut::Closed {
    case_id: case.id.clone(),
    final_score,
    clues_found,
    hints_used,
    new_achievements,
  })
}

/// Achievement panel: every definition, flagged with whether the user holds
/// it.
#[instrument(level = "info", skip(state), fields(%user_id))]
pub async fn achievement_state(state: &AppState, user_id: &str) -> Vec<AchievementOut> {
  let held: HashSet<String> = state.store.load_achievements(user_id).into_iter().collect();
  state
    .achievements
    .iter()
    .map(|d| AchievementOut {
      id: d.id.clone(),
      title: d.title.clone(),
      description: d.description.clone(),
      earned: held.contains(&d.id),
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  const SOLVED_HTML: &str = "<div id=\"evidence\">the safe combination</div>";
  const SOLVED_CSS: &str = "#evidence { display: block; }";

  #[tokio::test]
  async fn code_change_credits_each_condition_once() {
    let state = AppState::new();
    let start = state.economy.starting_balance;

    let (result, unlocked, balance) =
      on_code_changed(&state, "ada", "case-2", SOLVED_HTML, SOLVED_CSS).await;
    assert!(result.solved);
    assert_eq!(unlocked.len(), 2);
    // hs-2-hidden rewards 2, hs-2-display rewards 3.
    assert_eq!(balance, start + 5);

    // The same code submitted again re-reports nothing and credits nothing.
    let (_, unlocked2, balance2) =
      on_code_changed(&state, "ada", "case-2", SOLVED_HTML, SOLVED_CSS).await;
    assert!(unlocked2.is_empty());
    assert_eq!(balance2, balance);
  }

  #[tokio::test]
  async fn unknown_case_never_fails_the_edit_loop() {
    let state = AppState::new();
    let (result, unlocked, balance) = on_code_changed(&state, "ada", "case-404", "", "").await;
    assert_eq!(result.score, 0);
    assert_eq!(result.feedback.len(), 1);
    assert!(unlocked.is_empty());
    assert_eq!(balance, state.economy.starting_balance);
  }

  #[tokio::test]
  async fn purchased_hint_text_shows_in_hint_state() {
    let state = AppState::new();
    let (purchase, balance) = purchase_hint(&state, "ada", "case-2", "hs-2-hidden")
      .await
      .expect("known case and step");
    assert!(matches!(purchase, Purchase::Purchased { .. }));
    assert_eq!(balance, state.economy.starting_balance - 3);

    let (_, steps) = hint_state(&state, "ada", "case-2").await.expect("known case");
    let bought = steps.iter().find(|s| s.step_id == "hs-2-hidden").expect("step listed");
    assert!(bought.unlocked);
    assert!(bought.hint_text.is_some());
    let other = steps.iter().find(|s| s.step_id == "hs-2-display").expect("step listed");
    assert!(other.hint_text.is_none());
  }

  #[tokio::test]
  async fn closing_a_solved_case_scores_and_purges() {
    let state = AppState::new();
    let _ = on_code_changed(&state, "ada", "case-2", SOLVED_HTML, SOLVED_CSS).await;

    let close = close_case(&state, "ada", "case-2", SOLVED_HTML, SOLVED_CSS)
      .await
      .expect("known case");
    match close {
      CaseCloseOut::Closed { final_score, clues_found, hints_used, new_achievements, .. } => {
        // base 1200 + 2 clues * 250, no purchases.
        assert_eq!(final_score, 1700);
        assert_eq!(clues_found, 2);
        assert_eq!(hints_used, 0);
        assert!(new_achievements.contains(&"first-case-closed".to_string()));
        assert!(new_achievements.contains(&"flawless-method".to_string()));
      }
      CaseCloseOut::Unsolved { .. } => panic!("case should be solved"),
    }

    // Ledger entries for the case are gone after completion.
    let (_, steps) = hint_state(&state, "ada", "case-2").await.expect("known case");
    assert!(steps.iter().all(|s| !s.unlocked));
  }

  #[tokio::test]
  async fn closing_an_unsolved_case_refuses_with_missing_titles() {
    let state = AppState::new();
    let close = close_case(&state, "ada", "case-2", "<div hidden>x</div>", "")
      .await
      .expect("known case");
    match close {
      CaseCloseOut::Unsolved { missing, .. } => assert!(!missing.is_empty()),
      CaseCloseOut::Closed { .. } => panic!("case should not close"),
    }
  }

  #[tokio::test]
  async fn reset_lets_conditions_re_unlock_and_re_credit() {
    let state = AppState::new();
    let (_, first, _) = on_code_changed(&state, "ada", "case-2", SOLVED_HTML, SOLVED_CSS).await;
    assert_eq!(first.len(), 2);

    reset_case(&state, "ada", "case-2").await.expect("known case");
    let (_, again, _) = on_code_changed(&state, "ada", "case-2", SOLVED_HTML, SOLVED_CSS).await;
    assert_eq!(again.len(), 2);
  }
}
