//! Final case scoring.

use crate::domain::ScoringSpec;

/// Combine base points, clue bonuses, and the hint penalty into the final
/// case score: `base + per_clue * clues_found - hint_penalty * hints_used`,
/// clamped to `[0, max_cap]`. Pure function of its inputs.
pub fn finalize_score(scoring: &ScoringSpec, clues_found: u32, hints_used: u32) -> u32 {
  let earned = i64::from(scoring.base_points)
    + i64::from(scoring.per_clue_points) * i64::from(clues_found)
    - i64::from(scoring.hint_penalty) * i64::from(hints_used);
  earned.clamp(0, i64::from(scoring.max_cap)) as u32
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn bonus_overflow_clamps_to_the_cap() {
    let scoring = ScoringSpec { base_points: 1500, per_clue_points: 200, hint_penalty: 0, max_cap: 2000 };
    // 1500 + 600 = 2100, capped.
    assert_eq!(finalize_score(&scoring, 3, 2), 2000);
  }

  #[test]
  fn hint_penalty_is_subtracted() {
    let scoring = ScoringSpec { base_points: 1200, per_clue_points: 250, hint_penalty: 50, max_cap: 1800 };
    assert_eq!(finalize_score(&scoring, 2, 3), 1200 + 500 - 150);
  }

  #[test]
  fn heavy_penalties_clamp_at_zero() {
    let scoring = ScoringSpec { base_points: 100, per_clue_points: 0, hint_penalty: 80, max_cap: 1000 };
    assert_eq!(finalize_score(&scoring, 0, 5), 0);
  }

  #[test]
  fn same_inputs_same_score() {
    let scoring = ScoringSpec { base_points: 1000, per_clue_points: 150, hint_penalty: 25, max_cap: 1600 };
    assert_eq!(finalize_score(&scoring, 4, 1), finalize_score(&scoring, 4, 1));
  }
}
