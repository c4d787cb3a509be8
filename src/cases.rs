//! Built-in content: the seed case bank and achievement definitions.
//!
//! These guarantee the app is playable without any external config. A TOML
//! bank (see `config`) can add cases on top; bank ids win over builtin ids.

use crate::achievements::{AchievementDef, StatCheck};
use crate::domain::{CaseSource, CaseSpec, HintStep, ObjectiveSpec, ScoringSpec};
use crate::predicates::Check;

/// The three shipped cases. Ordering here is the order players see.
pub fn builtin_cases() -> Vec<CaseSpec> {
  vec![
    CaseSpec {
      id: "case-1".into(),
      title: "The Vanished Navigation".into(),
      brief: "The precinct site lost its menu bar. Witnesses say it was last seen wrapped in a plain div. Restore proper signage and line the links up.".into(),
      source: CaseSource::Builtin,
      objectives: vec![
        ObjectiveSpec {
          id: "nav-tag".into(),
          title: "Post proper signage".into(),
          description: "Wrap the menu in a semantic <nav> element.".into(),
          points: 10,
          complete: Check::HtmlTag { tag: "nav".into() },
          partial: Some(Check::HtmlContains { token: "navigation".into() }),
          done_note: "The menu is back under official <nav> signage.".into(),
          partial_note: "There's a 'navigation' label at the scene, but no real <nav> element yet.".into(),
          missing_note: "No <nav> element found. The menu needs semantic signage.".into(),
        },
        ObjectiveSpec {
          id: "flexbox-layout".into(),
          title: "Line up the links".into(),
          description: "Lay the menu out with display: flex.".into(),
          points: 10,
          complete: Check::CssProperty { property: "display".into(), value: "flex".into() },
          partial: Some(Check::CssDeclares { property: "display".into() }),
          done_note: "Links fall in line: the menu is a flex row.".into(),
          partial_note: "A display rule exists, but it isn't flex yet.".into(),
          missing_note: "No layout rule in sight. Give the menu display: flex.".into(),
        },
      ],
      hint_steps: vec![
        HintStep {
          id: "hs-1-nav".into(),
          condition: "Add nav element".into(),
          hint_text: "Divs make poor signposts. HTML has a <nav> element for exactly this job.".into(),
          reward: 2,
          cost: 3,
        },
        HintStep {
          id: "hs-1-flex".into(),
          condition: "Use flexbox layout".into(),
          hint_text: "One rule straightens the whole lineup: display: flex on the menu container.".into(),
          reward: 2,
          cost: 4,
        },
      ],
      scoring: ScoringSpec { base_points: 1500, per_clue_points: 200, hint_penalty: 0, max_cap: 2000 },
    },
    CaseSpec {
      id: "case-2".into(),
      title: "The Hidden Evidence".into(),
      brief: "Someone buried the evidence panel twice over: once with a hidden attribute, once with display: none. Dig it out without leaving either in place.".into(),
      source: CaseSource::Builtin,
      objectives: vec![
        ObjectiveSpec {
          id: "remove-hidden-attr".into(),
          title: "Unseal the panel".into(),
          description: "Remove the hidden attribute from the evidence container.".into(),
          points: 8,
          complete: Check::HtmlLacks { token: "hidden".into() },
          partial: None,
          done_note: "The hidden attribute is gone; the panel is no longer sealed.".into(),
          partial_note: String::new(),
          missing_note: "The markup still carries a hidden attribute somewhere.".into(),
        },
        ObjectiveSpec {
          id: "display-block".into(),
          title: "Bring it into the light".into(),
          description: "Change the panel's display from none to block.".into(),
          points: 12,
          complete: Check::CssSwapped {
            property: "display".into(),
            old: "none".into(),
            new: "block".into(),
          },
          // Block declared but none still lingering: a half-finished edit.
          partial: Some(Check::CssProperty { property: "display".into(), value: "block".into() }),
          done_note: "display: block, and the old none is gone. The evidence is in plain view.".into(),
          partial_note: "display: block is there, but display: none still lingers in the stylesheet.".into(),
          missing_note: "The panel is still styled out of existence. Swap display: none for block.".into(),
        },
      ],
      hint_steps: vec![
        HintStep {
          id: "hs-2-hidden".into(),
          condition: "Remove hidden attribute".into(),
          hint_text: "Check the evidence div's attributes. One word is doing all the hiding.".into(),
          reward: 2,
          cost: 3,
        },
        HintStep {
          id: "hs-2-display".into(),
          condition: "Change display none to block".into(),
          hint_text: "The stylesheet says display: none. Make it block, and make sure none doesn't survive the edit.".into(),
          reward: 3,
          cost: 5,
        },
      ],
      scoring: ScoringSpec { base_points: 1200, per_clue_points: 250, hint_penalty: 50, max_cap: 1800 },
    },
    CaseSpec {
      id: "case-3".into(),
      title: "The Antique Markup".into(),
      brief: "A gallery page from another century: <center> tags, <font> tags, images with no descriptions. Modernize it and hang the photos on a grid.".into(),
      source: CaseSource::Builtin,
      objectives: vec![
        ObjectiveSpec {
          id: "retire-center".into(),
          title: "Retire the <center> tag".into(),
          description: "Remove every <center> element from the page.".into(),
          points: 6,
          complete: Check::HtmlLacks { token: "<center".into() },
          partial: None,
          done_note: "No <center> tags remain.".into(),
          partial_note: String::new(),
          missing_note: "A <center> tag is still on the premises. It retired in 1999.".into(),
        },
        ObjectiveSpec {
          id: "retire-font".into(),
          title: "Retire the <font> tag".into(),
          description: "Remove every <font> element; styling belongs in CSS.".into(),
          points: 6,
          complete: Check::HtmlLacks { token: "<font".into() },
          partial: None,
          done_note: "No <font> tags remain.".into(),
          partial_note: String::new(),
          missing_note: "A <font> tag is still styling text inline. Move that to CSS.".into(),
        },
        ObjectiveSpec {
          id: "grid-gallery".into(),
          title: "Hang the photos on a grid".into(),
          description: "Lay the gallery out with display: grid.".into(),
          points: 12,
          complete: Check::CssProperty { property: "display".into(), value: "grid".into() },
          // Flex is a layout, just not the assigned one.
          partial: Some(Check::CssProperty { property: "display".into(), value: "flex".into() }),
          done_note: "The gallery hangs on a proper grid.".into(),
          partial_note: "Flex gets the photos off the floor, but this wall calls for display: grid.".into(),
          missing_note: "The photos are still in a pile. Give the gallery display: grid.".into(),
        },
        ObjectiveSpec {
          id: "alt-text".into(),
          title: "Label the exhibits".into(),
          description: "Give every image an alt attribute.".into(),
          points: 6,
          complete: Check::HtmlContains { token: "alt=".into() },
          partial: None,
          done_note: "The exhibits carry alt descriptions.".into(),
          partial_note: String::new(),
          missing_note: "The images have no alt text. Screen readers see nothing at all.".into(),
        },
      ],
      hint_steps: vec![
        HintStep {
          id: "hs-3-center".into(),
          condition: "Remove center tag".into(),
          hint_text: "Centering is a CSS job now. Delete the <center> wrappers entirely.".into(),
          reward: 1,
          cost: 2,
        },
        HintStep {
          id: "hs-3-grid".into(),
          condition: "Use grid layout".into(),
          hint_text: "display: grid on the gallery container, then grid-template-columns to taste.".into(),
          reward: 3,
          cost: 5,
        },
        HintStep {
          id: "hs-3-alt".into(),
          condition: "Add alt text to images".into(),
          hint_text: "Every <img> wants an alt=\"...\" describing what's in the frame.".into(),
          reward: 2,
          cost: 3,
        },
        // Condition key staged ahead of its predicate; stays purchasable.
        HintStep {
          id: "hs-3-files".into(),
          condition: "Organize case files".into(),
          hint_text: "Group related exhibits in <figure> elements with <figcaption> labels.".into(),
          reward: 2,
          cost: 4,
        },
      ],
      scoring: ScoringSpec { base_points: 1000, per_clue_points: 150, hint_penalty: 25, max_cap: 1600 },
    },
  ]
}

/// Built-in achievement definitions, evaluated against `UserStats`.
pub fn builtin_achievements() -> Vec<AchievementDef> {
  vec![
    AchievementDef {
      id: "first-case-closed".into(),
      title: "First Case Closed".into(),
      description: "Close your first case.".into(),
      check: StatCheck::CasesCompletedAtLeast { count: 1 },
    },
    AchievementDef {
      id: "seasoned-investigator".into(),
      title: "Seasoned Investigator".into(),
      description: "Close three cases.".into(),
      check: StatCheck::CasesCompletedAtLeast { count: 3 },
    },
    AchievementDef {
      id: "flawless-method".into(),
      title: "Flawless Method".into(),
      description: "Close a case with every objective complete and no purchased hints.".into(),
      check: StatCheck::PerfectCasesAtLeast { count: 1 },
    },
    AchievementDef {
      id: "earned-the-hard-way".into(),
      title: "Earned the Hard Way".into(),
      description: "Unlock five hints by solving their conditions yourself.".into(),
      check: StatCheck::HintsEarnedAtLeast { count: 5 },
    },
    AchievementDef {
      id: "star-detective".into(),
      title: "Star Detective".into(),
      description: "Accumulate 5000 total points across closed cases.".into(),
      check: StatCheck::TotalScoreAtLeast { points: 5000 },
    },
  ]
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;

  #[test]
  fn builtin_bank_is_well_formed() {
    let bank = builtin_cases();
    assert!(!bank.is_empty());

    let mut case_ids = HashSet::new();
    let mut step_ids = HashSet::new();
    for case in &bank {
      assert!(case_ids.insert(case.id.clone()), "duplicate case id {}", case.id);
      assert!(!case.objectives.is_empty(), "case {} has no objectives", case.id);
      assert!(case.max_score() > 0);
      assert!(case.scoring.max_cap >= case.scoring.base_points);
      for o in &case.objectives {
        assert!(o.points > 0, "objective {} has zero points", o.id);
      }
      for s in &case.hint_steps {
        assert!(step_ids.insert(s.id.clone()), "duplicate step id {}", s.id);
        assert!(!s.hint_text.is_empty());
        assert!(s.reward > 0);
      }
    }
  }

  #[test]
  fn achievement_ids_are_unique() {
    let defs = builtin_achievements();
    let ids: HashSet<&str> = defs.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids.len(), defs.len());
  }
}
