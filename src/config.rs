//! Loading the case bank and economy settings from TOML.
//!
//! See `BankConfig` and `CaseCfg` for the expected schema. Checks inside
//! objectives are the serde-tagged `predicates::Check` enum, so bank authors
//! write e.g. `complete = { kind = "html_tag", tag = "nav" }`.

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::{HintStep, ObjectiveSpec, ScoringSpec};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct BankConfig {
  #[serde(default)]
  pub economy: EconomyCfg,
  #[serde(default)]
  pub cases: Vec<CaseCfg>,
}

/// Economy knobs. The balance cap itself is a ledger constant.
#[derive(Clone, Debug, Deserialize)]
pub struct EconomyCfg {
  #[serde(default = "default_starting_balance")]
  pub starting_balance: u32,
}

impl Default for EconomyCfg {
  fn default() -> Self {
    Self { starting_balance: default_starting_balance() }
  }
}

fn default_starting_balance() -> u32 {
  5
}

/// Case entry accepted in TOML configuration. An omitted id gets a fresh
/// UUID at merge time; entries without objectives are skipped with a log.
#[derive(Clone, Debug, Deserialize)]
pub struct CaseCfg {
  #[serde(default)] pub id: Option<String>,
  pub title: String,
  #[serde(default)] pub brief: String,
  #[serde(default)] pub objectives: Vec<ObjectiveSpec>,
  #[serde(default)] pub hint_steps: Vec<HintStep>,
  pub scoring: ScoringSpec,
}

/// Attempt to load `BankConfig` from CASE_BANK_PATH. On any parsing/IO error,
/// returns None.
pub fn load_bank_config_from_env() -> Option<BankConfig> {
  let path = std::env::var("CASE_BANK_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<BankConfig>(&s) {
      Ok(cfg) => {
        info!(target: "codesleuth_backend", %path, cases = cfg.cases.len(), "Loaded case bank (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "codesleuth_backend", %path, error = %e, "Failed to parse TOML case bank");
        None
      }
    },
    Err(e) => {
      error!(target: "codesleuth_backend", %path, error = %e, "Failed to read TOML case bank file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::predicates::Check;

  #[test]
  fn bank_entries_parse_with_tagged_checks() {
    let toml_src = r#"
      [economy]
      starting_balance = 8

      [[cases]]
      title = "The Borrowed Banner"
      brief = "A header went missing."
      [cases.scoring]
      base_points = 800
      per_clue_points = 100
      max_cap = 1200

      [[cases.objectives]]
      id = "semantic-header"
      title = "Raise the banner"
      points = 10
      done_note = "done"
      missing_note = "missing"
      [cases.objectives.complete]
      kind = "html_tag"
      tag = "header"

      [[cases.hint_steps]]
      id = "hs-b-1"
      condition = "Add semantic header"
      hint_text = "Try the <header> element."
      reward = 2
      cost = 3
    "#;
    let cfg: BankConfig = toml::from_str(toml_src).expect("bank parses");
    assert_eq!(cfg.economy.starting_balance, 8);
    assert_eq!(cfg.cases.len(), 1);
    let case = &cfg.cases[0];
    assert!(case.id.is_none());
    assert!(matches!(case.objectives[0].complete, Check::HtmlTag { .. }));
    assert_eq!(case.scoring.hint_penalty, 0);
  }

  #[test]
  fn economy_defaults_apply_when_section_missing() {
    let cfg: BankConfig = toml::from_str("").expect("empty bank parses");
    assert_eq!(cfg.economy.starting_balance, 5);
    assert!(cfg.cases.is_empty());
  }
}
