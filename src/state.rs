//! Application state: the immutable case bank, achievement definitions, and
//! per-user ledgers in front of the progress store.
//!
//! This module owns:
//!   - the case stores (by id, plus presentation order)
//!   - the economy settings (from TOML or defaults)
//!   - per-user hint ledgers, loaded lazily from the progress store
//!
//! Cases are merged at startup: TOML bank entries first, then built-in seeds
//! without overwriting existing ids.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, instrument};

use crate::achievements::AchievementDef;
use crate::cases::{builtin_achievements, builtin_cases};
use crate::config::{load_bank_config_from_env, EconomyCfg};
use crate::domain::{CaseSource, CaseSpec};
use crate::ledger::HintLedger;
use crate::store::{MemoryStore, ProgressStore};
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    cases: HashMap<String, CaseSpec>,
    case_order: Vec<String>,
    pub achievements: Vec<AchievementDef>,
    pub economy: EconomyCfg,
    ledgers: Arc<RwLock<HashMap<String, HintLedger>>>,
    pub store: Arc<dyn ProgressStore>,
}

impl AppState {
    /// Build state from env with the in-memory store.
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::default()))
    }

    /// Build state from env: load the TOML bank, merge built-in cases,
    /// wire the given progress store.
    #[instrument(level = "info", skip_all)]
    pub fn with_store(store: Arc<dyn ProgressStore>) -> Self {
        let cfg_opt = load_bank_config_from_env();
        let economy = cfg_opt
            .as_ref()
            .map(|c| c.economy.clone())
            .unwrap_or_default();

        let mut by_id = HashMap::<String, CaseSpec>::new();
        let mut order = Vec::<String>::new();

        // Insert config-based cases (if any) first; bank ids win.
        if let Some(cfg) = &cfg_opt {
            for cc in &cfg.cases {
                let id = cc.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
                if cc.objectives.is_empty() {
                    error!(target: "validation", %id, "Skipping bank case: no objectives.");
                    continue;
                }
                let case = CaseSpec {
                    id: id.clone(),
                    title: cc.title.clone(),
                    brief: cc.brief.clone(),
                    source: CaseSource::LocalBank,
                    objectives: cc.objectives.clone(),
                    hint_steps: cc.hint_steps.clone(),
                    scoring: cc.scoring.clone(),
                };
                order.push(id.clone());
                by_id.insert(id, case);
            }
        }

        // Always insert built-in cases, but don't overwrite existing ids.
        for case in builtin_cases() {
            if !by_id.contains_key(&case.id) {
                order.push(case.id.clone());
                by_id.insert(case.id.clone(), case);
            }
        }

        // Inventory summary by source.
        let mut bank = 0usize;
        let mut builtin = 0usize;
        for case in by_id.values() {
            match case.source {
                CaseSource::LocalBank => bank += 1,
                CaseSource::Builtin => builtin += 1,
            }
        }
        info!(target: "validation", local_bank = bank, builtin, "Startup case inventory");

        Self {
            cases: by_id,
            case_order: order,
            achievements: builtin_achievements(),
            economy,
            ledgers: Arc::new(RwLock::new(HashMap::new())),
            store,
        }
    }

    /// Read-only access to a case by id.
    pub fn case(&self, id: &str) -> Option<&CaseSpec> {
        self.cases.get(id)
    }

    /// Cases in presentation order.
    pub fn cases_in_order(&self) -> Vec<&CaseSpec> {
        self.case_order.iter().filter_map(|id| self.cases.get(id)).collect()
    }

    /// Run `f` with exclusive access to the user's ledger, loading it from
    /// the store on first touch. The write lock spans the whole mutation;
    /// that is the single-writer-per-user guarantee the engine assumes.
    pub async fn with_ledger<T>(&self, user_id: &str, f: impl FnOnce(&mut HintLedger) -> T) -> T {
        let mut ledgers = self.ledgers.write().await;
        let ledger = match ledgers.entry(user_id.to_string()) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(v) => v.insert(self.load_ledger(user_id)),
        };
        f(ledger)
    }

    fn load_ledger(&self, user_id: &str) -> HintLedger {
        let mut records = Vec::new();
        for case_id in &self.case_order {
            records.extend(self.store.load_unlock_state(user_id, case_id));
        }
        let balance = self
            .store
            .load_balance(user_id)
            .unwrap_or(self.economy.starting_balance);
        HintLedger::from_snapshot(records, balance)
    }

    /// Push one case's slice of the ledger (plus the balance) to the store.
    pub fn persist_case(&self, user_id: &str, case_id: &str, ledger: &HintLedger) {
        self.store.save_unlock_state(user_id, case_id, &ledger.snapshot(case_id));
        self.store.save_balance(user_id, ledger.balance());
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_cases_are_served_in_order() {
        let state = AppState::new();
        let ids: Vec<&str> = state.cases_in_order().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["case-1", "case-2", "case-3"]);
        assert!(state.case("case-2").is_some());
        assert!(state.case("case-404").is_none());
    }

    #[tokio::test]
    async fn ledger_loads_starting_balance_on_first_touch() {
        let state = AppState::new();
        let balance = state.with_ledger("ada", |l| l.balance()).await;
        assert_eq!(balance, state.economy.starting_balance);
    }

    #[tokio::test]
    async fn ledger_survives_eviction_via_the_store() {
        let store: Arc<dyn ProgressStore> = Arc::new(MemoryStore::default());
        let case = builtin_cases().into_iter().find(|c| c.id == "case-2").expect("case-2");

        let state = AppState::with_store(store.clone());
        state
            .with_ledger("ada", |l| {
                l.purchase_unlock(&case, "hs-2-hidden").expect("known step");
                state.persist_case("ada", &case.id, l);
            })
            .await;

        // A fresh state over the same store sees the persisted unlock.
        let reloaded = AppState::with_store(store);
        let unlocked = reloaded.with_ledger("ada", |l| l.is_unlocked("hs-2-hidden")).await;
        assert!(unlocked);
    }
}
