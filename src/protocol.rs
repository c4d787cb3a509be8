//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.
//!
//! Outbound case views deliberately strip solution data: objective checks,
//! hint conditions, and locked hint text never cross the wire.

use serde::{Deserialize, Serialize};

use crate::domain::{CaseSpec, UnlockMethod, ValidationResult};
use crate::ledger::Purchase;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    ListCases,
    OpenCase {
        #[serde(rename = "caseId")]
        case_id: String,
    },
    CodeChanged {
        #[serde(rename = "userId")]
        user_id: String,
        #[serde(rename = "caseId")]
        case_id: String,
        html: String,
        css: String,
    },
    HintState {
        #[serde(rename = "userId")]
        user_id: String,
        #[serde(rename = "caseId")]
        case_id: String,
    },
    PurchaseHint {
        #[serde(rename = "userId")]
        user_id: String,
        #[serde(rename = "caseId")]
        case_id: String,
        #[serde(rename = "stepId")]
        step_id: String,
    },
    ResetCase {
        #[serde(rename = "userId")]
        user_id: String,
        #[serde(rename = "caseId")]
        case_id: String,
    },
    CloseCase {
        #[serde(rename = "userId")]
        user_id: String,
        #[serde(rename = "caseId")]
        case_id: String,
        html: String,
        css: String,
    },
    Achievements {
        #[serde(rename = "userId")]
        user_id: String,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Cases {
        cases: Vec<CaseSummaryOut>,
    },
    Case {
        case: CaseOut,
    },
    Validation {
        result: ValidationResult,
        unlocked: Vec<UnlockedHintOut>,
        balance: u32,
    },
    HintState {
        balance: u32,
        steps: Vec<HintStepOut>,
    },
    HintPurchase {
        purchase: Purchase,
    },
    CaseReset {
        #[serde(rename = "caseId")]
        case_id: String,
    },
    CaseClosed {
        close: CaseCloseOut,
    },
    Achievements {
        achievements: Vec<AchievementOut>,
    },
    Error {
        message: String,
    },
}

/// Case list entry.
#[derive(Debug, Serialize)]
pub struct CaseSummaryOut {
    pub id: String,
    pub title: String,
    pub brief: String,
    #[serde(rename = "maxScore")]
    pub max_score: u32,
    #[serde(rename = "hintCount")]
    pub hint_count: usize,
}

/// Objective view without its checks.
#[derive(Debug, Serialize)]
pub struct ObjectiveBriefOut {
    pub id: String,
    pub title: String,
    pub description: String,
    pub points: u32,
}

/// Hint teaser: enough to render a locked hint slot, nothing more.
#[derive(Debug, Serialize)]
pub struct HintTeaserOut {
    #[serde(rename = "stepId")]
    pub step_id: String,
    pub cost: u32,
    pub reward: u32,
}

/// Full case view served when a case is opened.
#[derive(Debug, Serialize)]
pub struct CaseOut {
    pub id: String,
    pub title: String,
    pub brief: String,
    pub objectives: Vec<ObjectiveBriefOut>,
    #[serde(rename = "hintSteps")]
    pub hint_steps: Vec<HintTeaserOut>,
    #[serde(rename = "maxScore")]
    pub max_score: u32,
    #[serde(rename = "maxCap")]
    pub max_cap: u32,
}

pub fn to_summary(c: &CaseSpec) -> CaseSummaryOut {
    CaseSummaryOut {
        id: c.id.clone(),
        title: c.title.clone(),
        brief: c.brief.clone(),
        max_score: c.max_score(),
        hint_count: c.hint_steps.len(),
    }
}

pub fn to_case_out(c: &CaseSpec) -> CaseOut {
    CaseOut {
        id: c.id.clone(),
        title: c.title.clone(),
        brief: c.brief.clone(),
        objectives: c
            .objectives
            .iter()
            .map(|o| ObjectiveBriefOut {
                id: o.id.clone(),
                title: o.title.clone(),
                description: o.description.clone(),
                points: o.points,
            })
            .collect(),
        hint_steps: c
            .hint_steps
            .iter()
            .map(|s| HintTeaserOut { step_id: s.id.clone(), cost: s.cost, reward: s.reward })
            .collect(),
        max_score: c.max_score(),
        max_cap: c.scoring.max_cap,
    }
}

/// A hint that just auto-unlocked during a code-change sweep.
#[derive(Debug, Serialize)]
pub struct UnlockedHintOut {
    #[serde(rename = "stepId")]
    pub step_id: String,
    #[serde(rename = "hintText")]
    pub hint_text: String,
    pub reward: u32,
}

/// Per-step unlock state. `hint_text` is present only once the ledger says
/// the step is unlocked.
#[derive(Debug, Serialize)]
pub struct HintStepOut {
    #[serde(rename = "stepId")]
    pub step_id: String,
    pub cost: u32,
    pub reward: u32,
    pub unlocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<UnlockMethod>,
    #[serde(rename = "hintText", skip_serializing_if = "Option::is_none")]
    pub hint_text: Option<String>,
}

/// Outcome of a close-case request.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CaseCloseOut {
    Closed {
        #[serde(rename = "caseId")]
        case_id: String,
        #[serde(rename = "finalScore")]
        final_score: u32,
        #[serde(rename = "cluesFound")]
        clues_found: u32,
        #[serde(rename = "hintsUsed")]
        hints_used: u32,
        #[serde(rename = "newAchievements")]
        new_achievements: Vec<String>,
    },
    Unsolved {
        #[serde(rename = "caseId")]
        case_id: String,
        missing: Vec<String>,
    },
}

#[derive(Debug, Serialize)]
pub struct AchievementOut {
    pub id: String,
    pub title: String,
    pub description: String,
    pub earned: bool,
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct CaseQuery {
    #[serde(rename = "caseId")]
    pub case_id: String,
}

#[derive(Deserialize)]
pub struct ValidateIn {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "caseId")]
    pub case_id: String,
    pub html: String,
    pub css: String,
}

#[derive(Serialize)]
pub struct ValidateOut {
    pub result: ValidationResult,
    pub unlocked: Vec<UnlockedHintOut>,
    pub balance: u32,
}

#[derive(Debug, Deserialize)]
pub struct HintStateQuery {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "caseId")]
    pub case_id: String,
}

#[derive(Serialize)]
pub struct HintStateOut {
    pub balance: u32,
    pub steps: Vec<HintStepOut>,
}

#[derive(Deserialize)]
pub struct PurchaseIn {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "caseId")]
    pub case_id: String,
    #[serde(rename = "stepId")]
    pub step_id: String,
}

#[derive(Serialize)]
pub struct PurchaseOut {
    pub purchase: Purchase,
    pub balance: u32,
}

#[derive(Deserialize)]
pub struct ResetIn {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "caseId")]
    pub case_id: String,
}

#[derive(Serialize)]
pub struct ResetOut {
    #[serde(rename = "caseId")]
    pub case_id: String,
    pub ok: bool,
}

#[derive(Deserialize)]
pub struct CloseIn {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "caseId")]
    pub case_id: String,
    pub html: String,
    pub css: String,
}

#[derive(Debug, Deserialize)]
pub struct AchievementsQuery {
    #[serde(rename = "userId")]
    pub user_id: String,
}

#[derive(Serialize)]
pub struct AchievementsOut {
    pub achievements: Vec<AchievementOut>,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
