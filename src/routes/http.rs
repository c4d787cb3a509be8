//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented; recoverable outcomes stay 200 with a shaped
//! body, and only caller/config breakage becomes a 400.

use std::sync::Arc;
use axum::{extract::{State, Query}, http::StatusCode, Json, response::IntoResponse};
use tracing::{info, instrument};

use crate::protocol::*;
use crate::state::AppState;
use crate::logic::*;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_list_cases(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let cases: Vec<CaseSummaryOut> = state.cases_in_order().into_iter().map(to_summary).collect();
  Json(cases)
}

#[instrument(level = "info", skip(state), fields(%q.case_id))]
pub async fn http_get_case(
  State(state): State<Arc<AppState>>,
  Query(q): Query<CaseQuery>,
) -> Result<Json<CaseOut>, (StatusCode, String)> {
  match state.case(&q.case_id) {
    Some(case) => Ok(Json(to_case_out(case))),
    None => Err((StatusCode::NOT_FOUND, format!("Unknown case: {}", q.case_id))),
  }
}

#[instrument(level = "info", skip(state, body), fields(%body.case_id, html_len = body.html.len(), css_len = body.css.len()))]
pub async fn http_post_validate(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ValidateIn>,
) -> impl IntoResponse {
  let (result, unlocked, balance) =
    on_code_changed(&state, &body.user_id, &body.case_id, &body.html, &body.css).await;
  info!(target: "validation", case_id = %body.case_id, score = result.score, max = result.max_score, unlocked = unlocked.len(), "HTTP validate evaluated");
  Json(ValidateOut { result, unlocked, balance })
}

#[instrument(level = "info", skip(state), fields(%q.case_id))]
pub async fn http_get_hints(
  State(state): State<Arc<AppState>>,
  Query(q): Query<HintStateQuery>,
) -> Result<Json<HintStateOut>, (StatusCode, String)> {
  let (balance, steps) = hint_state(&state, &q.user_id, &q.case_id)
    .await
    .map_err(|e| (StatusCode::NOT_FOUND, e))?;
  Ok(Json(HintStateOut { balance, steps }))
}

#[instrument(level = "info", skip(state, body), fields(%body.case_id, %body.step_id))]
pub async fn http_post_purchase(
  State(state): State<Arc<AppState>>,
  Json(body): Json<PurchaseIn>,
) -> Result<Json<PurchaseOut>, (StatusCode, String)> {
  let (purchase, balance) = purchase_hint(&state, &body.user_id, &body.case_id, &body.step_id)
    .await
    .map_err(|e| (StatusCode::BAD_REQUEST, e))?;
  info!(target: "hints", case_id = %body.case_id, step_id = %body.step_id, "HTTP hint purchase handled");
  Ok(Json(PurchaseOut { purchase, balance }))
}

#[instrument(level = "info", skip(state, body), fields(%body.case_id))]
pub async fn http_post_reset(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ResetIn>,
) -> Result<Json<ResetOut>, (StatusCode, String)> {
  reset_case(&state, &body.user_id, &body.case_id)
    .await
    .map_err(|e| (StatusCode::NOT_FOUND, e))?;
  Ok(Json(ResetOut { case_id: body.case_id, ok: true }))
}

#[instrument(level = "info", skip(state, body), fields(%body.case_id, html_len = body.html.len(), css_len = body.css.len()))]
pub async fn http_post_close(
  State(state): State<Arc<AppState>>,
  Json(body): Json<CloseIn>,
) -> Result<Json<CaseCloseOut>, (StatusCode, String)> {
  let close = close_case(&state, &body.user_id, &body.case_id, &body.html, &body.css)
    .await
    .map_err(|e| (StatusCode::NOT_FOUND, e))?;
  Ok(Json(close))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_achievements(
  State(state): State<Arc<AppState>>,
  Query(q): Query<AchievementsQuery>,
) -> impl IntoResponse {
  let achievements = achievement_state(&state, &q.user_id).await;
  Json(AchievementsOut { achievements })
}
